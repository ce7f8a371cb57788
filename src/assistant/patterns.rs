//! Phrase tables driving the rule cascade.
//!
//! Built once at startup and shared read-only. Every match is a plain
//! substring test against lower-cased, trimmed input; trailing spaces in the
//! fragments are significant ("show " does not match a bare "show").

use crate::task::{ListFilter, Priority};

/// Intent fragments, priority keywords and the smaller word lists used by
/// extraction. Fragment order within each list is match order.
#[derive(Debug, Clone)]
pub struct PatternTable {
    pub create: Vec<&'static str>,
    pub complete: Vec<&'static str>,
    pub delete: Vec<&'static str>,
    pub list: Vec<&'static str>,
    pub greeting: Vec<&'static str>,
    /// Scanned in order; the first level with any hit wins.
    pub priority: Vec<(Priority, Vec<&'static str>)>,
    /// Scanned in order; the first filter with any hit wins, else `All`.
    pub list_filters: Vec<(ListFilter, Vec<&'static str>)>,
    /// Mentioned in list requests but not mapped to a filter.
    pub list_priority_hints: Vec<&'static str>,
    /// Removed from a raw create title.
    pub title_noise: Vec<&'static str>,
    /// Words dropped when a task is referred to by name.
    pub reference_fillers: Vec<&'static str>,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self {
            create: vec![
                "add ", "create ", "new ", "make ", "todo ", "task ", "remind me to ", "i need to ",
            ],
            complete: vec!["complete ", "finish ", "done ", "mark ", "check off ", "finished "],
            delete: vec!["delete ", "remove ", "cancel ", "erase ", "get rid of "],
            list: vec!["show ", "list ", "display ", "what ", "see ", "view ", "get "],
            greeting: vec!["hello", "hi", "hey", "help", "what can you do"],
            priority: vec![
                (
                    Priority::High,
                    vec!["urgent", "important", "critical", "asap", "priority", "high"],
                ),
                (Priority::Medium, vec!["normal", "medium", "regular", "standard"]),
                (
                    Priority::Low,
                    vec!["low", "later", "someday", "eventually", "when possible"],
                ),
            ],
            list_filters: vec![
                (
                    ListFilter::Pending,
                    vec!["pending", "incomplete", "unfinished", "not done"],
                ),
                (ListFilter::Completed, vec!["completed", "finished", "done"]),
            ],
            list_priority_hints: vec!["high priority", "urgent", "important"],
            title_noise: vec![
                " to my list",
                " to the list",
                " with high priority",
                " with low priority",
                " with medium priority",
            ],
            reference_fillers: vec!["the", "my", "task", "called", "named", "about"],
        }
    }
}

impl PatternTable {
    /// First fragment of `fragments` (in table order) occurring anywhere in `text`.
    pub fn first_match(fragments: &[&'static str], text: &str) -> Option<&'static str> {
        fragments.iter().copied().find(|f| text.contains(f))
    }

    pub fn contains_any(fragments: &[&'static str], text: &str) -> bool {
        Self::first_match(fragments, text).is_some()
    }
}

/// Lower-case and trim raw input; every matcher works on this form.
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_match_uses_table_order() {
        let table = PatternTable::default();
        // "make " appears earlier in the text, but "add " is earlier in the table.
        let text = "make sure to add milk";
        assert_eq!(PatternTable::first_match(&table.create, text), Some("add "));
    }

    #[test]
    fn test_trailing_space_is_significant() {
        let table = PatternTable::default();
        assert_eq!(PatternTable::first_match(&table.list, "show"), None);
        assert_eq!(PatternTable::first_match(&table.list, "show all"), Some("show "));
    }

    #[test]
    fn test_priority_levels_in_scan_order() {
        let table = PatternTable::default();
        let order: Vec<Priority> = table.priority.iter().map(|(p, _)| *p).collect();
        assert_eq!(order, vec![Priority::High, Priority::Medium, Priority::Low]);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  Add Buy Milk \n"), "add buy milk");
    }
}
