//! Entity extraction for intents that carry a payload: create titles,
//! priorities and list filters. Task references live in `resolver`.

use crate::task::{ListFilter, Priority};

use super::patterns::PatternTable;

/// Pulls structured fields out of normalized text.
#[derive(Debug, Clone, Copy)]
pub struct EntityExtractor<'a> {
    patterns: &'a PatternTable,
}

impl<'a> EntityExtractor<'a> {
    pub fn new(patterns: &'a PatternTable) -> Self {
        Self { patterns }
    }

    /// Priority mentioned anywhere in `text`. Levels are scanned in table
    /// order (high, medium, low) and the first level with a hit wins.
    pub fn priority(&self, text: &str) -> Priority {
        self.patterns
            .priority
            .iter()
            .find(|(_, keywords)| PatternTable::contains_any(keywords, text))
            .map(|(level, _)| *level)
            .unwrap_or_default()
    }

    /// Title for a create request.
    ///
    /// Tries each create fragment present in `text`, in table order, and
    /// returns the first non-empty title: the text following the fragment's
    /// first occurrence, with list furniture and priority phrases removed and
    /// the first letter capitalized.
    pub fn create_title(&self, text: &str) -> Option<String> {
        self.patterns.create.iter().find_map(|fragment| {
            let start = text.find(fragment)? + fragment.len();
            let mut title = text[start..].trim().to_string();
            for noise in &self.patterns.title_noise {
                title = title.replace(noise, "");
            }
            let title = title.trim();
            if title.is_empty() {
                None
            } else {
                Some(capitalize_first(title))
            }
        })
    }

    /// Filter for a list request; `All` unless a status word occurs.
    pub fn list_filter(&self, text: &str) -> ListFilter {
        let filter = self
            .patterns
            .list_filters
            .iter()
            .find(|(_, words)| PatternTable::contains_any(words, text))
            .map(|(filter, _)| *filter)
            .unwrap_or_default();

        if filter == ListFilter::All && PatternTable::contains_any(&self.patterns.list_priority_hints, text) {
            // Priority phrasing is recognized but listing by priority is not supported.
            tracing::debug!("list request mentions priority; showing all tasks");
        }
        filter
    }
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
