//! Resolves a task reference in free text to a task id.
//!
//! Stages, first hit wins:
//! 1. `task <digits>` - the digits are used verbatim as an id
//! 2. any standalone digit run - same, verbatim
//! 3. "first" / "last" - positional in the snapshot
//! 4. title matching on the remaining words: exact, substring, all
//!    significant words, then at least two significant words
//!
//! Numbers are ids while "first"/"last" are positions; do not turn stage 1
//! into a positional lookup. Zero is never an id and falls through.

use std::sync::LazyLock;

use regex::Regex;

use crate::task::{TaskId, TaskSnapshot};

static TASK_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"task (\d+)").expect("valid task number regex"));
static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d+)\b").expect("valid number regex"));

/// Words shorter than this take no part in word-based title matching.
const MIN_SIGNIFICANT_LEN: usize = 3;

/// Which tasks title matching may pick from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidates {
    /// Only tasks not yet completed.
    Incomplete,
    All,
}

/// Staged task reference resolver. Holds only borrowed, read-only data.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    fillers: &'a [&'static str],
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(fillers: &'a [&'static str]) -> Self {
        Self { fillers }
    }

    /// Resolve `text` (normalized) against `snapshot`. `matched_fragment` is
    /// the intent phrase that triggered the lookup and is removed before
    /// title matching.
    pub fn resolve(
        &self,
        text: &str,
        snapshot: &[TaskSnapshot],
        matched_fragment: &str,
        candidates: Candidates,
    ) -> Option<TaskId> {
        if let Some(id) = capture_id(&TASK_NUMBER, text) {
            tracing::debug!(id, "resolved explicit task number");
            return Some(id);
        }
        if let Some(id) = capture_id(&BARE_NUMBER, text) {
            tracing::debug!(id, "resolved bare number");
            return Some(id);
        }
        if let Some(id) = positional(text, snapshot) {
            tracing::debug!(id, "resolved positional reference");
            return Some(id);
        }

        let name = self.reference_name(text, matched_fragment);
        let pool: Vec<&TaskSnapshot> = snapshot
            .iter()
            .filter(|t| candidates == Candidates::All || !t.completed)
            .collect();
        let id = match_title(&name, &pool);
        if let Some(id) = id {
            tracing::debug!(id, name = %name, "resolved task by title");
        }
        id
    }

    /// The words left once the intent phrase and filler words are removed.
    pub fn reference_name(&self, text: &str, matched_fragment: &str) -> String {
        let stripped = if matched_fragment.is_empty() {
            text.to_string()
        } else {
            text.replace(matched_fragment, " ")
        };
        stripped
            .split_whitespace()
            .filter(|word| !self.fillers.contains(word))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn capture_id(pattern: &Regex, text: &str) -> Option<TaskId> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| match m.as_str().parse::<TaskId>() {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::debug!(digits = m.as_str(), error = %e, "number is not a usable task id");
                None
            }
        })
        .filter(|id| *id > 0)
}

fn positional(text: &str, snapshot: &[TaskSnapshot]) -> Option<TaskId> {
    if text.contains("first") {
        snapshot.first().map(|t| t.id)
    } else if text.contains("last") {
        snapshot.last().map(|t| t.id)
    } else {
        None
    }
}

/// Title matching stages over `pool`, in pool order.
fn match_title(name: &str, pool: &[&TaskSnapshot]) -> Option<TaskId> {
    if name.is_empty() || pool.is_empty() {
        return None;
    }
    let titles: Vec<(TaskId, String)> = pool
        .iter()
        .map(|t| (t.id, t.title.to_lowercase()))
        .collect();

    if let Some(id) = first_title(&titles, |title| title == name) {
        return Some(id);
    }
    if let Some(id) = first_title(&titles, |title| title.contains(name)) {
        return Some(id);
    }

    let words: Vec<&str> = name
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_SIGNIFICANT_LEN)
        .collect();
    if words.is_empty() {
        return None;
    }
    if let Some(id) = first_title(&titles, |title| words.iter().all(|w| title.contains(w))) {
        return Some(id);
    }
    if words.len() >= 2 {
        let needed = words.len().min(2);
        return first_title(&titles, |title| {
            words.iter().filter(|w| title.contains(**w)).count() >= needed
        });
    }
    None
}

fn first_title(titles: &[(TaskId, String)], pred: impl Fn(&str) -> bool) -> Option<TaskId> {
    titles
        .iter()
        .find(|(_, title)| pred(title))
        .map(|(id, _)| *id)
}
