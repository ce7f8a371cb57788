//! Intent classification over the phrase tables.
//!
//! Completion, deletion and listing always beat creation: "add" inside
//! "mark the add-on task done" must not create a task. Among the three,
//! complete is tested before delete, delete before list.

use super::patterns::{normalize, PatternTable};

/// Coarse category of a user request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Create,
    Complete,
    Delete,
    List,
    Greeting,
    None,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Intent::Create => "create",
            Intent::Complete => "complete",
            Intent::Delete => "delete",
            Intent::List => "list",
            Intent::Greeting => "greeting",
            Intent::None => "none",
        };
        f.write_str(name)
    }
}

/// Classifies normalized text against a shared `PatternTable`.
#[derive(Debug, Clone, Copy)]
pub struct IntentClassifier<'a> {
    patterns: &'a PatternTable,
}

impl<'a> IntentClassifier<'a> {
    pub fn new(patterns: &'a PatternTable) -> Self {
        Self { patterns }
    }

    /// Fragments that signal `intent`, in match order. Empty for `None`.
    pub fn fragments(&self, intent: Intent) -> &'a [&'static str] {
        match intent {
            Intent::Create => &self.patterns.create,
            Intent::Complete => &self.patterns.complete,
            Intent::Delete => &self.patterns.delete,
            Intent::List => &self.patterns.list,
            Intent::Greeting => &self.patterns.greeting,
            Intent::None => &[],
        }
    }

    /// The first fragment of `intent` found in `text`. `text` must already be
    /// normalized.
    pub fn matched_fragment(&self, intent: Intent, text: &str) -> Option<&'static str> {
        PatternTable::first_match(self.fragments(intent), text)
    }

    /// Whether any fragment of `intent` occurs in normalized `text`.
    pub fn matches(&self, intent: Intent, text: &str) -> bool {
        self.matched_fragment(intent, text).is_some()
    }

    /// Creation is only considered when no complete/delete/list fragment occurs.
    pub fn allows_create(&self, text: &str) -> bool {
        !(self.matches(Intent::Complete, text)
            || self.matches(Intent::Delete, text)
            || self.matches(Intent::List, text))
    }

    /// Whether the cascade stage for `intent` may run on normalized `text`.
    /// Create additionally requires that no complete/delete/list fragment occurs.
    pub fn admits(&self, intent: Intent, text: &str) -> bool {
        match intent {
            Intent::Create => self.allows_create(text) && self.matches(Intent::Create, text),
            Intent::None => false,
            other => self.matches(other, text),
        }
    }

    /// Classify raw text.
    pub fn classify(&self, text: &str) -> Intent {
        let text = normalize(text);
        for intent in [Intent::Complete, Intent::Delete, Intent::List] {
            if self.matches(intent, &text) {
                return intent;
            }
        }
        if self.matches(Intent::Create, &text) {
            return Intent::Create;
        }
        if self.matches(Intent::Greeting, &text) {
            return Intent::Greeting;
        }
        Intent::None
    }
}
