//! Natural-language command interpreter.
//!
//! Free text plus a snapshot of the current tasks goes in, exactly one
//! [`Command`] comes out. The local rule cascade runs first:
//!
//! 1. create, only when no complete/delete/list fragment is present
//! 2. complete, resolving a reference among incomplete tasks
//! 3. delete, resolving a reference among all tasks
//! 4. list, with a status filter
//! 5. greeting / help
//!
//! The order lives in a stage table keyed by [`Intent`]; a stage runs when
//! the classifier admits its intent. A stage that matches but cannot produce
//! a command (empty title, unresolved reference) falls through to the next one. When the cascade
//! yields nothing the remote fallback is asked instead.

pub mod classifier;
pub mod command;
pub mod extractor;
pub mod fallback;
pub mod patterns;
pub mod resolver;

pub use classifier::{Intent, IntentClassifier};
pub use command::{Command, HELP_MESSAGE};
pub use extractor::EntityExtractor;
pub use fallback::FallbackAdapter;
pub use patterns::PatternTable;
pub use resolver::{Candidates, ReferenceResolver};

use crate::config::FallbackConfig;
use crate::task::{TaskId, TaskSnapshot};

use patterns::normalize;

/// The interpreter. Immutable after construction and safe to share between
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct Assistant {
    patterns: PatternTable,
    fallback: FallbackAdapter,
}

impl Assistant {
    pub fn new(patterns: PatternTable, fallback: FallbackAdapter) -> Self {
        Self { patterns, fallback }
    }

    pub fn from_config(config: &FallbackConfig) -> Self {
        Self::new(PatternTable::default(), FallbackAdapter::from_config(config))
    }

    pub fn fallback_enabled(&self) -> bool {
        self.fallback.is_enabled()
    }

    /// Interpret `text` against `snapshot`. Never fails.
    pub async fn interpret(&self, text: &str, snapshot: &[TaskSnapshot]) -> Command {
        let text = normalize(text);
        if let Some(command) = self.parse_local(&text, snapshot) {
            tracing::debug!(action = command.action(), "rule cascade matched");
            return command;
        }
        tracing::debug!(input = %text, "no rule matched; using remote fallback");
        self.fallback.interpret(&text, snapshot).await
    }

    /// Run the rule cascade only. `None` means nothing matched.
    pub fn parse_local(&self, text: &str, snapshot: &[TaskSnapshot]) -> Option<Command> {
        let text = normalize(text);
        let classifier = IntentClassifier::new(&self.patterns);
        tracing::debug!(intent = %classifier.classify(&text), "classified input");

        STAGES
            .iter()
            .filter(|(intent, _)| classifier.admits(*intent, &text))
            .find_map(|(intent, handler)| {
                let command = handler(self, &text, snapshot);
                if command.is_none() {
                    tracing::debug!(%intent, "stage matched but produced no command");
                }
                command
            })
    }

    fn create_stage(&self, text: &str, _snapshot: &[TaskSnapshot]) -> Option<Command> {
        let extractor = EntityExtractor::new(&self.patterns);
        let title = extractor.create_title(text)?;
        // Scanned over the whole input, not just the title.
        Some(Command::create(title, extractor.priority(text)))
    }

    fn complete_stage(&self, text: &str, snapshot: &[TaskSnapshot]) -> Option<Command> {
        self.resolve(Intent::Complete, text, snapshot, Candidates::Incomplete)
            .map(Command::complete)
    }

    fn delete_stage(&self, text: &str, snapshot: &[TaskSnapshot]) -> Option<Command> {
        self.resolve(Intent::Delete, text, snapshot, Candidates::All)
            .map(Command::delete)
    }

    fn list_stage(&self, text: &str, _snapshot: &[TaskSnapshot]) -> Option<Command> {
        Some(Command::list(EntityExtractor::new(&self.patterns).list_filter(text)))
    }

    fn greeting_stage(&self, _text: &str, _snapshot: &[TaskSnapshot]) -> Option<Command> {
        Some(Command::help())
    }

    /// Try each fragment of `intent` present in `text`, in table order, until
    /// one leads to a task.
    fn resolve(
        &self,
        intent: Intent,
        text: &str,
        snapshot: &[TaskSnapshot],
        candidates: Candidates,
    ) -> Option<TaskId> {
        let classifier = IntentClassifier::new(&self.patterns);
        let resolver = ReferenceResolver::new(&self.patterns.reference_fillers);
        classifier
            .fragments(intent)
            .iter()
            .filter(|fragment| text.contains(*fragment))
            .find_map(|fragment| resolver.resolve(text, snapshot, fragment, candidates))
    }
}

type StageHandler = fn(&Assistant, &str, &[TaskSnapshot]) -> Option<Command>;

/// Cascade order. A stage runs only when the classifier admits its intent;
/// a handler returning `None` falls through to the next stage.
const STAGES: [(Intent, StageHandler); 5] = [
    (Intent::Create, Assistant::create_stage),
    (Intent::Complete, Assistant::complete_stage),
    (Intent::Delete, Assistant::delete_stage),
    (Intent::List, Assistant::list_stage),
    (Intent::Greeting, Assistant::greeting_stage),
];

impl Default for Assistant {
    fn default() -> Self {
        Self::new(PatternTable::default(), FallbackAdapter::disabled())
    }
}
