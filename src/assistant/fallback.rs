//! Remote fallback for requests the rule cascade cannot interpret.
//!
//! Sends the request and a short task summary to a hosted model and parses
//! its JSON reply into a [`Command`]. Every failure becomes a
//! `Command::Response`; nothing here returns an error.

use std::sync::Arc;

use crate::config::FallbackConfig;
use crate::llm::{ChatMessage, ChatOptions, LlmClient, OpenRouterClient, RetryConfig};
use crate::task::TaskSnapshot;

use super::command::Command;

/// Tasks included in the prompt context.
const CONTEXT_LIMIT: usize = 5;

/// Adapter around an optional model client. Without a client every call
/// degrades immediately.
#[derive(Clone)]
pub struct FallbackAdapter {
    client: Option<Arc<dyn LlmClient>>,
    model: String,
    options: ChatOptions,
}

impl FallbackAdapter {
    pub fn new(client: Option<Arc<dyn LlmClient>>, model: impl Into<String>, options: ChatOptions) -> Self {
        Self {
            client,
            model: model.into(),
            options,
        }
    }

    /// An adapter that never calls out.
    pub fn disabled() -> Self {
        Self::new(None, String::new(), ChatOptions::default())
    }

    /// Build from config, using OpenRouter when an API key is present.
    pub fn from_config(config: &FallbackConfig) -> Self {
        let client = config.api_key.as_ref().filter(|_| config.is_enabled()).map(|key| {
            let retry = RetryConfig::with_max_retries(config.max_retries);
            Arc::new(OpenRouterClient::with_retry_config(key.clone(), retry)) as Arc<dyn LlmClient>
        });
        let options = ChatOptions {
            temperature: Some(config.temperature),
            max_tokens: Some(config.max_tokens),
        };
        Self::new(client, config.model.clone(), options)
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Ask the model to interpret `text` (normalized). Always yields a command.
    pub async fn interpret(&self, text: &str, snapshot: &[TaskSnapshot]) -> Command {
        let Some(client) = &self.client else {
            tracing::debug!("remote fallback disabled");
            return unavailable(text);
        };

        let prompt = build_prompt(text, snapshot);
        let messages = [ChatMessage::user(prompt)];
        let response = match client
            .chat_completion_with_options(&self.model, &messages, self.options.clone())
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, model = %self.model, "remote fallback failed");
                return unavailable(text);
            }
        };

        let reply = response.content.unwrap_or_default();
        tracing::debug!(
            reply = %reply.trim(),
            model = response.model.as_deref().unwrap_or(&self.model),
            finish_reason = response.finish_reason.as_deref().unwrap_or("unknown"),
            usage = ?response.usage,
            "remote fallback reply"
        );
        parse_reply(&reply).unwrap_or_else(|| {
            tracing::warn!(reply = %reply.trim(), "unusable remote fallback reply");
            unparseable(text)
        })
    }
}

impl std::fmt::Debug for FallbackAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackAdapter")
            .field("enabled", &self.is_enabled())
            .field("model", &self.model)
            .finish()
    }
}

/// Prompt for the hosted model.
///
/// # Response Format
/// A single JSON object shaped like one [`Command`] variant, nothing else.
pub fn build_prompt(text: &str, snapshot: &[TaskSnapshot]) -> String {
    let context = if snapshot.is_empty() {
        "No existing todos".to_string()
    } else {
        snapshot
            .iter()
            .take(CONTEXT_LIMIT)
            .map(|t| {
                format!(
                    "- {} (ID: {}, Status: {}, Priority: {})",
                    t.title,
                    t.id,
                    if t.completed { "Completed" } else { "Pending" },
                    t.priority
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let first_id = snapshot.first().map(|t| t.id).unwrap_or(1);

    format!(
        r#"You are a todo list assistant. Parse the user's request and respond with ONLY valid JSON.

Current todos:
{context}

For the user request: "{text}"

Return JSON in one of these formats:

1. CREATE todo:
{{"action": "create", "title": "task title", "description": "optional description", "priority": "low|medium|high"}}

2. UPDATE/COMPLETE todo:
{{"action": "update", "id": task_number, "completed": true}}

3. DELETE todo:
{{"action": "delete", "id": task_number}}

4. LIST todos:
{{"action": "list", "filter": "all|pending|completed"}}

5. GENERAL response:
{{"action": "response", "message": "helpful message"}}

Examples:
- "add buy milk" → {{"action": "create", "title": "Buy milk", "priority": "medium"}}
- "complete task 1" → {{"action": "update", "id": 1, "completed": true}}
- "delete first task" → {{"action": "delete", "id": {first_id}}}
- "show all tasks" → {{"action": "list", "filter": "all"}}

RESPOND WITH ONLY JSON - NO OTHER TEXT."#
    )
}

/// Parse a model reply. The whole reply is tried first, then the span from
/// the first `{` to the last `}`. Commands that parse but cannot be executed
/// count as unparseable.
pub fn parse_reply(reply: &str) -> Option<Command> {
    let reply = reply.trim();
    let command = serde_json::from_str::<Command>(reply).ok().or_else(|| {
        let start = reply.find('{')?;
        let end = reply.rfind('}')?;
        if end <= start {
            return None;
        }
        serde_json::from_str::<Command>(&reply[start..=end]).ok()
    })?;
    command.is_actionable().then_some(command)
}

fn unavailable(text: &str) -> Command {
    Command::respond(format!(
        "I understood '{text}' but couldn't process it fully. Try phrases like:\n\
         • 'add [task name]'\n\
         • 'complete task [number]'\n\
         • 'show tasks'\n\
         • 'delete task [number]'\n\
         • 'add [task] with high priority'"
    ))
}

fn unparseable(text: &str) -> Command {
    Command::respond(format!(
        "I understood '{text}' but had trouble processing it. Please try rephrasing your request."
    ))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm::ChatResponse;
    use crate::task::{ListFilter, Priority};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays canned replies and records the prompts it was sent.
    pub(crate) struct ScriptedClient {
        reply: Result<String, String>,
        pub prompts: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        pub fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn chat_completion(
            &self,
            _model: &str,
            messages: &[ChatMessage],
        ) -> anyhow::Result<ChatResponse> {
            self.prompts
                .lock()
                .unwrap()
                .extend(messages.iter().map(|m| m.content.clone()));
            match &self.reply {
                Ok(content) => Ok(ChatResponse {
                    content: Some(content.clone()),
                    ..Default::default()
                }),
                Err(message) => Err(anyhow::anyhow!(message.clone())),
            }
        }
    }

    fn adapter(client: Arc<ScriptedClient>) -> FallbackAdapter {
        FallbackAdapter::new(Some(client as Arc<dyn LlmClient>), "test-model", ChatOptions::default())
    }

    fn is_response(command: &Command) -> bool {
        matches!(command, Command::Response { .. })
    }

    #[tokio::test]
    async fn test_plain_json_reply() {
        let client = ScriptedClient::replying(r#"{"action": "list", "filter": "completed"}"#);
        let command = adapter(client).interpret("anything finished?", &[]).await;
        assert_eq!(command, Command::list(ListFilter::Completed));
    }

    #[tokio::test]
    async fn test_wrapped_json_reply() {
        let client = ScriptedClient::replying(
            "Sure! Here you go:\n{\"action\": \"create\", \"title\": \"Water plants\", \"priority\": \"low\"}\nHope that helps.",
        );
        let command = adapter(client).interpret("plants need water eventually", &[]).await;
        assert_eq!(command, Command::create("Water plants", Priority::Low));
    }

    #[tokio::test]
    async fn test_malformed_reply_degrades() {
        let client = ScriptedClient::replying("I think you want to add something?");
        let command = adapter(client).interpret("blorp", &[]).await;
        assert_eq!(
            command,
            Command::respond(
                "I understood 'blorp' but had trouble processing it. Please try rephrasing your request."
            )
        );
    }

    #[tokio::test]
    async fn test_missing_fields_degrade() {
        for reply in [
            r#"{"action": "create"}"#,
            r#"{"action": "update", "completed": true}"#,
            r#"{"action": "delete"}"#,
            r#"{"action": "update", "id": 2}"#,
            r#"{"action": "create", "title": "  "}"#,
            r#"{"action": "teleport"}"#,
        ] {
            let command = adapter(ScriptedClient::replying(reply)).interpret("blorp", &[]).await;
            assert!(is_response(&command), "{} gave {:?}", reply, command);
        }
    }

    #[tokio::test]
    async fn test_client_error_degrades() {
        let client = ScriptedClient::failing("connection reset");
        let command = adapter(client).interpret("blorp", &[]).await;
        match command {
            Command::Response { message } => {
                assert!(message.starts_with("I understood 'blorp' but couldn't process it fully."));
                assert!(message.contains("'show tasks'"));
            }
            other => panic!("expected response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_disabled_adapter_degrades() {
        let adapter = FallbackAdapter::disabled();
        assert!(!adapter.is_enabled());
        let command = adapter.interpret("blorp", &[]).await;
        assert!(is_response(&command));
    }

    #[tokio::test]
    async fn test_prompt_context_is_bounded() {
        let client = ScriptedClient::replying(r#"{"action": "response", "message": "ok"}"#);
        let snapshot: Vec<TaskSnapshot> = (1..=7)
            .map(|id| TaskSnapshot::new(id, format!("Task number {id}")))
            .collect();
        adapter(client.clone()).interpret("blorp", &snapshot).await;

        let prompts = client.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        let prompt = &prompts[0];
        assert!(prompt.contains("- Task number 1 (ID: 1, Status: Pending, Priority: medium)"));
        assert!(prompt.contains("- Task number 5 (ID: 5"));
        assert!(!prompt.contains("Task number 6"));
        assert!(prompt.contains("For the user request: \"blorp\""));
    }

    #[test]
    fn test_prompt_without_tasks() {
        let prompt = build_prompt("blorp", &[]);
        assert!(prompt.contains("No existing todos"));
        assert!(prompt.contains(r#""delete first task" → {"action": "delete", "id": 1}"#));

        let prompt = build_prompt("blorp", &[TaskSnapshot::new(9, "Exercise").completed()]);
        assert!(prompt.contains("- Exercise (ID: 9, Status: Completed, Priority: medium)"));
        assert!(prompt.contains(r#"{"action": "delete", "id": 9}"#));
    }

    #[test]
    fn test_parse_reply_rejects_update_without_changes() {
        assert_eq!(parse_reply(r#"{"action": "update", "id": 2}"#), None);
        assert_eq!(
            parse_reply(r#"{"action": "update", "id": 2, "completed": true}"#),
            Some(Command::complete(2))
        );
    }

    #[test]
    fn test_parse_reply_brace_span() {
        assert_eq!(parse_reply("}{"), None);
        assert_eq!(
            parse_reply("```json\n{\"action\": \"delete\", \"id\": 3}\n```"),
            Some(Command::delete(3))
        );
    }
}
