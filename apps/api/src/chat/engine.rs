//! Conversation Turn Engine — drives one user message to a final text answer.
//!
//! Flow: build messages → REQUEST → (text → done) | (tool calls →
//!       TOOL_DISPATCH in request order → REQUEST again).
//!
//! The full transcript is resent on every request. Rounds are strictly
//! sequential because each request depends on everything appended before it.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::documents::SystemContext;
use crate::llm_client::{CompletionBackend, LlmError};
use crate::models::message::ChatMessage;
use crate::tools::{ToolError, ToolRegistry, ToolSpec};

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Completion request failed: {0}")]
    Completion(#[from] LlmError),

    #[error(transparent)]
    ToolArguments(#[from] ToolError),

    #[error("Model kept requesting tools after {rounds} rounds")]
    ToolLoopExceeded { rounds: u32 },

    #[error("Model returned neither text nor tool calls")]
    EmptyReply,
}

/// Read-only collaborators for running turns. Safe to share across sessions.
pub struct TurnEngine {
    backend: Arc<dyn CompletionBackend>,
    registry: Arc<ToolRegistry>,
    context: Arc<SystemContext>,
    /// Tool-dispatch rounds allowed before the turn is rejected.
    max_tool_rounds: u32,
    /// Advertised once; the registry never changes after startup.
    tool_specs: Vec<ToolSpec>,
}

impl TurnEngine {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        registry: Arc<ToolRegistry>,
        context: Arc<SystemContext>,
        max_tool_rounds: u32,
    ) -> Self {
        let tool_specs = registry.describe();
        Self {
            backend,
            registry,
            context,
            max_tool_rounds,
            tool_specs,
        }
    }

    pub fn context(&self) -> &SystemContext {
        &self.context
    }

    /// System message, then the prior transcript, then the new user message.
    pub fn build_messages(&self, history: &[ChatMessage], user_message: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(self.context.system_prompt()));
        messages.extend_from_slice(history);
        messages.push(ChatMessage::user(user_message));
        messages
    }

    /// Runs one turn and returns the assistant's final text.
    ///
    /// The caller's transcript is never modified; only the answer comes back.
    pub async fn run_turn(
        &self,
        history: &[ChatMessage],
        user_message: &str,
    ) -> Result<String, TurnError> {
        let turn_id = Uuid::new_v4();
        let span = info_span!("turn", %turn_id, history = history.len());
        self.drive(self.build_messages(history, user_message))
            .instrument(span)
            .await
    }

    async fn drive(&self, mut messages: Vec<ChatMessage>) -> Result<String, TurnError> {
        let mut rounds: u32 = 0;

        loop {
            // REQUEST
            let reply = self.backend.complete(&messages, &self.tool_specs).await?;

            if !reply.has_tool_calls() {
                if reply.content.trim().is_empty() {
                    return Err(TurnError::EmptyReply);
                }
                info!("Turn finished after {rounds} tool round(s)");
                return Ok(reply.content);
            }

            if rounds >= self.max_tool_rounds {
                return Err(TurnError::ToolLoopExceeded { rounds });
            }
            rounds += 1;

            // TOOL_DISPATCH
            let calls = reply.tool_calls.clone();
            messages.push(reply);
            for call in &calls {
                info!("Round {rounds}: tool '{}' (id {})", call.name, call.id);
                let result = self.registry.dispatch(&call.name, &call.arguments).await?;
                messages.push(ChatMessage::tool(call.id.clone(), result.to_content()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::models::message::{Role, ToolCallRequest};
    use crate::tools::test_support::RecordingNotifier;

    /// Replays scripted replies and records every request it receives.
    struct ScriptedBackend {
        replies: Mutex<VecDeque<Result<ChatMessage, LlmError>>>,
        requests: Mutex<Vec<Vec<ChatMessage>>>,
        /// Returned once the script runs out.
        repeat: Option<ChatMessage>,
    }

    impl ScriptedBackend {
        fn new(replies: Vec<Result<ChatMessage, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                requests: Mutex::new(Vec::new()),
                repeat: None,
            }
        }

        fn forever(reply: ChatMessage) -> Self {
            Self {
                repeat: Some(reply),
                ..Self::new(Vec::new())
            }
        }

        fn requests(&self) -> Vec<Vec<ChatMessage>> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionBackend for ScriptedBackend {
        async fn complete(
            &self,
            messages: &[ChatMessage],
            tools: &[ToolSpec],
        ) -> Result<ChatMessage, LlmError> {
            assert_eq!(tools.len(), 2, "both tools must be advertised on every request");
            self.requests.lock().unwrap().push(messages.to_vec());
            match self.replies.lock().unwrap().pop_front() {
                Some(reply) => reply,
                None => Ok(self.repeat.clone().expect("script exhausted")),
            }
        }
    }

    fn call(id: &str, name: &str, arguments: &str) -> ToolCallRequest {
        ToolCallRequest {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }

    fn engine(backend: Arc<ScriptedBackend>, max_rounds: u32) -> (TurnEngine, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        let registry = Arc::new(ToolRegistry::new(notifier.clone()));
        let context = Arc::new(SystemContext::new(
            "Ada Lovelace",
            "Analytical Engine programmer",
            "Mathematician.",
        ));
        (TurnEngine::new(backend, registry, context, max_rounds), notifier)
    }

    #[tokio::test]
    async fn test_plain_answer_is_single_round_trip() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(ChatMessage::assistant(
            "My name is Ada Lovelace.",
        ))]));
        let (engine, notifier) = engine(backend.clone(), 8);

        let history = vec![
            ChatMessage::user("Hello"),
            ChatMessage::assistant("Hi! Ask me about my career."),
        ];
        let reply = engine.run_turn(&history, "What is your name?").await.unwrap();

        assert_eq!(reply, "My name is Ada Lovelace.");
        let requests = backend.requests();
        assert_eq!(requests.len(), 1);

        let sent = &requests[0];
        assert_eq!(sent.len(), history.len() + 2);
        assert_eq!(sent[0].role, Role::System);
        assert!(sent[0].content.contains("Analytical Engine programmer"));
        assert_eq!(&sent[1..3], &history[..]);
        assert_eq!(sent[3], ChatMessage::user("What is your name?"));
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_email_scenario_dispatches_then_answers() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(ChatMessage::assistant_tool_calls(
                "",
                vec![call("call_1", "record_user_details", r#"{"email":"a@b.com","name":"Bob"}"#)],
            )),
            Ok(ChatMessage::assistant("Thanks Bob, I'll be in touch.")),
        ]));
        let (engine, notifier) = engine(backend.clone(), 8);

        let reply = engine
            .run_turn(&[], "I'm Bob, reach me at a@b.com")
            .await
            .unwrap();

        assert_eq!(reply, "Thanks Bob, I'll be in touch.");
        let requests = backend.requests();
        assert_eq!(requests.len(), 2);

        let second = &requests[1];
        assert_eq!(second.len(), 4);
        assert_eq!(second[2].tool_calls[0].id, "call_1");
        assert_eq!(second[3], ChatMessage::tool("call_1", r#"{"status":"recorded"}"#));

        let sent = notifier.messages();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("a@b.com"));
    }

    #[tokio::test]
    async fn test_tool_results_preserve_request_order() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(ChatMessage::assistant_tool_calls(
                "",
                vec![
                    call("c1", "record_unknown_question", r#"{"question":"first"}"#),
                    call("c2", "made_up_tool", "{}"),
                    call("c3", "record_unknown_question", r#"{"question":"third"}"#),
                ],
            )),
            Ok(ChatMessage::assistant("Done.")),
        ]));
        let (engine, notifier) = engine(backend.clone(), 8);

        engine.run_turn(&[], "Three things").await.unwrap();

        let second = &backend.requests()[1];
        let tool_ids: Vec<_> = second
            .iter()
            .filter(|m| m.role == Role::Tool)
            .map(|m| m.tool_call_id.clone().unwrap())
            .collect();
        assert_eq!(tool_ids, vec!["c1", "c2", "c3"]);
        assert_eq!(second[4].content, "{}");
        assert_eq!(
            notifier.messages(),
            vec!["Unanswered question: first", "Unanswered question: third"]
        );
    }

    #[tokio::test]
    async fn test_malformed_arguments_abort_turn() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(ChatMessage::assistant_tool_calls(
            "",
            vec![call("c1", "record_user_details", "{not json")],
        ))]));
        let (engine, _) = engine(backend.clone(), 8);

        let err = engine.run_turn(&[], "hi").await.unwrap_err();
        assert!(matches!(err, TurnError::ToolArguments(_)));
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let backend = Arc::new(ScriptedBackend::new(vec![Err(LlmError::Api {
            status: 401,
            message: "Invalid API Key".to_string(),
        })]));
        let (engine, _) = engine(backend, 8);

        let err = engine.run_turn(&[], "hi").await.unwrap_err();
        assert!(matches!(err, TurnError::Completion(LlmError::Api { status: 401, .. })));
    }

    #[tokio::test]
    async fn test_tool_loop_is_bounded() {
        let backend = Arc::new(ScriptedBackend::forever(ChatMessage::assistant_tool_calls(
            "",
            vec![call("loop", "record_unknown_question", r#"{"question":"again?"}"#)],
        )));
        let (engine, notifier) = engine(backend.clone(), 3);

        let err = engine.run_turn(&[], "hi").await.unwrap_err();
        assert!(matches!(err, TurnError::ToolLoopExceeded { rounds: 3 }));
        assert_eq!(backend.requests().len(), 4);
        assert_eq!(notifier.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_blank_reply_is_an_error() {
        let backend = Arc::new(ScriptedBackend::new(vec![Ok(ChatMessage::assistant("  "))]));
        let (engine, _) = engine(backend, 8);

        let err = engine.run_turn(&[], "hi").await.unwrap_err();
        assert!(matches!(err, TurnError::EmptyReply));
    }

    #[tokio::test]
    async fn test_text_alongside_tool_calls_still_dispatches() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Ok(ChatMessage::assistant_tool_calls(
                "Let me note that.",
                vec![call("c1", "record_unknown_question", r#"{"question":"salary?"}"#)],
            )),
            Ok(ChatMessage::assistant("I've passed that on.")),
        ]));
        let (engine, notifier) = engine(backend.clone(), 8);

        let reply = engine.run_turn(&[], "What's your salary?").await.unwrap();
        assert_eq!(reply, "I've passed that on.");
        assert_eq!(notifier.messages().len(), 1);
    }
}
