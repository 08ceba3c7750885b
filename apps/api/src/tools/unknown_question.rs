use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::notifier::{NotifyOutcome, Notifier};
use crate::tools::{parse_args, ParameterSpec, ToolError, ToolHandler, ToolResult, ToolSpec};

pub const NAME: &str = "record_unknown_question";

#[derive(Debug, Deserialize)]
struct UnknownQuestionArgs {
    question: String,
}

/// Logs a question the assistant could not answer from the profile.
pub struct RecordUnknownQuestion {
    notifier: Arc<dyn Notifier>,
}

impl RecordUnknownQuestion {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl ToolHandler for RecordUnknownQuestion {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: NAME,
            description: "Record a question the assistant could not answer",
            parameters: vec![ParameterSpec::required_string("question")],
        }
    }

    async fn call(&self, args: Value) -> Result<ToolResult, ToolError> {
        let args: UnknownQuestionArgs = parse_args(NAME, args)?;

        match self
            .notifier
            .notify(&format!("Unanswered question: {}", args.question))
            .await
        {
            NotifyOutcome::Failed(reason) => warn!("Question notification not delivered: {reason}"),
            outcome => info!("Recorded unanswered question ({outcome:?})"),
        }
        Ok(ToolResult::recorded())
    }
}
