use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::notifier::{NotifyOutcome, Notifier};
use crate::tools::{parse_args, ParameterSpec, ToolError, ToolHandler, ToolResult, ToolSpec};

pub const NAME: &str = "record_user_details";

const NOT_PROVIDED: &str = "Not provided";

/// Optional fields may be absent or explicitly null.
#[derive(Debug, Deserialize)]
struct UserDetailsArgs {
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// Forwards a visitor's contact details to the site owner.
pub struct RecordUserDetails {
    notifier: Arc<dyn Notifier>,
}

impl RecordUserDetails {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }
}

#[async_trait]
impl ToolHandler for RecordUserDetails {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: NAME,
            description: "Record user contact details",
            parameters: vec![
                ParameterSpec::required_string("email"),
                ParameterSpec::optional_string("name"),
                ParameterSpec::optional_string("notes"),
            ],
        }
    }

    async fn call(&self, args: Value) -> Result<ToolResult, ToolError> {
        let args: UserDetailsArgs = parse_args(NAME, args)?;
        let message = format!(
            "New contact → Name: {}, Email: {}, Notes: {}",
            args.name.as_deref().unwrap_or(NOT_PROVIDED),
            args.email,
            args.notes.as_deref().unwrap_or(NOT_PROVIDED)
        );

        match self.notifier.notify(&message).await {
            NotifyOutcome::Failed(reason) => warn!("Contact notification not delivered: {reason}"),
            outcome => info!("Recorded contact details ({outcome:?})"),
        }
        Ok(ToolResult::recorded())
    }
}
