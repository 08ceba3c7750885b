//! Tool Registry — the fixed set of callbacks the model may invoke.
//!
//! Each tool is a typed `ToolHandler`; the registry maps advertised names to
//! handlers once at startup and is read-only afterwards.

pub mod contact;
pub mod unknown_question;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::notifier::Notifier;
use crate::tools::contact::RecordUserDetails;
use crate::tools::unknown_question::RecordUnknownQuestion;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Advertised descriptors
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    /// JSON-Schema type name.
    pub kind: &'static str,
    pub required: bool,
}

impl ParameterSpec {
    pub const fn required_string(name: &'static str) -> Self {
        Self {
            name,
            kind: "string",
            required: true,
        }
    }

    pub const fn optional_string(name: &'static str) -> Self {
        Self {
            name,
            kind: "string",
            required: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterSpec>,
}

impl ToolSpec {
    /// Renders the parameter list as a JSON-Schema object descriptor.
    pub fn json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .parameters
            .iter()
            .map(|p| (p.name.to_string(), json!({ "type": p.kind })))
            .collect();
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Results
// ────────────────────────────────────────────────────────────────────────────

/// Small JSON object handed back to the model as a tool-role message.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ToolResult(Map<String, Value>);

impl ToolResult {
    /// Neutral result for names the registry does not know.
    pub fn empty() -> Self {
        Self(Map::new())
    }

    pub fn recorded() -> Self {
        let mut map = Map::new();
        map.insert("status".to_string(), Value::String("recorded".to_string()));
        Self(map)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Serialized form placed into the tool message content.
    pub fn to_content(&self) -> String {
        Value::Object(self.0.clone()).to_string()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handler trait and registry
// ────────────────────────────────────────────────────────────────────────────

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn spec(&self) -> ToolSpec;

    /// Runs the tool with already-parsed JSON arguments.
    /// Side effects are best-effort and never turn into an `Err`.
    async fn call(&self, args: Value) -> Result<ToolResult, ToolError>;
}

/// Deserializes tool arguments into the handler's typed argument struct.
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}

pub struct ToolRegistry {
    handlers: HashMap<&'static str, Arc<dyn ToolHandler>>,
    /// Advertisement order.
    order: Vec<&'static str>,
}

impl ToolRegistry {
    /// The two profile tools, both reporting through `notifier`.
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        let handlers: Vec<Arc<dyn ToolHandler>> = vec![
            Arc::new(RecordUserDetails::new(notifier.clone())),
            Arc::new(RecordUnknownQuestion::new(notifier)),
        ];
        Self::from_handlers(handlers)
    }

    pub fn from_handlers(handlers: Vec<Arc<dyn ToolHandler>>) -> Self {
        let mut map = HashMap::new();
        let mut order = Vec::with_capacity(handlers.len());
        for handler in handlers {
            let name = handler.spec().name;
            if map.insert(name, handler).is_none() {
                order.push(name);
            }
        }
        Self {
            handlers: map,
            order,
        }
    }

    pub fn describe(&self) -> Vec<ToolSpec> {
        self.order
            .iter()
            .filter_map(|name| self.handlers.get(name))
            .map(|h| h.spec())
            .collect()
    }

    /// Runs the named tool.
    ///
    /// Arguments are parsed before the name is resolved, so malformed JSON is
    /// a `ToolError` for every call. Unknown names then yield
    /// `ToolResult::empty()` so a hallucinated tool never aborts a turn.
    pub async fn dispatch(&self, name: &str, arguments: &str) -> Result<ToolResult, ToolError> {
        let args: Value =
            serde_json::from_str(arguments).map_err(|e| ToolError::InvalidArguments {
                tool: name.to_string(),
                reason: e.to_string(),
            })?;

        let Some(handler) = self.handlers.get(name) else {
            warn!("Model requested unknown tool '{name}', returning empty result");
            return Ok(ToolResult::empty());
        };

        if !args.is_object() {
            return Err(ToolError::InvalidArguments {
                tool: name.to_string(),
                reason: "arguments must be a JSON object".to_string(),
            });
        }

        debug!("Dispatching tool '{name}'");
        handler.call(args).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::notifier::{NotifyOutcome, Notifier};

    /// Records every message instead of sending it.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub sent: Mutex<Vec<String>>,
        pub outcome: Option<NotifyOutcome>,
    }

    impl RecordingNotifier {
        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                outcome: Some(NotifyOutcome::Failed("connection refused".to_string())),
            }
        }

        pub fn messages(&self) -> Vec<String> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, message: &str) -> NotifyOutcome {
            self.sent.lock().unwrap().push(message.to_string());
            self.outcome.clone().unwrap_or(NotifyOutcome::Sent)
        }
    }
}
