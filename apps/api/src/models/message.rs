use serde::{Deserialize, Serialize};

/// Speaker of a message in the transcript replayed to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

/// A tool invocation requested by the completion endpoint.
/// Only ever constructed when decoding a completion response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// JSON object serialized as text, exactly as the model produced it.
    pub arguments: String,
}

/// One entry of the transcript. Order is significant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
}

impl ChatMessage {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_call_id: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// Assistant turn that asks for tools, replayed verbatim on the next request.
    pub fn assistant_tool_calls(content: impl Into<String>, calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls: calls,
            ..Self::plain(Role::Assistant, content)
        }
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::plain(Role::Tool, content)
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// A prior turn as sent by the chat widget. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

impl HistoryEntry {
    /// Only user and assistant turns may be replayed from the client.
    pub fn into_message(self) -> Option<ChatMessage> {
        match self.role {
            Role::User => Some(ChatMessage::user(self.content)),
            Role::Assistant => Some(ChatMessage::assistant(self.content)),
            Role::System | Role::Tool => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_entry_ignores_widget_metadata() {
        let json = serde_json::json!({
            "role": "assistant",
            "content": "Hi there",
            "metadata": {"title": null}
        });
        let entry: HistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(entry.into_message(), Some(ChatMessage::assistant("Hi there")));
    }

    #[test]
    fn test_history_entry_rejects_system_role() {
        let entry: HistoryEntry =
            serde_json::from_value(serde_json::json!({"role": "system", "content": "x"})).unwrap();
        assert!(entry.into_message().is_none());
    }

    #[test]
    fn test_unknown_role_fails_deserialization() {
        let result: Result<HistoryEntry, _> =
            serde_json::from_value(serde_json::json!({"role": "moderator", "content": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_tool_message_carries_call_id() {
        let msg = ChatMessage::tool("call_1", r#"{"status":"recorded"}"#);
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert!(!msg.has_tool_calls());
    }
}
