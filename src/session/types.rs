//! Conversation types for Hermes
//!
//! This module defines the message model shared by memory, providers and
//! the inference loop: messages, roles and tool calls.

use serde::{Deserialize, Serialize};

/// A single message in a conversation.
///
/// Messages can come from users, assistants, system prompts, tool results,
/// or a synthesized summary of earlier turns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// The role of the message sender
    pub role: Role,
    /// The text content of the message
    #[serde(default)]
    pub content: String,
    /// Tool calls made by the assistant (if any)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    /// ID of the tool call this message is responding to (for tool results)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn with_role(role: Role, content: &str) -> Self {
        Self {
            role,
            content: content.to_string(),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Create a new user message.
    ///
    /// # Example
    /// ```
    /// use hermes::session::{Message, Role};
    ///
    /// let msg = Message::user("Hello, assistant!");
    /// assert_eq!(msg.role, Role::User);
    /// ```
    pub fn user(content: &str) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: &str) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create a new system message.
    ///
    /// System messages carry the rendered agent prompt.
    pub fn system(content: &str) -> Self {
        Self::with_role(Role::System, content)
    }

    /// Create a summary message.
    ///
    /// A summary stands in for a collapsed prefix of the conversation. It is
    /// stored with its own role so memory can tell it apart from the caller's
    /// turns, and is sent to providers as a system message.
    ///
    /// # Example
    /// ```
    /// use hermes::session::{Message, Role};
    ///
    /// let msg = Message::summary("The user asked about rates.");
    /// assert_eq!(msg.role, Role::Summary);
    /// assert!(msg.is_summary());
    /// ```
    pub fn summary(content: &str) -> Self {
        Self::with_role(Role::Summary, content)
    }

    /// Create a new tool result message.
    ///
    /// # Arguments
    /// * `tool_call_id` - The ID of the tool call this is responding to
    /// * `content` - The result content from the tool
    ///
    /// # Example
    /// ```
    /// use hermes::session::{Message, Role};
    ///
    /// let msg = Message::tool_result("call_123", "42");
    /// assert_eq!(msg.role, Role::Tool);
    /// assert_eq!(msg.tool_call_id, Some("call_123".to_string()));
    /// ```
    pub fn tool_result(tool_call_id: &str, content: &str) -> Self {
        Self {
            role: Role::Tool,
            content: content.to_string(),
            tool_calls: None,
            tool_call_id: Some(tool_call_id.to_string()),
        }
    }

    /// Create an assistant message with tool calls.
    pub fn assistant_with_tools(content: &str, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.to_string(),
            tool_calls: Some(tool_calls),
            tool_call_id: None,
        }
    }

    /// Check if this message has tool calls.
    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls
            .as_ref()
            .map(|tc| !tc.is_empty())
            .unwrap_or(false)
    }

    /// Check if this message is a synthesized summary.
    pub fn is_summary(&self) -> bool {
        self.role == Role::Summary
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System prompts and instructions
    System,
    /// Messages from the user
    User,
    /// Messages from the AI assistant
    Assistant,
    /// Results from tool executions
    Tool,
    /// Condensed stand-in for older turns
    Summary,
}

impl Role {
    /// The role name used on the provider wire.
    ///
    /// Summaries have no wire role of their own and travel as `system`.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::System | Role::Summary => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
            Role::Summary => write!(f, "summary"),
        }
    }
}

/// A tool call made by the assistant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool to call
    pub name: String,
    /// JSON-encoded arguments for the tool
    pub arguments: String,
}

impl ToolCall {
    /// Create a new tool call.
    ///
    /// # Example
    /// ```
    /// use hermes::session::ToolCall;
    ///
    /// let call = ToolCall::new("call_1", "consult_analyst", r#"{"query": "rates"}"#);
    /// assert_eq!(call.name, "consult_analyst");
    /// ```
    pub fn new(id: &str, name: &str, arguments: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert_eq!(Message::user("a").role, Role::User);
        assert_eq!(Message::assistant("a").role, Role::Assistant);
        assert_eq!(Message::system("a").role, Role::System);
        assert_eq!(Message::summary("a").role, Role::Summary);
        assert!(Message::user("a").tool_calls.is_none());
    }

    #[test]
    fn test_message_tool_result() {
        let msg = Message::tool_result("call_123", "Success");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.content, "Success");
        assert_eq!(msg.tool_call_id, Some("call_123".to_string()));
    }

    #[test]
    fn test_message_has_tool_calls() {
        let call = ToolCall::new("1", "t", "{}");
        assert!(Message::assistant_with_tools("", vec![call]).has_tool_calls());
        assert!(!Message::assistant_with_tools("", vec![]).has_tool_calls());
        assert!(!Message::assistant("x").has_tool_calls());
    }

    #[test]
    fn test_role_wire_name() {
        assert_eq!(Role::Summary.wire_name(), "system");
        assert_eq!(Role::System.wire_name(), "system");
        assert_eq!(Role::User.wire_name(), "user");
        assert_eq!(Role::Tool.wire_name(), "tool");
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Summary.to_string(), "summary");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }

    #[test]
    fn test_history_deserializes_without_optional_fields() {
        let json = r#"[{"role":"user","content":"hi"},{"role":"assistant","content":"hello"}]"#;
        let history: Vec<Message> = serde_json::from_str(json).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, Role::Assistant);
        assert!(history[0].tool_call_id.is_none());
    }

    #[test]
    fn test_summary_serialization() {
        let json = serde_json::to_string(&Message::summary("s")).unwrap();
        assert!(json.contains(r#""role":"summary""#));
        assert!(!json.contains("tool_calls"));
    }
}
