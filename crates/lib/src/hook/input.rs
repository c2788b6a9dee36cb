//! Tool-invocation request as delivered by the hook runtime on stdin.
//!
//! Parsing is lenient: a missing or non-string field reads as "" so every
//! safety check can run without a fallible path.

use serde_json::{Map, Value};

/// Tool names whose `tool_input` carries a `file_path`.
pub const FILE_TOOLS: &[&str] = &["Read", "Edit", "MultiEdit", "Write"];

/// The shell tool; its `tool_input` carries a `command`.
pub const BASH_TOOL: &str = "Bash";

/// One proposed tool call: operation class plus its input mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolInvocationRequest {
    pub tool_name: String,
    pub tool_input: Map<String, Value>,
}

impl ToolInvocationRequest {
    pub fn new(tool_name: impl Into<String>, tool_input: Map<String, Value>) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_input,
        }
    }

    /// Shorthand for a `Bash` request with the given command.
    pub fn bash(command: impl Into<String>) -> Self {
        let mut input = Map::new();
        input.insert("command".to_string(), Value::String(command.into()));
        Self::new(BASH_TOOL, input)
    }

    /// Shorthand for a file-tool request (`Read`, `Write`, ...) on `file_path`.
    pub fn file(tool_name: impl Into<String>, file_path: impl Into<String>) -> Self {
        let mut input = Map::new();
        input.insert("file_path".to_string(), Value::String(file_path.into()));
        Self::new(tool_name, input)
    }

    /// Build from an arbitrary JSON document. Never fails: anything that is not
    /// the expected shape collapses to empty fields.
    pub fn from_value(value: &Value) -> Self {
        let tool_name = value
            .get("tool_name")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();
        let tool_input = value
            .get("tool_input")
            .and_then(|v| v.as_object())
            .cloned()
            .unwrap_or_default();
        Self {
            tool_name,
            tool_input,
        }
    }

    /// String value of `key` in `tool_input`, or "" when absent or not a string.
    pub fn input_str(&self, key: &str) -> &str {
        self.tool_input
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or("")
    }

    pub fn command(&self) -> &str {
        self.input_str("command")
    }

    pub fn file_path(&self) -> &str {
        self.input_str("file_path")
    }

    pub fn is_bash(&self) -> bool {
        self.tool_name == BASH_TOOL
    }

    pub fn is_file_tool(&self) -> bool {
        FILE_TOOLS.contains(&self.tool_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_reads_bash_command() {
        let req = ToolInvocationRequest::from_value(&json!({
            "tool_name": "Bash",
            "tool_input": { "command": "ls -la" }
        }));
        assert!(req.is_bash());
        assert_eq!(req.command(), "ls -la");
        assert_eq!(req.file_path(), "");
    }

    #[test]
    fn missing_and_non_string_fields_read_as_empty() {
        let req = ToolInvocationRequest::from_value(&json!({
            "tool_name": 42,
            "tool_input": { "command": ["rm", "-rf"], "file_path": null }
        }));
        assert_eq!(req.tool_name, "");
        assert_eq!(req.command(), "");
        assert_eq!(req.file_path(), "");

        let req = ToolInvocationRequest::from_value(&json!({ "tool_name": "Read" }));
        assert!(req.is_file_tool());
        assert!(req.tool_input.is_empty());

        let req = ToolInvocationRequest::from_value(&json!("not an object"));
        assert_eq!(req, ToolInvocationRequest::default());
    }

    #[test]
    fn file_tools_are_recognised() {
        for name in ["Read", "Edit", "MultiEdit", "Write"] {
            assert!(ToolInvocationRequest::file(name, "a.txt").is_file_tool());
        }
        assert!(!ToolInvocationRequest::file("Glob", "a.txt").is_file_tool());
        assert!(!ToolInvocationRequest::bash("ls").is_file_tool());
    }
}
