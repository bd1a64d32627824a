//! Tool capability interface.
//!
//! A [`Tool`] is a named function the execution engine may invoke zero or
//! more times while working on a stage, with no ordering guarantee across
//! calls. Implementations never fail: any internal error is embedded in the
//! returned string so the model receives it as data.

use std::sync::Arc;

use async_trait::async_trait;

/// A capability the model can invoke during stage execution.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Wire name of the tool (what the model calls).
    fn name(&self) -> &str;

    /// One-line description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema of the tool's arguments object.
    fn parameters(&self) -> serde_json::Value;

    /// Invoke the tool. Errors are returned as displayable payloads, never
    /// raised.
    async fn call(&self, args: serde_json::Value) -> String;
}

/// Render a tool in the OpenAI-compatible function definition format.
pub fn tool_definition(tool: &dyn Tool) -> serde_json::Value {
    serde_json::json!({
        "type": "function",
        "function": {
            "name": tool.name(),
            "description": tool.description(),
            "parameters": tool.parameters(),
        }
    })
}

/// Find a tool by wire name.
pub fn find_tool<'a>(tools: &'a [Arc<dyn Tool>], name: &str) -> Option<&'a Arc<dyn Tool>> {
    tools.iter().find(|t| t.name() == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input back"
        }

        fn parameters(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {"text": {"type": "string"}},
                "required": ["text"]
            })
        }

        async fn call(&self, args: serde_json::Value) -> String {
            args["text"].as_str().unwrap_or_default().to_string()
        }
    }

    #[test]
    fn definition_renders_function_shape() {
        let def = tool_definition(&EchoTool);
        assert_eq!(def["type"], "function");
        assert_eq!(def["function"]["name"], "echo");
        assert_eq!(def["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn find_tool_by_name() {
        let tools: Vec<Arc<dyn Tool>> = vec![Arc::new(EchoTool)];
        assert!(find_tool(&tools, "echo").is_some());
        assert!(find_tool(&tools, "missing").is_none());
    }
}
