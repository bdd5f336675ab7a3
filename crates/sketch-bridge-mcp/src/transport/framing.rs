//! Newline-delimited JSON framing.

use serde_json::Value;

use crate::types::{JsonRpcMessage, McpError, McpResult, RequestId};

/// Parse one line as a JSON-RPC message.
pub fn parse_message(line: &str) -> McpResult<JsonRpcMessage> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(McpError::ParseError("Empty message".to_string()));
    }

    serde_json::from_str(trimmed).map_err(|e| McpError::ParseError(e.to_string()))
}

/// Serialize a value to one JSON line, newline included.
pub fn frame_message(value: &Value) -> McpResult<String> {
    let mut json = serde_json::to_string(value).map_err(McpError::Json)?;
    json.push('\n');
    Ok(json)
}

/// Error reply for a line that could not be parsed; the id is unknown.
pub fn parse_error_response(err: &McpError) -> Value {
    err.to_json_rpc_error(RequestId::Null).into_value()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_is_single_line() {
        let framed = frame_message(&serde_json::json!({ "text": "a\nb" })).unwrap();
        assert!(framed.ends_with('\n'));
        assert_eq!(framed.matches('\n').count(), 1);
    }

    #[test]
    fn test_parse_error_response_has_null_id() {
        let err = parse_message("{oops").unwrap_err();
        let v = parse_error_response(&err);
        assert_eq!(v["id"], Value::Null);
        assert_eq!(v["error"]["code"], -32700);
    }
}
