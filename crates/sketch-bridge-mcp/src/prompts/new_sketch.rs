//! Prompt: new_sketch — Write a new sketch from an idea and run it.

use serde_json::Value;

use crate::types::{McpResult, PromptGetResult, PromptMessage};

use super::registry::required_arg;

pub fn expand(args: Value) -> McpResult<PromptGetResult> {
    let idea = required_arg(&args, "idea")?;
    let name_hint = match args.get("sketch_name").and_then(|v| v.as_str()) {
        Some(name) if !name.is_empty() => format!("Save it as `{name}`."),
        _ => "Pick a short snake_case name for it.".to_string(),
    };

    let text = format!(
        "I want a Processing sketch: {idea}\n\
         {name_hint}\n\n\
         Please:\n\
         1. Call list_sketches so you do not reuse an existing name by accident\n\
         2. Write complete Processing code with setup() and draw()\n\
         3. Save it with create_sketch\n\
         4. Launch it with run_sketch and report any error output it returns"
    );

    Ok(PromptGetResult {
        description: "Create and run a new sketch".to_string(),
        messages: vec![PromptMessage::user(text)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_requires_idea() {
        assert!(expand(json!({})).is_err());
        let result = expand(json!({ "idea": "bouncing balls", "sketch_name": "balls" })).unwrap();
        let text = &result.messages[0].content.text;
        assert!(text.contains("bouncing balls"));
        assert!(text.contains("`balls`"));
    }
}
