//! Prompt: revise_sketch — Edit an existing sketch and re-run it.

use serde_json::Value;

use crate::types::{McpResult, PromptGetResult, PromptMessage};

use super::registry::required_arg;

pub fn expand(args: Value) -> McpResult<PromptGetResult> {
    let name = required_arg(&args, "sketch_name")?;
    let change = required_arg(&args, "change")?;

    let text = format!(
        "Change the sketch `{name}`: {change}\n\n\
         Please:\n\
         1. Read the current code from the sketch://{name} resource\n\
         2. Make the change, keeping everything else intact\n\
         3. Save the full new code with update_sketch (the old version stays in sketch://{name}/backup)\n\
         4. Run it again with run_sketch"
    );

    Ok(PromptGetResult {
        description: format!("Revise sketch {name}"),
        messages: vec![PromptMessage::user(text)],
    })
}
