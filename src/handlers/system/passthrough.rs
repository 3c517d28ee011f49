use crate::engine::EngineFacade;
use crate::error::CoreResult;

/// `"html"` / `"markdown"` / `"mermaid"`: append one response chunk with
/// body `command_text` and the verb's fixed mime.
pub async fn handle(facade: &EngineFacade, action_id: i64, verb: &str, command_text: &str) -> CoreResult<()> {
    let mime = match verb {
        "html" => "text/html",
        "markdown" => "text/markdown",
        "mermaid" => "application/x-webcli-mermaid",
        other => unreachable!("passthrough called with non-passthrough verb {other}"),
    };

    facade.append_response_to_action(action_id, mime, Some(command_text), None).await?;
    Ok(())
}
