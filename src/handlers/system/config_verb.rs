use crate::engine::EngineFacade;
use crate::error::CoreResult;

/// `"config"`: `args` is `<set|get> <handler_name>`.
pub async fn handle(facade: &EngineFacade, action_id: i64, user_id: i64, args: &str, command_text: &str) -> CoreResult<()> {
    let mut parts = args.split_whitespace();
    let verb = parts.next().unwrap_or_default();
    let handler_name = parts.next().unwrap_or_default();

    match verb {
        "get" => {
            let config = facade.get_action_handler_user_config(handler_name, user_id).await?;
            let pretty = serde_json::to_string_pretty(&config.configuration)
                .unwrap_or_else(|_| config.configuration.to_string());
            facade.append_response_to_action(action_id, "text/plain", Some(&pretty), None).await?;
        }
        "set" => match serde_json::from_str::<serde_json::Value>(command_text) {
            Ok(parsed) => {
                facade.set_action_handler_user_config(handler_name, user_id, &parsed).await?;
                let pretty = serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| parsed.to_string());
                facade.append_response_to_action(action_id, "text/plain", Some(&pretty), None).await?;
            }
            Err(_) => {
                facade
                    .append_response_to_action(
                        action_id,
                        "text/plain",
                        Some("config content MUST be JSON format, please retry!"),
                        None,
                    )
                    .await?;
            }
        },
        _ => {
            facade.append_response_to_action(action_id, "text/plain", Some("wrong syntax"), None).await?;
        }
    }

    Ok(())
}
