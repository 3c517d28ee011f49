use std::path::Path;

use crate::engine::EngineFacade;
use crate::error::CoreResult;

use super::interpreter::{resolve_under, InterpreterSessions};

#[derive(Debug, Default, PartialEq, Eq)]
struct PythonArgs {
    load: Option<String>,
    save: Option<String>,
    print_loaded: bool,
}

fn parse_args(args: &str) -> Result<PythonArgs, &'static str> {
    let mut parsed = PythonArgs::default();
    let mut tokens = args.split_whitespace();

    while let Some(token) = tokens.next() {
        match token {
            "--load" => parsed.load = Some(tokens.next().ok_or("wrong syntax")?.to_string()),
            "--save" => parsed.save = Some(tokens.next().ok_or("wrong syntax")?.to_string()),
            "--print" => parsed.print_loaded = true,
            _ => return Err("wrong syntax"),
        }
    }

    if parsed.load.is_some() && parsed.save.is_some() {
        return Err("wrong syntax");
    }

    Ok(parsed)
}

/// `"python"`: `--load`/`--save`/`--print` flag handling, per-user
/// persistent evaluation, captured stdout/stderr.
pub async fn handle(
    facade: &EngineFacade,
    sessions: &InterpreterSessions,
    users_home_dir: &Path,
    action_id: i64,
    user_id: i64,
    args: &str,
    command_text: &str,
) -> CoreResult<()> {
    let parsed = match parse_args(args) {
        Ok(parsed) => parsed,
        Err(message) => {
            facade.append_response_to_action(action_id, "text/plain", Some(message), None).await?;
            return Ok(());
        }
    };

    let home_dir = users_home_dir.join(user_id.to_string());

    if let Some(save_path) = &parsed.save {
        let resolved = match resolve_under(&home_dir, save_path) {
            Ok(path) => path,
            Err(err) => {
                facade.append_response_to_action(action_id, "text/plain", Some(&err.to_string()), None).await?;
                return Ok(());
            }
        };
        if let Some(parent) = resolved.parent() {
            let _ = tokio::fs::create_dir_all(parent).await;
        }
        tokio::fs::write(&resolved, command_text)
            .await
            .map_err(|e| crate::error::CoreError::Other(anyhow::anyhow!("failed to save {}: {e}", resolved.display())))?;
        return Ok(());
    }

    let mut source = String::new();
    if let Some(load_path) = &parsed.load {
        let resolved = match resolve_under(&home_dir, load_path) {
            Ok(path) => path,
            Err(err) => {
                facade.append_response_to_action(action_id, "text/plain", Some(&err.to_string()), None).await?;
                return Ok(());
            }
        };

        let loaded = tokio::fs::read_to_string(&resolved).await.unwrap_or_default();

        if parsed.print_loaded {
            facade.append_response_to_action(action_id, "text/plain", Some(&loaded), None).await?;
        }

        source.push_str(&loaded);
    }
    source.push_str(command_text);

    let outcome = sessions.evaluate(user_id, users_home_dir, &source);

    match outcome {
        Ok(outcome) => {
            for print in outcome.prints {
                facade.append_response_to_action(action_id, &print.mime, Some(&print.content), None).await?;
            }
            if !outcome.captured_output.is_empty() {
                facade
                    .append_response_to_action(action_id, "text/plain", Some(outcome.captured_output.trim_end()), None)
                    .await?;
            }
        }
        Err(message) => {
            facade.append_response_to_action(action_id, "text/plain", Some(&message), None).await?;
        }
    }

    Ok(())
}
