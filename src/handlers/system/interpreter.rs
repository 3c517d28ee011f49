//! Per-user persistent code-evaluation sessions.
//!
//! `rhai`, a pure-Rust embeddable scripting engine, stands in for an
//! embedded interpreter: its [`rhai::Scope`] natively persists variable
//! bindings across evaluations, which is the module-level state a
//! per-user session needs. The `rhai::Engine` itself is rebuilt fresh per
//! evaluation rather than shared, so that `cli_print`/`cli_open` can close
//! over an invocation context specific to this call; this costs nothing
//! the scope doesn't already pay for, since the bindings — not the engine
//! — are what must survive between calls.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct PendingPrint {
    pub mime: String,
    pub content: String,
}

#[derive(Debug, Default)]
pub struct EvalOutcome {
    pub prints: Vec<PendingPrint>,
    pub captured_output: String,
}

/// `user_id -> session` map, protected by a single mutex.
/// Locking a session's own mutex for the duration of an evaluation
/// serializes concurrent evaluations for the *same* user while leaving
/// different users free to run in parallel.
pub struct InterpreterSessions {
    sessions: Mutex<HashMap<i64, Arc<Mutex<rhai::Scope<'static>>>>>,
}

impl InterpreterSessions {
    pub fn new() -> Self {
        Self { sessions: Mutex::new(HashMap::new()) }
    }

    fn scope_for(&self, user_id: i64) -> Arc<Mutex<rhai::Scope<'static>>> {
        let mut sessions = self.sessions.lock().expect("interpreter session map poisoned");
        sessions.entry(user_id).or_insert_with(|| Arc::new(Mutex::new(rhai::Scope::new()))).clone()
    }

    /// Clears a user's session, reverting them to a fresh module-level
    /// state on their next evaluation. Not reachable from any request
    /// path; exposed for shutdown/testing.
    pub fn clear(&self, user_id: i64) {
        self.sessions.lock().expect("interpreter session map poisoned").remove(&user_id);
    }

    /// Evaluates `source` against the user's persistent scope and returns
    /// whatever `cli_print` calls queued plus captured stdout/stderr.
    ///
    /// Bare `name = value;` assignments (valid in the original's Python
    /// front end, invalid in Rhai without `let`) are desugared to
    /// `let name = value;` the first time `name` is seen in this user's
    /// scope, so that evaluation history written the Python way still
    /// runs unmodified.
    pub fn evaluate(&self, user_id: i64, users_home_dir: &Path, source: &str) -> Result<EvalOutcome, String> {
        let scope_handle = self.scope_for(user_id);
        let mut scope = scope_handle.lock().expect("per-user scope poisoned");

        let prints: Arc<Mutex<Vec<PendingPrint>>> = Arc::new(Mutex::new(Vec::new()));
        let output: Arc<Mutex<String>> = Arc::new(Mutex::new(String::new()));
        let home_dir = users_home_dir.join(user_id.to_string());

        let mut engine = build_engine(&prints, &output, &home_dir);

        let source = desugar_bare_assignments(source, &scope);
        let result = engine.eval_with_scope::<rhai::Dynamic>(&mut scope, &source);
        drop(engine);

        let prints = std::mem::take(&mut *prints.lock().expect("prints buffer poisoned"));
        let captured_output = std::mem::take(&mut *output.lock().expect("output buffer poisoned"));

        match result {
            Ok(_) => Ok(EvalOutcome { prints, captured_output }),
            Err(err) => Err(err.to_string()),
        }
    }
}

impl Default for InterpreterSessions {
    fn default() -> Self {
        Self::new()
    }
}

fn build_engine(
    prints: &Arc<Mutex<Vec<PendingPrint>>>,
    output: &Arc<Mutex<String>>,
    home_dir: &Path,
) -> rhai::Engine {
    let mut engine = rhai::Engine::new();

    let prints_with_mime = prints.clone();
    engine.register_fn("cli_print", move |content: rhai::Dynamic, mime: &str| {
        prints_with_mime.lock().expect("prints buffer poisoned").push(PendingPrint {
            mime: mime.to_string(),
            content: normalize_body(content),
        });
    });

    let prints_default_mime = prints.clone();
    engine.register_fn("cli_print", move |content: rhai::Dynamic| {
        prints_default_mime.lock().expect("prints buffer poisoned").push(PendingPrint {
            mime: "text/html".to_string(),
            content: normalize_body(content),
        });
    });

    let home_for_open = home_dir.to_path_buf();
    engine.register_fn("cli_open", move |path: &str| -> Result<String, Box<rhai::EvalAltResult>> {
        let resolved = resolve_under(&home_for_open, path)?;
        std::fs::read_to_string(&resolved)
            .map_err(|e| format!("cli_open: failed to read {}: {e}", resolved.display()).into())
    });

    engine.register_fn("create_ai_agent", |_name: &str| -> String {
        "AI agents are not available in this deployment".to_string()
    });

    // `str(...)`: the original's Python built-in, not a Rhai built-in.
    engine.register_fn("str", |v: i64| v.to_string());
    engine.register_fn("str", |v: f64| v.to_string());
    engine.register_fn("str", |v: bool| v.to_string());
    engine.register_fn("str", |v: char| v.to_string());
    engine.register_fn("str", |v: String| v);

    let output_for_print = output.clone();
    engine.on_print(move |s| {
        let mut buf = output_for_print.lock().expect("output buffer poisoned");
        buf.push_str(s);
        buf.push('\n');
    });

    let output_for_debug = output.clone();
    engine.on_debug(move |s, _src, _pos| {
        let mut buf = output_for_debug.lock().expect("output buffer poisoned");
        buf.push_str(s);
        buf.push('\n');
    });

    engine
}

/// Rewrites top-level `name = value;` statements to `let name = value;`
/// when `name` isn't already bound in `scope`, leaving everything else
/// (including genuine re-assignments and `==` comparisons) untouched.
/// Naive statement splitting on `;` is sufficient for the single-statement
/// assignments this front end needs to accept; it does not attempt to
/// parse strings, blocks, or closures containing semicolons.
fn desugar_bare_assignments(source: &str, scope: &rhai::Scope) -> String {
    source
        .split(';')
        .map(|stmt| match bare_assignment_target(stmt) {
            Some(ident) if !scope.contains(&ident) => {
                let indent = stmt.len() - stmt.trim_start().len();
                format!("{}let {}", &stmt[..indent], stmt.trim_start())
            }
            _ => stmt.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

const RHAI_KEYWORDS: &[&str] =
    &["let", "const", "if", "else", "while", "loop", "for", "fn", "return", "true", "false", "break", "continue"];

fn bare_assignment_target(stmt: &str) -> Option<String> {
    let trimmed = stmt.trim_start();
    let ident_len = trimmed.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))?;
    if ident_len == 0 || trimmed.as_bytes()[0].is_ascii_digit() {
        return None;
    }
    let ident = &trimmed[..ident_len];
    if RHAI_KEYWORDS.contains(&ident) {
        return None;
    }

    let mut rest = trimmed[ident_len..].chars();
    match rest.next() {
        Some('=') => match rest.next() {
            Some('=') => None,
            _ => Some(ident.to_string()),
        },
        _ => None,
    }
}

fn normalize_body(content: rhai::Dynamic) -> String {
    if let Some(s) = content.clone().try_cast::<String>() {
        return s;
    }
    if let Some(bytes) = content.clone().try_cast::<rhai::Blob>() {
        return String::from_utf8_lossy(&bytes).into_owned();
    }
    if content.is_map() {
        if let Ok(value) = rhai::serde::from_dynamic::<serde_json::Value>(&content) {
            return value.to_string();
        }
    }
    content.to_string()
}

/// Rejects absolute paths and any path escaping `home_dir`.
pub fn resolve_under(home_dir: &Path, requested: &str) -> Result<PathBuf, Box<rhai::EvalAltResult>> {
    if requested.starts_with('/') {
        return Err(format!("path '{requested}' must not be absolute").into());
    }

    let candidate = home_dir.join(requested);
    let normalized = normalize_path(&candidate);

    if !normalized.starts_with(home_dir) {
        return Err(format!("path '{requested}' escapes the user's home directory").into());
    }

    Ok(normalized)
}

/// Lexical `..`/`.` resolution without touching the filesystem (the path
/// may not exist yet, e.g. on `--save`).
fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other),
        }
    }
    out
}
