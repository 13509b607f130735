mod calc;
mod config;
mod db;
mod ipc;
mod model;
mod schedule;
mod store;

use std::io::{self, BufRead, Write};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(filter: &str) {
    // stdout carries IPC responses only.
    let env_filter = EnvFilter::try_new(filter)
        .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cfg = config::Config::from_env();
    init_tracing(&cfg.log_filter);
    info!(version = env!("CARGO_PKG_VERSION"), "collegeguided starting");

    let mut state = ipc::AppState::default();
    if let Some(path) = cfg.workspace.as_deref() {
        if let Err(e) = state.open_workspace(path) {
            warn!(workspace = %path.display(), error = %format!("{e:#}"), "startup workspace not opened");
        }
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                warn!(error = %e, "unparseable request line");
                let resp = serde_json::json!({
                    "ok": false,
                    "error": { "code": "bad_json", "message": e.to_string() }
                });
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    info!("stdin closed, exiting");
}
