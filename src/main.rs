mod autosave;
mod backup;
mod catalog;
mod ipc;
mod storage;
mod store;

use std::io::{self, BufRead, Write};

fn main() {
    // Keep this binary dependency-light for now. Use simple error mapping.
    let catalog = match catalog::Catalog::load() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("vlabsd: {e:?}");
            std::process::exit(1);
        }
    };

    let mut state = ipc::AppState {
        catalog,
        workspace: None,
        store: None,
    };

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
                // Can't reply without id; ignore.
                let _ = writeln!(
                    stdout,
                    "{{\"ok\":false,\"error\":{{\"code\":\"bad_json\",\"message\":\"{}\"}}}}",
                    e
                );
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

    // EOF is session teardown: a pending notebook draft is stale content
    // from a view that no longer exists, so drop it unwritten.
    if let Some(store) = state.store.as_mut() {
        store.close_notebook();
    }
}
