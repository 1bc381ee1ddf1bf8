//! Multiplexed log tail across all running containers
//!
//! One `docker logs --follow` child per running container, each streamed
//! by its own thread with a color-coded name prefix. A single Ctrl-C
//! kills the whole group; otherwise the tails are joined when every
//! child ends.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;

use crate::command::{CommandBuilder, ExecMode, RunMode};
use crate::error::{DockhandError, Result};

/// Tail the logs of every running container at once. In dry-run mode
/// only the container-listing probe is rendered; nothing is spawned.
pub fn tail_all(exec: ExecMode) -> Result<String> {
    let mut probe = CommandBuilder::new("docker");
    probe.args(["ps", "--format", "{{.Names}}"]);
    if exec == ExecMode::DryRun {
        return probe.run(exec, RunMode::Capture);
    }

    let listing = probe.run(exec, RunMode::Capture)?;
    let names: Vec<String> = listing
        .lines()
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();
    if names.is_empty() {
        return Ok(String::new());
    }

    let children: Arc<Mutex<Vec<Child>>> = Arc::new(Mutex::new(Vec::new()));
    let children_for_handler = Arc::clone(&children);
    ctrlc::set_handler(move || {
        eprintln!("Interrupted.");
        for child in children_for_handler.lock().unwrap().iter_mut() {
            let _ = child.kill();
        }
    })
    .map_err(|e| {
        DockhandError::InvalidInput(format!("Could not install interrupt handler: {}", e))
    })?;

    let mut streams = Vec::new();
    for name in names {
        let mut child = Command::new("docker")
            .args(["logs", "--follow", name.as_str()])
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;
        let stdout = child.stdout.take();
        children.lock().unwrap().push(child);
        streams.push(thread::spawn(move || stream_lines(&name, stdout)));
    }

    for stream in streams {
        let _ = stream.join();
    }
    for child in children.lock().unwrap().iter_mut() {
        let _ = child.wait();
    }
    Ok(String::new())
}

fn stream_lines(name: &str, stdout: Option<ChildStdout>) {
    let Some(stdout) = stdout else { return };
    let prefix = colored_prefix(name);
    for line in BufReader::new(stdout).lines() {
        match line {
            Ok(line) => println!("{}{}", prefix, line),
            Err(_) => break,
        }
    }
}

/// `NAME | ` in an ANSI color picked by hashing the container name, so a
/// container keeps its color across invocations.
fn colored_prefix(name: &str) -> String {
    format!("\x1b[1;{}m{} | \x1b[0;00m", color_code(name), name)
}

fn color_code(name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    31 + hasher.finish() % 7
}
