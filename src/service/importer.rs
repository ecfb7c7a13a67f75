use std::{
    env,
    path::{Path, PathBuf},
    process::Stdio,
};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::config::ImporterConfig;

pub const SCRIPT_NAME: &str = "addEvents.py";
/// Shell convention for "command not found".
pub const NOT_FOUND_EXIT_CODE: i32 = 127;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ImportResult {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}

/// Places the scraper script is looked for, in probing order.
pub fn candidate_paths(config: &ImporterConfig, cwd: &Path, exe_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(script) = &config.script {
        candidates.push(script.clone());
    }
    candidates.push(cwd.join(SCRIPT_NAME));
    candidates.push(cwd.join("backend").join(SCRIPT_NAME));
    if let Some(dir) = exe_dir {
        candidates.push(dir.join("..").join(SCRIPT_NAME));
        candidates.push(dir.join(SCRIPT_NAME));
    }
    candidates
}

pub fn find_script(candidates: &[PathBuf]) -> Option<&PathBuf> {
    candidates.iter().find(|p| p.is_file())
}

/// Splits e.g. `npx python` into the program and its leading arguments.
pub fn split_command(cmd: &str) -> Option<(String, Vec<String>)> {
    let mut parts = cmd.split_whitespace().map(str::to_string);
    let program = parts.next()?;
    Some((program, parts.collect()))
}

/// Runs `program args...` to completion with the inherited environment and
/// captures its output. There is no timeout.
pub async fn run_process(program: &str, args: &[String], cwd: &Path) -> ImportResult {
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await;

    match output {
        Ok(output) => ImportResult {
            // killed by a signal
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        },
        Err(err) => ImportResult {
            exit_code: NOT_FOUND_EXIT_CODE,
            stdout: String::new(),
            stderr: format!("\nfailed to start '{program}': {err}"),
        },
    }
}

/// Finds the scraper and runs it with the configured interpreter.
pub async fn run_import(config: &ImporterConfig) -> ImportResult {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let candidates = candidate_paths(config, &cwd, exe_dir.as_deref());

    let script = match find_script(&candidates) {
        Some(script) => script.clone(),
        None => {
            let checked: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
            warn!("{} not found", SCRIPT_NAME);
            return ImportResult {
                exit_code: NOT_FOUND_EXIT_CODE,
                stdout: String::new(),
                stderr: format!("{} not found. Checked:\n{}", SCRIPT_NAME, checked.join("\n")),
            };
        }
    };

    let (program, mut args) = match split_command(&config.python_cmd) {
        Some(parts) => parts,
        None => {
            return ImportResult {
                exit_code: NOT_FOUND_EXIT_CODE,
                stdout: String::new(),
                stderr: "PYTHON_CMD is empty".to_string(),
            }
        }
    };
    args.push(script.display().to_string());

    info!("running import: {} {}", program, args.join(" "));
    let result = run_process(&program, &args, &cwd).await;
    if result.succeeded() {
        info!("import finished");
    } else {
        warn!("import exited with code {}", result.exit_code);
    }
    result
}
