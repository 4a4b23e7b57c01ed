use crate::Tool;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Lines of tool output kept on failure. xelatex prints the offending line near the end.
const LOG_TAIL_LINES: usize = 20;

/// One external command, fully described: which binary, which arguments, which directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tool: Tool,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub workdir: PathBuf,
}

impl Invocation {
    pub fn new(tool: Tool, program: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            tool,
            program: program.into(),
            args: Vec::new(),
            workdir: workdir.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn path_arg(self, path: &Path) -> Self {
        self.arg(path.as_os_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolFailure {
    #[error("failed to spawn: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("exited with {}{}", fmt_code(.code), fmt_log(.log))]
    Exit { code: Option<i32>, log: String },
}

fn fmt_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

fn fmt_log(log: &str) -> String {
    if log.is_empty() {
        String::new()
    } else {
        format!("\n{log}")
    }
}

/// Runs [`Invocation`]s. Implemented by [`ProcessRunner`] for real work and by fakes in tests.
pub trait ToolRunner: Send + Sync {
    fn run(&self, invocation: &Invocation) -> Result<(), ToolFailure>;
}

/// Spawns the binary and waits for it. Stdin is closed so a TeX error can never block on a
/// prompt; `-halt-on-error` covers the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<(), ToolFailure> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(ToolFailure::Spawn)?;

        if output.status.success() {
            return Ok(());
        }

        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(ToolFailure::Exit {
            code: output.status.code(),
            log: log_tail(&log, LOG_TAIL_LINES),
        })
    }
}

fn log_tail(log: &str, n: usize) -> String {
    let lines: Vec<&str> = log.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}
