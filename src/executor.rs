//! The one place that starts external processes.
//!
//! Handlers describe what to run as an [`Invocation`] or [`Pipeline`] and
//! hand it to an [`Executor`]. [`SystemExecutor`] runs it for real with the
//! terminal's stdio attached; tests swap in a recording executor.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::{Child, ChildStdout, Command};
use tracing::debug;

use crate::error::{DpError, Result};
use crate::types::Status;

/// A single external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_current_dir(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).kill_on_drop(true);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        for (key, value) in &self.envs {
            command.env(key, value);
        }
        command
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.envs {
            write!(f, "{}={} ", key, quote(value))?;
        }
        f.write_str(&quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

/// Single-quotes any word a POSIX shell would not read back verbatim.
fn quote(word: &str) -> String {
    let is_plain = |c: char| c.is_ascii_alphanumeric() || "_@%+=:,./-".contains(c);
    if !word.is_empty() && word.chars().all(is_plain) {
        return word.to_string();
    }
    format!("'{}'", word.replace('\'', r"'\''"))
}

/// One or more invocations connected stdout-to-stdin, like a shell `|`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Invocation>,
}

impl Pipeline {
    pub fn pipe(mut self, next: Invocation) -> Self {
        self.stages.push(next);
        self
    }

    pub fn stages(&self) -> &[Invocation] {
        &self.stages
    }
}

impl From<Invocation> for Pipeline {
    fn from(invocation: Invocation) -> Self {
        Self {
            stages: vec![invocation],
        }
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, stage) in self.stages.iter().enumerate() {
            if index > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{stage}")?;
        }
        Ok(())
    }
}

/// Output of a command whose stdout was captured instead of streamed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub status: Status,
    pub stdout: String,
}

#[allow(async_fn_in_trait)]
pub trait Executor {
    /// Runs `pipeline` with stdin, stdout and stderr attached to the terminal
    /// and waits for every stage. Returns the rightmost non-zero stage status.
    async fn run(&self, pipeline: &Pipeline) -> Result<Status>;

    /// Runs `invocation` with stdout captured; stderr still goes to the terminal.
    async fn capture(&self, invocation: &Invocation) -> Result<Captured>;
}

/// Runs each step in order, stopping at the first non-zero status.
pub async fn run_sequence<E: Executor>(executor: &E, steps: &[Pipeline]) -> Result<Status> {
    for step in steps {
        let status = executor.run(step).await?;
        if !status.success() {
            return Ok(status);
        }
    }
    Ok(Status::SUCCESS)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

impl SystemExecutor {
    fn spawn_stages(pipeline: &Pipeline) -> Result<Vec<Child>> {
        let stages = pipeline.stages();
        let mut children = Vec::with_capacity(stages.len());
        let mut upstream: Option<ChildStdout> = None;

        for (index, stage) in stages.iter().enumerate() {
            let mut command = stage.to_command();
            if let Some(stdout) = upstream.take() {
                let stdin: Stdio = stdout.try_into()?;
                command.stdin(stdin);
            }
            if index + 1 < stages.len() {
                command.stdout(Stdio::piped());
            }
            let mut child = command
                .spawn()
                .map_err(|e| DpError::spawn(stage.program(), e))?;
            upstream = child.stdout.take();
            children.push(child);
        }

        Ok(children)
    }
}

impl Executor for SystemExecutor {
    async fn run(&self, pipeline: &Pipeline) -> Result<Status> {
        debug!("Running {}", pipeline);

        let mut children = Self::spawn_stages(pipeline)?;
        let mut status = Status::SUCCESS;
        for child in children.iter_mut() {
            let stage_status = Status::from(child.wait().await?);
            if !stage_status.success() {
                status = stage_status;
            }
        }

        debug!("{} finished with {}", pipeline, status);
        Ok(status)
    }

    async fn capture(&self, invocation: &Invocation) -> Result<Captured> {
        debug!("Capturing {}", invocation);

        let output = invocation
            .to_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|e| DpError::spawn(invocation.program(), e))?;

        Ok(Captured {
            status: Status::from(output.status),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

/// Prints what would run instead of running it. Captures still go to the
/// wrapped executor since they only read.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunExecutor<E> {
    inner: E,
}

impl<E> DryRunExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }
}

impl<E: Executor> Executor for DryRunExecutor<E> {
    async fn run(&self, pipeline: &Pipeline) -> Result<Status> {
        match pipeline.stages().first().and_then(Invocation::get_current_dir) {
            Some(dir) => println!("[dry-run] (in {}) {}", dir.display(), pipeline),
            None => println!("[dry-run] {}", pipeline),
        }
        Ok(Status::SUCCESS)
    }

    async fn capture(&self, invocation: &Invocation) -> Result<Captured> {
        self.inner.capture(invocation).await
    }
}
