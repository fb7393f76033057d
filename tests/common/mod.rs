#![allow(dead_code)]

use std::cell::RefCell;

use dp::error::{DpError, Result};
use dp::executor::{Captured, Executor, Invocation, Pipeline};
use dp::types::Status;

/// Records every command line instead of running it. Listing captures answer
/// with `listing`, or report the program as missing when `capture_missing` is
/// set; `run` fails with the given status for lines containing `fail_on`.
#[derive(Default)]
pub struct RecordingExecutor {
    pub listing: Option<Captured>,
    pub capture_missing: bool,
    pub fail_on: Option<(String, Status)>,
    pub runs: RefCell<Vec<String>>,
    pub captures: RefCell<Vec<String>>,
}

impl RecordingExecutor {
    pub fn with_listing(json: &str) -> Self {
        Self {
            listing: Some(Captured {
                status: Status::SUCCESS,
                stdout: json.to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn failing_listing(code: i32) -> Self {
        Self {
            listing: Some(Captured {
                status: Status::from_code(code),
                stdout: String::new(),
            }),
            ..Default::default()
        }
    }

    pub fn missing_lister() -> Self {
        Self {
            capture_missing: true,
            ..Default::default()
        }
    }

    pub fn fail_on(mut self, needle: &str, code: i32) -> Self {
        self.fail_on = Some((needle.to_string(), Status::from_code(code)));
        self
    }

    pub fn runs(&self) -> Vec<String> {
        self.runs.borrow().clone()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.runs
            .borrow()
            .iter()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl Executor for RecordingExecutor {
    async fn run(&self, pipeline: &Pipeline) -> Result<Status> {
        let line = pipeline.to_string();
        self.runs.borrow_mut().push(line.clone());
        match &self.fail_on {
            Some((needle, status)) if line.contains(needle.as_str()) => Ok(*status),
            _ => Ok(Status::SUCCESS),
        }
    }

    async fn capture(&self, invocation: &Invocation) -> Result<Captured> {
        self.captures.borrow_mut().push(invocation.to_string());
        if self.capture_missing {
            return Err(DpError::ToolNotFound {
                program: invocation.program().to_string(),
                hint: "install it or add it to PATH",
            });
        }
        Ok(self.listing.clone().unwrap_or(Captured {
            status: Status::SUCCESS,
            stdout: "[]".to_string(),
        }))
    }
}

pub fn repo_json(names: &[&str]) -> String {
    let entries: Vec<String> = names
        .iter()
        .map(|name| {
            format!(
                r#"{{"name":"{name}","sshUrl":"git@github.com:acme/{name}.git","url":"https://github.com/acme/{name}"}}"#
            )
        })
        .collect();
    format!("[{}]", entries.join(","))
}
