use serde::{Deserialize, Serialize};
use std::fmt;
use std::process::{ExitCode, ExitStatus};
use std::str::FromStr;

/// One repository as reported by `gh repo list --json name,sshUrl,url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRepo {
    pub name: String,
    #[serde(rename = "sshUrl")]
    pub ssh_url: String,
    pub url: String,
}

impl RemoteRepo {
    pub fn clone_address(&self, protocol: CloneProtocol) -> &str {
        match protocol {
            CloneProtocol::Ssh => &self.ssh_url,
            CloneProtocol::Https => &self.url,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CloneProtocol {
    #[default]
    Ssh,
    Https,
}

impl FromStr for CloneProtocol {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssh" => Ok(CloneProtocol::Ssh),
            "https" => Ok(CloneProtocol::Https),
            other => Err(format!(
                "unknown clone protocol '{other}'; expected: ssh, https"
            )),
        }
    }
}

impl fmt::Display for CloneProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloneProtocol::Ssh => f.write_str("ssh"),
            CloneProtocol::Https => f.write_str("https"),
        }
    }
}

/// Exit status of an external command, reduced to a plain code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(i32);

impl Status {
    pub const SUCCESS: Status = Status(0);

    pub fn from_code(code: i32) -> Self {
        Status(code)
    }

    pub fn code(self) -> i32 {
        self.0
    }

    pub fn success(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit code {}", self.0)
    }
}

impl From<ExitStatus> for Status {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Status(code);
        }
        // Killed by a signal: report it the way a shell would.
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Status(128 + signal);
            }
        }
        Status(1)
    }
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match u8::try_from(status.0) {
            Ok(code) => ExitCode::from(code),
            Err(_) => ExitCode::FAILURE,
        }
    }
}
