// Copyright 2025 Lablup Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::io;

/// Error type for SFTP action execution.
///
/// Connection-class variants abort the whole batch and are never retried.
/// `Remote` is the only class the continue-on-error policy may tolerate.
#[derive(Debug)]
pub enum SftpError {
    /// Invalid or incomplete configuration, detected before any connection attempt
    Config(String),
    /// SSH error from russh
    Ssh(russh::Error),
    /// Connection attempt exceeded the timeout (seconds)
    ConnectTimeout(u64),
    /// Wrong password
    PasswordWrong,
    /// Key authentication failed
    KeyAuthFailed,
    /// Invalid key
    KeyInvalid(russh_keys::Error),
    /// Host key verification failed
    ServerCheckFailed,
    /// Failed to open or initialize the SFTP channel
    Channel(String),
    /// A single remote file operation failed
    Remote { path: String, cause: RemoteCause },
}

/// Underlying cause of a per-target operation failure
#[derive(Debug)]
pub enum RemoteCause {
    Io(io::Error),
    Sftp(russh_sftp::client::error::Error),
    Other(String),
}

impl SftpError {
    pub fn config(msg: impl Into<String>) -> Self {
        SftpError::Config(msg.into())
    }

    pub fn channel(msg: impl Into<String>) -> Self {
        SftpError::Channel(msg.into())
    }

    pub fn remote(path: impl fmt::Display, cause: impl Into<RemoteCause>) -> Self {
        SftpError::Remote {
            path: path.to_string(),
            cause: cause.into(),
        }
    }

    /// True for per-target operation failures, the class the
    /// continue-on-error policy applies to
    pub fn is_remote(&self) -> bool {
        matches!(self, SftpError::Remote { .. })
    }
}

impl fmt::Display for SftpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SftpError::Config(msg) => write!(f, "Configuration error: {msg}"),
            SftpError::Ssh(e) => write!(f, "SSH error: {e}"),
            SftpError::ConnectTimeout(secs) => {
                write!(f, "Connection timeout after {secs} seconds")
            }
            SftpError::PasswordWrong => write!(f, "Password authentication failed"),
            SftpError::KeyAuthFailed => {
                write!(f, "The private key was rejected by the server")
            }
            SftpError::KeyInvalid(e) => write!(f, "Invalid key: {e}"),
            SftpError::ServerCheckFailed => write!(f, "Host key verification failed"),
            SftpError::Channel(msg) => write!(f, "SFTP channel error: {msg}"),
            SftpError::Remote { path, cause } => {
                write!(f, "Remote operation failed for {path}: {cause}")
            }
        }
    }
}

impl fmt::Display for RemoteCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteCause::Io(e) => write!(f, "{e}"),
            RemoteCause::Sftp(e) => write!(f, "{e:?}"),
            RemoteCause::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for SftpError {}

impl From<russh::Error> for SftpError {
    fn from(e: russh::Error) -> Self {
        SftpError::Ssh(e)
    }
}

impl From<russh_keys::Error> for SftpError {
    fn from(e: russh_keys::Error) -> Self {
        SftpError::KeyInvalid(e)
    }
}

impl From<io::Error> for RemoteCause {
    fn from(e: io::Error) -> Self {
        RemoteCause::Io(e)
    }
}

impl From<russh_sftp::client::error::Error> for RemoteCause {
    fn from(e: russh_sftp::client::error::Error) -> Self {
        RemoteCause::Sftp(e)
    }
}

impl From<String> for RemoteCause {
    fn from(msg: String) -> Self {
        RemoteCause::Other(msg)
    }
}

impl From<&str> for RemoteCause {
    fn from(msg: &str) -> Self {
        RemoteCause::Other(msg.to_string())
    }
}

/// Result type for SFTP action execution
pub type SftpResult<T> = std::result::Result<T, SftpError>;
