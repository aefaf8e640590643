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

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use russh::client::{Config, Handle, Handler};
use russh::Disconnect;
use russh_sftp::client::SftpSession;
use tokio::io::AsyncWriteExt;

use super::channel::SftpChannel;
use super::error::{SftpError, SftpResult};
use crate::config::{AuthMethod, ConnectionProfile, HostKeyChecking};

// SSH connection timeout design:
// - 30 seconds accommodates slow networks and SSH negotiation
// - Industry standard for SSH client connections
const SSH_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Client-side handler deciding whether to trust the server host key
#[derive(Debug, Clone)]
struct ActionClientHandler {
    hostname: String,
    port: u16,
    check: HostKeyChecking,
}

#[async_trait]
impl Handler for ActionClientHandler {
    type Error = SftpError;

    async fn check_server_key(
        &mut self,
        server_public_key: &russh_keys::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        match self.check {
            HostKeyChecking::No => Ok(true),
            HostKeyChecking::KnownHosts => {
                let known = russh_keys::check_known_hosts(
                    &self.hostname,
                    self.port,
                    server_public_key,
                )
                .map_err(|_| SftpError::ServerCheckFailed)?;
                Ok(known)
            }
        }
    }
}

/// One authenticated SSH connection with an open SFTP subsystem channel.
///
/// Exclusively owned by the batch that created it; released exactly once
/// through [`SftpChannel::close`], with a `Drop` backstop for the handle.
pub struct SshSession {
    handle: Handle<ActionClientHandler>,
    sftp: SftpSession,
    host: String,
    port: u16,
}

impl SshSession {
    /// Connect to the server, authenticate, and open the SFTP subsystem.
    ///
    /// Any failure here is fatal to the whole batch; the connection is
    /// never retried.
    pub async fn connect(profile: &ConnectionProfile) -> SftpResult<Self> {
        let config = Config {
            inactivity_timeout: Some(Duration::from_secs(300)),
            ..Default::default()
        };

        let handler = ActionClientHandler {
            hostname: profile.host.clone(),
            port: profile.port,
            check: profile.host_key_checking,
        };

        tracing::debug!("Connecting to {}:{}", profile.host, profile.port);

        let connect_timeout = Duration::from_secs(SSH_CONNECT_TIMEOUT_SECS);
        let mut handle = match tokio::time::timeout(
            connect_timeout,
            russh::client::connect(
                Arc::new(config),
                (profile.host.as_str(), profile.port),
                handler,
            ),
        )
        .await
        {
            Ok(Ok(handle)) => handle,
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(SftpError::ConnectTimeout(SSH_CONNECT_TIMEOUT_SECS)),
        };

        Self::authenticate(&mut handle, &profile.username, &profile.auth).await?;

        let channel = handle
            .channel_open_session()
            .await
            .map_err(|e| SftpError::channel(format!("Failed to open SSH channel: {e}")))?;
        channel
            .request_subsystem(true, "sftp")
            .await
            .map_err(|e| SftpError::channel(format!("Failed to request SFTP subsystem: {e}")))?;
        let sftp = SftpSession::new(channel.into_stream())
            .await
            .map_err(|e| SftpError::channel(format!("Failed to initialize SFTP session: {e}")))?;

        tracing::debug!("SFTP channel ready on {}:{}", profile.host, profile.port);

        Ok(Self {
            handle,
            sftp,
            host: profile.host.clone(),
            port: profile.port,
        })
    }

    /// Authenticate with the configured credential.
    async fn authenticate(
        handle: &mut Handle<ActionClientHandler>,
        username: &str,
        auth: &AuthMethod,
    ) -> SftpResult<()> {
        match auth {
            AuthMethod::Password(password) => {
                let authenticated = handle
                    .authenticate_password(username, password.as_str())
                    .await?;
                if !authenticated {
                    return Err(SftpError::PasswordWrong);
                }
            }
            AuthMethod::PrivateKeyFile {
                key_file_path,
                key_pass,
            } => {
                let key = russh_keys::load_secret_key(key_file_path, key_pass.as_deref())?;
                let key_with_hash =
                    russh_keys::key::PrivateKeyWithHashAlg::new(Arc::new(key), None)?;
                let authenticated = handle
                    .authenticate_publickey(username, key_with_hash)
                    .await?;
                if !authenticated {
                    return Err(SftpError::KeyAuthFailed);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl SftpChannel for SshSession {
    async fn remove(&mut self, path: &str) -> SftpResult<()> {
        tracing::debug!("Removing {}:{}", self.host, path);
        self.sftp
            .remove_file(path)
            .await
            .map_err(|e| SftpError::remote(path, e))
    }

    async fn write_file(&mut self, path: &str, data: &[u8]) -> SftpResult<()> {
        tracing::debug!("Writing {} bytes to {}:{}", data.len(), self.host, path);

        let mut remote_file = self
            .sftp
            .create(path)
            .await
            .map_err(|e| SftpError::remote(path, e))?;
        remote_file
            .write_all(data)
            .await
            .map_err(|e| SftpError::remote(path, e))?;
        remote_file
            .shutdown()
            .await
            .map_err(|e| SftpError::remote(path, e))?;

        Ok(())
    }

    async fn close(&mut self) -> SftpResult<()> {
        tracing::debug!("Disconnecting from {}:{}", self.host, self.port);
        self.handle
            .disconnect(Disconnect::ByApplication, "", "")
            .await
            .map_err(SftpError::from)
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        // The connection is torn down when the handle is dropped
        tracing::debug!("SSH session to {}:{} being dropped", self.host, self.port);
    }
}
