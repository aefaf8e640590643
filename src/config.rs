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

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::action::put::TransferMode;
use crate::sftp::error::{SftpError, SftpResult};

/// Action file contents. All string values support `${VAR}` / `$VAR`
/// environment expansion, applied at load time.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub connection: ConnectionSettings,

    pub delete: Option<DeleteSettings>,

    pub put: Option<PutSettings>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct ConnectionSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub private_key: Option<String>,
    pub passphrase: Option<String>,
    pub host_key_checking: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct DeleteSettings {
    /// Comma-separated list of remote files to delete
    pub files: Option<String>,

    /// Keep going when deleting a single file fails
    #[serde(default)]
    pub continue_on_error: bool,
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct PutSettings {
    pub source_dir: Option<String>,
    pub destination_dir: Option<String>,
    pub transfer_mode: Option<TransferMode>,
}

impl Config {
    pub async fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_tilde(path);

        let content = fs::read_to_string(&expanded_path)
            .await
            .with_context(|| format!("Failed to read action file at {expanded_path:?}. Please check file permissions and ensure the file is accessible."))?;

        let mut config: Config = serde_yaml::from_str(&content).with_context(|| {
            format!("Failed to parse YAML action file at {expanded_path:?}. Please check the YAML syntax is valid.")
        })?;

        config.expand();
        Ok(config)
    }

    /// Load configuration with priority order:
    /// 1. Current directory sftp-actions.yaml
    /// 2. User home directory ~/.config/sftp-actions/config.yaml
    /// 3. Defaults (everything supplied on the command line)
    pub async fn load_with_priority() -> Result<Self> {
        let current_dir_config = PathBuf::from("sftp-actions.yaml");
        if current_dir_config.exists() {
            return Self::load(&current_dir_config).await;
        }

        if let Some(home_dir) = dirs::home_dir() {
            let home_config = home_dir
                .join(".config")
                .join("sftp-actions")
                .join("config.yaml");
            if home_config.exists() {
                return Self::load(&home_config).await;
            }
        }

        tracing::debug!("No action file found, using command-line values only");
        Ok(Self::default())
    }

    /// Expand environment variables in every string value. This is where
    /// placeholders like `password: ${SFTP_PASSWORD}` get resolved.
    fn expand(&mut self) {
        let conn = &mut self.connection;
        for value in [
            &mut conn.host,
            &mut conn.username,
            &mut conn.password,
            &mut conn.private_key,
            &mut conn.passphrase,
        ]
        .into_iter()
        .flatten()
        {
            *value = expand_env_vars(value);
        }

        if let Some(delete) = &mut self.delete {
            if let Some(files) = &mut delete.files {
                *files = expand_env_vars(files);
            }
        }

        if let Some(put) = &mut self.put {
            for value in [&mut put.source_dir, &mut put.destination_dir]
                .into_iter()
                .flatten()
            {
                *value = expand_env_vars(value);
            }
        }
    }
}

/// Validated connection parameters, immutable for the invocation
#[derive(Debug, Clone)]
pub struct ConnectionProfile {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub auth: AuthMethod,
    pub host_key_checking: HostKeyChecking,
}

/// An authentication credential, passed through to the transport
#[derive(Debug, Clone)]
pub enum AuthMethod {
    Password(String),
    PrivateKeyFile {
        key_file_path: PathBuf,
        key_pass: Option<String>,
    },
}

/// Mode for host key checking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostKeyChecking {
    /// Verify against ~/.ssh/known_hosts (fail on unknown/changed)
    KnownHosts,
    /// Accept any host key
    #[default]
    No,
}

impl FromStr for HostKeyChecking {
    type Err = SftpError;

    fn from_str(s: &str) -> SftpResult<Self> {
        match s.to_lowercase().as_str() {
            "known-hosts" | "yes" | "true" => Ok(Self::KnownHosts),
            "no" | "false" => Ok(Self::No),
            other => Err(SftpError::config(format!(
                "Invalid host key checking mode '{other}' (expected 'known-hosts' or 'no')"
            ))),
        }
    }
}

/// Command-line values overriding the action file
#[derive(Debug, Default)]
pub struct ConnectionOverrides<'a> {
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub username: Option<&'a str>,
    pub identity: Option<&'a Path>,
    pub password_env: Option<&'a str>,
    pub host_key_checking: Option<&'a str>,
}

impl ConnectionProfile {
    /// Build a validated profile from the action file and command-line
    /// overrides. Every violation is a configuration error surfaced here,
    /// before any connection attempt.
    pub fn resolve(config: &Config, overrides: &ConnectionOverrides<'_>) -> SftpResult<Self> {
        let conn = &config.connection;

        let host = overrides
            .host
            .map(str::to_string)
            .or_else(|| conn.host.clone())
            .unwrap_or_default();
        if host.is_empty() {
            return Err(SftpError::config(
                "Host is required. Set 'connection.host' in the action file or pass -H.",
            ));
        }

        let port = overrides.port.or(conn.port).unwrap_or(22);
        if port == 0 {
            return Err(SftpError::config("Port must be in range 1-65535"));
        }

        let username = overrides
            .username
            .map(str::to_string)
            .or_else(|| conn.username.clone())
            .unwrap_or_default();
        if username.is_empty() {
            return Err(SftpError::config(
                "Username is required. Set 'connection.username' in the action file or pass -u.",
            ));
        }

        let auth = Self::resolve_auth(conn, overrides)?;

        let host_key_checking = match overrides
            .host_key_checking
            .or(conn.host_key_checking.as_deref())
        {
            Some(mode) => mode.parse()?,
            None => HostKeyChecking::default(),
        };

        Ok(Self {
            host,
            port,
            username,
            auth,
            host_key_checking,
        })
    }

    fn resolve_auth(
        conn: &ConnectionSettings,
        overrides: &ConnectionOverrides<'_>,
    ) -> SftpResult<AuthMethod> {
        // Identity flag wins, then the action file key, then the password
        if let Some(path) = overrides.identity {
            return Ok(AuthMethod::PrivateKeyFile {
                key_file_path: expand_tilde(path),
                key_pass: conn.passphrase.clone(),
            });
        }

        if let Some(key) = &conn.private_key {
            return Ok(AuthMethod::PrivateKeyFile {
                key_file_path: expand_tilde(Path::new(key)),
                key_pass: conn.passphrase.clone(),
            });
        }

        if let Some(var) = overrides.password_env {
            let password = std::env::var(var).map_err(|_| {
                SftpError::config(format!("Environment variable {var} is not set"))
            })?;
            return Ok(AuthMethod::Password(password));
        }

        if let Some(password) = &conn.password {
            return Ok(AuthMethod::Password(password.clone()));
        }

        Err(SftpError::config(
            "No credential configured. Provide 'connection.password', 'connection.private_key', or pass -i / --password-env.",
        ))
    }
}

pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if path_str.starts_with("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(path_str.replacen('~', &home, 1));
            }
        }
    }
    path.to_path_buf()
}

/// Expand environment variables in a string
/// Supports ${VAR} and $VAR syntax; unknown variables are left as-is
pub fn expand_env_vars(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            result.push(bytes[i] as char);
            i += 1;
            continue;
        }

        // ${VAR}
        if i + 1 < bytes.len() && bytes[i + 1] == b'{' {
            if let Some(end) = input[i + 2..].find('}') {
                let var_name = &input[i + 2..i + 2 + end];
                if !var_name.is_empty()
                    && var_name.chars().all(|c| c.is_alphanumeric() || c == '_')
                {
                    match std::env::var(var_name) {
                        Ok(value) => result.push_str(&value),
                        Err(_) => {
                            tracing::debug!("Environment variable {} not found", var_name);
                            result.push_str(&input[i..i + 3 + end]);
                        }
                    }
                    i += 3 + end;
                    continue;
                }
            }
            result.push('$');
            i += 1;
            continue;
        }

        // $VAR
        let start = i + 1;
        let mut end = start;
        while end < bytes.len() && (bytes[end].is_ascii_alphanumeric() || bytes[end] == b'_') {
            end += 1;
        }
        if end > start {
            let var_name = &input[start..end];
            match std::env::var(var_name) {
                Ok(value) => result.push_str(&value),
                Err(_) => {
                    tracing::debug!("Environment variable {} not found", var_name);
                    result.push_str(&input[i..end]);
                }
            }
            i = end;
        } else {
            result.push('$');
            i += 1;
        }
    }

    result
}

/// Resolve the transfer mode from an override or the action file
pub fn resolve_transfer_mode(
    override_mode: Option<&str>,
    settings: Option<&PutSettings>,
) -> SftpResult<TransferMode> {
    if let Some(mode) = override_mode {
        return mode.parse();
    }
    Ok(settings
        .and_then(|s| s.transfer_mode)
        .unwrap_or_default())
}
