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

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::executor::{BatchExecutor, ExecutionPolicy, Operation};
use crate::config::ConnectionProfile;
use crate::sftp::channel::SftpChannel;
use crate::sftp::error::{SftpError, SftpResult};
use crate::sftp::session::SshSession;

/// Transfer mode for uploads. Text mode rewrites CRLF line endings to LF
/// before writing; binary mode copies bytes unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    #[default]
    Binary,
    Text,
}

impl FromStr for TransferMode {
    type Err = SftpError;

    fn from_str(s: &str) -> SftpResult<Self> {
        match s.to_lowercase().as_str() {
            "binary" => Ok(Self::Binary),
            "text" | "ascii" => Ok(Self::Text),
            other => Err(SftpError::config(format!(
                "Invalid transfer mode '{other}' (expected 'binary' or 'text')"
            ))),
        }
    }
}

/// Resolved parameters of one put action
#[derive(Debug, Clone)]
pub struct PutSpec {
    pub source_dir: PathBuf,
    pub destination_dir: String,
    pub transfer_mode: TransferMode,
}

/// The source/destination pairing a put batch operates on. Supplied once
/// per action, not per file; the whole pair is a single batch target.
#[derive(Debug, Clone)]
pub struct PutTarget {
    pub source_dir: PathBuf,
    pub destination_dir: String,
}

/// Uploads the regular files of a local directory to a remote directory
pub struct PutOperation {
    mode: TransferMode,
}

impl PutOperation {
    pub fn new(mode: TransferMode) -> Self {
        Self { mode }
    }
}

#[async_trait]
impl<C: SftpChannel> Operation<C> for PutOperation {
    type Target = PutTarget;

    async fn apply(&self, channel: &mut C, target: &PutTarget) -> SftpResult<()> {
        let files = collect_source_files(&target.source_dir).await?;

        for local_path in files {
            let file_name = local_path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .ok_or_else(|| {
                    SftpError::remote(local_path.display(), "Source file has no file name")
                })?;
            let remote_path = join_remote(&target.destination_dir, &file_name);

            let data = tokio::fs::read(&local_path)
                .await
                .map_err(|e| SftpError::remote(local_path.display(), e))?;
            let data = match self.mode {
                TransferMode::Binary => data,
                TransferMode::Text => normalize_line_endings(data),
            };

            tracing::info!("Uploading {} -> {}", local_path.display(), remote_path);
            channel.write_file(&remote_path, &data).await?;
        }

        Ok(())
    }

    fn describe(&self, target: &PutTarget) -> String {
        format!(
            "Uploading files from {} to {}",
            target.source_dir.display(),
            target.destination_dir
        )
    }
}

/// Collect the regular files of the source directory, sorted by name for a
/// deterministic upload order. Subdirectories are skipped; a missing or
/// non-directory source is a per-batch remote-operation failure.
async fn collect_source_files(source_dir: &Path) -> SftpResult<Vec<PathBuf>> {
    let metadata = tokio::fs::metadata(source_dir)
        .await
        .map_err(|e| SftpError::remote(source_dir.display(), e))?;
    if !metadata.is_dir() {
        return Err(SftpError::remote(
            source_dir.display(),
            "Source path is not a directory",
        ));
    }

    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(source_dir)
        .await
        .map_err(|e| SftpError::remote(source_dir.display(), e))?;

    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| SftpError::remote(source_dir.display(), e))?
    {
        let path = entry.path();
        let metadata = entry
            .metadata()
            .await
            .map_err(|e| SftpError::remote(path.display(), e))?;

        if metadata.is_file() {
            files.push(path);
        } else {
            tracing::debug!("Skipping non-file entry {:?}", path);
        }
    }

    files.sort();
    Ok(files)
}

fn join_remote(remote_dir: &str, file_name: &str) -> String {
    if remote_dir.ends_with('/') {
        format!("{remote_dir}{file_name}")
    } else {
        format!("{remote_dir}/{file_name}")
    }
}

fn normalize_line_endings(data: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut iter = data.iter().copied().peekable();
    while let Some(byte) = iter.next() {
        if byte == b'\r' && iter.peek() == Some(&b'\n') {
            continue;
        }
        out.push(byte);
    }
    out
}

/// Run one put action to completion: a single-target batch over the
/// source/destination pair, with the session released on every path.
pub async fn run_put(profile: &ConnectionProfile, spec: &PutSpec) -> SftpResult<()> {
    let target = PutTarget {
        source_dir: spec.source_dir.clone(),
        destination_dir: spec.destination_dir.clone(),
    };

    let session = SshSession::connect(profile).await?;

    BatchExecutor::new(ExecutionPolicy::default())
        .run(session, &PutOperation::new(spec.transfer_mode), &[target])
        .await
}
