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

use async_trait::async_trait;

use super::executor::{parse_target_list, BatchExecutor, ExecutionPolicy, Operation};
use crate::config::ConnectionProfile;
use crate::sftp::channel::SftpChannel;
use crate::sftp::error::SftpResult;
use crate::sftp::session::SshSession;

/// Resolved parameters of one delete action
#[derive(Debug, Clone)]
pub struct DeleteSpec {
    /// Comma-separated list of remote files to delete
    pub files: String,
    pub continue_on_error: bool,
}

/// Removes one remote file per target, path passed through verbatim
pub struct DeleteOperation;

#[async_trait]
impl<C: SftpChannel> Operation<C> for DeleteOperation {
    type Target = String;

    async fn apply(&self, channel: &mut C, target: &String) -> SftpResult<()> {
        channel.remove(target).await
    }

    fn describe(&self, target: &String) -> String {
        format!("Deleting {target}")
    }
}

/// Run one delete action to completion.
///
/// An empty file list is a no-op: the batch succeeds without opening a
/// connection. Otherwise one session is opened, each listed file is
/// removed in list order, and the session is released on every path.
pub async fn run_delete(profile: &ConnectionProfile, spec: &DeleteSpec) -> SftpResult<()> {
    let targets = parse_target_list(&spec.files);
    if targets.is_empty() {
        tracing::debug!("No files to delete, skipping");
        return Ok(());
    }

    let session = SshSession::connect(profile).await?;

    BatchExecutor::new(ExecutionPolicy {
        continue_on_error: spec.continue_on_error,
    })
    .run(session, &DeleteOperation, &targets)
    .await
}
