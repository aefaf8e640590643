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

use super::error::SftpResult;

/// Remote file-operation capability consumed by the batch executor.
///
/// The live implementation is [`super::session::SshSession`], which drives
/// russh-sftp over an authenticated SSH connection. Tests substitute a mock
/// to assert execution order and session-release behavior.
///
/// `close` must be called exactly once per batch; after it returns the
/// channel must not be used again.
#[async_trait]
pub trait SftpChannel: Send {
    /// Remove a single remote file. The path is passed through verbatim.
    async fn remove(&mut self, path: &str) -> SftpResult<()>;

    /// Create (or truncate) a remote file and write `data` to it.
    async fn write_file(&mut self, path: &str, data: &[u8]) -> SftpResult<()>;

    /// Release the underlying connection.
    async fn close(&mut self) -> SftpResult<()>;
}
