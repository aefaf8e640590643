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

use crate::sftp::channel::SftpChannel;
use crate::sftp::error::SftpResult;

/// Per-batch error policy
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecutionPolicy {
    /// Keep going when a single target fails. Only per-target remote
    /// failures are tolerated; connection and channel errors always abort.
    pub continue_on_error: bool,
}

/// One remote file operation, applied once per target by the executor
#[async_trait]
pub trait Operation<C: SftpChannel>: Send + Sync {
    type Target: Send + Sync;

    async fn apply(&self, channel: &mut C, target: &Self::Target) -> SftpResult<()>;

    /// Log line announcing the operation on one target
    fn describe(&self, target: &Self::Target) -> String;
}

/// Runs one operation over an ordered target list on a single channel.
///
/// Targets are processed strictly in list order, one at a time; there is
/// never more than one in-flight remote operation. The channel is closed
/// exactly once on every exit path.
pub struct BatchExecutor {
    policy: ExecutionPolicy,
}

impl BatchExecutor {
    pub fn new(policy: ExecutionPolicy) -> Self {
        Self { policy }
    }

    /// Execute `op` once per target, consuming the channel.
    ///
    /// Returns `Ok(())` when every target succeeded or every failure was
    /// tolerated by the policy; otherwise returns the first fatal error,
    /// with no later target attempted.
    pub async fn run<C, Op>(
        &self,
        mut channel: C,
        op: &Op,
        targets: &[Op::Target],
    ) -> SftpResult<()>
    where
        C: SftpChannel,
        Op: Operation<C>,
    {
        let mut outcome = Ok(());

        for target in targets {
            tracing::info!("{}", op.describe(target));
            match op.apply(&mut channel, target).await {
                Ok(()) => {}
                Err(e) if e.is_remote() && self.policy.continue_on_error => {
                    tracing::warn!("{}: {}", op.describe(target), e);
                }
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            }
        }

        // Release the session on every path. A failed disconnect is not
        // worth failing an otherwise-complete batch over.
        if let Err(e) = channel.close().await {
            tracing::warn!("Failed to close SFTP session cleanly: {}", e);
        }

        outcome
    }
}

/// Split a comma-separated target list, preserving order.
///
/// Entries are passed through verbatim (no trimming, no dedup, no glob
/// expansion); empty segments from stray commas are dropped. An empty or
/// absent input yields an empty list, which callers treat as a no-op.
pub fn parse_target_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preserves_order() {
        assert_eq!(parse_target_list("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_target_list("").is_empty());
    }

    #[test]
    fn test_parse_drops_empty_segments() {
        assert_eq!(parse_target_list("a,,b,"), vec!["a", "b"]);
        assert!(parse_target_list(",,").is_empty());
    }

    #[test]
    fn test_parse_no_trimming() {
        assert_eq!(
            parse_target_list("a.txt, b.txt"),
            vec!["a.txt", " b.txt"]
        );
    }
}
