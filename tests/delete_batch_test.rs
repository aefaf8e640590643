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

//! Batch-executor semantics for the delete action, exercised against a
//! mock channel: execution order, the continue-on-error policy, and
//! session release on every code path.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sftp_actions::action::{parse_target_list, BatchExecutor, DeleteOperation, ExecutionPolicy};
use sftp_actions::sftp::{SftpChannel, SftpError, SftpResult};

/// Mock transport recording every call; `fail_on` entries fail with a
/// per-target remote error.
#[derive(Default)]
struct MockChannel {
    attempted: Arc<Mutex<Vec<String>>>,
    close_count: Arc<Mutex<usize>>,
    fail_on: Vec<String>,
    fail_with_channel_error: bool,
}

impl MockChannel {
    fn new() -> Self {
        Self::default()
    }

    fn failing_on(paths: &[&str]) -> Self {
        Self {
            fail_on: paths.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    fn attempted(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.attempted)
    }

    fn close_count(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.close_count)
    }
}

#[async_trait]
impl SftpChannel for MockChannel {
    async fn remove(&mut self, path: &str) -> SftpResult<()> {
        self.attempted.lock().unwrap().push(path.to_string());
        if self.fail_with_channel_error {
            return Err(SftpError::channel("Connection lost"));
        }
        if self.fail_on.iter().any(|p| p == path) {
            return Err(SftpError::remote(path, "No such file"));
        }
        Ok(())
    }

    async fn write_file(&mut self, path: &str, _data: &[u8]) -> SftpResult<()> {
        self.attempted.lock().unwrap().push(path.to_string());
        Ok(())
    }

    async fn close(&mut self) -> SftpResult<()> {
        *self.close_count.lock().unwrap() += 1;
        Ok(())
    }
}

fn targets(raw: &str) -> Vec<String> {
    parse_target_list(raw)
}

#[tokio::test]
async fn test_targets_execute_in_list_order() {
    let channel = MockChannel::new();
    let attempted = channel.attempted();

    BatchExecutor::new(ExecutionPolicy::default())
        .run(channel, &DeleteOperation, &targets("a,b,c"))
        .await
        .unwrap();

    assert_eq!(*attempted.lock().unwrap(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_first_failure_aborts_without_continue_on_error() {
    let channel = MockChannel::failing_on(&["missing.txt"]);
    let attempted = channel.attempted();
    let close_count = channel.close_count();

    let result = BatchExecutor::new(ExecutionPolicy {
        continue_on_error: false,
    })
    .run(
        channel,
        &DeleteOperation,
        &targets("x.txt,missing.txt,y.txt"),
    )
    .await;

    let err = result.expect_err("batch must fail");
    assert!(err.is_remote(), "expected a per-target error, got: {err}");

    // x.txt deleted, missing.txt attempted, y.txt never attempted
    assert_eq!(*attempted.lock().unwrap(), vec!["x.txt", "missing.txt"]);
    assert_eq!(*close_count.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_continue_on_error_attempts_every_target() {
    let channel = MockChannel::failing_on(&["missing.txt"]);
    let attempted = channel.attempted();
    let close_count = channel.close_count();

    let result = BatchExecutor::new(ExecutionPolicy {
        continue_on_error: true,
    })
    .run(
        channel,
        &DeleteOperation,
        &targets("x.txt,missing.txt,y.txt"),
    )
    .await;

    // The tolerated failure does not surface; the batch reports success
    result.unwrap();
    assert_eq!(
        *attempted.lock().unwrap(),
        vec!["x.txt", "missing.txt", "y.txt"]
    );
    assert_eq!(*close_count.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_continue_on_error_with_every_target_failing() {
    let channel = MockChannel::failing_on(&["a", "b", "c"]);
    let attempted = channel.attempted();

    BatchExecutor::new(ExecutionPolicy {
        continue_on_error: true,
    })
    .run(channel, &DeleteOperation, &targets("a,b,c"))
    .await
    .unwrap();

    assert_eq!(*attempted.lock().unwrap(), vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_non_remote_errors_are_never_tolerated() {
    // A broken channel is not a per-target failure; continue-on-error
    // must not swallow it
    let channel = MockChannel {
        fail_with_channel_error: true,
        ..MockChannel::new()
    };
    let attempted = channel.attempted();
    let close_count = channel.close_count();

    let result = BatchExecutor::new(ExecutionPolicy {
        continue_on_error: true,
    })
    .run(channel, &DeleteOperation, &targets("a,b"))
    .await;

    let err = result.expect_err("channel error must abort the batch");
    assert!(!err.is_remote());
    assert_eq!(*attempted.lock().unwrap(), vec!["a"]);
    assert_eq!(*close_count.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_channel_closed_exactly_once_on_success() {
    let channel = MockChannel::new();
    let close_count = channel.close_count();

    BatchExecutor::new(ExecutionPolicy::default())
        .run(channel, &DeleteOperation, &targets("a,b,c"))
        .await
        .unwrap();

    assert_eq!(*close_count.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_empty_target_list_is_a_no_op() {
    let channel = MockChannel::new();
    let attempted = channel.attempted();
    let close_count = channel.close_count();

    BatchExecutor::new(ExecutionPolicy::default())
        .run(channel, &DeleteOperation, &targets(""))
        .await
        .unwrap();

    assert!(attempted.lock().unwrap().is_empty());
    // The executor still releases whatever channel it was handed
    assert_eq!(*close_count.lock().unwrap(), 1);
}

#[tokio::test]
async fn test_close_failure_does_not_fail_the_batch() {
    struct CloseFailChannel;

    #[async_trait]
    impl SftpChannel for CloseFailChannel {
        async fn remove(&mut self, _path: &str) -> SftpResult<()> {
            Ok(())
        }

        async fn write_file(&mut self, _path: &str, _data: &[u8]) -> SftpResult<()> {
            Ok(())
        }

        async fn close(&mut self) -> SftpResult<()> {
            Err(SftpError::channel("Disconnect failed"))
        }
    }

    BatchExecutor::new(ExecutionPolicy::default())
        .run(CloseFailChannel, &DeleteOperation, &targets("a"))
        .await
        .unwrap();
}
