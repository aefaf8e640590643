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

//! SFTP transport layer based on russh and russh-sftp
//!
//! This module provides:
//! - One authenticated SSH/SFTP session per action invocation
//! - Password and private-key authentication
//! - The [`SftpChannel`] capability the batch executor operates against

pub mod channel;
pub mod error;
pub mod session;

pub use channel::SftpChannel;
pub use error::{RemoteCause, SftpError, SftpResult};
pub use session::SshSession;
