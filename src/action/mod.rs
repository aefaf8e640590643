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

//! One-shot SFTP actions: a batch executor plus the delete and put
//! operation variants it drives.

pub mod delete;
pub mod executor;
pub mod put;

pub use delete::{run_delete, DeleteOperation, DeleteSpec};
pub use executor::{parse_target_list, BatchExecutor, ExecutionPolicy, Operation};
pub use put::{run_put, PutOperation, PutSpec, PutTarget, TransferMode};
