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

//! Action-file loading end to end: YAML parsing, environment expansion,
//! and profile resolution from a file on disk.

use serial_test::serial;
use sftp_actions::config::{AuthMethod, Config, ConnectionOverrides, ConnectionProfile};
use tempfile::TempDir;

async fn load_from_str(yaml: &str) -> Config {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("action.yaml");
    std::fs::write(&path, yaml).unwrap();
    Config::load(&path).await.unwrap()
}

#[tokio::test]
#[serial]
async fn test_load_expands_environment_variables() {
    unsafe {
        std::env::set_var("TEST_SFTP_HOST", "sftp.internal");
        std::env::set_var("TEST_SFTP_PASSWORD", "hunter2");
    }

    let config = load_from_str(
        r#"
connection:
  host: ${TEST_SFTP_HOST}
  username: loader
  password: ${TEST_SFTP_PASSWORD}
"#,
    )
    .await;

    assert_eq!(config.connection.host.as_deref(), Some("sftp.internal"));
    assert_eq!(config.connection.password.as_deref(), Some("hunter2"));

    unsafe {
        std::env::remove_var("TEST_SFTP_HOST");
        std::env::remove_var("TEST_SFTP_PASSWORD");
    }
}

#[tokio::test]
#[serial]
async fn test_unknown_variables_are_left_untouched() {
    let config = load_from_str(
        r#"
connection:
  host: sftp.example.com
  username: loader
  password: ${TEST_SFTP_UNSET_PASSWORD}
"#,
    )
    .await;

    assert_eq!(
        config.connection.password.as_deref(),
        Some("${TEST_SFTP_UNSET_PASSWORD}")
    );
}

#[tokio::test]
#[serial]
async fn test_full_action_file_resolves_to_profile() {
    let config = load_from_str(
        r#"
connection:
  host: sftp.example.com
  port: 2022
  username: loader
  password: hunter2

delete:
  files: "x.txt,y.txt"
  continue_on_error: true
"#,
    )
    .await;

    let profile = ConnectionProfile::resolve(&config, &ConnectionOverrides::default()).unwrap();
    assert_eq!(profile.host, "sftp.example.com");
    assert_eq!(profile.port, 2022);
    assert_eq!(profile.username, "loader");
    assert!(matches!(profile.auth, AuthMethod::Password(ref p) if p == "hunter2"));

    let delete = config.delete.unwrap();
    assert_eq!(delete.files.as_deref(), Some("x.txt,y.txt"));
    assert!(delete.continue_on_error);
}

#[tokio::test]
#[serial]
async fn test_missing_sections_default_to_none() {
    let config = load_from_str(
        r#"
connection:
  host: sftp.example.com
  username: loader
  password: hunter2
"#,
    )
    .await;

    assert!(config.delete.is_none());
    assert!(config.put.is_none());
}

#[tokio::test]
async fn test_load_rejects_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("action.yaml");
    std::fs::write(&path, "connection: [not: a: mapping").unwrap();

    assert!(Config::load(&path).await.is_err());
}
