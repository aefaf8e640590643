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

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;

use sftp_actions::{
    action::{
        delete::{run_delete, DeleteSpec},
        put::{run_put, PutSpec},
    },
    cli::{Cli, Commands},
    config::{
        self, resolve_transfer_mode, Config, ConnectionOverrides, ConnectionProfile,
        DeleteSettings, PutSettings,
    },
    sftp::error::{SftpError, SftpResult},
    utils::init_logging,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    // Load the action file. An explicitly given path must exist; the
    // default locations are optional.
    let config = match &cli.config {
        Some(path) => {
            let expanded = config::expand_tilde(path);
            if !expanded.exists() {
                anyhow::bail!("Action file not found: {:?}", expanded);
            }
            Config::load(&expanded).await?
        }
        None => Config::load_with_priority().await?,
    };

    let overrides = ConnectionOverrides {
        host: cli.host.as_deref(),
        port: cli.port,
        username: cli.user.as_deref(),
        identity: cli.identity.as_deref(),
        password_env: cli.password_env.as_deref(),
        host_key_checking: cli.host_key_checking.as_deref(),
    };

    // Configuration problems surface here, before any connection attempt
    let profile = ConnectionProfile::resolve(&config, &overrides)?;

    match &cli.command {
        Commands::Delete {
            files,
            continue_on_error,
        } => {
            let spec =
                resolve_delete_spec(files.as_deref(), *continue_on_error, config.delete.as_ref());
            run_delete(&profile, &spec).await.with_context(|| {
                format!(
                    "SFTP delete action failed on {}:{}",
                    profile.host, profile.port
                )
            })?;
        }
        Commands::Put {
            source,
            destination,
            mode,
        } => {
            let spec = resolve_put_spec(
                source.as_deref(),
                destination.as_deref(),
                mode.as_deref(),
                config.put.as_ref(),
            )?;
            run_put(&profile, &spec).await.with_context(|| {
                format!(
                    "SFTP put action failed on {}:{}",
                    profile.host, profile.port
                )
            })?;
        }
    }

    Ok(())
}

/// Merge the delete subcommand's flags with the action file. An absent
/// file list resolves to an empty one, which the action treats as a no-op.
fn resolve_delete_spec(
    files: Option<&str>,
    continue_flag: bool,
    settings: Option<&DeleteSettings>,
) -> DeleteSpec {
    DeleteSpec {
        files: files
            .map(str::to_string)
            .or_else(|| settings.and_then(|s| s.files.clone()))
            .unwrap_or_default(),
        continue_on_error: continue_flag
            || settings.map(|s| s.continue_on_error).unwrap_or(false),
    }
}

/// Merge the put subcommand's arguments with the action file. Source and
/// destination are required, from one place or the other.
fn resolve_put_spec(
    source: Option<&Path>,
    destination: Option<&str>,
    mode: Option<&str>,
    settings: Option<&PutSettings>,
) -> SftpResult<PutSpec> {
    let source_dir = source
        .map(|p| p.to_path_buf())
        .or_else(|| {
            settings
                .and_then(|s| s.source_dir.as_deref())
                .map(|s| config::expand_tilde(Path::new(s)))
        })
        .ok_or_else(|| {
            SftpError::config(
                "Source directory is required. Pass it as an argument or set 'put.source_dir'.",
            )
        })?;

    let destination_dir = destination
        .map(str::to_string)
        .or_else(|| settings.and_then(|s| s.destination_dir.clone()))
        .ok_or_else(|| {
            SftpError::config(
                "Destination directory is required. Pass it as an argument or set 'put.destination_dir'.",
            )
        })?;

    Ok(PutSpec {
        source_dir,
        destination_dir,
        transfer_mode: resolve_transfer_mode(mode, settings)?,
    })
}
