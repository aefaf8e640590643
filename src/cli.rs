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

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sftp-actions",
    version,
    about = "One-shot SFTP batch actions for data pipelines",
    long_about = "sftp-actions runs a single SFTP operation (delete remote files, upload the files\nof a local directory) as one unit of work, driven by an action file and/or\ncommand-line flags. It is designed to be invoked as a step of a larger pipeline:\nthe process exits 0 when the batch succeeded and nonzero when it failed.\nAuthentication supports passwords and SSH private keys (with passphrase).",
    after_help = "EXAMPLES:\n  Delete two files:            sftp-actions -H sftp.example.com -u loader \\\n                                 --password-env SFTP_PASSWORD delete \"old/a.csv,old/b.csv\"\n  Keep going past failures:    sftp-actions delete \"a.csv,b.csv\" --continue-on-error\n  Upload a directory:          sftp-actions -H sftp.example.com -u loader -i ~/.ssh/id_ed25519 \\\n                                 put ./out /upload\n  Text-mode upload:            sftp-actions put ./reports /drop --mode text\n\nConnection settings omitted from the command line are read from the action file\n(./sftp-actions.yaml, ~/.config/sftp-actions/config.yaml, or --config PATH)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short = 'H', long, help = "SFTP server hostname")]
    pub host: Option<String>,

    #[arg(short = 'p', long, help = "SFTP server port [default: 22]")]
    pub port: Option<u16>,

    #[arg(short = 'u', long, help = "Username for authentication")]
    pub user: Option<String>,

    #[arg(
        short = 'i',
        long,
        help = "SSH private key file path\nThe passphrase, if any, is read from 'connection.passphrase' in the action file"
    )]
    pub identity: Option<PathBuf>,

    #[arg(
        long,
        value_name = "VAR",
        help = "Read the password from this environment variable"
    )]
    pub password_env: Option<String>,

    #[arg(
        long,
        help = "Action file path\nWhen omitted, ./sftp-actions.yaml and ~/.config/sftp-actions/config.yaml are tried in order"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        value_name = "MODE",
        help = "Host key checking mode (known-hosts/no) [default: no]\n  known-hosts - Verify against ~/.ssh/known_hosts (most secure)\n  no          - Accept all host keys"
    )]
    pub host_key_checking: Option<String>,

    #[arg(
        short = 'v',
        long,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Delete files on the SFTP server",
        long_about = "Deletes the listed remote files, in list order, over a single SFTP session.\nPaths are passed through verbatim; there is no glob expansion or recursion.\nAn empty list is a no-op and succeeds without connecting.\n\nExit codes: 0 (batch succeeded, including tolerated failures), 1 (batch aborted)",
        after_help = "Examples:\n  sftp-actions delete \"stale/a.csv,stale/b.csv\"\n  sftp-actions delete --continue-on-error \"a.csv,missing.csv,b.csv\""
    )]
    Delete {
        #[arg(help = "Comma-separated list of remote files to delete\nFalls back to 'delete.files' in the action file when omitted")]
        files: Option<String>,

        #[arg(
            long,
            help = "Keep going when deleting a file fails; failures are logged as warnings\nand the batch still reports success"
        )]
        continue_on_error: bool,
    },

    #[command(
        about = "Upload the files of a local directory to the SFTP server",
        long_about = "Uploads every regular file found in the local source directory to the remote\ndestination directory over a single SFTP session. Subdirectories are skipped.\nIn text mode, CRLF line endings are rewritten to LF before writing.",
        after_help = "Examples:\n  sftp-actions put ./out /upload\n  sftp-actions put ./reports /drop --mode text"
    )]
    Put {
        #[arg(help = "Local source directory\nFalls back to 'put.source_dir' in the action file when omitted")]
        source: Option<PathBuf>,

        #[arg(help = "Remote destination directory\nFalls back to 'put.destination_dir' in the action file when omitted")]
        destination: Option<String>,

        #[arg(
            long,
            value_name = "MODE",
            help = "Transfer mode (binary/text) [default: binary]"
        )]
        mode: Option<String>,
    },
}
