//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Palaver chat server binary
//!
//! Parses flags, opens the chat log, and hands the accept loop to the hub.
//!
//! ## Usage
//!
//! ```bash
//! palaver --address 0.0.0.0:9876 --chatlog-file ./chat.log
//! ```
//!
//! Then connect with:
//! ```bash
//! telnet localhost 9876
//! ```

use clap::Parser;
use palaver_hub::{Hub, HubConfig};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(name = "palaver", about = "Multi-user telnet chat server")]
struct Args {
    /// Address for the chat server to listen on
    #[arg(long, default_value = "0.0.0.0:9876")]
    address: String,

    /// File all chat messages are appended to (created if it does not exist)
    #[arg(long, default_value = "./chat.log")]
    chatlog_file: PathBuf,

    /// Limit of rendered lines held in memory per session
    #[arg(long, default_value_t = 20)]
    session_buffer_size: usize,

    /// Minimum characters required for a message
    #[arg(long, default_value_t = 1)]
    minimum_message_length: usize,

    /// The first channel a user enters when they join
    #[arg(long, default_value = "general")]
    default_channel: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let chatlog = OpenOptions::new()
        .append(true)
        .create(true)
        .open(&args.chatlog_file)
        .map_err(|error| {
            tracing::error!(path = %args.chatlog_file.display(), %error, "unable to open chat log");
            error
        })?;

    let config = HubConfig::default()
        .with_session_buffer_size(args.session_buffer_size)
        .with_minimum_message_length(args.minimum_message_length)
        .with_default_channel(args.default_channel);

    let hub = Arc::new(Hub::new(Box::new(chatlog), config)?);
    hub.listen(&args.address).await.map_err(|error| {
        tracing::error!(%error, "unable to serve chat");
        error
    })?;

    Ok(())
}
