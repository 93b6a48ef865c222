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

//! Hub implementation
//!
//! The Hub owns the roster, the chat log, and the color palette. It accepts
//! connections, runs one multiplexer per session over the session's three
//! channels, and fans broadcasts out by channel.

use crate::chatlog::ChatLog;
use crate::config::HubConfig;
use crate::palette::ColorPalette;
use crate::result::{HubError, HubResult};
use async_trait::async_trait;
use palaver_session::{ChatSession, Message, TelnetSession, UsernameDirectory};
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// Whether a broadcast is a chat message or an ephemeral event.
///
/// Messages are logged; events are not. Both honor channel routing, the
/// minimum-length filter, and receiver ignore lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastKind {
    /// A chat message produced from user input
    Message,
    /// An ephemeral event such as a join or departure announcement
    Event,
}

/// Process-wide chat coordinator.
///
/// The roster mutex is the linearization point for admission, removal, and
/// fan-out: broadcast iterates the roster under the lock, so every receiver
/// in a channel observes messages in the order the hub accepted them. The
/// lock is released before removals, which re-acquire it.
pub struct Hub {
    roster: Mutex<HashMap<String, Arc<dyn ChatSession>>>,
    chatlog: ChatLog,
    palette: ColorPalette,
    config: HubConfig,
}

impl Hub {
    /// Creates a hub logging chat messages to `chatlog`.
    pub fn new(chatlog: Box<dyn Write + Send>, config: HubConfig) -> HubResult<Self> {
        config.validate().map_err(HubError::Config)?;
        let palette = ColorPalette::new(config.username_colors.iter().cloned());
        Ok(Hub {
            roster: Mutex::new(HashMap::new()),
            chatlog: ChatLog::new(chatlog),
            palette,
            config,
        })
    }

    /// The hub configuration.
    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Number of sessions currently in the roster.
    pub async fn session_count(&self) -> usize {
        self.roster.lock().await.len()
    }

    /// Binds `addr` and accepts connections until an accept fails. Each
    /// accepted connection gets its own session task; this function only
    /// returns on listener failure, leaving restart policy to the caller.
    pub async fn listen(self: Arc<Self>, addr: &str) -> HubResult<()> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(address = %listener.local_addr()?, "chat hub listening");
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(error) => {
                    tracing::error!(%error, "accept failed, shutting down listener");
                    return Err(error.into());
                }
            };
            tracing::debug!(%peer, "connection accepted");
            let hub = Arc::clone(&self);
            tokio::spawn(async move {
                hub.handle_connection(stream).await;
            });
        }
    }

    /// Runs one connection from handshake to teardown: build the telnet
    /// session with the next palette color and the default channel, admit
    /// it, then multiplex its three channels until it signals done.
    pub async fn handle_connection(self: Arc<Self>, stream: TcpStream) {
        let session = Arc::new(TelnetSession::new(
            stream,
            self.config.session_buffer_size,
            self.palette.next_color(),
            self.config.default_channel.clone(),
        ));

        let directory: Arc<dyn UsernameDirectory> = Arc::clone(&self) as Arc<dyn UsernameDirectory>;
        let mut channels = match Arc::clone(&session).start(directory).await {
            Ok(channels) => channels,
            Err(error) => {
                tracing::debug!(%error, "handshake failed");
                return;
            }
        };

        let session: Arc<dyn ChatSession> = session;
        if !self.append_session(Arc::clone(&session)).await {
            return;
        }

        loop {
            tokio::select! {
                Some(message) = channels.messages.recv() => {
                    if let Err(error) = self.broadcast(message, BroadcastKind::Message).await {
                        tracing::warn!(%error, "broadcast completed with errors");
                    }
                }
                Some(event) = channels.events.recv() => {
                    if let Err(error) = self.broadcast(event, BroadcastKind::Event).await {
                        tracing::warn!(%error, "event broadcast completed with errors");
                    }
                }
                _ = channels.done.recv() => break,
            }
        }

        self.remove_session(&session).await;
    }

    /// Admits `session` to the roster and announces it to its channel.
    ///
    /// Returns false when the username raced into the roster between the
    /// handshake check and admission; the newcomer is closed rather than
    /// silently replacing the incumbent.
    pub async fn append_session(&self, session: Arc<dyn ChatSession>) -> bool {
        let username = session.username();
        {
            let mut roster = self.roster.lock().await;
            if roster.contains_key(&username) {
                drop(roster);
                tracing::warn!(%username, "username no longer available, refusing session");
                if let Err(error) = session.close().await {
                    tracing::debug!(%username, %error, "error closing refused session");
                }
                return false;
            }
            roster.insert(username.clone(), Arc::clone(&session));
        }
        tracing::info!(%username, "session joined");

        let announcement = Message::new(
            format!("{username} is now online"),
            session.channel(),
            session,
        );
        if let Err(error) = self.broadcast(announcement, BroadcastKind::Event).await {
            tracing::warn!(%error, "join announcement completed with errors");
        }
        true
    }

    /// Removes `session` from the roster, closes it, and announces the
    /// departure. Safe to call from any task; a second call for the same
    /// session is a no-op.
    pub async fn remove_session(&self, session: &Arc<dyn ChatSession>) {
        let username = session.username();
        if let Some(removed) = self.evict(&username).await {
            tracing::info!(%username, "session departed");
            let farewell = Self::farewell(removed);
            if let Err(error) = self.broadcast(farewell, BroadcastKind::Event).await {
                tracing::warn!(%error, "departure announcement completed with errors");
            }
        }
    }

    /// Deletes the roster entry for `username` and closes the session.
    /// Never broadcasts and never holds the roster lock across the close.
    async fn evict(&self, username: &str) -> Option<Arc<dyn ChatSession>> {
        let removed = { self.roster.lock().await.remove(username) };
        if let Some(session) = removed.as_ref() {
            if let Err(error) = session.close().await {
                tracing::debug!(%username, %error, "error closing session");
            }
        }
        removed
    }

    fn farewell(session: Arc<dyn ChatSession>) -> Message {
        let username = session.username();
        Message::new(
            format!("{username} has disconnected"),
            session.channel(),
            session,
        )
    }

    /// Fans `message` out to every roster session on its channel whose
    /// ignore list does not name the sender.
    ///
    /// Messages below the minimum length are dropped silently. Chat
    /// messages are logged before delivery; a log failure is surfaced in
    /// the returned error but never aborts the fan-out. Sessions whose
    /// delivery fails are removed after the roster lock is released, and
    /// their departure events join the same work queue so cascading
    /// failures settle without recursion.
    pub async fn broadcast(&self, message: Message, kind: BroadcastKind) -> HubResult<()> {
        let mut log_error = None;
        let mut pending = VecDeque::from([(message, kind)]);

        while let Some((message, kind)) = pending.pop_front() {
            if message.body().trim().len() < self.config.minimum_message_length {
                continue;
            }

            if kind == BroadcastKind::Message {
                if let Err(error) = self.chatlog.append(&message) {
                    tracing::error!(%error, "chat log write failed");
                    log_error = Some(error);
                }
            }

            let mut failed = Vec::new();
            {
                let roster = self.roster.lock().await;
                let sender = message.from().username();
                for (username, session) in roster.iter() {
                    if session.channel() != message.channel() {
                        continue;
                    }
                    if session
                        .ignore_list()
                        .get(&sender)
                        .copied()
                        .unwrap_or(false)
                    {
                        continue;
                    }
                    let delivery = match kind {
                        BroadcastKind::Message => session.send_message(&message).await,
                        BroadcastKind::Event => session.send_event(&message).await,
                    };
                    if let Err(error) = delivery {
                        tracing::debug!(%username, %error, "delivery failed");
                        failed.push(username.clone());
                    }
                }
            }

            for username in failed {
                if let Some(removed) = self.evict(&username).await {
                    tracing::info!(%username, "session removed after failed delivery");
                    pending.push_back((Self::farewell(removed), BroadcastKind::Event));
                }
            }
        }

        match log_error {
            Some(error) => Err(HubError::ChatLog(error)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UsernameDirectory for Hub {
    async fn username_available(&self, username: &str) -> bool {
        !self.roster.lock().await.contains_key(username)
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub").field("config", &self.config).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_session::{SessionChannels, SessionError, SessionResult};
    use std::sync::atomic::{AtomicBool, Ordering};

    struct StubSession {
        username: String,
        closed: AtomicBool,
    }

    impl StubSession {
        fn new(username: &str) -> Arc<Self> {
            Arc::new(StubSession {
                username: username.to_string(),
                closed: AtomicBool::new(false),
            })
        }
    }

    #[async_trait]
    impl ChatSession for StubSession {
        fn username(&self) -> String {
            self.username.clone()
        }

        fn username_color(&self) -> String {
            "fuschia".to_string()
        }

        fn channel(&self) -> String {
            "general".to_string()
        }

        fn ignore_list(&self) -> HashMap<String, bool> {
            HashMap::new()
        }

        async fn start(
            self: Arc<Self>,
            _directory: Arc<dyn UsernameDirectory>,
        ) -> SessionResult<SessionChannels> {
            Err(SessionError::AlreadyStarted)
        }

        async fn send_message(&self, _message: &Message) -> SessionResult<()> {
            Ok(())
        }

        async fn send_event(&self, _event: &Message) -> SessionResult<()> {
            Ok(())
        }

        async fn close(&self) -> SessionResult<()> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    fn test_hub() -> Hub {
        Hub::new(Box::new(std::io::sink()), HubConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn admission_tracks_roster() {
        let hub = test_hub();
        assert!(hub.username_available("dan").await);

        assert!(hub.append_session(StubSession::new("dan")).await);
        assert_eq!(hub.session_count().await, 1);
        assert!(!hub.username_available("dan").await);
    }

    #[tokio::test]
    async fn duplicate_admission_is_refused() {
        let hub = test_hub();
        assert!(hub.append_session(StubSession::new("dan")).await);

        let imposter = StubSession::new("dan");
        let admitted: Arc<dyn ChatSession> = Arc::clone(&imposter) as Arc<dyn ChatSession>;
        assert!(!hub.append_session(admitted).await);
        assert_eq!(hub.session_count().await, 1);
        assert!(imposter.closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn removal_is_idempotent() {
        let hub = test_hub();
        let session: Arc<dyn ChatSession> = StubSession::new("dan");
        hub.append_session(Arc::clone(&session)).await;
        hub.remove_session(&session).await;
        hub.remove_session(&session).await;
        assert_eq!(hub.session_count().await, 0);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected() {
        let config = HubConfig::default().with_username_colors(Vec::new());
        assert!(matches!(
            Hub::new(Box::new(std::io::sink()), config),
            Err(HubError::Config(_))
        ));
    }
}
