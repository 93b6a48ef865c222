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

//! Telnet/ANSI session variant
//!
//! A `TelnetSession` owns one accepted TCP stream and drives it through the
//! session lifecycle:
//!
//! - NAWS negotiation (`IAC DO NAWS`) to learn the terminal size
//! - Username acquisition against the hub's directory
//! - The input loop: fixed-size reads dispatched on the buffer's first byte
//!   (telnet control traffic, slash commands, or chat text)
//! - Outgoing rendering into a scrollback buffer repainted with CSI
//!   sequences, one write per frame
//!
//! Clients that refuse NAWS are served in plain mode: their input still
//! flows, but redraws are suppressed since the terminal size is unknown.

use crate::buffer::ScrollbackBuffer;
use crate::consts::{ansi, telnet, username_color, READ_BUFFER_SIZE};
use crate::message::{sanitize, Message};
use crate::result::{SessionError, SessionResult};
use crate::session::{ChatSession, SessionChannels, UsernameDirectory};
use async_trait::async_trait;
use bytes::{BufMut, BytesMut};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex as AsyncMutex, Notify};

const COMMAND_HELP: &str = "available commands: /help, /join [channel], /part, /ignore [user]";
const JOIN_HELP: &str = "usage: /join [channel]";
const IGNORE_HELP: &str = "usage: /ignore [user]";

/// Negotiated terminal dimensions. Zero means unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowSize {
    /// Terminal width in columns.
    pub width: u16,
    /// Terminal height in rows.
    pub height: u16,
}

/// How the input loop disposed of a slash-prefixed buffer.
enum CommandOutcome {
    /// Not a recognized command; treat the buffer as a normal message.
    NotCommand,
    /// Command handled; local state updated and acknowledged.
    Handled,
    /// `/part`: the session should terminate.
    Part,
}

/// Per-connection telnet session state machine.
///
/// Cheap accessors snapshot interior state under short-lived mutexes; the
/// delivery path serializes on the write half so a redraw frame is never
/// interleaved with another write.
pub struct TelnetSession {
    username: Mutex<String>,
    color: String,
    channel: Mutex<String>,
    ignore_list: Mutex<HashMap<String, bool>>,
    size: Mutex<WindowSize>,
    rich_client: AtomicBool,
    buffer: Mutex<ScrollbackBuffer>,
    reader: AsyncMutex<Option<OwnedReadHalf>>,
    writer: AsyncMutex<OwnedWriteHalf>,
    closed: AtomicBool,
    closing: Notify,
}

impl TelnetSession {
    /// Wraps an accepted stream in a session with the given scrollback
    /// capacity, palette color, and starting channel.
    pub fn new(
        stream: TcpStream,
        buffer_size: usize,
        color: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        let (read_half, write_half) = stream.into_split();
        TelnetSession {
            username: Mutex::new(String::new()),
            color: color.into(),
            channel: Mutex::new(channel.into()),
            ignore_list: Mutex::new(HashMap::new()),
            size: Mutex::new(WindowSize::default()),
            rich_client: AtomicBool::new(false),
            buffer: Mutex::new(ScrollbackBuffer::new(buffer_size)),
            reader: AsyncMutex::new(Some(read_half)),
            writer: AsyncMutex::new(write_half),
            closed: AtomicBool::new(false),
            closing: Notify::new(),
        }
    }

    /// True once the client has confirmed NAWS.
    pub fn rich_client(&self) -> bool {
        self.rich_client.load(Ordering::Acquire)
    }

    /// The negotiated terminal size.
    pub fn window_size(&self) -> WindowSize {
        *self.size.lock().unwrap()
    }

    /// Writes `payload` to the peer as a single write.
    async fn raw(&self, payload: &[u8]) -> SessionResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(SessionError::Closed);
        }
        let mut writer = self.writer.lock().await;
        writer.write_all(payload).await?;
        Ok(())
    }

    async fn clear_screen(&self) -> SessionResult<()> {
        let mut payload = BytesMut::new();
        payload.put_slice(ansi::CLEAR_SCREEN.as_bytes());
        payload.put_slice(ansi::CURSOR_HOME.as_bytes());
        self.raw(&payload).await
    }

    /// Negotiate About Window Size. Transmits `IAC DO NAWS` and reads until
    /// the client answers `WILL` or `WONT`; anything else arriving first is
    /// discarded. A subnegotiation riding in the same buffer as the `WILL`
    /// is applied immediately.
    async fn negotiate_window_size(&self, reader: &mut OwnedReadHalf) -> SessionResult<()> {
        self.raw(&[telnet::IAC, telnet::DO, telnet::NAWS]).await?;
        let mut buf = [0u8; READ_BUFFER_SIZE];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                return Err(SessionError::Disconnected);
            }
            let frame = &buf[..n];
            if frame.len() < 3 || frame[0] != telnet::IAC {
                continue;
            }
            if frame[1] == telnet::WILL && frame[2] == telnet::NAWS {
                self.rich_client.store(true, Ordering::Release);
                if frame.len() > 3 {
                    self.apply_window_update(&frame[3..]);
                }
                return Ok(());
            }
            if frame[1] == telnet::WONT && frame[2] == telnet::NAWS {
                tracing::debug!("client refused NAWS, serving plain mode");
                self.rich_client.store(false, Ordering::Release);
                return Ok(());
            }
        }
    }

    /// Prompts for and records a username. Lines starting with IAC and
    /// lines that are blank after trimming are skipped; a candidate the
    /// directory rejects re-prompts.
    async fn acquire_username(
        &self,
        reader: &mut OwnedReadHalf,
        directory: &dyn UsernameDirectory,
    ) -> SessionResult<()> {
        self.clear_screen().await?;
        self.raw(b"username: ").await?;
        let mut buf = [0u8; READ_BUFFER_SIZE];
        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                return Err(SessionError::Disconnected);
            }
            if buf[0] == telnet::IAC {
                continue;
            }
            let candidate = String::from_utf8_lossy(&buf[..n]).trim().to_string();
            if candidate.is_empty() {
                continue;
            }
            if !directory.username_available(&candidate).await {
                self.raw(b"username is taken\r\nusername: ").await?;
                continue;
            }
            *self.username.lock().unwrap() = candidate;
            self.clear_screen().await?;
            return Ok(());
        }
    }

    /// Applies an `IAC SB NAWS Wh Wl Hh Hl IAC SE` update to the stored
    /// terminal size. Returns false when `frame` is not a NAWS
    /// subnegotiation. Only the two-byte simplified form is decoded, which
    /// covers terminals up to 511 columns and rows.
    fn apply_window_update(&self, frame: &[u8]) -> bool {
        if frame.len() < 7
            || frame[0] != telnet::IAC
            || frame[1] != telnet::SB
            || frame[2] != telnet::NAWS
        {
            return false;
        }
        let width = if frame[3] == 1 { 256 } else { 0 } + u16::from(frame[4]);
        let height = if frame[5] == 1 { 256 } else { 0 } + u16::from(frame[6]);
        let mut size = self.size.lock().unwrap();
        size.width = width;
        size.height = height;
        tracing::debug!(width, height, "window size updated");
        true
    }

    /// Wraps a raw input buffer into a chat message on the session's
    /// current channel: sanitize, terminate with CRLF when the client sent
    /// none, and stamp.
    fn compose(session: &Arc<Self>, input: &[u8]) -> Message {
        let mut body = sanitize(input);
        if !body.contains(['\r', '\n']) {
            body.push_str("\r\n");
        }
        Message::new(
            body,
            session.channel(),
            Arc::clone(session) as Arc<dyn ChatSession>,
        )
    }

    /// Renders a command acknowledgement on this session only.
    async fn local_event(session: &Arc<Self>, body: &str) -> SessionResult<()> {
        let event = Self::compose(session, body.as_bytes());
        session.send_event(&event).await
    }

    /// Interprets a slash-prefixed buffer. Unrecognized commands fall
    /// through to normal message handling.
    async fn run_command(session: &Arc<Self>, frame: &[u8]) -> SessionResult<CommandOutcome> {
        let text = String::from_utf8_lossy(frame);
        let mut words = text.split_whitespace();
        let command = words.next().unwrap_or_default();
        match command {
            "/help" => {
                Self::local_event(session, COMMAND_HELP).await?;
                Ok(CommandOutcome::Handled)
            }
            "/part" => Ok(CommandOutcome::Part),
            "/join" => match words.next() {
                Some(channel) => {
                    *session.channel.lock().unwrap() = channel.to_string();
                    tracing::debug!(channel, "session changed channel");
                    Self::local_event(session, &format!("now in channel #{channel}")).await?;
                    Ok(CommandOutcome::Handled)
                }
                None => {
                    Self::local_event(session, JOIN_HELP).await?;
                    Ok(CommandOutcome::Handled)
                }
            },
            "/ignore" => match words.next() {
                Some(user) => {
                    let ignored = {
                        let mut ignore_list = session.ignore_list.lock().unwrap();
                        let entry = ignore_list
                            .entry(user.to_string())
                            .and_modify(|ignored| *ignored = !*ignored)
                            .or_insert(true);
                        *entry
                    };
                    let body = if ignored {
                        format!("{user} is now being ignored.")
                    } else {
                        format!("{user} is no longer being ignored.")
                    };
                    Self::local_event(session, &body).await?;
                    Ok(CommandOutcome::Handled)
                }
                None => {
                    Self::local_event(session, IGNORE_HELP).await?;
                    Ok(CommandOutcome::Handled)
                }
            },
            _ => Ok(CommandOutcome::NotCommand),
        }
    }

    /// Reads client input until the connection drops, the hub goes away, or
    /// the user parts. Dispatches on the first byte of each read: telnet
    /// control traffic, slash command, or chat text.
    async fn input_loop(
        session: &Arc<Self>,
        reader: &mut OwnedReadHalf,
        messages: &mpsc::Sender<Message>,
    ) -> SessionResult<()> {
        session.redraw_all().await?;
        let mut buf = [0u8; READ_BUFFER_SIZE];
        loop {
            let n = tokio::select! {
                result = reader.read(&mut buf) => result?,
                _ = session.closing.notified() => return Err(SessionError::Closed),
            };
            if n == 0 {
                return Err(SessionError::Disconnected);
            }
            let frame = &buf[..n];
            if frame[0] == telnet::IAC {
                // telnet options other than a NAWS update are dropped
                if session.rich_client() && session.apply_window_update(frame) {
                    session.redraw_chat().await?;
                }
                continue;
            }
            if frame[0] == b'/' {
                match Self::run_command(session, frame).await? {
                    CommandOutcome::Part => return Ok(()),
                    CommandOutcome::Handled => {
                        session.redraw_all().await?;
                        continue;
                    }
                    CommandOutcome::NotCommand => {}
                }
            }
            let message = Self::compose(session, frame);
            if messages.send(message).await.is_err() {
                return Err(SessionError::HubGone);
            }
            session.redraw_all().await?;
        }
    }

    fn append_line(&self, line: String) {
        self.buffer.lock().unwrap().push(line);
    }

    /// Builds the chat-region repaint: home the cursor, then address each
    /// row, clear it, and paint the matching scrollback line so the newest
    /// line lands on the bottom row. Locks are released before the payload
    /// is written.
    fn chat_payload(&self) -> BytesMut {
        let mut payload = BytesMut::new();
        payload.put_slice(ansi::CURSOR_HOME.as_bytes());
        let size = *self.size.lock().unwrap();
        let buffer = self.buffer.lock().unwrap();
        for row in 0..size.height {
            payload.put_slice(format!("\x1b[{row};0H{}", ansi::CLEAR_LINE).as_bytes());
            let index = usize::from(size.height - 1 - row);
            if let Some(line) = buffer.line(index) {
                payload.put_slice(line.as_bytes());
            }
        }
        payload
    }

    /// Repaints the chat region, preserving the client's cursor position.
    /// No-op for plain-mode clients.
    async fn redraw_chat(&self) -> SessionResult<()> {
        if !self.rich_client() {
            return Ok(());
        }
        let mut payload = BytesMut::new();
        payload.put_slice(ansi::SAVE_CURSOR.as_bytes());
        payload.put_slice(&self.chat_payload());
        payload.put_slice(ansi::RESTORE_CURSOR.as_bytes());
        self.raw(&payload).await
    }

    /// Repaints the chat region and the compose prompt on the bottom row.
    /// No-op for plain-mode clients.
    async fn redraw_all(&self) -> SessionResult<()> {
        if !self.rich_client() {
            return Ok(());
        }
        let mut payload = self.chat_payload();
        let height = self.size.lock().unwrap().height;
        payload.put_slice(
            format!(
                "\x1b[{height};0H{}{}[#{}] {}",
                ansi::CLEAR_LINE,
                ansi::EVENT_COLOR,
                self.channel(),
                ansi::MESSAGE_COLOR,
            )
            .as_bytes(),
        );
        self.raw(&payload).await
    }
}

#[async_trait]
impl ChatSession for TelnetSession {
    fn username(&self) -> String {
        self.username.lock().unwrap().clone()
    }

    fn username_color(&self) -> String {
        self.color.clone()
    }

    fn channel(&self) -> String {
        self.channel.lock().unwrap().clone()
    }

    fn ignore_list(&self) -> HashMap<String, bool> {
        self.ignore_list.lock().unwrap().clone()
    }

    async fn start(
        self: Arc<Self>,
        directory: Arc<dyn UsernameDirectory>,
    ) -> SessionResult<SessionChannels> {
        let mut reader = self
            .reader
            .lock()
            .await
            .take()
            .ok_or(SessionError::AlreadyStarted)?;
        self.negotiate_window_size(&mut reader).await?;
        self.acquire_username(&mut reader, directory.as_ref()).await?;

        let (message_tx, messages) = mpsc::channel(1);
        let (event_tx, events) = mpsc::channel(1);
        let (done_tx, done) = mpsc::channel(1);

        let session = self;
        tokio::spawn(async move {
            // held for the life of the task so the hub's event branch keeps
            // a live channel even though the telnet variant never sends one
            let _events = event_tx;
            let reason = match Self::input_loop(&session, &mut reader, &message_tx).await {
                Ok(()) => SessionError::Closed,
                Err(error) => error,
            };
            tracing::debug!(username = %session.username(), %reason, "input loop ended");
            let _ = done_tx.try_send(reason);
        });

        Ok(SessionChannels {
            messages,
            events,
            done,
        })
    }

    async fn send_message(&self, message: &Message) -> SessionResult<()> {
        let line = format!(
            "{}[{}] {}{}: {}{}",
            ansi::EVENT_COLOR,
            message.timestamp().format("%H:%M:%S"),
            username_color(&message.from().username_color()),
            message.from().username(),
            ansi::MESSAGE_COLOR,
            message.body(),
        );
        self.append_line(line);
        self.redraw_chat().await
    }

    async fn send_event(&self, event: &Message) -> SessionResult<()> {
        let line = format!(
            "{}{}{}",
            ansi::EVENT_COLOR,
            event.body(),
            ansi::MESSAGE_COLOR
        );
        self.append_line(line);
        self.redraw_chat().await
    }

    async fn close(&self) -> SessionResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.closing.notify_one();
        let mut writer = self.writer.lock().await;
        writer.shutdown().await?;
        Ok(())
    }
}

impl std::fmt::Debug for TelnetSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelnetSession")
            .field("username", &self.username())
            .field("channel", &self.channel())
            .field("rich_client", &self.rich_client())
            .field("size", &self.window_size())
            .finish()
    }
}
