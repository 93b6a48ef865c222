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

//! End-to-end handshake and input-loop tests driving a real socket pair.

use async_trait::async_trait;
use palaver_session::{
    telnet_bytes, ChatSession, SessionError, TelnetSession, UsernameDirectory, WindowSize,
};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

struct OpenDirectory;

#[async_trait]
impl UsernameDirectory for OpenDirectory {
    async fn username_available(&self, _username: &str) -> bool {
        true
    }
}

struct RejectingDirectory {
    taken: &'static str,
}

#[async_trait]
impl UsernameDirectory for RejectingDirectory {
    async fn username_available(&self, username: &str) -> bool {
        username != self.taken
    }
}

async fn socket_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let client_task = tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() });
    let (server, _) = listener.accept().await.unwrap();
    let client = client_task.await.unwrap();
    (server, client)
}

/// Reads from `stream` until `needle` has appeared in the collected bytes.
async fn read_until(stream: &mut TcpStream, needle: &[u8]) -> Vec<u8> {
    let mut collected = Vec::new();
    let mut buf = [0u8; 256];
    loop {
        let n = stream.read(&mut buf).await.unwrap();
        assert!(n > 0, "peer closed while waiting for {needle:?}");
        collected.extend_from_slice(&buf[..n]);
        if collected.windows(needle.len()).any(|window| window == needle) {
            return collected;
        }
    }
}

#[tokio::test]
async fn rich_client_handshake_negotiates_window_size() {
    let (server, mut client) = socket_pair().await;
    let session = Arc::new(TelnetSession::new(server, 20, "red", "general"));
    let handshake = tokio::spawn(session.clone().start(Arc::new(OpenDirectory)));

    read_until(
        &mut client,
        &[telnet_bytes::IAC, telnet_bytes::DO, telnet_bytes::NAWS],
    )
    .await;
    client
        .write_all(&[
            telnet_bytes::IAC,
            telnet_bytes::WILL,
            telnet_bytes::NAWS,
            telnet_bytes::IAC,
            telnet_bytes::SB,
            telnet_bytes::NAWS,
            0,
            80,
            0,
            24,
            telnet_bytes::IAC,
            telnet_bytes::SE,
        ])
        .await
        .unwrap();
    read_until(&mut client, b"username: ").await;
    client.write_all(b"alice\r\n").await.unwrap();

    let mut channels = handshake.await.unwrap().unwrap();
    assert_eq!(session.username(), "alice");
    assert!(session.rich_client());
    assert_eq!(
        session.window_size(),
        WindowSize {
            width: 80,
            height: 24
        }
    );

    client.write_all(b"hello world").await.unwrap();
    let message = channels.messages.recv().await.unwrap();
    assert_eq!(message.body(), "hello world\r\n");
    assert_eq!(message.channel(), "general");
    assert_eq!(message.from().username(), "alice");
}

#[tokio::test]
async fn plain_client_still_chats() {
    let (server, mut client) = socket_pair().await;
    let session = Arc::new(TelnetSession::new(server, 20, "blue", "general"));
    let handshake = tokio::spawn(session.clone().start(Arc::new(OpenDirectory)));

    read_until(
        &mut client,
        &[telnet_bytes::IAC, telnet_bytes::DO, telnet_bytes::NAWS],
    )
    .await;
    client
        .write_all(&[telnet_bytes::IAC, telnet_bytes::WONT, telnet_bytes::NAWS])
        .await
        .unwrap();
    read_until(&mut client, b"username: ").await;
    client.write_all(b"bob\r\n").await.unwrap();

    let mut channels = handshake.await.unwrap().unwrap();
    assert!(!session.rich_client());
    assert_eq!(session.window_size(), WindowSize::default());

    client.write_all(b"hi").await.unwrap();
    let message = channels.messages.recv().await.unwrap();
    assert_eq!(message.body(), "hi\r\n");
}

#[tokio::test]
async fn taken_username_reprompts() {
    let (server, mut client) = socket_pair().await;
    let session = Arc::new(TelnetSession::new(server, 20, "green", "general"));
    let directory = Arc::new(RejectingDirectory { taken: "taken" });
    let handshake = tokio::spawn(session.clone().start(directory));

    read_until(
        &mut client,
        &[telnet_bytes::IAC, telnet_bytes::DO, telnet_bytes::NAWS],
    )
    .await;
    client
        .write_all(&[telnet_bytes::IAC, telnet_bytes::WONT, telnet_bytes::NAWS])
        .await
        .unwrap();
    read_until(&mut client, b"username: ").await;
    client.write_all(b"taken\r\n").await.unwrap();
    read_until(&mut client, b"username is taken").await;
    client.write_all(b"fresh\r\n").await.unwrap();

    handshake.await.unwrap().unwrap();
    assert_eq!(session.username(), "fresh");
}

#[tokio::test]
async fn blank_and_control_lines_are_skipped_at_the_prompt() {
    let (server, mut client) = socket_pair().await;
    let session = Arc::new(TelnetSession::new(server, 20, "cyan", "general"));
    let handshake = tokio::spawn(session.clone().start(Arc::new(OpenDirectory)));

    read_until(
        &mut client,
        &[telnet_bytes::IAC, telnet_bytes::DO, telnet_bytes::NAWS],
    )
    .await;
    client
        .write_all(&[telnet_bytes::IAC, telnet_bytes::WONT, telnet_bytes::NAWS])
        .await
        .unwrap();
    read_until(&mut client, b"username: ").await;
    // separate writes so the prompt loop sees each line in its own read
    client.write_all(b"   \r\n").await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    client
        .write_all(&[telnet_bytes::IAC, telnet_bytes::DO, 1])
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    client.write_all(b"carol\r\n").await.unwrap();

    handshake.await.unwrap().unwrap();
    assert_eq!(session.username(), "carol");
}

#[tokio::test]
async fn part_command_signals_done() {
    let (server, mut client) = socket_pair().await;
    let session = Arc::new(TelnetSession::new(server, 20, "purple", "general"));
    let handshake = tokio::spawn(session.clone().start(Arc::new(OpenDirectory)));

    read_until(
        &mut client,
        &[telnet_bytes::IAC, telnet_bytes::DO, telnet_bytes::NAWS],
    )
    .await;
    client
        .write_all(&[telnet_bytes::IAC, telnet_bytes::WONT, telnet_bytes::NAWS])
        .await
        .unwrap();
    read_until(&mut client, b"username: ").await;
    client.write_all(b"dave\r\n").await.unwrap();

    let mut channels = handshake.await.unwrap().unwrap();
    client.write_all(b"/part\r\n").await.unwrap();
    let reason = channels.done.recv().await.unwrap();
    assert!(matches!(reason, SessionError::Closed));
}

#[tokio::test]
async fn disconnect_signals_done() {
    let (server, mut client) = socket_pair().await;
    let session = Arc::new(TelnetSession::new(server, 20, "aqua", "general"));
    let handshake = tokio::spawn(session.clone().start(Arc::new(OpenDirectory)));

    read_until(
        &mut client,
        &[telnet_bytes::IAC, telnet_bytes::DO, telnet_bytes::NAWS],
    )
    .await;
    client
        .write_all(&[telnet_bytes::IAC, telnet_bytes::WONT, telnet_bytes::NAWS])
        .await
        .unwrap();
    read_until(&mut client, b"username: ").await;
    client.write_all(b"eve\r\n").await.unwrap();

    let mut channels = handshake.await.unwrap().unwrap();
    drop(client);
    let reason = channels.done.recv().await.unwrap();
    assert!(matches!(reason, SessionError::Disconnected));
}
