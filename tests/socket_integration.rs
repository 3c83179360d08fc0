//! Integration tests against a fake BIRD daemon on a real Unix socket.

use std::path::{Path, PathBuf};
use std::time::Duration;

use birdsock::config::SocketConfig;
use birdsock::socket::{self, BirdSocket, ReadMode, SocketError};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixListener;
use tokio::task::JoinHandle;

const GREETING: &[u8] = b"0001 BIRD 2.14 ready.\n";

fn socket_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join("bird.ctl")
}

/// Serve one connection: greet, read one command line, then send `chunks`
/// with a short pause between each. Resolves to the command received.
///
/// With `keep_open` the daemon waits for the client to hang up; otherwise
/// it closes the connection right after the last chunk.
fn fake_daemon(path: &Path, chunks: Vec<&'static [u8]>, keep_open: bool) -> JoinHandle<String> {
    let listener = UnixListener::bind(path).expect("Failed to bind fake daemon");
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("Failed to accept");
        let (reader, mut writer) = stream.into_split();
        writer.write_all(GREETING).await.unwrap();

        let mut reader = BufReader::new(reader);
        let mut command = String::new();
        reader.read_line(&mut command).await.unwrap();

        for chunk in chunks {
            writer.write_all(chunk).await.unwrap();
            writer.flush().await.unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        if keep_open {
            let mut rest = Vec::new();
            let _ = reader.read_to_end(&mut rest).await;
        }
        command
    })
}

#[tokio::test]
async fn facade_returns_reply_sent_in_two_chunks() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir);
    let daemon = fake_daemon(&path, vec![b"1000-BIRD ready.\n", b"0000 \n"], true);

    let reply = socket::query(&path, "show status\n").await.expect("Query failed");

    assert_eq!(reply, b"1000-BIRD ready.\n0000 \n");
    assert_eq!(daemon.await.unwrap(), "show status\n");
}

#[tokio::test]
async fn facade_reports_unreachable_socket() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir);

    let err = socket::query(&path, "show status").await.unwrap_err();

    match err {
        SocketError::Connect { path: failed, .. } => assert_eq!(failed, path),
        other => panic!("Expected Connect error, got {other:?}"),
    }
}

#[tokio::test]
async fn connect_returns_greeting() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir);
    let daemon = fake_daemon(&path, vec![b"0000 \n"], true);

    let mut socket = BirdSocket::new(&path);
    let greeting = socket.connect().await.unwrap();
    assert_eq!(greeting, GREETING);
    assert!(socket.is_connected());

    let reply = socket.query("show memory").await.unwrap();
    assert_eq!(reply, b"0000 \n");

    socket.close().await;
    socket.close().await;
    assert_eq!(daemon.await.unwrap(), "show memory\n");
}

#[tokio::test]
async fn multi_line_reply_is_returned_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir);
    let daemon = fake_daemon(
        &path,
        vec![
            b"2002-Name       Proto      Table      State  Since\n",
            b"1002-device1    Device     ---        up     2026-01-01\n",
            b" kernel1    Kernel     master4    up     2026-01-01\n",
            b"0000 \n",
        ],
        true,
    );

    let reply = socket::query(&path, "show protocols").await.unwrap();

    assert!(reply.starts_with(b"2002-Name"));
    assert!(reply.ends_with(b"0000 \n"));
    assert_eq!(reply.iter().filter(|&&b| b == b'\n').count(), 4);
    daemon.await.unwrap();
}

#[tokio::test]
async fn deadline_returns_partial_reply() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir);
    let daemon = fake_daemon(&path, vec![b"1000-still thinking\n"], true);

    let config = SocketConfig::new(&path).with_read_timeout(Duration::from_millis(150));
    let reply = socket::query_with_config(config, "show route all")
        .await
        .expect("Deadline should not be an error");

    assert_eq!(reply, b"1000-still thinking\n");
    daemon.await.unwrap();
}

#[tokio::test]
async fn unconfirmed_drain_reads_past_completion() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir);
    let daemon = fake_daemon(&path, vec![b"0000 \n", b"1000-trailing\n"], true);

    let config = SocketConfig::new(&path).with_read_timeout(Duration::from_millis(200));
    let mut socket = BirdSocket::with_config(config);
    socket.connect().await.unwrap();
    let reply = socket
        .query_with_mode("show status", ReadMode::Unconfirmed)
        .await
        .unwrap();
    socket.close().await;

    assert_eq!(reply, b"0000 \n1000-trailing\n");
    daemon.await.unwrap();
}

#[tokio::test]
async fn daemon_hang_up_mid_reply_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = socket_path(&dir);
    let daemon = fake_daemon(&path, vec![b"1000-partial\n"], false);

    let err = socket::query(&path, "show status").await.unwrap_err();

    assert!(matches!(err, SocketError::ConnectionClosed));
    daemon.await.unwrap();
}
