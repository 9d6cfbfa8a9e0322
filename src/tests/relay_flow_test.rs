//! Relay Flow Tests
//!
//! Drives the console transport through `SessionBootstrap` against a mockito
//! backend and checks what ends up in the chat and on the wire.

use crate::config::Config;
use crate::relay::{BackendClient, CONNECTION_FAILED_REPLY, EMPTY_TEXT_REPLY, TEST_COMMAND_REPLY};
use crate::session::{ConsoleTransport, SessionBootstrap};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, BufReader};

/// Feed `input` through a console session and return everything the bot wrote.
async fn run_console(config: Config, input: &'static str) -> String {
    let backend = BackendClient::new(&config.backend).unwrap();
    let (writer, mut reader) = tokio::io::duplex(64 * 1024);
    let transport = ConsoleTransport::new(BufReader::new(input.as_bytes()), writer);

    SessionBootstrap::new(Arc::new(config), Arc::new(backend), Box::new(transport))
        .run_until(std::future::pending())
        .await
        .unwrap();

    let mut out = String::new();
    reader.read_to_string(&mut out).await.unwrap();
    out
}

fn config_for(backend_url: &str, session_dir: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.backend.base_url = backend_url.to_string();
    config.backend.timeout_secs = 2;
    config.session.path = session_dir.to_path_buf();
    config
}

#[tokio::test]
async fn test_hola_round_trip() {
    let tmp = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new_async().await;

    let self_test = server
        .mock("POST", "/chat")
        .match_body(Matcher::Json(json!({"text": "test de conexión"})))
        .with_status(200)
        .with_body(r#"{"response": "ok"}"#)
        .expect(1)
        .create_async()
        .await;
    let hola = server
        .mock("POST", "/chat")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({"text": "hola"})))
        .with_status(200)
        .with_body(r#"{"response": "¡Hola! ¿Cómo puedo ayudarte?"}"#)
        .expect(1)
        .create_async()
        .await;

    let out = run_console(config_for(&server.url(), tmp.path()), "hola\n").await;

    assert_eq!(out, "bot> ¡Hola! ¿Cómo puedo ayudarte?\n");
    self_test.assert_async().await;
    hola.assert_async().await;
}

#[tokio::test]
async fn test_command_and_blank_lines_never_reach_backend() {
    let tmp = tempfile::tempdir().unwrap();
    let mut server = mockito::Server::new_async().await;

    // the ready self-test is the only call allowed
    let chat = server
        .mock("POST", "/chat")
        .match_body(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"response": "ok"}"#)
        .expect(1)
        .create_async()
        .await;

    let out = run_console(config_for(&server.url(), tmp.path()), "/test\n   \n/TeSt\n").await;

    assert_eq!(
        out,
        format!(
            "bot> {}\nbot> {}\nbot> {}\n",
            TEST_COMMAND_REPLY, EMPTY_TEXT_REPLY, TEST_COMMAND_REPLY
        )
    );
    chat.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_backend_replies_with_fallback() {
    let tmp = tempfile::tempdir().unwrap();
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let out = run_console(config_for(&url, tmp.path()), "hola\n").await;

    assert_eq!(out, format!("bot> {}\n", CONNECTION_FAILED_REPLY));
}

#[tokio::test]
async fn test_session_directory_is_created_and_reused() {
    let tmp = tempfile::tempdir().unwrap();
    let root = tmp.path().join("whatsapp-session");
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat")
        .with_status(200)
        .with_body(r#"{"response": "ok"}"#)
        .create_async()
        .await;

    run_console(config_for(&server.url(), &root), "").await;
    let dir = root.join("session-debug-bot");
    assert!(dir.is_dir());

    std::fs::write(dir.join("marker"), b"keep").unwrap();
    run_console(config_for(&server.url(), &root), "").await;
    assert_eq!(std::fs::read(dir.join("marker")).unwrap(), b"keep");
}
