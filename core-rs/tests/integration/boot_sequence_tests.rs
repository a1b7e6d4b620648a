//! Integration tests for the full boot sequence
//!
//! A saurus.yaml is written to a temp dir and pointed at one mock server
//! that plays both the remote store and the Telegram Bot API. The operator
//! is a scripted console.

use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use httpmock::prelude::*;
use saurus_core::runtime::{TelegramChat, TelegramMessage, TelegramUpdate, TelegramUser};
use saurus_core::{
    BootConfig, BootContext, BootError, BootOrchestrator, ScriptedConsole, TelegramRuntime,
};
use serde_json::json;
use tempfile::TempDir;

const BOT_TOKEN: &str = "7000000001:AAH-integration";
const PASSWORD: &str = "dino-rawr";

fn write_project(temp: &TempDir, store_host: &str) -> BootConfig {
    let config_yaml = format!(
        r#"
apiVersion: saurus/v1
kind: Bootstrap
metadata:
  name: integration-bot
  owner: "@lordsaurus"
spec:
  token: "{token}"
  requestTimeoutSecs: 2
  typingDelayMs: 0
  store:
    host: {host}
  telegram:
    apiBase: {host}
    pollTimeoutSecs: 0
"#,
        token = BOT_TOKEN,
        host = store_host
    );
    fs::write(temp.path().join("saurus.yaml"), config_yaml).unwrap();

    let plugins = temp.path().join("plugins");
    fs::create_dir(&plugins).unwrap();
    fs::write(
        plugins.join("ping.yaml"),
        "name: ping\ncommand: /ping\ndescription: Health check\nreply: pong\n",
    )
    .unwrap();
    fs::write(
        plugins.join("restart.yml"),
        "name: restart\ncommand: /restart\nreply: restarting\nrole: owner\n",
    )
    .unwrap();

    fs::write(
        temp.path().join("roles.yaml"),
        "roles:\n  - name: owner\n    members: [\"@lordsaurus\"]\n    commands: [\"*\"]\n",
    )
    .unwrap();

    BootConfig::load(temp.path().join("saurus.yaml")).unwrap()
}

async fn mock_store(server: &MockServer, tokens: serde_json::Value) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/saurusrawr/dbsaurus/main/password.json");
            then.status(200).json_body(json!({ "password": PASSWORD }));
        })
        .await;

    let link = server.url("/db/tokens.json");
    server
        .mock_async(move |when, then| {
            when.method(GET).path("/saurusrawr/dbsaurus/main/database.json");
            then.status(200).json_body(json!({ "databaseLink": link }));
        })
        .await;

    server
        .mock_async(move |when, then| {
            when.method(GET).path("/db/tokens.json");
            then.status(200).json_body(json!({ "tokens": tokens }));
        })
        .await;
}

async fn mock_get_me(server: &MockServer) {
    let path = format!("/bot{}/getMe", BOT_TOKEN);
    server
        .mock_async(move |when, then| {
            when.method(GET).path(path);
            then.status(200).json_body(json!({
                "ok": true,
                "result": {"id": 7000000001_i64, "is_bot": true, "first_name": "Saurus", "username": "saurus_bot"}
            }));
        })
        .await;
}

fn runtime_for(config: &BootConfig) -> TelegramRuntime {
    TelegramRuntime::new(
        &config.spec.telegram.api_base,
        &config.spec.token,
        config.request_timeout(),
        config.spec.telegram.poll_timeout_secs,
    )
    .unwrap()
}

fn message(update_id: i64, username: &str, text: &str) -> TelegramUpdate {
    TelegramUpdate {
        update_id,
        message: Some(TelegramMessage {
            message_id: update_id * 10,
            chat: TelegramChat { id: 42 },
            from: Some(TelegramUser {
                id: 1000 + update_id,
                username: Some(username.to_string()),
            }),
            text: Some(text.to_string()),
        }),
    }
}

fn assert_no_plaintext_token(output: &str) {
    assert!(
        !output.contains(BOT_TOKEN),
        "console output leaked the bot token:\n{}",
        output
    );
}

#[tokio::test]
async fn test_boot_from_config_file_to_running_bot() {
    let server = MockServer::start_async().await;
    let temp = TempDir::new().unwrap();
    let config = write_project(&temp, &server.base_url());
    mock_store(&server, json!(["5000000000:OTHER", BOT_TOKEN, ""])).await;
    mock_get_me(&server).await;

    let runtime = runtime_for(&config);
    let ctx = BootContext::from_config(config).unwrap();
    let mut console = ScriptedConsole::new(["wrong", PASSWORD]);

    let booted = BootOrchestrator::new(ctx, &mut console)
        .run(runtime)
        .await
        .expect("boot should succeed on the second attempt");

    assert_eq!(booted.report.attempts, 2);
    assert_eq!(booted.report.token_count, 2);
    assert_eq!(booted.report.plugin_count, 2);
    assert_eq!(booted.report.role_count, 1);
    assert_eq!(booted.report.bot.username, "saurus_bot");
    assert_eq!(
        booted.runtime.identity().map(|identity| identity.username.as_str()),
        Some("saurus_bot")
    );
    assert_eq!(console.reads(), 2);

    let output = console.output();
    assert!(output.contains("VERIFICATION REJECTED"));
    assert!(output.contains("AUTH SUCCESS"));
    assert!(output.contains("2 active tokens found in database."));
    assert!(output.contains("@saurus_bot"));
    assert!(output.contains("@lordsaurus"));
    assert_no_plaintext_token(output);
}

#[tokio::test]
async fn test_booted_bot_answers_commands_with_roles_applied() {
    let server = MockServer::start_async().await;
    let temp = TempDir::new().unwrap();
    let config = write_project(&temp, &server.base_url());
    mock_store(&server, json!([BOT_TOKEN])).await;
    mock_get_me(&server).await;

    let send_path = format!("/bot{}/sendMessage", BOT_TOKEN);
    let pong = server
        .mock_async({
            let path = send_path.clone();
            move |when, then| {
                when.method(POST)
                    .path(path)
                    .json_body(json!({"chat_id": 42, "text": "pong", "reply_to_message_id": 10}));
                then.status(200).json_body(json!({"ok": true, "result": {"message_id": 1}}));
            }
        })
        .await;
    let refused = server
        .mock_async({
            let path = send_path.clone();
            move |when, then| {
                when.method(POST).path(path).json_body(json!({
                    "chat_id": 42,
                    "text": "⛔ /restart is restricted.",
                    "reply_to_message_id": 20
                }));
                then.status(200).json_body(json!({"ok": true, "result": {"message_id": 2}}));
            }
        })
        .await;
    let restarted = server
        .mock_async(move |when, then| {
            when.method(POST).path(send_path).json_body(json!({
                "chat_id": 42,
                "text": "restarting",
                "reply_to_message_id": 30
            }));
            then.status(200).json_body(json!({"ok": true, "result": {"message_id": 3}}));
        })
        .await;

    let runtime = runtime_for(&config);
    let ctx = BootContext::from_config(config).unwrap();
    let mut console = ScriptedConsole::new([PASSWORD]);
    let booted = BootOrchestrator::new(ctx, &mut console).run(runtime).await.unwrap();

    let bot = &booted.runtime;
    assert!(bot
        .handle_update(&message(1, "someone", "/ping@saurus_bot"), &booted.plugins, &booted.roles)
        .await
        .unwrap());
    assert!(bot
        .handle_update(&message(2, "someone", "/restart"), &booted.plugins, &booted.roles)
        .await
        .unwrap());
    assert!(bot
        .handle_update(&message(3, "LordSaurus", "/restart now"), &booted.plugins, &booted.roles)
        .await
        .unwrap());

    pong.assert_async().await;
    refused.assert_async().await;
    restarted.assert_async().await;
}

#[tokio::test]
async fn test_serve_stops_when_shutdown_is_already_requested() {
    let server = MockServer::start_async().await;
    let temp = TempDir::new().unwrap();
    let config = write_project(&temp, &server.base_url());
    mock_store(&server, json!([BOT_TOKEN])).await;
    mock_get_me(&server).await;
    let updates = server
        .mock_async(|when, then| {
            when.method(GET).path_includes("/getUpdates");
            then.status(200).json_body(json!({"ok": true, "result": []}));
        })
        .await;

    let runtime = runtime_for(&config);
    let ctx = BootContext::from_config(config).unwrap();
    let mut console = ScriptedConsole::new([PASSWORD]);
    let booted = BootOrchestrator::new(ctx, &mut console).run(runtime).await.unwrap();

    let shutdown = Arc::new(AtomicBool::new(true));
    booted
        .runtime
        .serve(&booted.plugins, &booted.roles, shutdown)
        .await
        .unwrap();

    assert_eq!(updates.calls_async().await, 0);
}

#[tokio::test]
async fn test_unregistered_token_never_reaches_the_bot_api() {
    let server = MockServer::start_async().await;
    let temp = TempDir::new().unwrap();
    let config = write_project(&temp, &server.base_url());
    mock_store(&server, json!(["5000000000:OTHER"])).await;
    let get_me = server
        .mock_async(|when, then| {
            when.method(GET).path_includes("/getMe");
            then.status(200).json_body(json!({"ok": true, "result": {"id": 1, "username": "x"}}));
        })
        .await;

    let runtime = runtime_for(&config);
    let ctx = BootContext::from_config(config).unwrap();
    let mut console = ScriptedConsole::new([PASSWORD]);
    let result = BootOrchestrator::new(ctx, &mut console).run(runtime).await;

    match result {
        Err(BootError::UnauthorizedToken { masked }) => {
            assert_eq!(masked, "700*******:A**************");
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("boot must stop on an unregistered token"),
    }
    assert_eq!(get_me.calls_async().await, 0);
    assert!(console.output().contains("1. 500*******:O****"));
    assert_no_plaintext_token(console.output());
}

#[tokio::test]
async fn test_closed_input_is_fatal_and_skips_token_check() {
    let server = MockServer::start_async().await;
    let temp = TempDir::new().unwrap();
    let config = write_project(&temp, &server.base_url());
    mock_store(&server, json!([BOT_TOKEN])).await;

    let runtime = runtime_for(&config);
    let ctx = BootContext::from_config(config).unwrap();
    let mut console = ScriptedConsole::new(Vec::<String>::new());
    let result = BootOrchestrator::new(ctx, &mut console).run(runtime).await;

    let err = match result {
        Err(err) => err,
        Ok(_) => panic!("boot must fail when operator input is closed"),
    };
    assert!(matches!(err, BootError::InputClosed));
    assert_eq!(err.exit_code(), 1);
    assert!(!console.output().contains("Checking access token"));
}

#[tokio::test]
async fn test_store_outage_fails_closed() {
    let temp = TempDir::new().unwrap();
    // Nothing listens on the discard port
    let config = write_project(&temp, "http://127.0.0.1:9");
    assert!(Path::new(&config.spec.plugins.dir).is_absolute());

    let runtime = runtime_for(&config);
    let ctx = BootContext::from_config(config).unwrap();
    let mut console = ScriptedConsole::new([PASSWORD]);
    let result = BootOrchestrator::new(ctx, &mut console).run(runtime).await;

    assert!(matches!(result, Err(BootError::MissingCredential)));
    assert_eq!(console.reads(), 0);
}
