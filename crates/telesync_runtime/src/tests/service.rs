use std::sync::Arc;
use std::time::Duration;

use mockito::Matcher;
use serde_json::json;
use telesync_directory::{ClientConfig, StaticDirectory};
use telesync_messaging::telegram::TelegramApi;
use telesync_messaging::telegram::WEBHOOK_PATH;
use telesync_messaging::{TelegramConfig, WebhookConfig};
use tokio_util::sync::CancellationToken;

use super::support::{config, snapshot};
use crate::service::TeleSync;

#[tokio::test]
async fn test_start_command_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/bot1:token/deleteWebhook")
        .with_body(r#"{"ok":true,"result":true}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/bot1:token/getUpdates")
        .match_body(Matcher::PartialJson(json!({ "offset": 0 })))
        .with_body(
            r#"{"ok":true,"result":[{"update_id":1,"message":{"message_id":10,"chat":{"id":55},"text":"/start"}}]}"#,
        )
        .create_async()
        .await;
    server
        .mock("POST", "/bot1:token/getUpdates")
        .match_body(Matcher::PartialJson(json!({ "offset": 2 })))
        .with_body(r#"{"ok":true,"result":[]}"#)
        .create_async()
        .await;
    let sends = server
        .mock("POST", "/bot1:token/sendMessage")
        .match_body(Matcher::PartialJson(json!({ "chat_id": 55 })))
        .with_body(r#"{"ok":true,"result":{"message_id":7,"chat":{"id":55}}}"#)
        .expect_at_least(3)
        .create_async()
        .await;
    server
        .mock("POST", "/bot1:token/deleteMessage")
        .with_body(r#"{"ok":true,"result":true}"#)
        .create_async()
        .await;

    let telegram = TelegramConfig::new("1:token")
        .with_base_url(server.url())
        .with_poll_timeout(Duration::ZERO);
    let service = TeleSync::new(
        config(&["Alpha"]),
        ClientConfig::new(),
        Arc::new(StaticDirectory::new(snapshot())),
        TelegramApi::new(telegram).unwrap(),
    );

    let shutdown = CancellationToken::new();
    let running = tokio::spawn(service.run(shutdown.clone()));

    // Placeholder, one roster page and the footer.
    for _ in 0..100 {
        if sends.matched_async().await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    sends.assert_async().await;

    shutdown.cancel();
    running.await.unwrap().unwrap();
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[tokio::test]
async fn test_webhook_delivery_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let registered = server
        .mock("POST", "/bot1:token/setWebhook")
        .match_body(Matcher::PartialJson(json!({ "url": "https://bot.example.com/webhook" })))
        .with_body(r#"{"ok":true,"result":true}"#)
        .create_async()
        .await;
    let polled = server
        .mock("POST", "/bot1:token/getUpdates")
        .expect(0)
        .create_async()
        .await;
    let sends = server
        .mock("POST", "/bot1:token/sendMessage")
        .match_body(Matcher::PartialJson(json!({ "chat_id": 77 })))
        .with_body(r#"{"ok":true,"result":{"message_id":8,"chat":{"id":77}}}"#)
        .expect_at_least(3)
        .create_async()
        .await;
    server
        .mock("POST", "/bot1:token/deleteMessage")
        .with_body(r#"{"ok":true,"result":true}"#)
        .create_async()
        .await;

    let bind = std::net::SocketAddr::from(([127, 0, 0, 1], free_port()));
    let telegram = TelegramConfig::new("1:token").with_base_url(server.url());
    let service = TeleSync::new(
        config(&["Alpha"]),
        ClientConfig::new(),
        Arc::new(StaticDirectory::new(snapshot())),
        TelegramApi::new(telegram).unwrap(),
    )
    .with_webhook(WebhookConfig::new("https://bot.example.com/webhook", bind));

    let shutdown = CancellationToken::new();
    let running = tokio::spawn(service.run(shutdown.clone()));

    let client = reqwest::Client::new();
    let update = r#"{"update_id":4,"message":{"message_id":1,"chat":{"id":77},"text":"/start"}}"#;
    let mut delivered = false;
    for _ in 0..100 {
        let response = client
            .post(format!("http://{}{}", bind, WEBHOOK_PATH))
            .header("content-type", "application/json")
            .body(update)
            .send()
            .await;
        if matches!(response, Ok(ref r) if r.status() == 200) {
            delivered = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert!(delivered, "webhook server never accepted the update");

    for _ in 0..100 {
        if sends.matched_async().await {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    sends.assert_async().await;
    registered.assert_async().await;

    shutdown.cancel();
    running.await.unwrap().unwrap();
    polled.assert_async().await;
}

#[tokio::test]
async fn test_webhook_registration_failure_stops_service() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/bot1:token/setWebhook")
        .with_body(r#"{"ok":false,"error_code":400,"description":"Bad Request: bad webhook"}"#)
        .create_async()
        .await;

    let bind = std::net::SocketAddr::from(([127, 0, 0, 1], free_port()));
    let telegram = TelegramConfig::new("1:token").with_base_url(server.url());
    let service = TeleSync::new(
        config(&["Alpha"]),
        ClientConfig::new(),
        Arc::new(StaticDirectory::new(snapshot())),
        TelegramApi::new(telegram).unwrap(),
    )
    .with_webhook(WebhookConfig::new("https://bot.example.com/webhook", bind));

    let result = tokio::time::timeout(Duration::from_secs(10), service.run(CancellationToken::new()))
        .await
        .expect("service should stop on its own");
    assert!(result.is_err());
}
