//! End-to-end tests: client → relay → mock completion API.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

mod common;

async fn answer_backend(content: &'static str) -> std::net::SocketAddr {
    common::start_programmable_backend(move |_| async move {
        let body = json!({"choices": [{"message": {"content": content}}]});
        (200, body.to_string())
    })
    .await
}

async fn ping(client: &reqwest::Client, relay: &common::TestRelay) -> Value {
    client
        .get(relay.url("/ping"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_question_answered() {
    let upstream = answer_backend("Yes.   The cards.\nshow promise").await;
    let relay = common::spawn_relay(common::relay_config(upstream)).await;
    let client = common::client();

    let res = client
        .post(relay.url("/tarot-chat"))
        .json(&json!({"question": "  Will I find love?  "}))
        .send()
        .await
        .expect("Relay unreachable");

    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"answer": "Yes. The cards. show promise."}));

    let status = ping(&client, &relay).await;
    assert_eq!(status["requests_total"], 1);
    assert_eq!(status["errors_total"], 0);

    relay.shutdown.trigger();
}

#[tokio::test]
async fn test_already_clean_answer_passes_through() {
    let upstream = answer_backend("Yes. The cards. show promise.").await;
    let relay = common::spawn_relay(common::relay_config(upstream)).await;

    let body: Value = common::client()
        .post(relay.url("/tarot-chat"))
        .json(&json!({"question": "Will I find love?"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body, json!({"answer": "Yes. The cards. show promise."}));
}

#[tokio::test]
async fn test_question_forwarded_trimmed() {
    let seen = Arc::new(std::sync::Mutex::new(String::new()));
    let s = seen.clone();
    let upstream = common::start_programmable_backend(move |req| {
        let s = s.clone();
        async move {
            let content = req.json()["messages"][0]["content"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            *s.lock().unwrap() = content;
            (200, r#"{"choices":[{"message":{"content":"ok"}}]}"#.to_string())
        }
    })
    .await;
    let relay = common::spawn_relay(common::relay_config(upstream)).await;

    let res = common::client()
        .post(relay.url("/tarot-chat"))
        .json(&json!({"question": "\n  What does the Moon mean?\t"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let prompt = seen.lock().unwrap().clone();
    assert!(prompt.ends_with("Question: What does the Moon mean?"));
}

#[tokio::test]
async fn test_missing_question_rejected() {
    let upstream = answer_backend("unused").await;
    let relay = common::spawn_relay(common::relay_config(upstream)).await;
    let client = common::client();

    let res = client
        .post(relay.url("/tarot-chat"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());

    let res = client
        .post(relay.url("/tarot-chat"))
        .header("content-type", "text/plain")
        .body("Will I find love?")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let res = client
        .post(relay.url("/tarot-chat"))
        .header("content-type", "application/json")
        .body("{\"question\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    let status = ping(&client, &relay).await;
    assert_eq!(status["requests_total"], 3);
    assert_eq!(status["errors_total"], 3);
}

#[tokio::test]
async fn test_empty_choices_is_bad_gateway() {
    let upstream = common::start_programmable_backend(|_| async {
        (200, r#"{"choices": []}"#.to_string())
    })
    .await;
    let relay = common::spawn_relay(common::relay_config(upstream)).await;
    let client = common::client();

    let res = client
        .post(relay.url("/tarot-chat"))
        .json(&json!({"question": "Anything?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"error": "empty answer from AI"}));

    let status = ping(&client, &relay).await;
    assert_eq!(status["errors_total"], 1);
}

#[tokio::test]
async fn test_missing_content_is_bad_gateway() {
    let upstream = common::start_programmable_backend(|_| async {
        (200, r#"{"choices": [{"finish_reason": "stop"}]}"#.to_string())
    })
    .await;
    let relay = common::spawn_relay(common::relay_config(upstream)).await;

    let res = common::client()
        .post(relay.url("/tarot-chat"))
        .json(&json!({"question": "Anything?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);
}

#[tokio::test]
async fn test_upstream_failure_is_server_error() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let upstream = common::start_programmable_backend(move |_| {
        let cc = cc.clone();
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            (429, "{}".to_string())
        }
    })
    .await;
    let relay = common::spawn_relay(common::relay_config(upstream)).await;
    let client = common::client();

    let res = client
        .post(relay.url("/tarot-chat"))
        .json(&json!({"question": "Will I find love?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.contains("after 3 attempts"));
    assert!(!message.contains("test-key"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    let status = ping(&client, &relay).await;
    assert_eq!(status["requests_total"], 1);
    assert_eq!(status["errors_total"], 1);
}

#[tokio::test]
async fn test_oversized_body_rejected_as_json() {
    let upstream = answer_backend("unused").await;
    let relay = common::spawn_relay(common::relay_config(upstream)).await;
    let client = common::client();

    let question = "Will I find love? ".repeat(70 * 1024 / 18 + 1);
    let res = client
        .post(relay.url("/tarot-chat"))
        .json(&json!({ "question": question }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("request body rejected"));

    let status = ping(&client, &relay).await;
    assert_eq!(status["requests_total"], 1);
    assert_eq!(status["errors_total"], 1);
}

#[tokio::test]
async fn test_request_timeout_counted_as_error() {
    let upstream = common::start_programmable_backend(|_| async {
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        (200, r#"{"choices":[{"message":{"content":"Too late."}}]}"#.to_string())
    })
    .await;
    let mut config = common::relay_config(upstream);
    config.service.request_timeout_secs = 1;
    let relay = common::spawn_relay(config).await;
    let client = common::client();

    let res = client
        .post(relay.url("/tarot-chat"))
        .json(&json!({"question": "Will I find love?"}))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), 500);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({"error": "request timed out after 1s"}));

    let status = ping(&client, &relay).await;
    assert_eq!(status["requests_total"], 1);
    assert_eq!(status["errors_total"], 1);
}

#[tokio::test]
async fn test_status_endpoints() {
    let upstream = answer_backend("unused").await;
    let mut config = common::relay_config(upstream);
    config.service.version_label = "integration".into();
    let relay = common::spawn_relay(config).await;
    let client = common::client();

    let status = ping(&client, &relay).await;
    assert_eq!(status["status"], "alive");
    assert_eq!(status["requests_total"], 0);
    assert_eq!(status["errors_total"], 0);
    assert!(status["rust_version"].is_string());

    let home: Value = client
        .get(relay.url("/"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(home["version"], "integration");
    assert_eq!(home["requests_total"], 0);
    assert!(home["status"].as_str().unwrap().contains("Tarot"));
}

#[tokio::test]
async fn test_concurrent_requests_counted() {
    let upstream = answer_backend("Fine.").await;
    let relay = Arc::new(common::spawn_relay(common::relay_config(upstream)).await);
    let client = common::client();

    let mut handles = Vec::new();
    for i in 0..20 {
        let client = client.clone();
        let relay = relay.clone();
        handles.push(tokio::spawn(async move {
            let payload = if i % 2 == 0 {
                json!({"question": "Again?"})
            } else {
                json!({"nope": true})
            };
            client
                .post(relay.url("/tarot-chat"))
                .json(&payload)
                .send()
                .await
                .unwrap()
                .status()
                .as_u16()
        }));
    }

    let mut ok = 0;
    for h in handles {
        if h.await.unwrap() == 200 {
            ok += 1;
        }
    }
    assert_eq!(ok, 10);

    let status = ping(&client, &relay).await;
    assert_eq!(status["requests_total"], 20);
    assert_eq!(status["errors_total"], 10);
}
