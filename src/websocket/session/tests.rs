use super::*;
use futures::channel::mpsc;
use std::time::Duration;
use studio_tools::{AssistantConfig, MOCK_FRAGMENTS};

fn message_id(event: &SessionEvent) -> &str {
    match event {
        SessionEvent::Partial { message_id, .. } | SessionEvent::Final { message_id, .. } => message_id,
    }
}

fn is_final(event: &SessionEvent) -> bool {
    matches!(event, SessionEvent::Final { .. })
}

fn mock() -> AssistantAdapter {
    AssistantAdapter::mock(Duration::from_millis(1))
}

async fn exchange(assistant: &AssistantAdapter, raw: &str) -> Vec<SessionEvent> {
    let (mut tx, rx) = mpsc::unbounded::<SessionEvent>();
    answer(&mut tx, "s1", assistant, raw).await.unwrap();
    drop(tx);
    rx.collect().await
}

#[test]
fn test_parse_full_request() {
    let request = PromptRequest::parse(r#"{"type":"chat","messageId":"m1","payload":{"text":"hi"}}"#);
    assert_eq!(request.message_id.as_deref(), Some("m1"));
    assert_eq!(request.text, "hi");
}

#[test]
fn test_parse_missing_fields() {
    let request = PromptRequest::parse(r#"{"payload":{}}"#);
    assert_eq!(request.message_id, None);
    assert_eq!(request.text, "");

    let request = PromptRequest::parse(r#"{"messageId":"","payload":{"text":"x"}}"#);
    assert_eq!(request.message_id, None);
}

#[test]
fn test_non_json_payload_is_prompt() {
    let request = PromptRequest::parse("just some words");
    assert_eq!(request.message_id, None);
    assert_eq!(request.text, "just some words");
}

#[test]
fn test_event_wire_format() {
    let partial: serde_json::Value =
        serde_json::from_str(&SessionEvent::partial("s1", "m1", "Hi".to_string()).to_json()).unwrap();
    assert_eq!(
        partial,
        serde_json::json!({"type": "partial", "sessionId": "s1", "messageId": "m1", "payload": {"text": "Hi"}})
    );

    let done: serde_json::Value =
        serde_json::from_str(&SessionEvent::final_event("s1", "m1").to_json()).unwrap();
    assert_eq!(
        done,
        serde_json::json!({"type": "final", "sessionId": "s1", "messageId": "m1", "payload": {"done": true}})
    );
}

#[tokio::test]
async fn test_mock_reply_stream() {
    let events = exchange(&mock(), r#"{"messageId":"m1","payload":{"text":"anything"}}"#).await;

    assert_eq!(events.len(), MOCK_FRAGMENTS.len() + 1);
    assert!(events.iter().all(|e| message_id(e) == "m1"));
    assert!(events.last().is_some_and(is_final));
    assert_eq!(events.iter().filter(|e| is_final(e)).count(), 1);

    let text: String = events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::Partial { payload, .. } => Some(payload.text.as_str()),
            SessionEvent::Final { .. } => None,
        })
        .collect();
    assert_eq!(text, MOCK_FRAGMENTS.concat());
}

#[tokio::test]
async fn test_generated_message_id_is_shared() {
    let events = exchange(&mock(), r#"{"payload":{"text":"hi"}}"#).await;
    let id = message_id(&events[0]).to_string();
    assert!(Uuid::parse_str(&id).is_ok());
    assert!(events.iter().all(|e| message_id(e) == id));
}

#[tokio::test]
async fn test_unavailable_adapter_sends_only_final() {
    let assistant = AssistantAdapter::new(AssistantConfig {
        command: "definitely-not-a-real-assistant-binary".to_string(),
        ..AssistantConfig::default()
    });
    let events = exchange(&assistant, r#"{"messageId":"m2","payload":{"text":"hi"}}"#).await;
    assert_eq!(events, vec![SessionEvent::final_event("s1", "m2")]);
}

#[tokio::test]
async fn test_closed_sink_stops_reply() {
    let (mut tx, rx) = mpsc::unbounded::<SessionEvent>();
    drop(rx);
    assert!(answer(&mut tx, "s1", &mock(), "hi").await.is_err());
}
