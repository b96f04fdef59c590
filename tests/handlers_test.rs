use async_trait::async_trait;
use chatroom_cache::core::RoomMessageStore;
use chatroom_cache::error::{ChatCacheError, Result};
use chatroom_cache::handlers::{ChatRoomService, SendMessageRequest};
use chatroom_cache::storage::{ListBackend, ListFetch, MemoryListBackend};
use chatroom_cache::CacheConfig;
use std::sync::Arc;
use std::time::Duration;

fn service_with_ttl(secs: u64) -> ChatRoomService {
    let store = RoomMessageStore::new(Arc::new(MemoryListBackend::new()), Duration::from_secs(secs));
    ChatRoomService::new(store)
}

fn request(sender: &str, text: &str) -> SendMessageRequest {
    SendMessageRequest {
        sender: sender.to_string(),
        text: text.to_string(),
    }
}

// Backend holding an entry that is not a chat message
struct CorruptBackend;

#[async_trait]
impl ListBackend for CorruptBackend {
    async fn list_fetch(&self, _key: &str) -> Result<ListFetch> {
        Ok(ListFetch::Hit(vec!["{\"sender\":".to_string()]))
    }

    async fn list_push_back(
        &self,
        _key: &str,
        _value: String,
        _ttl: Duration,
        _truncate_front_to_size: Option<usize>,
    ) -> Result<()> {
        Ok(())
    }

    async fn list_count(&self) -> Result<usize> {
        Ok(1)
    }
}

#[tokio::test(start_paused = true)]
async fn test_join_empty_room() {
    let service = service_with_ttl(5);
    let response = service.join_room("lobby").await.unwrap();
    assert!(response.messages.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_send_then_join() {
    let service = service_with_ttl(5);

    let first = service
        .send_message("lobby", request("alice", "hello"))
        .await
        .unwrap();
    let second = service
        .send_message("lobby", request("bob", "world"))
        .await
        .unwrap();
    assert_ne!(first.id, second.id);

    let response = service.join_room("lobby").await.unwrap();
    let texts: Vec<&str> = response.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["hello", "world"]);
    assert_eq!(response.messages[0].id, first.id);
    assert_eq!(response.messages[1].sender, "bob");
}

#[tokio::test(start_paused = true)]
async fn test_join_after_ttl_is_empty() {
    let service = service_with_ttl(5);
    service
        .send_message("lobby", request("alice", "hello"))
        .await
        .unwrap();

    tokio::time::advance(Duration::from_secs(5)).await;
    let response = service.join_room("lobby").await.unwrap();
    assert!(response.messages.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_send_rejects_invalid_input() {
    let service = service_with_ttl(5);

    let cases = [
        ("", request("alice", "hello")),
        ("lobby", request("", "hello")),
        ("lobby", request("alice", "   ")),
        ("lobby", request("alice", &"x".repeat(2001))),
    ];

    for (room, req) in cases {
        let err = service.send_message(room, req).await.unwrap_err();
        assert!(matches!(err, ChatCacheError::ValidationError(_)));
        assert!(err.is_client_error());
    }

    let response = service.join_room("lobby").await.unwrap();
    assert!(response.messages.is_empty());
}

#[tokio::test]
async fn test_join_with_corrupt_entry_is_decode_error() {
    let store = RoomMessageStore::new(Arc::new(CorruptBackend), Duration::from_secs(5));
    let service = ChatRoomService::new(store);

    let err = service.join_room("lobby").await.unwrap_err();
    assert!(matches!(err, ChatCacheError::DeserializationError(_)));
    assert!(!err.is_retryable());
}

#[tokio::test(start_paused = true)]
async fn test_max_history_from_config() {
    let config = CacheConfig::from_lookup(|name: &str| match name {
        "CHATROOM_TTL" => Some("30".to_string()),
        "AUTH_TOKEN" => Some("tok_integration".to_string()),
        "CHATROOM_MAX_HISTORY" => Some("3".to_string()),
        _ => None,
    })
    .unwrap();
    let service = ChatRoomService::from_config(&config);

    for i in 0..5 {
        service
            .send_message("lobby", request("alice", &format!("message {}", i)))
            .await
            .unwrap();
    }

    let response = service.join_room("lobby").await.unwrap();
    let texts: Vec<&str> = response.messages.iter().map(|m| m.text.as_str()).collect();
    assert_eq!(texts, vec!["message 2", "message 3", "message 4"]);
}

#[tokio::test]
async fn test_response_json_shape() {
    let service = service_with_ttl(60);
    service
        .send_message("lobby", request("alice", "hello"))
        .await
        .unwrap();

    let response = service.join_room("lobby").await.unwrap();
    let json = serde_json::to_value(&response).unwrap();
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["sender"], "alice");
    assert_eq!(messages[0]["text"], "hello");
    assert!(messages[0]["sent_at"].is_string());
}
