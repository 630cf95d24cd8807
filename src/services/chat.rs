use serde::Serialize;

use crate::db::Store;
use crate::errors::AppError;
use crate::models::{ChatMessage, ChatRole, NewChatMessage, ServiceType};
use crate::services::ai::{LlmProvider, Message};

pub const SYSTEM_PROMPT: &str = "You are a helpful travel assistant named TravelEase AI. \
You help users plan their trips, recommend destinations, and provide travel advice. \
Keep your responses concise and focused on travel-related questions.";

pub const WELCOME_MESSAGE: &str =
    "Hi there! I'm your TravelEase AI assistant. How can I help with your travel plans today?";

pub const SUGGESTIONS: [&str; 6] = [
    "What are the best destinations for a family vacation?",
    "How can I find the cheapest flights to Europe?",
    "What documents do I need for international travel?",
    "Can you recommend hotels in New York City?",
    "What's the best time to visit Bali?",
    "How do I book a package deal with flight and hotel?",
];

#[derive(Debug, Clone, Serialize)]
pub struct Suggestions {
    pub welcome: &'static str,
    pub suggestions: Vec<&'static str>,
}

pub fn suggestions() -> Suggestions {
    Suggestions {
        welcome: WELCOME_MESSAGE,
        suggestions: SUGGESTIONS.to_vec(),
    }
}

// First match wins, so "hotel near the train station" is a hotel query.
const KEYWORDS: [(ServiceType, &[&str]); 6] = [
    (ServiceType::Flight, &["flight", "plane", "airport"]),
    (ServiceType::Hotel, &["hotel", "room", "stay", "accommodation"]),
    (ServiceType::Train, &["train", "rail"]),
    (ServiceType::Cab, &["cab", "taxi", "ride"]),
    (ServiceType::Bus, &["bus", "coach"]),
    (ServiceType::Logistics, &["package", "ship", "deliver"]),
];

/// Guesses which service a free-text question is about. `None` means general.
pub fn classify_query(query: &str) -> Option<ServiceType> {
    let lower = query.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| lower.contains(w)))
        .map(|(service, _)| *service)
}

/// Persists the user's message, asks the model once, persists and returns the reply.
///
/// If the model call fails only the user row remains.
pub async fn relay(
    store: &dyn Store,
    llm: &dyn LlmProvider,
    message: Option<&str>,
    user_id: Option<i64>,
) -> Result<String, AppError> {
    let content = message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::InvalidArgument("Message content is required".to_string()))?;

    let category = classify_query(content).map_or("general", |s| s.as_str());

    store.save_chat_message(NewChatMessage {
        user_id,
        role: ChatRole::User,
        content: content.to_string(),
    })?;

    tracing::info!(?user_id, category, "relaying chat message");

    let reply = llm
        .chat(SYSTEM_PROMPT, &[Message::user(content)])
        .await
        .map_err(|e| AppError::Upstream(format!("{e:#}")))?;

    store.save_chat_message(NewChatMessage {
        user_id,
        role: ChatRole::Assistant,
        content: reply.clone(),
    })?;

    Ok(reply)
}

pub fn history(store: &dyn Store, user_id: i64) -> Result<Vec<ChatMessage>, AppError> {
    Ok(store.get_user_chat_history(user_id)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use async_trait::async_trait;

    struct EchoLlm;

    #[async_trait]
    impl LlmProvider for EchoLlm {
        async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
            assert_eq!(system_prompt, SYSTEM_PROMPT);
            assert_eq!(messages.len(), 1);
            Ok(format!("echo: {}", messages[0].content))
        }
    }

    struct DownLlm;

    #[async_trait]
    impl LlmProvider for DownLlm {
        async fn chat(&self, _system_prompt: &str, _messages: &[Message]) -> anyhow::Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    #[test]
    fn test_classify_query() {
        assert_eq!(classify_query("Cheapest FLIGHT to Paris?"), Some(ServiceType::Flight));
        assert_eq!(classify_query("a hotel near the train station"), Some(ServiceType::Hotel));
        assert_eq!(classify_query("is rail travel fast"), Some(ServiceType::Train));
        assert_eq!(classify_query("need a taxi"), Some(ServiceType::Cab));
        assert_eq!(classify_query("overnight coach"), Some(ServiceType::Bus));
        assert_eq!(classify_query("deliver my parcel"), Some(ServiceType::Logistics));
        assert_eq!(classify_query("what should I pack?"), None);
    }

    #[test]
    fn test_suggestions() {
        let s = suggestions();
        assert_eq!(s.suggestions.len(), 6);
        assert!(s.welcome.contains("TravelEase"));
    }

    #[tokio::test]
    async fn test_relay_persists_both_turns() {
        let store = SqliteStore::open(":memory:").unwrap();
        let reply = relay(&store, &EchoLlm, Some("Best time to visit Bali?"), Some(4))
            .await
            .unwrap();
        assert_eq!(reply, "echo: Best time to visit Bali?");

        let history = history(&store, 4).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[1].role, ChatRole::Assistant);
        assert_eq!(history[1].content, reply);
    }

    #[tokio::test]
    async fn test_relay_rejects_blank_message() {
        let store = SqliteStore::open(":memory:").unwrap();
        for message in [None, Some(""), Some("   ")] {
            assert!(matches!(
                relay(&store, &EchoLlm, message, Some(1)).await,
                Err(AppError::InvalidArgument(_))
            ));
        }
        assert!(history(&store, 1).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_relay_failure_keeps_only_user_turn() {
        let store = SqliteStore::open(":memory:").unwrap();
        let result = relay(&store, &DownLlm, Some("hello"), Some(2)).await;
        assert!(matches!(result, Err(AppError::Upstream(_))));

        let history = history(&store, 2).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, ChatRole::User);
    }
}
