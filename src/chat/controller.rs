//! Client-side chat session state for one owner: the chat list, the active
//! transcript, and loading flags, refreshed by re-reading the store rather
//! than by local echo.

use crate::chat::action::{ChatAction, ChatSendInput};
use crate::error::{NexaError, Result, ValidationError};
use crate::store::{Chat, ChatStore, Message};
use std::sync::Arc;

pub struct ChatController {
    owner_id: String,
    store: Arc<dyn ChatStore>,
    action: Arc<ChatAction>,
    chats: Vec<Chat>,
    active_chat_id: Option<String>,
    messages: Vec<Message>,
    chats_loading: bool,
    messages_loading: bool,
    history_limit: Option<usize>,
}

impl ChatController {
    pub fn new(owner_id: impl Into<String>, store: Arc<dyn ChatStore>, action: Arc<ChatAction>) -> Self {
        Self {
            owner_id: owner_id.into(),
            store,
            action,
            chats: Vec::new(),
            active_chat_id: None,
            messages: Vec::new(),
            chats_loading: false,
            messages_loading: false,
            history_limit: None,
        }
    }

    /// Cap transcript reads at `limit` messages instead of the store default.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    pub fn active_chat_id(&self) -> Option<&str> {
        self.active_chat_id.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.chats_loading || self.messages_loading
    }

    /// Re-read the owner's chat list (newest first). When no chat is active
    /// yet, the newest chat becomes active and its transcript is loaded.
    pub async fn refresh_chats(&mut self) -> Result<()> {
        self.chats_loading = true;
        let loaded = self.store.list_chats(&self.owner_id).await;
        self.chats_loading = false;
        self.chats = loaded.map_err(NexaError::Store)?;

        if self.active_chat_id.is_none() {
            if let Some(newest) = self.chats.first() {
                let id = newest.id.clone();
                self.select_chat(&id).await?;
            }
        }
        Ok(())
    }

    /// Make `chat_id` the active chat and load its transcript, oldest first.
    pub async fn select_chat(&mut self, chat_id: &str) -> Result<()> {
        self.active_chat_id = Some(chat_id.to_string());
        self.refresh_messages().await
    }

    /// Create a chat titled from `seed`, make it active, and refresh the list.
    pub async fn new_chat(&mut self, seed: &str) -> Result<Chat> {
        let chat = self
            .store
            .create_chat(&self.owner_id, seed)
            .await
            .map_err(NexaError::Store)?;
        self.active_chat_id = Some(chat.id.clone());
        self.messages.clear();
        self.refresh_chats().await?;
        Ok(chat)
    }

    /// Run one turn against the active chat, then re-read the transcript so
    /// local state reflects exactly what was persisted. A turn that failed
    /// generation still leaves its user/fallback pair behind, so the refresh
    /// happens on the error path too.
    pub async fn send(&mut self, query: &str, photo_data_uri: Option<String>) -> Result<String> {
        let Some(chat_id) = self.active_chat_id.clone() else {
            return Err(ValidationError::Empty { field: "chat_id" }.into());
        };

        let outcome = self
            .action
            .send(&ChatSendInput {
                chat_id,
                query: query.to_string(),
                photo_data_uri,
            })
            .await;

        self.refresh_messages().await?;
        outcome
    }

    async fn refresh_messages(&mut self) -> Result<()> {
        let Some(chat_id) = self.active_chat_id.clone() else {
            self.messages.clear();
            return Ok(());
        };
        self.messages_loading = true;
        let loaded = self.store.list_messages(&chat_id, self.history_limit).await;
        self.messages_loading = false;
        self.messages = loaded.map_err(NexaError::Store)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::ChatController;
    use crate::chat::action::{ChatAction, FALLBACK_ANSWER};
    use crate::flows::FlowInvoker;
    use crate::flows::test_support::ScriptedProvider;
    use crate::store::{ChatStore, MessageRole, SqliteChatStore};
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;

    async fn store() -> Arc<SqliteChatStore> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        Arc::new(SqliteChatStore::new(pool).await.unwrap())
    }

    fn controller(store: Arc<SqliteChatStore>, provider: ScriptedProvider) -> ChatController {
        let flows = Arc::new(FlowInvoker::new(Arc::new(provider), "test-model", 0.7));
        let action = Arc::new(ChatAction::new(store.clone(), flows));
        ChatController::new("owner-1", store, action)
    }

    #[tokio::test]
    async fn refresh_selects_newest_chat_when_none_active() {
        let store = store().await;
        store.create_chat("owner-1", "older chat").await.unwrap();
        let newest = store.create_chat("owner-1", "newest chat").await.unwrap();

        let mut controller = controller(store, ScriptedProvider::answering("unused"));
        controller.refresh_chats().await.unwrap();

        assert_eq!(controller.chats().len(), 2);
        assert_eq!(controller.active_chat_id(), Some(newest.id.as_str()));
    }

    #[tokio::test]
    async fn refresh_with_no_chats_leaves_nothing_active() {
        let mut controller = controller(store().await, ScriptedProvider::answering("unused"));
        controller.refresh_chats().await.unwrap();
        assert!(controller.chats().is_empty());
        assert!(controller.active_chat_id().is_none());
        assert!(!controller.is_loading());
    }

    #[tokio::test]
    async fn new_chat_becomes_active_and_tops_the_list() {
        let mut controller = controller(store().await, ScriptedProvider::answering("unused"));
        let chat = controller.new_chat("picking bathroom tiles").await.unwrap();

        assert_eq!(controller.active_chat_id(), Some(chat.id.as_str()));
        assert_eq!(controller.chats()[0].id, chat.id);
        assert_eq!(chat.title, "picking bathroom tiles");
        assert!(controller.messages().is_empty());
    }

    #[tokio::test]
    async fn send_refreshes_transcript_from_store() {
        let store = store().await;
        let mut controller =
            controller(store.clone(), ScriptedProvider::answering("Vitrified tiles."));
        controller.new_chat("tiles").await.unwrap();

        let answer = controller.send("Which tiles for a bathroom?", None).await.unwrap();

        assert_eq!(answer, "Vitrified tiles.");
        assert_eq!(controller.messages().len(), 2);
        assert_eq!(controller.messages()[0].role, MessageRole::User);
        assert_eq!(controller.messages()[1].content, "Vitrified tiles.");
    }

    #[tokio::test]
    async fn failed_send_still_shows_persisted_fallback_pair() {
        let mut controller = controller(store().await, ScriptedProvider::failing("quota"));
        controller.new_chat("budget").await.unwrap();

        let result = controller.send("How much per sq ft?", None).await;

        assert!(result.is_err());
        assert_eq!(controller.messages().len(), 2);
        assert_eq!(controller.messages()[1].content, FALLBACK_ANSWER);
    }

    #[tokio::test]
    async fn history_limit_caps_transcript_reads() {
        let store = store().await;
        let mut controller = controller(store.clone(), ScriptedProvider::answering("Granite."))
            .with_history_limit(1);
        controller.new_chat("stone").await.unwrap();

        let _ = controller.send("What stone?", None).await.unwrap();

        // Two messages persisted, but reads honor the configured cap.
        let chat_id = controller.active_chat_id().unwrap().to_string();
        assert_eq!(store.list_messages(&chat_id, None).await.unwrap().len(), 2);
        assert_eq!(controller.messages().len(), 1);
        assert_eq!(controller.messages()[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn send_without_active_chat_is_rejected() {
        let mut controller = controller(store().await, ScriptedProvider::answering("unused"));
        assert!(controller.send("hello", None).await.is_err());
    }

    #[tokio::test]
    async fn select_chat_swaps_transcript() {
        let store = store().await;
        let mut controller = controller(
            store.clone(),
            ScriptedProvider::new(vec![
                Ok(r#"{"answer": "first"}"#.into()),
                Ok(r#"{"answer": "second"}"#.into()),
            ]),
        );

        let a = controller.new_chat("chat a").await.unwrap();
        controller.send("one", None).await.unwrap();
        let b = controller.new_chat("chat b").await.unwrap();
        controller.send("two", None).await.unwrap();

        assert_eq!(controller.messages()[1].content, "second");
        controller.select_chat(&a.id).await.unwrap();
        assert_eq!(controller.active_chat_id(), Some(a.id.as_str()));
        assert_eq!(controller.messages()[1].content, "first");
        let _ = b;
    }
}
