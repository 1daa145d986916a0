use serde::{Deserialize, Serialize};

/// One conversation owned by a single user. The title is fixed at creation
/// (derived from the seed text) and never re-derived from later messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A single persisted chat turn. Append-only; content may be empty for
/// image-only user turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub created_at: String,
}

/// Message payload as supplied by callers. The store assigns the id and the
/// creation timestamp itself, so client clock skew can never reorder a
/// transcript.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub role: MessageRole,
    pub content: String,
    pub image: Option<String>,
}

impl NewMessage {
    pub fn user(content: impl Into<String>, image: Option<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            image,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            image: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MessageRole, NewMessage};

    #[test]
    fn role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&MessageRole::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn constructors_set_roles() {
        let user = NewMessage::user("hi", None);
        let assistant = NewMessage::assistant("hello");
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(assistant.role, MessageRole::Assistant);
        assert!(assistant.image.is_none());
    }
}
