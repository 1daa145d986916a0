pub mod sqlite;
pub mod types;

pub use sqlite::{ChatStore, DEFAULT_MESSAGE_LIMIT, SqliteChatStore, TITLE_MAX_CHARS};
pub use types::{Chat, Message, MessageRole, NewMessage};
