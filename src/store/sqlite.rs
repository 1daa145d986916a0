use super::types::{Chat, Message, MessageRole, NewMessage};
use crate::error::StoreError;
use chrono::Utc;
use sqlx::Row;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use std::future::Future;
use std::pin::Pin;
use uuid::Uuid;

/// Cap applied to transcript reads when the caller does not pass a limit.
pub const DEFAULT_MESSAGE_LIMIT: usize = 100;

/// Maximum chat title length, in characters, derived from the seed text.
pub const TITLE_MAX_CHARS: usize = 40;

const FALLBACK_TITLE: &str = "New Chat";

type StoreResult<T> = std::result::Result<T, StoreError>;

/// Async chat persistence contract.
pub trait ChatStore: Send + Sync {
    /// Chats owned by `owner_id`, newest first. An empty owner id yields an
    /// empty list rather than an error.
    fn list_chats<'a>(
        &'a self,
        owner_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<Chat>>> + Send + 'a>>;

    /// Transcript of `chat_id`, oldest first, capped at `limit`
    /// (`DEFAULT_MESSAGE_LIMIT` when `None`). An empty chat id yields an
    /// empty list.
    fn list_messages<'a>(
        &'a self,
        chat_id: &'a str,
        limit: Option<usize>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<Message>>> + Send + 'a>>;

    fn get_chat<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<Chat>>> + Send + 'a>>;

    /// Create a chat titled from the first `TITLE_MAX_CHARS` characters of
    /// `seed_text`, or "New Chat" when the seed is empty.
    fn create_chat<'a>(
        &'a self,
        owner_id: &'a str,
        seed_text: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Chat>> + Send + 'a>>;

    /// Append a message. The creation timestamp is assigned server-side at
    /// write time. Errors (missing chat id, unknown chat) propagate to the
    /// caller; they are never swallowed.
    fn append_message<'a>(
        &'a self,
        chat_id: &'a str,
        message: NewMessage,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Message>> + Send + 'a>>;
}

/// Derive a chat title from the first user message.
fn title_from_seed(seed_text: &str) -> String {
    let seed = seed_text.trim();
    if seed.is_empty() {
        return FALLBACK_TITLE.to_string();
    }
    seed.chars().take(TITLE_MAX_CHARS).collect()
}

// ─── SQLite implementation ──────────────────────────────────────────────────

/// SQLite-backed chat store using an sqlx async pool.
pub struct SqliteChatStore {
    pool: SqlitePool,
}

const CHAT_SCHEMA_META_TABLE: &str = "
CREATE TABLE IF NOT EXISTS chat_schema_meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
)";
const CHAT_SCHEMA_VERSION_KEY: &str = "chat_schema_version";
const CHAT_SCHEMA_VERSION: u32 = 1;

async fn ensure_chat_schema_version(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(CHAT_SCHEMA_META_TABLE).execute(pool).await?;

    let stored_version: Option<(String,)> =
        sqlx::query_as("SELECT value FROM chat_schema_meta WHERE key = $1")
            .bind(CHAT_SCHEMA_VERSION_KEY)
            .fetch_optional(pool)
            .await?;

    if let Some((value,)) = stored_version {
        let parsed = value
            .parse::<u32>()
            .map_err(|_| StoreError::Schema(format!("invalid schema version value: {value}")))?;
        if parsed != CHAT_SCHEMA_VERSION {
            return Err(StoreError::Schema(format!(
                "incompatible chat schema version: stored={parsed}, expected={CHAT_SCHEMA_VERSION}. \
remove the chat DB and restart."
            )));
        }
        return Ok(());
    }

    let legacy_table_count: (i64,) = sqlx::query_as(
        "SELECT COUNT(*)
         FROM sqlite_master
         WHERE type = 'table'
           AND name IN ('chats', 'messages')",
    )
    .fetch_one(pool)
    .await?;

    if legacy_table_count.0 > 0 {
        return Err(StoreError::Schema(
            "legacy chat database detected without schema version metadata. \
remove the chat DB and restart."
                .into(),
        ));
    }

    sqlx::query("INSERT INTO chat_schema_meta (key, value) VALUES ($1, $2)")
        .bind(CHAT_SCHEMA_VERSION_KEY)
        .bind(CHAT_SCHEMA_VERSION.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

impl SqliteChatStore {
    /// Create a new store with an existing pool and run migrations.
    pub async fn new(pool: SqlitePool) -> StoreResult<Self> {
        sqlx::query("PRAGMA foreign_keys = ON;").execute(&pool).await?;

        ensure_chat_schema_version(&pool).await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chats (
                 id TEXT PRIMARY KEY,
                 owner_id TEXT NOT NULL,
                 title TEXT NOT NULL,
                 created_at TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS messages (
                 id TEXT PRIMARY KEY,
                 chat_id TEXT NOT NULL REFERENCES chats(id) ON DELETE CASCADE,
                 role TEXT NOT NULL,
                 content TEXT NOT NULL,
                 image TEXT,
                 created_at TEXT NOT NULL
             )",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_chat
                 ON messages(chat_id, created_at)",
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chats_owner
                 ON chats(owner_id, created_at)",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

fn role_to_str(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
    }
}

fn str_to_role(value: &str) -> StoreResult<MessageRole> {
    match value {
        "user" => Ok(MessageRole::User),
        "assistant" => Ok(MessageRole::Assistant),
        _ => Err(StoreError::Schema(format!("unknown message role: {value}"))),
    }
}

fn map_chat_row(row: &SqliteRow) -> StoreResult<Chat> {
    Ok(Chat {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        title: row.try_get("title")?,
        created_at: row.try_get("created_at")?,
    })
}

fn map_message_row(row: &SqliteRow) -> StoreResult<Message> {
    let role_raw: String = row.try_get("role")?;
    Ok(Message {
        id: row.try_get("id")?,
        chat_id: row.try_get("chat_id")?,
        role: str_to_role(&role_raw)?,
        content: row.try_get("content")?,
        image: row.try_get("image")?,
        created_at: row.try_get("created_at")?,
    })
}

impl ChatStore for SqliteChatStore {
    fn list_chats<'a>(
        &'a self,
        owner_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<Chat>>> + Send + 'a>> {
        Box::pin(async move {
            if owner_id.is_empty() {
                return Ok(Vec::new());
            }

            let rows = sqlx::query(
                "SELECT id, owner_id, title, created_at
                 FROM chats
                 WHERE owner_id = $1
                 ORDER BY created_at DESC, rowid DESC",
            )
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

            rows.iter().map(map_chat_row).collect()
        })
    }

    fn list_messages<'a>(
        &'a self,
        chat_id: &'a str,
        limit: Option<usize>,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Vec<Message>>> + Send + 'a>> {
        Box::pin(async move {
            if chat_id.is_empty() {
                return Ok(Vec::new());
            }

            #[allow(clippy::cast_possible_wrap)]
            let limit_i64 = limit.unwrap_or(DEFAULT_MESSAGE_LIMIT) as i64;

            let rows = sqlx::query(
                "SELECT id, chat_id, role, content, image, created_at
                 FROM messages
                 WHERE chat_id = $1
                 ORDER BY created_at ASC, rowid ASC
                 LIMIT $2",
            )
            .bind(chat_id)
            .bind(limit_i64)
            .fetch_all(&self.pool)
            .await?;

            rows.iter().map(map_message_row).collect()
        })
    }

    fn get_chat<'a>(
        &'a self,
        id: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Option<Chat>>> + Send + 'a>> {
        Box::pin(async move {
            let row = sqlx::query(
                "SELECT id, owner_id, title, created_at
                 FROM chats
                 WHERE id = $1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(|r| map_chat_row(&r)).transpose()
        })
    }

    fn create_chat<'a>(
        &'a self,
        owner_id: &'a str,
        seed_text: &'a str,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Chat>> + Send + 'a>> {
        Box::pin(async move {
            let chat_id = Uuid::new_v4().to_string();
            let created_at = Utc::now().to_rfc3339();
            let title = title_from_seed(seed_text);

            sqlx::query(
                "INSERT INTO chats (id, owner_id, title, created_at)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(&chat_id)
            .bind(owner_id)
            .bind(&title)
            .bind(&created_at)
            .execute(&self.pool)
            .await?;

            Ok(Chat {
                id: chat_id,
                owner_id: owner_id.to_string(),
                title,
                created_at,
            })
        })
    }

    fn append_message<'a>(
        &'a self,
        chat_id: &'a str,
        message: NewMessage,
    ) -> Pin<Box<dyn Future<Output = StoreResult<Message>> + Send + 'a>> {
        Box::pin(async move {
            if chat_id.is_empty() {
                return Err(StoreError::MissingChatId);
            }

            let exists: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM chats WHERE id = $1")
                .bind(chat_id)
                .fetch_one(&self.pool)
                .await?;
            if exists.0 == 0 {
                return Err(StoreError::ChatNotFound(chat_id.to_string()));
            }

            let message_id = Uuid::new_v4().to_string();
            let created_at = Utc::now().to_rfc3339();

            sqlx::query(
                "INSERT INTO messages (id, chat_id, role, content, image, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(&message_id)
            .bind(chat_id)
            .bind(role_to_str(message.role))
            .bind(&message.content)
            .bind(&message.image)
            .bind(&created_at)
            .execute(&self.pool)
            .await?;

            Ok(Message {
                id: message_id,
                chat_id: chat_id.to_string(),
                role: message.role,
                content: message.content,
                image: message.image,
                created_at,
            })
        })
    }
}
