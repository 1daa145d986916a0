//! Server-side chat orchestration: persist the user's turn, invoke the right
//! chat flow, persist the assistant's turn.

use crate::error::{NexaError, Result, ValidationError};
use crate::flows::{ChatQuery, FlowInvoker, ImageChatQuery};
use crate::llm::ImagePart;
use crate::store::{ChatStore, NewMessage};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// User-visible reply persisted when generation fails, so every user message
/// still gets a paired assistant message.
pub const FALLBACK_ANSWER: &str = "An error occurred while getting the response.";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSendInput {
    pub chat_id: String,
    #[serde(default)]
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_data_uri: Option<String>,
}

pub struct ChatAction {
    store: Arc<dyn ChatStore>,
    flows: Arc<FlowInvoker>,
}

impl ChatAction {
    pub fn new(store: Arc<dyn ChatStore>, flows: Arc<FlowInvoker>) -> Self {
        Self { store, flows }
    }

    /// Run one chat turn.
    ///
    /// Malformed input is rejected before anything is written. After that,
    /// exactly one or two messages are persisted per invocation: one when the
    /// user-message write fails (nothing else is attempted), two otherwise —
    /// the assistant slot is filled with `FALLBACK_ANSWER` when generation
    /// fails, keeping the transcript turn-paired.
    pub async fn send(&self, input: &ChatSendInput) -> Result<String> {
        if input.chat_id.is_empty() {
            return Err(ValidationError::Empty { field: "chat_id" }.into());
        }
        match &input.photo_data_uri {
            Some(uri) => {
                ImagePart::from_data_uri(uri)?;
            }
            None if input.query.trim().is_empty() => {
                return Err(ValidationError::Empty { field: "query" }.into());
            }
            None => {}
        }

        self.store
            .append_message(
                &input.chat_id,
                NewMessage::user(input.query.clone(), input.photo_data_uri.clone()),
            )
            .await
            .map_err(NexaError::Store)?;

        let generated = match &input.photo_data_uri {
            Some(uri) => {
                let flow_input = ImageChatQuery {
                    query: (!input.query.is_empty()).then(|| input.query.clone()),
                    photo_data_uri: uri.clone(),
                };
                self.flows.chat_with_image(&flow_input).await
            }
            None => {
                self.flows
                    .chat_text(&ChatQuery {
                        query: input.query.clone(),
                    })
                    .await
            }
        };

        match generated {
            Ok(reply) => {
                self.store
                    .append_message(&input.chat_id, NewMessage::assistant(reply.answer.clone()))
                    .await
                    .map_err(NexaError::Store)?;
                Ok(reply.answer)
            }
            Err(err) => {
                // Best effort: the generation error is what the caller sees.
                if let Err(db_err) = self
                    .store
                    .append_message(&input.chat_id, NewMessage::assistant(FALLBACK_ANSWER))
                    .await
                {
                    tracing::warn!(error = %db_err, "failed to persist fallback assistant message");
                }
                Err(err)
            }
        }
    }
}
