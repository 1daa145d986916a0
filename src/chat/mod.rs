//! Chat orchestration: the server-side send action and the per-owner session
//! controller built on top of it.

pub mod action;
pub mod controller;

pub use action::{ChatAction, ChatSendInput, FALLBACK_ANSWER};
pub use controller::ChatController;
