//! Chat transport contract (spec.md §6). The transport itself (Telegram,
//! or any other chat backend) is an external collaborator, out of scope
//! here — the core only depends on this trait.

use async_trait::async_trait;

use crate::error::TransportError;

/// A single labelled callback button.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyboardButton {
    pub label: String,
    pub callback_data: String,
}

/// An inline keyboard: rows of buttons.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<KeyboardButton>>,
}

/// Opaque reference to a previously sent message, for edit/delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub ext_id: i64,
    pub message_id: i64,
}

#[async_trait]
pub trait ChatAdapter: Send + Sync {
    async fn send(&self, ext_id: i64, content: &str, keyboard: Option<&Keyboard>) -> Result<i64, TransportError>;
    async fn edit(&self, message: MessageRef, content: &str, keyboard: Option<&Keyboard>) -> Result<(), TransportError>;
    async fn delete(&self, message: MessageRef) -> Result<(), TransportError>;
    /// Acknowledge an inline callback query so the chat client stops showing
    /// a loading spinner, optionally with a toast-style `text`.
    async fn respond_inline(&self, callback_id: &str, text: Option<&str>) -> Result<(), TransportError>;
}

/// A no-op adapter that logs every call instead of sending anything.
/// Useful for the offline `matcher` binary and for tests.
pub struct LoggingChatAdapter;

#[async_trait]
impl ChatAdapter for LoggingChatAdapter {
    async fn send(&self, ext_id: i64, content: &str, _keyboard: Option<&Keyboard>) -> Result<i64, TransportError> {
        tracing::info!(ext_id, content, "chat send (no-op adapter)");
        Ok(0)
    }

    async fn edit(&self, message: MessageRef, content: &str, _keyboard: Option<&Keyboard>) -> Result<(), TransportError> {
        tracing::info!(ext_id = message.ext_id, message_id = message.message_id, content, "chat edit (no-op adapter)");
        Ok(())
    }

    async fn delete(&self, message: MessageRef) -> Result<(), TransportError> {
        tracing::info!(ext_id = message.ext_id, message_id = message.message_id, "chat delete (no-op adapter)");
        Ok(())
    }

    async fn respond_inline(&self, callback_id: &str, text: Option<&str>) -> Result<(), TransportError> {
        tracing::info!(callback_id, text, "chat respond_inline (no-op adapter)");
        Ok(())
    }
}
