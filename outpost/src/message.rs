//! Out-of-band messages sent by pages to the worker.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A message a page posts to the worker.
///
/// Payloads are JSON objects tagged by `type`:
///
/// ```
/// use outpost::ClientMessage;
///
/// let msg: ClientMessage = serde_json::from_str(r#"{"type": "GET_VERSION"}"#).unwrap();
/// assert_eq!(msg, ClientMessage::GetVersion);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Activate the waiting version without waiting for old pages to close.
    SkipWaiting,
    /// Ask which version is running.
    GetVersion,
}

impl ClientMessage {
    /// Parses a message, returning `None` for anything unrecognized.
    pub fn parse(data: &serde_json::Value) -> Option<Self> {
        Self::deserialize(data).ok()
    }
}

/// Reply sent back on the message channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum MessageReply {
    /// Answer to [`ClientMessage::GetVersion`].
    Version {
        /// Version tag.
        version: SmolStr,
    },
}
