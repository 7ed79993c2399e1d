//! Host bridge protocol types.
//!
//! An external host process forwards intercepted requests to httpswatch over
//! a Unix domain socket, one JSON object per line, and gets one reply per
//! event.

use crate::listener::Dispatch;
use crate::request::{BlockingResponse, RequestDescriptor};
use serde::{Deserialize, Serialize};

/// An intercepted request forwarded by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostEvent {
    /// Unique event ID (for correlating replies)
    pub event_id: String,

    /// The request descriptor, in the host's own format
    pub details: RequestDescriptor,
}

/// The reply sent back for each event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListenerReply {
    /// Matches the event_id from the event
    pub event_id: String,

    /// How many listeners the event reached
    #[serde(default)]
    pub listeners: usize,

    /// Decision for the host to enforce. httpswatch never sets this.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocking_response: Option<BlockingResponse>,

    /// Set when the event could not be processed at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ListenerReply {
    /// Build the reply for a dispatched event.
    pub fn from_dispatch(event_id: String, dispatch: Dispatch) -> Self {
        Self {
            event_id,
            listeners: dispatch.invoked,
            blocking_response: dispatch.response,
            error: None,
        }
    }

    /// Reply for an event that couldn't be decoded.
    pub fn invalid(event_id: String, error: impl Into<String>) -> Self {
        Self {
            event_id,
            listeners: 0,
            blocking_response: None,
            error: Some(error.into()),
        }
    }
}
