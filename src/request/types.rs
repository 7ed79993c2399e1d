//! Request descriptors as delivered by the host runtime.
//!
//! The host hands the listener one descriptor per intercepted request,
//! serialized with camelCase keys. Only `url` is required; everything else
//! is carried through for the observation log when present.

use serde::{Deserialize, Serialize};

/// One intercepted outbound request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDescriptor {
    /// The full request URL, exactly as the host saw it.
    pub url: String,

    /// Host-assigned request identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    /// HTTP method ("GET", "POST", ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Resource type ("main_frame", "script", "image", ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    /// Tab the request originated from (-1 for background requests).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_id: Option<i64>,

    /// Milliseconds since the epoch when the request was intercepted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_stamp: Option<f64>,
}

impl RequestDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            request_id: None,
            method: None,
            resource_type: None,
            tab_id: None,
            time_stamp: None,
        }
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Parse a line of host input: either a JSON descriptor or a bare URL.
    pub fn from_line(line: &str) -> serde_json::Result<Self> {
        let trimmed = line.trim();
        if trimmed.starts_with('{') {
            serde_json::from_str(trimmed)
        } else {
            Ok(Self::new(trimmed))
        }
    }
}

/// The host's decision object for blocking listeners.
///
/// Returning one of these lets a listener cancel or redirect the request.
/// The request observer never builds one; the type exists so the listener
/// contract is spelled out in full.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockingResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_host_details() {
        let json = r#"{
            "requestId": "4711",
            "url": "http://example.com/index.html",
            "method": "GET",
            "type": "main_frame",
            "tabId": 3,
            "timeStamp": 1700000000000.5,
            "frameId": 0
        }"#;
        let details: RequestDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(details.url, "http://example.com/index.html");
        assert_eq!(details.request_id.as_deref(), Some("4711"));
        assert_eq!(details.resource_type.as_deref(), Some("main_frame"));
        assert_eq!(details.tab_id, Some(3));
    }

    #[test]
    fn test_url_is_required() {
        let result: serde_json::Result<RequestDescriptor> =
            serde_json::from_str(r#"{"requestId": "1"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_line() {
        let bare = RequestDescriptor::from_line("  http://example.com/a \n").unwrap();
        assert_eq!(bare.url, "http://example.com/a");

        let json = RequestDescriptor::from_line(r#"{"url": "http://b.example/"}"#).unwrap();
        assert_eq!(json.url, "http://b.example/");

        assert!(RequestDescriptor::from_line("{not json").is_err());
    }

    #[test]
    fn test_empty_blocking_response_serializes_empty() {
        let json = serde_json::to_string(&BlockingResponse::default()).unwrap();
        assert_eq!(json, "{}");
    }
}
