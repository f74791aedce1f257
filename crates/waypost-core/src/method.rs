//! The request methods routes are registered under.
//!
//! Besides the usual HTTP verbs, websocket lifecycle events (open, close,
//! message) are routed like any other method so that a controller can bind
//! `/{name}` for its socket endpoints next to its HTTP endpoints.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RouterError;

/// A request method, including the websocket lifecycle pseudo-methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
    Connect,
    /// A websocket connection was opened.
    WsOpen,
    /// A websocket connection was closed.
    WsClose,
    /// A message arrived on an open websocket.
    WsMessage,
}

impl HttpMethod {
    /// Every method, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Options,
        Self::Head,
        Self::Trace,
        Self::Connect,
        Self::WsOpen,
        Self::WsClose,
        Self::WsMessage,
    ];

    /// Returns the canonical upper-case name, e.g. `"GET"` or `"WS_OPEN"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
            Self::WsOpen => "WS_OPEN",
            Self::WsClose => "WS_CLOSE",
            Self::WsMessage => "WS_MESSAGE",
        }
    }

    /// Returns `true` for the websocket lifecycle methods.
    pub const fn is_websocket(self) -> bool {
        matches!(self, Self::WsOpen | Self::WsClose | Self::WsMessage)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = RouterError;

    /// Parses a method name case-insensitively. `-` is accepted in place of
    /// `_` for the websocket methods (`ws-open`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| RouterError::UnknownMethod(s.to_string()))
    }
}
