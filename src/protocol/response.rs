//! Response definitions
//!
//! Represents responses to clients.

use serde::{Deserialize, Serialize};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    /// Soft failure: the request was valid but refused (size, contention)
    Rejected = 0x02,
    /// Hard failure: I/O or protocol error
    Error = 0x03,
}

impl Status {
    /// Parse a status byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::NotFound),
            0x02 => Some(Status::Rejected),
            0x03 => Some(Status::Error),
            _ => None,
        }
    }
}

/// A stored pair as returned to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Successful outcome of a command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reply {
    /// PUT succeeded
    Stored,

    /// GET hit
    Found(KeyValue),

    /// GET miss
    Missing,

    /// GET_PREFIX result (possibly empty)
    Pairs(Vec<KeyValue>),

    /// RESET succeeded
    Reset,

    /// PING answer
    Pong,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Human-readable status text ("OK", "not found", or the error)
    pub message: String,

    /// Command result, present on `Status::Ok`
    pub reply: Option<Reply>,
}

impl Response {
    /// Create an OK response carrying `reply`
    pub fn ok(reply: Reply) -> Self {
        Self {
            status: Status::Ok,
            message: "OK".to_string(),
            reply: Some(reply),
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            message: "not found".to_string(),
            reply: None,
        }
    }

    /// Create a REJECTED response
    pub fn rejected(message: &str) -> Self {
        Self {
            status: Status::Rejected,
            message: message.to_string(),
            reply: None,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            message: message.to_string(),
            reply: None,
        }
    }

    /// The success flag reported to callers
    pub fn is_success(&self) -> bool {
        self.status == Status::Ok
    }
}
