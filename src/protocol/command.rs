//! Command definitions
//!
//! Represents commands from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Get = 0x01,
    Put = 0x02,
    GetByPrefix = 0x03,
    Reset = 0x04,
    Ping = 0x05,
}

impl CommandType {
    /// Parse a command byte
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(CommandType::Get),
            0x02 => Some(CommandType::Put),
            0x03 => Some(CommandType::GetByPrefix),
            0x04 => Some(CommandType::Reset),
            0x05 => Some(CommandType::Ping),
            _ => None,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key
    Get { key: String },

    /// Put a key-value pair
    Put { key: String, value: String },

    /// Get every pair whose key starts with `prefix`
    GetByPrefix { prefix: String },

    /// Destroy and recreate the store
    Reset,

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Put { .. } => CommandType::Put,
            Command::GetByPrefix { .. } => CommandType::GetByPrefix,
            Command::Reset => CommandType::Reset,
            Command::Ping => CommandType::Ping,
        }
    }
}
