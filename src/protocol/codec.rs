//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - GET:        key_len (4 bytes) + key
//! - PUT:        key_len (4 bytes) + key + value
//! - GET_PREFIX: prefix_len (4 bytes) + prefix
//! - RESET:      empty
//! - PING:       empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │ bincode (message, reply)    │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, SlotError};
use super::{Command, CommandType, Reply, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Default maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut payload = BytesMut::new();
    match command {
        Command::Get { key } => put_string(&mut payload, key),
        Command::Put { key, value } => {
            put_string(&mut payload, key);
            payload.put_slice(value.as_bytes());
        }
        Command::GetByPrefix { prefix } => put_string(&mut payload, prefix),
        Command::Reset | Command::Ping => {}
    }

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from one complete frame
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, payload) = split_frame(bytes, "command")?;

    let cmd_type = CommandType::from_u8(cmd_type).ok_or_else(|| {
        SlotError::Protocol(format!("Unknown command type: 0x{:02x}", cmd_type))
    })?;

    let mut payload = payload;
    match cmd_type {
        CommandType::Get => {
            let key = get_string(&mut payload, "GET key")?;
            expect_empty(payload, "GET")?;
            Ok(Command::Get { key })
        }
        CommandType::Put => {
            let key = get_string(&mut payload, "PUT key")?;
            let value = utf8(payload.to_vec(), "PUT value")?;
            Ok(Command::Put { key, value })
        }
        CommandType::GetByPrefix => {
            let prefix = get_string(&mut payload, "GET_PREFIX prefix")?;
            expect_empty(payload, "GET_PREFIX")?;
            Ok(Command::GetByPrefix { prefix })
        }
        CommandType::Reset => {
            expect_empty(payload, "RESET")?;
            Ok(Command::Reset)
        }
        CommandType::Ping => {
            expect_empty(payload, "PING")?;
            Ok(Command::Ping)
        }
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + bincode((message, reply))
pub fn encode_response(response: &Response) -> Result<Vec<u8>> {
    let payload = bincode::serialize(&(&response.message, &response.reply))
        .map_err(|e| SlotError::Protocol(format!("Failed to encode response: {}", e)))?;
    Ok(frame(response.status as u8, &payload))
}

/// Decode a response from one complete frame
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = Status::from_u8(status_byte).ok_or_else(|| {
        SlotError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    let (message, reply): (String, Option<Reply>) = bincode::deserialize(payload)
        .map_err(|e| SlotError::Protocol(format!("Failed to decode response: {}", e)))?;

    Ok(Response {
        status,
        message,
        reply,
    })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R, max_payload: u32) -> Result<Command> {
    let frame = read_frame(reader, max_payload, "Payload")?;
    decode_command(&frame)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R, max_payload: u32) -> Result<Response> {
    let frame = read_frame(reader, max_payload, "Response payload")?;
    decode_response(&frame)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Prefix `payload` with the type byte and its big-endian length
fn frame(kind: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(kind);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.to_vec()
}

/// Validate a complete frame and return (type byte, payload)
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(SlotError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let kind = header.get_u8();
    let payload_len = header.get_u32() as usize;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(SlotError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((kind, &bytes[HEADER_SIZE..total_len]))
}

/// Read header + payload, enforcing `max_payload`
fn read_frame<R: Read>(reader: &mut R, max_payload: u32, what: &str) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = (&header[1..]).get_u32();
    if payload_len > max_payload {
        return Err(SlotError::Protocol(format!(
            "{} too large: {} bytes (max {})",
            what, payload_len, max_payload
        )));
    }

    let mut full_message = vec![0u8; HEADER_SIZE + payload_len as usize];
    full_message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut full_message[HEADER_SIZE..])?;
    }
    Ok(full_message)
}

fn put_string(buf: &mut BytesMut, s: &str) {
    buf.put_u32(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

fn get_string(payload: &mut &[u8], what: &str) -> Result<String> {
    if payload.remaining() < 4 {
        return Err(SlotError::Protocol(format!("{}: missing length", what)));
    }
    let len = payload.get_u32() as usize;
    if payload.remaining() < len {
        return Err(SlotError::Protocol(format!(
            "{}: incomplete (expected {}, got {})",
            what,
            len,
            payload.remaining()
        )));
    }
    let bytes = payload[..len].to_vec();
    payload.advance(len);
    utf8(bytes, what)
}

fn utf8(bytes: Vec<u8>, what: &str) -> Result<String> {
    String::from_utf8(bytes)
        .map_err(|e| SlotError::Protocol(format!("{}: invalid UTF-8: {}", what, e)))
}

fn expect_empty(payload: &[u8], what: &str) -> Result<()> {
    if !payload.is_empty() {
        return Err(SlotError::Protocol(format!(
            "{} command: unexpected {} trailing bytes",
            what,
            payload.len()
        )));
    }
    Ok(())
}
