//! Client
//!
//! Blocking request/response client over a single TCP stream.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{Result, SlotError};
use crate::protocol::{read_response, write_command, Command, Response, MAX_PAYLOAD_SIZE};

/// Connection to a SlotKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    max_message_size: u32,
}

impl Client {
    /// Connect to `addr`
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| SlotError::Network(format!("Failed to connect: {}", e)))?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            max_message_size: MAX_PAYLOAD_SIZE,
        })
    }

    /// Bound how long a request may wait on the socket
    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        self.writer.get_ref().set_write_timeout(timeout)?;
        Ok(())
    }

    /// Largest response payload this client accepts
    pub fn set_max_message_size(&mut self, size: u32) {
        self.max_message_size = size;
    }

    /// Send one command and wait for its response
    pub fn request(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader, self.max_message_size)
    }

    pub fn put(&mut self, key: &str, value: &str) -> Result<Response> {
        self.request(&Command::Put {
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    pub fn get(&mut self, key: &str) -> Result<Response> {
        self.request(&Command::Get {
            key: key.to_string(),
        })
    }

    pub fn get_by_prefix(&mut self, prefix: &str) -> Result<Response> {
        self.request(&Command::GetByPrefix {
            prefix: prefix.to_string(),
        })
    }

    pub fn reset(&mut self) -> Result<Response> {
        self.request(&Command::Reset)
    }

    pub fn ping(&mut self) -> Result<Response> {
        self.request(&Command::Ping)
    }
}
