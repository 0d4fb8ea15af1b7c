//! Line oriented AT transport over an async serial link.
//!
//! A command is written as one line terminated by `\r\n`. The reply is
//! whatever the modem prints until the link has stayed silent for the read
//! timeout, kept as a single text blob.

use embedded_hal_async::delay::DelayNs;
use embedded_io::ReadReady;
use embedded_io_async::{Read, Write};
use heapless::String;

use super::command::Command;
use crate::error::{serial_error, Error};

pub const LINE_TERMINATOR: &str = "\r\n";
pub const REPLY_CAPACITY: usize = 512;
pub const DEFAULT_READ_TIMEOUT_MS: u32 = 1000;

const IDLE_POLL_MS: u32 = 1;
const READ_CHUNK: usize = 64;

pub type Reply = String<REPLY_CAPACITY>;

/// Drops the protocol terminator for display. Decisions are always taken on
/// the untrimmed reply.
pub fn trim_terminator(reply: &str) -> &str {
    reply.strip_suffix(LINE_TERMINATOR).unwrap_or(reply)
}

/// Looks for a marker in a byte stream fed in arbitrary pieces.
struct MarkerScan<'m> {
    marker: &'m [u8],
    matched: usize,
    found: bool,
}

impl<'m> MarkerScan<'m> {
    fn new(marker: &'m [u8]) -> Self {
        Self {
            marker,
            matched: 0,
            found: marker.is_empty(),
        }
    }

    fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if self.found {
                return;
            }

            let marker = self.marker;
            let matched = self.matched;

            // longest marker prefix ending at the previous byte that the new
            // byte extends
            let mut k = matched;
            self.matched = loop {
                if marker.starts_with(&marker[matched - k..matched]) && marker[k] == byte {
                    break k + 1;
                }
                if k == 0 {
                    break 0;
                }
                k -= 1;
            };

            self.found = self.matched == marker.len();
        }
    }

    fn found(&self) -> bool {
        self.found
    }
}

pub struct AtTransport<S, D> {
    serial: S,
    delay: D,
    read_timeout_ms: u32,
    echo: bool,
}

impl<S, D> AtTransport<S, D>
where
    S: Read + Write + ReadReady,
    D: DelayNs,
{
    pub fn new(serial: S, delay: D) -> Self {
        Self {
            serial,
            delay,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            echo: false,
        }
    }

    pub fn with_read_timeout(mut self, read_timeout_ms: u32) -> Self {
        self.read_timeout_ms = read_timeout_ms;
        self
    }

    pub fn read_timeout_ms(&self) -> u32 {
        self.read_timeout_ms
    }

    /// Mirror commands and replies to the debug log.
    pub fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    pub async fn flush(&mut self) -> Result<(), Error> {
        self.serial.flush().await.map_err(serial_error)
    }

    pub async fn pause(&mut self, ms: u32) {
        self.delay.delay_ms(ms).await;
    }

    /// Write `command` and block for exactly one reply.
    pub async fn execute(&mut self, command: &Command<'_>) -> Result<Reply, Error> {
        self.send(command).await?;
        self.read_reply().await
    }

    /// Write `command` without waiting for anything back.
    pub async fn send(&mut self, command: &Command<'_>) -> Result<(), Error> {
        match command.message() {
            Some((head, payload)) => {
                if self.echo {
                    debug!("at: > {}=\"{}\"", head, payload);
                }

                for part in [head, "=\"", payload, "\""] {
                    self.write(part).await?;
                }
            }
            None => {
                let line = command.render()?;

                if self.echo {
                    debug!("at: > {}", line.as_str());
                }

                self.write(line.as_str()).await?;
            }
        }

        self.write(LINE_TERMINATOR).await?;
        self.flush().await
    }

    async fn write(&mut self, text: &str) -> Result<(), Error> {
        self.serial.write_all(text.as_bytes()).await.map_err(serial_error)
    }

    /// Read one chunk if the modem has output pending.
    pub async fn poll(&mut self) -> Result<Option<Reply>, Error> {
        if self.serial.read_ready().map_err(serial_error)? {
            self.read_chunk(None).await.map(Some)
        } else {
            Ok(None)
        }
    }

    /// Like [`Self::poll`], but tells whether `marker` showed up anywhere in
    /// the chunk, including the part that did not fit the reply buffer.
    pub async fn poll_for(&mut self, marker: &str) -> Result<Option<bool>, Error> {
        if !self.serial.read_ready().map_err(serial_error)? {
            return Ok(None);
        }

        let mut scan = MarkerScan::new(marker.as_bytes());
        self.read_chunk(Some(&mut scan)).await?;
        Ok(Some(scan.found()))
    }

    /// Collect input until the link has been idle for the read timeout. A
    /// silent modem yields an empty reply.
    pub async fn read_reply(&mut self) -> Result<Reply, Error> {
        self.read_chunk(None).await
    }

    async fn read_chunk(&mut self, mut scan: Option<&mut MarkerScan<'_>>) -> Result<Reply, Error> {
        let mut reply = Reply::new();
        let mut buf = [0u8; READ_CHUNK];
        let mut idle_ms = 0;
        let mut dropped = 0usize;

        while idle_ms < self.read_timeout_ms {
            if self.serial.read_ready().map_err(serial_error)? {
                let n = self.serial.read(&mut buf).await.map_err(serial_error)?;
                if n > 0 {
                    if let Some(scan) = scan.as_deref_mut() {
                        scan.feed(&buf[..n]);
                    }
                    for &byte in &buf[..n] {
                        let c = if byte.is_ascii() { char::from(byte) } else { '?' };
                        if reply.push(c).is_err() {
                            dropped += 1;
                        }
                    }
                    idle_ms = 0;
                    continue;
                }
            }

            self.delay.delay_ms(IDLE_POLL_MS).await;
            idle_ms += IDLE_POLL_MS;
        }

        if dropped > 0 {
            warn!("at: reply overflow, {} bytes dropped", dropped);
        }

        if self.echo {
            debug!("at: < {}", trim_terminator(reply.as_str()));
        }

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(marker: &str, pieces: &[&str]) -> bool {
        let mut scan = MarkerScan::new(marker.as_bytes());
        for piece in pieces {
            scan.feed(piece.as_bytes());
        }
        scan.found()
    }

    #[test]
    fn marker_is_found_across_pieces() {
        assert!(scan("Done", &["+MSGHEX: Done\r\n"]));
        assert!(scan("Done", &["+MSGHEX: D", "on", "e\r\n"]));
        assert!(scan("Done", &["DoDone"]));
        assert!(scan("aab", &["aa", "aab"]));
        assert!(!scan("Done", &["+MSGHEX: Don", "\r\n", "e"]));
        assert!(!scan("Done", &["+MSGHEX: done\r\n"]));
    }

    #[test]
    fn trimming_only_removes_one_terminator() {
        assert_eq!(trim_terminator("+AT: OK\r\n"), "+AT: OK");
        assert_eq!(trim_terminator("+AT: OK"), "+AT: OK");
        assert_eq!(trim_terminator("a\r\n\r\n"), "a\r\n");
        assert_eq!(trim_terminator(""), "");
    }
}
