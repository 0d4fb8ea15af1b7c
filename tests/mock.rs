#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal_async::delay::DelayNs;
use embedded_io::ErrorKind;

/// A burst of modem output, or a stretch of silence lasting that many
/// readiness checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Data(Vec<u8>),
    Silence(usize),
}

impl Chunk {
    pub fn text(text: &str) -> Self {
        Chunk::Data(text.as_bytes().to_vec())
    }
}

pub type Responder = Box<dyn FnMut(&str) -> Vec<Chunk>>;

struct Wire {
    line: Vec<u8>,
    commands: Vec<String>,
    pending: VecDeque<Chunk>,
    responder: Responder,
    fail_on: Option<String>,
}

/// Scripted modem on the far end of the serial link. Every complete command
/// line is recorded and answered by the responder.
#[derive(Clone)]
pub struct MockModem {
    wire: Rc<RefCell<Wire>>,
}

impl MockModem {
    pub fn new(responder: impl FnMut(&str) -> Vec<Chunk> + 'static) -> Self {
        Self {
            wire: Rc::new(RefCell::new(Wire {
                line: Vec::new(),
                commands: Vec::new(),
                pending: VecDeque::new(),
                responder: Box::new(responder),
                fail_on: None,
            })),
        }
    }

    /// A modem that acknowledges everything and finishes uplinks and joins
    /// after a couple of silent gaps.
    pub fn cooperative() -> Self {
        Self::new(cooperative_reply)
    }

    /// Writing a command starting with `prefix` fails at the serial level.
    pub fn fail_on(self, prefix: &str) -> Self {
        self.wire.borrow_mut().fail_on = Some(prefix.into());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.wire.borrow().commands.clone()
    }

    pub fn pending(&self) -> usize {
        self.wire.borrow().pending.len()
    }
}

pub fn cooperative_reply(command: &str) -> Vec<Chunk> {
    match command {
        "AT" => vec![Chunk::text("+AT: OK\r\n")],
        "AT+RESET" => vec![Chunk::text("+RESET: OK\r\n")],
        "AT+VER" => vec![Chunk::text("+VER: 2.0.10\r\n")],
        "AT+JOIN" => vec![
            Chunk::text("+JOIN: Start\r\n+JOIN: NORMAL\r\n"),
            Chunk::Silence(20),
            Chunk::text("+JOIN: Network joined\r\n+JOIN: NetID 000013 DevAddr 26:01:1B:DA\r\n"),
            Chunk::Silence(20),
            Chunk::text("+JOIN: Done\r\n"),
        ],
        c if c.starts_with("AT+MSGHEX") || c.starts_with("AT+CMSGHEX") => {
            let tag = if c.starts_with("AT+MSGHEX") { "MSGHEX" } else { "CMSGHEX" };
            vec![
                Chunk::text(&format!("+{tag}: Start\r\n")),
                Chunk::Silence(20),
                Chunk::text(&format!("+{tag}: FPENDING\r\n")),
                Chunk::Silence(20),
                Chunk::text(&format!("+{tag}: Done\r\n")),
            ]
        }
        c => {
            let name = c.trim_start_matches("AT+").split('=').next().unwrap_or("");
            vec![Chunk::text(&format!("+{name}: OK\r\n"))]
        }
    }
}

impl embedded_io::ErrorType for MockModem {
    type Error = ErrorKind;
}

impl embedded_io::ReadReady for MockModem {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        let mut guard = self.wire.borrow_mut();
        let wire = &mut *guard;

        match wire.pending.front_mut() {
            Some(Chunk::Data(_)) => Ok(true),
            Some(Chunk::Silence(0)) => {
                wire.pending.pop_front();
                Ok(false)
            }
            Some(Chunk::Silence(n)) => {
                *n -= 1;
                Ok(false)
            }
            None => Ok(false),
        }
    }
}

impl embedded_io_async::Read for MockModem {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut guard = self.wire.borrow_mut();
        let wire = &mut *guard;

        let Some(Chunk::Data(data)) = wire.pending.front_mut() else {
            return Ok(0);
        };

        let n = buf.len().min(data.len());
        buf[..n].copy_from_slice(&data[..n]);
        data.drain(..n);
        if data.is_empty() {
            wire.pending.pop_front();
        }

        Ok(n)
    }
}

impl embedded_io_async::Write for MockModem {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut guard = self.wire.borrow_mut();
        let wire = &mut *guard;

        if let Some(prefix) = &wire.fail_on {
            let mut line = wire.line.clone();
            line.extend_from_slice(buf);
            if line.starts_with(prefix.as_bytes()) {
                return Err(ErrorKind::Other);
            }
        }

        wire.line.extend_from_slice(buf);

        while let Some(end) = wire.line.windows(2).position(|w| w == b"\r\n") {
            let line: Vec<u8> = wire.line.drain(..end + 2).collect();
            let command = String::from_utf8_lossy(&line[..end]).into_owned();

            let replies = (wire.responder)(&command);
            wire.pending.extend(replies);
            wire.commands.push(command);
        }

        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Delay that returns at once and only keeps count of the time asked for.
#[derive(Clone, Default)]
pub struct MockDelay {
    elapsed_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ns.get() / 1_000_000
    }
}

impl DelayNs for MockDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.elapsed_ns.set(self.elapsed_ns.get() + u64::from(ns));
    }
}
