//! ATS-02 agricultural sensor station.
//!
//! Hardware independent half of the firmware: the AT command driver for the
//! LoRaWAN modem, payload encoding, and the bookkeeping of the sampling cycle.
//! Everything here is generic over `embedded-io-async` serial links and
//! `embedded-hal-async` delays so it runs on the host under test as well as on
//! the RP2040 board (see `src/main.rs`).

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod codec;
pub mod config;
pub mod error;
pub mod modem;
pub mod station;

pub use error::{Error, StatusCode};
