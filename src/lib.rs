//! Circuit Playground extensions to the Firmata protocol.
//!
//! The board firmware answers a vendor sysex command (`CP_COMMAND`) carrying
//! one-byte opcodes for its pixel strip, piezo, accelerometer and capacitive
//! touch pads. This crate encodes those commands, routes the replies to
//! per-peripheral decoders and turns them into listener events.
//!
//! The protocol core is transport-free: peripherals queue frames on the
//! [`Board`]'s [`Outbox`] and decode replies handed to
//! [`Board::handle_sysex`]. [`Link`] drives a board over any
//! `embedded_io_async` serial port.
//!
//! Time is always passed in as milliseconds by the caller.

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;

use alloc::vec::Vec;

use embedded_io_async::{Read, Write};
use log::debug;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

pub mod accelerometer;
pub mod board;
pub mod command;
pub mod debounce;
pub mod dispatch;
pub mod emitter;
pub mod piezo;
pub mod pixel;
pub mod sysex;
#[cfg(feature = "std")]
pub mod thermometer;
pub mod touch;

pub use accelerometer::{AccelEvent, AccelSample, Accelerometer, TapFlags};
pub use board::{Board, Outbox};
pub use command::{Color, Command, Frame, MAX_COMMAND_LEN};
pub use emitter::{Emitter, ListenerId};
pub use piezo::Piezo;
pub use pixel::Pixel;
pub use sysex::SysexParser;
pub use touch::{TouchEvent, TouchKind, Touchpad};

/// A [`Board`] driven over a Firmata serial port.
///
/// # Type Parameters
///
/// * `Serial`: The serial interface connected to the board.
///   It must implement `embedded_io_async::Read` and `embedded_io_async::Write`.
pub struct Link<Serial> {
    serial: Serial,
    board: Board,
    parser: SysexParser,
    config: LinkConfig,
}

impl<S> Link<S>
where
    S: Read + Write,
{
    /// Creates a new `Link`.
    ///
    /// # Arguments
    ///
    /// * `serial`: The serial interface for communication with the board.
    /// * `board`: The board whose peripherals have already been set up.
    /// * `config`: Frame size and read retry limits.
    pub fn new(serial: S, board: Board, config: LinkConfig) -> Self {
        Self {
            serial,
            parser: SysexParser::new(config.max_frame_len),
            board,
            config,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// Releases the serial port and the board.
    pub fn into_parts(self) -> (S, Board) {
        (self.serial, self.board)
    }

    /// Writes every queued command to the board, in the order it was queued.
    ///
    /// A frame leaves the queue only once it has been written, so after a
    /// failure the next `flush` resumes with the frame that failed.
    ///
    /// Returns the number of frames written.
    pub async fn flush(&mut self) -> Result<usize, Error> {
        let outbox = self.board.outbox();
        let mut written = 0;
        while let Some(frame) = outbox.front() {
            self.write(&frame).await.map_err(|e| {
                log::error!("Failed to send {:02X?}: {:?}", frame.as_bytes(), e);
                e
            })?;
            outbox.pop();
            written += 1;
        }
        Ok(written)
    }

    /// Reads until one complete sysex frame has arrived and dispatches it.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if a reply handler consumed the frame.
    /// * `Ok(false)` if the frame was not for a registered handler, or was
    ///   malformed and dropped.
    /// * `Err(Error::ReadFailure)` if the port failed or stayed silent for
    ///   `max_attempts` reads in a row.
    pub async fn process(&mut self, now_ms: u64) -> Result<bool, Error> {
        let mut attempts = 0;

        loop {
            if let Some(body) = self.parser.next_body() {
                return match body.and_then(|body| self.board.handle_sysex(&body, now_ms)) {
                    Ok(handled) => Ok(handled),
                    Err(e) => {
                        log::warn!("Dropping sysex frame: {}", e);
                        Ok(false)
                    }
                };
            }

            let mut read_buffer = [0u8; 32];
            let bytes_read = self.serial.read(&mut read_buffer).await.map_err(|e| {
                log::error!("Serial read error: {:?}", e);
                Error::ReadFailure
            })?;

            if bytes_read == 0 {
                attempts += 1;
                if attempts >= self.config.max_attempts {
                    log::error!("No data after {} reads", attempts);
                    return Err(Error::ReadFailure);
                }
                continue;
            }

            attempts = 0;
            debug!("Received: {:02X?}", &read_buffer[..bytes_read]);
            self.parser.feed(&read_buffer[..bytes_read]);
        }
    }

    /// Runs due deferred work on the board; see [`Board::poll`].
    pub fn poll(&mut self, now_ms: u64) -> Option<u64> {
        self.board.poll(now_ms)
    }

    // Wraps one frame in START_SYSEX/END_SYSEX and writes it out.
    async fn write(&mut self, frame: &Frame) -> Result<(), Error> {
        let bytes = frame.as_bytes();
        let mut buffer: Vec<u8> = Vec::with_capacity(bytes.len() + 2);
        buffer.push(START_SYSEX);
        buffer.extend_from_slice(bytes);
        buffer.push(END_SYSEX);

        debug!("Executing command: {:02X?}", buffer);
        self.serial
            .write_all(&buffer)
            .await
            .map_err(|_| Error::WriteFailure)?;
        self.serial.flush().await.map_err(|_| Error::WriteFailure)?;
        Ok(())
    }
}
