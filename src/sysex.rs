use alloc::collections::VecDeque;
use alloc::vec::Vec;

use log::debug;

use crate::constants::{END_SYSEX, SEVEN_BIT_MASK, START_SYSEX};
use crate::error::Error;

/// Decodes data sent as 7-bit pairs (low bits first, then the top bit).
pub fn decode_7bit_pairs(data: &[u8]) -> Result<Vec<u8>, Error> {
    if data.len() % 2 != 0 {
        return Err(Error::InvalidFrame);
    }
    Ok(data
        .chunks_exact(2)
        .map(|pair| (pair[0] & SEVEN_BIT_MASK) | (pair[1] << 7))
        .collect())
}

// Turns a raw sysex body `[command, pairs...]` into `[command, bytes...]`.
fn decode_body(raw: &[u8]) -> Result<Vec<u8>, Error> {
    let (&command, data) = raw.split_first().ok_or(Error::EmptyFrame)?;
    let mut body = Vec::with_capacity(1 + data.len() / 2);
    body.push(command);
    body.extend(decode_7bit_pairs(data)?);
    Ok(body)
}

/// Incremental parser that pulls sysex bodies out of a Firmata byte stream.
///
/// Bytes outside `START_SYSEX ... END_SYSEX` belong to other Firmata messages
/// and are skipped. Completed bodies, or the error that spoiled them, queue up
/// in arrival order.
#[derive(Debug)]
pub struct SysexParser {
    raw: Vec<u8>,
    in_frame: bool,
    overflow: bool,
    capacity: usize,
    ready: VecDeque<Result<Vec<u8>, Error>>,
}

impl SysexParser {
    /// `max_frame_len` bounds the decoded body, command byte included.
    pub fn new(max_frame_len: usize) -> Self {
        Self {
            raw: Vec::new(),
            in_frame: false,
            overflow: false,
            capacity: max_frame_len.saturating_mul(2),
            ready: VecDeque::new(),
        }
    }

    pub fn feed(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            match byte {
                START_SYSEX => {
                    if self.in_frame {
                        debug!("Sysex restarted, dropping {} bytes", self.raw.len());
                    }
                    self.raw.clear();
                    self.in_frame = true;
                    self.overflow = false;
                }
                END_SYSEX if self.in_frame => {
                    self.in_frame = false;
                    let body = if self.overflow {
                        Err(Error::FrameTooLong)
                    } else {
                        decode_body(&self.raw)
                    };
                    self.raw.clear();
                    self.ready.push_back(body);
                }
                _ if !self.in_frame => {}
                b if b & 0x80 != 0 => {
                    debug!("Status byte {:02X} inside sysex, frame dropped", b);
                    self.in_frame = false;
                    self.raw.clear();
                    self.ready.push_back(Err(Error::InvalidFrame));
                }
                b => {
                    if self.raw.len() < self.capacity {
                        self.raw.push(b);
                    } else {
                        self.overflow = true;
                    }
                }
            }
        }
    }

    /// Next completed body, oldest first.
    pub fn next_body(&mut self) -> Option<Result<Vec<u8>, Error>> {
        self.ready.pop_front()
    }
}
