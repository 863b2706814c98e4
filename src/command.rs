//! Outgoing command encoding.
//!
//! Every command becomes a [`Frame`] of the shape `[CP_COMMAND, opcode, payload...]`,
//! ready for the transport's sysex send primitive. Numeric inputs that do not fit
//! their wire field are masked, never rejected.

use core::fmt;

use crate::config::AccelRange;
use crate::constants::*;

/// Longest outgoing frame: `PIXEL_SET` with index and four colour bytes.
pub const MAX_COMMAND_LEN: usize = 7;

/// An encoded command, vendor tag and opcode included.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; MAX_COMMAND_LEN],
    len: usize,
}

impl Frame {
    fn new(opcode: u8) -> Frame {
        let mut bytes = [0u8; MAX_COMMAND_LEN];
        bytes[0] = CP_COMMAND;
        bytes[1] = opcode;
        Frame { bytes, len: 2 }
    }

    fn push(mut self, byte: u8) -> Frame {
        self.bytes[self.len] = byte;
        self.len += 1;
        self
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn opcode(&self) -> u8 {
        self.bytes[1]
    }

    /// Payload after the opcode.
    pub fn payload(&self) -> &[u8] {
        &self.bytes[2..self.len]
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({:02X?})", self.as_bytes())
    }
}

/// An RGB pixel colour, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Color {
        Color { red, green, blue }
    }

    /// Packs the 24 colour bits into four 7-bit sysex data bytes.
    pub fn pack(&self) -> [u8; 4] {
        let (r, g, b) = (self.red, self.green, self.blue);
        [
            r >> 1,
            ((r & 0x01) << 6) | (g >> 2),
            ((g & 0x03) << 5) | (b >> 3),
            (b & 0x07) << 4,
        ]
    }

    /// Inverse of [`Color::pack`].
    pub fn unpack(bytes: [u8; 4]) -> Color {
        let [b1, b2, b3, b4] = bytes;
        Color {
            red: (b1 << 1) | (b2 >> 6),
            green: ((b2 & 0x3F) << 2) | (b3 >> 5),
            blue: ((b3 & 0x1F) << 3) | (b4 >> 4),
        }
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((red, green, blue): (u8, u8, u8)) -> Color {
        Color::new(red, green, blue)
    }
}

impl From<u32> for Color {
    /// Reads a `0xRRGGBB` value; the top byte is ignored.
    fn from(rgb: u32) -> Color {
        Color::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }
}

/// Masks `value` to 14 bits and splits it into (low 7 bits, high 7 bits).
pub fn split_14bit(value: u16) -> [u8; 2] {
    let value = value & FOURTEEN_BIT_MASK;
    [
        (value & SEVEN_BIT_MASK as u16) as u8,
        (value >> 7) as u8 & SEVEN_BIT_MASK,
    ]
}

/// Joins a (low, high) 7-bit pair back into a 14-bit value.
pub fn join_14bit(lsb: u8, msb: u8) -> u16 {
    (lsb & SEVEN_BIT_MASK) as u16 | ((msb & SEVEN_BIT_MASK) as u16) << 7
}

/// Command types that can be sent to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stage a colour on one pixel (0x10 <index> <4 packed colour bytes>)
    PixelSet { index: u8, color: Color },
    /// Latch staged pixel colours (0x11)
    PixelShow,
    /// Turn every pixel off (0x12)
    PixelClear,
    /// Play a tone (0x20 <freq lo> <freq hi> <dur lo> <dur hi>)
    Tone { frequency: u16, duration: u16 },
    /// Silence the piezo (0x21)
    NoTone,
    /// One-shot accelerometer read, answered by a vector reply (0x30)
    AccelRead,
    AccelStreamOn,
    AccelStreamOff,
    AccelTapStreamOn,
    AccelTapStreamOff,
    /// Set the accelerometer range (0x3C <code>)
    AccelRange(AccelRange),
    /// One-shot cap read of a pad (0x40 <pad>)
    CapRead(u8),
    /// Start streaming cap readings for a pad (0x41 <pad>)
    CapOn(u8),
    /// Stop streaming cap readings for a pad (0x42 <pad>)
    CapOff(u8),
}

impl Command {
    pub fn opcode(&self) -> u8 {
        match self {
            Command::PixelSet { .. } => CP_PIXEL_SET,
            Command::PixelShow => CP_PIXEL_SHOW,
            Command::PixelClear => CP_PIXEL_CLEAR,
            Command::Tone { .. } => CP_TONE,
            Command::NoTone => CP_NO_TONE,
            Command::AccelRead => CP_ACCEL_READ,
            Command::AccelStreamOn => CP_ACCEL_STREAM_ON,
            Command::AccelStreamOff => CP_ACCEL_STREAM_OFF,
            Command::AccelTapStreamOn => CP_ACCEL_TAP_STREAM_ON,
            Command::AccelTapStreamOff => CP_ACCEL_TAP_STREAM_OFF,
            Command::AccelRange(_) => CP_ACCEL_RANGE,
            Command::CapRead(_) => CP_CAP_READ,
            Command::CapOn(_) => CP_CAP_ON,
            Command::CapOff(_) => CP_CAP_OFF,
        }
    }

    /// Encodes the command into a frame.
    pub fn encode(&self) -> Frame {
        let frame = Frame::new(self.opcode());
        match *self {
            Command::PixelSet { index, color } => {
                let [b1, b2, b3, b4] = color.pack();
                frame
                    .push(index & SEVEN_BIT_MASK)
                    .push(b1)
                    .push(b2)
                    .push(b3)
                    .push(b4)
            }
            Command::Tone {
                frequency,
                duration,
            } => {
                let [f1, f2] = split_14bit(frequency);
                let [d1, d2] = split_14bit(duration);
                frame.push(f1).push(f2).push(d1).push(d2)
            }
            Command::AccelRange(range) => frame.push(range.code()),
            Command::CapRead(pad) | Command::CapOn(pad) | Command::CapOff(pad) => {
                frame.push(pad & SEVEN_BIT_MASK)
            }
            Command::PixelShow
            | Command::PixelClear
            | Command::NoTone
            | Command::AccelRead
            | Command::AccelStreamOn
            | Command::AccelStreamOff
            | Command::AccelTapStreamOn
            | Command::AccelTapStreamOff => frame,
        }
    }
}
