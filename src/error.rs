use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A reply payload was shorter than its opcode requires.
    ShortPayload {
        opcode: u8,
        expected: usize,
        actual: usize,
    },
    /// A frame carried no opcode byte.
    EmptyFrame,
    /// A sysex body could not be decoded from 7-bit pairs.
    InvalidFrame,
    /// An inbound sysex frame outgrew the link's buffer.
    FrameTooLong,
    ReadFailure,
    WriteFailure,
    /// A controller was configured with values it cannot honour.
    InvalidArg(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ShortPayload {
                opcode,
                expected,
                actual,
            } => write!(
                f,
                "reply 0x{:02X} needs {} payload bytes, got {}",
                opcode, expected, actual
            ),
            Error::EmptyFrame => write!(f, "frame has no opcode"),
            Error::InvalidFrame => write!(f, "frame is not valid 7-bit sysex data"),
            Error::FrameTooLong => write!(f, "sysex frame exceeds buffer capacity"),
            Error::ReadFailure => write!(f, "serial read failed"),
            Error::WriteFailure => write!(f, "serial write failed"),
            Error::InvalidArg(msg) => write!(f, "invalid argument: {}", msg),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Fails with [`Error::ShortPayload`] unless `payload` holds at least `expected` bytes.
pub(crate) fn ensure_len(opcode: u8, payload: &[u8], expected: usize) -> Result<(), Error> {
    if payload.len() < expected {
        return Err(Error::ShortPayload {
            opcode,
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}
