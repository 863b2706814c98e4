use alloc::boxed::Box;
use alloc::collections::BTreeMap;

use log::debug;

use crate::error::Error;

/// A reply handler. Receives the payload after the opcode and the current time.
pub type Handler = Box<dyn FnMut(&[u8], u64) -> Result<(), Error>>;

/// Routes inbound payloads to per-opcode handlers.
///
/// One table per board. Each opcode has at most one handler and a later
/// registration replaces the earlier one.
#[derive(Default)]
pub struct Dispatcher {
    handlers: BTreeMap<u8, Handler>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `opcode`.
    ///
    /// Returns `true` if a previous handler was replaced.
    pub fn register<F>(&mut self, opcode: u8, handler: F) -> bool
    where
        F: FnMut(&[u8], u64) -> Result<(), Error> + 'static,
    {
        let replaced = self.handlers.insert(opcode, Box::new(handler)).is_some();
        if replaced {
            debug!("Replaced reply handler for opcode 0x{:02X}", opcode);
        }
        replaced
    }

    /// Strips the leading opcode from `payload` and hands the rest to its handler.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` if a handler ran.
    /// * `Ok(false)` if no handler is registered for the opcode. Unknown replies
    ///   are dropped silently.
    /// * `Err(Error::EmptyFrame)` if `payload` is empty, or the handler's error.
    pub fn dispatch(&mut self, payload: &[u8], now_ms: u64) -> Result<bool, Error> {
        let (&opcode, rest) = payload.split_first().ok_or(Error::EmptyFrame)?;
        match self.handlers.get_mut(&opcode) {
            Some(handler) => {
                handler(rest, now_ms)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
