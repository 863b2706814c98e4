use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use log::debug;

use crate::command::{Command, Frame};
use crate::constants::CP_COMMAND;
use crate::dispatch::Dispatcher;
use crate::error::Error;

/// Queue of encoded commands waiting for the transport.
///
/// Cloning yields another handle to the same queue, so every peripheral of a
/// board shares one ordered stream of frames.
#[derive(Clone, Default)]
pub struct Outbox {
    queue: Rc<RefCell<VecDeque<Frame>>>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `command` and queues it behind everything already sent.
    pub fn send(&self, command: Command) {
        let frame = command.encode();
        debug!("Queueing command: {:02X?}", frame.as_bytes());
        self.queue.borrow_mut().push_back(frame);
    }

    /// Oldest queued frame, left in place.
    pub fn front(&self) -> Option<Frame> {
        self.queue.borrow().front().copied()
    }

    pub fn pop(&self) -> Option<Frame> {
        self.queue.borrow_mut().pop_front()
    }

    /// Takes every queued frame, oldest first.
    pub fn drain(&self) -> Vec<Frame> {
        self.queue.borrow_mut().drain(..).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

type Ticker = Box<dyn FnMut(u64) -> Option<u64>>;

/// One Circuit Playground board: its reply dispatch table, its outgoing
/// command queue and the deferred work its peripherals schedule.
///
/// Peripheral controllers are built against a `&mut Board`; they register
/// their reply handlers and keep a handle to the outbox.
#[derive(Default)]
pub struct Board {
    dispatcher: Dispatcher,
    outbox: Outbox,
    tickers: Vec<Ticker>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a handle to the board's command queue.
    pub fn outbox(&self) -> Outbox {
        self.outbox.clone()
    }

    /// Registers a reply handler for `opcode`, replacing any earlier one.
    pub fn register<F>(&mut self, opcode: u8, handler: F) -> bool
    where
        F: FnMut(&[u8], u64) -> Result<(), Error> + 'static,
    {
        self.dispatcher.register(opcode, handler)
    }

    /// Adds deferred work run from [`Board::poll`]. The ticker returns the next
    /// time it needs to run, if any.
    pub fn on_tick<F>(&mut self, ticker: F)
    where
        F: FnMut(u64) -> Option<u64> + 'static,
    {
        self.tickers.push(Box::new(ticker));
    }

    /// Handles one decoded sysex body (`[command, data...]`).
    ///
    /// Bodies under a command other than `CP_COMMAND` belong to someone else and
    /// are skipped with `Ok(false)`.
    pub fn handle_sysex(&mut self, body: &[u8], now_ms: u64) -> Result<bool, Error> {
        let (&command, payload) = body.split_first().ok_or(Error::EmptyFrame)?;
        if command != CP_COMMAND {
            return Ok(false);
        }
        self.dispatcher.dispatch(payload, now_ms)
    }

    /// Runs due deferred work and returns the earliest time it must run again.
    pub fn poll(&mut self, now_ms: u64) -> Option<u64> {
        self.tickers
            .iter_mut()
            .filter_map(|ticker| ticker(now_ms))
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CP_NO_TONE, CP_PIXEL_CLEAR, CP_PIXEL_SHOW};

    #[test]
    fn outbox_keeps_order_across_clones() {
        let board = Board::new();
        let a = board.outbox();
        let b = board.outbox();
        a.send(Command::PixelClear);
        b.send(Command::NoTone);

        let frames = board.outbox().drain();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].opcode(), CP_PIXEL_CLEAR);
        assert_eq!(frames[1].opcode(), CP_NO_TONE);
        assert!(a.is_empty());
    }

    #[test]
    fn front_leaves_frame_queued() {
        let outbox = Outbox::new();
        assert_eq!(outbox.front(), None);
        outbox.send(Command::PixelShow);
        outbox.send(Command::NoTone);

        assert_eq!(outbox.front().map(|f| f.opcode()), Some(CP_PIXEL_SHOW));
        assert_eq!(outbox.front().map(|f| f.opcode()), Some(CP_PIXEL_SHOW));
        assert_eq!(outbox.pop().map(|f| f.opcode()), Some(CP_PIXEL_SHOW));
        assert_eq!(outbox.front().map(|f| f.opcode()), Some(CP_NO_TONE));
    }

    #[test]
    fn foreign_sysex_is_skipped() {
        let mut board = Board::new();
        board.register(0x36, |_, _| Ok(()));
        assert_eq!(board.handle_sysex(&[0x79, 0x36], 0), Ok(false));
        assert_eq!(board.handle_sysex(&[CP_COMMAND, 0x36], 0), Ok(true));
        assert_eq!(board.handle_sysex(&[], 0), Err(Error::EmptyFrame));
        assert_eq!(board.handle_sysex(&[CP_COMMAND], 0), Err(Error::EmptyFrame));
    }

    #[test]
    fn poll_reports_earliest_deadline() {
        let mut board = Board::new();
        board.on_tick(|_| Some(40));
        board.on_tick(|_| None);
        board.on_tick(|now| Some(now + 5));
        assert_eq!(board.poll(10), Some(15));

        let mut idle = Board::new();
        assert_eq!(idle.poll(10), None);
    }
}
