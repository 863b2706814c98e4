//! Capacitive touch pads.
//!
//! Every cap reply updates one bit of a shared touch mask, then every channel is
//! re-classified against the mask. Newly touched channels are reported as
//! `down`, channels still touched past their hold deadline as `hold`, and
//! released channels as `up`. Each classification is debounced on its own
//! before it reaches listeners.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use log::debug;

use crate::board::{Board, Outbox};
use crate::command::Command;
use crate::config::TouchpadConfig;
use crate::constants::*;
use crate::debounce::Debounce;
use crate::emitter::{Emitter, ListenerId};
use crate::error::{ensure_len, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchKind {
    Down,
    Hold,
    Up,
}

impl TouchKind {
    pub const ALL: [TouchKind; 3] = [TouchKind::Down, TouchKind::Hold, TouchKind::Up];

    pub fn name(self) -> &'static str {
        match self {
            TouchKind::Down => "down",
            TouchKind::Hold => "hold",
            TouchKind::Up => "up",
        }
    }

    /// Event names emitted for this classification.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            TouchKind::Down => &["down", "press", "tap", "impact", "hit", "touch"],
            TouchKind::Hold => &["hold"],
            TouchKind::Up => &["up", "release"],
        }
    }

    fn index(self) -> usize {
        match self {
            TouchKind::Down => 0,
            TouchKind::Hold => 1,
            TouchKind::Up => 2,
        }
    }
}

/// Payload of every touch event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchEvent {
    pub kind: TouchKind,
    /// Pad identifiers affected, in channel order.
    pub which: Vec<u8>,
    pub timestamp: u64,
}

/// Channels that changed classification during one reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchBatch {
    pub down: Vec<u8>,
    pub hold: Vec<u8>,
    pub up: Vec<u8>,
}

impl TouchBatch {
    pub fn get(&self, kind: TouchKind) -> &[u8] {
        match kind {
            TouchKind::Down => &self.down,
            TouchKind::Hold => &self.hold,
            TouchKind::Up => &self.up,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.down.is_empty() && self.hold.is_empty() && self.up.is_empty()
    }
}

/// Decodes a cap reply payload into `(pad, reading)`. The reading is a
/// little-endian `i16` after the pad byte.
pub fn decode_cap_reply(payload: &[u8]) -> Result<(u8, i16), Error> {
    ensure_len(CP_CAP_REPLY, payload, CAP_REPLY_LEN)?;
    Ok((payload[0], i16::from_le_bytes([payload[1], payload[2]])))
}

#[derive(Debug, Clone, Copy, Default)]
struct Channel {
    touched: bool,
    hold_deadline: Option<u64>,
}

/// Per-channel touch state, free of any transport or timer.
#[derive(Debug, Clone)]
pub struct TouchTracker {
    pads: Vec<u8>,
    channels: Vec<Channel>,
    mask: u32,
    hold_time_ms: u64,
    threshold: i16,
}

impl TouchTracker {
    /// Builds a tracker for the pads in `config`.
    ///
    /// Fails with [`Error::InvalidArg`] when the pads do not pass
    /// [`TouchpadConfig::validate`].
    pub fn new(config: &TouchpadConfig) -> Result<TouchTracker, Error> {
        let pads = config.validate()?;
        let channels = alloc::vec![Channel::default(); pads.len()];
        Ok(TouchTracker {
            pads,
            channels,
            mask: 0,
            hold_time_ms: config.hold_time_ms,
            threshold: config.threshold,
        })
    }

    pub fn pads(&self) -> &[u8] {
        &self.pads
    }

    pub fn channel_of(&self, pad: u8) -> Option<usize> {
        self.pads.iter().position(|&p| p == pad)
    }

    /// Raw touch mask, one bit per channel.
    pub fn mask(&self) -> u32 {
        self.mask
    }

    pub fn is_touched(&self, pad: u8) -> bool {
        self.channel_of(pad)
            .is_some_and(|channel| self.channels[channel].touched)
    }

    /// Applies one cap reading and re-classifies every channel.
    pub fn apply_reading(&mut self, pad: u8, reading: i16, now_ms: u64) -> TouchBatch {
        match self.channel_of(pad) {
            Some(channel) if reading >= self.threshold => self.mask |= 1 << channel,
            Some(channel) => self.mask &= !(1 << channel),
            None => debug!("Cap reply for unmonitored pad {}", pad),
        }
        self.classify(now_ms)
    }

    fn classify(&mut self, now_ms: u64) -> TouchBatch {
        let mut batch = TouchBatch::default();
        for (i, channel) in self.channels.iter_mut().enumerate() {
            let pad = self.pads[i];
            let bit = self.mask & (1 << i) != 0;
            match (bit, channel.touched) {
                (true, false) => {
                    channel.touched = true;
                    channel.hold_deadline = Some(now_ms.saturating_add(self.hold_time_ms));
                    batch.down.push(pad);
                }
                (true, true) => {
                    if channel.hold_deadline.is_some_and(|deadline| now_ms >= deadline) {
                        channel.hold_deadline = Some(now_ms.saturating_add(self.hold_time_ms));
                        batch.hold.push(pad);
                    }
                }
                (false, true) => {
                    channel.touched = false;
                    channel.hold_deadline = None;
                    batch.up.push(pad);
                }
                (false, false) => {}
            }
        }
        batch
    }
}

struct TouchState {
    tracker: TouchTracker,
    debounce: [Debounce<Vec<u8>>; 3],
    active: bool,
}

impl TouchState {
    fn schedule(&mut self, batch: TouchBatch, now_ms: u64) {
        for kind in TouchKind::ALL {
            let which = batch.get(kind);
            if !which.is_empty() {
                self.debounce[kind.index()].trigger(which.to_vec(), now_ms);
            }
        }
    }

    fn next_deadline(&self) -> Option<u64> {
        self.debounce.iter().filter_map(|d| d.deadline()).min()
    }
}

fn emit(events: &Emitter<TouchEvent>, kind: TouchKind, which: Vec<u8>, now_ms: u64) {
    let event = TouchEvent {
        kind,
        which,
        timestamp: now_ms,
    };
    debug!("Touch {}: {:?}", kind.name(), event.which);
    for alias in kind.aliases() {
        if events.listener_count(alias) > 0 {
            events.emit(alias, &event);
        }
    }
    events.emit("change", &event);
}

/// Capacitive touch controller over a fixed set of pads.
///
/// Events: the aliases of each [`TouchKind`], plus `"change"` for every
/// classification, all carrying a [`TouchEvent`]. Events fire from
/// [`Board::poll`] once their debounce window has passed.
#[derive(Clone)]
pub struct Touchpad {
    state: Rc<RefCell<TouchState>>,
    events: Rc<Emitter<TouchEvent>>,
    outbox: Outbox,
    pads: Vec<u8>,
}

impl Touchpad {
    /// Creates the controller, enables cap sensing on every pad and registers
    /// the reply handler and debounce timers on `board`.
    pub fn new(board: &mut Board, config: TouchpadConfig) -> Result<Touchpad, Error> {
        let tracker = TouchTracker::new(&config)?;
        let pads = tracker.pads().to_vec();
        let outbox = board.outbox();
        for &pad in &pads {
            outbox.send(Command::CapOn(pad));
        }

        let state = Rc::new(RefCell::new(TouchState {
            tracker,
            debounce: [
                Debounce::new(TOUCH_DEBOUNCE_MS),
                Debounce::new(TOUCH_DEBOUNCE_MS),
                Debounce::new(TOUCH_DEBOUNCE_MS),
            ],
            active: true,
        }));
        let events = Rc::new(Emitter::new());

        let reply_state = Rc::clone(&state);
        board.register(CP_CAP_REPLY, move |payload, now_ms| {
            let (pad, reading) = decode_cap_reply(payload)?;
            let mut state = reply_state.borrow_mut();
            if !state.active {
                return Ok(());
            }
            let batch = state.tracker.apply_reading(pad, reading, now_ms);
            if !batch.is_empty() {
                debug!("Touch batch from pad {} ({}): {:?}", pad, reading, batch);
            }
            state.schedule(batch, now_ms);
            Ok(())
        });

        let tick_state = Rc::clone(&state);
        let tick_events = Rc::clone(&events);
        board.on_tick(move |now_ms| {
            let mut fired = Vec::new();
            let next = {
                let mut state = tick_state.borrow_mut();
                for kind in TouchKind::ALL {
                    if let Some(which) = state.debounce[kind.index()].poll(now_ms) {
                        fired.push((kind, which));
                    }
                }
                state.next_deadline()
            };
            for (kind, which) in fired {
                emit(&tick_events, kind, which, now_ms);
            }
            next
        });

        Ok(Touchpad {
            state,
            events,
            outbox,
            pads,
        })
    }

    pub fn on<F>(&self, name: &str, listener: F) -> ListenerId
    where
        F: FnMut(&TouchEvent) + 'static,
    {
        self.events.on(name, listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    /// Monitored pads, masked to 7 bits, in channel order.
    pub fn pads(&self) -> &[u8] {
        &self.pads
    }

    pub fn is_touched(&self, pad: u8) -> bool {
        self.state.borrow().tracker.is_touched(pad)
    }

    /// Asks the board for a single reading of `pad`.
    pub fn request_reading(&self, pad: u8) {
        self.outbox.send(Command::CapRead(pad));
    }

    /// Cancels pending events, removes every listener and turns cap sensing off
    /// on every pad. Replies arriving afterwards are ignored.
    pub fn stop(&self) {
        let mut state = self.state.borrow_mut();
        state.active = false;
        for debounce in state.debounce.iter_mut() {
            debounce.cancel();
        }
        self.events.remove_all_listeners();
        for &pad in &self.pads {
            self.outbox.send(Command::CapOff(pad));
        }
    }
}
