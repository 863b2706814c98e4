//! Accelerometer controller: lazy stream activation and decoding of vector and
//! tap replies.

use alloc::rc::Rc;
use core::cell::RefCell;

use log::debug;

use crate::board::{Board, Outbox};
use crate::command::Command;
use crate::config::{AccelRange, AccelerometerConfig};
use crate::constants::*;
use crate::emitter::{Emitter, ListenerId};
use crate::error::{ensure_len, Error};

/// One accelerometer reading, in the units the firmware reports.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AccelSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Which tap kinds a tap reply reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TapFlags {
    pub single: bool,
    pub double: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AccelEvent {
    Sample(AccelSample),
    Tap(TapFlags),
}

fn read_f32_le(payload: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        payload[offset],
        payload[offset + 1],
        payload[offset + 2],
        payload[offset + 3],
    ])
}

/// Decodes a vector reply payload: three little-endian `f32` at offsets 0, 4, 8.
pub fn decode_sample(payload: &[u8]) -> Result<AccelSample, Error> {
    ensure_len(CP_ACCEL_READ_REPLY, payload, ACCEL_READ_REPLY_LEN)?;
    Ok(AccelSample {
        x: read_f32_le(payload, 0),
        y: read_f32_le(payload, 4),
        z: read_f32_le(payload, 8),
    })
}

/// Decodes a tap reply payload. `Ok(None)` when neither tap bit is set.
pub fn decode_tap(payload: &[u8]) -> Result<Option<TapFlags>, Error> {
    ensure_len(CP_ACCEL_TAP_REPLY, payload, ACCEL_TAP_REPLY_LEN)?;
    let flags = TapFlags {
        single: payload[0] & TAP_SINGLE != 0,
        double: payload[0] & TAP_DOUBLE != 0,
    };
    Ok((flags.single || flags.double).then_some(flags))
}

fn is_sample_event(name: &str) -> bool {
    name == "data" || name == "change"
}

fn is_tap_event(name: &str) -> bool {
    name.starts_with("tap")
}

#[derive(Debug, Default)]
struct AccelState {
    streaming: bool,
    tap_streaming: bool,
    last: Option<AccelSample>,
}

/// Accelerometer controller.
///
/// Events: `"data"` for every vector reply, `"change"` when the reading differs
/// from the previous one, `"tap"` for any tap and `"tap:single"` /
/// `"tap:double"` for the specific kinds. Streams are switched on when the first
/// listener for a matching event is attached.
#[derive(Clone)]
pub struct Accelerometer {
    state: Rc<RefCell<AccelState>>,
    events: Rc<Emitter<AccelEvent>>,
    outbox: Outbox,
    config: AccelerometerConfig,
}

impl Accelerometer {
    /// Creates the controller and registers its reply handlers on `board`.
    ///
    /// Sends the configured range, if any. No stream is enabled until a listener
    /// asks for one.
    pub fn new(board: &mut Board, config: AccelerometerConfig) -> Accelerometer {
        let state = Rc::new(RefCell::new(AccelState::default()));
        let events = Rc::new(Emitter::new());

        let vector_state = Rc::clone(&state);
        let vector_events = Rc::clone(&events);
        board.register(CP_ACCEL_READ_REPLY, move |payload, _now_ms| {
            let sample = decode_sample(payload)?;
            debug!("Accelerometer sample: {:?}", sample);
            let changed = vector_state.borrow_mut().last.replace(sample) != Some(sample);
            vector_events.emit("data", &AccelEvent::Sample(sample));
            if changed {
                vector_events.emit("change", &AccelEvent::Sample(sample));
            }
            Ok(())
        });

        let tap_events = Rc::clone(&events);
        board.register(CP_ACCEL_TAP_REPLY, move |payload, _now_ms| {
            let Some(flags) = decode_tap(payload)? else {
                return Ok(());
            };
            debug!("Accelerometer tap: {:?}", flags);
            let event = AccelEvent::Tap(flags);
            tap_events.emit("tap", &event);
            if flags.single {
                tap_events.emit("tap:single", &event);
            }
            if flags.double {
                tap_events.emit("tap:double", &event);
            }
            Ok(())
        });

        let accelerometer = Accelerometer {
            state,
            events,
            outbox: board.outbox(),
            config,
        };
        if let Some(range) = config.range {
            accelerometer.set_range(range);
        }
        accelerometer
    }

    /// Attaches a listener, enabling the matching stream the first time it is
    /// needed.
    pub fn on<F>(&self, name: &str, listener: F) -> ListenerId
    where
        F: FnMut(&AccelEvent) + 'static,
    {
        {
            let mut state = self.state.borrow_mut();
            if is_sample_event(name) && !state.streaming {
                state.streaming = true;
                self.outbox.send(Command::AccelStreamOn);
            }
            if is_tap_event(name) && !state.tap_streaming {
                state.tap_streaming = true;
                self.outbox.send(Command::AccelTapStreamOn);
            }
        }
        self.events.on(name, listener)
    }

    pub fn off(&self, id: ListenerId) -> bool {
        self.events.off(id)
    }

    /// Requests a single vector reading; it arrives as a `"data"` event.
    pub fn read(&self) {
        self.outbox.send(Command::AccelRead);
    }

    pub fn set_range(&self, range: AccelRange) {
        self.outbox.send(Command::AccelRange(range));
    }

    /// Removes every listener and disables the vector stream.
    ///
    /// The tap stream stays on unless the config asks for it to be disabled too.
    pub fn stop(&self) {
        self.events.remove_all_listeners();
        let mut state = self.state.borrow_mut();
        state.streaming = false;
        self.outbox.send(Command::AccelStreamOff);
        if self.config.disable_tap_stream_on_stop && state.tap_streaming {
            state.tap_streaming = false;
            self.outbox.send(Command::AccelTapStreamOff);
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.state.borrow().streaming
    }

    pub fn is_tap_streaming(&self) -> bool {
        self.state.borrow().tap_streaming
    }

    /// Most recent vector reading.
    pub fn sample(&self) -> Option<AccelSample> {
        self.state.borrow().last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn sample_payload(x: f32, y: f32, z: f32) -> Vec<u8> {
        let mut payload = Vec::new();
        payload.extend_from_slice(&x.to_le_bytes());
        payload.extend_from_slice(&y.to_le_bytes());
        payload.extend_from_slice(&z.to_le_bytes());
        payload
    }

    fn opcodes(board: &Board) -> Vec<u8> {
        board.outbox().drain().iter().map(|f| f.opcode()).collect()
    }

    fn record(accel: &Accelerometer, name: &'static str) -> Rc<RefCell<Vec<AccelEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        accel.on(name, move |e| s.borrow_mut().push(*e));
        seen
    }

    #[test]
    fn decodes_vector_sample() {
        let sample = decode_sample(&sample_payload(1.0, -2.5, 0.0)).unwrap();
        assert_eq!(
            sample,
            AccelSample {
                x: 1.0,
                y: -2.5,
                z: 0.0
            }
        );
    }

    #[test]
    fn short_vector_payload_is_rejected() {
        assert_eq!(
            decode_sample(&[0; 11]),
            Err(Error::ShortPayload {
                opcode: CP_ACCEL_READ_REPLY,
                expected: 12,
                actual: 11
            })
        );
        assert!(decode_tap(&[]).is_err());
    }

    #[test]
    fn tap_bits() {
        assert_eq!(decode_tap(&[0x00]), Ok(None));
        assert_eq!(
            decode_tap(&[0x10]),
            Ok(Some(TapFlags {
                single: true,
                double: false
            }))
        );
        assert_eq!(
            decode_tap(&[0x30]),
            Ok(Some(TapFlags {
                single: true,
                double: true
            }))
        );
    }

    #[test]
    fn streams_enable_once_per_activation() {
        let mut board = Board::new();
        let accel = Accelerometer::new(&mut board, AccelerometerConfig::default());
        assert!(board.outbox().is_empty());

        accel.on("change", |_| {});
        accel.on("data", |_| {});
        accel.on("tap", |_| {});
        accel.on("tap:double", |_| {});
        assert_eq!(
            opcodes(&board),
            [CP_ACCEL_STREAM_ON, CP_ACCEL_TAP_STREAM_ON]
        );
        assert!(accel.is_streaming());
        assert!(accel.is_tap_streaming());
    }

    #[test]
    fn other_events_do_not_enable_streams() {
        let mut board = Board::new();
        let accel = Accelerometer::new(&mut board, AccelerometerConfig::default());
        accel.on("orientation", |_| {});
        assert!(board.outbox().is_empty());
    }

    #[test]
    fn configured_range_is_sent_on_setup() {
        let mut board = Board::new();
        let _accel = Accelerometer::new(
            &mut board,
            AccelerometerConfig::default().range(AccelRange::G4),
        );
        let frames = board.outbox().drain();
        assert_eq!(frames[0].as_bytes(), [CP_COMMAND, CP_ACCEL_RANGE, 0x01]);
    }

    #[test]
    fn vector_reply_emits_data_and_change() {
        let mut board = Board::new();
        let accel = Accelerometer::new(&mut board, AccelerometerConfig::default());
        let data = record(&accel, "data");
        let change = record(&accel, "change");

        let mut body = vec![CP_COMMAND, CP_ACCEL_READ_REPLY];
        body.extend(sample_payload(0.5, 0.25, 9.75));
        board.handle_sysex(&body, 0).unwrap();
        board.handle_sysex(&body, 10).unwrap();

        assert_eq!(data.borrow().len(), 2);
        assert_eq!(change.borrow().len(), 1);
        assert_eq!(accel.sample().map(|s| s.z), Some(9.75));
    }

    #[test]
    fn tap_reply_events() {
        let mut board = Board::new();
        let accel = Accelerometer::new(&mut board, AccelerometerConfig::default());
        let tap = record(&accel, "tap");
        let single = record(&accel, "tap:single");
        let double = record(&accel, "tap:double");

        for byte in [0x10, 0x20, 0x30, 0x00] {
            board
                .handle_sysex(&[CP_COMMAND, CP_ACCEL_TAP_REPLY, byte], 0)
                .unwrap();
        }

        assert_eq!(tap.borrow().len(), 3);
        assert_eq!(single.borrow().len(), 2);
        assert_eq!(double.borrow().len(), 2);
        assert_eq!(
            tap.borrow()[2],
            AccelEvent::Tap(TapFlags {
                single: true,
                double: true
            })
        );
    }

    #[test]
    fn stop_disables_vector_stream_only() {
        let mut board = Board::new();
        let accel = Accelerometer::new(&mut board, AccelerometerConfig::default());
        accel.on("data", |_| {});
        accel.on("tap", |_| {});
        board.outbox().drain();

        accel.stop();
        assert_eq!(opcodes(&board), [CP_ACCEL_STREAM_OFF]);
        assert!(!accel.is_streaming());
        assert!(accel.is_tap_streaming());

        // Tap stream never went off, so no second enable.
        accel.on("tap", |_| {});
        accel.on("data", |_| {});
        assert_eq!(opcodes(&board), [CP_ACCEL_STREAM_ON]);
    }

    #[test]
    fn stop_can_disable_tap_stream() {
        let mut board = Board::new();
        let accel = Accelerometer::new(
            &mut board,
            AccelerometerConfig::default().disable_tap_stream_on_stop(true),
        );
        accel.on("tap", |_| {});
        board.outbox().drain();

        accel.stop();
        assert_eq!(
            opcodes(&board),
            [CP_ACCEL_STREAM_OFF, CP_ACCEL_TAP_STREAM_OFF]
        );
    }

    #[test]
    fn stop_removes_listeners() {
        let mut board = Board::new();
        let accel = Accelerometer::new(&mut board, AccelerometerConfig::default());
        let tap = record(&accel, "tap");
        accel.stop();
        board
            .handle_sysex(&[CP_COMMAND, CP_ACCEL_TAP_REPLY, 0x10], 0)
            .unwrap();
        assert!(tap.borrow().is_empty());
    }
}
