use alloc::vec::Vec;

use crate::constants::{CAP_TOUCH_THRESHOLD, DEFAULT_HOLD_TIME_MS, SEVEN_BIT_MASK};
use crate::error::Error;

/// Full-scale range of the on-board accelerometer.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum AccelRange {
    G2,
    G4,
    G8,
    G16,
}

impl AccelRange {
    /// Returns the range code the firmware expects in an `ACCEL_RANGE` frame.
    pub fn code(self) -> u8 {
        match self {
            AccelRange::G2 => 0x00,
            AccelRange::G4 => 0x01,
            AccelRange::G8 => 0x02,
            AccelRange::G16 => 0x03,
        }
    }
}

/// Configuration settings for the accelerometer controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct AccelerometerConfig {
    /// Range sent to the board during setup. `None` leaves the firmware default.
    pub range: Option<AccelRange>,
    /// When set, `stop` also turns the tap stream off. Off by default: the tap
    /// stream keeps running after `stop`, as the firmware has always expected.
    pub disable_tap_stream_on_stop: bool,
}

impl AccelerometerConfig {
    /// Sets the range sent during setup.
    pub fn range(mut self, range: AccelRange) -> Self {
        self.range = Some(range);
        self
    }

    /// Sets whether `stop` also disables the tap stream.
    pub fn disable_tap_stream_on_stop(mut self, disable: bool) -> Self {
        self.disable_tap_stream_on_stop = disable;
        self
    }
}

/// Configuration settings for the capacitive touch controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TouchpadConfig {
    /// Monitored pad identifiers, in channel order.
    pub pads: Vec<u8>,
    /// Minimum interval between repeated "hold" events on a touched pad.
    pub hold_time_ms: u64,
    /// Readings at or above this value count as touched.
    pub threshold: i16,
}

impl TouchpadConfig {
    /// Creates a new `TouchpadConfig` monitoring the given pads.
    ///
    /// # Arguments
    ///
    /// * `pads` - The pad identifiers, in the order their channels are numbered.
    ///
    /// # Returns
    ///
    /// A config with the default hold time and threshold.
    pub fn new(pads: &[u8]) -> TouchpadConfig {
        TouchpadConfig {
            pads: pads.to_vec(),
            ..TouchpadConfig::default()
        }
    }

    /// Sets the hold time in milliseconds.
    pub fn hold_time_ms(mut self, hold_time_ms: u64) -> Self {
        self.hold_time_ms = hold_time_ms;
        self
    }

    /// Sets the touch threshold.
    pub fn threshold(mut self, threshold: i16) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the pad list masked to 7 bits, checked for duplicates and for
    /// fitting the 32-bit touch mask.
    pub fn validate(&self) -> Result<Vec<u8>, Error> {
        if self.pads.len() > 32 {
            log::error!("{} pads configured, at most 32 supported", self.pads.len());
            return Err(Error::InvalidArg("more than 32 touch pads"));
        }
        let pads: Vec<u8> = self.pads.iter().map(|p| p & SEVEN_BIT_MASK).collect();
        for (i, pad) in pads.iter().enumerate() {
            if pads[..i].contains(pad) {
                log::error!("Touch pad {} configured twice", pad);
                return Err(Error::InvalidArg("duplicate touch pad"));
            }
        }
        Ok(pads)
    }
}

impl Default for TouchpadConfig {
    /// Returns a config with no pads, a 500 ms hold time and the stock threshold.
    fn default() -> TouchpadConfig {
        TouchpadConfig {
            pads: Vec::new(),
            hold_time_ms: DEFAULT_HOLD_TIME_MS,
            threshold: CAP_TOUCH_THRESHOLD,
        }
    }
}

/// Configuration settings for the serial link.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LinkConfig {
    /// Largest decoded sysex body accepted from the board.
    pub max_frame_len: usize,
    /// Consecutive empty reads tolerated before `process` gives up.
    pub max_attempts: usize,
}

impl LinkConfig {
    pub fn max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }

    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

impl Default for LinkConfig {
    fn default() -> LinkConfig {
        LinkConfig {
            max_frame_len: 64,
            max_attempts: 5,
        }
    }
}
