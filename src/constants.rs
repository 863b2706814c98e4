// START_SYSEX opens an extended command frame on the Firmata wire.
pub const START_SYSEX: u8 = 0xF0;

// END_SYSEX closes an extended command frame.
pub const END_SYSEX: u8 = 0xF7;

// CP_COMMAND is the vendor tag that prefixes every Circuit Playground frame,
// in both directions.
pub const CP_COMMAND: u8 = 0x40;

// Pixel strip.
pub const CP_PIXEL_SET: u8 = 0x10;
pub const CP_PIXEL_SHOW: u8 = 0x11;
pub const CP_PIXEL_CLEAR: u8 = 0x12;

// Piezo buzzer.
pub const CP_TONE: u8 = 0x20;
pub const CP_NO_TONE: u8 = 0x21;

// Accelerometer commands (host to board).
pub const CP_ACCEL_READ: u8 = 0x30;
pub const CP_ACCEL_TAP: u8 = 0x31;
pub const CP_ACCEL_ON: u8 = 0x32;
pub const CP_ACCEL_OFF: u8 = 0x33;
pub const CP_ACCEL_TAP_ON: u8 = 0x34;
pub const CP_ACCEL_TAP_OFF: u8 = 0x35;
pub const CP_ACCEL_TAP_STREAM_ON: u8 = 0x38;
pub const CP_ACCEL_TAP_STREAM_OFF: u8 = 0x39;
pub const CP_ACCEL_STREAM_ON: u8 = 0x3A;
pub const CP_ACCEL_STREAM_OFF: u8 = 0x3B;
pub const CP_ACCEL_RANGE: u8 = 0x3C;

// Accelerometer replies (board to host).
pub const CP_ACCEL_READ_REPLY: u8 = 0x36;
pub const CP_ACCEL_TAP_REPLY: u8 = 0x37;

// Capacitive touch.
pub const CP_CAP_READ: u8 = 0x40;
pub const CP_CAP_ON: u8 = 0x41;
pub const CP_CAP_OFF: u8 = 0x42;
pub const CP_CAP_REPLY: u8 = 0x43;

// Payload sizes of the inbound replies, opcode excluded.
pub const ACCEL_READ_REPLY_LEN: usize = 12;
pub const ACCEL_TAP_REPLY_LEN: usize = 1;
pub const CAP_REPLY_LEN: usize = 3;

// Tap reply bitfield.
pub const TAP_SINGLE: u8 = 0x10;
pub const TAP_DOUBLE: u8 = 0x20;

// A cap reading at or above this value counts as touched.
pub const CAP_TOUCH_THRESHOLD: i16 = 300;

// Default interval between repeated "hold" events on a touched pad.
pub const DEFAULT_HOLD_TIME_MS: u64 = 500;

// Trailing debounce window applied to touch event batches.
pub const TOUCH_DEBOUNCE_MS: u64 = 5;

// Data bytes in a sysex frame carry 7 bits.
pub const SEVEN_BIT_MASK: u8 = 0x7F;
pub const FOURTEEN_BIT_MASK: u16 = 0x3FFF;
