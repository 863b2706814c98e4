//! Peripherals sharing one board, wired together through listeners.

use std::cell::RefCell;
use std::rc::Rc;

use playground_firmata::*;

fn cap_reply(pad: u8, reading: i16) -> Vec<u8> {
    let [lo, hi] = reading.to_le_bytes();
    vec![CP_COMMAND, CP_CAP_REPLY, pad, lo, hi]
}

fn opcodes(board: &Board) -> Vec<u8> {
    board.outbox().drain().iter().map(|f| f.opcode()).collect()
}

#[test]
fn test_tap_plays_tone() {
    let mut board = Board::new();
    let piezo = Piezo::new(&board);
    let accel = Accelerometer::new(&mut board, AccelerometerConfig::default());

    let p = piezo.clone();
    accel.on("tap", move |event| {
        if let AccelEvent::Tap(flags) = event {
            p.frequency(if flags.double { 1500 } else { 500 }, Some(50));
        }
    });
    assert_eq!(opcodes(&board), [CP_ACCEL_TAP_STREAM_ON]);

    board
        .handle_sysex(&[CP_COMMAND, CP_ACCEL_TAP_REPLY, TAP_DOUBLE], 0)
        .unwrap();
    let frames = board.outbox().drain();
    assert_eq!(frames.len(), 1);
    let tone = Command::Tone {
        frequency: 1500,
        duration: 50,
    };
    assert_eq!(frames[0], tone.encode());
}

#[test]
fn test_touch_change_drives_piezo() {
    let mut board = Board::new();
    let piezo = Piezo::new(&board);
    let pads = Touchpad::new(&mut board, TouchpadConfig::new(&[10])).unwrap();
    board.outbox().drain();

    let p = piezo.clone();
    pads.on("change", move |event| match event.kind {
        TouchKind::Down => p.frequency(700, Some(50)),
        _ => p.no_tone(),
    });

    board.handle_sysex(&cap_reply(10, 2000), 0).unwrap();
    board.poll(5);
    board.handle_sysex(&cap_reply(10, 0), 50).unwrap();
    board.poll(55);

    assert_eq!(opcodes(&board), [CP_TONE, CP_NO_TONE]);
}

#[test]
fn test_touch_lifecycle_through_board() {
    let mut board = Board::new();
    let pads = Touchpad::new(
        &mut board,
        TouchpadConfig::new(&[3]).hold_time_ms(200),
    )
    .unwrap();
    let kinds = Rc::new(RefCell::new(Vec::new()));
    let k = Rc::clone(&kinds);
    pads.on("change", move |event| k.borrow_mut().push(event.kind));

    let mut now = 0;
    for reading in [900, 900, 900, 10] {
        board.handle_sysex(&cap_reply(3, reading), now).unwrap();
        board.poll(now + 5);
        now += 150;
    }

    // t=0 down, t=150 nothing yet, t=300 hold, t=450 up.
    assert_eq!(
        *kinds.borrow(),
        [TouchKind::Down, TouchKind::Hold, TouchKind::Up]
    );
}

#[test]
fn test_peripherals_share_one_command_stream() {
    let mut board = Board::new();
    let pixels: Vec<Pixel> = (0..10).map(|i| Pixel::new(&board, i)).collect();
    let accel = Accelerometer::new(&mut board, AccelerometerConfig::default());

    for pixel in &pixels {
        pixel.write(0xFF_00_00u32);
    }
    accel.on("change", |_| {});
    accel.stop();

    let ops = opcodes(&board);
    assert_eq!(ops.len(), 22);
    assert_eq!(&ops[..2], [CP_PIXEL_SET, CP_PIXEL_SHOW]);
    assert_eq!(&ops[20..], [CP_ACCEL_STREAM_ON, CP_ACCEL_STREAM_OFF]);
}

#[test]
fn test_temperature_at_midscale() {
    assert_eq!(thermometer::Temperature::from_raw(512).celsius, 25);
}
