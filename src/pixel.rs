use crate::board::{Board, Outbox};
use crate::command::{Color, Command};
use crate::constants::SEVEN_BIT_MASK;

/// One pixel of the on-board RGB strip.
///
/// Every write is two frames: the colour is staged with `PIXEL_SET` and then
/// latched with `PIXEL_SHOW`.
#[derive(Clone)]
pub struct Pixel {
    index: u8,
    outbox: Outbox,
}

impl Pixel {
    /// `index` is masked to 7 bits.
    pub fn new(board: &Board, index: u8) -> Pixel {
        Pixel {
            index: index & SEVEN_BIT_MASK,
            outbox: board.outbox(),
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    pub fn write(&self, color: impl Into<Color>) {
        self.outbox.send(Command::PixelSet {
            index: self.index,
            color: color.into(),
        });
        self.outbox.send(Command::PixelShow);
    }

    pub fn off(&self) {
        self.write(Color::BLACK);
    }

    /// Turns every pixel of the strip off.
    pub fn clear_all(&self) {
        self.outbox.send(Command::PixelClear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn write_sends_set_then_show() {
        let board = Board::new();
        let pixel = Pixel::new(&board, 1);
        pixel.write(Color::new(0xFF, 0xFF, 0xFF));

        let frames = board.outbox().drain();
        assert_eq!(frames.len(), 2);
        assert_eq!(
            frames[0].as_bytes(),
            [CP_COMMAND, CP_PIXEL_SET, 1, 0x7F, 0x7F, 0x7F, 0x70]
        );
        assert_eq!(frames[1].as_bytes(), [CP_COMMAND, CP_PIXEL_SHOW]);
    }

    #[test]
    fn off_writes_black() {
        let board = Board::new();
        let pixel = Pixel::new(&board, 0x85);
        assert_eq!(pixel.index(), 5);
        pixel.off();

        let frames = board.outbox().drain();
        assert_eq!(frames[0].payload(), [5, 0, 0, 0, 0]);
        assert_eq!(frames[1].opcode(), CP_PIXEL_SHOW);
    }

    #[test]
    fn clear_all_is_a_single_frame() {
        let board = Board::new();
        Pixel::new(&board, 0).clear_all();
        let frames = board.outbox().drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), [CP_COMMAND, CP_PIXEL_CLEAR]);
    }
}
