use crate::board::{Board, Outbox};
use crate::command::Command;

/// The on-board piezo buzzer.
#[derive(Clone)]
pub struct Piezo {
    outbox: Outbox,
}

impl Piezo {
    pub fn new(board: &Board) -> Piezo {
        Piezo {
            outbox: board.outbox(),
        }
    }

    /// Plays `frequency` Hz for `duration_ms`, or until [`Piezo::no_tone`] when
    /// no duration is given. Both values are masked to 14 bits.
    pub fn frequency(&self, frequency: u16, duration_ms: Option<u16>) {
        self.outbox.send(Command::Tone {
            frequency,
            duration: duration_ms.unwrap_or(0),
        });
    }

    pub fn no_tone(&self) {
        self.outbox.send(Command::NoTone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn frequency_sends_one_frame() {
        let board = Board::new();
        let piezo = Piezo::new(&board);
        piezo.frequency(700, Some(50));

        let frames = board.outbox().drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_bytes(), [CP_COMMAND, CP_TONE, 0x3C, 0x05, 50, 0]);
    }

    #[test]
    fn omitted_duration_encodes_zero() {
        let board = Board::new();
        Piezo::new(&board).frequency(16384, None);
        let frames = board.outbox().drain();
        assert_eq!(frames[0].payload(), [0, 0, 0, 0]);
    }

    #[test]
    fn no_tone_has_no_payload() {
        let board = Board::new();
        Piezo::new(&board).no_tone();
        assert_eq!(
            board.outbox().drain()[0].as_bytes(),
            [CP_COMMAND, CP_NO_TONE]
        );
    }
}
