//! Twelve-state history of recent symbol kinds.

/// Number of distinct states.
pub const NUM_STATES: usize = 12;

/// State of the symbol-kind machine.
///
/// | States | Meaning |
/// |--------|---------|
/// | 0-3 | literals after literals |
/// | 4-6 | literals shortly after a match or rep |
/// | 7 | after a match |
/// | 8 | after a rep |
/// | 9 | after a short rep |
/// | 10-11 | match or rep following a non-literal |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct State(u8);

impl State {
    pub const fn new() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Whether the last symbol was a literal; selects plain literal decoding.
    #[inline]
    pub const fn is_char_state(self) -> bool {
        self.0 < 7
    }

    #[inline]
    pub fn update_char(&mut self) {
        self.0 = match self.0 {
            0..=3 => 0,
            4..=9 => self.0 - 3,
            _ => self.0 - 6,
        };
    }

    #[inline]
    pub fn update_match(&mut self) {
        self.0 = if self.is_char_state() { 7 } else { 10 };
    }

    #[inline]
    pub fn update_rep(&mut self) {
        self.0 = if self.is_char_state() { 8 } else { 11 };
    }

    #[inline]
    pub fn update_short_rep(&mut self) {
        self.0 = if self.is_char_state() { 9 } else { 11 };
    }
}
