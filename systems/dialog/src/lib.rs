#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Typewriter-style dialog box.
//!
//! A message is shown two rows at a time. Characters are revealed one by one
//! at a fixed rate; the advance button first reveals the rest of the page,
//! then moves to the next page, and finally closes the box.

use highlands_core::DialogConfig;

/// Number of rows shown per page.
pub const ROWS: usize = 2;

/// Dialog box state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogBox {
    row_length: usize,
    reveal_delay: u32,
    message: String,
    cursor: usize,
    rows: [Vec<char>; ROWS],
    display_length: usize,
    timer: u32,
    open: bool,
}

impl DialogBox {
    /// Creates a closed dialog box.
    #[must_use]
    pub fn new(config: &DialogConfig) -> Self {
        let row_length = config.row_length.max(1);
        Self {
            row_length,
            reveal_delay: config.reveal_delay.max(1),
            message: String::new(),
            cursor: 0,
            rows: [vec![' '; row_length], vec![' '; row_length]],
            display_length: 0,
            timer: 0,
            open: false,
        }
    }

    /// Reports whether the box is on screen.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Characters per row.
    #[must_use]
    pub const fn row_length(&self) -> usize {
        self.row_length
    }

    /// Number of characters revealed on the current page.
    #[must_use]
    pub const fn display_length(&self) -> usize {
        self.display_length
    }

    /// Reports whether the current page is completely visible.
    #[must_use]
    pub const fn is_fully_revealed(&self) -> bool {
        self.display_length >= self.page_capacity()
    }

    /// Rows of the current page, space padded to at least the row length.
    #[must_use]
    pub fn rows(&self) -> &[Vec<char>; ROWS] {
        &self.rows
    }

    /// Stores `message` and presses the advance button once, which shows its
    /// first page when the box is closed.
    pub fn open(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.cursor = 0;
        self.progress();
    }

    /// Handles the advance button.
    pub fn progress(&mut self) {
        if self.open && !self.is_fully_revealed() {
            self.display_length = self.page_capacity();
            return;
        }

        if self.cursor >= self.message.len() {
            self.open = false;
            return;
        }

        self.pop_next_lines();
        self.display_length = 0;
        self.timer = self.reveal_delay;
        self.open = true;
    }

    /// Reveals characters over time; call once per tick.
    pub fn update(&mut self) {
        if !self.open || self.is_fully_revealed() {
            return;
        }
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            self.display_length += 1;
            self.timer = self.reveal_delay;
        }
    }

    const fn page_capacity(&self) -> usize {
        self.row_length * ROWS
    }

    fn pop_next_lines(&mut self) {
        for row in &mut self.rows {
            row.clear();
            row.resize(self.row_length, ' ');
        }

        let mut row = 0;
        let mut col = 0;
        while self.cursor < self.message.len() {
            let remaining = &self.message[self.cursor..];
            let (word, separated) = match remaining.find(' ') {
                Some(end) => (&remaining[..end], true),
                None => (remaining, false),
            };

            let word_length = word.chars().count();
            if col + word_length > self.row_length {
                row += 1;
                col = 0;
                if row == ROWS {
                    break;
                }
            }

            for character in word.chars() {
                write_cell(&mut self.rows[row], col, character);
                col += 1;
            }
            self.cursor += word.len();

            if separated {
                self.cursor += 1;
                if col < self.row_length {
                    write_cell(&mut self.rows[row], col, ' ');
                    col += 1;
                }
            }
        }
    }
}

fn write_cell(row: &mut Vec<char>, col: usize, character: char) {
    match row.get_mut(col) {
        Some(cell) => *cell = character,
        None => row.push(character),
    }
}
