// tabellone/src/defs.rs
// Shared type aliases and layout constants for the tombola engine.

pub type Number = u8;

pub struct CardLayout {
    pub rows: usize,
    pub cols: usize,
    pub numbers_per_row: usize,
    pub max_per_column: usize,
}

pub const CARDLAYOUT: CardLayout = CardLayout {
    rows: 3,            // rows in a card
    cols: 9,            // columns in a card, one per decade
    numbers_per_row: 5, // numbers placed in each row
    max_per_column: 3,  // a column can never exceed the card height
};

pub const FIRSTNUMBER: Number = 1;
pub const LASTNUMBER: Number = CARDLAYOUT.cols as Number * 10;
pub const TOTALNUMBERS: usize = (LASTNUMBER - FIRSTNUMBER + 1) as usize;
pub const NUMBERSPERCARD: usize = CARDLAYOUT.rows * CARDLAYOUT.numbers_per_row;

// How many previous extractions the pouch snapshot reports.
pub const RECENT_WINDOW: usize = 5;
