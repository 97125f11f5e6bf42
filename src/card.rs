// tabellone/src/card.rs
// Card generation, marking and prize evaluation. A card is a fixed 3x9 grid
// of 15 numbers laid out by decade columns; only the marked set changes
// after construction.

use crate::defs::{CARDLAYOUT, LASTNUMBER, Number, NUMBERSPERCARD};
use crate::prize::{PrizeKey, PrizeRank};

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Inclusive range of numbers a column may hold. The first column holds 1-9
/// and the last column absorbs 90, per the classic cartella layout.
pub fn column_range(col: usize) -> RangeInclusive<Number> {
    match col {
        0 => 1..=9,
        c if c == CARDLAYOUT.cols - 1 => (c as Number * 10)..=LASTNUMBER,
        c => (c as Number * 10)..=(c as Number * 10 + 9),
    }
}

/// Column a number belongs to.
pub fn decade_column(number: Number) -> usize {
    ((number / 10) as usize).min(CARDLAYOUT.cols - 1)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CardError {
    #[error("card grid must be 3 rows of 9 columns")]
    WrongShape,
    #[error("row {row} holds {count} numbers instead of {expected}", expected = CARDLAYOUT.numbers_per_row)]
    WrongRowCount { row: usize, count: usize },
    #[error("number {number} does not belong to column {col}")]
    OutOfColumn { number: Number, col: usize },
    #[error("number {0} appears more than once")]
    Duplicate(Number),
    #[error("column {0} is not sorted top to bottom")]
    ColumnOrder(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkOutcome {
    Marked,
    AlreadyMarked,
    NotPresent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    id: u64,
    grid: Vec<Vec<Option<Number>>>,
    marked: HashSet<Number>,
}

impl Card {
    /// Generate a random card: 15 numbers over 9 decade columns, 5 per row,
    /// ascending within each column.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        loop {
            let counts = column_counts(rng);
            if let Some(rows) = assign_rows(rng, &counts) {
                let grid = fill_grid(rng, &counts, &rows);
                return Card {
                    id: card_id(&grid),
                    grid,
                    marked: HashSet::new(),
                };
            }
        }
    }

    /// Build a card from an explicit grid, validating the layout rules.
    pub fn from_grid(grid: Vec<Vec<Option<Number>>>) -> Result<Self, CardError> {
        if grid.len() != CARDLAYOUT.rows || grid.iter().any(|row| row.len() != CARDLAYOUT.cols) {
            return Err(CardError::WrongShape);
        }
        let mut seen = HashSet::new();
        for (row_index, row) in grid.iter().enumerate() {
            let count = row.iter().flatten().count();
            if count != CARDLAYOUT.numbers_per_row {
                return Err(CardError::WrongRowCount {
                    row: row_index,
                    count,
                });
            }
            for (col, &number) in row.iter().enumerate().filter_map(|(c, cell)| {
                cell.as_ref().map(|n| (c, n))
            }) {
                if !column_range(col).contains(&number) {
                    return Err(CardError::OutOfColumn { number, col });
                }
                if !seen.insert(number) {
                    return Err(CardError::Duplicate(number));
                }
            }
        }
        for col in 0..CARDLAYOUT.cols {
            let column: Vec<Number> = grid.iter().filter_map(|row| row[col]).collect();
            if column.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(CardError::ColumnOrder(col));
            }
        }
        Ok(Card {
            id: card_id(&grid),
            grid,
            marked: HashSet::new(),
        })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn grid(&self) -> &[Vec<Option<Number>>] {
        &self.grid
    }

    /// All numbers on the card, row-major.
    pub fn numbers(&self) -> Vec<Number> {
        self.grid.iter().flatten().flatten().copied().collect()
    }

    pub fn row_numbers(&self, row: usize) -> Vec<Number> {
        self.grid
            .get(row)
            .map(|cells| cells.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, number: Number) -> bool {
        self.numbers().contains(&number)
    }

    pub fn marked_numbers(&self) -> Vec<Number> {
        let mut marked: Vec<Number> = self.marked.iter().copied().collect();
        marked.sort_unstable();
        marked
    }

    pub fn unmarked_numbers(&self) -> Vec<Number> {
        self.numbers()
            .into_iter()
            .filter(|number| !self.marked.contains(number))
            .collect()
    }

    /// Mark `number` if it is on the card. Idempotent: repeat marks and
    /// numbers not on the card leave the state untouched. Whether the number
    /// was actually drawn is the caller's responsibility.
    pub fn mark(&mut self, number: Number) -> MarkOutcome {
        if !self.contains(number) {
            MarkOutcome::NotPresent
        } else if self.marked.insert(number) {
            MarkOutcome::Marked
        } else {
            MarkOutcome::AlreadyMarked
        }
    }

    pub fn is_marked(&self, number: Number) -> bool {
        self.marked.contains(&number)
    }

    pub fn marked_in_row(&self, row: usize) -> usize {
        self.row_numbers(row)
            .iter()
            .filter(|number| self.marked.contains(number))
            .count()
    }

    /// Prize rank currently reached by a row, if any.
    pub fn row_rank(&self, row: usize) -> Option<PrizeRank> {
        PrizeRank::from_row_count(self.marked_in_row(row))
    }

    /// Tombola when every number on the card is marked.
    pub fn card_rank(&self) -> Option<PrizeRank> {
        (self.marked.len() == NUMBERSPERCARD).then_some(PrizeRank::Tombola)
    }

    /// The single best claim this card can still make: tombola first, then
    /// the highest per-row rank not yet granted, ties to the lowest row.
    pub fn best_available_claim(&self, awarded: &HashSet<PrizeKey>) -> Option<PrizeKey> {
        if self.card_rank() == Some(PrizeRank::Tombola) {
            let key = PrizeKey {
                card_id: self.id,
                row: None,
                rank: PrizeRank::Tombola,
            };
            if !awarded.contains(&key) {
                return Some(key);
            }
        }
        let mut best: Option<PrizeKey> = None;
        for row in 0..CARDLAYOUT.rows {
            if let Some(rank) = self.row_rank(row) {
                let key = PrizeKey {
                    card_id: self.id,
                    row: Some(row),
                    rank,
                };
                if awarded.contains(&key) {
                    continue;
                }
                if best.as_ref().is_none_or(|current| rank > current.rank) {
                    best = Some(key);
                }
            }
        }
        best
    }

    pub(crate) fn clear_marks(&mut self) {
        self.marked.clear();
    }
}

// Distribute the 15 numbers over the columns: one each, then the remaining
// six land on random columns that still have room.
fn column_counts<R: Rng + ?Sized>(rng: &mut R) -> Vec<usize> {
    let mut counts = vec![1; CARDLAYOUT.cols];
    let mut extra = NUMBERSPERCARD - CARDLAYOUT.cols;
    while extra > 0 {
        let col = rng.random_range(0..CARDLAYOUT.cols);
        if counts[col] < CARDLAYOUT.max_per_column {
            counts[col] += 1;
            extra -= 1;
        }
    }
    counts
}

// Pick the rows each column occupies, fullest columns first, always taking
// the least-loaded rows so every row ends with exactly five numbers.
fn assign_rows<R: Rng + ?Sized>(rng: &mut R, counts: &[usize]) -> Option<Vec<Vec<usize>>> {
    let mut row_loads = vec![0usize; CARDLAYOUT.rows];
    let mut assignments = vec![Vec::new(); counts.len()];

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.shuffle(rng);
    order.sort_by_key(|&col| std::cmp::Reverse(counts[col]));

    for &col in &order {
        let mut rows: Vec<(usize, u32, usize)> = (0..CARDLAYOUT.rows)
            .map(|row| (row_loads[row], rng.random(), row))
            .collect();
        rows.sort_unstable();
        let mut chosen: Vec<usize> = rows.iter().take(counts[col]).map(|&(_, _, row)| row).collect();
        for &row in &chosen {
            row_loads[row] += 1;
            if row_loads[row] > CARDLAYOUT.numbers_per_row {
                return None;
            }
        }
        chosen.sort_unstable();
        assignments[col] = chosen;
    }

    row_loads
        .iter()
        .all(|&load| load == CARDLAYOUT.numbers_per_row)
        .then_some(assignments)
}

// Draw the actual numbers from each column's decade range and place them
// ascending along the occupied rows.
fn fill_grid<R: Rng + ?Sized>(
    rng: &mut R,
    counts: &[usize],
    rows: &[Vec<usize>],
) -> Vec<Vec<Option<Number>>> {
    let mut grid = vec![vec![None; CARDLAYOUT.cols]; CARDLAYOUT.rows];
    for col in 0..CARDLAYOUT.cols {
        let mut pool: Vec<Number> = column_range(col).collect();
        pool.shuffle(rng);
        let mut picked: Vec<Number> = pool.into_iter().take(counts[col]).collect();
        picked.sort_unstable();
        for (&row, number) in rows[col].iter().zip(picked) {
            grid[row][col] = Some(number);
        }
    }
    grid
}

// Stable card identity hashed from the grid content.
fn card_id(grid: &[Vec<Option<Number>>]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for row in grid {
        for cell in row {
            hasher.write_u8(cell.unwrap_or(0));
        }
    }
    hasher.finish()
}

/// Test fixture: build a card from three rows of five numbers, each number
/// placed in its decade column.
#[cfg(test)]
pub(crate) fn fixture_card(rows: [[Number; 5]; 3]) -> Card {
    let mut grid = vec![vec![None; CARDLAYOUT.cols]; CARDLAYOUT.rows];
    for (row_index, row) in rows.iter().enumerate() {
        for &number in row {
            grid[row_index][decade_column(number)] = Some(number);
        }
    }
    Card::from_grid(grid).expect("fixture grid must be valid")
}
