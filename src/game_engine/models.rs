use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game_engine::error::{EngineError, EngineResult};
use crate::game_engine::helpers::column_range;

/// Highest number in a 1–90 deck.
pub const MAX_NUMBER: u8 = 90;
pub const ROWS: usize = 3;
pub const COLUMNS: usize = 9;
pub const NUMBERS_PER_ROW: usize = 5;
pub const NUMBERS_PER_TICKET: usize = ROWS * NUMBERS_PER_ROW;

// ---------------------------------------------------------------------------
// Pattern keys
// ---------------------------------------------------------------------------

/// A named win condition. Implemented by both the caller-side and the
/// ticket-side key sets so status diffing can be shared.
pub trait Pattern: Copy + Ord + fmt::Debug + fmt::Display + 'static {
    /// Every key, in display order.
    const ALL: &'static [Self];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallerPattern {
    FirstFive,
    FirstLine,
    MiddleLine,
    LastLine,
    FullHouse,
}

impl Pattern for CallerPattern {
    const ALL: &'static [Self] = &[
        CallerPattern::FirstFive,
        CallerPattern::FirstLine,
        CallerPattern::MiddleLine,
        CallerPattern::LastLine,
        CallerPattern::FullHouse,
    ];
}

impl fmt::Display for CallerPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CallerPattern::FirstFive  => "First Five",
            CallerPattern::FirstLine  => "First Line",
            CallerPattern::MiddleLine => "Middle Line",
            CallerPattern::LastLine   => "Last Line",
            CallerPattern::FullHouse  => "Full House",
        };
        write!(f, "{}", s)
    }
}

impl CallerPattern {
    /// Number range a line pattern covers on the caller board.
    pub fn line_range(self) -> Option<std::ops::RangeInclusive<u8>> {
        match self {
            CallerPattern::FirstLine  => Some(1..=30),
            CallerPattern::MiddleLine => Some(31..=60),
            CallerPattern::LastLine   => Some(61..=90),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TicketPattern {
    FirstFive,
    TopLine,
    MiddleLine,
    BottomLine,
    FullHouse,
}

impl Pattern for TicketPattern {
    const ALL: &'static [Self] = &[
        TicketPattern::FirstFive,
        TicketPattern::TopLine,
        TicketPattern::MiddleLine,
        TicketPattern::BottomLine,
        TicketPattern::FullHouse,
    ];
}

impl fmt::Display for TicketPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TicketPattern::FirstFive  => "First Five",
            TicketPattern::TopLine    => "Top Line",
            TicketPattern::MiddleLine => "Middle Line",
            TicketPattern::BottomLine => "Bottom Line",
            TicketPattern::FullHouse  => "Full House",
        };
        write!(f, "{}", s)
    }
}

impl TicketPattern {
    /// Grid row a line pattern refers to.
    pub fn row(self) -> Option<usize> {
        match self {
            TicketPattern::TopLine    => Some(0),
            TicketPattern::MiddleLine => Some(1),
            TicketPattern::BottomLine => Some(2),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Win status
// ---------------------------------------------------------------------------

/// Per-pattern completion flags. Derived state: recomputed on every mutation,
/// never treated as authoritative when persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinStatus<P: Pattern> {
    flags: BTreeMap<P, bool>,
}

impl<P: Pattern> Default for WinStatus<P> {
    fn default() -> Self {
        Self::from_fn(|_| false)
    }
}

impl<P: Pattern> WinStatus<P> {
    /// Build a status by asking `won` about every pattern key.
    pub fn from_fn(mut won: impl FnMut(P) -> bool) -> Self {
        WinStatus {
            flags: P::ALL.iter().map(|&p| (p, won(p))).collect(),
        }
    }

    pub fn is_won(&self, pattern: P) -> bool {
        self.flags.get(&pattern).copied().unwrap_or(false)
    }

    /// Patterns true here but false in `previous` (false→true edges only).
    pub fn newly_completed(&self, previous: &WinStatus<P>) -> BTreeSet<P> {
        self.flags
            .iter()
            .filter(|&(p, &won)| won && !previous.is_won(*p))
            .map(|(p, _)| *p)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (P, bool)> + '_ {
        self.flags.iter().map(|(p, won)| (*p, *won))
    }

    pub fn won_patterns(&self) -> Vec<P> {
        self.iter().filter(|(_, won)| *won).map(|(p, _)| p).collect()
    }
}

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

pub type Cell = Option<u8>;
pub type Grid = [[Cell; COLUMNS]; ROWS];

/// A player's 3×9 ticket holding 15 numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "ticket")]
    pub grid: Grid,
}

impl Ticket {
    /// All filled values, row by row.
    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.grid.iter().flat_map(|row| row.iter().flatten().copied())
    }

    /// Filled values of one row; empty for an out-of-range row.
    pub fn row_numbers(&self, row: usize) -> Vec<u8> {
        self.grid
            .get(row)
            .map(|cells| cells.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        self.grid.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn contains(&self, number: u8) -> bool {
        self.numbers().any(|n| n == number)
    }

    /// Check every structural invariant of a ticket. Rows come out ascending
    /// whenever each value sits in its own column's range.
    pub fn validate(&self) -> EngineResult<()> {
        let mut seen = BTreeSet::new();
        for (r, row) in self.grid.iter().enumerate() {
            let mut filled = 0usize;
            for (c, cell) in row.iter().enumerate() {
                let Some(value) = *cell else { continue };
                filled += 1;
                if !column_range(c).contains(&value) {
                    return Err(EngineError::InvalidTicket(format!(
                        "{value} does not belong in column {c}"
                    )));
                }
                if !seen.insert(value) {
                    return Err(EngineError::InvalidTicket(format!("{value} appears twice")));
                }
            }
            if filled != NUMBERS_PER_ROW {
                return Err(EngineError::InvalidTicket(format!(
                    "row {r} has {filled} numbers, expected {NUMBERS_PER_ROW}"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.grid {
            let cells: Vec<String> = row
                .iter()
                .map(|cell| match cell {
                    Some(n) => format!("{:>2}", n),
                    None => " .".to_string(),
                })
                .collect();
            writeln!(f, "|{}|", cells.join("|"))?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Marks
// ---------------------------------------------------------------------------

/// Numbers a player has toggled. Keys not on the ticket are tolerated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkSet(BTreeMap<u8, bool>);

impl MarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_marked(&self, number: u8) -> bool {
        self.0.get(&number).copied().unwrap_or(false)
    }

    /// Flip the mark on `number`; returns the new state.
    pub fn toggle(&mut self, number: u8) -> bool {
        let entry = self.0.entry(number).or_insert(false);
        *entry = !*entry;
        *entry
    }

}

impl FromIterator<u8> for MarkSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        MarkSet(iter.into_iter().map(|n| (n, true)).collect())
    }
}

// ---------------------------------------------------------------------------
// Saved tickets / read models
// ---------------------------------------------------------------------------

/// Snapshot of a ticket, its marks and its label, as kept in the saved list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedTicket {
    pub id: String,
    pub name: String,
    pub ticket: Grid,
    #[serde(default)]
    pub clicked_numbers: MarkSet,
}

/// One cell of the caller's 1–90 board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardCell {
    pub number: u8,
    pub drawn: bool,
    /// Belongs to a detected or declared winner set.
    pub winning: bool,
}
