use std::collections::{BTreeMap, BTreeSet};

use crate::game_engine::models::{
    CallerPattern, MarkSet, Pattern, Ticket, TicketPattern, WinStatus, MAX_NUMBER,
    NUMBERS_PER_TICKET,
};

/// Numbers needed before first five is awarded.
const FIRST_FIVE: usize = 5;

// ---------------------------------------------------------------------------
// Ticket side
// ---------------------------------------------------------------------------

/// Result of one ticket evaluation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketEvaluation {
    pub status: WinStatus<TicketPattern>,
    /// Patterns that went false→true relative to the previous status.
    pub newly_completed: BTreeSet<TicketPattern>,
    /// How many of the ticket's numbers are marked.
    pub clicked_count: usize,
}

/// Evaluate a ticket against a mark set.
///
/// Pure: running it twice with the same inputs gives the same status, and
/// feeding the returned status back in as `previous` yields no new events.
pub fn evaluate_ticket(
    ticket: &Ticket,
    marks: &MarkSet,
    previous: &WinStatus<TicketPattern>,
) -> TicketEvaluation {
    let clicked_count = ticket.numbers().filter(|&n| marks.is_marked(n)).count();

    let row_complete = |row: usize| {
        ticket.row_numbers(row).iter().all(|&n| marks.is_marked(n))
    };

    let status = WinStatus::from_fn(|pattern: TicketPattern| match pattern {
        TicketPattern::FirstFive => clicked_count >= FIRST_FIVE,
        TicketPattern::FullHouse => clicked_count == NUMBERS_PER_TICKET,
        line => line.row().is_some_and(&row_complete),
    });

    let newly_completed = status.newly_completed(previous);
    TicketEvaluation { status, newly_completed, clicked_count }
}

// ---------------------------------------------------------------------------
// Caller side
// ---------------------------------------------------------------------------

/// For each caller pattern, the qualifying numbers once it is complete.
///
/// Only distinct values in 1..=90 count; repeats and strays are ignored.
/// Line patterns need every number of their 30-wide band drawn. Returned
/// sequences keep draw order of first appearance.
pub fn evaluate_auto_patterns(drawn: &[u8]) -> BTreeMap<CallerPattern, Option<Vec<u8>>> {
    let distinct = distinct_in_draw_order(drawn);
    CallerPattern::ALL
        .iter()
        .map(|&pattern| (pattern, auto_pattern(pattern, &distinct)))
        .collect()
}

fn distinct_in_draw_order(drawn: &[u8]) -> Vec<u8> {
    let mut seen = BTreeSet::new();
    drawn
        .iter()
        .copied()
        .filter(|n| (1..=MAX_NUMBER).contains(n) && seen.insert(*n))
        .collect()
}

fn auto_pattern(pattern: CallerPattern, distinct: &[u8]) -> Option<Vec<u8>> {
    match pattern {
        CallerPattern::FirstFive => {
            (distinct.len() >= FIRST_FIVE).then(|| distinct[..FIRST_FIVE].to_vec())
        }
        CallerPattern::FullHouse => {
            (distinct.len() == MAX_NUMBER as usize).then(|| distinct.to_vec())
        }
        line => {
            let range = line.line_range()?;
            let band_size = range.clone().count();
            let in_band: Vec<u8> = distinct.iter().copied().filter(|n| range.contains(n)).collect();
            (in_band.len() == band_size).then_some(in_band)
        }
    }
}
