use std::collections::BTreeSet;

use rand::Rng;
use tracing::{info, warn};

use crate::game_engine::{
    config::EngineConfig,
    error::{EngineError, EngineResult},
    helpers::{column_range, new_id},
    models::{Grid, Ticket, COLUMNS, MAX_NUMBER, NUMBERS_PER_ROW, ROWS},
};

/// Pick `NUMBERS_PER_ROW` distinct columns by rejection sampling.
/// Returned ascending, so a row's values come out ascending too.
fn choose_columns<R: Rng>(rng: &mut R) -> BTreeSet<usize> {
    let mut cols = BTreeSet::new();
    while cols.len() < NUMBERS_PER_ROW {
        cols.insert(rng.gen_range(0..COLUMNS));
    }
    cols
}

/// Pick one value per chosen column from `available`. Nothing is removed
/// from `available`; the caller commits the picks once the whole row fits.
pub(crate) fn fill_row<R: Rng>(
    rng: &mut R,
    available: &[u8],
    cols: &BTreeSet<usize>,
) -> EngineResult<Vec<(usize, u8)>> {
    cols.iter()
        .map(|&col| {
            let range = column_range(col);
            let candidates: Vec<u8> = available
                .iter()
                .copied()
                .filter(|n| range.contains(n))
                .collect();
            if candidates.is_empty() {
                return Err(EngineError::ColumnExhausted { column: col });
            }
            Ok((col, candidates[rng.gen_range(0..candidates.len())]))
        })
        .collect()
}

/// Sort each column top-to-bottom among the rows that use it. Row membership
/// of cells is untouched, so every row keeps exactly five numbers.
fn sort_columns(grid: &mut Grid) {
    for col in 0..COLUMNS {
        let mut values: Vec<u8> = grid.iter().filter_map(|row| row[col]).collect();
        values.sort_unstable();
        let mut sorted = values.into_iter();
        for row in grid.iter_mut() {
            if row[col].is_some() {
                row[col] = sorted.next();
            }
        }
    }
}

/// Generate one player ticket: 3 rows × 5 numbers, each in its column's
/// range, no repeats across the ticket.
///
/// A row whose column runs dry is re-rolled up to `config.max_row_attempts`
/// times. With a fresh 90-number pool this cannot happen (a column has ten
/// numbers and at most three rows), but the retry keeps a bad ticket from
/// ever leaving the generator.
pub fn generate_ticket<R: Rng>(rng: &mut R, config: &EngineConfig) -> EngineResult<Ticket> {
    let mut available: Vec<u8> = (1..=MAX_NUMBER).collect();
    let mut grid: Grid = [[None; COLUMNS]; ROWS];

    for (row, cells) in grid.iter_mut().enumerate() {
        let mut attempts = 0;
        let picks = loop {
            attempts += 1;
            let cols = choose_columns(rng);
            match fill_row(rng, &available, &cols) {
                Ok(picks) => break picks,
                Err(EngineError::ColumnExhausted { column }) => {
                    warn!(row, column, attempts, "ticket column exhausted, re-rolling row");
                    if attempts >= config.max_row_attempts {
                        return Err(EngineError::GenerationFailed { row, attempts });
                    }
                }
                Err(e) => return Err(e),
            }
        };
        for (col, value) in picks {
            cells[col] = Some(value);
            available.retain(|&n| n != value);
        }
    }

    sort_columns(&mut grid);

    let ticket = Ticket {
        id: new_id(rng),
        name: String::new(),
        grid,
    };
    info!(ticket_id = %ticket.id, "generated ticket");
    Ok(ticket)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_engine::models::NUMBERS_PER_TICKET;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn ticket(seed: u64) -> Ticket {
        let mut rng = StdRng::seed_from_u64(seed);
        generate_ticket(&mut rng, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn ticket_has_fifteen_numbers_five_per_row() {
        let t = ticket(42);
        assert_eq!(t.numbers().count(), NUMBERS_PER_TICKET);
        for row in 0..ROWS {
            assert_eq!(t.row_numbers(row).len(), NUMBERS_PER_ROW);
        }
        t.validate().unwrap();
    }

    #[test]
    fn rows_ascend_left_to_right() {
        let t = ticket(5);
        for row in 0..ROWS {
            let values = t.row_numbers(row);
            assert!(values.windows(2).all(|w| w[0] < w[1]), "row {row}: {values:?}");
        }
    }

    #[test]
    fn columns_ascend_top_to_bottom() {
        let t = ticket(11);
        for col in 0..COLUMNS {
            let values: Vec<u8> = (0..ROWS).filter_map(|r| t.cell(r, col)).collect();
            assert!(values.windows(2).all(|w| w[0] < w[1]), "col {col}: {values:?}");
        }
    }

    #[test]
    fn same_seed_same_ticket() {
        assert_eq!(ticket(99), ticket(99));
        assert_ne!(ticket(99).grid, ticket(100).grid);
    }

    #[test]
    fn thousand_tickets_never_exhaust_a_column() {
        let mut rng = StdRng::seed_from_u64(2024);
        let cfg = EngineConfig::default().with_max_row_attempts(1);
        for _ in 0..1000 {
            let t = generate_ticket(&mut rng, &cfg).unwrap();
            t.validate().unwrap();
        }
    }

    #[test]
    fn empty_column_reports_exhaustion() {
        let mut rng = StdRng::seed_from_u64(1);
        let available: Vec<u8> = (11..=90).collect();
        let cols: BTreeSet<usize> = [0, 2, 4, 6, 8].into_iter().collect();
        assert_eq!(
            fill_row(&mut rng, &available, &cols),
            Err(EngineError::ColumnExhausted { column: 0 })
        );
    }

    #[test]
    fn chosen_columns_are_distinct() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..100 {
            let cols = choose_columns(&mut rng);
            assert_eq!(cols.len(), NUMBERS_PER_ROW);
            assert!(cols.iter().all(|&c| c < COLUMNS));
        }
    }

    proptest! {
        #[test]
        fn every_cell_sits_in_its_column_range(seed in any::<u64>()) {
            let t = ticket(seed);
            for row in 0..ROWS {
                for col in 0..COLUMNS {
                    if let Some(v) = t.cell(row, col) {
                        prop_assert!(column_range(col).contains(&v), "{v} in column {col}");
                    }
                }
            }
            prop_assert!(t.validate().is_ok());
        }
    }
}
