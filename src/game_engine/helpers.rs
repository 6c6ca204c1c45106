//! Small shared pieces used by both engines: column ranges, id minting and
//! free-text number parsing.

use std::ops::RangeInclusive;

use rand::Rng;
use tracing::debug;

use crate::game_engine::{
    error::{EngineError, EngineResult},
    models::{COLUMNS, MAX_NUMBER},
};

/// Legal values for ticket column `col`: `col*10+1 ..= min(col*10+10, 90)`.
///
/// Column 0 is 1–10 and column 8 is 81–90, so the nine columns tile 1–90
/// without gaps. Out-of-range columns yield an empty range.
pub fn column_range(col: usize) -> RangeInclusive<u8> {
    if col >= COLUMNS {
        return RangeInclusive::new(1, 0);
    }
    let min = (col * 10 + 1) as u8;
    let max = ((col * 10 + 10) as u8).min(MAX_NUMBER);
    min..=max
}

/// Mint a v4 UUID string from `rng`, so seeded sessions get stable ids.
pub fn new_id<R: Rng>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid().to_string()
}

/// Parse one comma-separated token of a manual winner entry.
pub fn parse_number_token(token: &str) -> EngineResult<u8> {
    let token = token.trim();
    token
        .parse::<u8>()
        .map_err(|_| EngineError::InvalidManualInput(token.to_string()))
}

/// Parse `"3, 17, abc, 42"` into `[3, 17, 42]`. Unparsable tokens are dropped.
pub fn parse_winner_input(text: &str) -> Vec<u8> {
    text.split(',')
        .filter_map(|token| match parse_number_token(token) {
            Ok(n) => Some(n),
            Err(e) => {
                debug!(error = %e, "dropping winner token");
                None
            }
        })
        .collect()
}
