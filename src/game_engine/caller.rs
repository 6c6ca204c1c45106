//! The caller side: draws numbers 1–90 and tracks pattern winners.
//!
//! Winners live in a single map. Auto detection only fills keys that are
//! absent, so anything a human declared (or a pattern already detected) is
//! locked in until it is explicitly replaced or cleared.

use std::collections::{BTreeMap, BTreeSet};

use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::game_engine::{
    config::EngineConfig,
    error::{EngineError, EngineResult},
    evaluator::evaluate_auto_patterns,
    helpers::{new_id, parse_winner_input},
    models::{BoardCell, CallerPattern, WinStatus, MAX_NUMBER},
    pool::NumberPool,
    store::{keys, read_json, write_json_quietly, SessionStore},
};
use crate::qr_payload::CallerQrPayload;

pub type Winners = BTreeMap<CallerPattern, Vec<u8>>;

/// What one draw produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawOutcome {
    pub number: u8,
    /// Patterns auto detection recorded as a result of this draw.
    pub newly_won: BTreeSet<CallerPattern>,
}

pub struct CallerEngine<S: SessionStore> {
    session_id: String,
    pool: NumberPool,
    winners: Winners,
    rng: StdRng,
    store: S,
}

impl<S: SessionStore> CallerEngine<S> {
    /// Start a fresh session and persist it.
    pub fn new(store: S, config: &EngineConfig) -> Self {
        let mut rng = config.rng();
        let session_id = new_id(&mut rng);
        let mut engine = CallerEngine {
            session_id,
            pool: NumberPool::new(),
            winners: Winners::new(),
            rng,
            store,
        };
        info!(session_id = %engine.session_id, "created caller session");
        engine.persist();
        engine
    }

    /// Resume the session held in `store`, or start fresh when there is none
    /// or it cannot be read.
    pub fn restore(store: S, config: &EngineConfig) -> Self {
        match load_session(&store) {
            Ok(Some((session_id, drawn, winners))) => {
                let mut engine = CallerEngine {
                    session_id,
                    pool: NumberPool::from_drawn(&drawn),
                    winners,
                    rng: config.rng(),
                    store,
                };
                info!(
                    session_id = %engine.session_id,
                    drawn = engine.pool.drawn_so_far().len(),
                    "restored caller session"
                );
                engine.refresh_winners();
                engine
            }
            Ok(None) => Self::new(store, config),
            Err(e) => {
                warn!(error = %e, "stored caller session unusable, starting fresh");
                Self::new(store, config)
            }
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Draw the next number and run auto detection.
    ///
    /// Fails with `EmptyPool` once all 90 numbers are out; the session is
    /// left untouched in that case.
    pub fn draw_next(&mut self) -> EngineResult<DrawOutcome> {
        let number = self.pool.draw(&mut self.rng)?;
        debug!(number, drawn = self.pool.drawn_so_far().len(), "drew number");
        let newly_won = self.detect_winners();
        self.persist();
        Ok(DrawOutcome { number, newly_won })
    }

    /// Whether the draw action should be enabled.
    pub fn can_draw(&self) -> bool {
        !self.pool.is_empty()
    }

    /// Throw everything away and start a new session id.
    pub fn reset(&mut self) {
        self.session_id = new_id(&mut self.rng);
        self.pool = NumberPool::new();
        self.winners.clear();
        info!(session_id = %self.session_id, "reset caller session");
        self.persist();
    }

    /// Record a human-declared winner from free text such as `"3, 17, 42"`.
    /// Returns the numbers that were kept.
    pub fn set_declared_winner(&mut self, pattern: CallerPattern, text: &str) -> Vec<u8> {
        let numbers = parse_winner_input(text);
        self.declare_winner(pattern, numbers.clone());
        numbers
    }

    /// Replace whatever is recorded for `pattern`. An empty list still counts
    /// as a declaration and blocks auto detection.
    pub fn declare_winner(&mut self, pattern: CallerPattern, numbers: Vec<u8>) {
        debug!(%pattern, ?numbers, "declared winner");
        self.winners.insert(pattern, numbers);
        self.persist();
    }

    /// Forget the recorded winner for `pattern` so auto detection can fill
    /// it again.
    pub fn clear_declared_winner(&mut self, pattern: CallerPattern) {
        if self.winners.remove(&pattern).is_some() {
            self.persist();
        }
    }

    /// Re-run auto detection over the current draw. Idempotent.
    pub fn refresh_winners(&mut self) -> BTreeSet<CallerPattern> {
        let newly_won = self.detect_winners();
        if !newly_won.is_empty() {
            self.persist();
        }
        newly_won
    }

    fn detect_winners(&mut self) -> BTreeSet<CallerPattern> {
        let before = self.status();
        for (pattern, found) in evaluate_auto_patterns(self.pool.drawn_so_far()) {
            if let Some(numbers) = found {
                self.winners.entry(pattern).or_insert(numbers);
            }
        }
        let newly_won = self.status().newly_completed(&before);
        for pattern in &newly_won {
            info!(%pattern, "pattern completed");
        }
        newly_won
    }

    pub fn winners(&self) -> &Winners {
        &self.winners
    }

    /// A pattern counts as won once anything is recorded for it.
    pub fn status(&self) -> WinStatus<CallerPattern> {
        WinStatus::from_fn(|p| self.winners.contains_key(&p))
    }

    pub fn drawn(&self) -> &[u8] {
        self.pool.drawn_so_far()
    }

    pub fn remaining(&self) -> &[u8] {
        self.pool.remaining()
    }

    pub fn last_drawn(&self) -> Option<u8> {
        self.pool.last_drawn()
    }

    /// Render model for the 1–90 board.
    pub fn board(&self) -> Vec<BoardCell> {
        (1..=MAX_NUMBER)
            .map(|number| BoardCell {
                number,
                drawn: self.pool.is_drawn(number),
                winning: self.winners.values().any(|set| set.contains(&number)),
            })
            .collect()
    }

    pub fn qr_payload(&self) -> CallerQrPayload {
        CallerQrPayload {
            uuid: self.session_id.clone(),
            generated_numbers: self.pool.drawn_so_far().to_vec(),
            winners: self.winners.clone(),
        }
    }

    /// [`Self::qr_payload`] serialized to JSON.
    pub fn to_qr_json(&self) -> EngineResult<String> {
        self.qr_payload().to_json()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn persist(&mut self) {
        write_json_quietly(&mut self.store, keys::SESSION_ID, &self.session_id);
        write_json_quietly(&mut self.store, keys::DRAWN_NUMBERS, self.pool.drawn_so_far());
        write_json_quietly(&mut self.store, keys::WINNERS, &self.winners);
    }
}

fn load_session<S: SessionStore>(store: &S) -> EngineResult<Option<(String, Vec<u8>, Winners)>> {
    let Some(session_id): Option<String> = read_json(store, keys::SESSION_ID)? else {
        return Ok(None);
    };
    let drawn: Vec<u8> = read_json(store, keys::DRAWN_NUMBERS)?.unwrap_or_default();
    if let Some(&n) = drawn.iter().find(|n| !(1..=MAX_NUMBER).contains(*n)) {
        return Err(EngineError::CorruptPersistedState(format!(
            "drawn number {n} outside 1..={MAX_NUMBER}"
        )));
    }
    let winners: Winners = read_json(store, keys::WINNERS)?.unwrap_or_default();
    Ok(Some((session_id, drawn, winners)))
}
