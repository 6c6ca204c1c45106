//! # tambola_engine
//!
//! Game engine for Tambola (Housie / Bingo-90).
//!
//! Two independent sides share the same shape: something random is generated
//! and validated, then a pure evaluator derives win status from it plus a set
//! of marked numbers.
//!
//! - **Caller** — [`CallerEngine`] draws unique numbers 1–90 and records
//!   pattern winners, either detected automatically or declared by hand.
//! - **Player** — [`PlayerSession`] holds a 3×9 ticket with 15 numbers,
//!   tracks which ones are marked, and reports each pattern completion once
//!   per false→true transition.
//!
//! ## Key features
//!
//! - **Deterministic**: seed the RNG through [`EngineConfig::with_seed`] to
//!   reproduce draw order, tickets and ids exactly.
//! - **Injected persistence**: sessions write through a [`SessionStore`] after
//!   every change and fall back to a fresh session when stored data is
//!   missing or corrupt.
//! - **QR export**: [`qr_payload`] snapshots a session as JSON for a
//!   companion viewer.
//!
//! ## Quick start
//!
//! ```rust
//! use tambola_engine::{CallerEngine, EngineConfig, MemoryStore, PlayerSession};
//!
//! let config = EngineConfig::default().with_seed(42);
//!
//! let mut caller = CallerEngine::new(MemoryStore::new(), &config);
//! let outcome = caller.draw_next().unwrap();
//! println!("Called {}", outcome.number);
//!
//! let mut player = PlayerSession::new(MemoryStore::new(), &config);
//! let ticket = player.generate_ticket().unwrap().clone();
//! println!("{ticket}");
//!
//! if let Some(eval) = player.toggle_number(outcome.number) {
//!     for pattern in eval.newly_completed {
//!         println!("{pattern} completed!");
//!     }
//! }
//! ```

pub mod game_engine;
pub mod qr_payload;

// Convenience re-exports so callers can use `tambola_engine::CallerEngine`
// directly without reaching into `game_engine::`.
pub use game_engine::{
    evaluate_auto_patterns, evaluate_ticket, generate_ticket, BoardCell, CallerEngine,
    CallerPattern, DrawOutcome, EngineConfig, EngineError, EngineResult, FileStore, MarkSet,
    MemoryStore, NumberPool, PlayerSession, SavedTicket, SessionStore, Ticket, TicketEvaluation,
    TicketPattern, WinStatus,
};
pub use qr_payload::{CallerQrPayload, TicketQrPayload};
