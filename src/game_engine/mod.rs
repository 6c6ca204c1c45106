//! Core game engine — number drawing, ticket generation and win evaluation.
//!
//! ## Module overview
//!
//! | Module      | Purpose |
//! |-------------|---------|
//! | `models`    | Shared types: pattern keys, tickets, marks, win status |
//! | `pool`      | 1–90 number pool with uniform draw-without-replacement |
//! | `generator` | 3×9 ticket generator with per-column ranges |
//! | `evaluator` | Pure win evaluation for tickets and for the caller board |
//! | `caller`    | Caller session: draws, auto detection, declared winners |
//! | `player`    | Player session: marks, edge-triggered completions, saved tickets |
//! | `store`     | Persistence port plus in-memory and file-backed stores |
//! | `helpers`   | Column ranges, id minting, free-text number parsing |
//! | `config`    | Seed and retry settings |
//! | `error`     | `EngineError` taxonomy |

pub mod caller;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod helpers;
pub mod models;
pub mod player;
pub mod pool;
pub mod store;

pub use caller::{CallerEngine, DrawOutcome, Winners};
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use evaluator::{evaluate_auto_patterns, evaluate_ticket, TicketEvaluation};
pub use generator::generate_ticket;
pub use models::{
    BoardCell, CallerPattern, Grid, MarkSet, Pattern, SavedTicket, Ticket, TicketPattern,
    WinStatus,
};
pub use player::PlayerSession;
pub use pool::NumberPool;
pub use store::{FileStore, MemoryStore, SessionStore};
