//! Caller walkthrough: draw a full game and print patterns as they land.
//!
//! Run with: `cargo run --example caller`
//!
//! Set `RUST_LOG=tambola_engine=debug` to see every draw logged.

use tambola_engine::{CallerEngine, CallerPattern, EngineConfig, MemoryStore};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EngineConfig::default().with_seed(2024);
    let mut caller = CallerEngine::new(MemoryStore::new(), &config);
    println!("Session {}", caller.session_id());

    // A human settles the first line early; auto detection leaves it alone.
    caller.set_declared_winner(CallerPattern::FirstLine, "4, 11, 27, oops, 30");

    while caller.can_draw() {
        let outcome = caller.draw_next().expect("pool not empty");
        for pattern in &outcome.newly_won {
            println!(
                "  draw #{:<2} ({:>2}) → {pattern}",
                caller.drawn().len(),
                outcome.number
            );
        }
    }

    println!();
    println!("Board (* = winning, + = drawn):");
    for row in caller.board().chunks(10) {
        let cells: Vec<String> = row
            .iter()
            .map(|c| {
                let mark = if c.winning { '*' } else if c.drawn { '+' } else { ' ' };
                format!("{:>2}{mark}", c.number)
            })
            .collect();
        println!("  {}", cells.join(" "));
    }

    println!();
    println!("QR payload: {}", caller.qr_payload().to_json().expect("serialisable"));
}
