//! Player walkthrough: generate a ticket, mark numbers as a caller draws
//! them, save and reload.
//!
//! Run with: `cargo run --example ticket`

use tambola_engine::{CallerEngine, EngineConfig, MemoryStore, PlayerSession};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut caller = CallerEngine::new(MemoryStore::new(), &EngineConfig::default().with_seed(1));
    let mut player = PlayerSession::new(MemoryStore::new(), &EngineConfig::default().with_seed(2));

    let ticket = player.generate_ticket().expect("fresh pool never runs dry").clone();
    println!("Ticket {}", ticket.id);
    print!("{ticket}");
    println!();

    while caller.can_draw() && player.clicked_count() < 15 {
        let n = caller.draw_next().expect("pool not empty").number;
        let Some(eval) = player.toggle_number(n) else { continue };
        for pattern in eval.newly_completed {
            println!(
                "  call #{:<2} ({n:>2}) → {pattern}  [{} marked]",
                caller.drawn().len(),
                eval.clicked_count
            );
        }
    }

    match player.save_ticket("") {
        Ok(_) => unreachable!("blank names are rejected"),
        Err(e) => println!("\nSave refused: {e}"),
    }
    let saved = player.save_ticket("Demo ticket").expect("ticket present").id.clone();
    player.generate_ticket().expect("fresh pool never runs dry");
    player.load_ticket(&saved).expect("just saved");
    println!("Reloaded \"{}\" with {} marks", player.ticket().map(|t| t.name.as_str()).unwrap_or(""), player.clicked_count());

    if let Some(payload) = player.qr_payload() {
        println!("QR payload: {}", payload.to_json().expect("serialisable"));
    }
}
