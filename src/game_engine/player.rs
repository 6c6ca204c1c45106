//! The player side: one current ticket, its marks, and a list of saved
//! tickets. Every mutation re-evaluates the ticket and persists.

use std::collections::BTreeSet;

use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::game_engine::{
    config::EngineConfig,
    error::{EngineError, EngineResult},
    evaluator::{evaluate_ticket, TicketEvaluation},
    generator::generate_ticket,
    models::{MarkSet, SavedTicket, Ticket, TicketPattern, WinStatus},
    store::{keys, read_json, write_json_quietly, SessionStore},
};
use crate::qr_payload::TicketQrPayload;

pub struct PlayerSession<S: SessionStore> {
    ticket: Option<Ticket>,
    marks: MarkSet,
    /// Status after the last evaluation; the baseline for edge detection.
    status: WinStatus<TicketPattern>,
    saved: Vec<SavedTicket>,
    config: EngineConfig,
    rng: StdRng,
    store: S,
}

impl<S: SessionStore> PlayerSession<S> {
    /// A session with no ticket and nothing saved.
    pub fn new(store: S, config: &EngineConfig) -> Self {
        PlayerSession {
            ticket: None,
            marks: MarkSet::new(),
            status: WinStatus::default(),
            saved: Vec::new(),
            config: config.clone(),
            rng: config.rng(),
            store,
        }
    }

    /// Pick up the current ticket, its marks and the saved list from
    /// `store`. Anything unreadable is dropped with a warning.
    pub fn restore(store: S, config: &EngineConfig) -> Self {
        let mut session = Self::new(store, config);

        match read_json::<Ticket>(&session.store, keys::CURRENT_TICKET) {
            Ok(Some(ticket)) => match ticket.validate() {
                Ok(()) => session.ticket = Some(ticket),
                Err(e) => warn!(error = %e, "stored ticket invalid, ignoring"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "stored ticket unreadable, ignoring"),
        }

        match read_json::<MarkSet>(&session.store, keys::CLICKED_NUMBERS) {
            Ok(marks) => session.marks = marks.unwrap_or_default(),
            Err(e) => warn!(error = %e, "stored marks unreadable, clearing"),
        }

        match read_json::<Vec<SavedTicket>>(&session.store, keys::SAVED_TICKETS) {
            Ok(saved) => {
                session.saved = saved
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|s| {
                        let ok = as_ticket(s).validate().is_ok();
                        if !ok {
                            warn!(ticket_id = %s.id, "dropping invalid saved ticket");
                        }
                        ok
                    })
                    .collect();
            }
            Err(e) => warn!(error = %e, "saved tickets unreadable, starting empty"),
        }

        // Baseline only: a restore reports no fresh completions.
        session.evaluate();
        info!(
            has_ticket = session.ticket.is_some(),
            saved = session.saved.len(),
            "restored player session"
        );
        session
    }

    /// Replace the current ticket with a freshly generated one. Marks are
    /// cleared and every pattern goes back to not-won.
    pub fn generate_ticket(&mut self) -> EngineResult<&Ticket> {
        let ticket = generate_ticket(&mut self.rng, &self.config)?;
        self.marks = MarkSet::new();
        self.status = WinStatus::default();
        let ticket = self.ticket.insert(ticket);
        persist_current(&mut self.store, ticket, &self.marks);
        Ok(&*ticket)
    }

    /// Toggle the mark on `number`. `None` (and no change) when there is no
    /// ticket or the number is not on it.
    pub fn toggle_number(&mut self, number: u8) -> Option<TicketEvaluation> {
        if !self.ticket.as_ref()?.contains(number) {
            return None;
        }
        let marked = self.marks.toggle(number);
        debug!(number, marked, "toggled number");
        let eval = self.evaluate();
        for pattern in &eval.newly_completed {
            info!(%pattern, "ticket pattern completed");
        }
        self.persist_ticket();
        Some(eval)
    }

    /// Toggle whatever sits at `(row, col)`. Empty or out-of-range cells are
    /// a no-op.
    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Option<TicketEvaluation> {
        let number = self.ticket.as_ref()?.cell(row, col)?;
        self.toggle_number(number)
    }

    fn evaluate(&mut self) -> TicketEvaluation {
        let eval = match &self.ticket {
            Some(ticket) => evaluate_ticket(ticket, &self.marks, &self.status),
            None => TicketEvaluation {
                status: WinStatus::default(),
                newly_completed: BTreeSet::new(),
                clicked_count: 0,
            },
        };
        self.status = eval.status.clone();
        eval
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        self.ticket.as_ref()
    }

    pub fn marks(&self) -> &MarkSet {
        &self.marks
    }

    pub fn status(&self) -> &WinStatus<TicketPattern> {
        &self.status
    }

    pub fn clicked_count(&self) -> usize {
        self.ticket
            .as_ref()
            .map_or(0, |t| t.numbers().filter(|&n| self.marks.is_marked(n)).count())
    }

    /// Rename the current ticket. The name is trimmed; without a ticket this
    /// does nothing.
    pub fn set_name(&mut self, name: &str) {
        let Some(ticket) = self.ticket.as_mut() else {
            return;
        };
        ticket.name = name.trim().to_string();
        debug!(ticket_id = %ticket.id, name = %ticket.name, "renamed ticket");
        self.persist_ticket();
    }

    /// Snapshot the current ticket under `name`. Saving an id that is
    /// already in the list replaces that entry.
    pub fn save_ticket(&mut self, name: &str) -> EngineResult<&SavedTicket> {
        let ticket = self.ticket.as_mut().ok_or(EngineError::SaveWithoutTicket)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::SaveWithoutName);
        }
        ticket.name = name.to_string();

        let snapshot = SavedTicket {
            id: ticket.id.clone(),
            name: ticket.name.clone(),
            ticket: ticket.grid,
            clicked_numbers: self.marks.clone(),
        };
        let idx = match self.saved.iter().position(|s| s.id == snapshot.id) {
            Some(idx) => {
                self.saved[idx] = snapshot;
                idx
            }
            None => {
                self.saved.push(snapshot);
                self.saved.len() - 1
            }
        };
        info!(ticket_id = %self.saved[idx].id, name, "saved ticket");
        self.persist_ticket();
        self.persist_saved();
        Ok(&self.saved[idx])
    }

    /// Make a saved ticket current, marks included. The status is
    /// re-baselined, so loading never reports completions.
    pub fn load_ticket(&mut self, id: &str) -> EngineResult<&Ticket> {
        let saved = self
            .saved
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| EngineError::TicketNotFound(id.to_string()))?;
        let ticket = as_ticket(saved);
        self.marks = saved.clicked_numbers.clone();
        self.status = evaluate_ticket(&ticket, &self.marks, &WinStatus::default()).status;
        info!(ticket_id = %ticket.id, name = %ticket.name, "loaded ticket");
        let ticket = self.ticket.insert(ticket);
        persist_current(&mut self.store, ticket, &self.marks);
        Ok(&*ticket)
    }

    pub fn delete_ticket(&mut self, id: &str) -> EngineResult<()> {
        let before = self.saved.len();
        self.saved.retain(|s| s.id != id);
        if self.saved.len() == before {
            return Err(EngineError::TicketNotFound(id.to_string()));
        }
        info!(ticket_id = id, "deleted saved ticket");
        self.persist_saved();
        Ok(())
    }

    pub fn saved_tickets(&self) -> &[SavedTicket] {
        &self.saved
    }

    pub fn qr_payload(&self) -> Option<TicketQrPayload> {
        self.ticket.as_ref().map(TicketQrPayload::from)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn persist_ticket(&mut self) {
        if let Some(ticket) = &self.ticket {
            persist_current(&mut self.store, ticket, &self.marks);
        }
    }

    fn persist_saved(&mut self) {
        write_json_quietly(&mut self.store, keys::SAVED_TICKETS, &self.saved);
    }
}

fn persist_current<S: SessionStore>(store: &mut S, ticket: &Ticket, marks: &MarkSet) {
    write_json_quietly(store, keys::CURRENT_TICKET, ticket);
    write_json_quietly(store, keys::CLICKED_NUMBERS, marks);
}

fn as_ticket(saved: &SavedTicket) -> Ticket {
    Ticket {
        id: saved.id.clone(),
        name: saved.name.clone(),
        grid: saved.ticket,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game_engine::store::MemoryStore;

    fn session(seed: u64) -> PlayerSession<MemoryStore> {
        let mut s = PlayerSession::new(MemoryStore::new(), &EngineConfig::default().with_seed(seed));
        s.generate_ticket().unwrap();
        s
    }

    #[test]
    fn toggle_without_ticket_is_noop() {
        let mut s = PlayerSession::new(MemoryStore::new(), &EngineConfig::default());
        assert_eq!(s.toggle_number(5), None);
        assert_eq!(s.toggle_cell(0, 0), None);
        assert_eq!(s.clicked_count(), 0);
    }

    #[test]
    fn toggle_off_ticket_number_is_noop() {
        let mut s = session(1);
        let missing = (1..=90).find(|&n| !s.ticket().unwrap().contains(n)).unwrap();
        assert_eq!(s.toggle_number(missing), None);
        assert!(!s.marks().is_marked(missing));
    }

    #[test]
    fn toggle_empty_cell_is_noop() {
        let mut s = session(2);
        let (row, col) = (0..9)
            .map(|c| (0, c))
            .find(|&(r, c)| s.ticket().unwrap().cell(r, c).is_none())
            .unwrap();
        assert_eq!(s.toggle_cell(row, col), None);
        assert_eq!(s.toggle_cell(7, 42), None);
    }

    #[test]
    fn completing_a_row_fires_once() {
        let mut s = session(3);
        let top = s.ticket().unwrap().row_numbers(0);
        let mut fired = Vec::new();
        for &n in &top {
            let eval = s.toggle_number(n).unwrap();
            fired.extend(eval.newly_completed);
        }
        assert_eq!(fired, vec![TicketPattern::FirstFive, TicketPattern::TopLine]);
        assert!(s.status().is_won(TicketPattern::TopLine));

        // Marking elsewhere does not fire the top line again.
        let other = s.ticket().unwrap().row_numbers(1)[0];
        let eval = s.toggle_number(other).unwrap();
        assert!(eval.newly_completed.is_empty());
    }

    #[test]
    fn undo_then_redo_rearms_the_event() {
        let mut s = session(4);
        let top = s.ticket().unwrap().row_numbers(0);
        for &n in &top {
            s.toggle_number(n);
        }
        let off = s.toggle_number(top[2]).unwrap();
        assert!(!off.status.is_won(TicketPattern::TopLine));
        assert_eq!(off.clicked_count, 4);

        let on = s.toggle_number(top[2]).unwrap();
        assert_eq!(on.clicked_count, 5);
        assert!(on.newly_completed.contains(&TicketPattern::TopLine));
        assert!(on.newly_completed.contains(&TicketPattern::FirstFive));
    }

    #[test]
    fn full_house_after_all_fifteen() {
        let mut s = session(5);
        let all: Vec<u8> = s.ticket().unwrap().numbers().collect();
        let mut last = None;
        for n in all {
            last = s.toggle_number(n);
        }
        let last = last.unwrap();
        assert!(last.newly_completed.contains(&TicketPattern::FullHouse));
        assert_eq!(s.status().won_patterns().len(), 5);
        assert_eq!(s.clicked_count(), 15);
    }

    #[test]
    fn new_ticket_clears_marks_and_status() {
        let mut s = session(6);
        for n in s.ticket().unwrap().row_numbers(2) {
            s.toggle_number(n);
        }
        let old_id = s.ticket().unwrap().id.clone();
        s.generate_ticket().unwrap();
        assert_ne!(s.ticket().unwrap().id, old_id);
        assert_eq!(s.clicked_count(), 0);
        assert!(s.status().won_patterns().is_empty());
    }

    #[test]
    fn set_name_trims_and_persists() {
        let mut none = PlayerSession::new(MemoryStore::new(), &EngineConfig::default());
        none.set_name("ignored");
        assert!(none.ticket().is_none());

        let mut s = session(9);
        s.set_name("  Front row  ");
        assert_eq!(s.ticket().unwrap().name, "Front row");
        assert_eq!(s.qr_payload().unwrap().name, "Front row");

        let stored: Ticket = read_json(s.store(), keys::CURRENT_TICKET).unwrap().unwrap();
        assert_eq!(stored.name, "Front row");
        assert!(s.saved_tickets().is_empty());
    }

    #[test]
    fn save_requires_ticket_then_name() {
        let mut s = PlayerSession::new(MemoryStore::new(), &EngineConfig::default());
        assert_eq!(s.save_ticket("mine").err(), Some(EngineError::SaveWithoutTicket));
        s.generate_ticket().unwrap();
        assert_eq!(s.save_ticket("   ").err(), Some(EngineError::SaveWithoutName));
        assert!(s.saved_tickets().is_empty());
    }

    #[test]
    fn save_load_delete_cycle() {
        let mut s = session(7);
        let first = s.ticket().unwrap().clone();
        for n in first.row_numbers(0) {
            s.toggle_number(n);
        }
        s.save_ticket("Aunt's ticket").unwrap();
        s.save_ticket("Aunt's ticket").unwrap();
        assert_eq!(s.saved_tickets().len(), 1);

        s.generate_ticket().unwrap();
        let loaded = s.load_ticket(&first.id).unwrap();
        assert_eq!(loaded.grid, first.grid);
        assert_eq!(loaded.name, "Aunt's ticket");
        assert_eq!(s.clicked_count(), 5);
        assert!(s.status().is_won(TicketPattern::TopLine));

        // Already complete on load: touching another number does not re-fire.
        let n = first.row_numbers(1)[0];
        assert!(s.toggle_number(n).unwrap().newly_completed.is_empty());

        s.delete_ticket(&first.id).unwrap();
        assert!(s.saved_tickets().is_empty());
        assert_eq!(
            s.delete_ticket(&first.id),
            Err(EngineError::TicketNotFound(first.id.clone()))
        );
        assert!(matches!(s.load_ticket("nope"), Err(EngineError::TicketNotFound(_))));
    }

    #[test]
    fn restore_brings_back_ticket_marks_and_saved_list() {
        let mut s = session(8);
        let numbers = s.ticket().unwrap().row_numbers(1);
        for &n in &numbers {
            s.toggle_number(n);
        }
        s.save_ticket("kept").unwrap();
        let id = s.ticket().unwrap().id.clone();

        let back = PlayerSession::restore(s.into_store(), &EngineConfig::default());
        assert_eq!(back.ticket().unwrap().id, id);
        assert_eq!(back.clicked_count(), 5);
        assert!(back.status().is_won(TicketPattern::MiddleLine));
        assert_eq!(back.saved_tickets().len(), 1);
    }

    #[test]
    fn corrupt_saved_list_restores_empty() {
        let mut store = MemoryStore::new();
        store.set(keys::SAVED_TICKETS, "[{\"id\": 3}]").unwrap();
        store.set(keys::CLICKED_NUMBERS, "nope").unwrap();
        let s = PlayerSession::restore(store, &EngineConfig::default());
        assert!(s.saved_tickets().is_empty());
        assert!(s.ticket().is_none());
        assert_eq!(s.marks(), &MarkSet::new());
    }

    #[test]
    fn invalid_stored_ticket_is_dropped() {
        let mut store = MemoryStore::new();
        let bad = Ticket { id: "x".into(), name: String::new(), grid: [[Some(1); 9]; 3] };
        crate::game_engine::store::write_json(&mut store, keys::CURRENT_TICKET, &bad).unwrap();
        let s = PlayerSession::restore(store, &EngineConfig::default());
        assert!(s.ticket().is_none());
    }
}
