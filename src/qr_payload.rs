//! Point-in-time JSON snapshots meant to be rendered as QR codes for a
//! companion viewer. Export only: nothing here is ever read back into a
//! session.

use serde::{Deserialize, Serialize};

use crate::game_engine::{
    caller::Winners,
    error::EngineResult,
    models::{Grid, Ticket},
};

/// `{ "uuid", "generatedNumbers", "winners" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerQrPayload {
    pub uuid: String,
    pub generated_numbers: Vec<u8>,
    pub winners: Winners,
}

/// `{ "id", "name", "ticket" }` where `ticket` is the 3×9 grid with `null`
/// for empty cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketQrPayload {
    pub id: String,
    pub name: String,
    pub ticket: Grid,
}

impl From<&Ticket> for TicketQrPayload {
    fn from(t: &Ticket) -> Self {
        TicketQrPayload {
            id: t.id.clone(),
            name: t.name.clone(),
            ticket: t.grid,
        }
    }
}

impl CallerQrPayload {
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl TicketQrPayload {
    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
