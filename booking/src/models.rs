use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reservable desk. `tag` is the human-facing label (unique per
/// facility); `id` and `tag` are immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Desk {
    pub id: i64,
    pub tag: String,
    pub desk_type: String,
    pub included_resource: String,
    pub available: bool,
}

/// Creation payload for a desk; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeskDraft {
    pub tag: String,
    pub desk_type: String,
    #[serde(default)]
    pub included_resource: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Partial update for a desk. Absent fields are left untouched; id and
/// tag cannot be patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeskPatch {
    pub desk_type: Option<String>,
    pub included_resource: Option<String>,
    pub available: Option<bool>,
}

/// A booked slot. Desk and actor references are nullable: deleting a desk
/// or actor nullifies them rather than dropping the row, so past history
/// survives (and drops out of joined listings).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub desk_id: Option<i64>,
    pub actor_id: Option<i64>,
    pub date: DateTime<Utc>,
}

/// Stored identity row used to render who holds a reservation. Not a
/// credential; roles never touch the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorProfile {
    pub id: i64,
    pub handle: String,
    #[serde(default)]
    pub display_name: String,
}

/// Authenticated caller as supplied by the boundary. The role list feeds
/// the grant evaluator verbatim.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: i64,
    pub roles: Vec<String>,
}

impl Actor {
    pub fn new(id: i64, roles: Vec<String>) -> Self {
        Self { id, roles }
    }
}
