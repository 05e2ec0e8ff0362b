//! Desk reservation core: the desk registry, the reservation ledger, and
//! the policy services that mediate both behind permission grants.
//!
//! Everything here is synchronous; async callers (the HTTP surface, the
//! retention sweeper) wrap calls in `spawn_blocking`.

pub mod clock;
pub mod desks;
pub mod error;
pub mod models;
pub mod reservations;
pub mod store;
pub mod sweeper;

pub use desks::DeskService;
pub use error::{CoreError, CoreResult, ErrorKind};
pub use models::{Actor, ActorProfile, Desk, DeskDraft, DeskPatch, Reservation};
pub use reservations::{ReservationService, RETENTION_DAYS};
pub use store::Store;

/// Action prefix carried by administrative grants.
pub const ADMIN_ACTION: &str = "admin/";
/// Grant resource scoping desk administration.
pub const DESK_RESOURCE: &str = "desk";
/// Grant resource scoping reservation administration.
pub const RESERVATION_RESOURCE: &str = "desk_reservation";
