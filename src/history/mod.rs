mod manager;
mod snapshot;

pub use manager::{History, RestoreDirection, RestoreGuard, RestoreTicket};
pub use snapshot::Snapshot;
