//! Which worker version is active and which is waiting

pub mod manager;
pub mod state;

pub use manager::{Placement, RegistrationManager};
pub use state::{Registration, VersionRecord};
