//! Domain models for the intake service.

mod page;
mod patient;
mod triage;
mod user;

pub use page::*;
pub use patient::*;
pub use triage::*;
pub use user::*;
