//! Ports module (Hexagonal Architecture)
//!
//! Interfaces to the hosted backend, local draft storage and time.

pub mod outbound;
pub mod records;

pub use outbound::*;
pub use records::*;
