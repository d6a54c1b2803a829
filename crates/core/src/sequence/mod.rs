//! Document number allocation.
//!
//! Counters are read, advanced and written back inside one serialized unit
//! of work by the persistence layer; this module decides the numbers.

pub mod error;
pub mod service;
pub mod types;

pub use error::SequenceError;
pub use service::SequenceService;
pub use types::{Allocation, DocSequence};
