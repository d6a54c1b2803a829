//! Bank statement reconciliation.
//!
//! Statements are parsed into lines, matched against journal entries on the
//! bank's GL account (reference token first, then amount and date), and
//! either approved, ignored, matched by hand or booked directly.

pub mod error;
pub mod matcher;
pub mod parser;
pub mod reference;
pub mod service;
pub mod types;


pub use error::ReconciliationError;
pub use parser::{ColumnMapping, StatementParser};
pub use reference::ReferenceToken;
pub use service::ReconciliationService;
pub use types::{
    Direction, MatchMethod, MatchSettings, MatchStatus, MatchSuggestion, ParsedStatement,
    ParsedStatementLine, ReconciliationSummary, StatementImport, StatementLine, SuggestRunSummary,
};
