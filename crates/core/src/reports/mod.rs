//! Financial reports folded from the journal.
//!
//! - Ledger card with opening and running balances
//! - Profit and loss
//! - Indirect-method cash flow driven by account tags
//! - Trial balance

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::{CounterpartyResolver, ReportService};
pub use types::{
    CashFlowLine, CashFlowStatement, CounterpartyIndex, LedgerCard, LedgerCardRow, PnlRow, ProfitAndLoss,
    TrialBalance, TrialBalanceRow, UNRESOLVED_COUNTERPARTY, WorkingCapitalLine,
};
