//! Postgres enum types and their domain counterparts.

use ledgerline_core::{accounts, cheque, reconciliation};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
pub enum AccountType {
    #[sea_orm(string_value = "asset")]
    Asset,
    #[sea_orm(string_value = "liability")]
    Liability,
    #[sea_orm(string_value = "equity")]
    Equity,
    #[sea_orm(string_value = "revenue")]
    Revenue,
    #[sea_orm(string_value = "expense")]
    Expense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "statement_class")]
pub enum StatementClass {
    #[sea_orm(string_value = "balance_sheet")]
    BalanceSheet,
    #[sea_orm(string_value = "income_statement")]
    IncomeStatement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "cash_flow_group")]
pub enum CashFlowGroup {
    #[sea_orm(string_value = "operating")]
    Operating,
    #[sea_orm(string_value = "investing")]
    Investing,
    #[sea_orm(string_value = "financing")]
    Financing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "statement_direction")]
pub enum StatementDirection {
    #[sea_orm(string_value = "debit")]
    Debit,
    #[sea_orm(string_value = "credit")]
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "match_status")]
pub enum MatchStatus {
    #[sea_orm(string_value = "unmatched")]
    Unmatched,
    #[sea_orm(string_value = "suggested")]
    Suggested,
    #[sea_orm(string_value = "reconciled")]
    Reconciled,
    #[sea_orm(string_value = "ignored")]
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "match_method")]
pub enum MatchMethod {
    #[sea_orm(string_value = "none")]
    None,
    #[sea_orm(string_value = "reference")]
    Reference,
    #[sea_orm(string_value = "amount_date")]
    AmountDate,
    #[sea_orm(string_value = "manual")]
    Manual,
    #[sea_orm(string_value = "auto_posted")]
    AutoPosted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "cheque_direction")]
pub enum ChequeDirection {
    #[sea_orm(string_value = "incoming")]
    Incoming,
    #[sea_orm(string_value = "outgoing")]
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "cheque_type")]
pub enum ChequeType {
    #[sea_orm(string_value = "normal")]
    Normal,
    #[sea_orm(string_value = "post_dated")]
    PostDated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "cheque_status")]
pub enum ChequeStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "printed")]
    Printed,
    #[sea_orm(string_value = "handed_over")]
    HandedOver,
    #[sea_orm(string_value = "deposited")]
    Deposited,
    #[sea_orm(string_value = "presented")]
    Presented,
    #[sea_orm(string_value = "cleared")]
    Cleared,
    #[sea_orm(string_value = "bounced")]
    Bounced,
    #[sea_orm(string_value = "voided")]
    Voided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "trade_document_kind")]
pub enum TradeDocumentKind {
    #[sea_orm(string_value = "sales")]
    Sales,
    #[sea_orm(string_value = "purchase")]
    Purchase,
}

/// Maps a database enum to its domain enum and back, variant for variant.
macro_rules! mirror_enum {
    ($db:ident <=> $module:ident :: $domain:ident { $($variant:ident),+ $(,)? }) => {
        impl From<$db> for $module::$domain {
            fn from(value: $db) -> Self {
                match value {
                    $($db::$variant => Self::$variant,)+
                }
            }
        }

        impl From<$module::$domain> for $db {
            fn from(value: $module::$domain) -> Self {
                match value {
                    $($module::$domain::$variant => Self::$variant,)+
                }
            }
        }
    };
}

mirror_enum!(AccountType <=> accounts::AccountType { Asset, Liability, Equity, Revenue, Expense });
mirror_enum!(StatementClass <=> accounts::StatementClass { BalanceSheet, IncomeStatement });
mirror_enum!(CashFlowGroup <=> accounts::CashFlowGroup { Operating, Investing, Financing });
mirror_enum!(StatementDirection <=> reconciliation::Direction { Debit, Credit });
mirror_enum!(MatchStatus <=> reconciliation::MatchStatus { Unmatched, Suggested, Reconciled, Ignored });
mirror_enum!(MatchMethod <=> reconciliation::MatchMethod { None, Reference, AmountDate, Manual, AutoPosted });
mirror_enum!(ChequeDirection <=> cheque::ChequeDirection { Incoming, Outgoing });
mirror_enum!(ChequeType <=> cheque::ChequeType { Normal, PostDated });
mirror_enum!(ChequeStatus <=> cheque::ChequeStatus {
    Draft, Printed, HandedOver, Deposited, Presented, Cleared, Bounced, Voided,
});
