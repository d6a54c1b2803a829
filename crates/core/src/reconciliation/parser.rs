//! Bank statement parsing.
//!
//! Accepts delimited text with a header row somewhere near the top. Columns
//! are located by case-insensitive substring match, dates are tried against
//! several formats, and amounts tolerate thousands separators, decimal
//! commas, currency symbols and accounting-style negatives.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use ledgerline_shared::types::{BankAccountId, StatementImportId, StatementLineId, TenantId};
use rust_decimal::Decimal;

use super::error::ReconciliationError;
use super::reference::ReferenceToken;
use super::types::{
    Direction, MatchMethod, MatchStatus, ParsedStatement, ParsedStatementLine, StatementLine,
};

/// Rows searched for the header before giving up.
const HEADER_SEARCH_ROWS: usize = 20;

const DATE_FORMATS: [&str; 12] = [
    "%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%y",
    "%d-%b-%Y", "%d %b %Y", "%d-%b-%y", "%d %B %Y", "%b %d, %Y",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Column positions found in the header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Transaction date column.
    pub date_column: Option<usize>,
    /// Narration-like columns, joined in order.
    pub narration_columns: Vec<usize>,
    /// Money-out column.
    pub debit_column: Option<usize>,
    /// Money-in column.
    pub credit_column: Option<usize>,
    /// Signed amount column, used when debit/credit are absent.
    pub amount_column: Option<usize>,
    /// Running balance column.
    pub balance_column: Option<usize>,
}

impl ColumnMapping {
    /// Detects columns from a candidate header record.
    #[must_use]
    pub fn detect(headers: &StringRecord) -> Self {
        let mut mapping = Self::default();

        for (idx, header) in headers.iter().enumerate() {
            let h = header.trim().to_lowercase();
            if h.is_empty() {
                continue;
            }

            if h.contains("balance") {
                mapping.balance_column.get_or_insert(idx);
            } else if h.contains("date") {
                mapping.date_column.get_or_insert(idx);
            } else if h.contains("debit") || h.contains("withdrawal") || h.contains("money out") || h.contains("paid out") {
                mapping.debit_column.get_or_insert(idx);
            } else if h.contains("credit") || h.contains("deposit") || h.contains("money in") || h.contains("paid in") {
                mapping.credit_column.get_or_insert(idx);
            } else if h.contains("amount") {
                mapping.amount_column.get_or_insert(idx);
            } else if ["narration", "description", "details", "particulars", "memo", "remarks", "reference"]
                .iter()
                .any(|k| h.contains(k))
            {
                mapping.narration_columns.push(idx);
            }
        }

        mapping
    }

    /// A header is usable with a date column and at least one money column.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.date_column.is_some()
            && (self.debit_column.is_some() || self.credit_column.is_some() || self.amount_column.is_some())
    }

    fn uses_split_columns(&self) -> bool {
        self.debit_column.is_some() || self.credit_column.is_some()
    }
}

/// Outcome of reading one money cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmountCell {
    Blank,
    Value(Decimal),
    Invalid,
}

enum RowOutcome {
    Line(ParsedStatementLine),
    Blank,
    BadDate,
    BadAmount,
    Zero,
}

/// Stateless statement parser.
pub struct StatementParser;

impl StatementParser {
    /// Parses a statement payload.
    ///
    /// # Errors
    ///
    /// Returns a structural error for empty payloads, a missing header, or
    /// when no row yields a non-zero line. Nothing is returned partially.
    pub fn parse(raw: &str) -> Result<ParsedStatement, ReconciliationError> {
        let text = raw.trim_start_matches('\u{feff}');
        if text.trim().is_empty() {
            return Err(ReconciliationError::EmptyPayload);
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .delimiter(Self::sniff_delimiter(text))
            .from_reader(text.as_bytes());

        let mut mapping: Option<ColumnMapping> = None;
        let mut lines = Vec::new();
        let mut total_rows = 0usize;
        let mut zero_amount_rows = 0usize;
        let mut unparseable_date_rows = 0usize;
        let mut invalid_amount_rows = 0usize;

        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| ReconciliationError::Malformed(e.to_string()))?;
            let row_number = idx + 1;

            let Some(columns) = mapping.as_ref() else {
                if row_number > HEADER_SEARCH_ROWS {
                    break;
                }
                let candidate = ColumnMapping::detect(&record);
                if candidate.is_usable() {
                    mapping = Some(candidate);
                }
                continue;
            };

            match Self::parse_row(&record, row_number, columns) {
                RowOutcome::Blank => {}
                RowOutcome::Line(line) => {
                    total_rows += 1;
                    lines.push(line);
                }
                RowOutcome::BadDate => {
                    total_rows += 1;
                    unparseable_date_rows += 1;
                }
                RowOutcome::BadAmount => {
                    total_rows += 1;
                    invalid_amount_rows += 1;
                }
                RowOutcome::Zero => {
                    total_rows += 1;
                    zero_amount_rows += 1;
                }
            }
        }

        if mapping.is_none() {
            return Err(ReconciliationError::HeaderNotFound);
        }

        let skipped = zero_amount_rows + unparseable_date_rows + invalid_amount_rows;
        let (Some(min_date), Some(max_date)) = (
            lines.iter().map(|l| l.transaction_date).min(),
            lines.iter().map(|l| l.transaction_date).max(),
        ) else {
            return Err(ReconciliationError::NoValidRows { skipped });
        };

        Ok(ParsedStatement {
            lines,
            total_rows,
            zero_amount_rows,
            unparseable_date_rows,
            invalid_amount_rows,
            min_date,
            max_date,
        })
    }

    /// Turns parsed rows into stored statement lines for one import batch.
    #[must_use]
    pub fn to_lines(
        parsed: &ParsedStatement,
        tenant_id: TenantId,
        import_id: StatementImportId,
        bank_account_id: BankAccountId,
    ) -> Vec<StatementLine> {
        parsed
            .lines
            .iter()
            .map(|row| StatementLine {
                id: StatementLineId::new(),
                tenant_id,
                import_id,
                bank_account_id,
                transaction_date: row.transaction_date,
                narration: row.narration.clone(),
                direction: row.direction,
                amount: row.amount,
                running_balance: row.running_balance,
                reference_token: row.reference.as_ref().map(ToString::to_string),
                status: MatchStatus::Unmatched,
                matched_voucher_type: None,
                matched_voucher_no: None,
                matched_ref_id: None,
                matched_entry_id: None,
                confidence: Decimal::ZERO,
                method: MatchMethod::None,
                notes: None,
            })
            .collect()
    }

    fn parse_row(record: &StringRecord, row_number: usize, columns: &ColumnMapping) -> RowOutcome {
        if record.iter().all(str::is_empty) {
            return RowOutcome::Blank;
        }

        let cell = |col: Option<usize>| col.and_then(|c| record.get(c)).unwrap_or("");

        let Some(transaction_date) = parse_date(cell(columns.date_column)) else {
            return RowOutcome::BadDate;
        };

        let signed = if columns.uses_split_columns() {
            let debit = parse_amount(cell(columns.debit_column));
            let credit = parse_amount(cell(columns.credit_column));
            match (debit, credit) {
                (AmountCell::Invalid, _) | (_, AmountCell::Invalid) => return RowOutcome::BadAmount,
                (d, c) => value_or_zero(c).abs() - value_or_zero(d).abs(),
            }
        } else {
            match parse_amount(cell(columns.amount_column)) {
                AmountCell::Invalid => return RowOutcome::BadAmount,
                other => value_or_zero(other),
            }
        };

        if signed.is_zero() {
            return RowOutcome::Zero;
        }

        let narration = columns
            .narration_columns
            .iter()
            .filter_map(|c| record.get(*c))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let running_balance = match parse_amount(cell(columns.balance_column)) {
            AmountCell::Value(v) => Some(v),
            AmountCell::Blank | AmountCell::Invalid => None,
        };

        RowOutcome::Line(ParsedStatementLine {
            row_number,
            transaction_date,
            reference: ReferenceToken::extract(&narration),
            narration,
            direction: if signed.is_sign_negative() {
                Direction::Debit
            } else {
                Direction::Credit
            },
            amount: signed.abs(),
            running_balance,
        })
    }

    fn sniff_delimiter(text: &str) -> u8 {
        let first = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        let count = |c: char| first.matches(c).count();
        if count('\t') > count(',') && count('\t') >= count(';') {
            b'\t'
        } else if count(';') > count(',') {
            b';'
        } else {
            b','
        }
    }
}

const fn value_or_zero(cell: AmountCell) -> Decimal {
    match cell {
        AmountCell::Value(v) => v,
        AmountCell::Blank | AmountCell::Invalid => Decimal::ZERO,
    }
}

/// Parses a date trying each supported format, ignoring any time portion.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

/// Parses a money cell in any of the tolerated formats.
///
/// Returns `None` for blank cells and cells that are not numbers.
#[must_use]
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    match parse_amount(raw) {
        AmountCell::Value(v) => Some(v),
        AmountCell::Blank | AmountCell::Invalid => None,
    }
}

fn parse_amount(raw: &str) -> AmountCell {
    let s = raw.trim();
    if s.is_empty() || s == "-" {
        return AmountCell::Blank;
    }

    let negative = (s.starts_with('(') && s.ends_with(')')) || s.starts_with('-') || s.ends_with('-');

    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    if !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return AmountCell::Invalid;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        // Whichever separator comes last is the decimal point.
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(comma), None) => {
            let decimals = cleaned.len() - comma - 1;
            if cleaned.matches(',').count() == 1 && decimals != 3 {
                cleaned.replace(',', ".")
            } else {
                cleaned.replace(',', "")
            }
        }
        (None, Some(_)) if cleaned.matches('.').count() > 1 => cleaned.replace('.', ""),
        _ => cleaned,
    };

    match Decimal::from_str(&normalized) {
        Ok(v) if negative => AmountCell::Value(-v),
        Ok(v) => AmountCell::Value(v),
        Err(_) => AmountCell::Invalid,
    }
}
