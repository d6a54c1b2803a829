//! Database seeder for Ledgerline development and testing.
//!
//! Seeds a fixed development tenant with a tagged chart of accounts, role
//! mappings, a bank account, a cheque book and a month of sample postings.
//! Running it twice is harmless: a tenant that already has accounts is left
//! alone.
//!
//! Usage: cargo run --bin seeder

use chrono::{Duration, NaiveDate, Utc};
use ledgerline_core::accounts::{AccountNo, AccountRole, AccountType, CashFlowGroup, NewAccount};
use ledgerline_core::cheque::{ChequeDirection, ChequeType, NewCheque};
use ledgerline_core::ledger::{PostingLine, PostingRequest, VoucherType, codes};
use ledgerline_db::entities::sea_orm_active_enums::TradeDocumentKind;
use ledgerline_db::repositories::NewTradeDocument;
use ledgerline_db::{
    AccountRepository, ChequeRepository, JournalRepository, SequenceRepository, TradeDocumentRepository,
};
use ledgerline_shared::AppConfig;
use ledgerline_shared::config::{LogFormat, LoggingConfig};
use ledgerline_shared::types::{ChequeBookId, TenantId};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Development tenant (consistent for all seeds).
const DEV_TENANT_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_0000_0000_0000_0000_0001);

const CASH: AccountNo = AccountNo(1000);
const BANK: AccountNo = AccountNo(1010);
const AR: AccountNo = AccountNo(1100);
const INVENTORY: AccountNo = AccountNo(1200);
const EQUIPMENT: AccountNo = AccountNo(1500);
const AP: AccountNo = AccountNo(2000);
const VAT_PAYABLE: AccountNo = AccountNo(2100);
const CAPITAL: AccountNo = AccountNo(3000);
const SALES: AccountNo = AccountNo(4000);
const COST_OF_SALES: AccountNo = AccountNo(5000);
const RENT: AccountNo = AccountNo(6000);
const DEPRECIATION: AccountNo = AccountNo(6100);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let db = ledgerline_db::connect_with(&config.database).await?;
    info!("Connected to database");

    let tenant = TenantId::from_uuid(DEV_TENANT_ID);
    let seeder = Seeder {
        tenant,
        accounts: AccountRepository::new(db.clone()),
        journal: JournalRepository::new(db.clone()),
        sequences: SequenceRepository::new(db.clone(), config.sequences.pad_width),
        cheques: ChequeRepository::new(
            db.clone(),
            config.cheques.auto_provision_clearing,
            config.sequences.pad_width,
        ),
        documents: TradeDocumentRepository::new(db),
    };

    if !seeder.accounts.list_accounts(tenant).await?.is_empty() {
        info!(tenant_id = %tenant, "Development tenant already seeded, skipping");
        return Ok(());
    }

    seeder.seed_chart().await?;
    let book_id = seeder.seed_bank().await?;
    seeder.seed_postings(Utc::now().date_naive(), book_id).await?;

    info!(tenant_id = %tenant, "Seeding complete");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}

struct Seeder {
    tenant: TenantId,
    accounts: AccountRepository,
    journal: JournalRepository,
    sequences: SequenceRepository,
    cheques: ChequeRepository,
    documents: TradeDocumentRepository,
}

impl Seeder {
    async fn seed_chart(&self) -> anyhow::Result<()> {
        let chart = [
            NewAccount::new(CASH, "Petty Cash", AccountType::Asset).cash(),
            NewAccount::new(BANK, "Main Bank", AccountType::Asset).cash(),
            NewAccount::new(AR, "Accounts Receivable", AccountType::Asset).working_capital(),
            NewAccount::new(INVENTORY, "Inventory", AccountType::Asset).working_capital(),
            NewAccount::new(EQUIPMENT, "Office Equipment", AccountType::Asset)
                .with_cash_flow_group(CashFlowGroup::Investing),
            NewAccount::new(AP, "Accounts Payable", AccountType::Liability).working_capital(),
            NewAccount::new(VAT_PAYABLE, "VAT Payable", AccountType::Liability).working_capital(),
            NewAccount::new(CAPITAL, "Owner Capital", AccountType::Equity)
                .with_cash_flow_group(CashFlowGroup::Financing),
            NewAccount::new(SALES, "Sales", AccountType::Revenue),
            NewAccount::new(COST_OF_SALES, "Cost of Sales", AccountType::Expense),
            NewAccount::new(RENT, "Rent", AccountType::Expense),
            NewAccount::new(DEPRECIATION, "Depreciation", AccountType::Expense).non_cash_expense(),
        ];
        for account in chart {
            self.accounts.create_account(self.tenant, account).await?;
        }

        for (role, account_no) in [
            (AccountRole::Cash, CASH),
            (AccountRole::Bank, BANK),
            (AccountRole::Ar, AR),
            (AccountRole::Ap, AP),
            (AccountRole::VatPayable, VAT_PAYABLE),
        ] {
            self.accounts.set_role_mapping(self.tenant, role, account_no).await?;
        }
        info!(tenant_id = %self.tenant, "Seeded chart of accounts and role mappings");
        Ok(())
    }

    async fn seed_bank(&self) -> anyhow::Result<ChequeBookId> {
        let bank = self
            .accounts
            .register_bank_account(self.tenant, "Main Current Account", "DEV-0001", BANK)
            .await?;
        let book = self.cheques.create_cheque_book(self.tenant, BANK, 1, 50).await?;
        info!(
            tenant_id = %self.tenant,
            bank_account_id = %bank.id,
            cheque_book_id = %book.id,
            "Seeded bank account and cheque book"
        );
        Ok(book.id)
    }

    async fn seed_postings(&self, today: NaiveDate, book_id: ChequeBookId) -> anyhow::Result<()> {
        let start = today - Duration::days(28);

        self.post(codes::JV, start, vec![PostingLine::new(BANK, CAPITAL, money(2_000_000))], None)
            .await?;
        self.post(codes::PPAY, start + Duration::days(1), vec![PostingLine::new(EQUIPMENT, BANK, money(300_000))], None)
            .await?;

        let invoice_id = Uuid::new_v4();
        let invoice_no = self
            .post(
                codes::INV,
                start + Duration::days(5),
                vec![
                    PostingLine::new(AR, SALES, money(100_000)),
                    PostingLine::new(AR, VAT_PAYABLE, money(5_000)),
                    PostingLine::new(COST_OF_SALES, INVENTORY, money(60_000)),
                ],
                Some(invoice_id),
            )
            .await?;
        self.documents
            .register(
                self.tenant,
                NewTradeDocument {
                    id: invoice_id,
                    kind: TradeDocumentKind::Sales,
                    voucher_type: VoucherType::new(codes::INV)?,
                    voucher_no: invoice_no,
                    party_id: None,
                    party_name: "Acme Trading".to_string(),
                    document_date: start + Duration::days(5),
                    total_amount: money(105_000),
                },
            )
            .await?;

        self.post(codes::PAY, start + Duration::days(12), vec![PostingLine::new(BANK, AR, money(105_000))], None)
            .await?;
        self.post(codes::PINV, start + Duration::days(14), vec![PostingLine::new(INVENTORY, AP, money(80_000))], None)
            .await?;
        self.post(codes::PCV, start + Duration::days(15), vec![PostingLine::new(RENT, CASH, money(15_000))], None)
            .await?;
        self.post(codes::JV, start + Duration::days(27), vec![PostingLine::new(DEPRECIATION, EQUIPMENT, money(2_500))], None)
            .await?;

        // Settle the purchase with a post-dated cheque handed over today.
        let cheque = self
            .cheques
            .create_cheque(
                self.tenant,
                &NewCheque {
                    direction: ChequeDirection::Outgoing,
                    cheque_type: ChequeType::PostDated,
                    cheque_book_id: Some(book_id),
                    cheque_no: None,
                    issue_date: today,
                    cheque_date: today + Duration::days(30),
                    amount: money(80_000),
                    counterparty_id: None,
                    counterparty_name: Some("Paper Supplies Ltd".to_string()),
                    source_document_id: None,
                    notes: None,
                },
            )
            .await?;
        self.cheques.mark_printed(self.tenant, cheque.id).await?;
        self.cheques
            .mark_handed_over_or_deposited(self.tenant, cheque.id, today)
            .await?;

        info!(tenant_id = %self.tenant, "Seeded sample postings");
        Ok(())
    }

    /// Posts under a freshly allocated voucher number and returns it.
    async fn post(
        &self,
        code: &str,
        date: NaiveDate,
        lines: Vec<PostingLine>,
        ref_id: Option<Uuid>,
    ) -> anyhow::Result<String> {
        let voucher_no = self.sequences.next(self.tenant, code, code).await?.document_no;
        let request = PostingRequest {
            tenant_id: self.tenant,
            transaction_date: date,
            voucher_type: VoucherType::new(code)?,
            voucher_no: voucher_no.clone(),
            ref_id,
            lines,
        };
        self.journal.post_many(&request).await?;
        Ok(voucher_no)
    }
}

/// Amount in cents.
fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
