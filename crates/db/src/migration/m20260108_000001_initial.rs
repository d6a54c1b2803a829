//! Initial database migration.
//!
//! Creates the ledger schema: enums, tables, CHECK constraints, immutability
//! triggers and row-level security policies.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(ACCOUNT_ROLE_MAPPINGS_SQL).await?;
        db.execute_unprepared(BANK_ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 3: JOURNAL & SEQUENCES
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(DOC_SEQUENCES_SQL).await?;
        db.execute_unprepared(TRADE_DOCUMENTS_SQL).await?;

        // ============================================================
        // PART 4: BANK RECONCILIATION
        // ============================================================
        db.execute_unprepared(STATEMENT_IMPORTS_SQL).await?;
        db.execute_unprepared(STATEMENT_LINES_SQL).await?;

        // ============================================================
        // PART 5: CHEQUES
        // ============================================================
        db.execute_unprepared(CHEQUE_BOOKS_SQL).await?;
        db.execute_unprepared(CHEQUE_TRANSACTIONS_SQL).await?;

        // ============================================================
        // PART 6: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 7: ROW-LEVEL SECURITY
        // ============================================================
        db.execute_unprepared(RLS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM ('asset', 'liability', 'equity', 'revenue', 'expense');

CREATE TYPE statement_class AS ENUM ('balance_sheet', 'income_statement');

CREATE TYPE cash_flow_group AS ENUM ('operating', 'investing', 'financing');

CREATE TYPE statement_direction AS ENUM ('debit', 'credit');

CREATE TYPE match_status AS ENUM ('unmatched', 'suggested', 'reconciled', 'ignored');

CREATE TYPE match_method AS ENUM ('none', 'reference', 'amount_date', 'manual', 'auto_posted');

CREATE TYPE cheque_direction AS ENUM ('incoming', 'outgoing');

CREATE TYPE cheque_type AS ENUM ('normal', 'post_dated');

CREATE TYPE cheque_status AS ENUM (
    'draft',
    'printed',
    'handed_over',
    'deposited',
    'presented',
    'cleared',
    'bounced',
    'voided'
);

CREATE TYPE trade_document_kind AS ENUM ('sales', 'purchase');
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    tenant_id UUID NOT NULL,
    account_no INTEGER NOT NULL,
    name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    statement_class statement_class NOT NULL,
    cash_flow_group cash_flow_group,
    is_cash_account BOOLEAN NOT NULL DEFAULT false,
    is_non_cash_expense BOOLEAN NOT NULL DEFAULT false,
    is_working_capital BOOLEAN NOT NULL DEFAULT false,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    PRIMARY KEY (tenant_id, account_no),
    CONSTRAINT chk_account_no_positive CHECK (account_no > 0),
    CONSTRAINT chk_account_name CHECK (length(trim(name)) > 0),
    CONSTRAINT chk_statement_class CHECK (
        (account_type IN ('asset', 'liability', 'equity') AND statement_class = 'balance_sheet')
        OR (account_type IN ('revenue', 'expense') AND statement_class = 'income_statement')
    )
);
";

const ACCOUNT_ROLE_MAPPINGS_SQL: &str = r"
CREATE TABLE account_role_mappings (
    tenant_id UUID NOT NULL,
    role VARCHAR(32) NOT NULL,
    account_no INTEGER NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    PRIMARY KEY (tenant_id, role),
    FOREIGN KEY (tenant_id, account_no) REFERENCES accounts(tenant_id, account_no),
    CONSTRAINT chk_role CHECK (role IN (
        'CASH', 'BANK', 'AR', 'AP', 'PDC_RECEIVABLE', 'PDC_PAYABLE_CLEARING',
        'BANK_CHARGES', 'VAT_PAYABLE', 'VAT_RECEIVABLE', 'SUSPENSE'
    ))
);
";

const BANK_ACCOUNTS_SQL: &str = r"
CREATE TABLE bank_accounts (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    bank_reference VARCHAR(64) NOT NULL,
    gl_account_no INTEGER NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    FOREIGN KEY (tenant_id, gl_account_no) REFERENCES accounts(tenant_id, account_no),
    UNIQUE (tenant_id, bank_reference)
);

CREATE INDEX idx_bank_accounts_tenant ON bank_accounts(tenant_id);
";

const JOURNAL_ENTRIES_SQL: &str = r"
-- BIGSERIAL id is the stable insertion order that breaks same-date ties.
CREATE TABLE journal_entries (
    id BIGSERIAL PRIMARY KEY,
    tenant_id UUID NOT NULL,
    transaction_date DATE NOT NULL,
    voucher_type VARCHAR(10) NOT NULL,
    voucher_no VARCHAR(64) NOT NULL,
    ref_id UUID,
    debit_account_no INTEGER NOT NULL,
    credit_account_no INTEGER NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    narration TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    FOREIGN KEY (tenant_id, debit_account_no) REFERENCES accounts(tenant_id, account_no),
    FOREIGN KEY (tenant_id, credit_account_no) REFERENCES accounts(tenant_id, account_no),
    CONSTRAINT chk_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_distinct_accounts CHECK (debit_account_no <> credit_account_no),
    CONSTRAINT chk_voucher_type CHECK (voucher_type ~ '^[A-Z0-9]{1,10}$'),
    CONSTRAINT chk_voucher_no CHECK (length(trim(voucher_no)) > 0)
);

CREATE INDEX idx_journal_voucher ON journal_entries(tenant_id, voucher_type, voucher_no);
CREATE INDEX idx_journal_debit ON journal_entries(tenant_id, debit_account_no, transaction_date);
CREATE INDEX idx_journal_credit ON journal_entries(tenant_id, credit_account_no, transaction_date);
CREATE INDEX idx_journal_ref ON journal_entries(tenant_id, ref_id) WHERE ref_id IS NOT NULL;
CREATE INDEX idx_journal_date ON journal_entries(tenant_id, transaction_date, id);
";

const DOC_SEQUENCES_SQL: &str = r"
CREATE TABLE doc_sequences (
    tenant_id UUID NOT NULL,
    doc_type VARCHAR(20) NOT NULL,
    prefix VARCHAR(20) NOT NULL,
    next_number BIGINT NOT NULL DEFAULT 1,
    pad_width INTEGER NOT NULL DEFAULT 5,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    PRIMARY KEY (tenant_id, doc_type),
    CONSTRAINT chk_next_number CHECK (next_number >= 1),
    CONSTRAINT chk_pad_width CHECK (pad_width BETWEEN 1 AND 18)
);
";

const TRADE_DOCUMENTS_SQL: &str = r"
-- Written by the sales and purchase workflows; read here for counterparty names.
CREATE TABLE trade_documents (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    kind trade_document_kind NOT NULL,
    voucher_type VARCHAR(10) NOT NULL,
    voucher_no VARCHAR(64) NOT NULL,
    party_id UUID,
    party_name VARCHAR(255) NOT NULL,
    document_date DATE NOT NULL,
    total_amount NUMERIC(19, 4) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    UNIQUE (tenant_id, voucher_type, voucher_no)
);
";

const STATEMENT_IMPORTS_SQL: &str = r"
CREATE TABLE bank_statement_imports (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    bank_account_id UUID NOT NULL REFERENCES bank_accounts(id),
    source_name VARCHAR(255),
    min_date DATE NOT NULL,
    max_date DATE NOT NULL,
    line_count INTEGER NOT NULL,
    skipped_count INTEGER NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_import_dates CHECK (min_date <= max_date),
    CONSTRAINT chk_import_lines CHECK (line_count > 0 AND skipped_count >= 0)
);

CREATE INDEX idx_statement_imports_bank ON bank_statement_imports(tenant_id, bank_account_id);
";

const STATEMENT_LINES_SQL: &str = r"
CREATE TABLE bank_statement_lines (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    import_id UUID NOT NULL REFERENCES bank_statement_imports(id),
    bank_account_id UUID NOT NULL REFERENCES bank_accounts(id),
    transaction_date DATE NOT NULL,
    narration TEXT NOT NULL,
    direction statement_direction NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    running_balance NUMERIC(19, 4),
    reference_token VARCHAR(32),
    status match_status NOT NULL DEFAULT 'unmatched',
    matched_voucher_type VARCHAR(10),
    matched_voucher_no VARCHAR(64),
    matched_ref_id UUID,
    matched_entry_id BIGINT REFERENCES journal_entries(id),
    confidence NUMERIC(5, 4) NOT NULL DEFAULT 0,
    method match_method NOT NULL DEFAULT 'none',
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT chk_line_amount CHECK (amount > 0),
    CONSTRAINT chk_confidence CHECK (confidence BETWEEN 0 AND 1),
    CONSTRAINT chk_reconciled_has_match CHECK (
        status <> 'reconciled' OR matched_entry_id IS NOT NULL
    )
);

CREATE INDEX idx_statement_lines_bank ON bank_statement_lines(tenant_id, bank_account_id, status);
CREATE INDEX idx_statement_lines_import ON bank_statement_lines(import_id);

-- A journal entry reconciles at most one statement line.
CREATE UNIQUE INDEX uq_statement_lines_reconciled_entry
    ON bank_statement_lines(matched_entry_id)
    WHERE status = 'reconciled';
";

const CHEQUE_BOOKS_SQL: &str = r"
CREATE TABLE cheque_books (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    bank_account_no INTEGER NOT NULL,
    start_no BIGINT NOT NULL,
    end_no BIGINT NOT NULL,
    next_no BIGINT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    FOREIGN KEY (tenant_id, bank_account_no) REFERENCES accounts(tenant_id, account_no),
    CONSTRAINT chk_book_range CHECK (start_no > 0 AND start_no <= end_no),
    CONSTRAINT chk_book_cursor CHECK (start_no <= next_no AND next_no <= end_no + 1)
);

CREATE INDEX idx_cheque_books_tenant ON cheque_books(tenant_id, bank_account_no);
";

const CHEQUE_TRANSACTIONS_SQL: &str = r"
CREATE TABLE cheque_transactions (
    id UUID PRIMARY KEY,
    tenant_id UUID NOT NULL,
    direction cheque_direction NOT NULL,
    cheque_type cheque_type NOT NULL,
    status cheque_status NOT NULL DEFAULT 'draft',
    cheque_book_id UUID REFERENCES cheque_books(id),
    cheque_no VARCHAR(32) NOT NULL,
    voucher_no VARCHAR(64) NOT NULL,
    issue_date DATE NOT NULL,
    cheque_date DATE NOT NULL,
    clear_date DATE,
    amount NUMERIC(19, 4) NOT NULL,
    counterparty_id UUID,
    counterparty_name VARCHAR(255),
    source_document_id UUID,
    bank_account_no INTEGER NOT NULL,
    clearing_account_no INTEGER,
    counter_account_no INTEGER NOT NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    FOREIGN KEY (tenant_id, bank_account_no) REFERENCES accounts(tenant_id, account_no),
    FOREIGN KEY (tenant_id, clearing_account_no) REFERENCES accounts(tenant_id, account_no),
    FOREIGN KEY (tenant_id, counter_account_no) REFERENCES accounts(tenant_id, account_no),
    CONSTRAINT chk_cheque_amount CHECK (amount > 0),
    CONSTRAINT chk_outgoing_has_book CHECK (direction = 'incoming' OR cheque_book_id IS NOT NULL),
    UNIQUE (tenant_id, voucher_no)
);

CREATE UNIQUE INDEX uq_cheque_leaf
    ON cheque_transactions(cheque_book_id, cheque_no)
    WHERE cheque_book_id IS NOT NULL;
CREATE INDEX idx_cheque_transactions_status ON cheque_transactions(tenant_id, status);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_tenant_change
-- A row's tenant is fixed at creation
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_tenant_change()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.tenant_id IS DISTINCT FROM OLD.tenant_id THEN
        RAISE EXCEPTION 'tenant_id of % cannot be changed', TG_TABLE_NAME;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_accounts_tenant BEFORE UPDATE ON accounts
    FOR EACH ROW EXECUTE FUNCTION prevent_tenant_change();
CREATE TRIGGER trg_account_role_mappings_tenant BEFORE UPDATE ON account_role_mappings
    FOR EACH ROW EXECUTE FUNCTION prevent_tenant_change();
CREATE TRIGGER trg_bank_accounts_tenant BEFORE UPDATE ON bank_accounts
    FOR EACH ROW EXECUTE FUNCTION prevent_tenant_change();
CREATE TRIGGER trg_doc_sequences_tenant BEFORE UPDATE ON doc_sequences
    FOR EACH ROW EXECUTE FUNCTION prevent_tenant_change();
CREATE TRIGGER trg_trade_documents_tenant BEFORE UPDATE ON trade_documents
    FOR EACH ROW EXECUTE FUNCTION prevent_tenant_change();
CREATE TRIGGER trg_statement_imports_tenant BEFORE UPDATE ON bank_statement_imports
    FOR EACH ROW EXECUTE FUNCTION prevent_tenant_change();
CREATE TRIGGER trg_statement_lines_tenant BEFORE UPDATE ON bank_statement_lines
    FOR EACH ROW EXECUTE FUNCTION prevent_tenant_change();
CREATE TRIGGER trg_cheque_books_tenant BEFORE UPDATE ON cheque_books
    FOR EACH ROW EXECUTE FUNCTION prevent_tenant_change();
CREATE TRIGGER trg_cheque_transactions_tenant BEFORE UPDATE ON cheque_transactions
    FOR EACH ROW EXECUTE FUNCTION prevent_tenant_change();

-- ============================================================
-- FUNCTION: prevent_journal_mutation
-- Journal entries are immutable; corrections are new offsetting entries
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_journal_mutation()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Journal entries are immutable. Post an offsetting entry instead.';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_journal_immutable
BEFORE UPDATE OR DELETE ON journal_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_journal_mutation();

CREATE TRIGGER trg_journal_no_truncate
BEFORE TRUNCATE ON journal_entries
FOR EACH STATEMENT
EXECUTE FUNCTION prevent_journal_mutation();
";

const RLS_SQL: &str = r"
-- ============================================================
-- ROW-LEVEL SECURITY POLICIES
-- Application sets context per transaction: SET LOCAL app.current_tenant_id = 'uuid';
-- ============================================================

ALTER TABLE accounts ENABLE ROW LEVEL SECURITY;
ALTER TABLE account_role_mappings ENABLE ROW LEVEL SECURITY;
ALTER TABLE bank_accounts ENABLE ROW LEVEL SECURITY;
ALTER TABLE journal_entries ENABLE ROW LEVEL SECURITY;
ALTER TABLE doc_sequences ENABLE ROW LEVEL SECURITY;
ALTER TABLE trade_documents ENABLE ROW LEVEL SECURITY;
ALTER TABLE bank_statement_imports ENABLE ROW LEVEL SECURITY;
ALTER TABLE bank_statement_lines ENABLE ROW LEVEL SECURITY;
ALTER TABLE cheque_books ENABLE ROW LEVEL SECURITY;
ALTER TABLE cheque_transactions ENABLE ROW LEVEL SECURITY;

CREATE POLICY tenant_isolation ON accounts
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID)
    WITH CHECK (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON account_role_mappings
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID)
    WITH CHECK (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON bank_accounts
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID)
    WITH CHECK (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON journal_entries
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID)
    WITH CHECK (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON doc_sequences
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID)
    WITH CHECK (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON trade_documents
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID)
    WITH CHECK (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON bank_statement_imports
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID)
    WITH CHECK (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON bank_statement_lines
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID)
    WITH CHECK (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON cheque_books
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID)
    WITH CHECK (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);

CREATE POLICY tenant_isolation ON cheque_transactions
    USING (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID)
    WITH CHECK (tenant_id = NULLIF(current_setting('app.current_tenant_id', true), '')::UUID);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS cheque_transactions CASCADE;
DROP TABLE IF EXISTS cheque_books CASCADE;
DROP TABLE IF EXISTS bank_statement_lines CASCADE;
DROP TABLE IF EXISTS bank_statement_imports CASCADE;
DROP TABLE IF EXISTS trade_documents CASCADE;
DROP TABLE IF EXISTS doc_sequences CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS bank_accounts CASCADE;
DROP TABLE IF EXISTS account_role_mappings CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;

DROP FUNCTION IF EXISTS prevent_journal_mutation() CASCADE;
DROP FUNCTION IF EXISTS prevent_tenant_change() CASCADE;

DROP TYPE IF EXISTS trade_document_kind;
DROP TYPE IF EXISTS cheque_status;
DROP TYPE IF EXISTS cheque_type;
DROP TYPE IF EXISTS cheque_direction;
DROP TYPE IF EXISTS match_method;
DROP TYPE IF EXISTS match_status;
DROP TYPE IF EXISTS statement_direction;
DROP TYPE IF EXISTS cash_flow_group;
DROP TYPE IF EXISTS statement_class;
DROP TYPE IF EXISTS account_type;
";
