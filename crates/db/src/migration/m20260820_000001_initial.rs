//! Initial database migration.
//!
//! Creates the enums, summary accounts, movement categories, funding
//! sources, obligations, and the append-only movements ledger.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(ENUMS_SQL).await?;
        db.execute_unprepared(SUMMARY_ACCOUNTS_SQL).await?;
        db.execute_unprepared(MOVEMENT_CATEGORIES_SQL).await?;
        db.execute_unprepared(FUNDING_SOURCES_SQL).await?;
        db.execute_unprepared(OBLIGATIONS_SQL).await?;
        db.execute_unprepared(MOVEMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            r"
            DROP TABLE IF EXISTS movements;
            DROP TABLE IF EXISTS obligations;
            DROP TABLE IF EXISTS funding_sources;
            DROP TABLE IF EXISTS movement_categories;
            DROP TABLE IF EXISTS summary_accounts;
            DROP TYPE IF EXISTS obligation_kind;
            DROP TYPE IF EXISTS settlement_state;
            DROP TYPE IF EXISTS funding_source_kind;
            DROP TYPE IF EXISTS movement_direction;
            ",
        )
        .await?;

        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE movement_direction AS ENUM ('income', 'expense');
CREATE TYPE funding_source_kind AS ENUM ('cash_box', 'bank_account');
CREATE TYPE settlement_state AS ENUM ('unsettled', 'partially_settled', 'settled');
CREATE TYPE obligation_kind AS ENUM ('payroll', 'invoice');
";

const SUMMARY_ACCOUNTS_SQL: &str = r"
CREATE TABLE summary_accounts (
    id UUID PRIMARY KEY,
    code VARCHAR(64) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const MOVEMENT_CATEGORIES_SQL: &str = r"
CREATE TABLE movement_categories (
    id UUID PRIMARY KEY,
    code VARCHAR(64) NOT NULL UNIQUE,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const FUNDING_SOURCES_SQL: &str = r"
CREATE TABLE funding_sources (
    id UUID PRIMARY KEY,
    kind funding_source_kind NOT NULL,
    name VARCHAR(255) NOT NULL,
    bank_account_number VARCHAR(64),
    is_principal BOOLEAN NOT NULL DEFAULT false,
    is_active BOOLEAN NOT NULL DEFAULT true,
    opening_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    linked_summary_account_id UUID REFERENCES summary_accounts(id),
    reconciled_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- At most one active principal cash box.
CREATE UNIQUE INDEX idx_funding_sources_one_principal
    ON funding_sources(kind)
    WHERE kind = 'cash_box' AND is_principal AND is_active;

CREATE INDEX idx_funding_sources_summary
    ON funding_sources(linked_summary_account_id)
    WHERE linked_summary_account_id IS NOT NULL;
";

const OBLIGATIONS_SQL: &str = r"
CREATE TABLE obligations (
    id UUID PRIMARY KEY,
    kind obligation_kind NOT NULL,
    counterparty_id UUID NOT NULL,
    description TEXT NOT NULL,
    total_amount_due NUMERIC(19, 4) NOT NULL CHECK (total_amount_due > 0),
    settlement_state settlement_state NOT NULL DEFAULT 'unsettled',
    due_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_obligations_counterparty ON obligations(counterparty_id);
CREATE INDEX idx_obligations_state ON obligations(settlement_state)
    WHERE settlement_state <> 'settled';
";

const MOVEMENTS_SQL: &str = r"
CREATE TABLE movements (
    id UUID PRIMARY KEY,
    direction movement_direction NOT NULL,
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    funding_source_id UUID NOT NULL REFERENCES funding_sources(id),
    obligation_id UUID REFERENCES obligations(id),
    payment_group_id UUID,
    category_id UUID REFERENCES movement_categories(id),
    description TEXT NOT NULL,
    occurred_at TIMESTAMPTZ NOT NULL,
    recorded_by UUID NOT NULL,
    reversed_at TIMESTAMPTZ,
    reversed_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CHECK ((reversed_at IS NULL) = (reversed_by IS NULL))
);

CREATE INDEX idx_movements_source_occurred
    ON movements(funding_source_id, occurred_at DESC);
CREATE INDEX idx_movements_obligation
    ON movements(obligation_id)
    WHERE obligation_id IS NOT NULL;
";
