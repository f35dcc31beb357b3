//! Bootstrap provisioning for Tesoro.
//!
//! Creates the records payments depend on, explicitly and idempotently:
//! the summary accounts, the settlement movement categories, and the
//! principal cash box. Re-running against a provisioned database changes
//! nothing.
//!
//! Usage: cargo run --bin bootstrap

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use uuid::Uuid;

use tesoro_core::movement::FundingSourceKind;
use tesoro_db::entities::{movement_categories, summary_accounts};
use tesoro_db::repositories::{CreateFundingSourceInput, FundingSourceRepository};

/// Summary account for physical cash, code and display name.
const CASH_SUMMARY: (&str, &str) = ("cash_on_hand", "Cash on hand");
/// Summary account for bank balances.
const BANK_SUMMARY: (&str, &str) = ("bank_balances", "Bank balances");

/// Settlement categories stamped on payment movements.
const CATEGORIES: [(&str, &str); 2] = [
    ("payroll_settlement", "Payroll settlement"),
    ("invoice_settlement", "Invoice settlement"),
];

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = tesoro_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Provisioning summary accounts...");
    let cash_summary = ensure_summary_account(&db, CASH_SUMMARY.0, CASH_SUMMARY.1).await;
    ensure_summary_account(&db, BANK_SUMMARY.0, BANK_SUMMARY.1).await;

    println!("Provisioning movement categories...");
    for (code, name) in CATEGORIES {
        ensure_category(&db, code, name).await;
    }

    println!("Provisioning principal cash box...");
    ensure_principal_cash_box(&db, cash_summary).await;

    println!("Bootstrap complete!");
}

/// Creates a summary account if its code is not present yet.
async fn ensure_summary_account(db: &DatabaseConnection, code: &str, name: &str) -> Uuid {
    if let Some(existing) = summary_accounts::Entity::find()
        .filter(summary_accounts::Column::Code.eq(code))
        .one(db)
        .await
        .expect("Failed to query summary accounts")
    {
        println!("  Summary account '{code}' already exists, skipping...");
        return existing.id;
    }

    let now = Utc::now();
    let account = summary_accounts::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        balance: Set(Decimal::ZERO),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .expect("Failed to create summary account");

    println!("  Created summary account '{code}'");
    account.id
}

/// Creates a movement category if its code is not present yet.
async fn ensure_category(db: &DatabaseConnection, code: &str, name: &str) {
    let exists = movement_categories::Entity::find()
        .filter(movement_categories::Column::Code.eq(code))
        .one(db)
        .await
        .expect("Failed to query movement categories")
        .is_some();
    if exists {
        println!("  Category '{code}' already exists, skipping...");
        return;
    }

    movement_categories::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        name: Set(name.to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await
    .expect("Failed to create movement category");

    println!("  Created category '{code}'");
}

/// Designates a principal cash box if none is designated yet.
async fn ensure_principal_cash_box(db: &DatabaseConnection, cash_summary_id: Uuid) {
    let repo = FundingSourceRepository::new(db.clone());
    if repo
        .find_principal_cash_box()
        .await
        .expect("Failed to query funding sources")
        .is_some()
    {
        println!("  Principal cash box already designated, skipping...");
        return;
    }

    let source = repo
        .create(CreateFundingSourceInput {
            kind: FundingSourceKind::CashBox,
            name: "Principal cash box".to_string(),
            bank_account_number: None,
            is_principal: true,
            opening_balance: Decimal::ZERO,
            linked_summary_account_id: Some(cash_summary_id),
        })
        .await
        .expect("Failed to create principal cash box");

    println!("  Created principal cash box {}", source.id);
}
