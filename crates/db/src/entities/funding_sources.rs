//! `SeaORM` Entity for the funding_sources table.
//!
//! `current_balance` is a reconciled cache: the reconciler recomputes it
//! from the opening balance plus the full unreversed movement history. At
//! most one active cash box may carry `is_principal`, enforced by a partial
//! unique index.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::FundingSourceKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "funding_sources")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: FundingSourceKind,
    pub name: String,
    pub bank_account_number: Option<String>,
    pub is_principal: bool,
    pub is_active: bool,
    pub opening_balance: Decimal,
    pub current_balance: Decimal,
    pub linked_summary_account_id: Option<Uuid>,
    pub reconciled_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movements::Entity")]
    Movements,
    #[sea_orm(
        belongs_to = "super::summary_accounts::Entity",
        from = "Column::LinkedSummaryAccountId",
        to = "super::summary_accounts::Column::Id"
    )]
    SummaryAccounts,
}

impl Related<super::movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl Related<super::summary_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SummaryAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
