//! `SeaORM` Entity for the movements table.
//!
//! Movements are append-only: a reversal marks the row with `reversed_at`
//! and `reversed_by` instead of deleting it, so every sum over movements
//! must filter on `reversed_at IS NULL`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::MovementDirection;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub direction: MovementDirection,
    pub amount: Decimal,
    pub funding_source_id: Uuid,
    pub obligation_id: Option<Uuid>,
    pub payment_group_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub description: String,
    pub occurred_at: DateTimeWithTimeZone,
    pub recorded_by: Uuid,
    pub reversed_at: Option<DateTimeWithTimeZone>,
    pub reversed_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::funding_sources::Entity",
        from = "Column::FundingSourceId",
        to = "super::funding_sources::Column::Id"
    )]
    FundingSources,
    #[sea_orm(
        belongs_to = "super::obligations::Entity",
        from = "Column::ObligationId",
        to = "super::obligations::Column::Id"
    )]
    Obligations,
    #[sea_orm(
        belongs_to = "super::movement_categories::Entity",
        from = "Column::CategoryId",
        to = "super::movement_categories::Column::Id"
    )]
    MovementCategories,
}

impl Related<super::funding_sources::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FundingSources.def()
    }
}

impl Related<super::obligations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Obligations.def()
    }
}

impl Related<super::movement_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovementCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
