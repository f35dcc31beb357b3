//! `SeaORM` entity definitions.

pub mod funding_sources;
pub mod movement_categories;
pub mod movements;
pub mod obligations;
pub mod sea_orm_active_enums;
pub mod summary_accounts;
