//! Core business logic for Tesoro.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `movement` - Ledger movement types and validation
//! - `obligation` - Settlement state machine and payment application rules
//! - `split` - Split payment validation across funding sources
//! - `reconcile` - Balance recomputation from movement history
//! - `payment` - Payment attempt phases and outcome types

pub mod movement;
pub mod obligation;
pub mod payment;
pub mod reconcile;
pub mod split;
