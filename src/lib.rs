//! Client deposit ranking: load a deposit sheet, rank clients per agency
//! and month, pivot the ranks across a month window and export to xlsx.
//!
//! The data layer is a set of free functions over an explicit, read-only
//! [`data::model::DepositDataset`]; the GUI in the binary only calls into it.

pub mod config;
pub mod data;
pub mod export;
pub mod report;
