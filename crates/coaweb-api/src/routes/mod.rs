//! Route modules for the API server
//!
//! - entities: entity list, hierarchy anomalies, reload
//! - accounts: account list, tree view, toggle and collapse
//! - budget: budget vs realisasi
//!
//! Each module has a mod.rs with exports and an api.rs with the handlers.

pub mod accounts;
pub mod budget;
pub mod entities;
