//! Account routes - account list and tree view
//!
//! The tree keeps one expanded set per `?session=` name; a missing name
//! uses the configured default session.

pub mod api;

pub use api::{api_accounts, api_collapse, api_toggle, api_tree, SessionQuery};
