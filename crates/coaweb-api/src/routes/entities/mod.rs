//! Entity routes - entity list, anomalies and reload

pub mod api;

pub use api::{api_anomalies, api_entities, api_reload};
