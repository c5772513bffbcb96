//! Budget routes - budget vs realisasi

pub mod api;

pub use api::api_variance;
