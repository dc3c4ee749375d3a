//! Nucleus (ELN data hub) API integration
//!
//! - [`api::DataHubApi`] - the operations the export pipeline relies on
//! - [`client::NucleusClient`] - reqwest implementation over the HTTP API
//! - [`models`] - wire envelopes and payloads

pub mod api;
pub mod client;
pub mod models;

pub use api::DataHubApi;
pub use client::NucleusClient;
