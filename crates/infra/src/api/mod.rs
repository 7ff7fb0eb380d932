//! SaaSOptics API client

pub mod client;

pub use client::{SaasOpticsClient, SaasOpticsClientConfig};
