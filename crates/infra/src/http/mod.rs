//! Thin reqwest wrapper with timeout and opt-in transport retry

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
