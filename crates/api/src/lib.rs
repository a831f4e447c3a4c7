//! HTTP API: product reads, the import notification webhook, and service wiring.

pub mod app;
