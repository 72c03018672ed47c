//! # Cryptopay Hex
//!
//! Application service layer and HTTP adapter for the crypto payment engine.
//!
//! ## Architecture
//!
//! - `service` - Application service (compliance review, quoting, webhooks)
//! - `lifecycle` - Payment state machine over the active store and archive
//! - `poller` - One status-polling task per active payment
//! - `webhook` - Inbound webhook authentication
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! Every outbound dependency is injected through the port traits of
//! `cryptopay-types`, so the service runs unchanged against simulated or
//! real adapters.

pub mod inbound;
pub mod lifecycle;
pub mod openapi;
pub mod poller;
pub mod service;
pub mod webhook;


pub use service::{PaymentService, ServicePorts, ServiceSettings};
