//! OSINT Credits API Library
//!
//! This library provides the core functionality for the credit-gated OSINT
//! lookup broker: wallet-gated investigation requests against an external
//! intelligence provider, and payment-order reconciliation against the
//! Razorpay gateway.
//!
//! # Modules
//!
//! - `auth`: Session resolution (request context -> authenticated identity).
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `errors`: Error handling types.
//! - `handlers`: Investigation HTTP handlers and shared state.
//! - `lookup_client`: External lookup provider client.
//! - `models`: Core data models and wire types.
//! - `normalizer`: Allow-list narrowing of sensitive lookup payloads.
//! - `payment_handlers`: Payment order and verification handlers.
//! - `razorpay_client`: Razorpay gateway client and signature verification.
//! - `wallet`: Atomic credit debit/credit operations.

pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod lookup_client;
pub mod models;
pub mod normalizer;
pub mod payment_handlers;
pub mod razorpay_client;
pub mod wallet;
