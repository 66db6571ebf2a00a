//! Gatekeeper - Access Request Lifecycle Engine
//!
//! This crate turns free-form chat messages into structured access requests,
//! drives each request through a configurable approval workflow, and hands
//! off an idempotent provisioning command once a verdict is reached.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
