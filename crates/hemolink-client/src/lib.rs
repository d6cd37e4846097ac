//! Hemolink API Client
//!
//! This crate provides the network layer of the client:
//! - [`executor::ApiExecutor`]: authenticated request execution with a
//!   single, transparent expiry-refresh-retry cycle
//! - [`requests::BloodRequestClient`]: the donor-side blood request
//!   lifecycle built on top of it

pub mod error;
pub mod executor;
pub mod geolocate;
pub mod http;
pub mod requests;

pub use error::{ExecutorError, Result};
