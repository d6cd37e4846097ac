//! Hemolink Core Types
//!
//! This crate provides the fundamental types shared across the Hemolink
//! client crates:
//! - Donation request model and its donor-visible lifecycle states
//! - Location descriptors and the geographic proximity filter
//! - Client-side listing filters
//! - Identities and roles

pub mod filter;
pub mod geo;
pub mod identity;
pub mod request;
