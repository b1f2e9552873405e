//! Shared client library for API types and HTTP clients.
//!
//! This library provides type definitions and HTTP client implementations
//! for the parcel tracking APIs we talk to. Types are always available, while
//! HTTP client code is gated behind the `client` feature.
//!
//! ## Use of `#[non_exhaustive]`
//!
//! We use `#[non_exhaustive]` on structs and enums to prevent users manually
//! constructing the types while still allowing their fields to be `pub` for
//! reading. Users must generally construct the types either by:
//! - Using constructors on the types
//! - Using builder methods
//! - Using deserialization

pub mod aftership;

/// The AfterShip tracking client.
#[cfg(feature = "client")]
pub type AfterShip = aftership::Client;

pub use aftership::ApiKey;
