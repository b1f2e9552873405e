//! Library for `parcel`.
//!
//! Holds the parts of the tracker shared by the `parcel` CLI and the
//! `parcel-web` form server: courier code normalization and the submit flow
//! that reconciles duplicate trackings.

pub mod courier;
pub mod track;

pub use courier::{Normalized, Normalizer, canonicalize};
pub use track::{Outcome, Tracked, TrackingApi, submit};
