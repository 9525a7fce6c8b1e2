//! Core data models for the asset gallery.
//!
//! `object` mirrors what the bucket holds, `analysis` what label detection
//! produces, and `envelope` the request/response shapes both functions speak.

pub mod analysis;
pub mod envelope;
pub mod object;
