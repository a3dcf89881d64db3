//! # Yatube Shared
//!
//! Types exchanged with clients: request payloads, the view models every
//! page renders from, and the RFC 7807 error body.

pub mod dto;
pub mod response;
pub mod views;

pub use response::ErrorResponse;
