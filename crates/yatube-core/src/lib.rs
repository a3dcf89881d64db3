//! # Yatube Core
//!
//! Domain layer of the Yatube blog: entities, form validation,
//! pagination, the ports infrastructure implements and the services
//! built on top of them. No infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod forms;
pub mod pagination;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
