//! Core types and utilities for bazaar.
//!
//! This crate provides the foundational types shared by the gateway, the RPC
//! client and the session store:
//!
//! - **Identifiers**: strongly-typed subject IDs, session tokens and
//!   correlation IDs
//! - **Endpoints**: the fixed registry of logical RPC operation names
//! - **Models**: JSON payload shapes relayed to the backend services
//!
//! # Example
//!
//! ```
//! use bazaar_core::{endpoints, CorrelationId, SessionToken, SubjectId};
//!
//! let subject = SubjectId::new("42").unwrap();
//! let token = SessionToken::generate();
//! let correlation_id = CorrelationId::generate();
//!
//! assert!(endpoints::is_known(endpoints::USERS_CREATE));
//! assert_eq!(token.as_str().len(), 64);
//! # let _ = (subject, correlation_id);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod endpoints;
pub mod ids;
pub mod models;

pub use ids::{CorrelationId, IdError, SessionToken, SubjectId};
pub use models::{Credentials, LoginResponse, Order, Product, User};
