//! Core functionality for the sesame project
//!
//! This crate contains the types shared by the sesame authentication strategies:
//! the [`Claims`] payload bound into tokens, [`TokenId`] generation, signing keys and
//! options, the [`Clock`] abstraction, input validation, and the [`Strategy`] registry.
//!
//! The core crate is designed to be used as a dependency for strategies and is not
//! intended to be used directly by application code.
//!
pub mod claims;
pub mod clock;
pub mod error;
pub mod id;
pub mod signing;
pub mod strategy;
pub mod validation;

pub use claims::Claims;
pub use clock::{Clock, MockClock, SystemClock};
pub use error::{CryptoError, Error, ValidationError};
pub use id::{TokenId, TokenIdSpace};
pub use signing::{Algorithm, CompiledKey, KeyFamily, SignOptions, SigningKey, VerifyOptions};
pub use strategy::{Strategy, StrategyRegistry};
