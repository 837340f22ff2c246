//! # FIDO Review Common Library
//!
//! Shared code for the FIDO review portal services:
//! - Error taxonomy
//! - Data folder and configuration file resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
