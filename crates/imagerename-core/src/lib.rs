//! # imagerename-core
//!
//! Core crate for ImageRename. Contains configuration schemas, the semantic
//! application events that drive plugin jobs, and the unified error system.
//!
//! This crate has **no** internal dependencies on other ImageRename crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;

pub use error::AppError;
pub use events::Event;
pub use result::AppResult;
