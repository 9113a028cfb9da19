//! # docsmith-core
//!
//! Core crate for Docsmith plugins. Contains the lifecycle-event
//! enumeration, the plugin trait, the event context type, declarative
//! configuration-scheme primitives, logging configuration, and the
//! unified error system.
//!
//! This crate has **no** internal dependencies on other Docsmith crates.

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod result;
pub mod scheme;
pub mod traits;

pub use context::EventContext;
pub use error::AppError;
pub use events::LifecycleEvent;
pub use result::AppResult;
