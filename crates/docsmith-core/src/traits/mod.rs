//! Traits shared between the host build tool and its plugins.

pub mod plugin;

pub use plugin::Plugin;
