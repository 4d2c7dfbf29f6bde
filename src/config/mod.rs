//! Runtime configuration.

pub mod demo;

pub use demo::DemoConfig;
