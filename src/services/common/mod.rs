//! Common utilities shared by services

/// Reactive value cell with change notification
pub mod property;

pub use property::Property;
