//! Service layer for business logic.
//!
//! This module contains services that encapsulate layout file handling and
//! coordinate between the parser and the rest of the application.

pub mod layouts;

// Re-export commonly used types and functions
pub use layouts::LayoutService;
