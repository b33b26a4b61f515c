//! # oc-core
//!
//! Core types and utilities for the Ops Console.
//!
//! This crate provides the building blocks shared by the table layer and the CLI:
//! - Error types and the `ConsoleResult` alias
//! - Pagination wire types for partitioned result sets
//! - Sort direction
//! - Configuration types

pub mod config;
pub mod error;
pub mod pagination;

pub use error::*;
pub use pagination::*;
