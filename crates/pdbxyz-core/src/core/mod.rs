//! # Core Module
//!
//! The stateless foundation of the converter: the in-memory structure model,
//! the connectivity translation, and format readers and writers.
//!
//! ## Architecture
//!
//! - **Structure Representation** ([`models`]) - Atoms, cell, connectivity table and info metadata
//! - **File I/O** ([`io`]) - PDB reading plus extxyz writing and reading
//! - **Utilities** ([`utils`]) - Element symbol lookup and inference
//!
//! Nothing in this module touches the file system on its own except the
//! path-based helpers on the I/O traits.

pub mod io;
pub mod models;
pub mod utils;
