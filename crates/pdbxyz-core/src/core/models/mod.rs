//! # Core Models Module
//!
//! Data structures for atomic configurations as they pass through the converters.
//!
//! ## Key Components
//!
//! - [`structure`] - A single atomic configuration with symbols, positions, cell and metadata
//! - [`connectivity`] - Ordered bond table and its text-block rendering
//! - [`info`] - Insertion-ordered, format-agnostic metadata map
//!
//! ## Usage
//!
//! ```ignore
//! use pdbxyz::core::models::structure::Structure;
//!
//! let mut structure = Structure::new();
//! structure.push_atom("O", Point3::new(0.0, 0.0, 0.0));
//! structure.push_atom("H", Point3::new(0.96, 0.0, 0.0));
//! structure.connectivity.extend_partners(0, [1]);
//! structure.attach_connectivity();
//! ```

pub mod connectivity;
pub mod info;
pub mod structure;
