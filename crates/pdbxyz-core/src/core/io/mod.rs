//! Provides input/output functionality for structure file formats.
//!
//! Readers and writers share the trait-based interface in [`traits`]; PDB is
//! read-only here, while extxyz is both written and read back.

pub mod extxyz;
pub mod pdb;
pub mod traits;
