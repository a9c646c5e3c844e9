//! # pdbxyz Core Library
//!
//! Converts Protein Data Bank structures into the extended XYZ (extxyz) format,
//! carrying `CONECT` bonds across as a `connectivity` metadata block and `CRYST1`
//! cells across as the frame lattice.
//!
//! ## Architecture
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Structure`,
//!   `ConnectivityTable`, `InfoMap`) and the PDB and extxyz readers and writers.
//!
//! - **[`workflows`]: The Public API.** Complete conversion procedures: converting
//!   a directory of PDB files one-to-one, and merging many PDB files into a single
//!   frame or a multi-frame trajectory.

pub mod core;
pub mod workflows;
