//! # Workflows Module
//!
//! High-level conversion procedures built on the [`crate::core`] models and I/O.
//!
//! ## Overview
//!
//! Each workflow is a single-pass, sequential pipeline over a fixed list of
//! input files. Reads and writes happen one file at a time; the first failure
//! aborts the run and is returned to the caller unchanged.
//!
//! - **Directory Conversion** ([`convert`]) - One extxyz file per `.pdb` file in a directory
//! - **Merging** ([`merge`]) - Many PDB files into one merged frame or a multi-frame trajectory
//!
//! Configuration types live in [`config`], errors in [`error`], and progress
//! events for front-ends in [`progress`].

pub mod config;
pub mod convert;
pub mod error;
pub mod merge;
pub mod progress;
