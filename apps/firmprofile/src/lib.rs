//! # firmprofile
//!
//! Application layer for the firmprofile pipeline: command line contract,
//! stage configuration and process-backed stage implementations around
//! `firmprofile-core`.

pub mod cli;
pub mod config;
pub mod stages;
