//! Triage Core - shared types for the troubleshoot spec pipeline
//!
//! This crate provides the foundational types used throughout triage:
//! - `spec`: the v1beta2 spec kinds, collector and analyzer entries, outcomes
//! - `evidence`: path-keyed artifact storage read by analyzers
//! - `artifacts`: JSON formats written by collectors
//! - `archive`: `.tar.gz` bundle reading and writing
//! - `config`: runtime configuration

pub mod archive;
pub mod artifacts;
pub mod config;
pub mod constants;
pub mod error;
pub mod evidence;
pub mod multitype;
pub mod spec;

pub use config::TriageConfig;
pub use error::{CoreError, Result};
pub use evidence::{DirectoryEvidence, EvidenceStore, MemoryEvidence};
pub use multitype::BoolOrString;
