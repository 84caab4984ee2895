//! Triage Loader - troubleshoot spec ingestion
//!
//! Turns arbitrary YAML input into one canonical [`TroubleshootKinds`]
//! aggregate:
//!
//! 1. split multi-document text on `---`
//! 2. classify each document from its header (`kind`, `apiVersion`)
//! 3. unwrap specs embedded in `v1` Secrets and ConfigMaps
//! 4. canonicalize legacy API versions to `troubleshoot.sh/v1beta2`
//! 5. decode into the concrete kind and append to the aggregate
//!
//! # Example
//!
//! ```
//! use triage_loader::{LoadOptions, load_specs};
//!
//! let raw = "apiVersion: troubleshoot.sh/v1beta2\nkind: Collector\nmetadata:\n  name: c\n";
//! let kinds = load_specs(LoadOptions::new(vec![raw.to_string()])).unwrap();
//! assert_eq!(kinds.collectors.len(), 1);
//! ```

pub mod canonical;
pub mod classify;
pub mod error;
pub mod kinds;
pub mod loader;
pub mod registry;
pub mod split;
pub mod wrapper;

pub use canonical::{ApiVersionRewriter, CanonicalizeError, Canonicalizer};
pub use error::{LoadError, Result};
pub use kinds::{SpecKind, TroubleshootKind, TroubleshootKinds};
pub use loader::{LoadOptions, SpecLoader, load_specs};
pub use registry::SpecRegistry;
pub use split::{DOCUMENT_SEPARATOR, split_documents};
