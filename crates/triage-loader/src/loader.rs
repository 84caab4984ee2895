//! The spec ingestion pipeline
//!
//! ```text
//! raw text -> split -> classify -> (unwrap) -> canonicalize -> decode -> TroubleshootKinds
//! ```
//!
//! Malformed documents are skipped unless the loader is strict, in which case
//! the first one aborts the load. Invariant violations always abort.

use std::sync::Arc;

use tracing::debug;

use crate::canonical::{ApiVersionRewriter, Canonicalizer};
use crate::classify::{Classification, classify, decode_header};
use crate::error::{LoadError, Result};
use crate::kinds::TroubleshootKinds;
use crate::registry::{DecodedObject, RegistryError, SpecRegistry};
use crate::split::split_documents;
use crate::wrapper::{specs_from_configmap, specs_from_secret};

/// Options for [`load_specs`]
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Raw inputs, each possibly holding several documents
    pub raw_specs: Vec<String>,

    /// Fail on the first malformed document instead of skipping it
    pub strict: bool,
}

impl LoadOptions {
    pub fn new(raw_specs: Vec<String>) -> Self {
        Self {
            raw_specs,
            strict: false,
        }
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Load every troubleshoot spec found in `options.raw_specs`
pub fn load_specs(options: LoadOptions) -> Result<TroubleshootKinds> {
    SpecLoader::new(SpecRegistry::shared())
        .strict(options.strict)
        .load(&options.raw_specs)
}

/// A configured ingestion pipeline
#[derive(Clone)]
pub struct SpecLoader {
    registry: Arc<SpecRegistry>,
    canonicalizer: Arc<dyn Canonicalizer>,
    strict: bool,
}

impl SpecLoader {
    pub fn new(registry: Arc<SpecRegistry>) -> Self {
        Self {
            registry,
            canonicalizer: Arc::new(ApiVersionRewriter),
            strict: false,
        }
    }

    pub fn with_canonicalizer(mut self, canonicalizer: Arc<dyn Canonicalizer>) -> Self {
        self.canonicalizer = canonicalizer;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Run the pipeline over `raw_specs`.
    ///
    /// Returns nothing partial: either the full aggregate or an error.
    pub fn load<S: AsRef<str>>(&self, raw_specs: &[S]) -> Result<TroubleshootKinds> {
        let spec_docs = self.collect_spec_documents(raw_specs)?;
        let kinds = self.decode_spec_documents(spec_docs)?;

        debug!("Loaded {} troubleshoot specs successfully", kinds.len());
        Ok(kinds)
    }

    /// Skip in lenient mode, abort in strict mode
    fn skip_or_fail(&self, err: LoadError) -> Result<()> {
        if self.strict {
            Err(err)
        } else {
            debug!(error = %err, "skipping malformed document");
            Ok(())
        }
    }

    /// Split, classify and unwrap every input into troubleshoot documents
    fn collect_spec_documents<S: AsRef<str>>(&self, raw_specs: &[S]) -> Result<Vec<String>> {
        let mut spec_docs = Vec::new();

        for doc in split_documents(raw_specs) {
            let header = match decode_header(&doc) {
                Ok(header) => header,
                Err(source) => {
                    self.skip_or_fail(LoadError::Malformed {
                        document: doc,
                        source,
                    })?;
                    continue;
                }
            };

            match classify(&header) {
                class if class.is_wrapper() => {
                    spec_docs.extend(self.unwrap_document(doc)?);
                }
                Classification::Troubleshoot => spec_docs.push(doc),
                _ => debug!("Skip loading {:?} kind", header.kind),
            }
        }

        Ok(spec_docs)
    }

    /// Fully decode a wrapper and pull out its embedded specs
    fn unwrap_document(&self, doc: String) -> Result<Vec<String>> {
        match self.registry.decode(&doc) {
            Ok(DecodedObject::Secret(secret)) => Ok(specs_from_secret(&secret)),
            Ok(DecodedObject::ConfigMap(configmap)) => Ok(specs_from_configmap(&configmap)),
            Ok(DecodedObject::Spec(spec)) => Err(LoadError::NotAWrapper {
                kind: spec.kind().to_string(),
            }),
            Err(RegistryError::Unregistered { api_version, kind }) => {
                Err(LoadError::NotAWrapper {
                    kind: format!("{}/{}", api_version, kind),
                })
            }
            Err(RegistryError::Decode(source)) => {
                self.skip_or_fail(LoadError::WrapperDecode {
                    document: doc,
                    source,
                })?;
                Ok(Vec::new())
            }
        }
    }

    /// Canonicalize and decode each document, in order
    fn decode_spec_documents(&self, spec_docs: Vec<String>) -> Result<TroubleshootKinds> {
        let mut kinds = TroubleshootKinds::new();

        for doc in spec_docs {
            let converted = match self.canonicalizer.canonicalize(&doc) {
                Ok(converted) => converted,
                Err(source) => {
                    self.skip_or_fail(LoadError::Canonicalize {
                        document: doc,
                        source,
                    })?;
                    continue;
                }
            };

            match self.registry.decode(&converted) {
                Ok(DecodedObject::Spec(spec)) => kinds.push(spec),
                Ok(DecodedObject::Secret(_)) => {
                    return Err(LoadError::UnknownKind {
                        api_version: "v1".to_string(),
                        kind: "Secret".to_string(),
                    });
                }
                Ok(DecodedObject::ConfigMap(_)) => {
                    return Err(LoadError::UnknownKind {
                        api_version: "v1".to_string(),
                        kind: "ConfigMap".to_string(),
                    });
                }
                Err(RegistryError::Unregistered { api_version, kind }) => {
                    return Err(LoadError::UnknownKind { api_version, kind });
                }
                Err(RegistryError::Decode(source)) => {
                    self.skip_or_fail(LoadError::SpecDecode {
                        document: converted,
                        source,
                    })?;
                }
            }
        }

        Ok(kinds)
    }
}

impl Default for SpecLoader {
    fn default() -> Self {
        Self::new(SpecRegistry::shared())
    }
}

impl std::fmt::Debug for SpecLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecLoader")
            .field("registry", &self.registry)
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}
