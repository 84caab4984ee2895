//! Image signature analyzer
//!
//! Reads the artifact written by the image signatures collector and counts
//! signed, unsigned and failed images. Those counts are the facts its
//! outcomes are evaluated against.

use triage_core::artifacts::{IMAGE_SIGNATURES_DIR, ImageSignaturesInfo, image_signatures_path};
use triage_core::multitype::is_excluded;
use triage_core::spec::ImageSignaturesAnalyze;
use triage_core::{CoreError, EvidenceStore};

use crate::analyzer::Analyzer;
use crate::error::{AnalyzeError, Result};
use crate::facts::FactTable;
use crate::outcome::{evaluate_outcomes, first_fail};
use crate::result::{AnalyzeResult, Status};

const DEFAULT_TITLE: &str = "Image Signatures";
const ICON_KEY: &str = "kubernetes_image_signatures";
const NO_DATA_MESSAGE: &str = "No image signature data was collected";

/// Fact names exposed to conditions
pub const FACT_SIGNED: &str = "signed";
pub const FACT_UNSIGNED: &str = "unsigned";
pub const FACT_ERRORS: &str = "errors";

/// Per-state image counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignatureCounts {
    pub signed: i64,
    pub unsigned: i64,
    pub errors: i64,
}

impl SignatureCounts {
    pub fn from_info(info: &ImageSignaturesInfo) -> Self {
        let mut counts = Self::default();
        for image in &info.images {
            if !image.error.is_empty() {
                counts.errors += 1;
            } else if image.has_valid_signature() {
                counts.signed += 1;
            } else {
                counts.unsigned += 1;
            }
        }
        counts
    }

    pub fn total(&self) -> i64 {
        self.signed + self.unsigned + self.errors
    }

    pub fn facts(&self) -> FactTable {
        FactTable::new()
            .with(FACT_SIGNED, self.signed)
            .with(FACT_UNSIGNED, self.unsigned)
            .with(FACT_ERRORS, self.errors)
    }

    pub fn summary(&self) -> String {
        format!(
            "Analyzed {} images: {} signed, {} unsigned, {} errors",
            self.total(),
            self.signed,
            self.unsigned,
            self.errors
        )
    }
}

pub struct ImageSignaturesAnalyzer<'a> {
    spec: &'a ImageSignaturesAnalyze,
}

impl<'a> ImageSignaturesAnalyzer<'a> {
    pub fn new(spec: &'a ImageSignaturesAnalyze) -> Self {
        Self { spec }
    }

    /// Raw artifact bytes, or `None` when nothing usable was collected
    fn collected_data(&self, evidence: &dyn EvidenceStore) -> Result<Option<Vec<u8>>> {
        if !self.spec.collector_name.is_empty() {
            let path = image_signatures_path(&self.spec.collector_name);
            return match evidence.get(&path) {
                Ok(data) => Ok(Some(data)),
                Err(CoreError::EvidenceNotFound { .. }) => Ok(None),
                Err(source) => Err(AnalyzeError::Evidence {
                    title: self.title(),
                    source,
                }),
            };
        }

        let pattern = format!("{}/*.json", IMAGE_SIGNATURES_DIR);
        let paths = evidence
            .glob(&pattern)
            .map_err(|source| AnalyzeError::Evidence {
                title: self.title(),
                source,
            })?;

        match paths.first() {
            Some(path) => evidence
                .get(path)
                .map(Some)
                .map_err(|source| AnalyzeError::Evidence {
                    title: self.title(),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn no_data_result(&self) -> AnalyzeResult {
        let result = match first_fail(&self.spec.outcomes) {
            Some(fail) => AnalyzeResult::new(self.title(), Status::Fail, &fail.message)
                .with_uri(&fail.uri),
            None => AnalyzeResult::new(self.title(), Status::Fail, NO_DATA_MESSAGE),
        };
        result.with_icon_key(ICON_KEY)
    }

    fn strict(&self) -> bool {
        self.spec
            .meta
            .strict
            .as_ref()
            .is_some_and(|s| s.bool_or_default_false())
    }
}

impl Analyzer for ImageSignaturesAnalyzer<'_> {
    fn title(&self) -> String {
        if self.spec.meta.check_name.is_empty() {
            DEFAULT_TITLE.to_string()
        } else {
            self.spec.meta.check_name.clone()
        }
    }

    fn is_excluded(&self) -> Result<bool> {
        is_excluded(self.spec.meta.exclude.as_ref()).map_err(|source| AnalyzeError::Spec {
            title: self.title(),
            source,
        })
    }

    fn analyze(&self, evidence: &dyn EvidenceStore) -> Result<Vec<AnalyzeResult>> {
        let data = match self.collected_data(evidence)? {
            Some(data) if !data.is_empty() => data,
            _ => return Ok(vec![self.no_data_result().with_strict(self.strict())]),
        };

        let info: ImageSignaturesInfo =
            serde_json::from_slice(&data).map_err(|source| AnalyzeError::InvalidData {
                title: self.title(),
                source,
            })?;

        let counts = SignatureCounts::from_info(&info);
        let verdict = evaluate_outcomes(&self.spec.outcomes, &counts.facts()).map_err(|source| {
            AnalyzeError::Condition {
                title: self.title(),
                source,
            }
        })?;

        let message = if verdict.matched {
            verdict.message
        } else {
            counts.summary()
        };

        let result = AnalyzeResult::new(self.title(), verdict.status, message)
            .with_uri(verdict.uri)
            .with_icon_key(ICON_KEY)
            .with_strict(self.strict());

        Ok(vec![result])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::BoolOrString;
    use triage_core::MemoryEvidence;
    use triage_core::artifacts::{ImageSignatureData, Signature};
    use triage_core::spec::{AnalyzeMeta, Outcome, SingleOutcome};

    fn outcome(kind: &str, when: &str, message: &str) -> Outcome {
        let branch = Some(SingleOutcome {
            when: when.to_string(),
            message: message.to_string(),
            uri: String::new(),
        });
        match kind {
            "fail" => Outcome {
                fail: branch,
                ..Default::default()
            },
            "warn" => Outcome {
                warn: branch,
                ..Default::default()
            },
            _ => Outcome {
                pass: branch,
                ..Default::default()
            },
        }
    }

    fn spec(collector_name: &str, outcomes: Vec<Outcome>) -> ImageSignaturesAnalyze {
        ImageSignaturesAnalyze {
            meta: AnalyzeMeta::default(),
            collector_name: collector_name.to_string(),
            outcomes,
        }
    }

    fn signed(image: &str) -> ImageSignatureData {
        ImageSignatureData {
            image: image.to_string(),
            signatures: vec![Signature {
                verified: true,
                signature: "sig".to_string(),
                error: String::new(),
            }],
            error: String::new(),
        }
    }

    fn unsigned(image: &str) -> ImageSignatureData {
        ImageSignatureData {
            image: image.to_string(),
            signatures: vec![Signature {
                verified: false,
                signature: String::new(),
                error: "no signatures found for this image".to_string(),
            }],
            error: String::new(),
        }
    }

    fn evidence_with(path: &str, images: Vec<ImageSignatureData>) -> MemoryEvidence {
        let info = ImageSignaturesInfo { images };
        MemoryEvidence::new().with_file(path, serde_json::to_vec(&info).unwrap())
    }

    #[test]
    fn test_counts() {
        let info = ImageSignaturesInfo {
            images: vec![
                signed("a"),
                signed("b"),
                unsigned("c"),
                ImageSignatureData::failed("d", "registry access failed: connection timeout"),
            ],
        };
        let counts = SignatureCounts::from_info(&info);
        assert_eq!(
            counts,
            SignatureCounts {
                signed: 2,
                unsigned: 1,
                errors: 1
            }
        );
        assert_eq!(counts.summary(), "Analyzed 4 images: 2 signed, 1 unsigned, 1 errors");
    }

    #[test]
    fn test_pass_when_signed() {
        let evidence = evidence_with(
            "image-signatures/app.json",
            vec![signed("a"), signed("b"), signed("c"), unsigned("d")],
        );
        let spec = spec(
            "app",
            vec![
                outcome("fail", "errors > 0", "errors"),
                outcome("pass", "signed > 0", "some signed"),
            ],
        );

        let results = ImageSignaturesAnalyzer::new(&spec).analyze(&evidence).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_pass());
        assert_eq!(results[0].message, "some signed");
        assert_eq!(results[0].title, "Image Signatures");
        assert_eq!(results[0].icon_key, "kubernetes_image_signatures");
    }

    #[test]
    fn test_fail_on_unsigned() {
        let evidence = evidence_with("image-signatures/app.json", vec![unsigned("a")]);
        let spec = spec(
            "app",
            vec![
                outcome("fail", "unsigned > 0", "unsigned images"),
                outcome("pass", "", "ok"),
            ],
        );

        let results = ImageSignaturesAnalyzer::new(&spec).analyze(&evidence).unwrap();
        assert!(results[0].is_fail());
        assert_eq!(results[0].message, "unsigned images");
    }

    #[test]
    fn test_default_message_when_nothing_matches() {
        let evidence = evidence_with("image-signatures/app.json", vec![signed("a")]);
        let spec = spec("app", vec![outcome("fail", "errors > 0", "errors")]);

        let results = ImageSignaturesAnalyzer::new(&spec).analyze(&evidence).unwrap();
        assert!(results[0].is_pass());
        assert_eq!(
            results[0].message,
            "Analyzed 1 images: 1 signed, 0 unsigned, 0 errors"
        );
    }

    #[test]
    fn test_no_data_uses_first_fail_outcome() {
        let spec = spec(
            "missing",
            vec![
                outcome("pass", "", "fine"),
                outcome("fail", "errors > 0", "nothing collected"),
            ],
        );
        let results = ImageSignaturesAnalyzer::new(&spec)
            .analyze(&MemoryEvidence::new())
            .unwrap();
        assert!(results[0].is_fail());
        assert_eq!(results[0].message, "nothing collected");
    }

    #[test]
    fn test_no_data_default_message() {
        let spec = spec("", vec![outcome("pass", "", "fine")]);
        let results = ImageSignaturesAnalyzer::new(&spec)
            .analyze(&MemoryEvidence::new())
            .unwrap();
        assert!(results[0].is_fail());
        assert_eq!(results[0].message, "No image signature data was collected");
    }

    #[test]
    fn test_empty_artifact_counts_as_no_data() {
        let evidence = MemoryEvidence::new().with_file("image-signatures/app.json", Vec::new());
        let spec = spec("app", vec![]);
        let results = ImageSignaturesAnalyzer::new(&spec).analyze(&evidence).unwrap();
        assert!(results[0].is_fail());
    }

    #[test]
    fn test_glob_fallback_picks_first_sorted() {
        let evidence = evidence_with("image-signatures/b.json", vec![unsigned("x")])
            .with_file(
                "image-signatures/a.json",
                serde_json::to_vec(&ImageSignaturesInfo {
                    images: vec![signed("y")],
                })
                .unwrap(),
            );
        let spec = spec("", vec![outcome("fail", "unsigned > 0", "unsigned")]);

        let results = ImageSignaturesAnalyzer::new(&spec).analyze(&evidence).unwrap();
        assert!(results[0].is_pass());
    }

    #[test]
    fn test_invalid_json_is_error() {
        let evidence = MemoryEvidence::new().with_file("image-signatures/app.json", "not json");
        let spec = spec("app", vec![]);
        assert!(matches!(
            ImageSignaturesAnalyzer::new(&spec).analyze(&evidence),
            Err(AnalyzeError::InvalidData { .. })
        ));
    }

    #[test]
    fn test_bad_condition_is_error() {
        let evidence = evidence_with("image-signatures/app.json", vec![signed("a")]);
        let mut spec = spec("app", vec![outcome("fail", "bogus > 0", "x")]);
        spec.meta.check_name = "Signed images".to_string();

        let err = ImageSignaturesAnalyzer::new(&spec)
            .analyze(&evidence)
            .unwrap_err();
        assert_eq!(err.title(), "Signed images");
        assert!(matches!(err, AnalyzeError::Condition { .. }));
    }

    #[test]
    fn test_strict_and_exclude_flags() {
        let evidence = evidence_with("image-signatures/app.json", vec![signed("a")]);
        let mut spec = spec("app", vec![]);
        spec.meta.strict = Some(BoolOrString::String("true".to_string()));
        spec.meta.exclude = Some(BoolOrString::Bool(true));

        let analyzer = ImageSignaturesAnalyzer::new(&spec);
        assert!(analyzer.is_excluded().unwrap());
        assert!(analyzer.analyze(&evidence).unwrap()[0].strict);
    }
}
