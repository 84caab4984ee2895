//! Triage Analyze - verdicts from collected evidence
//!
//! Analyzers reduce collected artifacts to a [`FactTable`] of named integer
//! counters, then walk their authored outcomes with the condition grammar in
//! [`condition`] to pick a pass, warn or fail verdict.

pub mod analyzer;
pub mod condition;
pub mod error;
pub mod facts;
pub mod image_signatures;
pub mod outcome;
pub mod result;
pub mod suggestions;

pub use analyzer::{Analyzer, analyze, analyzer_entries, analyzer_for};
pub use condition::{ConditionError, Operator, evaluate};
pub use error::{AnalyzeError, Result};
pub use facts::FactTable;
pub use image_signatures::{ImageSignaturesAnalyzer, SignatureCounts};
pub use outcome::{Verdict, evaluate_outcomes};
pub use result::{AnalyzeResult, Status};
