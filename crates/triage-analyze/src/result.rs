//! Analyzer verdicts

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pass,
    Warn,
    Fail,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pass => "pass",
            Status::Warn => "warn",
            Status::Fail => "fail",
        }
    }
}

/// The result of running one analyzer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    pub title: String,

    pub status: Status,

    pub message: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon_key: String,

    /// Copied from the analyzer's `strict` flag
    #[serde(default)]
    pub strict: bool,
}

impl AnalyzeResult {
    pub fn new(title: impl Into<String>, status: Status, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status,
            message: message.into(),
            uri: String::new(),
            icon_key: String::new(),
            strict: false,
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    pub fn with_icon_key(mut self, icon_key: impl Into<String>) -> Self {
        self.icon_key = icon_key.into();
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn is_pass(&self) -> bool {
        self.status == Status::Pass
    }

    pub fn is_warn(&self) -> bool {
        self.status == Status::Warn
    }

    pub fn is_fail(&self) -> bool {
        self.status == Status::Fail
    }
}
