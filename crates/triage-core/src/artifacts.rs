//! Artifact formats shared by collectors and analyzers

use serde::{Deserialize, Serialize};

/// Directory holding image signature artifacts
pub const IMAGE_SIGNATURES_DIR: &str = "image-signatures";

/// Path of the block device artifact
pub const BLOCK_DEVICES_PATH: &str = "system/block_devices.json";

/// Artifact path for an image signatures collector
pub fn image_signatures_path(collector_name: &str) -> String {
    let name = if collector_name.is_empty() {
        "signatures"
    } else {
        collector_name
    };
    format!("{}/{}.json", IMAGE_SIGNATURES_DIR, name)
}

/// Content of `image-signatures/<name>.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSignaturesInfo {
    #[serde(default)]
    pub images: Vec<ImageSignatureData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageSignatureData {
    pub image: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<Signature>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

impl ImageSignatureData {
    pub fn failed(image: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            signatures: Vec::new(),
            error: error.into(),
        }
    }

    /// At least one verified signature without an error
    pub fn has_valid_signature(&self) -> bool {
        self.signatures.iter().any(|s| s.verified && s.error.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub verified: bool,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signature: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_path() {
        assert_eq!(image_signatures_path("app"), "image-signatures/app.json");
        assert_eq!(image_signatures_path(""), "image-signatures/signatures.json");
    }

    #[test]
    fn test_json_shape() {
        let info = ImageSignaturesInfo {
            images: vec![
                ImageSignatureData {
                    image: "nginx:1.25".to_string(),
                    signatures: vec![Signature {
                        verified: true,
                        signature: "MEUCIQ".to_string(),
                        error: String::new(),
                    }],
                    error: String::new(),
                },
                ImageSignatureData::failed("bad", "invalid image name format: bad"),
            ],
        };

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["images"][0]["signatures"][0]["verified"], true);
        assert!(json["images"][0].get("error").is_none());
        assert!(json["images"][1].get("signatures").is_none());
        assert!(info.images[0].has_valid_signature());
        assert!(!info.images[1].has_valid_signature());
    }
}
