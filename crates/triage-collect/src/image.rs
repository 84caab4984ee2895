//! Image reference parsing

use oci_distribution::Reference;

use crate::error::{CollectError, Result};

/// Parse an image name as a registry reference.
///
/// Short names resolve against Docker Hub (`nginx` becomes
/// `docker.io/library/nginx:latest`).
pub fn parse_image(image: &str) -> Result<Reference> {
    let clean = image.trim().trim_start_matches("docker://");

    Reference::try_from(clean).map_err(|e| CollectError::ImageReference {
        image: image.to_string(),
        message: e.to_string(),
    })
}

/// Message recorded for an image that does not parse
pub fn image_error_message(image: &str, err: &CollectError) -> String {
    match err {
        CollectError::ImageReference { message, .. }
            if message.contains("invalid reference format") =>
        {
            format!("invalid image name format: {}", image)
        }
        CollectError::ImageReference { message, .. } => {
            format!("failed to parse image name: {}", message)
        }
        other => format!("failed to parse image name: {}", other),
    }
}

/// The `sha256-<hex>.sig` tag cosign stores signatures under
pub fn signature_tag(digest: &str) -> String {
    format!("{}.sig", digest.replace(':', "-"))
}

/// Reference to the signature manifest of an image with manifest `digest`
pub fn signature_reference(image: &Reference, digest: &str) -> Result<Reference> {
    let full = format!(
        "{}/{}:{}",
        image.registry(),
        image.repository(),
        signature_tag(digest)
    );
    parse_image(&full)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_name() {
        let reference = parse_image("nginx:1.25").unwrap();
        assert_eq!(reference.registry(), "docker.io");
        assert_eq!(reference.repository(), "library/nginx");
        assert_eq!(reference.tag(), Some("1.25"));
    }

    #[test]
    fn test_parse_private_registry() {
        let reference = parse_image("registry.example.com:5000/team/app:v2").unwrap();
        assert_eq!(reference.registry(), "registry.example.com:5000");
        assert_eq!(reference.repository(), "team/app");
        assert_eq!(reference.tag(), Some("v2"));
    }

    #[test]
    fn test_invalid_image_message() {
        let err = parse_image("INVALID::image").unwrap_err();
        let message = image_error_message("INVALID::image", &err);
        assert!(
            message == "invalid image name format: INVALID::image"
                || message.starts_with("failed to parse image name:"),
            "{message}"
        );
    }

    #[test]
    fn test_signature_reference() {
        let image = parse_image("ghcr.io/org/app:1.0").unwrap();
        let sig = signature_reference(&image, "sha256:abc123").unwrap();
        assert_eq!(sig.registry(), "ghcr.io");
        assert_eq!(sig.repository(), "org/app");
        assert_eq!(sig.tag(), Some("sha256-abc123.sig"));
    }
}
