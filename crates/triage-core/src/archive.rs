//! `.tar.gz` support bundles
//!
//! A bundle is a gzip-compressed tarball whose entries are the evidence
//! artifacts, optionally nested under a single top-level directory
//! (`support-bundle-2024-01-01T00_00_00/...`).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tar::{Archive, Builder, Header};

use crate::error::{CoreError, Result};
use crate::evidence::MemoryEvidence;

/// Returns true when the path looks like a gzip tarball
pub fn is_archive(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    name.ends_with(".tar.gz") || name.ends_with(".tgz")
}

/// Write every artifact into a new archive under `prefix/`
pub fn write_archive(evidence: &MemoryEvidence, prefix: &str, output: &Path) -> Result<()> {
    let file = File::create(output)?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);

    for (path, content) in evidence.iter() {
        let name = if prefix.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", prefix.trim_end_matches('/'), path)
        };

        let mut header = Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, &name, content)
            .map_err(|e| CoreError::Archive {
                message: format!("failed to add {}: {}", name, e),
            })?;
    }

    let encoder = builder.into_inner()?;
    encoder.finish()?;
    Ok(())
}

/// Read a bundle archive fully into memory
///
/// When every entry shares one top-level directory, that directory is
/// stripped so artifact paths match what collectors wrote.
pub fn read_archive(path: &Path) -> Result<MemoryEvidence> {
    let file = File::open(path)?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let mut entries = Vec::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let name = entry.path()?.to_string_lossy().replace('\\', "/");
        let mut content = Vec::new();
        entry.read_to_end(&mut content)?;
        entries.push((name, content));
    }

    let strip = common_root(entries.iter().map(|(n, _)| n.as_str()));

    let mut evidence = MemoryEvidence::new();
    for (name, content) in entries {
        let relative = match &strip {
            Some(root) => name
                .strip_prefix(root.as_str())
                .map(|s| s.trim_start_matches('/').to_string())
                .unwrap_or(name),
            None => name,
        };
        evidence.insert(relative, content);
    }

    Ok(evidence)
}

/// Shared top-level directory, only when it wraps nested artifact paths
fn common_root<'a>(mut names: impl Iterator<Item = &'a str>) -> Option<String> {
    let split = |name: &'a str| -> Option<(&'a str, &'a str)> {
        let (root, rest) = name.trim_start_matches("./").split_once('/')?;
        rest.contains('/').then_some((root, rest))
    };

    let (root, _) = split(names.next()?)?;
    for name in names {
        match split(name) {
            Some((r, _)) if r == root => {}
            _ => return None,
        }
    }
    Some(root.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evidence::EvidenceStore;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read_strips_prefix() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("bundle.tar.gz");

        let evidence = MemoryEvidence::new()
            .with_file("image-signatures/app.json", "{}")
            .with_file("system/block_devices.json", "[]");
        write_archive(&evidence, "support-bundle", &output).unwrap();

        let loaded = read_archive(&output).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.get("image-signatures/app.json").unwrap(), b"{}");
        assert_eq!(
            loaded.glob("system/*").unwrap(),
            vec!["system/block_devices.json"]
        );
    }

    #[test]
    fn test_read_without_common_root() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("flat.tgz");

        let evidence = MemoryEvidence::new()
            .with_file("a/one.json", "1")
            .with_file("b/two.json", "2");
        write_archive(&evidence, "", &output).unwrap();

        let loaded = read_archive(&output).unwrap();
        assert!(loaded.exists("a/one.json"));
        assert!(loaded.exists("b/two.json"));
    }

    #[test]
    fn test_read_flat_single_directory_kept() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("sigs.tar.gz");

        let evidence = MemoryEvidence::new().with_file("image-signatures/app.json", "{}");
        write_archive(&evidence, "", &output).unwrap();

        let loaded = read_archive(&output).unwrap();
        assert!(loaded.exists("image-signatures/app.json"));
    }

    #[test]
    fn test_is_archive() {
        assert!(is_archive(Path::new("/tmp/bundle.tar.gz")));
        assert!(is_archive(Path::new("bundle.TGZ")));
        assert!(!is_archive(Path::new("bundle")));
    }
}
