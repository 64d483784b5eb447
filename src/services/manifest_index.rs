//! Capability manifest scanning.
//!
//! Each resource root may hold a `services/` directory with one manifest
//! file per capability, named after the capability. A manifest lists one
//! implementation identity per line; `#` starts a comment.
//!
//! Roots are scanned in the order given and candidates keep root order
//! then line order. An identity listed again (in the same or a later
//! manifest) is kept only at its first occurrence.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::errors::DiscoveryError;
use crate::domain::models::{ImplementationId, ManifestCandidate, ManifestOrigin};

/// Directory under each resource root that holds manifests.
pub const SERVICES_DIR: &str = "services";

/// Candidates per capability, in discovery order.
#[derive(Debug, Clone, Default)]
pub struct ManifestIndex {
    roots: Vec<PathBuf>,
    candidates: BTreeMap<String, Vec<ManifestCandidate>>,
    unreadable: BTreeMap<String, Vec<UnreadableManifest>>,
}

/// A manifest file that exists but could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableManifest {
    /// Manifest path.
    pub path: PathBuf,
    /// IO error message.
    pub reason: String,
}

impl ManifestIndex {
    /// Walk `roots` and index every manifest found.
    ///
    /// Missing roots and missing `services/` directories contribute
    /// nothing. A manifest that exists but cannot be read is recorded
    /// against its capability only; a `services/` directory that cannot
    /// be listed fails the scan.
    pub fn scan(roots: &[PathBuf]) -> Result<Self, DiscoveryError> {
        let mut index = Self {
            roots: roots.to_vec(),
            candidates: BTreeMap::new(),
            unreadable: BTreeMap::new(),
        };
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for root in roots {
            let services = root.join(SERVICES_DIR);
            if !services.is_dir() {
                tracing::debug!(path = %services.display(), "No services directory, skipping root");
                continue;
            }

            for path in manifest_files(&services)? {
                let Some(capability) = path.file_name().and_then(|n| n.to_str()) else {
                    continue;
                };
                let capability = capability.to_string();
                let entries = index.candidates.entry(capability.clone()).or_default();

                let bytes = match fs::read(&path) {
                    Ok(bytes) => bytes,
                    Err(error) => {
                        tracing::warn!(
                            capability = %capability,
                            path = %path.display(),
                            error = %error,
                            "Capability manifest unreadable"
                        );
                        index
                            .unreadable
                            .entry(capability)
                            .or_default()
                            .push(UnreadableManifest {
                                path,
                                reason: error.to_string(),
                            });
                        continue;
                    }
                };
                // Undecodable bytes only spoil the lines that contain them
                let content = String::from_utf8_lossy(&bytes);
                let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

                for candidate in parse_manifest(&capability, &path, content) {
                    if let Some(id) = &candidate.id {
                        if !seen.insert((capability.clone(), id.canonical())) {
                            tracing::debug!(
                                capability = %capability,
                                implementation = %id,
                                origin = %candidate.origin,
                                "Duplicate manifest entry ignored"
                            );
                            continue;
                        }
                    }
                    entries.push(candidate);
                }
            }
        }

        tracing::debug!(
            roots = index.roots.len(),
            capabilities = index.candidates.len(),
            "Scanned capability manifests"
        );
        Ok(index)
    }

    /// Candidates for `capability` in discovery order.
    pub fn candidates(&self, capability: &str) -> &[ManifestCandidate] {
        self.candidates.get(capability).map(Vec::as_slice).unwrap_or_default()
    }

    /// Manifests of `capability` that could not be read, in scan order.
    pub fn unreadable(&self, capability: &str) -> &[UnreadableManifest] {
        self.unreadable.get(capability).map(Vec::as_slice).unwrap_or_default()
    }

    /// Capability names with at least one manifest, sorted.
    pub fn capabilities(&self) -> impl Iterator<Item = &str> {
        self.candidates.keys().map(String::as_str)
    }

    /// Roots the index was built from.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

/// Manifest files in `dir`, sorted by name.
fn manifest_files(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let read_error = |source: std::io::Error| DiscoveryError::Manifest {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();

        // Skip dotfiles and editor temp files
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') || name.ends_with(".tmp") || name.ends_with(".swp") {
                continue;
            }
        }
        // Broken links are kept so the read failure is reported
        if !path.is_dir() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn parse_manifest(capability: &str, path: &Path, content: &str) -> Vec<ManifestCandidate> {
    content
        .lines()
        .enumerate()
        .filter_map(|(i, line)| {
            let raw = line.split('#').next().unwrap_or_default().trim();
            if raw.is_empty() {
                return None;
            }
            Some(ManifestCandidate {
                capability: capability.to_string(),
                raw: raw.to_string(),
                id: ImplementationId::parse(raw),
                origin: ManifestOrigin {
                    path: path.to_path_buf(),
                    line: i + 1,
                },
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(root: &Path, capability: &str, content: &str) {
        let services = root.join(SERVICES_DIR);
        fs::create_dir_all(&services).unwrap();
        fs::write(services.join(capability), content).unwrap();
    }

    fn ids(index: &ManifestIndex, capability: &str) -> Vec<String> {
        index
            .candidates(capability)
            .iter()
            .map(|c| c.raw.clone())
            .collect()
    }

    #[test]
    fn test_missing_root_is_empty() {
        let index = ManifestIndex::scan(&[PathBuf::from("/definitely/not/here")]).unwrap();
        assert!(index.candidates("Greeter").is_empty());
        assert_eq!(index.capabilities().count(), 0);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            dir.path(),
            "Greeter",
            "# greeters\n\ncom.x.FooGreeter  # the foo one\n   \ncom.x.BarGreeter\n",
        );

        let index = ManifestIndex::scan(&[dir.path().to_path_buf()]).unwrap();
        let candidates = index.candidates("Greeter");

        assert_eq!(ids(&index, "Greeter"), vec!["com.x.FooGreeter", "com.x.BarGreeter"]);
        assert_eq!(candidates[0].origin.line, 3);
        assert_eq!(candidates[1].origin.line, 5);
    }

    #[test]
    fn test_malformed_lines_are_kept_without_id() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "Greeter", "not a valid id\ncom.x.Foo\n");

        let index = ManifestIndex::scan(&[dir.path().to_path_buf()]).unwrap();
        let candidates = index.candidates("Greeter");

        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].id.is_none());
        assert!(candidates[1].id.is_some());
    }

    #[test]
    fn test_root_order_and_dedupe() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        write_manifest(first.path(), "Greeter", "com.x.A\ncom.x.B\ncom.x.A\n");
        write_manifest(second.path(), "Greeter", "com.x.C\ncom::x::B\n");

        let index = ManifestIndex::scan(&[
            first.path().to_path_buf(),
            second.path().to_path_buf(),
        ])
        .unwrap();

        assert_eq!(ids(&index, "Greeter"), vec!["com.x.A", "com.x.B", "com.x.C"]);
    }

    #[test]
    fn test_skips_dotfiles_and_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "Greeter", "com.x.A\n");
        write_manifest(dir.path(), ".Greeter", "com.x.Hidden\n");
        write_manifest(dir.path(), "Greeter.swp", "com.x.Swap\n");

        let index = ManifestIndex::scan(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(index.capabilities().collect::<Vec<_>>(), vec!["Greeter"]);
    }

    #[test]
    fn test_leading_bom_is_stripped() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "Greeter", "\u{feff}com.x.Foo\ncom.x.Bar\n");

        let index = ManifestIndex::scan(&[dir.path().to_path_buf()]).unwrap();
        let candidates = index.candidates("Greeter");

        assert_eq!(ids(&index, "Greeter"), vec!["com.x.Foo", "com.x.Bar"]);
        assert!(candidates.iter().all(|c| c.id.is_some()));
    }

    #[test]
    fn test_undecodable_bytes_spoil_only_their_line() {
        let dir = tempfile::tempdir().unwrap();
        let services = dir.path().join(SERVICES_DIR);
        fs::create_dir_all(&services).unwrap();
        fs::write(services.join("Greeter"), b"com.x.Caf\xe9\ncom.x.Fine\n").unwrap();

        let index = ManifestIndex::scan(&[dir.path().to_path_buf()]).unwrap();
        let candidates = index.candidates("Greeter");

        assert_eq!(candidates.len(), 2);
        assert!(candidates[0].id.is_none());
        assert_eq!(candidates[1].id.as_ref().map(ImplementationId::as_str), Some("com.x.Fine"));
        assert!(index.unreadable("Greeter").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_manifest_is_recorded_per_capability() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "Greeter", "com.x.Foo\n");
        std::os::unix::fs::symlink(
            dir.path().join("missing-target"),
            dir.path().join(SERVICES_DIR).join("Other"),
        )
        .unwrap();

        let index = ManifestIndex::scan(&[dir.path().to_path_buf()]).unwrap();

        assert_eq!(ids(&index, "Greeter"), vec!["com.x.Foo"]);
        assert!(index.unreadable("Greeter").is_empty());
        assert_eq!(index.unreadable("Other").len(), 1);
        assert!(index.candidates("Other").is_empty());
        assert_eq!(index.capabilities().collect::<Vec<_>>(), vec!["Greeter", "Other"]);
    }
}
