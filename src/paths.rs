//! Group files in a directory into `{ifo, idx, dict}` triples (spec §4.A).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Recognized file-role suffixes, checked in priority order (longest/most specific first).
const SUFFIXES: &[&str] = &[".ifo", ".idx.gz", ".idx", ".dict.dz", ".dict"];

/// One complete `{.ifo, .idx(.gz), .dict(.dz)}` triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarDictFiles {
    pub ifo: PathBuf,
    pub idx: PathBuf,
    pub dict: PathBuf,
}

impl StarDictFiles {
    /// The dictionary's stem: the `.ifo` path with its suffix removed.
    pub fn stem(&self) -> String {
        strip_suffix(&self.ifo.to_string_lossy())
    }
}

/// Groups candidate paths by shared stem and emits a bundle for every stem that ended up with
/// exactly one `.ifo`, at least one index file, and at least one dict file.
///
/// Stems with fewer than all three roles are silently skipped (spec §7: this is the one component
/// allowed to drop inputs without erroring, since directory scans routinely see unrelated files).
/// Output order is unspecified.
#[derive(Debug, Default)]
pub struct StarDictFileCollection {
    groups: HashMap<String, Vec<PathBuf>>,
}

impl StarDictFileCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one candidate path in. Returns `true` if the path matched a recognized suffix and
    /// was recorded, `false` if it was ignored outright.
    pub fn push(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let text = path.to_string_lossy();
        let Some(suffix) = SUFFIXES.iter().find(|suf| text.ends_with(*suf)) else {
            return false;
        };
        let stem = text[..text.len() - suffix.len()].to_string();
        self.groups.entry(stem).or_default().push(path.to_path_buf());
        true
    }

    /// Feeds every entry of a directory listing in (non-recursive). I/O errors from the listing
    /// itself propagate; unreadable individual entries are skipped.
    pub fn push_dir(&mut self, dir: impl AsRef<Path>) -> std::io::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = match entry {
                Ok(e) => e,
                Err(_) => continue,
            };
            self.push(entry.path());
        }
        Ok(())
    }

    /// Emits a bundle for every stem with a complete triple. Preference order when both variants
    /// of a role are present: `.idx` over `.idx.gz`, `.dict` over `.dict.dz`.
    pub fn bundles(&self) -> Vec<StarDictFiles> {
        let mut out = Vec::new();
        for paths in self.groups.values() {
            let ifo = paths.iter().find(|p| ends_with(p, ".ifo"));
            let idx = pick(paths, ".idx", ".idx.gz");
            let dict = pick(paths, ".dict", ".dict.dz");
            if let (Some(ifo), Some(idx), Some(dict)) = (ifo, idx, dict) {
                out.push(StarDictFiles {
                    ifo: ifo.clone(),
                    idx: idx.clone(),
                    dict: dict.clone(),
                });
            }
        }
        out
    }
}

impl IntoIterator for StarDictFileCollection {
    type Item = StarDictFiles;
    type IntoIter = std::vec::IntoIter<StarDictFiles>;

    fn into_iter(self) -> Self::IntoIter {
        self.bundles().into_iter()
    }
}

fn ends_with(path: &Path, suffix: &str) -> bool {
    path.to_string_lossy().ends_with(suffix)
}

fn pick<'a>(paths: &'a [PathBuf], preferred: &str, fallback: &str) -> Option<&'a PathBuf> {
    paths
        .iter()
        .find(|p| ends_with(p, preferred))
        .or_else(|| paths.iter().find(|p| ends_with(p, fallback)))
}

fn strip_suffix(text: &str) -> String {
    match SUFFIXES.iter().find(|suf| text.ends_with(*suf)) {
        Some(suf) => text[..text.len() - suf.len()].to_string(),
        None => text.to_string(),
    }
}
