//! Loading and writing projects.
//!
//! A project is either a directory tree or a JSON file map (`name → URL`)
//! as stored by the editor backend. In a file map, code lives in `data:`
//! URLs; assets point at remote storage and are loaded as empty
//! placeholders, since the migrator only reads their paths.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use spx_migrator_core::FileSet;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const ASSETS_PLACEHOLDER: &str = "assets/.keep";

#[derive(Debug, thiserror::Error)]
pub(crate) enum ProjectError {
    #[error("could not read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not write '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid file map '{path}': {source}")]
    FileMap {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid data URL for '{name}': {reason}")]
    DataUrl { name: String, reason: String },

    #[error("path '{0}' is not valid UTF-8")]
    NonUtf8Path(PathBuf),

    #[error("refusing to write '{0}' outside the output directory")]
    UnsafePath(String),
}

/// Where a project was loaded from; output is written back in the same form.
#[derive(Debug, Clone)]
pub(crate) enum Source {
    Dir,
    /// The original URL of every file.
    FileMap(BTreeMap<String, String>),
}

#[derive(Debug, Clone)]
pub(crate) struct Project {
    pub files: FileSet,
    pub source: Source,
    /// An `assets/` placeholder was added to a file map so the project scans.
    pub placeholder: bool,
}

impl Project {
    pub fn load(path: &Path) -> Result<Self, ProjectError> {
        let (files, source) = if path.is_dir() {
            (read_dir_files(path)?, Source::Dir)
        } else {
            let raw = fs::read_to_string(path).map_err(|source| ProjectError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            let urls: BTreeMap<String, String> =
                serde_json::from_str(&raw).map_err(|source| ProjectError::FileMap {
                    path: path.to_path_buf(),
                    source,
                })?;
            (fetch_files(&urls)?, Source::FileMap(urls))
        };
        let mut project = Project {
            files,
            source,
            placeholder: false,
        };
        project.ensure_assets();
        Ok(project)
    }

    /// The resource scan requires something under `assets/`. Stored file
    /// maps may omit an empty asset tree; a directory without one is left
    /// for the scanner to reject.
    fn ensure_assets(&mut self) {
        if !matches!(self.source, Source::FileMap(_)) {
            return;
        }
        if !self.files.keys().any(|p| p.starts_with("assets/")) {
            self.files.insert(ASSETS_PLACEHOLDER.to_owned(), Vec::new());
            self.placeholder = true;
        }
    }

    /// Drop the injected placeholder from migrated files.
    pub fn strip_placeholder(&self, files: &mut FileSet) {
        if self.placeholder {
            files.remove(ASSETS_PLACEHOLDER);
        }
    }

    /// The files as they were before migration, without the placeholder.
    pub fn original_files(&self) -> FileSet {
        let mut files = self.files.clone();
        self.strip_placeholder(&mut files);
        files
    }

    /// Write `files` to `out` in the same form the project was loaded from.
    pub fn write(&self, files: &FileSet, out: &Path) -> Result<(), ProjectError> {
        match &self.source {
            Source::Dir => write_dir(files, out),
            Source::FileMap(urls) => {
                let encoded = encode_file_map(files, urls);
                let json = serde_json::to_string_pretty(&encoded).map_err(|source| {
                    ProjectError::FileMap {
                        path: out.to_path_buf(),
                        source,
                    }
                })?;
                write_file(out, json.as_bytes())
            }
        }
    }
}

/// `<stem>_migrated.<ext>` for a file map, `<dir>_migrated` for a directory.
pub(crate) fn migrated_path(input: &Path) -> PathBuf {
    let lossy = |s: Option<&std::ffi::OsStr>| {
        s.map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let name = match input.extension() {
        Some(ext) if input.is_file() => format!(
            "{}_migrated.{}",
            lossy(input.file_stem()),
            ext.to_string_lossy()
        ),
        _ => format!("{}_migrated", lossy(input.file_name())),
    };
    input.with_file_name(name)
}

/// A sibling of `path` for the diff or skip marker: the extension is
/// replaced for file outputs and appended for directory outputs.
pub(crate) fn with_extension(path: &Path, ext: &str, replace: bool) -> PathBuf {
    if replace {
        return path.with_extension(ext);
    }
    let mut os = path.as_os_str().to_owned();
    os.push(".");
    os.push(ext);
    PathBuf::from(os)
}

fn read_dir_files(root: &Path) -> Result<FileSet, ProjectError> {
    let mut files = FileSet::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = fs::read_dir(&dir).map_err(|source| ProjectError::Read {
            path: dir.clone(),
            source,
        })?;
        for entry in entries {
            let path = entry
                .map_err(|source| ProjectError::Read {
                    path: dir.clone(),
                    source,
                })?
                .path();
            if path.is_dir() {
                pending.push(path);
                continue;
            }
            let key = project_key(root, &path)?;
            let content = fs::read(&path).map_err(|source| ProjectError::Read {
                path: path.clone(),
                source,
            })?;
            files.insert(key, content);
        }
    }
    Ok(files)
}

/// Slash-separated path of `path` relative to `root`.
fn project_key(root: &Path, path: &Path) -> Result<String, ProjectError> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let parts: Option<Vec<&str>> = rel.components().map(|c| c.as_os_str().to_str()).collect();
    parts
        .map(|p| p.join("/"))
        .ok_or_else(|| ProjectError::NonUtf8Path(path.to_path_buf()))
}

fn write_dir(files: &FileSet, out: &Path) -> Result<(), ProjectError> {
    for (name, content) in files {
        if name.split('/').any(|seg| seg == ".." || seg.is_empty()) || name.starts_with('/') {
            return Err(ProjectError::UnsafePath(name.clone()));
        }
        write_file(&out.join(name), content)?;
    }
    Ok(())
}

fn write_file(path: &Path, content: &[u8]) -> Result<(), ProjectError> {
    let write_err = |source| ProjectError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    fs::write(path, content).map_err(write_err)
}

// ── File maps ────────────────────────────────────────────────────────

fn fetch_files(urls: &BTreeMap<String, String>) -> Result<FileSet, ProjectError> {
    let mut files = FileSet::new();
    for (name, url) in urls {
        let content = if url.starts_with("data:") {
            decode_data_url(url).map_err(|reason| ProjectError::DataUrl {
                name: name.clone(),
                reason,
            })?
        } else {
            Vec::new()
        };
        files.insert(name.clone(), content);
    }
    Ok(files)
}

/// Decode `data:[<mediatype>][;base64],<data>`.
pub(crate) fn decode_data_url(url: &str) -> Result<Vec<u8>, String> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| "not a data URL".to_owned())?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| "missing comma".to_owned())?;
    if meta.contains(";base64") {
        return BASE64.decode(payload).map_err(|e| e.to_string());
    }
    percent_decode(payload)
}

/// Query-string unescaping: `%XX` escapes and `+` for space.
fn percent_decode(s: &str) -> Result<Vec<u8>, String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok())
                    .ok_or_else(|| format!("invalid escape at byte {i}"))?;
                out.push(hex);
                i += 3;
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Ok(out)
}

/// Class files become base64 `data:` URLs; everything else keeps its
/// original URL.
pub(crate) fn encode_file_map(
    files: &FileSet,
    original: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    files
        .iter()
        .map(|(name, content)| {
            let url = if name.ends_with(".spx") {
                format!("data:text/plain;base64,{}", BASE64.encode(content))
            } else if let Some(url) = original.get(name) {
                url.clone()
            } else {
                format!("data:application/octet-stream;base64,{}", BASE64.encode(content))
            };
            (name.clone(), url)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn data_urls() {
        assert_eq!(
            decode_data_url("data:text/plain;base64,cGxheSBiZ20K").unwrap(),
            b"play bgm\n"
        );
        assert_eq!(
            decode_data_url("data:text/plain,play%20%22bgm%22+now").unwrap(),
            b"play \"bgm\" now"
        );
        assert_eq!(decode_data_url("data:,").unwrap(), b"");
        assert!(decode_data_url("data:text/plain").is_err());
        assert!(decode_data_url("data:,%zz").is_err());
        assert!(decode_data_url("data:;base64,!!!").is_err());
    }

    #[test]
    fn file_map_round_trip_keeps_asset_urls() {
        let original: BTreeMap<String, String> = [
            ("main.spx".to_owned(), "data:,play%20bgm".to_owned()),
            ("assets/index.json".to_owned(), "kodo://bucket/index.json".to_owned()),
        ]
        .into();
        let files = fetch_files(&original).unwrap();
        assert_eq!(files["main.spx"], b"play bgm");
        assert!(files["assets/index.json"].is_empty());

        let mut migrated = files.clone();
        migrated.insert("main.spx".to_owned(), b"play \"bgm\"\n".to_vec());
        migrated.insert("extra.json".to_owned(), b"{}".to_vec());
        let encoded = encode_file_map(&migrated, &original);
        assert_eq!(encoded["main.spx"], "data:text/plain;base64,cGxheSAiYmdtIgo=");
        assert_eq!(encoded["assets/index.json"], "kodo://bucket/index.json");
        assert_eq!(encoded["extra.json"], "data:application/octet-stream;base64,e30=");
    }

    #[test]
    fn directory_projects_load_with_relative_keys() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("assets/sounds/bgm")).unwrap();
        fs::write(dir.path().join("main.spx"), "play bgm\n").unwrap();
        fs::write(dir.path().join("assets/sounds/bgm/index.json"), "{}").unwrap();

        let project = Project::load(dir.path()).unwrap();
        assert!(!project.placeholder);
        assert_eq!(
            project.files.keys().collect::<Vec<_>>(),
            ["assets/sounds/bgm/index.json", "main.spx"]
        );
    }

    #[test]
    fn placeholder_is_added_to_file_maps_and_stripped() {
        let dir = TempDir::new().unwrap();
        let map = dir.path().join("game.json");
        fs::write(&map, r#"{"main.spx": "data:,"}"#).unwrap();

        let project = Project::load(&map).unwrap();
        assert!(project.placeholder);
        assert!(project.files.contains_key(ASSETS_PLACEHOLDER));
        assert!(!project.original_files().contains_key(ASSETS_PLACEHOLDER));
    }

    #[test]
    fn directory_without_assets_gets_no_placeholder() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("main.spx"), "").unwrap();

        let project = Project::load(dir.path()).unwrap();
        assert!(!project.placeholder);
        assert_eq!(project.files.keys().collect::<Vec<_>>(), ["main.spx"]);
    }

    #[test]
    fn output_paths() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("game.json");
        fs::write(&file, "{}").unwrap();
        assert_eq!(migrated_path(&file), dir.path().join("game_migrated.json"));
        assert_eq!(
            with_extension(&migrated_path(&file), "diff", true),
            dir.path().join("game_migrated.diff")
        );

        let project = dir.path().join("game.v1");
        fs::create_dir(&project).unwrap();
        assert_eq!(migrated_path(&project), dir.path().join("game.v1_migrated"));
        assert_eq!(
            with_extension(&migrated_path(&project), "skip", false),
            dir.path().join("game.v1_migrated.skip")
        );
    }

    #[test]
    fn writing_rejects_escaping_paths() {
        let dir = TempDir::new().unwrap();
        let files: FileSet = [("../evil.spx".to_owned(), Vec::new())].into();
        assert!(matches!(
            write_dir(&files, dir.path()),
            Err(ProjectError::UnsafePath(_))
        ));
    }
}
