//! Glottolog taxonomy provider.
//!
//! Locates a local Glottolog clone through the shared catalog configuration
//! file (`~/.config/cldf/catalog.ini`) and answers subtree queries against
//! the clone's `languoids/tree` directory, where every directory is named by
//! the glottocode of the languoid it represents and nesting mirrors the
//! family tree.

use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

const CATALOG_SECTION: &str = "catalogs";
const GLOTTOLOG_KEY: &str = "glottolog";

/// Errors raised while locating the clone or traversing the taxonomy.
#[derive(Debug, Error)]
pub enum GlottologError {
    /// The catalog configuration file could not be read.
    #[error("failed to read catalog config `{path}`: {source}")]
    ConfigUnreadable {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// No user configuration directory exists on this platform.
    #[error("no user configuration directory available to locate catalog.ini")]
    NoConfigDir,
    /// The configuration file does not register a glottolog clone.
    #[error("catalog config `{path}` has no `{GLOTTOLOG_KEY}` entry in [{CATALOG_SECTION}]")]
    CatalogNotConfigured {
        /// Path of the configuration file.
        path: PathBuf,
    },
    /// The clone directory is missing its `languoids/tree` data.
    #[error("`{path}` does not look like a glottolog clone (no languoids/tree)")]
    TreeMissing {
        /// The directory that was probed.
        path: PathBuf,
    },
    /// The requested glottocode does not exist in the taxonomy.
    #[error("glottocode `{glottocode}` not found in the taxonomy tree")]
    LanguoidNotFound {
        /// The code that failed to resolve.
        glottocode: String,
    },
    /// Directory traversal failed.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
}

/// The catalog configuration pointing at locally cloned reference data.
#[derive(Debug, Clone)]
pub struct Catalog {
    clone_dir: PathBuf,
}

impl Catalog {
    /// Reads the default configuration file under the user config directory.
    ///
    /// # Errors
    /// Returns [`GlottologError`] when no config directory exists, the file
    /// cannot be read, or it registers no glottolog clone.
    pub fn from_config() -> Result<Self, GlottologError> {
        let config_dir = dirs::config_dir().ok_or(GlottologError::NoConfigDir)?;
        Self::from_config_path(&config_dir.join("cldf").join("catalog.ini"))
    }

    /// Reads a specific catalog configuration file.
    ///
    /// # Errors
    /// Returns [`GlottologError::ConfigUnreadable`] when the file cannot be
    /// read and [`GlottologError::CatalogNotConfigured`] when it has no
    /// `glottolog` entry.
    pub fn from_config_path(path: &Path) -> Result<Self, GlottologError> {
        let text =
            std::fs::read_to_string(path).map_err(|source| GlottologError::ConfigUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
        let sections = parse_ini(&text);
        let clone_dir = sections
            .get(CATALOG_SECTION)
            .and_then(|entries| entries.get(GLOTTOLOG_KEY))
            .ok_or_else(|| GlottologError::CatalogNotConfigured {
                path: path.to_path_buf(),
            })?;
        Ok(Self {
            clone_dir: PathBuf::from(clone_dir),
        })
    }

    /// Returns the configured clone directory.
    #[must_use]
    pub fn clone_dir(&self) -> &Path {
        &self.clone_dir
    }
}

/// Handle onto an opened Glottolog clone.
#[derive(Debug, Clone)]
pub struct Glottolog {
    tree_root: PathBuf,
}

impl Glottolog {
    /// Opens a clone directory, validating its `languoids/tree` layout.
    ///
    /// # Errors
    /// Returns [`GlottologError::TreeMissing`] when the directory does not
    /// contain the taxonomy tree.
    pub fn open(clone_dir: &Path) -> Result<Self, GlottologError> {
        let tree_root = clone_dir.join("languoids").join("tree");
        if !tree_root.is_dir() {
            return Err(GlottologError::TreeMissing {
                path: clone_dir.to_path_buf(),
            });
        }
        Ok(Self { tree_root })
    }

    /// Resolves a glottocode to its languoid.
    ///
    /// # Errors
    /// Returns [`GlottologError::LanguoidNotFound`] when no directory in the
    /// tree carries the code, or [`GlottologError::Io`] when traversal fails.
    pub fn languoid(&self, glottocode: &str) -> Result<Languoid, GlottologError> {
        let dir = find_dir(&self.tree_root, glottocode)?.ok_or_else(|| {
            GlottologError::LanguoidNotFound {
                glottocode: glottocode.to_owned(),
            }
        })?;
        let name = languoid_name(&dir).unwrap_or_else(|| glottocode.to_owned());
        debug!(glottocode, name = %name, "resolved languoid");
        Ok(Languoid {
            glottocode: glottocode.to_owned(),
            name,
            dir,
        })
    }
}

/// One taxon in the language-family tree.
#[derive(Debug, Clone)]
pub struct Languoid {
    glottocode: String,
    name: String,
    dir: PathBuf,
}

impl Languoid {
    /// Returns the languoid's glottocode.
    #[must_use]
    pub fn glottocode(&self) -> &str {
        &self.glottocode
    }

    /// Returns the languoid's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enumerates the glottocodes of this languoid and every descendant.
    ///
    /// The set is inclusive: the languoid's own code is always a member, so
    /// filtering on the result keeps records of the subtree root itself.
    ///
    /// # Errors
    /// Returns [`GlottologError::Io`] when directory traversal fails.
    pub fn descendants(&self) -> Result<HashSet<String>, GlottologError> {
        let mut codes = HashSet::new();
        codes.insert(self.glottocode.clone());
        let mut pending = vec![self.dir.clone()];
        while let Some(dir) = pending.pop() {
            for entry in read_dir(&dir)? {
                let entry = entry.map_err(|source| GlottologError::Io {
                    path: dir.clone(),
                    source,
                })?;
                let path = entry.path();
                if path.is_dir() {
                    if let Some(code) = path.file_name().and_then(|n| n.to_str()) {
                        codes.insert(code.to_owned());
                    }
                    pending.push(path);
                }
            }
        }
        Ok(codes)
    }
}

fn read_dir(dir: &Path) -> Result<std::fs::ReadDir, GlottologError> {
    std::fs::read_dir(dir).map_err(|source| GlottologError::Io {
        path: dir.to_path_buf(),
        source,
    })
}

/// Depth-first search for the directory named `glottocode`.
fn find_dir(root: &Path, glottocode: &str) -> Result<Option<PathBuf>, GlottologError> {
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in read_dir(&dir)? {
            let entry = entry.map_err(|source| GlottologError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            if path.file_name().and_then(|n| n.to_str()) == Some(glottocode) {
                return Ok(Some(path));
            }
            pending.push(path);
        }
    }
    Ok(None)
}

/// Reads the display name from a languoid's `md.ini` (`[core] name`).
fn languoid_name(dir: &Path) -> Option<String> {
    let text = std::fs::read_to_string(dir.join("md.ini")).ok()?;
    parse_ini(&text)
        .get("core")
        .and_then(|entries| entries.get("name"))
        .cloned()
}

/// Minimal INI reader covering the two files this provider consumes:
/// `[section]` headers, `key = value` pairs, `;`/`#` comment lines.
fn parse_ini(text: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current = String::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            current = name.trim().to_owned();
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            sections
                .entry(current.clone())
                .or_default()
                .insert(key.trim().to_owned(), value.trim().to_owned());
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    /// Lays out a miniature clone:
    /// ocea1241 > poly1242 > {mota1237, fiji1243}; nucl1709 alongside.
    fn fake_clone(dir: &TempDir) -> PathBuf {
        let clone = dir.path().join("glottolog");
        let tree = clone.join("languoids").join("tree");
        let poly = tree.join("ocea1241").join("poly1242");
        fs::create_dir_all(poly.join("mota1237")).expect("create tree");
        fs::create_dir_all(poly.join("fiji1243")).expect("create tree");
        fs::create_dir_all(tree.join("nucl1709")).expect("create tree");
        fs::write(
            tree.join("ocea1241").join("md.ini"),
            "[core]\nname = Oceanic\nlevel = family\n",
        )
        .expect("write md.ini");
        fs::write(poly.join("md.ini"), "[core]\nname = Polynesian\n").expect("write md.ini");
        clone
    }

    #[test]
    fn descendants_are_inclusive_of_the_root() {
        let dir = TempDir::new().expect("temp dir");
        let clone = fake_clone(&dir);
        let glottolog = Glottolog::open(&clone).expect("clone layout is valid");
        let languoid = glottolog.languoid("poly1242").expect("code exists");
        assert_eq!(languoid.name(), "Polynesian");

        let codes = languoid.descendants().expect("traversal succeeds");
        let mut sorted: Vec<&str> = codes.iter().map(String::as_str).collect();
        sorted.sort_unstable();
        assert_eq!(sorted, ["fiji1243", "mota1237", "poly1242"]);
    }

    #[test]
    fn descendants_of_the_family_cover_the_whole_subtree() {
        let dir = TempDir::new().expect("temp dir");
        let clone = fake_clone(&dir);
        let glottolog = Glottolog::open(&clone).expect("clone layout is valid");
        let codes = glottolog
            .languoid("ocea1241")
            .expect("code exists")
            .descendants()
            .expect("traversal succeeds");
        assert_eq!(codes.len(), 4);
        assert!(!codes.contains("nucl1709"));
    }

    #[test]
    fn missing_md_ini_falls_back_to_the_code() {
        let dir = TempDir::new().expect("temp dir");
        let clone = fake_clone(&dir);
        let glottolog = Glottolog::open(&clone).expect("clone layout is valid");
        let languoid = glottolog.languoid("nucl1709").expect("code exists");
        assert_eq!(languoid.name(), "nucl1709");
    }

    #[test]
    fn unknown_code_is_reported() {
        let dir = TempDir::new().expect("temp dir");
        let clone = fake_clone(&dir);
        let glottolog = Glottolog::open(&clone).expect("clone layout is valid");
        let err = glottolog
            .languoid("zzzz9999")
            .expect_err("unknown code must fail");
        assert!(matches!(
            err,
            GlottologError::LanguoidNotFound { glottocode } if glottocode == "zzzz9999"
        ));
    }

    #[test]
    fn open_rejects_directories_without_a_tree() {
        let dir = TempDir::new().expect("temp dir");
        let err = Glottolog::open(dir.path()).expect_err("plain directory must fail");
        assert!(matches!(err, GlottologError::TreeMissing { .. }));
    }

    #[test]
    fn catalog_reads_the_clone_path() {
        let dir = TempDir::new().expect("temp dir");
        let config = dir.path().join("catalog.ini");
        fs::write(
            &config,
            "# cldf catalog registry\n[catalogs]\nconcepticon = /data/concepticon\nglottolog = /data/glottolog\n",
        )
        .expect("write config");
        let catalog = Catalog::from_config_path(&config).expect("config parses");
        assert_eq!(catalog.clone_dir(), Path::new("/data/glottolog"));
    }

    #[test]
    fn catalog_without_glottolog_entry_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let config = dir.path().join("catalog.ini");
        fs::write(&config, "[catalogs]\nconcepticon = /data/concepticon\n").expect("write config");
        let err = Catalog::from_config_path(&config).expect_err("entry must be present");
        assert!(matches!(err, GlottologError::CatalogNotConfigured { .. }));
    }

    #[test]
    fn missing_catalog_file_is_an_io_error() {
        let dir = TempDir::new().expect("temp dir");
        let err = Catalog::from_config_path(&dir.path().join("absent.ini"))
            .expect_err("missing file must fail");
        assert!(matches!(err, GlottologError::ConfigUnreadable { .. }));
    }

    #[rstest]
    #[case("[a]\nx = 1\n", "a", "x", Some("1"))]
    #[case("[a]\n; comment\nx=1\n", "a", "x", Some("1"))]
    #[case("x = 1\n[a]\ny = 2\n", "a", "x", None)]
    fn parse_ini_handles_sections_and_comments(
        #[case] text: &str,
        #[case] section: &str,
        #[case] key: &str,
        #[case] expected: Option<&str>,
    ) {
        let sections = parse_ini(text);
        let value = sections
            .get(section)
            .and_then(|entries| entries.get(key))
            .map(String::as_str);
        assert_eq!(value, expected);
    }
}
