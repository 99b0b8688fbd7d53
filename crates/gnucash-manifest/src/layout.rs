use std::path::PathBuf;

use serde::Serialize;

use crate::{error::ManifestError, manifest::BindingManifest};

pub const ENV_SRC: &str = "GNUCASH_SRC";
pub const ENV_BUILD: &str = "GNUCASH_BUILD";
pub const ENV_LIB: &str = "GNUCASH_LIB_PATH";

const DEFAULT_SRC: &str = "../gnucash";
const DEFAULT_BUILD: &str = "../gnucash/build";

/// Where a GnuCash checkout and its build output live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLayout {
    pub src_dir: PathBuf,
    pub build_dir: PathBuf,
    pub lib_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedHeader {
    pub name: String,
    pub path: PathBuf,
}

impl SourceLayout {
    pub fn new(src_dir: impl Into<PathBuf>, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            src_dir: src_dir.into(),
            build_dir: build_dir.into(),
            lib_dir: None,
        }
    }

    pub fn with_lib_dir(mut self, lib_dir: impl Into<PathBuf>) -> Self {
        self.lib_dir = Some(lib_dir.into());
        self
    }

    /// Explicit paths win, then the process environment, then the defaults
    /// of a sibling `../gnucash` checkout.
    pub fn resolve(src: Option<PathBuf>, build: Option<PathBuf>, lib: Option<PathBuf>) -> Self {
        Self::resolve_with(src, build, lib, |key| std::env::var(key).ok())
    }

    pub fn resolve_with<F>(src: Option<PathBuf>, build: Option<PathBuf>, lib: Option<PathBuf>, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let from_env = |key: &str| env(key).filter(|v| !v.is_empty()).map(PathBuf::from);

        let src_dir = src
            .or_else(|| from_env(ENV_SRC))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SRC));
        let build_dir = build
            .or_else(|| from_env(ENV_BUILD))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BUILD));
        let lib_dir = lib.or_else(|| from_env(ENV_LIB));

        Self {
            src_dir,
            build_dir,
            lib_dir,
        }
    }

    pub fn include_dirs(&self) -> Vec<PathBuf> {
        let candidates = [
            self.src_dir.join("libgnucash").join("engine"),
            self.src_dir.join("libgnucash").join("core-utils"),
            self.build_dir.join("common"),
        ];

        let mut dirs: Vec<PathBuf> = Vec::with_capacity(candidates.len());
        for dir in candidates {
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
        dirs
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.lib_dir
            .clone()
            .unwrap_or_else(|| self.build_dir.join("lib"))
    }

    /// Finds each manifest header in the include path. Every missing header
    /// is reported, not just the first.
    pub fn locate(&self, manifest: &BindingManifest) -> Result<Vec<LocatedHeader>, ManifestError> {
        let include_dirs = self.include_dirs();
        let mut found = Vec::new();
        let mut missing = Vec::new();

        for header in &manifest.headers {
            match find_in(&include_dirs, &header.name) {
                Some(path) => {
                    tracing::debug!(header = %header.name, path = %path.display(), "Located header");
                    found.push(LocatedHeader {
                        name: header.name.clone(),
                        path,
                    });
                }
                None => missing.push(header.name.clone()),
            }
        }

        if missing.is_empty() {
            Ok(found)
        } else {
            tracing::warn!(missing = missing.len(), "Headers missing from include path");
            Err(ManifestError::MissingHeaders(missing))
        }
    }
}

fn find_in(dirs: &[PathBuf], name: &str) -> Option<PathBuf> {
    dirs.iter()
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, fs};

    use super::*;
    use crate::headers::{Header, HeaderGroup};

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_resolve_defaults() {
        let layout = SourceLayout::resolve_with(None, None, None, env_of(&[]));
        assert_eq!(layout.src_dir, PathBuf::from("../gnucash"));
        assert_eq!(layout.build_dir, PathBuf::from("../gnucash/build"));
        assert_eq!(layout.lib_dir(), PathBuf::from("../gnucash/build/lib"));
    }

    #[test]
    fn test_resolve_precedence() {
        let env = env_of(&[(ENV_SRC, "/env/src"), (ENV_BUILD, "/env/build"), (ENV_LIB, "")]);
        let layout = SourceLayout::resolve_with(Some(PathBuf::from("/cli/src")), None, None, env);
        assert_eq!(layout.src_dir, PathBuf::from("/cli/src"));
        assert_eq!(layout.build_dir, PathBuf::from("/env/build"));
        // Empty variables count as unset.
        assert_eq!(layout.lib_dir, None);
    }

    #[test]
    fn test_include_dirs() {
        let layout = SourceLayout::new("/g", "/g/build");
        assert_eq!(
            layout.include_dirs(),
            vec![
                PathBuf::from("/g/libgnucash/engine"),
                PathBuf::from("/g/libgnucash/core-utils"),
                PathBuf::from("/g/build/common"),
            ]
        );
    }

    #[test]
    fn test_locate_finds_headers_across_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = SourceLayout::new(tmp.path(), tmp.path().join("build"));
        let engine = tmp.path().join("libgnucash/engine");
        let common = tmp.path().join("build/common");
        fs::create_dir_all(&engine).unwrap();
        fs::create_dir_all(&common).unwrap();
        fs::write(engine.join("guid.h"), "").unwrap();
        fs::write(common.join("config.h"), "").unwrap();

        let manifest = BindingManifest {
            headers: vec![
                Header::new("guid.h", HeaderGroup::CoreTypes),
                Header::new("config.h", HeaderGroup::CoreTypes),
            ],
            ..Default::default()
        };
        let located = layout.locate(&manifest).unwrap();
        assert_eq!(located.len(), 2);
        assert_eq!(located[0].path, engine.join("guid.h"));
        assert_eq!(located[1].path, common.join("config.h"));
    }

    #[test]
    fn test_locate_reports_every_missing_header() {
        let tmp = tempfile::tempdir().unwrap();
        let engine = tmp.path().join("libgnucash/engine");
        fs::create_dir_all(&engine).unwrap();
        fs::write(engine.join("Account.h"), "").unwrap();

        let layout = SourceLayout::new(tmp.path(), tmp.path().join("build"));
        match layout.locate(&BindingManifest::default()) {
            Err(ManifestError::MissingHeaders(missing)) => {
                assert!(!missing.contains(&"Account.h".to_string()));
                assert!(missing.contains(&"guid.h".to_string()));
                assert!(missing.contains(&"Split.h".to_string()));
                assert_eq!(missing.len(), BindingManifest::default().headers.len() - 1);
            }
            other => panic!("Expected MissingHeaders, got {:?}", other),
        }
    }
}
