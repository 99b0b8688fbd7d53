use std::{collections::HashSet, fmt::Write, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::ManifestError,
    headers::{default_headers, Header, HeaderGroup},
};

const WRAPPER_TITLE: &str = "/* wrapper.h - Headers for gnucash-sys FFI bindings */";

/// Which traits bindgen derives on generated types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Derives {
    pub debug: bool,
    pub default: bool,
    pub eq: bool,
    pub hash: bool,
}

impl Default for Derives {
    fn default() -> Self {
        Self {
            debug: true,
            default: true,
            eq: true,
            hash: true,
        }
    }
}

/// Everything bindgen needs to know about the engine headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingManifest {
    pub headers: Vec<Header>,
    pub allowlist_types: Vec<String>,
    pub allowlist_functions: Vec<String>,
    pub blocklist_types: Vec<String>,
    pub rustified_enums: Vec<String>,
    pub derives: Derives,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for BindingManifest {
    fn default() -> Self {
        Self {
            headers: default_headers(),
            allowlist_types: strings(&[
                // core types
                "GncGUID",
                "_gncGuid",
                "gnc_numeric",
                "_gnc_numeric",
                "time64",
                "Time64",
                "GNCNumericErrorCode",
                // entities
                "Split",
                "SplitClass",
                "Transaction",
                "TransactionClass",
                "Account",
                "AccountClass",
                "QofBook",
                "_QofBook",
                "QofCollection",
                "QofInstance",
                "GNCAccountType",
                "GNCPlaceholderType",
                "SplitList",
                "MonetaryList",
                "GNCLot",
                // prices
                "GNCPrice",
                "GNCPriceDB",
                "PriceSource",
                "gnc_commodity",
                "gnc_commodity_table",
                "GncPriceForeachFunc",
                // session
                "QofSession",
                "SessionOpenMode",
                "QofBackendError",
            ]),
            allowlist_functions: strings(&[
                "guid_.*",
                "string_to_guid",
                "gnc_numeric_.*",
                "double_to_gnc_numeric",
                "gnc_time.*",
                "gnc_mktime",
                "gnc_gmtime",
                "gnc_localtime.*",
                "gnc_dmy2time64.*",
                "gnc_iso8601_to_time64_gmt",
                "gnc_time64_to_iso8601_buff",
                "time64_to_gdate",
                "gdate_to_time64",
                "xacc.*",
                "gnc_.*",
                "qof_.*",
                "g_free",
                "g_list_free",
            ]),
            blocklist_types: strings(&["_?GList", "_?GSList", "_?GHashTable", "_?GValue", "_?GDate"]),
            rustified_enums: strings(&[
                "GNCAccountType",
                "GNCNumericErrorCode",
                "GNCPlaceholderType",
                "QofDateFormat",
                "QofDateCompletion",
                "PriceSource",
                "SessionOpenMode",
            ]),
            derives: Derives::default(),
        }
    }
}

impl BindingManifest {
    pub fn from_toml_str(contents: &str) -> Result<Self, ManifestError> {
        let manifest: BindingManifest = toml::from_str(contents)?;
        Ok(manifest)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loading binding manifest");
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.headers.is_empty() {
            return Err(ManifestError::NoHeaders);
        }

        let mut seen = HashSet::new();
        for header in &self.headers {
            if !Header::is_valid_name(&header.name) {
                return Err(ManifestError::InvalidHeaderName(header.name.clone()));
            }
            if !seen.insert(header.name.as_str()) {
                return Err(ManifestError::DuplicateHeader(header.name.clone()));
            }
        }

        for (list, label) in [
            (&self.allowlist_types, "allowlist_types"),
            (&self.allowlist_functions, "allowlist_functions"),
            (&self.blocklist_types, "blocklist_types"),
            (&self.rustified_enums, "rustified_enums"),
        ] {
            if list.iter().any(|p| p.trim().is_empty()) {
                return Err(ManifestError::EmptyPattern(label));
            }
        }

        if let Some(conflict) = self
            .allowlist_types
            .iter()
            .find(|t| self.blocklist_types.contains(t))
        {
            return Err(ManifestError::ConflictingType(conflict.clone()));
        }

        Ok(())
    }

    pub fn headers_in(&self, group: HeaderGroup) -> impl Iterator<Item = &Header> {
        self.headers.iter().filter(move |h| h.group == group)
    }

    pub fn header_names(&self) -> Vec<&str> {
        self.headers.iter().map(|h| h.name.as_str()).collect()
    }

    /// Renders the C header that aggregates every manifest header, grouped
    /// by section. Groups with no headers are left out.
    pub fn render_wrapper_header(&self) -> String {
        let mut out = String::new();
        out.push_str(WRAPPER_TITLE);
        out.push('\n');

        for group in HeaderGroup::ALL {
            let mut headers = self.headers_in(group).peekable();
            if headers.peek().is_none() {
                continue;
            }
            let _ = write!(out, "\n/* {} */\n", group.label());
            for header in headers {
                let _ = writeln!(out, "#include \"{}\"", header.name);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const BOUND_HEADERS: [&str; 7] = [
        "guid.h",
        "gnc-numeric.h",
        "gnc-date.h",
        "qofbook.h",
        "Account.h",
        "Transaction.h",
        "Split.h",
    ];

    #[test]
    fn test_default_manifest_is_valid() {
        BindingManifest::default().validate().unwrap();
    }

    #[test]
    fn test_default_manifest_lists_engine_headers_in_order() {
        let manifest = BindingManifest::default();
        let names = manifest.header_names();
        assert_eq!(&names[..7], &BOUND_HEADERS[..]);
        for header in BOUND_HEADERS {
            assert_eq!(names.iter().filter(|n| **n == header).count(), 1, "{}", header);
        }
    }

    #[test]
    fn test_price_database_is_bound() {
        let manifest = BindingManifest::default();
        let prices: Vec<&str> = manifest
            .headers_in(HeaderGroup::Prices)
            .map(|h| h.name.as_str())
            .collect();
        assert_eq!(prices, vec!["gnc-pricedb.h"]);
        assert!(manifest.allowlist_types.iter().any(|t| t == "GNCPriceDB"));
        assert!(manifest.rustified_enums.iter().any(|t| t == "PriceSource"));
    }

    #[test]
    fn test_render_wrapper_header() {
        let manifest = BindingManifest {
            headers: vec![
                Header::new("guid.h", HeaderGroup::CoreTypes),
                Header::new("Split.h", HeaderGroup::EntityTypes),
            ],
            ..Default::default()
        };
        assert_eq!(
            manifest.render_wrapper_header(),
            "/* wrapper.h - Headers for gnucash-sys FFI bindings */\n\
             \n\
             /* Core types */\n\
             #include \"guid.h\"\n\
             \n\
             /* Entity types */\n\
             #include \"Split.h\"\n"
        );
    }

    #[test]
    fn test_render_groups_follow_section_order() {
        // Listed out of order, rendered by group.
        let manifest = BindingManifest {
            headers: vec![
                Header::new("qofsession.h", HeaderGroup::Session),
                Header::new("guid.h", HeaderGroup::CoreTypes),
            ],
            ..Default::default()
        };
        let rendered = manifest.render_wrapper_header();
        let core = rendered.find("guid.h").unwrap();
        let session = rendered.find("qofsession.h").unwrap();
        assert!(core < session);
        assert!(!rendered.contains("Entity types"));
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut manifest = BindingManifest::default();
        manifest.headers.push(Header::new("guid.h", HeaderGroup::Session));
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::DuplicateHeader(name)) if name == "guid.h"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_names_and_patterns() {
        let manifest = BindingManifest {
            headers: vec![Header::new("engine/guid.h", HeaderGroup::CoreTypes)],
            ..Default::default()
        };
        assert!(matches!(manifest.validate(), Err(ManifestError::InvalidHeaderName(_))));

        let mut manifest = BindingManifest::default();
        manifest.allowlist_functions.push("  ".to_string());
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::EmptyPattern("allowlist_functions"))
        ));

        let manifest = BindingManifest {
            headers: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(manifest.validate(), Err(ManifestError::NoHeaders)));
    }

    #[test]
    fn test_validate_rejects_conflicting_type() {
        let mut manifest = BindingManifest::default();
        manifest.blocklist_types.push("Split".to_string());
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::ConflictingType(t)) if t == "Split"
        ));
    }

    #[test]
    fn test_from_toml_falls_back_to_defaults() {
        let manifest = BindingManifest::from_toml_str(
            r#"
            allowlist_functions = ["xacc.*"]

            [[headers]]
            name = "guid.h"
            group = "core_types"

            [derives]
            hash = false
            "#,
        )
        .unwrap();

        assert_eq!(manifest.header_names(), vec!["guid.h"]);
        assert_eq!(manifest.allowlist_functions, vec!["xacc.*".to_string()]);
        assert_eq!(manifest.blocklist_types, BindingManifest::default().blocklist_types);
        assert!(manifest.derives.debug);
        assert!(!manifest.derives.hash);
    }

    #[test]
    fn test_from_toml_rejects_unknown_group() {
        let result = BindingManifest::from_toml_str(
            r#"
            [[headers]]
            name = "guid.h"
            group = "widgets"
            "#,
        );
        assert!(matches!(result, Err(ManifestError::Parse(_))));
    }
}
