use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Section of `wrapper.h` a header is rendered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderGroup {
    CoreTypes,
    EntityTypes,
    Prices,
    Session,
}

impl HeaderGroup {
    pub const ALL: [HeaderGroup; 4] = [
        HeaderGroup::CoreTypes,
        HeaderGroup::EntityTypes,
        HeaderGroup::Prices,
        HeaderGroup::Session,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            HeaderGroup::CoreTypes => "Core types",
            HeaderGroup::EntityTypes => "Entity types",
            HeaderGroup::Prices => "Prices",
            HeaderGroup::Session => "Session",
        }
    }
}

impl Display for HeaderGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    pub group: HeaderGroup,
}

impl Header {
    pub fn new(name: impl Into<String>, group: HeaderGroup) -> Self {
        Self {
            name: name.into(),
            group,
        }
    }

    /// A header name must be a bare file name ending in `.h`; include paths
    /// come from the source layout, never from the manifest.
    pub fn is_valid_name(name: &str) -> bool {
        name.len() > 2
            && name.ends_with(".h")
            && !name.contains(['/', '\\'])
            && !name.chars().any(char::is_whitespace)
    }
}

/// The engine headers bound by default, in include order.
pub fn default_headers() -> Vec<Header> {
    use HeaderGroup::*;
    vec![
        Header::new("guid.h", CoreTypes),
        Header::new("gnc-numeric.h", CoreTypes),
        Header::new("gnc-date.h", CoreTypes),
        Header::new("qofbook.h", EntityTypes),
        Header::new("Account.h", EntityTypes),
        Header::new("Transaction.h", EntityTypes),
        Header::new("Split.h", EntityTypes),
        Header::new("gnc-pricedb.h", Prices),
        Header::new("qofsession.h", Session),
        Header::new("gnc-engine.h", Session),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_names() {
        assert!(Header::is_valid_name("guid.h"));
        assert!(Header::is_valid_name("Account.h"));
        assert!(!Header::is_valid_name(".h"));
        assert!(!Header::is_valid_name("guid.c"));
        assert!(!Header::is_valid_name("engine/guid.h"));
        assert!(!Header::is_valid_name("my header.h"));
    }

    #[test]
    fn test_default_headers_are_grouped_in_order() {
        let groups: Vec<HeaderGroup> = default_headers().iter().map(|h| h.group).collect();
        let mut sorted = groups.clone();
        sorted.sort();
        assert_eq!(groups, sorted);
    }
}
