//! Header manifest for the GnuCash engine bindings.
//!
//! This crate holds the list of engine headers surfaced to bindgen, the
//! allow/block lists applied to them, and the location of a GnuCash source
//! tree. It has no dependency on the engine itself so that it can be used
//! both from `gnucash-sys/build.rs` and from tooling.

pub mod error;
pub mod headers;
pub mod layout;
pub mod manifest;

pub use error::ManifestError;
pub use headers::{Header, HeaderGroup};
pub use layout::{LocatedHeader, SourceLayout};
pub use manifest::{BindingManifest, Derives};
