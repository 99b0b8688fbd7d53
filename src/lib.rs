//! Safe Rust access to the GnuCash engine.
//!
//! The value types ([`Numeric`], [`Guid`], `time64` helpers and account
//! kinds), the plain-data [`snapshot`] of a book and the [`reports`] built
//! on it need no GnuCash installation. The live wrappers in `engine` are
//! compiled with the `engine` feature, which links `libgnc-engine`.

pub mod config;
pub mod date;
pub mod error;
pub mod guid;
pub mod kinds;
pub mod numeric;
pub mod reports;
pub mod snapshot;

#[cfg(feature = "engine")]
pub mod engine;

pub use gnucash_manifest as manifest;

pub use error::{Error, Result};
pub use guid::Guid;
pub use kinds::{AccountCategory, AccountKind, ReconcileState};
pub use numeric::{Numeric, NumericError, RoundMode};
pub use snapshot::{AccountSnapshot, BookSnapshot, PriceSnapshot, SplitSnapshot};

#[cfg(feature = "engine")]
pub use engine::{
    init_engine, Account, AccountChildren, AccountDescendants, AccountSplits, Book, Commodity,
    Price, PriceDb, PriceSource, Session, SessionOpenMode, Split, Transaction, TransactionSplits,
};
