//! Safe wrappers over the engine's C objects.
//!
//! Every wrapper holds a non-null pointer plus an `owned` flag. Only owned
//! objects are destroyed on drop; borrowed ones (children reached through a
//! parent, splits of a transaction, the book of a session) belong to the
//! engine.

use std::{
    ffi::{CStr, CString},
    os::raw::c_char,
    sync::Once,
};

use gnucash_sys as ffi;

use crate::{error::Result, guid::Guid};

mod account;
mod book;
mod iter;
mod price;
mod session;
mod split;
mod transaction;

pub use account::Account;
pub use book::Book;
pub use iter::{AccountChildren, AccountDescendants, AccountSplits, TransactionSplits};
pub use price::{Commodity, Price, PriceDb, PriceSource};
pub use session::{Session, SessionOpenMode};
pub use split::Split;
pub use transaction::Transaction;

static ENGINE_INIT: Once = Once::new();

/// Initialises the engine once per process. Safe to call repeatedly.
pub fn init_engine() {
    ENGINE_INIT.call_once(|| {
        unsafe { ffi::gnc_engine_init(0, std::ptr::null_mut()) };
        tracing::debug!("Engine initialised");
    });
}

/// Copies a borrowed C string; `None` for null.
pub(crate) fn string_from_ptr(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
}

/// Copies a C string the caller must release, then frees it.
pub(crate) fn string_from_owned_ptr(ptr: *mut c_char) -> Option<String> {
    let s = string_from_ptr(ptr);
    if !ptr.is_null() {
        unsafe { ffi::g_free(ptr.cast()) };
    }
    s
}

pub(crate) fn to_cstring(s: &str) -> Result<CString> {
    Ok(CString::new(s)?)
}

/// GUID of any `QofInstance`-derived object.
pub(crate) fn instance_guid<T>(ptr: *mut T) -> Guid {
    let guid = unsafe { ffi::qof_instance_get_guid(ptr as *const _) };
    if guid.is_null() {
        return Guid::nil();
    }
    Guid::from(unsafe { *guid })
}
