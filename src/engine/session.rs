use std::ptr::NonNull;

use gnucash_sys as ffi;

use super::{init_engine, to_cstring, Book};
use crate::error::{Error, Result};

pub use ffi::SessionOpenMode;

/// A connection between a book and its storage backend.
pub struct Session {
    ptr: NonNull<ffi::QofSession>,
    uri: String,
    ended: bool,
}

// The engine is single-threaded; a session may move between threads but
// must not be shared.
unsafe impl Send for Session {}

impl Session {
    /// Begins a session on `uri` and loads its book. `SESSION_NEW_STORE`
    /// creates a new file instead of loading one.
    pub fn open(uri: &str, mode: SessionOpenMode) -> Result<Self> {
        init_engine();
        let c_uri = to_cstring(uri)?;

        let raw = unsafe { ffi::qof_session_new(std::ptr::null_mut()) };
        let ptr = NonNull::new(raw).ok_or(Error::NullPointer("qof_session_new"))?;
        let session = Session {
            ptr,
            uri: uri.to_string(),
            ended: false,
        };

        tracing::debug!(uri, ?mode, "Beginning session");
        unsafe { ffi::qof_session_begin(ptr.as_ptr(), c_uri.as_ptr(), mode) };
        session.check_error()?;

        if !matches!(mode, SessionOpenMode::SESSION_NEW_STORE) {
            unsafe { ffi::qof_session_load(ptr.as_ptr(), None) };
            session.check_error()?;
            tracing::debug!(uri, "Session loaded");
        }

        Ok(session)
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The session's book; owned by the session.
    pub fn book(&self) -> Option<Book> {
        let raw = unsafe { ffi::qof_session_get_book(self.ptr.as_ptr()) };
        NonNull::new(raw).map(|ptr| Book::from_raw(ptr, false))
    }

    pub fn save(&self) -> Result<()> {
        unsafe { ffi::qof_session_save(self.ptr.as_ptr(), None) };
        self.check_error()?;
        tracing::debug!(uri = %self.uri, "Session saved");
        Ok(())
    }

    /// Releases the backend's lock on the store. Ending twice is a no-op,
    /// and a session that was ended is only destroyed on drop.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        unsafe { ffi::qof_session_end(self.ptr.as_ptr()) };
        self.ended = true;
        tracing::debug!(uri = %self.uri, "Session ended");
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    fn check_error(&self) -> Result<()> {
        let code = unsafe { ffi::qof_session_get_error(self.ptr.as_ptr()) } as i64;
        if code == 0 {
            return Ok(());
        }
        tracing::warn!(uri = %self.uri, code, "Backend error");
        Err(Error::Backend {
            code,
            uri: self.uri.clone(),
        })
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.end();
        unsafe { ffi::qof_session_destroy(self.ptr.as_ptr()) };
    }
}
