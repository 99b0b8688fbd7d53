use std::{os::raw::c_int, ptr::NonNull};

use gnucash_sys as ffi;

use super::{instance_guid, string_from_ptr, to_cstring, Book, TransactionSplits};
use crate::{
    date::{Time64, MAXTIME, MINTIME},
    error::{Error, Result},
    guid::Guid,
    numeric::Numeric,
};

/// A balanced set of splits posted on one date.
///
/// All changes belong between [`begin_edit`](Self::begin_edit) and
/// [`commit_edit`](Self::commit_edit); [`rollback_edit`](Self::rollback_edit)
/// discards them.
pub struct Transaction {
    ptr: NonNull<ffi::Transaction>,
    owned: bool,
}

unsafe impl Send for Transaction {}

impl Transaction {
    pub fn new(book: &Book) -> Result<Self> {
        let raw = unsafe { ffi::xaccMallocTransaction(book.as_ptr()) };
        let ptr = NonNull::new(raw).ok_or(Error::NullPointer("xaccMallocTransaction"))?;
        Ok(Self::from_raw(ptr, true))
    }

    pub(crate) fn from_raw(ptr: NonNull<ffi::Transaction>, owned: bool) -> Self {
        Self { ptr, owned }
    }

    pub fn as_ptr(&self) -> *mut ffi::Transaction {
        self.ptr.as_ptr()
    }

    /// Leaves the transaction to the book once it has been committed.
    pub fn mark_unowned(&mut self) {
        self.owned = false;
    }

    pub fn guid(&self) -> Guid {
        instance_guid(self.as_ptr())
    }

    pub fn begin_edit(&self) {
        unsafe { ffi::xaccTransBeginEdit(self.as_ptr()) };
    }

    pub fn commit_edit(&self) {
        unsafe { ffi::xaccTransCommitEdit(self.as_ptr()) };
        tracing::debug!(guid = %self.guid(), splits = self.split_count(), "Transaction committed");
    }

    pub fn rollback_edit(&self) {
        unsafe { ffi::xaccTransRollbackEdit(self.as_ptr()) };
        tracing::debug!(guid = %self.guid(), "Transaction rolled back");
    }

    pub fn description(&self) -> Option<String> {
        string_from_ptr(unsafe { ffi::xaccTransGetDescription(self.as_ptr()) })
    }

    pub fn set_description(&self, description: &str) -> Result<()> {
        let c = to_cstring(description)?;
        unsafe { ffi::xaccTransSetDescription(self.as_ptr(), c.as_ptr()) };
        Ok(())
    }

    pub fn num(&self) -> Option<String> {
        string_from_ptr(unsafe { ffi::xaccTransGetNum(self.as_ptr()) })
    }

    pub fn set_num(&self, num: &str) -> Result<()> {
        let c = to_cstring(num)?;
        unsafe { ffi::xaccTransSetNum(self.as_ptr(), c.as_ptr()) };
        Ok(())
    }

    pub fn notes(&self) -> Option<String> {
        string_from_ptr(unsafe { ffi::xaccTransGetNotes(self.as_ptr()) })
    }

    pub fn set_notes(&self, notes: &str) -> Result<()> {
        let c = to_cstring(notes)?;
        unsafe { ffi::xaccTransSetNotes(self.as_ptr(), c.as_ptr()) };
        Ok(())
    }

    pub fn date_posted(&self) -> Time64 {
        unsafe { ffi::xaccTransGetDate(self.as_ptr()) }
    }

    /// Posts at `t`, normalised by the engine to the neutral time of its day.
    pub fn set_date_posted(&self, t: Time64) -> Result<()> {
        if !(MINTIME..=MAXTIME).contains(&t) {
            return Err(crate::date::DateError::OutOfRange(t).into());
        }
        unsafe { ffi::xaccTransSetDatePostedSecsNormalized(self.as_ptr(), t) };
        Ok(())
    }

    pub fn set_date(&self, day: u8, month: u8, year: i32) -> Result<()> {
        // Validate before handing the engine an impossible date.
        crate::date::dmy_to_time64_neutral(day, month, year)?;
        unsafe {
            ffi::xaccTransSetDate(self.as_ptr(), c_int::from(day), c_int::from(month), year as c_int)
        };
        Ok(())
    }

    pub fn split_count(&self) -> usize {
        unsafe { ffi::xaccTransCountSplits(self.as_ptr()) }.max(0) as usize
    }

    pub fn splits(&self) -> TransactionSplits {
        TransactionSplits::new(self)
    }

    pub fn is_balanced(&self) -> bool {
        unsafe { ffi::xaccTransIsBalanced(self.as_ptr()) != 0 }
    }

    /// Sum of split values; zero for a balanced transaction.
    pub fn imbalance_value(&self) -> Numeric {
        unsafe { ffi::xaccTransGetImbalanceValue(self.as_ptr()) }.into()
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.owned {
            unsafe {
                ffi::xaccTransBeginEdit(self.as_ptr());
                ffi::xaccTransDestroy(self.as_ptr());
                ffi::xaccTransCommitEdit(self.as_ptr());
            }
        }
    }
}
