use std::{os::raw::c_char, ptr::NonNull};

use gnucash_sys as ffi;

use super::{instance_guid, string_from_ptr, to_cstring, Account, Book, Transaction};
use crate::{
    error::{Error, Result},
    guid::Guid,
    kinds::ReconcileState,
    numeric::Numeric,
};

/// One leg of a transaction, moving `amount` (in the account's commodity)
/// worth `value` (in the transaction's currency).
pub struct Split {
    ptr: NonNull<ffi::Split>,
    owned: bool,
}

unsafe impl Send for Split {}

impl Split {
    pub fn new(book: &Book) -> Result<Self> {
        let raw = unsafe { ffi::xaccMallocSplit(book.as_ptr()) };
        let ptr = NonNull::new(raw).ok_or(Error::NullPointer("xaccMallocSplit"))?;
        Ok(Self::from_raw(ptr, true))
    }

    pub(crate) fn from_raw(ptr: NonNull<ffi::Split>, owned: bool) -> Self {
        Self { ptr, owned }
    }

    pub fn as_ptr(&self) -> *mut ffi::Split {
        self.ptr.as_ptr()
    }

    pub fn mark_unowned(&mut self) {
        self.owned = false;
    }

    pub fn guid(&self) -> Guid {
        instance_guid(self.as_ptr())
    }

    pub fn account(&self) -> Option<Account> {
        Account::from_ptr(unsafe { ffi::xaccSplitGetAccount(self.as_ptr()) })
    }

    pub fn set_account(&self, account: &Account) {
        unsafe { ffi::xaccSplitSetAccount(self.as_ptr(), account.as_ptr()) };
    }

    pub fn transaction(&self) -> Option<Transaction> {
        let raw = unsafe { ffi::xaccSplitGetParent(self.as_ptr()) };
        NonNull::new(raw).map(|ptr| Transaction::from_raw(ptr, false))
    }

    /// Attaches the split to `transaction`, which then owns it.
    pub fn set_transaction(&mut self, transaction: &Transaction) {
        unsafe { ffi::xaccSplitSetParent(self.as_ptr(), transaction.as_ptr()) };
        self.owned = false;
    }

    pub fn memo(&self) -> Option<String> {
        string_from_ptr(unsafe { ffi::xaccSplitGetMemo(self.as_ptr()) })
    }

    pub fn set_memo(&self, memo: &str) -> Result<()> {
        let c = to_cstring(memo)?;
        unsafe { ffi::xaccSplitSetMemo(self.as_ptr(), c.as_ptr()) };
        Ok(())
    }

    pub fn amount(&self) -> Numeric {
        unsafe { ffi::xaccSplitGetAmount(self.as_ptr()) }.into()
    }

    pub fn set_amount(&self, amount: Numeric) -> Result<()> {
        amount.check()?;
        unsafe { ffi::xaccSplitSetAmount(self.as_ptr(), amount.into()) };
        Ok(())
    }

    pub fn value(&self) -> Numeric {
        unsafe { ffi::xaccSplitGetValue(self.as_ptr()) }.into()
    }

    pub fn set_value(&self, value: Numeric) -> Result<()> {
        value.check()?;
        unsafe { ffi::xaccSplitSetValue(self.as_ptr(), value.into()) };
        Ok(())
    }

    /// Running balance of the split's account up to and including it.
    pub fn balance(&self) -> Numeric {
        unsafe { ffi::xaccSplitGetBalance(self.as_ptr()) }.into()
    }

    pub fn reconcile_state(&self) -> ReconcileState {
        let c = unsafe { ffi::xaccSplitGetReconcile(self.as_ptr()) } as u8 as char;
        ReconcileState::from_char(c).unwrap_or_default()
    }

    pub fn set_reconcile_state(&self, state: ReconcileState) {
        unsafe { ffi::xaccSplitSetReconcile(self.as_ptr(), state.as_char() as c_char) };
    }
}

impl Drop for Split {
    fn drop(&mut self) {
        if self.owned {
            unsafe { ffi::xaccSplitDestroy(self.as_ptr()) };
        }
    }
}
