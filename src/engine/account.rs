use std::ptr::NonNull;

use gnucash_sys as ffi;

use super::{
    instance_guid, string_from_owned_ptr, string_from_ptr, to_cstring, AccountChildren,
    AccountDescendants, AccountSplits, Book,
};
use crate::{
    error::{Error, Result},
    guid::Guid,
    kinds::AccountKind,
    numeric::Numeric,
};

pub struct Account {
    ptr: NonNull<ffi::Account>,
    owned: bool,
}

unsafe impl Send for Account {}

impl Account {
    /// A new account in `book`, owned by the caller until it is attached to
    /// a parent and [`mark_unowned`](Self::mark_unowned) is called.
    pub fn new(book: &Book) -> Result<Self> {
        let raw = unsafe { ffi::xaccMallocAccount(book.as_ptr()) };
        let ptr = NonNull::new(raw).ok_or(Error::NullPointer("xaccMallocAccount"))?;
        Ok(Self::from_raw(ptr, true))
    }

    pub(crate) fn from_raw(ptr: NonNull<ffi::Account>, owned: bool) -> Self {
        Self { ptr, owned }
    }

    pub(crate) fn from_ptr(raw: *mut ffi::Account) -> Option<Self> {
        NonNull::new(raw).map(|ptr| Self::from_raw(ptr, false))
    }

    pub fn as_ptr(&self) -> *mut ffi::Account {
        self.ptr.as_ptr()
    }

    /// Hands ownership to the engine, typically after `append_child`.
    pub fn mark_unowned(&mut self) {
        self.owned = false;
    }

    pub fn guid(&self) -> Guid {
        instance_guid(self.as_ptr())
    }

    pub fn begin_edit(&self) {
        unsafe { ffi::xaccAccountBeginEdit(self.as_ptr()) };
    }

    pub fn commit_edit(&self) {
        unsafe { ffi::xaccAccountCommitEdit(self.as_ptr()) };
    }

    pub fn name(&self) -> Option<String> {
        string_from_ptr(unsafe { ffi::xaccAccountGetName(self.as_ptr()) })
    }

    pub fn set_name(&self, name: &str) -> Result<()> {
        let c = to_cstring(name)?;
        unsafe { ffi::xaccAccountSetName(self.as_ptr(), c.as_ptr()) };
        tracing::debug!(name, "Account renamed");
        Ok(())
    }

    pub fn description(&self) -> Option<String> {
        string_from_ptr(unsafe { ffi::xaccAccountGetDescription(self.as_ptr()) })
    }

    pub fn set_description(&self, description: &str) -> Result<()> {
        let c = to_cstring(description)?;
        unsafe { ffi::xaccAccountSetDescription(self.as_ptr(), c.as_ptr()) };
        Ok(())
    }

    pub fn code(&self) -> Option<String> {
        string_from_ptr(unsafe { ffi::xaccAccountGetCode(self.as_ptr()) })
    }

    pub fn set_code(&self, code: &str) -> Result<()> {
        let c = to_cstring(code)?;
        unsafe { ffi::xaccAccountSetCode(self.as_ptr(), c.as_ptr()) };
        Ok(())
    }

    pub fn notes(&self) -> Option<String> {
        string_from_ptr(unsafe { ffi::xaccAccountGetNotes(self.as_ptr()) })
    }

    pub fn set_notes(&self, notes: &str) -> Result<()> {
        let c = to_cstring(notes)?;
        unsafe { ffi::xaccAccountSetNotes(self.as_ptr(), c.as_ptr()) };
        Ok(())
    }

    pub fn account_type(&self) -> ffi::GNCAccountType {
        unsafe { ffi::xaccAccountGetType(self.as_ptr()) }
    }

    pub fn set_type(&self, account_type: ffi::GNCAccountType) {
        unsafe { ffi::xaccAccountSetType(self.as_ptr(), account_type) };
    }

    /// `None` for `ACCT_TYPE_NONE` and legacy types.
    pub fn kind(&self) -> Option<AccountKind> {
        AccountKind::try_from(self.account_type()).ok()
    }

    pub fn set_kind(&self, kind: AccountKind) {
        self.set_type(kind.into());
    }

    /// Colon-separated path from the root.
    pub fn full_name(&self) -> Option<String> {
        string_from_owned_ptr(unsafe { ffi::gnc_account_get_full_name(self.as_ptr()) })
    }

    pub fn is_root(&self) -> bool {
        unsafe { ffi::gnc_account_is_root(self.as_ptr()) != 0 }
    }

    pub fn is_placeholder(&self) -> bool {
        unsafe { ffi::xaccAccountGetPlaceholder(self.as_ptr()) != 0 }
    }

    pub fn parent(&self) -> Option<Account> {
        Account::from_ptr(unsafe { ffi::gnc_account_get_parent(self.as_ptr()) })
    }

    pub fn append_child(&self, child: &Account) {
        unsafe { ffi::gnc_account_append_child(self.as_ptr(), child.as_ptr()) };
    }

    /// Searches this account's descendants by name.
    pub fn lookup_by_name(&self, name: &str) -> Result<Option<Account>> {
        let c = to_cstring(name)?;
        Ok(Account::from_ptr(unsafe {
            ffi::gnc_account_lookup_by_name(self.as_ptr(), c.as_ptr())
        }))
    }

    pub fn lookup_by_full_name(&self, full_name: &str) -> Result<Option<Account>> {
        let c = to_cstring(full_name)?;
        Ok(Account::from_ptr(unsafe {
            ffi::gnc_account_lookup_by_full_name(self.as_ptr(), c.as_ptr())
        }))
    }

    /// Balance of this account alone, excluding subaccounts.
    pub fn balance(&self) -> Numeric {
        unsafe { ffi::xaccAccountGetBalance(self.as_ptr()) }.into()
    }

    pub fn cleared_balance(&self) -> Numeric {
        unsafe { ffi::xaccAccountGetClearedBalance(self.as_ptr()) }.into()
    }

    pub fn reconciled_balance(&self) -> Numeric {
        unsafe { ffi::xaccAccountGetReconciledBalance(self.as_ptr()) }.into()
    }

    pub fn child_count(&self) -> usize {
        unsafe { ffi::gnc_account_n_children(self.as_ptr()) }.max(0) as usize
    }

    pub fn children(&self) -> AccountChildren {
        AccountChildren::new(self)
    }

    pub fn descendants(&self) -> AccountDescendants {
        AccountDescendants::new(self)
    }

    pub fn splits(&self) -> AccountSplits {
        AccountSplits::new(self)
    }
}

impl Drop for Account {
    fn drop(&mut self) {
        if self.owned {
            unsafe {
                ffi::xaccAccountBeginEdit(self.as_ptr());
                ffi::xaccAccountDestroy(self.as_ptr());
            }
        }
    }
}
