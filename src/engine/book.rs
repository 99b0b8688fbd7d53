use std::ptr::NonNull;

use gnucash_sys as ffi;

use super::{init_engine, instance_guid, Account, AccountSplits, PriceDb};
use crate::{
    error::{Error, Result},
    guid::Guid,
    kinds::AccountKind,
    snapshot::{AccountSnapshot, BookSnapshot, SplitSnapshot},
};

/// The container of accounts and transactions.
pub struct Book {
    ptr: NonNull<ffi::QofBook>,
    owned: bool,
}

unsafe impl Send for Book {}

impl Book {
    /// A new, empty in-memory book.
    pub fn new() -> Result<Self> {
        init_engine();
        let raw = unsafe { ffi::qof_book_new() };
        let ptr = NonNull::new(raw).ok_or(Error::NullPointer("qof_book_new"))?;
        Ok(Self::from_raw(ptr, true))
    }

    pub(crate) fn from_raw(ptr: NonNull<ffi::QofBook>, owned: bool) -> Self {
        Self { ptr, owned }
    }

    pub fn as_ptr(&self) -> *mut ffi::QofBook {
        self.ptr.as_ptr()
    }

    pub fn guid(&self) -> Guid {
        instance_guid(self.as_ptr())
    }

    pub fn root_account(&self) -> Option<Account> {
        let raw = unsafe { ffi::gnc_book_get_root_account(self.as_ptr()) };
        NonNull::new(raw).map(|ptr| Account::from_raw(ptr, false))
    }

    pub fn is_readonly(&self) -> bool {
        unsafe { ffi::qof_book_is_readonly(self.as_ptr()) != 0 }
    }

    /// True when there are changes not yet saved.
    pub fn is_dirty(&self) -> bool {
        unsafe { ffi::qof_book_session_not_saved(self.as_ptr()) != 0 }
    }

    pub fn mark_dirty(&self) {
        unsafe { ffi::qof_book_mark_session_dirty(self.as_ptr()) };
    }

    pub fn is_empty(&self) -> bool {
        unsafe { ffi::qof_book_empty(self.as_ptr()) != 0 }
    }

    pub fn transaction_count(&self) -> usize {
        unsafe { ffi::gnc_book_count_transactions(self.as_ptr()) as usize }
    }

    pub fn price_db(&self) -> Option<PriceDb> {
        PriceDb::get(self)
    }

    /// Copies the account tree, balances, splits and prices into plain
    /// data. Accounts whose type has no [`AccountKind`] are left out
    /// together with their subtrees.
    pub fn snapshot(&self) -> Result<BookSnapshot> {
        let root = self
            .root_account()
            .ok_or(Error::NullPointer("gnc_book_get_root_account"))?;
        let snapshot = BookSnapshot {
            guid: self.guid(),
            root: account_snapshot(&root, AccountKind::Root),
            prices: self.price_db().map(|db| db.prices()).unwrap_or_default(),
        };
        tracing::debug!(
            accounts = snapshot.account_count(),
            transactions = snapshot.transaction_count(),
            prices = snapshot.prices.len(),
            "Book snapshot taken"
        );
        Ok(snapshot)
    }
}

fn account_snapshot(account: &Account, kind: AccountKind) -> AccountSnapshot {
    AccountSnapshot {
        guid: account.guid(),
        name: account.name().unwrap_or_default(),
        code: account.code().unwrap_or_default(),
        description: account.description().unwrap_or_default(),
        kind,
        placeholder: account.is_placeholder(),
        balance: account.balance(),
        cleared_balance: account.cleared_balance(),
        reconciled_balance: account.reconciled_balance(),
        splits: AccountSplits::new(account).map(|s| split_snapshot(&s)).collect(),
        children: account.children().filter_map(|c| child_snapshot(&c)).collect(),
    }
}

fn child_snapshot(account: &Account) -> Option<AccountSnapshot> {
    match account.kind() {
        Some(kind) => Some(account_snapshot(account, kind)),
        None => {
            tracing::warn!(
                account = %account.name().unwrap_or_default(),
                code = account.account_type() as i32,
                "Skipping account with unknown type"
            );
            None
        }
    }
}

fn split_snapshot(split: &super::Split) -> SplitSnapshot {
    let txn = split.transaction();
    SplitSnapshot {
        guid: split.guid(),
        transaction: txn.as_ref().map(|t| t.guid()).unwrap_or_default(),
        date_posted: txn.as_ref().map(|t| t.date_posted()).unwrap_or_default(),
        num: txn.as_ref().and_then(|t| t.num()).unwrap_or_default(),
        description: txn.as_ref().and_then(|t| t.description()).unwrap_or_default(),
        memo: split.memo().unwrap_or_default(),
        amount: split.amount(),
        value: split.value(),
        balance: split.balance(),
        reconcile: split.reconcile_state(),
    }
}

impl Drop for Book {
    fn drop(&mut self) {
        if self.owned {
            unsafe { ffi::qof_book_destroy(self.as_ptr()) };
        }
    }
}
