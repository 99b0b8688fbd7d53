//! Iterators over engine collections. Every item they yield is borrowed.

use std::{os::raw::c_int, ptr::NonNull};

use gnucash_sys as ffi;

use super::{Account, Split, Transaction};

pub struct AccountChildren {
    parent: *mut ffi::Account,
    index: c_int,
    count: c_int,
}

impl AccountChildren {
    pub fn new(account: &Account) -> Self {
        let count = unsafe { ffi::gnc_account_n_children(account.as_ptr()) };
        Self {
            parent: account.as_ptr(),
            index: 0,
            count,
        }
    }
}

impl Iterator for AccountChildren {
    type Item = Account;

    fn next(&mut self) -> Option<Account> {
        while self.index < self.count {
            let raw = unsafe { ffi::gnc_account_nth_child(self.parent, self.index) };
            self.index += 1;
            if let Some(account) = Account::from_ptr(raw) {
                return Some(account);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.index).max(0) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AccountChildren {}

/// Depth-first, parents before their children.
pub struct AccountDescendants {
    stack: Vec<AccountChildren>,
}

impl AccountDescendants {
    pub fn new(account: &Account) -> Self {
        Self {
            stack: vec![AccountChildren::new(account)],
        }
    }
}

impl Iterator for AccountDescendants {
    type Item = Account;

    fn next(&mut self) -> Option<Account> {
        while let Some(children) = self.stack.last_mut() {
            match children.next() {
                Some(account) => {
                    self.stack.push(AccountChildren::new(&account));
                    return Some(account);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

pub struct TransactionSplits {
    transaction: *mut ffi::Transaction,
    index: c_int,
    count: c_int,
}

impl TransactionSplits {
    pub fn new(transaction: &Transaction) -> Self {
        let count = unsafe { ffi::xaccTransCountSplits(transaction.as_ptr()) };
        Self {
            transaction: transaction.as_ptr(),
            index: 0,
            count,
        }
    }
}

impl Iterator for TransactionSplits {
    type Item = Split;

    fn next(&mut self) -> Option<Split> {
        while self.index < self.count {
            let raw = unsafe { ffi::xaccTransGetSplit(self.transaction, self.index) };
            self.index += 1;
            if let Some(ptr) = NonNull::new(raw) {
                return Some(Split::from_raw(ptr, false));
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.index).max(0) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for TransactionSplits {}

/// Walks the account's split list in posting order. The list belongs to the
/// account and is not freed here.
pub struct AccountSplits {
    current: *mut ffi::GList,
}

impl AccountSplits {
    pub fn new(account: &Account) -> Self {
        let list = unsafe { ffi::xaccAccountGetSplitList(account.as_ptr()) };
        Self {
            current: list.cast(),
        }
    }
}

impl Iterator for AccountSplits {
    type Item = Split;

    fn next(&mut self) -> Option<Split> {
        while !self.current.is_null() {
            let node = unsafe { *self.current };
            self.current = node.next;
            if let Some(ptr) = NonNull::new(node.data.cast::<ffi::Split>()) {
                return Some(Split::from_raw(ptr, false));
            }
        }
        None
    }
}
