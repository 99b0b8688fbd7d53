//! Plain-data copies of a book's account tree and price list.
//!
//! Reports run against these rather than against live engine objects, so
//! they can be built by the engine wrappers or by hand.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{date::Time64, guid::Guid, kinds::AccountKind, kinds::ReconcileState, numeric::Numeric};

/// Separator between account names in a full name, as the engine uses by
/// default.
pub const ACCOUNT_SEPARATOR: char = ':';

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitSnapshot {
    pub guid: Guid,
    pub transaction: Guid,
    pub date_posted: Time64,
    pub num: String,
    pub description: String,
    pub memo: String,
    pub amount: Numeric,
    pub value: Numeric,
    /// Running balance of the account after this split.
    pub balance: Numeric,
    pub reconcile: ReconcileState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub guid: Guid,
    pub name: String,
    pub code: String,
    pub description: String,
    pub kind: AccountKind,
    pub placeholder: bool,
    pub balance: Numeric,
    pub cleared_balance: Numeric,
    pub reconciled_balance: Numeric,
    pub splits: Vec<SplitSnapshot>,
    pub children: Vec<AccountSnapshot>,
}

/// A quote from the price database: one unit of `commodity` is worth
/// `value` units of `currency` at `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub guid: Guid,
    pub commodity: String,
    pub currency: String,
    pub time: Time64,
    pub source: String,
    /// "last", "bid", "ask", "nav" or empty.
    pub kind: String,
    pub value: Numeric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub guid: Guid,
    pub root: AccountSnapshot,
    #[serde(default)]
    pub prices: Vec<PriceSnapshot>,
}

/// One account reached by [`AccountSnapshot::walk`].
#[derive(Debug, Clone, Copy)]
pub struct AccountEntry<'a> {
    /// 0 for the root's direct children.
    pub depth: usize,
    pub account: &'a AccountSnapshot,
}

#[derive(Debug, Clone)]
pub struct NamedAccount<'a> {
    pub depth: usize,
    pub full_name: String,
    pub account: &'a AccountSnapshot,
}

impl AccountSnapshot {
    pub fn new(name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            guid: Guid::new(),
            name: name.into(),
            code: String::new(),
            description: String::new(),
            kind,
            placeholder: false,
            balance: Numeric::ZERO,
            cleared_balance: Numeric::ZERO,
            reconciled_balance: Numeric::ZERO,
            splits: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_balance(mut self, balance: Numeric) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_child(mut self, child: AccountSnapshot) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_split(mut self, split: SplitSnapshot) -> Self {
        self.splits.push(split);
        self
    }

    pub fn is_root(&self) -> bool {
        self.kind == AccountKind::Root
    }

    /// Depth-first, parents before children. The account itself is not
    /// included.
    pub fn walk(&self) -> Vec<AccountEntry<'_>> {
        let mut out = Vec::new();
        let mut stack: Vec<(usize, &AccountSnapshot)> =
            self.children.iter().rev().map(|c| (0, c)).collect();
        while let Some((depth, account)) = stack.pop() {
            out.push(AccountEntry { depth, account });
            stack.extend(account.children.iter().rev().map(|c| (depth + 1, c)));
        }
        out
    }

    /// Like [`walk`](Self::walk), with each account's colon-separated path
    /// from this account.
    pub fn walk_named(&self) -> Vec<NamedAccount<'_>> {
        let sep = ACCOUNT_SEPARATOR.to_string();
        let mut out = Vec::new();
        let mut prefix: Vec<&str> = Vec::new();
        for entry in self.walk() {
            prefix.truncate(entry.depth);
            prefix.push(&entry.account.name);
            out.push(NamedAccount {
                depth: entry.depth,
                full_name: prefix.join(sep.as_str()),
                account: entry.account,
            });
        }
        out
    }

    pub fn child(&self, name: &str) -> Option<&AccountSnapshot> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn lookup_path(&self, path: &str) -> Option<&AccountSnapshot> {
        path.split(ACCOUNT_SEPARATOR)
            .try_fold(self, |account, name| account.child(name.trim()))
    }
}

impl BookSnapshot {
    pub fn new(root: AccountSnapshot) -> Self {
        Self {
            guid: Guid::new(),
            root,
            prices: Vec::new(),
        }
    }

    pub fn with_price(mut self, price: PriceSnapshot) -> Self {
        self.prices.push(price);
        self
    }

    /// Quotes for `commodity` (matched on its mnemonic), newest first.
    pub fn prices_for(&self, commodity: &str) -> Vec<&PriceSnapshot> {
        let mut prices: Vec<&PriceSnapshot> = self
            .prices
            .iter()
            .filter(|p| p.commodity.eq_ignore_ascii_case(commodity))
            .collect();
        prices.sort_by(|a, b| b.time.cmp(&a.time));
        prices
    }

    pub fn account_count(&self) -> usize {
        self.root.walk().len()
    }

    /// Distinct transactions touching any account in the book.
    pub fn transaction_count(&self) -> usize {
        self.root
            .walk()
            .iter()
            .flat_map(|e| e.account.splits.iter())
            .chain(self.root.splits.iter())
            .map(|s| s.transaction)
            .collect::<HashSet<_>>()
            .len()
    }
}
