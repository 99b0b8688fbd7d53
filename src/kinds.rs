use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Account types, numbered as the engine's `GNCAccountType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccountKind {
    Bank,
    Cash,
    Asset,
    Credit,
    Liability,
    Stock,
    Mutual,
    Currency,
    Income,
    Expense,
    Equity,
    Receivable,
    Payable,
    Root,
    Trading,
}

/// Which side of the balance sheet (or income statement) a kind reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccountCategory {
    Asset,
    Liability,
    Equity,
    Income,
    Expense,
    Trading,
    Root,
}

impl AccountKind {
    pub const ALL: [AccountKind; 15] = [
        AccountKind::Bank,
        AccountKind::Cash,
        AccountKind::Asset,
        AccountKind::Credit,
        AccountKind::Liability,
        AccountKind::Stock,
        AccountKind::Mutual,
        AccountKind::Currency,
        AccountKind::Income,
        AccountKind::Expense,
        AccountKind::Equity,
        AccountKind::Receivable,
        AccountKind::Payable,
        AccountKind::Root,
        AccountKind::Trading,
    ];

    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Bank => "BANK",
            AccountKind::Cash => "CASH",
            AccountKind::Asset => "ASSET",
            AccountKind::Credit => "CREDIT",
            AccountKind::Liability => "LIABILITY",
            AccountKind::Stock => "STOCK",
            AccountKind::Mutual => "MUTUAL",
            AccountKind::Currency => "CURRENCY",
            AccountKind::Income => "INCOME",
            AccountKind::Expense => "EXPENSE",
            AccountKind::Equity => "EQUITY",
            AccountKind::Receivable => "RECEIVABLE",
            AccountKind::Payable => "PAYABLE",
            AccountKind::Root => "ROOT",
            AccountKind::Trading => "TRADING",
        }
    }

    pub fn category(&self) -> AccountCategory {
        match self {
            AccountKind::Bank
            | AccountKind::Cash
            | AccountKind::Asset
            | AccountKind::Stock
            | AccountKind::Mutual
            | AccountKind::Currency
            | AccountKind::Receivable => AccountCategory::Asset,
            AccountKind::Credit | AccountKind::Liability | AccountKind::Payable => AccountCategory::Liability,
            AccountKind::Equity => AccountCategory::Equity,
            AccountKind::Income => AccountCategory::Income,
            AccountKind::Expense => AccountCategory::Expense,
            AccountKind::Trading => AccountCategory::Trading,
            AccountKind::Root => AccountCategory::Root,
        }
    }
}

impl Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| Error::Other(format!("unknown account type: {}", s)))
    }
}

/// Fails for `ACCT_TYPE_NONE` and the legacy codes past `ACCT_TYPE_TRADING`.
#[cfg(feature = "engine")]
impl TryFrom<gnucash_sys::GNCAccountType> for AccountKind {
    type Error = Error;

    fn try_from(t: gnucash_sys::GNCAccountType) -> Result<Self, Error> {
        let code = t as i32;
        AccountKind::from_code(code).ok_or(Error::UnknownAccountType(code))
    }
}

#[cfg(feature = "engine")]
impl From<AccountKind> for gnucash_sys::GNCAccountType {
    fn from(k: AccountKind) -> Self {
        use gnucash_sys::GNCAccountType::*;
        match k {
            AccountKind::Bank => ACCT_TYPE_BANK,
            AccountKind::Cash => ACCT_TYPE_CASH,
            AccountKind::Asset => ACCT_TYPE_ASSET,
            AccountKind::Credit => ACCT_TYPE_CREDIT,
            AccountKind::Liability => ACCT_TYPE_LIABILITY,
            AccountKind::Stock => ACCT_TYPE_STOCK,
            AccountKind::Mutual => ACCT_TYPE_MUTUAL,
            AccountKind::Currency => ACCT_TYPE_CURRENCY,
            AccountKind::Income => ACCT_TYPE_INCOME,
            AccountKind::Expense => ACCT_TYPE_EXPENSE,
            AccountKind::Equity => ACCT_TYPE_EQUITY,
            AccountKind::Receivable => ACCT_TYPE_RECEIVABLE,
            AccountKind::Payable => ACCT_TYPE_PAYABLE,
            AccountKind::Root => ACCT_TYPE_ROOT,
            AccountKind::Trading => ACCT_TYPE_TRADING,
        }
    }
}

/// Reconciliation flag of a split, stored by the engine as one character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ReconcileState {
    #[default]
    New,
    Cleared,
    Reconciled,
    Frozen,
    Voided,
}

impl ReconcileState {
    pub fn as_char(&self) -> char {
        match self {
            ReconcileState::New => 'n',
            ReconcileState::Cleared => 'c',
            ReconcileState::Reconciled => 'y',
            ReconcileState::Frozen => 'f',
            ReconcileState::Voided => 'v',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'n' => Some(ReconcileState::New),
            'c' => Some(ReconcileState::Cleared),
            'y' => Some(ReconcileState::Reconciled),
            'f' => Some(ReconcileState::Frozen),
            'v' => Some(ReconcileState::Voided),
            _ => None,
        }
    }
}

impl Display for ReconcileState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
