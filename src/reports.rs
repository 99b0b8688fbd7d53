//! Account tree, balance sheet, CSV export, transaction search,
//! reconciliation, account analysis and price listing over a
//! [`BookSnapshot`].

use std::{
    collections::{BTreeMap, HashSet},
    fmt::Write as _,
    io::Write,
};

use prettytable::{row, Table};
use rust_decimal::RoundingStrategy;
use serde::Serialize;

use crate::{
    date::{format_date, Time64},
    guid::Guid,
    kinds::{AccountCategory, AccountKind, ReconcileState},
    numeric::Numeric,
    snapshot::{AccountSnapshot, BookSnapshot, PriceSnapshot, SplitSnapshot},
};

/// Two-decimal rendering used by every report; empty for error values.
pub fn format_amount(n: &Numeric) -> String {
    match n.to_decimal() {
        Ok(d) => format!("{:.2}", d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)),
        Err(_) => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TreeStats {
    pub total_accounts: usize,
    /// Top-level accounts are at depth 1.
    pub max_depth: usize,
    pub by_kind: BTreeMap<AccountKind, usize>,
}

impl TreeStats {
    pub fn collect(root: &AccountSnapshot) -> Self {
        let mut stats = TreeStats::default();
        for entry in root.walk() {
            stats.total_accounts += 1;
            stats.max_depth = stats.max_depth.max(entry.depth + 1);
            *stats.by_kind.entry(entry.account.kind).or_insert(0) += 1;
        }
        stats
    }
}

/// Renders the account hierarchy one account per line. The last child of a
/// parent gets ` -> `, the others ` +- `.
pub fn render_tree(root: &AccountSnapshot) -> String {
    let mut out = String::new();
    let name = if root.name.is_empty() { "(root)" } else { root.name.as_str() };
    let _ = writeln!(out, "{}", name);
    render_children(root, 1, &mut out);
    out
}

fn render_children(parent: &AccountSnapshot, depth: usize, out: &mut String) {
    let count = parent.children.len();
    for (i, child) in parent.children.iter().enumerate() {
        let connector = if i + 1 == count { " -> " } else { " +- " };
        let _ = writeln!(
            out,
            "{}{}{} [{}] {}",
            "    ".repeat(depth - 1),
            connector,
            child.name,
            child.kind,
            format_amount(&child.balance)
        );
        render_children(child, depth + 1, out);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetLine {
    pub name: String,
    pub depth: usize,
    /// Shown with the sign that is natural for the section, so credit
    /// balances of liabilities and equity are positive.
    pub amount: Numeric,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSheet {
    pub assets: Vec<SheetLine>,
    pub liabilities: Vec<SheetLine>,
    pub equity: Vec<SheetLine>,
    pub total_assets: Numeric,
    pub total_liabilities: Numeric,
    pub total_equity: Numeric,
    /// Income less expenses not yet closed into equity.
    pub retained_earnings: Numeric,
}

impl BalanceSheet {
    /// Each account's own balance is reported once; balances are taken
    /// as the engine reported them and only summed here.
    pub fn from_book(book: &BookSnapshot) -> Self {
        let mut sheet = BalanceSheet {
            assets: Vec::new(),
            liabilities: Vec::new(),
            equity: Vec::new(),
            total_assets: Numeric::ZERO,
            total_liabilities: Numeric::ZERO,
            total_equity: Numeric::ZERO,
            retained_earnings: Numeric::ZERO,
        };

        for entry in book.root.walk() {
            let account = entry.account;
            let line = |amount: Numeric| SheetLine {
                name: account.name.clone(),
                depth: entry.depth,
                amount,
            };
            match account.kind.category() {
                AccountCategory::Asset => {
                    sheet.total_assets = sheet.total_assets + account.balance;
                    sheet.assets.push(line(account.balance));
                }
                AccountCategory::Liability => {
                    sheet.total_liabilities = sheet.total_liabilities - account.balance;
                    sheet.liabilities.push(line(-account.balance));
                }
                AccountCategory::Equity => {
                    sheet.total_equity = sheet.total_equity - account.balance;
                    sheet.equity.push(line(-account.balance));
                }
                AccountCategory::Income | AccountCategory::Expense => {
                    sheet.retained_earnings = sheet.retained_earnings - account.balance;
                }
                AccountCategory::Trading | AccountCategory::Root => {}
            }
        }

        sheet
    }

    pub fn total_liabilities_and_equity(&self) -> Numeric {
        self.total_liabilities + self.total_equity + self.retained_earnings
    }

    pub fn is_balanced(&self) -> bool {
        self.total_assets == self.total_liabilities_and_equity()
    }

    pub fn render(&self) -> String {
        let mut table = Table::new();
        let sections = [
            ("ASSETS", &self.assets, "Total Assets", self.total_assets),
            ("LIABILITIES", &self.liabilities, "Total Liabilities", self.total_liabilities),
            ("EQUITY", &self.equity, "Total Equity", self.total_equity),
        ];

        for (title, lines, total_label, total) in sections {
            table.add_row(row![b->title, ""]);
            for line in lines.iter() {
                let name = format!("{}{}", "  ".repeat(line.depth), line.name);
                table.add_row(row![name, r->format_amount(&line.amount)]);
            }
            table.add_row(row![i->total_label, r->format_amount(&total)]);
            table.add_empty_row();
        }

        table.add_row(row!["Retained Earnings", r->format_amount(&self.retained_earnings)]);
        table.add_row(row![
            b->"Total Liabilities + Equity",
            r->format_amount(&self.total_liabilities_and_equity())
        ]);

        let status = if self.is_balanced() {
            "Balance sheet is balanced.".to_string()
        } else {
            format!(
                "Balance sheet is out of balance by {}",
                format_amount(&(self.total_assets - self.total_liabilities_and_equity()))
            )
        };

        format!("\n{}\n{}\n", table, status)
    }
}

fn escape_csv(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub const CSV_HEADER: &str = "Date,Description,Memo,Debit,Credit,Balance,Reconciled";

/// Writes one row per split of `account`; returns the number of rows.
/// Non-negative values go in the debit column.
pub fn export_csv<W: Write>(account: &AccountSnapshot, writer: &mut W) -> std::io::Result<usize> {
    writeln!(writer, "{}", CSV_HEADER)?;

    for split in &account.splits {
        let (debit, credit) = if split.value.is_negative() {
            (String::new(), format_amount(&-split.value))
        } else {
            (format_amount(&split.value), String::new())
        };

        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            format_date(split.date_posted),
            escape_csv(&split.description),
            escape_csv(&split.memo),
            debit,
            credit,
            format_amount(&split.balance),
            split.reconcile
        )?;
    }

    tracing::debug!(account = %account.name, rows = account.splits.len(), "Exported splits");
    Ok(account.splits.len())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub transaction: Guid,
    pub date: Time64,
    pub account: String,
    pub description: String,
    pub memo: String,
    /// Value of the matching split in the transaction's currency.
    pub value: Numeric,
}

/// One hit per transaction, newest first. A split matches when `term`
/// occurs (case-insensitive) in its description, its memo or the full name
/// of its account; the first matching split in account-tree order stands
/// for its transaction. With no term every transaction matches, so this
/// lists the most recent activity.
pub fn search(book: &BookSnapshot, term: Option<&str>, limit: Option<usize>) -> Vec<SearchHit> {
    let term = term.map(str::to_lowercase).filter(|t| !t.is_empty());
    let mut seen = HashSet::new();
    let mut hits = Vec::new();

    for named in book.root.walk_named() {
        for split in &named.account.splits {
            let matches = match &term {
                Some(t) => {
                    split.description.to_lowercase().contains(t.as_str())
                        || split.memo.to_lowercase().contains(t.as_str())
                        || named.full_name.to_lowercase().contains(t.as_str())
                }
                None => true,
            };
            if matches && seen.insert(split.transaction) {
                hits.push(SearchHit {
                    transaction: split.transaction,
                    date: split.date_posted,
                    account: named.full_name.clone(),
                    description: split.description.clone(),
                    memo: split.memo.clone(),
                    value: split.value,
                });
            }
        }
    }

    hits.sort_by(|a, b| b.date.cmp(&a.date));
    if let Some(limit) = limit {
        hits.truncate(limit);
    }
    hits
}

pub fn render_hits(hits: &[SearchHit]) -> String {
    let mut table = Table::new();
    table.add_row(row!["Date", "Account", "Description", "Amount"]);
    table.add_empty_row();

    for hit in hits {
        table.add_row(row![format_date(hit.date), hit.account, hit.description, r->format_amount(&hit.value)]);
    }

    let total: Numeric = hits.iter().map(|h| h.value).sum();
    table.add_empty_row();
    table.add_row(row!["", "", "Total:", r->format_amount(&total)]);

    format!("\n{}\n", table)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerLine {
    pub date: Time64,
    pub num: String,
    pub description: String,
    pub value: Numeric,
    pub balance: Numeric,
    pub reconcile: ReconcileState,
}

impl From<&SplitSnapshot> for LedgerLine {
    fn from(split: &SplitSnapshot) -> Self {
        Self {
            date: split.date_posted,
            num: split.num.clone(),
            description: split.description.clone(),
            value: split.value,
            balance: split.balance,
            reconcile: split.reconcile,
        }
    }
}

/// Where an account stands against its bank statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub account: String,
    pub balance: Numeric,
    pub cleared_balance: Numeric,
    pub reconciled_balance: Numeric,
    pub unreconciled: Vec<LedgerLine>,
    pub cleared: Vec<LedgerLine>,
    pub reconciled_count: usize,
    pub unreconciled_total: Numeric,
    pub cleared_total: Numeric,
}

impl ReconcileReport {
    /// Frozen and voided splits are neither listed nor counted.
    pub fn from_account(account: &AccountSnapshot) -> Self {
        let mut report = ReconcileReport {
            account: account.name.clone(),
            balance: account.balance,
            cleared_balance: account.cleared_balance,
            reconciled_balance: account.reconciled_balance,
            unreconciled: Vec::new(),
            cleared: Vec::new(),
            reconciled_count: 0,
            unreconciled_total: Numeric::ZERO,
            cleared_total: Numeric::ZERO,
        };

        for split in &account.splits {
            match split.reconcile {
                ReconcileState::New => {
                    report.unreconciled_total = report.unreconciled_total + split.value;
                    report.unreconciled.push(split.into());
                }
                ReconcileState::Cleared => {
                    report.cleared_total = report.cleared_total + split.value;
                    report.cleared.push(split.into());
                }
                ReconcileState::Reconciled => report.reconciled_count += 1,
                ReconcileState::Frozen | ReconcileState::Voided => {}
            }
        }

        report
    }

    /// The statement balance at which every cleared split is accounted for.
    pub fn statement_balance(&self) -> Numeric {
        self.reconciled_balance + self.cleared_total
    }

    pub fn render(&self) -> String {
        let mut table = Table::new();
        table.add_row(row![b->"Date", b->"Description", b->"Amount", b->"State"]);

        let sections = [
            ("Unreconciled", &self.unreconciled, "Unreconciled Total:", self.unreconciled_total),
            ("Cleared", &self.cleared, "Cleared Total:", self.cleared_total),
        ];
        for (title, lines, total_label, total) in sections {
            table.add_empty_row();
            table.add_row(row![b->format!("{} ({})", title, lines.len()), "", "", ""]);
            for line in lines.iter() {
                table.add_row(row![format_date(line.date), line.description, r->format_amount(&line.value), line.reconcile]);
            }
            table.add_row(row!["", i->total_label, r->format_amount(&total), ""]);
        }

        let mut out = format!("\nReconciliation: {}\n{}\n", self.account, table);
        let _ = writeln!(out, "Current balance:    {:>12}", format_amount(&self.balance));
        let _ = writeln!(out, "Cleared balance:    {:>12}", format_amount(&self.cleared_balance));
        let _ = writeln!(out, "Reconciled balance: {:>12}", format_amount(&self.reconciled_balance));
        let _ = writeln!(
            out,
            "Reconciled: {}  Cleared: {}  Unreconciled: {}",
            self.reconciled_count,
            self.cleared.len(),
            self.unreconciled.len()
        );
        let _ = writeln!(
            out,
            "If the statement balance is {}, all cleared items match.",
            format_amount(&self.statement_balance())
        );
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisLine {
    pub line: LedgerLine,
    pub debit: Option<Numeric>,
    pub credit: Option<Numeric>,
}

/// Debit and credit activity of one account.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountAnalysis {
    pub account: String,
    pub kind: AccountKind,
    pub balance: Numeric,
    pub cleared_balance: Numeric,
    pub reconciled_balance: Numeric,
    pub lines: Vec<AnalysisLine>,
    pub total_debits: Numeric,
    pub total_credits: Numeric,
}

impl AccountAnalysis {
    /// Non-negative values are debits, negative values credits of their
    /// magnitude, the same split as [`export_csv`] makes.
    pub fn from_account(account: &AccountSnapshot) -> Self {
        let mut analysis = AccountAnalysis {
            account: account.name.clone(),
            kind: account.kind,
            balance: account.balance,
            cleared_balance: account.cleared_balance,
            reconciled_balance: account.reconciled_balance,
            lines: Vec::with_capacity(account.splits.len()),
            total_debits: Numeric::ZERO,
            total_credits: Numeric::ZERO,
        };

        for split in &account.splits {
            let (debit, credit) = if split.value.is_negative() {
                let credit = -split.value;
                analysis.total_credits = analysis.total_credits + credit;
                (None, Some(credit))
            } else {
                analysis.total_debits = analysis.total_debits + split.value;
                (Some(split.value), None)
            };
            analysis.lines.push(AnalysisLine {
                line: split.into(),
                debit,
                credit,
            });
        }

        analysis
    }

    pub fn split_count(&self) -> usize {
        self.lines.len()
    }

    /// Debits less credits over the listed splits.
    pub fn net_change(&self) -> Numeric {
        self.total_debits - self.total_credits
    }

    pub fn render(&self) -> String {
        let amount = |n: &Option<Numeric>| n.as_ref().map(format_amount).unwrap_or_default();

        let mut table = Table::new();
        table.add_row(row![b->"Date", b->"Num", b->"Description", b->"Debit", b->"Credit", b->"Balance"]);
        for line in &self.lines {
            table.add_row(row![
                format_date(line.line.date),
                line.line.num,
                line.line.description,
                r->amount(&line.debit),
                r->amount(&line.credit),
                r->format_amount(&line.line.balance)
            ]);
        }
        table.add_empty_row();
        table.add_row(row![
            "",
            "",
            i->"Totals:",
            r->format_amount(&self.total_debits),
            r->format_amount(&self.total_credits),
            ""
        ]);

        let mut out = format!("\nAccount: {} [{}]\n{}\n", self.account, self.kind, table);
        let _ = writeln!(out, "Splits: {}  Net change: {}", self.split_count(), format_amount(&self.net_change()));
        let _ = writeln!(
            out,
            "Balance: {}  Cleared: {}  Reconciled: {}",
            format_amount(&self.balance),
            format_amount(&self.cleared_balance),
            format_amount(&self.reconciled_balance)
        );
        out
    }
}

/// Price list grouped by commodity, newest quote first within a group.
pub fn render_prices(prices: &[PriceSnapshot]) -> String {
    let mut sorted: Vec<&PriceSnapshot> = prices.iter().collect();
    sorted.sort_by(|a, b| a.commodity.cmp(&b.commodity).then(b.time.cmp(&a.time)));

    let mut table = Table::new();
    table.add_row(row![b->"Commodity", b->"Currency", b->"Date", b->"Value", b->"Type", b->"Source"]);
    for price in sorted {
        table.add_row(row![
            price.commodity,
            price.currency,
            format_date(price.time),
            r->price.value.to_decimal().map(|d| d.normalize().to_string()).unwrap_or_default(),
            price.kind,
            price.source
        ]);
    }

    format!("\n{}\n{} price(s)\n", table, prices.len())
}
