//! Exercises the live engine; needs libgnc-engine at link time.
#![cfg(feature = "engine")]

use gnucash::{
    init_engine, Account, AccountKind, Book, Commodity, Error, Numeric, Price, PriceDb, PriceSource,
    ReconcileState, Session, SessionOpenMode, Split, Transaction,
};
use gnucash_sys::GNCAccountType;

fn create_account(book: &Book, parent: &Account, name: &str, kind: AccountKind) -> Account {
    let mut account = Account::new(book).unwrap();
    account.begin_edit();
    account.set_name(name).unwrap();
    account.set_kind(kind);
    account.commit_edit();
    parent.append_child(&account);
    account.mark_unowned();
    account
}

fn post_groceries(book: &Book, bank: &Account, groceries: &Account) -> Transaction {
    let mut txn = Transaction::new(book).unwrap();
    txn.begin_edit();
    txn.set_description("Weekly grocery shopping").unwrap();
    txn.set_num("1001").unwrap();
    txn.set_date(15, 1, 2024).unwrap();

    let mut expense = Split::new(book).unwrap();
    expense.set_account(groceries);
    expense.set_transaction(&txn);
    expense.set_memo("Groceries").unwrap();
    expense.set_amount(Numeric::new(5000, 100)).unwrap();
    expense.set_value(Numeric::new(5000, 100)).unwrap();

    let mut payment = Split::new(book).unwrap();
    payment.set_account(bank);
    payment.set_transaction(&txn);
    payment.set_memo("Debit card").unwrap();
    payment.set_amount(Numeric::new(-5000, 100)).unwrap();
    payment.set_value(Numeric::new(-5000, 100)).unwrap();
    payment.set_reconcile_state(ReconcileState::Cleared);

    txn.commit_edit();
    txn.mark_unowned();
    txn
}

#[test]
fn test_create_transaction() {
    init_engine();
    let book = Book::new().unwrap();
    let root = book.root_account().unwrap();
    assert!(root.is_root());

    let assets = create_account(&book, &root, "Assets", AccountKind::Asset);
    let bank = create_account(&book, &assets, "Checking", AccountKind::Bank);
    let expenses = create_account(&book, &root, "Expenses", AccountKind::Expense);
    let groceries = create_account(&book, &expenses, "Groceries", AccountKind::Expense);

    assert_eq!(bank.full_name().unwrap(), "Assets:Checking");
    assert_eq!(bank.kind(), Some(AccountKind::Bank));
    assert_eq!(root.children().len(), 2);
    assert_eq!(root.descendants().count(), 4);
    assert_eq!(
        root.lookup_by_full_name("Expenses:Groceries").unwrap().unwrap().name().unwrap(),
        "Groceries"
    );

    let txn = post_groceries(&book, &bank, &groceries);
    assert_eq!(txn.description().unwrap(), "Weekly grocery shopping");
    assert_eq!(txn.split_count(), 2);
    assert_eq!(txn.splits().len(), 2);
    assert!(txn.imbalance_value().is_zero());

    assert_eq!(bank.balance(), Numeric::new(-5000, 100));
    assert_eq!(groceries.balance(), Numeric::new(5000, 100));
    assert_eq!(bank.cleared_balance(), Numeric::new(-5000, 100));
    assert_eq!(bank.splits().count(), 1);
}

#[test]
fn test_book_snapshot() {
    init_engine();
    let book = Book::new().unwrap();
    let root = book.root_account().unwrap();
    let bank = create_account(&book, &root, "Checking", AccountKind::Bank);
    let groceries = create_account(&book, &root, "Groceries", AccountKind::Expense);
    post_groceries(&book, &bank, &groceries);

    let snapshot = book.snapshot().unwrap();
    assert_eq!(snapshot.guid, book.guid());
    assert_eq!(snapshot.account_count(), 2);
    assert_eq!(snapshot.transaction_count(), 1);

    let checking = snapshot.root.lookup_path("Checking").unwrap();
    assert_eq!(checking.splits.len(), 1);
    assert_eq!(checking.splits[0].description, "Weekly grocery shopping");
    assert_eq!(checking.splits[0].memo, "Debit card");
    assert_eq!(checking.splits[0].reconcile, ReconcileState::Cleared);
}

#[test]
fn test_interior_nul_is_rejected() {
    init_engine();
    let book = Book::new().unwrap();
    let account = Account::new(&book).unwrap();
    account.begin_edit();
    assert!(matches!(account.set_name("bad\0name"), Err(Error::InvalidString(_))));
    account.commit_edit();
    assert_eq!(account.name().unwrap_or_default(), "");
}

#[test]
fn test_untyped_account_is_left_out_of_snapshot() {
    init_engine();
    let book = Book::new().unwrap();
    let root = book.root_account().unwrap();
    create_account(&book, &root, "Checking", AccountKind::Bank);
    let untyped = create_account(&book, &root, "Untyped", AccountKind::Asset);
    untyped.begin_edit();
    untyped.set_type(GNCAccountType::ACCT_TYPE_NONE);
    untyped.commit_edit();
    create_account(&book, &untyped, "Nested", AccountKind::Asset);

    assert_eq!(untyped.kind(), None);
    assert!(matches!(
        AccountKind::try_from(GNCAccountType::ACCT_TYPE_NONE),
        Err(Error::UnknownAccountType(-1))
    ));

    let snapshot = book.snapshot().unwrap();
    assert_eq!(snapshot.account_count(), 1);
    assert!(snapshot.root.lookup_path("Untyped").is_none());
    assert_eq!(snapshot.root.kind, AccountKind::Root);
}

fn quote(book: &Book, eur: &Commodity, usd: &Commodity, time: i64, cents: i64) -> Price {
    let price = Price::new(book).unwrap();
    price.begin_edit();
    price.set_commodity(eur);
    price.set_currency(usd);
    price.set_time(time);
    price.set_source(PriceSource::PRICE_SOURCE_USER_PRICE);
    price.set_type_string("last").unwrap();
    price.set_value(Numeric::new(cents, 100)).unwrap();
    price.commit_edit();
    price
}

#[test]
fn test_price_database() {
    init_engine();
    let book = Book::new().unwrap();
    let eur = Commodity::find_or_create(&book, "CURRENCY", "EUR", 100).unwrap();
    let usd = Commodity::find_or_create(&book, "CURRENCY", "USD", 100).unwrap();
    assert_eq!(eur.mnemonic().unwrap(), "EUR");

    let db = PriceDb::get(&book).unwrap();
    let january = quote(&book, &eur, &usd, 1_704_067_200, 108);
    let february = quote(&book, &eur, &usd, 1_706_745_600, 110);
    assert!(db.add_price(&january));
    assert!(db.add_price(&february));
    assert_eq!(db.price_count(), 2);
    assert!(january == january);
    assert!(january != february);

    let found = PriceDb::lookup(&book, &january.guid()).unwrap();
    assert_eq!(found.value(), Numeric::new(108, 100));
    assert_eq!(found.type_string().unwrap(), "last");

    let inverted = january.invert().unwrap();
    assert_eq!(inverted.commodity().unwrap(), "USD");
    assert_eq!(inverted.value(), Numeric::new(100, 108));

    let snapshot = book.snapshot().unwrap();
    assert_eq!(snapshot.prices.len(), 2);
    assert_eq!(snapshot.prices_for("EUR")[0].time, 1_706_745_600);
    assert!(snapshot.prices.iter().all(|p| p.currency == "USD"));

    assert!(db.remove_price(&february));
    assert_eq!(db.price_count(), 1);
}

#[test]
fn test_price_without_commodity_is_rejected() {
    init_engine();
    let book = Book::new().unwrap();
    let db = book.price_db().unwrap();
    let price = Price::new(&book).unwrap();
    assert!(matches!(price.set_value(Numeric::new(1, 0)), Err(Error::Numeric(_))));
    assert!(!db.add_price(&price));
    assert_eq!(db.price_count(), 0);
}

#[test]
fn test_session_ends_once() {
    init_engine();
    let dir = tempfile::tempdir().unwrap();
    let uri = format!("xml://{}", dir.path().join("books.gnucash").display());
    let mut session = Session::open(&uri, SessionOpenMode::SESSION_NEW_STORE).unwrap();
    assert!(!session.is_ended());
    assert!(session.book().is_some());

    session.end();
    assert!(session.is_ended());
    // Ending again, and dropping afterwards, leave the backend alone.
    session.end();
    drop(session);
}
