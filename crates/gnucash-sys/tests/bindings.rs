//! Checks that a binding pass surfaced declarations from every header in
//! `wrapper.h`. Needs a GnuCash build, so it only runs with `engine`.
#![cfg(feature = "engine")]

use std::mem::size_of;

use gnucash_sys as ffi;

#[test]
fn test_core_type_declarations() {
    // guid.h
    assert_eq!(size_of::<ffi::GncGUID>(), 16);
    assert!(!(ffi::guid_to_string_buff as *const ()).is_null());
    // gnc-numeric.h
    assert_eq!(size_of::<ffi::gnc_numeric>(), 16);
    assert!(!(ffi::gnc_numeric_add as *const ()).is_null());
    // gnc-date.h
    let _: ffi::time64 = 0i64;
    assert!(!(ffi::gnc_time as *const ()).is_null());
}

#[test]
fn test_entity_declarations() {
    assert!(!(ffi::qof_book_new as *const ()).is_null());
    assert!(!(ffi::xaccMallocAccount as *const ()).is_null());
    assert!(!(ffi::xaccMallocTransaction as *const ()).is_null());
    assert!(!(ffi::xaccMallocSplit as *const ()).is_null());
}

#[test]
fn test_price_declarations() {
    assert!(!(ffi::gnc_pricedb_get_db as *const ()).is_null());
    assert!(!(ffi::gnc_price_create as *const ()).is_null());
    assert!(!(ffi::gnc_pricedb_foreach_price as *const ()).is_null());
    assert_ne!(ffi::PriceSource::PRICE_SOURCE_EDIT_DLG, ffi::PriceSource::PRICE_SOURCE_INVALID);
}

#[test]
fn test_session_declarations() {
    assert!(!(ffi::qof_session_new as *const ()).is_null());
    assert!(!(ffi::gnc_engine_init as *const ()).is_null());
}

#[test]
fn test_rustified_enums() {
    assert_ne!(
        ffi::GNCAccountType::ACCT_TYPE_BANK,
        ffi::GNCAccountType::ACCT_TYPE_EXPENSE
    );
    assert_eq!(ffi::GNCAccountType::ACCT_TYPE_BANK as i32, 0);
}

#[test]
fn test_numeric_round_trip_through_engine() {
    let a = ffi::gnc_numeric { num: 1, denom: 4 };
    let b = ffi::gnc_numeric { num: 1, denom: 4 };
    let sum = unsafe { ffi::gnc_numeric_add(a, b, 4, 0) };
    assert_eq!(sum.num, 2);
    assert_eq!(sum.denom, 4);
}
