use std::{os::raw::c_void, ptr::NonNull};

use gnucash_sys as ffi;

use super::{instance_guid, string_from_ptr, to_cstring, Book};
use crate::{
    date::Time64,
    error::{Error, Result},
    guid::Guid,
    numeric::Numeric,
    snapshot::PriceSnapshot,
};

pub use ffi::PriceSource;

/// A commodity registered in a book's commodity table. The table owns it.
pub struct Commodity {
    ptr: NonNull<ffi::gnc_commodity>,
}

unsafe impl Send for Commodity {}

impl Commodity {
    /// Looks `mnemonic` up in `namespace` (for example `CURRENCY` or
    /// `NASDAQ`), registering a new commodity with `fraction` smallest units
    /// when the book does not know it yet.
    pub fn find_or_create(book: &Book, namespace: &str, mnemonic: &str, fraction: i32) -> Result<Self> {
        let table = unsafe { ffi::gnc_commodity_table_get_table(book.as_ptr()) };
        if table.is_null() {
            return Err(Error::NullPointer("gnc_commodity_table_get_table"));
        }
        let c_namespace = to_cstring(namespace)?;
        let c_mnemonic = to_cstring(mnemonic)?;

        let found = unsafe { ffi::gnc_commodity_table_lookup(table, c_namespace.as_ptr(), c_mnemonic.as_ptr()) };
        if let Some(ptr) = NonNull::new(found) {
            return Ok(Self { ptr });
        }

        let created = unsafe {
            ffi::gnc_commodity_new(
                book.as_ptr(),
                c_mnemonic.as_ptr(),
                c_namespace.as_ptr(),
                c_mnemonic.as_ptr(),
                std::ptr::null(),
                fraction,
            )
        };
        if created.is_null() {
            return Err(Error::NullPointer("gnc_commodity_new"));
        }
        let inserted = unsafe { ffi::gnc_commodity_table_insert(table, created) };
        let ptr = NonNull::new(inserted).ok_or(Error::NullPointer("gnc_commodity_table_insert"))?;
        tracing::debug!(namespace, mnemonic, "Commodity registered");
        Ok(Self { ptr })
    }

    pub fn as_ptr(&self) -> *mut ffi::gnc_commodity {
        self.ptr.as_ptr()
    }

    pub fn mnemonic(&self) -> Option<String> {
        string_from_ptr(unsafe { ffi::gnc_commodity_get_mnemonic(self.as_ptr()) })
    }
}

fn mnemonic_of(commodity: *mut ffi::gnc_commodity) -> Option<String> {
    if commodity.is_null() {
        return None;
    }
    string_from_ptr(unsafe { ffi::gnc_commodity_get_mnemonic(commodity) })
}

/// One quote in the price database. Prices are reference counted; an owned
/// wrapper holds one reference and releases it on drop.
pub struct Price {
    ptr: NonNull<ffi::GNCPrice>,
    owned: bool,
}

unsafe impl Send for Price {}

impl Price {
    pub fn new(book: &Book) -> Result<Self> {
        let raw = unsafe { ffi::gnc_price_create(book.as_ptr()) };
        let ptr = NonNull::new(raw).ok_or(Error::NullPointer("gnc_price_create"))?;
        Ok(Self::from_raw(ptr, true))
    }

    pub(crate) fn from_raw(ptr: NonNull<ffi::GNCPrice>, owned: bool) -> Self {
        Self { ptr, owned }
    }

    pub(crate) fn from_ptr(raw: *mut ffi::GNCPrice) -> Option<Self> {
        NonNull::new(raw).map(|ptr| Self::from_raw(ptr, false))
    }

    pub fn as_ptr(&self) -> *mut ffi::GNCPrice {
        self.ptr.as_ptr()
    }

    pub fn guid(&self) -> Guid {
        instance_guid(self.as_ptr())
    }

    pub fn begin_edit(&self) {
        unsafe { ffi::gnc_price_begin_edit(self.as_ptr()) };
    }

    pub fn commit_edit(&self) {
        unsafe { ffi::gnc_price_commit_edit(self.as_ptr()) };
    }

    /// Mnemonic of the priced commodity.
    pub fn commodity(&self) -> Option<String> {
        mnemonic_of(unsafe { ffi::gnc_price_get_commodity(self.as_ptr()) })
    }

    pub fn set_commodity(&self, commodity: &Commodity) {
        unsafe { ffi::gnc_price_set_commodity(self.as_ptr(), commodity.as_ptr()) };
    }

    /// Mnemonic of the currency the value is expressed in.
    pub fn currency(&self) -> Option<String> {
        mnemonic_of(unsafe { ffi::gnc_price_get_currency(self.as_ptr()) })
    }

    pub fn set_currency(&self, currency: &Commodity) {
        unsafe { ffi::gnc_price_set_currency(self.as_ptr(), currency.as_ptr()) };
    }

    pub fn time(&self) -> Time64 {
        unsafe { ffi::gnc_price_get_time64(self.as_ptr()) }
    }

    pub fn set_time(&self, time: Time64) {
        unsafe { ffi::gnc_price_set_time64(self.as_ptr(), time) };
    }

    pub fn source(&self) -> PriceSource {
        unsafe { ffi::gnc_price_get_source(self.as_ptr()) }
    }

    pub fn set_source(&self, source: PriceSource) {
        unsafe { ffi::gnc_price_set_source(self.as_ptr(), source) };
    }

    /// The engine's name for [`source`](Self::source), e.g. `user:price`.
    pub fn source_string(&self) -> Option<String> {
        string_from_ptr(unsafe { ffi::gnc_price_get_source_string(self.as_ptr()) })
    }

    /// "last", "bid", "ask", "nav" or "unknown".
    pub fn type_string(&self) -> Option<String> {
        string_from_ptr(unsafe { ffi::gnc_price_get_typestr(self.as_ptr()) })
    }

    pub fn set_type_string(&self, kind: &str) -> Result<()> {
        let c = to_cstring(kind)?;
        unsafe { ffi::gnc_price_set_typestr(self.as_ptr(), c.as_ptr()) };
        Ok(())
    }

    pub fn value(&self) -> Numeric {
        unsafe { ffi::gnc_price_get_value(self.as_ptr()) }.into()
    }

    pub fn set_value(&self, value: Numeric) -> Result<()> {
        value.check()?;
        unsafe { ffi::gnc_price_set_value(self.as_ptr(), value.into()) };
        tracing::debug!(%value, "Price value set");
        Ok(())
    }

    /// A new price with commodity and currency swapped and the value
    /// inverted.
    pub fn invert(&self) -> Result<Price> {
        let raw = unsafe { ffi::gnc_price_invert(self.as_ptr()) };
        let ptr = NonNull::new(raw).ok_or(Error::NullPointer("gnc_price_invert"))?;
        Ok(Self::from_raw(ptr, true))
    }

    /// A copy of this price belonging to `book`.
    pub fn clone_in(&self, book: &Book) -> Result<Price> {
        let raw = unsafe { ffi::gnc_price_clone(self.as_ptr(), book.as_ptr()) };
        let ptr = NonNull::new(raw).ok_or(Error::NullPointer("gnc_price_clone"))?;
        Ok(Self::from_raw(ptr, true))
    }

    pub fn snapshot(&self) -> PriceSnapshot {
        PriceSnapshot {
            guid: self.guid(),
            commodity: self.commodity().unwrap_or_default(),
            currency: self.currency().unwrap_or_default(),
            time: self.time(),
            source: self.source_string().unwrap_or_default(),
            kind: self.type_string().unwrap_or_default(),
            value: self.value(),
        }
    }
}

impl PartialEq for Price {
    /// Same commodity, currency, time, source, type and value.
    fn eq(&self, other: &Self) -> bool {
        unsafe { ffi::gnc_price_equal(self.as_ptr(), other.as_ptr()) != 0 }
    }
}

impl Drop for Price {
    fn drop(&mut self) {
        if self.owned {
            unsafe { ffi::gnc_price_unref(self.as_ptr()) };
        }
    }
}

/// The price database of a book. It belongs to the book, so the wrapper
/// is always borrowed.
pub struct PriceDb {
    ptr: NonNull<ffi::GNCPriceDB>,
}

unsafe impl Send for PriceDb {}

impl PriceDb {
    pub fn get(book: &Book) -> Option<Self> {
        let raw = unsafe { ffi::gnc_pricedb_get_db(book.as_ptr()) };
        NonNull::new(raw).map(|ptr| Self { ptr })
    }

    pub fn as_ptr(&self) -> *mut ffi::GNCPriceDB {
        self.ptr.as_ptr()
    }

    pub fn begin_edit(&self) {
        unsafe { ffi::gnc_pricedb_begin_edit(self.as_ptr()) };
    }

    pub fn commit_edit(&self) {
        unsafe { ffi::gnc_pricedb_commit_edit(self.as_ptr()) };
    }

    /// Skips the per-price duplicate checks while loading many quotes.
    pub fn set_bulk_update(&self, bulk: bool) {
        unsafe { ffi::gnc_pricedb_set_bulk_update(self.as_ptr(), bulk as ffi::gboolean) };
    }

    /// Adds a reference to `price`. False when the engine rejects it, for
    /// example a price without commodity or currency.
    pub fn add_price(&self, price: &Price) -> bool {
        let added = unsafe { ffi::gnc_pricedb_add_price(self.as_ptr(), price.as_ptr()) != 0 };
        tracing::debug!(added, time = price.time(), "Price added");
        added
    }

    pub fn remove_price(&self, price: &Price) -> bool {
        unsafe { ffi::gnc_pricedb_remove_price(self.as_ptr(), price.as_ptr()) != 0 }
    }

    pub fn price_count(&self) -> usize {
        unsafe { ffi::gnc_pricedb_get_num_prices(self.as_ptr()) as usize }
    }

    pub fn lookup(book: &Book, guid: &Guid) -> Option<Price> {
        let guid: ffi::GncGUID = (*guid).into();
        Price::from_ptr(unsafe { ffi::gnc_price_lookup(&guid, book.as_ptr()) })
    }

    /// Every price in the database, ordered by commodity, currency and time.
    pub fn prices(&self) -> Vec<PriceSnapshot> {
        let mut out: Vec<PriceSnapshot> = Vec::new();
        unsafe {
            ffi::gnc_pricedb_foreach_price(
                self.as_ptr(),
                Some(collect_price),
                (&mut out as *mut Vec<PriceSnapshot>).cast::<c_void>(),
                1,
            )
        };
        out
    }
}

unsafe extern "C" fn collect_price(price: *mut ffi::GNCPrice, data: ffi::gpointer) -> ffi::gboolean {
    // `data` is the vector handed to `gnc_pricedb_foreach_price` by `prices`.
    let out = unsafe { &mut *data.cast::<Vec<PriceSnapshot>>() };
    if let Some(price) = Price::from_ptr(price) {
        out.push(price.snapshot());
    }
    1
}
