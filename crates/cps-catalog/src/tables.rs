//! Where each marketplace keeps its products: table, column names, and the
//! quirks that differ between the three tables.

use chrono::TimeDelta;
use cps_core::Marketplace;

/// Column layout of one marketplace's product table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    pub marketplace: Marketplace,
    pub table: &'static str,
    /// Explicit column list used for product reads.
    pub select: &'static str,
    pub name_column: &'static str,
    /// Category name, or for Penta the category code.
    pub category_column: &'static str,
    /// Column used for price sorting.
    pub sort_price_column: &'static str,
    pub timestamp_column: &'static str,
    /// Hours to add to stored timestamps to get UTC.
    pub clock_offset_hours: i64,
    /// Retry a failed explicit select with `select=*`.
    pub select_fallback: bool,
}

impl TableSpec {
    #[must_use]
    pub fn clock_offset(&self) -> TimeDelta {
        TimeDelta::hours(self.clock_offset_hours)
    }

    /// Name of the optional server-side distinct-categories function.
    #[must_use]
    pub fn distinct_categories_rpc(&self) -> String {
        format!("get_distinct_{}_categories", self.marketplace.key())
    }
}

pub const OKSID: TableSpec = TableSpec {
    marketplace: Marketplace::Oksid,
    table: "oksid_products",
    select: "id,name,url,price_1,price_2,currency,stock,category,last_updated,last_price",
    name_column: "name",
    category_column: "category",
    sort_price_column: "price_2",
    timestamp_column: "last_updated",
    clock_offset_hours: -3,
    select_fallback: false,
};

pub const PENTA: TableSpec = TableSpec {
    marketplace: Marketplace::Penta,
    table: "bayinet_products",
    select: "product_id,name,url,category_id,price,currency,stock_info,last_updated,last_price",
    name_column: "name",
    category_column: "category_id",
    sort_price_column: "price",
    timestamp_column: "last_updated",
    clock_offset_hours: -3,
    select_fallback: true,
};

pub const DENGE: TableSpec = TableSpec {
    marketplace: Marketplace::Denge,
    table: "denge_products",
    select: "id,product_id,name,category,special_price,list_price,currency,stock_info,last_updated,url,last_price",
    name_column: "name",
    category_column: "category",
    sort_price_column: "special_price",
    timestamp_column: "last_updated",
    clock_offset_hours: 0,
    select_fallback: false,
};

#[must_use]
pub fn table_for(marketplace: Marketplace) -> &'static TableSpec {
    match marketplace {
        Marketplace::Oksid => &OKSID,
        Marketplace::Penta => &PENTA,
        Marketplace::Denge => &DENGE,
    }
}
