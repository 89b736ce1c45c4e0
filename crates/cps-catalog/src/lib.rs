//! Cross-marketplace product catalog.
//!
//! Three marketplace tables with different schemas are normalized into one
//! [`cps_core::Product`] shape ([`normalize`]) and queried together through
//! [`CatalogEngine`]: name search, category filtering, cross-store price
//! comparison, paginated browsing and category listing.

pub mod browse;
mod categories;
pub mod category_codes;
pub mod collate;
pub mod engine;
pub mod normalize;
pub mod price_format;
pub mod raw;
pub mod source;
pub mod stock;
pub mod tables;

#[cfg(test)]
mod test_support;

pub use browse::{parse_timestamp, BrowseOptions, SortOrder, UnknownSortOrder};
pub use engine::{sort_for_comparison, CatalogEngine, DEFAULT_CATEGORY_PAGE_SIZE};
pub use normalize::{
    normalize_row, normalize_rows, DengeNormalizer, Normalizer, OksidNormalizer, PentaNormalizer,
};
pub use source::ProductSource;
pub use tables::{table_for, TableSpec};
