//! Product listing module.
//!
//! Filters, sorting and pagination over the in-memory catalog, as used by
//! product grids and the search bar.

mod filter;
mod query;
mod results;

pub use filter::Filter;
pub use query::{SearchQuery, SortOption, DEFAULT_PER_PAGE, MAX_PER_PAGE};
pub use results::{Pagination, SearchResults};
