//! Search query builder and in-memory execution.

use std::cmp::Ordering;

use crate::catalog::{Catalog, Product};
use crate::search::{Filter, Pagination, SearchResults};
use serde::{Deserialize, Serialize};

/// Default page size of product grids.
pub const DEFAULT_PER_PAGE: usize = 12;

/// Largest page size a caller may request.
pub const MAX_PER_PAGE: usize = 100;

/// Sort options for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortOption {
    /// Catalog order.
    #[default]
    Featured,
    /// Effective price, low to high.
    PriceAsc,
    /// Effective price, high to low.
    PriceDesc,
    /// Name A-Z.
    NameAsc,
    /// Name Z-A.
    NameDesc,
    /// Highest rated first; unrated products last.
    Rating,
}

impl SortOption {
    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Featured => "En vedette",
            SortOption::PriceAsc => "Prix croissant",
            SortOption::PriceDesc => "Prix décroissant",
            SortOption::NameAsc => "Nom : A-Z",
            SortOption::NameDesc => "Nom : Z-A",
            SortOption::Rating => "Mieux notés",
        }
    }

    /// Parse a command-line style name such as `price-asc`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().replace('_', "-").as_str() {
            "featured" => Some(SortOption::Featured),
            "price-asc" => Some(SortOption::PriceAsc),
            "price-desc" => Some(SortOption::PriceDesc),
            "name-asc" => Some(SortOption::NameAsc),
            "name-desc" => Some(SortOption::NameDesc),
            "rating" => Some(SortOption::Rating),
            _ => None,
        }
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        match self {
            SortOption::Featured => Ordering::Equal,
            SortOption::PriceAsc => a.effective_price().amount.cmp(&b.effective_price().amount),
            SortOption::PriceDesc => b.effective_price().amount.cmp(&a.effective_price().amount),
            SortOption::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortOption::NameDesc => b.name.to_lowercase().cmp(&a.name.to_lowercase()),
            SortOption::Rating => match (a.rating, b.rating) {
                (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

/// A product listing query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Filters, all of which must match.
    pub filters: Vec<Filter>,
    pub sort: SortOption,
    /// Current page (1-indexed).
    pub page: usize,
    pub per_page: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchQuery {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            sort: SortOption::Featured,
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    /// Add a free-text filter; blank text is ignored.
    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        let q = q.into();
        if !q.trim().is_empty() {
            self.filters.push(Filter::Text(q));
        }
        self
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    /// Set pagination; page is at least 1, per_page is clamped to 1..=100.
    pub fn with_pagination(mut self, page: usize, per_page: usize) -> Self {
        self.page = page.max(1);
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn offset(&self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.filters.iter().all(|f| f.matches(product))
    }

    /// Filter, sort and page through the catalog.
    ///
    /// The sort is stable, so ties keep catalog order. A page past the end
    /// yields no items but still reports the real totals.
    pub fn run(&self, catalog: &Catalog) -> SearchResults<Product> {
        let mut hits: Vec<&Product> = catalog
            .products()
            .iter()
            .filter(|p| self.matches(p))
            .collect();
        hits.sort_by(|a, b| self.sort.compare(a, b));

        let pagination = Pagination::new(self.page.max(1), self.per_page, hits.len());
        let items = hits
            .into_iter()
            .skip(self.offset())
            .take(self.per_page)
            .cloned()
            .collect();

        SearchResults::new(items, pagination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn catalog() -> Catalog {
        Catalog::from_products(vec![
            Product::new("a", "Calebasse", Money::xof(3000)).with_stock(5).with_rating(4.0),
            Product::new("b", "Bracelet", Money::xof(1500)).with_stock(0),
            Product::new("c", "Tabouret", Money::xof(9000))
                .with_promo(Money::xof(2500))
                .with_stock(1)
                .with_rating(4.8),
            Product::new("d", "Masque", Money::xof(25000)).with_stock(2),
        ])
        .unwrap()
    }

    fn ids(results: &SearchResults<Product>) -> Vec<&str> {
        results.items.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_query_builder() {
        let query = SearchQuery::new()
            .with_query("wax")
            .with_filter(Filter::in_stock())
            .with_sort(SortOption::PriceAsc)
            .with_pagination(2, 10);

        assert_eq!(query.page, 2);
        assert_eq!(query.per_page, 10);
        assert_eq!(query.offset(), 10);
        assert_eq!(query.filters.len(), 2);
    }

    #[test]
    fn test_pagination_clamped() {
        let query = SearchQuery::new().with_pagination(0, 1000);
        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, MAX_PER_PAGE);
    }

    #[test]
    fn test_price_sort_uses_promo() {
        let results = SearchQuery::new()
            .with_sort(SortOption::PriceAsc)
            .run(&catalog());
        assert_eq!(ids(&results), vec!["b", "c", "a", "d"]);
    }

    #[test]
    fn test_filter_and_featured_order() {
        let results = SearchQuery::new()
            .with_filter(Filter::in_stock())
            .run(&catalog());
        assert_eq!(ids(&results), vec!["a", "c", "d"]);
        assert_eq!(results.pagination.total, 3);
    }

    #[test]
    fn test_rating_sort_puts_unrated_last() {
        let results = SearchQuery::new().with_sort(SortOption::Rating).run(&catalog());
        assert_eq!(ids(&results), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn test_paging() {
        let query = SearchQuery::new()
            .with_sort(SortOption::NameAsc)
            .with_pagination(2, 3);
        let results = query.run(&catalog());
        assert_eq!(ids(&results), vec!["c"]);
        assert_eq!(results.pagination.total_pages, 2);
        assert!(!results.pagination.has_next);

        let past_end = SearchQuery::new().with_pagination(5, 3).run(&catalog());
        assert!(past_end.is_empty());
        assert_eq!(past_end.pagination.total, 4);
    }

    #[test]
    fn test_huge_page_is_past_the_end() {
        let query = SearchQuery::new().with_pagination(usize::MAX, 2);
        assert_eq!(query.offset(), usize::MAX);

        let results = query.run(&catalog());
        assert!(results.is_empty());
        assert_eq!(results.pagination.total, catalog().len());
        assert!(!results.pagination.has_next);
    }

    #[test]
    fn test_sort_from_name() {
        assert_eq!(SortOption::from_name("price-desc"), Some(SortOption::PriceDesc));
        assert_eq!(SortOption::from_name("NAME_ASC"), Some(SortOption::NameAsc));
        assert_eq!(SortOption::from_name("random"), None);
    }
}
