//! Favorites ("liked" products) container.

use crate::catalog::Product;
use crate::ids::ProductId;

/// Set of favorite products, kept in the order they were liked.
///
/// A product identifier appears at most once. No operation fails: adding
/// a present product or removing an absent one does nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Favorites {
    entries: Vec<Product>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `product` unless already present. Returns whether it was inserted.
    pub fn add_to_favorites(&mut self, product: &Product) -> bool {
        if self.is_favorite(&product.id) {
            return false;
        }
        self.entries.push(product.clone());
        true
    }

    /// Returns whether an entry was removed.
    pub fn remove_from_favorites(&mut self, product_id: &ProductId) -> bool {
        let len_before = self.entries.len();
        self.entries.retain(|p| &p.id != product_id);
        self.entries.len() < len_before
    }

    pub fn is_favorite(&self, product_id: &ProductId) -> bool {
        self.entries.iter().any(|p| &p.id == product_id)
    }

    /// Remove if present, add otherwise. Returns whether the product is a
    /// favorite afterwards.
    pub fn toggle_favorite(&mut self, product: &Product) -> bool {
        if self.remove_from_favorites(&product.id) {
            false
        } else {
            self.entries.push(product.clone());
            true
        }
    }

    pub fn clear_favorites(&mut self) {
        self.entries.clear();
    }

    pub fn total_favorites(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Favorite products, oldest first.
    pub fn entries(&self) -> &[Product] {
        &self.entries
    }

    pub fn get(&self, product_id: &ProductId) -> Option<&Product> {
        self.entries.iter().find(|p| &p.id == product_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &ProductId> {
        self.entries.iter().map(|p| &p.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn product(id: &str) -> Product {
        Product::new(id, format!("Produit {id}"), Money::xof(1000))
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut favs = Favorites::new();
        let p = product("p1");

        assert!(favs.add_to_favorites(&p));
        let once = favs.clone();
        assert!(!favs.add_to_favorites(&p));

        assert_eq!(favs, once);
        assert_eq!(favs.total_favorites(), 1);
    }

    #[test]
    fn test_toggle_twice_restores() {
        let mut favs = Favorites::new();
        favs.add_to_favorites(&product("p0"));
        let before = favs.clone();
        let p = product("p1");

        assert!(favs.toggle_favorite(&p));
        assert!(favs.is_favorite(&p.id));
        assert!(!favs.toggle_favorite(&p));
        assert_eq!(favs, before);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut favs = Favorites::new();
        favs.add_to_favorites(&product("p1"));
        assert!(!favs.remove_from_favorites(&ProductId::new("ghost")));
        assert_eq!(favs.total_favorites(), 1);
        assert!(favs.remove_from_favorites(&ProductId::new("p1")));
        assert!(favs.is_empty());
    }

    #[test]
    fn test_clear_and_order() {
        let mut favs = Favorites::new();
        for id in ["c", "a", "b"] {
            favs.add_to_favorites(&product(id));
        }
        let ids: Vec<&str> = favs.ids().map(ProductId::as_str).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(favs.get(&ProductId::new("a")).unwrap().name, "Produit a");

        favs.clear_favorites();
        assert_eq!(favs.total_favorites(), 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn toggle_is_an_involution(existing in proptest::collection::vec("[a-e]", 0..6), target in "[a-g]") {
                let mut favs = Favorites::new();
                for id in &existing {
                    favs.add_to_favorites(&product(id));
                }
                let before = favs.clone();
                let p = product(&target);

                favs.toggle_favorite(&p);
                favs.toggle_favorite(&p);

                // Re-adding moves the entry to the back, so compare as sets.
                let mut left: Vec<_> = favs.ids().cloned().collect();
                let mut right: Vec<_> = before.ids().cloned().collect();
                left.sort();
                right.sort();
                prop_assert_eq!(left, right);
            }

            #[test]
            fn ids_stay_unique(ops in proptest::collection::vec(("[a-d]", 0u8..3), 0..40)) {
                let mut favs = Favorites::new();
                for (id, op) in ops {
                    let p = product(&id);
                    match op {
                        0 => { favs.add_to_favorites(&p); }
                        1 => { favs.remove_from_favorites(&p.id); }
                        _ => { favs.toggle_favorite(&p); }
                    }
                }
                let mut ids: Vec<_> = favs.ids().cloned().collect();
                let total = ids.len();
                ids.sort();
                ids.dedup();
                prop_assert_eq!(ids.len(), total);
                prop_assert_eq!(favs.total_favorites(), total);
            }
        }
    }
}
