//! Binding Tables
//!
//! Insertion-ordered `name → index` tables, one per [`BindingCategory`].
//!
//! The two-pass compiler feeds the tables derived from the first pass back
//! into code generation and later recomputes them from the second pass; the
//! comparison is only meaningful if iteration order is a pure function of
//! insertion order. A hash map alone cannot guarantee that, so each table is
//! an append-only name list with a separate lookup index.

use rustc_hash::FxHashMap;

use crate::stage::{BindingCategory, CategoryMap};

/// Dense, 0-based, insertion-ordered name table for one category.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    names: Vec<String>,
    lookup: FxHashMap<String, u32>,
}

impl BindingTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `name` if unseen and returns its index. The first insertion of
    /// a name fixes its index for the lifetime of the table.
    pub fn insert(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.lookup.get(name) {
            return index;
        }
        let index = self.names.len() as u32;
        self.names.push(name.to_owned());
        self.lookup.insert(name.to_owned(), index);
        index
    }

    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u32> {
        self.lookup.get(name).copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in index order.
    #[inline]
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

impl PartialEq for BindingTable {
    fn eq(&self, other: &Self) -> bool {
        self.names == other.names
    }
}

impl Eq for BindingTable {}

impl<S: AsRef<str>> FromIterator<S> for BindingTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut table = Self::new();
        for name in iter {
            table.insert(name.as_ref());
        }
        table
    }
}

/// One [`BindingTable`] per category.
pub type BindingTables = CategoryMap<BindingTable>;

impl BindingTables {
    /// Total number of names across all categories.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.values().map(BindingTable::len).sum()
    }

    /// Returns the first category whose table differs from `other`'s.
    #[must_use]
    pub fn first_divergence(&self, other: &Self) -> Option<BindingCategory> {
        BindingCategory::ALL
            .into_iter()
            .find(|&category| self[category] != other[category])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_assigns_dense_indices_first_seen_wins() {
        let mut table = BindingTable::new();
        assert_eq!(table.insert("camera"), 0);
        assert_eq!(table.insert("lights"), 1);
        assert_eq!(table.insert("camera"), 0);
        assert_eq!(table.insert("model"), 2);

        assert_eq!(table.len(), 3);
        assert_eq!(table.names(), &["camera", "lights", "model"]);
        assert_eq!(table.get("lights"), Some(1));
        assert_eq!(table.get("missing"), None);
    }

    #[test]
    fn equality_depends_on_order() {
        let a: BindingTable = ["a", "b"].into_iter().collect();
        let b: BindingTable = ["a", "b"].into_iter().collect();
        let c: BindingTable = ["b", "a"].into_iter().collect();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn first_divergence_reports_category() {
        let mut lhs = BindingTables::default();
        let mut rhs = BindingTables::default();
        lhs[BindingCategory::Sampler].insert("linear");
        rhs[BindingCategory::Sampler].insert("linear");
        assert_eq!(lhs.first_divergence(&rhs), None);

        rhs[BindingCategory::UnorderedAccessView].insert("output");
        assert_eq!(
            lhs.first_divergence(&rhs),
            Some(BindingCategory::UnorderedAccessView)
        );
        assert_eq!(rhs.total_len(), 2);
    }
}
