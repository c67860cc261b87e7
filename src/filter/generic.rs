//! Generic filtering framework
//!
//! Predicates over domain entities that can be combined and applied to a slice
//! while keeping the input order.

use std::collections::HashSet;
use std::fmt::Debug;

/// A predicate that can be applied to any entity type
pub trait RecordFilter<T>: Debug + Send + Sync {
    /// Whether `item` passes the filter
    fn matches(&self, item: &T) -> bool;

    /// Returns the set of fields inspected by this filter
    fn required_fields(&self) -> HashSet<&'static str>;
}

/// A filter that always includes all elements
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAllFilter;

impl<T> RecordFilter<T> for IncludeAllFilter {
    fn matches(&self, _item: &T) -> bool {
        true
    }

    fn required_fields(&self) -> HashSet<&'static str> {
        HashSet::new()
    }
}

/// A filter that combines multiple filters with a logical AND
#[derive(Debug)]
pub struct AndFilter<T> {
    filters: Vec<Box<dyn RecordFilter<T>>>,
}

impl<T> Default for AndFilter<T> {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
        }
    }
}

impl<T> AndFilter<T> {
    /// Create a new AND filter
    #[must_use]
    pub fn new(filters: Vec<Box<dyn RecordFilter<T>>>) -> Self {
        Self { filters }
    }

    /// Add another filter to the conjunction
    #[must_use]
    pub fn with(mut self, filter: impl RecordFilter<T> + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<T: Debug> RecordFilter<T> for AndFilter<T> {
    fn matches(&self, item: &T) -> bool {
        // An empty conjunction includes everything
        self.filters.iter().all(|f| f.matches(item))
    }

    fn required_fields(&self) -> HashSet<&'static str> {
        self.filters
            .iter()
            .flat_map(|f| f.required_fields())
            .collect()
    }
}

/// Apply a filter to a slice, cloning the matching items in input order
#[must_use]
pub fn apply_filter<T: Clone>(items: &[T], filter: &dyn RecordFilter<T>) -> Vec<T> {
    items
        .iter()
        .filter(|item| filter.matches(item))
        .cloned()
        .collect()
}
