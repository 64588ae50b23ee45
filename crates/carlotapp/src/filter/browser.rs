use super::key::FilterKey;
use super::set::{apply_filters, FilterSet};
use super::value::RangeBound;
use crate::error::Result;
use crate::model::Listing;

/// A browse page: the candidate list fetched once, plus the live filtered view.
///
/// Every mutation recomputes the view before returning, so readers never
/// observe a view that lags the filters.
#[derive(Debug, Clone)]
pub struct ListingBrowser {
    candidates: Vec<Listing>,
    filters: FilterSet,
    visible: Vec<Listing>,
}

impl ListingBrowser {
    pub fn new(candidates: Vec<Listing>) -> Self {
        Self {
            visible: candidates.clone(),
            candidates,
            filters: FilterSet::new(),
        }
    }

    pub fn with_filters(candidates: Vec<Listing>, filters: FilterSet) -> Self {
        let visible = apply_filters(&candidates, &filters);
        Self {
            candidates,
            filters,
            visible,
        }
    }

    pub fn candidates(&self) -> &[Listing] {
        &self.candidates
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn visible(&self) -> &[Listing] {
        &self.visible
    }

    /// Set a filter from raw input. On a parse error the view is unchanged.
    pub fn set_filter(&mut self, key: FilterKey, raw: &str) -> Result<&[Listing]> {
        self.filters.set(key, raw)?;
        Ok(self.refresh())
    }

    pub fn set_range(&mut self, key: FilterKey, range: RangeBound) -> &[Listing] {
        self.filters.set_range(key, range);
        self.refresh()
    }

    pub fn unset_filter(&mut self, key: FilterKey) -> &[Listing] {
        self.filters.unset(key);
        self.refresh()
    }

    /// Drop every filter and show the full candidate list again.
    pub fn clear_filters(&mut self) -> &[Listing] {
        self.filters.clear();
        self.refresh()
    }

    /// Swap in a freshly fetched candidate list, keeping the filters.
    pub fn replace_candidates(&mut self, candidates: Vec<Listing>) -> &[Listing] {
        self.candidates = candidates;
        self.refresh()
    }

    fn refresh(&mut self) -> &[Listing] {
        self.visible = apply_filters(&self.candidates, &self.filters);
        &self.visible
    }
}
