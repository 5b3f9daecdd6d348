// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{FilterField, Filters, QueryState, SortDirection, SortField};

/// Canonical description of one list request, derived purely from query state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: u32,
    pub offset: u64,
    pub filters: Filters,
    pub sort: SortField,
    pub order: SortDirection,
}

impl ListQuery {
    pub fn from_state(state: &QueryState, page_size: u32) -> Self {
        let offset = u64::from(state.page() - 1) * u64::from(page_size);
        Self {
            limit: page_size,
            offset,
            filters: state.filters.clone(),
            sort: state.sort,
            order: state.order,
        }
    }

    /// Wire parameters in the store's expected order. Empty filters are sent as
    /// empty strings; the store treats them as unconstrained.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(7);
        pairs.push(("limit", self.limit.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        for field in FilterField::ALL {
            pairs.push((field.as_str(), self.filters.get(field).to_owned()));
        }
        pairs.push(("sort", self.sort.as_str().to_owned()));
        pairs.push(("order", self.order.as_str().to_owned()));
        pairs
    }
}
