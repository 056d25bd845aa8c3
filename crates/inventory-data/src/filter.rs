//! Conjunctive filtering over the canonical collection.

use inventory_core::catalog;
use inventory_core::models::{FilterSpec, Resource};

/// A [`FilterSpec`] with its search term lowered once up front.
#[derive(Debug, Clone)]
pub struct CompiledFilter<'a> {
    account_id: Option<&'a str>,
    region: Option<&'a str>,
    source_file: Option<&'a str>,
    search: Option<String>,
    category: Option<&'a str>,
}

impl<'a> CompiledFilter<'a> {
    pub fn new(spec: &'a FilterSpec) -> Self {
        Self {
            account_id: FilterSpec::active(&spec.account_id),
            region: FilterSpec::active(&spec.region),
            source_file: FilterSpec::active(&spec.source_file),
            search: spec.active_search().map(str::to_lowercase),
            category: FilterSpec::active(&spec.category),
        }
    }

    /// `true` when `resource` satisfies every active criterion.
    pub fn matches(&self, resource: &Resource) -> bool {
        eq_or_unset(self.account_id, &resource.account_id)
            && eq_or_unset(self.region, &resource.region)
            && eq_or_unset(self.source_file, &resource.source_file)
            && self.matches_search(resource)
            && self.matches_category(resource)
    }

    fn matches_search(&self, resource: &Resource) -> bool {
        let Some(term) = self.search.as_deref() else {
            return true;
        };
        resource.service.to_lowercase().contains(term)
            || resource.resource_type.to_lowercase().contains(term)
            || resource.tags_json().to_lowercase().contains(term)
    }

    fn matches_category(&self, resource: &Resource) -> bool {
        match self.category {
            None => true,
            // An unknown category matches nothing.
            Some(name) => catalog::category(name)
                .map(|c| c.contains(&resource.service))
                .unwrap_or(false),
        }
    }
}

fn eq_or_unset(wanted: Option<&str>, actual: &str) -> bool {
    wanted.map_or(true, |w| w == actual)
}

/// `true` when `resource` satisfies `spec`.
pub fn matches(resource: &Resource, spec: &FilterSpec) -> bool {
    CompiledFilter::new(spec).matches(resource)
}

/// Ordered subsequence of `resources` satisfying `spec`.
pub fn apply<'r>(resources: &'r [Resource], spec: &FilterSpec) -> Vec<&'r Resource> {
    let compiled = CompiledFilter::new(spec);
    resources.iter().filter(|r| compiled.matches(r)).collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
