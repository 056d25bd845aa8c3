//! Grouped statistics over a filtered view.
//!
//! Every table is computed from scratch on each call; callers that need
//! memoization keep the results themselves. Grouping preserves
//! first-encountered order, so ties in a count-sorted table keep the order
//! in which their keys first appeared in the view.

use std::collections::HashSet;

use indexmap::IndexMap;
use inventory_core::catalog;
use inventory_core::models::Resource;
use serde::Serialize;

/// Maximum number of rows in the tag-frequency table.
pub const TAG_FREQUENCY_LIMIT: usize = 10;

// ── Row types ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStats {
    pub service: String,
    pub count: usize,
    /// Distinct accounts owning resources of this service.
    pub accounts: usize,
    /// Distinct regions hosting resources of this service.
    pub regions: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStats {
    pub region: String,
    /// Friendly name, or the raw identifier when the region is unknown.
    pub name: String,
    pub count: usize,
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountStats {
    pub account: String,
    pub count: usize,
    /// Distinct services used by this account.
    pub services: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// All five statistics tables for one view.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregates {
    pub by_service: Vec<ServiceStats>,
    pub by_region: Vec<RegionStats>,
    pub by_account: Vec<AccountStats>,
    pub by_category: Vec<CategoryCount>,
    pub tag_frequency: Vec<TagCount>,
}

/// How much of a view carries tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct TagCoverage {
    pub tagged: usize,
    pub total: usize,
    /// `tagged / total * 100`, zero for an empty view.
    pub percent: f64,
}

/// Resources of one category, broken down by service.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryDetail {
    pub category: String,
    pub count: usize,
    pub accounts: usize,
    pub regions: usize,
    /// Per-service resource counts within the category, descending.
    pub services: Vec<ServiceStats>,
}

/// Headline numbers for a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub resources: usize,
    pub services: usize,
    pub regions: usize,
    pub accounts: usize,
}

// ── InventoryAggregator ───────────────────────────────────────────────────────

/// Stateless helper that groups resources of a view.
pub struct InventoryAggregator;

impl InventoryAggregator {
    /// Compute all five tables.
    pub fn aggregate(view: &[&Resource]) -> Aggregates {
        Aggregates {
            by_service: Self::by_service(view),
            by_region: Self::by_region(view),
            by_account: Self::by_account(view),
            by_category: Self::by_category(view),
            tag_frequency: Self::tag_frequency(view),
        }
    }

    /// Group by service, sorted by count descending.
    pub fn by_service(view: &[&Resource]) -> Vec<ServiceStats> {
        let mut rows: Vec<ServiceStats> = group_by(view, |r| &r.service)
            .into_iter()
            .map(|(service, items)| ServiceStats {
                service: service.to_string(),
                count: items.len(),
                accounts: distinct(&items, |r| &r.account_id),
                regions: distinct(&items, |r| &r.region),
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows
    }

    /// Group by region, in first-encountered order.
    pub fn by_region(view: &[&Resource]) -> Vec<RegionStats> {
        group_by(view, |r| &r.region)
            .into_iter()
            .map(|(region, items)| {
                let info = catalog::region_info(region);
                RegionStats {
                    region: region.to_string(),
                    name: info.map(|i| i.name).unwrap_or(region).to_string(),
                    count: items.len(),
                    lat: info.map(|i| i.lat).unwrap_or(0.0),
                    lng: info.map(|i| i.lng).unwrap_or(0.0),
                }
            })
            .collect()
    }

    /// Group by account, in first-encountered order.
    pub fn by_account(view: &[&Resource]) -> Vec<AccountStats> {
        group_by(view, |r| &r.account_id)
            .into_iter()
            .map(|(account, items)| AccountStats {
                account: account.to_string(),
                count: items.len(),
                services: distinct(&items, |r| &r.service),
            })
            .collect()
    }

    /// Per-category counts in catalog order; empty categories are omitted.
    ///
    /// Categories overlap, so these counts need not sum to the view size.
    pub fn by_category(view: &[&Resource]) -> Vec<CategoryCount> {
        catalog::categories()
            .iter()
            .map(|c| CategoryCount {
                category: c.name.to_string(),
                count: view.iter().filter(|r| c.contains(&r.service)).count(),
            })
            .filter(|c| c.count > 0)
            .collect()
    }

    /// Top [`TAG_FREQUENCY_LIMIT`] tag keys by occurrence.
    pub fn tag_frequency(view: &[&Resource]) -> Vec<TagCount> {
        Self::tag_frequency_top(view, TAG_FREQUENCY_LIMIT)
    }

    /// Top `limit` tag keys by occurrence, ties in first-encountered order.
    pub fn tag_frequency_top(view: &[&Resource], limit: usize) -> Vec<TagCount> {
        let mut counts: IndexMap<&str, usize> = IndexMap::new();
        for resource in view {
            for key in resource.tags.keys() {
                *counts.entry(key.as_str()).or_insert(0) += 1;
            }
        }

        let mut rows: Vec<TagCount> = counts
            .into_iter()
            .map(|(tag, count)| TagCount {
                tag: tag.to_string(),
                count,
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        rows.truncate(limit);
        rows
    }

    pub fn tag_coverage(view: &[&Resource]) -> TagCoverage {
        let tagged = view.iter().filter(|r| r.has_tags()).count();
        let total = view.len();
        let percent = if total == 0 {
            0.0
        } else {
            tagged as f64 / total as f64 * 100.0
        };
        TagCoverage {
            tagged,
            total,
            percent,
        }
    }

    /// Drill-down for one category; `None` for an unknown category name.
    pub fn category_detail(view: &[&Resource], category: &str) -> Option<CategoryDetail> {
        let def = catalog::category(category)?;
        let members: Vec<&Resource> = view
            .iter()
            .copied()
            .filter(|r| def.contains(&r.service))
            .collect();

        Some(CategoryDetail {
            category: def.name.to_string(),
            count: members.len(),
            accounts: distinct(&members, |r| &r.account_id),
            regions: distinct(&members, |r| &r.region),
            services: Self::by_service(&members),
        })
    }

    pub fn summary(view: &[&Resource]) -> InventorySummary {
        InventorySummary {
            resources: view.len(),
            services: distinct(view, |r| &r.service),
            regions: distinct(view, |r| &r.region),
            accounts: distinct(view, |r| &r.account_id),
        }
    }
}

// ── Private ───────────────────────────────────────────────────────────────────

fn group_by<'r>(
    view: &[&'r Resource],
    key_fn: impl Fn(&'r Resource) -> &'r String,
) -> IndexMap<&'r str, Vec<&'r Resource>> {
    let mut groups: IndexMap<&'r str, Vec<&'r Resource>> = IndexMap::new();
    for &resource in view {
        groups
            .entry(key_fn(resource).as_str())
            .or_default()
            .push(resource);
    }
    groups
}

fn distinct<'r>(items: &[&'r Resource], key_fn: impl Fn(&'r Resource) -> &'r String) -> usize {
    items
        .iter()
        .map(|&r| key_fn(r).as_str())
        .collect::<HashSet<&str>>()
        .len()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
