use crate::error::{DashboardError, Result};
use crate::types::{CategoryColumn, NumericColumn, RankedGroup, Record};
use crate::util::{desc_nan_last, mean};
use std::collections::BTreeMap;

/// Group `records` by `group`, average `value` within each group and return
/// the `k` groups with the highest mean.
///
/// Groups are visited in label order and then stably sorted, so equal means
/// come out alphabetically. That tie order is an implementation detail.
/// Missing values are skipped; a group with no values at all ranks last.
pub fn top_k(
    records: &[Record],
    group: CategoryColumn,
    value: NumericColumn,
    k: usize,
) -> Result<Vec<RankedGroup>> {
    if records.is_empty() {
        return Err(DashboardError::EmptyInput);
    }

    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in records {
        let values = groups.entry(r.category(group)).or_default();
        if let Some(v) = r.numeric(value) {
            values.push(v);
        }
    }

    let mut ranked: Vec<RankedGroup> = groups
        .into_iter()
        .map(|(label, values)| RankedGroup {
            label: label.to_string(),
            mean: mean(&values),
            count: values.len(),
        })
        .collect();
    ranked.sort_by(|a, b| desc_nan_last(a.mean, b.mean));
    ranked.truncate(k);
    Ok(ranked)
}

pub fn labels(ranked: &[RankedGroup]) -> Vec<String> {
    ranked.iter().map(|g| g.label.clone()).collect()
}
