use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::{Balance, SortDirection};

/// Orders addresses by numeric balance. Pending or unparsable balances rank as
/// zero; ties keep insertion order.
pub fn sorted_view(
    known: &[String],
    balances: &HashMap<String, Balance>,
    direction: SortDirection,
) -> Vec<String> {
    let value_of = |address: &String| {
        balances
            .get(address)
            .map(Balance::value)
            .unwrap_or(Decimal::ZERO)
    };

    let mut sorted = known.to_vec();
    match direction {
        SortDirection::Descending => sorted.sort_by(|a, b| value_of(b).cmp(&value_of(a))),
        SortDirection::Ascending => sorted.sort_by(|a, b| value_of(a).cmp(&value_of(b))),
    }
    sorted
}

/// Case-insensitive substring filter; an empty term returns `sorted` as is.
pub fn filtered_view(sorted: &[String], term: &str) -> Vec<String> {
    if term.is_empty() {
        return sorted.to_vec();
    }
    let needle = term.to_lowercase();
    sorted
        .iter()
        .filter(|address| address.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
