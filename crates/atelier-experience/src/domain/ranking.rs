//! Frequency ranking shared by personalization and insights

use std::collections::HashMap;

/// Rank values by occurrence count, most frequent first.
///
/// Ties keep the order in which values were first seen. At most `limit`
/// values are returned.
pub fn top_by_frequency<'a, I>(values: I, limit: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    // value -> (count, first-seen position)
    let mut counts: HashMap<&'a str, (usize, usize)> = HashMap::new();
    for (position, value) in values.into_iter().enumerate() {
        counts
            .entry(value)
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }

    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(value, (count, first))| (value, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(value, _, _)| value.to_string())
        .collect()
}
