//! Text search ranking and result pagination shared by the services

use serde::Serialize;

/// One page of results plus the counters clients use to page through the rest
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub results: Vec<T>,
    pub total_results: usize,
    pub total_pages: usize,
    /// 1-based
    pub current_page: usize,
    pub page_size: usize,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Slice `items` to the requested 1-based page
    ///
    /// Page numbers below 1 are treated as 1 and a zero page size as 1.
    pub fn paginate(items: Vec<T>, page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total_results = items.len();
        let total_pages = total_results.div_ceil(page_size);

        let results: Vec<T> = items
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();

        Self {
            results,
            total_results,
            total_pages,
            current_page: page,
            page_size,
            has_more: page < total_pages,
        }
    }
}

/// Relevance of `fields` for a free-text query; 0 means no match
///
/// Each query word scores once per field containing it, and a field holding
/// the whole query as a phrase scores extra.
pub fn relevance(query: &str, fields: &[&str]) -> usize {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return 0;
    }
    let terms: Vec<&str> = query.split_whitespace().collect();

    fields
        .iter()
        .map(|field| {
            let field = field.to_lowercase();
            let term_hits = terms.iter().filter(|t| field.contains(*t)).count();
            let phrase_bonus = if terms.len() > 1 && field.contains(&query) {
                2
            } else {
                0
            };
            term_hits + phrase_bonus
        })
        .sum()
}

/// Keep the items matching `query`, best first, at most `limit` of them
///
/// Ties keep the input order.
pub fn rank<T, F>(items: Vec<T>, query: &str, limit: Option<usize>, fields: F) -> Vec<T>
where
    F: Fn(&T) -> Vec<&str>,
{
    let mut scored: Vec<(usize, T)> = items
        .into_iter()
        .filter_map(|item| {
            let score = relevance(query, &fields(&item));
            (score > 0).then_some((score, item))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|(_, item)| item)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_counters() {
        let page = Page::paginate((1..=23).collect::<Vec<_>>(), 2, 10);
        assert_eq!(page.results, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.total_results, 23);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert!(page.has_more);

        let last = Page::paginate((1..=23).collect::<Vec<_>>(), 3, 10);
        assert_eq!(last.results, vec![21, 22, 23]);
        assert!(!last.has_more);
    }

    #[test]
    fn test_paginate_edges() {
        let empty: Page<i32> = Page::paginate(Vec::new(), 1, 10);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.results.is_empty());
        assert!(!empty.has_more);

        let clamped = Page::paginate(vec![1, 2, 3], 0, 0);
        assert_eq!(clamped.current_page, 1);
        assert_eq!(clamped.page_size, 1);
        assert_eq!(clamped.results, vec![1]);

        let beyond = Page::paginate(vec![1, 2, 3], 9, 2);
        assert!(beyond.results.is_empty());
        assert!(!beyond.has_more);
    }

    #[test]
    fn test_relevance() {
        assert_eq!(relevance("", &["anything"]), 0);
        assert_eq!(relevance("solar", &["Solar farm", "solar panels"]), 2);
        assert_eq!(relevance("wind", &["Solar farm"]), 0);
        // two terms hit plus the phrase bonus
        assert_eq!(relevance("solar farm", &["Solar Farm"]), 4);
    }

    #[test]
    fn test_rank_orders_and_limits() {
        let items = vec!["wind farm", "solar farm", "solar", "roads"];
        let ranked = rank(items.clone(), "solar farm", None, |s| vec![*s]);
        assert_eq!(ranked, vec!["solar farm", "wind farm", "solar"]);

        let limited = rank(items, "farm", Some(1), |s| vec![*s]);
        assert_eq!(limited, vec!["wind farm"]);
    }
}
