// Keyword search over the inventory
// Scores candidates against the query and ranks them deterministically

use crate::protocol::Item;

/// Weight of a query keyword equal to an item keyword
pub const EXACT_MATCH_SCORE: u32 = 2;

/// Weight of a pair where one keyword contains the other
pub const PARTIAL_MATCH_SCORE: u32 = 1;

/// Relevance of `item` for the query keywords.
/// Every (query, item) keyword pair is compared case-insensitively and counted once.
pub fn score(query: &[String], item: &Item) -> u32 {
    let item_keywords: Vec<String> = item.keywords.iter().map(|k| k.to_lowercase()).collect();

    query
        .iter()
        .map(|q| q.to_lowercase())
        .map(|q| {
            item_keywords
                .iter()
                .map(|k| {
                    if *k == q {
                        EXACT_MATCH_SCORE
                    } else if k.contains(q.as_str()) || q.contains(k.as_str()) {
                        PARTIAL_MATCH_SCORE
                    } else {
                        0
                    }
                })
                .sum::<u32>()
        })
        .sum()
}

/// Rank in-stock candidates by score (descending), then item id (ascending).
/// Score-0 items are dropped unless the query is empty or the candidates
/// were already narrowed to a category, in which case they rank last.
pub fn rank(candidates: Vec<Item>, query: &[String], category_filtered: bool) -> Vec<Item> {
    let keep_unmatched = query.is_empty() || category_filtered;

    let mut scored: Vec<(u32, Item)> = candidates
        .into_iter()
        .filter(|item| item.quantity > 0)
        .map(|item| (score(query, &item), item))
        .filter(|(score, _)| keep_unmatched || *score > 0)
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b.cmp(score_a).then_with(|| a.item_id.cmp(&b.item_id))
    });

    scored.into_iter().map(|(_, item)| item).collect()
}
