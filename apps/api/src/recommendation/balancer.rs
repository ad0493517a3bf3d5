//! Balancer: turns a ranked candidate list into K category-balanced picks.
//!
//! Algorithm:
//! 1. No needed categories → top K by score.
//! 2. `slots = max(1, K / |needed|)` per needed category.
//! 3. Pass 1: walk by score, admit needed-category candidates while their
//!    category is under its slot count.
//! 4. Pass 2: walk by score again, admit anything not yet admitted.
//! 5. Re-sort the admitted set by score and cut to K.
//!
//! Identity is the catalog position. Two records sharing a url are distinct.

use std::collections::HashMap;

use crate::models::assessment::{AssessmentRecord, Category};
use crate::recommendation::ranking::{sort_by_score_desc, ScoredCandidate};
use crate::recommendation::requirements::Requirements;

/// Per-category cap for pass 1.
pub fn slots_per_category(top_k: usize, needed: usize) -> usize {
    if needed == 0 {
        return top_k;
    }
    (top_k / needed).max(1)
}

/// Selects up to `top_k` candidates. `ranked` must be sorted by descending
/// score; `records` is the catalog the candidate indices point into.
pub fn balance(
    ranked: &[ScoredCandidate],
    requirements: &Requirements,
    records: &[AssessmentRecord],
    top_k: usize,
) -> Vec<ScoredCandidate> {
    if requirements.is_empty() {
        return ranked.iter().take(top_k).copied().collect();
    }
    let needed = &requirements.needed_categories;

    let slots = slots_per_category(top_k, needed.len());
    let mut accepted: Vec<ScoredCandidate> = Vec::with_capacity(top_k.min(ranked.len()));
    let mut seen = vec![false; records.len()];
    let mut counts: HashMap<Category, usize> = HashMap::new();

    // Pass 1: category fill
    for candidate in ranked {
        if accepted.len() >= top_k {
            break;
        }
        let category = records[candidate.index].category;
        if !needed.contains(&category) {
            continue;
        }
        let count = counts.entry(category).or_insert(0);
        if *count < slots {
            *count += 1;
            seen[candidate.index] = true;
            accepted.push(*candidate);
        }
    }

    // Pass 2: backfill by relevance
    for candidate in ranked {
        if accepted.len() >= top_k {
            break;
        }
        if !seen[candidate.index] {
            seen[candidate.index] = true;
            accepted.push(*candidate);
        }
    }

    sort_by_score_desc(&mut accepted);
    accepted.truncate(top_k);
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::index::tests::record;
    use std::collections::BTreeSet;

    fn requirements(categories: &[Category]) -> Requirements {
        Requirements {
            needed_categories: categories.iter().copied().collect::<BTreeSet<_>>(),
            ..Default::default()
        }
    }

    /// Candidates in catalog order with strictly decreasing scores.
    fn ranked(n: usize) -> Vec<ScoredCandidate> {
        (0..n)
            .map(|index| ScoredCandidate {
                index,
                score: 1.0 - index as f32 * 0.05,
            })
            .collect()
    }

    fn catalog(categories: &[Category]) -> Vec<AssessmentRecord> {
        categories
            .iter()
            .enumerate()
            .map(|(i, c)| record(&format!("Assessment {i}"), *c))
            .collect()
    }

    fn count(picks: &[ScoredCandidate], records: &[AssessmentRecord], category: Category) -> usize {
        picks
            .iter()
            .filter(|c| records[c.index].category == category)
            .count()
    }

    fn is_sorted_desc(picks: &[ScoredCandidate]) -> bool {
        picks.windows(2).all(|w| w[0].score >= w[1].score)
    }

    #[test]
    fn test_slots_per_category() {
        assert_eq!(slots_per_category(10, 2), 5);
        assert_eq!(slots_per_category(10, 3), 3);
        assert_eq!(slots_per_category(2, 4), 1);
        assert_eq!(slots_per_category(0, 2), 1);
    }

    #[test]
    fn test_no_requirements_takes_top_k_in_rank_order() {
        let records = catalog(&[Category::Other; 8]);
        let ranked = ranked(8);
        let picks = balance(&ranked, &Requirements::default(), &records, 5);
        assert_eq!(picks, ranked[..5].to_vec());
    }

    #[test]
    fn test_knowledge_and_personality_both_represented() {
        use Category::*;
        // Knowledge dominates the top of the ranking
        let records = catalog(&[
            Knowledge, Knowledge, Knowledge, Knowledge, Knowledge, Knowledge, Personality,
            Personality, Other, Other,
        ]);
        let picks = balance(&ranked(10), &requirements(&[Knowledge, Personality]), &records, 4);

        assert_eq!(picks.len(), 4);
        assert_eq!(count(&picks, &records, Knowledge), 2);
        assert_eq!(count(&picks, &records, Personality), 2);
        assert!(is_sorted_desc(&picks));
    }

    #[test]
    fn test_pass_two_backfills_when_category_is_scarce() {
        use Category::*;
        let records = catalog(&[Other, Other, Personality, Other, Other, Other]);
        let picks = balance(&ranked(6), &requirements(&[Personality]), &records, 4);

        let indices: Vec<usize> = picks.iter().map(|c| c.index).collect();
        // personality first by acceptance, then best remaining; final order by score
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_final_order_is_by_score_not_acceptance() {
        use Category::*;
        let records = catalog(&[Other, Other, Other, Ability]);
        let picks = balance(&ranked(4), &requirements(&[Ability]), &records, 2);

        let indices: Vec<usize> = picks.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![0, 3]);
        assert!(is_sorted_desc(&picks));
    }

    #[test]
    fn test_no_matching_category_behaves_like_pure_similarity() {
        let records = catalog(&[Category::Other; 6]);
        let ranked = ranked(6);
        let balanced = balance(&ranked, &requirements(&[Category::Competency]), &records, 3);
        let plain = balance(&ranked, &Requirements::default(), &records, 3);
        assert_eq!(balanced, plain);
    }

    #[test]
    fn test_small_catalog_returns_everything() {
        let records = catalog(&[Category::Knowledge, Category::Personality, Category::Other]);
        let picks = balance(&ranked(3), &requirements(&[Category::Knowledge]), &records, 10);
        assert_eq!(picks.len(), 3);
    }

    #[test]
    fn test_zero_k_returns_nothing() {
        let records = catalog(&[Category::Knowledge; 3]);
        assert!(balance(&ranked(3), &requirements(&[Category::Knowledge]), &records, 0).is_empty());
        assert!(balance(&ranked(3), &Requirements::default(), &records, 0).is_empty());
    }

    #[test]
    fn test_no_candidate_selected_twice() {
        use Category::*;
        let records = catalog(&[Knowledge, Personality, Knowledge, Personality, Ability]);
        let picks = balance(
            &ranked(5),
            &requirements(&[Knowledge, Personality, Ability]),
            &records,
            5,
        );
        let mut indices: Vec<usize> = picks.iter().map(|c| c.index).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), 5);
    }

    #[test]
    fn test_each_needed_category_gets_its_slots() {
        use Category::*;
        // 3 needed categories, K = 9 → 3 slots each; plenty of each available
        let mut layout = vec![Knowledge; 8];
        layout.extend(vec![Personality; 4]);
        layout.extend(vec![Ability; 4]);
        let records = catalog(&layout);
        let picks = balance(
            &ranked(records.len()),
            &requirements(&[Knowledge, Personality, Ability]),
            &records,
            9,
        );

        assert_eq!(picks.len(), 9);
        for category in [Knowledge, Personality, Ability] {
            assert!(count(&picks, &records, category) >= 3, "{category} under-represented");
        }
    }

    #[test]
    fn test_duplicate_urls_are_not_deduplicated() {
        let mut records = catalog(&[Category::Other, Category::Other]);
        records[1].url = records[0].url.clone();
        let picks = balance(&ranked(2), &requirements(&[Category::Knowledge]), &records, 2);
        assert_eq!(picks.len(), 2);
    }
}
