//! Adaptive card selection.
//!
//! Selection is a weighted random draw over one tier's items: cards the
//! learner reported as hard are 4x as likely to reappear as easy ones,
//! medium 2x. The randomness source is injected so selection is
//! deterministic under a seeded generator.

use std::collections::HashMap;

use rand::Rng;

use crate::catalog::Catalog;
use crate::types::{CardProgress, CatalogItem, Difficulty, Tier};

/// Resolve the difficulty that drives selection weighting.
///
/// Default chain: the learner's per-card record wins, else the catalog
/// base difficulty.
pub fn effective_difficulty(
    item: &CatalogItem,
    progress_by_card: &HashMap<String, CardProgress>,
) -> Difficulty {
    progress_by_card
        .get(&item.id)
        .map(|p| p.difficulty)
        .unwrap_or(item.base_difficulty)
}

/// Pick the next card to show for `tier`.
///
/// Returns `None` when the tier has no content; that is a valid
/// "nothing to show" outcome, not a fault. Pure given a fixed `rng`.
pub fn select_card<'a, R: Rng>(
    tier: Tier,
    catalog: &'a Catalog,
    progress_by_card: &HashMap<String, CardProgress>,
    rng: &mut R,
) -> Option<&'a CatalogItem> {
    let candidates = catalog.items_for_tier(tier);
    if candidates.is_empty() {
        return None;
    }

    // Draw proportionally to weight without materializing the
    // duplicated population.
    let total: u32 = candidates
        .iter()
        .map(|item| effective_difficulty(item, progress_by_card).selection_weight())
        .sum();
    let mut pick = rng.random_range(0..total);
    for item in candidates {
        let weight = effective_difficulty(item, progress_by_card).selection_weight();
        if pick < weight {
            return Some(item);
        }
        pick -= weight;
    }
    // Unreachable: weights sum to `total` and `pick < total`.
    candidates.last()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CardContent, Category};
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn item(id: &str, tier: Tier, base: Difficulty) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            tier,
            base_difficulty: base,
            content: CardContent::Word {
                japanese: String::new(),
                romaji: String::new(),
                english: String::new(),
            },
        }
    }

    fn progress_entry(id: &str, difficulty: Difficulty) -> (String, CardProgress) {
        (
            id.to_string(),
            CardProgress {
                card_id: id.to_string(),
                tier: Tier::N5,
                category: Category::Word,
                difficulty,
                times_studied: 1,
                last_studied_at: Utc::now(),
            },
        )
    }

    #[test]
    fn absent_tier_returns_none() {
        let catalog = Catalog::new(vec![item("a", Tier::N5, Difficulty::Easy)]);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(select_card(Tier::N1, &catalog, &HashMap::new(), &mut rng).is_none());
    }

    #[test]
    fn empty_catalog_returns_none() {
        let catalog = Catalog::new(Vec::new());
        let mut rng = StdRng::seed_from_u64(7);
        assert!(select_card(Tier::N5, &catalog, &HashMap::new(), &mut rng).is_none());
    }

    #[test]
    fn selected_card_matches_requested_tier() {
        let catalog = Catalog::new(vec![
            item("a", Tier::N5, Difficulty::Easy),
            item("b", Tier::N4, Difficulty::Easy),
        ]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let card = select_card(Tier::N4, &catalog, &HashMap::new(), &mut rng).unwrap();
            assert_eq!(card.tier, Tier::N4);
        }
    }

    #[test]
    fn learner_record_overrides_base_difficulty() {
        let catalog_item = item("a", Tier::N5, Difficulty::Easy);
        let progress: HashMap<_, _> = [progress_entry("a", Difficulty::Hard)].into();
        assert_eq!(
            effective_difficulty(&catalog_item, &progress),
            Difficulty::Hard
        );
        assert_eq!(
            effective_difficulty(&catalog_item, &HashMap::new()),
            Difficulty::Easy
        );
    }

    #[test]
    fn hard_cards_appear_about_four_times_as_often() {
        let catalog = Catalog::new(vec![
            item("hard", Tier::N5, Difficulty::Easy),
            item("easy", Tier::N5, Difficulty::Easy),
        ]);
        let progress: HashMap<_, _> = [progress_entry("hard", Difficulty::Hard)].into();

        let mut rng = StdRng::seed_from_u64(42);
        let mut hard_hits = 0u32;
        let draws = 10_000;
        for _ in 0..draws {
            let card = select_card(Tier::N5, &catalog, &progress, &mut rng).unwrap();
            if card.id == "hard" {
                hard_hits += 1;
            }
        }

        // Expected 4/5 of draws; allow generous sampling tolerance.
        let ratio = f64::from(hard_hits) / f64::from(draws);
        assert!((0.77..0.83).contains(&ratio), "ratio was {ratio}");
    }

    #[test]
    fn uniform_when_everything_is_easy() {
        let catalog = Catalog::new(vec![
            item("a", Tier::N5, Difficulty::Easy),
            item("b", Tier::N5, Difficulty::Easy),
        ]);
        let mut rng = StdRng::seed_from_u64(9);
        let mut a_hits = 0u32;
        for _ in 0..10_000 {
            if select_card(Tier::N5, &catalog, &HashMap::new(), &mut rng).unwrap().id == "a" {
                a_hits += 1;
            }
        }
        let ratio = f64::from(a_hits) / 10_000.0;
        assert!((0.47..0.53).contains(&ratio), "ratio was {ratio}");
    }
}
