//! Immutable content catalog.
//!
//! The catalog is an explicitly constructed value handed to the
//! selector, never a module-level singleton. Loading is lenient:
//! a single malformed content entry must not break the study loop,
//! so missing fields are repaired with safe defaults and a generated
//! placeholder id.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::Result;
use crate::types::{CardContent, CatalogItem, Category, Difficulty, Tier};

/// Loosely-typed catalog entry as shipped in the content document.
///
/// Every field is optional; `sanitize` decides what the entry becomes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCatalogItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub japanese: Option<String>,
    #[serde(default)]
    pub kanji: Option<String>,
    #[serde(default, alias = "romanji")]
    pub romaji: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub meaning: Option<String>,
    #[serde(default)]
    pub reading: Option<String>,
    #[serde(default)]
    pub strokes: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<u8>,
}

/// One tier's worth of raw entries, grouped by category.
#[derive(Debug, Default, Deserialize)]
struct RawTierEntry {
    #[serde(default)]
    words: Vec<RawCatalogItem>,
    #[serde(default)]
    kanji: Vec<RawCatalogItem>,
    #[serde(default)]
    phrases: Vec<RawCatalogItem>,
}

/// Immutable catalog: tier -> items across all three categories.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tiers: HashMap<Tier, Vec<CatalogItem>>,
    len: usize,
}

impl Catalog {
    /// Build a catalog from already-validated items.
    pub fn new(items: Vec<CatalogItem>) -> Self {
        let mut tiers: HashMap<Tier, Vec<CatalogItem>> = HashMap::new();
        let len = items.len();
        for item in items {
            tiers.entry(item.tier).or_default().push(item);
        }
        Self { tiers, len }
    }

    /// Load a catalog from a JSON document of the shape
    /// `{"n5": {"words": [...], "kanji": [...], "phrases": [...]}, ...}`.
    ///
    /// Unknown tier keys are skipped; malformed entries are repaired.
    pub fn from_json(document: &str) -> Result<Self> {
        let raw: HashMap<String, RawTierEntry> = serde_json::from_str(document)?;
        let mut items = Vec::new();
        for (key, entry) in raw {
            let Some(tier) = Tier::from_str(&key) else {
                continue;
            };
            let mut seq = 0usize;
            for raw_item in entry.words {
                items.push(sanitize(raw_item, tier, Category::Word, &mut seq));
            }
            for raw_item in entry.kanji {
                items.push(sanitize(raw_item, tier, Category::Kanji, &mut seq));
            }
            for raw_item in entry.phrases {
                items.push(sanitize(raw_item, tier, Category::Phrase, &mut seq));
            }
        }
        Ok(Self::new(items))
    }

    /// All items of one tier, empty when the tier has no content.
    pub fn items_for_tier(&self, tier: Tier) -> &[CatalogItem] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Built-in starter content covering every tier and category.
    pub fn builtin() -> Self {
        Self::new(builtin_items())
    }
}

/// Repair a raw entry into a usable catalog item.
///
/// Default chain: missing display fields become empty strings, missing
/// difficulty becomes easy, a missing id gets a stable generated
/// placeholder so progress tracking still has a key.
fn sanitize(raw: RawCatalogItem, tier: Tier, category: Category, seq: &mut usize) -> CatalogItem {
    *seq += 1;
    let id = match raw.id {
        Some(id) if !id.is_empty() => id,
        _ => format!("{}-{}-{}", tier.as_str(), category.as_str(), seq),
    };
    let base_difficulty = raw
        .difficulty
        .and_then(Difficulty::from_value)
        .unwrap_or_default();

    let content = match category {
        Category::Word => CardContent::Word {
            japanese: raw.japanese.unwrap_or_default(),
            romaji: raw.romaji.unwrap_or_default(),
            english: raw.english.unwrap_or_default(),
        },
        Category::Kanji => CardContent::Kanji {
            character: raw.kanji.unwrap_or_default(),
            reading: raw.reading.unwrap_or_default(),
            meaning: raw.meaning.or(raw.english).unwrap_or_default(),
            strokes: raw.strokes.unwrap_or(0),
        },
        Category::Phrase => CardContent::Phrase {
            japanese: raw.japanese.unwrap_or_default(),
            romaji: raw.romaji.unwrap_or_default(),
            english: raw.english.unwrap_or_default(),
        },
    };

    CatalogItem {
        id,
        tier,
        base_difficulty,
        content,
    }
}

fn word(id: &str, tier: Tier, japanese: &str, romaji: &str, english: &str) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        tier,
        base_difficulty: Difficulty::Easy,
        content: CardContent::Word {
            japanese: japanese.to_string(),
            romaji: romaji.to_string(),
            english: english.to_string(),
        },
    }
}

fn kanji(id: &str, tier: Tier, character: &str, reading: &str, meaning: &str, strokes: u32) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        tier,
        base_difficulty: Difficulty::Easy,
        content: CardContent::Kanji {
            character: character.to_string(),
            reading: reading.to_string(),
            meaning: meaning.to_string(),
            strokes,
        },
    }
}

fn phrase(id: &str, tier: Tier, japanese: &str, romaji: &str, english: &str) -> CatalogItem {
    CatalogItem {
        id: id.to_string(),
        tier,
        base_difficulty: Difficulty::Easy,
        content: CardContent::Phrase {
            japanese: japanese.to_string(),
            romaji: romaji.to_string(),
            english: english.to_string(),
        },
    }
}

fn builtin_items() -> Vec<CatalogItem> {
    vec![
        // N5
        word("n5-w1", Tier::N5, "水", "mizu", "water"),
        word("n5-w2", Tier::N5, "本", "hon", "book"),
        word("n5-w3", Tier::N5, "猫", "neko", "cat"),
        word("n5-w4", Tier::N5, "学校", "gakkou", "school"),
        kanji("n5-k1", Tier::N5, "日", "ひ", "day, sun", 4),
        kanji("n5-k2", Tier::N5, "人", "ひと", "person", 2),
        kanji("n5-k3", Tier::N5, "月", "つき", "month, moon", 4),
        phrase("n5-p1", Tier::N5, "おはようございます", "ohayou gozaimasu", "good morning"),
        phrase("n5-p2", Tier::N5, "ありがとうございます", "arigatou gozaimasu", "thank you"),
        // N4
        word("n4-w1", Tier::N4, "天気", "tenki", "weather"),
        word("n4-w2", Tier::N4, "旅行", "ryokou", "travel"),
        kanji("n4-k1", Tier::N4, "楽", "たの", "fun, ease", 13),
        kanji("n4-k2", Tier::N4, "室", "しつ", "room", 9),
        phrase("n4-p1", Tier::N4, "どういう意味ですか", "dou iu imi desu ka", "what does it mean?"),
        // N3
        word("n3-w1", Tier::N3, "経験", "keiken", "experience"),
        word("n3-w2", Tier::N3, "関係", "kankei", "relationship"),
        kanji("n3-k1", Tier::N3, "政", "せい", "politics, government", 9),
        phrase("n3-p1", Tier::N3, "そう言えば", "sou ieba", "now that you mention it"),
        // N2
        word("n2-w1", Tier::N2, "影響", "eikyou", "influence"),
        kanji("n2-k1", Tier::N2, "拠", "きょ", "foothold, basis", 8),
        phrase("n2-p1", Tier::N2, "に関して", "ni kanshite", "regarding"),
        // N1
        word("n1-w1", Tier::N1, "曖昧", "aimai", "ambiguous"),
        kanji("n1-k1", Tier::N1, "顧", "かえり", "look back, review", 21),
        phrase("n1-p1", Tier::N1, "を余儀なくされる", "wo yoginaku sareru", "to be forced to"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_covers_all_tiers() {
        let catalog = Catalog::builtin();
        for tier in Tier::all() {
            assert!(!catalog.items_for_tier(tier).is_empty(), "{:?}", tier);
        }
    }

    #[test]
    fn from_json_parses_tier_groups() {
        let doc = r#"{
            "n5": {
                "words": [{"id": "w1", "japanese": "水", "romanji": "mizu", "english": "water"}],
                "kanji": [{"id": "k1", "kanji": "日", "reading": "ひ", "meaning": "day", "strokes": 4}],
                "phrases": []
            }
        }"#;
        let catalog = Catalog::from_json(doc).unwrap();
        assert_eq!(catalog.len(), 2);
        let items = catalog.items_for_tier(Tier::N5);
        let water = items.iter().find(|i| i.id == "w1").unwrap();
        assert_eq!(water.category(), Category::Word);
        assert_eq!(water.content.pronunciation(), "mizu");
    }

    #[test]
    fn malformed_entry_gets_safe_defaults() {
        let doc = r#"{"n3": {"words": [{}], "kanji": [], "phrases": []}}"#;
        let catalog = Catalog::from_json(doc).unwrap();
        let items = catalog.items_for_tier(Tier::N3);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "n3-word-1");
        assert_eq!(items[0].base_difficulty, Difficulty::Easy);
        assert_eq!(items[0].content.front_text(), "");
    }

    #[test]
    fn unknown_tier_keys_are_skipped() {
        let doc = r#"{"n6": {"words": [{"id": "x"}]}, "n5": {}}"#;
        let catalog = Catalog::from_json(doc).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn top_level_garbage_is_an_error() {
        assert!(Catalog::from_json("not json").is_err());
    }

    #[test]
    fn absent_tier_yields_empty_slice() {
        let catalog = Catalog::new(vec![word("w", Tier::N5, "水", "mizu", "water")]);
        assert!(catalog.items_for_tier(Tier::N1).is_empty());
    }
}
