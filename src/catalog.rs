//! Static puzzle catalog: built-in seeds plus an optional TOML bank, indexed
//! by id and by (category, level). Built once at startup, read-only afterwards.

use std::collections::{BTreeMap, HashMap};

use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::BankConfig;
use crate::domain::Puzzle;

/// Target count for a level whose puzzles are not in the catalog (e.g. bank
/// records surviving from an earlier config).
pub const DEFAULT_LEVEL_SIZE: u32 = 5;

pub struct Catalog {
    by_id: HashMap<String, Puzzle>,
    // Ordered ids per (category, level); BTreeMap keeps listing order stable.
    by_level: BTreeMap<(String, u32), Vec<String>>,
}

impl Catalog {
    /// Build the catalog from built-in seeds, then merge bank entries.
    /// Bank entries with no answers or a duplicate id are skipped with a log.
    pub fn build(bank: Option<&BankConfig>) -> Self {
        let mut by_id = HashMap::<String, Puzzle>::new();
        let mut by_level = BTreeMap::<(String, u32), Vec<String>>::new();

        for p in seed_puzzles() {
            by_level
                .entry((p.category.clone(), p.level))
                .or_default()
                .push(p.id.clone());
            by_id.insert(p.id.clone(), p);
        }

        if let Some(cfg) = bank {
            for pc in &cfg.puzzles {
                let id = pc.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string());
                if pc.answers.iter().all(|a| a.trim().is_empty()) {
                    error!(target: "puzzle", %id, category = %pc.category, "Skipping bank item: no accepted answers");
                    continue;
                }
                if by_id.contains_key(&id) {
                    warn!(target: "puzzle", %id, "Skipping bank item: duplicate id");
                    continue;
                }
                let key = (pc.category.clone(), pc.level);
                let position = pc
                    .position
                    .unwrap_or_else(|| by_level.get(&key).map(|v| v.len() as u32).unwrap_or(0));
                let p = Puzzle {
                    id: id.clone(),
                    category: pc.category.clone(),
                    level: pc.level,
                    position,
                    prompt: pc.prompt.clone(),
                    answers: pc.answers.clone(),
                    hint: pc.hint.clone(),
                    explanation: pc.explanation.clone(),
                };
                by_level.entry(key).or_default().push(id.clone());
                by_id.insert(id, p);
            }
        }

        // Keep each level's listing in position order.
        for ids in by_level.values_mut() {
            ids.sort_by_key(|id| by_id.get(id).map(|p| p.position).unwrap_or(u32::MAX));
        }

        for ((category, level), ids) in &by_level {
            info!(target: "puzzle", %category, %level, count = ids.len(), "Startup puzzle inventory");
        }

        Self { by_id, by_level }
    }

    pub fn get(&self, id: &str) -> Option<&Puzzle> {
        self.by_id.get(id)
    }

    /// Puzzles filtered by optional category/level, in catalog order.
    /// Unknown category/level yields an empty list, not an error.
    pub fn list(&self, category: Option<&str>, level: Option<u32>) -> Vec<&Puzzle> {
        self.by_level
            .iter()
            .filter(|((c, l), _)| {
                category.map_or(true, |want| want == c) && level.map_or(true, |want| want == *l)
            })
            .flat_map(|(_, ids)| ids.iter().filter_map(|id| self.by_id.get(id)))
            .collect()
    }

    /// All known (category, level) pairs with their puzzle counts.
    pub fn levels(&self) -> impl Iterator<Item = (&str, u32, u32)> {
        self.by_level
            .iter()
            .map(|((c, l), ids)| (c.as_str(), *l, ids.len() as u32))
    }

    /// Target count for a (category, level) pair.
    pub fn level_size(&self, category: &str, level: u32) -> u32 {
        self.by_level
            .get(&(category.to_string(), level))
            .map(|ids| ids.len() as u32)
            .unwrap_or(DEFAULT_LEVEL_SIZE)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}

fn seed(
    category: &str,
    level: u32,
    position: u32,
    prompt: &str,
    answers: &[&str],
    hint: Option<&str>,
    explanation: Option<&str>,
) -> Puzzle {
    Puzzle {
        id: format!("{}-{}-{}", category, level, position),
        category: category.into(),
        level,
        position,
        prompt: prompt.into(),
        answers: answers.iter().map(|a| a.to_string()).collect(),
        hint: hint.map(Into::into),
        explanation: explanation.map(Into::into),
    }
}

/// Built-in puzzle bank. Guarantees the app is useful without external config.
/// Ids follow `{category}-{level}-{position}`.
pub fn seed_puzzles() -> Vec<Puzzle> {
    vec![
        // math · level 1
        seed("math", 1, 0, "What is 7 × 8?", &["56", "fifty-six"], Some("Think of 7 × 4, doubled."), Some("7 × 8 = 56.")),
        seed("math", 1, 1, "What is 12 + 29?", &["41", "forty-one"], None, None),
        seed("math", 1, 2, "What is 100 − 37?", &["63", "sixty-three"], Some("Take away 40, then add 3 back."), None),
        seed("math", 1, 3, "What is half of 90?", &["45", "forty-five"], None, Some("90 ÷ 2 = 45.")),
        seed("math", 1, 4, "How many sides does a hexagon have?", &["6", "six"], Some("Hex- as in hexadecimal."), None),
        // math · level 2
        seed("math", 2, 0, "What is 15% of 200?", &["30", "thirty"], Some("10% plus half of that."), Some("0.15 × 200 = 30.")),
        seed("math", 2, 1, "What is the next prime after 13?", &["17", "seventeen"], Some("Skip the even numbers and 15."), None),
        seed("math", 2, 2, "What is 9 squared?", &["81", "eighty-one"], None, Some("9 × 9 = 81.")),
        seed("math", 2, 3, "A dozen dozen is called a gross. How many is that?", &["144", "one hundred forty-four"], None, Some("12 × 12 = 144.")),
        seed("math", 2, 4, "What is the cube root of 64?", &["4", "four"], Some("4 × 4 × 4."), None),
        // logic · level 1
        seed("logic", 1, 0, "Which number continues the sequence: 2, 4, 8, 16, …?", &["32", "thirty-two"], Some("Each term doubles."), Some("Powers of two: the next is 32.")),
        seed("logic", 1, 1, "If all bloops are razzies and all razzies are lazzies, are all bloops lazzies?", &["yes"], Some("Chain the two statements."), Some("Transitivity: bloops ⊆ razzies ⊆ lazzies.")),
        seed("logic", 1, 2, "A farmer has 17 sheep and all but 9 run away. How many are left?", &["9", "nine"], Some("Read it again, slowly."), Some("\"All but 9\" means 9 remain.")),
        seed("logic", 1, 3, "Which word does not belong: apple, banana, carrot, cherry?", &["carrot"], Some("Three of them grow on plants the same way."), Some("Carrot is a vegetable; the rest are fruits.")),
        seed("logic", 1, 4, "What comes next: J, F, M, A, M, J, …?", &["j", "july"], Some("Think of a calendar."), Some("Initials of the months; July is next.")),
        // wordplay · level 1
        seed("wordplay", 1, 0, "Rearrange the letters of LISTEN to form another English word.", &["silent", "enlist", "tinsel", "inlets"], Some("It can mean \"quiet\"."), None),
        seed("wordplay", 1, 1, "What five-letter word becomes shorter when you add two letters to it?", &["short", "the word short"], None, Some("\"Short\" + \"er\" = shorter.")),
        seed("wordplay", 1, 2, "Which English word contains three consecutive double letters?", &["bookkeeper", "a bookkeeper"], Some("Someone who works with ledgers."), Some("b-oo-kk-ee-per.")),
        seed("wordplay", 1, 3, "I am a word of letters three; add two and fewer I will be. What am I?", &["few", "the word few"], None, Some("\"Few\" + \"er\" = fewer.")),
        seed("wordplay", 1, 4, "What is the only English word ending in -mt?", &["dreamt"], Some("Past tense, poetic."), None),
        // trivia · level 1
        seed("trivia", 1, 0, "How many continents are there on Earth?", &["7", "seven"], None, None),
        seed("trivia", 1, 1, "What is the capital of Australia?", &["canberra"], Some("It is not the largest city."), Some("Canberra, not Sydney.")),
        seed("trivia", 1, 2, "Which planet is known as the Red Planet?", &["mars"], None, None),
        seed("trivia", 1, 3, "How many keys does a standard piano have?", &["88", "eighty-eight"], Some("Count 52 white and 36 black."), Some("52 white + 36 black = 88.")),
        seed("trivia", 1, 4, "What gas do plants primarily absorb for photosynthesis?", &["carbon dioxide", "co2"], None, None),
    ]
}
