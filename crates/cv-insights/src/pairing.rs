//! Rule-based food pairing.

use cv_core::{Body, Structure, Sweetness, Wine, WineType};
use cv_utils::{contains_any, normalize, significant_words};
use serde::{Deserialize, Serialize};

/// Wines must score strictly above this to be suggested.
pub const MATCH_THRESHOLD: i32 = 40;

/// Most suggestions returned for one dish.
pub const MAX_SUGGESTIONS: usize = 3;

const MIN_SCORE: i32 = 10;
const MAX_SCORE: i32 = 100;
const TYPE_BONUS: i32 = 15;
const PROFILE_BONUS: i32 = 10;
const KEYWORD_BONUS: i32 = 5;
const DIRECT_MATCH_BONUS: i32 = 25;
const DIRECT_MATCH_MIN_LEN: usize = 3;

/// One entry of the pairing table.
#[derive(Debug)]
pub struct PairingRule {
    pub name: &'static str,
    /// Phrases in the dish text that activate the rule.
    pub triggers: &'static [&'static str],
    pub types: &'static [WineType],
    pub body: Body,
    pub structure: Structure,
    pub sweetness: Sweetness,
    /// Words rewarded when found in the wine description.
    pub keywords: &'static [&'static str],
    pub base_score: i32,
}

/// The fixed pairing table.
pub static RULES: &[PairingRule] = &[
    PairingRule {
        name: "carne rossa",
        triggers: &[
            "bistecca", "fiorentina", "manzo", "carne rossa", "carni rosse", "brasato",
            "agnello", "selvaggina", "cinghiale", "filetto", "costata", "arrosto",
        ],
        types: &[WineType::Red],
        body: Body::Corposo,
        structure: Structure::Strutturato,
        sweetness: Sweetness::Secco,
        keywords: &["tannico", "strutturato", "corposo", "intenso", "persistente"],
        base_score: 30,
    },
    PairingRule {
        name: "carne bianca",
        triggers: &["pollo", "tacchino", "maiale", "vitello", "coniglio", "carne bianca"],
        types: &[WineType::Red, WineType::White],
        body: Body::Medio,
        structure: Structure::Equilibrato,
        sweetness: Sweetness::Secco,
        keywords: &["morbido", "equilibrato", "fruttato", "elegante"],
        base_score: 25,
    },
    PairingRule {
        name: "pesce",
        triggers: &[
            "pesce", "branzino", "orata", "spigola", "salmone", "tonno", "merluzzo",
            "baccalà", "frittura",
        ],
        types: &[WineType::White, WineType::Sparkling],
        body: Body::Leggero,
        structure: Structure::Elegante,
        sweetness: Sweetness::Secco,
        keywords: &["fresco", "minerale", "sapido", "agrumi", "floreale"],
        base_score: 30,
    },
    PairingRule {
        name: "crostacei e crudi",
        triggers: &[
            "crostacei", "gamberi", "scampi", "aragosta", "ostriche", "cozze", "vongole",
            "frutti di mare", "crudo", "crudi", "sushi",
        ],
        types: &[WineType::Sparkling, WineType::White],
        body: Body::Leggero,
        structure: Structure::Elegante,
        sweetness: Sweetness::Secco,
        keywords: &["perlage", "bollicine", "fresco", "minerale", "sapido"],
        base_score: 30,
    },
    PairingRule {
        name: "primi",
        triggers: &[
            "pasta", "ragù", "lasagne", "tagliatelle", "tajarin", "risotto", "gnocchi",
            "carbonara", "amatriciana",
        ],
        types: &[WineType::Red, WineType::White],
        body: Body::Medio,
        structure: Structure::Equilibrato,
        sweetness: Sweetness::Secco,
        keywords: &["equilibrato", "fruttato", "morbido", "armonico"],
        base_score: 20,
    },
    PairingRule {
        name: "pizza",
        triggers: &["pizza", "focaccia", "calzone"],
        types: &[WineType::Red, WineType::Rose, WineType::Sparkling],
        body: Body::Leggero,
        structure: Structure::Equilibrato,
        sweetness: Sweetness::Secco,
        keywords: &["fresco", "fruttato", "vivace", "beverino"],
        base_score: 20,
    },
    PairingRule {
        name: "formaggi",
        triggers: &[
            "formaggi", "formaggio", "parmigiano", "pecorino", "gorgonzola", "taleggio",
            "stagionati",
        ],
        types: &[WineType::Red],
        body: Body::Corposo,
        structure: Structure::Strutturato,
        sweetness: Sweetness::Secco,
        keywords: &["evoluto", "speziato", "complesso", "persistente"],
        base_score: 25,
    },
    PairingRule {
        name: "dolci",
        triggers: &[
            "dolce", "dolci", "dessert", "torta", "crostata", "pasticceria", "biscotti",
            "cioccolato", "tiramisù", "panettone",
        ],
        types: &[WineType::White, WineType::Sparkling],
        body: Body::Medio,
        structure: Structure::Elegante,
        sweetness: Sweetness::Dolce,
        keywords: &["dolce", "miele", "canditi", "aromatico", "passito"],
        base_score: 30,
    },
    PairingRule {
        name: "verdure",
        triggers: &["verdure", "insalata", "ortaggi", "vegetariano", "legumi", "zuppa"],
        types: &[WineType::White, WineType::Rose],
        body: Body::Leggero,
        structure: Structure::Elegante,
        sweetness: Sweetness::Secco,
        keywords: &["fresco", "erbaceo", "floreale", "vegetale"],
        base_score: 20,
    },
    PairingRule {
        name: "piccante",
        triggers: &["piccante", "curry", "speziato", "thai", "indiano", "messicano"],
        types: &[WineType::White, WineType::Rose],
        body: Body::Leggero,
        structure: Structure::Equilibrato,
        sweetness: Sweetness::Amabile,
        keywords: &["aromatico", "fruttato", "morbido"],
        base_score: 20,
    },
];

/// A suggested wine with its score.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct PairingMatch {
    #[serde(flatten)]
    pub wine: Wine,
    #[serde(rename = "matchScore")]
    pub match_score: u8,
}

/// Score one wine against a dish description, clamped to 10..=100.
pub fn score_wine(wine: &Wine, dish_text: &str) -> i32 {
    let dish = normalize(dish_text);
    let description = wine.description.to_lowercase();
    let mut score = 0;

    for rule in rules_for(&dish) {
        score += rule.base_score;
        if rule.types.contains(&wine.wine_type) {
            score += TYPE_BONUS;
        }
        if wine.body == rule.body {
            score += PROFILE_BONUS;
        }
        if wine.structure == rule.structure {
            score += PROFILE_BONUS;
        }
        if wine.sweetness == rule.sweetness {
            score += PROFILE_BONUS;
        }
        for keyword in rule.keywords {
            if description.contains(keyword) {
                score += KEYWORD_BONUS;
            }
        }
    }

    let pairing = wine.pairing.to_lowercase();
    for word in significant_words(&dish, DIRECT_MATCH_MIN_LEN) {
        if pairing.contains(&word) {
            score += DIRECT_MATCH_BONUS;
        }
    }

    score.clamp(MIN_SCORE, MAX_SCORE)
}

fn rules_for(dish: &str) -> impl Iterator<Item = &'static PairingRule> + '_ {
    RULES
        .iter()
        .filter(move |rule| contains_any(dish, rule.triggers))
}

/// Names of the rules a dish description activates, in table order.
pub fn matching_rules(dish_text: &str) -> Vec<&'static str> {
    rules_for(&normalize(dish_text))
        .map(|rule| rule.name)
        .collect()
}

/// Rank the wines for a dish and return the best few above the threshold.
///
/// Pure and deterministic: equal scores keep the collection order.
pub fn find_pairings(wines: &[Wine], dish_text: &str) -> Vec<PairingMatch> {
    let mut scored: Vec<(i32, &Wine)> = wines
        .iter()
        .map(|wine| (score_wine(wine, dish_text), wine))
        .filter(|(score, _)| *score > MATCH_THRESHOLD)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(score, wine)| PairingMatch {
            wine: wine.clone(),
            match_score: u8::try_from(score).unwrap_or(u8::MAX),
        })
        .collect()
}
