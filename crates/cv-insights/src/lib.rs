//! Derived views over the wine collection: food pairings and the relationship graph.

pub mod graph;
pub mod pairing;

pub use graph::{build_graph, GraphLink, GraphNode, LinkKind, WineGraph};
pub use pairing::{find_pairings, matching_rules, score_wine, PairingMatch, PairingRule, MATCH_THRESHOLD, RULES};
