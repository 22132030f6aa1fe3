//! Node/link data for the force-directed wine map.

use cv_core::{Wine, WineType, DEFAULT_GRAPE, DEFAULT_REGION, DEFAULT_WINERY};
use cv_utils::normalize;
use serde::Serialize;

/// Attribute two wines have in common.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    Region,
    Grape,
    Winery,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub wine_type: WineType,
    /// Cluster key used to colour nodes.
    pub group: String,
    pub rating: u8,
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct GraphLink {
    pub source: String,
    pub target: String,
    /// Number of shared attributes.
    pub weight: usize,
    pub shared: Vec<LinkKind>,
}

#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
pub struct WineGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

/// Link every pair of wines that share a region, a grape, or a winery.
///
/// Placeholder values filled in for missing fields never create links.
pub fn build_graph(wines: &[Wine]) -> WineGraph {
    let nodes = wines
        .iter()
        .map(|wine| GraphNode {
            id: wine.id.clone(),
            name: wine.name.clone(),
            wine_type: wine.wine_type,
            group: wine.region.clone(),
            rating: wine.rating,
        })
        .collect();

    let mut links = Vec::new();
    for (index, left) in wines.iter().enumerate() {
        for right in &wines[index + 1..] {
            let shared = shared_attributes(left, right);
            if !shared.is_empty() {
                links.push(GraphLink {
                    source: left.id.clone(),
                    target: right.id.clone(),
                    weight: shared.len(),
                    shared,
                });
            }
        }
    }

    WineGraph { nodes, links }
}

fn shared_attributes(left: &Wine, right: &Wine) -> Vec<LinkKind> {
    let mut shared = Vec::new();
    if same_known(&left.region, &right.region, DEFAULT_REGION) {
        shared.push(LinkKind::Region);
    }
    let grapes_overlap = left.varietals().iter().any(|grape| {
        right
            .varietals()
            .iter()
            .any(|other| same_known(grape, other, DEFAULT_GRAPE))
    });
    if grapes_overlap {
        shared.push(LinkKind::Grape);
    }
    if same_known(&left.winery, &right.winery, DEFAULT_WINERY) {
        shared.push(LinkKind::Winery);
    }
    shared
}

fn same_known(left: &str, right: &str, placeholder: &str) -> bool {
    let left = normalize(left);
    !left.is_empty() && left != normalize(placeholder) && left == normalize(right)
}
