//! Tab-separated rows printed by the commands.

use cv_core::{Wine, WineDraft};
use cv_insights::PairingMatch;
use cv_sync::ConnectionState;

pub fn wine_row(wine: &Wine) -> String {
    format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        wine.id, wine.name, wine.year, wine.wine_type, wine.region, wine.rating
    )
}

pub fn wine_rows<'a>(wines: impl IntoIterator<Item = &'a Wine>) -> String {
    wines.into_iter().map(wine_row).collect::<Vec<_>>().join("\n")
}

pub fn pairing_rows(matches: &[PairingMatch]) -> String {
    matches
        .iter()
        .map(|found| {
            format!(
                "{}\t{}\t{}\t{}",
                found.match_score, found.wine.id, found.wine.name, found.wine.pairing
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered catalogue hits; the number is what `--import` takes.
pub fn draft_rows(drafts: &[WineDraft]) -> String {
    drafts
        .iter()
        .enumerate()
        .map(|(index, draft)| {
            format!(
                "{}\t{}\t{}\t{}\t{}",
                index + 1,
                draft.name.as_deref().unwrap_or_default(),
                draft
                    .year
                    .map(|year| year.to_string())
                    .unwrap_or_else(|| "-".into()),
                draft
                    .wine_type
                    .map(|wine_type| wine_type.to_string())
                    .unwrap_or_else(|| "-".into()),
                draft.region.as_deref().unwrap_or("-"),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn connection_row(state: ConnectionState) -> String {
    format!(
        "{}\tfailures={}\tretries={}",
        if state.offline { "offline" } else { "online" },
        state.consecutive_failures,
        state.retries
    )
}
