//! Browse filters over the wine collection.

use cv_utils::normalize;

use crate::{Wine, WineType};

/// Criteria for narrowing the collection; unset criteria match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WineFilter {
    pub year: Option<i32>,
    pub region: Option<String>,
    pub wine_type: Option<WineType>,
    /// Matched against name, winery, region, and grapes.
    pub text: Option<String>,
}

impl WineFilter {
    /// Whether the wine satisfies every set criterion.
    pub fn matches(&self, wine: &Wine) -> bool {
        if self.year.is_some_and(|year| year != wine.year) {
            return false;
        }
        if self.wine_type.is_some_and(|wine_type| wine_type != wine.wine_type) {
            return false;
        }
        if let Some(region) = &self.region {
            if normalize(region) != normalize(&wine.region) {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = normalize(text);
            let haystacks = [&wine.name, &wine.winery, &wine.region, &wine.grape];
            let found = haystacks
                .into_iter()
                .chain(wine.grapes.iter())
                .any(|value| value.to_lowercase().contains(&needle));
            if !found {
                return false;
            }
        }
        true
    }

    /// Keep the wines that match, in their original order.
    pub fn apply<'a>(&self, wines: &'a [Wine]) -> Vec<&'a Wine> {
        wines.iter().filter(|wine| self.matches(wine)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed_wines;

    #[test]
    fn empty_filter_matches_everything() {
        let wines = seed_wines();
        assert_eq!(WineFilter::default().apply(&wines).len(), wines.len());
    }

    #[test]
    fn criteria_combine() {
        let wines = seed_wines();
        let filter = WineFilter {
            region: Some("piemonte".into()),
            wine_type: Some(WineType::Red),
            ..WineFilter::default()
        };
        let names: Vec<_> = filter.apply(&wines).iter().map(|wine| wine.name.as_str()).collect();
        assert_eq!(names, vec!["Barolo"]);
    }

    #[test]
    fn text_matches_blend_grapes() {
        let wines = seed_wines();
        let filter = WineFilter {
            text: Some("pinot".into()),
            ..WineFilter::default()
        };
        let names: Vec<_> = filter.apply(&wines).iter().map(|wine| wine.name.as_str()).collect();
        assert_eq!(names, vec!["Franciacorta Brut"]);
    }
}
