//! Conversion from the catalogue vocabulary to the cellar's.

use cv_core::{
    Aroma, Body, Structure, Sweetness, Tannins, WineDraft, WineType, BLEND, MAX_RATING,
    MIN_RATING,
};

use crate::{CatalogueWine, FlavourGroup, TasteProfile};

const HIGH: f64 = 3.5;
const LOW: f64 = 2.5;

/// Map a catalogue type code to a wine type.
pub fn wine_type_from_code(code: u32) -> WineType {
    match code {
        2 | 7 => WineType::White,
        3 => WineType::Sparkling,
        4 => WineType::Rose,
        _ => WineType::Red,
    }
}

pub fn body_from_intensity(intensity: Option<f64>) -> Body {
    match intensity {
        Some(value) if value > HIGH => Body::Corposo,
        Some(value) if value < LOW => Body::Leggero,
        _ => Body::Medio,
    }
}

pub fn tannins_from_tannin(tannin: Option<f64>) -> Tannins {
    match tannin {
        Some(value) if value > HIGH => Tannins::Tannico,
        Some(value) if value < LOW => Tannins::Morbido,
        _ => Tannins::Equilibrato,
    }
}

/// Structure follows the mean of acidity and tannin, or whichever one is known.
pub fn structure_from(acidity: Option<f64>, tannin: Option<f64>) -> Structure {
    let mean = match (acidity, tannin) {
        (Some(acidity), Some(tannin)) => Some((acidity + tannin) / 2.0),
        (one, other) => one.or(other),
    };
    match mean {
        Some(value) if value > HIGH => Structure::Strutturato,
        Some(value) if value < LOW => Structure::Elegante,
        _ => Structure::Equilibrato,
    }
}

pub fn sweetness_from(sweetness: Option<f64>) -> Sweetness {
    match sweetness {
        Some(value) if value > HIGH => Sweetness::Dolce,
        Some(value) if value >= LOW => Sweetness::Amabile,
        _ => Sweetness::Secco,
    }
}

/// Aroma from the flavour group with the most mentions.
pub fn aroma_from(flavours: &[FlavourGroup]) -> Aroma {
    let dominant = flavours
        .iter()
        .filter(|flavour| flavour.score > 0.0)
        .fold(None::<&FlavourGroup>, |best, flavour| match best {
            Some(best) if best.score >= flavour.score => Some(best),
            _ => Some(flavour),
        });
    match dominant.map(|flavour| flavour.group.as_str()) {
        Some("earth" | "oak" | "ageing" | "aging") => Aroma::Evoluto,
        Some("spices" | "spice") => Aroma::Speziato,
        _ => Aroma::Fruttato,
    }
}

/// Convert a 0-5 average to the 1-10 cellar scale.
pub fn rating_from_average(average: Option<f64>) -> Option<u8> {
    let average = average.filter(|value| value.is_finite() && *value > 0.0)?;
    let doubled = (average * 2.0).round();
    let rating = (MIN_RATING..=MAX_RATING)
        .rev()
        .find(|step| f64::from(*step) <= doubled)
        .unwrap_or(MIN_RATING);
    Some(rating)
}

/// Build an add-form draft from a catalogue hit and its taste profile.
pub fn to_draft(wine: &CatalogueWine, taste: &TasteProfile) -> WineDraft {
    let grapes: Vec<String> = wine
        .grapes
        .iter()
        .map(|grape| grape.trim().to_string())
        .filter(|grape| !grape.is_empty())
        .collect();
    let (grape, grapes) = match grapes.len() {
        0 => (None, None),
        1 => (Some(grapes[0].clone()), Some(grapes)),
        _ => (Some(BLEND.to_string()), Some(grapes)),
    };
    let structure = &taste.structure;

    WineDraft {
        name: Some(wine.name.clone()),
        region: wine.region.clone().filter(|region| !region.trim().is_empty()),
        winery: wine.winery.clone().filter(|winery| !winery.trim().is_empty()),
        year: wine.year,
        wine_type: Some(wine_type_from_code(wine.type_id)),
        image: wine.image.clone(),
        grape,
        grapes,
        body: Some(body_from_intensity(structure.intensity)),
        structure: Some(structure_from(structure.acidity, structure.tannin)),
        tannins: Some(tannins_from_tannin(structure.tannin)),
        sweetness: Some(sweetness_from(structure.sweetness)),
        aroma: Some(aroma_from(&taste.flavour)),
        description: None,
        pairing: None,
        storage: None,
        rating: rating_from_average(wine.rating),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TasteStructure;

    fn flavour(group: &str, score: f64) -> FlavourGroup {
        FlavourGroup {
            group: group.into(),
            score,
        }
    }

    #[test]
    fn type_codes_map_to_cellar_types() {
        assert_eq!(wine_type_from_code(1), WineType::Red);
        assert_eq!(wine_type_from_code(2), WineType::White);
        assert_eq!(wine_type_from_code(3), WineType::Sparkling);
        assert_eq!(wine_type_from_code(4), WineType::Rose);
        assert_eq!(wine_type_from_code(7), WineType::White);
        assert_eq!(wine_type_from_code(24), WineType::Red);
        assert_eq!(wine_type_from_code(99), WineType::Red);
    }

    #[test]
    fn taste_axes_use_thresholds() {
        assert_eq!(body_from_intensity(Some(4.2)), Body::Corposo);
        assert_eq!(body_from_intensity(Some(3.5)), Body::Medio);
        assert_eq!(body_from_intensity(Some(2.0)), Body::Leggero);
        assert_eq!(body_from_intensity(None), Body::Medio);

        assert_eq!(tannins_from_tannin(Some(4.0)), Tannins::Tannico);
        assert_eq!(tannins_from_tannin(Some(1.5)), Tannins::Morbido);

        assert_eq!(structure_from(Some(4.0), Some(4.0)), Structure::Strutturato);
        assert_eq!(structure_from(Some(2.0), Some(3.0)), Structure::Equilibrato);
        assert_eq!(structure_from(Some(2.0), None), Structure::Elegante);

        assert_eq!(sweetness_from(Some(4.0)), Sweetness::Dolce);
        assert_eq!(sweetness_from(Some(2.5)), Sweetness::Amabile);
        assert_eq!(sweetness_from(Some(1.0)), Sweetness::Secco);
        assert_eq!(sweetness_from(None), Sweetness::Secco);
    }

    #[test]
    fn dominant_flavour_picks_aroma() {
        assert_eq!(
            aroma_from(&[flavour("red_fruit", 3.0), flavour("oak", 7.0)]),
            Aroma::Evoluto
        );
        assert_eq!(
            aroma_from(&[flavour("spices", 5.0), flavour("citrus", 2.0)]),
            Aroma::Speziato
        );
        assert_eq!(aroma_from(&[]), Aroma::Fruttato);
    }

    #[test]
    fn ratings_are_doubled_and_bounded() {
        assert_eq!(rating_from_average(Some(4.3)), Some(9));
        assert_eq!(rating_from_average(Some(5.0)), Some(10));
        assert_eq!(rating_from_average(Some(0.2)), Some(1));
        assert_eq!(rating_from_average(Some(0.0)), None);
        assert_eq!(rating_from_average(None), None);
    }

    #[test]
    fn out_of_scale_averages_are_capped() {
        assert_eq!(rating_from_average(Some(7.0)), Some(10));
        assert_eq!(rating_from_average(Some(1e12)), Some(10));
        assert_eq!(rating_from_average(Some(0.26)), Some(1));
        assert_eq!(rating_from_average(Some(-3.0)), None);
        assert_eq!(rating_from_average(Some(f64::INFINITY)), None);
        assert_eq!(rating_from_average(Some(f64::NAN)), None);
    }

    #[test]
    fn several_grapes_make_a_blend() {
        let wine = CatalogueWine {
            id: 10,
            name: "Franciacorta Satèn".into(),
            region: Some("Lombardia".into()),
            winery: Some("Ca' del Bosco".into()),
            year: Some(2019),
            type_id: 3,
            rating: Some(4.1),
            grapes: vec!["Chardonnay".into(), "Pinot Bianco".into()],
            image: None,
        };
        let taste = TasteProfile {
            structure: TasteStructure {
                acidity: Some(4.1),
                intensity: Some(3.0),
                sweetness: Some(1.2),
                tannin: None,
            },
            flavour: vec![flavour("citrus", 4.0)],
        };

        let draft = to_draft(&wine, &taste);

        assert_eq!(draft.grape.as_deref(), Some(BLEND));
        assert_eq!(draft.grapes.as_ref().map(Vec::len), Some(2));
        assert_eq!(draft.wine_type, Some(WineType::Sparkling));
        assert_eq!(draft.structure, Some(Structure::Strutturato));
        assert_eq!(draft.rating, Some(8));

        let wine = draft.into_wine(2024).unwrap();
        assert!(wine.is_blend());
        assert_eq!(wine.body, Body::Medio);
    }
}
