//! Built-in wines shown when the store holds nothing.

use crate::{Aroma, Body, Structure, Sweetness, Tannins, Wine, WineType, BLEND};

/// Prefix of the synthetic ids given to seed wines.
pub const SEED_ID_PREFIX: &str = "default-";

#[allow(clippy::too_many_arguments)]
fn wine(
    name: &str,
    region: &str,
    winery: &str,
    year: i32,
    wine_type: WineType,
    grapes: &[&str],
    sensory: (Body, Structure, Tannins, Sweetness, Aroma),
    description: &str,
    pairing: &str,
    storage: &str,
    rating: u8,
) -> Wine {
    let (body, structure, tannins, sweetness, aroma) = sensory;
    let grape = match grapes {
        [single] => (*single).to_string(),
        _ => BLEND.to_string(),
    };
    Wine {
        id: String::new(),
        name: name.into(),
        region: region.into(),
        winery: winery.into(),
        year,
        wine_type,
        image: crate::DEFAULT_IMAGE.into(),
        grape,
        grapes: grapes.iter().map(|grape| (*grape).to_string()).collect(),
        body,
        structure,
        tannins,
        sweetness,
        aroma,
        description: description.into(),
        pairing: pairing.into(),
        storage: storage.into(),
        rating,
    }
}

/// The five built-in wines, with ids `default-0` to `default-4`.
pub fn seed_wines() -> Vec<Wine> {
    let wines = vec![
        wine(
            "Brunello di Montalcino",
            "Toscana",
            "Biondi-Santi",
            2016,
            WineType::Red,
            &["Sangiovese"],
            (
                Body::Corposo,
                Structure::Strutturato,
                Tannins::Tannico,
                Sweetness::Secco,
                Aroma::Evoluto,
            ),
            "Rosso granato, tannico e persistente, con note di ciliegia matura, cuoio e spezie dolci.",
            "Bistecca alla fiorentina, selvaggina, formaggi stagionati",
            "Bottiglia coricata a 14-16°C, al buio; migliora per oltre vent'anni.",
            9,
        ),
        wine(
            "Barolo",
            "Piemonte",
            "Giacomo Conterno",
            2017,
            WineType::Red,
            &["Nebbiolo"],
            (
                Body::Corposo,
                Structure::Strutturato,
                Tannins::Tannico,
                Sweetness::Secco,
                Aroma::Speziato,
            ),
            "Austero e intenso, profumi di rosa appassita, catrame e liquirizia.",
            "Brasato al Barolo, tajarin al tartufo, carni rosse",
            "Cantina fresca e umida; aprire un'ora prima del servizio.",
            9,
        ),
        wine(
            "Vermentino di Gallura",
            "Sardegna",
            "Capichera",
            2022,
            WineType::White,
            &["Vermentino"],
            (
                Body::Leggero,
                Structure::Elegante,
                Tannins::Morbido,
                Sweetness::Secco,
                Aroma::Fruttato,
            ),
            "Fresco e sapido, con sentori di agrumi, pesca bianca e macchia mediterranea.",
            "Pesce alla griglia, crostacei, frutti di mare",
            "Servire a 8-10°C; da bere entro tre anni dalla vendemmia.",
            8,
        ),
        wine(
            "Franciacorta Brut",
            "Lombardia",
            "Ca' del Bosco",
            2019,
            WineType::Sparkling,
            &["Chardonnay", "Pinot Nero"],
            (
                Body::Medio,
                Structure::Elegante,
                Tannins::Morbido,
                Sweetness::Secco,
                Aroma::Fruttato,
            ),
            "Perlage fine, note di crosta di pane, mela verde e agrumi; fresco e minerale.",
            "Aperitivo, crudi di pesce, ostriche",
            "Conservare in verticale a 10-12°C; servire a 6-8°C.",
            8,
        ),
        wine(
            "Moscato d'Asti",
            "Piemonte",
            "Saracco",
            2023,
            WineType::White,
            &["Moscato Bianco"],
            (
                Body::Leggero,
                Structure::Elegante,
                Tannins::Morbido,
                Sweetness::Dolce,
                Aroma::Fruttato,
            ),
            "Dolce e aromatico, leggermente frizzante, con profumi di salvia, miele e pesca.",
            "Pasticceria secca, crostate di frutta, dessert al cucchiaio",
            "Servire freddo a 6°C; da bere giovane.",
            7,
        ),
    ];

    wines
        .into_iter()
        .enumerate()
        .map(|(index, mut wine)| {
            wine.id = format!("{SEED_ID_PREFIX}{index}");
            wine
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_ids_are_sequential() {
        let ids: Vec<_> = seed_wines().into_iter().map(|wine| wine.id).collect();
        assert_eq!(
            ids,
            vec!["default-0", "default-1", "default-2", "default-3", "default-4"]
        );
    }

    #[test]
    fn seed_wines_are_valid() {
        for wine in seed_wines() {
            wine.validate().unwrap();
        }
    }
}
