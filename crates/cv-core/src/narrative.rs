//! Narrative fields, falling back to type and region templates when left blank.

use crate::{Wine, WineType};

/// The wine's description, or a template built from its type and region.
pub fn description(wine: &Wine) -> String {
    if !wine.description.trim().is_empty() {
        return wine.description.clone();
    }
    let style = match wine.wine_type {
        WineType::Red => "Un rosso",
        WineType::White => "Un bianco",
        WineType::Rose => "Un rosato",
        WineType::Sparkling => "Uno spumante",
    };
    format!(
        "{style} {} dal profilo {}, espressione del territorio {}.",
        wine.body.label().to_lowercase(),
        wine.aroma.label().to_lowercase(),
        region_phrase(wine)
    )
}

/// The wine's suggested pairing, or a template for its type.
pub fn pairing(wine: &Wine) -> String {
    if !wine.pairing.trim().is_empty() {
        return wine.pairing.clone();
    }
    match wine.wine_type {
        WineType::Red => "Carni rosse, arrosti e formaggi stagionati".into(),
        WineType::White => "Pesce, crostacei e verdure di stagione".into(),
        WineType::Rose => "Salumi, pizza e cucina mediterranea".into(),
        WineType::Sparkling => "Aperitivo, crudi di mare e fritture".into(),
    }
}

/// The wine's storage guidance, or a template for its type.
pub fn storage(wine: &Wine) -> String {
    if !wine.storage.trim().is_empty() {
        return wine.storage.clone();
    }
    match wine.wine_type {
        WineType::Red => {
            "Conservare coricato a 14-16°C al riparo dalla luce; servire a 16-18°C.".into()
        }
        WineType::White | WineType::Rose => {
            "Conservare coricato a 10-12°C; servire fresco a 8-10°C, entro pochi anni.".into()
        }
        WineType::Sparkling => {
            "Conservare in verticale a 10-12°C; servire a 6-8°C.".into()
        }
    }
}

fn region_phrase(wine: &Wine) -> String {
    let region = wine.region.trim();
    if region.is_empty() || region == crate::DEFAULT_REGION {
        "di origine".into()
    } else {
        format!("della regione {region}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WineDraft;

    #[test]
    fn stored_text_wins_over_template() {
        let wine = crate::seed_wines().remove(2);
        assert_eq!(pairing(&wine), wine.pairing);
        assert_eq!(description(&wine), wine.description);
    }

    #[test]
    fn blank_fields_use_templates() {
        let wine = WineDraft {
            region: Some("Toscana".into()),
            ..WineDraft::named("Chianti")
        }
        .into_wine(2021)
        .unwrap();
        assert_eq!(
            description(&wine),
            "Un rosso medio dal profilo fruttato, espressione del territorio della regione Toscana."
        );
        assert_eq!(pairing(&wine), "Carni rosse, arrosti e formaggi stagionati");
        assert!(storage(&wine).starts_with("Conservare coricato"));
    }
}
