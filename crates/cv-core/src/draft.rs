//! Drafts for new wines and partial updates for existing ones.

use serde::{Deserialize, Serialize};

use crate::{
    validate_name, validate_rating, Aroma, Body, CoreError, CoreResult, Structure, Sweetness,
    Tannins, Wine, WineType, BLEND,
};

/// Grape recorded when the user did not name one.
pub const DEFAULT_GRAPE: &str = "Non specificato";

/// Region recorded when the user did not name one.
pub const DEFAULT_REGION: &str = "Regione non specificata";

/// Winery recorded when the user did not name one.
pub const DEFAULT_WINERY: &str = "Cantina non specificata";

/// Label image used until the user uploads one.
pub const DEFAULT_IMAGE: &str = "https://placehold.co/400x600?text=Vino";

/// Rating given to wines added without one.
pub const DEFAULT_RATING: u8 = 5;

/// A wine as entered in the add form, before it has an id.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct WineDraft {
    pub name: Option<String>,
    pub region: Option<String>,
    pub winery: Option<String>,
    pub year: Option<i32>,
    #[serde(rename = "type")]
    pub wine_type: Option<WineType>,
    pub image: Option<String>,
    pub grape: Option<String>,
    pub grapes: Option<Vec<String>>,
    pub body: Option<Body>,
    pub structure: Option<Structure>,
    pub tannins: Option<Tannins>,
    pub sweetness: Option<Sweetness>,
    pub aroma: Option<Aroma>,
    pub description: Option<String>,
    pub pairing: Option<String>,
    pub storage: Option<String>,
    pub rating: Option<u8>,
}

impl WineDraft {
    /// Start a draft with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Validate the draft and fill every missing field with its default.
    ///
    /// The returned wine has an empty id.
    pub fn into_wine(self, current_year: i32) -> CoreResult<Wine> {
        let name = self
            .name
            .ok_or_else(|| CoreError::Validation("name is required".into()))?;
        validate_name(&name)?;
        let rating = self.rating.unwrap_or(DEFAULT_RATING);
        validate_rating(rating)?;

        let grape = self
            .grape
            .filter(|grape| !grape.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GRAPE.to_string());
        let grapes = match self.grapes {
            Some(grapes) => grapes,
            None if grape == BLEND || grape == DEFAULT_GRAPE => Vec::new(),
            None => vec![grape.clone()],
        };

        let wine = Wine {
            id: String::new(),
            name,
            region: self.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            winery: self.winery.unwrap_or_else(|| DEFAULT_WINERY.to_string()),
            year: self.year.unwrap_or(current_year),
            wine_type: self.wine_type.unwrap_or(WineType::Red),
            image: self.image.unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
            grape,
            grapes,
            body: self.body.unwrap_or(Body::Medio),
            structure: self.structure.unwrap_or(Structure::Equilibrato),
            tannins: self.tannins.unwrap_or(Tannins::Equilibrato),
            sweetness: self.sweetness.unwrap_or(Sweetness::Secco),
            aroma: self.aroma.unwrap_or(Aroma::Fruttato),
            description: self.description.unwrap_or_default(),
            pairing: self.pairing.unwrap_or_default(),
            storage: self.storage.unwrap_or_default(),
            rating,
        };
        wine.validate()?;
        Ok(wine)
    }
}

/// A partial update: every `Some` slot replaces the matching field.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct WinePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winery: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub wine_type: Option<WineType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grapes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<Structure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tannins: Option<Tannins>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweetness: Option<Sweetness>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aroma: Option<Aroma>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
}

impl WinePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn winery(mut self, winery: impl Into<String>) -> Self {
        self.winery = Some(winery.into());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn wine_type(mut self, wine_type: WineType) -> Self {
        self.wine_type = Some(wine_type);
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Set the varietal composition; more than one grape turns the wine into a blend.
    pub fn varietals(mut self, grapes: Vec<String>) -> Self {
        let grape = match grapes.as_slice() {
            [] => DEFAULT_GRAPE.to_string(),
            [single] => single.clone(),
            _ => BLEND.to_string(),
        };
        self.grape = Some(grape);
        self.grapes = Some(grapes);
        self
    }

    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    pub fn structure(mut self, structure: Structure) -> Self {
        self.structure = Some(structure);
        self
    }

    pub fn tannins(mut self, tannins: Tannins) -> Self {
        self.tannins = Some(tannins);
        self
    }

    pub fn sweetness(mut self, sweetness: Sweetness) -> Self {
        self.sweetness = Some(sweetness);
        self
    }

    pub fn aroma(mut self, aroma: Aroma) -> Self {
        self.aroma = Some(aroma);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn pairing(mut self, pairing: impl Into<String>) -> Self {
        self.pairing = Some(pairing.into());
        self
    }

    pub fn storage(mut self, storage: impl Into<String>) -> Self {
        self.storage = Some(storage.into());
        self
    }

    pub fn rating(mut self, rating: u8) -> Self {
        self.rating = Some(rating);
        self
    }

    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Check the patch against the wine schema before it is dispatched.
    pub fn validate(&self) -> CoreResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        if let (Some(grape), Some(grapes)) = (&self.grape, &self.grapes) {
            if grape != BLEND && grapes.len() > 1 {
                return Err(CoreError::Validation(format!(
                    "grape '{grape}' is not a blend but lists {} grapes",
                    grapes.len()
                )));
            }
        }
        Ok(())
    }

    /// Merge the patch into a wine.
    pub fn apply(&self, wine: &mut Wine) {
        fn set<T: Clone>(slot: &Option<T>, field: &mut T) {
            if let Some(value) = slot {
                *field = value.clone();
            }
        }

        set(&self.name, &mut wine.name);
        set(&self.region, &mut wine.region);
        set(&self.winery, &mut wine.winery);
        set(&self.year, &mut wine.year);
        set(&self.wine_type, &mut wine.wine_type);
        set(&self.image, &mut wine.image);
        set(&self.grape, &mut wine.grape);
        set(&self.grapes, &mut wine.grapes);
        set(&self.body, &mut wine.body);
        set(&self.structure, &mut wine.structure);
        set(&self.tannins, &mut wine.tannins);
        set(&self.sweetness, &mut wine.sweetness);
        set(&self.aroma, &mut wine.aroma);
        set(&self.description, &mut wine.description);
        set(&self.pairing, &mut wine.pairing);
        set(&self.storage, &mut wine.storage);
        set(&self.rating, &mut wine.rating);
    }
}
