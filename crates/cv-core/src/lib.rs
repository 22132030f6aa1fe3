//! Core domain entities, rules, and traits for CellarVault.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod draft;
mod filter;
pub mod narrative;
mod seed;

pub use draft::{
    WineDraft, WinePatch, DEFAULT_GRAPE, DEFAULT_IMAGE, DEFAULT_RATING, DEFAULT_REGION,
    DEFAULT_WINERY,
};
pub use filter::WineFilter;
pub use seed::{seed_wines, SEED_ID_PREFIX};

/// Sentinel grape name marking a multi-varietal wine.
pub const BLEND: &str = "Blend";

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;

/// Highest accepted rating.
pub const MAX_RATING: u8 = 10;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for document store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by core validation and domain rules.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Returned when a validation rule is violated.
    #[error("validation error: {0}")]
    Validation(String),
    /// Returned when local persistence or configuration fails.
    #[error("storage error: {0}")]
    Storage(String),
    /// Returned when the document store rejects an operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure codes reported by the document store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreErrorKind {
    Unavailable,
    FailedPrecondition,
    DeadlineExceeded,
    Aborted,
    NotFound,
    InvalidArgument,
    PermissionDenied,
    Internal,
}

impl StoreErrorKind {
    /// The wire code for this kind.
    pub fn code(self) -> &'static str {
        match self {
            StoreErrorKind::Unavailable => "unavailable",
            StoreErrorKind::FailedPrecondition => "failed-precondition",
            StoreErrorKind::DeadlineExceeded => "deadline-exceeded",
            StoreErrorKind::Aborted => "aborted",
            StoreErrorKind::NotFound => "not-found",
            StoreErrorKind::InvalidArgument => "invalid-argument",
            StoreErrorKind::PermissionDenied => "permission-denied",
            StoreErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An error reported by the document store.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct StoreError {
    /// Failure code.
    pub kind: StoreErrorKind,
    /// Human-readable detail.
    pub message: String,
}

impl StoreError {
    /// Create a new store error.
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for an `unavailable` error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unavailable, message)
    }

    /// Shorthand for a `not-found` error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound, message)
    }

    /// Shorthand for an `internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Internal, message)
    }

    /// Whether this failure points at a connectivity problem rather than a rejected request.
    pub fn is_connectivity(&self) -> bool {
        if matches!(
            self.kind,
            StoreErrorKind::Unavailable
                | StoreErrorKind::FailedPrecondition
                | StoreErrorKind::DeadlineExceeded
                | StoreErrorKind::Aborted
        ) {
            return true;
        }
        let message = self.message.to_lowercase();
        ["network", "abort", "timeout", "timed out"]
            .iter()
            .any(|signal| message.contains(signal))
    }
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every value of the vocabulary, in display order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical label.
            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(input: &str) -> Result<Self, Self::Err> {
                let wanted = input.trim().to_lowercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|value| value.label().to_lowercase() == wanted)
                    .ok_or_else(|| {
                        CoreError::Validation(format!(
                            "unknown {}: {input}",
                            stringify!($name).to_lowercase()
                        ))
                    })
            }
        }
    };
}

vocabulary! {
    /// Body of the wine.
    Body { Leggero => "Leggero", Medio => "Medio", Corposo => "Corposo" }
}

vocabulary! {
    /// Overall structure.
    Structure { Elegante => "Elegante", Equilibrato => "Equilibrato", Strutturato => "Strutturato" }
}

vocabulary! {
    /// Tannic grip.
    Tannins { Morbido => "Morbido", Equilibrato => "Equilibrato", Tannico => "Tannico" }
}

vocabulary! {
    /// Residual sweetness.
    Sweetness { Secco => "Secco", Amabile => "Amabile", Dolce => "Dolce" }
}

vocabulary! {
    /// Dominant aroma family.
    Aroma { Fruttato => "Fruttato", Speziato => "Speziato", Evoluto => "Evoluto" }
}

vocabulary! {
    /// Wine category.
    WineType { Red => "red", White => "white", Rose => "rosé", Sparkling => "sparkling" }
}

/// A wine record as the catalog knows it.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Wine {
    /// Store-issued identifier, or a temporary one for optimistic records.
    #[serde(default)]
    pub id: String,
    /// Display name.
    pub name: String,
    /// Production region.
    #[serde(default)]
    pub region: String,
    /// Producer.
    #[serde(default)]
    pub winery: String,
    /// Vintage.
    pub year: i32,
    /// Wine category.
    #[serde(rename = "type")]
    pub wine_type: WineType,
    /// Label image URL or data URI.
    #[serde(default)]
    pub image: String,
    /// Single varietal, or [`BLEND`].
    pub grape: String,
    /// Varietals of a blend, or the single grape mirrored.
    #[serde(default)]
    pub grapes: Vec<String>,
    pub body: Body,
    pub structure: Structure,
    pub tannins: Tannins,
    pub sweetness: Sweetness,
    pub aroma: Aroma,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Suggested food pairing.
    #[serde(default)]
    pub pairing: String,
    /// Ageing and storage guidance.
    #[serde(default)]
    pub storage: String,
    /// Rating on a 1-10 scale.
    pub rating: u8,
}

impl Wine {
    /// Whether the wine is a multi-varietal blend.
    pub fn is_blend(&self) -> bool {
        self.grape == BLEND
    }

    /// Varietals making up the wine.
    pub fn varietals(&self) -> Vec<&str> {
        if self.is_blend() || !self.grapes.is_empty() {
            self.grapes.iter().map(String::as_str).collect()
        } else {
            vec![self.grape.as_str()]
        }
    }

    /// Check the write-time invariants.
    pub fn validate(&self) -> CoreResult<()> {
        validate_name(&self.name)?;
        validate_rating(self.rating)?;
        if !self.is_blend() && self.grapes.len() > 1 {
            return Err(CoreError::Validation(format!(
                "grape '{}' is not a blend but lists {} grapes",
                self.grape,
                self.grapes.len()
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_name(name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("name cannot be empty".into()));
    }
    Ok(())
}

pub(crate) fn validate_rating(rating: u8) -> CoreResult<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(CoreError::Validation(format!(
            "rating must be between {MIN_RATING} and {MAX_RATING}, got {rating}"
        )));
    }
    Ok(())
}

/// Field used to order a full listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderBy {
    Name,
    Year,
    Rating,
}

/// Network switch of a store client.
#[async_trait]
pub trait NetworkControl: Send + Sync {
    /// Re-enable outbound traffic.
    async fn enable_network(&self) -> StoreResult<()>;
    /// Stop outbound traffic.
    async fn disable_network(&self) -> StoreResult<()>;
}

/// Document store abstraction for the wine collection.
#[async_trait]
pub trait DocumentStore: NetworkControl {
    /// Fetch every wine ordered by the given field.
    async fn list(&self, order: OrderBy) -> StoreResult<Vec<Wine>>;
    /// Fetch a single wine by id.
    async fn get(&self, id: &str) -> StoreResult<Option<Wine>>;
    /// Create a wine and return it with the store-issued id.
    ///
    /// Repeating a create with the same `idempotency_key` returns the first record.
    async fn create(&self, wine: &Wine, idempotency_key: &str) -> StoreResult<Wine>;
    /// Merge the patch into an existing wine.
    async fn update(&self, id: &str, patch: &WinePatch) -> StoreResult<()>;
    /// Delete a wine by id.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}
