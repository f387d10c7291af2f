//! Domain DTOs for the dog catalog API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch drift between the two. Fields the service may
//! omit are optional or defaulted so partial records still deserialize.
//! Ranges derived from the raw strings are computed by pure methods on each
//! call rather than stored.

use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::units::{parse_range, Centimeters, Inches, Kilograms, Pounds, UnitRange, Years};

/// Identifier of an image, e.g. `"MUGiNcu_Z"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(pub String);

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ImageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&ImageId> for ImageId {
    fn from(id: &ImageId) -> Self {
        id.clone()
    }
}

impl From<&Image> for ImageId {
    fn from(image: &Image) -> Self {
        image.id.clone()
    }
}

/// Identifier of a breed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreedId(pub u32);

impl fmt::Display for BreedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BreedId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<&Breed> for BreedId {
    fn from(breed: &Breed) -> Self {
        breed.id
    }
}

/// An image returned by search, lookup or the uploaded-images listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Image {
    pub id: ImageId,
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub breeds: Vec<Breed>,
}

/// A raw range reported in both unit systems, e.g. `{"imperial": "6 - 13", "metric": "3 - 6"}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Measurement {
    #[serde(default)]
    pub imperial: String,
    #[serde(default)]
    pub metric: String,
}

/// Weight ranges; metric in kilograms, imperial in pounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Weight(pub Measurement);

impl Weight {
    #[must_use]
    pub fn metric(&self) -> Option<UnitRange<Kilograms>> {
        parse_range(&self.0.metric)
    }

    #[must_use]
    pub fn imperial(&self) -> Option<UnitRange<Pounds>> {
        parse_range(&self.0.imperial)
    }
}

/// Height ranges; metric in centimetres, imperial in inches.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Height(pub Measurement);

impl Height {
    #[must_use]
    pub fn metric(&self) -> Option<UnitRange<Centimeters>> {
        parse_range(&self.0.metric)
    }

    #[must_use]
    pub fn imperial(&self) -> Option<UnitRange<Inches>> {
        parse_range(&self.0.imperial)
    }
}

/// A dog breed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Breed {
    pub id: BreedId,
    pub name: String,
    #[serde(default)]
    pub weight: Weight,
    #[serde(default)]
    pub height: Height,
    #[serde(default)]
    pub bred_for: Option<String>,
    #[serde(default, rename = "breed_group")]
    pub group: Option<String>,
    #[serde(default)]
    pub life_span: Option<String>,
    /// Comma-separated list, see [`Breed::temperaments`].
    #[serde(default)]
    pub temperament: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub history: Option<String>,
}

impl Breed {
    /// Expected life span in years.
    ///
    /// The service appends a unit word (`"10 - 12 years"`); it is ignored.
    #[must_use]
    pub fn expected_life(&self) -> Option<UnitRange<Years>> {
        let raw = self.life_span.as_deref()?.trim();
        let raw = raw
            .strip_suffix("years")
            .or_else(|| raw.strip_suffix("year"))
            .unwrap_or(raw);
        parse_range(raw)
    }

    /// Individual temperament entries, trimmed. Empty when unknown.
    pub fn temperaments(&self) -> impl Iterator<Item = &str> {
        self.temperament
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Payload for tagging a breed on an image.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageTag {
    pub breed_id: BreedId,
}

/// Size filter for image search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Thumb,
    Small,
    Med,
    Full,
}

impl ImageSize {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::Thumb => "thumb",
            ImageSize::Small => "small",
            ImageSize::Med => "med",
            ImageSize::Full => "full",
        }
    }
}

/// Result ordering. `Random` leaves the choice to the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortMode {
    Ascending,
    Descending,
    #[default]
    Random,
}

impl SortMode {
    /// Value of the `order` query parameter; `None` means the parameter is omitted.
    #[must_use]
    pub fn order_param(self) -> Option<&'static str> {
        match self {
            SortMode::Ascending => Some("ASC"),
            SortMode::Descending => Some("DESC"),
            SortMode::Random => None,
        }
    }
}

/// Query for `GET images/search`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSearch {
    pub size: Option<ImageSize>,
    /// Only return images with at least one tagged breed.
    pub breeds_only: bool,
    pub page: u32,
    pub limit: u32,
    pub order: SortMode,
}

impl Default for ImageSearch {
    fn default() -> Self {
        Self {
            size: None,
            breeds_only: true,
            page: 0,
            limit: 1,
            order: SortMode::Random,
        }
    }
}

/// Query for `GET images` (images uploaded with the configured key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImages {
    pub page: u32,
    pub limit: u32,
    pub order: SortMode,
}

impl Default for UploadedImages {
    fn default() -> Self {
        Self {
            page: 0,
            limit: 10,
            order: SortMode::Ascending,
        }
    }
}

/// Query for `GET breeds`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreedPage {
    pub page: u32,
    pub limit: u32,
}

impl Default for BreedPage {
    fn default() -> Self {
        Self { page: 0, limit: 10 }
    }
}

/// An image file to upload, with optional metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file: Vec<u8>,
    pub file_name: String,
    /// Caller-chosen reference stored alongside the image.
    pub sub_id: Option<String>,
    pub breed_ids: Vec<BreedId>,
}

impl ImageUpload {
    pub fn new(file: Vec<u8>, file_name: impl Into<String>) -> Self {
        Self {
            file,
            file_name: file_name.into(),
            sub_id: None,
            breed_ids: Vec::new(),
        }
    }

    /// Read the whole stream into an upload.
    pub fn from_reader(mut reader: impl Read, file_name: impl Into<String>) -> ApiResult<Self> {
        let mut file = Vec::new();
        reader.read_to_end(&mut file)?;
        Ok(Self::new(file, file_name))
    }

    #[must_use]
    pub fn with_sub_id(mut self, sub_id: impl Into<String>) -> Self {
        self.sub_id = Some(sub_id.into());
        self
    }

    #[must_use]
    pub fn with_breeds<I, B>(mut self, breeds: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<BreedId>,
    {
        self.breed_ids = breeds.into_iter().map(Into::into).collect();
        self
    }
}
