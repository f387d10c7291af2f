//! Client for the dog catalog REST API (`https://api.thedogapi.com/v1/`).
//!
//! # Overview
//! `DogClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network (host-does-IO pattern). `DogApi` pairs it
//! with a `Transport` (reqwest by default) and exposes one async method per
//! catalog operation.
//!
//! # Design
//! - `DogClient` is stateless; it holds only the base URL and API key.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Any non-2xx response becomes `ApiError::HttpError` with the status and
//!   raw body.
//! - Weight, height and life-span ranges are parsed on demand from the raw
//!   strings by pure functions in `units`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//!
//! ```rust,no_run
//! use dogapi_core::{ClientConfig, DogApi, ImageSearch};
//!
//! # async fn run() -> Result<(), dogapi_core::ApiError> {
//! let api = DogApi::new(&ClientConfig::new("my-api-key"))?;
//! let images = api.search_images(&ImageSearch::default()).await?;
//! for breed in api.image_breeds(&images[0]).await? {
//!     println!("{} weighs {:?}", breed.name, breed.weight.metric());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;
pub mod units;

pub use api::DogApi;
pub use client::DogClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use http::{FormPart, HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartForm};
pub use transport::{BoxFuture, ReqwestTransport, Transport};
pub use types::{
    Breed, BreedId, BreedPage, Height, Image, ImageId, ImageSearch, ImageSize, ImageTag,
    ImageUpload, Measurement, SortMode, UploadedImages, Weight,
};
pub use units::{parse_range, Centimeters, Inches, Kilograms, Pounds, UnitRange, Years};
