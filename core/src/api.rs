//! Async facade over `DogClient` and a `Transport`.
//!
//! Every method issues exactly one HTTP request:
//! `build_*` → [`Transport::execute`] → `parse_*`.

use std::time::Instant;

use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::client::DogClient;
use crate::config::ClientConfig;
use crate::error::ApiResult;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    Breed, BreedId, BreedPage, Image, ImageId, ImageSearch, ImageUpload, UploadedImages,
};

/// Dog catalog API client.
///
/// Holds no mutable state; share one instance across tasks.
#[derive(Debug, Clone)]
pub struct DogApi<T = ReqwestTransport> {
    client: DogClient,
    transport: T,
}

impl DogApi<ReqwestTransport> {
    /// Client backed by a default `reqwest` transport.
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        Self::with_transport(config, ReqwestTransport::new())
    }

    /// Client configured from `DOG_API_KEY` / `DOG_API_URL`.
    pub fn from_env() -> ApiResult<Self> {
        Self::new(&ClientConfig::from_env()?)
    }
}

impl<T: Transport> DogApi<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> ApiResult<Self> {
        Ok(Self {
            client: DogClient::new(config)?,
            transport,
        })
    }

    /// The underlying request builder / response parser.
    #[must_use]
    pub fn client(&self) -> &DogClient {
        &self.client
    }

    /// Search public images. `ImageSearch::default()` returns one random image with breeds.
    #[instrument(level = "debug", skip(self))]
    pub async fn search_images(&self, query: &ImageSearch) -> ApiResult<Vec<Image>> {
        let request = self.client.build_search_images(query)?;
        let response = self.send(request).await?;
        self.client.parse_search_images(response)
    }

    #[instrument(level = "debug", skip_all)]
    pub async fn get_image(&self, image: impl Into<ImageId>) -> ApiResult<Option<Image>> {
        let request = self.client.build_get_image(image)?;
        let response = self.send(request).await?;
        self.client.parse_get_image(response)
    }

    /// Images uploaded with the configured API key.
    #[instrument(level = "debug", skip(self))]
    pub async fn uploaded_images(&self, query: &UploadedImages) -> ApiResult<Vec<Image>> {
        let request = self.client.build_uploaded_images(query)?;
        let response = self.send(request).await?;
        self.client.parse_uploaded_images(response)
    }

    #[instrument(level = "debug", skip_all, fields(file_name = %upload.file_name))]
    pub async fn upload_image(&self, upload: ImageUpload) -> ApiResult<()> {
        let request = self.client.build_upload_image(upload)?;
        let response = self.send(request).await?;
        self.client.parse_upload_image(response)
    }

    #[instrument(level = "debug", skip_all)]
    pub async fn delete_image(&self, image: impl Into<ImageId>) -> ApiResult<()> {
        let request = self.client.build_delete_image(image)?;
        let response = self.send(request).await?;
        self.client.parse_delete_image(response)
    }

    /// Breeds tagged on an image; possibly empty.
    #[instrument(level = "debug", skip_all)]
    pub async fn image_breeds(&self, image: impl Into<ImageId>) -> ApiResult<Vec<Breed>> {
        let request = self.client.build_image_breeds(image)?;
        let response = self.send(request).await?;
        self.client.parse_image_breeds(response)
    }

    /// Tag `breed` on `image`.
    #[instrument(level = "debug", skip_all)]
    pub async fn add_breed(
        &self,
        image: impl Into<ImageId>,
        breed: impl Into<BreedId>,
    ) -> ApiResult<()> {
        let request = self.client.build_add_breed(image, breed)?;
        let response = self.send(request).await?;
        self.client.parse_add_breed(response)
    }

    /// Remove the `breed` tag from `image`.
    #[instrument(level = "debug", skip_all)]
    pub async fn remove_breed(
        &self,
        image: impl Into<ImageId>,
        breed: impl Into<BreedId>,
    ) -> ApiResult<()> {
        let request = self.client.build_remove_breed(image, breed)?;
        let response = self.send(request).await?;
        self.client.parse_remove_breed(response)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn list_breeds(&self, query: &BreedPage) -> ApiResult<Vec<Breed>> {
        let request = self.client.build_list_breeds(query)?;
        let response = self.send(request).await?;
        self.client.parse_list_breeds(response)
    }

    #[instrument(level = "debug", skip_all)]
    pub async fn get_breed(&self, breed: impl Into<BreedId>) -> ApiResult<Option<Breed>> {
        let request = self.client.build_get_breed(breed)?;
        let response = self.send(request).await?;
        self.client.parse_get_breed(response)
    }

    async fn send(&self, request: HttpRequest) -> ApiResult<HttpResponse> {
        let request_id = Uuid::new_v4();
        let method = request.method.as_str();
        let url = request.url.clone();
        debug!(%request_id, method, url = %url, "sending request");

        let start = Instant::now();
        let response = self.transport.execute(request).await?;
        let elapsed_ms = start.elapsed().as_millis();

        if response.is_success() {
            debug!(%request_id, status = response.status, elapsed_ms, "request succeeded");
        } else {
            warn!(
                %request_id,
                method,
                url = %url,
                status = response.status,
                elapsed_ms,
                "API returned an error status"
            );
        }
        Ok(response)
    }
}
