//! Stateless HTTP request builder and response parser for the dog catalog API.
//!
//! # Design
//! `DogClient` holds only the base URL and API key and carries no mutable
//! state between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. A `Transport` (see `DogApi`) executes the round trip in
//! between, keeping this layer deterministic and free of I/O.
//!
//! Query strings follow one rule: optional filters are only sent when they
//! differ from the service default, while `page` and `limit` are always sent.

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::http::{FormPart, HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartForm};
use crate::types::{
    Breed, BreedId, BreedPage, Image, ImageId, ImageSearch, ImageTag, ImageUpload, UploadedImages,
};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Synchronous, stateless client for the dog catalog API.
///
/// Builds `HttpRequest` values and parses `HttpResponse` values without
/// touching the network.
#[derive(Clone)]
pub struct DogClient {
    base_url: Url,
    api_key: String,
}

impl std::fmt::Debug for DogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DogClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl DogClient {
    pub fn new(config: &ClientConfig) -> ApiResult<Self> {
        config.validate()?;
        let mut base_url =
            Url::parse(&config.base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(format!(
                "{} cannot be used as a base URL",
                config.base_url
            )));
        }
        // Endpoint paths are relative to the last directory of the base.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        base_url.set_query(None);
        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    // -------------------------------------------------------------------------
    // Images
    // -------------------------------------------------------------------------

    pub fn build_search_images(&self, query: &ImageSearch) -> ApiResult<HttpRequest> {
        let mut params = Vec::new();
        if let Some(size) = query.size {
            params.push(("size", size.as_str().to_string()));
        }
        if query.breeds_only {
            params.push(("has_breeds", "true".to_string()));
        }
        if let Some(order) = query.order.order_param() {
            params.push(("order", order.to_string()));
        }
        params.push(("page", query.page.to_string()));
        params.push(("limit", query.limit.to_string()));

        let url = with_query(self.endpoint(&["images", "search"])?, &params);
        Ok(self.request(HttpMethod::Get, url, None))
    }

    pub fn build_get_image(&self, image: impl Into<ImageId>) -> ApiResult<HttpRequest> {
        let id = image.into();
        let url = self.endpoint(&["images", &id.0])?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    pub fn build_uploaded_images(&self, query: &UploadedImages) -> ApiResult<HttpRequest> {
        let mut params = Vec::new();
        if let Some(order) = query.order.order_param() {
            params.push(("order", order.to_string()));
        }
        params.push(("page", query.page.to_string()));
        params.push(("limit", query.limit.to_string()));

        let url = with_query(self.endpoint(&["images"])?, &params);
        Ok(self.request(HttpMethod::Get, url, None))
    }

    /// Build a multipart upload. `sub_id` and `breed_ids` are left out when empty.
    pub fn build_upload_image(&self, upload: ImageUpload) -> ApiResult<HttpRequest> {
        let mut parts = vec![FormPart::File {
            name: "file".to_string(),
            file_name: upload.file_name,
            bytes: upload.file,
        }];
        if let Some(sub_id) = upload.sub_id.filter(|s| !s.is_empty()) {
            parts.push(FormPart::Text {
                name: "sub_id".to_string(),
                value: sub_id,
            });
        }
        if !upload.breed_ids.is_empty() {
            let joined = upload
                .breed_ids
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",");
            parts.push(FormPart::Text {
                name: "breed_ids".to_string(),
                value: joined,
            });
        }

        let url = self.endpoint(&["images", "upload"])?;
        Ok(self.request(
            HttpMethod::Post,
            url,
            Some(HttpBody::Multipart(MultipartForm { parts })),
        ))
    }

    pub fn build_delete_image(&self, image: impl Into<ImageId>) -> ApiResult<HttpRequest> {
        let id = image.into();
        let url = self.endpoint(&["images", &id.0])?;
        Ok(self.request(HttpMethod::Delete, url, None))
    }

    // -------------------------------------------------------------------------
    // Breed tags
    // -------------------------------------------------------------------------

    pub fn build_image_breeds(&self, image: impl Into<ImageId>) -> ApiResult<HttpRequest> {
        let id = image.into();
        let url = self.endpoint(&["images", &id.0, "breeds"])?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    pub fn build_add_breed(
        &self,
        image: impl Into<ImageId>,
        breed: impl Into<BreedId>,
    ) -> ApiResult<HttpRequest> {
        let id = image.into();
        let tag = ImageTag {
            breed_id: breed.into(),
        };
        let body =
            serde_json::to_string(&tag).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let url = self.endpoint(&["image", &id.0, "breeds"])?;
        Ok(self.request(HttpMethod::Post, url, Some(HttpBody::Json(body))))
    }

    pub fn build_remove_breed(
        &self,
        image: impl Into<ImageId>,
        breed: impl Into<BreedId>,
    ) -> ApiResult<HttpRequest> {
        let id = image.into();
        let breed_id = breed.into().to_string();
        let url = self.endpoint(&["image", &id.0, "breeds", &breed_id])?;
        Ok(self.request(HttpMethod::Delete, url, None))
    }

    // -------------------------------------------------------------------------
    // Breeds
    // -------------------------------------------------------------------------

    pub fn build_list_breeds(&self, query: &BreedPage) -> ApiResult<HttpRequest> {
        let params = [
            ("page", query.page.to_string()),
            ("limit", query.limit.to_string()),
        ];
        let url = with_query(self.endpoint(&["breeds"])?, &params);
        Ok(self.request(HttpMethod::Get, url, None))
    }

    pub fn build_get_breed(&self, breed: impl Into<BreedId>) -> ApiResult<HttpRequest> {
        let id = breed.into().to_string();
        let url = self.endpoint(&["breeds", &id])?;
        Ok(self.request(HttpMethod::Get, url, None))
    }

    // -------------------------------------------------------------------------
    // Response parsing
    // -------------------------------------------------------------------------

    pub fn parse_search_images(&self, response: HttpResponse) -> ApiResult<Vec<Image>> {
        parse_list(response)
    }

    /// `None` when the service answers with an empty body.
    pub fn parse_get_image(&self, response: HttpResponse) -> ApiResult<Option<Image>> {
        parse_optional(response)
    }

    pub fn parse_uploaded_images(&self, response: HttpResponse) -> ApiResult<Vec<Image>> {
        parse_list(response)
    }

    pub fn parse_upload_image(&self, response: HttpResponse) -> ApiResult<()> {
        check_status(response).map(drop)
    }

    pub fn parse_delete_image(&self, response: HttpResponse) -> ApiResult<()> {
        check_status(response).map(drop)
    }

    pub fn parse_image_breeds(&self, response: HttpResponse) -> ApiResult<Vec<Breed>> {
        parse_list(response)
    }

    pub fn parse_add_breed(&self, response: HttpResponse) -> ApiResult<()> {
        check_status(response).map(drop)
    }

    pub fn parse_remove_breed(&self, response: HttpResponse) -> ApiResult<()> {
        check_status(response).map(drop)
    }

    pub fn parse_list_breeds(&self, response: HttpResponse) -> ApiResult<Vec<Breed>> {
        parse_list(response)
    }

    /// `None` when the service answers with an empty body.
    pub fn parse_get_breed(&self, response: HttpResponse) -> ApiResult<Option<Breed>> {
        parse_optional(response)
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    /// Resolve `segments` against the base URL, percent-encoding each one.
    ///
    /// Empty, `.` and `..` segments are rejected: the URL parser would drop
    /// or collapse them and the request would reach a different endpoint.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ApiError::InvalidUrl(format!(
                "{bad:?} is not a valid path segment"
            )));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: HttpMethod, url: Url, body: Option<HttpBody>) -> HttpRequest {
        let mut headers = vec![(API_KEY_HEADER.to_string(), self.api_key.clone())];
        if matches!(body, Some(HttpBody::Json(_))) {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        }
    }
}

fn with_query(mut url: Url, params: &[(&str, String)]) -> Url {
    url.query_pairs_mut().extend_pairs(params);
    url
}

/// Map non-success status codes to `ApiError::HttpError`; hand back the body otherwise.
fn check_status(response: HttpResponse) -> ApiResult<String> {
    if response.is_success() {
        return Ok(response.body);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body,
    })
}

/// Empty bodies and JSON `null` become `None`.
fn parse_optional<T: DeserializeOwned>(response: HttpResponse) -> ApiResult<Option<T>> {
    let body = check_status(response)?;
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(&body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

fn parse_list<T: DeserializeOwned>(response: HttpResponse) -> ApiResult<Vec<T>> {
    parse_optional::<Vec<T>>(response).map(Option::unwrap_or_default)
}
