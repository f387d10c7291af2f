//! The I/O side of the client: executing an `HttpRequest`.
//!
//! # Design
//! `Transport` is dyn-compatible (boxed futures) so `DogApi` can be handed
//! any implementation, including a canned one in tests. Implementations
//! return an `HttpResponse` for every status code; interpreting the status
//! is left to `DogClient::parse_*`.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};

use crate::error::ApiResult;
use crate::http::{FormPart, HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartForm};

/// Boxed future returned by dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Executes one HTTP round trip.
pub trait Transport: Send + Sync {
    /// Send `request` and collect the response.
    ///
    /// # Errors
    ///
    /// Only failures to complete the round trip are errors; non-2xx
    /// statuses are returned as ordinary responses.
    fn execute(&self, request: HttpRequest) -> BoxFuture<'_, ApiResult<HttpResponse>>;
}

/// `reqwest`-backed implementation of [`Transport`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose requests fail once `timeout` elapses.
    pub fn with_timeout(timeout: Duration) -> ApiResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }

    /// Wrap an already configured `reqwest::Client`.
    pub fn from_client(http: Client) -> Self {
        Self { http }
    }
}

impl Transport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> BoxFuture<'_, ApiResult<HttpResponse>> {
        Box::pin(async move {
            let method = match request.method {
                HttpMethod::Get => Method::GET,
                HttpMethod::Post => Method::POST,
                HttpMethod::Delete => Method::DELETE,
            };

            let mut builder = self.http.request(method, &request.url);
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder = match request.body {
                Some(HttpBody::Json(body)) => builder.body(body),
                Some(HttpBody::Multipart(form)) => builder.multipart(to_form(form)),
                None => builder,
            };

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(k, v)| Some((k.to_string(), v.to_str().ok()?.to_string())))
                .collect();
            // An unreadable body is treated like an empty one.
            let body = response.text().await.unwrap_or_default();

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}

fn to_form(form: MultipartForm) -> Form {
    form.parts.into_iter().fold(Form::new(), |acc, part| match part {
        FormPart::File {
            name,
            file_name,
            bytes,
        } => acc.part(name, Part::bytes(bytes).file_name(file_name)),
        FormPart::Text { name, value } => acc.text(name, value),
    })
}
