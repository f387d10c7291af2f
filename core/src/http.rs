//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! `DogClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network; a `Transport` performs the actual I/O.
//!
//! Multipart bodies are described as a list of parts rather than encoded
//! bytes. Putting them on the wire (boundaries, part headers) is the
//! transport's job.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A single part of a `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    File {
        name: String,
        file_name: String,
        bytes: Vec<u8>,
    },
    Text {
        name: String,
        value: String,
    },
}

impl FormPart {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            FormPart::File { name, .. } | FormPart::Text { name, .. } => name,
        }
    }
}

/// A `multipart/form-data` body as an ordered list of parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub parts: Vec<FormPart>,
}

impl MultipartForm {
    /// Look up a part by field name.
    #[must_use]
    pub fn part(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.name() == name)
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpBody {
    /// Serialized JSON text; sent with `content-type: application/json`.
    Json(String),
    Multipart(MultipartForm),
}

/// An HTTP request described as plain data.
///
/// Built by `DogClient::build_*` methods. `url` is absolute and already
/// carries the percent-encoded path and query string.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    /// First header value with the given (case-insensitive) name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` for every status code, then passed to
/// `DogClient::parse_*` methods.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
