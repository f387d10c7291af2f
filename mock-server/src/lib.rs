//! In-memory imitation of the dog catalog service, served under `/v1`.
//!
//! Every route requires the configured `x-api-key`. The catalog starts with
//! a few seeded breeds and images; uploads and breed tags live until the
//! process exits. "Random" ordering is insertion order.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const DEFAULT_API_KEY: &str = "mock-api-key";

const MAX_LIMIT: u32 = 100;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Measurement {
    pub imperial: String,
    pub metric: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Breed {
    pub id: u32,
    pub name: String,
    pub weight: Measurement,
    pub height: Measurement,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bred_for: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed_group: Option<String>,
    pub life_span: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperament: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
}

/// An image as returned to clients, breeds expanded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Image {
    pub id: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub mime_type: String,
    pub breeds: Vec<Breed>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub id: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_id: Option<String>,
    pub original_filename: String,
    pub pending: u8,
    pub approved: u8,
}

#[derive(Deserialize)]
pub struct ImageTag {
    pub breed_id: u32,
}

#[derive(Clone, Debug)]
struct StoredImage {
    id: String,
    url: String,
    width: u32,
    height: u32,
    mime_type: String,
    breed_ids: Vec<u32>,
    uploaded: bool,
}

/// Breeds keyed by id plus images in insertion order.
#[derive(Debug, Default)]
pub struct Catalog {
    breeds: BTreeMap<u32, Breed>,
    images: Vec<StoredImage>,
}

impl Catalog {
    /// A catalog with four breeds and five public images, four of them tagged.
    pub fn seeded() -> Self {
        let mut catalog = Catalog::default();
        for breed in seed_breeds() {
            catalog.breeds.insert(breed.id, breed);
        }
        let images = [
            ("BJa4kxc4X", 1600, 1199, vec![1]),
            ("hMyT4CDXR", 606, 380, vec![2]),
            ("rkiByec47", 500, 280, vec![3]),
            ("MUGiNcu_Z", 1080, 1350, vec![6]),
            ("H1dGlxqNQ", 1200, 800, vec![]),
        ];
        for (id, width, height, breed_ids) in images {
            catalog.images.push(StoredImage {
                id: id.to_string(),
                url: format!("https://cdn2.thedogapi.com/images/{id}.jpg"),
                width,
                height,
                mime_type: "image/jpeg".to_string(),
                breed_ids,
                uploaded: false,
            });
        }
        catalog
    }

    fn image(&self, id: &str) -> Option<&StoredImage> {
        self.images.iter().find(|i| i.id == id)
    }

    fn image_mut(&mut self, id: &str) -> Option<&mut StoredImage> {
        self.images.iter_mut().find(|i| i.id == id)
    }

    fn breeds_of(&self, image: &StoredImage) -> Vec<Breed> {
        image
            .breed_ids
            .iter()
            .filter_map(|id| self.breeds.get(id).cloned())
            .collect()
    }

    fn render(&self, image: &StoredImage) -> Image {
        Image {
            id: image.id.clone(),
            url: image.url.clone(),
            width: image.width,
            height: image.height,
            mime_type: image.mime_type.clone(),
            breeds: self.breeds_of(image),
        }
    }
}

fn seed_breeds() -> Vec<Breed> {
    fn measure(imperial: &str, metric: &str) -> Measurement {
        Measurement {
            imperial: imperial.to_string(),
            metric: metric.to_string(),
        }
    }
    vec![
        Breed {
            id: 1,
            name: "Affenpinscher".to_string(),
            weight: measure("6 - 13", "3 - 6"),
            height: measure("9 - 11.5", "23 - 29"),
            bred_for: Some("Small rodent hunting, lapdog".to_string()),
            breed_group: Some("Toy".to_string()),
            life_span: "10 - 12 years".to_string(),
            temperament: Some(
                "Stubborn, Curious, Playful, Adventurous, Active, Fun-loving".to_string(),
            ),
            origin: Some("Germany, France".to_string()),
        },
        Breed {
            id: 2,
            name: "Afghan Hound".to_string(),
            weight: measure("50 - 60", "23 - 27"),
            height: measure("25 - 27", "64 - 69"),
            bred_for: Some("Coursing and hunting".to_string()),
            breed_group: Some("Hound".to_string()),
            life_span: "10 - 13 years".to_string(),
            temperament: Some("Aloof, Clownish, Dignified, Independent, Happy".to_string()),
            origin: Some("Afghanistan, Iran, Pakistan".to_string()),
        },
        Breed {
            id: 3,
            name: "African Hunting Dog".to_string(),
            weight: measure("44 - 66", "20 - 30"),
            height: measure("30", "76"),
            bred_for: Some("A wild pack animal".to_string()),
            breed_group: None,
            life_span: "11 years".to_string(),
            temperament: Some("Wild, Hardworking, Dutiful".to_string()),
            origin: None,
        },
        Breed {
            id: 6,
            name: "Akbash Dog".to_string(),
            weight: measure("90 - 120", "41 - 54"),
            height: measure("28 - 34", "71 - 86"),
            bred_for: Some("Sheep guarding".to_string()),
            breed_group: Some("Working".to_string()),
            life_span: "10 - 12 years".to_string(),
            temperament: Some("Loyal, Independent, Intelligent, Brave".to_string()),
            origin: None,
        },
    ]
}

#[derive(Clone)]
struct AppState {
    api_key: Arc<str>,
    catalog: Arc<RwLock<Catalog>>,
}

type Failure = (StatusCode, String);

fn not_found() -> Failure {
    (StatusCode::NOT_FOUND, "NOT_FOUND".to_string())
}

fn bad_request(message: impl Into<String>) -> Failure {
    (StatusCode::BAD_REQUEST, message.into())
}

pub fn app(api_key: impl Into<String>) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key.into()),
        catalog: Arc::new(RwLock::new(Catalog::seeded())),
    };
    let v1 = Router::new()
        .route("/images/search", get(search_images))
        .route("/images/upload", post(upload_image))
        .route("/images", get(uploaded_images))
        .route("/images/{id}", get(get_image).delete(delete_image))
        .route("/images/{id}/breeds", get(image_breeds))
        .route("/image/{id}/breeds", post(add_breed))
        .route("/image/{id}/breeds/{breed_id}", delete(remove_breed))
        .route("/breeds", get(list_breeds))
        .route("/breeds/{id}", get(get_breed))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state);
    Router::new().nest("/v1", v1)
}

pub async fn run(listener: TcpListener, api_key: impl Into<String>) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    if provided != Some(&*state.api_key) {
        return (
            StatusCode::UNAUTHORIZED,
            "AUTHENTICATION_ERROR - you need to send your API Key in the request header",
        )
            .into_response();
    }
    next.run(request).await
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub size: Option<String>,
    pub has_breeds: Option<String>,
    pub order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub order: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    Asc,
    Desc,
    Random,
}

fn parse_order(raw: Option<&str>) -> Result<Order, Failure> {
    match raw.map(str::to_ascii_uppercase).as_deref() {
        None | Some("RANDOM" | "RAND") => Ok(Order::Random),
        Some("ASC") => Ok(Order::Asc),
        Some("DESC") => Ok(Order::Desc),
        Some(other) => Err(bad_request(format!("invalid order: {other}"))),
    }
}

fn parse_flag(raw: Option<&str>) -> bool {
    matches!(raw.map(str::to_ascii_lowercase).as_deref(), Some("true" | "1"))
}

fn paginate<T>(items: Vec<T>, page: Option<u32>, limit: Option<u32>, default_limit: u32) -> Vec<T> {
    let limit = limit.unwrap_or(default_limit).clamp(1, MAX_LIMIT) as usize;
    let page = page.unwrap_or(0) as usize;
    items.into_iter().skip(page * limit).take(limit).collect()
}

fn ordered(mut images: Vec<&StoredImage>, order: Order) -> Vec<&StoredImage> {
    match order {
        Order::Asc => images.sort_by(|a, b| a.id.cmp(&b.id)),
        Order::Desc => images.sort_by(|a, b| b.id.cmp(&a.id)),
        Order::Random => {}
    }
    images
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn search_images(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Image>>, Failure> {
    if let Some(size) = params.size.as_deref() {
        if !matches!(size, "thumb" | "small" | "med" | "full") {
            return Err(bad_request(format!("invalid size: {size}")));
        }
    }
    let order = parse_order(params.order.as_deref())?;
    let breeds_only = parse_flag(params.has_breeds.as_deref());

    let catalog = state.catalog.read().await;
    let matching = catalog
        .images
        .iter()
        .filter(|i| !breeds_only || !i.breed_ids.is_empty())
        .collect();
    let page = paginate(ordered(matching, order), params.page, params.limit, 1);
    Ok(Json(page.into_iter().map(|i| catalog.render(i)).collect()))
}

async fn uploaded_images(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Image>>, Failure> {
    let order = parse_order(params.order.as_deref())?;
    let catalog = state.catalog.read().await;
    let uploaded = catalog.images.iter().filter(|i| i.uploaded).collect();
    let page = paginate(ordered(uploaded, order), params.page, params.limit, 10);
    Ok(Json(page.into_iter().map(|i| catalog.render(i)).collect()))
}

async fn get_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Image>, Failure> {
    let catalog = state.catalog.read().await;
    let image = catalog.image(&id).ok_or_else(not_found)?;
    Ok(Json(catalog.render(image)))
}

async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadReceipt>), Failure> {
    let mut file: Option<(String, usize)> = None;
    let mut sub_id = None;
    let mut breed_ids = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(|e| bad_request(e.to_string()))?;
                file = Some((file_name, bytes.len()));
            }
            "sub_id" => {
                sub_id = Some(field.text().await.map_err(|e| bad_request(e.to_string()))?);
            }
            "breed_ids" => {
                let raw = field.text().await.map_err(|e| bad_request(e.to_string()))?;
                breed_ids = raw
                    .split(',')
                    .map(|s| s.trim().parse::<u32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| bad_request(format!("invalid breed_ids: {raw}")))?;
            }
            _ => {}
        }
    }

    let (file_name, size) = file.ok_or_else(|| bad_request("file is required"))?;
    if size == 0 {
        return Err(bad_request("file is empty"));
    }

    let mut catalog = state.catalog.write().await;
    if let Some(unknown) = breed_ids.iter().find(|id| !catalog.breeds.contains_key(*id)) {
        return Err(bad_request(format!("INVALID_BREED: {unknown}")));
    }

    let id = Uuid::new_v4().simple().to_string()[..9].to_string();
    let (extension, mime_type) = match file_name.rsplit('.').next() {
        Some("png") => ("png", "image/png"),
        Some("gif") => ("gif", "image/gif"),
        _ => ("jpg", "image/jpeg"),
    };
    let url = format!("https://cdn2.thedogapi.com/images/{id}.{extension}");
    debug!(%id, %file_name, size, "stored upload");

    catalog.images.push(StoredImage {
        id: id.clone(),
        url: url.clone(),
        width: 0,
        height: 0,
        mime_type: mime_type.to_string(),
        breed_ids,
        uploaded: true,
    });

    Ok((
        StatusCode::CREATED,
        Json(UploadReceipt {
            id,
            url,
            sub_id,
            original_filename: file_name,
            pending: 0,
            approved: 1,
        }),
    ))
}

async fn delete_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, Failure> {
    let mut catalog = state.catalog.write().await;
    let index = catalog
        .images
        .iter()
        .position(|i| i.id == id)
        .ok_or_else(not_found)?;
    catalog.images.remove(index);
    Ok(StatusCode::NO_CONTENT)
}

async fn image_breeds(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Breed>>, Failure> {
    let catalog = state.catalog.read().await;
    let image = catalog.image(&id).ok_or_else(not_found)?;
    Ok(Json(catalog.breeds_of(image)))
}

async fn add_breed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(tag): Json<ImageTag>,
) -> Result<Json<serde_json::Value>, Failure> {
    let mut catalog = state.catalog.write().await;
    if !catalog.breeds.contains_key(&tag.breed_id) {
        return Err(bad_request(format!("INVALID_BREED: {}", tag.breed_id)));
    }
    let image = catalog.image_mut(&id).ok_or_else(not_found)?;
    if !image.breed_ids.contains(&tag.breed_id) {
        image.breed_ids.push(tag.breed_id);
    }
    Ok(Json(json!({ "message": "SUCCESS" })))
}

async fn remove_breed(
    State(state): State<AppState>,
    Path((id, breed_id)): Path<(String, u32)>,
) -> Result<StatusCode, Failure> {
    let mut catalog = state.catalog.write().await;
    let image = catalog.image_mut(&id).ok_or_else(not_found)?;
    let index = image
        .breed_ids
        .iter()
        .position(|b| *b == breed_id)
        .ok_or_else(not_found)?;
    image.breed_ids.remove(index);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_breeds(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Json<Vec<Breed>> {
    let catalog = state.catalog.read().await;
    let breeds: Vec<Breed> = catalog.breeds.values().cloned().collect();
    Json(paginate(breeds, params.page, params.limit, 10))
}

async fn get_breed(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<Breed>, Failure> {
    let catalog = state.catalog.read().await;
    catalog.breeds.get(&id).cloned().map(Json).ok_or_else(not_found)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_catalog_tags_most_images() {
        let catalog = Catalog::seeded();
        let tagged = catalog.images.iter().filter(|i| !i.breed_ids.is_empty()).count();
        assert_eq!(tagged, 4);
        assert_eq!(catalog.breeds.len(), 4);
    }

    #[test]
    fn render_expands_breeds() {
        let catalog = Catalog::seeded();
        let image = catalog.render(catalog.image("MUGiNcu_Z").unwrap());
        assert_eq!(image.breeds.len(), 1);
        assert_eq!(image.breeds[0].name, "Akbash Dog");
    }

    #[test]
    fn breed_serializes_wire_names() {
        let breed = seed_breeds().remove(0);
        let json = serde_json::to_value(&breed).unwrap();
        assert_eq!(json["breed_group"], "Toy");
        assert_eq!(json["life_span"], "10 - 12 years");
        assert_eq!(json["weight"]["metric"], "3 - 6");
    }

    #[test]
    fn absent_optional_fields_are_omitted() {
        let breed = seed_breeds().remove(2);
        let json = serde_json::to_value(&breed).unwrap();
        assert!(json.get("breed_group").is_none());
        assert!(json.get("origin").is_none());
    }

    #[test]
    fn paginate_skips_whole_pages() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(paginate(items.clone(), Some(2), Some(10), 10), (20..25).collect::<Vec<_>>());
        assert_eq!(paginate(items.clone(), None, None, 1), vec![0]);
        assert!(paginate(items, Some(9), Some(10), 10).is_empty());
    }

    #[test]
    fn order_parsing() {
        assert_eq!(parse_order(None).unwrap(), Order::Random);
        assert_eq!(parse_order(Some("asc")).unwrap(), Order::Asc);
        assert_eq!(parse_order(Some("DESC")).unwrap(), Order::Desc);
        assert!(parse_order(Some("sideways")).is_err());
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some("True")));
        assert!(parse_flag(Some("1")));
        assert!(!parse_flag(Some("false")));
        assert!(!parse_flag(None));
    }
}
