use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Breed, Image, UploadReceipt, API_KEY_HEADER};
use tower::ServiceExt;

const KEY: &str = "test-key";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(API_KEY_HEADER, KEY)
        .body(String::new())
        .unwrap()
}

fn delete(uri: &str) -> Request<String> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(API_KEY_HEADER, KEY)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(API_KEY_HEADER, KEY)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn multipart_request(parts: &[(&str, Option<&str>, &str)]) -> Request<String> {
    let boundary = "dogboundary";
    let mut body = String::new();
    for (name, file_name, value) in parts {
        body.push_str(&format!("--{boundary}\r\n"));
        match file_name {
            Some(file_name) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            )),
        }
        body.push_str(value);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/v1/images/upload")
        .header(API_KEY_HEADER, KEY)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(body)
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_api_key_returns_401() {
    let resp = app(KEY)
        .oneshot(Request::builder().uri("/v1/breeds").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_bytes(resp).await;
    assert!(String::from_utf8_lossy(&body).starts_with("AUTHENTICATION_ERROR"));
}

#[tokio::test]
async fn wrong_api_key_returns_401() {
    let resp = app("other-key").oneshot(get("/v1/breeds")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- search ---

#[tokio::test]
async fn search_defaults_to_one_tagged_image() {
    let resp = app(KEY)
        .oneshot(get("/v1/images/search?has_breeds=true&page=0&limit=1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let images: Vec<Image> = body_json(resp).await;
    assert_eq!(images.len(), 1);
    assert!(!images[0].breeds.is_empty());
}

#[tokio::test]
async fn search_without_breed_filter_includes_untagged() {
    let resp = app(KEY)
        .oneshot(get("/v1/images/search?page=0&limit=10"))
        .await
        .unwrap();

    let images: Vec<Image> = body_json(resp).await;
    assert_eq!(images.len(), 5);
    assert!(images.iter().any(|i| i.breeds.is_empty()));
}

#[tokio::test]
async fn search_orders_descending() {
    let resp = app(KEY)
        .oneshot(get("/v1/images/search?order=DESC&page=0&limit=10"))
        .await
        .unwrap();

    let images: Vec<Image> = body_json(resp).await;
    let ids: Vec<&str> = images.iter().map(|i| i.id.as_str()).collect();
    let mut sorted = ids.clone();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn search_rejects_unknown_size() {
    let resp = app(KEY)
        .oneshot(get("/v1/images/search?size=huge&page=0&limit=1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- images ---

#[tokio::test]
async fn get_image_not_found() {
    let resp = app(KEY).oneshot(get("/v1/images/nope")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn image_breeds_for_tagged_image() {
    let resp = app(KEY)
        .oneshot(get("/v1/images/MUGiNcu_Z/breeds"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let breeds: Vec<Breed> = body_json(resp).await;
    assert_eq!(breeds.len(), 1);
    assert_eq!(breeds[0].id, 6);
}

#[tokio::test]
async fn upload_without_file_returns_400() {
    let resp = app(KEY)
        .oneshot(multipart_request(&[("sub_id", None, "mine")]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn upload_with_unknown_breed_returns_400() {
    let resp = app(KEY)
        .oneshot(multipart_request(&[
            ("file", Some("dog.jpg"), "not really a jpeg"),
            ("breed_ids", None, "1,999"),
        ]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- breeds ---

#[tokio::test]
async fn list_breeds_paginates() {
    let resp = app(KEY)
        .oneshot(get("/v1/breeds?page=1&limit=2"))
        .await
        .unwrap();

    let breeds: Vec<Breed> = body_json(resp).await;
    let ids: Vec<u32> = breeds.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![3, 6]);
}

#[tokio::test]
async fn get_breed_not_found() {
    let resp = app(KEY).oneshot(get("/v1/breeds/999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(&body_bytes(resp).await[..], b"NOT_FOUND");
}

#[tokio::test]
async fn get_breed_with_non_numeric_id_returns_400() {
    let resp = app(KEY).oneshot(get("/v1/breeds/akita")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn tag_unknown_breed_returns_400() {
    let resp = app(KEY)
        .oneshot(json_request("POST", "/v1/image/H1dGlxqNQ/breeds", r#"{"breed_id":999}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn untag_missing_tag_returns_404() {
    let resp = app(KEY)
        .oneshot(delete("/v1/image/H1dGlxqNQ/breeds/1"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full upload / tag lifecycle ---

#[tokio::test]
async fn upload_tag_delete_lifecycle() {
    use tower::Service;

    let mut app = app(KEY).into_service();

    // upload
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(multipart_request(&[
            ("file", Some("rex.png"), "fake png bytes"),
            ("sub_id", None, "user-1"),
            ("breed_ids", None, "1"),
        ]))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let receipt: UploadReceipt = body_json(resp).await;
    assert_eq!(receipt.sub_id.as_deref(), Some("user-1"));
    assert_eq!(receipt.original_filename, "rex.png");
    assert!(receipt.url.ends_with(".png"));
    let id = receipt.id;

    // uploaded listing contains only the upload
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/v1/images?order=ASC&page=0&limit=10"))
        .await
        .unwrap();
    let uploaded: Vec<Image> = body_json(resp).await;
    assert_eq!(uploaded.len(), 1);
    assert_eq!(uploaded[0].id, id);
    assert_eq!(uploaded[0].mime_type, "image/png");
    assert_eq!(uploaded[0].breeds[0].id, 1);

    // tag a second breed
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/v1/image/{id}/breeds"),
            r#"{"breed_id":2}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/v1/images/{id}/breeds")))
        .await
        .unwrap();
    let breeds: Vec<Breed> = body_json(resp).await;
    assert_eq!(breeds.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2]);

    // untag it again
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(delete(&format!("/v1/image/{id}/breeds/2")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // delete the image
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(delete(&format!("/v1/images/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // gone
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/v1/images/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
