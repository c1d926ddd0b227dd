use crate::auth::{Seller, SellerAuth};
use crate::metrics;
use axum::{
    extract::{
        multipart::MultipartError, rejection::QueryRejection, DefaultBodyLimit, Multipart, Path,
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path as StdPath;
use std::str::FromStr;
use std::sync::Arc;
use storefront_core::{
    ImageKind, NewProduct, ProductQuery, ProductUpdate, QuerySpec, RawQuery, StoreError,
};
use storefront_storage::{ImageHost, ImageUpload, ProductStore, SellerListRequest};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info};

const IMAGE_FOLDER: &str = "products";
const DEFAULT_PAR_PAGE: usize = 10;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub images: Arc<dyn ImageHost>,
    pub auth: Arc<SellerAuth>,
}

/// Domain error rendered as `{"error": ...}` with a matching status code.
#[derive(Debug)]
pub struct ApiError(pub StoreError);

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::Forbidden(_) => StatusCode::FORBIDDEN,
            StoreError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            StoreError::Invalid(_) => StatusCode::BAD_REQUEST,
            StoreError::Internal(msg) => {
                error!("internal error: {msg}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

pub fn router(state: AppState, media_dir: &StdPath, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .route("/api/product-add", post(add_product))
        .route("/api/products-get", get(products_get))
        .route("/api/product-get/:product_id", get(product_get))
        .route("/api/product-update", post(product_update))
        .route("/api/product-delete/:product_id", delete(product_delete))
        .route("/api/product-image-update", post(product_image_update))
        .route("/api/query-products", get(query_products))
        .nest_service("/media", ServeDir::new(media_dir))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn metrics_text() -> impl IntoResponse {
    (StatusCode::OK, metrics::render())
}

#[derive(Default)]
struct Form {
    fields: HashMap<String, String>,
    files: Vec<(String, ImageUpload)>,
}

fn bad_form(e: MultipartError) -> ApiError {
    ApiError(StoreError::Invalid(format!("error parsing the form data: {e}")))
}

async fn read_form(mut multipart: Multipart) -> ApiResult<Form> {
    let mut form = Form::default();
    while let Some(field) = multipart.next_field().await.map_err(bad_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(bad_form)?;
                form.files.push((
                    name,
                    ImageUpload {
                        file_name,
                        content_type,
                        bytes,
                    },
                ));
            }
            None => {
                let text = field.text().await.map_err(bad_form)?;
                form.fields.insert(name, text);
            }
        }
    }
    Ok(form)
}

impl Form {
    fn text(&self, key: &str) -> String {
        self.fields.get(key).cloned().unwrap_or_default()
    }

    fn required(&self, key: &str) -> ApiResult<String> {
        match self.fields.get(key) {
            Some(v) if !v.trim().is_empty() => Ok(v.clone()),
            _ => Err(StoreError::Invalid(format!("{key} is required")).into()),
        }
    }

    fn number<T: FromStr>(&self, key: &str) -> ApiResult<Option<T>> {
        parse_opt(key, self.fields.get(key).map(String::as_str))
    }

    fn take_files(&mut self, key: &str) -> Vec<ImageUpload> {
        let (wanted, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.files)
            .into_iter()
            .partition(|(name, _)| name == key);
        self.files = rest;
        wanted.into_iter().map(|(_, f)| f).collect()
    }
}

fn parse_opt<T: FromStr>(key: &str, raw: Option<&str>) -> ApiResult<Option<T>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| StoreError::Invalid(format!("{key}: not a number: {s:?}")).into()),
    }
}

async fn upload_image(app: &AppState, image: ImageUpload) -> ApiResult<String> {
    match app.images.upload(IMAGE_FOLDER, image).await {
        Ok(url) => {
            metrics::IMAGE_UPLOADS_TOTAL.with_label_values(&["ok"]).inc();
            Ok(url)
        }
        Err(e) => {
            metrics::IMAGE_UPLOADS_TOTAL.with_label_values(&["error"]).inc();
            Err(e.into())
        }
    }
}

async fn add_product(
    State(app): State<AppState>,
    Seller(seller_id): Seller,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let _timer = metrics::OP_DURATION
        .with_label_values(&["add_product"])
        .start_timer();
    let mut form = read_form(multipart).await?;
    let req = NewProduct {
        name: form.required("name")?,
        category: form.required("category")?,
        description: form.text("description"),
        stock: form.number("stock")?.unwrap_or(0),
        price: form
            .number("price")?
            .ok_or_else(|| StoreError::Invalid("price is required".into()))?,
        discount: form.number("discount")?.unwrap_or(0),
        shop_name: form.text("shopName"),
        brand: form.text("brand"),
        city: form.text("city"),
        state: form.text("state"),
        country: form.text("country"),
    };
    let images = form.take_files("images");
    if images.is_empty() {
        return Err(StoreError::Invalid("at least one image is required".into()).into());
    }
    // reject the whole form before anything is uploaded
    req.validate()?;
    for image in &images {
        ImageKind::from_content_type(&image.content_type)?;
        if image.bytes.is_empty() {
            return Err(StoreError::Invalid(format!("empty file: {}", image.file_name)).into());
        }
    }
    let mut urls = Vec::with_capacity(images.len());
    for image in images {
        urls.push(upload_image(&app, image).await?);
    }
    let product = app.store.create(&seller_id, req, urls).await?;
    metrics::OPS_TOTAL.with_label_values(&["add_product"]).inc();
    info!(id = %product.id, "product added");
    Ok((
        StatusCode::CREATED,
        Json(json!({"message": "Product added successfully"})),
    ))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SellerListQuery {
    page: Option<String>,
    par_page: Option<String>,
    search_value: Option<String>,
}

async fn products_get(
    State(app): State<AppState>,
    Seller(seller_id): Seller,
    Query(q): Query<SellerListQuery>,
) -> ApiResult<impl IntoResponse> {
    let _timer = metrics::OP_DURATION
        .with_label_values(&["products_get"])
        .start_timer();
    let req = SellerListRequest {
        page: parse_opt("page", q.page.as_deref())?.unwrap_or(1),
        par_page: parse_opt("parPage", q.par_page.as_deref())?.unwrap_or(DEFAULT_PAR_PAGE),
        search_value: q.search_value.filter(|s| !s.trim().is_empty()),
    };
    let page = app.store.list_for_seller(&seller_id, req).await?;
    metrics::OPS_TOTAL.with_label_values(&["products_get"]).inc();
    Ok(Json(page))
}

async fn product_get(
    State(app): State<AppState>,
    Seller(_seller_id): Seller,
    Path(product_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let product = app.store.get(&product_id).await?;
    metrics::OPS_TOTAL.with_label_values(&["product_get"]).inc();
    Ok(Json(json!({"product": product})))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateBody {
    product_id: String,
    #[serde(flatten)]
    update: ProductUpdate,
}

async fn product_update(
    State(app): State<AppState>,
    Seller(seller_id): Seller,
    Json(body): Json<UpdateBody>,
) -> ApiResult<impl IntoResponse> {
    let product = app
        .store
        .update(&seller_id, &body.product_id, body.update)
        .await?;
    metrics::OPS_TOTAL.with_label_values(&["product_update"]).inc();
    Ok(Json(
        json!({"product": product, "message": "product update success"}),
    ))
}

async fn product_delete(
    State(app): State<AppState>,
    Seller(seller_id): Seller,
    Path(product_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    app.store.delete(&seller_id, &product_id).await?;
    metrics::OPS_TOTAL.with_label_values(&["product_delete"]).inc();
    Ok(Json(
        json!({"message": "Product deleted successfully", "productId": product_id}),
    ))
}

async fn product_image_update(
    State(app): State<AppState>,
    Seller(seller_id): Seller,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let mut form = read_form(multipart).await?;
    let product_id = form.required("productId")?;
    let old_image = form.required("oldImage")?;
    let new_image = form
        .take_files("newImage")
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::Invalid("newImage is required".into()))?;

    // check before uploading so a rejected request leaves no stray file
    let current = app.store.get(&product_id).await?;
    if current.seller_id != seller_id {
        return Err(StoreError::Forbidden(format!(
            "product {product_id} belongs to another seller"
        ))
        .into());
    }
    if !current.images.contains(&old_image) {
        return Err(StoreError::NotFound(format!("image {old_image}")).into());
    }
    let url = upload_image(&app, new_image).await?;
    let product = app
        .store
        .replace_image(&seller_id, &product_id, &old_image, url)
        .await?;
    metrics::OPS_TOTAL
        .with_label_values(&["product_image_update"])
        .inc();
    Ok(Json(
        json!({"product": product, "message": "product image update success"}),
    ))
}

async fn query_products(
    State(app): State<AppState>,
    raw: Result<Query<RawQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let _timer = metrics::OP_DURATION
        .with_label_values(&["query_products"])
        .start_timer();
    let Query(raw) = raw.map_err(|e| StoreError::Invalid(e.body_text()))?;
    let spec = QuerySpec::try_from(raw)?;
    let candidates = app.store.all().await?;
    let page = ProductQuery::run(candidates, &spec);
    metrics::QUERY_RESULT_SIZE.observe(page.total as f64);
    metrics::OPS_TOTAL.with_label_values(&["query_products"]).inc();
    Ok(Json(json!({
        "totalProduct": page.total,
        "products": page.products,
        "parPage": spec.par_page,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SELLER_HEADER;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use std::path::PathBuf;
    use storefront_core::Product;
    use storefront_storage::{InMemoryStore, LocalImageHost};
    use tower::ServiceExt;

    const BOUNDARY: &str = "storefront-test-boundary";

    struct Harness {
        app: Router,
        media: PathBuf,
    }

    impl Drop for Harness {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.media).ok();
        }
    }

    fn harness(store: InMemoryStore) -> Harness {
        let media = std::env::temp_dir().join(format!("storefront-http-{}", ulid::Ulid::new()));
        let state = AppState {
            store: Arc::new(store),
            images: Arc::new(LocalImageHost::new(&media, "/media")),
            auth: Arc::new(SellerAuth::default()),
        };
        Harness {
            app: router(state, &media, 1024 * 1024),
            media,
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn form_body(fields: &[(&str, &str)], files: &[(&str, &str, &str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        for (name, file_name, content_type, data) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_post(uri: &str, seller: &str, body: Vec<u8>) -> Request<Body> {
        Request::post(uri)
            .header(SELLER_HEADER, seller)
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get_as(uri: &str, seller: &str) -> Request<Body> {
        Request::get(uri)
            .header(SELLER_HEADER, seller)
            .body(Body::empty())
            .unwrap()
    }

    const SHIRT_FIELDS: [(&str, &str); 8] = [
        ("name", " Red Shirt "),
        ("category", "Clothing"),
        ("description", "cotton"),
        ("stock", "4"),
        ("price", "20"),
        ("discount", "5"),
        ("brand", "Acme"),
        ("city", "NY"),
    ];

    async fn add_shirt(app: &Router, seller: &str) -> Value {
        let body = form_body(&SHIRT_FIELDS, &[("images", "a.png", "image/png", &b"png-bytes"[..])]);
        let (status, resp) = send(app, multipart_post("/api/product-add", seller, body)).await;
        assert_eq!(status, StatusCode::CREATED, "{resp}");
        assert_eq!(resp["message"], "Product added successfully");
        let (_, listing) = send(app, get_as("/api/products-get?page=1&parPage=10", seller)).await;
        listing["products"][0].clone()
    }

    fn seeded(seller: &str, name: &str, category: &str, rating: f64, price: f64) -> Product {
        let mut p = Product::create(
            seller,
            NewProduct {
                name: name.into(),
                category: category.into(),
                price,
                city: "NY".into(),
                ..Default::default()
            },
            vec![],
        )
        .unwrap();
        p.rating = rating;
        p
    }

    #[tokio::test]
    async fn add_product_stores_images_and_lists_it() {
        let h = harness(InMemoryStore::new());
        let product = add_shirt(&h.app, "s1").await;
        assert_eq!(product["name"], "Red Shirt");
        assert_eq!(product["slug"], "Red-Shirt");
        assert_eq!(product["price"], 20.0);
        let url = product["images"][0].as_str().unwrap().to_string();
        assert!(url.starts_with("/media/products/"));

        let resp = h
            .app
            .clone()
            .oneshot(Request::get(url.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let id = product["id"].as_str().unwrap();
        let (status, body) = send(&h.app, get_as(&format!("/api/product-get/{id}"), "s1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["product"]["id"], id);
    }

    #[tokio::test]
    async fn add_product_rejects_unsupported_image() {
        let h = harness(InMemoryStore::new());
        let body = form_body(
            &SHIRT_FIELDS,
            &[
                ("images", "a.png", "image/png", &b"ok"[..]),
                ("images", "b.webp", "image/webp", &b"nope"[..]),
            ],
        );
        let (status, resp) = send(&h.app, multipart_post("/api/product-add", "s1", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"], "invalid request: unsupported file type: webp");
        assert!(!h.media.exists());
    }

    #[tokio::test]
    async fn add_product_checks_fields_before_uploading() {
        let h = harness(InMemoryStore::new());
        let mut fields = SHIRT_FIELDS;
        fields[4] = ("price", "-5");
        let body = form_body(&fields, &[("images", "a.png", "image/png", &b"png-bytes"[..])]);
        let (status, resp) = send(&h.app, multipart_post("/api/product-add", "s1", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"], "invalid request: invalid price: -5");
        assert!(!h.media.exists());

        let body = form_body(
            &SHIRT_FIELDS,
            &[
                ("images", "a.png", "image/png", &b"png-bytes"[..]),
                ("images", "b.png", "image/png", &b""[..]),
            ],
        );
        let (status, _) = send(&h.app, multipart_post("/api/product-add", "s1", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!h.media.exists());
    }

    #[tokio::test]
    async fn seller_routes_need_a_seller() {
        let h = harness(InMemoryStore::new());
        let req = Request::get("/api/products-get").body(Body::empty()).unwrap();
        let (status, body) = send(&h.app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].as_str().unwrap().contains("missing seller id"));
    }

    #[tokio::test]
    async fn update_and_delete_respect_ownership() {
        let h = harness(InMemoryStore::new());
        let product = add_shirt(&h.app, "s1").await;
        let id = product["id"].as_str().unwrap().to_string();

        let update = json!({"productId": &id, "name": "Blue Shirt", "price": 35, "city": "LA"});
        let req = |seller: &str| {
            Request::post("/api/product-update")
                .header(SELLER_HEADER, seller)
                .header("content-type", "application/json")
                .body(Body::from(update.to_string()))
                .unwrap()
        };
        let (status, _) = send(&h.app, req("s2")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = send(&h.app, req("s1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "product update success");
        assert_eq!(body["product"]["slug"], "Blue-Shirt");
        assert_eq!(body["product"]["location"]["city"], "LA");

        let del = |seller: &str| {
            Request::delete(format!("/api/product-delete/{id}"))
                .header(SELLER_HEADER, seller)
                .body(Body::empty())
                .unwrap()
        };
        let (status, _) = send(&h.app, del("s2")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, body) = send(&h.app, del("s1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["productId"], id.as_str());
        let (status, _) = send(&h.app, del("s1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn image_update_swaps_one_url() {
        let h = harness(InMemoryStore::new());
        let product = add_shirt(&h.app, "s1").await;
        let id = product["id"].as_str().unwrap();
        let old = product["images"][0].as_str().unwrap();

        let body = form_body(
            &[("productId", id), ("oldImage", "/media/products/unknown.png")],
            &[("newImage", "n.gif", "image/gif", &b"gif-bytes"[..])],
        );
        let (status, _) = send(&h.app, multipart_post("/api/product-image-update", "s1", body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let body = form_body(
            &[("productId", id), ("oldImage", old)],
            &[("newImage", "n.gif", "image/gif", &b"gif-bytes"[..])],
        );
        let (status, resp) =
            send(&h.app, multipart_post("/api/product-image-update", "s1", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(resp["message"], "product image update success");
        let images = resp["product"]["images"].as_array().unwrap();
        assert_eq!(images.len(), 1);
        assert!(images[0].as_str().unwrap().ends_with(".gif"));
    }

    #[tokio::test]
    async fn seller_listing_searches_and_pages() {
        let store = InMemoryStore::with_products([
            seeded("s1", "Red Shirt", "Clothing", 4.2, 20.0),
            seeded("s1", "Blue Shirt", "Clothing", 3.9, 35.0),
            seeded("s1", "Hat", "Accessories", 4.5, 15.0),
            seeded("s2", "Green Shirt", "Clothing", 4.0, 10.0),
        ]);
        let h = harness(store);
        let (status, body) = send(
            &h.app,
            get_as("/api/products-get?page=1&parPage=1&searchValue=shirt", "s1"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalProduct"], 2);
        assert_eq!(body["products"].as_array().unwrap().len(), 1);

        let (status, _) = send(&h.app, get_as("/api/products-get?page=abc", "s1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn query_products_filters_sorts_and_pages() {
        let store = InMemoryStore::with_products([
            seeded("s1", "Red Shirt", "Clothing", 4.2, 20.0),
            seeded("s1", "Blue Shirt", "Clothing", 3.9, 35.0),
            seeded("s2", "Hat", "Accessories", 4.5, 15.0),
            seeded("s2", "Green Shirt", "Clothing", 4.0, 10.0),
        ]);
        let h = harness(store);
        let req = Request::get(
            "/api/query-products?category=Clothing&sortPrice=high-to-low&pageNumber=1&parPage=2&lowPrice=&rating=",
        )
        .body(Body::empty())
        .unwrap();
        let (status, body) = send(&h.app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalProduct"], 3);
        assert_eq!(body["parPage"], 2);
        let names: Vec<_> = body["products"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Blue Shirt", "Red Shirt"]);

        let req = Request::get("/api/query-products?rating=4&searchValue=SHIRT")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&h.app, req).await;
        assert_eq!(body["totalProduct"], 2);
    }

    #[tokio::test]
    async fn query_products_rejects_malformed_numbers() {
        let h = harness(InMemoryStore::new());
        let req = Request::get("/api/query-products?pageNumber=abc&parPage=10")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&h.app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("pageNumber"));

        let req = Request::get("/api/query-products?pageNumber=1&pageNumber=2")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&h.app, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("invalid request: "));
    }

    #[tokio::test]
    async fn health_and_metrics() {
        let h = harness(InMemoryStore::new());
        let resp = h
            .app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = Request::get("/api/query-products").body(Body::empty()).unwrap();
        send(&h.app, req).await;
        let resp = h
            .app
            .clone()
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("storefront_ops_total"));
    }
}
