use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use prodx_core::{AppContext, Error, Record};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default = "default_top_k")]
    top_k: usize,
}

fn default_top_k() -> usize {
    5
}

#[derive(Deserialize)]
struct ProductRequest {
    product_id: String,
}

#[derive(Serialize)]
struct ResultsResponse {
    results: Vec<Record>,
}

#[derive(Serialize)]
struct GeneratedResponse {
    generated: String,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(ctx: Arc<AppContext>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(ctx.clone()))
                .configure(routes)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Route table, shared between the server and route-level tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/test", web::get().to(test_endpoint))
        .route("/search-products", web::post().to(search_products))
        .route("/recommend", web::post().to(search_products))
        .route("/recommend-by-id", web::post().to(recommend_by_id))
        .route("/generate-description", web::post().to(generate_description))
        .route("/analytics", web::get().to(analytics));
}

/// Map a core error to its HTTP response: 404 for missing products, 400
/// for bad input, 500 with the raw message for everything else.
fn error_response(err: &Error) -> HttpResponse {
    match err {
        Error::NotFound(_) => HttpResponse::NotFound().json(serde_json::json!({
            "detail": "Product not found"
        })),
        Error::InvalidRequest(message) => HttpResponse::BadRequest().json(serde_json::json!({
            "detail": message
        })),
        other => {
            error!(error = %other, "request failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "detail": other.to_string()
            }))
        }
    }
}

async fn root() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the AI Product Recommendation API"
    })))
}

async fn test_endpoint() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "working",
        "message": "Backend is running correctly"
    })))
}

async fn search_products(
    ctx: web::Data<Arc<AppContext>>,
    req: web::Json<SearchRequest>,
) -> ActixResult<HttpResponse> {
    match ctx.retrieval().search(&req.query, req.top_k) {
        Ok(results) => Ok(HttpResponse::Ok().json(ResultsResponse { results })),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn recommend_by_id(
    ctx: web::Data<Arc<AppContext>>,
    req: web::Json<ProductRequest>,
) -> ActixResult<HttpResponse> {
    match ctx.retrieval().recommend_by_id(&req.product_id) {
        Ok(results) => Ok(HttpResponse::Ok().json(ResultsResponse { results })),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn generate_description(
    ctx: web::Data<Arc<AppContext>>,
    req: web::Json<ProductRequest>,
) -> ActixResult<HttpResponse> {
    let generation = ctx.generate_description(&req.product_id);
    match tokio::time::timeout(ctx.request_timeout(), generation).await {
        Ok(Ok(generated)) => Ok(HttpResponse::Ok().json(GeneratedResponse { generated })),
        Ok(Err(e)) => Ok(error_response(&e)),
        Err(_) => Ok(error_response(&Error::Generation(
            "description generation timed out".to_string(),
        ))),
    }
}

async fn analytics(ctx: web::Data<Arc<AppContext>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ctx.summary()))
}
