use axum::response::Html;

use crate::openapi::API_TITLE;

pub const OPENAPI_URL: &str = "/api/openapi.json";

const SWAGGER_TEMPLATE: &str = include_str!("../static/docs.html");
const REDOC_TEMPLATE: &str = include_str!("../static/redoc.html");

fn render(template: &str) -> Html<String> {
    Html(
        template
            .replace("{{TITLE}}", API_TITLE)
            .replace("{{OPENAPI_URL}}", OPENAPI_URL),
    )
}

/// Swagger UI for the API.
#[utoipa::path(
    get,
    path = "/api/docs",
    responses(
        (status = 200, description = "Swagger UI page", body = String, content_type = "text/html")
    ),
    tag = "health"
)]
pub async fn swagger_ui() -> Html<String> {
    render(SWAGGER_TEMPLATE)
}

/// ReDoc view of the API.
#[utoipa::path(
    get,
    path = "/api/redoc",
    responses(
        (status = 200, description = "ReDoc page", body = String, content_type = "text/html")
    ),
    tag = "health"
)]
pub async fn redoc() -> Html<String> {
    render(REDOC_TEMPLATE)
}
