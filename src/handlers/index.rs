//! Index route.

use axum::response::Html;

pub const GREETING: &str = "<h1>Hey</h1>";

#[utoipa::path(
    get,
    path = "/",
    tag = "Index",
    responses(
        (status = 200, description = "Greeting page", content_type = "text/html")
    )
)]
pub async fn index() -> Html<&'static str> {
    Html(GREETING)
}
