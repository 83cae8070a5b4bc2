use axum::response::Html;

/// Serve the single-page dashboard
///
/// GET /
pub async fn dashboard() -> Html<&'static str> {
    Html(include_str!("../../../assets/dashboard.html"))
}
