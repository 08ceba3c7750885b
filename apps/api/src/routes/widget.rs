use axum::response::Html;

const WIDGET_HTML: &str = include_str!("../../static/index.html");

/// GET /
/// The chat widget. The transcript lives in the browser tab, one per session.
pub async fn widget_handler() -> Html<&'static str> {
    Html(WIDGET_HTML)
}
