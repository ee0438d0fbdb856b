//! Chat UI page.

use axum::response::Html;

const CHAT_PAGE: &str = include_str!("../static/chat.html");

/// `GET /`: the single-page chat client.
pub async fn index() -> Html<&'static str> {
    Html(CHAT_PAGE)
}
