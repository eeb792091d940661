use crate::middleware::session::BrowserSession;
use axum::{
    http::header::CONTENT_TYPE,
    response::{Html, IntoResponse, Redirect, Response},
};

const LOGIN_PAGE: &str = include_str!("../../templates/login.html");
const DASHBOARD_PAGE: &str = include_str!("../../templates/dashboard.html");
const DASHBOARD_SCRIPT: &str = include_str!("../../static/js/script.js");

/// GET /
pub async fn index(session: BrowserSession) -> Redirect {
    if session.data.is_authenticated() {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

/// GET /login
pub async fn login() -> Html<&'static str> {
    Html(LOGIN_PAGE)
}

/// GET /dashboard
pub async fn dashboard(session: BrowserSession) -> Response {
    if !session.data.is_authenticated() {
        return Redirect::to("/login").into_response();
    }
    Html(DASHBOARD_PAGE).into_response()
}

/// GET /static/js/script.js
pub async fn dashboard_script() -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "application/javascript; charset=utf-8")],
        DASHBOARD_SCRIPT,
    )
}
