use actix_web::http::header::ContentType;
use actix_web::HttpResponse;
use htmlescape::encode_minimal;

use crate::domain::{AuthSession, FieldErrors};

/// Render the login form for `session`, showing its field errors
pub fn render_login_form(session: &AuthSession, messages_html: &str) -> HttpResponse {
    let errors = session.errors();
    let base_errors = errors_html(errors.on(FieldErrors::BASE), "");
    let username_errors = errors_html(errors.on("username"), "Username ");
    let password_errors = errors_html(errors.on("password"), "Password ");

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(format!(
            include_str!("login.html"),
            messages = messages_html,
            base_errors = base_errors,
            username = encode_minimal(session.username()),
            username_errors = username_errors,
            password_errors = password_errors,
        ))
}

fn errors_html<'a>(messages: impl Iterator<Item = &'a str>, prefix: &str) -> String {
    messages
        .map(|m| format!("<p><b>{}</b></p>", encode_minimal(&format!("{prefix}{m}"))))
        .collect()
}
