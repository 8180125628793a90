use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::IncomingFlashMessages;
use htmlescape::encode_minimal;

use crate::authentication::CredentialStore;
use crate::lifecycle::SessionLifecycle;
use crate::routes::helpers::flash_messages_html;
use crate::session_state::TypedSession;
use crate::utils::{err500, see_other};

/// Home handler, only reachable when logged in
#[tracing::instrument(
    name = "Home",
    skip(lifecycle, session, messages),
    fields(username = tracing::field::Empty, user_id = tracing::field::Empty)
)]
#[allow(clippy::future_not_send)]
pub async fn home<S: CredentialStore>(
    lifecycle: web::Data<SessionLifecycle<S>>,
    session: TypedSession,
    messages: IncomingFlashMessages,
) -> actix_web::Result<HttpResponse> {
    let context = session.context().map_err(err500)?;
    let Some(current) = lifecycle
        .current_session(&context)
        .await
        .map_err(err500)?
    else {
        // The login session is gone, e.g. revoked: the cookie state is stale
        session.logout();
        return Ok(see_other(&lifecycle.locations().login));
    };

    let span = tracing::Span::current();
    span.record("username", tracing::field::display(current.username()));
    if let Some(user_id) = current.user_id() {
        span.record("user_id", tracing::field::display(&user_id));
    }

    let since = current
        .created_at()
        .map_or_else(String::new, |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(format!(
            include_str!("home.html"),
            messages = flash_messages_html(&messages),
            username = encode_minimal(current.username()),
            since = since,
        )))
}
