use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use secrecy::SecretBox;

use crate::authentication::{CredentialStore, Credentials};
use crate::lifecycle::{Handled, LoginError, Outcome, SessionLifecycle};
use crate::routes::helpers::send_notice;
use crate::routes::sessions::form::render_login_form;
use crate::session_state::TypedSession;
use crate::utils::{err500, see_other};

/// Web form data
///
/// Missing fields are let through so that the credential store reports them on the form.
#[derive(serde::Deserialize)]
pub struct FormData {
    #[serde(default)]
    username: String,
    password: Option<SecretBox<String>>,
}

impl From<FormData> for Credentials {
    fn from(form: FormData) -> Self {
        Self {
            username: form.username,
            password: form
                .password
                .unwrap_or_else(|| SecretBox::new(Box::default())),
        }
    }
}

impl ResponseError for LoginError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Login attempt handler
#[tracing::instrument(
    name = "Login attempt",
    skip(form, lifecycle, session),
    fields(username = tracing::field::Empty)
)]
#[allow(clippy::future_not_send)]
pub async fn create_session<S: CredentialStore>(
    form: web::Form<FormData>,
    lifecycle: web::Data<SessionLifecycle<S>>,
    session: TypedSession,
) -> actix_web::Result<HttpResponse> {
    let context = session.context().map_err(err500)?;
    let credentials = Credentials::from(form.into_inner());
    tracing::Span::current().record("username", tracing::field::display(&credentials.username));

    let Handled { outcome, context } = lifecycle.attempt_login(credentials, context).await?;
    match outcome {
        Outcome::Redirect(target) => {
            // Rotate the session key on login to prevent session fixation
            session.renew();
            session.apply(&context).map_err(err500)?;
            send_notice(&context);
            Ok(see_other(&target))
        }
        Outcome::RenderForm(rejected) => Ok(render_login_form(&rejected, "")),
    }
}
