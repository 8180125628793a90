use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};

use crate::authentication::CredentialStore;
use crate::lifecycle::{LogoutError, Notice, Redirection, RequestContext, SessionLifecycle};
use crate::routes::helpers::send_notice;
use crate::session_state::TypedSession;
use crate::utils::{err500, see_other};

impl ResponseError for LogoutError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NoCurrentSession => StatusCode::UNAUTHORIZED,
            Self::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Logout handler
#[tracing::instrument(name = "Logout request", skip(lifecycle, session))]
#[allow(clippy::future_not_send)]
pub async fn destroy_session<S: CredentialStore>(
    lifecycle: web::Data<SessionLifecycle<S>>,
    session: TypedSession,
) -> actix_web::Result<HttpResponse> {
    let context = session.context().map_err(err500)?;

    match lifecycle.logout(context).await {
        Ok(Redirection { target, context }) => {
            session.apply(&context).map_err(err500)?;
            send_notice(&context);
            Ok(see_other(&target))
        }
        // The cookie names a login session the store does not know (anymore): drop the cookie
        // state and send the user to the login form
        Err(e @ LogoutError::NoCurrentSession) => {
            tracing::warn!("Logout without a current session");
            let mut context = RequestContext::default();
            context.reset_all();
            context.set_flash(Notice::error(e.to_string()));
            session.apply(&context).map_err(err500)?;
            send_notice(&context);
            Ok(see_other(&lifecycle.locations().login))
        }
        Err(e) => Err(e.into()),
    }
}
