use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::Method;
use actix_web::middleware::Next;
use actix_web::{web, FromRequest};

use crate::lifecycle::Locations;
use crate::session_state::TypedSession;
use crate::utils::{err500, see_other};

/// Redirect users that are not logged in to the login form
///
/// For GET requests the requested location is remembered as `return_to`, so that a successful
/// login brings the user back to it.
#[allow(clippy::future_not_send)]
pub async fn require_login<B: MessageBody>(
    mut req: ServiceRequest,
    next: Next<B>,
) -> actix_web::Result<ServiceResponse<EitherBody<B>>> {
    // Retrieve session
    let session = {
        let (http_request, payload) = req.parts_mut();
        TypedSession::from_request(http_request, payload).await
    }?;

    // Check if the session state contains a login session token
    if session.get_session_token().map_err(err500)?.is_some() {
        return next.call(req).await.map(ServiceResponse::map_into_left_body);
    }

    if req.method() == Method::GET {
        let location = req
            .uri()
            .path_and_query()
            .map_or_else(|| req.path().to_string(), ToString::to_string);
        session.insert_return_to(&location).map_err(err500)?;
    }

    let login = req
        .app_data::<web::Data<Locations>>()
        .map_or_else(|| Locations::default().login, |l| l.login.clone());
    tracing::info!(path = %req.path(), "The user is not logged in");
    Ok(req.into_response(see_other(&login)).map_into_right_body())
}
