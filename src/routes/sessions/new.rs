use actix_web::{web, HttpResponse};
use actix_web_flash_messages::IncomingFlashMessages;

use crate::authentication::CredentialStore;
use crate::lifecycle::SessionLifecycle;
use crate::routes::helpers::flash_messages_html;
use crate::routes::sessions::form::render_login_form;

/// Login form handler
pub async fn login_form<S: CredentialStore>(
    lifecycle: web::Data<SessionLifecycle<S>>,
    messages: IncomingFlashMessages,
) -> HttpResponse {
    let session = lifecycle.show_login_form();
    render_login_form(&session, &flash_messages_html(&messages))
}
