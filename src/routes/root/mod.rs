use actix_web::http::header::ContentType;
use actix_web::{web, HttpResponse};
use actix_web_flash_messages::IncomingFlashMessages;
use htmlescape::encode_attribute;

use crate::lifecycle::Locations;
use crate::routes::helpers::flash_messages_html;

/// Root handler
pub async fn root(
    messages: IncomingFlashMessages,
    locations: web::Data<Locations>,
) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(format!(
            include_str!("root.html"),
            messages = flash_messages_html(&messages),
            home_path = encode_attribute(&locations.home),
            login_path = encode_attribute(&locations.login),
        ))
}
