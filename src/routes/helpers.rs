use std::fmt::Write;

use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages, Level};

use crate::lifecycle::{NoticeLevel, RequestContext};

/// Send the notice carried by `context`, if any, as a flash message
pub fn send_notice(context: &RequestContext) {
    if let Some(notice) = context.flash() {
        let level = match notice.level() {
            NoticeLevel::Info => Level::Info,
            NoticeLevel::Error => Level::Error,
        };
        FlashMessage::new(notice.message().to_string(), level).send();
    }
}

/// Render incoming flash messages as HTML paragraphs
pub fn flash_messages_html(messages: &IncomingFlashMessages) -> String {
    let mut html = String::new();
    for m in messages.iter() {
        // Writing into a `String` cannot fail
        let _ = writeln!(html, "<p><i>{}</i></p>", htmlescape::encode_minimal(m.content()));
    }
    html
}
