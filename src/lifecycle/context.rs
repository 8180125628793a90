use crate::domain::SessionToken;

/// Severity of a flash notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// Transient user-facing message shown on the next page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    level: NoticeLevel,
    message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub const fn level(&self) -> NoticeLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Per-request session state the lifecycle reads and mutates
///
/// The context is handed to each operation by value and handed back with the mutations applied;
/// the HTTP layer writes it back to the cookie session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    return_to: Option<String>,
    flash: Option<Notice>,
    session_token: Option<SessionToken>,
    reset: bool,
}

impl RequestContext {
    pub const fn new(return_to: Option<String>, session_token: Option<SessionToken>) -> Self {
        Self {
            return_to,
            flash: None,
            session_token,
            reset: false,
        }
    }

    pub fn return_to(&self) -> Option<&str> {
        self.return_to.as_deref()
    }

    pub fn clear_return_to(&mut self) {
        self.return_to = None;
    }

    pub const fn flash(&self) -> Option<&Notice> {
        self.flash.as_ref()
    }

    pub fn set_flash(&mut self, notice: Notice) {
        self.flash = Some(notice);
    }

    /// Authentication marker: the token of the current login session, if any
    pub const fn session_token(&self) -> Option<SessionToken> {
        self.session_token
    }

    pub fn authenticate(&mut self, token: SessionToken) {
        self.session_token = Some(token);
    }

    pub const fn is_authenticated(&self) -> bool {
        self.session_token.is_some()
    }

    /// Drop all session state; the whole session is invalidated, not just the known keys
    pub fn reset_all(&mut self) {
        *self = Self {
            reset: true,
            ..Self::default()
        };
    }

    pub const fn is_reset(&self) -> bool {
        self.reset
    }
}
