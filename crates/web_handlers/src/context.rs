//! Session-backed request context.
//!
//! Handlers never touch the raw session: they sign users in and out, queue
//! flash notices and render pages through [`RequestContext`], and require a
//! signed-in user with the [`AuthenticatedUser`] extractor.

use std::future::{Ready, ready};

use actix_session::{Session, SessionExt};
use actix_web::{
    FromRequest, HttpRequest, HttpResponse, dev::Payload, http::Method, http::header,
};
use auth_services::UserSummary;
use serde::{Deserialize, Serialize};

use crate::error::WebError;

pub(crate) const USER_KEY: &str = "user";
pub(crate) const RETURN_TO_KEY: &str = "return_to";
pub(crate) const FLASH_KEY: &str = "flash";

/// One-shot notices carried to the next rendered page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flash {
    /// Success notices
    pub success: Vec<String>,
    /// Error notices
    pub error: Vec<String>,
}

impl Flash {
    fn is_empty(&self) -> bool {
        self.success.is_empty() && self.error.is_empty()
    }
}

/// Body of every rendered page
#[derive(Debug, Serialize)]
struct Page<'a, T: Serialize> {
    view: &'a str,
    current_user: Option<UserSummary>,
    success: Vec<String>,
    error: Vec<String>,
    data: T,
}

/// Newtype wrapper exposing the session operations handlers need.
#[derive(Clone)]
pub struct RequestContext(Session);

impl RequestContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// The signed-in user, if any. An unreadable entry counts as signed out.
    pub fn current_user(&self) -> Option<UserSummary> {
        match self.0.get::<UserSummary>(USER_KEY) {
            Ok(user) => user,
            Err(e) => {
                log::warn!("⚠️ Ignoring unreadable user in session: {}", e);
                None
            }
        }
    }

    /// Establishes `user` as the signed-in user under a fresh session key.
    pub fn sign_in(&self, user: &UserSummary) -> Result<(), WebError> {
        self.0.renew();
        self.0.insert(USER_KEY, user)?;
        Ok(())
    }

    /// Ends the signed-in state under a fresh session key. Pending flash
    /// notices survive.
    pub fn sign_out(&self) {
        self.0.remove(USER_KEY);
        self.0.remove(RETURN_TO_KEY);
        self.0.renew();
    }

    /// Remembers where to send the user after they sign in.
    pub fn remember_return_to(&self, path: &str) -> Result<(), WebError> {
        self.0.insert(RETURN_TO_KEY, path)?;
        Ok(())
    }

    /// Takes the remembered post-login destination, clearing it.
    pub fn take_return_to(&self) -> Option<String> {
        self.0.remove_as::<String>(RETURN_TO_KEY).and_then(Result::ok)
    }

    /// Queues a success notice for the next rendered page.
    pub fn flash_success(&self, message: &str) -> Result<(), WebError> {
        self.push_flash(|flash| flash.success.push(message.to_string()))
    }

    /// Queues an error notice for the next rendered page.
    pub fn flash_error(&self, message: &str) -> Result<(), WebError> {
        self.push_flash(|flash| flash.error.push(message.to_string()))
    }

    fn push_flash(&self, add: impl FnOnce(&mut Flash)) -> Result<(), WebError> {
        let mut flash = self.0.get::<Flash>(FLASH_KEY).ok().flatten().unwrap_or_default();
        add(&mut flash);
        self.0.insert(FLASH_KEY, flash)?;
        Ok(())
    }

    fn take_flash(&self) -> Flash {
        self.0
            .remove_as::<Flash>(FLASH_KEY)
            .and_then(Result::ok)
            .unwrap_or_default()
    }

    /// Renders `view` with `data`, draining the pending flash notices.
    pub fn render<T: Serialize>(&self, view: &str, data: T) -> HttpResponse {
        let flash = self.take_flash();
        if !flash.is_empty() {
            log::debug!("📣 Showing {} notice(s) on {}", flash.success.len() + flash.error.len(), view);
        }

        HttpResponse::Ok().json(Page {
            view,
            current_user: self.current_user(),
            success: flash.success,
            error: flash.error,
            data,
        })
    }
}

impl FromRequest for RequestContext {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(RequestContext::new(req.get_session())))
    }
}

/// A `302 Found` pointing at `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Custom extractor for the signed-in user.
///
/// Without one, the request is answered with a redirect to `/login`, an error
/// notice is queued and, for page loads, the requested URL is remembered.
pub struct AuthenticatedUser(pub UserSummary);

impl FromRequest for AuthenticatedUser {
    type Error = WebError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(require_user(req))
    }
}

fn require_user(req: &HttpRequest) -> Result<AuthenticatedUser, WebError> {
    let context = RequestContext::new(req.get_session());
    if let Some(user) = context.current_user() {
        return Ok(AuthenticatedUser(user));
    }

    if req.method() == Method::GET {
        context.remember_return_to(&req.uri().to_string())?;
    }
    context.flash_error("You must be signed in first!")?;
    Err(WebError::Redirect("/login".to_string()))
}
