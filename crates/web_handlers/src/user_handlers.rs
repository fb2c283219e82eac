use actix_web::{HttpResponse, web};
use auth_services::{AuthError, UserSummary};

use crate::context::{RequestContext, redirect};
use crate::error::WebError;
use crate::forms::{LoginForm, RegisterForm};
use crate::state::AppState;

/// Renders the registration form.
pub async fn register_form(ctx: RequestContext) -> HttpResponse {
    ctx.render("users/register", ())
}

/// Creates an account and signs the new user in.
/// Problems with the submitted data are flashed back on the registration form.
pub async fn register(
    state: web::Data<AppState>,
    ctx: RequestContext,
    form: web::Form<RegisterForm>,
) -> Result<HttpResponse, WebError> {
    match state.auth.register(&form.into_inner().into()).await {
        Ok(user) => {
            ctx.sign_in(&UserSummary::from(&user))?;
            ctx.flash_success("Welcome to YelpCamp!")?;
            Ok(redirect("/campgrounds"))
        }
        Err(e) if e.is_user_facing() => {
            log::info!("📝 Registration rejected: {}", e);
            ctx.flash_error(&e.to_string())?;
            Ok(redirect("/register"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Renders the login form.
pub async fn login_form(ctx: RequestContext) -> HttpResponse {
    ctx.render("users/login", ())
}

/// Verifies credentials and sends the user back where they were headed.
pub async fn login(
    state: web::Data<AppState>,
    ctx: RequestContext,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, WebError> {
    match state.auth.authenticate(&form.into_inner().into()).await {
        Ok(user) => {
            let destination = ctx.take_return_to();
            ctx.sign_in(&UserSummary::from(&user))?;
            ctx.flash_success("Welcome back!")?;
            log::info!("🔑 {} signed in", user.username);
            Ok(redirect(destination.as_deref().unwrap_or("/campgrounds")))
        }
        Err(AuthError::InvalidCredentials) => {
            ctx.flash_error("Password or username is incorrect")?;
            Ok(redirect("/login"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Signs the user out.
pub async fn logout(ctx: RequestContext) -> Result<HttpResponse, WebError> {
    ctx.sign_out();
    ctx.flash_success("Goodbye!")?;
    Ok(redirect("/campgrounds"))
}
