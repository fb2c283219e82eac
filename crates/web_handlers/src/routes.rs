use actix_web::{HttpRequest, HttpResponse, error::UrlencodedError, web};

use crate::context::RequestContext;
use crate::error::WebError;
use crate::{campground_handlers, review_handlers, user_handlers};

/// Largest accepted urlencoded form body
const FORM_LIMIT: usize = 64 * 1024;

/// Landing page.
pub async fn home(ctx: RequestContext) -> HttpResponse {
    ctx.render("home", ())
}

/// Liveness probe.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().body("OK")
}

/// Fallback for every unmatched route; register with `App::default_service`.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, WebError> {
    log::debug!("🔍 No route for {} {}", req.method(), req.path());
    Err(WebError::NotFound)
}

fn form_error(error: UrlencodedError, _: &HttpRequest) -> actix_web::Error {
    WebError::BadRequest(format!("Invalid form data: {}", error)).into()
}

fn path_error(_: actix_web::error::PathError, _: &HttpRequest) -> actix_web::Error {
    WebError::NotFound.into()
}

/// Registers every route of the application.
///
/// Static paths such as `/campgrounds/new` are registered before `{id}` paths.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::FormConfig::default()
            .limit(FORM_LIMIT)
            .error_handler(form_error),
    )
    .app_data(web::PathConfig::default().error_handler(path_error))
    .route("/", web::get().to(home))
    .route("/health", web::get().to(health))
    .service(
        web::resource("/register")
            .route(web::get().to(user_handlers::register_form))
            .route(web::post().to(user_handlers::register)),
    )
    .service(
        web::resource("/login")
            .route(web::get().to(user_handlers::login_form))
            .route(web::post().to(user_handlers::login)),
    )
    .route("/logout", web::get().to(user_handlers::logout))
    .service(
        web::resource("/campgrounds")
            .route(web::get().to(campground_handlers::index))
            .route(web::post().to(campground_handlers::create)),
    )
    .route("/campgrounds/new", web::get().to(campground_handlers::new_form))
    .service(
        web::resource("/campgrounds/{id}")
            .route(web::get().to(campground_handlers::show))
            .route(web::put().to(campground_handlers::update))
            .route(web::delete().to(campground_handlers::destroy)),
    )
    .route("/campgrounds/{id}/edit", web::get().to(campground_handlers::edit_form))
    .route("/campgrounds/{id}/reviews", web::post().to(review_handlers::create))
    .route(
        "/campgrounds/{id}/reviews/{review_id}",
        web::delete().to(review_handlers::destroy),
    );
}
