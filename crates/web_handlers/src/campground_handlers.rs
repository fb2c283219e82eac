use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use campgrounds::{Campground, CampgroundError, CampgroundView, validate_campground};
use uuid::Uuid;

use crate::context::{AuthenticatedUser, RequestContext, redirect};
use crate::error::WebError;
use crate::forms::CampgroundForm;
use crate::state::AppState;

/// Turns a failed ownership check into a flashed notice and a redirect.
/// A missing review is reported like a foreign one.
pub(crate) fn deny(ctx: &RequestContext, id: &Uuid, error: CampgroundError) -> WebError {
    let (message, location) = match error {
        CampgroundError::NotFound => ("Cannot find that campground!", "/campgrounds".to_string()),
        CampgroundError::Forbidden | CampgroundError::ReviewNotFound => (
            "You do not have permission to do that!",
            format!("/campgrounds/{}", id),
        ),
        other => return other.into(),
    };

    match ctx.flash_error(message) {
        Ok(()) => WebError::Redirect(location),
        Err(e) => e,
    }
}

async fn owned_campground(
    state: &AppState,
    ctx: &RequestContext,
    id: &Uuid,
    user: &AuthenticatedUser,
) -> Result<Campground, WebError> {
    state
        .campgrounds
        .authorize(id, &user.0.id)
        .await
        .map_err(|e| deny(ctx, id, e))
}

/// Lists every campground.
pub async fn index(
    state: web::Data<AppState>,
    ctx: RequestContext,
) -> Result<HttpResponse, WebError> {
    let campgrounds: Vec<CampgroundView> = state
        .campgrounds
        .list()
        .await?
        .iter()
        .map(CampgroundView::from)
        .collect();

    Ok(ctx.render(
        "campgrounds/index",
        serde_json::json!({ "campgrounds": campgrounds }),
    ))
}

/// Renders the form for a new campground.
pub async fn new_form(_user: AuthenticatedUser, ctx: RequestContext) -> HttpResponse {
    ctx.render("campgrounds/new", ())
}

/// Creates a campground owned by the signed-in user.
pub async fn create(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    ctx: RequestContext,
    payload: Multipart,
) -> Result<HttpResponse, WebError> {
    let form = CampgroundForm::read(payload).await?;
    let input = validate_campground(&form.campground)?;

    let campground = state
        .campgrounds
        .create(user.0.id, input, form.images)
        .await?;

    ctx.flash_success("Successfully made a new campground!")?;
    Ok(redirect(&format!("/campgrounds/{}", campground.id)))
}

/// Shows one campground with its owner and reviews.
pub async fn show(
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();

    match state.campgrounds.show(&id).await? {
        Some(detail) => Ok(ctx.render("campgrounds/show", detail)),
        None => {
            ctx.flash_error("Cannot find that campground!")?;
            Ok(redirect("/campgrounds"))
        }
    }
}

/// Renders the edit form for a campground the signed-in user owns.
pub async fn edit_form(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();
    let campground = owned_campground(&state, &ctx, &id, &user).await?;

    Ok(ctx.render("campgrounds/edit", CampgroundView::from(&campground)))
}

/// Applies an edit to a campground the signed-in user owns.
pub async fn update(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();
    let campground = owned_campground(&state, &ctx, &id, &user).await?;

    let form = CampgroundForm::read(payload).await?;
    let input = validate_campground(&form.campground)?;

    state
        .campgrounds
        .update(campground, input, form.images, &form.delete_images)
        .await?;

    ctx.flash_success("Successfully updated campground!")?;
    Ok(redirect(&format!("/campgrounds/{}", id)))
}

/// Deletes a campground the signed-in user owns, with its reviews and images.
pub async fn destroy(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();
    let campground = owned_campground(&state, &ctx, &id, &user).await?;

    state.campgrounds.delete(campground).await?;

    ctx.flash_success("Campground successfully deleted!")?;
    Ok(redirect("/campgrounds"))
}
