use actix_web::{HttpResponse, web};
use campgrounds::validate_review;
use uuid::Uuid;

use crate::campground_handlers::deny;
use crate::context::{AuthenticatedUser, RequestContext, redirect};
use crate::error::WebError;
use crate::forms::ReviewForm;
use crate::state::AppState;

/// Adds a review by the signed-in user to a campground.
pub async fn create(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<Uuid>,
    form: web::Form<ReviewForm>,
) -> Result<HttpResponse, WebError> {
    let id = path.into_inner();
    let input = validate_review(&form.into_inner().into())?;

    state
        .campgrounds
        .add_review(&id, user.0.id, input)
        .await
        .map_err(|e| deny(&ctx, &id, e))?;

    ctx.flash_success("New review created!")?;
    Ok(redirect(&format!("/campgrounds/{}", id)))
}

/// Deletes a review the signed-in user wrote.
pub async fn destroy(
    user: AuthenticatedUser,
    state: web::Data<AppState>,
    ctx: RequestContext,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, WebError> {
    let (id, review_id) = path.into_inner();

    let review = state
        .campgrounds
        .authorize_review(&review_id, &user.0.id)
        .await
        .map_err(|e| deny(&ctx, &id, e))?;

    state
        .campgrounds
        .delete_review(&id, review)
        .await
        .map_err(|e| deny(&ctx, &id, e))?;

    ctx.flash_success("Review successfully deleted!")?;
    Ok(redirect(&format!("/campgrounds/{}", id)))
}
