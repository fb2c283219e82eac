use auth_services::AuthService;
use campgrounds::CampgroundService;

/// Services shared by every handler, registered as `web::Data<AppState>`
#[derive(Clone)]
pub struct AppState {
    /// Account registration and credential checks
    pub auth: AuthService,
    /// Campground and review operations
    pub campgrounds: CampgroundService,
}

impl AppState {
    /// Bundles the services for the handlers.
    pub fn new(auth: AuthService, campgrounds: CampgroundService) -> Self {
        Self { auth, campgrounds }
    }
}
