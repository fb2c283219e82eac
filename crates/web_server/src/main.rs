//! Main entry point for the YelpCamp server.
//! This crate wires configuration, stores and collaborators into the actix-web application.

use std::sync::Arc;

use actix_session::{SessionMiddleware, config::PersistentSession, storage::CookieSessionStore};
use actix_web::{
    App, HttpServer,
    cookie::{SameSite, time::Duration},
    middleware::Logger,
    web,
};
use auth_services::{AuthService, MemoryUserStore, PgUserStore, UserStore};
use campgrounds::{
    CampgroundService, CampgroundStore, MemoryCampgroundStore, MemoryReviewStore,
    PgCampgroundStore, PgReviewStore, ReviewStore,
};
use geocoding::{Geocoder, MapTilerGeocoder, StaticGeocoder};
use media_services::{ImageStore, MemoryImageStore, S3ImageStore};
use postgres::database::*;
use web_handlers::{AppState, MethodOverride, configure, not_found};

mod config;
use config::{ServerConfig, StoreBackend};

/// Base URL of images kept in memory when no bucket is configured
const MEMORY_IMAGE_BASE_URL: &str = "memory://yelpcamp";

type Stores = (
    Arc<dyn UserStore>,
    Arc<dyn CampgroundStore>,
    Arc<dyn ReviewStore>,
);

async fn create_stores(config: &ServerConfig) -> Stores {
    match config.store_backend {
        StoreBackend::Memory => {
            log::warn!("🧪 Using in-memory stores; data is lost on restart");
            let users: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
            let campgrounds: Arc<dyn CampgroundStore> = Arc::new(MemoryCampgroundStore::new());
            let reviews: Arc<dyn ReviewStore> = Arc::new(MemoryReviewStore::new());
            (users, campgrounds, reviews)
        }
        StoreBackend::Postgres => {
            let database_url = config.database_url.as_deref().unwrap_or_default();

            let pool = match create_connection_pool(database_url).await {
                Ok(pool) => {
                    log::info!("🗃️ Database pool created successfully");

                    if let Err(e) = test_connection(&pool).await {
                        log::error!("❌ Database connection test failed: {}", e);
                    }
                    pool
                }
                Err(e) => {
                    log::error!("❌ Failed to create database pool: {}", e);
                    log::error!("💡 Check DATABASE_URL or set STORE_BACKEND=memory");
                    std::process::exit(1);
                }
            };

            if let Err(e) = ensure_schema(&pool).await {
                log::error!("❌ Failed to apply database schema: {}", e);
                std::process::exit(1);
            }

            let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
            let campgrounds: Arc<dyn CampgroundStore> = Arc::new(PgCampgroundStore::new(pool.clone()));
            let reviews: Arc<dyn ReviewStore> = Arc::new(PgReviewStore::new(pool));
            (users, campgrounds, reviews)
        }
    }
}

fn create_geocoder(config: &ServerConfig) -> Arc<dyn Geocoder> {
    match &config.maptiler_api_key {
        Some(api_key) => match MapTilerGeocoder::new(api_key.clone()) {
            Ok(geocoder) => {
                log::info!("🗺️ MapTiler geocoding enabled");
                Arc::new(geocoder)
            }
            Err(e) => {
                log::error!("❌ Failed to initialize geocoder: {}", e);
                Arc::new(StaticGeocoder::disabled())
            }
        },
        None => {
            log::warn!("🗺️ MAPTILER_API_KEY not set; campgrounds are saved without coordinates");
            Arc::new(StaticGeocoder::disabled())
        }
    }
}

async fn create_image_store(config: &ServerConfig) -> Arc<dyn ImageStore> {
    match &config.s3 {
        Some(s3) => {
            log::info!("🖼️ Storing images in bucket {}", s3.bucket);
            Arc::new(S3ImageStore::new(s3.bucket.clone(), s3.public_url.clone()).await)
        }
        None => {
            log::warn!("🖼️ S3_BUCKET not set; images are kept in memory");
            Arc::new(MemoryImageStore::new(MEMORY_IMAGE_BASE_URL))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    log::info!("🚀 Starting YelpCamp server...");

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("❌ Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let (users, campgrounds, reviews) = create_stores(&config).await;
    let geocoder = create_geocoder(&config);
    let images = create_image_store(&config).await;

    let auth = AuthService::new(users).with_cost(config.bcrypt_cost);
    let campground_service = CampgroundService::new(campgrounds, reviews, auth.clone(), geocoder, images);
    let state = AppState::new(auth, campground_service);

    let session_key = config.session_key();
    let cookie_secure = config.cookie_secure;

    log::info!("🌐 Server will be available at: http://{}", config.bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(MethodOverride)
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), session_key.clone())
                    .cookie_name("session".to_owned())
                    .cookie_http_only(true)
                    .cookie_secure(cookie_secure)
                    .cookie_same_site(SameSite::Lax)
                    .session_lifecycle(PersistentSession::default().session_ttl(Duration::days(7)))
                    .build(),
            )
            .wrap(Logger::default())
            .configure(configure)
            .default_service(web::to(not_found))
    })
    .bind(config.bind_address.as_str())?
    .run()
    .await
}
