//! End-to-end tests driving the route table through the session and
//! method-override middleware, backed by in-memory stores.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{
    App,
    cookie::{Cookie, Key},
    dev::ServiceResponse,
    http::{StatusCode, header},
    test, web,
};
use auth_services::{AuthService, MemoryUserStore};
use campgrounds::{CampgroundService, CampgroundStore, MemoryCampgroundStore, MemoryReviewStore};
use geocoding::{Point, StaticGeocoder};
use media_services::MemoryImageStore;
use serde_json::Value;
use uuid::Uuid;

use crate::{AppState, MethodOverride, configure, not_found};

const BOUNDARY: &str = "yelpcamp-test-boundary";

struct Harness {
    state: AppState,
    campgrounds: MemoryCampgroundStore,
    reviews: MemoryReviewStore,
    images: MemoryImageStore,
}

fn canned_point() -> Point {
    Point::new(-97.7431, 30.2672)
}

fn harness() -> Harness {
    let campgrounds = MemoryCampgroundStore::new();
    let reviews = MemoryReviewStore::new();
    let images = MemoryImageStore::new("https://res.example.com/demo/image/upload");
    let auth = AuthService::new(Arc::new(MemoryUserStore::new())).with_cost(4);

    let service = CampgroundService::new(
        Arc::new(campgrounds.clone()),
        Arc::new(reviews.clone()),
        auth.clone(),
        Arc::new(StaticGeocoder::new(canned_point())),
        Arc::new(images.clone()),
    );

    Harness {
        state: AppState::new(auth, service),
        campgrounds,
        reviews,
        images,
    }
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .wrap(MethodOverride)
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
                        .cookie_name("session".to_owned())
                        .cookie_secure(false)
                        .build(),
                )
                .configure(configure)
                .default_service(web::to(not_found)),
        )
        .await
    };
}

/// Sends a request as the browser owning `$jar`, keeping the latest session cookie.
macro_rules! send {
    ($app:expr, $jar:expr, $req:expr) => {{
        let mut req = $req;
        if let Some(cookie) = $jar.clone() {
            req = req.cookie(cookie);
        }
        let res = test::call_service(&$app, req.to_request()).await;
        if let Some(cookie) = res.response().cookies().find(|c| c.name() == "session") {
            $jar = Some(cookie.into_owned());
        }
        res
    }};
}

macro_rules! sign_up {
    ($app:expr, $jar:expr, $name:expr) => {{
        let res = send!(
            $app,
            $jar,
            test::TestRequest::post().uri("/register").set_form(&[
                ("email", format!("{}@example.com", $name)),
                ("username", $name.to_string()),
                ("password", "secret".to_string()),
            ])
        );
        assert_eq!(res.status(), StatusCode::FOUND);
        assert_eq!(location(&res), "/campgrounds");
    }};
}

macro_rules! create_campground {
    ($app:expr, $jar:expr, $title:expr, $files:expr) => {{
        let res = send!(
            $app,
            $jar,
            multipart_post("/campgrounds", &campground_fields($title, "25"), $files)
        );
        assert_eq!(res.status(), StatusCode::FOUND);
        let target = location(&res);
        Uuid::parse_str(target.trim_start_matches("/campgrounds/")).unwrap()
    }};
}

fn location<B>(res: &ServiceResponse<B>) -> String {
    res.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn campground_fields<'a>(title: &'a str, price: &'a str) -> Vec<(&'static str, &'a str)> {
    vec![
        ("campground[title]", title),
        ("campground[price]", price),
        ("campground[location]", "Austin, TX"),
        ("campground[description]", "Shady sites along the river"),
    ]
}

fn multipart_post(uri: &str, fields: &[(&str, &str)], files: &[(&str, &[u8])]) -> test::TestRequest {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (file_name, data) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n\
                 Content-Type: image/png\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    test::TestRequest::post()
        .uri(uri)
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        ))
        .set_payload(body)
}

const PNG: &[u8] = &[0x89, b'P', b'N', b'G'];

/// Most recent notice of `kind` shown on a page; earlier ones may still be queued.
fn last_notice(page: &Value, kind: &str) -> String {
    page[kind]
        .as_array()
        .and_then(|notices| notices.last())
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[actix_web::test]
async fn test_home_health_and_unknown_routes() {
    let h = harness();
    let app = test_app!(h.state);
    let mut jar: Option<Cookie<'static>> = None;

    let res = send!(app, jar, test::TestRequest::get().uri("/"));
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = test::read_body_json(res).await;
    assert_eq!(page["view"], "home");
    assert!(page["current_user"].is_null());

    let res = send!(app, jar, test::TestRequest::get().uri("/health"));
    assert_eq!(test::read_body(res).await, "OK");

    let res = send!(app, jar, test::TestRequest::get().uri("/no/such/page"));
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let page: Value = test::read_body_json(res).await;
    assert_eq!(page["message"], "Page Not Found");

    let res = send!(app, jar, test::TestRequest::get().uri("/campgrounds/not-a-uuid"));
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_register_logout_and_login() {
    let h = harness();
    let app = test_app!(h.state);
    let mut jar: Option<Cookie<'static>> = None;

    sign_up!(app, jar, "alice");
    let res = send!(app, jar, test::TestRequest::get().uri("/campgrounds"));
    let page: Value = test::read_body_json(res).await;
    assert_eq!(page["current_user"]["username"], "alice");
    assert_eq!(page["success"], serde_json::json!(["Welcome to YelpCamp!"]));

    let res = send!(app, jar, test::TestRequest::get().uri("/logout"));
    assert_eq!(location(&res), "/campgrounds");
    let res = send!(app, jar, test::TestRequest::get().uri("/campgrounds"));
    let page: Value = test::read_body_json(res).await;
    assert!(page["current_user"].is_null());
    assert_eq!(page["success"], serde_json::json!(["Goodbye!"]));

    let res = send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/login")
            .set_form(&[("username", "alice"), ("password", "wrong")])
    );
    assert_eq!(location(&res), "/login");
    let res = send!(app, jar, test::TestRequest::get().uri("/login"));
    let page: Value = test::read_body_json(res).await;
    assert_eq!(
        page["error"],
        serde_json::json!(["Password or username is incorrect"])
    );

    let res = send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/login")
            .set_form(&[("username", "alice"), ("password", "secret")])
    );
    assert_eq!(location(&res), "/campgrounds");
    let res = send!(app, jar, test::TestRequest::get().uri("/campgrounds"));
    let page: Value = test::read_body_json(res).await;
    assert_eq!(page["current_user"]["username"], "alice");
    assert_eq!(page["success"], serde_json::json!(["Welcome back!"]));
}

#[actix_web::test]
async fn test_duplicate_registration_is_flashed() {
    let h = harness();
    let app = test_app!(h.state);
    let mut first: Option<Cookie<'static>> = None;
    let mut second: Option<Cookie<'static>> = None;

    sign_up!(app, first, "alice");

    let res = send!(
        app,
        second,
        test::TestRequest::post().uri("/register").set_form(&[
            ("email", "someone@example.com"),
            ("username", "alice"),
            ("password", "secret"),
        ])
    );
    assert_eq!(location(&res), "/register");

    let res = send!(app, second, test::TestRequest::get().uri("/register"));
    let page: Value = test::read_body_json(res).await;
    assert_eq!(page["view"], "users/register");
    assert_eq!(
        page["error"],
        serde_json::json!(["A user with the given username is already registered"])
    );
    assert!(page["current_user"].is_null());
}

#[actix_web::test]
async fn test_login_required_returns_to_requested_page() {
    let h = harness();
    let app = test_app!(h.state);
    let mut jar: Option<Cookie<'static>> = None;

    let res = send!(app, jar, test::TestRequest::get().uri("/campgrounds/new"));
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), "/login");

    let res = send!(app, jar, test::TestRequest::get().uri("/login"));
    let page: Value = test::read_body_json(res).await;
    assert_eq!(page["error"], serde_json::json!(["You must be signed in first!"]));

    h.state
        .auth
        .register(&auth_services::RegisterRequest {
            email: "alice@example.com".to_string(),
            username: "alice".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();

    let res = send!(
        app,
        jar,
        test::TestRequest::post()
            .uri("/login")
            .set_form(&[("username", "alice"), ("password", "secret")])
    );
    assert_eq!(location(&res), "/campgrounds/new");

    let res = send!(app, jar, test::TestRequest::get().uri("/campgrounds/new"));
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_anonymous_create_is_redirected() {
    let h = harness();
    let app = test_app!(h.state);
    let mut jar: Option<Cookie<'static>> = None;

    let res = send!(
        app,
        jar,
        multipart_post("/campgrounds", &campground_fields("Sneaky", "10"), &[])
    );
    assert_eq!(location(&res), "/login");
    assert!(h.campgrounds.is_empty());
}

#[actix_web::test]
async fn test_invalid_campground_is_rejected() {
    let h = harness();
    let app = test_app!(h.state);
    let mut jar: Option<Cookie<'static>> = None;
    sign_up!(app, jar, "alice");

    let res = send!(
        app,
        jar,
        multipart_post("/campgrounds", &campground_fields("Cheap", "-5"), &[])
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let page: Value = test::read_body_json(res).await;
    assert_eq!(
        page["message"],
        "\"campground.price\" must be greater than or equal to 0"
    );

    let res = send!(
        app,
        jar,
        multipart_post(
            "/campgrounds",
            &campground_fields("<script>alert(1)</script>", "5"),
            &[("a.png", PNG)]
        )
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert!(h.campgrounds.is_empty());
    assert!(h.images.is_empty());
}

#[actix_web::test]
async fn test_create_geocodes_and_shows_campground() {
    let h = harness();
    let app = test_app!(h.state);
    let mut jar: Option<Cookie<'static>> = None;
    sign_up!(app, jar, "alice");

    let id = create_campground!(app, jar, "Misty Hollow", &[("a.png", PNG), ("empty.png", &[][..])]);

    let stored = h.campgrounds.find(&id).await.unwrap().unwrap();
    assert_eq!(stored.geometry, Some(canned_point()));
    assert_eq!(stored.images.len(), 1);

    let res = send!(app, jar, test::TestRequest::get().uri(&format!("/campgrounds/{}", id)));
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = test::read_body_json(res).await;
    assert_eq!(page["view"], "campgrounds/show");
    assert_eq!(last_notice(&page, "success"), "Successfully made a new campground!");
    assert_eq!(page["data"]["title"], "Misty Hollow");
    assert_eq!(page["data"]["author"]["username"], "alice");
    assert_eq!(page["data"]["geometry"]["type"], "Point");
    assert_eq!(
        page["data"]["geometry"]["coordinates"],
        serde_json::json!([-97.7431, 30.2672])
    );
    let thumbnail = page["data"]["images"][0]["thumbnail"].as_str().unwrap();
    assert!(thumbnail.contains("/upload/w_200/"));
}

#[actix_web::test]
async fn test_missing_campground_redirects_to_list() {
    let h = harness();
    let app = test_app!(h.state);
    let mut jar: Option<Cookie<'static>> = None;

    let res = send!(
        app,
        jar,
        test::TestRequest::get().uri(&format!("/campgrounds/{}", Uuid::new_v4()))
    );
    assert_eq!(location(&res), "/campgrounds");

    let res = send!(app, jar, test::TestRequest::get().uri("/campgrounds"));
    let page: Value = test::read_body_json(res).await;
    assert_eq!(page["error"], serde_json::json!(["Cannot find that campground!"]));
}

#[actix_web::test]
async fn test_non_owner_cannot_update_or_delete() {
    let h = harness();
    let app = test_app!(h.state);
    let mut alice: Option<Cookie<'static>> = None;
    let mut bob: Option<Cookie<'static>> = None;
    sign_up!(app, alice, "alice");
    sign_up!(app, bob, "bob");

    let id = create_campground!(app, alice, "Misty Hollow", &[]);
    let before = h.campgrounds.find(&id).await.unwrap().unwrap();

    let res = send!(
        app,
        bob,
        multipart_post(
            &format!("/campgrounds/{}?_method=PUT", id),
            &campground_fields("Hijacked", "1"),
            &[]
        )
    );
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/campgrounds/{}", id));

    let res = send!(app, bob, test::TestRequest::get().uri(&format!("/campgrounds/{}", id)));
    let page: Value = test::read_body_json(res).await;
    assert_eq!(
        page["error"],
        serde_json::json!(["You do not have permission to do that!"])
    );
    assert_eq!(page["data"]["title"], "Misty Hollow");

    let res = send!(
        app,
        bob,
        test::TestRequest::post().uri(&format!("/campgrounds/{}?_method=DELETE", id))
    );
    assert_eq!(location(&res), format!("/campgrounds/{}", id));

    let res = send!(app, bob, test::TestRequest::get().uri(&format!("/campgrounds/{}/edit", id)));
    assert_eq!(location(&res), format!("/campgrounds/{}", id));

    let after = h.campgrounds.find(&id).await.unwrap().unwrap();
    assert_eq!(after, before);
}

#[actix_web::test]
async fn test_owner_updates_and_removes_images() {
    let h = harness();
    let app = test_app!(h.state);
    let mut alice: Option<Cookie<'static>> = None;
    sign_up!(app, alice, "alice");

    let id = create_campground!(app, alice, "Misty Hollow", &[("a.png", PNG), ("b.png", PNG)]);
    let created = h.campgrounds.find(&id).await.unwrap().unwrap();
    let doomed = created.images[0].filename.clone();

    let mut fields = campground_fields("Misty Hollow Deluxe", "40");
    fields.push(("deleteImages[]", doomed.as_str()));
    let res = send!(
        app,
        alice,
        multipart_post(&format!("/campgrounds/{}?_method=PUT", id), &fields, &[("c.png", PNG)])
    );
    assert_eq!(location(&res), format!("/campgrounds/{}", id));

    let updated = h.campgrounds.find(&id).await.unwrap().unwrap();
    assert_eq!(updated.title, "Misty Hollow Deluxe");
    assert_eq!(updated.price, 40.0);
    assert_eq!(updated.images.len(), 2);
    assert!(updated.images.iter().all(|image| image.filename != doomed));
    assert!(!h.images.contains(&doomed));

    let res = send!(app, alice, test::TestRequest::get().uri(&format!("/campgrounds/{}", id)));
    let page: Value = test::read_body_json(res).await;
    assert_eq!(last_notice(&page, "success"), "Successfully updated campground!");
}

#[actix_web::test]
async fn test_review_rating_out_of_range_is_rejected() {
    let h = harness();
    let app = test_app!(h.state);
    let mut alice: Option<Cookie<'static>> = None;
    sign_up!(app, alice, "alice");
    let id = create_campground!(app, alice, "Misty Hollow", &[]);

    for rating in ["0", "6"] {
        let res = send!(
            app,
            alice,
            test::TestRequest::post()
                .uri(&format!("/campgrounds/{}/reviews", id))
                .set_form(&[("review[rating]", rating), ("review[body]", "Hmm")])
        );
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "rating {}", rating);
    }
    assert!(h.reviews.is_empty());
}

#[actix_web::test]
async fn test_review_deletion_requires_author() {
    let h = harness();
    let app = test_app!(h.state);
    let mut alice: Option<Cookie<'static>> = None;
    let mut bob: Option<Cookie<'static>> = None;
    sign_up!(app, alice, "alice");
    sign_up!(app, bob, "bob");
    let id = create_campground!(app, alice, "Misty Hollow", &[]);

    let res = send!(
        app,
        bob,
        test::TestRequest::post()
            .uri(&format!("/campgrounds/{}/reviews", id))
            .set_form(&[("review[rating]", "4"), ("review[body]", "Lovely creek")])
    );
    assert_eq!(location(&res), format!("/campgrounds/{}", id));
    let review_id = h.campgrounds.find(&id).await.unwrap().unwrap().review_ids[0];

    let delete_uri = format!("/campgrounds/{}/reviews/{}?_method=DELETE", id, review_id);
    let res = send!(app, alice, test::TestRequest::post().uri(&delete_uri));
    assert_eq!(location(&res), format!("/campgrounds/{}", id));
    assert_eq!(h.reviews.len(), 1);

    let res = send!(app, bob, test::TestRequest::post().uri(&delete_uri));
    assert_eq!(location(&res), format!("/campgrounds/{}", id));
    assert!(h.reviews.is_empty());

    let res = send!(app, bob, test::TestRequest::get().uri(&format!("/campgrounds/{}", id)));
    let page: Value = test::read_body_json(res).await;
    assert_eq!(last_notice(&page, "success"), "Review successfully deleted!");
    assert_eq!(page["data"]["reviews"], serde_json::json!([]));
}

#[actix_web::test]
async fn test_deleting_campground_removes_reviews_and_images() {
    let h = harness();
    let app = test_app!(h.state);
    let mut alice: Option<Cookie<'static>> = None;
    let mut bob: Option<Cookie<'static>> = None;
    sign_up!(app, alice, "alice");
    sign_up!(app, bob, "bob");

    let id = create_campground!(app, alice, "Misty Hollow", &[("a.png", PNG)]);
    for body in ["Great views", "Muddy in spring"] {
        let res = send!(
            app,
            bob,
            test::TestRequest::post()
                .uri(&format!("/campgrounds/{}/reviews", id))
                .set_form(&[("review[rating]", "5"), ("review[body]", body)])
        );
        assert_eq!(res.status(), StatusCode::FOUND);
    }
    assert_eq!(h.reviews.len(), 2);
    assert_eq!(h.images.len(), 1);

    let res = send!(
        app,
        alice,
        test::TestRequest::post().uri(&format!("/campgrounds/{}?_method=DELETE", id))
    );
    assert_eq!(location(&res), "/campgrounds");

    assert!(h.campgrounds.is_empty());
    assert!(h.reviews.is_empty());
    assert!(h.images.is_empty());

    let res = send!(app, alice, test::TestRequest::get().uri("/campgrounds"));
    let page: Value = test::read_body_json(res).await;
    assert_eq!(last_notice(&page, "success"), "Campground successfully deleted!");
    assert_eq!(page["data"]["campgrounds"], serde_json::json!([]));
}
