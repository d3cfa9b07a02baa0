//! Session lifecycle against a stub backend: login, guard, 401 handling.

mod common;

use common::{event_json, make_token, valid_token, StubResponse, StubServer};
use hourglass_core::forms::{LoginForm, SubmitError};
use hourglass_core::models::EventQuery;
use hourglass_core::{ApiError, GuardOutcome, Location, Navigator, Route, RouteGuard};
use serde_json::json;

fn login_body(token: &str) -> serde_json::Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "user": { "user_id": 3, "email": "ana@uni.edu", "name": "Ana" }
    })
}

#[tokio::test]
async fn test_bearer_token_attached_to_requests() {
    let server = StubServer::start(|_| StubResponse::ok(json!([]))).await;
    let api = server.client();

    // Anonymous request carries no header
    api.friends().list().await.unwrap();
    let token = valid_token();
    api.session().store(&token).unwrap();
    api.friends().list().await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].header("authorization"), None);
    let expected = format!("Bearer {}", token);
    assert_eq!(requests[1].header("authorization"), Some(expected.as_str()));
}

#[tokio::test]
async fn test_unauthorized_clears_token_and_redirects_once() {
    let server = StubServer::start(|_| StubResponse::detail(401, "Could not validate credentials")).await;
    let api = server.client();
    api.session().store(&valid_token()).unwrap();

    let events = api.events();
    let friends = api.friends();
    let query = EventQuery::default();
    let (first, second) = futures::join!(events.list(&query), friends.list());
    assert!(matches!(first, Err(ApiError::Unauthorized)));
    assert!(matches!(second, Err(ApiError::Unauthorized)));

    assert!(api.session().token().is_none());
    let history = api.navigator().history();
    let logins = history.iter().filter(|l| l.route == Route::Login).count();
    assert_eq!(logins, 1);
    assert_eq!(api.navigator().current_route(), Route::Login);
}

#[tokio::test]
async fn test_unauthorized_on_login_page_does_not_navigate() {
    let server = StubServer::start(|_| StubResponse::detail(401, "nope")).await;
    let api = server.client();
    api.navigator().replace(Location::new(Route::Login));
    let version = api.navigator().version();

    let result = api.friends().list().await;
    assert!(matches!(result, Err(ApiError::Unauthorized)));
    assert_eq!(api.navigator().version(), version);
    assert_eq!(api.navigator().history().len(), 1);
}

#[tokio::test]
async fn test_login_then_protected_page_renders() {
    let token = valid_token();
    let body = login_body(&token);
    let server = StubServer::start(move |req| match req.path() {
        "/auth/login" => StubResponse::ok(body.clone()),
        _ => StubResponse::ok(json!([event_json(1, 3, 1)])),
    })
    .await;
    let api = server.client();
    let guard = RouteGuard::new(api.session().clone());

    // Visiting the calendar without a token bounces to login
    assert!(matches!(
        guard.enforce(api.navigator()),
        GuardOutcome::Redirect(_)
    ));
    let login = api.navigator().current();
    assert_eq!(login.route, Route::Login);

    let mut form = LoginForm::new(None);
    form.email = "ana@uni.edu".to_string();
    form.password = "secret".to_string();
    let result = form.submit(&api, &login).await.unwrap();

    assert_eq!(result.user.user_id, 3);
    assert_eq!(api.session().token().as_deref(), Some(token.as_str()));
    assert_eq!(api.session().user_id(), Some(3));
    assert_eq!(api.navigator().current_route(), Route::Calendar);
    assert_eq!(guard.enforce(api.navigator()), GuardOutcome::Render);

    let login_request = &server.requests()[0];
    assert_eq!(login_request.method, "POST");
    assert_eq!(login_request.json()["email"], "ana@uni.edu");

    let events = api.events().list(&EventQuery::default()).await.unwrap();
    assert_eq!(events.len(), 1);
}

#[tokio::test]
async fn test_login_returns_to_attempted_page() {
    let body = login_body(&valid_token());
    let server = StubServer::start(move |_| StubResponse::ok(body.clone())).await;
    let api = server.client();
    let guard = RouteGuard::new(api.session().clone());

    api.navigator().navigate(Route::Friends);
    guard.enforce(api.navigator());
    let login = api.navigator().current();
    assert_eq!(login.from().map(|l| l.route), Some(Route::Friends));

    let mut form = LoginForm::new(Some("ana@uni.edu".to_string()));
    form.password = "secret".to_string();
    form.submit(&api, &login).await.unwrap();
    assert_eq!(api.navigator().current_route(), Route::Friends);
}

#[tokio::test]
async fn test_login_failures_keep_session_empty() {
    let server = StubServer::start(|req| match req.json()["email"].as_str() {
        Some("unverified@uni.edu") => {
            StubResponse::detail(403, "Please verify your email before logging in.")
        }
        _ => StubResponse::detail(401, "Invalid credentials"),
    })
    .await;
    let api = server.client();
    api.navigator().replace(Location::new(Route::Login));
    let login = api.navigator().current();

    let mut form = LoginForm::new(Some("ana@uni.edu".to_string()));
    form.password = "wrong".to_string();
    let err = form.submit(&api, &login).await.unwrap_err();
    assert_eq!(LoginForm::error_message(&err), "Invalid email or password");

    form.email = "unverified@uni.edu".to_string();
    let err = form.submit(&api, &login).await.unwrap_err();
    assert_eq!(
        LoginForm::error_message(&err),
        "Please verify your email before logging in."
    );

    assert!(api.session().token().is_none());
    assert_eq!(api.navigator().current_route(), Route::Login);
}

#[tokio::test]
async fn test_login_validation_sends_nothing() {
    let server = StubServer::start(|_| StubResponse::ok(json!({}))).await;
    let api = server.client();
    let form = LoginForm::new(None);

    let err = form.submit(&api, &Location::new(Route::Login)).await.unwrap_err();
    assert!(matches!(err, SubmitError::Invalid(_)));
    assert_eq!(server.request_count(), 0);
}

#[test]
fn test_expired_stored_token_redirects_and_is_removed() {
    let session = hourglass_core::SessionStore::in_memory();
    session.store(&make_token(r#"{"sub":"3","exp":1}"#)).unwrap();
    let navigator = Navigator::new(Location::new(Route::Calendar));
    let guard = RouteGuard::new(session.clone());

    let outcome = guard.enforce(&navigator);
    assert!(matches!(outcome, GuardOutcome::Redirect(_)));
    assert_eq!(navigator.current_route(), Route::Login);
    // The protected page never became a history entry
    assert_eq!(navigator.history().len(), 1);
    assert!(session.token().is_none());
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = StubServer::start(|_| StubResponse::ok(json!([]))).await;
    let api = server.client();
    api.session().store(&valid_token()).unwrap();

    api.auth().logout();
    assert!(api.session().token().is_none());
    assert_eq!(api.navigator().current_route(), Route::Login);
    assert_eq!(server.request_count(), 0);
}
