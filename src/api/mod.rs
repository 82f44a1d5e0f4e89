mod alerts;
pub mod auth;
mod dashboard;
mod error;
mod inventory;
mod products;
mod suppliers;
mod transactions;
mod validation;

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderValue, Method, Request},
    middleware,
    middleware::Next,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::AppState;

/// Roles allowed through the admin gate
const ADMIN_ROLES: &[&str] = &["admin"];

pub fn create_router(state: Arc<AppState>) -> Router {
    // Open routes: registration, login, and the catalog CRUD that has always
    // been session-free.
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/:id",
            put(products::update_product).delete(products::delete_product),
        )
        .route(
            "/suppliers",
            get(suppliers::list_suppliers).post(suppliers::create_supplier),
        )
        .route(
            "/suppliers/:id",
            put(suppliers::update_supplier).delete(suppliers::delete_supplier),
        )
        .route(
            "/inventory",
            get(inventory::list_inventory).post(inventory::create_inventory),
        )
        // DELETE authenticates through the CurrentUser extractor; PUT stays open.
        .route(
            "/inventory/:id",
            put(inventory::update_inventory).delete(inventory::delete_inventory),
        )
        .route("/transactions/:id", delete(transactions::delete_transaction));

    // Session-gated routes
    let session_routes = Router::new()
        .route("/logout", post(auth::logout))
        .route("/profile", get(auth::profile))
        .route(
            "/transactions",
            get(transactions::list_transactions).post(transactions::create_transaction),
        )
        .route(
            "/alerts",
            get(alerts::list_alerts).post(alerts::create_alert),
        )
        .route(
            "/alerts/:id",
            put(alerts::update_alert).delete(alerts::delete_alert),
        )
        .route("/dashboard/stats", get(dashboard::stats))
        .route(
            "/dashboard/inventory-status",
            get(dashboard::inventory_status),
        )
        .route(
            "/dashboard/transaction-trends",
            get(dashboard::transaction_trends),
        )
        .route(
            "/dashboard/low-stock-products",
            get(dashboard::low_stock_products),
        )
        .route(
            "/dashboard/category-distribution",
            get(dashboard::category_distribution),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    // Admin-gated routes: authentication is checked before role.
    let admin_routes = Router::new()
        .route("/admin-only", get(auth::admin_only))
        .route("/admin/users", get(auth::list_users))
        .route_layer(middleware::from_fn(
            |request: Request<Body>, next: Next| auth::require_role(ADMIN_ROLES, request, next),
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(public_routes)
        .merge(session_routes)
        .merge(admin_routes)
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use axum::http::{header, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_app() -> (Router, Arc<AppState>) {
        let pool = db::init_memory().await.unwrap();
        let state = Arc::new(AppState::new(Config::default(), pool));
        (create_router(state.clone()), state)
    }

    /// Fire one request; returns (status, json body, session cookie if set).
    async fn send(
        app: &Router,
        method: &str,
        path: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value, Option<String>) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(|v| v.to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body, set_cookie)
    }

    async fn login_as(app: &Router, username: &str, role: &str) -> String {
        let (status, _, _) = send(
            app,
            "POST",
            "/register",
            None,
            Some(json!({ "username": username, "password": "correct-horse", "role": role })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _, cookie) = send(
            app,
            "POST",
            "/login",
            None,
            Some(json!({ "username": username, "password": "correct-horse" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        cookie.unwrap()
    }

    /// Creates a supplier, a product, and a stock row; returns the product id.
    async fn seed_product_with_stock(app: &Router, quantity: i64) -> i64 {
        let (status, supplier, _) = send(
            app,
            "POST",
            "/suppliers",
            None,
            Some(json!({ "supplier_name": "Acme" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, product, _) = send(
            app,
            "POST",
            "/products",
            None,
            Some(json!({
                "product_name": "Widget",
                "price": 9.99,
                "supplier_id": supplier["id"].as_i64().unwrap(),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let product_id = product["id"].as_i64().unwrap();

        let (status, _, _) = send(
            app,
            "POST",
            "/inventory",
            None,
            Some(json!({ "product_id": product_id, "quantity": quantity })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        product_id
    }

    async fn count(state: &AppState, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&state.db)
            .await
            .unwrap()
    }

    async fn quantity_of(state: &AppState, product_id: i64) -> i64 {
        sqlx::query_scalar("SELECT quantity FROM inventory WHERE product_id = ?")
            .bind(product_id)
            .fetch_one(&state.db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let (app, _) = test_app().await;
        let (status, body, _) = send(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn protected_endpoints_reject_anonymous_requests() {
        let (app, state) = test_app().await;
        let product_id = seed_product_with_stock(&app, 3).await;

        for (method, path) in [
            ("GET", "/profile"),
            ("POST", "/logout"),
            ("GET", "/transactions"),
            ("GET", "/alerts"),
            ("GET", "/dashboard/stats"),
        ] {
            let (status, _, _) = send(&app, method, path, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, path);
        }

        // A rejected write leaves no trace.
        let (status, _, _) = send(
            &app,
            "POST",
            "/transactions",
            None,
            Some(json!({
                "product_id": product_id,
                "user_id": 1,
                "transaction_type": "restock",
                "quantity_change": 20,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(count(&state, "transactions").await, 0);
        assert_eq!(quantity_of(&state, product_id).await, 3);
    }

    #[tokio::test]
    async fn staff_cannot_reach_admin_routes() {
        let (app, _) = test_app().await;
        let cookie = login_as(&app, "worker", "staff").await;

        let (status, _, _) = send(&app, "GET", "/admin-only", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _, _) = send(&app, "GET", "/admin/users", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_can_reach_admin_routes() {
        let (app, _) = test_app().await;
        let cookie = login_as(&app, "boss", "admin").await;

        let (status, _, _) = send(&app, "GET", "/admin-only", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, users, _) = send(&app, "GET", "/admin/users", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(users.as_array().unwrap().len(), 1);
        assert_eq!(users[0]["username"], "boss");
    }

    #[tokio::test]
    async fn login_flow_sets_cookie_only_on_success() {
        let (app, _) = test_app().await;
        let (status, _, _) = send(
            &app,
            "POST",
            "/register",
            None,
            Some(json!({ "username": "alice", "password": "correct-horse" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        // Wrong password: 401 and no session cookie.
        let (status, body, cookie) = send(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "username": "alice", "password": "wrong-horse" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");
        assert!(cookie.is_none());

        // Right password: role comes back and the cookie works on /profile.
        let (status, body, cookie) = send(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({ "username": "alice", "password": "correct-horse" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "staff");
        let cookie = cookie.unwrap();

        let (status, body, _) = send(&app, "GET", "/profile", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["username"], "alice");
        assert_eq!(body["role"], "staff");
    }

    #[tokio::test]
    async fn session_cookie_is_http_only_and_lax() {
        let (app, _) = test_app().await;
        send(
            &app,
            "POST",
            "/register",
            None,
            Some(json!({ "username": "alice", "password": "correct-horse" })),
        )
        .await;

        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "username": "alice", "password": "correct-horse" }).to_string(),
            ))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();

        assert!(set_cookie.starts_with("session="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));
    }

    #[tokio::test]
    async fn logout_destroys_the_session() {
        let (app, _) = test_app().await;
        let cookie = login_as(&app, "alice", "staff").await;

        let (status, _, _) = send(&app, "POST", "/logout", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = send(&app, "GET", "/profile", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let (app, state) = test_app().await;
        let body = json!({ "username": "alice", "password": "correct-horse" });

        let (status, _, _) = send(&app, "POST", "/register", None, Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, response, _) = send(&app, "POST", "/register", None, Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["error"], "Username already exists");
        assert_eq!(count(&state, "users").await, 1);
    }

    #[tokio::test]
    async fn recording_a_transaction_adjusts_stock() {
        let (app, state) = test_app().await;
        let cookie = login_as(&app, "clerk", "staff").await;
        let product_id = seed_product_with_stock(&app, 3).await;

        let (status, txn, _) = send(
            &app,
            "POST",
            "/transactions",
            Some(&cookie),
            Some(json!({
                "product_id": product_id,
                "user_id": 1,
                "transaction_type": "restock",
                "quantity_change": 20,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(txn["quantity_change"], 20);
        assert_eq!(quantity_of(&state, product_id).await, 23);

        let (status, listed, _) = send(&app, "GET", "/transactions", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn zero_quantity_change_is_rejected() {
        let (app, state) = test_app().await;
        let cookie = login_as(&app, "clerk", "staff").await;
        let product_id = seed_product_with_stock(&app, 3).await;

        let (status, _, _) = send(
            &app,
            "POST",
            "/transactions",
            Some(&cookie),
            Some(json!({
                "product_id": product_id,
                "user_id": 1,
                "transaction_type": "adjustment",
                "quantity_change": 0,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(count(&state, "transactions").await, 0);
    }

    #[tokio::test]
    async fn deleting_a_transaction_keeps_the_inventory_delta() {
        let (app, state) = test_app().await;
        let cookie = login_as(&app, "clerk", "staff").await;
        let product_id = seed_product_with_stock(&app, 3).await;

        let (_, txn, _) = send(
            &app,
            "POST",
            "/transactions",
            Some(&cookie),
            Some(json!({
                "product_id": product_id,
                "user_id": 1,
                "transaction_type": "restock",
                "quantity_change": 20,
            })),
        )
        .await;

        let path = format!("/transactions/{}", txn["id"].as_i64().unwrap());
        let (status, _, _) = send(&app, "DELETE", &path, None, None).await;
        assert_eq!(status, StatusCode::OK);

        // The record is gone; the stock it moved stays moved.
        assert_eq!(count(&state, "transactions").await, 0);
        assert_eq!(quantity_of(&state, product_id).await, 23);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (app, state) = test_app().await;
        let (_, supplier, _) = send(
            &app,
            "POST",
            "/suppliers",
            None,
            Some(json!({ "supplier_name": "Acme" })),
        )
        .await;
        let path = format!("/suppliers/{}", supplier["id"].as_i64().unwrap());

        let (status, _, _) = send(&app, "DELETE", &path, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(count(&state, "suppliers").await, 0);

        let (status, _, _) = send(&app, "DELETE", &path, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(count(&state, "suppliers").await, 0);
    }

    #[tokio::test]
    async fn inventory_delete_requires_a_session() {
        let (app, state) = test_app().await;
        let product_id = seed_product_with_stock(&app, 3).await;
        let inventory_id: i64 =
            sqlx::query_scalar("SELECT id FROM inventory WHERE product_id = ?")
                .bind(product_id)
                .fetch_one(&state.db)
                .await
                .unwrap();
        let path = format!("/inventory/{}", inventory_id);

        let (status, _, _) = send(&app, "DELETE", &path, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(count(&state, "inventory").await, 1);

        let cookie = login_as(&app, "clerk", "staff").await;
        let (status, _, _) = send(&app, "DELETE", &path, Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(count(&state, "inventory").await, 0);
    }

    #[tokio::test]
    async fn invalid_product_payload_is_rejected() {
        let (app, state) = test_app().await;

        let (status, body, _) = send(
            &app,
            "POST",
            "/products",
            None,
            Some(json!({ "product_name": "", "price": 9.99, "supplier_id": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Product name"));
        assert_eq!(count(&state, "products").await, 0);
    }

    #[tokio::test]
    async fn dashboard_reflects_seeded_state() {
        let (app, _) = test_app().await;
        let cookie = login_as(&app, "clerk", "staff").await;
        seed_product_with_stock(&app, 3).await;

        let (status, stats, _) = send(&app, "GET", "/dashboard/stats", Some(&cookie), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["total_products"], 1);
        assert_eq!(stats["total_suppliers"], 1);
        // quantity 3 is at or below the default threshold of 10
        assert_eq!(stats["low_stock_items"], 1);

        let (status, buckets, _) = send(
            &app,
            "GET",
            "/dashboard/inventory-status",
            Some(&cookie),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(buckets["low_stock"], 1);
        assert_eq!(buckets["in_stock"], 0);

        let (status, low, _) = send(
            &app,
            "GET",
            "/dashboard/low-stock-products",
            Some(&cookie),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(low[0]["product_name"], "Widget");
    }
}
