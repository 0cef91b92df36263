#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use base64ct::{Base64, Encoding};
use cookbook::{app::build_app, config::AppConfig, state::AppState};
use serde_json::{json, Value};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub db: PgPool,
}

/// Connects to `DATABASE_URL` and migrates it; `None` when no database is configured.
pub async fn app() -> Result<Option<TestApp>> {
    dotenvy::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping");
        return Ok(None);
    }
    let config = AppConfig::from_lookup(|k| match k {
        "JWT_SECRET" => Some("integration-secret".to_string()),
        other => std::env::var(other).ok(),
    })?;

    let db = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("connect to database")?;
    sqlx::migrate!("./migrations").run(&db).await?;

    let state = AppState::from_parts(db.clone(), Arc::new(config));
    Ok(Some(TestApp {
        router: build_app(state),
        db,
    }))
}

/// Name unique across runs against the same database.
pub fn unique(prefix: &str) -> String {
    format!("{prefix}_{}", &uuid::Uuid::new_v4().simple().to_string()[..12])
}

impl TestApp {
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            req = req.header("x-access-tokens", t);
        }
        let req = match body {
            Some(b) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(b.to_string()))?,
            None => req.body(Body::empty())?,
        };
        let res = self.router.clone().oneshot(req).await?;
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        Ok((status, value))
    }

    pub async fn login(&self, name: &str, password: &str) -> Result<(StatusCode, Value)> {
        let basic = format!("Basic {}", Base64::encode_string(format!("{name}:{password}").as_bytes()));
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/login")
            .header(header::AUTHORIZATION, basic)
            .body(Body::empty())?;
        let res = self.router.clone().oneshot(req).await?;
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await?;
        Ok((status, serde_json::from_slice(&bytes).unwrap_or(Value::Null)))
    }

    /// Registers a fresh user and returns its token.
    pub async fn token(&self) -> Result<String> {
        let name = unique("user");
        let (status, _) = self
            .call(
                "POST",
                "/api/v1/register",
                None,
                Some(json!({"name": name, "password": "pw"})),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "register failed: {status}");
        let (status, body) = self.login(&name, "pw").await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {status}");
        body["token"]
            .as_str()
            .map(str::to_string)
            .context("token missing from login response")
    }

    /// Creates a published classification and a recipe in it, returning the recipe id.
    pub async fn recipe(&self, token: &str) -> Result<i64> {
        let (status, body) = self
            .call(
                "POST",
                "/api/v1/recipes-classification",
                Some(token),
                Some(json!({"name": unique("cls"), "is_publish": true})),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "classification: {status} {body}");
        let cls = body["recipes-classification"][0]["id"].as_i64().context("classification id")?;

        let (status, body) = self
            .call(
                "POST",
                "/api/v1/recipes",
                Some(token),
                Some(json!({"name": "Pancakes", "classification_id": cls, "is_publish": true})),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "recipe: {status} {body}");
        body["recipes"][0]["id"].as_i64().context("recipe id")
    }
}
