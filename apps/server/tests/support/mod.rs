//! Shared harness for integration tests.
//!
//! Every test gets a fresh in-memory store and drives the real router with
//! `tower::ServiceExt::oneshot`, so no database or network is needed.

use std::{future::Future, pin::Pin, sync::Arc};

use anyhow::Context;
use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use clinic_registry::{
    api::create_router,
    auth::Role,
    config::{Config, StorageBackend},
    state::{AppState, AppStateOptions},
};
use serde::Serialize;
use serde_json::{json, Value};
use tower::ServiceExt;

pub type TestFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + 'a>>;

pub struct TestApp {
    router: Router,
    pub state: AppState,
    bearer: Option<String>,
}

impl TestApp {
    async fn new(config: Config) -> anyhow::Result<Self> {
        let state = AppState::new_with_options(
            config,
            AppStateOptions {
                backend: Some(StorageBackend::Memory),
                run_migrations: Some(false),
            },
        )
        .await
        .context("failed to build test app state")?;

        // With auth enabled, requests default to an admin token.
        let bearer = if state.config.auth.enabled {
            Some(state.auth.issue_token("test-admin", Role::Admin)?)
        } else {
            None
        };

        Ok(Self {
            router: create_router(state.clone()),
            state,
            bearer,
        })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let auth = self.bearer.as_ref().map(|t| format!("Bearer {t}"));
        let mut extra: Vec<(&str, &str)> = Vec::new();
        if let Some(auth) = auth.as_deref() {
            extra.push(("authorization", auth));
        }
        self.request_with_extra_headers(method, uri, body, &extra)
            .await
    }

    pub async fn request_with_extra_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
        headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(body.map(Body::from).unwrap_or_else(Body::empty))?;

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, headers, bytes))
    }

    /// Send a request as a caller holding a token for `role`.
    pub async fn request_as(
        &self,
        role: Role,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let token = self.state.auth.issue_token("test-user", role)?;
        let auth = format!("Bearer {token}");
        self.request_with_extra_headers(method, uri, body, &[("authorization", auth.as_str())])
            .await
    }

    /// Send a request with no credentials at all.
    pub async fn request_anonymous(
        &self,
        method: Method,
        uri: &str,
        body: Option<Vec<u8>>,
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        self.request_with_extra_headers(method, uri, body, &[]).await
    }

    /// POST `{ "name": name }` to `collection` and return the created entity.
    pub async fn create(&self, collection: &str, name: &str) -> anyhow::Result<Value> {
        let (status, _headers, body) = self
            .request(
                Method::POST,
                &format!("/v1/{collection}"),
                Some(to_json_body(&json!({ "name": name }))?),
            )
            .await?;
        assert_status(status, StatusCode::CREATED, &format!("create {collection}"));
        json_body(&body)
    }

    pub async fn get(&self, collection: &str, id: &str) -> anyhow::Result<Value> {
        let (status, _headers, body) = self
            .request(Method::GET, &format!("/v1/{collection}/{id}"), None)
            .await?;
        assert_status(status, StatusCode::OK, &format!("get {collection}/{id}"));
        json_body(&body)
    }

    /// Link a doctor to a clinic and return the clinic.
    pub async fn add_doctor(&self, clinic_id: &str, doctor_id: &str) -> anyhow::Result<Value> {
        let (status, _headers, body) = self
            .request(
                Method::POST,
                &format!("/v1/clinics/doctor/{clinic_id}"),
                Some(to_json_body(&json!({ "doctorId": doctor_id }))?),
            )
            .await?;
        assert_status(status, StatusCode::OK, "add doctor to clinic");
        json_body(&body)
    }

    /// Attach a health service to a doctor and return the doctor.
    pub async fn add_health_service(
        &self,
        doctor_id: &str,
        health_service_id: &str,
    ) -> anyhow::Result<Value> {
        let (status, _headers, body) = self
            .request(
                Method::POST,
                &format!("/v1/doctors/healthService/{doctor_id}"),
                Some(to_json_body(&json!({ "healthServiceId": health_service_id }))?),
            )
            .await?;
        assert_status(status, StatusCode::OK, "add health service to doctor");
        json_body(&body)
    }
}

pub async fn with_test_app<F>(f: F) -> anyhow::Result<()>
where
    F: for<'a> FnOnce(&'a TestApp) -> TestFuture<'a>,
{
    with_test_app_with_config(|_| {}, f).await
}

pub async fn with_test_app_with_config<C, F>(configure: C, f: F) -> anyhow::Result<()>
where
    C: FnOnce(&mut Config),
    F: for<'a> FnOnce(&'a TestApp) -> TestFuture<'a>,
{
    let mut config = Config::default();
    config.database.backend = StorageBackend::Memory;
    configure(&mut config);

    let app = TestApp::new(config).await?;
    f(&app).await
}

pub fn assert_status(actual: StatusCode, expected: StatusCode, context: &str) {
    assert_eq!(actual, expected, "unexpected status for {context}");
}

pub fn to_json_body<T: Serialize>(value: &T) -> anyhow::Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub fn json_body(body: &Bytes) -> anyhow::Result<Value> {
    serde_json::from_slice(body).context("response body is not JSON")
}

/// Identifier field of an entity response.
pub fn id_of(entity: &Value) -> String {
    entity["id"].as_str().unwrap_or_default().to_string()
}

/// A set-valued field as a sorted list of ids.
pub fn ids_in(entity: &Value, field: &str) -> Vec<String> {
    let mut ids: Vec<String> = entity[field]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    ids.sort();
    ids
}

pub fn sorted<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    let mut ids: Vec<String> = ids.iter().map(|s| s.as_ref().to_string()).collect();
    ids.sort();
    ids
}

/// An id that is well-formed but not stored anywhere.
pub fn unknown_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
