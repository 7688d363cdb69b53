use crate::support::*;
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn clinic_create_read_update_delete() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let clinic = app.create("clinics", "  Central Clinic  ").await?;
            let id = id_of(&clinic);
            assert_eq!(clinic["name"], "Central Clinic");
            assert_eq!(clinic["doctors"], json!([]));
            assert_eq!(clinic["healthServices"], json!([]));
            assert!(clinic.get("createdAt").is_some());

            let fetched = app.get("clinics", &id).await?;
            assert_eq!(fetched["id"], clinic["id"]);

            let (status, _headers, body) = app
                .request(
                    Method::PATCH,
                    &format!("/v1/clinics/{id}"),
                    Some(to_json_body(&json!({ "name": "North Clinic" }))?),
                )
                .await?;
            assert_status(status, StatusCode::OK, "update clinic");
            assert_eq!(json_body(&body)?["name"], "North Clinic");

            let (status, _headers, body) = app
                .request(Method::DELETE, &format!("/v1/clinics/{id}"), None)
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "delete clinic");
            assert!(body.is_empty());

            let (status, _headers, body) = app
                .request(Method::GET, &format!("/v1/clinics/{id}"), None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "get deleted clinic");
            let error = json_body(&body)?;
            assert_eq!(error["code"], 404);
            assert_eq!(error["message"], "Clinic not found");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn clinic_create_rejects_bad_bodies() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for (body, label) in [
                (json!({}), "missing name"),
                (json!({ "name": "   " }), "blank name"),
                (json!({ "name": 42 }), "non-string name"),
                (json!({ "name": "A", "doctors": [] }), "relationship field"),
            ] {
                let (status, _headers, body) = app
                    .request(Method::POST, "/v1/clinics", Some(to_json_body(&body)?))
                    .await?;
                assert_status(status, StatusCode::BAD_REQUEST, label);
                assert_eq!(json_body(&body)?["code"], 400);
            }

            let (status, _headers, _body) = app
                .request(Method::POST, "/v1/clinics", Some(b"{not json".to_vec()))
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "malformed json");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn clinic_ids_are_validated_before_lookup() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let (status, _headers, _body) = app
                .request(Method::GET, "/v1/clinics/not-an-id", None)
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "malformed clinic id");

            let missing = unknown_id();
            for method in [Method::GET, Method::DELETE] {
                let (status, _headers, _body) = app
                    .request(method.clone(), &format!("/v1/clinics/{missing}"), None)
                    .await?;
                assert_status(status, StatusCode::NOT_FOUND, method.as_str());
            }

            let (status, _headers, _body) = app
                .request(
                    Method::PATCH,
                    &format!("/v1/clinics/{missing}"),
                    Some(to_json_body(&json!({ "name": "Ghost" }))?),
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "update missing clinic");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn clinic_list_paginates_and_filters() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for name in ["Charlie", "Alpha", "Bravo"] {
                app.create("clinics", name).await?;
            }

            let (status, _headers, body) = app
                .request(Method::GET, "/v1/clinics?sortBy=name:asc&limit=2", None)
                .await?;
            assert_status(status, StatusCode::OK, "list clinics");
            let page = json_body(&body)?;
            assert_eq!(page["page"], 1);
            assert_eq!(page["limit"], 2);
            assert_eq!(page["totalResults"], 3);
            assert_eq!(page["totalPages"], 2);
            let names: Vec<&str> = page["results"]
                .as_array()
                .map(|r| r.iter().filter_map(|c| c["name"].as_str()).collect())
                .unwrap_or_default();
            assert_eq!(names, ["Alpha", "Bravo"]);

            let (_status, _headers, body) = app
                .request(Method::GET, "/v1/clinics?sortBy=name:desc&limit=2&page=2", None)
                .await?;
            let page = json_body(&body)?;
            assert_eq!(page["results"].as_array().map(Vec::len), Some(1));
            assert_eq!(page["results"][0]["name"], "Alpha");

            let (_status, _headers, body) = app
                .request(Method::GET, "/v1/clinics?name=Bravo", None)
                .await?;
            let page = json_body(&body)?;
            assert_eq!(page["totalResults"], 1);
            assert_eq!(page["results"][0]["name"], "Bravo");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn clinic_list_rejects_bad_query_parameters() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            for (uri, label) in [
                ("/v1/clinics?limit=0", "zero limit"),
                ("/v1/clinics?limit=101", "limit above max"),
                ("/v1/clinics?page=0", "zero page"),
                ("/v1/clinics?sortBy=doctors", "unsortable field"),
                ("/v1/clinics?sortBy=name:sideways", "bad direction"),
                ("/v1/clinics?doctors=xyz", "malformed id filter"),
                ("/v1/clinics?colour=blue", "unknown parameter"),
            ] {
                let (status, _headers, _body) = app.request(Method::GET, uri, None).await?;
                assert_status(status, StatusCode::BAD_REQUEST, label);
            }
            Ok(())
        })
    })
    .await
}
