use crate::support::*;
use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn doctor_create_read_update_delete() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let doctor = app.create("doctors", "Dr. Kovalenko").await?;
            let id = id_of(&doctor);
            assert_eq!(doctor["clinics"], json!([]));
            assert_eq!(doctor["healthServices"], json!([]));

            let (status, _headers, body) = app
                .request(
                    Method::PATCH,
                    &format!("/v1/doctors/{id}"),
                    Some(to_json_body(&json!({ "name": "Dr. Shevchenko" }))?),
                )
                .await?;
            assert_status(status, StatusCode::OK, "rename doctor");
            assert_eq!(json_body(&body)?["name"], "Dr. Shevchenko");

            let (status, _headers, _body) = app
                .request(
                    Method::PATCH,
                    &format!("/v1/doctors/{id}"),
                    Some(to_json_body(&json!({ "clinics": [] }))?),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "patch relationship set");

            let (status, _headers, _body) = app
                .request(Method::DELETE, &format!("/v1/doctors/{id}"), None)
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "delete doctor");

            let (status, _headers, body) = app
                .request(Method::GET, &format!("/v1/doctors/{id}"), None)
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "get deleted doctor");
            assert_eq!(json_body(&body)?["message"], "Doctor not found");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn doctor_list_filters_by_membership() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let clinic = app.create("clinics", "Central").await?;
            let hs = app.create("healthServices", "Cardiology").await?;
            let d1 = app.create("doctors", "Dr. One").await?;
            let d2 = app.create("doctors", "Dr. Two").await?;
            app.create("doctors", "Dr. Three").await?;

            app.add_doctor(&id_of(&clinic), &id_of(&d1)).await?;
            app.add_health_service(&id_of(&d2), &id_of(&hs)).await?;

            let (status, _headers, body) = app
                .request(
                    Method::GET,
                    &format!("/v1/doctors?clinics={}", id_of(&clinic)),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::OK, "doctors by clinic");
            let page = json_body(&body)?;
            assert_eq!(page["totalResults"], 1);
            assert_eq!(page["results"][0]["id"], d1["id"]);

            let (_status, _headers, body) = app
                .request(
                    Method::GET,
                    &format!("/v1/doctors?healthServices={}", id_of(&hs)),
                    None,
                )
                .await?;
            let page = json_body(&body)?;
            assert_eq!(page["totalResults"], 1);
            assert_eq!(page["results"][0]["id"], d2["id"]);

            let (_status, _headers, body) = app.request(Method::GET, "/v1/doctors", None).await?;
            let page = json_body(&body)?;
            assert_eq!(page["totalResults"], 3);
            assert_eq!(page["limit"], 10);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn health_service_link_requires_existing_entities() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let doctor = app.create("doctors", "Dr. One").await?;
            let hs = app.create("healthServices", "Dermatology").await?;
            let uri = format!("/v1/doctors/healthService/{}", id_of(&doctor));

            let (status, _headers, body) = app
                .request(
                    Method::POST,
                    &uri,
                    Some(to_json_body(&json!({ "healthServiceId": unknown_id() }))?),
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "unknown health service");
            assert_eq!(json_body(&body)?["message"], "HealthService not found");

            let (status, _headers, _body) = app
                .request(
                    Method::POST,
                    &format!("/v1/doctors/healthService/{}", unknown_id()),
                    Some(to_json_body(&json!({ "healthServiceId": id_of(&hs) }))?),
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "unknown doctor");

            let (status, _headers, _body) = app
                .request(
                    Method::POST,
                    &uri,
                    Some(to_json_body(&json!({ "healthServiceId": "nope" }))?),
                )
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "malformed health service id");

            let (status, _headers, _body) = app
                .request(Method::POST, &uri, Some(to_json_body(&json!({}))?))
                .await?;
            assert_status(status, StatusCode::BAD_REQUEST, "missing health service id");

            // Nothing was linked by the failed attempts.
            let doctor = app.get("doctors", &id_of(&doctor)).await?;
            assert_eq!(doctor["healthServices"], json!([]));

            Ok(())
        })
    })
    .await
}
