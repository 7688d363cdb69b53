//! Cross-entity consistency: links are mirrored on both sides, clinic health
//! services follow their doctors, and deletes leave no dangling ids.

use crate::support::*;
use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

async fn remove_doctor(app: &TestApp, clinic_id: &str, doctor_id: &str) -> anyhow::Result<Value> {
    let (status, _headers, body) = app
        .request(
            Method::DELETE,
            &format!("/v1/clinics/doctor/{clinic_id}"),
            Some(to_json_body(&json!({ "doctorId": doctor_id }))?),
        )
        .await?;
    assert_status(status, StatusCode::OK, "remove doctor from clinic");
    json_body(&body)
}

async fn remove_health_service(
    app: &TestApp,
    doctor_id: &str,
    health_service_id: &str,
) -> anyhow::Result<Value> {
    let (status, _headers, body) = app
        .request(
            Method::DELETE,
            &format!("/v1/doctors/healthService/{doctor_id}"),
            Some(to_json_body(&json!({ "healthServiceId": health_service_id }))?),
        )
        .await?;
    assert_status(status, StatusCode::OK, "remove health service from doctor");
    json_body(&body)
}

#[tokio::test]
async fn adding_a_doctor_mirrors_membership_and_services() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let h1 = id_of(&app.create("healthServices", "H1").await?);
            let h2 = id_of(&app.create("healthServices", "H2").await?);
            let d1 = id_of(&app.create("doctors", "D1").await?);
            let c1 = id_of(&app.create("clinics", "C1").await?);
            app.add_health_service(&d1, &h1).await?;
            app.add_health_service(&d1, &h2).await?;

            let clinic = app.add_doctor(&c1, &d1).await?;
            assert_eq!(ids_in(&clinic, "doctors"), sorted(&[&d1]));
            assert_eq!(ids_in(&clinic, "healthServices"), sorted(&[&h1, &h2]));

            let doctor = app.get("doctors", &d1).await?;
            assert_eq!(ids_in(&doctor, "clinics"), sorted(&[&c1]));

            // Linking twice changes nothing.
            let clinic = app.add_doctor(&c1, &d1).await?;
            assert_eq!(ids_in(&clinic, "doctors"), sorted(&[&d1]));
            let doctor = app.get("doctors", &d1).await?;
            assert_eq!(ids_in(&doctor, "clinics"), sorted(&[&c1]));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn doctor_services_propagate_to_all_their_clinics() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let h1 = id_of(&app.create("healthServices", "H1").await?);
            let d1 = id_of(&app.create("doctors", "D1").await?);
            let c1 = id_of(&app.create("clinics", "C1").await?);
            let c2 = id_of(&app.create("clinics", "C2").await?);
            let c3 = id_of(&app.create("clinics", "C3").await?);
            app.add_doctor(&c1, &d1).await?;
            app.add_doctor(&c2, &d1).await?;

            let doctor = app.add_health_service(&d1, &h1).await?;
            assert_eq!(ids_in(&doctor, "healthServices"), sorted(&[&h1]));

            for clinic in [&c1, &c2] {
                let clinic = app.get("clinics", clinic).await?;
                assert_eq!(ids_in(&clinic, "healthServices"), sorted(&[&h1]));
            }
            let unrelated = app.get("clinics", &c3).await?;
            assert_eq!(unrelated["healthServices"], json!([]));

            let doctor = remove_health_service(app, &d1, &h1).await?;
            assert_eq!(doctor["healthServices"], json!([]));
            for clinic in [&c1, &c2] {
                let clinic = app.get("clinics", clinic).await?;
                assert_eq!(clinic["healthServices"], json!([]));
            }

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn removing_a_doctor_keeps_services_of_colleagues() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let shared = id_of(&app.create("healthServices", "Shared").await?);
            let own = id_of(&app.create("healthServices", "Own").await?);
            let d1 = id_of(&app.create("doctors", "D1").await?);
            let d2 = id_of(&app.create("doctors", "D2").await?);
            let c1 = id_of(&app.create("clinics", "C1").await?);
            app.add_health_service(&d1, &shared).await?;
            app.add_health_service(&d1, &own).await?;
            app.add_health_service(&d2, &shared).await?;
            app.add_doctor(&c1, &d1).await?;
            app.add_doctor(&c1, &d2).await?;

            let clinic = remove_doctor(app, &c1, &d1).await?;
            assert_eq!(ids_in(&clinic, "doctors"), sorted(&[&d2]));
            assert_eq!(ids_in(&clinic, "healthServices"), sorted(&[&shared]));

            let doctor = app.get("doctors", &d1).await?;
            assert_eq!(doctor["clinics"], json!([]));
            // The doctor keeps the services they provide.
            assert_eq!(ids_in(&doctor, "healthServices"), sorted(&[&own, &shared]));

            // Removing a doctor who is not linked is a no-op.
            let clinic = remove_doctor(app, &c1, &d1).await?;
            assert_eq!(ids_in(&clinic, "doctors"), sorted(&[&d2]));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn recompute_rebuilds_clinic_services() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let h1 = id_of(&app.create("healthServices", "H1").await?);
            let d1 = id_of(&app.create("doctors", "D1").await?);
            let c1 = id_of(&app.create("clinics", "C1").await?);
            app.add_health_service(&d1, &h1).await?;
            app.add_doctor(&c1, &d1).await?;

            let uri = format!("/v1/clinics/{c1}/healthServices/recompute");
            let (status, _headers, body) = app.request(Method::POST, &uri, None).await?;
            assert_status(status, StatusCode::OK, "recompute");
            let first = json_body(&body)?;
            assert_eq!(ids_in(&first, "healthServices"), sorted(&[&h1]));

            let (_status, _headers, body) = app.request(Method::POST, &uri, None).await?;
            assert_eq!(json_body(&body)?, first);

            let (status, _headers, _body) = app
                .request(
                    Method::POST,
                    &format!("/v1/clinics/{}/healthServices/recompute", unknown_id()),
                    None,
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "recompute unknown clinic");

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn deleting_a_clinic_detaches_its_doctors() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let d1 = id_of(&app.create("doctors", "D1").await?);
            let c1 = id_of(&app.create("clinics", "C1").await?);
            let c2 = id_of(&app.create("clinics", "C2").await?);
            app.add_doctor(&c1, &d1).await?;
            app.add_doctor(&c2, &d1).await?;

            let (status, _headers, _body) = app
                .request(Method::DELETE, &format!("/v1/clinics/{c1}"), None)
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "delete clinic");

            let doctor = app.get("doctors", &d1).await?;
            assert_eq!(ids_in(&doctor, "clinics"), sorted(&[&c2]));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn deleting_a_doctor_updates_their_clinics() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let h1 = id_of(&app.create("healthServices", "H1").await?);
            let h2 = id_of(&app.create("healthServices", "H2").await?);
            let d1 = id_of(&app.create("doctors", "D1").await?);
            let d2 = id_of(&app.create("doctors", "D2").await?);
            let c1 = id_of(&app.create("clinics", "C1").await?);
            app.add_health_service(&d1, &h1).await?;
            app.add_health_service(&d2, &h2).await?;
            app.add_doctor(&c1, &d1).await?;
            app.add_doctor(&c1, &d2).await?;

            let (status, _headers, _body) = app
                .request(Method::DELETE, &format!("/v1/doctors/{d1}"), None)
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "delete doctor");

            let clinic = app.get("clinics", &c1).await?;
            assert_eq!(ids_in(&clinic, "doctors"), sorted(&[&d2]));
            assert_eq!(ids_in(&clinic, "healthServices"), sorted(&[&h2]));

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn deleting_a_health_service_purges_every_reference() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let h1 = id_of(&app.create("healthServices", "H1").await?);
            let h2 = id_of(&app.create("healthServices", "H2").await?);
            let d1 = id_of(&app.create("doctors", "D1").await?);
            let c1 = id_of(&app.create("clinics", "C1").await?);
            app.add_health_service(&d1, &h1).await?;
            app.add_health_service(&d1, &h2).await?;
            app.add_doctor(&c1, &d1).await?;

            let (status, _headers, _body) = app
                .request(Method::DELETE, &format!("/v1/healthServices/{h1}"), None)
                .await?;
            assert_status(status, StatusCode::NO_CONTENT, "delete health service");

            let doctor = app.get("doctors", &d1).await?;
            assert_eq!(ids_in(&doctor, "healthServices"), sorted(&[&h2]));
            let clinic = app.get("clinics", &c1).await?;
            assert_eq!(ids_in(&clinic, "healthServices"), sorted(&[&h2]));

            let (_status, _headers, body) = app
                .request(Method::GET, &format!("/v1/clinics?healthServices={h1}"), None)
                .await?;
            assert_eq!(json_body(&body)?["totalResults"], 0);

            Ok(())
        })
    })
    .await
}

#[tokio::test]
async fn link_requests_with_unknown_ids_change_nothing() -> anyhow::Result<()> {
    with_test_app(|app| {
        Box::pin(async move {
            let d1 = id_of(&app.create("doctors", "D1").await?);
            let c1 = id_of(&app.create("clinics", "C1").await?);

            let (status, _headers, body) = app
                .request(
                    Method::POST,
                    &format!("/v1/clinics/doctor/{c1}"),
                    Some(to_json_body(&json!({ "doctorId": unknown_id() }))?),
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "unknown doctor");
            assert_eq!(json_body(&body)?["message"], "Doctor not found");

            let (status, _headers, body) = app
                .request(
                    Method::POST,
                    &format!("/v1/clinics/doctor/{}", unknown_id()),
                    Some(to_json_body(&json!({ "doctorId": d1 }))?),
                )
                .await?;
            assert_status(status, StatusCode::NOT_FOUND, "unknown clinic");
            assert_eq!(json_body(&body)?["message"], "Clinic not found");

            let doctor = app.get("doctors", &d1).await?;
            assert_eq!(doctor["clinics"], json!([]));
            let clinic = app.get("clinics", &c1).await?;
            assert_eq!(clinic["doctors"], json!([]));

            Ok(())
        })
    })
    .await
}
