mod common;

use axum::http::{Method, StatusCode};
use common::spawn;
use jiff::Timestamp;
use jiff::civil::date;
use psyscale_core::models::{Patient, ScaleRequest};
use psyscale_server::routes::patients::{order_patients, search};
use serde_json::json;
use uuid::Uuid;

fn patient(name: &str) -> Patient {
    Patient {
        id: Uuid::new_v4(),
        full_name: name.to_string(),
        gender: None,
        birthday: date(2000, 1, 1),
        started_at: None,
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        cpf: "12345678901".to_string(),
        rg: None,
        phone: None,
        address: None,
        deleted_at: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

fn pending_at(patient: &Patient, second: i64) -> ScaleRequest {
    ScaleRequest::new(
        patient.id,
        Uuid::new_v4(),
        Uuid::new_v4(),
        "PSA",
        None,
        Timestamp::from_second(second).unwrap(),
    )
}

#[test]
fn index_puts_recent_pending_requests_first() {
    let ana = patient("Ana Souza");
    let bruno = patient("Bruno Lima");
    let carla = patient("Carla Dias");
    let davi = patient("Davi Rocha");

    let mut cancelled = pending_at(&ana, 900);
    cancelled.cancel(Timestamp::from_second(901).unwrap());
    let requests = vec![
        pending_at(&carla, 100),
        pending_at(&davi, 500),
        pending_at(&davi, 50),
        cancelled,
    ];

    let ordered = order_patients(
        vec![ana.clone(), bruno.clone(), carla.clone(), davi.clone()],
        &requests,
    );
    let names: Vec<&str> = ordered.iter().map(|i| i.patient.full_name.as_str()).collect();
    assert_eq!(names, ["Davi Rocha", "Carla Dias", "Ana Souza", "Bruno Lima"]);
    assert_eq!(ordered[0].pending_requests, 2);
    assert_eq!(ordered[0].latest_pending_at, Timestamp::from_second(500).ok());
    assert_eq!(ordered[2].pending_requests, 0);
}

#[test]
fn search_is_case_insensitive_limited_and_sorted() {
    let mut patients: Vec<Patient> = (0..12)
        .map(|n| patient(&format!("Paciente Silva {n:02}")))
        .collect();
    patients.push(patient("Outra Pessoa"));
    patients.reverse();

    let hits = search(patients.clone(), Some("  SILVA "));
    assert_eq!(hits.len(), 10);
    assert_eq!(hits[0].text, "Paciente Silva 00");
    assert_eq!(hits[9].text, "Paciente Silva 09");

    let all = search(patients.clone(), None);
    assert_eq!(all.len(), 10);
    assert_eq!(all[0].text, "Outra Pessoa");

    assert!(search(patients, Some("xyz")).is_empty());
}

#[tokio::test]
async fn patient_crud_and_soft_delete() {
    let app = spawn().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .post(
            "/patients",
            &admin,
            json!({
                "full_name": "Ana",
                "birthday": "1990-01-01",
                "email": "not-an-email",
                "cpf": "123",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("cpf must have exactly 11 digits"));
    assert!(error.contains("email is invalid"));
    assert!(error.contains("full_name must have at least 5 characters"));

    let id = app
        .patient(&admin, "Marina Costa", "marina@example.com", "10120230344", "female")
        .await;

    let (status, _) = app
        .post(
            "/patients",
            &admin,
            json!({
                "full_name": "Marina Costa Duplicada",
                "birthday": "1990-01-01",
                "email": "MARINA@example.com",
                "cpf": "10120230344",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let uri = format!("/patients/{id}");
    let (status, _) = app
        .call(
            Method::PUT,
            &uri,
            Some(&admin),
            Some(json!({
                "full_name": "Marina Costa Reis",
                "gender": "female",
                "birthday": "1995-03-10",
                "email": "marina.reis@example.com",
                "cpf": "10120230344",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The login follows the new address.
    let token = app.token("marina.reis@example.com", "101202").await;
    let (status, me) = app.get(&uri, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["full_name"], "Marina Costa Reis");

    let (status, _) = app.call(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get(&uri, &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, restored) = app
        .call(Method::PATCH, &format!("{uri}/restore"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(restored["deleted_at"].is_null());
    let (status, _) = app.get(&uri, &admin).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn patients_only_see_themselves() {
    let app = spawn().await;
    let admin = app.admin_token().await;
    let own = app
        .patient(&admin, "Paulo Mendes", "paulo@example.com", "20230340455", "male")
        .await;
    let other = app
        .patient(&admin, "Lara Vieira", "lara@example.com", "30340450566", "female")
        .await;
    let token = app.token("paulo@example.com", "202303").await;

    let (status, _) = app.get(&format!("/patients/{own}"), &token).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get(&format!("/patients/{other}"), &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.get("/patients", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/professionals", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/scales", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/dashboard/professionals", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get("/dashboard", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["redirect"], "/dashboard/patients");

    let (status, list) = app.get("/scale_requests", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["pending_count"], 0);
}

#[tokio::test]
async fn scales_are_seeded_and_listed_by_name() {
    let app = spawn().await;
    let admin = app.admin_token().await;

    let (status, scales) = app.get("/scales", &admin).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = scales
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert_eq!(names.len(), 5);

    let (status, srs2) = app.get("/scales/SRS2HR", &admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(srs2["items"].as_array().unwrap().len(), 65);

    let (status, _) = app.get("/scales/NOPE", &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn professionals_list_carries_request_counts() {
    let app = spawn().await;
    let (pro_id, pro) = app
        .professional("Otávio Ramos", "otavio@clinica.com", "40450560677")
        .await;
    let patient_id = app
        .patient(&pro, "Gabriela Nunes", "gabi@example.com", "50560670788", "female")
        .await;
    app.request_scale(&pro, &patient_id, "PSA").await;
    app.request_scale(&pro, &patient_id, "BDI").await;

    let (status, list) = app.get("/professionals", &pro).await;
    assert_eq!(status, StatusCode::OK);
    let entry = list
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == pro_id.as_str())
        .unwrap();
    assert_eq!(entry["pending_requests"], 2);
    assert_eq!(entry["completed_requests"], 0);

    let (status, index) = app.get("/patients", &pro).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(index[0]["id"], patient_id.as_str());
    assert_eq!(index[0]["pending_requests"], 2);
}

#[tokio::test]
async fn deleting_an_account_removes_its_login_until_restored() {
    let app = spawn().await;
    let admin = app.admin_token().await;

    let id = app
        .patient(&admin, "Helena Prado", "helena@example.com", "90980870766", "female")
        .await;
    let token = app.token("helena@example.com", "909808").await;
    let uri = format!("/patients/{id}");

    let (status, _) = app.call(Method::DELETE, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.login("helena@example.com", "909808").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/scale_requests", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(Method::PATCH, &format!("{uri}/restore"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = app.token("helena@example.com", "909808").await;
    let (status, _) = app.get(&uri, &token).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn deleting_a_professional_removes_login_and_requests() {
    let app = spawn().await;
    let admin = app.admin_token().await;
    let (pro_id, pro) = app
        .professional("Otávio Lima", "otavio@clinica.com", "12312312312")
        .await;
    let patient_id = app
        .patient(&pro, "Clara Nunes", "clara@example.com", "45645645645", "female")
        .await;
    app.request_scale(&pro, &patient_id, "BDI").await;

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/professionals/{pro_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.login("otavio@clinica.com", "nova-senha").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app.get("/patients", &pro).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, list) = app.get("/scale_requests", &admin).await;
    assert_eq!(list["pending_count"], 0);

    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/professionals/{pro_id}/restore"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    app.token("otavio@clinica.com", "nova-senha").await;
}

#[tokio::test]
async fn restore_refuses_an_email_taken_meanwhile() {
    let app = spawn().await;
    let admin = app.admin_token().await;

    let id = app
        .patient(&admin, "Rita Moraes", "rita@example.com", "32132132132", "female")
        .await;
    let (status, _) = app
        .call(Method::DELETE, &format!("/patients/{id}"), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // A deleted login frees its address.
    app.patient(&admin, "Rita Moraes Filha", "rita@example.com", "65465465465", "female")
        .await;

    let (status, body) = app
        .call(
            Method::PATCH,
            &format!("/patients/{id}/restore"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    let (status, _) = app.get(&format!("/patients/{id}"), &admin).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
