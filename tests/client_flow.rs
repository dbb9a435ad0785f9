//! Integration tests for the client CRUD + activity-log flow over the HTTP
//! surface, with the storage collaborator faked in memory.

mod common;

use axum::http::StatusCode;
use common::{seeded_token, send_json, test_app, valid_client_payload, MemoryClientStore};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn create_client_while_authenticated() {
    let store = MemoryClientStore::new();
    let (app, auth) = test_app(store.clone());
    let token = seeded_token(&auth).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/v1/clients",
        Some(&token),
        Some(valid_client_payload("Maria Santos", "maria@x.com")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Maria Santos");
    assert_eq!(body["status"], "lead");
    assert_eq!(body["value"], "0");

    // The new client shows up in a fresh list().
    let (status, list) = send_json(&app, "GET", "/api/v1/clients", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["total"], 1);
    assert_eq!(list["clients"][0]["name"], "Maria Santos");

    // Exactly one client_added activity was recorded.
    let activities = store.activities();
    assert_eq!(activities.len(), 1);
    assert_eq!(activities[0].activity_type, "client_added");
    assert_eq!(
        activities[0].entity_id.map(|id| id.to_string()),
        Some(body["id"].as_str().unwrap().to_string())
    );
}

#[tokio::test]
async fn create_without_session_redirects_and_writes_nothing() {
    let store = MemoryClientStore::new();
    let (app, _auth) = test_app(store.clone());

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/v1/clients",
        None,
        Some(valid_client_payload("Maria Santos", "maria@x.com")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["redirect"], "/auth");
    assert_eq!(store.client_count(), 0);
    assert!(store.activities().is_empty());
}

#[tokio::test]
async fn invalid_email_rejected_before_any_storage_call() {
    let store = MemoryClientStore::new();
    let (app, auth) = test_app(store.clone());
    let token = seeded_token(&auth).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/v1/clients",
        Some(&token),
        Some(valid_client_payload("Maria Santos", "not-an-email")),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields = body["fields"].as_array().unwrap();
    assert!(fields.iter().any(|f| f["field"] == "email"));
    assert_eq!(store.client_count(), 0);
}

#[tokio::test]
async fn validation_reports_all_failing_fields() {
    let store = MemoryClientStore::new();
    let (app, auth) = test_app(store.clone());
    let token = seeded_token(&auth).await;

    let (status, body) = send_json(
        &app,
        "POST",
        "/api/v1/clients",
        Some(&token),
        Some(serde_json::json!({ "name": "X" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        vec!["name", "tax_id", "email", "sector", "lead_source"]
    );
}

#[tokio::test]
async fn activity_log_failure_does_not_fail_the_mutation() {
    let store = MemoryClientStore::new();
    store.fail_activity_log.store(true, Ordering::SeqCst);
    let (app, auth) = test_app(store.clone());
    let token = seeded_token(&auth).await;

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/v1/clients",
        Some(&token),
        Some(valid_client_payload("Maria Santos", "maria@x.com")),
    )
    .await;

    // Best-effort policy: the client creation still succeeds.
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(store.client_count(), 1);
    assert!(store.activities().is_empty());
}

#[tokio::test]
async fn delete_removes_client_and_records_activity() {
    let store = MemoryClientStore::new();
    let (app, auth) = test_app(store.clone());
    let token = seeded_token(&auth).await;

    let (_, created) = send_json(
        &app,
        "POST",
        "/api/v1/clients",
        Some(&token),
        Some(valid_client_payload("Maria Santos", "maria@x.com")),
    )
    .await;
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) =
        send_json(&app, "DELETE", &format!("/api/v1/clients/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, list) = send_json(&app, "GET", "/api/v1/clients", None, None).await;
    assert_eq!(list["total"], 0);

    let activities = store.activities();
    assert!(activities
        .iter()
        .any(|a| a.activity_type == "client_deleted"
            && a.entity_id.map(|e| e.to_string()) == Some(id.clone())));
}

#[tokio::test]
async fn delete_unknown_client_is_not_found() {
    let store = MemoryClientStore::new();
    let (app, _auth) = test_app(store);

    let (status, _) = send_json(
        &app,
        "DELETE",
        "/api/v1/clients/00000000-0000-0000-0000-000000000000",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_copies_fields_with_fresh_id_and_marker() {
    let store = MemoryClientStore::new();
    let (app, auth) = test_app(store.clone());
    let token = seeded_token(&auth).await;

    let (_, created) = send_json(
        &app,
        "POST",
        "/api/v1/clients",
        Some(&token),
        Some(valid_client_payload("Maria Santos", "maria@x.com")),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, copy) = send_json(
        &app,
        "POST",
        &format!("/api/v1/clients/{}/duplicate", id),
        None,
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["name"], "Maria Santos (cópia)");
    assert_ne!(copy["id"], created["id"]);
    assert_eq!(copy["email"], created["email"]);
    assert_eq!(copy["company"], created["company"]);
    assert_eq!(copy["status"], "lead");

    // Duplication is audited as a client_added mutation.
    let activities = store.activities();
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[1].activity_type, "client_added");
}

#[tokio::test]
async fn list_filters_case_insensitively() {
    let store = MemoryClientStore::new();
    let (app, auth) = test_app(store);
    let token = seeded_token(&auth).await;

    for (name, email) in [
        ("CMYK Impressão Digital", "contato@cmyk.com.br"),
        ("João Silva", "joao@empresaabc.com"),
    ] {
        send_json(
            &app,
            "POST",
            "/api/v1/clients",
            Some(&token),
            Some(valid_client_payload(name, email)),
        )
        .await;
    }

    let (_, filtered) = send_json(&app, "GET", "/api/v1/clients?q=cmyk", None, None).await;
    assert_eq!(filtered["clients"].as_array().unwrap().len(), 1);
    assert_eq!(filtered["clients"][0]["name"], "CMYK Impressão Digital");
    // Pre-filter total lets the view distinguish "no results" from "empty".
    assert_eq!(filtered["total"], 2);

    let (_, none) = send_json(&app, "GET", "/api/v1/clients?q=zzzz", None, None).await;
    assert_eq!(none["clients"].as_array().unwrap().len(), 0);
    assert_eq!(none["total"], 2);
}

#[tokio::test]
async fn dashboard_aggregates_recent_records() {
    let store = MemoryClientStore::new();
    let (app, auth) = test_app(store);
    let token = seeded_token(&auth).await;

    for i in 0..4 {
        send_json(
            &app,
            "POST",
            "/api/v1/clients",
            Some(&token),
            Some(valid_client_payload(
                &format!("Cliente {}", i),
                &format!("c{}@nexa.com", i),
            )),
        )
        .await;
    }

    let (status, body) = send_json(&app, "GET", "/api/v1/dashboard", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_clients"], 4);
    assert_eq!(body["recent_clients"].as_array().unwrap().len(), 3);
    // Newest first.
    assert_eq!(body["recent_clients"][0]["name"], "Cliente 3");
    assert_eq!(body["recent_activities"].as_array().unwrap().len(), 4);
    // Placeholder cards keep their fixed values.
    assert_eq!(body["pending_tasks"], 18);
    assert_eq!(body["signed_contracts"], 8);
    assert_eq!(body["monthly_revenue"], "R$ 42.800");
}

#[tokio::test]
async fn task_board_groups_into_four_columns() {
    let store = MemoryClientStore::new();
    let (app, _auth) = test_app(store);

    let (status, body) = send_json(&app, "GET", "/api/v1/tasks/board", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let columns = body.as_array().unwrap();
    assert_eq!(columns.len(), 4);
    assert_eq!(columns[0]["status"], "ready");
    assert_eq!(columns[1]["status"], "working");
    assert_eq!(columns[2]["status"], "done");
    assert_eq!(columns[3]["status"], "stuck");
}

#[tokio::test]
async fn navigation_tabs_are_static() {
    let store = MemoryClientStore::new();
    let (app, _auth) = test_app(store);

    let (status, body) = send_json(&app, "GET", "/api/v1/navigation/tabs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["tabs"],
        serde_json::json!(["dashboard", "tasks", "crm", "contracts", "reports"])
    );
    assert_eq!(body["login"], "/auth");
}
