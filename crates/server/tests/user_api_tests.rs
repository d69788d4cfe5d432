//! Integration tests for wallet identity and profile endpoints.

mod common;

use axum::http::StatusCode;
use common::TestServer;
use common::fixtures::{MultipartForm, mp4_bytes, png_bytes};
use gallery_storage::PermanentStore;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_connect_creates_then_reuses() {
    let server = TestServer::new().await;

    let (status, body) = server
        .json(
            "POST",
            "/api/users/connect",
            Some(json!({ "wallet_address": "0xfirst" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "New user created successfully");
    assert_eq!(body["is_new_user"], true);
    assert_eq!(body["user"]["wallet_address"], "0xfirst");
    assert_eq!(body["user"]["artwork_count"], 0);
    assert!(body["user"]["username"].is_null());
    let id = body["user"]["id"].clone();

    let (status, body) = server
        .json(
            "POST",
            "/api/users/connect",
            Some(json!({ "wallet_address": "  0xfirst  " })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Wallet connected successfully");
    assert_eq!(body["is_new_user"], false);
    assert_eq!(body["user"]["id"], id);

    let (_, users) = server.json("GET", "/api/users", None).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_connect_requires_wallet() {
    let server = TestServer::new().await;

    let (status, body) = server
        .json("POST", "/api/users/connect", Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "missing_field");

    let (status, _) = server
        .json(
            "POST",
            "/api/users/connect",
            Some(json!({ "wallet_address": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_concurrent_connects_create_one_user() {
    let server = Arc::new(TestServer::new().await);

    let mut handles = Vec::new();
    for _ in 0..8 {
        let server = server.clone();
        handles.push(tokio::spawn(async move {
            server.connect("0xrace").await
        }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }
    ids.dedup();
    assert_eq!(ids.len(), 1);

    let (_, users) = server.json("GET", "/api/users", None).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_lookup_by_wallet() {
    let server = TestServer::new().await;
    let id = server.connect("0xlookup").await;

    let (status, body) = server
        .json("GET", "/api/users/wallet/0xlookup", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);

    let (status, body) = server
        .json("GET", "/api/users/wallet/0xnobody", None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_profile_update_partial_and_clear() {
    let server = TestServer::new().await;
    let id = server.connect("0xprofile").await;
    let uri = format!("/api/users/{id}/profile");

    let (status, body) = server
        .json(
            "PUT",
            &uri,
            Some(json!({
                "username": "  painter  ",
                "bio": "Oil and pixels",
                "x_handle": "@painter"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Profile updated successfully");
    assert_eq!(body["user"]["username"], "painter");
    assert_eq!(body["user"]["bio"], "Oil and pixels");

    // Absent fields stay, null clears.
    let (status, body) = server
        .json("PUT", &uri, Some(json!({ "bio": null })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user"]["bio"].is_null());
    assert_eq!(body["user"]["username"], "painter");
    assert_eq!(body["user"]["x_handle"], "@painter");

    let (status, body) = server
        .json("PUT", "/api/users/9999/profile", Some(json!({ "bio": "ghost" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND, "{body}");
}

#[tokio::test]
async fn test_username_taken_is_rejected() {
    let server = TestServer::new().await;
    let alice = server.connect("0xalice").await;
    let bob = server.connect("0xbob").await;

    let (status, _) = server
        .json(
            "PUT",
            &format!("/api/users/{alice}/profile"),
            Some(json!({ "username": "alice" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server
        .json(
            "PUT",
            &format!("/api/users/{bob}/profile"),
            Some(json!({ "username": "alice", "bio": "imposter" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "username_taken");

    // Rejected updates change nothing.
    let (_, body) = server
        .json("GET", &format!("/api/users/{bob}"), None)
        .await;
    assert!(body["username"].is_null());
    assert!(body["bio"].is_null());
}

#[tokio::test]
async fn test_concurrent_username_claims_have_one_winner() {
    let server = Arc::new(TestServer::new().await);
    let mut ids = Vec::new();
    for i in 0..6 {
        ids.push(server.connect(&format!("0xclaim{i}")).await);
    }

    let mut handles = Vec::new();
    for id in ids {
        let server = server.clone();
        handles.push(tokio::spawn(async move {
            let (status, _) = server
                .json(
                    "PUT",
                    &format!("/api/users/{id}/profile"),
                    Some(json!({ "username": "coveted" })),
                )
                .await;
            status
        }));
    }

    let mut winners = 0;
    for handle in handles {
        let status = handle.await.unwrap();
        if status == StatusCode::OK {
            winners += 1;
        } else {
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn test_check_username() {
    let server = TestServer::new().await;
    let id = server.connect("0xcheck").await;
    server
        .json(
            "PUT",
            &format!("/api/users/{id}/profile"),
            Some(json!({ "username": "taken" })),
        )
        .await;

    let (status, body) = server
        .json("GET", "/api/users/check-username/taken", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["available"], false);
    assert_eq!(body["username"], "taken");

    let (_, body) = server
        .json("GET", "/api/users/check-username/free", None)
        .await;
    assert_eq!(body["available"], true);
}

#[tokio::test]
async fn test_user_detail_lists_artworks_and_counts() {
    let server = TestServer::new().await;
    let id = server.connect("0xdetail").await;
    server
        .upload_ok(MultipartForm::artwork("One", id, "1.png", &png_bytes(8, 8)))
        .await;
    server
        .upload_ok(MultipartForm::artwork("Two", id, "2.mp4", &mp4_bytes()))
        .await;

    let (status, body) = server.json("GET", &format!("/api/users/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["artwork_count"], 2);
    let artworks = body["artworks"].as_array().unwrap();
    assert_eq!(artworks.len(), 2);
    assert_eq!(artworks[0]["title"], "Two");

    let (_, users) = server.json("GET", "/api/users", None).await;
    assert_eq!(users[0]["artwork_count"], 2);

    let (status, body) = server.json("GET", "/api/users/424242", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn test_delete_user_cascades_to_catalog_only() {
    let server = TestServer::new().await;
    let id = server.connect("0xleaving").await;
    let first = server
        .upload_ok(MultipartForm::artwork("First", id, "f.png", &png_bytes(8, 8)))
        .await;
    let second = server
        .upload_ok(MultipartForm::artwork("Second", id, "s.mp4", &mp4_bytes()))
        .await;

    let (status, body) = server
        .json("DELETE", &format!("/api/users/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    for artwork in [&first, &second] {
        let (status, _) = server
            .json("GET", &format!("/api/artworks/{}", artwork["id"]), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let storage_id = artwork["storage_id"].as_str().unwrap();
        assert!(server.storage.get(storage_id).await.is_ok());
    }
    assert_eq!(server.storage.delete_count().await, 0);

    let (status, _) = server
        .json("GET", &format!("/api/users/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = server
        .json("DELETE", &format!("/api/users/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The wallet can come back as a brand new user.
    let (status, body) = server
        .json(
            "POST",
            "/api/users/connect",
            Some(json!({ "wallet_address": "0xleaving" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(body["user"]["id"], id);
}

#[tokio::test]
async fn test_connect_without_json_gets_error_body() {
    let server = TestServer::new().await;

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/users/connect")
        .body(axum::body::Body::from("wallet_address=0xform"))
        .unwrap();
    let (status, body) = common::decode(server.send(request).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");

    let (status, body) = server.json("GET", "/api/users/not-a-number", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}
