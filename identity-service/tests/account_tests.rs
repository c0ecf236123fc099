mod common;

use common::access_token;
use common::TestApp;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_profile_requires_token() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/api/v1/users/profile")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["code"], "MISSING_TOKEN");

    let response = app
        .get_authenticated("/api/v1/users/profile", "not-a-token")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_get_profile() {
    let app = TestApp::spawn().await;
    let tokens = app
        .register_and_login("ada@example.com", "+15550100", "pAssword1!_")
        .await;

    let response = app
        .get_authenticated("/api/v1/users/profile", &access_token(&tokens))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["email"], "ada@example.com");
    assert_eq!(body["data"]["first_name"], "Ada");
    assert_eq!(body["data"]["phone_number"], "+15550100");
    assert_eq!(body["data"]["date_of_birth"], "1990-12-10");
    assert_eq!(body["data"]["roles"], json!(["ROLE_USER"]));
    assert!(body["data"].get("secret_hash").is_none());
}

#[tokio::test]
async fn test_deactivated_account_cannot_log_in() {
    let app = TestApp::spawn().await;
    let tokens = app
        .register_and_login("ada@example.com", "+15550100", "pAssword1!_")
        .await;

    let response = app
        .patch_authenticated("/api/v1/users/profile/deactivate", &access_token(&tokens))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.login("ada@example.com", "pAssword1!_").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["code"], "ERR_USER_DISABLED");
    assert_eq!(
        body["data"]["message"],
        "This account is disabled. Please contact support"
    );
}

#[tokio::test]
async fn test_deactivate_twice_and_reactivate() {
    let app = TestApp::spawn().await;
    let tokens = app
        .register_and_login("ada@example.com", "+15550100", "pAssword1!_")
        .await;
    let token = access_token(&tokens);

    let response = app
        .patch_authenticated("/api/v1/users/profile/reactivate", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["code"], "ACCOUNT_ALREADY_ACTIVATED");

    app.patch_authenticated("/api/v1/users/profile/deactivate", &token)
        .send()
        .await
        .expect("Failed to execute request");

    let response = app
        .patch_authenticated("/api/v1/users/profile/deactivate", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["code"], "ACCOUNT_ALREADY_DEACTIVATED");

    // A disabled account still resolves from its token and can come back
    let response = app
        .patch_authenticated("/api/v1/users/profile/reactivate", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.login("ada@example.com", "pAssword1!_").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::spawn().await;
    let tokens = app
        .register_and_login("ada@example.com", "+15550100", "pAssword1!_")
        .await;

    let response = app
        .post_authenticated("/api/v1/users/profile/password", &access_token(&tokens))
        .json(&json!({
            "current_password": "pAssword1!_",
            "new_password": "n3w-Secret!",
            "confirm_new_password": "n3w-Secret!"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.login("ada@example.com", "pAssword1!_").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.login("ada@example.com", "n3w-Secret!").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_rejections() {
    let app = TestApp::spawn().await;
    let tokens = app
        .register_and_login("ada@example.com", "+15550100", "pAssword1!_")
        .await;
    let token = access_token(&tokens);
    let original_hash = app.accounts.by_email("ada@example.com").unwrap().secret_hash;

    let response = app
        .post_authenticated("/api/v1/users/profile/password", &token)
        .json(&json!({
            "current_password": "pAssword1!_",
            "new_password": "n3w-Secret!",
            "confirm_new_password": "different"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["code"], "PASSWORD_MISMATCH");

    let response = app
        .post_authenticated("/api/v1/users/profile/password", &token)
        .json(&json!({
            "current_password": "guess",
            "new_password": "n3w-Secret!",
            "confirm_new_password": "n3w-Secret!"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["code"], "INVALID_CURRENT_PASSWORD");

    let response = app
        .post_authenticated("/api/v1/users/profile/password", &token)
        .json(&json!({
            "current_password": "pAssword1!_",
            "new_password": " ",
            "confirm_new_password": " "
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let stored_hash = app.accounts.by_email("ada@example.com").unwrap().secret_hash;
    assert_eq!(stored_hash, original_hash);
}

#[tokio::test]
async fn test_change_password_clears_expired_credentials() {
    let app = TestApp::spawn().await;
    let tokens = app
        .register_and_login("ada@example.com", "+15550100", "pAssword1!_")
        .await;

    app.accounts
        .modify("ada@example.com", |account| account.credentials_expired = true);

    let response = app
        .post_authenticated("/api/v1/users/profile/password", &access_token(&tokens))
        .json(&json!({
            "current_password": "pAssword1!_",
            "new_password": "n3w-Secret!",
            "confirm_new_password": "n3w-Secret!"
        }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.login("ada@example.com", "n3w-Secret!").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_delete_account_schedules_deletion() {
    let app = TestApp::spawn().await;
    let tokens = app
        .register_and_login("ada@example.com", "+15550100", "pAssword1!_")
        .await;
    let token = access_token(&tokens);

    let response = app
        .delete_authenticated("/api/v1/users/profile", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let first_request = app
        .accounts
        .by_email("ada@example.com")
        .unwrap()
        .deletion_requested_at
        .expect("deletion to be recorded");

    // Repeating the request keeps the original timestamp
    let response = app
        .delete_authenticated("/api/v1/users/profile", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let stored = app.accounts.by_email("ada@example.com").unwrap();
    assert_eq!(stored.deletion_requested_at, Some(first_request));
}
