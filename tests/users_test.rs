mod common;

use assert_matches::assert_matches;
use common::TestApp;
use logistics_tracking::{errors::ServiceError, models::UserRole};

#[tokio::test]
async fn created_users_can_log_in() {
    let app = TestApp::new().await;
    let users = &app.state.users;

    let created = users
        .create_user("  dispatcher ", "s3cure-passphrase", UserRole::Manager)
        .await
        .unwrap();
    assert_eq!(created.username, "dispatcher");
    assert_eq!(created.role, UserRole::Manager);
    assert_ne!(created.password_hash, "s3cure-passphrase");
    assert!(created.password_hash.starts_with("$argon2"));

    let verified = users
        .verify_credentials("dispatcher", "s3cure-passphrase")
        .await
        .unwrap();
    assert_eq!(verified.id, created.id);
}

#[tokio::test]
async fn bad_credentials_fail_alike() {
    let app = TestApp::new().await;
    let users = &app.state.users;
    users
        .create_user("driver-1", "road-warrior-42", UserRole::Driver)
        .await
        .unwrap();

    let wrong_password = users.verify_credentials("driver-1", "wrong-password").await;
    let unknown_user = users.verify_credentials("nobody", "road-warrior-42").await;

    let (Err(ServiceError::AuthError(a)), Err(ServiceError::AuthError(b))) =
        (wrong_password, unknown_user)
    else {
        panic!("expected authentication errors");
    };
    assert_eq!(a, b);
}

#[tokio::test]
async fn account_rules() {
    let app = TestApp::new().await;
    let users = &app.state.users;
    users
        .create_user("admin", "correct-horse-battery", UserRole::Admin)
        .await
        .unwrap();

    assert_matches!(
        users
            .create_user("admin", "another-long-secret", UserRole::Manager)
            .await,
        Err(ServiceError::Conflict(_))
    );
    assert_matches!(
        users.create_user("shorty", "abc", UserRole::Driver).await,
        Err(ServiceError::ValidationError(_))
    );
    assert_matches!(
        users.create_user("common", "password", UserRole::Driver).await,
        Err(ServiceError::ValidationError(_))
    );
    assert_matches!(
        users.create_user("   ", "long-enough-secret", UserRole::Driver).await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn roles_can_change() {
    let app = TestApp::new().await;
    let users = &app.state.users;
    let created = users
        .create_user("ops", "long-enough-secret", UserRole::Driver)
        .await
        .unwrap();

    let promoted = users.change_role(created.id, UserRole::Admin).await.unwrap();
    assert_eq!(promoted.role, UserRole::Admin);
    assert_eq!(
        users
            .find_by_username("ops")
            .await
            .unwrap()
            .map(|u| u.role),
        Some(UserRole::Admin)
    );

    assert_matches!(
        users.change_role(999, UserRole::Manager).await,
        Err(ServiceError::NotFound(_))
    );
}
