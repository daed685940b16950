use uuid::Uuid;

use drawnzones_backend::error::BackendError;
use drawnzones_backend::usecase::api_key::{
    CreateApiKeyInput, CreateApiKeyUseCase, ListApiKeysUseCase, RevokeApiKeyUseCase,
};

use crate::helpers::{MockBackend, test_api_key, test_user};

#[tokio::test]
async fn should_create_key_with_high_entropy_secret() {
    let user = test_user("ada@example.com");
    let store = MockBackend::new().with_user(user.clone());
    let uc = CreateApiKeyUseCase {
        api_keys: store.clone(),
    };

    let key = uc
        .execute(
            &user,
            CreateApiKeyInput {
                name: "  deploy bot  ".to_owned(),
            },
        )
        .await
        .unwrap();

    assert_eq!(key.name, "deploy bot", "name is trimmed");
    assert_eq!(key.key.len(), 43, "32 bytes base64 url-safe no pad");
    assert!(key.is_active);
    assert!(key.last_used_at.is_none());
}

#[tokio::test]
async fn should_reject_blank_name() {
    let user = test_user("ada@example.com");
    let store = MockBackend::new().with_user(user.clone());
    let uc = CreateApiKeyUseCase {
        api_keys: store.clone(),
    };

    let result = uc
        .execute(
            &user,
            CreateApiKeyInput {
                name: "   ".to_owned(),
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(BackendError::Validation { field: "name", .. })
    ));
    assert!(store.api_keys.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_soft_delete_on_revoke() {
    let user = test_user("ada@example.com");
    let key = test_api_key(user.id, "secret-a");
    let store = MockBackend::new().with_user(user.clone()).with_api_key(key.clone());

    RevokeApiKeyUseCase {
        api_keys: store.clone(),
    }
    .execute(&user, key.id)
    .await
    .unwrap();

    // The row survives with is_active=false and disappears from listings.
    let stored = store.api_keys.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].is_active);
    drop(stored);

    let listed = ListApiKeysUseCase {
        api_keys: store.clone(),
    }
    .execute(&user)
    .await
    .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn should_report_not_found_for_foreign_or_unknown_key() {
    let owner = test_user("owner@example.com");
    let intruder = test_user("intruder@example.com");
    let key = test_api_key(owner.id, "secret-a");
    let store = MockBackend::new()
        .with_user(owner)
        .with_user(intruder.clone())
        .with_api_key(key.clone());
    let uc = RevokeApiKeyUseCase {
        api_keys: store.clone(),
    };

    let foreign = uc.execute(&intruder, key.id).await;
    assert!(matches!(foreign, Err(BackendError::NotFound)));

    let unknown = uc.execute(&intruder, Uuid::now_v7()).await;
    assert!(matches!(unknown, Err(BackendError::NotFound)));

    assert!(
        store.api_keys.lock().unwrap()[0].is_active,
        "foreign revoke must not deactivate the key"
    );
}

#[tokio::test]
async fn should_revoke_only_once() {
    let user = test_user("ada@example.com");
    let key = test_api_key(user.id, "secret-a");
    let store = MockBackend::new().with_user(user.clone()).with_api_key(key.clone());
    let uc = RevokeApiKeyUseCase {
        api_keys: store.clone(),
    };

    uc.execute(&user, key.id).await.unwrap();
    let second = uc.execute(&user, key.id).await;
    assert!(matches!(second, Err(BackendError::NotFound)));
}
