use serde_json::json;
use uuid::Uuid;

use drawnzones_backend::error::BackendError;
use drawnzones_backend::usecase::rectangle::{
    CreateRectangleInput, CreateRectangleUseCase, DeleteRectangleUseCase, GetRectangleUseCase,
    ListRectanglesUseCase, RectangleStatsUseCase, UpdateRectangleInput, UpdateRectangleUseCase,
};

use crate::helpers::{MockBackend, test_rectangle, test_user};

fn polygon() -> serde_json::Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [-74.006, 40.7128],
            [-74.006, 40.7228],
            [-73.996, 40.7228],
            [-73.996, 40.7128],
            [-74.006, 40.7128]
        ]]
    })
}

#[tokio::test]
async fn should_create_rectangle_with_derived_center() {
    let user = test_user("ada@example.com");
    let store = MockBackend::new().with_user(user.clone());
    let uc = CreateRectangleUseCase {
        rectangles: store.clone(),
    };

    let rectangle = uc
        .execute(
            &user,
            CreateRectangleInput {
                name: "  downtown  ".to_owned(),
                coordinates: polygon(),
            },
        )
        .await
        .unwrap();

    assert_eq!(rectangle.name, "downtown", "name is trimmed");
    let center = rectangle.center().unwrap();
    assert!((center[0] - (-74.001)).abs() < 1e-9);
    assert!((center[1] - 40.7178).abs() < 1e-9);
}

#[tokio::test]
async fn should_reject_duplicate_name_for_same_user_only() {
    let ada = test_user("ada@example.com");
    let grace = test_user("grace@example.com");
    let store = MockBackend::new()
        .with_user(ada.clone())
        .with_user(grace.clone())
        .with_rectangle(test_rectangle(ada.id, "downtown"));
    let uc = CreateRectangleUseCase {
        rectangles: store.clone(),
    };

    let duplicate = uc
        .execute(
            &ada,
            CreateRectangleInput {
                name: "downtown".to_owned(),
                coordinates: polygon(),
            },
        )
        .await;
    assert!(matches!(
        duplicate,
        Err(BackendError::Validation { field: "name", .. })
    ));

    // The same name under a different account is fine.
    let other_user = uc
        .execute(
            &grace,
            CreateRectangleInput {
                name: "downtown".to_owned(),
                coordinates: polygon(),
            },
        )
        .await;
    assert!(other_user.is_ok());
}

#[tokio::test]
async fn should_reject_invalid_coordinates() {
    let user = test_user("ada@example.com");
    let store = MockBackend::new().with_user(user.clone());
    let uc = CreateRectangleUseCase {
        rectangles: store.clone(),
    };

    let result = uc
        .execute(
            &user,
            CreateRectangleInput {
                name: "downtown".to_owned(),
                coordinates: json!({"type": "Point", "coordinates": [0.0, 0.0]}),
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(BackendError::Validation { field: "coordinates", .. })
    ));
    assert!(store.rectangles.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_scope_reads_to_owner() {
    let owner = test_user("owner@example.com");
    let intruder = test_user("intruder@example.com");
    let rectangle = test_rectangle(owner.id, "downtown");
    let store = MockBackend::new()
        .with_user(owner.clone())
        .with_user(intruder.clone())
        .with_rectangle(rectangle.clone());
    let uc = GetRectangleUseCase {
        rectangles: store.clone(),
    };

    assert!(uc.execute(&owner, rectangle.id).await.is_ok());
    // Foreign access reads as absent, never as forbidden.
    let foreign = uc.execute(&intruder, rectangle.id).await;
    assert!(matches!(foreign, Err(BackendError::NotFound)));
}

#[tokio::test]
async fn should_report_not_found_when_deleting_foreign_rectangle() {
    let owner = test_user("owner@example.com");
    let intruder = test_user("intruder@example.com");
    let rectangle = test_rectangle(owner.id, "downtown");
    let store = MockBackend::new()
        .with_user(owner)
        .with_user(intruder.clone())
        .with_rectangle(rectangle.clone());

    let result = DeleteRectangleUseCase {
        rectangles: store.clone(),
    }
    .execute(&intruder, rectangle.id)
    .await;
    assert!(matches!(result, Err(BackendError::NotFound)));
    assert_eq!(store.rectangles.lock().unwrap().len(), 1, "row must survive");
}

#[tokio::test]
async fn should_update_rectangle_excluding_itself_from_name_check() {
    let user = test_user("ada@example.com");
    let rectangle = test_rectangle(user.id, "downtown");
    let store = MockBackend::new()
        .with_user(user.clone())
        .with_rectangle(rectangle.clone())
        .with_rectangle(test_rectangle(user.id, "uptown"));
    let uc = UpdateRectangleUseCase {
        rectangles: store.clone(),
    };

    // Re-submitting its own name passes the uniqueness check.
    let same_name = uc
        .execute(
            &user,
            rectangle.id,
            UpdateRectangleInput {
                name: "downtown".to_owned(),
                coordinates: polygon(),
            },
        )
        .await;
    assert!(same_name.is_ok());

    // Taking a sibling's name does not.
    let stolen_name = uc
        .execute(
            &user,
            rectangle.id,
            UpdateRectangleInput {
                name: "uptown".to_owned(),
                coordinates: polygon(),
            },
        )
        .await;
    assert!(matches!(
        stolen_name,
        Err(BackendError::Validation { field: "name", .. })
    ));

    let unknown = uc
        .execute(
            &user,
            Uuid::now_v7(),
            UpdateRectangleInput {
                name: "midtown".to_owned(),
                coordinates: polygon(),
            },
        )
        .await;
    assert!(matches!(unknown, Err(BackendError::NotFound)));
}

#[tokio::test]
async fn should_list_only_own_rectangles() {
    let ada = test_user("ada@example.com");
    let grace = test_user("grace@example.com");
    let store = MockBackend::new()
        .with_user(ada.clone())
        .with_user(grace.clone())
        .with_rectangle(test_rectangle(ada.id, "downtown"))
        .with_rectangle(test_rectangle(ada.id, "uptown"))
        .with_rectangle(test_rectangle(grace.id, "harbor"));

    let listed = ListRectanglesUseCase {
        rectangles: store.clone(),
    }
    .execute(&ada)
    .await
    .unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|r| r.user_id == ada.id));
}

#[tokio::test]
async fn should_cap_recent_rectangles_in_stats() {
    let user = test_user("ada@example.com");
    let mut store = MockBackend::new().with_user(user.clone());
    for i in 0..7 {
        store = store.with_rectangle(test_rectangle(user.id, &format!("zone-{i}")));
    }

    let stats = RectangleStatsUseCase {
        rectangles: store.clone(),
    }
    .execute(&user)
    .await
    .unwrap();
    assert_eq!(stats.total_rectangles, 7);
    assert_eq!(stats.recent_rectangles, 5);

    let empty_user = test_user("grace@example.com");
    let stats = RectangleStatsUseCase {
        rectangles: store.clone(),
    }
    .execute(&empty_user)
    .await
    .unwrap();
    assert_eq!(stats.total_rectangles, 0);
    assert_eq!(stats.recent_rectangles, 0);
}
