// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (FIRESTORE_EMULATOR_HOST set); otherwise they are skipped.

use guardian_alert::db::{FirestoreDb, UserStore};
use guardian_alert::error::AppError;
use guardian_alert::models::{EmergencyContact, User};
use guardian_alert::time_utils::now_rfc3339;

mod common;

async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Unique suffix for test isolation (the emulator keeps state between tests).
fn unique() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn test_user(phone: &str) -> User {
    User {
        id: unique(),
        name: "Asha".to_string(),
        phone: phone.to_string(),
        father_name: "Ravi".to_string(),
        father_phone: "+919000000002".to_string(),
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".to_string(),
        emergency_contacts: vec![],
        created_at: now_rfc3339(),
        updated_at: now_rfc3339(),
    }
}

#[tokio::test]
async fn test_create_and_lookup_user() {
    require_emulator!();

    let db = test_db().await;
    let phone = format!("+91{}", &unique()[..10]);
    let user = test_user(&phone);

    assert!(db.find_user_by_phone(&phone).await.unwrap().is_none());

    db.create_user(&user).await.unwrap();

    let by_id = db.get_user(&user.id).await.unwrap().expect("user by id");
    assert_eq!(by_id.phone, phone);

    let by_phone = db.find_user_by_phone(&phone).await.unwrap().expect("user by phone");
    assert_eq!(by_phone.id, user.id);
}

#[tokio::test]
async fn test_duplicate_phone_conflicts() {
    require_emulator!();

    let db = test_db().await;
    let phone = format!("+91{}", &unique()[..10]);

    db.create_user(&test_user(&phone)).await.unwrap();
    let err = db.create_user(&test_user(&phone)).await.unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)), "got {err:?}");
}

#[tokio::test]
async fn test_add_contacts_appends_in_order() {
    require_emulator!();

    let db = test_db().await;
    let user = test_user(&format!("+91{}", &unique()[..10]));
    db.create_user(&user).await.unwrap();

    for (name, phone) in [("Aunt", "+919000000003"), ("Brother", "+919000000004")] {
        db.add_emergency_contact(
            &user.id,
            EmergencyContact {
                name: name.to_string(),
                phone: phone.to_string(),
            },
        )
        .await
        .unwrap()
        .expect("user exists");
    }

    let stored = db.get_user(&user.id).await.unwrap().unwrap();
    let phones: Vec<_> = stored
        .emergency_contacts
        .iter()
        .map(|c| c.phone.as_str())
        .collect();
    assert_eq!(phones, ["+919000000003", "+919000000004"]);

    let missing = db
        .add_emergency_contact(
            "no-such-user",
            EmergencyContact {
                name: "X".to_string(),
                phone: "1".to_string(),
            },
        )
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_concurrent_contact_adds_keep_every_contact() {
    require_emulator!();

    let db = test_db().await;
    let user = test_user(&format!("+91{}", &unique()[..10]));
    db.create_user(&user).await.unwrap();

    let adds = (0..5).map(|i| {
        let db = db.clone();
        let user_id = user.id.clone();
        tokio::spawn(async move {
            db.add_emergency_contact(
                &user_id,
                EmergencyContact {
                    name: format!("Contact {i}"),
                    phone: format!("+91900000010{i}"),
                },
            )
            .await
        })
    });

    for result in futures_util::future::join_all(adds).await {
        result.unwrap().unwrap().expect("user exists");
    }

    let stored = db.get_user(&user.id).await.unwrap().unwrap();
    let mut phones: Vec<_> = stored
        .emergency_contacts
        .iter()
        .map(|c| c.phone.clone())
        .collect();
    phones.sort();
    assert_eq!(
        phones,
        (0..5).map(|i| format!("+91900000010{i}")).collect::<Vec<_>>()
    );
}
