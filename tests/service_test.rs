use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use roomkeeper::config::Config;
use roomkeeper::db;
use roomkeeper::domain::{DomainError, MediaParent, PropertyStatus, PublishPolicy, RoomType, User};
use roomkeeper::infrastructure::AppState;
use roomkeeper::seed;
use roomkeeper::services::{
    AmenityInput, CreatePropertyInput, NewAmenityInput, RoomInput, UpdatePropertyInput,
    UpdateRoomInput, UploadMediaInput,
};
use roomkeeper::storage::InMemoryMediaStorage;

async fn setup_with_policy(policy: PublishPolicy) -> (AppState, Arc<InMemoryMediaStorage>) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    seed::seed_global_amenities(&db)
        .await
        .expect("Failed to seed amenities");

    let mut config = Config::in_memory();
    config.publish_policy = policy;
    let storage = Arc::new(InMemoryMediaStorage::new());
    (AppState::with_storage(db, &config, storage.clone()), storage)
}

async fn setup() -> AppState {
    setup_with_policy(PublishPolicy::default()).await.0
}

async fn user(state: &AppState, sub: &str) -> User {
    state
        .user_repo
        .upsert_from_identity(sub, &format!("{}@example.com", sub), sub)
        .await
        .expect("Failed to create user")
}

fn villa() -> CreatePropertyInput {
    CreatePropertyInput {
        name: "Villa Aurora".to_string(),
        address: "Via Roma 1".to_string(),
        city: "Lecce".to_string(),
        country: "IT".to_string(),
        ..Default::default()
    }
}

fn double_room() -> RoomInput {
    RoomInput {
        room_type: "doppia".to_string(),
        price: 90.0,
        capacity: 2,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_create_property_resolves_amenities() {
    let state = setup().await;
    let owner = user(&state, "owner").await;

    let input = CreatePropertyInput {
        amenities: vec![
            AmenityInput::by_id("pa_wifi").with_custom_description("Fibre 1 Gbit"),
            AmenityInput::by_name("PARKING"),
            AmenityInput::by_name("Rooftop bar"),
        ],
        ..villa()
    };
    let property = state
        .property_service
        .create_property(&owner, input)
        .await
        .unwrap();

    assert_eq!(property.status, PropertyStatus::Draft);
    assert_eq!(property.owner_id, owner.id);
    let ids: Vec<&str> = property.amenities.iter().map(|a| a.id.as_str()).collect();
    assert!(ids.contains(&"pa_wifi"));
    assert!(ids.contains(&"pa_parking"));

    let rooftop = property
        .amenities
        .iter()
        .find(|a| a.name == "Rooftop bar")
        .expect("custom amenity linked");
    assert!(!rooftop.is_global);

    // Dropping the custom amenity collects it
    let rooftop_id = rooftop.id.clone();
    let updated = state
        .property_service
        .update_property(
            &owner,
            &property.id,
            UpdatePropertyInput {
                amenities: Some(vec![AmenityInput::by_id("pa_wifi")]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.amenities.len(), 1);
    assert!(
        state
            .property_amenities
            .get_by_id(&rooftop_id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_unknown_amenity_id_is_not_found() {
    let state = setup().await;
    let owner = user(&state, "owner").await;

    let input = CreatePropertyInput {
        amenities: vec![AmenityInput::by_id("pa_spaceport")],
        ..villa()
    };
    let result = state.property_service.create_property(&owner, input).await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
    assert!(
        state
            .property_service
            .list_owner_properties(&owner)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_not_found_and_unauthorized_stay_distinct() {
    let state = setup().await;
    let owner = user(&state, "owner").await;
    let intruder = user(&state, "intruder").await;

    let property = state
        .property_service
        .create_property(&owner, villa())
        .await
        .unwrap();
    let room = state
        .room_service
        .add_room(&owner, &property.id, double_room())
        .await
        .unwrap();

    let rename = UpdatePropertyInput {
        name: Some("Mine now".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        state
            .property_service
            .update_property(&intruder, &property.id, rename.clone())
            .await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        state
            .property_service
            .update_property(&owner, "missing", rename)
            .await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        state
            .property_service
            .delete_property(&intruder, &property.id)
            .await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        state
            .room_service
            .add_room(&intruder, &property.id, double_room())
            .await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        state
            .room_service
            .update_room(&intruder, &room.id, UpdateRoomInput::default())
            .await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        state.room_service.delete_room(&owner, "missing").await,
        Err(DomainError::NotFound(_))
    ));

    // Nothing changed
    let persisted = state
        .property_service
        .get_property(Some(&owner), &property.id)
        .await
        .unwrap();
    assert_eq!(persisted.name, "Villa Aurora");
    assert_eq!(persisted.rooms.len(), 1);
}

#[tokio::test]
async fn test_publish_requires_rooms_under_default_policy() {
    let state = setup().await;
    let owner = user(&state, "owner").await;
    let property = state
        .property_service
        .create_property(&owner, villa())
        .await
        .unwrap();

    let result = state
        .property_service
        .publish_property(&owner, &property.id)
        .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    state
        .room_service
        .add_room(&owner, &property.id, double_room())
        .await
        .unwrap();
    let published = state
        .property_service
        .publish_property(&owner, &property.id)
        .await
        .unwrap();
    assert_eq!(published.status, PropertyStatus::Published);

    // Publishing twice is a no-op
    let again = state
        .property_service
        .publish_property(&owner, &property.id)
        .await
        .unwrap();
    assert_eq!(again.status, PropertyStatus::Published);
    assert_eq!(again.rooms.len(), 1);
}

#[tokio::test]
async fn test_publish_without_rooms_when_policy_allows() {
    let (state, _) = setup_with_policy(PublishPolicy { min_rooms: 0 }).await;
    let owner = user(&state, "owner").await;
    let property = state
        .property_service
        .create_property(&owner, villa())
        .await
        .unwrap();

    let published = state
        .property_service
        .publish_property(&owner, &property.id)
        .await
        .unwrap();
    assert_eq!(published.status, PropertyStatus::Published);
    assert!(published.rooms.is_empty());
}

#[tokio::test]
async fn test_status_transitions() {
    let (state, _) = setup_with_policy(PublishPolicy { min_rooms: 0 }).await;
    let owner = user(&state, "owner").await;
    let property = state
        .property_service
        .create_property(&owner, villa())
        .await
        .unwrap();
    let service = &state.property_service;

    let draft = service.unpublish_property(&owner, &property.id).await.unwrap();
    assert_eq!(draft.status, PropertyStatus::Draft);

    service.publish_property(&owner, &property.id).await.unwrap();
    let draft = service.unpublish_property(&owner, &property.id).await.unwrap();
    assert_eq!(draft.status, PropertyStatus::Draft);

    let archived = service.archive_property(&owner, &property.id).await.unwrap();
    assert_eq!(archived.status, PropertyStatus::Inactive);
    assert!(matches!(
        service.publish_property(&owner, &property.id).await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        service.unpublish_property(&owner, &property.id).await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn test_inactive_property_rejects_new_rooms() {
    let state = setup().await;
    let owner = user(&state, "owner").await;
    let property = state
        .property_service
        .create_property(&owner, villa())
        .await
        .unwrap();
    state
        .property_service
        .archive_property(&owner, &property.id)
        .await
        .unwrap();

    let result = state
        .room_service
        .add_room(&owner, &property.id, double_room())
        .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert!(
        state
            .room_service
            .list_rooms(Some(&owner), &property.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_room_type_aliases_and_validation() {
    let state = setup().await;
    let owner = user(&state, "owner").await;
    let property = state
        .property_service
        .create_property(&owner, villa())
        .await
        .unwrap();

    let room = state
        .room_service
        .add_room(
            &owner,
            &property.id,
            RoomInput {
                room_type: "Junior-Suite".to_string(),
                price: 250.0,
                capacity: 3,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(room.room_type, RoomType::Suite);

    let bad_type = state
        .room_service
        .add_room(
            &owner,
            &property.id,
            RoomInput {
                room_type: "penthouse".to_string(),
                ..double_room()
            },
        )
        .await;
    assert!(matches!(bad_type, Err(DomainError::Validation(_))));

    let bad_price = state
        .room_service
        .update_room(
            &owner,
            &room.id,
            UpdateRoomInput {
                price: Some(0.0),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(bad_price, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_new_room_amenity_reuses_catalog_entry_by_name() {
    let state = setup().await;
    let owner = user(&state, "owner").await;
    let property = state
        .property_service
        .create_property(&owner, villa())
        .await
        .unwrap();
    let first = state
        .room_service
        .add_room(&owner, &property.id, double_room())
        .await
        .unwrap();
    let second = state
        .room_service
        .add_room(&owner, &property.id, double_room())
        .await
        .unwrap();

    let first = state
        .room_service
        .add_new_amenity(
            &owner,
            &first.id,
            NewAmenityInput {
                name: "Sauna".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let second = state
        .room_service
        .add_new_amenity(
            &owner,
            &second.id,
            NewAmenityInput {
                name: "sauna".to_string(),
                custom_description: Some("Private".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let sauna_id = first.amenities[0].id.clone();
    assert_eq!(second.amenities[0].id, sauna_id);
    assert_eq!(second.amenities[0].effective_description(), "Private");

    // A global name resolves to the global entry
    let first = state
        .room_service
        .add_new_amenity(
            &owner,
            &first.id,
            NewAmenityInput {
                name: "Minibar".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(first.amenities.iter().any(|a| a.id == "ra_minibar"));

    state
        .room_service
        .remove_room_amenity(&owner, &first.id, &sauna_id)
        .await
        .unwrap();
    assert!(state.room_amenities.get_by_id(&sauna_id).await.unwrap().is_some());

    state
        .room_service
        .remove_room_amenity(&owner, &second.id, &sauna_id)
        .await
        .unwrap();
    assert!(state.room_amenities.get_by_id(&sauna_id).await.unwrap().is_none());

    assert!(matches!(
        state
            .room_service
            .remove_room_amenity(&owner, &second.id, &sauna_id)
            .await,
        Err(DomainError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_upload_and_delete_media() {
    let (state, storage) = setup_with_policy(PublishPolicy::default()).await;
    let owner = user(&state, "owner").await;
    let intruder = user(&state, "intruder").await;
    let property = state
        .property_service
        .create_property(&owner, villa())
        .await
        .unwrap();

    let payload = format!("data:image/png;base64,{}", STANDARD.encode(b"\x89PNG fake"));
    let media = state
        .media_service
        .upload_media(
            &owner,
            UploadMediaInput {
                file_name: "cover.png".to_string(),
                data: payload.clone(),
                property_id: Some(property.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(media.file_type.as_deref(), Some("image/png"));
    assert!(storage.contains(&media.storage_path));
    assert_eq!(
        storage.content_type(&media.storage_path).as_deref(),
        Some("image/png")
    );

    // Non-owners can neither upload to nor delete from this property
    let upload_as_intruder = state
        .media_service
        .upload_media(
            &intruder,
            UploadMediaInput {
                file_name: "x.png".to_string(),
                data: payload,
                property_id: Some(property.id.clone()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(upload_as_intruder, Err(DomainError::Unauthorized)));
    assert!(matches!(
        state.media_service.delete_media(&intruder, &media.id).await,
        Err(DomainError::Unauthorized)
    ));

    let listed = state
        .media_service
        .list_media(Some(&owner), &MediaParent::Property(property.id.clone()))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    state
        .media_service
        .delete_media(&owner, &media.id)
        .await
        .unwrap();
    assert!(!storage.contains(&media.storage_path));
    assert!(matches!(
        state.media_service.get_media(Some(&owner), &media.id).await,
        Err(DomainError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_upload_rejects_bad_payload_before_storage() {
    let (state, storage) = setup_with_policy(PublishPolicy::default()).await;
    let owner = user(&state, "owner").await;
    let property = state
        .property_service
        .create_property(&owner, villa())
        .await
        .unwrap();

    let result = state
        .media_service
        .upload_media(
            &owner,
            UploadMediaInput {
                file_name: "cover.png".to_string(),
                data: "not base64!!".to_string(),
                property_id: Some(property.id.clone()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_drafts_hidden_from_other_viewers() {
    let state = setup().await;
    let owner = user(&state, "owner").await;
    let guest = user(&state, "guest").await;
    let property = state
        .property_service
        .create_property(&owner, villa())
        .await
        .unwrap();

    assert!(
        state
            .property_service
            .get_property(Some(&owner), &property.id)
            .await
            .is_ok()
    );
    assert!(matches!(
        state
            .property_service
            .get_property(Some(&guest), &property.id)
            .await,
        Err(DomainError::NotFound(_))
    ));
    assert!(matches!(
        state.property_service.get_property(None, &property.id).await,
        Err(DomainError::NotFound(_))
    ));

    let results = state.search_service.search(None, None).await.unwrap();
    assert!(results.is_empty());

    // Rooms and media of a draft are hidden the same way
    let room = state
        .room_service
        .add_room(&owner, &property.id, double_room())
        .await
        .unwrap();
    let media = state
        .media_service
        .upload_media(
            &owner,
            UploadMediaInput {
                file_name: "bed.jpg".to_string(),
                data: STANDARD.encode(b"jpeg bytes"),
                room_id: Some(room.id.clone()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let property_parent = MediaParent::Property(property.id.clone());
    let room_parent = MediaParent::Room(room.id.clone());

    for viewer in [Some(&guest), None] {
        assert!(matches!(
            state.room_service.get_room(viewer, &room.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            state.room_service.list_rooms(viewer, &property.id).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            state.media_service.list_media(viewer, &property_parent).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            state.media_service.list_media(viewer, &room_parent).await,
            Err(DomainError::NotFound(_))
        ));
        assert!(matches!(
            state.media_service.get_media(viewer, &media.id).await,
            Err(DomainError::NotFound(_))
        ));
    }

    let owner_view = Some(&owner);
    assert!(state.room_service.get_room(owner_view, &room.id).await.is_ok());
    assert_eq!(
        state
            .media_service
            .list_media(owner_view, &room_parent)
            .await
            .unwrap()
            .len(),
        1
    );

    // Publishing opens everything up to anonymous callers
    state
        .property_service
        .publish_property(&owner, &property.id)
        .await
        .unwrap();
    assert!(state.room_service.get_room(None, &room.id).await.is_ok());
    assert_eq!(
        state
            .room_service
            .list_rooms(None, &property.id)
            .await
            .unwrap()
            .len(),
        1
    );
    assert!(state.media_service.get_media(None, &media.id).await.is_ok());
}

#[tokio::test]
async fn test_room_takes_over_property_media() {
    let (state, storage) = setup_with_policy(PublishPolicy::default()).await;
    let owner = user(&state, "owner").await;
    let intruder = user(&state, "intruder").await;
    let property = state
        .property_service
        .create_property(&owner, villa())
        .await
        .unwrap();

    let upload = |file_name: &str| UploadMediaInput {
        file_name: file_name.to_string(),
        content_type: Some("image/jpeg".to_string()),
        data: STANDARD.encode(b"jpeg bytes"),
        property_id: Some(property.id.clone()),
        ..Default::default()
    };
    let first = state
        .media_service
        .upload_media(&owner, upload("first.jpg"))
        .await
        .unwrap();
    let second = state
        .media_service
        .upload_media(&owner, upload("second.jpg"))
        .await
        .unwrap();

    let room = state
        .room_service
        .add_room(
            &owner,
            &property.id,
            RoomInput {
                media_ids: vec![first.id.clone()],
                ..double_room()
            },
        )
        .await
        .unwrap();
    assert_eq!(room.media.len(), 1);
    assert_eq!(room.media[0].id, first.id);
    assert_eq!(
        state.media_repo.get_parent(&first.id).await.unwrap(),
        Some(MediaParent::Room(room.id.clone()))
    );
    assert!(storage.contains(&first.storage_path));

    let property_media = state
        .media_service
        .list_media(Some(&owner), &MediaParent::Property(property.id.clone()))
        .await
        .unwrap();
    assert_eq!(property_media.len(), 1);
    assert_eq!(property_media[0].id, second.id);

    // Replacing the collection moves the second file over and keeps the first
    let room = state
        .room_service
        .update_room(
            &owner,
            &room.id,
            UpdateRoomInput {
                media_ids: Some(vec![first.id.clone(), second.id.clone()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(room.media.len(), 2);
    assert!(storage.contains(&first.storage_path));
    assert!(storage.contains(&second.storage_path));

    // Another user's room cannot take this media
    let other = state
        .property_service
        .create_property(&intruder, villa())
        .await
        .unwrap();
    let result = state
        .room_service
        .add_room(
            &intruder,
            &other.id,
            RoomInput {
                media_ids: vec![first.id.clone()],
                ..double_room()
            },
        )
        .await;
    assert!(matches!(result, Err(DomainError::Unauthorized)));
    assert!(storage.contains(&first.storage_path));
}
