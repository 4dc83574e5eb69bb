//! MediaStore integration tests.
//!
//! Run with: `cargo test -p showcase-services --test media_store_test`

mod helpers;

use helpers::fixtures::{mp4_file, png_file};
use helpers::setup;
use showcase_core::models::{MediaKind, MediaOwner, MediaUpdate, UploadContext};
use showcase_core::AppError;
use showcase_db::MediaRepository;
use showcase_services::{CacheKey, MediaStoreError, Storage};
use uuid::Uuid;

#[tokio::test]
async fn test_hero_image_within_band_is_stored() {
    let stack = setup().await;
    let owner = stack.division("Mining").await;

    let media = stack
        .media
        .store(stack.upload(owner, png_file("Hero Shot.PNG", 1920, 1080), UploadContext::Hero))
        .await
        .unwrap();

    assert_eq!(media.width, Some(1920));
    assert_eq!(media.height, Some(1080));
    assert_eq!(media.kind, MediaKind::Image);
    assert_eq!(media.caption, "Hero Shot.PNG");
    assert_eq!(media.uploaded_by, stack.actor);
    assert!(media.path_or_embed.starts_with("media/division/"));
    assert!(media.path_or_embed.ends_with(".png"));
}

#[tokio::test]
async fn test_narrow_hero_is_rejected_before_any_write() {
    let stack = setup().await;
    let owner = stack.division("Mining").await;

    let err = stack
        .media
        .store(stack.upload(owner, png_file("narrow.png", 1000, 563), UploadContext::Hero))
        .await
        .unwrap_err();

    assert!(matches!(err, MediaStoreError::Validation(_)));
    assert!(err.to_string().contains("at least 1200px wide"));
    assert_eq!(stack.storage.puts(), 0);
    assert!(stack.media.list(&owner).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_hero_outside_aspect_band_is_rejected() {
    let stack = setup().await;
    let owner = stack.division("Mining").await;

    let err = stack
        .media
        .store(stack.upload(owner, png_file("square.png", 1600, 1200), UploadContext::Slider))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("16:9 aspect ratio"));
    let app_error: AppError = err.into();
    assert!(matches!(app_error, AppError::MediaValidation(_)));
    assert_eq!(stack.storage.puts(), 0);
}

#[tokio::test]
async fn test_wide_image_gets_all_derivatives() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;

    let media = stack
        .media
        .store(stack.upload(owner, png_file("plant.png", 2000, 1125), UploadContext::General))
        .await
        .unwrap();

    let blobs = stack.blobs().await;
    let variants: Vec<&String> = blobs
        .iter()
        .filter(|k| k.ends_with("w.png"))
        .collect();
    let webp: Vec<&String> = blobs.iter().filter(|k| k.ends_with(".webp")).collect();

    assert_eq!(variants.len(), 3);
    assert_eq!(webp.len(), 4);
    assert_eq!(blobs.len(), 8);
    assert!(blobs.contains(&media.path_or_embed));

    let base = media.path_or_embed.trim_end_matches(".png");
    for width in [768, 1280, 1920] {
        assert!(blobs.contains(&format!("{}_{}w.png", base, width)));
        assert!(blobs.contains(&format!("{}_{}w.webp", base, width)));
    }
}

#[tokio::test]
async fn test_small_image_is_not_upscaled() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;

    let media = stack
        .media
        .store(stack.upload(owner, png_file("icon.png", 400, 300), UploadContext::General))
        .await
        .unwrap();

    let blobs = stack.blobs().await;
    let base = media.path_or_embed.trim_end_matches(".png");
    assert_eq!(blobs, vec![media.path_or_embed.clone(), format!("{}.webp", base)]);
    assert!(!blobs.iter().any(|k| k.contains("_768w")));
}

#[tokio::test]
async fn test_video_file_gets_thumbnail() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;

    let media = stack
        .media
        .store(stack.upload(owner, mp4_file("tour.mp4"), UploadContext::General))
        .await
        .unwrap();

    assert_eq!(media.kind, MediaKind::Video);
    let base = media.path_or_embed.trim_end_matches(".mp4");
    assert_eq!(
        stack.blobs().await,
        vec![media.path_or_embed.clone(), format!("{}_thumb.jpg", base)]
    );
}

#[tokio::test]
async fn test_delete_removes_every_blob_and_the_row() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;
    let media = stack
        .media
        .store(stack.upload(owner, png_file("plant.png", 2000, 1125), UploadContext::General))
        .await
        .unwrap();
    let stored = stack.blobs().await;
    assert_eq!(stored.len(), 8);

    stack.media.delete(media.id).await.unwrap();

    assert!(stack.blobs().await.is_empty());
    assert!(stack.media_repo.get(media.id).await.unwrap().is_none());

    // cleaning the same paths again is a no-op
    for key in &stored {
        stack.storage.delete(key).await.unwrap();
    }

    let err: AppError = stack.media.delete(media.id).await.unwrap_err().into();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_failed_derivative_writes_still_store_the_media() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;
    stack.storage.fail_derivative_puts();

    let media = stack
        .media
        .store(stack.upload(owner, png_file("plant.png", 2000, 1125), UploadContext::General))
        .await
        .unwrap();

    assert_eq!(stack.blobs().await, vec![media.path_or_embed.clone()]);
    assert!(stack.media_repo.get(media.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_failed_original_write_leaves_nothing_behind() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;
    stack.storage.fail_original_puts();

    let err = stack
        .media
        .store(stack.upload(owner, png_file("plant.png", 2000, 1125), UploadContext::General))
        .await
        .unwrap_err();

    assert!(matches!(err, MediaStoreError::Storage(_)));
    // derivatives are never attempted without an original
    assert_eq!(stack.storage.puts(), 1);
    assert!(stack.media_repo.is_empty().await);
    assert!(stack.blobs().await.is_empty());
}

#[tokio::test]
async fn test_failed_derivative_deletes_still_delete_the_row() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;
    let media = stack
        .media
        .store(stack.upload(owner, png_file("plant.png", 2000, 1125), UploadContext::General))
        .await
        .unwrap();
    stack.storage.fail_derivative_deletes();

    stack.media.delete(media.id).await.unwrap();

    assert!(stack.media_repo.get(media.id).await.unwrap().is_none());
    let leftovers = stack.blobs().await;
    assert_eq!(leftovers.len(), 7);
    assert!(!leftovers.contains(&media.path_or_embed));
}

#[tokio::test]
async fn test_failed_insert_removes_written_blobs() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;
    stack.flaky_media_repo.fail_inserts();

    let err = stack
        .media
        .store(stack.upload(owner, png_file("plant.png", 2000, 1125), UploadContext::General))
        .await
        .unwrap_err();

    assert!(matches!(err, MediaStoreError::Repository(AppError::Internal(_))));
    assert_eq!(stack.storage.puts(), 8);
    assert!(stack.blobs().await.is_empty());
    assert!(stack.media_repo.is_empty().await);
}

#[tokio::test]
async fn test_failed_cleanup_after_insert_reports_the_insert_error() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;
    stack.flaky_media_repo.fail_inserts();
    stack.storage.fail_original_deletes();

    let err = stack
        .media
        .store(stack.upload(owner, png_file("plant.png", 2000, 1125), UploadContext::General))
        .await
        .unwrap_err();

    assert!(matches!(err, MediaStoreError::Repository(_)));
    assert_eq!(stack.blobs().await.len(), 1);
    assert!(stack.media_repo.is_empty().await);
}

#[tokio::test]
async fn test_video_url_media_never_touches_storage() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;

    let media = stack
        .media
        .store(stack.video_url(owner, "https://www.youtube.com/watch?v=dQw4w9WgXcQ"))
        .await
        .unwrap();
    assert!(media.is_external());
    assert_eq!(media.kind, MediaKind::Video);

    stack.media.delete(media.id).await.unwrap();

    assert_eq!(stack.storage.operations(), 0);
    assert!(stack.media_repo.get(media.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unsupported_video_url_is_rejected() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;

    let err = stack
        .media
        .store(stack.video_url(owner, "https://example.com/clip.mp4"))
        .await
        .unwrap_err();

    assert!(err
        .to_string()
        .contains("only YouTube and Vimeo URLs are allowed."));
}

#[tokio::test]
async fn test_store_then_delete_leaves_storage_unchanged() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;
    stack
        .media
        .store(stack.upload(owner, png_file("keep.png", 900, 500), UploadContext::General))
        .await
        .unwrap();
    let before = stack.blobs().await;

    let media = stack
        .media
        .store(stack.upload(owner, png_file("temp.png", 1500, 844), UploadContext::General))
        .await
        .unwrap();
    stack.media.delete(media.id).await.unwrap();

    assert_eq!(stack.blobs().await, before);
}

#[tokio::test]
async fn test_order_appends_and_reorder_swaps() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;

    let mut ids = Vec::new();
    for name in ["a.png", "b.png", "c.png", "d.png"] {
        let media = stack
            .media
            .store(stack.upload(owner, png_file(name, 64, 36), UploadContext::General))
            .await
            .unwrap();
        ids.push((media.id, media.order));
    }
    let orders: Vec<i32> = ids.iter().map(|(_, order)| *order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4]);

    let (first, third) = (ids[0].0, ids[2].0);
    let listed = stack
        .media
        .reorder(&owner, &[(first, 3), (third, 1)])
        .await
        .unwrap();

    let order_of = |id: Uuid| listed.iter().find(|m| m.id == id).unwrap().order;
    assert_eq!(order_of(first), 3);
    assert_eq!(order_of(third), 1);
    assert_eq!(order_of(ids[1].0), 2);
    assert_eq!(listed[0].id, third);
}

#[tokio::test]
async fn test_reorder_rejects_foreign_and_colliding_ids() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;
    let other = stack.division("Mining").await;

    let mine = stack
        .media
        .store(stack.upload(owner, png_file("a.png", 64, 36), UploadContext::General))
        .await
        .unwrap();
    let second = stack
        .media
        .store(stack.upload(owner, png_file("b.png", 64, 36), UploadContext::General))
        .await
        .unwrap();
    let foreign = stack
        .media
        .store(stack.upload(other, png_file("c.png", 64, 36), UploadContext::General))
        .await
        .unwrap();

    let err = stack
        .media
        .reorder(&owner, &[(mine.id, 5), (foreign.id, 6)])
        .await
        .unwrap_err();
    assert!(matches!(err, MediaStoreError::InvalidReorder(_)));

    let err = stack
        .media
        .reorder(&owner, &[(mine.id, 2)])
        .await
        .unwrap_err();
    assert!(matches!(err, MediaStoreError::InvalidReorder(_)));

    let err = stack
        .media
        .reorder(&owner, &[(mine.id, 7), (mine.id, 8)])
        .await
        .unwrap_err();
    assert!(matches!(err, MediaStoreError::InvalidReorder(_)));

    let listed = stack.media.list(&owner).await.unwrap();
    assert_eq!(listed[0].id, mine.id);
    assert_eq!(listed[0].order, 1);
    assert_eq!(listed[1].id, second.id);
}

#[tokio::test]
async fn test_unknown_owner_is_not_found() {
    let stack = setup().await;

    let err = stack
        .media
        .store(stack.upload(
            MediaOwner::Client(Uuid::new_v4()),
            png_file("logo.png", 64, 36),
            UploadContext::General,
        ))
        .await
        .unwrap_err();

    assert!(matches!(err, MediaStoreError::OwnerNotFound(_)));
    assert_eq!(stack.storage.puts(), 0);
}

#[tokio::test]
async fn test_slider_flag_change_evicts_home() {
    let stack = setup().await;
    let owner = stack.division("Energy").await;
    let media = stack
        .media
        .store(stack.upload(owner, png_file("a.png", 64, 36), UploadContext::General))
        .await
        .unwrap();

    stack.snapshots.get(&CacheKey::Home).await.unwrap();
    stack
        .snapshots
        .get(&CacheKey::Division("energy".to_string()))
        .await
        .unwrap();
    assert!(stack.cache.contains("home:v1"));
    assert!(stack.cache.contains("division:energy"));

    let updated = stack
        .media
        .update_details(
            media.id,
            MediaUpdate {
                caption: Some("Control room".to_string()),
                is_home_slider: Some(true),
                is_featured: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.caption, "Control room");
    assert!(updated.is_home_slider);
    assert!(!stack.cache.contains("home:v1"));
    assert!(!stack.cache.contains("division:energy"));

    let home = stack.snapshots.get(&CacheKey::Home).await.unwrap();
    assert!(home.contains(&media.id.to_string()));
}
