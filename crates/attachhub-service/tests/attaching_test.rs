//! Integration tests for binding content records to attachments.

mod helpers;

use attachhub_core::error::ErrorKind;
use attachhub_core::traits::attachment::HasAttachment;
use attachhub_entity::attachment::{AttachmentParams, FileUpload};
use attachhub_entity::content::{ContentChanges, ContentType, NewContent};

use helpers::{TestApp, jpg};

const ATTACHABLE: ContentType = ContentType::ATTACHABLE;

#[tokio::test]
async fn test_create_with_section_file_and_path() {
    let app = TestApp::new().await;

    let record = app
        .services
        .content
        .create(
            ATTACHABLE,
            NewContent::named("Foo")
                .with_attachment(app.in_root(jpg("foo.jpg", b"jpeg data")).path("test.jpg")),
        )
        .await
        .unwrap();

    assert!(record.has_attachment());
    assert_eq!(record.attachment_version, Some(1));
    assert_eq!(
        app.services.content.attachment_file_path(&record).await.unwrap(),
        Some("/test.jpg".to_string())
    );
    assert_eq!(
        app.services.content.attachment_section(&record).await.unwrap(),
        Some(app.root.clone())
    );

    let attachment = app.services.content.attachment(&record).await.unwrap().unwrap();
    assert_eq!(attachment.file_name, "foo.jpg");
    assert_eq!(attachment.file_type.as_deref(), Some("image/jpeg"));
    assert_eq!(attachment.file_size, 9);
    assert_eq!(app.attachment_counts().await, (1, 1));
}

#[tokio::test]
async fn test_section_without_file_is_rejected() {
    let app = TestApp::new().await;

    let err = app
        .services
        .content
        .create(
            ATTACHABLE,
            NewContent::named("Foo").with_attachment(AttachmentParams::default().section(app.root.id)),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::MissingSectionOrFile);
    assert_eq!(app.services.content.count(ATTACHABLE).await.unwrap(), 0);
    assert_eq!(app.attachment_counts().await, (0, 0));
}

#[tokio::test]
async fn test_path_or_file_without_section_is_rejected() {
    let app = TestApp::new().await;

    for params in [
        AttachmentParams::default().path("test.jpg"),
        AttachmentParams::default().file(jpg("foo.jpg", b"x")),
    ] {
        let err = app
            .services
            .content
            .create(ATTACHABLE, NewContent::named("Foo").with_attachment(params))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingSectionOrFile);
    }

    assert_eq!(app.services.content.count(ATTACHABLE).await.unwrap(), 0);
    assert_eq!(app.attachment_counts().await, (0, 0));
}

#[tokio::test]
async fn test_record_without_attachment() {
    let app = TestApp::new().await;

    let record = app
        .services
        .content
        .create(ATTACHABLE, NewContent::named("Plain"))
        .await
        .unwrap();

    assert!(!record.has_attachment());
    assert_eq!(app.services.content.attachment(&record).await.unwrap(), None);
    assert_eq!(app.services.content.attachment_file_path(&record).await.unwrap(), None);
    assert_eq!(app.services.content.attachment_section(&record).await.unwrap(), None);
}

#[tokio::test]
async fn test_screwy_file_name_is_sanitized() {
    let app = TestApp::new().await;

    let record = app
        .services
        .content
        .create(
            ATTACHABLE,
            NewContent::named("Screwy").with_attachment(app.in_root(FileUpload::new(
                "Broken? Yes & No!.txt",
                None,
                &b"text"[..],
            ))),
        )
        .await
        .unwrap();

    assert_eq!(
        app.services.content.attachment_file_path(&record).await.unwrap(),
        Some("/Broken_Yes_-_No.txt".to_string())
    );
    let attachment = app.services.content.attachment(&record).await.unwrap().unwrap();
    assert_eq!(attachment.file_name, "Broken? Yes & No!.txt");
    assert_eq!(attachment.file_type.as_deref(), Some("text/plain"));
}

#[tokio::test]
async fn test_path_update_bumps_attachment_version() {
    let app = TestApp::new().await;
    let record = app
        .services
        .content
        .create(
            ATTACHABLE,
            NewContent::named("Foo")
                .with_attachment(app.in_root(jpg("foo.jpg", b"jpeg")).path("test.jpg")),
        )
        .await
        .unwrap();
    let (_, versions_before) = app.attachment_counts().await;

    let updated = app
        .services
        .content
        .update(
            ATTACHABLE,
            record.id,
            ContentChanges::attachment(AttachmentParams::default().path("test2.jpg")),
        )
        .await
        .unwrap();

    assert_eq!(updated.attachment_id, record.attachment_id);
    assert_eq!(updated.attachment_version, Some(2));
    assert_eq!(app.attachment_counts().await, (1, versions_before + 1));
    assert_eq!(
        app.services.content.attachment_file_path(&updated).await.unwrap(),
        Some("/test2.jpg".to_string())
    );
}

#[tokio::test]
async fn test_file_update_keeps_old_content_readable() {
    let app = TestApp::new().await;
    let record = app
        .services
        .content
        .create(
            ATTACHABLE,
            NewContent::named("Foo").with_attachment(app.in_root(jpg("foo.jpg", b"first"))),
        )
        .await
        .unwrap();

    let updated = app
        .services
        .content
        .update(
            ATTACHABLE,
            record.id,
            ContentChanges::attachment(AttachmentParams::default().file(jpg("foo.jpg", b"second"))),
        )
        .await
        .unwrap();
    assert_eq!(updated.attachment_version, Some(2));

    let attachments = &app.services.attachments;
    let (attachment_id, _) = updated.attachment_ref().unwrap();
    let v1 = attachments.version_at(attachment_id, 1).await.unwrap();
    let v2 = attachments.version_at(attachment_id, 2).await.unwrap();
    assert_ne!(v1.file_location, v2.file_location);
    assert_eq!(v1.file_path, v2.file_path);

    let old = tokio::fs::read(attachments.full_file_location(&v1)).await.unwrap();
    let new = tokio::fs::read(attachments.full_file_location(&v2)).await.unwrap();
    assert_eq!(old, b"first");
    assert_eq!(new, b"second");
}

#[tokio::test]
async fn test_adding_attachment_on_update() {
    let app = TestApp::new().await;
    let record = app
        .services
        .content
        .create(ATTACHABLE, NewContent::named("Later"))
        .await
        .unwrap();

    let err = app
        .services
        .content
        .update(
            ATTACHABLE,
            record.id,
            ContentChanges::attachment(AttachmentParams::default().path("late.jpg")),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingSectionOrFile);

    let updated = app
        .services
        .content
        .update(
            ATTACHABLE,
            record.id,
            ContentChanges::attachment(app.in_root(jpg("late.jpg", b"late"))),
        )
        .await
        .unwrap();
    assert_eq!(updated.attachment_version, Some(1));
    assert_eq!(
        app.services.content.attachment_file_path(&updated).await.unwrap(),
        Some("/late.jpg".to_string())
    );
}

#[tokio::test]
async fn test_moving_to_missing_section_changes_nothing() {
    let app = TestApp::new().await;
    let record = app
        .services
        .content
        .create(
            ATTACHABLE,
            NewContent::named("Foo").with_attachment(app.in_root(jpg("foo.jpg", b"jpeg"))),
        )
        .await
        .unwrap();

    let err = app
        .services
        .content
        .update(
            ATTACHABLE,
            record.id,
            ContentChanges::attachment(
                AttachmentParams::default().section(attachhub_core::types::id::SectionId::new(999)),
            ),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::NotFound);
    assert_eq!(app.attachment_counts().await, (1, 1));
    assert_eq!(
        app.services.content.find(ATTACHABLE, record.id).await.unwrap(),
        record
    );
}

#[tokio::test]
async fn test_block_without_attaching_behavior() {
    let app = TestApp::new().await;
    let block = ContentType::HTML_BLOCK;
    assert!(!block.belongs_to_attachment());

    let err = app
        .services
        .content
        .create(
            block,
            NewContent::named("Block").with_attachment(app.in_root(jpg("foo.jpg", b"x"))),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(app.attachment_counts().await, (0, 0));

    let record = app
        .services
        .content
        .create(block, NewContent::named("Block"))
        .await
        .unwrap();
    assert!(!record.has_attachment());
}
