mod common;

use anyhow::Result;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

fn note_form(title: &str, file: Option<(&str, &'static [u8])>) -> Form {
    let form = Form::new().text("title", title.to_string()).text("content", "with attachment");
    match file {
        Some((name, bytes)) => form.part("file", Part::bytes(bytes).file_name(name.to_string())),
        None => form,
    }
}

fn stored_path(note: &Value) -> String {
    note["file_path"].as_str().unwrap_or_default().to_string()
}

#[tokio::test]
async fn attachment_follows_note_lifecycle() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let user = common::create_user().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url(&format!("/api/users/{}/notes", user.id)))
        .bearer_auth(&user.token)
        .multipart(note_form("scan", Some(("first.txt", &b"first"[..]))))
        .send()
        .await?;
    let note = common::expect_data(res, StatusCode::CREATED).await?;
    let first = stored_path(&note);
    assert!(first.ends_with(".txt"), "unexpected stored path: {}", first);
    assert_eq!(std::fs::read(server.upload_dir.join(&first))?, b"first");

    let note_url = server.url(&format!("/api/users/{}/notes/{}", user.id, note["id"]));
    let file_url = format!("{}/file", note_url);

    // Served only to the owner
    let res = client.get(&file_url).send().await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let res = client.get(&file_url).bearer_auth(&user.token).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.bytes().await?.as_ref(), b"first");

    // Update without a file keeps the attachment
    let res = client
        .put(&note_url)
        .bearer_auth(&user.token)
        .multipart(note_form("scan v2", None))
        .send()
        .await?;
    let kept = common::expect_data(res, StatusCode::OK).await?;
    assert_eq!(stored_path(&kept), first);
    assert!(server.upload_dir.join(&first).exists());

    // Update with a file replaces it and removes the old one
    let res = client
        .put(&note_url)
        .bearer_auth(&user.token)
        .multipart(note_form("scan v3", Some(("second.txt", &b"second"[..]))))
        .send()
        .await?;
    let replaced = common::expect_data(res, StatusCode::OK).await?;
    let second = stored_path(&replaced);
    assert_ne!(second, first);
    assert!(!server.upload_dir.join(&first).exists(), "stale file left behind");
    assert_eq!(std::fs::read(server.upload_dir.join(&second))?, b"second");

    // Delete removes the row and the file
    let res = client.delete(&note_url).bearer_auth(&user.token).send().await?;
    common::expect_data(res, StatusCode::OK).await?;
    assert!(!server.upload_dir.join(&second).exists(), "file outlived its note");
    Ok(())
}

#[tokio::test]
async fn rejected_create_leaves_no_file() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let user = common::create_user().await?;
    let client = reqwest::Client::new();

    let before = std::fs::read_dir(&server.upload_dir).map(|d| d.count()).unwrap_or(0);
    let res = client
        .post(server.url(&format!("/api/users/{}/notes", user.id)))
        .bearer_auth(&user.token)
        .multipart(note_form("   ", Some(("orphan.txt", &b"orphan"[..]))))
        .send()
        .await?;
    common::expect_error(res, StatusCode::BAD_REQUEST).await?;

    let orphaned = std::fs::read_dir(&server.upload_dir)
        .into_iter()
        .flatten()
        .flatten()
        .filter(|entry| std::fs::read(entry.path()).map(|b| b == b"orphan").unwrap_or(false))
        .count();
    assert_eq!(orphaned, 0, "upload survived a rejected create (dir had {} files)", before);
    Ok(())
}

#[tokio::test]
async fn attachment_is_private_to_its_owner() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let alice = common::create_user().await?;
    let bob = common::create_user().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(server.url(&format!("/api/users/{}/notes", alice.id)))
        .bearer_auth(&alice.token)
        .multipart(note_form("private scan", Some(("secret.txt", &b"secret"[..]))))
        .send()
        .await?;
    let note = common::expect_data(res, StatusCode::CREATED).await?;

    for owner in [alice.id, bob.id] {
        let res = client
            .get(server.url(&format!("/api/users/{}/notes/{}/file", owner, note["id"])))
            .bearer_auth(&bob.token)
            .send()
            .await?;
        common::expect_error(res, StatusCode::FORBIDDEN).await?;
    }

    // The stored file name alone grants nothing
    let res = client
        .get(server.url(&format!("/uploads/{}", stored_path(&note))))
        .bearer_auth(&bob.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn refused_upload_writes_no_file() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let alice = common::create_user().await?;
    let bob = common::create_user().await?;
    let client = reqwest::Client::new();

    let count = || std::fs::read_dir(&server.upload_dir).map(|d| d.count()).unwrap_or(0);
    let before = count();
    let res = client
        .post(server.url(&format!("/api/users/{}/notes", alice.id)))
        .bearer_auth(&bob.token)
        .multipart(note_form("not yours", Some(("intruder.txt", &b"intruder"[..]))))
        .send()
        .await?;
    common::expect_error(res, StatusCode::FORBIDDEN).await?;
    // Other tests may add files concurrently; none of them carry this payload.
    let intruder = std::fs::read_dir(&server.upload_dir)
        .into_iter()
        .flatten()
        .flatten()
        .filter(|entry| std::fs::read(entry.path()).map(|b| b == b"intruder").unwrap_or(false))
        .count();
    assert_eq!(intruder, 0, "refused upload reached disk ({} files before)", before);
    Ok(())
}

