mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create_tag(client: &reqwest::Client, server: &common::TestServer, user: &common::TestUser, name: &str) -> Result<Value> {
    let res = client
        .post(server.url("/api/tags"))
        .bearer_auth(&user.token)
        .json(&json!({"name": name}))
        .send()
        .await?;
    common::expect_data(res, StatusCode::CREATED).await
}

async fn create_note(client: &reqwest::Client, server: &common::TestServer, user: &common::TestUser, title: &str) -> Result<Value> {
    let res = client
        .post(server.url(&format!("/api/users/{}/notes", user.id)))
        .bearer_auth(&user.token)
        .json(&json!({"title": title, "content": "body"}))
        .send()
        .await?;
    common::expect_data(res, StatusCode::CREATED).await
}

async fn link(client: &reqwest::Client, server: &common::TestServer, user: &common::TestUser, note: &Value, tag: &Value) -> Result<reqwest::Response> {
    Ok(client
        .post(server.url(&format!("/api/users/{}/notes/{}/tags", user.id, note["id"])))
        .bearer_auth(&user.token)
        .json(&json!({"tag_id": tag["id"]}))
        .send()
        .await?)
}

#[tokio::test]
async fn tag_names_are_unique() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let user = common::create_user().await?;
    let client = reqwest::Client::new();
    let name = common::unique("work");

    let tag = create_tag(&client, server, &user, &name).await?;
    assert_eq!(tag["name"], name.as_str());

    let res = client
        .post(server.url("/api/tags"))
        .bearer_auth(&user.token)
        .json(&json!({"name": format!("  {}  ", name)}))
        .send()
        .await?;
    common::expect_error(res, StatusCode::CONFLICT).await?;

    let res = client.get(server.url("/api/tags")).bearer_auth(&user.token).send().await?;
    let tags = common::expect_data(res, StatusCode::OK).await?;
    assert!(tags.as_array().into_iter().flatten().any(|t| t["name"] == name.as_str()));
    Ok(())
}

#[tokio::test]
async fn tag_filter_returns_each_note_once() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let user = common::create_user().await?;
    let client = reqwest::Client::new();

    let work = create_tag(&client, server, &user, &common::unique("work")).await?;
    let urgent = create_tag(&client, server, &user, &common::unique("urgent")).await?;
    let tagged = create_note(&client, server, &user, "tagged twice").await?;
    let plain = create_note(&client, server, &user, "untagged").await?;

    common::expect_data(link(&client, server, &user, &tagged, &work).await?, StatusCode::CREATED).await?;
    common::expect_data(link(&client, server, &user, &tagged, &urgent).await?, StatusCode::CREATED).await?;
    common::expect_error(link(&client, server, &user, &tagged, &work).await?, StatusCode::CONFLICT).await?;

    let res = client
        .get(server.url(&format!("/api/users/{}/notes", user.id)))
        .query(&[("tag", work["name"].as_str().unwrap_or_default())])
        .bearer_auth(&user.token)
        .send()
        .await?;
    let page = common::expect_data(res, StatusCode::OK).await?;
    let ids: Vec<&Value> = page["notes"].as_array().into_iter().flatten().map(|n| &n["id"]).collect();
    assert_eq!(ids, vec![&tagged["id"]]);
    assert_eq!(page["totalPages"], 1);
    assert_ne!(tagged["id"], plain["id"]);

    let res = client
        .get(server.url(&format!("/api/users/{}/tags", user.id)))
        .bearer_auth(&user.token)
        .send()
        .await?;
    let owner_tags = common::expect_data(res, StatusCode::OK).await?;
    assert_eq!(owner_tags.as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test]
async fn linking_requires_existing_owned_note_and_tag() -> Result<()> {
    let Some(server) = common::ensure_server().await? else { return Ok(()) };
    let alice = common::create_user().await?;
    let bob = common::create_user().await?;
    let client = reqwest::Client::new();

    let tag = create_tag(&client, server, &alice, &common::unique("misc")).await?;
    let bobs_note = create_note(&client, server, &bob, "bob's").await?;
    let alices_note = create_note(&client, server, &alice, "alice's").await?;

    common::expect_error(link(&client, server, &alice, &bobs_note, &tag).await?, StatusCode::FORBIDDEN).await?;
    common::expect_error(
        link(&client, server, &alice, &alices_note, &json!({"id": -1})).await?,
        StatusCode::NOT_FOUND,
    )
    .await?;
    common::expect_error(
        link(&client, server, &alice, &json!({"id": -1}), &tag).await?,
        StatusCode::NOT_FOUND,
    )
    .await?;
    Ok(())
}
