#![allow(dead_code)]

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::Value;

use notes_api::auth::{generate_token, Claims};

pub const JWT_SECRET: &str = "integration-test-secret";

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub upload_dir: PathBuf,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let upload_dir = std::env::temp_dir().join(format!("notes-api-test-uploads-{}", port));

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_notes-api"));
        cmd.arg("--init-schema")
            .env("NOTES_API_PORT", port.to_string())
            .env("JWT_SECRET", JWT_SECRET)
            .env("UPLOAD_DIR", &upload_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // DATABASE_URL is inherited from the environment / .env
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, upload_dir, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Start (once) and return the shared server, or `None` when no database is
/// configured, in which case the calling test should return early.
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    let _ = dotenvy::dotenv();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return Ok(None);
    }

    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(Some(server))
}

pub struct TestUser {
    pub id: i64,
    pub email: String,
    pub token: String,
}

/// Insert a fresh account directly and mint a session token for it.
pub async fn create_user() -> Result<TestUser> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let pool = sqlx::PgPool::connect(&url).await?;

    let handle = uuid::Uuid::new_v4().simple().to_string();
    let email = format!("{}@example.test", handle);
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, email, password) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&handle[..12])
    .bind(&email)
    .bind("unused-password-hash")
    .fetch_one(&pool)
    .await?;
    pool.close().await;

    let token = generate_token(&Claims::new(id, Some(email.clone()), 1), JWT_SECRET)?;
    Ok(TestUser { id, email, token })
}

pub fn unique(prefix: &str) -> String {
    format!("{}-{}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..10])
}

/// Assert the status and unwrap the `data` field of a success envelope.
pub async fn expect_data(res: reqwest::Response, status: StatusCode) -> Result<Value> {
    let actual = res.status();
    let body = res.json::<Value>().await?;
    assert_eq!(actual, status, "unexpected status, body: {}", body);
    assert_eq!(body["success"], true, "success flag false or missing: {}", body);
    Ok(body["data"].clone())
}

pub async fn expect_error(res: reqwest::Response, status: StatusCode) -> Result<Value> {
    let actual = res.status();
    let body = res.json::<Value>().await?;
    assert_eq!(actual, status, "unexpected status, body: {}", body);
    assert_eq!(body["error"], true, "error flag missing: {}", body);
    Ok(body)
}
