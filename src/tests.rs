//! Integration tests for the portfolio backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_database, Repository};
use crate::media::{self, MediaError, MediaHost, UploadedMedia};
use crate::{create_router, AppState};

/// Media host that records calls instead of talking to a remote service.
///
/// Uploads of files named `broken*` fail.
#[derive(Default)]
struct RecordingMedia {
    uploads: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaHost for RecordingMedia {
    async fn upload(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        _content_type: &str,
        folder: &str,
    ) -> media::Result<UploadedMedia> {
        if filename.starts_with("broken") {
            return Err(MediaError::Api {
                status: 502,
                body: "upstream unavailable".to_string(),
            });
        }
        let mut uploads = self.uploads.lock().unwrap();
        let public_id = format!("{}/img-{}", folder, uploads.len() + 1);
        uploads.push(format!("{}:{}", folder, filename));
        Ok(UploadedMedia {
            url: format!("https://media.test/{}.png", public_id),
            public_id,
            width: 800,
            height: bytes.len() as i64,
            format: "png".to_string(),
        })
    }

    async fn delete(&self, public_id: &str) -> media::Result<()> {
        self.deleted.lock().unwrap().push(public_id.to_string());
        Ok(())
    }
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    media: Arc<RecordingMedia>,
    admin_token: String,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_environment("test").await
    }

    async fn with_environment(environment: &str) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool));

        // Create config
        let config = Config {
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            log_json: false,
            environment: environment.to_string(),
            jwt_secret: "integration-test-secret".to_string(),
            jwt_expires_in_days: 7,
            frontend_url: None,
            media: None,
            bootstrap_admin: None,
        };

        let media = Arc::new(RecordingMedia::default());
        let state = AppState {
            repo,
            media: media.clone(),
            config: Arc::new(config),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let mut fixture = TestFixture {
            client: Client::new(),
            base_url,
            media,
            admin_token: String::new(),
            _temp_dir: temp_dir,
        };

        // The first account may claim the admin role
        let (status, body) = fixture
            .post(
                "/api/auth/register",
                None,
                json!({
                    "name": "Daniela",
                    "email": "admin@test.dev",
                    "password": "secret123",
                    "role": "admin"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        fixture.admin_token = body["token"].as_str().unwrap().to_string();
        fixture
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn admin(&self) -> Option<&str> {
        Some(&self.admin_token)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let resp = request.send().await.unwrap();
        let status = resp.status();
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(self.client.get(self.url(path)), token).await
    }

    async fn post(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(self.client.post(self.url(path)).json(&body), token)
            .await
    }

    async fn put(&self, path: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(self.client.put(self.url(path)).json(&body), token)
            .await
    }

    async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(self.client.delete(self.url(path)), token).await
    }

    async fn create_category(&self, name: &str) -> String {
        let (status, body) = self
            .post("/api/categories", self.admin(), json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_style(&self, name: &str) -> String {
        let (status, body) = self
            .post("/api/styles", self.admin(), json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_str().unwrap().to_string()
    }

    async fn create_tattoo(&self, category: &str, style: &str, published: bool) -> Value {
        let (status, body) = self
            .post(
                "/api/tattoos",
                self.admin(),
                json!({
                    "title": "Koi",
                    "description": "Koi fish on the forearm",
                    "category": category,
                    "style": style,
                    "isPublished": published,
                    "images": [{
                        "url": "https://media.test/koi.png",
                        "publicId": "daniela-tattoos/koi",
                        "width": 800,
                        "height": 600
                    }]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"].clone()
    }

    /// Stored category count, read directly from the record.
    async fn category_count(&self, id: &str) -> i64 {
        let (status, body) = self.get(&format!("/api/categories/{}", id), None).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["data"]["tattooCount"].as_i64().unwrap()
    }

    async fn style_count(&self, id: &str) -> i64 {
        let (status, body) = self.get(&format!("/api/styles/{}", id), None).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["data"]["tattooCount"].as_i64().unwrap()
    }

    async fn user_token(&self) -> String {
        let (status, body) = self
            .post(
                "/api/auth/register",
                None,
                json!({ "name": "Visitor", "email": "visitor@test.dev", "password": "secret123" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["token"].as_str().unwrap().to_string()
    }
}

fn png(name: &str) -> Part {
    Part::bytes(vec![0x89, b'P', b'N', b'G'])
        .file_name(name.to_string())
        .mime_str("image/png")
        .unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

// ==================== Accounts ====================

#[tokio::test]
async fn test_register_login_and_profile() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "ADMIN@test.dev", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["user"]["role"], "admin");
    assert!(body["data"]["user"]["lastLogin"].is_string());
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let (status, body) = fixture.get("/api/auth/profile", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["email"], "admin@test.dev");

    let (status, body) = fixture
        .put(
            "/api/auth/profile",
            Some(&token),
            json!({ "bio": "Tattoo artist" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["bio"], "Tattoo artist");
    assert_eq!(body["data"]["user"]["name"], "Daniela");
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "admin@test.dev", "password": "wrong-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");

    let (status, _) = fixture
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "nobody@test.dev", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_role_requires_admin_after_bootstrap() {
    let fixture = TestFixture::new().await;

    let (status, _) = fixture
        .post(
            "/api/auth/register",
            None,
            json!({
                "name": "Intruder",
                "email": "intruder@test.dev",
                "password": "secret123",
                "role": "admin"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = fixture
        .post(
            "/api/auth/register",
            fixture.admin(),
            json!({
                "name": "Second Admin",
                "email": "second@test.dev",
                "password": "secret123",
                "role": "admin"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["user"]["role"], "admin");

    let (status, body) = fixture.get("/api/auth/users", fixture.admin()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/auth/register",
            None,
            json!({ "name": "Copy", "email": "admin@test.dev", "password": "secret123" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE");
}

#[tokio::test]
async fn test_change_password() {
    let fixture = TestFixture::new().await;

    let (status, _) = fixture
        .put(
            "/api/auth/change-password",
            fixture.admin(),
            json!({ "currentPassword": "nope", "newPassword": "another123" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = fixture
        .put(
            "/api/auth/change-password",
            fixture.admin(),
            json!({ "currentPassword": "secret123", "newPassword": "another123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = fixture
        .post(
            "/api/auth/login",
            None,
            json!({ "email": "admin@test.dev", "password": "another123" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_access_modes() {
    let fixture = TestFixture::new().await;
    let user = fixture.user_token().await;

    // Missing token
    let (status, body) = fixture
        .post("/api/categories", None, json!({ "name": "Realista" }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    // Garbage token
    let (status, _) = fixture
        .post(
            "/api/categories",
            Some("not-a-token"),
            json!({ "name": "Realista" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Valid token without the admin role
    let (status, body) = fixture
        .post("/api/categories", Some(&user), json!({ "name": "Realista" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = fixture.get("/api/auth/users", Some(&user)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Public routes ignore bad credentials
    let (status, _) = fixture.get("/api/tattoos", Some("not-a-token")).await;
    assert_eq!(status, StatusCode::OK);
}

// ==================== Categories & styles ====================

#[tokio::test]
async fn test_category_crud_and_slug() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/categories",
            fixture.admin(),
            json!({ "name": "Blackwork & Co.", "color": "#112233" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["slug"], "blackwork-and-co");
    assert_eq!(body["data"]["tattooCount"], 0);

    let (status, body) = fixture.get("/api/categories/blackwork-and-co", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], id.as_str());

    let (status, body) = fixture
        .put(
            &format!("/api/categories/{}", id),
            fixture.admin(),
            json!({ "name": "Línea Fina" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["slug"], "linea-fina");
    assert_eq!(body["data"]["color"], "#112233");

    let (status, body) = fixture
        .post(
            "/api/categories",
            fixture.admin(),
            json!({ "name": "Línea Fina" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DUPLICATE");

    let (status, _) = fixture
        .delete(&format!("/api/categories/{}", id), fixture.admin())
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = fixture.get(&format!("/api/categories/{}", id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_validation_errors_use_envelope() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/categories",
            fixture.admin(),
            json!({ "name": "R", "color": "blue" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["color", "name"]);

    // Malformed JSON body
    let resp = fixture
        .client
        .post(fixture.url("/api/styles"))
        .bearer_auth(&fixture.admin_token)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_replacing_category_image_deletes_old_one() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture
        .post(
            "/api/categories",
            fixture.admin(),
            json!({
                "name": "Acuarela",
                "image": { "url": "https://media.test/old.png", "publicId": "cat/old" }
            }),
        )
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = fixture
        .put(
            &format!("/api/categories/{}", id),
            fixture.admin(),
            json!({ "image": { "url": "https://media.test/new.png", "publicId": "cat/new" } }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["image"]["publicId"], "cat/new");
    assert_eq!(*fixture.media.deleted.lock().unwrap(), vec!["cat/old"]);

    let (status, body) = fixture
        .put(
            &format!("/api/categories/{}", id),
            fixture.admin(),
            json!({ "image": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].get("image").is_none());
    assert_eq!(
        *fixture.media.deleted.lock().unwrap(),
        vec!["cat/old", "cat/new"]
    );
}

#[tokio::test]
async fn test_style_list_filter_and_delete_guard() {
    let fixture = TestFixture::new().await;
    let category = fixture.create_category("Realista").await;
    let used = fixture.create_style("Blackwork").await;

    let (status, _) = fixture
        .post(
            "/api/styles",
            fixture.admin(),
            json!({ "name": "Acuarela", "isActive": false }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = fixture.get("/api/styles", None).await;
    assert_eq!(body["count"], 2);
    let (_, body) = fixture.get("/api/styles?isActive=true", None).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Blackwork");

    fixture.create_tattoo(&category, &used, false).await;

    let (status, body) = fixture
        .delete(&format!("/api/styles/{}", used), fixture.admin())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "HAS_DEPENDENTS");
    assert_eq!(fixture.style_count(&used).await, 1);
}

// ==================== Count synchronization ====================

#[tokio::test]
async fn test_counts_follow_publication_asymmetry() {
    let fixture = TestFixture::new().await;
    let category = fixture.create_category("Realista").await;
    let style = fixture.create_style("Blackwork").await;

    fixture.create_tattoo(&category, &style, true).await;
    assert_eq!(fixture.category_count(&category).await, 1);
    assert_eq!(fixture.style_count(&style).await, 1);

    // An unpublished tattoo counts for the style only
    let draft = fixture.create_tattoo(&category, &style, false).await;
    assert_eq!(fixture.category_count(&category).await, 1);
    assert_eq!(fixture.style_count(&style).await, 2);

    // Publishing in place updates the category
    let draft_id = draft["id"].as_str().unwrap();
    let (status, _) = fixture
        .put(
            &format!("/api/tattoos/{}", draft_id),
            fixture.admin(),
            json!({ "isPublished": true }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fixture.category_count(&category).await, 2);
    assert_eq!(fixture.style_count(&style).await, 2);

    // The public listing reports live published counts too
    let (_, body) = fixture.get("/api/categories", None).await;
    assert_eq!(body["data"][0]["tattooCount"], 2);
}

#[tokio::test]
async fn test_moving_a_tattoo_recounts_both_categories() {
    let fixture = TestFixture::new().await;
    let a = fixture.create_category("Realista").await;
    let b = fixture.create_category("Tradicional").await;
    let style = fixture.create_style("Blackwork").await;
    let other_style = fixture.create_style("Fine Line").await;

    let moving = fixture.create_tattoo(&a, &style, true).await;
    fixture.create_tattoo(&a, &style, true).await;
    fixture.create_tattoo(&a, &style, true).await;
    fixture.create_tattoo(&b, &style, true).await;
    assert_eq!(fixture.category_count(&a).await, 3);
    assert_eq!(fixture.category_count(&b).await, 1);

    let (status, body) = fixture
        .put(
            &format!("/api/tattoos/{}", moving["id"].as_str().unwrap()),
            fixture.admin(),
            json!({ "category": b, "style": other_style }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    assert_eq!(fixture.category_count(&a).await, 2);
    assert_eq!(fixture.category_count(&b).await, 2);
    assert_eq!(fixture.style_count(&style).await, 3);
    assert_eq!(fixture.style_count(&other_style).await, 1);
}

#[tokio::test]
async fn test_deleting_a_tattoo_excludes_it_from_counts() {
    let fixture = TestFixture::new().await;
    let category = fixture.create_category("Realista").await;
    let style = fixture.create_style("Blackwork").await;

    fixture.create_tattoo(&category, &style, true).await;
    let doomed = fixture.create_tattoo(&category, &style, true).await;
    let doomed_id = doomed["id"].as_str().unwrap();

    let (status, _) = fixture
        .delete(&format!("/api/tattoos/{}", doomed_id), fixture.admin())
        .await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(fixture.category_count(&category).await, 1);
    assert_eq!(fixture.style_count(&style).await, 1);
    assert!(fixture
        .media
        .deleted
        .lock()
        .unwrap()
        .contains(&"daniela-tattoos/koi".to_string()));

    let (status, _) = fixture
        .get(&format!("/api/tattoos/{}", doomed_id), fixture.admin())
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_with_tattoos_cannot_be_deleted() {
    let fixture = TestFixture::new().await;
    let category = fixture.create_category("Realista").await;
    let style = fixture.create_style("Blackwork").await;
    fixture.create_tattoo(&category, &style, true).await;

    let (status, body) = fixture
        .delete(&format!("/api/categories/{}", category), fixture.admin())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "HAS_DEPENDENTS");

    // No state change
    assert_eq!(fixture.category_count(&category).await, 1);

    // An unpublished tattoo still blocks deletion
    let empty = fixture.create_category("Acuarela").await;
    fixture.create_tattoo(&empty, &style, false).await;
    let (status, _) = fixture
        .delete(&format!("/api/categories/{}", empty), fixture.admin())
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_tattoo_with_unknown_category_is_rejected() {
    let fixture = TestFixture::new().await;
    let style = fixture.create_style("Blackwork").await;

    let (status, body) = fixture
        .post(
            "/api/tattoos",
            fixture.admin(),
            json!({
                "title": "Koi",
                "description": "Koi fish",
                "category": "missing",
                "style": style
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "category");
    assert_eq!(fixture.style_count(&style).await, 0);
}

// ==================== Tattoos ====================

#[tokio::test]
async fn test_public_tattoo_visibility_and_views() {
    let fixture = TestFixture::new().await;
    let category = fixture.create_category("Realista").await;
    let style = fixture.create_style("Blackwork").await;

    let public = fixture.create_tattoo(&category, &style, true).await;
    let draft = fixture.create_tattoo(&category, &style, false).await;

    let (_, body) = fixture.get("/api/tattoos?isPublished=false", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["id"], public["id"]);

    let (_, body) = fixture
        .get("/api/tattoos?isPublished=false", fixture.admin())
        .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["id"], draft["id"]);

    let (status, _) = fixture
        .get(
            &format!("/api/tattoos/{}", draft["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let path = format!("/api/tattoos/{}", public["id"].as_str().unwrap());
    let (_, body) = fixture.get(&path, None).await;
    assert_eq!(body["data"]["views"], 1);
    let (_, body) = fixture.get(&path, None).await;
    assert_eq!(body["data"]["views"], 2);

    // Admin reads do not count
    let (_, body) = fixture.get(&path, fixture.admin()).await;
    assert_eq!(body["data"]["views"], 2);
}

#[tokio::test]
async fn test_tattoo_listing_pagination() {
    let fixture = TestFixture::new().await;
    let category = fixture.create_category("Realista").await;
    let style = fixture.create_style("Blackwork").await;
    for _ in 0..5 {
        fixture.create_tattoo(&category, &style, true).await;
    }

    let (status, body) = fixture
        .get("/api/tattoos?page=2&limit=2&sort=newest", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["total"], 5);
    assert_eq!(body["pagination"]["page"], 2);
    assert_eq!(body["pagination"]["pages"], 3);

    let (status, body) = fixture.get("/api/tattoos?sort=sideways", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_reorder_sets_positions_only() {
    let fixture = TestFixture::new().await;
    let a = fixture.create_style("A").await;
    let b = fixture.create_style("B").await;
    let c = fixture.create_style("C").await;

    let (status, _) = fixture
        .put(
            "/api/styles/reorder",
            fixture.admin(),
            json!({ "styles": [
                { "id": c, "position": 0 },
                { "id": a, "position": 2 },
                { "id": b, "position": 1 }
            ] }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = fixture.get("/api/styles", None).await;
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["C", "B", "A"]);
    assert_eq!(body["data"][0]["slug"], "c");

    let (status, _) = fixture
        .put(
            "/api/styles/reorder",
            fixture.admin(),
            json!({ "styles": [
                { "id": a, "position": 9 },
                { "id": "missing", "position": 0 }
            ] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = fixture.get(&format!("/api/styles/{}", a), None).await;
    assert_eq!(body["data"]["position"], 2);
}

#[tokio::test]
async fn test_tattoo_stats() {
    let fixture = TestFixture::new().await;
    let category = fixture.create_category("Realista").await;
    let style = fixture.create_style("Blackwork").await;
    fixture.create_tattoo(&category, &style, true).await;
    fixture.create_tattoo(&category, &style, false).await;

    let (status, _) = fixture.get("/api/tattoos/stats", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = fixture.get("/api/tattoos/stats", fixture.admin()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    assert_eq!(body["data"]["published"], 1);
    assert_eq!(body["data"]["byStyle"][0]["count"], 2);
}

// ==================== Uploads & settings ====================

#[tokio::test]
async fn test_upload_images() {
    let fixture = TestFixture::new().await;

    let form = Form::new().part("images", png("a.png")).part("images", png("b.png"));
    let resp = fixture
        .client
        .post(fixture.url("/api/upload"))
        .bearer_auth(&fixture.admin_token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    let images = body["data"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["publicId"], "daniela-tattoos/img-1");
    assert_eq!(images[0]["width"], 800);

    // Non-image files are refused before anything is uploaded
    let text = Part::bytes(b"hello".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")
        .unwrap();
    let resp = fixture
        .client
        .post(fixture.url("/api/upload"))
        .bearer_auth(&fixture.admin_token)
        .multipart(Form::new().part("images", text))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fixture.media.uploads.lock().unwrap().len(), 2);

    // Public ids may contain slashes
    let (status, _) = fixture
        .delete("/api/upload/daniela-tattoos/img-1", fixture.admin())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        *fixture.media.deleted.lock().unwrap(),
        vec!["daniela-tattoos/img-1"]
    );
}

#[tokio::test]
async fn test_settings_defaults_and_update() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get("/api/settings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["settings"]["hero"]["source"], "latest_featured");
    assert_eq!(body["data"]["settings"]["about"]["experienceYear"], 2014);

    let form = Form::new()
        .text(
            "settings",
            json!({
                "hero": { "title": "Nuevo Título", "overlayOpacity": 0.4 },
                "footer": { "phone": "555-0100" }
            })
            .to_string(),
        )
        .part("heroImage", png("hero.png"));
    let resp = fixture
        .client
        .put(fixture.url("/api/settings"))
        .bearer_auth(&fixture.admin_token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let settings = &body["data"]["settings"];
    assert_eq!(settings["hero"]["title"], "Nuevo Título");
    assert_eq!(settings["hero"]["overlayOpacity"], 0.4);
    assert_eq!(
        settings["hero"]["customImagePublicId"],
        "daniela-tattoos/settings/img-1"
    );
    assert_eq!(settings["footer"]["phone"], "555-0100");
    assert_eq!(settings["footer"]["title"], "Daniela Tattoos");

    // Persisted
    let (_, body) = fixture.get("/api/settings", None).await;
    assert_eq!(body["data"]["settings"]["footer"]["phone"], "555-0100");

    // Out-of-range values are rejected
    let form = Form::new().text("settings", r#"{"hero":{"overlayOpacity":3}}"#);
    let resp = fixture
        .client
        .put(fixture.url("/api/settings"))
        .bearer_auth(&fixture.admin_token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_settings_image_replacement_keeps_old_image_until_stored() {
    let fixture = TestFixture::new().await;

    let put_images = |parts: Vec<(&'static str, &'static str)>| {
        let mut form = Form::new().text("settings", "{}");
        for (field, file) in parts {
            form = form.part(field, png(file));
        }
        fixture
            .client
            .put(fixture.url("/api/settings"))
            .bearer_auth(&fixture.admin_token)
            .multipart(form)
            .send()
    };

    let resp = put_images(vec![("heroImage", "hero.png")]).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // A failed upload leaves the stored image and the remote copy alone
    let resp = put_images(vec![("heroImage", "broken.png")]).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let (_, body) = fixture.get("/api/settings", None).await;
    assert_eq!(
        body["data"]["settings"]["hero"]["customImagePublicId"],
        "daniela-tattoos/settings/img-1"
    );
    assert!(fixture.media.deleted.lock().unwrap().is_empty());

    // The hero upload is rolled back when the about upload fails
    let resp = put_images(vec![("heroImage", "hero2.png"), ("aboutImage", "broken.png")])
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        *fixture.media.deleted.lock().unwrap(),
        vec!["daniela-tattoos/settings/img-2"]
    );
    let (_, body) = fixture.get("/api/settings", None).await;
    assert_eq!(
        body["data"]["settings"]["hero"]["customImagePublicId"],
        "daniela-tattoos/settings/img-1"
    );

    // A successful replacement drops the old image after saving
    let resp = put_images(vec![("heroImage", "hero3.png")]).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["data"]["settings"]["hero"]["customImagePublicId"],
        "daniela-tattoos/settings/img-3"
    );
    assert_eq!(
        *fixture.media.deleted.lock().unwrap(),
        vec![
            "daniela-tattoos/settings/img-2",
            "daniela-tattoos/settings/img-1"
        ]
    );
}

#[tokio::test]
async fn test_unknown_route_uses_error_envelope() {
    let fixture = TestFixture::new().await;

    for path in ["/api/portfolio", "/nothing/here"] {
        let (status, body) = fixture.get(path, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{}", path);
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "NOT_FOUND");
        assert!(body["message"].as_str().unwrap().contains(path));
    }
}

#[tokio::test]
async fn test_huge_page_returns_empty_listing() {
    let fixture = TestFixture::new().await;
    let category = fixture.create_category("Realista").await;
    let style = fixture.create_style("Blackwork").await;
    fixture.create_tattoo(&category, &style, true).await;

    let (status, body) = fixture
        .get(&format!("/api/tattoos?page={}", i64::MAX), None)
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["count"], 0);
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_symbol_only_names_are_rejected() {
    let fixture = TestFixture::new().await;

    for path in ["/api/categories", "/api/styles"] {
        let (status, body) = fixture
            .post(path, fixture.admin(), json!({ "name": "!!" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"][0]["field"], "name");
    }

    let style = fixture.create_style("Blackwork").await;
    let (status, body) = fixture
        .put(
            &format!("/api/styles/{}", style),
            fixture.admin(),
            json!({ "name": "***" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["field"], "name");
}

#[tokio::test]
async fn test_error_detail_depends_on_environment() {
    async fn failed_upload(fixture: &TestFixture) -> Value {
        let resp = fixture
            .client
            .post(fixture.url("/api/upload"))
            .bearer_auth(&fixture.admin_token)
            .multipart(Form::new().part("images", png("broken.png")))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        resp.json().await.unwrap()
    }

    let development = TestFixture::new().await;
    let body = failed_upload(&development).await;
    assert_eq!(body["code"], "UPSTREAM_ERROR");
    assert!(body["error"].as_str().unwrap().contains("upstream unavailable"));

    let production = TestFixture::with_environment("production").await;
    let body = failed_upload(&production).await;
    assert_eq!(body["message"], "Media host request failed");
    assert!(body.get("error").is_none());
}
