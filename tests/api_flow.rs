//! End-to-end request flows against the in-memory store

use async_trait::async_trait;
use clap::Parser;
use http_body_util::BodyExt;
use hyper::{Method, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use recordbook::auth::TokenInput;
use recordbook::config::Args;
use recordbook::db::schemas::{Animal, Envelope, EventSection, SectionKind};
use recordbook::db::{Pagination, Repository, Scope, StoreResult, Stores};
use recordbook::routes::ApiRequest;
use recordbook::server::AppState;
use recordbook::types::StoreError;

struct TestApp {
    state: AppState,
}

impl TestApp {
    fn new() -> Self {
        Self::with(&[], Stores::memory())
    }

    fn with(extra_args: &[&str], stores: Stores) -> Self {
        let mut argv = vec!["recordbook", "--dev-mode", "--store", "memory"];
        argv.extend_from_slice(extra_args);
        let args = Args::try_parse_from(argv).expect("valid args");
        let state = AppState::new(args, stores).expect("app state");
        Self { state }
    }

    fn token(&self, user: &str) -> String {
        self.state
            .jwt
            .generate_token(TokenInput {
                id: user.to_string(),
                first_name: "Test".to_string(),
            })
            .expect("token")
    }

    async fn send(&self, req: ApiRequest) -> (StatusCode, Value) {
        let response = self.state.respond(req).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, body)
    }

    async fn call(
        &self,
        user: &str,
        method: Method,
        target: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = ApiRequest::new(method, target).with_bearer(&self.token(user));
        if let Some(body) = body {
            req = req.with_json(&body);
        }
        self.send(req).await
    }

    async fn create(&self, user: &str, target: &str, body: Value) -> Value {
        let (status, created) = self.call(user, Method::POST, target, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "POST {target}: {created}");
        created
    }
}

/// Animal store that never answers in time
struct StalledAnimals;

impl StalledAnimals {
    async fn stall() -> StoreError {
        tokio::time::sleep(Duration::from_secs(30)).await;
        StoreError::unavailable("stalled")
    }
}

#[async_trait]
impl Repository<Animal> for StalledAnimals {
    async fn list(&self, _: &str, _: &Scope) -> StoreResult<Vec<Animal>> {
        Err(Self::stall().await)
    }

    async fn page(&self, _: &str, _: &Scope, _: &Pagination) -> StoreResult<Vec<Animal>> {
        Err(Self::stall().await)
    }

    async fn get(&self, _: &str, _: &str) -> StoreResult<Animal> {
        Err(Self::stall().await)
    }

    async fn find_first(&self, _: &str, _: &Scope) -> StoreResult<Option<Animal>> {
        Err(Self::stall().await)
    }

    async fn upsert(&self, _: Animal) -> StoreResult<Animal> {
        Err(Self::stall().await)
    }

    async fn delete(&self, _: &str, _: &str) -> StoreResult<()> {
        Err(Self::stall().await)
    }
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().expect("id").to_string()
}

#[tokio::test]
async fn test_health_and_version_need_no_token() {
    let app = TestApp::new();

    let (status, body) = app.send(ApiRequest::new(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["healthy"], true);
    assert_eq!(body["store"], "memory");

    let (status, body) = app.send(ApiRequest::new(Method::GET, "/version")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "recordbook");
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app.send(ApiRequest::new(Method::GET, "/animal")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let req = ApiRequest::new(Method::GET, "/animal").with_bearer("not-a-token");
    let (status, _) = app.send(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_route_and_method() {
    let app = TestApp::new();

    let (status, _) = app.call("u1", Method::GET, "/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.call("u1", Method::PATCH, "/animal", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_cors_headers() {
    let app = TestApp::new();

    let response = app.state.respond(ApiRequest::new(Method::OPTIONS, "/animal")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );

    let response = app.state.respond(ApiRequest::new(Method::GET, "/health")).await;
    assert!(response.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_bookmark_pagination_follows_full_pages() {
    let app = TestApp::new();
    for link in ["A", "B", "C", "D", "E"] {
        app.create("u1", "/bookmarks", json!({ "link": link })).await;
    }

    let links = |page: &Value| -> Vec<String> {
        page["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["link"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, page0) = app
        .call("u1", Method::GET, "/bookmarks?per_page=2", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(links(&page0), ["A", "B"]);
    assert_eq!(
        page0["next"],
        "/bookmarks?page=1&per_page=2&sort_by_newest=false"
    );

    let next = page0["next"].as_str().unwrap().to_string();
    let (_, page1) = app.call("u1", Method::GET, &next, None).await;
    assert_eq!(links(&page1), ["C", "D"]);
    assert_eq!(
        page1["next"],
        "/bookmarks?page=2&per_page=2&sort_by_newest=false"
    );

    let next = page1["next"].as_str().unwrap().to_string();
    let (_, page2) = app.call("u1", Method::GET, &next, None).await;
    assert_eq!(links(&page2), ["E"]);
    assert!(page2.get("next").is_none());

    let (_, newest) = app
        .call("u1", Method::GET, "/bookmarks?per_page=2&sort_by_newest=true", None)
        .await;
    assert_eq!(links(&newest), ["E", "D"]);
}

#[tokio::test]
async fn test_full_final_page_links_to_empty_page() {
    let app = TestApp::new();
    for link in ["A", "B"] {
        app.create("u1", "/bookmarks", json!({ "link": link })).await;
    }

    let (_, page0) = app
        .call("u1", Method::GET, "/bookmarks?per_page=2", None)
        .await;
    let next = page0["next"].as_str().expect("full page has next").to_string();

    let (status, page1) = app.call("u1", Method::GET, &next, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page1["data"].as_array().unwrap().is_empty());
    assert!(page1.get("next").is_none());
}

#[tokio::test]
async fn test_duplicate_bookmark_conflicts_per_user() {
    let app = TestApp::new();
    app.create("u1", "/bookmarks", json!({ "link": "https://4-h.org" }))
        .await;

    let (status, body) = app
        .call(
            "u1",
            Method::POST,
            "/bookmarks",
            Some(json!({ "link": "https://4-h.org" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    app.create("u2", "/bookmarks", json!({ "link": "https://4-h.org" }))
        .await;

    let (_, filtered) = app
        .call("u1", Method::GET, "/bookmarks?link=https%3A%2F%2F4-h.org", None)
        .await;
    assert_eq!(filtered["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_partition_isolation() {
    let app = TestApp::new();
    let animal = app
        .create(
            "u1",
            "/animal",
            json!({ "project_id": "p1", "name": "Wilbur", "species": "swine" }),
        )
        .await;
    let path = format!("/animal/{}", id_of(&animal));

    let (status, _) = app.call("u2", Method::GET, &path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = app.call("u2", Method::GET, "/animal", None).await;
    assert_eq!(list, json!([]));

    let (status, _) = app.call("u2", Method::DELETE, &path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, fetched) = app.call("u1", Method::GET, &path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, animal);
    assert_eq!(fetched["user_id"], "u1");
}

#[tokio::test]
async fn test_update_preserves_created() {
    let app = TestApp::new();
    let project = app
        .create("u1", "/project", json!({ "name": "Market Goats", "year": "2024" }))
        .await;
    assert_eq!(project["created"], project["updated"]);
    let path = format!("/project/{}", id_of(&project));

    let (status, body) = app
        .call(
            "u1",
            Method::PUT,
            &path,
            Some(json!({ "name": "Breeding Goats", "year": "2024" })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (_, updated) = app.call("u1", Method::GET, &path, None).await;
    assert_eq!(updated["id"], project["id"]);
    assert_eq!(updated["created"], project["created"]);
    assert_eq!(updated["name"], "Breeding Goats");
    assert!(updated["updated"].as_str().unwrap() >= project["updated"].as_str().unwrap());

    let (status, _) = app.call("u1", Method::DELETE, &path, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call("u1", Method::GET, &path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dates_validated_and_round_trip() {
    let app = TestApp::new();

    let (status, body) = app
        .call(
            "u1",
            Method::POST,
            "/expense",
            Some(json!({
                "project_id": "p1",
                "date": "01/15/2024",
                "items": "Hay",
                "quantity": 3,
                "cost": 21.5
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad date: 01/15/2024");

    let expense = app
        .create(
            "u1",
            "/expense",
            json!({
                "project_id": "p1",
                "date": "2024-01-15T00:00:00Z",
                "items": "Hay",
                "quantity": 3,
                "cost": 21.5
            }),
        )
        .await;
    assert_eq!(expense["date"], "2024-01-15T00:00:00Z");
}

#[tokio::test]
async fn test_missing_field_and_malformed_body() {
    let app = TestApp::new();

    let (status, body) = app
        .call("u1", Method::POST, "/feed", Some(json!({ "project_id": "p1" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing required field: name");

    let req = ApiRequest::new(Method::POST, "/feed")
        .with_bearer(&app.token("u1"))
        .with_body("{ nope");
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("malformed JSON body"));
}

#[tokio::test]
async fn test_scope_filters_on_list() {
    let app = TestApp::new();
    for (project, name) in [("p1", "Corn"), ("p2", "Oats"), ("p1", "Pellets")] {
        app.create(
            "u1",
            "/feed",
            json!({ "project_id": project, "name": name }),
        )
        .await;
    }

    let (_, feeds) = app.call("u1", Method::GET, "/feed?project_id=p1", None).await;
    let names: Vec<&str> = feeds
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Corn", "Pellets"]);
}

#[tokio::test]
async fn test_user_profile_lifecycle() {
    let app = TestApp::new();

    let (status, _) = app.call("u1", Method::GET, "/user", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let profile = app
        .create("u1", "/user", json!({ "last_name": "Lovelace", "county": "Story" }))
        .await;
    assert_eq!(profile["id"], "u1");
    assert_eq!(profile["first_name"], "Test");

    let (status, _) = app
        .call("u1", Method::POST, "/user", Some(json!({ "first_name": "Ada" })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call(
            "u1",
            Method::PUT,
            "/user",
            Some(json!({ "first_name": "Ada", "birthdate": "2010-04-01T00:00:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched) = app.call("u1", Method::GET, "/user", None).await;
    assert_eq!(fetched["first_name"], "Ada");
    assert_eq!(fetched["birthdate"], "2010-04-01T00:00:00Z");
    assert_eq!(fetched["created"], profile["created"]);
    assert!(fetched.get("county").is_none());
}

#[tokio::test]
async fn test_sections_share_one_implementation() {
    let app = TestApp::new();

    let club = app
        .create(
            "u1",
            "/section1",
            json!({ "year": "2024", "grade": 7, "club_name": "Clover Kids" }),
        )
        .await;
    assert_eq!(club["section"], 1);
    assert_eq!(club["grade"], 7);

    let (status, body) = app
        .call("u1", Method::POST, "/section1", Some(json!({ "year": "2024", "grade": 7 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing required field: club_name");

    let (status, _) = app
        .call(
            "u1",
            Method::POST,
            "/section11",
            Some(json!({ "year": "2024", "recognition": "Blue", "hours": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Same id under another kind's path is not found
    let (status, _) = app
        .call("u1", Method::GET, &format!("/section2/{}", id_of(&club)), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .call("u1", Method::DELETE, &format!("/section2/{}", id_of(&club)), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.create("u1", "/section1", json!({ "year": "2023", "grade": 6, "club_name": "Clover Kids" }))
        .await;
    app.create("u1", "/section3", json!({ "year": "2024", "activity": "Fair setup" }))
        .await;

    let (_, this_year) = app
        .call("u1", Method::GET, "/section1?year=2024", None)
        .await;
    assert_eq!(this_year.as_array().unwrap().len(), 1);
    let (_, all_club) = app.call("u1", Method::GET, "/section1", None).await;
    assert_eq!(all_club.as_array().unwrap().len(), 2);

    let path = format!("/section1/{}", id_of(&club));
    let (status, _) = app
        .call(
            "u1",
            Method::PUT,
            &path,
            Some(json!({ "year": "2024", "grade": 8, "club_name": "Clover Kids" })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, updated) = app.call("u1", Method::GET, &path, None).await;
    assert_eq!(updated["grade"], 8);
    assert_eq!(updated["created"], club["created"]);
}

#[tokio::test]
async fn test_add_event_section_checks() {
    let app = TestApp::new();
    let event = app
        .create(
            "u1",
            "/event",
            json!({ "name": "County Fair", "event_date": "2024-07-20T09:00:00Z" }),
        )
        .await;
    let event_path = format!("/event/{}", id_of(&event));

    let first = app
        .create("u1", "/section1", json!({ "year": "2024", "grade": 7, "club_name": "Clovers" }))
        .await;
    let last = app
        .create("u1", "/section14", json!({ "year": "2024", "recognition": "Grand Champion" }))
        .await;

    for number in [0, 15] {
        let (status, body) = app
            .call(
                "u1",
                Method::POST,
                &event_path,
                Some(json!({ "section_number": number, "section_id": id_of(&first) })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("invalid section number"));
    }

    // Number is checked before the event exists
    let (status, _) = app
        .call(
            "u1",
            Method::POST,
            "/event/missing",
            Some(json!({ "section_number": 0, "section_id": id_of(&first) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "u1",
            Method::POST,
            "/event/missing",
            Some(json!({ "section_number": 1, "section_id": id_of(&first) })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Section exists, but not as kind 2
    let (status, _) = app
        .call(
            "u1",
            Method::POST,
            &event_path,
            Some(json!({ "section_number": 2, "section_id": id_of(&first) })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for (number, section) in [(1, &first), (14, &last)] {
        let link = app
            .create(
                "u1",
                &event_path,
                json!({ "section_number": number, "section_id": id_of(section) }),
            )
            .await;
        assert_eq!(link["section_number"], number);
        assert_eq!(link["event_id"], event["id"]);
    }

    let (status, body) = app
        .call(
            "u1",
            Method::POST,
            &event_path,
            Some(json!({ "section_number": 1, "section_id": id_of(&first) })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");
}

#[tokio::test]
async fn test_event_section_uniqueness_is_per_user() {
    let app = TestApp::new();
    let repo = &app.state.stores.event_sections;

    let link = |user: &str| EventSection {
        envelope: Envelope::new(user),
        event_id: "e1".into(),
        section_number: SectionKind::Awards,
        section_id: "s1".into(),
    };

    repo.upsert(link("u1")).await.unwrap();
    let err = repo.upsert(link("u1")).await.unwrap_err();
    assert_eq!(err.status, 409);

    repo.upsert(link("u2")).await.unwrap();
    let scope = Scope::new().with("event_id", "e1");
    assert_eq!(repo.list("u2", &scope).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_event_detail_and_unlink() {
    let app = TestApp::new();
    let event = app
        .create(
            "u1",
            "/event",
            json!({ "name": "Demo Day", "event_date": "2024-03-09T14:00:00Z", "project_id": "p1" }),
        )
        .await;
    let event_path = format!("/event/{}", id_of(&event));

    let talk = app
        .create(
            "u1",
            "/section10",
            json!({ "year": "2024", "communication_type": "Demonstration", "topic": "Hoof care" }),
        )
        .await;
    let orphan = app
        .create("u1", "/section11", json!({ "year": "2024", "recognition": "Purple" }))
        .await;

    for (number, section) in [(10, &talk), (11, &orphan)] {
        app.create(
            "u1",
            &event_path,
            json!({ "section_number": number, "section_id": id_of(section) }),
        )
        .await;
    }

    // A deleted section drops out of the event view
    let (status, _) = app
        .call("u1", Method::DELETE, &format!("/section11/{}", id_of(&orphan)), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, detail) = app.call("u1", Method::GET, &event_path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["event"]["name"], "Demo Day");
    let sections = detail["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0]["topic"], "Hoof care");

    let link_path = format!("{}/{}", event_path, id_of(&talk));
    let (status, resolved) = app.call("u1", Method::GET, &link_path, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved, talk);

    let (status, _) = app.call("u1", Method::DELETE, &link_path, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.call("u1", Method::GET, &link_path, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, events) = app
        .call("u1", Method::GET, "/event?project_id=p1", None)
        .await;
    assert_eq!(events["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_upc_code_validated_before_lookup() {
    let app = TestApp::new();
    let (status, body) = app.call("u1", Method::GET, "/upc/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid UPC code: abc");
}

#[tokio::test]
async fn test_slow_store_times_out_with_cors() {
    let mut stores = Stores::memory();
    stores.animals = Arc::new(StalledAnimals);
    let app = TestApp::with(&["--request-timeout-ms", "1"], stores);

    let req = ApiRequest::new(Method::GET, "/animal").with_bearer(&app.token("u1"));
    let response = app.state.respond(req).await;
    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "TIMEOUT");

    // Other stores are unaffected
    let (status, _) = app.call("u1", Method::GET, "/feed", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_section_tag_in_body_must_be_path_number() {
    let app = TestApp::new();

    for tag in [json!(7), json!("7"), json!(7.0)] {
        let (status, body) = app
            .call(
                "u1",
                Method::POST,
                "/section11",
                Some(json!({ "year": "2024", "recognition": "Blue", "section": tag })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "tag {tag}");
        assert!(body["error"]
            .as_str()
            .unwrap()
            .ends_with("does not match section11"));
    }

    let (_, stored) = app.call("u1", Method::GET, "/section11", None).await;
    assert_eq!(stored, json!([]));

    let award = app
        .create(
            "u1",
            "/section11",
            json!({ "year": "2024", "recognition": "Blue", "section": 11 }),
        )
        .await;
    assert_eq!(award["section"], 11);
}

#[tokio::test]
async fn test_bookmark_filter_matches_trimmed_link() {
    let app = TestApp::new();
    app.create("u1", "/bookmarks", json!({ "link": "  https://a  " }))
        .await;

    let (status, page) = app
        .call("u1", Method::GET, "/bookmarks?link=%20https%3A%2F%2Fa", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let data = page["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["link"], "https://a");
}
