//! View controllers against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;

use hireloop_api::models::{ApplicationQuestion, EmploymentType, JobPostRequest, QuestionKind};
use hireloop_api::ApiClient;
use hireloop_config::ApiConfig;
use hireloop_dashboard::{
    AdminUserDirectory, DashboardError, FeedView, JobPostError, NetworkView, NotificationCenter,
    RecruiterJobs, SubscriptionView,
};
use hireloop_realtime::store::NotificationStore;
use hireloop_session::{MemoryStorage, Session, SessionStorage, StorageKey};

fn client(server: &MockServer, key: StorageKey) -> ApiClient {
    let storage = Arc::new(MemoryStorage::default());
    storage.set(key, "token").unwrap();
    let session = Session::new(storage);
    let config = ApiConfig {
        base_url: server.url("/api"),
        request_timeout_seconds: 5,
    };
    ApiClient::new(&config, session.context()).expect("client")
}

fn user_json(id: &str, name: &str, blocked: bool) -> serde_json::Value {
    json!({"_id": id, "name": name, "email": format!("{id}@example.com"), "isBlocked": blocked})
}

fn job_request(questions: usize) -> JobPostRequest {
    JobPostRequest {
        title: "Rust Engineer".into(),
        company: "Acme".into(),
        location: "Remote".into(),
        employment_type: EmploymentType::FullTime,
        description: "Build the matching engine".into(),
        salary: None,
        skills: Vec::new(),
        questions: (0..questions)
            .map(|i| ApplicationQuestion {
                question: format!("Question {i}"),
                kind: QuestionKind::Text,
                required: true,
            })
            .collect(),
    }
}

#[tokio::test]
async fn directory_load_skips_the_debounce() {
    let server = MockServer::start_async().await;
    let listing = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/admin/users")
                .query_param("search", "grace")
                .query_param("page", "2");
            then.status(200).json_body(json!({
                "items": [user_json("u9", "Grace", true)],
                "page": 2,
                "totalPages": 3
            }));
        })
        .await;
    let typed = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/admin/users")
                .query_param("search", "gr");
            then.status(200).json_body(json!({"items": [], "page": 1, "totalPages": 1}));
        })
        .await;

    let directory = AdminUserDirectory::new(
        client(&server, StorageKey::AdminAccessToken),
        Duration::from_secs(10),
    );
    directory.search("gr");
    directory.load(" grace ", 2).await.expect("listing");

    listing.assert_async().await;
    assert_eq!(typed.hits_async().await, 0);
    let state = directory.snapshot();
    assert_eq!(state.query, "grace");
    assert_eq!(state.page, 2);
    assert_eq!(state.users.len(), 1);
    assert!(state.users[0].blocked);
}

#[tokio::test]
async fn directory_search_issues_one_request_per_quiet_period() {
    let server = MockServer::start_async().await;
    let mut partial = Vec::new();
    for prefix in ["a", "ad"] {
        partial.push(
            server
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/api/admin/users")
                        .query_param("search", prefix);
                    then.status(200).json_body(json!({"items": [], "page": 1, "totalPages": 1}));
                })
                .await,
        );
    }
    let full = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/admin/users")
                .query_param("search", "ada");
            then.status(200).json_body(json!({
                "items": [user_json("u1", "Ada", false)],
                "page": 1,
                "totalPages": 2,
                "total": 12
            }));
        })
        .await;

    let directory = AdminUserDirectory::new(
        client(&server, StorageKey::AdminAccessToken),
        Duration::from_millis(100),
    );
    let mut updates = directory.subscribe();

    for text in ["a", "ad", "ada"] {
        directory.search(text);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(directory.snapshot().query, "ada");

    tokio::time::timeout(
        Duration::from_secs(2),
        updates.wait_for(|state| !state.users.is_empty()),
    )
    .await
    .expect("listing in time")
    .expect("directory alive");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(full.hits_async().await, 1);
    for mock in &partial {
        assert_eq!(mock.hits_async().await, 0);
    }

    let state = directory.snapshot();
    assert_eq!(state.total_pages, 2);
    assert!(!state.loading);
}

#[tokio::test]
async fn blocking_a_user_updates_the_listing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/admin/users");
            then.status(200).json_body(json!({
                "items": [user_json("u1", "Ada", false), user_json("u2", "Grace", false)],
                "page": 1,
                "totalPages": 1
            }));
        })
        .await;
    let block = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/api/admin/users/u2/block")
                .json_body(json!({"blocked": true}));
            then.status(200).json_body(user_json("u2", "Grace", true));
        })
        .await;

    let directory = AdminUserDirectory::new(
        client(&server, StorageKey::AdminAccessToken),
        Duration::from_millis(100),
    );
    directory.load_page(1).await.expect("listing");
    directory.set_blocked("u2", true).await.expect("block");

    block.assert_async().await;
    let users = directory.snapshot().users;
    assert!(!users[0].blocked);
    assert!(users[1].blocked);
}

#[tokio::test]
async fn closing_a_view_discards_in_flight_results() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/subscription");
            then.status(200)
                .delay(Duration::from_millis(300))
                .json_body(json!({
                    "planType": "premium",
                    "billingCycle": "monthly",
                    "active": true,
                    "startDate": null,
                    "endDate": null
                }));
        })
        .await;

    let view = Arc::new(SubscriptionView::new(client(&server, StorageKey::AccessToken)));
    let pending = {
        let view = view.clone();
        tokio::spawn(async move { view.refresh().await })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    view.close();

    let result = pending.await.unwrap();
    assert!(matches!(result, Err(DashboardError::Closed)));
    assert!(view.current().is_none());

    assert!(matches!(view.refresh().await, Err(DashboardError::Closed)));
}

#[tokio::test]
async fn notification_center_syncs_store() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/notifications");
            then.status(200).json_body(json!([
                {"_id": "n1", "message": "Grace viewed your profile", "isRead": false, "createdAt": "2024-05-01T10:00:00Z"},
                {"_id": "n2", "message": "New job match", "isRead": true, "createdAt": "2024-05-01T11:00:00Z"},
                {"_id": "n3", "message": "Ada sent a request", "isRead": false, "createdAt": "2024-05-01T12:00:00Z"}
            ]));
        })
        .await;
    let read = server
        .mock_async(|when, then| {
            when.method(PATCH).path("/api/notifications/n1/read");
            then.status(204);
        })
        .await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/notifications/n3");
            then.status(204);
        })
        .await;

    let store = NotificationStore::default();
    let center = NotificationCenter::new(client(&server, StorageKey::AccessToken), store.clone());

    assert_eq!(center.refresh().await.unwrap(), 3);
    assert_eq!(store.unread(), 2);

    center.mark_read("n1").await.unwrap();
    center.delete("n3").await.unwrap();
    read.assert_async().await;
    delete.assert_async().await;

    assert_eq!(store.len(), 2);
    assert_eq!(store.unread(), 0);
}

#[tokio::test]
async fn recruiter_posts_are_validated_before_sending() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/recruiter/jobs");
            then.status(201).json_body(json!({
                "_id": "j9",
                "recruiterId": "r1",
                "title": "Rust Engineer",
                "company": "Acme",
                "location": "Remote",
                "employmentType": "full-time",
                "description": "Build the matching engine",
                "questions": [{"question": "Question 0", "type": "text", "required": true}],
                "createdAt": "2024-03-01T12:00:00Z"
            }));
        })
        .await;

    let jobs = RecruiterJobs::new(client(&server, StorageKey::AccessToken));

    let err = jobs.create(&job_request(11)).await.expect_err("too many questions");
    assert!(matches!(
        err,
        DashboardError::JobPost(JobPostError::TooManyQuestions(11))
    ));
    assert_eq!(create.hits_async().await, 0);

    let created = jobs.create(&job_request(1)).await.expect("created");
    assert_eq!(created.id, "j9");
    assert_eq!(jobs.posts().len(), 1);
    assert_eq!(create.hits_async().await, 1);
}

#[tokio::test]
async fn accepting_a_request_moves_it_to_connections() {
    let server = MockServer::start_async().await;
    let request = json!({
        "_id": "c1",
        "sender": {"_id": "u2", "name": "Grace"},
        "receiver": {"_id": "u1", "name": "Ada"},
        "status": "pending",
        "createdAt": "2024-05-01T10:00:00Z"
    });
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/network/connections");
            then.status(200).json_body(json!([]));
        })
        .await;
    let pending = request.clone();
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/network/requests");
            then.status(200).json_body(json!([pending]));
        })
        .await;
    let mut accepted = request;
    accepted["status"] = json!("accepted");
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/network/requests/c1/accept");
            then.status(200).json_body(accepted);
        })
        .await;

    let network = NetworkView::new(client(&server, StorageKey::AccessToken));
    network.refresh().await.expect("refresh");
    assert_eq!(network.snapshot().pending.len(), 1);

    network.accept("c1").await.expect("accept");
    let state = network.snapshot();
    assert!(state.pending.is_empty());
    assert_eq!(state.connections[0].name, "Grace");
}

#[tokio::test]
async fn blank_posts_are_rejected_locally() {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/posts");
            then.status(201);
        })
        .await;

    let feed = FeedView::new(client(&server, StorageKey::AccessToken));
    assert!(matches!(
        feed.create("   ", None).await,
        Err(DashboardError::Invalid(_))
    ));
    assert_eq!(create.hits_async().await, 0);
}
