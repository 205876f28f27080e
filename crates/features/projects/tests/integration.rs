use vhub_database::Database;
use vhub_domain::config::AppConfig;
use vhub_domain::events::ProjectDeleted;
use vhub_domain::pagination::PageRequest;
use vhub_event_bus::EventBus;
use vhub_projects::{CreateProject, Projects, ProjectsError, UpdateProject};

async fn fixture(db_name: &str) -> (Projects, EventBus) {
    let database = Database::builder()
        .url("mem://")
        .session("test_ns", db_name)
        .init()
        .await
        .expect("connect to mem://");

    let events = EventBus::new();
    let config = AppConfig::default();

    let slice = vhub_projects::init(&config, &database, &events).expect("init projects");
    let projects =
        slice.state.as_any().downcast_ref::<Projects>().expect("projects slice").clone();

    (projects, events)
}

fn request(name: &str) -> CreateProject {
    CreateProject {
        name: name.to_owned(),
        description: format!("{name} description"),
        website: "https://example.com".to_owned(),
    }
}

#[tokio::test]
async fn project_crud_lifecycle() {
    let (projects, _events) = fixture("projects_crud").await;

    let created = projects.create_project(request("Alpha")).await.expect("create");
    assert_eq!(created.id.len(), 8);
    assert!(created.id.chars().all(|c| c.is_ascii_uppercase()));
    assert_eq!(created.name, "Alpha");

    let fetched = projects.get_project(&created.id).await.expect("get");
    assert_eq!(fetched, created);

    let updated = projects
        .update_project(
            &created.id,
            UpdateProject {
                name: "Alpha 2".to_owned(),
                description: "updated".to_owned(),
                website: "https://alpha.example.com".to_owned(),
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "Alpha 2");
    assert_eq!(updated.website, "https://alpha.example.com");
    assert!(updated.updated_at >= created.updated_at);

    projects.delete_project(&created.id).await.expect("delete");
    let err = projects.get_project(&created.id).await.unwrap_err();
    assert!(matches!(err, ProjectsError::NotFound { .. }));
}

#[tokio::test]
async fn listing_is_newest_first_and_paginated() {
    let (projects, _events) = fixture("projects_listing").await;

    for name in ["First", "Second", "Third"] {
        projects.create_project(request(name)).await.expect("create");
    }

    let (page, total) = projects
        .list_projects(PageRequest { page: 1, page_size: 2 })
        .await
        .expect("first page");
    assert_eq!(total, 3);
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].name, "Third");
    assert_eq!(page[1].name, "Second");

    let (rest, total) = projects
        .list_projects(PageRequest { page: 2, page_size: 2 })
        .await
        .expect("second page");
    assert_eq!(total, 3);
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].name, "First");
}

#[tokio::test]
async fn rejects_invalid_payloads() {
    let (projects, _events) = fixture("projects_validation").await;

    let err = projects.create_project(request("   ")).await.unwrap_err();
    assert!(matches!(err, ProjectsError::Validation { .. }));

    let mut bad_website = request("Bad");
    bad_website.website = "ftp://example.com".to_owned();
    let err = projects.create_project(bad_website).await.unwrap_err();
    assert!(matches!(err, ProjectsError::Validation { .. }));

    let err = projects
        .update_project("MISSINGX", UpdateProject {
            name: "Name".to_owned(),
            description: String::new(),
            website: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ProjectsError::NotFound { .. }));
}

#[tokio::test]
async fn credentials_authorize_their_own_project_only() {
    let (projects, _events) = fixture("projects_auth").await;

    let alpha = projects.create_project(request("Alpha")).await.expect("alpha");
    let beta = projects.create_project(request("Beta")).await.expect("beta");

    let credential = projects.create_credential(&alpha.id).await.expect("credential");
    assert_eq!(credential.token.len(), 32);
    assert!(credential.is_active);

    let authorized = projects.authenticate(&alpha.id, &credential.token).await.expect("auth");
    assert_eq!(authorized.id, credential.id);

    let err = projects.authenticate(&beta.id, &credential.token).await.unwrap_err();
    assert!(matches!(err, ProjectsError::Unauthorized { .. }));

    // Malformed inputs are rejected before any lookup.
    let err = projects.authenticate("short", &credential.token).await.unwrap_err();
    assert!(matches!(err, ProjectsError::Unauthorized { .. }));
    let err = projects.authenticate(&alpha.id, "not-a-token").await.unwrap_err();
    assert!(matches!(err, ProjectsError::Unauthorized { .. }));
}

#[tokio::test]
async fn deactivation_revokes_cached_tokens() {
    let (projects, _events) = fixture("projects_revocation").await;

    let project = projects.create_project(request("Alpha")).await.expect("project");
    let credential = projects.create_credential(&project.id).await.expect("credential");

    // Prime the token cache with a successful lookup.
    projects.authenticate(&project.id, &credential.token).await.expect("auth");

    let toggled =
        projects.set_credential_active(&credential.id, false).await.expect("deactivate");
    assert!(!toggled.is_active);

    let err = projects.authenticate(&project.id, &credential.token).await.unwrap_err();
    assert!(matches!(err, ProjectsError::Unauthorized { .. }));

    let toggled = projects.set_credential_active(&credential.id, true).await.expect("activate");
    assert!(toggled.is_active);
    projects.authenticate(&project.id, &credential.token).await.expect("auth again");
}

#[tokio::test]
async fn deleting_a_credential_revokes_it() {
    let (projects, _events) = fixture("projects_credential_delete").await;

    let project = projects.create_project(request("Alpha")).await.expect("project");
    let credential = projects.create_credential(&project.id).await.expect("credential");
    projects.authenticate(&project.id, &credential.token).await.expect("auth");

    projects.delete_credential(&credential.id).await.expect("delete");

    let err = projects.authenticate(&project.id, &credential.token).await.unwrap_err();
    assert!(matches!(err, ProjectsError::Unauthorized { .. }));

    let (remaining, total) =
        projects.list_credentials(&project.id, PageRequest::default()).await.expect("list");
    assert_eq!(total, 0);
    assert!(remaining.is_empty());
}

#[tokio::test]
async fn project_deletion_cascades_and_announces() {
    let (projects, events) = fixture("projects_cascade").await;

    let project = projects.create_project(request("Alpha")).await.expect("project");
    let credential = projects.create_credential(&project.id).await.expect("credential");

    let mut deletions = events.subscribe::<ProjectDeleted>().expect("subscribe");

    projects.delete_project(&project.id).await.expect("delete");

    let event = deletions.recv().await.expect("deletion event");
    assert_eq!(event.project_id, project.id);

    let err = projects.authenticate(&project.id, &credential.token).await.unwrap_err();
    assert!(matches!(err, ProjectsError::Unauthorized { .. }));
}
