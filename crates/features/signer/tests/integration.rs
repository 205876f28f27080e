use chrono::{Duration, Utc};
use vhub_database::Database;
use vhub_domain::pagination::PageRequest;
use vhub_signer::{
    CreateSignerProject, CreateSignerToken, Signer, SignerError, UpdateSignerProject,
    generate_keypair,
};

async fn fixture(db_name: &str) -> Signer {
    let database = Database::builder()
        .url("mem://")
        .session("test_ns", db_name)
        .init()
        .await
        .expect("connect to mem://");

    let slice = vhub_signer::init(&database).expect("init signer");
    slice.state.as_any().downcast_ref::<Signer>().expect("signer slice").clone()
}

fn project_request(name: &str) -> CreateSignerProject {
    CreateSignerProject {
        name: name.to_owned(),
        description: String::new(),
        public_key: String::new(),
        private_key: String::new(),
    }
}

fn token_request(expires_at: &str) -> CreateSignerToken {
    CreateSignerToken {
        username: "service-account".to_owned(),
        role: "reader".to_owned(),
        purpose: "integration".to_owned(),
        expires_at: expires_at.to_owned(),
    }
}

fn future_expiry() -> String {
    (Utc::now() + Duration::days(30)).format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[tokio::test]
async fn project_creation_handles_key_material() {
    let signer = fixture("signer_projects").await;

    // No keys supplied: a pair is generated.
    let generated = signer.create_project(project_request("Generated")).await.expect("create");
    assert_eq!(generated.public_key.len(), 64);
    assert_eq!(generated.private_key.len(), 64);

    // A supplied pair is validated and stored as-is.
    let pair = generate_keypair().expect("keypair");
    let imported = signer
        .create_project(CreateSignerProject {
            name: "Imported".to_owned(),
            description: String::new(),
            public_key: pair.public_key.clone(),
            private_key: pair.private_key.clone(),
        })
        .await
        .expect("import");
    assert_eq!(imported.public_key, pair.public_key);

    // Half a pair is an error.
    let err = signer
        .create_project(CreateSignerProject {
            name: "Half".to_owned(),
            description: String::new(),
            public_key: pair.public_key.clone(),
            private_key: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SignerError::Validation { .. }));
}

#[tokio::test]
async fn updates_keep_keys_immutable() {
    let signer = fixture("signer_updates").await;

    let project = signer.create_project(project_request("Original")).await.expect("create");
    let updated = signer
        .update_project(&project.id, UpdateSignerProject {
            name: "Renamed".to_owned(),
            description: "new text".to_owned(),
        })
        .await
        .expect("update");

    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.public_key, project.public_key);
    assert_eq!(updated.private_key, project.private_key);
}

#[tokio::test]
async fn issued_tokens_verify_against_the_project_key() {
    let signer = fixture("signer_verify").await;

    let project = signer.create_project(project_request("Verify")).await.expect("create");
    let token = signer
        .create_token(&project.id, token_request(&future_expiry()))
        .await
        .expect("sign token");
    assert!(token.is_active);
    assert_eq!(token.token.split('.').count(), 3);

    let verdict = signer.verify(&token.token).await.expect("verify");
    assert!(verdict.valid);
    assert_eq!(verdict.reason, None);
    assert_eq!(verdict.username, "service-account");
    assert_eq!(verdict.role, "reader");

    let err = signer.verify("not.issued.here").await.unwrap_err();
    assert!(matches!(err, SignerError::NotFound { .. }));
}

#[tokio::test]
async fn revocation_fails_verification_until_reactivated() {
    let signer = fixture("signer_revocation").await;

    let project = signer.create_project(project_request("Revoke")).await.expect("create");
    let token = signer
        .create_token(&project.id, token_request(&future_expiry()))
        .await
        .expect("sign token");

    signer.set_token_active(&token.id, false).await.expect("revoke");
    let verdict = signer.verify(&token.token).await.expect("verify revoked");
    assert!(!verdict.valid);
    assert_eq!(verdict.reason.as_deref(), Some("revoked"));

    signer.set_token_active(&token.id, true).await.expect("reactivate");
    let verdict = signer.verify(&token.token).await.expect("verify again");
    assert!(verdict.valid);
}

#[tokio::test]
async fn token_creation_rejects_bad_expiry() {
    let signer = fixture("signer_expiry").await;

    let project = signer.create_project(project_request("Expiry")).await.expect("create");

    let past = (Utc::now() - Duration::hours(1)).format("%Y-%m-%dT%H:%M:%S").to_string();
    let err = signer.create_token(&project.id, token_request(&past)).await.unwrap_err();
    assert!(matches!(err, SignerError::Validation { .. }));

    let err = signer.create_token(&project.id, token_request("next week")).await.unwrap_err();
    assert!(matches!(err, SignerError::Validation { .. }));
}

#[tokio::test]
async fn expired_sweep_removes_only_past_tokens() {
    let signer = fixture("signer_sweep").await;

    let project = signer.create_project(project_request("Sweep")).await.expect("create");

    let soon = (Utc::now() + Duration::seconds(1)).format("%Y-%m-%dT%H:%M:%S").to_string();
    let short_lived =
        signer.create_token(&project.id, token_request(&soon)).await.expect("short token");
    let long_lived = signer
        .create_token(&project.id, token_request(&future_expiry()))
        .await
        .expect("long token");

    tokio::time::sleep(std::time::Duration::from_secs(2)).await;

    let removed = signer.delete_expired().await.expect("sweep");
    assert_eq!(removed, 1);

    let err = signer.get_token(&short_lived.id).await.unwrap_err();
    assert!(matches!(err, SignerError::NotFound { .. }));
    signer.get_token(&long_lived.id).await.expect("survivor");
}

#[tokio::test]
async fn project_deletion_cascades_tokens() {
    let signer = fixture("signer_cascade").await;

    let project = signer.create_project(project_request("Cascade")).await.expect("create");
    let token = signer
        .create_token(&project.id, token_request(&future_expiry()))
        .await
        .expect("sign token");

    signer.delete_project(&project.id).await.expect("delete project");

    let err = signer.get_token(&token.id).await.unwrap_err();
    assert!(matches!(err, SignerError::NotFound { .. }));

    let (tokens, total) =
        signer.list_tokens(&project.id, PageRequest::default()).await.expect("list");
    assert!(tokens.is_empty());
    assert_eq!(total, 0);
}
