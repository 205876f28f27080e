use vhub_domain::constants::{
    ARTIFACT_VERSION, CREDENTIAL, PROJECT, SIGNER_PROJECT, SIGNER_TOKEN,
};
use vhub_domain::features::FeatureSet;

#[test]
fn constants_match_entity_strings() {
    assert_eq!(PROJECT, "project");
    assert_eq!(CREDENTIAL, "credential");
    assert_eq!(ARTIFACT_VERSION, "artifact_version");
    assert_eq!(SIGNER_PROJECT, "signer_project");
    assert_eq!(SIGNER_TOKEN, "signer_token");
}

#[test]
fn feature_set_parses_slice_keys() {
    assert_eq!(FeatureSet::from("projects"), FeatureSet::PROJECTS);
    assert_eq!(FeatureSet::from("assets"), FeatureSet::ASSETS);
    assert_eq!(FeatureSet::from("*"), FeatureSet::ALL);
    assert_eq!(FeatureSet::from("bogus"), FeatureSet::empty());
}
