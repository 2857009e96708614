//! Config file round trips and environment variable behavior

use azure_asm_core::config::{Config, Profile};

fn sample_profile(subscription_id: &str) -> Profile {
    Profile {
        subscription_id: subscription_id.to_string(),
        management_certificate: None,
        management_url: azure_asm::DEFAULT_MANAGEMENT_URL.to_string(),
    }
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config.set_profile("production".to_string(), sample_profile("prod-sub"));
    config.set_profile("staging".to_string(), sample_profile("staging-sub"));
    config.default_profile = Some("production".to_string());

    // parent directories are created on save
    config.save_to_path(&path).unwrap();
    let loaded = Config::load_from_path(&path).unwrap();

    assert_eq!(loaded.default_profile.as_deref(), Some("production"));
    assert_eq!(loaded.profiles.len(), 2);
    assert_eq!(
        loaded.resolve_profile(None).unwrap().subscription_id,
        "prod-sub"
    );
    assert_eq!(
        loaded.resolve_profile(Some("staging")).unwrap().subscription_id,
        "staging-sub"
    );
}

#[test]
fn test_missing_file_loads_empty_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_from_path(&dir.path().join("missing.toml")).unwrap();
    assert!(config.profiles.is_empty());
    assert!(config.default_profile.is_none());
}

#[test]
#[serial_test::serial]
fn test_env_vars_expand_in_config_file() {
    unsafe {
        std::env::set_var("ASM_TEST_SUB", "expanded-sub");
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
default_profile = "ci"

[profiles.ci]
subscription_id = "${ASM_TEST_SUB}"
management_url = "${ASM_TEST_URL:-https://management.core.windows.net}"
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&path).unwrap();
    let profile = config.resolve_profile(None).unwrap();
    assert_eq!(profile.subscription_id, "expanded-sub");
    assert_eq!(profile.management_url, azure_asm::DEFAULT_MANAGEMENT_URL);

    unsafe {
        std::env::remove_var("ASM_TEST_SUB");
    }
}

#[test]
#[serial_test::serial]
fn test_client_applies_env_overrides() {
    unsafe {
        std::env::set_var("AZURE_SUBSCRIPTION_ID", "env-sub");
        std::env::set_var("AZURE_MANAGEMENT_URL", "https://management.example.test");
        std::env::remove_var("AZURE_MANAGEMENT_CERTIFICATE");
    }

    let client = sample_profile("file-sub").client().unwrap();
    assert_eq!(client.subscription_id(), "env-sub");
    assert_eq!(client.base_url(), "https://management.example.test");

    unsafe {
        std::env::remove_var("AZURE_SUBSCRIPTION_ID");
        std::env::remove_var("AZURE_MANAGEMENT_URL");
    }
}
