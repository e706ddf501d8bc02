//! Configuration loading tests.

mod helpers;

use std::collections::HashMap;
use std::fs;
use std::time::Duration;

use helpers::TestEnv;
use lambench::config::{Config, DEFAULT_BUCKET, DEFAULT_REGION, DEFAULT_RUNTIME};
use lambench::error::DeployError;
use lambench::options::PackageSize;
use lambench::runner::DeploySettings;
use serial_test::serial;

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

const CRED_JSON: &str = r#"{
    "accessKeyId": "AKIAFILE",
    "secretAccessKey": "file-secret-1234",
    "region": "eu-west-1"
}"#;

#[test]
fn test_defaults_without_any_settings() {
    let env = TestEnv::new();
    let config = Config::from_vars(&env.base_dir, &HashMap::new()).unwrap();

    assert_eq!(config.region, DEFAULT_REGION);
    assert_eq!(config.runtime, DEFAULT_RUNTIME);
    assert_eq!(config.handler, "index.handler");
    assert_eq!(config.bucket, DEFAULT_BUCKET);
    assert_eq!(config.lambda_dir, env.base_dir.join("lambda"));
    assert_eq!(config.package_output_dir, env.output_dir);
    assert_eq!(config.http_timeout, Duration::from_secs(300));
    assert!(config.credentials.is_none());
    assert!(config.role.is_none());
    assert!(matches!(
        DeploySettings::from(&config).role(),
        Err(DeployError::Config(_))
    ));
    assert!(matches!(config.credentials(), Err(DeployError::Config(_))));
    assert_eq!(
        PackageSize::Medium.source_dir(&config.lambda_dir),
        env.lambda_dir.join("medium")
    );
}

#[test]
fn test_variables_override_defaults() {
    let env = TestEnv::new();
    let config = Config::from_vars(
        &env.base_dir,
        &vars(&[
            ("AWS_REGION", "ap-south-1"),
            ("AWS_ACCESS_KEY_ID", "AKIAENV"),
            ("AWS_SECRET_ACCESS_KEY", "env-secret"),
            ("AWS_SESSION_TOKEN", "token"),
            ("LAMBDA_ROLE", "arn:aws:iam::1:role/r"),
            ("LAMBDA_RUNTIME", "nodejs18.x"),
            ("S3_BUCKET", "my-bucket"),
            ("LAMBDA_DIR", "functions"),
            ("PACKAGE_OUTPUT_DIR", "/tmp/lambench-out"),
            ("LAMBDA_ENDPOINT", "http://localhost:4566"),
            ("HTTP_TIMEOUT_SECS", "30"),
        ]),
    )
    .unwrap();

    assert_eq!(config.region, "ap-south-1");
    let creds = config.credentials().unwrap();
    assert_eq!(creds.access_key_id, "AKIAENV");
    assert_eq!(creds.session_token.as_deref(), Some("token"));
    assert_eq!(config.role.as_deref(), Some("arn:aws:iam::1:role/r"));
    assert_eq!(config.runtime, "nodejs18.x");
    assert_eq!(config.bucket, "my-bucket");
    assert_eq!(config.lambda_dir, env.base_dir.join("functions"));
    assert_eq!(
        config.package_output_dir,
        std::path::PathBuf::from("/tmp/lambench-out")
    );
    assert_eq!(config.lambda_endpoint.as_deref(), Some("http://localhost:4566"));
    assert!(config.s3_endpoint.is_none());
    assert_eq!(config.http_timeout, Duration::from_secs(30));
}

#[test]
fn test_empty_values_count_as_unset() {
    let env = TestEnv::new();
    let config =
        Config::from_vars(&env.base_dir, &vars(&[("S3_BUCKET", ""), ("AWS_REGION", "  ")]))
            .unwrap();
    assert_eq!(config.bucket, DEFAULT_BUCKET);
    assert_eq!(config.region, DEFAULT_REGION);
}

#[test]
fn test_default_region_fallback() {
    let env = TestEnv::new();
    let config =
        Config::from_vars(&env.base_dir, &vars(&[("AWS_DEFAULT_REGION", "us-west-2")])).unwrap();
    assert_eq!(config.region, "us-west-2");
}

#[test]
fn test_credentials_file_in_base_dir() {
    let env = TestEnv::new();
    fs::write(env.base_dir.join("cred.json"), CRED_JSON).unwrap();

    let config = Config::from_vars(&env.base_dir, &HashMap::new()).unwrap();
    let creds = config.credentials().unwrap();
    assert_eq!(creds.access_key_id, "AKIAFILE");
    assert_eq!(creds.secret_access_key, "file-secret-1234");
    assert!(creds.session_token.is_none());
    assert_eq!(config.region, "eu-west-1");
}

#[test]
fn test_credentials_path_is_relative_to_base_dir() {
    let env = TestEnv::new();
    fs::create_dir_all(env.base_dir.join("secrets")).unwrap();
    fs::write(env.base_dir.join("secrets/aws.json"), CRED_JSON).unwrap();

    let config = Config::from_vars(
        &env.base_dir,
        &vars(&[("LAMBENCH_CREDENTIALS", "secrets/aws.json")]),
    )
    .unwrap();
    assert_eq!(config.credentials().unwrap().access_key_id, "AKIAFILE");
}

#[test]
fn test_missing_explicit_credentials_file_is_error() {
    let env = TestEnv::new();
    let err = Config::from_vars(
        &env.base_dir,
        &vars(&[("LAMBENCH_CREDENTIALS", "nope.json")]),
    )
    .unwrap_err();
    assert!(matches!(err, DeployError::Io { .. }));
}

#[test]
fn test_environment_credentials_beat_file() {
    let env = TestEnv::new();
    fs::write(env.base_dir.join("cred.json"), CRED_JSON).unwrap();

    let config = Config::from_vars(
        &env.base_dir,
        &vars(&[
            ("AWS_ACCESS_KEY_ID", "AKIAENV"),
            ("AWS_SECRET_ACCESS_KEY", "env-secret"),
            ("AWS_REGION", "ca-central-1"),
        ]),
    )
    .unwrap();
    assert_eq!(config.credentials().unwrap().access_key_id, "AKIAENV");
    assert_eq!(config.region, "ca-central-1");
}

#[test]
fn test_malformed_credentials_file_is_config_error() {
    let env = TestEnv::new();
    fs::write(env.base_dir.join("cred.json"), "{ not json").unwrap();

    let err = Config::from_vars(&env.base_dir, &HashMap::new()).unwrap_err();
    assert!(matches!(err, DeployError::Config(_)));
}

#[test]
fn test_role_from_lambda_config_file() {
    let env = TestEnv::new();
    fs::write(
        env.base_dir.join("lambda_config.json"),
        r#"{"Role": "arn:aws:iam::123:role/from-file"}"#,
    )
    .unwrap();

    let config = Config::from_vars(&env.base_dir, &HashMap::new()).unwrap();
    assert_eq!(config.role.as_deref(), Some("arn:aws:iam::123:role/from-file"));

    let config = Config::from_vars(
        &env.base_dir,
        &vars(&[("LAMBDA_ROLE", "arn:aws:iam::123:role/from-env")]),
    )
    .unwrap();
    assert_eq!(config.role.as_deref(), Some("arn:aws:iam::123:role/from-env"));
}

#[test]
fn test_invalid_timeout_is_config_error() {
    let env = TestEnv::new();
    let err =
        Config::from_vars(&env.base_dir, &vars(&[("HTTP_TIMEOUT_SECS", "soon")])).unwrap_err();
    match err {
        DeployError::Config(message) => assert!(message.contains("HTTP_TIMEOUT_SECS")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_load_reads_dotenv_and_process_env_wins() {
    let env = TestEnv::new();
    fs::write(
        env.base_dir.join(".env"),
        "LAMBDA_HANDLER=main.handler\nLAMBDA_RUNTIME=nodejs18.x\n",
    )
    .unwrap();

    std::env::set_var("LAMBDA_RUNTIME", "nodejs22.x");
    std::env::remove_var("LAMBDA_HANDLER");
    let config = Config::load(&env.base_dir);
    std::env::remove_var("LAMBDA_RUNTIME");

    let config = config.unwrap();
    assert_eq!(config.handler, "main.handler");
    assert_eq!(config.runtime, "nodejs22.x");
}
