use std::io::Write;
use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use tempfile::{NamedTempFile, TempDir};
use tokio::process::Command;
use tokio::time::{sleep, timeout};

/// Variables from the developer's environment that would leak into the child
const INHERITED_VARS: [&str; 10] = [
    "SALESFORCE_USERNAME",
    "SALESFORCE_PASSWORD",
    "SALESFORCE_SECURITY_TOKEN",
    "SALESFORCE_INSTANCE_URL",
    "SALESFORCE_DOMAIN",
    "SALESFORCE_SANDBOX",
    "OPENAI_API_KEY",
    "OPENAI_MODEL",
    "PORT",
    "CASEGEN_CONFIG",
];

/// Find an available port
fn get_available_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Base command running from an empty directory (no `.env`, no `casegen.toml`)
fn casegen_command(workdir: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_casegen"));
    command
        .current_dir(workdir)
        .env("RUST_LOG", "error") // Quiet logs during tests
        .kill_on_drop(true);
    for var in INHERITED_VARS {
        command.env_remove(var);
    }
    command
}

/// Wait for server to be ready
async fn wait_for_server(port: u16, max_attempts: u32) -> bool {
    let client = Client::new();
    for _ in 0..max_attempts {
        if client
            .get(format!("http://127.0.0.1:{}/health", port))
            .send()
            .await
            .is_ok()
        {
            return true;
        }
        sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_health_endpoint_with_env_config() {
    let workdir = TempDir::new().unwrap();
    let port = get_available_port();

    let mut server = casegen_command(workdir.path())
        .env("SALESFORCE_USERNAME", "ops@example.com")
        .env("SALESFORCE_PASSWORD", "secret")
        .env("OPENAI_API_KEY", "sk-test")
        .env("PORT", port.to_string())
        .env("CASEGEN_SERVER__HOST", "127.0.0.1")
        .spawn()
        .expect("Failed to spawn server");

    assert!(
        wait_for_server(port, 60).await,
        "Server did not start in time"
    );

    let response = Client::new()
        .get(format!("http://127.0.0.1:{}/health", port))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let json: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(json["status"], "healthy");

    server.kill().await.ok();
}

#[tokio::test]
async fn test_config_file_sets_port() {
    let workdir = TempDir::new().unwrap();
    let port = get_available_port();

    let mut config_file = NamedTempFile::new().unwrap();
    write!(
        config_file,
        r#"
[server]
host = "127.0.0.1"
port = {}

[crm]
username = "ops@example.com"
password = "secret"

[generator]
api_key = "sk-test"
"#,
        port
    )
    .unwrap();
    config_file.flush().unwrap();

    let mut server = casegen_command(workdir.path())
        .env("CASEGEN_CONFIG", config_file.path())
        .spawn()
        .expect("Failed to spawn server");

    assert!(
        wait_for_server(port, 60).await,
        "Server did not start in time"
    );

    server.kill().await.ok();
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let workdir = TempDir::new().unwrap();

    let result = timeout(
        Duration::from_secs(5),
        casegen_command(workdir.path())
            .env("CASEGEN_CONFIG", "/nonexistent/casegen.toml")
            .env("SALESFORCE_USERNAME", "ops@example.com")
            .env("SALESFORCE_PASSWORD", "secret")
            .env("OPENAI_API_KEY", "sk-test")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}

#[tokio::test]
async fn test_missing_credentials_exit_with_error() {
    let workdir = TempDir::new().unwrap();

    let result = timeout(
        Duration::from_secs(5),
        casegen_command(workdir.path())
            .env("SALESFORCE_USERNAME", "ops@example.com")
            .env("SALESFORCE_PASSWORD", "secret")
            .output(),
    )
    .await
    .expect("Command timed out")
    .expect("Failed to execute command");

    assert!(!result.status.success());
}
