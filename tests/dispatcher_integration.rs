//! Integration tests for action dispatch against a sandboxed filesystem

use async_trait::async_trait;
use os_agent::actions::{ActionCatalog, Params};
use os_agent::command::handlers::shell::ShellLimits;
use os_agent::command::{ActionDispatcher, Desktop, DispatchSettings, PathResolver};
use serde_json::{json, Value};
use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Records desktop side effects instead of performing them
#[derive(Default)]
struct RecordingDesktop {
    calls: Mutex<Vec<String>>,
    running: Vec<String>,
}

impl RecordingDesktop {
    fn with_running(apps: &[&str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            running: apps.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Desktop for RecordingDesktop {
    fn launch(&self, program: &str, args: &[&str]) -> io::Result<()> {
        if program == "missing-app" {
            return Err(io::Error::new(io::ErrorKind::NotFound, "no such program"));
        }
        self.record(format!("launch {} {}", program, args.join(" ")).trim().to_string());
        Ok(())
    }

    async fn terminate(&self, app_name: &str) -> io::Result<bool> {
        self.record(format!("terminate {}", app_name));
        Ok(self.running.iter().any(|a| a == app_name))
    }

    fn open_url(&self, url: &str) -> io::Result<()> {
        self.record(format!("open_url {}", url));
        Ok(())
    }

    async fn capture_screen(&self, path: &Path) -> io::Result<()> {
        self.record(format!("capture {}", path.display()));
        std::fs::write(path, b"png")
    }
}

fn params(v: Value) -> Params {
    v.as_object().cloned().unwrap()
}

fn dispatcher_with(dir: &Path, desktop: Arc<RecordingDesktop>, settings: DispatchSettings) -> ActionDispatcher {
    ActionDispatcher::new(
        ActionCatalog::new(),
        desktop,
        PathResolver::new(Some(dir.join("home")), dir.to_path_buf()),
        settings,
    )
}

fn dispatcher(dir: &Path, desktop: Arc<RecordingDesktop>) -> ActionDispatcher {
    dispatcher_with(dir, desktop, DispatchSettings::default())
}

/// Scenario: "Create a file called test.txt"
#[tokio::test]
async fn test_create_empty_file_reports_resolved_path() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path(), Arc::new(RecordingDesktop::default()));

    let env = d
        .execute("create_file", &params(json!({"path": "test.txt", "content": ""})))
        .await;

    let expected = dir.path().join("test.txt");
    assert_eq!(std::fs::read_to_string(&expected).unwrap(), "");
    assert!(env.message.contains(&expected.display().to_string()));
    assert!(env.message.starts_with("Created file:"));
}

#[tokio::test]
async fn test_create_file_builds_missing_parents() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path(), Arc::new(RecordingDesktop::default()));

    d.execute(
        "create_file",
        &params(json!({"path": "a/b/c/notes.md", "content": "# hi\n"})),
    )
    .await;

    let file = dir.path().join("a/b/c/notes.md");
    assert_eq!(std::fs::read_to_string(file).unwrap(), "# hi\n");
}

#[tokio::test]
async fn test_tilde_paths_expand_to_home() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path(), Arc::new(RecordingDesktop::default()));

    let env = d
        .execute("create_folder", &params(json!({"path": "~/Projects"})))
        .await;

    assert!(dir.path().join("home/Projects").is_dir());
    assert!(env.message.starts_with("Created folder:"));
}

/// Scenario: "delete notes.txt" without confirmation
#[tokio::test]
async fn test_unconfirmed_delete_file_leaves_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "keep me").unwrap();
    let d = dispatcher(dir.path(), Arc::new(RecordingDesktop::default()));

    let env = d
        .execute("delete_file", &params(json!({"path": "notes.txt", "confirmed": false})))
        .await;

    assert!(env.message.starts_with("Please confirm deletion of:"));
    assert!(env.message.contains("notes.txt"));
    assert_eq!(std::fs::read_to_string(&file).unwrap(), "keep me");
}

#[tokio::test]
async fn test_unconfirmed_delete_folder_leaves_folder() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("photos")).unwrap();
    let d = dispatcher(dir.path(), Arc::new(RecordingDesktop::default()));

    // String "true" is not a confirmation
    let env = d
        .execute("delete_folder", &params(json!({"path": "photos", "confirmed": "true"})))
        .await;

    assert!(env.message.contains("photos"));
    assert!(dir.path().join("photos").is_dir());
}

#[cfg(unix)]
#[tokio::test]
async fn test_unconfirmed_run_command_does_not_run() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("marker");
    let command = format!("touch {}", marker.display());
    let d = dispatcher(dir.path(), Arc::new(RecordingDesktop::default()));

    let env = d
        .execute("run_command", &params(json!({"command": command})))
        .await;

    assert!(env.message.contains(&command));
    assert!(!marker.exists());
}

#[tokio::test]
async fn test_confirmed_delete_of_missing_targets() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path(), Arc::new(RecordingDesktop::default()));

    let env = d
        .execute("delete_file", &params(json!({"path": "ghost.txt", "confirmed": true})))
        .await;
    assert!(env.message.starts_with("File not found:"));

    let env = d
        .execute("delete_folder", &params(json!({"path": "ghost", "confirmed": true})))
        .await;
    assert!(env.message.starts_with("Folder not found:"));
}

#[tokio::test]
async fn test_confirmed_delete_file_removes_it() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("old.log");
    std::fs::write(&file, "x").unwrap();
    let d = dispatcher(dir.path(), Arc::new(RecordingDesktop::default()));

    let env = d
        .execute("delete_file", &params(json!({"path": "old.log", "confirmed": true})))
        .await;

    assert!(env.message.starts_with("Deleted file:"));
    assert!(!file.exists());
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_command_output_is_truncated() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path(), Arc::new(RecordingDesktop::default()));

    let env = d
        .execute(
            "run_command",
            &params(json!({
                "command": "head -c 2000 /dev/zero | tr '\\0' 'x'",
                "confirmed": true
            })),
        )
        .await;

    let output = env.message.strip_prefix("Command output: ").unwrap();
    assert_eq!(output.chars().count(), 500);
    assert!(output.chars().all(|c| c == 'x'));
}

#[cfg(unix)]
#[tokio::test]
async fn test_run_command_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let settings = DispatchSettings {
        shell: ShellLimits {
            timeout: Duration::from_secs(1),
            output_limit: 500,
        },
        ..DispatchSettings::default()
    };
    let d = dispatcher_with(dir.path(), Arc::new(RecordingDesktop::default()), settings);

    let started = Instant::now();
    let env = d
        .execute("run_command", &params(json!({"command": "sleep 5", "confirmed": true})))
        .await;

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(env.message, "Command timed out after 1 seconds: sleep 5");
}

#[tokio::test]
async fn test_unknown_action_has_no_side_effect() {
    let dir = tempfile::tempdir().unwrap();
    let desktop = Arc::new(RecordingDesktop::default());
    let d = dispatcher(dir.path(), desktop.clone());

    let env = d
        .execute("format_disk", &params(json!({"confirmed": true})))
        .await;

    assert_eq!(env.message, "Unknown action: format_disk");
    assert!(desktop.calls().is_empty());
}

#[tokio::test]
async fn test_invalid_params_become_messages() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path(), Arc::new(RecordingDesktop::default()));

    let env = d
        .execute("create_folder", &params(json!({"folder": "x"})))
        .await;
    assert!(env.message.starts_with("Invalid parameters for create_folder"));
}

#[tokio::test]
async fn test_open_app_literal_and_missing() {
    let dir = tempfile::tempdir().unwrap();
    let desktop = Arc::new(RecordingDesktop::default());
    let d = dispatcher(dir.path(), desktop.clone());

    let env = d
        .execute("open_app", &params(json!({"app_name": "my-tool"})))
        .await;
    assert_eq!(env.message, "Opening my-tool");
    assert_eq!(desktop.calls(), vec!["launch my-tool".to_string()]);

    let env = d
        .execute("open_app", &params(json!({"app_name": "missing-app"})))
        .await;
    assert_eq!(env.message, "Could not find application: missing-app");
}

#[tokio::test]
async fn test_open_app_known_alias_launches_once() {
    let dir = tempfile::tempdir().unwrap();
    let desktop = Arc::new(RecordingDesktop::default());
    let d = dispatcher(dir.path(), desktop.clone());

    let env = d
        .execute("open_app", &params(json!({"app_name": "Calculator"})))
        .await;
    assert_eq!(env.message, "Opening Calculator");
    assert_eq!(desktop.calls().len(), 1);
}

#[tokio::test]
async fn test_close_app_reports_when_not_running() {
    let dir = tempfile::tempdir().unwrap();
    let desktop = Arc::new(RecordingDesktop::with_running(&["slack"]));
    let d = dispatcher(dir.path(), desktop.clone());

    let env = d
        .execute("close_app", &params(json!({"app_name": "slack"})))
        .await;
    assert_eq!(env.message, "Closed slack");

    let env = d
        .execute("close_app", &params(json!({"app_name": "zoom"})))
        .await;
    assert_eq!(env.message, "No running application named zoom");
}

#[tokio::test]
async fn test_search_web_opens_encoded_url() {
    let dir = tempfile::tempdir().unwrap();
    let desktop = Arc::new(RecordingDesktop::default());
    let d = dispatcher(dir.path(), desktop.clone());

    let env = d
        .execute("search_web", &params(json!({"query": "weather today"})))
        .await;

    assert_eq!(env.message, "Searching for: weather today");
    assert_eq!(
        desktop.calls(),
        vec!["open_url https://www.google.com/search?q=weather%20today".to_string()]
    );
}

#[tokio::test]
async fn test_open_url() {
    let dir = tempfile::tempdir().unwrap();
    let desktop = Arc::new(RecordingDesktop::default());
    let d = dispatcher(dir.path(), desktop.clone());

    let env = d
        .execute("open_url", &params(json!({"url": "rust-lang.org"})))
        .await;

    assert_eq!(env.message, "Opening: https://rust-lang.org");
    assert_eq!(desktop.calls(), vec!["open_url https://rust-lang.org".to_string()]);
}

#[tokio::test]
async fn test_screenshot_default_and_custom_names() {
    let dir = tempfile::tempdir().unwrap();
    let desktop = Arc::new(RecordingDesktop::default());
    let d = dispatcher(dir.path(), desktop.clone());

    let env = d.execute("take_screenshot", &Params::new()).await;
    assert!(env.message.starts_with("Screenshot saved to:"));
    assert!(dir.path().join("screenshot.png").exists());

    d.execute(
        "take_screenshot",
        &params(json!({"filename": "shots/desk.png"})),
    )
    .await;
    assert!(dir.path().join("shots/desk.png").exists());
    assert_eq!(desktop.calls().len(), 2);
}

#[tokio::test]
async fn test_get_system_info() {
    let dir = tempfile::tempdir().unwrap();
    let d = dispatcher(dir.path(), Arc::new(RecordingDesktop::default()));

    let env = d.execute("get_system_info", &Params::new()).await;
    assert!(env.message.starts_with("OS: "));
    assert!(env.message.contains("\nMachine: "));
    assert!(env.message.contains("\nProcessor: "));
}
