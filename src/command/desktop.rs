//! Desktop side effects: launching programs, closing them, opening URLs and
//! capturing the screen.
//!
//! These are the operations whose effects leave the process (a window opens,
//! a browser tab appears), so they sit behind a trait and tests swap in a
//! recording double. Filesystem, shell and system queries are called
//! directly by their handlers.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Stdio;
use sysinfo::{ProcessRefreshKind, RefreshKind, Signal, System};
use tokio::process::Command;

#[async_trait]
pub trait Desktop: Send + Sync {
    /// Start a program and return without waiting for it
    fn launch(&self, program: &str, args: &[&str]) -> io::Result<()>;

    /// Terminate every process called exactly `app_name`.
    ///
    /// The name is compared literally, never as a pattern. Returns `false`
    /// when nothing by that name was running.
    async fn terminate(&self, app_name: &str) -> io::Result<bool>;

    /// Open a URL in the default browser
    fn open_url(&self, url: &str) -> io::Result<()>;

    /// Save a capture of the whole screen to `path`
    async fn capture_screen(&self, path: &Path) -> io::Result<()>;
}

/// The real desktop of the machine the agent runs on
#[derive(Debug, Default, Clone)]
pub struct SystemDesktop;

impl SystemDesktop {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Desktop for SystemDesktop {
    fn launch(&self, program: &str, args: &[&str]) -> io::Result<()> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map(|_child| ())
    }

    async fn terminate(&self, app_name: &str) -> io::Result<bool> {
        let app_name = app_name.trim().to_string();
        tokio::task::spawn_blocking(move || terminate_by_name(&app_name))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }

    fn open_url(&self, url: &str) -> io::Result<()> {
        let (program, args) = url_opener(url);
        self.launch(program, &args)
    }

    async fn capture_screen(&self, path: &Path) -> io::Result<()> {
        let target = path.to_string_lossy().into_owned();
        let mut last_err = io::Error::new(io::ErrorKind::NotFound, "no screenshot tool found");

        for (program, args) in capture_commands(&target) {
            let result = Command::new(program)
                .args(&args)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::piped())
                .output()
                .await;
            match result {
                Ok(output) if output.status.success() => return Ok(()),
                Ok(output) => {
                    last_err = io::Error::new(
                        io::ErrorKind::Other,
                        format!(
                            "{} failed: {}",
                            program,
                            String::from_utf8_lossy(&output.stderr).trim()
                        ),
                    );
                }
                // Tool not installed, try the next one
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => last_err = e,
            }
        }

        Err(last_err)
    }
}

/// Signal every process named `app_name`, never the agent itself
fn terminate_by_name(app_name: &str) -> io::Result<bool> {
    let system =
        System::new_with_specifics(RefreshKind::new().with_processes(ProcessRefreshKind::new()));
    let own_pid = sysinfo::get_current_pid().ok();

    let mut matched = 0usize;
    let mut signalled = 0usize;
    for process in system.processes().values() {
        // Threads share their owner's name; signalling one hits the whole process
        if Some(process.pid()) == own_pid
            || process.thread_kind().is_some()
            || !is_named(process.name(), app_name)
        {
            continue;
        }
        matched += 1;
        // SIGTERM where supported, a hard kill elsewhere
        if process
            .kill_with(Signal::Term)
            .unwrap_or_else(|| process.kill())
        {
            signalled += 1;
        }
    }

    tracing::debug!(app = app_name, matched, signalled, "Terminate by name");
    match (matched, signalled) {
        (0, _) => Ok(false),
        (_, 0) => Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("could not signal any process named {}", app_name),
        )),
        _ => Ok(true),
    }
}

/// Exact name match. Windows names ignore case and may carry `.exe`.
fn is_named(process_name: &str, app_name: &str) -> bool {
    if app_name.is_empty() {
        return false;
    }
    if cfg!(windows) {
        let process = process_name.to_lowercase();
        let app = app_name.to_lowercase();
        process == app || process.strip_suffix(".exe") == Some(app.as_str())
    } else {
        process_name == app_name
    }
}

/// Hands the URL to the default browser as a single argument, no shell involved
fn url_opener(url: &str) -> (&'static str, Vec<&str>) {
    if cfg!(windows) {
        ("rundll32", vec!["url.dll,FileProtocolHandler", url])
    } else if cfg!(target_os = "macos") {
        ("open", vec![url])
    } else {
        ("xdg-open", vec![url])
    }
}

/// Screenshot tools to try, in order, for this platform
fn capture_commands(target: &str) -> Vec<(&'static str, Vec<String>)> {
    if cfg!(target_os = "macos") {
        vec![("screencapture", vec!["-x".into(), target.into()])]
    } else if cfg!(windows) {
        let script = format!(
            "Add-Type -AssemblyName System.Windows.Forms,System.Drawing; \
             $b = [System.Windows.Forms.Screen]::PrimaryScreen.Bounds; \
             $bmp = New-Object System.Drawing.Bitmap $b.Width, $b.Height; \
             $g = [System.Drawing.Graphics]::FromImage($bmp); \
             $g.CopyFromScreen($b.Location, [System.Drawing.Point]::Empty, $b.Size); \
             $bmp.Save('{}')",
            target.replace('\'', "''")
        );
        vec![("powershell", vec!["-NoProfile".into(), "-Command".into(), script])]
    } else {
        vec![
            ("gnome-screenshot", vec!["-f".into(), target.into()]),
            ("grim", vec![target.into()]),
            ("import", vec!["-window".into(), "root".into(), target.into()]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_commands_target_last_or_embedded() {
        let commands = capture_commands("/tmp/shot.png");
        assert!(!commands.is_empty());
        for (_, args) in commands {
            assert!(args.iter().any(|a| a.contains("/tmp/shot.png")));
        }
    }

    #[test]
    fn test_url_opener_passes_url_verbatim() {
        let url = "https://example.com/?a=1&calc|whoami^x";
        let (program, args) = url_opener(url);
        assert_ne!(program, "cmd");
        assert!(!args.contains(&"/C"));
        assert_eq!(args.last(), Some(&url));
    }

    #[test]
    fn test_process_names_compare_literally() {
        assert!(is_named("sleep", "sleep"));
        assert!(!is_named("sleep", "sl..p"));
        assert!(!is_named("sleep", ".*"));
        assert!(!is_named("sleep", "sl*"));
        assert!(!is_named("sleep", ""));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_terminate_only_hits_the_named_process() {
        let dir = tempfile::tempdir().unwrap();
        let nap = dir.path().join("osagent-nap");
        std::fs::copy("/bin/sleep", &nap).unwrap();
        let mut child = Command::new(&nap).arg("30").spawn().unwrap();
        let desktop = SystemDesktop::new();

        assert!(!desktop.terminate("osagent-n.p").await.unwrap());
        assert!(!desktop.terminate("osagent.*").await.unwrap());
        assert!(child.try_wait().unwrap().is_none());

        assert!(desktop.terminate("osagent-nap").await.unwrap());
        let status = tokio::time::timeout(std::time::Duration::from_secs(5), child.wait())
            .await
            .unwrap()
            .unwrap();
        assert!(!status.success());
    }
}
