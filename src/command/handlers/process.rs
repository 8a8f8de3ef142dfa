//! Process lifecycle: open_app, close_app

use crate::actions::params::AppParams;
use crate::command::desktop::Desktop;
use crate::core::error::{HandlerError, HandlerResult};
use std::io;

/// A friendly name the user might say, how to start it, and what its
/// process is called once running
struct KnownApp {
    alias: &'static str,
    program: &'static str,
    args: &'static [&'static str],
    process: &'static str,
}

const fn app(
    alias: &'static str,
    program: &'static str,
    args: &'static [&'static str],
    process: &'static str,
) -> KnownApp {
    KnownApp {
        alias,
        program,
        args,
        process,
    }
}

#[cfg(windows)]
const KNOWN_APPS: &[KnownApp] = &[
    app("notepad", "notepad.exe", &[], "notepad"),
    app("calculator", "calc.exe", &[], "CalculatorApp"),
    app("paint", "mspaint.exe", &[], "mspaint"),
    app("explorer", "explorer.exe", &[], "explorer"),
    app(
        "chrome",
        r"C:\Program Files\Google\Chrome\Application\chrome.exe",
        &[],
        "chrome",
    ),
    app(
        "edge",
        r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
        &[],
        "msedge",
    ),
    app("cmd", "cmd.exe", &[], "cmd"),
    app("powershell", "powershell.exe", &[], "powershell"),
];

#[cfg(target_os = "macos")]
const KNOWN_APPS: &[KnownApp] = &[
    app("notepad", "open", &["-a", "TextEdit"], "TextEdit"),
    app("textedit", "open", &["-a", "TextEdit"], "TextEdit"),
    app("calculator", "open", &["-a", "Calculator"], "Calculator"),
    app("explorer", "open", &["-a", "Finder"], "Finder"),
    app("finder", "open", &["-a", "Finder"], "Finder"),
    app("chrome", "open", &["-a", "Google Chrome"], "Google Chrome"),
    app("edge", "open", &["-a", "Microsoft Edge"], "Microsoft Edge"),
    app("safari", "open", &["-a", "Safari"], "Safari"),
    app("terminal", "open", &["-a", "Terminal"], "Terminal"),
];

#[cfg(not(any(windows, target_os = "macos")))]
const KNOWN_APPS: &[KnownApp] = &[
    app("notepad", "gedit", &[], "gedit"),
    app("calculator", "gnome-calculator", &[], "gnome-calculator"),
    app("explorer", "xdg-open", &["."], "nautilus"),
    app("files", "xdg-open", &["."], "nautilus"),
    app("chrome", "google-chrome", &[], "chrome"),
    app("firefox", "firefox", &[], "firefox"),
    app("terminal", "x-terminal-emulator", &[], "x-terminal-emul"),
];

fn known_app(name: &str) -> Option<&'static KnownApp> {
    let lower = name.trim().to_lowercase();
    KNOWN_APPS.iter().find(|a| a.alias == lower)
}

pub fn open_app(desktop: &dyn Desktop, params: &AppParams) -> HandlerResult {
    let name = params.app_name.trim();

    match known_app(name) {
        Some(known) => {
            desktop
                .launch(known.program, known.args)
                .map_err(|e| HandlerError::io(format!("Failed to open {}", name), e))?;
        }
        None => {
            desktop.launch(name, &[]).map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => HandlerError::AppNotFound(name.to_string()),
                _ => HandlerError::io(format!("Failed to open {}", name), e),
            })?;
        }
    }

    tracing::info!(app = name, "Launched application");
    Ok(format!("Opening {}", name))
}

pub async fn close_app(desktop: &dyn Desktop, params: &AppParams) -> HandlerResult {
    let name = params.app_name.trim();
    let process = known_app(name).map(|k| k.process).unwrap_or(name);

    let closed = desktop
        .terminate(process)
        .await
        .map_err(|e| HandlerError::io(format!("Failed to close {}", name), e))?;

    if closed {
        Ok(format!("Closed {}", name))
    } else {
        Ok(format!("No running application named {}", name))
    }
}
