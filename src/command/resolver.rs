//! Path resolution - turns path parameters into concrete filesystem paths

use std::path::PathBuf;

/// Expands `~` and anchors relative paths at a working directory
#[derive(Debug, Clone)]
pub struct PathResolver {
    home: Option<PathBuf>,
    working_dir: PathBuf,
}

impl PathResolver {
    pub fn new(home: Option<PathBuf>, working_dir: PathBuf) -> Self {
        Self { home, working_dir }
    }

    /// Resolver for the invoking user and the process working directory
    pub fn for_current_user() -> Self {
        let working_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::new(dirs::home_dir(), working_dir)
    }

    /// Resolve a raw path parameter.
    ///
    /// `~` and `~/...` expand to the home directory (when known); `~user`
    /// forms are left alone. Relative results are joined onto the working
    /// directory.
    pub fn resolve(&self, raw: &str) -> PathBuf {
        let raw = raw.trim();
        let expanded = match (&self.home, raw.strip_prefix('~')) {
            (Some(home), Some("")) => home.clone(),
            (Some(home), Some(rest)) if rest.starts_with('/') || rest.starts_with('\\') => {
                home.join(&rest[1..])
            }
            _ => PathBuf::from(raw),
        };

        if expanded.is_absolute() {
            expanded
        } else {
            self.working_dir.join(expanded)
        }
    }
}
