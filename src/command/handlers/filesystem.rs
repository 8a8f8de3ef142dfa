//! Filesystem mutation: create_file, create_folder, delete_file, delete_folder

use crate::actions::params::{CreateFileParams, PathParams};
use crate::command::resolver::PathResolver;
use crate::core::error::{HandlerError, HandlerResult};
use std::io;
use std::path::Path;
use tokio::fs;

pub async fn create_file(resolver: &PathResolver, params: &CreateFileParams) -> HandlerResult {
    let path = resolver.resolve(&params.path);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| HandlerError::io("Failed to create file", e))?;
    }
    fs::write(&path, params.content.as_bytes())
        .await
        .map_err(|e| HandlerError::io("Failed to create file", e))?;

    Ok(format!("Created file: {}", path.display()))
}

/// Succeeds when the folder already exists
pub async fn create_folder(resolver: &PathResolver, params: &PathParams) -> HandlerResult {
    let path = resolver.resolve(&params.path);

    fs::create_dir_all(&path)
        .await
        .map_err(|e| HandlerError::io("Failed to create folder", e))?;

    Ok(format!("Created folder: {}", path.display()))
}

pub async fn delete_file(resolver: &PathResolver, params: &PathParams) -> HandlerResult {
    let path = resolver.resolve(&params.path);

    if !is_kind(&path, |m| m.is_file())
        .await
        .map_err(|e| HandlerError::io("Failed to delete file", e))?
    {
        return Ok(format!("File not found: {}", path.display()));
    }

    fs::remove_file(&path)
        .await
        .map_err(|e| HandlerError::io("Failed to delete file", e))?;

    Ok(format!("Deleted file: {}", path.display()))
}

pub async fn delete_folder(resolver: &PathResolver, params: &PathParams) -> HandlerResult {
    let path = resolver.resolve(&params.path);

    if !is_kind(&path, |m| m.is_dir())
        .await
        .map_err(|e| HandlerError::io("Failed to delete folder", e))?
    {
        return Ok(format!("Folder not found: {}", path.display()));
    }

    fs::remove_dir_all(&path)
        .await
        .map_err(|e| HandlerError::io("Failed to delete folder", e))?;

    Ok(format!("Deleted folder: {}", path.display()))
}

/// Whether `path` exists and passes `check`; a missing path is `Ok(false)`
async fn is_kind(path: &Path, check: impl Fn(&std::fs::Metadata) -> bool) -> io::Result<bool> {
    match fs::metadata(path).await {
        Ok(meta) => Ok(check(&meta)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}
