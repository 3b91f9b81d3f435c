use crate::comments::Comment;
use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
    #[error("Invalid comments file {path}: {source}")]
    Comments {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Read a note and return its content
pub fn read_file(relative_path: &RelativePath, notes_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(notes_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(IoError::Io)
}

/// Write content to a note
pub fn write_file(
    relative_path: &RelativePath,
    notes_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(notes_root);

    // Create parent directories if they don't exist
    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(&absolute_path, content).map_err(IoError::Io)
}

pub fn validate_notes_dir(path: &Path) -> Result<(), IoError> {
    if !path.exists() || !path.is_dir() {
        return Err(IoError::InvalidNotesDir(
            "Directory does not exist".to_string(),
        ));
    }

    Ok(())
}

/// Sidecar file holding the comments of `note`: `note.md` -> `note.md.comments.json`
pub fn comments_path(note: &RelativePath) -> RelativePathBuf {
    RelativePathBuf::from(format!("{note}.comments.json"))
}

/// Load the comments stored for `note`. A note without a sidecar has none.
pub fn load_comments(note: &RelativePath, notes_root: &Path) -> Result<Vec<Comment>, IoError> {
    let sidecar = comments_path(note);
    let content = match read_file(&sidecar, notes_root) {
        Ok(content) => content,
        Err(IoError::NotFound(_)) => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    serde_json::from_str(&content).map_err(|source| IoError::Comments {
        path: sidecar.to_path(notes_root),
        source,
    })
}

/// Store the comments for `note`, replacing any previous sidecar
pub fn save_comments(
    note: &RelativePath,
    notes_root: &Path,
    comments: &[Comment],
) -> Result<(), IoError> {
    let sidecar = comments_path(note);
    let content = serde_json::to_string_pretty(comments).map_err(|source| IoError::Comments {
        path: sidecar.to_path(notes_root),
        source,
    })?;
    write_file(&sidecar, notes_root, &content)
}
