use thiserror::Error;

/// Why an uploaded filename or media path was refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NameError {
    #[error("Filename cannot be empty")]
    Empty,
    #[error("Invalid filename: control characters are not allowed")]
    ControlCharacter,
    #[error("Invalid filename: path separators are not allowed")]
    PathSeparator,
    #[error("Invalid filename: hidden files are not allowed")]
    Hidden,
    #[error("Media path must be relative with no empty segments")]
    MalformedPath,
    #[error("Media path must not contain '..'")]
    Traversal,
}

/// Checks one path component: non-empty, printable, not hidden.
fn check_component(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }
    // NUL, CR and LF all fall in this range.
    if name.chars().any(char::is_control) {
        return Err(NameError::ControlCharacter);
    }
    if name == ".." {
        return Err(NameError::Traversal);
    }
    if name.starts_with('.') {
        return Err(NameError::Hidden);
    }
    Ok(())
}

/// Trims an uploaded filename and rejects anything with directory components.
pub fn validate_upload_filename(filename: &str) -> Result<&str, NameError> {
    let name = filename.trim();
    if name.contains(['/', '\\']) {
        return Err(NameError::PathSeparator);
    }
    check_component(name)?;
    Ok(name)
}

/// Validates a `folder/file` path requested from the media root.
pub fn validate_media_path(path: &str) -> Result<&str, NameError> {
    let path = path.trim();
    if path.is_empty() {
        return Err(NameError::Empty);
    }
    if path.contains('\\') || path.starts_with('/') {
        return Err(NameError::MalformedPath);
    }
    for segment in path.split('/') {
        match check_component(segment) {
            Err(NameError::Empty) => return Err(NameError::MalformedPath),
            other => other?,
        }
    }
    Ok(path)
}

/// Path segments of an absolute http(s) URL, without query or fragment.
///
/// `None` for anything else, including `blob:` previews and bare paths.
pub fn url_path_segments(url: &str) -> Option<Vec<&str>> {
    let (scheme, rest) = url.split_once("://")?;
    if !matches!(scheme, "http" | "https") {
        return None;
    }
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    let (_host, path) = rest[..end].split_once('/')?;
    Some(path.split('/').filter(|s| !s.is_empty()).collect())
}

/// Drops the last extension. `None` when nothing is left.
pub fn file_stem(filename: &str) -> Option<&str> {
    let stem = filename
        .rsplit_once('.')
        .map_or(filename, |(stem, _)| stem);
    (!stem.is_empty()).then_some(stem)
}
