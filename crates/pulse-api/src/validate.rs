//! Input validation for analysis triggers
//!
//! Project paths come from stored project records, which users created,
//! so they are validated like untrusted input: no traversal, no shell
//! metacharacters, inside an allow-listed root, never inside a system
//! directory.

use thiserror::Error;

const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\0'];
const SYSTEM_DIRS: &[&str] = &["/etc", "/proc", "/sys", "/dev", "/root", "/boot"];

#[derive(Error, Debug, PartialEq)]
pub enum InvalidPath {
    #[error("path traversal not allowed")]
    Traversal,

    #[error("invalid characters in project path")]
    ForbiddenCharacters,

    #[error("path not in allowed directories")]
    OutsideAllowedRoots,

    #[error("access to system directories not allowed")]
    SystemDirectory,

    #[error("project path is empty")]
    Empty,
}

/// Check a project path against the orchestrator's path policy.
pub fn validate_project_path(path: &str, allowed_roots: &[String]) -> Result<(), InvalidPath> {
    let path = path.trim();
    if path.is_empty() {
        return Err(InvalidPath::Empty);
    }
    if path.contains("..") {
        return Err(InvalidPath::Traversal);
    }
    if path.chars().any(|c| FORBIDDEN_CHARS.contains(&c)) {
        return Err(InvalidPath::ForbiddenCharacters);
    }

    for restricted in SYSTEM_DIRS {
        if path == *restricted || path.starts_with(&format!("{restricted}/")) {
            return Err(InvalidPath::SystemDirectory);
        }
    }

    if !allowed_roots.is_empty() && !allowed_roots.iter().any(|root| path.starts_with(root)) {
        return Err(InvalidPath::OutsideAllowedRoots);
    }

    Ok(())
}
