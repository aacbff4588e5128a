use std::path::{Component, Path};

/// Relative path of `path` under `root`, joined with `/` regardless of platform.
pub fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Final component of a slash path.
pub fn file_name(slash_path: &str) -> &str {
    slash_path.rsplit('/').next().unwrap_or(slash_path)
}

/// Lowercase suffix including the leading dot, or empty. Dotfiles such as
/// `.todo` have no extension.
pub fn extension_of(name: &str) -> String {
    match name.rfind('.') {
        Some(0) | None => String::new(),
        Some(idx) if idx + 1 == name.len() => String::new(),
        Some(idx) => name[idx..].to_lowercase(),
    }
}

/// True when one root contains the other.
pub fn roots_overlap(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}
