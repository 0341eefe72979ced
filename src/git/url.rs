//! URL normalization for libgit2

use std::borrow::Cow;

/// Rewrite SCP-style `git@host:path` as `ssh://git@host/path`
pub fn normalize_ssh_url(url: &str) -> Cow<'_, str> {
    if !url.starts_with("git@") {
        return Cow::Borrowed(url);
    }
    match url.split_once(':') {
        Some((host, path)) => {
            let path = path.strip_prefix('/').unwrap_or(path);
            Cow::Owned(format!("ssh://{host}/{path}"))
        }
        None => Cow::Borrowed(url),
    }
}

/// Make `file://` URLs absolute so libgit2 resolves them on Unix
pub fn normalize_file_url(url: &str) -> Cow<'_, str> {
    let Some(after) = url.strip_prefix("file://") else {
        return Cow::Borrowed(url);
    };
    if after.contains('\\') {
        return Cow::Owned(format!("file:///{}", after.replace('\\', "/")));
    }
    if !after.is_empty() && !after.starts_with('/') {
        return Cow::Owned(format!("file:///{after}"));
    }
    Cow::Borrowed(url)
}

/// Whether `url` points at the local filesystem
pub fn is_local_url(url: &str) -> bool {
    url.starts_with("file://") || std::path::Path::new(url).is_absolute()
}

/// URL as handed to libgit2
pub fn normalize_for_clone(url: &str) -> String {
    normalize_file_url(&normalize_ssh_url(url)).into_owned()
}
