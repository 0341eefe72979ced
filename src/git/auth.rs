//! Credential callbacks for libgit2
//!
//! Authentication is delegated to git's own mechanisms: the SSH agent,
//! keys under `~/.ssh`, and configured credential helpers. Public
//! repositories fall through to anonymous credentials.

use std::path::Path;

use git2::{Cred, CredentialType, Error, ErrorClass, ErrorCode, RemoteCallbacks};

const SSH_KEY_NAMES: [&str; 3] = ["id_ed25519", "id_rsa", "id_ecdsa"];

fn auth_error(message: &str) -> Error {
    Error::new(ErrorCode::Auth, ErrorClass::Http, message)
}

fn ssh_key_credentials(home: &Path, username: &str) -> Result<Cred, Error> {
    let ssh_dir = home.join(".ssh");
    SSH_KEY_NAMES
        .iter()
        .map(|name| (ssh_dir.join(name), ssh_dir.join(format!("{name}.pub"))))
        .filter(|(private, _)| private.exists())
        .find_map(|(private, public)| {
            let public = public.exists().then_some(public.as_path());
            Cred::ssh_key(username, public, &private, None).ok()
        })
        .ok_or_else(|| auth_error("no usable SSH key found"))
}

fn anonymous_credentials(username_from_url: Option<&str>) -> Result<Cred, Error> {
    username_from_url
        .into_iter()
        .chain(["", "git", "anonymous"])
        .find_map(|username| Cred::userpass_plaintext(username, "").ok())
        .ok_or_else(|| auth_error("authentication failed"))
}

fn helper_credentials(url: &str, username_from_url: Option<&str>) -> Result<Cred, Error> {
    let config = git2::Config::open_default().or_else(|_| git2::Config::new())?;
    Cred::credential_helper(&config, url, username_from_url)
}

/// Install credential callbacks on `callbacks`
pub fn setup_auth_callbacks(callbacks: &mut RemoteCallbacks<'_>) {
    callbacks.credentials(|url, username_from_url, allowed_types| {
        if allowed_types.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }

        if allowed_types.contains(CredentialType::SSH_KEY) {
            let username = username_from_url.unwrap_or("git");
            return Cred::ssh_key_from_agent(username).or_else(|_| {
                let home = dirs::home_dir().unwrap_or_default();
                ssh_key_credentials(&home, username)
            });
        }

        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return helper_credentials(url, username_from_url)
                .or_else(|_| anonymous_credentials(username_from_url));
        }

        Err(auth_error("no supported credential type"))
    });
}
