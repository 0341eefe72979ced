//! Ref resolution and checkout

use git2::{Commit, Oid, Repository};

use crate::error::{Result, clone_failed};

/// Resolve a branch, tag or (partial) SHA to a commit
pub fn resolve_reference<'r>(repo: &'r Repository, url: &str, refname: &str) -> Result<Commit<'r>> {
    let candidates = [
        refname.to_string(),
        format!("refs/heads/{refname}"),
        format!("refs/tags/{refname}"),
        format!("refs/remotes/origin/{refname}"),
    ];
    let by_name = candidates.iter().find_map(|candidate| {
        repo.find_reference(candidate)
            .and_then(|r| r.peel_to_commit())
            .ok()
    });
    if let Some(commit) = by_name {
        return Ok(commit);
    }

    if let Some(commit) = Oid::from_str(refname)
        .ok()
        .and_then(|oid| repo.find_commit(oid).ok())
    {
        return Ok(commit);
    }

    repo.revparse_single(refname)
        .and_then(|obj| obj.peel_to_commit())
        .map_err(|e| clone_failed(url, format!("cannot resolve ref '{refname}': {}", e.message())))
}

/// Detach HEAD at `commit` and force the working tree to match
pub fn checkout_commit(repo: &Repository, url: &str, commit: &Commit<'_>) -> Result<()> {
    let fail = |e: git2::Error| clone_failed(url, format!("checkout of {} failed: {}", commit.id(), e.message()));
    repo.set_head_detached(commit.id()).map_err(fail)?;
    let mut checkout = git2::build::CheckoutBuilder::new();
    checkout.force();
    repo.checkout_head(Some(&mut checkout)).map_err(fail)
}

/// SHA of the commit HEAD points at
pub fn head_sha(repo: &Repository, url: &str) -> Result<String> {
    repo.head()
        .and_then(|head| head.peel_to_commit())
        .map(|commit| commit.id().to_string())
        .map_err(|e| clone_failed(url, format!("cannot read HEAD: {}", e.message())))
}
