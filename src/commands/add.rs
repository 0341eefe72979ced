//! Add command: install a local directory or a git repository as a cognitive

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use console::Style;

use super::context::Context;
use crate::cache::SystemClock;
use crate::cli::AddArgs;
use crate::domain::{
    CognitiveType, InstallMode, InstallRequest, InstallResult, InstallTarget, LocalCognitive,
};
use crate::error::{
    Result, file_not_found, install_failed, platform_not_supported, unsafe_name,
};
use crate::filesystem::FileSystem;
use crate::hash::directory_hash;
use crate::lockfile::LockEntry;
use crate::path_utils::{sanitize_name, to_forward_slashes};

/// Provider recorded for units installed from a local directory
pub const LOCAL_SOURCE_TYPE: &str = "local";

/// Provider recorded for units installed from a git repository
pub const GIT_SOURCE_TYPE: &str = "git";

/// Platform used when nothing was selected before
pub const FALLBACK_TARGET: &str = "universal";

/// Where the files of a unit come from
#[derive(Debug)]
struct Origin {
    /// Directory holding the unit's files
    dir: PathBuf,
    source: String,
    source_type: &'static str,
    source_url: String,
    cognitive_path: Option<String>,
    /// Name used when `--name` is absent
    default_name: String,
}

pub fn run(ctx: &Context, args: AddArgs) -> Result<()> {
    let origin = if is_git_source(&ctx.fs, &args.source) {
        clone_origin(ctx, &args)?
    } else {
        local_origin(&ctx.fs, Path::new(&args.source))?
    };
    let raw_name = args.name.clone().unwrap_or_else(|| origin.default_name.clone());
    let name = sanitize_name(&raw_name)?;
    let cognitive_type = args
        .cognitive_type
        .or_else(|| detect_type(&ctx.fs, &origin.dir))
        .unwrap_or_default();

    let lock = ctx.lock()?;
    let target_ids = select_targets(ctx, &args.to, &lock.get_last_selected_targets())?;
    let mode = if args.copy {
        InstallMode::Copy
    } else {
        InstallMode::Symlink
    };
    let targets: Vec<InstallTarget> = target_ids
        .iter()
        .map(|id| InstallTarget::new(id.clone(), ctx.scope, mode))
        .collect();

    let request = local_request(&ctx.fs, &name, &origin.dir, cognitive_type, args.category.clone());
    let options = ctx.install_options();
    let installer = ctx.installer();
    let results = installer.install_many(&request, &targets, &options);
    print_results(&results);

    if !results.iter().any(|r| r.success) {
        let error = results
            .iter()
            .find_map(|r| r.error.clone())
            .unwrap_or_default();
        return Err(install_failed(&name, error));
    }

    let canonical = installer.canonical_path_for(&request, ctx.scope, &options)?;
    let hash = directory_hash(&ctx.fs, &canonical)?;
    let category = args
        .category
        .unwrap_or_else(|| ctx.settings.default_category.clone());
    let mut entry = LockEntry::new(
        origin.source,
        origin.source_type,
        origin.source_url,
        hash,
        cognitive_type,
    )
    .with_category(category);
    if let Some(path) = origin.cognitive_path {
        entry = entry.with_cognitive_path(path);
    }
    lock.add_entry(&name, entry)?;
    lock.save_last_selected_targets(&target_ids)?;

    println!(
        "{} {} {} ({})",
        Style::new().green().bold().apply_to("Installed"),
        Style::new().bold().apply_to(&name),
        Style::new().dim().apply_to(format!("[{cognitive_type}]")),
        canonical.display()
    );
    Ok(())
}

fn local_origin(fs: &dyn FileSystem, path: &Path) -> Result<Origin> {
    let dir = absolute_dir(fs, path)?;
    let source = dir.to_string_lossy().into_owned();
    Ok(Origin {
        default_name: dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        source_url: source.clone(),
        source,
        source_type: LOCAL_SOURCE_TYPE,
        cognitive_path: None,
        dir,
    })
}

/// Clone through the source cache, then point at `--subdir` inside the tree
fn clone_origin(ctx: &Context, args: &AddArgs) -> Result<Origin> {
    let url = args.source.trim();
    let clock = SystemClock;
    let cloned = ctx
        .source_cache(&clock)
        .clones()
        .get_or_clone(&ctx.cloner(), url, args.git_ref.as_deref())?;
    if cloned.from_cache {
        tracing::debug!(url, key = %cloned.key, "using cached clone");
    }

    let (dir, cognitive_path) = match &args.subdir {
        Some(subdir) => {
            let inside = subdir
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
            if !inside || subdir.as_os_str().is_empty() {
                return Err(unsafe_name(
                    subdir.display().to_string(),
                    "must be a relative path inside the repository",
                ));
            }
            (cloned.path.join(subdir), Some(to_forward_slashes(subdir)))
        }
        None => (cloned.path.clone(), None),
    };
    if !ctx.fs.metadata(&dir).is_ok_and(|m| m.is_dir()) {
        return Err(file_not_found(format!(
            "{url}{}",
            cognitive_path.as_deref().map(|p| format!(" ({p})")).unwrap_or_default()
        )));
    }

    let default_name = dir
        .strip_prefix(&cloned.path)
        .ok()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| repo_name(url));
    Ok(Origin {
        dir,
        source: url.to_string(),
        source_type: GIT_SOURCE_TYPE,
        source_url: url.to_string(),
        cognitive_path,
        default_name,
    })
}

/// URL schemes and SCP-style remotes are git sources; so is a `.git` path
/// that does not exist locally
fn is_git_source(fs: &dyn FileSystem, source: &str) -> bool {
    let source = source.trim();
    ["https://", "http://", "ssh://", "git://", "file://", "git@"]
        .iter()
        .any(|prefix| source.starts_with(prefix))
        || (source.ends_with(".git") && !fs.exists(Path::new(source)))
}

/// Last path segment of a repository URL, without `.git`
fn repo_name(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    trimmed
        .rsplit(['/', ':'])
        .next()
        .unwrap_or(trimmed)
        .to_string()
}

/// Request that deep-copies `source` into the store under `name`
pub(crate) fn local_request(
    fs: &dyn FileSystem,
    name: &str,
    source: &Path,
    cognitive_type: CognitiveType,
    category: Option<String>,
) -> InstallRequest {
    let raw_content = fs
        .read_to_string(&source.join(cognitive_type.file_name()))
        .unwrap_or_default();
    InstallRequest::Local {
        cognitive: LocalCognitive {
            name: name.to_string(),
            description: String::new(),
            source_path: source.to_path_buf(),
            cognitive_type,
            raw_content,
            metadata: BTreeMap::new(),
        },
        category,
    }
}

/// Type whose well-known file (`SKILL.md`, `AGENT.md`, ...) is present in `dir`
pub(crate) fn detect_type(fs: &dyn FileSystem, dir: &Path) -> Option<CognitiveType> {
    CognitiveType::ALL
        .into_iter()
        .find(|t| fs.metadata(&dir.join(t.file_name())).is_ok_and(|m| m.is_file()))
}

/// Explicit targets, else the last selection, else the universal platform;
/// every id must be configured
fn select_targets(ctx: &Context, explicit: &[String], last: &[String]) -> Result<Vec<String>> {
    let ids: Vec<String> = if !explicit.is_empty() {
        explicit.to_vec()
    } else if !last.is_empty() {
        last.to_vec()
    } else {
        vec![FALLBACK_TARGET.to_string()]
    };
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if ctx.registry.get(&id).is_none() {
            return Err(platform_not_supported(&id));
        }
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    Ok(unique)
}

fn absolute_dir(fs: &dyn FileSystem, path: &Path) -> Result<PathBuf> {
    let absolute = dunce::canonicalize(path).map_err(|_| file_not_found(path.display().to_string()))?;
    match fs.metadata(&absolute) {
        Ok(meta) if meta.is_dir() => Ok(absolute),
        _ => Err(file_not_found(path.display().to_string())),
    }
}

fn print_results(results: &[InstallResult]) {
    for result in results {
        if result.success {
            let note = if result.symlink_failed {
                " (copied, symlink failed)"
            } else {
                ""
            };
            println!(
                "  {} {} -> {}{}",
                Style::new().green().apply_to("✓"),
                Style::new().cyan().apply_to(&result.target_id),
                result.path.display(),
                note
            );
        } else {
            println!(
                "  {} {}: {}",
                Style::new().red().apply_to("✗"),
                Style::new().cyan().apply_to(&result.target_id),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }
}
