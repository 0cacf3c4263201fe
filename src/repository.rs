use crate::errors::HookError;
use crate::hooks::current;
use crate::language::Language;
use crate::version::{self, JSON_SUFFIX};
use itertools::Itertools;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

/// Loaded hook definitions keyed by file name.
///
/// Iteration follows the case-insensitive order of the file names, which is
/// also the order hooks sharing a stage are handed to the runtime. The order is
/// computed once on construction.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    hooks: HashMap<String, current::Hook>,
    order: Vec<String>,
}

impl Repository {
    pub fn new(hooks: HashMap<String, current::Hook>, language: &Language) -> Self {
        let order = hooks
            .keys()
            .sorted_by(|a, b| language.collate(a, b))
            .cloned()
            .collect();
        Repository { hooks, order }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &current::Hook)> {
        self.order
            .iter()
            .filter_map(|name| self.hooks.get(name).map(|hook| (name.as_str(), hook)))
    }

    pub fn get(&self, name: &str) -> Option<&current::Hook> {
        self.hooks.get(name)
    }

    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Scans `directories` in order. A file in a later directory replaces the
    /// same-named file from an earlier one. Any bad file fails the whole load.
    pub async fn load(
        token: &CancellationToken,
        directories: &[PathBuf],
        extension_stages: &[String],
        language: &Language,
    ) -> Result<Repository, HookError> {
        let mut hooks = HashMap::new();

        for dir in directories {
            if token.is_cancelled() {
                return Err(HookError::Cancelled);
            }
            read_dir(token, dir, extension_stages, &mut hooks).await?;
        }

        let repository = Repository::new(hooks, language);
        info!(
            "loaded {} hooks from {} directories (language {})",
            repository.len(),
            directories.len(),
            language
        );
        Ok(repository)
    }
}

async fn read_dir(
    token: &CancellationToken,
    dir: &Path,
    extension_stages: &[String],
    hooks: &mut HashMap<String, current::Hook>,
) -> Result<(), HookError> {
    match list_dir(dir).await? {
        Some(names) => read_entries(token, dir, names, extension_stages, hooks).await,
        None => Ok(()),
    }
}

/// Entry names of `dir` in byte order, or `None` when the directory is absent.
async fn list_dir(dir: &Path) -> Result<Option<Vec<OsString>>, HookError> {
    let dir_err = |e| HookError::Directory { path: dir.to_path_buf(), source: e };

    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("skipping missing hook directory {}", dir.display());
            return Ok(None);
        }
        Err(e) => return Err(dir_err(e)),
    };

    let mut names = vec![];
    while let Some(entry) = entries.next_entry().await.map_err(dir_err)? {
        names.push(entry.file_name());
    }
    // stable error reporting regardless of readdir order
    names.sort();
    Ok(Some(names))
}

async fn read_entries(
    token: &CancellationToken,
    dir: &Path,
    names: Vec<OsString>,
    extension_stages: &[String],
    hooks: &mut HashMap<String, current::Hook>,
) -> Result<(), HookError> {
    for name in names {
        if token.is_cancelled() {
            return Err(HookError::Cancelled);
        }

        let path = dir.join(&name);
        if path.extension() != Some(OsStr::new(JSON_SUFFIX)) {
            debug!("skipping {}: not a .{} file", path.display(), JSON_SUFFIX);
            continue;
        }

        let name = name.into_string().map_err(|_| HookError::MalformedDefinition {
            path: path.clone(),
            reason: "file name is not valid UTF-8".to_string(),
        })?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => {
                debug!("skipping directory {}", path.display());
                continue;
            }
            Ok(_) => {}
            // dangling symlink, or removed since the listing
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("skipping {}: {}", path.display(), e);
                continue;
            }
            Err(e) => return Err(HookError::Read { path, source: e }),
        }

        let hook = match version::read_file(&path, extension_stages).await {
            Err(HookError::Read { source, .. }) if source.kind() == ErrorKind::NotFound => {
                warn!("skipping {}: {}", path.display(), source);
                continue;
            }
            result => result?,
        };

        if hooks.insert(name.clone(), hook).is_some() {
            debug!("{} overrides an earlier hook named {}", path.display(), name);
        }
    }

    Ok(())
}
