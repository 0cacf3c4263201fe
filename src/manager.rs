use crate::config::Config;
use crate::errors::HookError;
use crate::language::Language;
use crate::oci::{Hook, Hooks, Spec, Stage};
use crate::repository::Repository;
use log::debug;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;

/// Hooks for stages the runtime-spec document has no slot for, keyed by stage name.
pub type ExtensionStageHooks = HashMap<String, Vec<Hook>>;

pub struct Manager {
    repository: RwLock<Arc<Repository>>,
    // None when built over an in-memory repository; there is nothing to rescan
    directories: Option<Vec<PathBuf>>,
    extension_stages: Vec<String>,
    language: Language,
}

impl Manager {
    /// Loads every hook in `directories`. Later directories override
    /// same-named hooks from earlier ones.
    pub async fn new(
        token: &CancellationToken,
        directories: Vec<PathBuf>,
        extension_stages: Vec<String>,
        language: Language,
    ) -> Result<Manager, HookError> {
        let repository = Repository::load(token, &directories, &extension_stages, &language).await?;
        Ok(Manager {
            repository: RwLock::new(Arc::new(repository)),
            directories: Some(directories),
            extension_stages,
            language,
        })
    }

    pub async fn from_config(token: &CancellationToken, config: &Config) -> Result<Manager, HookError> {
        let language = Language::from_str(&config.language)?;
        Manager::new(token, config.directories(), config.extension_stages.clone(), language).await
    }

    /// Wraps an already built repository. Nothing is read from disk and
    /// [`Manager::reload`] keeps this repository.
    pub fn from_repository(repository: Repository, extension_stages: Vec<String>, language: Language) -> Manager {
        Manager {
            repository: RwLock::new(Arc::new(repository)),
            directories: None,
            extension_stages,
            language,
        }
    }

    pub fn repository(&self) -> Arc<Repository> {
        self.repository
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn extension_stages(&self) -> &[String] {
        &self.extension_stages
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// Rescans the configured directories and swaps in the result. On error, or
    /// when the manager has no directories, the current repository stays in place.
    pub async fn reload(&self, token: &CancellationToken) -> Result<(), HookError> {
        let Some(directories) = &self.directories else {
            debug!("no hook directories to reload from; keeping current repository");
            return Ok(());
        };
        let repository =
            Repository::load(token, directories, &self.extension_stages, &self.language).await?;
        *self
            .repository
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(repository);
        Ok(())
    }

    /// Appends every matching hook to its stages in `config`, in hook file name
    /// order, and returns the hooks for extension stages. The map is `None`
    /// when no extension-stage hook matched.
    ///
    /// Any failure aborts the call. Hooks appended to `config` before the
    /// failing one are left in place.
    pub fn hooks(
        &self,
        config: &mut Spec,
        annotations: &HashMap<String, String>,
        has_bind_mounts: bool,
    ) -> Result<Option<ExtensionStageHooks>, HookError> {
        let repository = self.repository();
        let mut extension_stage_hooks: Option<ExtensionStageHooks> = None;

        for (name, hook) in repository.iter() {
            let matched = hook
                .when
                .matches(config, annotations, has_bind_mounts)
                .map_err(|e| HookError::Match { name: name.to_string(), source: e })?;
            if !matched {
                continue;
            }

            debug!("hook {} matched; adding to stages {:?}", name, hook.stages);
            for stage in &hook.stages {
                if let Ok(stage) = Stage::from_str(stage) {
                    config
                        .hooks
                        .get_or_insert_with(Hooks::default)
                        .stage_mut(stage)
                        .push(hook.hook.clone());
                } else if self.extension_stages.contains(stage) {
                    extension_stage_hooks
                        .get_or_insert_with(HashMap::new)
                        .entry(stage.clone())
                        .or_default()
                        .push(hook.hook.clone());
                } else {
                    return Err(HookError::UnknownStage {
                        name: name.to_string(),
                        stage: stage.clone(),
                    });
                }
            }
        }

        Ok(extension_stage_hooks)
    }
}
