//! Application State
//!
//! Lazily initialized shared state: the prompt library, chat and composer
//! services, the credential store, and the store subscriptions that keep
//! the in-memory library in sync with external writers.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, RwLock};

use tracing::{info, warn};

use prompt_stash_core::tool_trait::UnifiedToolRegistry;
use prompt_stash_llm::openai::OpenAiProvider;
use prompt_stash_llm::provider::LlmProvider;
use prompt_stash_llm::types::ProviderConfig;
use prompt_stash_tools::register_builtin_tools;

use crate::models::config::InitOutcome;
use crate::services::chat::ChatService;
use crate::services::composer::ComposerService;
use crate::services::library::PromptLibrary;
use crate::storage::secrets::SecretStore;
use crate::storage::store::{
    StashStore, StoreSubscription, KEY_CONFIG, KEY_DRAFTS, KEY_PROMPTS,
};
use crate::utils::error::{AppError, AppResult};

/// Default model when none is configured
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Provider key in the secret store
pub const PROVIDER_NAME: &str = "openai";

pub struct AppState {
    library: Arc<RwLock<Option<PromptLibrary>>>,
    chat: Arc<tokio::sync::Mutex<Option<ChatService>>>,
    composer: RwLock<Option<Arc<ComposerService>>>,
    secrets: RwLock<Option<Arc<SecretStore>>>,
    subscriptions: Mutex<Vec<StoreSubscription>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            library: Arc::new(RwLock::new(None)),
            chat: Arc::new(tokio::sync::Mutex::new(None)),
            composer: RwLock::new(None),
            secrets: RwLock::new(None),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// Initialize every service over the given stash directory (or the
    /// default one) and run the library's startup protocol.
    pub async fn initialize(
        &self,
        stash_dir: Option<PathBuf>,
        passphrase: &str,
        model: Option<String>,
    ) -> AppResult<InitOutcome> {
        let store = match stash_dir {
            Some(dir) => StashStore::new(dir)?,
            None => StashStore::open_default()?,
        };
        let secrets = Arc::new(SecretStore::new(
            store.dir().join("secrets.enc"),
            passphrase,
        ));

        let api_key = secrets.get(PROVIDER_NAME).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read stored credential");
            None
        });
        let model = model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let provider: Arc<dyn LlmProvider> =
            Arc::new(OpenAiProvider::new(ProviderConfig::new(model, api_key)));

        let mut registry = UnifiedToolRegistry::new();
        register_builtin_tools(&mut registry, provider.clone());

        let mut library = PromptLibrary::new(store.clone());
        let outcome = library.initialize();

        *self
            .library
            .write()
            .map_err(|_| AppError::internal("Library lock poisoned"))? = Some(library);
        *self.chat.lock().await = Some(ChatService::new(
            provider.clone(),
            registry,
            store.clone(),
        ));
        *self
            .composer
            .write()
            .map_err(|_| AppError::internal("Composer lock poisoned"))? =
            Some(Arc::new(ComposerService::new(provider)));
        *self
            .secrets
            .write()
            .map_err(|_| AppError::internal("Secrets lock poisoned"))? = Some(secrets);

        self.wire_subscriptions(&store)?;
        info!(dir = %store.dir().display(), "Application state initialized");
        Ok(outcome)
    }

    /// Keep the in-memory library in sync with writes from other
    /// processes sharing the stash directory.
    fn wire_subscriptions(&self, store: &StashStore) -> AppResult<()> {
        let library = self.library.clone();
        let prompts_sub = store.subscribe(KEY_PROMPTS, move |prompts| {
            if let Ok(mut guard) = library.write() {
                if let Some(lib) = guard.as_mut() {
                    lib.apply_external_prompts(prompts);
                }
            }
        })?;

        let library = self.library.clone();
        let drafts_sub = store.subscribe(KEY_DRAFTS, move |drafts| {
            if let Ok(mut guard) = library.write() {
                if let Some(lib) = guard.as_mut() {
                    lib.apply_external_drafts(drafts);
                }
            }
        })?;

        let library = self.library.clone();
        let config_sub = store.subscribe(KEY_CONFIG, move |config| {
            if let Ok(mut guard) = library.write() {
                if let Some(lib) = guard.as_mut() {
                    lib.apply_external_config(config);
                }
            }
        })?;

        let mut subs = self
            .subscriptions
            .lock()
            .map_err(|_| AppError::internal("Subscription lock poisoned"))?;
        subs.clear();
        subs.push(prompts_sub);
        subs.push(drafts_sub);
        subs.push(config_sub);
        Ok(())
    }

    /// Run a closure against the library.
    pub fn with_library<R>(&self, f: impl FnOnce(&PromptLibrary) -> R) -> AppResult<R> {
        let guard = self
            .library
            .read()
            .map_err(|_| AppError::internal("Library lock poisoned"))?;
        match guard.as_ref() {
            Some(library) => Ok(f(library)),
            None => Err(AppError::internal("Library not initialized")),
        }
    }

    /// Run a mutating closure against the library.
    pub fn with_library_mut<R>(
        &self,
        f: impl FnOnce(&mut PromptLibrary) -> R,
    ) -> AppResult<R> {
        let mut guard = self
            .library
            .write()
            .map_err(|_| AppError::internal("Library lock poisoned"))?;
        match guard.as_mut() {
            Some(library) => Ok(f(library)),
            None => Err(AppError::internal("Library not initialized")),
        }
    }

    /// Handle to the chat service; callers lock it for the duration of a
    /// conversation turn.
    pub fn chat(&self) -> Arc<tokio::sync::Mutex<Option<ChatService>>> {
        self.chat.clone()
    }

    pub fn composer(&self) -> AppResult<Arc<ComposerService>> {
        self.composer
            .read()
            .map_err(|_| AppError::internal("Composer lock poisoned"))?
            .clone()
            .ok_or_else(|| AppError::internal("Composer not initialized"))
    }

    pub fn secrets(&self) -> AppResult<Arc<SecretStore>> {
        self.secrets
            .read()
            .map_err(|_| AppError::internal("Secrets lock poisoned"))?
            .clone()
            .ok_or_else(|| AppError::internal("Secrets not initialized"))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
