//! Prompt Library Façade
//!
//! Single entry point for all library mutations: prompt CRUD, drafts,
//! selection, bulk reset/restore, and the startup initialization protocol.
//! State lives in memory and is written through to the persisted store
//! after every successful mutation; failed writes leave memory untouched.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::config::{InitOutcome, InitState, StashConfig};
use crate::models::prompt::{NewPrompt, PromptPatch, PromptRecord};
use crate::services::defaults;
use crate::storage::store::{StashStore, KEY_CONFIG, KEY_DRAFTS, KEY_PROMPTS};
use crate::utils::error::{AppError, AppResult};

pub struct PromptLibrary {
    store: StashStore,
    prompts: Vec<PromptRecord>,
    drafts: HashMap<String, PromptRecord>,
    config: StashConfig,
}

impl PromptLibrary {
    /// Open the library over a store, loading whatever it holds.
    pub fn new(store: StashStore) -> Self {
        let prompts = store.load(KEY_PROMPTS, vec![]);
        let drafts = store.load(KEY_DRAFTS, HashMap::new());
        let config = store.load(KEY_CONFIG, StashConfig::default());
        Self {
            store,
            prompts,
            drafts,
            config,
        }
    }

    // ---- queries ----

    pub fn prompts(&self) -> &[PromptRecord] {
        &self.prompts
    }

    pub fn get(&self, id: &str) -> Option<&PromptRecord> {
        self.prompts.iter().find(|p| p.id == id)
    }

    pub fn drafts(&self) -> &HashMap<String, PromptRecord> {
        &self.drafts
    }

    pub fn draft(&self, id: &str) -> Option<&PromptRecord> {
        self.drafts.get(id)
    }

    pub fn config(&self) -> &StashConfig {
        &self.config
    }

    pub fn selected(&self) -> Option<&PromptRecord> {
        self.config.selected.as_deref().and_then(|id| self.get(id))
    }

    // ---- prompt CRUD ----

    /// Create a prompt from a request, assigning id and creation timestamp.
    pub fn create_prompt(&mut self, new: NewPrompt) -> AppResult<PromptRecord> {
        let record = PromptRecord::from_new(
            new,
            Uuid::new_v4().to_string(),
            Utc::now().to_rfc3339(),
        );
        record
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        debug!(id = %record.id, title = %record.title, "Creating prompt");
        self.prompts.push(record.clone());
        self.store.save(KEY_PROMPTS, &self.prompts);
        Ok(record)
    }

    /// Apply a partial update to a prompt and stamp `updated_at`.
    ///
    /// Locked prompts reject template changes. A merged record that fails
    /// validation leaves the stored one untouched.
    pub fn edit_prompt(&mut self, id: &str, patch: &PromptPatch) -> AppResult<PromptRecord> {
        let idx = self
            .prompts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| AppError::not_found(format!("Prompt not found: {}", id)))?;

        let current = &self.prompts[idx];
        if current.locked {
            if let Some(template) = &patch.template {
                if current.template.as_deref() != Some(template.as_str()) {
                    return Err(AppError::validation(
                        "Cannot edit the template of a locked prompt",
                    ));
                }
            }
        }

        let mut merged = current.with_patch(patch);
        merged
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        merged.updated_at = Some(Utc::now().to_rfc3339());

        self.prompts[idx] = merged.clone();
        self.store.save(KEY_PROMPTS, &self.prompts);
        Ok(merged)
    }

    /// Delete a prompt. Deleting a missing id is a no-op returning `false`;
    /// deleting a locked prompt is an error.
    pub fn delete_prompt(&mut self, id: &str) -> AppResult<bool> {
        let Some(idx) = self.prompts.iter().position(|p| p.id == id) else {
            return Ok(false);
        };
        if self.prompts[idx].locked {
            return Err(AppError::validation("Cannot delete a locked prompt"));
        }

        self.prompts.remove(idx);
        self.store.save(KEY_PROMPTS, &self.prompts);

        if self.config.selected.as_deref() == Some(id) {
            self.config.selected = None;
            self.store.save(KEY_CONFIG, &self.config);
        }
        debug!(id, "Deleted prompt");
        Ok(true)
    }

    /// Flip the bookmark flag in place. The flag is metadata, not an edit:
    /// `updated_at` is left alone so toggling does not change recency
    /// ordering. Returns the new state, or `None` as a no-op when the id
    /// is unknown.
    pub fn toggle_bookmark(&mut self, id: &str) -> Option<bool> {
        let record = self.prompts.iter_mut().find(|p| p.id == id)?;
        record.bookmarked = !record.bookmarked;
        let next = record.bookmarked;
        self.store.save(KEY_PROMPTS, &self.prompts);
        Some(next)
    }

    /// Flip the lock flag in place, without stamping `updated_at`. Returns
    /// the new state, or `None` as a no-op when the id is unknown.
    /// Unlocking a locked prompt is always allowed; the lock guards
    /// deletion and template edits, not itself.
    pub fn toggle_lock(&mut self, id: &str) -> Option<bool> {
        let record = self.prompts.iter_mut().find(|p| p.id == id)?;
        record.locked = !record.locked;
        let next = record.locked;
        self.store.save(KEY_PROMPTS, &self.prompts);
        Some(next)
    }

    // ---- drafts ----

    /// Store a draft keyed by its prompt id, replacing any previous draft
    /// for that id. Drafts pass the same validation as live records; a
    /// failing draft is rejected without touching the drafts map.
    pub fn save_draft_prompt(&mut self, draft: PromptRecord) -> AppResult<()> {
        draft
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;
        self.drafts.insert(draft.id.clone(), draft);
        self.store.save(KEY_DRAFTS, &self.drafts);
        Ok(())
    }

    /// Discard the draft for `id`, if any.
    pub fn delete_draft_prompt(&mut self, id: &str) -> bool {
        let existed = self.drafts.remove(id).is_some();
        if existed {
            self.store.save(KEY_DRAFTS, &self.drafts);
        }
        existed
    }

    /// Promote a draft into the library.
    ///
    /// The draft must validate, and promotion over an existing record obeys
    /// the same lock rule as `edit_prompt`: a locked prompt rejects a draft
    /// whose template differs. On failure both the draft and the library
    /// are left unchanged. An existing prompt with the same id is replaced
    /// (with `updated_at` stamped), otherwise the draft becomes a new
    /// record.
    pub fn save_draft_as_final_prompt(&mut self, id: &str) -> AppResult<PromptRecord> {
        let draft = self
            .drafts
            .get(id)
            .ok_or_else(|| AppError::not_found(format!("Draft not found: {}", id)))?
            .clone();
        draft
            .validate()
            .map_err(|e| AppError::validation(e.to_string()))?;

        let mut promoted = draft;
        match self.prompts.iter().position(|p| p.id == id) {
            Some(idx) => {
                let current = &self.prompts[idx];
                if current.locked && current.template != promoted.template {
                    return Err(AppError::validation(
                        "Cannot edit the template of a locked prompt",
                    ));
                }
                promoted.updated_at = Some(Utc::now().to_rfc3339());
                self.prompts[idx] = promoted.clone();
            }
            None => {
                self.prompts.push(promoted.clone());
            }
        }
        self.drafts.remove(id);
        self.store.save(KEY_PROMPTS, &self.prompts);
        self.store.save(KEY_DRAFTS, &self.drafts);
        debug!(id, "Promoted draft to prompt");
        Ok(promoted)
    }

    // ---- selection ----

    pub fn set_selected(&mut self, id: Option<String>) {
        self.config.selected = id;
        self.store.save(KEY_CONFIG, &self.config);
    }

    // ---- bulk operations & initialization ----

    /// Remove every prompt and draft and clear the selection. Marks the
    /// library initialized with defaults loading disabled, so a later
    /// `initialize` does not re-seed the emptied collection.
    pub fn delete_all_prompts(&mut self) {
        self.prompts.clear();
        self.drafts.clear();
        self.config.selected = None;
        self.config.mark_ready();
        self.store.save(KEY_PROMPTS, &self.prompts);
        self.store.save(KEY_DRAFTS, &self.drafts);
        self.store.save(KEY_CONFIG, &self.config);
        info!("Deleted all prompts");
    }

    /// Replace the entire library with the built-in seed set and clear all
    /// drafts. Destructive: prompts not in the seed set are gone afterwards.
    pub fn restore_default_prompts(&mut self) {
        self.prompts = defaults::default_prompts(&Utc::now().to_rfc3339());
        self.drafts.clear();
        self.config.selected = None;
        self.config.mark_ready();
        self.store.save(KEY_PROMPTS, &self.prompts);
        self.store.save(KEY_DRAFTS, &self.drafts);
        self.store.save(KEY_CONFIG, &self.config);
        info!(count = self.prompts.len(), "Restored default prompts");
    }

    /// Run the one-shot startup initialization.
    ///
    /// Seeds the defaults when they are still pending and the library is
    /// empty; in every non-ready state the latch is closed afterwards, so
    /// repeated calls are no-ops.
    pub fn initialize(&mut self) -> InitOutcome {
        match self.config.init_state() {
            InitState::Ready => InitOutcome::NoChange,
            InitState::Uninitialized => {
                self.config.mark_ready();
                self.store.save(KEY_CONFIG, &self.config);
                InitOutcome::MarkedReady
            }
            InitState::DefaultsPending => {
                let outcome = if self.prompts.is_empty() {
                    self.prompts = defaults::default_prompts(&Utc::now().to_rfc3339());
                    self.store.save(KEY_PROMPTS, &self.prompts);
                    info!(count = self.prompts.len(), "Seeded default prompts");
                    InitOutcome::Seeded
                } else {
                    InitOutcome::MarkedReady
                };
                self.config.mark_ready();
                self.store.save(KEY_CONFIG, &self.config);
                outcome
            }
        }
    }

    // ---- external change application ----

    /// Replace in-memory prompts with a set received from another writer.
    pub fn apply_external_prompts(&mut self, prompts: Vec<PromptRecord>) {
        self.prompts = prompts;
    }

    /// Replace in-memory drafts with a set received from another writer.
    pub fn apply_external_drafts(&mut self, drafts: HashMap<String, PromptRecord>) {
        self.drafts = drafts;
    }

    /// Replace in-memory config with one received from another writer.
    pub fn apply_external_config(&mut self, config: StashConfig) {
        self.config = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_library() -> (tempfile::TempDir, PromptLibrary) {
        let dir = tempfile::tempdir().unwrap();
        let store = StashStore::new(dir.path().to_path_buf()).unwrap();
        (dir, PromptLibrary::new(store))
    }

    fn new_prompt(title: &str) -> NewPrompt {
        NewPrompt {
            title: title.to_string(),
            template: Some("Do {thing}".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_and_get() {
        let (_dir, mut lib) = temp_library();
        let created = lib.create_prompt(new_prompt("Summarize")).unwrap();
        assert_eq!(lib.get(&created.id).unwrap().title, "Summarize");
        assert_eq!(created.input_variables[0].name, "thing");
        assert!(created.updated_at.is_none());
    }

    #[test]
    fn test_create_rejects_empty_title() {
        let (_dir, mut lib) = temp_library();
        let err = lib.create_prompt(new_prompt("  ")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(lib.prompts().is_empty());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (_dir, mut lib) = temp_library();
        let created = lib.create_prompt(new_prompt("Temp")).unwrap();
        assert!(lib.delete_prompt(&created.id).unwrap());
        assert!(!lib.delete_prompt(&created.id).unwrap());
        assert!(!lib.delete_prompt("never-existed").unwrap());
    }

    #[test]
    fn test_locked_prompt_rejects_delete_and_template_edit() {
        let (_dir, mut lib) = temp_library();
        let created = lib.create_prompt(new_prompt("Guarded")).unwrap();
        lib.toggle_lock(&created.id).unwrap();

        assert!(lib.delete_prompt(&created.id).is_err());
        let err = lib
            .edit_prompt(
                &created.id,
                &PromptPatch {
                    template: Some("Changed {x}".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Non-template edits still work on a locked prompt.
        lib.edit_prompt(
            &created.id,
            &PromptPatch {
                title: Some("Guarded v2".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(lib.get(&created.id).unwrap().title, "Guarded v2");
    }

    #[test]
    fn test_edit_stamps_updated_at() {
        let (_dir, mut lib) = temp_library();
        let created = lib.create_prompt(new_prompt("Evolving")).unwrap();
        let edited = lib
            .edit_prompt(
                &created.id,
                &PromptPatch {
                    title: Some("Evolving v2".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(edited.updated_at.is_some());
        assert_eq!(edited.created_at, created.created_at);
    }

    #[test]
    fn test_failed_edit_leaves_record_unchanged() {
        let (_dir, mut lib) = temp_library();
        let created = lib.create_prompt(new_prompt("Stable")).unwrap();
        let err = lib
            .edit_prompt(
                &created.id,
                &PromptPatch {
                    title: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let stored = lib.get(&created.id).unwrap();
        assert_eq!(stored.title, "Stable");
        assert!(stored.updated_at.is_none());
    }

    #[test]
    fn test_draft_promote_roundtrip() {
        let (_dir, mut lib) = temp_library();
        let created = lib.create_prompt(new_prompt("Original")).unwrap();

        let mut draft = created.clone();
        draft.title = "Edited in draft".to_string();
        lib.save_draft_prompt(draft).unwrap();
        assert!(lib.draft(&created.id).is_some());

        let promoted = lib.save_draft_as_final_prompt(&created.id).unwrap();
        assert_eq!(promoted.title, "Edited in draft");
        assert!(promoted.updated_at.is_some());
        assert!(lib.draft(&created.id).is_none());
        assert_eq!(lib.get(&created.id).unwrap().title, "Edited in draft");
    }

    #[test]
    fn test_invalid_draft_is_rejected_at_save() {
        let (_dir, mut lib) = temp_library();
        let created = lib.create_prompt(new_prompt("Original")).unwrap();

        let mut draft = created.clone();
        draft.title = String::new();
        let err = lib.save_draft_prompt(draft).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Nothing staged, library record untouched.
        assert!(lib.draft(&created.id).is_none());
        assert_eq!(lib.get(&created.id).unwrap().title, "Original");
    }

    #[test]
    fn test_initialize_seeds_once() {
        let (_dir, mut lib) = temp_library();
        assert_eq!(lib.initialize(), InitOutcome::Seeded);
        let seeded = lib.prompts().len();
        assert!(seeded > 0);
        assert_eq!(lib.initialize(), InitOutcome::NoChange);
        assert_eq!(lib.prompts().len(), seeded);
    }

    #[test]
    fn test_initialize_skips_seeding_when_disabled() {
        let (_dir, mut lib) = temp_library();
        lib.config.should_load_defaults = false;
        assert_eq!(lib.initialize(), InitOutcome::MarkedReady);
        assert!(lib.prompts().is_empty());
    }

    #[test]
    fn test_delete_all_clears_everything_and_stays_empty() {
        let (_dir, mut lib) = temp_library();
        lib.initialize();
        let record = lib.prompts()[0].clone();
        lib.save_draft_prompt(record).unwrap();

        lib.delete_all_prompts();
        assert!(lib.prompts().is_empty());
        assert!(lib.drafts().is_empty());
        // The library stays empty; defaults do not reappear.
        assert_eq!(lib.initialize(), InitOutcome::NoChange);
        assert!(lib.prompts().is_empty());
    }

    #[test]
    fn test_restore_replaces_everything() {
        let (_dir, mut lib) = temp_library();
        lib.initialize();
        let custom = lib.create_prompt(new_prompt("My own")).unwrap();
        lib.save_draft_prompt(custom.clone()).unwrap();

        lib.restore_default_prompts();
        assert!(lib.get(&custom.id).is_none());
        assert!(lib.drafts().is_empty());
        assert!(lib.prompts().iter().all(|p| p.id.starts_with("default-")));
    }

    #[test]
    fn test_toggles_are_noops_for_unknown_ids() {
        let (_dir, mut lib) = temp_library();
        assert_eq!(lib.toggle_bookmark("missing"), None);
        assert_eq!(lib.toggle_lock("missing"), None);
    }

    #[test]
    fn test_toggles_do_not_stamp_updated_at() {
        let (_dir, mut lib) = temp_library();
        let created = lib.create_prompt(new_prompt("Pinned")).unwrap();

        assert_eq!(lib.toggle_bookmark(&created.id), Some(true));
        assert_eq!(lib.toggle_lock(&created.id), Some(true));
        let stored = lib.get(&created.id).unwrap();
        assert!(stored.bookmarked);
        assert!(stored.locked);
        assert!(stored.updated_at.is_none());

        assert_eq!(lib.toggle_bookmark(&created.id), Some(false));
        assert!(lib.get(&created.id).unwrap().updated_at.is_none());
    }

    #[test]
    fn test_delete_clears_selection() {
        let (_dir, mut lib) = temp_library();
        let created = lib.create_prompt(new_prompt("Chosen")).unwrap();
        lib.set_selected(Some(created.id.clone()));
        assert!(lib.selected().is_some());
        lib.delete_prompt(&created.id).unwrap();
        assert!(lib.selected().is_none());
    }

    #[test]
    fn test_state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = StashStore::new(dir.path().to_path_buf()).unwrap();
        let mut lib = PromptLibrary::new(store);
        let created = lib.create_prompt(new_prompt("Durable")).unwrap();
        lib.set_selected(Some(created.id.clone()));
        drop(lib);

        let store = StashStore::new(dir.path().to_path_buf()).unwrap();
        let reopened = PromptLibrary::new(store);
        assert_eq!(reopened.get(&created.id).unwrap().title, "Durable");
        assert_eq!(reopened.config().selected.as_deref(), Some(created.id.as_str()));
    }
}
