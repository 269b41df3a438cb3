//! Library lifecycle tests: CRUD, drafts, locking, seeding, and the
//! bulk reset/restore operations, all over a real temporary store.

use std::time::Duration;

use prompt_stash::models::{InitOutcome, NewPrompt, PromptPatch};
use prompt_stash::services::library::PromptLibrary;
use prompt_stash::storage::store::StashStore;

fn temp_library() -> (tempfile::TempDir, PromptLibrary) {
    let dir = tempfile::tempdir().unwrap();
    let store = StashStore::new(dir.path().to_path_buf()).unwrap();
    (dir, PromptLibrary::new(store))
}

fn new_prompt(title: &str) -> NewPrompt {
    NewPrompt {
        title: title.to_string(),
        description: Some(format!("{} description", title)),
        template: Some("Process {input}".to_string()),
        ..Default::default()
    }
}

#[test]
fn test_create_then_read_roundtrip() {
    let (_dir, mut lib) = temp_library();
    let created = lib.create_prompt(new_prompt("Roundtrip")).unwrap();

    let read = lib.get(&created.id).unwrap();
    assert_eq!(read, &created);
    assert_eq!(read.input_variables[0].name, "input");
    assert!(read.updated_at.is_none());
}

#[test]
fn test_delete_is_idempotent() {
    let (_dir, mut lib) = temp_library();
    let created = lib.create_prompt(new_prompt("Victim")).unwrap();

    assert!(lib.delete_prompt(&created.id).unwrap());
    assert!(!lib.delete_prompt(&created.id).unwrap());
    assert!(lib.prompts().is_empty());
}

#[test]
fn test_locked_prompt_survives_delete_and_template_edit() {
    let (_dir, mut lib) = temp_library();
    let created = lib.create_prompt(new_prompt("Locked")).unwrap();
    lib.toggle_lock(&created.id).unwrap();
    let before = lib.get(&created.id).unwrap().clone();

    assert!(lib.delete_prompt(&created.id).is_err());
    assert!(lib
        .edit_prompt(
            &created.id,
            &PromptPatch {
                template: Some("Hacked {x}".to_string()),
                ..Default::default()
            },
        )
        .is_err());

    let after = lib.get(&created.id).unwrap();
    assert_eq!(after.template, before.template);
    assert_eq!(after.input_variables, before.input_variables);
}

#[test]
fn test_locked_prompt_rejects_template_change_via_draft_promotion() {
    let (_dir, mut lib) = temp_library();
    let created = lib.create_prompt(new_prompt("Sealed")).unwrap();
    lib.toggle_lock(&created.id).unwrap();

    let mut draft = lib.get(&created.id).unwrap().clone();
    draft.template = Some("Changed {y}".to_string());
    lib.save_draft_prompt(draft).unwrap();

    assert!(lib.save_draft_as_final_prompt(&created.id).is_err());
    // The record is untouched and the draft stays staged for revision.
    assert_eq!(lib.get(&created.id).unwrap().template, created.template);
    assert!(lib.draft(&created.id).is_some());

    // A draft that keeps the template is still promotable while locked.
    let mut draft = lib.get(&created.id).unwrap().clone();
    draft.title = "Sealed v2".to_string();
    lib.save_draft_prompt(draft).unwrap();
    let promoted = lib.save_draft_as_final_prompt(&created.id).unwrap();
    assert_eq!(promoted.title, "Sealed v2");
    assert_eq!(promoted.template, created.template);
}

#[test]
fn test_updated_at_strictly_increases_across_edits() {
    let (_dir, mut lib) = temp_library();
    let created = lib.create_prompt(new_prompt("Evolving")).unwrap();

    let first = lib
        .edit_prompt(
            &created.id,
            &PromptPatch {
                title: Some("Evolving v2".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    std::thread::sleep(Duration::from_millis(5));
    let second = lib
        .edit_prompt(
            &created.id,
            &PromptPatch {
                title: Some("Evolving v3".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    let t1 = first.updated_at.unwrap();
    let t2 = second.updated_at.unwrap();
    assert!(t2 > t1, "expected {} > {}", t2, t1);
    assert_eq!(second.created_at, created.created_at);
}

#[test]
fn test_draft_promote_roundtrip() {
    let (_dir, mut lib) = temp_library();
    let created = lib.create_prompt(new_prompt("Original")).unwrap();

    let mut draft = created.clone();
    draft.title = "Reworked".to_string();
    draft.tags = vec!["draft-tag".to_string()];
    lib.save_draft_prompt(draft.clone()).unwrap();

    // The stored record is untouched while the draft exists.
    assert_eq!(lib.get(&created.id).unwrap().title, "Original");
    assert_eq!(lib.draft(&created.id).unwrap().title, "Reworked");

    let promoted = lib.save_draft_as_final_prompt(&created.id).unwrap();
    assert_eq!(promoted.title, "Reworked");
    assert_eq!(promoted.tags, vec!["draft-tag".to_string()]);
    assert!(lib.draft(&created.id).is_none());
}

#[test]
fn test_discarded_draft_changes_nothing() {
    let (_dir, mut lib) = temp_library();
    let created = lib.create_prompt(new_prompt("Original")).unwrap();

    let mut draft = created.clone();
    draft.title = "Abandoned".to_string();
    lib.save_draft_prompt(draft).unwrap();

    assert!(lib.delete_draft_prompt(&created.id));
    assert!(!lib.delete_draft_prompt(&created.id));
    assert_eq!(lib.get(&created.id).unwrap().title, "Original");
}

#[test]
fn test_first_run_seeds_defaults_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = StashStore::new(dir.path().to_path_buf()).unwrap();
    let mut lib = PromptLibrary::new(store);

    assert_eq!(lib.initialize(), InitOutcome::Seeded);
    let seeded = lib.prompts().len();
    assert!(seeded > 0);
    assert!(lib.config().is_initialized);
    assert!(!lib.config().should_load_defaults);

    // A reopened library does not seed again.
    drop(lib);
    let store = StashStore::new(dir.path().to_path_buf()).unwrap();
    let mut reopened = PromptLibrary::new(store);
    assert_eq!(reopened.initialize(), InitOutcome::NoChange);
    assert_eq!(reopened.prompts().len(), seeded);
}

#[test]
fn test_seeding_disabled_yields_empty_library() {
    let (_dir, mut lib) = temp_library();
    let mut config = lib.config().clone();
    config.should_load_defaults = false;
    lib.apply_external_config(config);

    assert_eq!(lib.initialize(), InitOutcome::MarkedReady);
    assert!(lib.prompts().is_empty());
}

#[test]
fn test_restore_replaces_custom_prompts() {
    let (_dir, mut lib) = temp_library();
    lib.initialize();
    let custom = lib.create_prompt(new_prompt("Mine")).unwrap();
    let seeded_before = lib.prompts().len() - 1;

    lib.restore_default_prompts();

    assert!(lib.get(&custom.id).is_none());
    assert_eq!(lib.prompts().len(), seeded_before);
    assert!(lib.prompts().iter().any(|p| p.title == "Sentiment Analysis"));
}

#[test]
fn test_delete_all_leaves_library_empty_for_good() {
    let (_dir, mut lib) = temp_library();
    lib.initialize();
    lib.create_prompt(new_prompt("Extra")).unwrap();
    let staged = lib.prompts()[0].clone();
    lib.save_draft_prompt(staged).unwrap();

    lib.delete_all_prompts();
    assert!(lib.prompts().is_empty());
    assert!(lib.drafts().is_empty());
    assert!(lib.config().is_initialized);
    assert!(!lib.config().should_load_defaults);
    // No automatic reseeding afterwards.
    assert_eq!(lib.initialize(), InitOutcome::NoChange);
    assert!(lib.prompts().is_empty());
}

#[test]
fn test_selection_follows_deletion() {
    let (_dir, mut lib) = temp_library();
    let keep = lib.create_prompt(new_prompt("Keep")).unwrap();
    let gone = lib.create_prompt(new_prompt("Gone")).unwrap();

    lib.set_selected(Some(gone.id.clone()));
    lib.delete_prompt(&gone.id).unwrap();
    assert!(lib.selected().is_none());

    lib.set_selected(Some(keep.id.clone()));
    assert_eq!(lib.selected().unwrap().id, keep.id);
}

#[test]
fn test_validation_failure_is_a_no_op_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let store = StashStore::new(dir.path().to_path_buf()).unwrap();
    let mut lib = PromptLibrary::new(store);
    lib.create_prompt(new_prompt("Good")).unwrap();
    assert!(lib.create_prompt(new_prompt("")).is_err());

    // Reload from disk: only the valid record persisted.
    let store = StashStore::new(dir.path().to_path_buf()).unwrap();
    let reopened = PromptLibrary::new(store);
    assert_eq!(reopened.prompts().len(), 1);
    assert_eq!(reopened.prompts()[0].title, "Good");
}
