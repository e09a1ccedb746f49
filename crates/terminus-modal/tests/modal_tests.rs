//! Integration tests for the mode machine.

use std::path::{Path, PathBuf};

use terminus_core::{Entry, Mode, Stat};
use terminus_modal::{
    Action, ActionId, CaretPolicy, Followup, KeyInput, KeyTable, ModalEvent, ModalState,
    ModeError, Mutation, Platform, Resolution, UiAction,
};
use terminus_ops::{
    BatchResult, ClipboardMode, DeleteTarget, ItemResult, JobId, JobOutcome, OperationProgress,
    OperationType, OpsError,
};
use terminus_scan::SearchMatch;

const ROOT: &str = "/work";

fn entry(dir: &Path, name: &str, is_dir: bool) -> Entry {
    let stat = Stat {
        size: 0,
        modified: None,
        created: None,
        is_dir,
        is_file: !is_dir,
        is_symlink: false,
        mode: None,
    };
    Entry::from_stat(dir.join(name), &stat)
}

fn listing(dir: &Path, names: &[&str]) -> Vec<Entry> {
    names
        .iter()
        .map(|name| entry(dir, name, !name.contains('.')))
        .collect()
}

fn state_with(names: &[&str]) -> ModalState {
    let mut state = ModalState::new(ROOT).with_home(Some("/home/me".into()));
    state.apply(ModalEvent::Listed {
        dir: ROOT.into(),
        entries: listing(Path::new(ROOT), names),
        focus: None,
    });
    state
}

fn table() -> KeyTable {
    KeyTable::builtin().unwrap()
}

fn press(state: &mut ModalState, table: &KeyTable, key: &str) -> Action {
    state.handle_key(table, &KeyInput::plain(key))
}

fn type_text(state: &mut ModalState, table: &KeyTable, text: &str) {
    for c in text.chars() {
        press(state, table, &c.to_string());
    }
}

fn visible_names(state: &ModalState) -> Vec<String> {
    state.visible().map(|e| e.name.to_string()).collect()
}

fn root(name: &str) -> PathBuf {
    Path::new(ROOT).join(name)
}

#[test]
fn test_visual_select_three_then_esc_clears_selection() {
    let table = table();
    let mut state = state_with(&["a.txt", "b.txt", "c.txt", "d.txt"]);

    press(&mut state, &table, "v");
    assert_eq!(state.mode(), Mode::Visual);
    press(&mut state, &table, "j");
    press(&mut state, &table, "j");
    assert_eq!(state.selection().multi.len(), 3);
    assert!(state.is_selected(&root("c.txt")));

    let action = press(&mut state, &table, "Esc");
    assert_eq!(
        action,
        Action::Ui(UiAction::ModeChanged {
            from: Mode::Visual,
            to: Mode::Normal
        })
    );
    assert!(state.selection().multi.is_empty());
    assert_eq!(state.mode(), Mode::Normal);
}

#[test]
fn test_visual_navigation_toggles_per_step() {
    let table = table();
    let mut state = state_with(&["a.txt", "b.txt", "c.txt"]);

    press(&mut state, &table, "v");
    press(&mut state, &table, "j");
    press(&mut state, &table, "k");
    // Stepping back onto "a" toggles it off again.
    assert_eq!(
        state.selection().multi.iter().collect::<Vec<_>>(),
        vec![&root("b.txt")]
    );
}

#[test]
fn test_leaving_visual_with_v_discards_selection() {
    let table = table();
    let mut state = state_with(&["a.txt", "b.txt"]);

    press(&mut state, &table, "v");
    press(&mut state, &table, "j");
    press(&mut state, &table, "v");

    assert_eq!(state.mode(), Mode::Normal);
    assert!(state.selection().multi.is_empty());
}

#[test]
fn test_copy_in_visual_stages_selection_and_returns_to_normal() {
    let table = table();
    let mut state = state_with(&["a.txt", "b.txt", "c.txt"]);

    press(&mut state, &table, "v");
    press(&mut state, &table, "j");
    let action = press(&mut state, &table, "c");

    assert_eq!(
        action,
        Action::Mutation(Mutation::Stage {
            mode: ClipboardMode::Copy,
            paths: vec![root("a.txt"), root("b.txt")],
        })
    );
    assert_eq!(state.mode(), Mode::Normal);
    assert!(state.selection().multi.is_empty());
    assert_eq!(state.clipboard().len(), 2);
}

#[test]
fn test_esc_keeps_copy_clipboard_but_cancels_cut() {
    let table = table();
    let mut state = state_with(&["a.txt"]);

    press(&mut state, &table, "c");
    let action = press(&mut state, &table, "Esc");
    assert_eq!(action, Action::Ui(UiAction::Idle));
    assert_eq!(state.clipboard().mode(), ClipboardMode::Copy);
    assert_eq!(state.clipboard().len(), 1);

    press(&mut state, &table, "x");
    let action = press(&mut state, &table, "Esc");
    assert_eq!(action, Action::Ui(UiAction::ClipboardCleared));
    assert!(state.clipboard().is_empty());
}

#[test]
fn test_filter_scopes_view_without_touching_listing() {
    let table = table();
    let mut state = state_with(&["report.txt", "readme.md", "src"]);

    press(&mut state, &table, "/");
    assert_eq!(state.mode(), Mode::Filter);

    let mut visible_after_each_key = Vec::new();
    for key in ["r", "e", "p"] {
        match press(&mut state, &table, key) {
            Action::Ui(UiAction::FilterUpdated { visible }) => visible_after_each_key.push(visible),
            other => panic!("unexpected action: {other:?}"),
        }
    }
    assert_eq!(visible_after_each_key, vec![3, 2, 1]);
    assert_eq!(visible_names(&state), vec!["report.txt"]);
    assert_eq!(state.entries().len(), 3);

    press(&mut state, &table, "Esc");
    assert_eq!(state.mode(), Mode::Normal);
    assert_eq!(state.filter_query(), "");
    assert_eq!(visible_names(&state).len(), 3);
}

#[test]
fn test_filter_is_cleared_between_sessions() {
    let table = table();
    let mut state = state_with(&["report.txt", "readme.md"]);

    press(&mut state, &table, "/");
    type_text(&mut state, &table, "rep");
    press(&mut state, &table, "Esc");
    press(&mut state, &table, "/");

    assert_eq!(state.filter_query(), "");
    assert_eq!(visible_names(&state).len(), 2);
}

#[test]
fn test_filter_allows_ctrl_operations() {
    let table = table();
    let mut state = state_with(&["report.txt", "readme.md"]);

    press(&mut state, &table, "/");
    type_text(&mut state, &table, "me");
    let action = state.handle_key(&table, &KeyInput::ctrl("c"));

    assert!(action.is_mutation());
    assert_eq!(state.mode(), Mode::Filter);
    assert!(state.clipboard().contains(&root("readme.md")));
    // Plain "c" is text in FILTER.
    press(&mut state, &table, "c");
    assert_eq!(state.filter_query(), "mec");
}

#[test]
fn test_esc_resolves_per_mode() {
    let table = table();

    assert!(matches!(
        table.resolve("Esc", Mode::Insert, Platform::Linux),
        Resolution::Matched {
            action: ActionId::RenameCancel,
            ..
        }
    ));
    assert!(matches!(
        table.resolve("Esc", Mode::Normal, Platform::Linux),
        Resolution::Matched {
            action: ActionId::CutCancel,
            ..
        }
    ));
    assert_eq!(
        table.resolve("z", Mode::Normal, Platform::Linux),
        Resolution::Unrecognized
    );
}

#[test]
fn test_resolution_label_follows_platform() {
    let table = table();

    match table.resolve("C-x", Mode::Normal, Platform::Mac) {
        Resolution::Matched { action, label, .. } => {
            assert_eq!(action, ActionId::Cut);
            assert_eq!(label, "⌘+X");
        }
        Resolution::Unrecognized => panic!("C-x should be bound"),
    }
}

#[test]
fn test_unbound_key_is_silent_noop() {
    let table = table();
    let mut state = state_with(&["a.txt"]);
    let before = state.snapshot();

    assert_eq!(press(&mut state, &table, "z"), Action::Unrecognized);
    assert_eq!(state.snapshot(), before);
}

#[test]
fn test_nested_mode_entry_is_rejected() {
    let mut state = state_with(&["a.txt"]);

    state.enter_mode(Mode::Filter).unwrap();
    assert_eq!(
        state.enter_mode(Mode::Insert),
        Err(ModeError::AlreadyActive {
            active: Mode::Filter,
            requested: Mode::Insert,
        })
    );
    assert_eq!(state.mode(), Mode::Filter);
}

#[test]
fn test_table_binding_rename_in_filter_is_refused() {
    let text = format!(
        "{}\n[[keybind]]\nid = \"rename\"\nkeys = [\"C-r\"]\ndesc = \"rename\"\ncategory = \"Modes\"\nmode = \"FILTER\"\n",
        terminus_modal::BUILTIN_KEYBINDS
    );
    let table = KeyTable::from_toml(&text).unwrap();
    let mut state = state_with(&["a.txt"]);

    press(&mut state, &table, "/");
    let action = state.handle_key(&table, &KeyInput::ctrl("r"));

    assert_eq!(
        action,
        Action::Ui(UiAction::ModeRejected {
            active: Mode::Filter,
            requested: Mode::Insert,
        })
    );
    assert_eq!(state.mode(), Mode::Filter);
    assert!(state.rename_session().is_none());
    assert!(state.last_error().is_some());
}

#[test]
fn test_rename_commit_emits_mutation() {
    let table = table();
    let mut state = state_with(&["draft.md"]).with_caret_policy(CaretPolicy::Stem);

    press(&mut state, &table, "i");
    assert_eq!(state.mode(), Mode::Insert);
    let session = state.rename_session().unwrap();
    assert_eq!(session.buffer.text(), "draft.md");
    assert_eq!(session.buffer.caret(), 5);

    // Typing at the stem boundary keeps the extension.
    type_text(&mut state, &table, "-v2");
    let action = press(&mut state, &table, "Enter");

    assert_eq!(
        action,
        Action::Mutation(Mutation::Rename {
            path: root("draft.md"),
            new_name: "draft-v2.md".into(),
        })
    );
    assert_eq!(state.mode(), Mode::Normal);
}

#[test]
fn test_rename_cancel_and_unchanged_commit_do_nothing() {
    let table = table();
    let mut state = state_with(&["draft.md"]);

    press(&mut state, &table, "i");
    type_text(&mut state, &table, "xyz");
    let action = press(&mut state, &table, "Esc");
    assert!(!action.is_mutation());
    assert_eq!(state.mode(), Mode::Normal);
    assert!(state.clipboard().is_empty());

    press(&mut state, &table, "i");
    let action = press(&mut state, &table, "Enter");
    assert_eq!(
        action,
        Action::Ui(UiAction::ModeChanged {
            from: Mode::Insert,
            to: Mode::Normal
        })
    );
}

#[test]
fn test_invalid_rename_keeps_insert_open() {
    let table = table();
    let mut state = state_with(&["draft.md"]);

    press(&mut state, &table, "i");
    state.handle_key(&table, &KeyInput::ctrl("u"));
    type_text(&mut state, &table, "a/b");
    let action = press(&mut state, &table, "Enter");

    assert!(matches!(
        action,
        Action::Ui(UiAction::RenameRejected { .. })
    ));
    assert_eq!(state.mode(), Mode::Insert);
    assert!(state.last_error().is_some());
}

#[test]
fn test_search_query_survives_reentry() {
    let table = table();
    let mut state = state_with(&["a.txt"]);

    press(&mut state, &table, "f");
    assert_eq!(state.mode(), Mode::Search);
    type_text(&mut state, &table, "log");
    let first_generation = state.search().generation;

    press(&mut state, &table, "Esc");
    assert_eq!(state.mode(), Mode::Normal);

    let action = press(&mut state, &table, "f");
    match action {
        Action::Ui(UiAction::SearchRequested {
            root: search_root,
            query,
            generation,
        }) => {
            assert_eq!(search_root, PathBuf::from(ROOT));
            assert_eq!(query, "log");
            assert!(generation > first_generation);
        }
        other => panic!("unexpected action: {other:?}"),
    }
    assert_eq!(state.search().query.text(), "log");

    // Results from the abandoned search are dropped.
    state.apply(ModalEvent::SearchMatches {
        generation: first_generation,
        matches: vec![SearchMatch {
            path: root("old.log"),
            name: "old.log".into(),
            is_dir: false,
            depth: 1,
        }],
    });
    assert!(state.search().results.is_empty());
}

#[test]
fn test_reveal_navigates_to_match_parent() {
    let table = table();
    let mut state = state_with(&["src"]);

    press(&mut state, &table, "f");
    type_text(&mut state, &table, "main");
    let generation = state.search().generation;
    let hit = root("src/bin/main.rs");
    state.apply(ModalEvent::SearchMatches {
        generation,
        matches: vec![SearchMatch {
            path: hit.clone(),
            name: "main.rs".into(),
            is_dir: false,
            depth: 3,
        }],
    });

    let action = press(&mut state, &table, "Enter");
    assert_eq!(
        action,
        Action::Ui(UiAction::Navigate {
            dir: root("src/bin"),
            focus: Some(hit.clone()),
        })
    );
    assert_eq!(state.mode(), Mode::Normal);

    state.apply(ModalEvent::Listed {
        dir: root("src/bin"),
        entries: listing(&root("src/bin"), &["cli.rs", "main.rs"]),
        focus: Some(hit),
    });
    assert_eq!(state.cursor(), 1);
}

#[test]
fn test_navigation_resets_mode_and_selection() {
    let table = table();
    let mut state = state_with(&["docs", "a.txt"]);

    press(&mut state, &table, "/");
    type_text(&mut state, &table, "do");
    let action = press(&mut state, &table, "Enter");
    assert_eq!(
        action,
        Action::Ui(UiAction::Navigate {
            dir: root("docs"),
            focus: None,
        })
    );

    state.apply(ModalEvent::Listed {
        dir: root("docs"),
        entries: listing(&root("docs"), &["guide.md"]),
        focus: None,
    });
    assert_eq!(state.mode(), Mode::Normal);
    assert_eq!(state.filter_query(), "");
    assert_eq!(state.cwd(), root("docs"));

    let action = press(&mut state, &table, "h");
    assert_eq!(
        action,
        Action::Ui(UiAction::Navigate {
            dir: PathBuf::from(ROOT),
            focus: Some(root("docs")),
        })
    );
}

#[test]
fn test_partial_cut_failure_keeps_unmoved_items() {
    let table = table();
    let mut state = state_with(&["a.txt", "b.txt"]);

    press(&mut state, &table, "v");
    press(&mut state, &table, "j");
    press(&mut state, &table, "x");
    let paste = press(&mut state, &table, "p");
    let Action::Mutation(Mutation::Paste { clipboard, target }) = paste else {
        panic!("expected a paste");
    };
    assert_eq!(target, PathBuf::from(ROOT));

    let result = BatchResult {
        operation: OperationType::Move,
        per_item: vec![
            ItemResult::new(root("a.txt"), "/dst/a.txt".into(), None),
            ItemResult::new(
                root("b.txt"),
                "/dst/b.txt".into(),
                Some(OpsError::DestinationExists {
                    path: "/dst/b.txt".into(),
                }),
            ),
        ],
    };
    let followup = state.apply(ModalEvent::Operation {
        job: JobId(1),
        outcome: JobOutcome::Pasted {
            generation: clipboard.generation,
            mode: clipboard.mode,
            target,
            result,
        },
    });

    assert_eq!(followup, Followup::Refresh(PathBuf::from(ROOT)));
    assert_eq!(state.clipboard().mode(), ClipboardMode::Cut);
    assert_eq!(
        state.clipboard().items().collect::<Vec<_>>(),
        vec![root("b.txt").as_path()]
    );
    assert!(state.last_error().unwrap().contains("b.txt"));
}

#[test]
fn test_stale_paste_does_not_clobber_newer_clipboard() {
    let table = table();
    let mut state = state_with(&["a.txt", "b.txt"]);

    press(&mut state, &table, "x");
    let Action::Mutation(Mutation::Paste { clipboard, target }) = press(&mut state, &table, "p")
    else {
        panic!("expected a paste");
    };

    // A new cut while the paste is still running.
    press(&mut state, &table, "j");
    press(&mut state, &table, "x");

    let result = BatchResult {
        operation: OperationType::Move,
        per_item: vec![ItemResult::new(root("a.txt"), "/dst/a.txt".into(), None)],
    };
    state.apply(ModalEvent::Operation {
        job: JobId(1),
        outcome: JobOutcome::Pasted {
            generation: clipboard.generation,
            mode: clipboard.mode,
            target,
            result,
        },
    });

    assert_eq!(
        state.clipboard().items().collect::<Vec<_>>(),
        vec![root("b.txt").as_path()]
    );
}

#[test]
fn test_delete_targets_focused_entry() {
    let table = table();
    let mut state = state_with(&["docs", "a.txt"]);

    let action = press(&mut state, &table, "d");
    assert_eq!(
        action,
        Action::Mutation(Mutation::Delete {
            targets: vec![DeleteTarget::new(root("docs"), true)],
        })
    );
}

#[test]
fn test_rename_outcome_focuses_new_path_after_refresh() {
    let mut state = state_with(&["a.txt", "b.txt"]);

    let followup = state.apply(ModalEvent::Operation {
        job: JobId(1),
        outcome: JobOutcome::Renamed {
            from: root("a.txt"),
            result: Ok(root("z.txt")),
        },
    });
    assert_eq!(followup, Followup::Refresh(PathBuf::from(ROOT)));

    state.apply(ModalEvent::Refreshed {
        dir: ROOT.into(),
        entries: listing(Path::new(ROOT), &["b.txt", "z.txt"]),
    });
    assert_eq!(state.focused().map(|e| e.name.to_string()), Some("z.txt".to_string()));
}

#[test]
fn test_help_overlay_closes_on_next_key() {
    let table = table();
    let mut state = state_with(&["a.txt", "b.txt"]);

    press(&mut state, &table, "?");
    assert!(state.help_visible());

    let action = press(&mut state, &table, "j");
    assert_eq!(action, Action::Ui(UiAction::HelpToggled { visible: false }));
    assert_eq!(state.cursor(), 0);
}

#[test]
fn test_help_groups_follow_category_order() {
    let table = table();
    let groups = table.help_groups();
    let categories: Vec<_> = groups.iter().map(|g| g.category).collect();
    assert_eq!(
        categories,
        vec!["Navigation", "File operations", "Modes", "Filter & search", "Misc"]
    );
    assert!(groups[1].items.iter().any(|b| !b.implemented));
}

#[test]
fn test_progress_is_tracked_per_job() {
    let mut state = state_with(&["a.txt"]);
    let progress = |total| OperationProgress::new(OperationType::Copy, total);

    state.apply(ModalEvent::Progress {
        job: JobId(1),
        progress: progress(10),
    });
    state.apply(ModalEvent::Progress {
        job: JobId(2),
        progress: progress(3),
    });
    assert_eq!(state.running_jobs(), 2);
    assert_eq!(state.progress().map(|p| p.total), Some(3));

    // The first job finishing leaves the second one's progress alone.
    state.apply(ModalEvent::Operation {
        job: JobId(1),
        outcome: JobOutcome::Deleted {
            result: BatchResult::new(OperationType::Delete),
        },
    });
    assert_eq!(state.running_jobs(), 1);
    assert_eq!(state.progress().map(|p| p.total), Some(3));

    state.apply(ModalEvent::Operation {
        job: JobId(2),
        outcome: JobOutcome::Deleted {
            result: BatchResult::new(OperationType::Delete),
        },
    });
    assert!(state.progress().is_none());
}
