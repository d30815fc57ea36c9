use ragdesk_core::{update, AppState, Msg};

#[test]
fn tick_leaves_state_untouched() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::Tick);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn tick_does_not_dirty_state() {
    let (mut next, effects) = update(AppState::new(), Msg::Tick);

    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}

#[test]
fn actions_on_unknown_files_are_ignored() {
    let state = AppState::new();
    for msg in [
        Msg::RemoveClicked {
            filename: "ghost.pdf".into(),
        },
        Msg::ScreenshotClicked {
            filename: "ghost.pdf".into(),
        },
        Msg::StartRagClicked {
            filename: "ghost.pdf".into(),
        },
    ] {
        let (next, effects) = update(state.clone(), msg);
        assert_eq!(state, next);
        assert!(effects.is_empty());
    }
}
