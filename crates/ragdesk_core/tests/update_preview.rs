use std::sync::Once;

use pretty_assertions::assert_eq;
use ragdesk_core::{
    update, AppState, DeskError, Effect, FileStatus, JobEvent, ListedFile, Msg, PreviewArtifact,
    PLACEHOLDER_SRC,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(desk_logging::initialize_for_tests);
}

fn with_files(names: &[&str]) -> AppState {
    let files = names.iter().map(|name| ListedFile::new(*name, false)).collect();
    let (state, _) = update(AppState::new(), Msg::FilesListed(Ok(files)));
    state
}

fn screenshot(state: AppState, filename: &str) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::ScreenshotClicked {
            filename: filename.to_string(),
        },
    )
}

fn thumbnails(
    state: AppState,
    filename: &str,
    request: u64,
    result: Result<Vec<String>, String>,
) -> AppState {
    let (state, effects) = update(
        state,
        Msg::PreviewGenerated {
            filename: filename.to_string(),
            request,
            result,
        },
    );
    assert!(effects.is_empty());
    state
}

#[test]
fn raster_image_is_shown_directly() {
    init_logging();
    let state = with_files(&["x.png"]);
    let (state, effects) = screenshot(state, "x.png");

    assert!(effects.is_empty());
    let preview = state.view().preview;
    assert_eq!(preview.filename.as_deref(), Some("x.png"));
    assert_eq!(preview.artifacts, vec![PreviewArtifact::direct("x.png")]);
    assert_eq!(preview.artifacts[0].src, "/uploads/x.png");
    assert!(state.view().files[0].previewed);
}

#[test]
fn failed_thumbnail_generation_shows_one_placeholder() {
    init_logging();
    let state = with_files(&["x.png", "y.pdf"]);
    let (state, _) = screenshot(state, "x.png");
    let (state, effects) = screenshot(state, "y.pdf");
    assert_eq!(
        effects,
        vec![Effect::GeneratePreview {
            filename: "y.pdf".into(),
            request: 2
        }]
    );
    assert!(state.view().preview.artifacts.is_empty());

    let state = thumbnails(state, "y.pdf", 2, Err("http status 500".into()));

    let preview = state.view().preview;
    assert_eq!(preview.filename.as_deref(), Some("y.pdf"));
    assert_eq!(preview.artifacts.len(), 1);
    assert_eq!(preview.artifacts[0].src, PLACEHOLDER_SRC);
    assert_eq!(
        state.notices(),
        &[DeskError::PreviewGenerationFailed {
            filename: "y.pdf".into(),
            reason: "http status 500".into()
        }]
    );
}

#[test]
fn other_extensions_get_placeholder() {
    init_logging();
    let state = with_files(&["notes.docx"]);
    let (state, effects) = screenshot(state, "notes.docx");

    assert!(effects.is_empty());
    assert_eq!(
        state.view().preview.artifacts,
        vec![PreviewArtifact::placeholder()]
    );
}

#[test]
fn rapid_switch_keeps_second_selection_regardless_of_order() {
    init_logging();
    for first_answers_last in [false, true] {
        let state = with_files(&["a.pdf", "b.pdf"]);
        let (state, first) = screenshot(state, "a.pdf");
        let (state, second) = screenshot(state, "b.pdf");
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);

        let a = ("a.pdf", 1, Ok(vec!["/output/a_page_1.png".to_string()]));
        let b = ("b.pdf", 2, Ok(vec!["/output/b_page_1.png".to_string()]));
        let order = if first_answers_last { [b, a] } else { [a, b] };

        let mut state = state;
        for (filename, request, result) in order {
            state = thumbnails(state, filename, request, result);
        }

        let preview = state.view().preview;
        assert_eq!(preview.filename.as_deref(), Some("b.pdf"));
        assert_eq!(preview.artifacts.len(), 1);
        assert_eq!(preview.artifacts[0].src, "/output/b_page_1.png");
    }
}

#[test]
fn image_selected_after_pdf_is_not_overwritten() {
    init_logging();
    let state = with_files(&["a.pdf", "x.png"]);
    let (state, _) = screenshot(state, "a.pdf");
    let (mut state, _) = screenshot(state, "x.png");
    state.consume_dirty();

    let mut state = thumbnails(state, "a.pdf", 1, Err("timeout".into()));

    assert!(!state.consume_dirty());
    assert!(state.notices().is_empty());
    assert_eq!(
        state.view().preview.artifacts,
        vec![PreviewArtifact::direct("x.png")]
    );
}

#[test]
fn screenshot_of_unknown_file_is_noop() {
    init_logging();
    let (state, effects) = screenshot(AppState::new(), "ghost.pdf");
    assert!(effects.is_empty());
    assert_eq!(state.preview().selected(), None);
}

fn start_job(state: AppState, filename: &str) -> AppState {
    let (state, effects) = update(
        state,
        Msg::StartRagClicked {
            filename: filename.to_string(),
        },
    );
    assert_eq!(effects.len(), 1);
    state
}

fn complete(
    state: AppState,
    job_id: u64,
    filename: &str,
    artifacts: Option<Vec<String>>,
) -> (AppState, Vec<Effect>) {
    update(
        state,
        Msg::JobEvent {
            job_id,
            filename: filename.to_string(),
            event: JobEvent::Complete { artifacts },
        },
    )
}

#[test]
fn completion_behind_another_preview_keeps_selection() {
    init_logging();
    let state = start_job(with_files(&["a.pdf", "y.pdf"]), "a.pdf");
    let (state, effects) = screenshot(state, "y.pdf");
    assert_eq!(
        effects,
        vec![Effect::GeneratePreview {
            filename: "y.pdf".into(),
            request: 1
        }]
    );

    let (state, effects) = complete(state, 1, "a.pdf", None);
    assert_eq!(
        effects,
        vec![Effect::CloseJob {
            job_id: 1,
            filename: "a.pdf".into()
        }]
    );
    assert_eq!(
        state.files().get("a.pdf").unwrap().status,
        FileStatus::Processed
    );
    assert_eq!(state.view().preview.filename.as_deref(), Some("y.pdf"));
    assert!(state.view().preview.loading);

    let state = thumbnails(state, "y.pdf", 1, Ok(vec!["/uploads/y_1.png".into()]));
    let preview = state.view().preview;
    assert_eq!(preview.filename.as_deref(), Some("y.pdf"));
    assert_eq!(
        preview.artifacts,
        vec![PreviewArtifact::page("y.pdf", "/uploads/y_1.png".into())]
    );
}

#[test]
fn inline_artifacts_do_not_replace_another_preview() {
    init_logging();
    let state = start_job(with_files(&["a.pdf", "x.png"]), "a.pdf");
    let (state, _) = screenshot(state, "x.png");

    let (state, effects) = complete(state, 1, "a.pdf", Some(vec!["/uploads/a_1.png".into()]));

    assert_eq!(effects.len(), 1);
    let preview = state.view().preview;
    assert_eq!(preview.filename.as_deref(), Some("x.png"));
    assert_eq!(preview.artifacts, vec![PreviewArtifact::direct("x.png")]);
}

#[test]
fn completion_of_previewed_file_refreshes_it() {
    init_logging();
    let state = start_job(with_files(&["a.pdf"]), "a.pdf");
    let (state, first) = screenshot(state, "a.pdf");
    assert_eq!(
        first,
        vec![Effect::GeneratePreview {
            filename: "a.pdf".into(),
            request: 1
        }]
    );

    let (state, effects) = complete(state, 1, "a.pdf", None);

    assert_eq!(
        effects,
        vec![
            Effect::CloseJob {
                job_id: 1,
                filename: "a.pdf".into()
            },
            Effect::GeneratePreview {
                filename: "a.pdf".into(),
                request: 2
            },
        ]
    );
    let state = thumbnails(state, "a.pdf", 1, Ok(vec!["/uploads/old.png".into()]));
    assert!(state.view().preview.loading);
    assert!(state.view().preview.artifacts.is_empty());
}
