//! Shared preview pane.
//!
//! The pane shows exactly one file at a time. Every `show` bumps a request
//! number; thumbnail responses only land when both the filename and the
//! request number still match, so a slow answer for an earlier selection
//! can never repaint the pane.

/// Extensions rendered directly from the uploaded file.
pub const RASTER_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "bmp"];
/// Extension whose preview is a sequence of generated page thumbnails.
pub const PAGINATED_EXTENSION: &str = "pdf";
pub const PLACEHOLDER_SRC: &str = "/static/default-preview.png";
pub const UPLOADS_PREFIX: &str = "/uploads/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Image,
    GeneratedThumbnails,
    Placeholder,
}

impl PreviewKind {
    pub fn for_filename(filename: &str) -> Self {
        let extension = match filename.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => return PreviewKind::Placeholder,
        };
        if RASTER_EXTENSIONS.contains(&extension.as_str()) {
            PreviewKind::Image
        } else if extension == PAGINATED_EXTENSION {
            PreviewKind::GeneratedThumbnails
        } else {
            PreviewKind::Placeholder
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewArtifact {
    pub src: String,
    pub alt: String,
}

impl PreviewArtifact {
    pub fn direct(filename: &str) -> Self {
        Self {
            src: format!("{UPLOADS_PREFIX}{filename}"),
            alt: filename.to_string(),
        }
    }

    pub fn page(filename: &str, src: String) -> Self {
        Self {
            src,
            alt: format!("Page of {filename}"),
        }
    }

    pub fn placeholder() -> Self {
        Self {
            src: PLACEHOLDER_SRC.to_string(),
            alt: "preview unavailable".to_string(),
        }
    }
}

/// Result of feeding a thumbnail response into the pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailOutcome {
    Applied,
    /// Selection moved on; the response was dropped untouched.
    Stale,
    /// Remote failed; the pane now shows the placeholder.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewPane {
    selected: Option<String>,
    request: u64,
    pending: Option<u64>,
    artifacts: Vec<PreviewArtifact>,
}

impl PreviewPane {
    /// Clears the pane and selects `filename`. Returns the request number
    /// when thumbnails have to be fetched from the remote.
    pub fn show(&mut self, filename: &str, kind: PreviewKind) -> Option<u64> {
        self.select(filename);
        match kind {
            PreviewKind::Image => {
                self.artifacts.push(PreviewArtifact::direct(filename));
                None
            }
            PreviewKind::Placeholder => {
                self.artifacts.push(PreviewArtifact::placeholder());
                None
            }
            PreviewKind::GeneratedThumbnails => {
                self.pending = Some(self.request);
                Some(self.request)
            }
        }
    }

    /// Selects `filename` and renders references that arrived inline with a
    /// job completion.
    pub fn show_artifacts(&mut self, filename: &str, refs: Vec<String>) {
        self.select(filename);
        self.render_refs(filename, refs);
    }

    pub fn apply_thumbnails(
        &mut self,
        filename: &str,
        request: u64,
        result: Result<Vec<String>, String>,
    ) -> ThumbnailOutcome {
        if self.selected.as_deref() != Some(filename) || self.pending != Some(request) {
            return ThumbnailOutcome::Stale;
        }
        self.pending = None;
        self.artifacts.clear();
        match result {
            Ok(refs) => {
                self.render_refs(filename, refs);
                ThumbnailOutcome::Applied
            }
            Err(reason) => {
                self.artifacts.push(PreviewArtifact::placeholder());
                ThumbnailOutcome::Failed(reason)
            }
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
        self.pending = None;
        self.artifacts.clear();
    }

    pub fn clear_if_selected(&mut self, filename: &str) -> bool {
        if self.selected.as_deref() == Some(filename) {
            self.clear();
            true
        } else {
            false
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn artifacts(&self) -> &[PreviewArtifact] {
        &self.artifacts
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    fn select(&mut self, filename: &str) {
        self.artifacts.clear();
        self.selected = Some(filename.to_string());
        self.request += 1;
        self.pending = None;
    }

    fn render_refs(&mut self, filename: &str, refs: Vec<String>) {
        if refs.is_empty() {
            self.artifacts.push(PreviewArtifact::placeholder());
            return;
        }
        self.artifacts.extend(
            refs.into_iter()
                .map(|src| PreviewArtifact::page(filename, src)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_follows_extension_case_insensitively() {
        assert_eq!(PreviewKind::for_filename("x.PNG"), PreviewKind::Image);
        assert_eq!(PreviewKind::for_filename("scan.jpeg"), PreviewKind::Image);
        assert_eq!(
            PreviewKind::for_filename("report.Pdf"),
            PreviewKind::GeneratedThumbnails
        );
        assert_eq!(PreviewKind::for_filename("notes.docx"), PreviewKind::Placeholder);
        assert_eq!(PreviewKind::for_filename("README"), PreviewKind::Placeholder);
    }

    #[test]
    fn response_for_previous_request_is_stale() {
        let mut pane = PreviewPane::default();
        let first = pane.show("a.pdf", PreviewKind::GeneratedThumbnails).unwrap();
        let second = pane.show("a.pdf", PreviewKind::GeneratedThumbnails).unwrap();
        assert_ne!(first, second);

        let outcome = pane.apply_thumbnails("a.pdf", first, Ok(vec!["/output/old.png".into()]));
        assert_eq!(outcome, ThumbnailOutcome::Stale);
        assert!(pane.artifacts().is_empty());
        assert!(pane.is_loading());

        let outcome = pane.apply_thumbnails("a.pdf", second, Ok(vec!["/output/new.png".into()]));
        assert_eq!(outcome, ThumbnailOutcome::Applied);
        assert_eq!(pane.artifacts()[0].src, "/output/new.png");
        assert!(!pane.is_loading());
    }

    #[test]
    fn empty_thumbnail_list_renders_placeholder() {
        let mut pane = PreviewPane::default();
        let request = pane.show("a.pdf", PreviewKind::GeneratedThumbnails).unwrap();
        pane.apply_thumbnails("a.pdf", request, Ok(Vec::new()));
        assert_eq!(pane.artifacts(), &[PreviewArtifact::placeholder()]);
    }

    #[test]
    fn clear_if_selected_ignores_other_files() {
        let mut pane = PreviewPane::default();
        pane.show("x.png", PreviewKind::Image);
        assert!(!pane.clear_if_selected("y.png"));
        assert_eq!(pane.selected(), Some("x.png"));
        assert!(pane.clear_if_selected("x.png"));
        assert_eq!(pane.selected(), None);
        assert!(pane.artifacts().is_empty());
    }
}
