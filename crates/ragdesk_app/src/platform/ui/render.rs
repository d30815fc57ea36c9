use std::fmt::Write;

use ragdesk_core::{AppViewModel, ChatSender, FileRowView, FileStatus};

/// Plain-text rendering of the whole view.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "== Files ({}, {} active job{}) ==",
        view.files.len(),
        view.active_jobs,
        if view.active_jobs == 1 { "" } else { "s" }
    );
    if view.files.is_empty() {
        out.push_str("  (no files)\n");
    }
    for row in &view.files {
        render_row(&mut out, row);
    }

    match &view.preview.filename {
        Some(filename) => {
            let _ = writeln!(out, "== Preview: {filename} ==");
            if view.preview.loading {
                out.push_str("  generating thumbnails...\n");
            }
            for artifact in &view.preview.artifacts {
                let _ = writeln!(out, "  {} ({})", artifact.src, artifact.alt);
            }
        }
        None => out.push_str("== Preview: none ==\n"),
    }

    if !view.chat.is_empty() {
        out.push_str("== Chat ==\n");
        for line in &view.chat {
            let who = match line.sender {
                ChatSender::User => "you",
                ChatSender::System => "system",
            };
            let _ = writeln!(out, "  {who}: {}", line.text);
        }
    }

    if !view.notices.is_empty() {
        out.push_str("== Notices ==\n");
        for notice in &view.notices {
            let _ = writeln!(out, "  ! {notice}");
        }
    }

    out
}

fn render_row(out: &mut String, row: &FileRowView) {
    let marker = if row.previewed { '>' } else { ' ' };
    let mut status = status_label(row.status).to_string();
    if let Some(elapsed) = row.elapsed_seconds {
        let _ = write!(status, " {}", format_elapsed(elapsed));
    }
    if let Some(percent) = row.progress {
        let _ = write!(status, " {percent}%");
    }
    if row.can_start {
        status.push_str(" [rag]");
    }
    let _ = writeln!(out, "{marker} {:<32} {status}", row.filename);
    if let Some(error) = &row.last_error {
        let _ = writeln!(out, "    last error: {error}");
    }
}

fn status_label(status: FileStatus) -> &'static str {
    match status {
        FileStatus::Unprocessed => "Unprocessed",
        FileStatus::Processing => "Processing",
        FileStatus::Processed => "Processed",
        FileStatus::Failed => "Failed",
    }
}

fn format_elapsed(seconds: u64) -> String {
    if seconds < 60 {
        format!("{seconds}s")
    } else {
        format!("{}m{:02}s", seconds / 60, seconds % 60)
    }
}
