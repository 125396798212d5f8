//! Plain-text rendering of the view model.

use std::fmt::Write;

use chrono::{DateTime, Local, TimeZone};
use validator_core::{AppViewModel, Notice, NoticeLevel, PageButtons, ResultRowView};

pub fn render(view: &AppViewModel) -> String {
    render_in(view, &Local)
}

/// Same as [`render`], with created times shown in `tz`.
pub fn render_in<Tz>(view: &AppViewModel, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    let _ = writeln!(
        out,
        "── Results · page {} of {} · {} per page ──",
        view.page, view.total_pages, view.limit
    );
    if view.rows.is_empty() {
        let _ = writeln!(out, "  (no results)");
    }
    for row in &view.rows {
        render_row(&mut out, row, tz);
    }
    let _ = writeln!(out, "{}", page_selector(&view.page_buttons));

    let file = view.selected_file.as_deref().unwrap_or("<none>");
    let column = if view.email_column.is_empty() {
        "<none>"
    } else {
        view.email_column.as_str()
    };
    let upload = if view.is_uploading {
        "uploading…"
    } else if view.can_submit {
        "ready"
    } else {
        "incomplete"
    };
    let _ = writeln!(out, "Upload: file={file} column={column} [{upload}]");
    out
}

fn render_row<Tz>(out: &mut String, row: &ResultRowView, tz: &Tz)
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let _ = writeln!(
        out,
        "  {:<24} {:<28} {:<16} {}",
        row.job_id.as_str(),
        row.title,
        format_created(&row.created_at, tz),
        row.status
    );
    if row.is_in_progress() {
        let _ = writeln!(out, "      Processing...");
        return;
    }
    if let Some(report) = &row.report {
        let _ = writeln!(
            out,
            "      valid {} · disposable {} · syntax invalid {} · dns invalid {}",
            report.valid, report.disposable, report.syntax_invalid, report.dns_invalid
        );
    }
    if !row.downloads.is_empty() {
        let links: Vec<String> = row
            .downloads
            .iter()
            .map(|link| format!("{}: {}", link.artifact.label(), link.filename))
            .collect();
        let _ = writeln!(out, "      downloads  {}", links.join("  "));
    }
}

/// RFC 3339 timestamps are shown in `tz`; anything else is shown as received.
pub fn format_created<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match DateTime::parse_from_rfc3339(raw) {
        Ok(at) => at.with_timezone(tz).format("%Y-%m-%d %H:%M").to_string(),
        Err(_) if raw.is_empty() => "-".to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn page_selector(buttons: &PageButtons) -> String {
    let mut parts = Vec::new();
    if buttons.prev_enabled {
        parts.push("‹ prev".to_string());
    }
    for page in &buttons.leading {
        parts.push(page_label(*page, buttons.current));
    }
    if buttons.ellipsis {
        parts.push("…".to_string());
    }
    if let Some(last) = buttons.last {
        parts.push(page_label(last, buttons.current));
    }
    if buttons.next_enabled {
        parts.push("next ›".to_string());
    }
    parts.join(" ")
}

fn page_label(page: u32, current: u32) -> String {
    if page == current {
        format!("[{page}]")
    } else {
        page.to_string()
    }
}

pub fn notice_line(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Success => format!("✔ {}", notice.message),
        NoticeLevel::Error => format!("✖ {}", notice.message),
    }
}
