//! Deterministic export of the current extraction result.
//!
//! Three serializers: CSV (BOM-prefixed, RFC-4180 quoting), pretty JSON of
//! the whole result, and a Word-compatible HTML document. The document export
//! picks between two pure render paths: the raw extracted text when present,
//! otherwise a structured fallback built from the schedule and task tables.

use crate::types::{ContractSchedule, ExtractionResult};

/// UTF-8 byte-order mark, prepended so spreadsheet apps detect the encoding.
const BOM: char = '\u{FEFF}';

const CSV_HEADER: [&str; 6] = ["업무ID", "업무명", "단계", "마감일", "우선순위", "상태"];

/// A named, typed content blob for the file-save layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime: &'static str,
    pub content: String,
}

/// CSV of the task list in original order. `None` when there is no task list
/// to export (no-op, never an error).
pub fn to_csv(result: &ExtractionResult) -> Option<ExportArtifact> {
    let tasks = result.task_list.as_ref()?;

    let mut rows = Vec::with_capacity(tasks.len() + 1);
    rows.push(
        CSV_HEADER
            .iter()
            .map(|h| csv_quote(h))
            .collect::<Vec<_>>()
            .join(","),
    );
    for task in tasks {
        let cells = [
            task.task_id.as_str(),
            task.task_name.as_str(),
            task.phase.as_str(),
            task.due_date.as_deref().unwrap_or(""),
            task.priority.as_str(),
            task.status.as_str(),
        ];
        rows.push(
            cells
                .iter()
                .map(|c| csv_quote(c))
                .collect::<Vec<_>>()
                .join(","),
        );
    }

    Some(ExportArtifact {
        filename: format!("{}_tasks.csv", base_name(result)),
        mime: "text/csv;charset=utf-8",
        content: format!("{}{}", BOM, rows.join("\n")),
    })
}

/// Wrap a cell in double quotes, doubling internal quotes (RFC 4180).
fn csv_quote(cell: &str) -> String {
    format!("\"{}\"", cell.replace('"', "\"\""))
}

/// Pretty-printed JSON of the entire result, unmodified.
pub fn to_json(result: &ExtractionResult) -> Option<ExportArtifact> {
    let content = serde_json::to_string_pretty(result).ok()?;
    Some(ExportArtifact {
        filename: format!("{}.json", base_name(result)),
        mime: "application/json",
        content,
    })
}

/// Word-compatible HTML document (`.doc` extension, `application/msword`).
pub fn to_doc(result: &ExtractionResult) -> Option<ExportArtifact> {
    let title = contract_name(result).unwrap_or("계약서");

    let body = match result.raw_text.as_deref() {
        Some(text) => render_raw_text(text),
        None => render_fallback(result),
    };

    let content = format!(
        concat!(
            "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" ",
            "xmlns:w=\"urn:schemas-microsoft-com:office:word\" ",
            "xmlns=\"http://www.w3.org/TR/REC-html40\">\n",
            "<head><meta charset=\"utf-8\"><title>{}</title></head>\n",
            "<body>\n{}</body>\n</html>"
        ),
        escape_angle(title),
        body
    );

    Some(ExportArtifact {
        filename: format!("{}.doc", sanitize_filename(title)),
        mime: "application/msword",
        content,
    })
}

/// One paragraph per line of the extracted source text. Empty lines become
/// non-breaking-space paragraphs so Word keeps the spacing.
fn render_raw_text(text: &str) -> String {
    let mut out = String::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            out.push_str("<p>&nbsp;</p>\n");
        } else {
            out.push_str(&format!("<p>{}</p>\n", escape_angle(line)));
        }
    }
    out
}

/// Structured fallback when no source text survived extraction: contract
/// overview, then schedules, then tasks, each table only when it has rows.
fn render_fallback(result: &ExtractionResult) -> String {
    let empty = ContractSchedule::default();
    let cs = result.contract_schedule.as_ref().unwrap_or(&empty);

    let field = |v: &Option<String>| -> String {
        match v.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => escape_angle(s),
            None => "-".to_string(),
        }
    };
    let date = |v: &Option<String>| -> String {
        match v.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => escape_angle(s),
            None => "미정".to_string(),
        }
    };

    let mut out = String::new();
    out.push_str(&format!("<h1>{}</h1>\n", field(&cs.contract_name)));
    out.push_str("<table border=\"1\">\n");
    out.push_str(&format!(
        "<tr><td>계약명</td><td>{}</td></tr>\n",
        field(&cs.contract_name)
    ));
    out.push_str(&format!(
        "<tr><td>발주처</td><td>{}</td></tr>\n",
        field(&cs.client)
    ));
    out.push_str(&format!(
        "<tr><td>수급자</td><td>{}</td></tr>\n",
        field(&cs.contractor)
    ));
    out.push_str(&format!(
        "<tr><td>계약기간</td><td>{} ~ {}</td></tr>\n",
        date(&cs.contract_start_date),
        date(&cs.contract_end_date)
    ));
    let duration = cs
        .total_duration_days
        .map(|d| format!("{}일", d))
        .unwrap_or_else(|| "-".to_string());
    out.push_str(&format!(
        "<tr><td>총 사업기간</td><td>{}</td></tr>\n",
        duration
    ));
    out.push_str("</table>\n");

    if !cs.schedules.is_empty() {
        out.push_str("<h2>추진 일정</h2>\n<table border=\"1\">\n");
        out.push_str("<tr><td>단계</td><td>유형</td><td>시작일</td><td>종료일</td><td>설명</td></tr>\n");
        for item in &cs.schedules {
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_angle(&item.phase),
                escape_angle(&item.schedule_type),
                date(&item.start_date),
                date(&item.end_date),
                field(&item.description),
            ));
        }
        out.push_str("</table>\n");
    }

    if let Some(tasks) = result.task_list.as_ref().filter(|t| !t.is_empty()) {
        out.push_str("<h2>업무 목록</h2>\n<table border=\"1\">\n");
        out.push_str(
            "<tr><td>업무명</td><td>단계</td><td>마감일</td><td>우선순위</td><td>상태</td></tr>\n",
        );
        for task in tasks {
            out.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                escape_angle(&task.task_name),
                escape_angle(&task.phase),
                date(&task.due_date),
                escape_angle(task.priority.as_str()),
                escape_angle(task.status.as_str()),
            ));
        }
        out.push_str("</table>\n");
    }

    out
}

/// Escape only the angle brackets — the document body is otherwise verbatim.
fn escape_angle(s: &str) -> String {
    s.replace('<', "&lt;").replace('>', "&gt;")
}

/// Replace everything outside ASCII alphanumerics, Korean (syllables and
/// jamo), and whitespace with `_`.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|ch| {
            let keep = ch.is_ascii_alphanumeric()
                || ch.is_whitespace()
                || ('\u{AC00}'..='\u{D7A3}').contains(&ch)
                || ('\u{3131}'..='\u{3163}').contains(&ch);
            if keep {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

fn contract_name(result: &ExtractionResult) -> Option<&str> {
    result
        .contract_schedule
        .as_ref()
        .and_then(|cs| cs.contract_name.as_deref())
        .filter(|s| !s.is_empty())
}

fn base_name(result: &ExtractionResult) -> String {
    sanitize_filename(contract_name(result).unwrap_or("계약"))
}
