use crate::model::{AttendanceEntry, AttendanceStatus};
use std::fmt::Write;

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Printable attendance sheet for one (subject, date) bucket.
pub fn render_sheet(
    subject: &str,
    date: &str,
    entries: &[AttendanceEntry],
    generated_at: &str,
) -> String {
    let present = entries
        .iter()
        .filter(|e| e.status == AttendanceStatus::Present)
        .count();
    let absent = entries.len() - present;

    let mut rows = String::new();
    if entries.is_empty() {
        rows.push_str("      <tr><td colspan=\"4\" class=\"empty\">No attendance recorded.</td></tr>\n");
    }
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            rows,
            "      <tr class=\"{status}\"><td>{n}</td><td>{roll}</td><td>{name}</td><td>{status}</td></tr>",
            n = i + 1,
            roll = escape_html(&entry.roll_no),
            name = escape_html(&entry.name),
            status = entry.status.as_str(),
        );
    }

    let subject = escape_html(subject);
    let date = escape_html(date);
    let generated_at = escape_html(generated_at);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Attendance {date} - {subject}</title>
  <style>
    body {{ font-family: sans-serif; margin: 2em; }}
    table {{ border-collapse: collapse; width: 100%; }}
    th, td {{ border: 1px solid #444; padding: 4px 8px; text-align: left; }}
    tr.absent td {{ color: #a00; }}
    td.empty {{ text-align: center; font-style: italic; }}
    @media print {{ .no-print {{ display: none; }} }}
  </style>
</head>
<body>
  <h1>Attendance Sheet</h1>
  <p><strong>Subject:</strong> {subject} &nbsp; <strong>Date:</strong> {date}</p>
  <table>
    <thead>
      <tr><th>#</th><th>Roll No</th><th>Name</th><th>Status</th></tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>
  <p><strong>Present:</strong> {present} &nbsp; <strong>Absent:</strong> {absent} &nbsp; <strong>Total:</strong> {total}</p>
  <p class="generated">Generated {generated_at}</p>
  <button class="no-print" onclick="window.print()">Print</button>
</body>
</html>
"#,
        total = entries.len(),
    )
}
