//! Plain-text table of query rows

use fibery_client::last_segment;
use serde_json::Value;
use std::fmt::Write;

/// Render rows with bare column names, columns in first-seen order
#[must_use]
pub fn render_table(rows: &[Value]) -> String {
    let mut columns: Vec<&str> = Vec::new();
    for row in rows.iter().filter_map(Value::as_object) {
        for key in row.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }
    if columns.is_empty() {
        return "(no rows)".to_string();
    }

    let headers: Vec<String> = columns.iter().map(|c| last_segment(c)).collect();
    let cells: Vec<Vec<String>> = rows
        .iter()
        .filter_map(Value::as_object)
        .map(|row| columns.iter().map(|c| cell(row.get(*c))).collect())
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    push_line(&mut out, &headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("-+-"));
    out.push('\n');
    for row in &cells {
        push_line(&mut out, row, &widths);
    }
    out.truncate(out.trim_end().len());
    out
}

fn push_line(out: &mut String, values: &[String], widths: &[usize]) {
    let padded: Vec<String> = values
        .iter()
        .zip(widths)
        .map(|(v, w)| format!("{v:<w$}"))
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
