// Performance table rendering
use crate::domain::measurement::{port_for, MeasurementRow};
use crate::presentation::format::{escape_html, format_rate, format_timestamp};
use std::fmt::Write;

const CHANGED_ROW_STYLE: &str = "background-color: lightcoral;";

const HEADER: &str = r#"<tr>
    <th>Port</th>
    <th style="width: 15rem">Name</th>
    <th style="width: 10rem">Timestamp</th>
    <th style="width: 10rem">Send rate (bps)</th>
    <th style="width: 10rem">Receive rate (bps)</th>
</tr>"#;

/// Render the header row followed by one row per stream. Rows whose flag in
/// `changed` is set are highlighted; a missing flag counts as changed.
pub fn render_table(dataset: &[MeasurementRow], changed: &[bool]) -> String {
    let mut html = String::from(HEADER);

    for (index, row) in dataset.iter().enumerate() {
        let highlight = changed.get(index).copied().unwrap_or(true);
        render_row(&mut html, index, row, highlight);
    }

    html
}

fn render_row(html: &mut String, index: usize, row: &MeasurementRow, highlight: bool) {
    let style = if highlight {
        format!(" style=\"{CHANGED_ROW_STYLE}\"")
    } else {
        String::new()
    };

    // Writing to a String cannot fail.
    let _ = write!(
        html,
        "\n<tr{style}>\n    <td>{}</td>\n    <td>{}</td>\n    <td>{}</td>\n    <td>{}</td>\n    <td>{}</td>\n</tr>",
        port_for(index),
        escape_html(&row.label),
        format_timestamp(row.timestamp_secs),
        format_rate(row.send_rate_bps),
        format_rate(row.receive_rate_bps),
    );
}
