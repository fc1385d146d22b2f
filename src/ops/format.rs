//! Console rendering of datasets.

use crate::models::{Dataset, Value};
use unicode_width::UnicodeWidthStr;

/// Cell text used in previews. Line breaks are escaped so a row stays on one line.
fn preview_cell(value: &Value) -> String {
    value
        .to_string()
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}

fn pad(text: &str, width: usize, right_align: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(text.width()));
    if right_align {
        format!("{}{}", fill, text)
    } else {
        format!("{}{}", text, fill)
    }
}

/// Render the first `max_rows` rows of `dataset` as an ASCII table.
///
/// ```text
/// +----+-------+
/// | id | name  |
/// +----+-------+
/// |  1 | alpha |
/// +----+-------+
/// 1 row in set (3 total)
/// ```
pub fn format_preview(dataset: &Dataset, max_rows: usize) -> String {
    if dataset.column_count() == 0 {
        return "Empty set".to_string();
    }

    let shown = &dataset.rows()[..dataset.row_count().min(max_rows)];
    let cells: Vec<Vec<String>> = shown
        .iter()
        .map(|row| row.iter().map(preview_cell).collect())
        .collect();

    let mut widths: Vec<usize> = dataset.columns().iter().map(|c| c.name.width()).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.width());
        }
    }

    let separator: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+\n";

    let mut output = String::new();
    output.push_str(&separator);
    let header: String = dataset
        .columns()
        .iter()
        .zip(&widths)
        .map(|(col, w)| format!("| {} ", pad(&col.name, *w, false)))
        .collect::<String>()
        + "|\n";
    output.push_str(&header);
    output.push_str(&separator);

    for (row, texts) in shown.iter().zip(&cells) {
        let line: String = row
            .iter()
            .zip(texts)
            .zip(&widths)
            .map(|((value, text), w)| {
                let numeric = matches!(value, Value::Int(_) | Value::Float(_));
                format!("| {} ", pad(text, *w, numeric))
            })
            .collect::<String>()
            + "|\n";
        output.push_str(&line);
    }
    output.push_str(&separator);

    let row_text = if shown.len() == 1 { "row" } else { "rows" };
    if shown.len() < dataset.row_count() {
        output.push_str(&format!(
            "{} {} shown ({} total)\n",
            shown.len(),
            row_text,
            dataset.row_count()
        ));
    } else {
        output.push_str(&format!("{} {} in set\n", shown.len(), row_text));
    }

    output
}
