//! Plain-text table rendering.

use std::fmt;

/// A single decoded database value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    /// Blob contents are never rendered, only their size.
    Blob(usize),
}

impl Cell {
    fn is_numeric(&self) -> bool {
        matches!(self, Cell::Integer(_) | Cell::Real(_))
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Integer(n) => write!(f, "{n}"),
            Cell::Real(x) => f.write_str(&format_real(*x)),
            Cell::Text(s) => f.write_str(s),
            Cell::Blob(len) => write!(f, "<{len} bytes>"),
        }
    }
}

/// At most two decimals, trailing zeros dropped.
fn format_real(x: f64) -> String {
    let s = format!("{x:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Render `rows` under a header of `columns` as an ASCII table.
///
/// Numeric cells are right-aligned, everything else left-aligned. Rows
/// shorter than the header are padded with empty cells. Line breaks inside
/// a value are written as `\n` so each row stays on one line.
pub fn render_table(columns: &[String], rows: &[Vec<Cell>]) -> String {
    let columns: Vec<String> = columns.iter().map(|c| single_line(c)).collect();
    let rendered: Vec<Vec<(String, bool)>> = rows
        .iter()
        .map(|row| {
            (0..columns.len())
                .map(|i| match row.get(i) {
                    Some(cell) => (single_line(&cell.to_string()), cell.is_numeric()),
                    None => (String::new(), false),
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &rendered {
        for (i, (text, _)) in row.iter().enumerate() {
            widths[i] = widths[i].max(text.chars().count());
        }
    }

    let border = border_line(&widths);
    let mut out = String::new();
    out.push_str(&border);
    out.push_str(&row_line(
        columns.iter().map(|c| (c.as_str(), false)),
        &widths,
    ));
    out.push_str(&border);
    for row in &rendered {
        out.push_str(&row_line(
            row.iter().map(|(text, numeric)| (text.as_str(), *numeric)),
            &widths,
        ));
    }
    if !rendered.is_empty() {
        out.push_str(&border);
    }
    out
}

fn single_line(text: &str) -> String {
    text.replace("\r\n", "\\n")
        .replace(['\n', '\r'], "\\n")
}

fn border_line(widths: &[usize]) -> String {
    let mut line = String::from("+");
    for w in widths {
        line.push_str(&"-".repeat(w + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn row_line<'a>(cells: impl Iterator<Item = (&'a str, bool)>, widths: &[usize]) -> String {
    let mut line = String::from("|");
    for ((text, right_align), width) in cells.zip(widths) {
        let pad = width - text.chars().count();
        line.push(' ');
        if right_align {
            line.push_str(&" ".repeat(pad));
            line.push_str(text);
        } else {
            line.push_str(text);
            line.push_str(&" ".repeat(pad));
        }
        line.push_str(" |");
    }
    line.push('\n');
    line
}
