//! Plain-text table rendering

/// How column widths are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Width of the column name, at least 8; header only when rows exist
    Auto,
    /// Every column this wide; header always printed
    Fixed(usize),
}

const MIN_WIDTH: usize = 8;

/// A titled block of rows, already converted to display strings
#[derive(Debug, Clone)]
pub struct TextTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub layout: Layout,
}

impl TextTable {
    pub fn new(columns: &[&str], layout: Layout) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            layout,
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        match self.layout {
            Layout::Auto => self
                .columns
                .iter()
                .map(|c| c.chars().count().max(MIN_WIDTH))
                .collect(),
            Layout::Fixed(width) => vec![width; self.columns.len()],
        }
    }

    /// Render at most `limit` rows (0 means no cap) followed by a footer
    pub fn render(&self, limit: usize) -> String {
        let widths = self.widths();
        let mut out = String::new();

        let shown = if limit == 0 {
            self.rows.len()
        } else {
            self.rows.len().min(limit)
        };

        if shown > 0 || self.layout != Layout::Auto {
            out.push_str(&join_cells(self.columns.iter().map(String::as_str), &widths));
            out.push('\n');
            out.push_str(
                &widths
                    .iter()
                    .map(|w| "-".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("-+-"),
            );
            out.push('\n');
        }

        for row in self.rows.iter().take(shown) {
            out.push_str(&join_cells(row.iter().map(String::as_str), &widths));
            out.push('\n');
        }

        if shown == 0 {
            out.push_str("(no rows)\n");
        } else {
            let capped = limit > 0 && shown >= limit;
            out.push_str(&format!(
                "... ({} shown{})\n",
                shown,
                if capped { " (capped)" } else { "" }
            ));
        }

        out
    }
}

fn join_cells<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Section banner
pub fn heading(title: &str) -> String {
    let rule = "=".repeat(80);
    format!("\n{rule}\n{title}\n{rule}\n")
}

/// Display an optional value, empty when absent
pub fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Comma-joined names, `-` when there are none
pub fn name_list(names: &[String]) -> String {
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}
