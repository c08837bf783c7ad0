use std::io::{self, IsTerminal, Write};

use chrono::Local;
use todo_core::{Filter, TodoView};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            color: cfg.color()? && io::stdout().is_terminal(),
        })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn write_view<W: Write>(&self, mut out: W, view: &TodoView) -> anyhow::Result<()> {
        if view.is_empty() {
            writeln!(out, "No todos yet! Add your first todo to get started.")?;
            return Ok(());
        }

        if view.no_search_results() {
            writeln!(out, "No todos found matching \"{}\"", view.search)?;
        } else {
            let headers = vec![
                "ID".to_string(),
                "Done".to_string(),
                "Created".to_string(),
                "Text".to_string(),
            ];

            let rows = view
                .visible
                .iter()
                .map(|task| {
                    let done = if task.completed {
                        self.paint("[x]", "32")
                    } else {
                        "[ ]".to_string()
                    };
                    let text = if task.completed {
                        self.paint(&task.text, "2")
                    } else {
                        task.text.clone()
                    };
                    vec![
                        self.paint(&task.id.to_string(), "33"),
                        done,
                        task.created_at
                            .with_timezone(&Local)
                            .format("%Y-%m-%d")
                            .to_string(),
                        text,
                    ]
                })
                .collect();

            write_table(&mut out, headers, rows)?;
        }

        writeln!(out)?;
        let tabs = Filter::ALL
            .iter()
            .map(|filter| {
                let tab = format!("{} ({})", filter.label(), view.count_for(*filter));
                if *filter == view.filter {
                    format!("[{tab}]")
                } else {
                    tab
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(out, "{tabs}")?;

        if view.show_bulk_actions() {
            let mut actions = vec![view.toggle_all_label().to_string()];
            if view.completed_count > 0 {
                actions.push(format!("Clear Completed ({})", view.completed_count));
            }
            writeln!(out, "Bulk: {}", actions.join(" | "))?;
        }

        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        write!(writer, "{:width$} ", headers[idx], width = widths[idx])?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
