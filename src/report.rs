//! Check output: the service table and the verdict line

use comfy_table::{Cell, Color, Table};

use crate::config::PLUGIN_NAME;
use crate::health::{Evaluation, Verdict};
use crate::services::ServiceRecord;

/// Rendered view of one family's records, in display order.
#[derive(Debug, Clone)]
pub struct Report {
    pub headers: &'static [&'static str],
    pub rows: Vec<Vec<String>>,
    /// Row indices that escalated the verdict
    pub flagged: Vec<usize>,
}

impl Report {
    pub fn new<R: ServiceRecord>(records: &[R], evaluation: &Evaluation) -> Self {
        Self {
            headers: R::HEADERS,
            rows: records.iter().map(ServiceRecord::row).collect(),
            flagged: evaluation.findings.iter().map(|f| f.index).collect(),
        }
    }

    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.set_header(self.headers.iter().copied());

        for (index, row) in self.rows.iter().enumerate() {
            let flagged = self.flagged.contains(&index);
            table.add_row(row.iter().map(|value| {
                let cell = Cell::new(value);
                if flagged { cell.fg(Color::Red) } else { cell }
            }));
        }

        table
    }
}

/// The final line a monitoring agent reads, e.g. `... CRITICAL: 1 of 3 ...`.
///
/// Multi-line messages are folded so agents that keep only the first
/// line still see the whole message.
pub fn verdict_line(verdict: Verdict, message: &str) -> String {
    let message = message
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!("{} {}: {}", PLUGIN_NAME, verdict, message)
}
