//! Table rendering for device reports.
//!
//! The report is a plain grid of text cells. [`TableRenderer`] turns it into
//! the final text; [`text::TextTableRenderer`] implements the selectable
//! [`TableFormat`] styles.

pub mod text;

use crate::aggregator::ReportRow;

/// Available table layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TableFormat {
    /// Columns separated by spaces, no rules
    Plain,
    /// Dashed rule under the header
    Simple,
    /// GitHub-flavored Markdown
    #[default]
    Github,
    /// Markdown with alignment colons
    Pipe,
    /// Boxed grid with a rule between every row
    Grid,
    /// Emacs org-mode table
    Orgtbl,
    /// PostgreSQL console style
    Psql,
    /// reStructuredText simple table
    Rst,
    /// Tab-separated values
    Tsv,
}

impl std::fmt::Display for TableFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TableFormat::Plain => "plain",
            TableFormat::Simple => "simple",
            TableFormat::Github => "github",
            TableFormat::Pipe => "pipe",
            TableFormat::Grid => "grid",
            TableFormat::Orgtbl => "orgtbl",
            TableFormat::Psql => "psql",
            TableFormat::Rst => "rst",
            TableFormat::Tsv => "tsv",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for TableFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plain" => Ok(TableFormat::Plain),
            "simple" => Ok(TableFormat::Simple),
            "github" | "gfm" => Ok(TableFormat::Github),
            "pipe" => Ok(TableFormat::Pipe),
            "grid" => Ok(TableFormat::Grid),
            "orgtbl" | "org" => Ok(TableFormat::Orgtbl),
            "psql" => Ok(TableFormat::Psql),
            "rst" => Ok(TableFormat::Rst),
            "tsv" => Ok(TableFormat::Tsv),
            _ => Err(format!("Unknown table format: {}", s)),
        }
    }
}

/// Horizontal alignment of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A header row plus data rows, all as display text.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headings: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<H: Into<String>>(headings: impl IntoIterator<Item = H>) -> Self {
        Self {
            headings: headings.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build the device report table.
    pub fn from_report(rows: &[ReportRow]) -> Self {
        let mut table = Self::new(ReportRow::HEADINGS);
        table.rows = rows.iter().map(|row| Vec::from(row.cells())).collect();
        table
    }

    pub fn column_count(&self) -> usize {
        self.headings.len()
    }

    /// Cell text, or an empty string for short rows.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows[row].get(column).map(String::as_str).unwrap_or("")
    }

    /// Numeric columns are right-aligned, everything else left-aligned.
    pub fn alignment(&self, column: usize) -> Align {
        let numeric = !self.rows.is_empty()
            && (0..self.rows.len()).all(|row| {
                self.cell(row, column)
                    .parse::<f64>()
                    .is_ok_and(f64::is_finite)
            });
        if numeric { Align::Right } else { Align::Left }
    }
}

/// Trait for turning a [`Table`] into report text.
pub trait TableRenderer: Send + Sync {
    /// Render the whole table. The result ends with a newline.
    fn render(&self, table: &Table) -> String;
}
