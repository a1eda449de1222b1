//! Plain-text table layouts.

use super::{Align, Table, TableFormat, TableRenderer};

/// A horizontal rule.
#[derive(Debug, Clone, Copy)]
struct Rule {
    begin: &'static str,
    fill: char,
    sep: &'static str,
    end: &'static str,
}

/// Delimiters of a header or data row.
#[derive(Debug, Clone, Copy)]
struct RowDelims {
    begin: &'static str,
    sep: &'static str,
    end: &'static str,
}

#[derive(Debug, Clone, Copy)]
struct Style {
    above: Option<Rule>,
    below_header: Option<Rule>,
    between_rows: Option<Rule>,
    below: Option<Rule>,
    row: RowDelims,
    /// Spaces on each side of a cell
    padding: usize,
    /// Pad cells to the column width
    aligned: bool,
    /// Mark alignment with colons in the header rule
    colons: bool,
}

const fn rule(begin: &'static str, fill: char, sep: &'static str, end: &'static str) -> Rule {
    Rule {
        begin,
        fill,
        sep,
        end,
    }
}

const PIPES: RowDelims = RowDelims {
    begin: "|",
    sep: "|",
    end: "|",
};

const SPACES: RowDelims = RowDelims {
    begin: "",
    sep: "  ",
    end: "",
};

const BARE: Style = Style {
    above: None,
    below_header: None,
    between_rows: None,
    below: None,
    row: SPACES,
    padding: 0,
    aligned: true,
    colons: false,
};

fn style(format: TableFormat) -> Style {
    match format {
        TableFormat::Plain => BARE,
        TableFormat::Simple => Style {
            below_header: Some(rule("", '-', "  ", "")),
            ..BARE
        },
        TableFormat::Github => Style {
            below_header: Some(rule("|", '-', "|", "|")),
            row: PIPES,
            padding: 1,
            ..BARE
        },
        TableFormat::Pipe => Style {
            below_header: Some(rule("|", '-', "|", "|")),
            row: PIPES,
            padding: 1,
            colons: true,
            ..BARE
        },
        TableFormat::Grid => Style {
            above: Some(rule("+", '-', "+", "+")),
            below_header: Some(rule("+", '=', "+", "+")),
            between_rows: Some(rule("+", '-', "+", "+")),
            below: Some(rule("+", '-', "+", "+")),
            row: PIPES,
            padding: 1,
            ..BARE
        },
        TableFormat::Orgtbl => Style {
            below_header: Some(rule("|", '-', "+", "|")),
            row: PIPES,
            padding: 1,
            ..BARE
        },
        TableFormat::Psql => Style {
            above: Some(rule("+", '-', "+", "+")),
            below_header: Some(rule("+", '-', "+", "+")),
            below: Some(rule("+", '-', "+", "+")),
            row: PIPES,
            padding: 1,
            ..BARE
        },
        TableFormat::Rst => Style {
            above: Some(rule("", '=', "  ", "")),
            below_header: Some(rule("", '=', "  ", "")),
            below: Some(rule("", '=', "  ", "")),
            ..BARE
        },
        TableFormat::Tsv => Style {
            row: RowDelims {
                begin: "",
                sep: "\t",
                end: "",
            },
            aligned: false,
            ..BARE
        },
    }
}

/// Renders tables in one of the [`TableFormat`] layouts.
///
/// Column widths count `char`s, so double-width glyphs (CJK, most emoji) in
/// a cell push that row's later separators out of line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextTableRenderer {
    format: TableFormat,
}

impl TextTableRenderer {
    pub fn new(format: TableFormat) -> Self {
        Self { format }
    }
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn pad(text: &str, w: usize, align: Align) -> String {
    match align {
        Align::Left => format!("{text:<w$}"),
        Align::Right => format!("{text:>w$}"),
    }
}

struct Layout<'a> {
    table: &'a Table,
    style: Style,
    widths: Vec<usize>,
    aligns: Vec<Align>,
}

impl<'a> Layout<'a> {
    fn new(table: &'a Table, style: Style) -> Self {
        let columns = table.column_count();
        let widths = (0..columns)
            .map(|col| {
                (0..table.rows.len())
                    .map(|row| width(table.cell(row, col)))
                    .chain(std::iter::once(width(&table.headings[col])))
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let aligns = (0..columns).map(|col| table.alignment(col)).collect();
        Self {
            table,
            style,
            widths,
            aligns,
        }
    }

    fn rule(&self, rule: Rule, with_colons: bool) -> String {
        let segments: Vec<String> = self
            .widths
            .iter()
            .zip(&self.aligns)
            .map(|(w, align)| {
                let fill = w + 2 * self.style.padding;
                let mut segment: String = std::iter::repeat_n(rule.fill, fill).collect();
                if with_colons && fill > 0 {
                    let colon_at = match align {
                        Align::Left => 0,
                        Align::Right => fill - 1,
                    };
                    segment.replace_range(colon_at..colon_at + 1, ":");
                }
                segment
            })
            .collect();
        format!("{}{}{}", rule.begin, segments.join(rule.sep), rule.end)
    }

    fn row<S: AsRef<str>>(&self, cells: impl Iterator<Item = S>) -> String {
        let padding = " ".repeat(self.style.padding);
        let cells: Vec<String> = cells
            .zip(self.widths.iter().zip(&self.aligns))
            .map(|(cell, (w, align))| {
                let text = cell.as_ref();
                if !self.style.aligned {
                    return text.to_string();
                }
                format!("{padding}{}{padding}", pad(text, *w, *align))
            })
            .collect();
        let delims = self.style.row;
        let line = format!("{}{}{}", delims.begin, cells.join(delims.sep), delims.end);
        line.trim_end().to_string()
    }

    fn data_row(&self, index: usize) -> String {
        let cells = (0..self.table.column_count()).map(|col| self.table.cell(index, col));
        self.row(cells)
    }

    fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.table.rows.len() * 2 + 4);
        if let Some(rule) = self.style.above {
            lines.push(self.rule(rule, false));
        }
        lines.push(self.row(self.table.headings.iter()));
        if let Some(rule) = self.style.below_header {
            lines.push(self.rule(rule, self.style.colons));
        }
        for index in 0..self.table.rows.len() {
            if index > 0
                && let Some(rule) = self.style.between_rows
            {
                lines.push(self.rule(rule, false));
            }
            lines.push(self.data_row(index));
        }
        if let Some(rule) = self.style.below {
            lines.push(self.rule(rule, false));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

impl TableRenderer for TextTableRenderer {
    fn render(&self, table: &Table) -> String {
        Layout::new(table, style(self.format)).render()
    }
}
