//! Comparison table, grouped averages and pipe-table rendering

use serde::Serialize;
use std::collections::BTreeMap;
use unicode_width::UnicodeWidthStr;

/// Column headers of the comparison table
pub const COMPARISON_HEADERS: [&str; 5] = [
    "Image",
    "Pipeline A Cosine Similarity",
    "Pipeline B Cosine Similarity",
    "Pipeline A Time Taken (s)",
    "Pipeline B Time Taken (s)",
];

/// Group name for records without an archetype
pub const UNGROUPED: &str = "ungrouped";

/// Scores and timings of one image
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub image: String,
    pub similarity_a: f64,
    pub similarity_b: f64,
    pub time_a: f64,
    pub time_b: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archetype: Option<String>,
}

/// Mean metrics over a set of rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAverage {
    pub group: String,
    pub count: usize,
    pub similarity_a: f64,
    pub similarity_b: f64,
    pub time_a: f64,
    pub time_b: f64,
}

impl GroupAverage {
    fn from_rows<'a>(
        group: String,
        rows: impl IntoIterator<Item = &'a ComparisonRow>,
    ) -> Option<Self> {
        let mut count = 0usize;
        let mut sums = [0.0f64; 4];
        for row in rows {
            count += 1;
            sums[0] += row.similarity_a;
            sums[1] += row.similarity_b;
            sums[2] += row.time_a;
            sums[3] += row.time_b;
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        Some(Self {
            group,
            count,
            similarity_a: sums[0] / n,
            similarity_b: sums[1] / n,
            time_a: sums[2] / n,
            time_b: sums[3] / n,
        })
    }
}

/// One row per evaluated image, in input order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ComparisonTable {
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Averages per archetype, sorted by group name
    #[must_use]
    pub fn group_averages(&self) -> Vec<GroupAverage> {
        let mut groups: BTreeMap<&str, Vec<&ComparisonRow>> = BTreeMap::new();
        for row in &self.rows {
            let key = row.archetype.as_deref().unwrap_or(UNGROUPED);
            groups.entry(key).or_default().push(row);
        }
        groups
            .into_iter()
            .filter_map(|(group, rows)| GroupAverage::from_rows(group.to_string(), rows))
            .collect()
    }

    /// Averages over every row; `None` for an empty table
    #[must_use]
    pub fn overall_average(&self) -> Option<GroupAverage> {
        GroupAverage::from_rows("overall".to_string(), &self.rows)
    }

    /// Pipe-style markdown table
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                vec![
                    row.image.clone(),
                    format_general(row.similarity_a),
                    format_general(row.similarity_b),
                    format_general(row.time_a),
                    format_general(row.time_b),
                ]
            })
            .collect();
        render_pipe_table(&COMPARISON_HEADERS, &rows, &[false, true, true, true, true])
    }

    /// Grouped averages followed by the overall row, as a pipe table
    #[must_use]
    pub fn group_averages_markdown(&self) -> String {
        let mut headers = vec!["Archetype", "Images"];
        headers.extend_from_slice(&COMPARISON_HEADERS[1..]);

        let rows: Vec<Vec<String>> = self
            .group_averages()
            .into_iter()
            .chain(self.overall_average())
            .map(|avg| {
                vec![
                    avg.group,
                    avg.count.to_string(),
                    format_general(avg.similarity_a),
                    format_general(avg.similarity_b),
                    format_general(avg.time_a),
                    format_general(avg.time_b),
                ]
            })
            .collect();
        render_pipe_table(&headers, &rows, &[false, true, true, true, true, true])
    }
}

/// Render a pipe table with `:---` / `---:` alignment markers.
///
/// Column width is the larger of the header width plus two and the widest
/// value, measured in terminal display columns.
#[must_use]
pub fn render_pipe_table(headers: &[&str], rows: &[Vec<String>], numeric: &[bool]) -> String {
    let right_aligned = |col: usize| numeric.get(col).copied().unwrap_or(false);

    let mut widths: Vec<usize> = headers.iter().map(|h| h.width() + 2).collect();
    for row in rows {
        for (col, cell) in row.iter().enumerate().take(widths.len()) {
            widths[col] = widths[col].max(cell.width());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| (*h).to_string()).collect();
    push_row(&mut out, &header_cells, &widths, right_aligned);

    out.push('|');
    for (col, width) in widths.iter().enumerate() {
        if right_aligned(col) {
            out.push_str(&"-".repeat(width + 1));
            out.push(':');
        } else {
            out.push(':');
            out.push_str(&"-".repeat(width + 1));
        }
        out.push('|');
    }
    out.push('\n');

    for row in rows {
        push_row(&mut out, row, &widths, right_aligned);
    }
    out
}

fn push_row(
    out: &mut String,
    cells: &[String],
    widths: &[usize],
    right_aligned: impl Fn(usize) -> bool,
) {
    out.push('|');
    for (col, width) in widths.iter().enumerate() {
        let cell = cells.get(col).map_or("", String::as_str);
        let fill = " ".repeat(width.saturating_sub(cell.width()));
        out.push(' ');
        if right_aligned(col) {
            out.push_str(&fill);
            out.push_str(cell);
        } else {
            out.push_str(cell);
            out.push_str(&fill);
        }
        out.push_str(" |");
    }
    out.push('\n');
}

/// Six significant digits with trailing zeros removed, switching to
/// exponent notation below 1e-4 and from 1e6 on
#[must_use]
pub fn format_general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string().to_lowercase();
    }

    let scientific = format!("{value:.5e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if !(-4..6).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        return format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        );
    }

    let decimals = usize::try_from(5 - exponent).unwrap_or(0);
    trim_fraction(&format!("{value:.decimals$}")).to_string()
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}
