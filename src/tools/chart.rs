//! Chart rendering tool.
//!
//! Bins one numeric column into a histogram, optionally grouped by a
//! second column, writes an SVG file, and returns a chart observation.
//! The file write is the tool's declared side effect; it happens at most
//! once per invocation.

use crate::core::{Dataset, Observation};
use crate::error::{Result, ToolError};
use crate::tools::{ParamKind, Tool, ToolContext, ToolSchema};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 10;

/// Bar fill colors cycled across groups.
const GROUP_COLORS: &[&str] = &["#4c72b0", "#dd8452", "#55a868", "#c44e52", "#8172b3"];

/// Chart canvas dimensions.
const CHART_WIDTH: usize = 640;
const CHART_HEIGHT: usize = 400;
const MARGIN: usize = 40;

/// Renders a histogram of one numeric column to an SVG file.
pub struct HistogramTool {
    schema: ToolSchema,
}

impl HistogramTool {
    /// Creates the tool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: ToolSchema::new()
                .required("column", ParamKind::String, "Numeric column to bin")
                .optional("bins", ParamKind::Integer, "Number of bins (default 10)")
                .optional(
                    "group_by",
                    ParamKind::String,
                    "Facet counts by this column's values",
                )
                .optional(
                    "file",
                    ParamKind::String,
                    "Output file name (default histogram_<column>.svg)",
                ),
        }
    }

    fn execution_error(&self, reason: String) -> crate::Error {
        ToolError::Execution {
            tool: self.name().to_string(),
            reason,
        }
        .into()
    }

    /// Collects (value, group-label) pairs for the target column.
    fn collect(
        dataset: &Dataset,
        column_idx: usize,
        group_idx: Option<usize>,
    ) -> Vec<(f64, String)> {
        dataset
            .rows()
            .iter()
            .filter_map(|row| {
                let value = row[column_idx].as_f64()?;
                let group = group_idx.map_or_else(|| "all".to_string(), |g| row[g].to_string());
                Some((value, group))
            })
            .collect()
    }

    /// Bins values into per-group counts.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn bin(
        values: &[(f64, String)],
        bins: usize,
        min: f64,
        max: f64,
    ) -> BTreeMap<String, Vec<usize>> {
        let span = if max > min { max - min } else { 1.0 };
        let mut grouped: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (value, group) in values {
            let mut bin = (((value - min) / span) * bins as f64) as usize;
            if bin >= bins {
                bin = bins - 1;
            }
            let counts = grouped.entry(group.clone()).or_insert_with(|| vec![0; bins]);
            counts[bin] += 1;
        }

        grouped
    }
}

impl Default for HistogramTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for HistogramTool {
    fn name(&self) -> &'static str {
        "histogram"
    }

    fn description(&self) -> &'static str {
        "Bin a numeric column into a histogram and write it as an SVG chart"
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    #[allow(clippy::cast_possible_truncation)]
    fn call(&self, ctx: &ToolContext<'_>, args: &Value) -> Result<Observation> {
        let dataset = ctx.require_dataset(self.name())?;

        let column = args
            .get("column")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let column_idx = dataset
            .column_index(column)
            .ok_or_else(|| self.execution_error(format!("no column named {column}")))?;

        let group_idx = match args.get("group_by").and_then(Value::as_str) {
            Some(group) => Some(
                dataset
                    .column_index(group)
                    .ok_or_else(|| self.execution_error(format!("no column named {group}")))?,
            ),
            None => None,
        };

        let bins = args.get("bins").and_then(Value::as_u64).unwrap_or(DEFAULT_BINS as u64) as usize;
        if bins == 0 {
            return Err(self.execution_error("bins must be > 0".to_string()));
        }

        let values = Self::collect(dataset, column_idx, group_idx);
        if values.is_empty() {
            return Err(self.execution_error(format!("column {column} has no numeric values")));
        }

        let min = values.iter().map(|(v, _)| *v).fold(f64::INFINITY, f64::min);
        let max = values
            .iter()
            .map(|(v, _)| *v)
            .fold(f64::NEG_INFINITY, f64::max);
        let grouped = Self::bin(&values, bins, min, max);

        let file_name = args.get("file").and_then(Value::as_str).map_or_else(
            || format!("histogram_{}.svg", column.replace(|c: char| !c.is_alphanumeric(), "_")),
            ToString::to_string,
        );

        let svg = render_svg(column, bins, min, max, &grouped);
        std::fs::create_dir_all(&ctx.chart_dir)
            .map_err(|e| self.execution_error(format!("cannot create chart dir: {e}")))?;
        let path = ctx.chart_dir.join(file_name);
        std::fs::write(&path, svg)
            .map_err(|e| self.execution_error(format!("cannot write chart: {e}")))?;

        tracing::info!(column, path = %path.display(), "histogram written");
        Ok(Observation::chart(path, summarize(column, bins, min, max, &grouped)))
    }
}

/// Text summary of the binned counts, what the model actually reads.
fn summarize(
    column: &str,
    bins: usize,
    min: f64,
    max: f64,
    grouped: &BTreeMap<String, Vec<usize>>,
) -> String {
    #[allow(clippy::cast_precision_loss)]
    let width = (max - min) / bins as f64;

    let mut out = format!("histogram of {column} ({bins} bins, range {min:.2}..{max:.2})\n");
    for (group, counts) in grouped {
        let _ = writeln!(out, "group {group}:");
        for (i, count) in counts.iter().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let lo = min + width * i as f64;
            let _ = writeln!(out, "  [{lo:.2}, {:.2}): {count}", lo + width);
        }
    }
    out.trim_end().to_string()
}

/// Renders grouped histogram bars as a standalone SVG document.
#[allow(clippy::cast_precision_loss)]
fn render_svg(
    column: &str,
    bins: usize,
    min: f64,
    max: f64,
    grouped: &BTreeMap<String, Vec<usize>>,
) -> String {
    let peak = grouped
        .values()
        .flat_map(|counts| counts.iter().copied())
        .max()
        .unwrap_or(1)
        .max(1);

    let plot_width = CHART_WIDTH - 2 * MARGIN;
    let plot_height = CHART_HEIGHT - 2 * MARGIN;
    let groups = grouped.len().max(1);
    let slot = plot_width as f64 / bins as f64;
    let bar = slot / groups as f64;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{CHART_WIDTH}" height="{CHART_HEIGHT}" viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}">"#
    );
    let _ = write!(
        svg,
        r#"<text x="{}" y="20" text-anchor="middle" font-family="sans-serif" font-size="14">{column} ({min:.2}..{max:.2})</text>"#,
        CHART_WIDTH / 2
    );

    for (g, (group, counts)) in grouped.iter().enumerate() {
        let color = GROUP_COLORS[g % GROUP_COLORS.len()];
        for (i, count) in counts.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            let height = (plot_height as f64) * (*count as f64) / (peak as f64);
            let x = MARGIN as f64 + slot * i as f64 + bar * g as f64;
            let y = (MARGIN + plot_height) as f64 - height;
            let _ = write!(
                svg,
                r#"<rect x="{x:.1}" y="{y:.1}" width="{:.1}" height="{height:.1}" fill="{color}"><title>{group}: {count}</title></rect>"#,
                bar.max(1.0)
            );
        }
    }

    // Axis line
    let _ = write!(
        svg,
        r##"<line x1="{MARGIN}" y1="{y}" x2="{x2}" y2="{y}" stroke="#333" stroke-width="1"/>"##,
        y = MARGIN + plot_height,
        x2 = MARGIN + plot_width
    );

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Scalar;
    use serde_json::json;

    fn sample_dataset() -> Dataset {
        Dataset::new(
            vec!["Glucose".to_string(), "Outcome".to_string()],
            vec![
                vec![Scalar::Int(148), Scalar::Int(1)],
                vec![Scalar::Int(85), Scalar::Int(0)],
                vec![Scalar::Int(183), Scalar::Int(1)],
                vec![Scalar::Int(89), Scalar::Int(0)],
                vec![Scalar::Int(137), Scalar::Int(1)],
            ],
        )
        .unwrap()
    }

    fn call(args: Value) -> (Result<Observation>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let ds = sample_dataset();
        let ctx = ToolContext::new(Some(&ds), dir.path());
        let tool = HistogramTool::new();
        let result = tool
            .schema()
            .validate(tool.name(), &args)
            .map_err(crate::Error::from)
            .and_then(|()| tool.call(&ctx, &args));
        (result, dir)
    }

    #[test]
    fn test_histogram_writes_svg() {
        let (result, dir) = call(json!({"column": "Glucose", "bins": 4}));
        let obs = result.unwrap();

        let Observation::Chart { path, summary } = obs else {
            unreachable!("histogram returns a chart observation")
        };
        assert!(path.starts_with(dir.path()));
        assert!(summary.contains("histogram of Glucose"));
        assert!(summary.contains("4 bins"));

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn test_histogram_grouped() {
        let (result, _dir) = call(json!({"column": "Glucose", "group_by": "Outcome", "bins": 3}));
        let obs = result.unwrap();
        let summary = obs.render();
        assert!(summary.contains("group 0:"));
        assert!(summary.contains("group 1:"));
    }

    #[test]
    fn test_histogram_custom_file_name() {
        let (result, dir) = call(json!({"column": "Glucose", "file": "fig1.svg"}));
        let Observation::Chart { path, .. } = result.unwrap() else {
            unreachable!("histogram returns a chart observation")
        };
        assert_eq!(path, dir.path().join("fig1.svg"));
    }

    #[test]
    fn test_histogram_unknown_column() {
        let (result, _dir) = call(json!({"column": "Nope"}));
        assert!(result.unwrap_err().to_string().contains("no column named Nope"));
    }

    #[test]
    fn test_histogram_unknown_group_column() {
        let (result, _dir) = call(json!({"column": "Glucose", "group_by": "Nope"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_histogram_missing_required_column_arg() {
        let (result, _dir) = call(json!({}));
        assert!(matches!(
            result,
            Err(crate::Error::Tool(ToolError::SchemaValidation { .. }))
        ));
    }

    #[test]
    fn test_bin_counts_sum_to_input() {
        let values: Vec<(f64, String)> = (0..20).map(|i| (f64::from(i), "all".to_string())).collect();
        let grouped = HistogramTool::bin(&values, 5, 0.0, 19.0);
        let total: usize = grouped["all"].iter().sum();
        assert_eq!(total, 20);
    }
}
