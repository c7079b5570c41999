//! Built-in dataset analysis tools.
//!
//! The computations the agent reaches for when asked about a tabular
//! dataset: shape, previews, descriptive statistics, frequencies, data
//! quality, correlation. All of them are pure reads over the session's
//! dataset.

use crate::core::{Dataset, Observation, Scalar};
use crate::error::{Result, ToolError};
use crate::tools::{ParamKind, Tool, ToolContext, ToolSchema};
use serde_json::{Value, json};

/// Converts a scalar to its JSON representation.
fn scalar_to_json(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => json!(b),
        Scalar::Int(i) => json!(i),
        Scalar::Float(f) => json!(f),
        Scalar::Text(s) => json!(s),
    }
}

/// Tool-facing error for a column that does not exist.
fn unknown_column(tool: &str, column: &str, dataset: &Dataset) -> crate::Error {
    ToolError::Execution {
        tool: tool.to_string(),
        reason: format!(
            "no column named {column}; available: {}",
            dataset.columns().join(", ")
        ),
    }
    .into()
}

/// Mean of a non-empty slice.
fn mean(values: &[f64]) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    values.iter().sum::<f64>() / n
}

/// Median of a non-empty slice (sorts a copy).
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        f64::midpoint(sorted[mid - 1], sorted[mid])
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation; 0.0 for fewer than two values.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    #[allow(clippy::cast_precision_loss)]
    let denom = (values.len() - 1) as f64;
    (values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / denom).sqrt()
}

/// Pearson correlation of two equal-length slices; `None` when either
/// side has zero variance or fewer than two points.
fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x);
    let my = mean(y);

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y.iter()) {
        cov += (a - mx) * (b - my);
        var_x += (a - mx).powi(2);
        var_y += (b - my).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Reports the dataset's row count.
///
/// The observation is the bare number, so the model can quote it directly.
pub struct RowCountTool {
    schema: ToolSchema,
}

impl RowCountTool {
    /// Creates the tool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            schema: ToolSchema::new(),
        }
    }
}

impl Default for RowCountTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for RowCountTool {
    fn name(&self) -> &'static str {
        "row_count"
    }

    fn description(&self) -> &'static str {
        "Return the number of rows in the dataset"
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    fn call(&self, ctx: &ToolContext<'_>, _args: &Value) -> Result<Observation> {
        let dataset = ctx.require_dataset(self.name())?;
        Ok(Observation::text(dataset.row_count().to_string()))
    }
}

/// Lists column names with inferred types.
pub struct ColumnsTool {
    schema: ToolSchema,
}

impl ColumnsTool {
    /// Creates the tool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            schema: ToolSchema::new(),
        }
    }
}

impl Default for ColumnsTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ColumnsTool {
    fn name(&self) -> &'static str {
        "columns"
    }

    fn description(&self) -> &'static str {
        "List column names and their inferred types"
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    fn call(&self, ctx: &ToolContext<'_>, _args: &Value) -> Result<Observation> {
        let dataset = ctx.require_dataset(self.name())?;
        let columns: Vec<Value> = dataset
            .columns()
            .iter()
            .map(|name| {
                json!({
                    "name": name,
                    "type": dataset.column_type(name).unwrap_or("null"),
                })
            })
            .collect();
        Ok(Observation::structured(json!(columns)))
    }
}

/// Previews the first rows of the dataset.
pub struct HeadTool {
    schema: ToolSchema,
}

impl HeadTool {
    /// Creates the tool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: ToolSchema::new().optional(
                "n",
                ParamKind::Integer,
                "Number of rows to preview (default 5)",
            ),
        }
    }
}

impl Default for HeadTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for HeadTool {
    fn name(&self) -> &'static str {
        "head"
    }

    fn description(&self) -> &'static str {
        "Preview the first rows of the dataset"
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    #[allow(clippy::cast_possible_truncation)]
    fn call(&self, ctx: &ToolContext<'_>, args: &Value) -> Result<Observation> {
        let dataset = ctx.require_dataset(self.name())?;
        let n = args.get("n").and_then(Value::as_u64).unwrap_or(5) as usize;

        let rows: Vec<Value> = dataset
            .rows()
            .iter()
            .take(n)
            .map(|row| {
                let cells: serde_json::Map<String, Value> = dataset
                    .columns()
                    .iter()
                    .zip(row.iter())
                    .map(|(name, cell)| (name.clone(), scalar_to_json(cell)))
                    .collect();
                Value::Object(cells)
            })
            .collect();

        Ok(Observation::structured(json!(rows)))
    }
}

/// Descriptive statistics per numeric column.
pub struct DescribeTool {
    schema: ToolSchema,
}

impl DescribeTool {
    /// Creates the tool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: ToolSchema::new().optional(
                "column",
                ParamKind::String,
                "Restrict to one column (default: all numeric columns)",
            ),
        }
    }

    fn describe_column(dataset: &Dataset, name: &str) -> Option<Value> {
        let values = dataset.numeric_column(name)?;
        if values.is_empty() {
            return None;
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(json!({
            "column": name,
            "count": values.len(),
            "mean": mean(&values),
            "std": sample_std(&values),
            "min": min,
            "median": median(&values),
            "max": max,
        }))
    }
}

impl Default for DescribeTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for DescribeTool {
    fn name(&self) -> &'static str {
        "describe"
    }

    fn description(&self) -> &'static str {
        "Compute count, mean, std, min, median, and max for numeric columns"
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    fn call(&self, ctx: &ToolContext<'_>, args: &Value) -> Result<Observation> {
        let dataset = ctx.require_dataset(self.name())?;

        if let Some(column) = args.get("column").and_then(Value::as_str) {
            if dataset.column_index(column).is_none() {
                return Err(unknown_column(self.name(), column, dataset));
            }
            let stats = Self::describe_column(dataset, column).ok_or_else(|| {
                ToolError::Execution {
                    tool: self.name().to_string(),
                    reason: format!("column {column} has no numeric values"),
                }
            })?;
            return Ok(Observation::structured(stats));
        }

        let stats: Vec<Value> = dataset
            .columns()
            .iter()
            .filter_map(|name| Self::describe_column(dataset, name))
            .collect();
        Ok(Observation::structured(json!(stats)))
    }
}

/// Frequency table for one column.
pub struct ValueCountsTool {
    schema: ToolSchema,
}

impl ValueCountsTool {
    /// Creates the tool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: ToolSchema::new()
                .required("column", ParamKind::String, "Column to count values in")
                .optional(
                    "top",
                    ParamKind::Integer,
                    "Keep only the most frequent values (default: all)",
                ),
        }
    }
}

impl Default for ValueCountsTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for ValueCountsTool {
    fn name(&self) -> &'static str {
        "value_counts"
    }

    fn description(&self) -> &'static str {
        "Count distinct values in a column, with percentages"
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn call(&self, ctx: &ToolContext<'_>, args: &Value) -> Result<Observation> {
        let dataset = ctx.require_dataset(self.name())?;
        let column = args
            .get("column")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let values = dataset
            .column_values(column)
            .ok_or_else(|| unknown_column(self.name(), column, dataset))?;

        let mut counts: std::collections::BTreeMap<String, usize> =
            std::collections::BTreeMap::new();
        for value in &values {
            let key = if value.is_null() {
                "(null)".to_string()
            } else {
                value.to_string()
            };
            *counts.entry(key).or_insert(0) += 1;
        }

        let mut entries: Vec<(String, usize)> = counts.into_iter().collect();
        // Most frequent first; ties stay in value order from the BTreeMap
        entries.sort_by(|a, b| b.1.cmp(&a.1));

        if let Some(top) = args.get("top").and_then(Value::as_u64) {
            entries.truncate(top as usize);
        }

        let total = values.len() as f64;
        let table: Vec<Value> = entries
            .into_iter()
            .map(|(value, count)| {
                json!({
                    "value": value,
                    "count": count,
                    "percent": (count as f64 / total) * 100.0,
                })
            })
            .collect();

        Ok(Observation::structured(json!(table)))
    }
}

/// Data-quality check: missing values per column.
pub struct MissingValuesTool {
    schema: ToolSchema,
}

impl MissingValuesTool {
    /// Creates the tool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: ToolSchema::new().optional(
                "count_zeros",
                ParamKind::Boolean,
                "Also count zeros as missing (default false)",
            ),
        }
    }
}

impl Default for MissingValuesTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for MissingValuesTool {
    fn name(&self) -> &'static str {
        "missing_values"
    }

    fn description(&self) -> &'static str {
        "Count missing (and optionally zero) values per column"
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    fn call(&self, ctx: &ToolContext<'_>, args: &Value) -> Result<Observation> {
        let dataset = ctx.require_dataset(self.name())?;
        let count_zeros = args
            .get("count_zeros")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let is_missing = |scalar: &Scalar| -> bool {
            if scalar.is_null() {
                return true;
            }
            if count_zeros {
                return matches!(scalar, Scalar::Int(0)) || scalar.as_f64() == Some(0.0);
            }
            false
        };

        let mut report = serde_json::Map::new();
        let mut total = 0usize;
        for name in dataset.columns() {
            let missing = dataset
                .column_values(name)
                .map(|values| values.iter().filter(|v| is_missing(v)).count())
                .unwrap_or(0);
            total += missing;
            report.insert(name.clone(), json!(missing));
        }

        Ok(Observation::structured(json!({
            "per_column": Value::Object(report),
            "total": total,
            "zeros_counted": count_zeros,
        })))
    }
}

/// Pearson correlation matrix over numeric columns.
pub struct CorrelationTool {
    schema: ToolSchema,
}

impl CorrelationTool {
    /// Creates the tool.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            schema: ToolSchema::new(),
        }
    }

    /// Row-aligned numeric pairs for two columns.
    fn aligned_pairs(dataset: &Dataset, a: usize, b: usize) -> (Vec<f64>, Vec<f64>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for row in dataset.rows() {
            if let (Some(x), Some(y)) = (row[a].as_f64(), row[b].as_f64()) {
                xs.push(x);
                ys.push(y);
            }
        }
        (xs, ys)
    }
}

impl Default for CorrelationTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for CorrelationTool {
    fn name(&self) -> &'static str {
        "correlation"
    }

    fn description(&self) -> &'static str {
        "Pearson correlation matrix over numeric columns"
    }

    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    fn call(&self, ctx: &ToolContext<'_>, _args: &Value) -> Result<Observation> {
        let dataset = ctx.require_dataset(self.name())?;

        // Columns with at least one numeric value participate
        let numeric: Vec<(usize, &String)> = dataset
            .columns()
            .iter()
            .enumerate()
            .filter(|(_, name)| {
                dataset
                    .numeric_column(name)
                    .is_some_and(|v| !v.is_empty())
            })
            .collect();

        if numeric.len() < 2 {
            return Err(ToolError::Execution {
                tool: self.name().to_string(),
                reason: "need at least two numeric columns".to_string(),
            }
            .into());
        }

        let mut matrix = serde_json::Map::new();
        for &(i, name_a) in &numeric {
            let mut row = serde_json::Map::new();
            for &(j, name_b) in &numeric {
                let (xs, ys) = Self::aligned_pairs(dataset, i, j);
                let r = if i == j {
                    Some(1.0)
                } else {
                    pearson(&xs, &ys)
                };
                row.insert(name_b.clone(), r.map_or(Value::Null, |v| json!(v)));
            }
            matrix.insert(name_a.clone(), Value::Object(row));
        }

        Ok(Observation::structured(Value::Object(matrix)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn sample_dataset() -> Dataset {
        Dataset::new(
            vec![
                "Glucose".to_string(),
                "BMI".to_string(),
                "Outcome".to_string(),
            ],
            vec![
                vec![Scalar::Int(148), Scalar::Float(33.6), Scalar::Int(1)],
                vec![Scalar::Int(85), Scalar::Float(26.6), Scalar::Int(0)],
                vec![Scalar::Int(183), Scalar::Float(23.3), Scalar::Int(1)],
                vec![Scalar::Int(0), Scalar::Null, Scalar::Int(0)],
                vec![Scalar::Int(137), Scalar::Float(43.1), Scalar::Int(1)],
            ],
        )
        .unwrap()
    }

    fn call(tool: &dyn Tool, dataset: &Dataset, args: Value) -> Result<Observation> {
        let ctx = ToolContext::new(Some(dataset), Path::new("."));
        tool.schema().validate(tool.name(), &args)?;
        tool.call(&ctx, &args)
    }

    #[test]
    fn test_row_count_bare_number() {
        let ds = sample_dataset();
        let obs = call(&RowCountTool::new(), &ds, json!({})).unwrap();
        assert_eq!(obs.render(), "5");
    }

    #[test]
    fn test_row_count_without_dataset() {
        let ctx = ToolContext::new(None, Path::new("."));
        let err = RowCountTool::new().call(&ctx, &json!({})).unwrap_err();
        assert!(err.to_string().contains("no dataset"));
    }

    #[test]
    fn test_columns_lists_types() {
        let ds = sample_dataset();
        let obs = call(&ColumnsTool::new(), &ds, json!({})).unwrap();
        let rendered = obs.render();
        assert!(rendered.contains("Glucose"));
        assert!(rendered.contains("int"));
        assert!(rendered.contains("float"));
    }

    #[test]
    fn test_head_default_and_limit() {
        let ds = sample_dataset();

        let obs = call(&HeadTool::new(), &ds, json!({})).unwrap();
        let Observation::Structured { value } = obs else {
            unreachable!("head returns structured output")
        };
        assert_eq!(value.as_array().map(Vec::len), Some(5));

        let obs = call(&HeadTool::new(), &ds, json!({"n": 2})).unwrap();
        let Observation::Structured { value } = obs else {
            unreachable!("head returns structured output")
        };
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_describe_all_numeric_columns() {
        let ds = sample_dataset();
        let obs = call(&DescribeTool::new(), &ds, json!({})).unwrap();
        let Observation::Structured { value } = obs else {
            unreachable!("describe returns structured output")
        };
        // Glucose, BMI, Outcome all have numeric values
        assert_eq!(value.as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_describe_single_column() {
        let ds = sample_dataset();
        let obs = call(&DescribeTool::new(), &ds, json!({"column": "BMI"})).unwrap();
        let Observation::Structured { value } = obs else {
            unreachable!("describe returns structured output")
        };
        // Null row excluded: 4 values
        assert_eq!(value["count"], json!(4));
        let mean = value["mean"].as_f64().unwrap();
        assert!((mean - 31.65).abs() < 1e-9);
    }

    #[test]
    fn test_describe_unknown_column() {
        let ds = sample_dataset();
        let err = call(&DescribeTool::new(), &ds, json!({"column": "Nope"})).unwrap_err();
        assert!(err.to_string().contains("no column named Nope"));
    }

    #[test]
    fn test_value_counts_with_percent() {
        let ds = sample_dataset();
        let obs = call(&ValueCountsTool::new(), &ds, json!({"column": "Outcome"})).unwrap();
        let Observation::Structured { value } = obs else {
            unreachable!("value_counts returns structured output")
        };
        let table = value.as_array().unwrap();
        assert_eq!(table[0]["value"], json!("1"));
        assert_eq!(table[0]["count"], json!(3));
        assert!((table[0]["percent"].as_f64().unwrap() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_value_counts_top() {
        let ds = sample_dataset();
        let obs = call(
            &ValueCountsTool::new(),
            &ds,
            json!({"column": "Glucose", "top": 2}),
        )
        .unwrap();
        let Observation::Structured { value } = obs else {
            unreachable!("value_counts returns structured output")
        };
        assert_eq!(value.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_missing_values_nulls_only() {
        let ds = sample_dataset();
        let obs = call(&MissingValuesTool::new(), &ds, json!({})).unwrap();
        let Observation::Structured { value } = obs else {
            unreachable!("missing_values returns structured output")
        };
        assert_eq!(value["per_column"]["BMI"], json!(1));
        assert_eq!(value["per_column"]["Glucose"], json!(0));
        assert_eq!(value["total"], json!(1));
    }

    #[test]
    fn test_missing_values_counting_zeros() {
        let ds = sample_dataset();
        let obs = call(
            &MissingValuesTool::new(),
            &ds,
            json!({"count_zeros": true}),
        )
        .unwrap();
        let Observation::Structured { value } = obs else {
            unreachable!("missing_values returns structured output")
        };
        // Glucose has one zero; Outcome has two zeros; BMI has one null
        assert_eq!(value["per_column"]["Glucose"], json!(1));
        assert_eq!(value["per_column"]["Outcome"], json!(2));
        assert_eq!(value["total"], json!(4));
    }

    #[test]
    fn test_correlation_matrix() {
        let ds = sample_dataset();
        let obs = call(&CorrelationTool::new(), &ds, json!({})).unwrap();
        let Observation::Structured { value } = obs else {
            unreachable!("correlation returns structured output")
        };
        assert_eq!(value["Glucose"]["Glucose"], json!(1.0));
        // Symmetric off-diagonal entries
        let ab = value["Glucose"]["Outcome"].as_f64().unwrap();
        let ba = value["Outcome"]["Glucose"].as_f64().unwrap();
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_needs_two_numeric_columns() {
        let ds = Dataset::new(
            vec!["name".to_string()],
            vec![vec![Scalar::Text("x".to_string())]],
        )
        .unwrap();
        let err = call(&CorrelationTool::new(), &ds, json!({})).unwrap_err();
        assert!(err.to_string().contains("two numeric columns"));
    }

    #[test]
    fn test_stat_helpers() {
        assert!((mean(&[1.0, 2.0, 3.0]) - 2.0).abs() < 1e-12);
        assert!((median(&[3.0, 1.0, 2.0]) - 2.0).abs() < 1e-12);
        assert!((median(&[4.0, 1.0, 2.0, 3.0]) - 2.5).abs() < 1e-12);
        assert!((sample_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]) - 2.138_089_935).abs() < 1e-6);
        assert_eq!(sample_std(&[1.0]), 0.0);

        let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
        assert!(pearson(&[1.0, 1.0], &[2.0, 3.0]).is_none());
    }
}
