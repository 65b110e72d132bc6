use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::table::{ColumnKind, Table};

/// Chart kinds offered by the picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
    Pie,
}

impl ChartKind {
    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Bar => "bar chart",
            ChartKind::Line => "line chart",
            ChartKind::Pie => "pie chart",
        }
    }
}

/// Current UI selections, rebuilt from scratch on every render attempt.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartRequest {
    pub category_column: String,
    pub value_column: String,
    pub kind: ChartKind,
}

/// One bar, taken from one input row.
#[derive(Debug, Clone)]
pub struct BarSegment {
    pub label: String,
    pub value: f64,
    pub color_index: usize,
}

/// One pie slice, taken from one input row. Duplicate labels stay separate.
#[derive(Debug, Clone)]
pub struct PieSlice {
    pub label: String,
    pub value: f64,
    pub color_index: usize,
}

#[derive(Debug, Clone)]
pub enum ChartData {
    Bar(Vec<BarSegment>),
    Line(Vec<(String, f64)>),
    Pie(Vec<PieSlice>),
}

/// Renderable chart description, produced on demand and never persisted.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub data: ChartData,
}

/// Build a renderable chart from the table and the current selections.
///
/// Bar and Pie map one row to one segment/slice with no aggregation. Line
/// first groups rows on the category column and sums the value column, one
/// point per distinct category in first-seen order.
pub fn build(table: &Table, request: &ChartRequest) -> Result<ChartSpec> {
    if request.category_column.is_empty() || request.value_column.is_empty() {
        return Err(AppError::InvalidSelection(
            "select both a category column and a value column".to_string(),
        ));
    }

    let category_index =
        column_of_kind(table, &request.category_column, ColumnKind::Categorical)?;
    let value_index = column_of_kind(table, &request.value_column, ColumnKind::Numeric)?;

    let title = format!(
        "{} by {} ({})",
        request.value_column,
        request.category_column,
        request.kind.label()
    );

    let data = match request.kind {
        ChartKind::Bar => {
            let segments = per_row_segments(table, category_index, value_index)?
                .into_iter()
                .map(|(label, value, color_index)| BarSegment {
                    label,
                    value,
                    color_index,
                })
                .collect();
            ChartData::Bar(segments)
        }
        ChartKind::Line => ChartData::Line(aggregate_sums(table, category_index, value_index)?),
        ChartKind::Pie => {
            let slices = per_row_segments(table, category_index, value_index)?
                .into_iter()
                .map(|(label, value, color_index)| PieSlice {
                    label,
                    value,
                    color_index,
                })
                .collect();
            ChartData::Pie(slices)
        }
    };

    Ok(ChartSpec {
        title,
        kind: request.kind,
        data,
    })
}

fn column_of_kind(table: &Table, name: &str, kind: ColumnKind) -> Result<usize> {
    let index = table
        .column_index(name)
        .ok_or_else(|| AppError::UnknownColumn(name.to_string()))?;
    if table.column_kind(index) != kind {
        return Err(AppError::InvalidSelection(format!(
            "column '{}' is not {}",
            name,
            kind.as_str()
        )));
    }
    Ok(index)
}

fn parse_value(raw: &str, column: &str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|_| {
        AppError::NonNumericValue(format!("column '{}' contains '{}'", column, raw))
    })
}

/// One (label, value, color index) triple per input row. Color indices are
/// assigned per distinct category value in first-seen order, so a category
/// keeps one color across all of its rows.
fn per_row_segments(
    table: &Table,
    category_index: usize,
    value_index: usize,
) -> Result<Vec<(String, f64, usize)>> {
    let mut color_indices: HashMap<String, usize> = HashMap::new();
    let mut segments = Vec::with_capacity(table.row_count());

    for row in &table.rows {
        let label = row[category_index].clone();
        let value = parse_value(&row[value_index], &table.headers[value_index])?;
        let next = color_indices.len();
        let color_index = *color_indices.entry(label.clone()).or_insert(next);
        segments.push((label, value, color_index));
    }

    Ok(segments)
}

/// Group rows on the category column and sum the value column. Output order
/// is first appearance of each category in the table.
fn aggregate_sums(
    table: &Table,
    category_index: usize,
    value_index: usize,
) -> Result<Vec<(String, f64)>> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, f64> = HashMap::new();

    for row in &table.rows {
        let category = &row[category_index];
        let value = parse_value(&row[value_index], &table.headers[value_index])?;
        match totals.get_mut(category.as_str()) {
            Some(total) => *total += value,
            None => {
                order.push(category.clone());
                totals.insert(category.clone(), value);
            }
        }
    }

    Ok(order
        .into_iter()
        .map(|category| {
            let total = totals.remove(&category).unwrap_or(0.0);
            (category, total)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Table;

    fn make_table() -> Table {
        Table::from_reader("category,sales\nA,10\nB,20\nA,30\n".as_bytes()).unwrap()
    }

    fn make_request(kind: ChartKind) -> ChartRequest {
        ChartRequest {
            category_column: "category".to_string(),
            value_column: "sales".to_string(),
            kind,
        }
    }

    #[test]
    fn test_bar_keeps_one_segment_per_row() {
        let spec = build(&make_table(), &make_request(ChartKind::Bar)).unwrap();
        let segments = match spec.data {
            ChartData::Bar(segments) => segments,
            other => panic!("expected bar data, got {:?}", other),
        };
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].label, "A");
        assert_eq!(segments[2].label, "A");
        // Duplicate categories share a color, distinct ones do not.
        assert_eq!(segments[0].color_index, segments[2].color_index);
        assert_ne!(segments[0].color_index, segments[1].color_index);
    }

    #[test]
    fn test_line_sums_per_category() {
        let spec = build(&make_table(), &make_request(ChartKind::Line)).unwrap();
        let points = match spec.data {
            ChartData::Line(points) => points,
            other => panic!("expected line data, got {:?}", other),
        };
        assert_eq!(
            points,
            vec![("A".to_string(), 40.0), ("B".to_string(), 20.0)]
        );
    }

    #[test]
    fn test_line_keeps_first_seen_order() {
        let table = Table::from_reader("k,v\nz,1\na,2\nz,3\nm,4\n".as_bytes()).unwrap();
        let request = ChartRequest {
            category_column: "k".to_string(),
            value_column: "v".to_string(),
            kind: ChartKind::Line,
        };
        let spec = build(&table, &request).unwrap();
        let points = match spec.data {
            ChartData::Line(points) => points,
            other => panic!("expected line data, got {:?}", other),
        };
        let categories: Vec<&str> = points.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(categories, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_pie_keeps_duplicate_labels_separate() {
        let spec = build(&make_table(), &make_request(ChartKind::Pie)).unwrap();
        let slices = match spec.data {
            ChartData::Pie(slices) => slices,
            other => panic!("expected pie data, got {:?}", other),
        };
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].label, slices[2].label);
    }

    #[test]
    fn test_empty_selection_is_invalid() {
        let table = make_table();
        for (category, value) in [("", "sales"), ("category", ""), ("", "")] {
            let request = ChartRequest {
                category_column: category.to_string(),
                value_column: value.to_string(),
                kind: ChartKind::Bar,
            };
            let err = build(&table, &request).unwrap_err();
            assert!(matches!(err, AppError::InvalidSelection(_)), "{:?}", err);
        }
    }

    #[test]
    fn test_wrong_kind_selection_is_invalid() {
        let table = make_table();
        let request = ChartRequest {
            category_column: "sales".to_string(),
            value_column: "sales".to_string(),
            kind: ChartKind::Bar,
        };
        let err = build(&table, &request).unwrap_err();
        assert!(matches!(err, AppError::InvalidSelection(_)));

        let request = ChartRequest {
            category_column: "category".to_string(),
            value_column: "category".to_string(),
            kind: ChartKind::Bar,
        };
        let err = build(&table, &request).unwrap_err();
        assert!(matches!(err, AppError::InvalidSelection(_)));
    }

    #[test]
    fn test_unknown_column_is_reported() {
        let err = build(
            &make_table(),
            &ChartRequest {
                category_column: "region".to_string(),
                value_column: "sales".to_string(),
                kind: ChartKind::Line,
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::UnknownColumn(_)));
        assert!(err.to_string().contains("'region'"));
    }

    #[test]
    fn test_title_combines_selections() {
        let spec = build(&make_table(), &make_request(ChartKind::Pie)).unwrap();
        assert_eq!(spec.title, "sales by category (pie chart)");
    }
}
