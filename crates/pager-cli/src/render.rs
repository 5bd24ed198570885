//! Terminal output for a settled session.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use pager_core::SortOrder;
use serde_json::Value;

use crate::session::SessionOutcome;

pub fn print_outcome(outcome: &SessionOutcome) {
    println!("{}", rows_table(outcome));
    println!("{}", footer(outcome));
    println!("?{}", outcome.query);
}

/// Table of the visible rows. The sorted column header carries an arrow.
pub fn rows_table(outcome: &SessionOutcome) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    if outcome.columns.is_empty() {
        table.set_header(vec![header_cell("(no rows)")]);
        return table;
    }

    let sorted = outcome.sort.active();
    table.set_header(
        outcome
            .columns
            .iter()
            .map(|column| match sorted {
                Some((key, SortOrder::Ascending)) if key == column => {
                    header_cell(&format!("{column} ▲"))
                }
                Some((key, SortOrder::Descending)) if key == column => {
                    header_cell(&format!("{column} ▼"))
                }
                _ => header_cell(column),
            })
            .collect::<Vec<_>>(),
    );

    for row in &outcome.rows {
        table.add_row(
            outcome
                .columns
                .iter()
                .map(|column| value_cell(row.get(column)))
                .collect::<Vec<_>>(),
        );
    }
    table
}

/// `Page 2 of 3 | 23 rows | 10 per page [5, 10, 20]`, plus active filters.
pub fn footer(outcome: &SessionOutcome) -> String {
    let mut line = format!(
        "Page {} of {} | {} rows | {} per page {:?}",
        outcome.page.page_index,
        outcome.page_count,
        outcome.total,
        outcome.page.page_size,
        outcome.allowed_sizes,
    );
    let filters: Vec<String> = outcome
        .filter
        .entries()
        .iter()
        .filter(|entry| !entry.values.is_empty())
        .map(|entry| {
            let values: Vec<&str> = entry.values.iter().map(String::as_str).collect();
            format!("{}={}", entry.key, values.join(","))
        })
        .collect();
    if !filters.is_empty() {
        line.push_str(" | filter ");
        line.push_str(&filters.join(" "));
    }
    line
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn value_cell(value: Option<&Value>) -> Cell {
    match value {
        None | Some(Value::Null) => Cell::new("-").add_attribute(Attribute::Dim),
        Some(Value::String(s)) => Cell::new(s),
        Some(Value::Number(n)) => Cell::new(n).set_alignment(CellAlignment::Right),
        Some(other) => Cell::new(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pager_core::{FilterEntry, FilterState, PageState, SeedSource, SortState};
    use serde_json::json;

    fn outcome() -> SessionOutcome {
        SessionOutcome {
            columns: vec!["age".into(), "name".into()],
            rows: vec![json!({"name": "Ana", "age": 31}), json!({"name": "Bo"})],
            page: PageState {
                page_index: 2,
                page_size: 10,
            },
            page_count: 3,
            total: 23,
            sort: SortState::new("age", SortOrder::Descending),
            filter: FilterState::new(vec![FilterEntry::new("gender", ["female", "male"])]),
            allowed_sizes: vec![5, 10, 20],
            seed_source: SeedSource::Url,
            query: "page=2&size=10".into(),
        }
    }

    #[test]
    fn footer_lists_page_and_filters() {
        assert_eq!(
            footer(&outcome()),
            "Page 2 of 3 | 23 rows | 10 per page [5, 10, 20] | filter gender=female,male"
        );
    }

    #[test]
    fn table_marks_sorted_column() {
        let rendered = rows_table(&outcome()).to_string();
        assert!(rendered.contains("age ▼"));
        assert!(rendered.contains("Ana"));
        assert!(rendered.contains('-'));
    }
}
