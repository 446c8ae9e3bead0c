use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use formulary_cli::types::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Mode: {} (rules v{})", result.mode.label(), result.rules_version);
    println!(
        "Spreadsheet: {} [{}]",
        result.spreadsheet.display(),
        result.strategy
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sheet"),
        header_cell("Rows"),
        header_cell("Name column"),
        header_cell("Accepted"),
        header_cell("Rejected"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);

    let mut total_rows = 0usize;
    let mut total_accepted = 0usize;
    let mut total_rejected = 0usize;
    for sheet in &result.sheets {
        total_rows += sheet.rows;
        total_accepted += sheet.accepted;
        total_rejected += sheet.rejected;
        table.add_row(vec![
            Cell::new(&sheet.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(sheet.rows),
            Cell::new(&sheet.column),
            Cell::new(sheet.accepted),
            count_cell(sheet.rejected, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_rows).add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total_accepted).add_attribute(Attribute::Bold),
        count_cell(total_rejected, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    let mut outputs = Table::new();
    outputs.set_header(vec![header_cell("Artifact"), header_cell("Value")]);
    apply_table_style(&mut outputs);
    outputs.add_row(vec![
        Cell::new("Registry"),
        Cell::new(format!("{} distinct names", result.registry_size)),
    ]);
    let seeded = format!("{} upserts (cap {})", result.seeded, result.record_cap);
    outputs.add_row(vec![
        Cell::new("Seed"),
        if result.seeded < result.registry_size {
            Cell::new(seeded).fg(Color::Yellow)
        } else {
            Cell::new(seeded)
        },
    ]);
    outputs.add_row(vec![
        Cell::new("Prior-agreement candidates"),
        match result.prior_agreement_candidates {
            Some(count) => Cell::new(count),
            None => dim_cell("not scanned"),
        },
    ]);
    outputs.add_row(vec![
        Cell::new("Medication rules"),
        Cell::new(result.medication_rules),
    ]);
    outputs.add_row(vec![
        Cell::new("Rules file"),
        output_cell(&result.rules_path.display().to_string(), result.written),
    ]);
    outputs.add_row(vec![
        Cell::new("Seed file"),
        output_cell(&result.seed_path.display().to_string(), result.written),
    ]);
    println!("{outputs}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(color)
    }
}

fn output_cell(path: &str, written: bool) -> Cell {
    if written {
        Cell::new(path).fg(Color::Green)
    } else {
        dim_cell(format!("{path} (dry run)"))
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
