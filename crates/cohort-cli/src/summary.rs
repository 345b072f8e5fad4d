use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use cohort_model::AgeCohort;

use cohort_cli::types::RunResult;

pub fn print_summary(result: &RunResult) {
    println!("Input: {}", result.input.display());
    match &result.output {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: (dry run, nothing written)"),
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Sheet"),
        header_cell("Rows"),
        header_cell("Columns"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for sheet in &result.sheets {
        table.add_row(vec![
            sheet_cell(&sheet.name),
            Cell::new(sheet.rows),
            Cell::new(sheet.columns),
        ]);
    }
    println!("{table}");

    print_join_table(result);
    print_cohort_table(result);
}

fn print_join_table(result: &RunResult) {
    let join = &result.join;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Check"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Study Data rows"), Cell::new(join.rows)]);
    table.add_row(vec![
        Cell::new("No Demographics match"),
        count_cell(join.rows - join.demographic_matches, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("No Extra information match"),
        count_cell(join.rows - join.extra_info_matches, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Reformatted identifiers"),
        dim_or_plain(result.classification.reformatted),
    ]);
    table.add_row(vec![
        Cell::new("Unique identifiers"),
        Cell::new(result.unique_identifiers),
    ]);
    table.add_row(vec![
        Cell::new("Missing from Extra information"),
        count_cell(result.missing_identifiers, Color::Yellow),
    ]);
    println!();
    println!("Checks:");
    println!("{table}");
}

fn print_cohort_table(result: &RunResult) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Cohort"),
        header_cell("Ages"),
        header_cell("Subjects"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    let mut total = 0u32;
    for cohort in AgeCohort::ALL {
        let count = result
            .classification
            .cohorts
            .get(&cohort)
            .copied()
            .unwrap_or(0);
        total += count;
        table.add_row(vec![
            Cell::new(cohort.label())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(cohort.age_range()),
            dim_or_plain(count as usize),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(total).add_attribute(Attribute::Bold),
    ]);
    println!();
    println!("Cohorts:");
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn sheet_cell(name: &str) -> Cell {
    Cell::new(name)
        .fg(Color::Blue)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn dim_or_plain(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
