use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use mocap_cli::{RunReport, StageReport, TrialStatus};

pub fn print_summary(report: &RunReport) {
    println!("Output: {}", report.output_dir.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Stage"),
        header_cell("Status"),
        header_cell("Completed"),
        header_cell("Skipped"),
        header_cell("Failed"),
        header_cell("Artifacts"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 1, CellAlignment::Center);

    let mut total_artifacts = 0usize;
    let mut total_failed = 0usize;
    for stage in &report.stages {
        let failed = stage.count(TrialStatus::Failed);
        total_failed += failed;
        total_artifacts += stage.artifact_count();
        table.add_row(vec![
            Cell::new(stage.stage.label()).add_attribute(Attribute::Bold),
            status_cell(stage),
            count_cell(stage.count(TrialStatus::Completed), Color::Green),
            count_cell(stage.count(TrialStatus::Skipped), Color::Yellow),
            count_cell(failed, Color::Red),
            Cell::new(stage.artifact_count()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
        count_cell(total_failed, Color::Red).add_attribute(Attribute::Bold),
        Cell::new(total_artifacts).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    let problems = report.problems();
    if !problems.is_empty() {
        eprintln!("Problems:");
        for problem in problems {
            eprintln!("- {problem}");
        }
    }
}

fn status_cell(stage: &StageReport) -> Cell {
    if stage.error.is_some() {
        Cell::new("blocked").fg(Color::Red)
    } else if stage.count(TrialStatus::Failed) > 0 {
        Cell::new("partial").fg(Color::Yellow)
    } else {
        Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
