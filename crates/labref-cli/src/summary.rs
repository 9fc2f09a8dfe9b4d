use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use labref_kb::{KbStats, LabelCount};
use labref_model::{
    AnalysisReport, Classification, ClassifiedResult, ConfidenceLevel, RangeFilter,
};

use crate::types::{LookupRow, VerifyResult};

pub fn print_analysis(report: &AnalysisReport) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Observed"),
        header_cell("Test"),
        header_cell("Value"),
        header_cell("Unit"),
        header_cell("Reference"),
        header_cell("Status"),
        header_cell("Quality"),
        header_cell("Source"),
        header_cell("Notes"),
    ]);
    apply_results_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Center);
    align_column(&mut table, 6, CellAlignment::Right);
    for result in &report.results {
        table.add_row(vec![
            Cell::new(&result.observation.raw_test_name),
            optional_cell(result.canonical_name.as_deref()),
            Cell::new(result.observation.value.to_string()),
            unit_cell(result),
            reference_cell(&result.reference_range),
            classification_cell(result.classification),
            quality_cell(result.quality_score),
            optional_cell(result.source_name.as_deref()),
            notes_cell(result),
        ]);
    }
    println!("{table}");

    let confidence = &report.confidence;
    let counts = &report.counts;
    let mut totals = Table::new();
    totals.set_header(vec![
        header_cell("Confidence"),
        header_cell("Level"),
        header_cell("Matched"),
        header_cell("Low"),
        header_cell("Normal"),
        header_cell("High"),
        header_cell("Unknown"),
    ]);
    apply_table_style(&mut totals);
    for index in [0, 2, 3, 4, 5, 6] {
        align_column(&mut totals, index, CellAlignment::Right);
    }
    totals.add_row(vec![
        Cell::new(format!("{:.2}", confidence.aggregate_confidence))
            .add_attribute(Attribute::Bold),
        level_cell(confidence.level),
        Cell::new(format!(
            "{}/{}",
            confidence.matched_count, confidence.total_count
        )),
        count_cell(counts.low, Color::Blue),
        count_cell(counts.normal, Color::Green),
        count_cell(counts.high, Color::Red),
        count_cell(counts.unknown, Color::Yellow),
    ]);
    println!("{totals}");
    println!("{}: {}", confidence.source, confidence.level.description());
}

pub fn print_verify(result: &VerifyResult) {
    println!("Snapshot: {}", result.path.display());
    println!("SHA-256: {}", result.sha256);
    let counts = result.counts;
    println!(
        "Rows: {} tests, {} sources, {} ranges, {} synonyms",
        counts.tests, counts.sources, counts.ranges, counts.synonyms
    );
    if result.is_clean() {
        println!("No integrity violations.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Violation")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, violation) in result.violations.iter().enumerate() {
        table.add_row(vec![
            dim_cell(index + 1),
            Cell::new(violation.to_string()).fg(Color::Red),
        ]);
    }
    println!("{table}");
    eprintln!("{} integrity violation(s) found", result.violations.len());
}

pub fn print_stats(stats: &KbStats) {
    let totals = stats.totals;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Value")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("Tests"), Cell::new(totals.tests)]);
    table.add_row(vec![Cell::new("Sources"), Cell::new(totals.sources)]);
    table.add_row(vec![Cell::new("Reference ranges"), Cell::new(totals.ranges)]);
    table.add_row(vec![Cell::new("Synonyms"), Cell::new(totals.synonyms)]);
    table.add_row(vec![
        Cell::new("Synonyms per test"),
        Cell::new(format!("{:.2}", stats.avg_synonyms_per_test)),
    ]);
    table.add_row(vec![
        Cell::new("LOINC coverage"),
        Cell::new(format!(
            "{} ({:.1}%)",
            stats.tests_with_loinc, stats.loinc_coverage_pct
        )),
    ]);
    println!("{table}");

    print_breakdown("Category", &stats.tests_by_category);
    print_breakdown("Panel", &stats.tests_by_panel);
    print_breakdown("Specimen", &stats.tests_by_specimen);
    print_breakdown("Source type", &stats.sources_by_type);
    print_breakdown("Range sex", &stats.ranges_by_sex);
    print_breakdown("Source (ranges)", &stats.top_sources);
}

fn print_breakdown(label: &str, counts: &[LabelCount]) {
    if counts.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell(label), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for entry in counts {
        table.add_row(vec![Cell::new(&entry.label), Cell::new(entry.count)]);
    }
    println!("{table}");
}

pub fn print_lookup(rows: &[LookupRow]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Name"),
        header_cell("Tier"),
        header_cell("Test"),
        header_cell("Suggestions"),
    ]);
    apply_table_style(&mut table);
    for row in rows {
        let tier = if row.name_match.is_matched() {
            Cell::new(row.name_match.tier).fg(Color::Green)
        } else {
            Cell::new(row.name_match.tier).fg(Color::Yellow)
        };
        let suggestions = if row.suggestions.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(
                row.suggestions
                    .iter()
                    .map(|suggestion| {
                        format!(
                            "{} via '{}' ({:.2})",
                            suggestion.canonical_name, suggestion.matched_name, suggestion.score
                        )
                    })
                    .collect::<Vec<_>>()
                    .join("\n"),
            )
        };
        table.add_row(vec![
            Cell::new(&row.raw_name),
            tier,
            optional_cell(row.canonical_name.as_deref()),
            suggestions,
        ]);
    }
    println!("{table}");
}

fn classification_cell(classification: Classification) -> Cell {
    let cell = Cell::new(classification);
    match classification {
        Classification::Low => cell.fg(Color::Blue).add_attribute(Attribute::Bold),
        Classification::High => cell.fg(Color::Red).add_attribute(Attribute::Bold),
        Classification::Normal => cell.fg(Color::Green),
        Classification::Unknown => cell.fg(Color::DarkGrey),
    }
}

fn level_cell(level: ConfidenceLevel) -> Cell {
    let color = match level {
        ConfidenceLevel::High => Color::Green,
        ConfidenceLevel::Medium => Color::Yellow,
        ConfidenceLevel::Low => Color::Red,
    };
    Cell::new(level).fg(color).add_attribute(Attribute::Bold)
}

fn quality_cell(score: Option<f64>) -> Cell {
    match score {
        Some(score) => Cell::new(format!("{score:.2}")),
        None => dim_cell("-"),
    }
}

fn unit_cell(result: &ClassifiedResult) -> Cell {
    if result.unit_mismatch {
        Cell::new(&result.observation.unit).fg(Color::Yellow)
    } else {
        Cell::new(&result.observation.unit)
    }
}

fn reference_cell(reference: &str) -> Cell {
    if reference == "N/A" {
        dim_cell(reference)
    } else {
        Cell::new(reference)
    }
}

fn notes_cell(result: &ClassifiedResult) -> Cell {
    let mut notes = Vec::new();
    if let Some(issue) = &result.issue {
        notes.push(issue.to_string());
    }
    if result.unit_mismatch {
        notes.push("unit differs from reference".to_string());
    }
    if !result.loosened_filters.is_empty() {
        let filters: Vec<&str> = result
            .loosened_filters
            .iter()
            .map(RangeFilter::as_str)
            .collect();
        notes.push(format!("loosened: {}", filters.join(", ")));
    }
    if let Some(suggestion) = &result.suggestion {
        notes.push(format!("did you mean '{suggestion}'?"));
    }
    if notes.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(notes.join("\n"))
    }
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
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
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn apply_results_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(165);
    if table.column_count() >= 9 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(15)),
            ColumnConstraint::UpperBoundary(Width::Percentage(15)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::UpperBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(12)),
            ColumnConstraint::LowerBoundary(Width::Fixed(8)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::UpperBoundary(Width::Percentage(20)),
            ColumnConstraint::UpperBoundary(Width::Percentage(30)),
        ]);
    }
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
