pub mod text;

use std::path::PathBuf;

use crate::auth::View;
use crate::cli::export::{default_path, report_csv, write_file};
use crate::cli::{open_for, ExportFormat};
use crate::error::Result;
use crate::reports::{self, build_report, class_options, export_file_name, summarize, tabulate, ClassFilter};
use crate::school::School;
use crate::settings::load_settings;

struct Prepared {
    title: String,
    class_label: String,
    table: reports::ReportTable,
    summary: reports::ReportSummary,
}

fn prepare(school: &School, term: &str, filter: &ClassFilter) -> Prepared {
    let report = build_report(
        term,
        filter,
        school.students.all(),
        school.exams.exams(),
        school.exams.results(),
        school.subjects.all(),
    );
    Prepared {
        title: format!("{term} - {}", filter.label()),
        class_label: filter.label(),
        table: tabulate(&report, school.subjects.all()),
        summary: summarize(&report),
    }
}

pub fn view(term: &str, class: &str) -> Result<()> {
    let (school, _) = open_for(View::Reports)?;
    let filter = ClassFilter::parse(class);
    let p = prepare(&school, term, &filter);
    let settings = load_settings();
    let body = text::format_report(&p.title, &p.table, &p.summary, true);
    println!("{}", text::with_header(&settings.school_name, body));

    let terms = school.exams.terms();
    if !terms.iter().any(|t| t == term) && !terms.is_empty() {
        println!("Known terms: {}", terms.join(", "));
    }
    if let ClassFilter::Class(c) = &filter {
        let classes = school.students.classes();
        if !classes.contains(c) {
            println!("Classes: {}", class_options(&classes).join(", "));
        }
    }
    Ok(())
}

pub fn export(term: &str, class: &str, format: ExportFormat, output: Option<String>) -> Result<()> {
    let (school, _) = open_for(View::Reports)?;
    let filter = ClassFilter::parse(class);
    let p = prepare(&school, term, &filter);
    let settings = load_settings();

    let bytes = match format {
        ExportFormat::Csv => report_csv(&p.table)?,
        ExportFormat::Text => {
            let body = text::format_report(&p.title, &p.table, &p.summary, false);
            format!("{}\n", text::with_header(&settings.school_name, body)).into_bytes()
        }
        ExportFormat::Pdf => render_pdf(&p, &settings, term)?,
    };

    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&export_file_name(term, &filter, format.extension())));
    write_file(&bytes, &path)?;
    Ok(())
}

#[cfg(feature = "pdf")]
fn render_pdf(p: &Prepared, settings: &crate::settings::Settings, term: &str) -> Result<Vec<u8>> {
    crate::pdf::render_report(&p.table, settings, term, &p.class_label)
}

#[cfg(not(feature = "pdf"))]
fn render_pdf(_p: &Prepared, _settings: &crate::settings::Settings, _term: &str) -> Result<Vec<u8>> {
    Err(crate::error::DugsiError::Pdf(
        "this build has no PDF support (rebuild with --features pdf)".to_string(),
    ))
}
