use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::models::{Exam, ExamResult, Student, Subject};

/// Which students a term report covers. "All" is the sentinel for the
/// whole roster; anything else is matched against `Student::class_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassFilter {
    All,
    Class(String),
}

impl ClassFilter {
    pub fn parse(s: &str) -> Self {
        if s == "All" {
            ClassFilter::All
        } else {
            ClassFilter::Class(s.to_string())
        }
    }

    fn matches(&self, student: &Student) -> bool {
        match self {
            ClassFilter::All => true,
            ClassFilter::Class(c) => &student.class_id == c,
        }
    }

    pub fn label(&self) -> String {
        match self {
            ClassFilter::All => "All Classes".to_string(),
            ClassFilter::Class(c) => c.clone(),
        }
    }
}

impl fmt::Display for ClassFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassFilter::All => f.write_str("All"),
            ClassFilter::Class(c) => f.write_str(c),
        }
    }
}

/// Filter choices for a roster: the sentinel first, then each class.
pub fn class_options(classes: &[String]) -> Vec<String> {
    std::iter::once("All".to_string())
        .chain(classes.iter().cloned())
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubjectStat {
    pub subject_id: i64,
    /// Mean of the scores present for the term; `None` when there are none.
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentReport {
    pub student_id: String,
    pub full_name: String,
    pub class_id: String,
    pub subject_stats: Vec<SubjectStat>,
    /// Mean of the non-empty subject averages, or 0 when every subject is
    /// empty. Ranking uses this value.
    pub overall_average: f64,
    pub rank: usize,
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Term report ranked by overall average, highest first. Equal averages
/// keep roster order.
pub fn build_report(
    term: &str,
    filter: &ClassFilter,
    students: &[Student],
    exams: &[Exam],
    results: &[ExamResult],
    subjects: &[Subject],
) -> Vec<StudentReport> {
    let term_exams: Vec<&Exam> = exams.iter().filter(|e| e.term == term).collect();
    if term_exams.is_empty() {
        return Vec::new();
    }

    // first result wins if the store ever holds duplicates
    let mut scores: HashMap<(i64, &str, i64), f64> = HashMap::new();
    for r in results {
        scores
            .entry((r.exam_id, r.student_id.as_str(), r.subject_id))
            .or_insert(r.score);
    }

    let mut rows: Vec<StudentReport> = students
        .iter()
        .filter(|s| filter.matches(s))
        .map(|student| {
            let subject_stats: Vec<SubjectStat> = subjects
                .iter()
                .map(|subject| {
                    let found: Vec<f64> = term_exams
                        .iter()
                        .filter_map(|exam| {
                            scores
                                .get(&(exam.id, student.id.as_str(), subject.id))
                                .copied()
                        })
                        .collect();
                    SubjectStat {
                        subject_id: subject.id,
                        average: mean(&found),
                    }
                })
                .collect();

            let present: Vec<f64> = subject_stats.iter().filter_map(|s| s.average).collect();
            StudentReport {
                student_id: student.id.clone(),
                full_name: student.full_name.clone(),
                class_id: student.class_id.clone(),
                subject_stats,
                overall_average: mean(&present).unwrap_or(0.0),
                rank: 0,
            }
        })
        .collect();

    rows.sort_by(|a, b| {
        b.overall_average
            .partial_cmp(&a.overall_average)
            .unwrap_or(Ordering::Equal)
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

/// A/B/C/D/F on 90/80/70/60 cut-offs; no value (or NaN) is "-".
pub fn letter_grade(score: Option<f64>) -> &'static str {
    match score {
        None => "-",
        Some(s) if s.is_nan() => "-",
        Some(s) if s >= 90.0 => "A",
        Some(s) if s >= 80.0 => "B",
        Some(s) if s >= 70.0 => "C",
        Some(s) if s >= 60.0 => "D",
        Some(_) => "F",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub top_student: Option<String>,
    pub class_average: f64,
    pub total_students: usize,
}

pub fn summarize(report: &[StudentReport]) -> ReportSummary {
    let total: f64 = report.iter().map(|r| r.overall_average).sum();
    ReportSummary {
        top_student: report.first().map(|r| r.full_name.clone()),
        class_average: total / report.len().max(1) as f64,
        total_students: report.len(),
    }
}

// ---------------------------------------------------------------------------
// Tabular form shared by the terminal view and the exporters
// ---------------------------------------------------------------------------

pub struct ReportTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub fn tabulate(report: &[StudentReport], subjects: &[Subject]) -> ReportTable {
    let mut headers = vec!["Rank".to_string(), "Student Name".to_string()];
    headers.extend(subjects.iter().map(|s| s.code.clone()));
    headers.push("Total Avg".to_string());
    headers.push("Grade".to_string());

    let rows = report
        .iter()
        .map(|r| {
            let mut row = vec![r.rank.to_string(), r.full_name.clone()];
            row.extend(r.subject_stats.iter().map(|stat| match stat.average {
                Some(avg) => format!("{avg:.0}"),
                None => "-".to_string(),
            }));
            row.push(format!("{:.1}%", r.overall_average));
            row.push(letter_grade(Some(r.overall_average)).to_string());
            row
        })
        .collect();

    ReportTable { headers, rows }
}

/// `Report_<term>_<class>.<ext>`, with the first space of the term removed.
pub fn export_file_name(term: &str, filter: &ClassFilter, ext: &str) -> String {
    format!("Report_{}_{}.{ext}", term.replacen(' ', "", 1), filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Guardian, StudentStatus};

    fn student(id: &str, name: &str, class: &str) -> Student {
        Student {
            id: id.to_string(),
            full_name: name.to_string(),
            class_id: class.to_string(),
            guardian: Guardian {
                name: "G".into(),
                phone: "0".into(),
                relationship: "Mother".into(),
            },
            enrollment_date: "2025-01-01T00:00:00+00:00".into(),
            status: StudentStatus::Active,
        }
    }

    fn exam(id: i64, term: &str) -> Exam {
        Exam {
            id,
            name: format!("Exam {id}"),
            date: "2025-03-01".into(),
            term: term.to_string(),
        }
    }

    fn subject(id: i64, code: &str) -> Subject {
        Subject {
            id,
            name: code.to_string(),
            code: code.to_string(),
            teacher: "T".into(),
        }
    }

    fn result(exam_id: i64, student_id: &str, subject_id: i64, score: f64) -> ExamResult {
        ExamResult {
            id: format!("{exam_id}-{student_id}-{subject_id}"),
            exam_id,
            student_id: student_id.to_string(),
            subject_id,
            score,
        }
    }

    #[test]
    fn test_no_exams_for_term_gives_empty_report() {
        let students = vec![student("1", "A", "C1")];
        let exams = vec![exam(1, "Term 1")];
        let subjects = vec![subject(1, "MATH")];
        let report = build_report("Term 2", &ClassFilter::All, &students, &exams, &[], &subjects);
        assert!(report.is_empty());
    }

    #[test]
    fn test_student_without_results_has_zero_overall_and_null_subjects() {
        let students = vec![student("1", "A", "C1")];
        let exams = vec![exam(1, "Term 1")];
        let subjects = vec![subject(1, "MATH"), subject(2, "ENG")];
        let report = build_report("Term 1", &ClassFilter::All, &students, &exams, &[], &subjects);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].overall_average, 0.0);
        assert!(report[0].subject_stats.iter().all(|s| s.average.is_none()));
        assert_eq!(report[0].rank, 1);
    }

    #[test]
    fn test_missing_scores_are_excluded_not_zero() {
        let students = vec![student("1", "A", "C1")];
        let exams = vec![exam(1, "Term 1"), exam(2, "Term 1"), exam(3, "Term 2")];
        let subjects = vec![subject(1, "MATH"), subject(2, "ENG")];
        let results = vec![
            result(1, "1", 1, 80.0),
            result(2, "1", 1, 90.0),
            result(3, "1", 1, 10.0), // other term
            result(2, "1", 2, 60.0),
        ];
        let report = build_report("Term 1", &ClassFilter::All, &students, &exams, &results, &subjects);
        assert_eq!(report[0].subject_stats[0].average, Some(85.0));
        assert_eq!(report[0].subject_stats[1].average, Some(60.0));
        assert_eq!(report[0].overall_average, 72.5);
    }

    #[test]
    fn test_ranking_is_stable_for_ties() {
        let students = vec![
            student("a", "First Ninety", "C1"),
            student("b", "Seventy", "C1"),
            student("c", "Second Ninety", "C1"),
        ];
        let exams = vec![exam(1, "Term 1")];
        let subjects = vec![subject(1, "MATH")];
        let results = vec![
            result(1, "a", 1, 90.0),
            result(1, "b", 1, 70.0),
            result(1, "c", 1, 90.0),
        ];
        let report = build_report("Term 1", &ClassFilter::All, &students, &exams, &results, &subjects);
        let order: Vec<&str> = report.iter().map(|r| r.student_id.as_str()).collect();
        assert_eq!(order, vec!["a", "c", "b"]);
        let ranks: Vec<usize> = report.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_class_filter() {
        let students = vec![student("1", "A", "C1"), student("2", "B", "C2")];
        let exams = vec![exam(1, "Term 1")];
        let subjects = vec![subject(1, "MATH")];
        let filter = ClassFilter::parse("C2");
        let report = build_report("Term 1", &filter, &students, &exams, &[], &subjects);
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].student_id, "2");
        assert_eq!(ClassFilter::parse("All"), ClassFilter::All);
    }

    #[test]
    fn test_subject_catalog_drives_columns() {
        let students = vec![student("1", "A", "C1")];
        let exams = vec![exam(1, "Term 1")];
        let subjects = vec![subject(1, "MATH"), subject(2, "ENG"), subject(3, "SCI")];
        let results = vec![result(1, "1", 2, 75.0), result(1, "1", 99, 10.0)];
        let report = build_report("Term 1", &ClassFilter::All, &students, &exams, &results, &subjects);
        assert_eq!(report[0].subject_stats.len(), 3);
        assert_eq!(report[0].overall_average, 75.0);
    }

    #[test]
    fn test_letter_grades() {
        assert_eq!(letter_grade(Some(95.0)), "A");
        assert_eq!(letter_grade(Some(90.0)), "A");
        assert_eq!(letter_grade(Some(89.9)), "B");
        assert_eq!(letter_grade(Some(70.0)), "C");
        assert_eq!(letter_grade(Some(60.0)), "D");
        assert_eq!(letter_grade(Some(59.9)), "F");
        assert_eq!(letter_grade(Some(0.0)), "F");
        assert_eq!(letter_grade(None), "-");
        assert_eq!(letter_grade(Some(f64::NAN)), "-");
    }

    #[test]
    fn test_summary() {
        let empty = summarize(&[]);
        assert_eq!(empty.top_student, None);
        assert_eq!(empty.class_average, 0.0);

        let students = vec![student("1", "A", "C1"), student("2", "B", "C1")];
        let exams = vec![exam(1, "Term 1")];
        let subjects = vec![subject(1, "MATH")];
        let results = vec![result(1, "1", 1, 50.0), result(1, "2", 1, 100.0)];
        let report = build_report("Term 1", &ClassFilter::All, &students, &exams, &results, &subjects);
        let summary = summarize(&report);
        assert_eq!(summary.top_student.as_deref(), Some("B"));
        assert_eq!(summary.class_average, 75.0);
        assert_eq!(summary.total_students, 2);
    }

    #[test]
    fn test_tabulate_formats_cells() {
        let students = vec![student("1", "A", "C1")];
        let exams = vec![exam(1, "Term 1")];
        let subjects = vec![subject(1, "MATH"), subject(2, "ENG")];
        let results = vec![result(1, "1", 1, 84.0)];
        let report = build_report("Term 1", &ClassFilter::All, &students, &exams, &results, &subjects);
        let table = tabulate(&report, &subjects);
        assert_eq!(table.headers, vec!["Rank", "Student Name", "MATH", "ENG", "Total Avg", "Grade"]);
        assert_eq!(table.rows[0], vec!["1", "A", "84", "-", "84.0%", "B"]);
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(export_file_name("Term 1", &ClassFilter::All, "pdf"), "Report_Term1_All.pdf");
        assert_eq!(
            export_file_name("Term 1 Extra", &ClassFilter::parse("Class 1A"), "csv"),
            "Report_Term1 Extra_Class 1A.csv"
        );
    }

    #[test]
    fn test_class_options() {
        let opts = class_options(&["C1".to_string(), "C2".to_string()]);
        assert_eq!(opts, vec!["All", "C1", "C2"]);
    }
}
