use std::rc::Rc;

use tracing::info;

use crate::db::Storage;
use crate::error::{DugsiError, Result};
use crate::models::{Exam, ExamResult};
use crate::store::{new_uuid, next_numeric_id, Collection, Subscribers};

pub const EXAMS_KEY: &str = "exams";
pub const RESULTS_KEY: &str = "results";

fn seed_exams() -> Vec<Exam> {
    vec![
        Exam {
            id: 1,
            name: "Term 1 Midterm".to_string(),
            date: "2025-03-15".to_string(),
            term: "Term 1".to_string(),
        },
        Exam {
            id: 2,
            name: "Term 1 Final".to_string(),
            date: "2025-06-20".to_string(),
            term: "Term 1".to_string(),
        },
    ]
}

/// Exam definitions plus the scores recorded against them.
pub struct ExamBook {
    exams: Collection<Exam>,
    results: Collection<ExamResult>,
}

impl ExamBook {
    pub fn load(storage: Rc<dyn Storage>, subscribers: Rc<Subscribers>) -> Result<Self> {
        let exams = Collection::load(EXAMS_KEY, storage.clone(), subscribers.clone(), seed_exams)?;
        let results = Collection::load(RESULTS_KEY, storage, subscribers, Vec::new)?;
        Ok(Self { exams, results })
    }

    pub fn exams(&self) -> &[Exam] {
        self.exams.items()
    }

    pub fn results(&self) -> &[ExamResult] {
        self.results.items()
    }

    pub fn find(&self, id: i64) -> Option<&Exam> {
        self.exams.items().iter().find(|e| e.id == id)
    }

    pub fn add_exam(&mut self, name: &str, date: &str, term: &str) -> Result<Exam> {
        let exam = Exam {
            id: next_numeric_id(self.exams.items().iter().map(|e| e.id)),
            name: name.to_string(),
            date: date.to_string(),
            term: term.to_string(),
        };
        let added = exam.clone();
        self.exams.update(|list| list.push(exam))?;
        info!(id = added.id, term = %added.term, "exam added");
        Ok(added)
    }

    /// Removes the exam and every result recorded for it.
    pub fn delete_exam(&mut self, id: i64) -> Result<Exam> {
        let removed = self.find(id).cloned().ok_or(DugsiError::UnknownExam(id))?;
        self.exams.update(|list| list.retain(|e| e.id != id))?;
        let dropped = self.results.update(|list| {
            let before = list.len();
            list.retain(|r| r.exam_id != id);
            before - list.len()
        })?;
        info!(id, dropped_results = dropped, "exam deleted");
        Ok(removed)
    }

    /// Replaces any earlier score for the same (exam, student, subject).
    /// The replacement is appended with a new id.
    pub fn record_grade(
        &mut self,
        exam_id: i64,
        student_id: &str,
        subject_id: i64,
        score: f64,
    ) -> Result<ExamResult> {
        let result = ExamResult {
            id: new_uuid(),
            exam_id,
            student_id: student_id.to_string(),
            subject_id,
            score,
        };
        let recorded = result.clone();
        self.results.update(|list| {
            list.retain(|r| {
                !(r.exam_id == exam_id && r.student_id == student_id && r.subject_id == subject_id)
            });
            list.push(result);
        })?;
        Ok(recorded)
    }

    pub fn get_grade(&self, exam_id: i64, student_id: &str, subject_id: i64) -> Option<f64> {
        self.results
            .items()
            .iter()
            .find(|r| r.exam_id == exam_id && r.student_id == student_id && r.subject_id == subject_id)
            .map(|r| r.score)
    }

    pub fn results_for_student(&self, student_id: &str) -> Vec<&ExamResult> {
        self.results
            .items()
            .iter()
            .filter(|r| r.student_id == student_id)
            .collect()
    }

    /// Distinct terms in exam order.
    pub fn terms(&self) -> Vec<String> {
        let mut terms: Vec<String> = Vec::new();
        for e in self.exams.items() {
            if !terms.contains(&e.term) {
                terms.push(e.term.clone());
            }
        }
        terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;

    fn book() -> ExamBook {
        ExamBook::load(Rc::new(MemoryStorage::default()), Rc::new(Subscribers::default())).unwrap()
    }

    #[test]
    fn test_nan_score_survives_reload() {
        let storage = Rc::new(MemoryStorage::default());
        let mut b = ExamBook::load(storage.clone(), Rc::new(Subscribers::default())).unwrap();
        b.record_grade(1, "2", 1, f64::NAN).unwrap();

        let b = ExamBook::load(storage, Rc::new(Subscribers::default())).unwrap();
        assert!(b.get_grade(1, "2", 1).unwrap().is_nan());
    }

    #[test]
    fn test_seed_exams() {
        let b = book();
        assert_eq!(b.exams().len(), 2);
        assert_eq!(b.terms(), vec!["Term 1"]);
        assert!(b.results().is_empty());
    }

    #[test]
    fn test_record_grade_replaces_with_new_id() {
        let mut b = book();
        let first = b.record_grade(1, "1", 1, 70.0).unwrap();
        b.record_grade(1, "1", 2, 55.0).unwrap();
        let second = b.record_grade(1, "1", 1, 85.0).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(b.results().len(), 2);
        assert_eq!(b.get_grade(1, "1", 1), Some(85.0));
        // replacement goes to the end
        assert_eq!(b.results().last().unwrap().id, second.id);
    }

    #[test]
    fn test_get_grade_missing() {
        let b = book();
        assert_eq!(b.get_grade(1, "1", 1), None);
    }

    #[test]
    fn test_delete_exam_drops_its_results() {
        let mut b = book();
        b.record_grade(1, "1", 1, 70.0).unwrap();
        b.record_grade(2, "1", 1, 80.0).unwrap();
        b.delete_exam(1).unwrap();
        assert!(b.find(1).is_none());
        assert_eq!(b.results().len(), 1);
        assert_eq!(b.results()[0].exam_id, 2);
        assert!(matches!(b.delete_exam(1), Err(DugsiError::UnknownExam(1))));
    }

    #[test]
    fn test_add_exam_gets_fresh_id() {
        let mut b = book();
        let e = b.add_exam("Term 2 Midterm", "2025-09-10", "Term 2").unwrap();
        assert!(e.id > 2);
        assert_eq!(b.terms(), vec!["Term 1", "Term 2"]);
    }

    #[test]
    fn test_results_for_student() {
        let mut b = book();
        b.record_grade(1, "1", 1, 70.0).unwrap();
        b.record_grade(1, "2", 1, 60.0).unwrap();
        assert_eq!(b.results_for_student("2").len(), 1);
    }
}
