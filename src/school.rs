use std::path::Path;
use std::rc::Rc;

use tracing::debug;

use crate::attendance::AttendanceLog;
use crate::auth::Session;
use crate::db::{SqliteStorage, Storage, DB_FILE};
use crate::error::{DugsiError, Result};
use crate::exams::ExamBook;
use crate::fees::FeeLedger;
use crate::homework::HomeworkBoard;
use crate::messages::MessageLog;
use crate::settings::Settings;
use crate::store::{Change, Subscribers};
use crate::students::StudentRegistry;
use crate::subjects::SubjectCatalog;
use crate::timetable::Timetable;

/// Every store, loaded from one storage backend and sharing one set of
/// change subscribers.
pub struct School {
    pub students: StudentRegistry,
    pub fees: FeeLedger,
    pub attendance: AttendanceLog,
    pub exams: ExamBook,
    pub subjects: SubjectCatalog,
    pub homework: HomeworkBoard,
    pub messages: MessageLog,
    pub timetable: Timetable,
    pub session: Session,
    subscribers: Rc<Subscribers>,
}

impl School {
    pub fn open(storage: Rc<dyn Storage>) -> Result<Self> {
        let subscribers = Rc::new(Subscribers::default());
        Ok(Self {
            students: StudentRegistry::load(storage.clone(), subscribers.clone())?,
            fees: FeeLedger::load(storage.clone(), subscribers.clone())?,
            attendance: AttendanceLog::load(storage.clone(), subscribers.clone())?,
            exams: ExamBook::load(storage.clone(), subscribers.clone())?,
            subjects: SubjectCatalog::load(storage.clone(), subscribers.clone())?,
            homework: HomeworkBoard::load(storage.clone(), subscribers.clone())?,
            messages: MessageLog::load(storage.clone(), subscribers.clone())?,
            timetable: Timetable::load(storage.clone(), subscribers.clone())?,
            session: Session::new(storage),
            subscribers,
        })
    }

    pub fn subscribe(&self, listener: impl Fn(&Change) + 'static) {
        self.subscribers.subscribe(listener);
    }

    /// Configured classes plus any class already on the roster, sorted.
    pub fn known_classes(&self, settings: &Settings) -> Vec<String> {
        let mut classes = settings.classes.clone();
        classes.extend(self.students.classes());
        classes.sort();
        classes.dedup();
        classes
    }
}

/// Open the database under `data_dir`. Fails if `dugsi init` has not
/// created it yet.
pub fn open_storage(data_dir: &Path) -> Result<Rc<SqliteStorage>> {
    let db_path = data_dir.join(DB_FILE);
    if !db_path.exists() {
        return Err(DugsiError::Other(format!(
            "No database at {}. Run `dugsi init` first.",
            db_path.display()
        )));
    }
    Ok(Rc::new(SqliteStorage::open(&db_path)?))
}

pub fn open_school(data_dir: &Path) -> Result<School> {
    let school = School::open(open_storage(data_dir)?)?;
    school.subscribe(|change| debug!(key = change.key, len = change.len, "collection changed"));
    Ok(school)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;
    use crate::students::{STUDENTS_KEY, NewStudent};
    use crate::models::Guardian;
    use std::cell::RefCell;

    #[test]
    fn test_open_seeds_every_collection() {
        let storage = Rc::new(MemoryStorage::default());
        let school = School::open(storage.clone()).unwrap();
        for key in ["students", "fees", "attendance", "exams", "results", "subjects", "homework", "messages", "timetable"] {
            assert!(storage.contains(key), "missing {key}");
        }
        assert!(!storage.contains("user"));
        assert_eq!(school.students.all().len(), 3);
    }

    #[test]
    fn test_subscribers_see_mutations() {
        let school_storage = Rc::new(MemoryStorage::default());
        let mut school = School::open(school_storage).unwrap();
        let seen: Rc<RefCell<Vec<Change>>> = Rc::default();
        let sink = seen.clone();
        school.subscribe(move |c| sink.borrow_mut().push(c.clone()));

        school
            .students
            .add(NewStudent {
                full_name: "Sahra Ali".into(),
                class_id: "Class 1A".into(),
                guardian: Guardian {
                    name: "Ali".into(),
                    phone: "+252610000009".into(),
                    relationship: "Father".into(),
                },
            })
            .unwrap();
        school.fees.record_payment("1", "2025-01", 15.0, "Cash", "").unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], Change { key: STUDENTS_KEY, len: 4 });
        assert_eq!(seen[1].key, "fees");
    }

    #[test]
    fn test_reopen_reads_persisted_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DB_FILE);
        {
            let mut school = School::open(Rc::new(SqliteStorage::open(&path).unwrap())).unwrap();
            school.fees.record_payment("2", "2025-03", 10.0, "Cash", "r1").unwrap();
            school.students.delete("3").unwrap();
        }
        let school = open_school(dir.path()).unwrap();
        assert_eq!(school.fees.find("2", "2025-03").unwrap().amount_paid, 10.0);
        assert_eq!(school.students.all().len(), 2);
    }

    #[test]
    fn test_open_school_requires_init() {
        let dir = tempfile::tempdir().unwrap();
        assert!(open_school(dir.path()).is_err());
    }

    #[test]
    fn test_known_classes_merges_roster() {
        let school = School::open(Rc::new(MemoryStorage::default())).unwrap();
        let classes = school.known_classes(&Settings::default());
        assert!(classes.contains(&"Form 4".to_string()));
        assert!(classes.contains(&"Class 2A".to_string()));
    }
}
