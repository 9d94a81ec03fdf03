use std::rc::Rc;

use tracing::info;

use crate::db::Storage;
use crate::error::{DugsiError, Result};
use crate::models::{ScheduleEntry, Weekday, PERIODS};
use crate::store::{next_numeric_id, Collection, Subscribers};
use crate::subjects::SubjectCatalog;

pub const TIMETABLE_KEY: &str = "timetable";

fn seed_schedule() -> Vec<ScheduleEntry> {
    [
        (1, Weekday::Saturday, 1, "Math", "Mr. Abdi"),
        (2, Weekday::Saturday, 2, "Physics", "Mr. Hassan"),
        (3, Weekday::Sunday, 1, "English", "Ms. Sarah"),
    ]
    .into_iter()
    .map(|(id, day, period, subject, teacher)| ScheduleEntry {
        id,
        class_id: "Form 4".to_string(),
        day,
        period,
        subject: subject.to_string(),
        teacher: teacher.to_string(),
    })
    .collect()
}

#[derive(Debug, Clone)]
pub struct NewEntry {
    pub class_id: String,
    pub day: Weekday,
    pub period: u8,
    pub subject: String,
    pub teacher: String,
}

pub struct Timetable {
    entries: Collection<ScheduleEntry>,
}

impl Timetable {
    pub fn load(storage: Rc<dyn Storage>, subscribers: Rc<Subscribers>) -> Result<Self> {
        let entries = Collection::load(TIMETABLE_KEY, storage, subscribers, seed_schedule)?;
        Ok(Self { entries })
    }

    pub fn for_class(&self, class_id: &str) -> Vec<&ScheduleEntry> {
        self.entries
            .items()
            .iter()
            .filter(|e| e.class_id == class_id)
            .collect()
    }

    pub fn slot(&self, class_id: &str, day: Weekday, period: u8) -> Option<&ScheduleEntry> {
        self.entries
            .items()
            .iter()
            .find(|e| e.class_id == class_id && e.day == day && e.period == period)
    }

    /// The subject is stored under its catalog name.
    pub fn add(&mut self, new: NewEntry, classes: &[String], subjects: &SubjectCatalog) -> Result<ScheduleEntry> {
        if !classes.iter().any(|c| c == &new.class_id) {
            return Err(DugsiError::InvalidClass(new.class_id));
        }
        if !PERIODS.contains(&new.period) {
            return Err(DugsiError::InvalidPeriod(new.period));
        }
        let subject = subjects.resolve(&new.subject)?.name.clone();
        if let Some(taken) = self.slot(&new.class_id, new.day, new.period) {
            return Err(DugsiError::Other(format!(
                "{} period {} for {} is already {}",
                new.day, new.period, new.class_id, taken.subject
            )));
        }

        let entry = ScheduleEntry {
            id: next_numeric_id(self.entries.items().iter().map(|e| e.id)),
            class_id: new.class_id,
            day: new.day,
            period: new.period,
            subject,
            teacher: new.teacher,
        };
        let added = entry.clone();
        self.entries.update(|list| list.push(entry))?;
        info!(id = added.id, class = %added.class_id, day = %added.day, period = added.period, "timetable slot added");
        Ok(added)
    }

    pub fn remove(&mut self, id: i64) -> Result<ScheduleEntry> {
        let removed = self
            .entries
            .items()
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or_else(|| DugsiError::Other(format!("Unknown timetable entry: {id}")))?;
        self.entries.update(|list| list.retain(|e| e.id != id))?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;

    fn setup() -> (Timetable, SubjectCatalog) {
        let storage: Rc<dyn Storage> = Rc::new(MemoryStorage::default());
        let subs = Rc::new(Subscribers::default());
        (
            Timetable::load(storage.clone(), subs.clone()).unwrap(),
            SubjectCatalog::load(storage, subs).unwrap(),
        )
    }

    fn classes() -> Vec<String> {
        ["Form 1", "Form 2", "Form 3", "Form 4"].iter().map(|s| s.to_string()).collect()
    }

    fn entry(class: &str, day: Weekday, period: u8, subject: &str) -> NewEntry {
        NewEntry {
            class_id: class.to_string(),
            day,
            period,
            subject: subject.to_string(),
            teacher: "Mr. Ahmed".to_string(),
        }
    }

    #[test]
    fn test_seed_schedule() {
        let (t, _) = setup();
        assert_eq!(t.for_class("Form 4").len(), 3);
        assert!(t.for_class("Form 1").is_empty());
        assert_eq!(t.slot("Form 4", Weekday::Sunday, 1).unwrap().subject, "English");
    }

    #[test]
    fn test_add_resolves_subject_name() {
        let (mut t, subjects) = setup();
        let e = t.add(entry("Form 1", Weekday::Monday, 3, "sci"), &classes(), &subjects).unwrap();
        assert_eq!(e.subject, "Science");
        assert_eq!(t.for_class("Form 1").len(), 1);
    }

    #[test]
    fn test_add_validation() {
        let (mut t, subjects) = setup();
        let c = classes();
        assert!(matches!(
            t.add(entry("Form 9", Weekday::Monday, 1, "MATH"), &c, &subjects),
            Err(DugsiError::InvalidClass(_))
        ));
        assert!(matches!(
            t.add(entry("Form 1", Weekday::Monday, 8, "MATH"), &c, &subjects),
            Err(DugsiError::InvalidPeriod(8))
        ));
        assert!(matches!(
            t.add(entry("Form 1", Weekday::Monday, 0, "MATH"), &c, &subjects),
            Err(DugsiError::InvalidPeriod(0))
        ));
        assert!(matches!(
            t.add(entry("Form 1", Weekday::Monday, 1, "Physics"), &c, &subjects),
            Err(DugsiError::UnknownSubject(_))
        ));
        // slot already holds Math
        assert!(t.add(entry("Form 4", Weekday::Saturday, 1, "ENG"), &c, &subjects).is_err());
        assert_eq!(t.for_class("Form 4").len(), 3);
    }

    #[test]
    fn test_remove() {
        let (mut t, _) = setup();
        t.remove(2).unwrap();
        assert!(t.slot("Form 4", Weekday::Saturday, 2).is_none());
        assert!(t.remove(2).is_err());
    }
}
