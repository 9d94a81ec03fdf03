use std::rc::Rc;

use tracing::info;

use crate::db::Storage;
use crate::error::{DugsiError, Result};
use crate::models::{Guardian, Student, StudentStatus};
use crate::store::{new_uuid, Collection, Subscribers};

pub const STUDENTS_KEY: &str = "students";

fn seed_students() -> Vec<Student> {
    let now = chrono::Utc::now().to_rfc3339();
    let student = |id: &str, name: &str, class: &str, status, guardian: (&str, &str, &str)| Student {
        id: id.to_string(),
        full_name: name.to_string(),
        class_id: class.to_string(),
        guardian: Guardian {
            name: guardian.0.to_string(),
            phone: guardian.1.to_string(),
            relationship: guardian.2.to_string(),
        },
        enrollment_date: now.clone(),
        status,
    };
    vec![
        student("1", "Hamza Abdi", "Class 1A", StudentStatus::Active, ("Omar Abdi", "+252615000000", "Father")),
        student("2", "Amina Farah", "Class 2A", StudentStatus::Active, ("Halima", "+252615111111", "Mother")),
        student("3", "Khalid Hassan", "Class 1B", StudentStatus::Suspended, ("Hassan", "+252615222222", "Father")),
    ]
}

/// Fields supplied when registering a student.
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub full_name: String,
    pub class_id: String,
    pub guardian: Guardian,
}

#[derive(Debug, Clone, Default)]
pub struct StudentUpdate {
    pub full_name: Option<String>,
    pub class_id: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_relationship: Option<String>,
    pub status: Option<StudentStatus>,
}

pub struct StudentRegistry {
    students: Collection<Student>,
}

impl StudentRegistry {
    pub fn load(storage: Rc<dyn Storage>, subscribers: Rc<Subscribers>) -> Result<Self> {
        let students = Collection::load(STUDENTS_KEY, storage, subscribers, seed_students)?;
        Ok(Self { students })
    }

    pub fn all(&self) -> &[Student] {
        self.students.items()
    }

    pub fn find(&self, id: &str) -> Option<&Student> {
        self.students.items().iter().find(|s| s.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&Student> {
        self.find(id).ok_or_else(|| DugsiError::UnknownStudent(id.to_string()))
    }

    /// Case-insensitive name match, or a substring of the guardian's phone.
    pub fn search(&self, term: &str) -> Vec<&Student> {
        let needle = term.to_lowercase();
        self.students
            .items()
            .iter()
            .filter(|s| s.full_name.to_lowercase().contains(&needle) || s.guardian.phone.contains(term))
            .collect()
    }

    pub fn in_class<'a>(&'a self, class_id: &'a str) -> impl Iterator<Item = &'a Student> + 'a {
        self.students.items().iter().filter(move |s| s.class_id == class_id)
    }

    /// Newest registrations go to the front of the roster.
    pub fn add(&mut self, new: NewStudent) -> Result<Student> {
        let student = Student {
            id: new_uuid(),
            full_name: new.full_name,
            class_id: new.class_id,
            guardian: new.guardian,
            enrollment_date: chrono::Utc::now().to_rfc3339(),
            status: StudentStatus::Active,
        };
        let added = student.clone();
        self.students.update(|list| list.insert(0, student))?;
        info!(id = %added.id, name = %added.full_name, "student registered");
        Ok(added)
    }

    pub fn update(&mut self, id: &str, update: StudentUpdate) -> Result<Student> {
        let idx = self
            .students
            .items()
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| DugsiError::UnknownStudent(id.to_string()))?;
        let updated = self.students.update(|list| {
            let s = &mut list[idx];
            if let Some(v) = update.full_name {
                s.full_name = v;
            }
            if let Some(v) = update.class_id {
                s.class_id = v;
            }
            if let Some(v) = update.guardian_name {
                s.guardian.name = v;
            }
            if let Some(v) = update.guardian_phone {
                s.guardian.phone = v;
            }
            if let Some(v) = update.guardian_relationship {
                s.guardian.relationship = v;
            }
            if let Some(v) = update.status {
                s.status = v;
            }
            s.clone()
        })?;
        Ok(updated)
    }

    /// Fee, attendance and result rows that point at the student are kept.
    pub fn delete(&mut self, id: &str) -> Result<Student> {
        let removed = self.require(id)?.clone();
        self.students.update(|list| list.retain(|s| s.id != id))?;
        info!(id, "student deleted");
        Ok(removed)
    }

    /// Distinct non-empty class ids, sorted.
    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self
            .students
            .items()
            .iter()
            .map(|s| s.class_id.clone())
            .filter(|c| !c.is_empty())
            .collect();
        classes.sort();
        classes.dedup();
        classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;

    fn registry() -> StudentRegistry {
        StudentRegistry::load(Rc::new(MemoryStorage::default()), Rc::new(Subscribers::default())).unwrap()
    }

    fn new_student(name: &str, class: &str) -> NewStudent {
        NewStudent {
            full_name: name.to_string(),
            class_id: class.to_string(),
            guardian: Guardian {
                name: "Guardian".into(),
                phone: "+252610000001".into(),
                relationship: "Mother".into(),
            },
        }
    }

    #[test]
    fn test_seed_roster() {
        let reg = registry();
        assert_eq!(reg.all().len(), 3);
        let active = reg.all().iter().filter(|s| s.status == StudentStatus::Active).count();
        assert_eq!(active, 2);
        assert_eq!(reg.find("3").unwrap().status, StudentStatus::Suspended);
    }

    #[test]
    fn test_add_prepends_active_student() {
        let mut reg = registry();
        let s = reg.add(new_student("Sahra Ali", "Class 1A")).unwrap();
        assert_eq!(reg.all()[0].id, s.id);
        assert_eq!(s.status, StudentStatus::Active);
        assert!(chrono::DateTime::parse_from_rfc3339(&s.enrollment_date).is_ok());
        assert_eq!(reg.all().len(), 4);
    }

    #[test]
    fn test_update_is_partial() {
        let mut reg = registry();
        let s = reg
            .update("2", StudentUpdate { class_id: Some("Class 3A".into()), ..Default::default() })
            .unwrap();
        assert_eq!(s.class_id, "Class 3A");
        assert_eq!(s.full_name, "Amina Farah");
        assert_eq!(s.guardian.name, "Halima");
    }

    #[test]
    fn test_update_unknown_student() {
        let mut reg = registry();
        assert!(matches!(
            reg.update("nope", StudentUpdate::default()),
            Err(DugsiError::UnknownStudent(_))
        ));
    }

    #[test]
    fn test_delete_removes_only_that_student() {
        let mut reg = registry();
        reg.delete("1").unwrap();
        assert!(reg.find("1").is_none());
        assert_eq!(reg.all().len(), 2);
    }

    #[test]
    fn test_search_by_name_or_phone() {
        let reg = registry();
        assert_eq!(reg.search("amina").len(), 1);
        assert_eq!(reg.search("615222").len(), 1);
        assert_eq!(reg.search("+2526").len(), 3);
        assert!(reg.search("zzz").is_empty());
    }

    #[test]
    fn test_classes_sorted_unique() {
        let mut reg = registry();
        reg.add(new_student("Sahra Ali", "Class 1A")).unwrap();
        assert_eq!(reg.classes(), vec!["Class 1A", "Class 1B", "Class 2A"]);
        assert_eq!(reg.in_class("Class 1A").count(), 2);
    }
}
