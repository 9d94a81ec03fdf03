use std::rc::Rc;

use crate::db::Storage;
use crate::error::{DugsiError, Result};
use crate::models::Subject;
use crate::store::{next_numeric_id, Collection, Subscribers};

pub const SUBJECTS_KEY: &str = "subjects";

fn seed_subjects() -> Vec<Subject> {
    [
        (1, "Mathematics", "MATH", "Mr. Ahmed"),
        (2, "Somali", "SOM", "Ms. Fadumo"),
        (3, "English", "ENG", "Mr. James"),
        (4, "Science", "SCI", "Dr. Hassan"),
        (5, "Islamic Studies", "ISL", "Sh. Mohamed"),
    ]
    .into_iter()
    .map(|(id, name, code, teacher)| Subject {
        id,
        name: name.to_string(),
        code: code.to_string(),
        teacher: teacher.to_string(),
    })
    .collect()
}

#[derive(Debug, Clone, Default)]
pub struct SubjectUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub teacher: Option<String>,
}

pub struct SubjectCatalog {
    subjects: Collection<Subject>,
}

impl SubjectCatalog {
    pub fn load(storage: Rc<dyn Storage>, subscribers: Rc<Subscribers>) -> Result<Self> {
        let subjects = Collection::load(SUBJECTS_KEY, storage, subscribers, seed_subjects)?;
        Ok(Self { subjects })
    }

    pub fn all(&self) -> &[Subject] {
        self.subjects.items()
    }

    pub fn find(&self, id: i64) -> Option<&Subject> {
        self.subjects.items().iter().find(|s| s.id == id)
    }

    /// Lookup by id, name or code (name and code case-insensitive).
    pub fn resolve(&self, key: &str) -> Result<&Subject> {
        let key = key.trim();
        if let Ok(id) = key.parse::<i64>() {
            if let Some(s) = self.find(id) {
                return Ok(s);
            }
        }
        self.subjects
            .items()
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(key) || s.code.eq_ignore_ascii_case(key))
            .ok_or_else(|| DugsiError::UnknownSubject(key.to_string()))
    }

    pub fn add(&mut self, name: &str, code: &str, teacher: &str) -> Result<Subject> {
        let subject = Subject {
            id: next_numeric_id(self.subjects.items().iter().map(|s| s.id)),
            name: name.to_string(),
            code: code.to_string(),
            teacher: teacher.to_string(),
        };
        let added = subject.clone();
        self.subjects.update(|list| list.push(subject))?;
        Ok(added)
    }

    pub fn update(&mut self, id: i64, update: SubjectUpdate) -> Result<Subject> {
        let idx = self
            .subjects
            .items()
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| DugsiError::UnknownSubject(id.to_string()))?;
        self.subjects.update(|list| {
            let s = &mut list[idx];
            if let Some(v) = update.name {
                s.name = v;
            }
            if let Some(v) = update.code {
                s.code = v;
            }
            if let Some(v) = update.teacher {
                s.teacher = v;
            }
            s.clone()
        })
    }

    /// Results recorded against the subject stay in the result store.
    pub fn delete(&mut self, id: i64) -> Result<Subject> {
        let removed = self
            .find(id)
            .cloned()
            .ok_or_else(|| DugsiError::UnknownSubject(id.to_string()))?;
        self.subjects.update(|list| list.retain(|s| s.id != id))?;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;

    fn catalog() -> SubjectCatalog {
        SubjectCatalog::load(Rc::new(MemoryStorage::default()), Rc::new(Subscribers::default())).unwrap()
    }

    #[test]
    fn test_seed_catalog() {
        let c = catalog();
        let codes: Vec<&str> = c.all().iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["MATH", "SOM", "ENG", "SCI", "ISL"]);
    }

    #[test]
    fn test_resolve_by_id_name_or_code() {
        let c = catalog();
        assert_eq!(c.resolve("3").unwrap().code, "ENG");
        assert_eq!(c.resolve("science").unwrap().id, 4);
        assert_eq!(c.resolve("isl").unwrap().id, 5);
        assert!(matches!(c.resolve("Physics"), Err(DugsiError::UnknownSubject(_))));
    }

    #[test]
    fn test_add_update_delete() {
        let mut c = catalog();
        let s = c.add("Arabic", "ARB", "Ust. Yusuf").unwrap();
        assert!(s.id > 5);
        let s = c
            .update(s.id, SubjectUpdate { teacher: Some("Ust. Ali".into()), ..Default::default() })
            .unwrap();
        assert_eq!(s.teacher, "Ust. Ali");
        assert_eq!(s.code, "ARB");
        c.delete(s.id).unwrap();
        assert_eq!(c.all().len(), 5);
        assert!(c.delete(s.id).is_err());
    }
}
