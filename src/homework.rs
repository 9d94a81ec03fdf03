use std::rc::Rc;

use tracing::info;

use crate::db::Storage;
use crate::error::{DugsiError, Result};
use crate::models::{Assignment, AssignmentStatus};
use crate::store::{next_numeric_id, Collection, Subscribers};

pub const HOMEWORK_KEY: &str = "homework";

fn seed_assignments() -> Vec<Assignment> {
    [
        (1, "Form 4", "Math", "Calculus Worksheet", "2025-12-30", "Complete all problems on page 45.", AssignmentStatus::Pending),
        (2, "Form 4", "Physics", "Lab Report", "2025-12-28", "Submit the report for the Pendulum experiment.", AssignmentStatus::Submitted),
        (3, "Form 3", "English", "Essay on Hamlet", "2025-12-29", "Write a 1000-word essay on the themes of Hamlet.", AssignmentStatus::Pending),
    ]
    .into_iter()
    .map(|(id, class_id, subject, title, due_date, description, status)| Assignment {
        id,
        class_id: class_id.to_string(),
        subject: subject.to_string(),
        title: title.to_string(),
        due_date: due_date.to_string(),
        description: description.to_string(),
        status,
    })
    .collect()
}

#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub class_id: String,
    pub subject: String,
    pub title: String,
    pub due_date: String,
    pub description: String,
}

pub struct HomeworkBoard {
    assignments: Collection<Assignment>,
}

impl HomeworkBoard {
    pub fn load(storage: Rc<dyn Storage>, subscribers: Rc<Subscribers>) -> Result<Self> {
        let assignments = Collection::load(HOMEWORK_KEY, storage, subscribers, seed_assignments)?;
        Ok(Self { assignments })
    }

    pub fn all(&self) -> &[Assignment] {
        self.assignments.items()
    }

    pub fn for_class(&self, class_id: &str) -> Vec<&Assignment> {
        self.assignments
            .items()
            .iter()
            .filter(|a| a.class_id == class_id)
            .collect()
    }

    /// New assignments start Pending and go to the end of the board.
    pub fn add(&mut self, new: NewAssignment) -> Result<Assignment> {
        let assignment = Assignment {
            id: next_numeric_id(self.assignments.items().iter().map(|a| a.id)),
            class_id: new.class_id,
            subject: new.subject,
            title: new.title,
            due_date: new.due_date,
            description: new.description,
            status: AssignmentStatus::Pending,
        };
        let added = assignment.clone();
        self.assignments.update(|list| list.push(assignment))?;
        info!(id = added.id, class = %added.class_id, "assignment posted");
        Ok(added)
    }

    pub fn update_status(&mut self, id: i64, status: AssignmentStatus) -> Result<Assignment> {
        let idx = self
            .assignments
            .items()
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| DugsiError::Other(format!("Unknown assignment: {id}")))?;
        self.assignments.update(|list| {
            list[idx].status = status;
            list[idx].clone()
        })
    }
}
