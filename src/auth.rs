use std::fmt;
use std::rc::Rc;

use sha2::{Digest, Sha256};
use tracing::{info, warn};
use zeroize::Zeroize;

use crate::db::Storage;
use crate::error::{DugsiError, Result};
use crate::models::{Role, User};

pub const USER_KEY: &str = "user";

/// SHA-256 of the shared demo password.
const DEMO_PASSWORD_SHA256: &str = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";

struct Credential {
    email: &'static str,
    password_sha256: &'static str,
    name: &'static str,
    role: Role,
    student_id: Option<&'static str>,
    class_id: Option<&'static str>,
}

const CREDENTIALS: [Credential; 3] = [
    Credential {
        email: "admin@dugsiga.com",
        password_sha256: DEMO_PASSWORD_SHA256,
        name: "Admin User",
        role: Role::Admin,
        student_id: None,
        class_id: None,
    },
    Credential {
        email: "teacher@dugsiga.com",
        password_sha256: DEMO_PASSWORD_SHA256,
        name: "Teacher User",
        role: Role::Teacher,
        student_id: None,
        class_id: None,
    },
    Credential {
        email: "student@dugsiga.com",
        password_sha256: DEMO_PASSWORD_SHA256,
        name: "Student One",
        role: Role::Student,
        student_id: Some("1"),
        class_id: Some("Form 4"),
    },
];

fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Screens a signed-in user can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Students,
    Fees,
    Attendance,
    Exams,
    Subjects,
    Reports,
    Timetable,
    Homework,
    Messages,
    Settings,
    StudentOverview,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            View::Dashboard => "dashboard",
            View::Students => "students",
            View::Fees => "fees",
            View::Attendance => "attendance",
            View::Exams => "exams",
            View::Subjects => "subjects",
            View::Reports => "reports",
            View::Timetable => "timetable",
            View::Homework => "homework",
            View::Messages => "messages",
            View::Settings => "settings",
            View::StudentOverview => "student overview",
        };
        f.write_str(s)
    }
}

impl Role {
    pub fn can_access(self, view: View) -> bool {
        match self {
            Role::Admin => true,
            Role::Teacher => matches!(
                view,
                View::Dashboard
                    | View::Attendance
                    | View::Exams
                    | View::Reports
                    | View::Timetable
                    | View::Homework
            ),
            Role::Student => view == View::StudentOverview,
        }
    }
}

/// The signed-in user, persisted under `user` like any other collection.
pub struct Session {
    storage: Rc<dyn Storage>,
}

impl Session {
    pub fn new(storage: Rc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Checks the credential table and persists the matching profile.
    /// The password buffer is wiped before returning.
    pub fn login(&self, email: &str, mut password: String) -> Result<User> {
        let mut digest = password_digest(&password);
        password.zeroize();
        let found = CREDENTIALS
            .iter()
            .find(|c| c.email == email.trim() && c.password_sha256 == digest);
        digest.zeroize();

        let Some(cred) = found else {
            warn!(email, "login rejected");
            return Err(DugsiError::InvalidLogin);
        };
        let user = User {
            email: cred.email.to_string(),
            name: cred.name.to_string(),
            role: cred.role,
            student_id: cred.student_id.map(str::to_string),
            class_id: cred.class_id.map(str::to_string),
        };
        self.storage.set(USER_KEY, &serde_json::to_string(&user)?)?;
        info!(email = %user.email, role = %user.role, "logged in");
        Ok(user)
    }

    pub fn logout(&self) -> Result<Option<User>> {
        let user = self.current_user()?;
        self.storage.remove(USER_KEY)?;
        if let Some(u) = &user {
            info!(email = %u.email, "logged out");
        }
        Ok(user)
    }

    pub fn current_user(&self) -> Result<Option<User>> {
        match self.storage.get(USER_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// The current user, if they may open `view`.
    pub fn require_view(&self, view: View) -> Result<User> {
        let user = self.current_user()?.ok_or(DugsiError::NotLoggedIn)?;
        if !user.role.can_access(view) {
            return Err(DugsiError::Forbidden {
                role: user.role.to_string(),
                view: view.to_string(),
            });
        }
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;

    fn session() -> (Session, Rc<MemoryStorage>) {
        let storage = Rc::new(MemoryStorage::default());
        (Session::new(storage.clone()), storage)
    }

    #[test]
    fn test_digest_matches_table() {
        assert_eq!(password_digest("password"), DEMO_PASSWORD_SHA256);
    }

    #[test]
    fn test_login_persists_user() {
        let (s, storage) = session();
        let user = s.login("teacher@dugsiga.com", "password".into()).unwrap();
        assert_eq!(user.role, Role::Teacher);
        assert!(storage.contains(USER_KEY));
        assert_eq!(s.current_user().unwrap(), Some(user));
    }

    #[test]
    fn test_student_login_links_record() {
        let (s, _) = session();
        let user = s.login("student@dugsiga.com", "password".into()).unwrap();
        assert_eq!(user.student_id.as_deref(), Some("1"));
        assert_eq!(user.class_id.as_deref(), Some("Form 4"));
    }

    #[test]
    fn test_bad_password_rejected() {
        let (s, storage) = session();
        let err = s.login("admin@dugsiga.com", "hunter2".into()).unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(!storage.contains(USER_KEY));
    }

    #[test]
    fn test_logout_clears_user() {
        let (s, storage) = session();
        s.login("admin@dugsiga.com", "password".into()).unwrap();
        let out = s.logout().unwrap();
        assert_eq!(out.map(|u| u.role), Some(Role::Admin));
        assert!(!storage.contains(USER_KEY));
        assert!(matches!(s.require_view(View::Dashboard), Err(DugsiError::NotLoggedIn)));
    }

    #[test]
    fn test_role_views() {
        assert!(Role::Admin.can_access(View::Settings));
        assert!(Role::Teacher.can_access(View::Reports));
        assert!(!Role::Teacher.can_access(View::Fees));
        assert!(!Role::Teacher.can_access(View::Students));
        assert!(Role::Student.can_access(View::StudentOverview));
        assert!(!Role::Student.can_access(View::Dashboard));
    }

    #[test]
    fn test_require_view_forbidden() {
        let (s, _) = session();
        s.login("student@dugsiga.com", "password".into()).unwrap();
        assert!(matches!(s.require_view(View::Fees), Err(DugsiError::Forbidden { .. })));
        assert!(s.require_view(View::StudentOverview).is_ok());
    }
}
