use crate::credentials::Credential;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchoolInfo {
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub class_id: String,
    #[serde(default)]
    pub parent_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subject: String,
    pub email: String,
    pub credential: Credential,
    #[serde(default)]
    pub class_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parent {
    pub id: String,
    pub name: String,
    pub email: String,
    pub credential: Credential,
    #[serde(default)]
    pub student_ids: Vec<String>,
}

/// Something that can sign in with an email-or-id and a password.
pub trait Account {
    fn id(&self) -> &str;
    fn email(&self) -> &str;
    fn credential(&self) -> &Credential;

    fn matches_login(&self, login: &str) -> bool {
        self.email() == login || self.id() == login
    }
}

impl Account for Teacher {
    fn id(&self) -> &str {
        &self.id
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn credential(&self) -> &Credential {
        &self.credential
    }
}

impl Account for Parent {
    fn id(&self) -> &str {
        &self.id
    }
    fn email(&self) -> &str {
        &self.email
    }
    fn credential(&self) -> &Credential {
        &self.credential
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "present" => Some(Self::Present),
            "absent" => Some(Self::Absent),
            "late" => Some(Self::Late),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
        }
    }
}

/// studentId -> status for one class on one day.
pub type AttendanceRecords = BTreeMap<String, AttendanceStatus>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSheet {
    /// ISO calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub class_id: String,
    pub records: AttendanceRecords,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiaryTarget {
    All,
    Student,
}

impl DiaryTarget {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(Self::All),
            "student" => Some(Self::Student),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: String,
    pub class_id: String,
    pub subject: String,
    pub content: String,
    pub target: DiaryTarget,
    #[serde(default)]
    pub student_id: Option<String>,
    /// RFC 3339, UTC.
    pub timestamp: String,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub class_id: String,
    pub parent_name: String,
}

#[derive(Debug, Clone)]
pub struct NewTeacher {
    pub name: String,
    pub subject: String,
    pub email: String,
    pub password: String,
    pub class_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewParent {
    pub name: String,
    pub email: String,
    pub password: String,
    pub student_ids: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewDiaryEntry {
    pub class_id: String,
    pub subject: String,
    pub content: String,
    pub target: DiaryTarget,
    pub student_id: Option<String>,
}
