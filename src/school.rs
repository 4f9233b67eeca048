//! Typed access to the school collections.
//!
//! Every mutation reads the whole collection, changes it in memory and writes
//! the whole collection back. That is only sound while a single caller drives
//! the store, which the request loop guarantees.

use crate::credentials::Credential;
use crate::model::{
    Account, AttendanceRecords, AttendanceSheet, Class, DiaryEntry, DiaryTarget, NewDiaryEntry,
    NewParent, NewStudent, NewTeacher, Parent, SchoolInfo, Student, Teacher,
};
use crate::stats::{self, DayStats, HistoryEntry};
use crate::store::{Slot, Store};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use tracing::{debug, info};
use uuid::Uuid;

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub struct SchoolStore {
    store: Store,
}

impl SchoolStore {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn school_info(&self) -> SchoolInfo {
        self.store.get(Slot::SchoolInfo)
    }

    pub fn save_school_info(&self, info: &SchoolInfo) -> anyhow::Result<()> {
        self.store.set(Slot::SchoolInfo, info)?;
        info!(name = %info.name, "school info saved");
        Ok(())
    }

    pub fn classes(&self) -> Vec<Class> {
        self.store.get(Slot::Classes)
    }

    pub fn add_class(&self, name: &str) -> anyhow::Result<Class> {
        let mut classes = self.classes();
        let class = Class {
            id: new_id(),
            name: name.to_string(),
        };
        classes.push(class.clone());
        self.store.set(Slot::Classes, &classes)?;
        info!(class_id = %class.id, "class added");
        Ok(class)
    }

    /// All students, or only those of `class_id` when given.
    pub fn students(&self, class_id: Option<&str>) -> Vec<Student> {
        let students: Vec<Student> = self.store.get(Slot::Students);
        match class_id {
            Some(cid) => students.into_iter().filter(|s| s.class_id == cid).collect(),
            None => students,
        }
    }

    pub fn add_student(&self, new: NewStudent) -> anyhow::Result<Student> {
        let mut students = self.students(None);
        let student = Student {
            id: new_id(),
            name: new.name,
            class_id: new.class_id,
            parent_name: new.parent_name,
        };
        students.push(student.clone());
        self.store.set(Slot::Students, &students)?;
        info!(student_id = %student.id, class_id = %student.class_id, "student added");
        Ok(student)
    }

    pub fn teachers(&self) -> Vec<Teacher> {
        self.store.get(Slot::Teachers)
    }

    pub fn add_teacher(&self, new: NewTeacher) -> anyhow::Result<Teacher> {
        let mut teachers = self.teachers();
        let teacher = Teacher {
            id: new_id(),
            name: new.name,
            subject: new.subject,
            email: new.email,
            credential: Credential::new(&new.password),
            class_id: new.class_id,
        };
        teachers.push(teacher.clone());
        self.store.set(Slot::Teachers, &teachers)?;
        info!(teacher_id = %teacher.id, "teacher added");
        Ok(teacher)
    }

    /// Returns whether a teacher with `id` existed.
    pub fn delete_teacher(&self, id: &str) -> anyhow::Result<bool> {
        let teachers = self.teachers();
        let before = teachers.len();
        let remaining: Vec<Teacher> = teachers.into_iter().filter(|t| t.id != id).collect();
        let removed = remaining.len() != before;
        self.store.set(Slot::Teachers, &remaining)?;
        info!(teacher_id = %id, removed, "teacher delete");
        Ok(removed)
    }

    pub fn parents(&self) -> Vec<Parent> {
        self.store.get(Slot::Parents)
    }

    pub fn add_parent(&self, new: NewParent) -> anyhow::Result<Parent> {
        let mut parents = self.parents();
        let parent = Parent {
            id: new_id(),
            name: new.name,
            email: new.email,
            credential: Credential::new(&new.password),
            student_ids: new.student_ids,
        };
        parents.push(parent.clone());
        self.store.set(Slot::Parents, &parents)?;
        info!(parent_id = %parent.id, children = parent.student_ids.len(), "parent added");
        Ok(parent)
    }

    pub fn validate_teacher(&self, login: &str, password: &str) -> Option<Teacher> {
        find_account(self.teachers(), login, password)
    }

    pub fn validate_parent(&self, login: &str, password: &str) -> Option<Parent> {
        find_account(self.parents(), login, password)
    }

    /// The parent's linked students that still exist, in roster order.
    pub fn parent_students(&self, parent_id: &str) -> Vec<Student> {
        let Some(parent) = self.parents().into_iter().find(|p| p.id == parent_id) else {
            return Vec::new();
        };
        if parent.student_ids.is_empty() {
            return Vec::new();
        }
        self.students(None)
            .into_iter()
            .filter(|s| parent.student_ids.contains(&s.id))
            .collect()
    }

    pub fn attendance_sheets(&self) -> Vec<AttendanceSheet> {
        self.store.get(Slot::Attendance)
    }

    /// Replaces the sheet for (date, class) wholesale.
    pub fn save_attendance(
        &self,
        date: NaiveDate,
        class_id: &str,
        records: AttendanceRecords,
    ) -> anyhow::Result<()> {
        let date = date.format("%Y-%m-%d").to_string();
        let mut sheets = self.attendance_sheets();
        let count = records.len();
        match sheets
            .iter_mut()
            .find(|s| s.date == date && s.class_id == class_id)
        {
            Some(sheet) => sheet.records = records,
            None => sheets.push(AttendanceSheet {
                date: date.clone(),
                class_id: class_id.to_string(),
                records,
            }),
        }
        self.store.set(Slot::Attendance, &sheets)?;
        info!(%date, class_id, students = count, "attendance saved");
        Ok(())
    }

    pub fn attendance(&self, date: NaiveDate, class_id: &str) -> Option<AttendanceRecords> {
        let sheets = self.attendance_sheets();
        let date = date.format("%Y-%m-%d").to_string();
        stats::find_sheet(&sheets, &date, class_id).map(|s| s.records.clone())
    }

    pub fn attendance_stats(&self, class_id: &str, today: NaiveDate) -> Vec<DayStats> {
        stats::attendance_stats(&self.attendance_sheets(), class_id, today)
    }

    pub fn student_attendance_history(&self, student_id: &str) -> Vec<HistoryEntry> {
        stats::student_history(&self.attendance_sheets(), student_id)
    }

    pub fn send_diary(&self, new: NewDiaryEntry) -> anyhow::Result<DiaryEntry> {
        self.send_diary_at(new, Utc::now())
    }

    pub fn send_diary_at(
        &self,
        new: NewDiaryEntry,
        now: DateTime<Utc>,
    ) -> anyhow::Result<DiaryEntry> {
        let mut entries = self.all_diaries();
        let entry = DiaryEntry {
            id: new_id(),
            class_id: new.class_id,
            subject: new.subject,
            content: new.content,
            target: new.target,
            student_id: new.student_id,
            timestamp: now.to_rfc3339_opts(SecondsFormat::Micros, true),
        };
        entries.push(entry.clone());
        self.store.set(Slot::Diary, &entries)?;
        info!(entry_id = %entry.id, class_id = %entry.class_id, "diary entry sent");
        Ok(entry)
    }

    fn all_diaries(&self) -> Vec<DiaryEntry> {
        self.store.get(Slot::Diary)
    }

    /// Teacher view when `student_id` is `None`: everything for the class.
    /// Parent view otherwise: the class-wide entries plus the ones addressed to
    /// that student. Newest first.
    pub fn diaries(&self, class_id: &str, student_id: Option<&str>) -> Vec<DiaryEntry> {
        let mut out: Vec<DiaryEntry> = self
            .all_diaries()
            .into_iter()
            .filter(|d| match student_id {
                Some(sid) => {
                    (d.class_id == class_id && d.target == DiaryTarget::All)
                        || (d.target == DiaryTarget::Student
                            && d.student_id.as_deref() == Some(sid))
                }
                None => d.class_id == class_id,
            })
            .collect();
        out.sort_by(|a, b| diary_instant(b).cmp(&diary_instant(a)));
        debug!(class_id, ?student_id, count = out.len(), "diaries listed");
        out
    }
}

fn diary_instant(d: &DiaryEntry) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&d.timestamp)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn find_account<A: Account>(accounts: Vec<A>, login: &str, password: &str) -> Option<A> {
    accounts
        .into_iter()
        .find(|a| a.matches_login(login) && a.credential().verify(password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::model::AttendanceStatus;
    use chrono::Duration;

    fn school() -> SchoolStore {
        SchoolStore::new(Store::new(db::open_in_memory().expect("open db")))
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
    }

    fn records(rows: &[(&str, AttendanceStatus)]) -> AttendanceRecords {
        rows.iter().map(|(id, st)| (id.to_string(), *st)).collect()
    }

    #[test]
    fn add_class_generates_distinct_ids() {
        let s = school();
        let a = s.add_class("Class 6A").expect("add");
        let b = s.add_class("Class 6A").expect("add");
        assert_ne!(a.id, b.id);
        assert_eq!(s.classes(), vec![a, b]);
        assert_eq!(s.classes(), s.classes());
    }

    #[test]
    fn students_filter_by_class() {
        let s = school();
        let a = s
            .add_student(NewStudent {
                name: "Ann".into(),
                class_id: "c1".into(),
                parent_name: "Mr. Ann".into(),
            })
            .expect("add");
        s.add_student(NewStudent {
            name: "Ben".into(),
            class_id: "c2".into(),
            parent_name: String::new(),
        })
        .expect("add");
        assert_eq!(s.students(Some("c1")), vec![a]);
        assert_eq!(s.students(None).len(), 2);
        assert!(s.students(Some("nope")).is_empty());
    }

    #[test]
    fn teacher_login_by_email_or_id() {
        let s = school();
        let t = s
            .add_teacher(NewTeacher {
                name: "Ms. Lee".into(),
                subject: "Science".into(),
                email: "lee@school.com".into(),
                password: "pw1".into(),
                class_id: Some("c2".into()),
            })
            .expect("add");
        assert_eq!(s.validate_teacher("lee@school.com", "pw1"), Some(t.clone()));
        assert_eq!(s.validate_teacher(&t.id, "pw1"), Some(t.clone()));
        assert_eq!(s.validate_teacher("lee@school.com", "pw2"), None);
        assert_eq!(s.validate_teacher("other@school.com", "pw1"), None);

        assert!(s.delete_teacher(&t.id).expect("delete"));
        assert!(!s.delete_teacher(&t.id).expect("delete again"));
        assert_eq!(s.validate_teacher("lee@school.com", "pw1"), None);
    }

    #[test]
    fn parent_students_skips_dangling_ids() {
        let s = school();
        let kid = s
            .add_student(NewStudent {
                name: "Kid".into(),
                class_id: "c1".into(),
                parent_name: "P".into(),
            })
            .expect("add");
        let p = s
            .add_parent(NewParent {
                name: "P".into(),
                email: "p@x".into(),
                password: "pw".into(),
                student_ids: vec![kid.id.clone(), "gone".into()],
            })
            .expect("add");
        let lonely = s
            .add_parent(NewParent {
                name: "Q".into(),
                email: "q@x".into(),
                password: "pw".into(),
                student_ids: Vec::new(),
            })
            .expect("add");
        assert_eq!(s.parent_students(&p.id), vec![kid]);
        assert!(s.parent_students(&lonely.id).is_empty());
        assert!(s.parent_students("unknown").is_empty());
        assert_eq!(s.validate_parent("q@x", "pw").map(|x| x.id), Some(lonely.id));
    }

    #[test]
    fn save_attendance_overwrites_sheet() {
        let s = school();
        let d = day("2024-01-01");
        s.save_attendance(
            d,
            "c1",
            records(&[
                ("s1", AttendanceStatus::Present),
                ("s2", AttendanceStatus::Absent),
            ]),
        )
        .expect("save");
        let second = records(&[("s1", AttendanceStatus::Late)]);
        s.save_attendance(d, "c1", second.clone()).expect("save");
        assert_eq!(s.attendance(d, "c1"), Some(second));
        assert_eq!(s.attendance(d, "c2"), None);
        assert_eq!(s.attendance_sheets().len(), 1);
    }

    #[test]
    fn stats_and_history_read_saved_sheets() {
        let s = school();
        let today = day("2024-01-03");
        s.save_attendance(day("2024-01-01"), "c1", records(&[("s1", AttendanceStatus::Present)]))
            .expect("save");
        s.save_attendance(today, "c1", records(&[("s1", AttendanceStatus::Absent)]))
            .expect("save");

        let stats = s.attendance_stats("c1", today);
        assert_eq!(stats.len(), 7);
        assert_eq!(stats[6].counts.absent, 1);
        assert_eq!(stats[4].counts.present, 1);

        let h = s.student_attendance_history("s1");
        let got: Vec<(&str, AttendanceStatus)> =
            h.iter().map(|e| (e.date.as_str(), e.status)).collect();
        assert_eq!(
            got,
            vec![
                ("2024-01-03", AttendanceStatus::Absent),
                ("2024-01-01", AttendanceStatus::Present)
            ]
        );
    }

    #[test]
    fn diaries_filter_by_audience_and_sort_newest_first() {
        let s = school();
        let t0 = Utc::now();
        let send = |target: DiaryTarget, student: Option<&str>, class_id: &str, offset: i64| {
            s.send_diary_at(
                NewDiaryEntry {
                    class_id: class_id.into(),
                    subject: "Math".into(),
                    content: format!("note {offset}"),
                    target,
                    student_id: student.map(str::to_string),
                },
                t0 + Duration::seconds(offset),
            )
            .expect("send")
        };
        let all = send(DiaryTarget::All, None, "c1", 1);
        let mine = send(DiaryTarget::Student, Some("s1"), "c1", 2);
        let other = send(DiaryTarget::Student, Some("s2"), "c1", 3);
        let other_class = send(DiaryTarget::All, None, "c2", 4);

        let parent_view: Vec<String> = s
            .diaries("c1", Some("s1"))
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(parent_view, vec![mine.id.clone(), all.id.clone()]);

        let teacher_view: Vec<String> = s
            .diaries("c1", None)
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(teacher_view, vec![other.id, mine.id, all.id]);

        assert_eq!(s.diaries("c2", None)[0].id, other_class.id);
    }
}
