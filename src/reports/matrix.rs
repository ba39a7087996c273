//! Roster × log merge join shared by every score matrix.
//!
//! Logs are grouped under their student with a single cursor walk. The walk
//! is only correct when logs follow the roster order, so both sides are
//! re-sorted here with the same ordering key instead of trusting the caller.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::{AttemptLog, ExerciseLog, LogRecord, Student, TestLog, VideoLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    LastName,
    FirstName,
    Username,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentOrdering {
    fields: Vec<SortField>,
}

impl Default for StudentOrdering {
    fn default() -> Self {
        Self::new(vec![
            SortField::LastName,
            SortField::FirstName,
            SortField::Username,
        ])
    }
}

impl StudentOrdering {
    pub fn new(fields: Vec<SortField>) -> Self {
        Self { fields }
    }

    /// Compares by the configured fields, then by id so the order is total.
    pub fn compare(&self, a: &Student, b: &Student) -> Ordering {
        for field in &self.fields {
            let ord = match field {
                SortField::LastName => a.last_name.cmp(&b.last_name),
                SortField::FirstName => a.first_name.cmp(&b.first_name),
                SortField::Username => a.username.cmp(&b.username),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.id.cmp(&b.id)
    }

    pub fn sort(&self, roster: &mut [Student]) {
        roster.sort_by(|a, b| self.compare(a, b));
    }
}

/// Anything that belongs to exactly one student.
pub trait UserScoped {
    fn user_id(&self) -> &str;
}

impl UserScoped for LogRecord {
    fn user_id(&self) -> &str {
        LogRecord::user_id(self)
    }
}

impl UserScoped for ExerciseLog {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl UserScoped for VideoLog {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl UserScoped for TestLog {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl UserScoped for AttemptLog {
    fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Groups `logs` under their students, one entry per roster student in
/// `ordering` order. Students without logs get an empty list; logs whose
/// user is not on the roster are dropped. Relative log order per student is
/// preserved.
pub fn join_by_user<L: UserScoped>(
    mut roster: Vec<Student>,
    logs: Vec<L>,
    ordering: &StudentOrdering,
) -> Vec<(Student, Vec<L>)> {
    ordering.sort(&mut roster);

    let total = logs.len();
    let mut keyed: Vec<(usize, L)> = {
        let position: HashMap<&str, usize> = roster
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.as_str(), i))
            .collect();
        logs.into_iter()
            .filter_map(|l| position.get(l.user_id()).map(|&p| (p, l)))
            .collect()
    };
    if keyed.len() < total {
        tracing::debug!(
            dropped = total - keyed.len(),
            "ignoring logs for students outside the roster"
        );
    }
    // Stable: keeps each student's logs in their original order.
    keyed.sort_by_key(|(p, _)| *p);

    let mut out: Vec<(Student, Vec<L>)> = Vec::with_capacity(roster.len());
    let mut cursor = keyed.into_iter().peekable();
    for (idx, student) in roster.into_iter().enumerate() {
        let mut mine = Vec::new();
        while let Some((_, log)) = cursor.next_if(|(p, _)| *p == idx) {
            mine.push(log);
        }
        out.push((student, mine));
    }
    out
}
