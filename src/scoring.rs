use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::OpError;
use crate::model::{Assignment, Submission};
use crate::store::Store;

/// Every assignment is worth the same fixed point value.
pub const ASSIGNMENT_POINTS: i64 = 10;
/// Flat deduction for a late submission, floored at zero.
pub const LATE_PENALTY: i64 = 5;

const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DUE_DATE_FORMAT).ok()
}

/// Deadline rule: the due date carries no time of day, so the deadline is
/// midnight UTC of that date. On or before the deadline scores full points;
/// after it, the penalty is deducted and the result clamped at zero.
pub fn submission_score(
    points: i64,
    penalty: i64,
    due_date: NaiveDate,
    submitted: DateTime<Utc>,
) -> i64 {
    let deadline = Utc.from_utc_datetime(&due_date.and_time(NaiveTime::MIN));
    if submitted > deadline {
        (points - penalty).max(0)
    } else {
        points
    }
}

pub fn create_assignment(
    store: &Store,
    teacher_id: &str,
    name: &str,
    description: &str,
    due_date: NaiveDate,
) -> Result<Assignment, OpError> {
    store.update("assignments", |assignments: &mut Vec<Assignment>| {
        let floor = assignments.iter().map(|a| a.id).max().unwrap_or(0);
        let id = store.next_id("assignments", floor)?;
        let assignment = Assignment {
            id,
            teacher_id: teacher_id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            due_date: due_date.format(DUE_DATE_FORMAT).to_string(),
            points: ASSIGNMENT_POINTS,
            penalty: LATE_PENALTY,
        };
        assignments.push(assignment.clone());
        Ok(assignment)
    })
}

/// Score and record one submission. At most one submission may exist per
/// (student, assignment) pair; the check runs inside the submissions
/// collection's exclusive update scope, so a duplicate can never slip in
/// between the scan and the append.
pub fn submit(
    store: &Store,
    student_id: &str,
    assignment_id: i64,
    submission_time: DateTime<Utc>,
    submission_time_raw: &str,
) -> Result<i64, OpError> {
    let assignments: Vec<Assignment> = store.load("assignments")?;
    let Some(assignment) = assignments.into_iter().find(|a| a.id == assignment_id) else {
        return Err(OpError::AssignmentNotFound);
    };
    let due_date =
        parse_due_date(&assignment.due_date).ok_or(OpError::InvalidDueDate(assignment.id))?;
    let score = submission_score(
        assignment.points,
        assignment.penalty,
        due_date,
        submission_time,
    );

    store.update("submissions", |submissions: &mut Vec<Submission>| {
        let duplicate = submissions
            .iter()
            .any(|s| s.student_id == student_id && s.assignment_id == assignment_id);
        if duplicate {
            return Err(OpError::AssignmentAlreadySubmitted);
        }
        submissions.push(Submission {
            student_id: student_id.to_string(),
            assignment_id,
            submission_time: submission_time_raw.to_string(),
            score,
        });
        Ok(())
    })?;
    Ok(score)
}
