use serde::Serialize;

use crate::error::OpError;
use crate::model::{Club, Questionnaire, Submission};
use crate::store::Store;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub submissions: Vec<Submission>,
    pub club: Option<Club>,
    pub questionnaire: Option<Questionnaire>,
}

/// Read-only join for one student: their submissions, the club whose
/// members contain them (at most one, by the membership invariant), and
/// their questionnaire if submitted.
pub fn student_dashboard(store: &Store, student_id: &str) -> Result<DashboardView, OpError> {
    let submissions: Vec<Submission> = store.load("submissions")?;
    let clubs: Vec<Club> = store.load("clubs")?;
    let questionnaires: Vec<Questionnaire> = store.load("questionnaires")?;

    Ok(DashboardView {
        submissions: submissions
            .into_iter()
            .filter(|s| s.student_id == student_id)
            .collect(),
        club: clubs
            .into_iter()
            .find(|c| c.members.iter().any(|m| m == student_id)),
        questionnaire: questionnaires
            .into_iter()
            .find(|q| q.student_id == student_id),
    })
}
