use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};

use crate::error::OpError;
use crate::model::Questionnaire;
use crate::store::Store;

pub const CLUB_PRESS: &str = "Press";
pub const CLUB_JET: &str = "Jet";

const ANSWER_BEST_SUBJECT: &str = "best-subject";
const ANSWER_PUBLIC_SPEAKING: &str = "public-speaking";

/// Two-outcome preference classifier: English as best subject or a taste
/// for public speaking suggests the Press club, everything else the Jet
/// club. There is no third branch.
pub fn preferred_club(answers: &BTreeMap<String, String>) -> &'static str {
    let likes_english =
        answers.get(ANSWER_BEST_SUBJECT).map(String::as_str) == Some("English");
    let public_speaker =
        answers.get(ANSWER_PUBLIC_SPEAKING).map(String::as_str) == Some("Yes");
    if likes_english || public_speaker {
        CLUB_PRESS
    } else {
        CLUB_JET
    }
}

/// Record a student's questionnaire. At most one per student; the scan for
/// an earlier submission runs inside the collection's exclusive update
/// scope, so two near-simultaneous submits cannot both pass the check.
pub fn submit(
    store: &Store,
    student_id: &str,
    answers: BTreeMap<String, String>,
) -> Result<Questionnaire, OpError> {
    store.update("questionnaires", |questionnaires: &mut Vec<Questionnaire>| {
        if questionnaires.iter().any(|q| q.student_id == student_id) {
            return Err(OpError::QuestionnaireAlreadySubmitted);
        }
        let record = Questionnaire {
            student_id: student_id.to_string(),
            preferred_club: preferred_club(&answers).to_string(),
            answers,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        questionnaires.push(record.clone());
        Ok(record)
    })
}
