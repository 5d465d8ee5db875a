use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub student_id: String,
    pub message: String,
    pub timestamp: String,
}

/// Club records keep the predecessor's field layout so an existing data
/// directory loads unchanged. `members` is an ordered set; uniqueness is
/// enforced by the membership manager, not by storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Club {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub chatroom: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub teacher_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub due_date: String,
    pub points: i64,
    pub penalty: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub student_id: String,
    pub assignment_id: i64,
    pub submission_time: String,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Questionnaire {
    pub student_id: String,
    pub answers: BTreeMap<String, String>,
    #[serde(rename = "preferredClub")]
    pub preferred_club: String,
    pub timestamp: String,
}
