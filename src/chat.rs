use chrono::{SecondsFormat, Utc};

use crate::error::OpError;
use crate::model::{ChatMessage, Club};
use crate::store::Store;

/// Append a message to a club's chatroom. Membership is the sole
/// authorization check: the sender must currently be in the club's members
/// set. Messages are append-only and keep insertion order.
pub fn post_message(
    store: &Store,
    club_id: i64,
    student_id: &str,
    message: &str,
) -> Result<(), OpError> {
    store.update("clubs", |clubs: &mut Vec<Club>| {
        let Some(club) = clubs.iter_mut().find(|c| c.id == club_id) else {
            return Err(OpError::ClubNotFound);
        };
        if !club.members.iter().any(|m| m == student_id) {
            return Err(OpError::NotAMember);
        }
        club.chatroom.push(ChatMessage {
            student_id: student_id.to_string(),
            message: message.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        });
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::{assign_to_club, create_club};
    use crate::store::open_store;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_workspace(prefix: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}",
            prefix,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::create_dir_all(&p).expect("create temp dir");
        p
    }

    fn chatroom_of(store: &Store, club_id: i64) -> Vec<ChatMessage> {
        let clubs: Vec<Club> = store.load("clubs").expect("load clubs");
        clubs
            .into_iter()
            .find(|c| c.id == club_id)
            .map(|c| c.chatroom)
            .expect("club exists")
    }

    #[test]
    fn member_messages_append_in_order() {
        let ws = temp_workspace("clubbook-chat-order");
        let store = open_store(&ws).expect("open");
        let press = create_club(&store, "Press").expect("press");
        assign_to_club(&store, "t1", &["s1".into(), "s2".into()], press.id).expect("assign");

        post_message(&store, press.id, "s1", "first issue ideas?").expect("post");
        post_message(&store, press.id, "s2", "interview the coach").expect("post");

        let chatroom = chatroom_of(&store, press.id);
        assert_eq!(chatroom.len(), 2);
        assert_eq!(chatroom[0].student_id, "s1");
        assert_eq!(chatroom[1].message, "interview the coach");
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn non_member_is_rejected_and_nothing_is_appended() {
        let ws = temp_workspace("clubbook-chat-gate");
        let store = open_store(&ws).expect("open");
        let press = create_club(&store, "Press").expect("press");
        assign_to_club(&store, "t1", &["s1".into()], press.id).expect("assign");

        let result = post_message(&store, press.id, "s2", "hello?");
        assert!(matches!(result, Err(OpError::NotAMember)));
        assert!(chatroom_of(&store, press.id).is_empty());
        let _ = std::fs::remove_dir_all(ws);
    }

    #[test]
    fn unknown_club_is_rejected() {
        let ws = temp_workspace("clubbook-chat-missing");
        let store = open_store(&ws).expect("open");
        let result = post_message(&store, 7, "s1", "anyone here?");
        assert!(matches!(result, Err(OpError::ClubNotFound)));
        let _ = std::fs::remove_dir_all(ws);
    }
}
