use crate::error::OpError;
use crate::model::Club;
use crate::store::Store;

/// Create an empty club with a sequence-allocated id.
pub fn create_club(store: &Store, name: &str) -> Result<Club, OpError> {
    store.update("clubs", |clubs: &mut Vec<Club>| {
        let floor = clubs.iter().map(|c| c.id).max().unwrap_or(0);
        let id = store.next_id("clubs", floor)?;
        let club = Club {
            id,
            name: name.to_string(),
            members: Vec::new(),
            chatroom: Vec::new(),
        };
        clubs.push(club.clone());
        Ok(club)
    })
}

/// Assign a batch of students to a club, preserving the invariant that a
/// student belongs to at most one club system-wide: each id is first
/// removed from every club's members, then added to the target if absent.
/// Ids equal to the acting teacher's own id are skipped. The whole batch is
/// persisted with a single write; returns how many ids ended up added.
pub fn assign_to_club(
    store: &Store,
    teacher_id: &str,
    student_ids: &[String],
    club_id: i64,
) -> Result<usize, OpError> {
    store.update("clubs", |clubs: &mut Vec<Club>| {
        let Some(target) = clubs.iter().position(|c| c.id == club_id) else {
            return Err(OpError::ClubNotFound);
        };
        let mut assigned = 0;
        for student_id in student_ids {
            if student_id == teacher_id {
                continue;
            }
            for club in clubs.iter_mut() {
                club.members.retain(|m| m != student_id);
            }
            let club = &mut clubs[target];
            if !club.members.iter().any(|m| m == student_id) {
                club.members.push(student_id.clone());
                assigned += 1;
            }
        }
        Ok(assigned)
    })
}
