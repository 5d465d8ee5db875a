use crate::error::OpError;
use crate::model::User;
use crate::store::Store;

/// Look up a user by exact username/password match. Plaintext equality is
/// what the stored credential format gives us; hashing the user collection
/// is a provisioning concern outside this engine.
pub fn check_credentials(store: &Store, username: &str, password: &str) -> Result<User, OpError> {
    let users: Vec<User> = store.load("users")?;
    users
        .into_iter()
        .find(|u| u.username == username && u.password == password)
        .ok_or(OpError::InvalidCredentials)
}
