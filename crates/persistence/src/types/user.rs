//! The user entity stored in every tenant schema.

use serde::{Deserialize, Serialize};

/// A row of the `user` table.
///
/// Serialized in camelCase. The password is accepted on input but never
/// written out.
///
/// # Examples
///
/// ```
/// use stratum_persistence::types::User;
///
/// let user = User::new(1, "alice", "secret");
/// let json = serde_json::to_value(&user).unwrap();
///
/// assert_eq!(json["userNo"], 1);
/// assert_eq!(json["userId"], "alice");
/// assert!(json.get("userPwd").is_none());
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Primary key.
    pub user_no: i32,

    /// Login name.
    pub user_id: String,

    /// Stored password.
    #[serde(skip_serializing, default)]
    pub user_pwd: String,
}

impl User {
    /// Creates a new user.
    pub fn new(user_no: i32, user_id: impl Into<String>, user_pwd: impl Into<String>) -> Self {
        Self {
            user_no,
            user_id: user_id.into(),
            user_pwd: user_pwd.into(),
        }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("user_no", &self.user_no)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}
