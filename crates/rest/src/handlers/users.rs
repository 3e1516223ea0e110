//! User handlers.
//!
//! - `GET [base]/api/userlist` - All users of the current tenant
//! - `PUT [base]/api/userpassword?userNo=&userPwd=` - Change one user's password
//!
//! Both routes sit behind the tenant gate. Neither handler names a tenant
//! when calling storage; the storage layer resolves it from the request.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use stratum_persistence::core::UserStorage;
use tracing::{debug, info};

use crate::error::{RestError, RestResult};
use crate::extractors::CurrentTenant;
use crate::state::AppState;

/// Query parameters of the password update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordUpdate {
    /// Number of the user to update.
    pub user_no: i32,
    /// The new password.
    pub user_pwd: String,
}

/// Handler listing all users of the current tenant.
///
/// # HTTP Request
///
/// `GET [base]/api/userlist`
///
/// # Response
///
/// - `200 OK` - JSON array of `{userNo, userId}`
/// - `400 Bad Request` - Tenant header missing
/// - `404 Not Found` - Tenant not allow-listed
/// - `500 Internal Server Error` - Schema switch or pool failure
pub async fn list_users_handler<S>(
    State(state): State<AppState<S>>,
    tenant: CurrentTenant,
) -> RestResult<Response>
where
    S: UserStorage + Send + Sync,
{
    debug!(tenant_id = %tenant, "Processing user list request");

    let users = state.storage().list_users().await?;

    debug!(tenant_id = %tenant, count = users.len(), "Returning users");
    Ok((StatusCode::OK, Json(users)).into_response())
}

/// Handler changing the password of one user of the current tenant.
///
/// # HTTP Request
///
/// `PUT [base]/api/userpassword?userNo=<int>&userPwd=<string>`
///
/// # Response
///
/// - `200 OK` - The updated user (without password)
/// - `400 Bad Request` - Tenant header missing, or malformed query
/// - `404 Not Found` - Tenant not allow-listed, or no such user
/// - `500 Internal Server Error` - Schema switch or pool failure
pub async fn update_password_handler<S>(
    State(state): State<AppState<S>>,
    tenant: CurrentTenant,
    query: Result<Query<PasswordUpdate>, QueryRejection>,
) -> RestResult<Response>
where
    S: UserStorage + Send + Sync,
{
    let Query(update) = query.map_err(|rejection| RestError::BadRequest {
        message: rejection.body_text(),
    })?;

    debug!(
        tenant_id = %tenant,
        user_no = update.user_no,
        "Processing password update request"
    );

    let user = state
        .storage()
        .update_user_password(update.user_no, &update.user_pwd)
        .await?;

    info!(tenant_id = %tenant, user_no = user.user_no, "Password updated");
    Ok((StatusCode::OK, Json(user)).into_response())
}
