//! Bearer-token resolution against the upstream auth service. The auth
//! service owns credentials; we only ask it who a token belongs to.

use http::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::util::env::{EnvErr, Var};
use crate::var;

pub type IdentityResult<T> = core::result::Result<T, IdentityErr>;

#[derive(Debug, Error)]
pub enum IdentityErr {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),

    #[error(transparent)]
    EnvError(#[from] EnvErr),

    #[error("auth service rejected token with status {0}")]
    RejectedToken(StatusCode),
}

/// The subject the auth service resolved a bearer token to.
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: Option<String>,
}

pub async fn fetch_identity(token: &str) -> IdentityResult<Identity> {
    let base_url = var!(Var::AuthBaseUrl).await?;

    let response = reqwest::Client::new()
        .get(format!("{base_url}/auth/v1/user"))
        .bearer_auth(token)
        .send()
        .await?;

    if !response.status().is_success() {
        let status =
            StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::UNAUTHORIZED);
        return Err(IdentityErr::RejectedToken(status));
    }

    Ok(response.json::<Identity>().await?)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identity_deserializes_without_an_email() {
        let identity: Identity =
            serde_json::from_str(r#"{"id":"3fa85f64-5717-4562-b3fc-2c963f66afa6"}"#).unwrap();
        assert!(identity.email.is_none());

        let identity: Identity = serde_json::from_str(
            r#"{"id":"3fa85f64-5717-4562-b3fc-2c963f66afa6","email":"pat@example.com"}"#,
        )
        .unwrap();
        assert_eq!(identity.email.as_deref(), Some("pat@example.com"));
    }
}
