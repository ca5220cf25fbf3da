use super::{check_status, BackendError, RestClient};
use crate::session::{LoginOutcome, SessionProcedures};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::instrument;

impl RestClient {
    /// Invoke a remote procedure and decode its JSON result.
    ///
    /// # Errors
    /// Returns an error on transport failure, a non-2xx status, or an undecodable body.
    #[instrument(skip(self, body))]
    pub async fn rpc<B, T>(&self, name: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let text = self.rpc_text(name, body).await?;
        // void functions answer with an empty body
        let text = if text.trim().is_empty() {
            "null"
        } else {
            text.as_str()
        };
        serde_json::from_str(text).map_err(|err| BackendError::Decode(format!("{name}: {err}")))
    }

    async fn rpc_text<B>(&self, name: &str, body: &B) -> Result<String, BackendError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self.endpoint(&format!("rest/v1/rpc/{name}"))?;
        let response = self
            .authorized(self.http().post(url))
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        Ok(response.text().await?)
    }
}

#[derive(Deserialize)]
struct ValidateResponse {
    valid: bool,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

fn expires_at_param(expires_at: DateTime<Utc>) -> String {
    expires_at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl SessionProcedures for RestClient {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<LoginOutcome, BackendError> {
        let body = Credentials {
            email,
            password: password.expose_secret(),
        };
        self.rpc("admin_login", &body).await
    }

    async fn create_session(
        &self,
        user_id: &str,
        session_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), BackendError> {
        let body = json!({
            "p_user_id": user_id,
            "p_session_token": session_token,
            "p_expires_at": expires_at_param(expires_at),
        });
        self.rpc::<_, Value>("create_admin_session", &body)
            .await
            .map(|_| ())
    }

    async fn invalidate_session(&self, session_token: &str) -> Result<(), BackendError> {
        let body = json!({ "p_session_token": session_token });
        self.rpc::<_, Value>("logout_admin_session", &body)
            .await
            .map(|_| ())
    }

    async fn validate_session_token(&self, session_token: &str) -> Result<bool, BackendError> {
        let body = json!({ "p_session_token": session_token });
        let response: ValidateResponse = self.rpc("validate_admin_session", &body).await?;
        Ok(response.valid)
    }
}
