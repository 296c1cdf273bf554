//! Login/logout and current-user endpoints.

use reqwest::Method;
use serde::Deserialize;
use serde_json::json;

use shopno_auth::{AuthUser, Permission, Role};
use shopno_core::EntityId;

use crate::{ApiClient, ApiResult};

/// `POST /api/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: AuthUser,
}

/// Authentication collaborator: owns the session token lifecycle.
#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchange credentials for a token and store it (and the user) in the session.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<AuthUser> {
        let body = json!({ "email": email, "password": password });
        let resp: LoginResponse = self.client.send_json(Method::POST, "login", &body).await?;

        let session = self.client.session();
        session.set_token(resp.token);
        session.set_user(resp.user.clone());
        tracing::info!(user_id = %resp.user.id, "signed in");
        Ok(resp.user)
    }

    /// Revoke the token server-side; the local session is cleared either way.
    pub async fn logout(&self) -> ApiResult<()> {
        let result = self.client.send_empty(Method::POST, "logout", None).await;
        self.client.session().invalidate();
        result
    }

    /// `GET /api/user`, refreshing the session's cached user.
    pub async fn current_user(&self) -> ApiResult<AuthUser> {
        let user: AuthUser = self.client.get_json("user").await?;
        self.client.session().set_user(user.clone());
        Ok(user)
    }

    /// `GET /api/permissions`: every permission token the server knows.
    pub async fn permissions(&self) -> ApiResult<Vec<Permission>> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Entry {
            Plain(String),
            Named { name: String },
        }

        let entries: Vec<Entry> = self.client.get_json("permissions").await?;
        Ok(entries
            .into_iter()
            .map(|e| match e {
                Entry::Plain(name) | Entry::Named { name } => Permission::new(name),
            })
            .collect())
    }

    /// `PUT /api/users/{id}/roles`: replace a user's role assignment.
    pub async fn assign_roles<T>(&self, user_id: EntityId, roles: &[Role]) -> ApiResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let body = json!({ "roles": roles });
        self.client
            .send_json(Method::PUT, &format!("users/{user_id}/roles"), &body)
            .await
    }
}
