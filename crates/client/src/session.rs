//! Session lifecycle for front-end shells.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::menu::AccountMenu;

/// Navigation seam: the host shell decides what "go to a route" means.
pub trait Navigator {
    fn navigate(&mut self, route: &str);
}

/// Identity returned by the server's login mutation.
#[derive(Clone, Debug, Deserialize)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

const LOGIN_MUTATION: &str = r#"
    mutation Login($email: String!, $password: String!) {
        login(email: $email, password: $password) {
            ok
            error
            user { id name email role }
        }
    }
"#;

const LOGOUT_MUTATION: &str = "mutation Logout { logout }";

/// Cookie-aware GraphQL client holding the current session identity.
pub struct SessionClient {
    http: reqwest::Client,
    endpoint: String,
    user: Option<AuthUser>,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct LoginData {
    login: LoginPayload,
}

#[derive(Deserialize)]
struct LoginPayload {
    ok: bool,
    user: Option<AuthUser>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct LogoutData {
    logout: bool,
}

impl SessionClient {
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(std::time::Duration::from_secs(config.timeout))
            .build()?;
        Ok(Self {
            http,
            endpoint: config.graphql_url(),
            user: None,
        })
    }

    pub fn current_user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> ClientResult<T> {
        let response = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        let body: GraphqlResponse<T> = response.json().await?;
        if let Some(err) = body.errors.into_iter().next() {
            return Err(ClientError::Server(err.message));
        }
        body.data
            .ok_or_else(|| ClientError::InvalidResponse("missing data".into()))
    }

    /// Authenticate against the server and remember the returned identity.
    /// The session cookie set by the server stays in this client's jar.
    pub async fn login(&mut self, email: &str, password: &str) -> ClientResult<AuthUser> {
        let data: LoginData = self
            .execute(
                LOGIN_MUTATION,
                json!({ "email": email, "password": password }),
            )
            .await?;
        if !data.login.ok {
            return Err(ClientError::InvalidCredentials(
                data.login
                    .error
                    .unwrap_or_else(|| "Invalid credentials".into()),
            ));
        }
        let user = data.login.user.ok_or_else(|| {
            ClientError::InvalidResponse("login payload missing user".into())
        })?;
        debug!(email = %user.email, "session established");
        self.user = Some(user.clone());
        Ok(user)
    }

    /// End the session. The menu closes and the local identity is dropped
    /// first, then the server logout mutation runs exactly once, then the
    /// shell navigates home. Navigation happens even when the server call
    /// fails; the failure is still reported to the caller.
    pub async fn logout<N: Navigator>(
        &mut self,
        menu: &mut AccountMenu,
        navigator: &mut N,
    ) -> ClientResult<bool> {
        menu.close();
        self.user = None;
        let result = self.execute::<LogoutData>(LOGOUT_MUTATION, json!({})).await;
        navigator.navigate("/");
        result.map(|data| data.logout)
    }
}
