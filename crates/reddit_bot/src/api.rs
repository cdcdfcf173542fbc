//! Minimal Reddit client for a script-type app.
//!
//! Covers exactly what the dispatcher needs: OAuth password-grant login,
//! the unread inbox, marking messages read, replying, composing a private
//! message and resolving a thing's author.

use reqwest::{Client, StatusCode};
use serde::Deserialize;

const WWW_BASE: &str = "https://www.reddit.com";
const OAUTH_BASE: &str = "https://oauth.reddit.com";

/// Script-app credentials, loaded once at startup.
#[derive(Clone, Debug)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{status}: {message}")]
    Server { status: StatusCode, message: String },
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Thing>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    data: InboxMessage,
}

/// One inbox item. `author` is absent for deleted accounts, `parent_id`
/// for private messages that start a thread.
#[derive(Clone, Debug, Deserialize)]
pub struct InboxMessage {
    pub name: String,
    pub author: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub was_comment: bool,
    pub parent_id: Option<String>,
}

#[derive(Debug)]
pub(crate) struct RedditClient {
    http: Client,
    config: RedditConfig,
    token: Option<String>,
}

impl RedditClient {
    pub(crate) fn new(config: RedditConfig) -> Result<Self, ApiError> {
        let http = Client::builder().user_agent(config.user_agent.clone()).build()?;
        Ok(Self {
            http,
            config,
            token: None,
        })
    }

    async fn login(&mut self) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(format!("{WWW_BASE}/api/v1/access_token"))
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[
                ("grant_type", "password"),
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(server_error(status, resp).await);
        }
        let token: TokenResponse = resp.json().await?;
        self.token = Some(token.access_token);
        Ok(())
    }

    async fn token(&mut self) -> Result<String, ApiError> {
        if self.token.is_none() {
            self.login().await?;
        }
        // Set right above on the None path.
        Ok(self.token.clone().unwrap_or_default())
    }

    /// GET an oauth endpoint, re-authenticating once on a 401.
    async fn get_json<T: for<'de> Deserialize<'de>>(&mut self, path: &str) -> Result<T, ApiError> {
        let mut token = self.token().await?;
        for _ in 0..2 {
            let resp = self
                .http
                .get(format!("{OAUTH_BASE}{path}"))
                .bearer_auth(&token)
                .send()
                .await?;
            let status = resp.status();
            if status == StatusCode::UNAUTHORIZED {
                self.token = None;
                token = self.token().await?;
                continue;
            }
            if !status.is_success() {
                return Err(server_error(status, resp).await);
            }
            return Ok(resp.json::<T>().await?);
        }
        Err(ApiError::Server {
            status: StatusCode::UNAUTHORIZED,
            message: "authentication kept failing".to_string(),
        })
    }

    /// POST a form to an oauth endpoint, re-authenticating once on a 401.
    async fn post_form(&mut self, path: &str, form: &[(&str, &str)]) -> Result<(), ApiError> {
        let mut token = self.token().await?;
        for _ in 0..2 {
            let resp = self
                .http
                .post(format!("{OAUTH_BASE}{path}"))
                .bearer_auth(&token)
                .form(form)
                .send()
                .await?;
            let status = resp.status();
            if status == StatusCode::UNAUTHORIZED {
                self.token = None;
                token = self.token().await?;
                continue;
            }
            if !status.is_success() {
                return Err(server_error(status, resp).await);
            }
            return Ok(());
        }
        Err(ApiError::Server {
            status: StatusCode::UNAUTHORIZED,
            message: "authentication kept failing".to_string(),
        })
    }

    pub(crate) async fn unread_messages(&mut self) -> Result<Vec<InboxMessage>, ApiError> {
        let listing: Listing = self.get_json("/message/unread?limit=100").await?;
        Ok(listing.data.children.into_iter().map(|t| t.data).collect())
    }

    pub(crate) async fn mark_read(&mut self, fullname: &str) -> Result<(), ApiError> {
        self.post_form("/api/read_message", &[("id", fullname)]).await
    }

    /// Reply to a comment or private message.
    pub(crate) async fn reply(&mut self, fullname: &str, text: &str) -> Result<(), ApiError> {
        self.post_form(
            "/api/comment",
            &[("api_type", "json"), ("thing_id", fullname), ("text", text)],
        )
        .await
    }

    /// Start a private-message thread.
    pub(crate) async fn compose(
        &mut self,
        to: &str,
        subject: &str,
        text: &str,
    ) -> Result<(), ApiError> {
        self.post_form(
            "/api/compose",
            &[
                ("api_type", "json"),
                ("to", to),
                ("subject", subject),
                ("text", text),
            ],
        )
        .await
    }

    /// Author of an arbitrary thing (used for the parent of a mention).
    pub(crate) async fn author_of(&mut self, fullname: &str) -> Result<Option<String>, ApiError> {
        let listing: Listing = self.get_json(&format!("/api/info?id={fullname}")).await?;
        Ok(listing
            .data
            .children
            .into_iter()
            .next()
            .and_then(|t| t.data.author))
    }
}

async fn server_error(status: StatusCode, resp: reqwest::Response) -> ApiError {
    let message = match resp.json::<ErrorBody>().await {
        Ok(err) => err.message,
        Err(_) => "server error".to_string(),
    };
    ApiError::Server { status, message }
}
