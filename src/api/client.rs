use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::api::Catalog;
use crate::config::ApiConfiguration;
use crate::entities::{
    Community, CommunityDraft, CommunityPatch, Property, PropertyDraft, PropertyPatch,
};
use crate::error::{Error, Result};
use crate::session::SessionProvider;

/// Reqwest-backed client for the listing backend.
///
/// Every call carries the bearer credential supplied by the injected
/// [`SessionProvider`]; a 401 expires the session (firing its hook) and
/// surfaces as [`Error::AuthExpired`].
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: Arc<ApiConfiguration>,
    session: Arc<dyn SessionProvider>,
}

impl ApiClient {
    pub fn new(config: ApiConfiguration, session: Arc<dyn SessionProvider>) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.credential() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(&self, response: Response) -> Result<Response> {
        if response.status() == StatusCode::UNAUTHORIZED {
            self.session.expire();
            return Err(Error::AuthExpired);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TransferFailed(format!("server returned {status}: {body}")));
        }
        Ok(response)
    }

    /// Exchanges credentials for a bearer token and stores it in the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        #[derive(Deserialize)]
        struct Token {
            access_token: String,
        }

        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        let response = self.check(response).await?;
        let token: Token = response.json().await.map_err(Error::transfer)?;
        self.session.store(token.access_token);
        debug!("logged in as {username}");
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let response = self.authorize(self.client.get(self.url(path))).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = self.check(response).await?;
        Ok(Some(response.json().await.map_err(Error::transfer)?))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let response = self
            .authorize(self.client.post(self.url(path)))
            .json(body)
            .send()
            .await?;
        let response = self.check(response).await?;
        response.json().await.map_err(Error::transfer)
    }

    async fn put_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>> {
        let response = self
            .authorize(self.client.put(self.url(path)))
            .json(body)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = self.check(response).await?;
        Ok(Some(response.json().await.map_err(Error::transfer)?))
    }

    async fn delete_path(&self, path: &str) -> Result<bool> {
        let response = self.authorize(self.client.delete(self.url(path))).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        self.check(response).await?;
        Ok(true)
    }
}

impl Catalog for ApiClient {
    async fn create_community(&self, draft: &CommunityDraft) -> Result<Community> {
        draft.validate()?;
        debug!("creating community '{}'", draft.name);
        self.post_json("/api/communities", draft).await
    }

    async fn update_community(&self, id: i64, patch: &CommunityPatch) -> Result<Option<Community>> {
        patch.validate()?;
        self.put_json(&format!("/api/communities/{id}"), patch).await
    }

    async fn get_community(&self, id: i64) -> Result<Option<Community>> {
        self.get_json(&format!("/api/communities/{id}")).await
    }

    async fn delete_community(&self, id: i64) -> Result<bool> {
        self.delete_path(&format!("/api/communities/{id}")).await
    }

    async fn list_communities(&self) -> Result<Vec<Community>> {
        Ok(self.get_json("/api/communities").await?.unwrap_or_default())
    }

    async fn create_property(&self, draft: &PropertyDraft) -> Result<Property> {
        draft.validate()?;
        debug!("creating property in community {}", draft.community_id);
        self.post_json("/api/properties", draft).await
    }

    async fn update_property(&self, id: i64, patch: &PropertyPatch) -> Result<Option<Property>> {
        patch.validate()?;
        self.put_json(&format!("/api/properties/{id}"), patch).await
    }

    async fn get_property(&self, id: i64) -> Result<Option<Property>> {
        self.get_json(&format!("/api/properties/{id}")).await
    }

    async fn delete_property(&self, id: i64) -> Result<bool> {
        self.delete_path(&format!("/api/properties/{id}")).await
    }

    async fn list_properties(&self) -> Result<Vec<Property>> {
        Ok(self.get_json("/api/properties").await?.unwrap_or_default())
    }
}
