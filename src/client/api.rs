use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use super::cache::{ClientCache, ItemScope};
use crate::model::{Item, ItemPatch, NewItem, Subscriber};
use crate::wire::{
    ErrorBody, HealthResponse, LoginRequest, LoginResponse, MessageBody, SubscribeRequest,
    SubscribeResponse,
};

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Rejected { status: u16, message: String },
}

impl ClientError {
    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
        }
    }
}

/// Thin async client for the `/api` routes.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// `base_url` is the server root, e.g. `http://127.0.0.1:3001`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        decode(self.http.get(self.url("/health")).send().await?).await
    }

    pub async fn active_items(&self) -> Result<Vec<Item>, ClientError> {
        decode(self.http.get(self.url("/items")).send().await?).await
    }

    pub async fn all_items(&self) -> Result<Vec<Item>, ClientError> {
        decode(self.http.get(self.url("/items/all")).send().await?).await
    }

    pub async fn item(&self, id: &str) -> Result<Item, ClientError> {
        let url = self.url(&format!("/items/{}", id));
        decode(self.http.get(url).send().await?).await
    }

    pub async fn create_item(&self, fields: &NewItem) -> Result<Item, ClientError> {
        let response = self.http.post(self.url("/items")).json(fields).send().await?;
        decode(response).await
    }

    pub async fn update_item(&self, id: &str, patch: &ItemPatch) -> Result<Item, ClientError> {
        let url = self.url(&format!("/items/{}", id));
        decode(self.http.put(url).json(patch).send().await?).await
    }

    pub async fn delete_item(&self, id: &str) -> Result<(), ClientError> {
        let url = self.url(&format!("/items/{}", id));
        decode::<MessageBody>(self.http.delete(url).send().await?).await?;
        Ok(())
    }

    pub async fn subscribers(&self) -> Result<Vec<Subscriber>, ClientError> {
        decode(self.http.get(self.url("/subscribers")).send().await?).await
    }

    pub async fn subscribe(&self, email: &str) -> Result<Subscriber, ClientError> {
        let body = SubscribeRequest {
            email: email.to_string(),
        };
        let response = self.http.post(self.url("/subscribe")).json(&body).send().await?;
        let created: SubscribeResponse = decode(response).await?;
        Ok(created.subscriber)
    }

    pub async fn delete_subscriber(&self, id: &str) -> Result<(), ClientError> {
        let url = self.url(&format!("/subscribers/{}", id));
        decode::<MessageBody>(self.http.delete(url).send().await?).await?;
        Ok(())
    }

    /// Returns the session token on success.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.http.post(self.url("/login")).json(&body).send().await?;
        let login: LoginResponse = decode(response).await?;
        Ok(login.token)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => reason(status),
        };
        return Err(ClientError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.json().await?)
}

fn reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("unexpected status")
        .to_string()
}

/// An [`ApiClient`] paired with a [`ClientCache`] and the admin session.
///
/// Each mutation goes to the server first; the cache is only updated from
/// the server's response.
pub struct SyncedClient {
    api: ApiClient,
    cache: ClientCache,
    token: Option<String>,
}

impl SyncedClient {
    pub fn new(base_url: &str, scope: ItemScope) -> Self {
        Self {
            api: ApiClient::new(base_url),
            cache: ClientCache::new(scope),
            token: None,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache(&self) -> &ClientCache {
        &self.cache
    }

    pub async fn refresh_items(&mut self) -> Result<(), ClientError> {
        let items = match self.cache.scope() {
            ItemScope::Active => self.api.active_items().await?,
            ItemScope::All => self.api.all_items().await?,
        };
        self.cache.replace_items(items);
        Ok(())
    }

    pub async fn refresh_subscribers(&mut self) -> Result<(), ClientError> {
        let subscribers = self.api.subscribers().await?;
        self.cache.replace_subscribers(subscribers);
        Ok(())
    }

    pub async fn add_item(&mut self, fields: &NewItem) -> Result<Item, ClientError> {
        let item = self.api.create_item(fields).await?;
        self.cache.apply_created_item(item.clone());
        Ok(item)
    }

    pub async fn update_item(&mut self, id: &str, patch: &ItemPatch) -> Result<Item, ClientError> {
        let item = self.api.update_item(id, patch).await?;
        self.cache.apply_updated_item(item.clone());
        Ok(item)
    }

    pub async fn delete_item(&mut self, id: &str) -> Result<(), ClientError> {
        self.api.delete_item(id).await?;
        self.cache.remove_item(id);
        Ok(())
    }

    pub async fn subscribe(&mut self, email: &str) -> Result<Subscriber, ClientError> {
        let subscriber = self.api.subscribe(email).await?;
        self.cache.apply_subscribed(subscriber.clone());
        Ok(subscriber)
    }

    pub async fn delete_subscriber(&mut self, id: &str) -> Result<(), ClientError> {
        self.api.delete_subscriber(id).await?;
        self.cache.remove_subscriber(id);
        Ok(())
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ClientError> {
        let token = self.api.login(username, password).await?;
        self.token = Some(token);
        Ok(())
    }

    pub fn logout(&mut self) {
        self.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}
