//! Typed HTTP client for the FoodConnect API, plus a pluggable local cache for
//! per-owner listings.

pub mod cache;

use reqwest::{Client, Method, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use foodconnect_types::api::{
    CreateDonationRequest, CreateFoodRequest, CreateMessageRequest, CreateNotificationRequest,
    LoginRequest, RegisterRequest, UpdateStatusRequest,
};
use foodconnect_types::models::{
    Donation, DonationStatus, FoodRequest, Identity, Message, Notification, Profile,
    RequestStatus,
};

pub use cache::{CachedDonations, CachedRequests, LocalCache, MemoryCache};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with `success: false` or a non-2xx status.
    #[error("Server answered {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Health {
    pub status: String,
    pub message: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
    caller: Option<Uuid>,
}

impl ApiClient {
    /// `base` is the server root, e.g. `http://localhost:5000`. The `/api` prefix is added here.
    pub fn new(base: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base).map_err(|e| ClientError::InvalidUrl(format!("{}: {}", base, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base.to_string()));
        }
        Ok(Self {
            http: Client::new(),
            base,
            caller: None,
        })
    }

    /// Send `X-User-Id` on every request. Needed when the server enforces ownership.
    pub fn with_caller(mut self, id: Uuid) -> Self {
        self.caller = Some(id);
        self
    }

    // -- Auth --

    pub async fn register(&self, req: &RegisterRequest) -> Result<Identity, ClientError> {
        let builder = self.request(Method::POST, &["auth", "register"])?.json(req);
        self.send(builder, "user").await
    }

    pub async fn login(&self, req: &LoginRequest) -> Result<Identity, ClientError> {
        let builder = self.request(Method::POST, &["auth", "login"])?.json(req);
        self.send(builder, "user").await
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<Profile, ClientError> {
        let id = user_id.to_string();
        let builder = self.request(Method::GET, &["auth", "profile", &id])?;
        self.send(builder, "user").await
    }

    // -- Donations --

    pub async fn list_donations(&self, owner_email: &str) -> Result<Vec<Donation>, ClientError> {
        let builder = self.request(Method::GET, &["donations", "user", owner_email])?;
        self.send(builder, "donations").await
    }

    pub async fn create_donation(&self, req: &CreateDonationRequest) -> Result<Donation, ClientError> {
        let builder = self.request(Method::POST, &["donations"])?.json(req);
        self.send(builder, "donation").await
    }

    pub async fn update_donation_status(
        &self,
        id: Uuid,
        status: DonationStatus,
    ) -> Result<Donation, ClientError> {
        let id = id.to_string();
        let builder = self
            .request(Method::PATCH, &["donations", &id, "status"])?
            .json(&UpdateStatusRequest { status });
        self.send(builder, "donation").await
    }

    pub async fn delete_donation(&self, id: Uuid) -> Result<(), ClientError> {
        let id = id.to_string();
        let builder = self.request(Method::DELETE, &["donations", &id])?;
        self.envelope(builder).await.map(drop)
    }

    // -- Requests --

    pub async fn list_requests(&self, owner_email: &str) -> Result<Vec<FoodRequest>, ClientError> {
        let builder = self.request(Method::GET, &["requests", "user", owner_email])?;
        self.send(builder, "requests").await
    }

    pub async fn create_request(&self, req: &CreateFoodRequest) -> Result<FoodRequest, ClientError> {
        let builder = self.request(Method::POST, &["requests"])?.json(req);
        self.send(builder, "request").await
    }

    pub async fn update_request_status(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> Result<FoodRequest, ClientError> {
        let id = id.to_string();
        let builder = self
            .request(Method::PATCH, &["requests", &id, "status"])?
            .json(&UpdateStatusRequest { status });
        self.send(builder, "request").await
    }

    pub async fn delete_request(&self, id: Uuid) -> Result<(), ClientError> {
        let id = id.to_string();
        let builder = self.request(Method::DELETE, &["requests", &id])?;
        self.envelope(builder).await.map(drop)
    }

    // -- Messages --

    pub async fn list_messages(&self, owner_email: &str) -> Result<Vec<Message>, ClientError> {
        let builder = self.request(Method::GET, &["messages", "user", owner_email])?;
        self.send(builder, "messages").await
    }

    pub async fn create_message(&self, req: &CreateMessageRequest) -> Result<Message, ClientError> {
        let builder = self.request(Method::POST, &["messages"])?.json(req);
        self.send(builder, "data").await
    }

    pub async fn mark_message_read(&self, id: Uuid) -> Result<Message, ClientError> {
        let id = id.to_string();
        let builder = self.request(Method::PATCH, &["messages", &id, "read"])?;
        self.send(builder, "data").await
    }

    pub async fn delete_message(&self, id: Uuid) -> Result<(), ClientError> {
        let id = id.to_string();
        let builder = self.request(Method::DELETE, &["messages", &id])?;
        self.envelope(builder).await.map(drop)
    }

    // -- Notifications --

    pub async fn list_notifications(&self, owner_email: &str) -> Result<Vec<Notification>, ClientError> {
        let builder = self.request(Method::GET, &["notifications", "user", owner_email])?;
        self.send(builder, "notifications").await
    }

    pub async fn create_notification(
        &self,
        req: &CreateNotificationRequest,
    ) -> Result<Notification, ClientError> {
        let builder = self.request(Method::POST, &["notifications"])?.json(req);
        self.send(builder, "data").await
    }

    pub async fn mark_notification_read(&self, id: Uuid) -> Result<Notification, ClientError> {
        let id = id.to_string();
        let builder = self.request(Method::PATCH, &["notifications", &id, "read"])?;
        self.send(builder, "data").await
    }

    pub async fn delete_notification(&self, id: Uuid) -> Result<(), ClientError> {
        let id = id.to_string();
        let builder = self.request(Method::DELETE, &["notifications", &id])?;
        self.envelope(builder).await.map(drop)
    }

    /// Returns how many notifications were removed.
    pub async fn clear_notifications(&self, owner_email: &str) -> Result<usize, ClientError> {
        let builder = self.request(Method::DELETE, &["notifications", "user", owner_email])?;
        self.send(builder, "cleared").await
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        let builder = self.request(Method::GET, &["health"])?;
        let res = builder.send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status,
                message: res.text().await.unwrap_or_default(),
            });
        }
        Ok(res.json().await?)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);

        let mut builder = self.http.request(method, url);
        if let Some(caller) = self.caller {
            builder = builder.header("X-User-Id", caller.to_string());
        }
        Ok(builder)
    }

    /// Send and unwrap the `{ success, message, ... }` envelope.
    async fn envelope(&self, builder: RequestBuilder) -> Result<Value, ClientError> {
        let res = builder.send().await?;
        let status = res.status();
        let body: Value = res
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("{} body is not JSON: {}", status, e)))?;

        let success = body.get("success").and_then(Value::as_bool).unwrap_or(false);
        if !status.is_success() || !success {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Request failed")
                .to_string();
            debug!("API error {}: {}", status, message);
            return Err(ClientError::Api { status, message });
        }
        Ok(body)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        field: &'static str,
    ) -> Result<T, ClientError> {
        let mut body = self.envelope(builder).await?;
        let value = body
            .get_mut(field)
            .map(Value::take)
            .ok_or_else(|| ClientError::Decode(format!("missing '{}' in response", field)))?;
        serde_json::from_value(value)
            .map_err(|e| ClientError::Decode(format!("bad '{}' in response: {}", field, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_api_urls() {
        let client = ApiClient::new("http://localhost:5000/").unwrap();
        let req = client
            .request(Method::GET, &["donations", "user", "d+x@example.com"])
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(
            req.url().as_str(),
            "http://localhost:5000/api/donations/user/d+x@example.com"
        );
        assert!(req.headers().get("X-User-Id").is_none());
    }

    #[test]
    fn caller_header_is_attached() {
        let id = Uuid::new_v4();
        let client = ApiClient::new("http://localhost:5000").unwrap().with_caller(id);
        let req = client.request(Method::DELETE, &["messages", "abc"]).unwrap().build().unwrap();
        assert_eq!(req.headers()["X-User-Id"], id.to_string().as_str());
    }

    #[test]
    fn rejects_unusable_base() {
        assert!(matches!(ApiClient::new("not a url"), Err(ClientError::InvalidUrl(_))));
        assert!(matches!(ApiClient::new("mailto:a@b.c"), Err(ClientError::InvalidUrl(_))));
    }
}
