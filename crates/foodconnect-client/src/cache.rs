use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use foodconnect_types::api::{CreateDonationRequest, CreateFoodRequest};
use foodconnect_types::models::{Donation, DonationStatus, FoodRequest, RequestStatus, normalize_email};

use crate::{ApiClient, ClientError};

/// String key/value store for listings a client has already fetched. Injected so a host
/// can back it with whatever local storage it has.
pub trait LocalCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn clear(&self, key: &str);
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value);
    }

    fn clear(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
    }
}

impl<C: LocalCache + ?Sized> LocalCache for &C {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: String) {
        (**self).set(key, value)
    }

    fn clear(&self, key: &str) {
        (**self).clear(key)
    }
}

pub fn donations_key(owner_email: &str) -> String {
    format!("donations_{}", normalize_email(owner_email))
}

pub fn requests_key(owner_email: &str) -> String {
    format!("requests_{}", normalize_email(owner_email))
}

fn load<T: DeserializeOwned>(cache: &impl LocalCache, key: &str) -> Option<T> {
    let raw = cache.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Dropping unreadable cache entry {}: {}", key, e);
            cache.clear(key);
            None
        }
    }
}

fn store<T: Serialize>(cache: &impl LocalCache, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => cache.set(key, raw),
        Err(e) => warn!("Could not cache {}: {}", key, e),
    }
}

/// Read-through view of one owner's donations. Writes go to the server and drop
/// the owner's cached listing.
pub struct CachedDonations<'a, C> {
    client: &'a ApiClient,
    cache: C,
}

impl<'a, C: LocalCache> CachedDonations<'a, C> {
    pub fn new(client: &'a ApiClient, cache: C) -> Self {
        Self { client, cache }
    }

    pub async fn list(&self, owner_email: &str) -> Result<Vec<Donation>, ClientError> {
        let key = donations_key(owner_email);
        if let Some(hit) = load(&self.cache, &key) {
            debug!("Cache hit: {}", key);
            return Ok(hit);
        }
        self.refresh(owner_email).await
    }

    /// Fetch from the server and overwrite the cached listing.
    pub async fn refresh(&self, owner_email: &str) -> Result<Vec<Donation>, ClientError> {
        let fresh = self.client.list_donations(owner_email).await?;
        store(&self.cache, &donations_key(owner_email), &fresh);
        Ok(fresh)
    }

    pub async fn create(&self, req: &CreateDonationRequest) -> Result<Donation, ClientError> {
        let donation = self.client.create_donation(req).await?;
        self.invalidate(&donation.owner_email);
        Ok(donation)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: DonationStatus,
    ) -> Result<Donation, ClientError> {
        let donation = self.client.update_donation_status(id, status).await?;
        self.invalidate(&donation.owner_email);
        Ok(donation)
    }

    pub async fn delete(&self, owner_email: &str, id: Uuid) -> Result<(), ClientError> {
        self.client.delete_donation(id).await?;
        self.invalidate(owner_email);
        Ok(())
    }

    pub fn invalidate(&self, owner_email: &str) {
        self.cache.clear(&donations_key(owner_email));
    }
}

/// Same as [`CachedDonations`], for food requests.
pub struct CachedRequests<'a, C> {
    client: &'a ApiClient,
    cache: C,
}

impl<'a, C: LocalCache> CachedRequests<'a, C> {
    pub fn new(client: &'a ApiClient, cache: C) -> Self {
        Self { client, cache }
    }

    pub async fn list(&self, owner_email: &str) -> Result<Vec<FoodRequest>, ClientError> {
        let key = requests_key(owner_email);
        if let Some(hit) = load(&self.cache, &key) {
            debug!("Cache hit: {}", key);
            return Ok(hit);
        }
        self.refresh(owner_email).await
    }

    pub async fn refresh(&self, owner_email: &str) -> Result<Vec<FoodRequest>, ClientError> {
        let fresh = self.client.list_requests(owner_email).await?;
        store(&self.cache, &requests_key(owner_email), &fresh);
        Ok(fresh)
    }

    pub async fn create(&self, req: &CreateFoodRequest) -> Result<FoodRequest, ClientError> {
        let request = self.client.create_request(req).await?;
        self.invalidate(&request.owner_email);
        Ok(request)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: RequestStatus,
    ) -> Result<FoodRequest, ClientError> {
        let request = self.client.update_request_status(id, status).await?;
        self.invalidate(&request.owner_email);
        Ok(request)
    }

    pub async fn delete(&self, owner_email: &str, id: Uuid) -> Result<(), ClientError> {
        self.client.delete_request(id).await?;
        self.invalidate(owner_email);
        Ok(())
    }

    pub fn invalidate(&self, owner_email: &str) {
        self.cache.clear(&requests_key(owner_email));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_cache_round_trip() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("k"), None);

        cache.set("k", "v1".into());
        cache.set("k", "v2".into());
        assert_eq!(cache.get("k").as_deref(), Some("v2"));

        cache.clear("k");
        assert_eq!(cache.get("k"), None);
        cache.clear("k");
    }

    #[test]
    fn keys_are_per_owner_and_normalized() {
        assert_eq!(donations_key(" Dana@Example.com "), "donations_dana@example.com");
        assert_eq!(requests_key("dana@example.com"), "requests_dana@example.com");
        assert_ne!(donations_key("a@x.com"), donations_key("b@x.com"));
    }

    #[test]
    fn unreadable_entries_are_dropped() {
        let cache = MemoryCache::new();
        cache.set("donations_a@x.com", "{not json".into());

        let loaded: Option<Vec<Donation>> = load(&cache, "donations_a@x.com");
        assert!(loaded.is_none());
        assert_eq!(cache.get("donations_a@x.com"), None);

        store(&cache, "donations_a@x.com", &Vec::<Donation>::new());
        let loaded: Option<Vec<Donation>> = load(&cache, "donations_a@x.com");
        assert_eq!(loaded.map(|d| d.len()), Some(0));
    }
}
