//! Matter endpoint surface.
//!
//! Plain tagged CRUD: list and get provide tags, mutations invalidate
//! them. No optimistic patching; the next read after a mutation refetches.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use lexhub_cache::{QueryCache, QueryKey};
use lexhub_core::AppResult;
use lexhub_core::types::ListQuery;
use lexhub_entity::{Matter, MatterPage};
use lexhub_gateway::{ApiRequest, RequestGateway};

use crate::tags::{MATTER_STATS, MATTERS, matter_tag};
use crate::unwrap_data;

/// Typed surface over the matter endpoints.
pub struct MattersApi {
    gateway: Arc<RequestGateway>,
    cache: Arc<QueryCache>,
}

impl std::fmt::Debug for MattersApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MattersApi").finish_non_exhaustive()
    }
}

impl MattersApi {
    /// Creates the surface over a shared gateway and cache.
    pub fn new(gateway: Arc<RequestGateway>, cache: Arc<QueryCache>) -> Self {
        Self { gateway, cache }
    }

    /// Fetch a page of matters, served from cache when fresh.
    pub async fn list(&self, query: &ListQuery) -> AppResult<MatterPage> {
        let key = QueryKey::new("matters", &query.to_pairs());
        let request = ApiRequest::get("/matters").query(query.to_pairs());
        let gateway = self.gateway.clone();

        let value = self
            .cache
            .fetch(&key, &[MATTERS], move || async move {
                let response = gateway.send(&request).await?;
                Ok(response.body)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Fetch one matter by id, served from cache when fresh.
    pub async fn get(&self, id: &str) -> AppResult<Matter> {
        let key = QueryKey::new("matter", &[("id".to_string(), id.to_string())]);
        let request = ApiRequest::get(format!("/matters/{id}"));
        let gateway = self.gateway.clone();
        let tag = matter_tag(id);

        let value = self
            .cache
            .fetch(&key, &[MATTERS, tag.as_str()], move || async move {
                let response = gateway.send(&request).await?;
                Ok(unwrap_data(response.body))
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Create a matter; invalidates list and stats entries.
    pub async fn create<T: Serialize>(&self, body: &T) -> AppResult<Matter> {
        let request = ApiRequest::post("/matters").json(body)?;
        let response = self.gateway.send(&request).await?;
        self.cache.invalidate(&[MATTERS, MATTER_STATS]);
        Ok(serde_json::from_value(unwrap_data(response.body))?)
    }

    /// Update a matter; invalidates its record plus list and stats entries.
    pub async fn update<T: Serialize>(&self, id: &str, body: &T) -> AppResult<Matter> {
        let request = ApiRequest::put(format!("/matters/{id}")).json(body)?;
        let response = self.gateway.send(&request).await?;
        self.cache
            .invalidate(&[MATTERS, MATTER_STATS, matter_tag(id).as_str()]);
        Ok(serde_json::from_value(unwrap_data(response.body))?)
    }

    /// Delete a matter; invalidates its record plus list and stats entries.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let request = ApiRequest::delete(format!("/matters/{id}"));
        let _: Value = self.gateway.send(&request).await?.body;
        self.cache
            .invalidate(&[MATTERS, MATTER_STATS, matter_tag(id).as_str()]);
        Ok(())
    }
}
