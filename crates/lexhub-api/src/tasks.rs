//! Task endpoint surface.
//!
//! Same shape as the matter surface: tagged reads, invalidating writes.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use lexhub_cache::{QueryCache, QueryKey};
use lexhub_core::AppResult;
use lexhub_core::types::ListQuery;
use lexhub_entity::{Task, TaskPage};
use lexhub_gateway::{ApiRequest, RequestGateway};

use crate::tags::{TASK_STATS, TASKS, task_tag};
use crate::unwrap_data;

/// Typed surface over the task endpoints.
pub struct TasksApi {
    gateway: Arc<RequestGateway>,
    cache: Arc<QueryCache>,
}

impl std::fmt::Debug for TasksApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TasksApi").finish_non_exhaustive()
    }
}

impl TasksApi {
    /// Creates the surface over a shared gateway and cache.
    pub fn new(gateway: Arc<RequestGateway>, cache: Arc<QueryCache>) -> Self {
        Self { gateway, cache }
    }

    /// Fetch a page of tasks, served from cache when fresh.
    pub async fn list(&self, query: &ListQuery) -> AppResult<TaskPage> {
        let key = QueryKey::new("tasks", &query.to_pairs());
        let request = ApiRequest::get("/tasks").query(query.to_pairs());
        let gateway = self.gateway.clone();

        let value = self
            .cache
            .fetch(&key, &[TASKS], move || async move {
                let response = gateway.send(&request).await?;
                Ok(response.body)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Fetch one task by id, served from cache when fresh.
    pub async fn get(&self, id: &str) -> AppResult<Task> {
        let key = QueryKey::new("task", &[("id".to_string(), id.to_string())]);
        let request = ApiRequest::get(format!("/tasks/{id}"));
        let gateway = self.gateway.clone();
        let tag = task_tag(id);

        let value = self
            .cache
            .fetch(&key, &[TASKS, tag.as_str()], move || async move {
                let response = gateway.send(&request).await?;
                Ok(unwrap_data(response.body))
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Create a task; invalidates list and stats entries.
    pub async fn create<T: Serialize>(&self, body: &T) -> AppResult<Task> {
        let request = ApiRequest::post("/tasks").json(body)?;
        let response = self.gateway.send(&request).await?;
        self.cache.invalidate(&[TASKS, TASK_STATS]);
        Ok(serde_json::from_value(unwrap_data(response.body))?)
    }

    /// Update a task; invalidates its record plus list and stats entries.
    pub async fn update<T: Serialize>(&self, id: &str, body: &T) -> AppResult<Task> {
        let request = ApiRequest::put(format!("/tasks/{id}")).json(body)?;
        let response = self.gateway.send(&request).await?;
        self.cache
            .invalidate(&[TASKS, TASK_STATS, task_tag(id).as_str()]);
        Ok(serde_json::from_value(unwrap_data(response.body))?)
    }

    /// Delete a task; invalidates its record plus list and stats entries.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let request = ApiRequest::delete(format!("/tasks/{id}"));
        let _: Value = self.gateway.send(&request).await?.body;
        self.cache
            .invalidate(&[TASKS, TASK_STATS, task_tag(id).as_str()]);
        Ok(())
    }
}
