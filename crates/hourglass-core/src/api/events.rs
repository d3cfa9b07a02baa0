//! Event endpoints.

use tracing::info;

use super::{ApiClient, ApiError};
use crate::models::{Event, EventClass, EventCreate, EventQuery, EventUpdate};

pub struct EventsApi<'a> {
    api: &'a ApiClient,
}

impl<'a> EventsApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Events visible to the current user, own and shared.
    pub async fn list(&self, query: &EventQuery) -> Result<Vec<Event>, ApiError> {
        self.api.get_with_query("/event/", query).await
    }

    pub async fn classes(&self) -> Result<Vec<EventClass>, ApiError> {
        self.api.get("/event/classes").await
    }

    pub async fn create(&self, event: &EventCreate) -> Result<Event, ApiError> {
        let created: Event = self.api.post("/event/", event).await?;
        info!(event_id = created.event_id, "Event created");
        Ok(created)
    }

    pub async fn update(&self, event_id: i64, update: &EventUpdate) -> Result<Event, ApiError> {
        self.api.put(&format!("/event/{}", event_id), update).await
    }

    pub async fn delete(&self, event_id: i64) -> Result<(), ApiError> {
        self.api.delete(&format!("/event/{}", event_id)).await?;
        info!(event_id, "Event deleted");
        Ok(())
    }

    /// Owner removes a participant from an event.
    pub async fn remove_participant(&self, event_id: i64, user_id: i64) -> Result<(), ApiError> {
        self.api
            .delete(&format!("/event/{}/remove/{}", event_id, user_id))
            .await
    }

    /// A participant leaves an event they were invited to.
    pub async fn withdraw(&self, event_id: i64) -> Result<(), ApiError> {
        self.api
            .delete(&format!("/event/{}/withdraw", event_id))
            .await
    }
}
