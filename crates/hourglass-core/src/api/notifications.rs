//! In-app notification endpoints.

use tracing::info;

use super::{ApiClient, ApiError};
use crate::models::{MessageResponse, Notification};

/// No query parameters
const NO_QUERY: &[(&str, &str)] = &[];

pub struct NotificationsApi<'a> {
    api: &'a ApiClient,
}

impl<'a> NotificationsApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// All notifications of the current user, newest first
    pub async fn list(&self) -> Result<Vec<Notification>, ApiError> {
        self.api.get("/notifications/").await
    }

    /// Mark one notification as read. The backend answers 400 if it already is.
    pub async fn mark_as_read(&self, notification_id: i64) -> Result<MessageResponse, ApiError> {
        let response: MessageResponse = self
            .api
            .post_action(
                &format!("/notifications/mark-as-read/{}", notification_id),
                NO_QUERY,
            )
            .await?;
        info!(notification_id, "Notification marked as read");
        Ok(response)
    }
}
