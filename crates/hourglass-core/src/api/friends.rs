//! Friend list and friend request endpoints.

use tracing::info;

use super::{ApiClient, ApiError};
use crate::models::{Friend, FriendRequest, FriendRequestCreate, MessageResponse};

/// No query parameters
const NO_QUERY: &[(&str, &str)] = &[];

pub struct FriendsApi<'a> {
    api: &'a ApiClient,
}

impl<'a> FriendsApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Friend>, ApiError> {
        self.api.get("/friends/friends").await
    }

    pub async fn get(&self, friend_id: i64) -> Result<Friend, ApiError> {
        self.api
            .get(&format!("/friends/friends/{}", friend_id))
            .await
    }

    /// Pending requests sent to the current user
    pub async fn received_requests(&self) -> Result<Vec<FriendRequest>, ApiError> {
        self.api.get("/friends/friend-requests/received").await
    }

    /// Pending requests the current user sent
    pub async fn sent_requests(&self) -> Result<Vec<FriendRequest>, ApiError> {
        self.api.get("/friends/friend-requests/sent").await
    }

    pub async fn send_request(&self, receiver_email: &str) -> Result<FriendRequest, ApiError> {
        let body = FriendRequestCreate {
            receiver_email: receiver_email.trim().to_string(),
        };
        let request: FriendRequest = self.api.post("/friends/friend-request", &body).await?;
        info!(request_id = request.request_id, "Friend request sent");
        Ok(request)
    }

    pub async fn accept(&self, request_id: i64) -> Result<MessageResponse, ApiError> {
        self.api
            .post_action(
                &format!("/friends/friend-request/{}/accept", request_id),
                NO_QUERY,
            )
            .await
    }

    pub async fn reject(&self, request_id: i64) -> Result<MessageResponse, ApiError> {
        self.api
            .post_action(
                &format!("/friends/friend-request/{}/reject", request_id),
                NO_QUERY,
            )
            .await
    }
}
