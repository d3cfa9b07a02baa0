//! Event invitation endpoints.

use tracing::info;

use super::{ApiClient, ApiError};
use crate::models::{
    Invitation, InvitationCreate, InvitationRespond, InvitationStatus, Participant,
    SentInvitationsQuery,
};

pub struct InvitationsApi<'a> {
    api: &'a ApiClient,
}

impl<'a> InvitationsApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn create(&self, event_id: i64, invited_user_id: i64) -> Result<Invitation, ApiError> {
        let body = InvitationCreate {
            event_id,
            invited_user_id,
        };
        self.api.post("/invitations/", &body).await
    }

    /// Accept or reject a received invitation.
    pub async fn respond(
        &self,
        invitation_id: i64,
        status: InvitationStatus,
    ) -> Result<Invitation, ApiError> {
        let body = InvitationRespond {
            invitation_id,
            status,
        };
        let invitation: Invitation = self.api.post("/invitations/respond", &body).await?;
        info!(invitation_id, status = status.as_str(), "Invitation answered");
        Ok(invitation)
    }

    /// Pending invitations addressed to the current user
    pub async fn received(&self) -> Result<Vec<Invitation>, ApiError> {
        self.api.get("/invitations/received").await
    }

    pub async fn sent(&self, query: &SentInvitationsQuery) -> Result<Vec<Invitation>, ApiError> {
        self.api.get_with_query("/invitations/sent", query).await
    }

    pub async fn participants(&self, event_id: i64) -> Result<Vec<Participant>, ApiError> {
        self.api
            .get(&format!("/invitations/participants/{}", event_id))
            .await
    }

    /// Withdraw a pending invitation the current user sent.
    pub async fn cancel(&self, invitation_id: i64) -> Result<(), ApiError> {
        self.api
            .delete(&format!("/invitations/{}", invitation_id))
            .await
    }
}
