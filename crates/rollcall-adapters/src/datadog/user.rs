use async_trait::async_trait;

use rollcall_core::ids::UserId;
use rollcall_ports::error::PortError;
use rollcall_ports::outbound::Directory;
use rollcall_ports::types::DirectoryUser;

use super::wire::{Document, UserData};
use super::DatadogClient;

#[async_trait]
impl Directory for DatadogClient {
    async fn get_user(&self, user_id: &UserId) -> Result<DirectoryUser, PortError> {
        let doc: Document<UserData> = self
            .get_json(&format!("/api/v2/users/{}", user_id), &[])
            .await?;
        let attributes = doc.data.ok_or(PortError::NotFound)?.attributes;
        Ok(DirectoryUser {
            name: attributes.name,
            email: attributes.email,
        })
    }
}
