//! Contact Service

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::application::dto::social::{ContactResponse, UpdateContactsRequest};
use crate::domain::{BlockUserRepository, Contact, ContactRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait ContactService: Send + Sync {
    /// Replace the member's contacts with `request.contacts`.
    async fn update_contacts(
        &self,
        member_id: i64,
        request: UpdateContactsRequest,
    ) -> Result<Vec<ContactResponse>, ContactError>;

    async fn find_contacts(&self, member_id: i64) -> Result<Vec<ContactResponse>, ContactError>;

    /// Contacts of another member; hidden when either side blocks the other.
    async fn find_contacts_of(&self, viewer_id: i64, member_id: i64) -> Result<Vec<ContactResponse>, ContactError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error("Contact type listed twice")]
    DuplicateType,

    #[error("Member not found")]
    MemberNotFound,

    #[error(transparent)]
    Repository(#[from] AppError),
}

impl From<ContactError> for AppError {
    fn from(err: ContactError) -> Self {
        match err {
            ContactError::DuplicateType => AppError::BadRequest("contact.type.duplicate".into()),
            ContactError::MemberNotFound => AppError::NotFound("member.not.found".into()),
            ContactError::Repository(e) => e,
        }
    }
}

pub struct ContactServiceImpl {
    contacts: Arc<dyn ContactRepository>,
    blocks: Arc<dyn BlockUserRepository>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl ContactServiceImpl {
    pub fn new(
        contacts: Arc<dyn ContactRepository>,
        blocks: Arc<dyn BlockUserRepository>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            contacts,
            blocks,
            id_generator,
        }
    }
}

#[async_trait]
impl ContactService for ContactServiceImpl {
    #[instrument(skip(self, request))]
    async fn update_contacts(
        &self,
        member_id: i64,
        request: UpdateContactsRequest,
    ) -> Result<Vec<ContactResponse>, ContactError> {
        let mut seen = HashSet::new();
        if !request.contacts.iter().all(|c| seen.insert(c.contact_type)) {
            return Err(ContactError::DuplicateType);
        }

        let contacts: Vec<Contact> = request
            .contacts
            .into_iter()
            .map(|entry| Contact {
                id: self.id_generator.generate(),
                member_id,
                contact_type: entry.contact_type,
                value: entry.value.trim().to_string(),
            })
            .collect();

        let saved = self.contacts.replace_all(member_id, &contacts).await?;
        info!(member_id, total = saved.len(), "Contacts updated");
        Ok(saved.into_iter().map(ContactResponse::from).collect())
    }

    async fn find_contacts(&self, member_id: i64) -> Result<Vec<ContactResponse>, ContactError> {
        let contacts = self.contacts.find_by_member(member_id).await?;
        Ok(contacts.into_iter().map(ContactResponse::from).collect())
    }

    async fn find_contacts_of(&self, viewer_id: i64, member_id: i64) -> Result<Vec<ContactResponse>, ContactError> {
        if viewer_id != member_id && self.blocks.is_blocked_either_way(viewer_id, member_id).await? {
            return Err(ContactError::MemberNotFound);
        }
        self.find_contacts(member_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dto::social::ContactEntry;
    use crate::domain::{ContactType, MockBlockUserRepository, MockContactRepository};

    fn service(contacts: MockContactRepository, blocks: MockBlockUserRepository) -> ContactServiceImpl {
        ContactServiceImpl::new(Arc::new(contacts), Arc::new(blocks), Arc::new(SnowflakeGenerator::new(1, 1)))
    }

    fn entry(contact_type: ContactType, value: &str) -> ContactEntry {
        ContactEntry {
            contact_type,
            value: value.into(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_contact_type_is_rejected() {
        let mut contacts = MockContactRepository::new();
        contacts.expect_replace_all().never();

        let request = UpdateContactsRequest {
            contacts: vec![
                entry(ContactType::Email, "a@fleenfeen.test"),
                entry(ContactType::Email, "b@fleenfeen.test"),
            ],
        };
        let err = service(contacts, MockBlockUserRepository::new())
            .update_contacts(1, request)
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::DuplicateType));
    }

    #[tokio::test]
    async fn test_update_contacts_replaces_the_set() {
        let mut contacts = MockContactRepository::new();
        contacts
            .expect_replace_all()
            .withf(|member_id, contacts| {
                *member_id == 1 && contacts.len() == 2 && contacts.iter().all(|c| c.member_id == 1)
            })
            .returning(|_, contacts| Ok(contacts.to_vec()));

        let request = UpdateContactsRequest {
            contacts: vec![
                entry(ContactType::Telegram, " @ada "),
                entry(ContactType::X, "@ada"),
            ],
        };
        let saved = service(contacts, MockBlockUserRepository::new())
            .update_contacts(1, request)
            .await
            .unwrap();
        assert_eq!(saved[0].value, "@ada");
        assert_eq!(saved[1].contact_type.value, "X");
    }

    #[tokio::test]
    async fn test_contacts_of_blocked_member_are_hidden() {
        let mut blocks = MockBlockUserRepository::new();
        blocks.expect_is_blocked_either_way().returning(|_, _| Ok(true));

        let err = service(MockContactRepository::new(), blocks)
            .find_contacts_of(1, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, ContactError::MemberNotFound));
    }
}
