//! Contact, follower and block DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{BlockStatus, Contact, ContactType, EnumInfo};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactEntry {
    pub contact_type: ContactType,

    #[validate(length(min = 1, max = 255, message = "contact.value.length"))]
    pub value: String,
}

/// Replaces every contact of the member.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateContactsRequest {
    #[validate(length(max = 20, message = "contacts.too.many"), nested)]
    pub contacts: Vec<ContactEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactResponse {
    pub id: String,
    pub contact_type: EnumInfo,
    pub value: String,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id.to_string(),
            contact_type: contact.contact_type.info(),
            value: contact.value,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockUnblockRequest {
    #[serde(with = "super::id_format")]
    pub member_id: i64,
    pub block_status: BlockStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowCountsResponse {
    pub total_followers: i64,
    pub total_following: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::validation::validate;

    fn entry(contact_type: ContactType, value: &str) -> ContactEntry {
        ContactEntry {
            contact_type,
            value: value.into(),
        }
    }

    #[test]
    fn test_contacts_list_is_bounded() {
        let request = UpdateContactsRequest {
            contacts: (0..21).map(|i| entry(ContactType::Email, &format!("m{i}@fleenfeen.com"))).collect(),
        };
        assert!(validate(&request).is_err());
    }

    #[test]
    fn test_nested_contact_values_are_validated() {
        let ok = UpdateContactsRequest {
            contacts: vec![entry(ContactType::Telegram, "@ada")],
        };
        assert!(validate(&ok).is_ok());

        let blank = UpdateContactsRequest {
            contacts: vec![entry(ContactType::Telegram, "")],
        };
        assert!(validate(&blank).is_err());
    }
}
