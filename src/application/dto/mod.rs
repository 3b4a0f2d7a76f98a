//! Data Transfer Objects
//!
//! DTOs for API request/response serialization. Snowflake ids travel as JSON
//! strings in both directions; request bodies also accept plain numbers.

pub mod request;
pub mod response;

pub mod business;
pub mod calendar;
pub mod chat_space;
pub mod engagement;
pub mod notification;
pub mod oauth2;
pub mod poll;
pub mod social;
pub mod soft_ask;
pub mod stream;

/// Serde helpers for snowflake ids sent as strings.
pub mod id_format {
    use serde::{de, Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    fn to_id<E: de::Error>(raw: RawId) -> Result<i64, E> {
        let id = match raw {
            RawId::Text(text) => crate::shared::snowflake::parse(&text),
            RawId::Number(n) if n > 0 => Some(n),
            RawId::Number(_) => None,
        };
        id.ok_or_else(|| E::custom("invalid.id"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        to_id(RawId::deserialize(deserializer)?)
    }

    pub mod option {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
            Option::<RawId>::deserialize(deserializer)?.map(to_id).transpose()
        }
    }

    pub mod list {
        use super::*;

        pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
            Vec::<RawId>::deserialize(deserializer)?
                .into_iter()
                .map(to_id)
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct IdHolder {
        #[serde(with = "super::id_format")]
        id: i64,
        #[serde(default, with = "super::id_format::option")]
        parent_id: Option<i64>,
        #[serde(default, with = "super::id_format::list")]
        option_ids: Vec<i64>,
    }

    #[test]
    fn test_ids_accept_strings_and_numbers() {
        let holder: IdHolder =
            serde_json::from_str(r#"{"id":"7301","parent_id":12,"option_ids":["1",2]}"#).unwrap();
        assert_eq!(holder.id, 7301);
        assert_eq!(holder.parent_id, Some(12));
        assert_eq!(holder.option_ids, vec![1, 2]);
    }

    #[test]
    fn test_ids_reject_garbage() {
        assert!(serde_json::from_str::<IdHolder>(r#"{"id":"abc"}"#).is_err());
        assert!(serde_json::from_str::<IdHolder>(r#"{"id":0}"#).is_err());
    }
}
