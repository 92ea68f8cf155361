use serde::{Deserialize, Deserializer, Serialize};

/// One entry of the remote directory. Identity is `id`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UserRecord {
    #[serde(deserialize_with = "id_or_unset")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(rename = "first_name", deserialize_with = "null_as_default")]
    pub first_name: String,
    // The endpoint sends `last_name`; the field is bound to `lastName` on purpose.
    #[serde(rename = "lastName", deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(rename = "avatar", deserialize_with = "null_as_default")]
    pub avatar_url: String,
}

impl Default for UserRecord {
    fn default() -> Self {
        Self {
            id: UNSET_ID,
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            avatar_url: String::new(),
        }
    }
}

impl UserRecord {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// The full result of one fetch, in response order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct UserDirectory {
    #[serde(rename = "data", deserialize_with = "null_as_default")]
    pub entries: Vec<UserRecord>,
}

impl UserDirectory {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

const UNSET_ID: i64 = -1;

fn id_or_unset<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(UNSET_ID))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
