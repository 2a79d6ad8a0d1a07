use std::fmt;

use serde::de::{self, Deserializer};
use smol_str::SmolStr;

/// Identity projection returned by the backend.
///
/// Only `id` is required; the backend omits or renames the rest depending on
/// the endpoint, so every other field is optional and unknown fields are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "id_from_any")]
    pub id: SmolStr,

    #[serde(default)]
    pub email: Option<SmolStr>,

    #[serde(default)]
    pub username: Option<SmolStr>,

    #[serde(default, rename = "firstName", alias = "first_name")]
    pub first_name: Option<SmolStr>,

    #[serde(default, rename = "lastName", alias = "last_name")]
    pub last_name: Option<SmolStr>,

    #[serde(default)]
    pub role: Option<SmolStr>,

    #[serde(default)]
    pub country: Option<SmolStr>,

    #[serde(default, rename = "createdAt", alias = "created_at")]
    pub created_at: Option<SmolStr>,

    #[serde(default)]
    pub bio: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        matches!(self.role.as_deref(), Some("admin"))
    }

    /// Best display handle available: username, then email, then raw id.
    pub fn display_name(&self) -> &str {
        match (&self.username, &self.email) {
            (Some(username), _) => username,
            (None, Some(email)) => email,
            _ => &self.id,
        }
    }
}

/// The backend serializes ids as strings on some endpoints and integers on
/// others. Accept both, reject empty.
fn id_from_any<'de, D>(deserializer: D) -> Result<SmolStr, D::Error>
where
    D: Deserializer<'de>,
{
    struct IdVisitor;

    impl<'de> de::Visitor<'de> for IdVisitor {
        type Value = SmolStr;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or integer user id")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<SmolStr, E> {
            if value.is_empty() {
                return Err(E::custom("empty user id"));
            }

            Ok(SmolStr::new(value))
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<SmolStr, E> {
            Ok(value.to_string().into())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<SmolStr, E> {
            Ok(value.to_string().into())
        }
    }

    deserializer.deserialize_any(IdVisitor)
}
