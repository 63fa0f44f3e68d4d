use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;
use uuid::Uuid;

use crate::errors::{Result, ServiceError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonalId(String);

impl PersonalId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(ServiceError::Validation(
                "Personal ID must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PersonalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserName(String);

impl UserName {
    // User-perceived characters (grapheme clusters), not codepoints or bytes.
    pub const MAX_GRAPHEMES: usize = 7;

    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let name = raw.into().trim().to_string();

        if name.is_empty() {
            return Err(ServiceError::Validation(
                "ユーザー名を入力してください".to_string(),
            ));
        }

        if name.graphemes(true).count() > Self::MAX_GRAPHEMES {
            return Err(ServiceError::Validation(format!(
                "ユーザー名は{}文字以内で入力してください",
                Self::MAX_GRAPHEMES
            )));
        }

        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "personalId")]
    pub personal_id: PersonalId,
    pub uid: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameReservation {
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "createdByUid")]
    pub created_by_uid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub personal_id: PersonalId,
    pub user_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveUser {
    pub personal_id: PersonalId,
    pub user_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_trims_input() {
        let name = UserName::new("  たろう  ").unwrap();
        assert_eq!(name.as_str(), "たろう");
    }

    #[test]
    fn test_username_rejects_empty() {
        assert!(UserName::new("").is_err(), "Empty");
        assert!(UserName::new("   ").is_err(), "Whitespace only");
    }

    #[test]
    fn test_username_grapheme_limit() {
        assert!(UserName::new("abcdefg").is_ok(), "7 ascii");
        assert!(UserName::new("abcdefgh").is_err(), "8 ascii");
        assert!(UserName::new("あいうえおかき").is_ok(), "7 kana");
        assert!(UserName::new("あいうえおかきく").is_err(), "8 kana");
    }

    #[test]
    fn test_username_counts_emoji_as_one_grapheme() {
        // Family emoji is several codepoints but one perceived character.
        let family = "👨‍👩‍👧‍👦";
        assert!(UserName::new(family.repeat(7)).is_ok(), "7 emoji");
        assert!(UserName::new(family.repeat(8)).is_err(), "8 emoji");
    }

    #[test]
    fn test_personal_id_rejects_empty() {
        assert!(PersonalId::new("").is_err());
        assert!(PersonalId::new("p1").is_ok());
    }

    #[test]
    fn test_generated_personal_ids_are_unique() {
        let a = PersonalId::generate();
        let b = PersonalId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_profile_serializes_with_store_field_names() {
        let profile = UserProfile {
            personal_id: PersonalId::new("p1").unwrap(),
            uid: "u1".to_string(),
            user_name: "たろう".to_string(),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("personalId").is_some());
        assert!(value.get("userName").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("uid").is_some());
    }
}
