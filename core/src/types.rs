//! Wire records for the categories API.
//!
//! These mirror the mock-server's schema but are defined independently;
//! integration tests catch drift between the two crates. Keys are snake_case
//! on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// A category as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency counter maintained by the service.
    pub version: i64,
}

/// Request payload for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateCategoryRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// Links a category to a project. The disassociate endpoint takes the same
/// body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssociateCategoryWithProjectRequest {
    pub category_id: Uuid,
    pub project_id: Uuid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssociateCategoryWithSkillRequest {
    pub category_id: Uuid,
    pub skill_id: Uuid,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisassociateCategoryFromSkillRequest {
    pub category_id: Uuid,
    pub skill_id: Uuid,
}

/// Only used to build the request path; never sent as a body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetCategoriesForSkillRequest {
    pub skill_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetCategoriesForSkillResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<Category>,
}

/// Only used to build the request path; never sent as a body.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetSkillIDsForCategoryRequest {
    pub category_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GetSkillIDsForCategoryResponse {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skill_ids: Vec<Uuid>,
}

/// Services written in Go encode an empty list as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_decodes_wire_shape() {
        let json = r#"{"id":"11111111-1111-1111-1111-111111111111","name":"Sales","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-02T10:30:00.123456789Z","version":1}"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.name, "Sales");
        assert_eq!(category.version, 1);
        assert_eq!(
            category.updated_at.to_rfc3339_opts(chrono::SecondsFormat::Nanos, true),
            "2024-01-02T10:30:00.123456789Z"
        );
    }

    #[test]
    fn category_name_is_optional_on_the_wire() {
        let json = r#"{"id":"11111111-1111-1111-1111-111111111111","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z","version":3}"#;
        let category: Category = serde_json::from_str(json).unwrap();
        assert!(category.name.is_empty());

        let back = serde_json::to_value(&category).unwrap();
        assert!(back.get("name").is_none());
    }

    #[test]
    fn create_request_omits_empty_name() {
        let req = CreateCategoryRequest {
            name: String::new(),
        };
        let body = serde_json::to_value(req).unwrap();
        assert_eq!(body, serde_json::json!({}));
    }

    #[test]
    fn association_uses_snake_case_keys() {
        let req = AssociateCategoryWithProjectRequest {
            category_id: Uuid::nil(),
            project_id: Uuid::from_u128(u128::MAX),
        };
        let body = serde_json::to_value(req).unwrap();
        assert_eq!(body["category_id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(body["project_id"], "ffffffff-ffff-ffff-ffff-ffffffffffff");
    }

    #[test]
    fn null_or_missing_lists_decode_as_empty() {
        let skills: GetSkillIDsForCategoryResponse =
            serde_json::from_str(r#"{"skill_ids":null}"#).unwrap();
        assert!(skills.skill_ids.is_empty());

        let categories: GetCategoriesForSkillResponse =
            serde_json::from_str(r#"{"categories":null}"#).unwrap();
        assert!(categories.categories.is_empty());

        let categories: GetCategoriesForSkillResponse = serde_json::from_str("{}").unwrap();
        assert!(categories.categories.is_empty());
    }

    #[test]
    fn skill_ids_response_rejects_malformed_uuid() {
        let result: Result<GetSkillIDsForCategoryResponse, _> =
            serde_json::from_str(r#"{"skill_ids":["not-a-uuid"]}"#);
        assert!(result.is_err());
    }
}
