//! Blocking HTTP client for the categories service.
//!
//! # Design
//! `CategoriesClient` holds an immutable `ClientConfig` and a shared
//! `Transport`; it carries no per-call state, so one instance can be used
//! from many threads. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The un-prefixed method runs both around a transport call.
//! Callers that own their HTTP stack can skip the transport entirely and
//! drive `build_*`/`parse_*` themselves.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{
    AssociateCategoryWithProjectRequest, AssociateCategoryWithSkillRequest, Category,
    CreateCategoryRequest, DisassociateCategoryFromSkillRequest, GetCategoriesForSkillRequest,
    GetCategoriesForSkillResponse, GetSkillIDsForCategoryRequest, GetSkillIDsForCategoryResponse,
};

/// Client for the categories service.
///
/// `auth_token` on every operation overrides the configured default token.
/// When both are absent no `authorization` header is sent.
#[derive(Clone)]
pub struct CategoriesClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for CategoriesClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoriesClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

impl CategoriesClient {
    /// Client using a `UreqTransport` with the configured timeout.
    pub fn new(config: ClientConfig) -> Self {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Categories
    // -----------------------------------------------------------------------

    pub fn build_create_category(
        &self,
        input: &CreateCategoryRequest,
        auth_token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(input)?;
        Ok(self.request(HttpMethod::Post, "/api/categories", auth_token, Some(body)))
    }

    pub fn parse_create_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        check_status(&response, 201)?;
        decode(&response)
    }

    pub fn create_category(
        &self,
        input: &CreateCategoryRequest,
        auth_token: Option<&str>,
    ) -> Result<Category, ApiError> {
        let request = self.build_create_category(input, auth_token)?;
        self.parse_create_category(self.send(request)?)
    }

    pub fn build_get_category(&self, id: Uuid, auth_token: Option<&str>) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &format!("/api/categories/{id}"),
            auth_token,
            None,
        )
    }

    pub fn parse_get_category(&self, response: HttpResponse) -> Result<Category, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn get_category(&self, id: Uuid, auth_token: Option<&str>) -> Result<Category, ApiError> {
        let request = self.build_get_category(id, auth_token);
        self.parse_get_category(self.send(request)?)
    }

    // -----------------------------------------------------------------------
    // Projects
    // -----------------------------------------------------------------------

    pub fn build_associate_category_with_project(
        &self,
        category_id: Uuid,
        project_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(&AssociateCategoryWithProjectRequest {
            category_id,
            project_id,
        })?;
        Ok(self.request(
            HttpMethod::Post,
            "/api/projects/categories/associate",
            auth_token,
            Some(body),
        ))
    }

    pub fn parse_associate_category_with_project(
        &self,
        response: HttpResponse,
    ) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    pub fn associate_category_with_project(
        &self,
        category_id: Uuid,
        project_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<(), ApiError> {
        let request =
            self.build_associate_category_with_project(category_id, project_id, auth_token)?;
        self.parse_associate_category_with_project(self.send(request)?)
    }

    pub fn build_disassociate_category_from_project(
        &self,
        category_id: Uuid,
        project_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(&AssociateCategoryWithProjectRequest {
            category_id,
            project_id,
        })?;
        Ok(self.request(
            HttpMethod::Post,
            "/api/projects/categories/disassociate",
            auth_token,
            Some(body),
        ))
    }

    pub fn parse_disassociate_category_from_project(
        &self,
        response: HttpResponse,
    ) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn disassociate_category_from_project(
        &self,
        category_id: Uuid,
        project_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<(), ApiError> {
        let request =
            self.build_disassociate_category_from_project(category_id, project_id, auth_token)?;
        self.parse_disassociate_category_from_project(self.send(request)?)
    }

    pub fn build_get_categories_for_project(
        &self,
        project_id: Uuid,
        auth_token: Option<&str>,
    ) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &format!("/api/projects/{project_id}/categories"),
            auth_token,
            None,
        )
    }

    pub fn parse_get_categories_for_project(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Category>, ApiError> {
        check_status(&response, 200)?;
        decode_list(&response)
    }

    pub fn get_categories_for_project(
        &self,
        project_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Vec<Category>, ApiError> {
        let request = self.build_get_categories_for_project(project_id, auth_token);
        self.parse_get_categories_for_project(self.send(request)?)
    }

    pub fn build_get_project_ids_for_category(
        &self,
        category_id: Uuid,
        auth_token: Option<&str>,
    ) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &format!("/api/categories/{category_id}/projects"),
            auth_token,
            None,
        )
    }

    pub fn parse_get_project_ids_for_category(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Uuid>, ApiError> {
        check_status(&response, 200)?;
        decode_list(&response)
    }

    pub fn get_project_ids_for_category(
        &self,
        category_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Vec<Uuid>, ApiError> {
        let request = self.build_get_project_ids_for_category(category_id, auth_token);
        self.parse_get_project_ids_for_category(self.send(request)?)
    }

    // -----------------------------------------------------------------------
    // Skills
    // -----------------------------------------------------------------------

    pub fn build_associate_category_with_skill(
        &self,
        input: &AssociateCategoryWithSkillRequest,
        auth_token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(input)?;
        Ok(self.request(
            HttpMethod::Post,
            "/api/categories/skills/association",
            auth_token,
            Some(body),
        ))
    }

    pub fn parse_associate_category_with_skill(
        &self,
        response: HttpResponse,
    ) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    pub fn associate_category_with_skill(
        &self,
        input: &AssociateCategoryWithSkillRequest,
        auth_token: Option<&str>,
    ) -> Result<(), ApiError> {
        let request = self.build_associate_category_with_skill(input, auth_token)?;
        self.parse_associate_category_with_skill(self.send(request)?)
    }

    pub fn build_disassociate_category_from_skill(
        &self,
        input: &DisassociateCategoryFromSkillRequest,
        auth_token: Option<&str>,
    ) -> Result<HttpRequest, ApiError> {
        let body = encode(input)?;
        Ok(self.request(
            HttpMethod::Delete,
            "/api/categories/skills/disassociation",
            auth_token,
            Some(body),
        ))
    }

    pub fn parse_disassociate_category_from_skill(
        &self,
        response: HttpResponse,
    ) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn disassociate_category_from_skill(
        &self,
        input: &DisassociateCategoryFromSkillRequest,
        auth_token: Option<&str>,
    ) -> Result<(), ApiError> {
        let request = self.build_disassociate_category_from_skill(input, auth_token)?;
        self.parse_disassociate_category_from_skill(self.send(request)?)
    }

    pub fn build_get_categories_for_skill(
        &self,
        input: &GetCategoriesForSkillRequest,
        auth_token: Option<&str>,
    ) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &format!("/api/skills/{}/categories", input.skill_id),
            auth_token,
            None,
        )
    }

    pub fn parse_get_categories_for_skill(
        &self,
        response: HttpResponse,
    ) -> Result<GetCategoriesForSkillResponse, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn get_categories_for_skill(
        &self,
        input: &GetCategoriesForSkillRequest,
        auth_token: Option<&str>,
    ) -> Result<GetCategoriesForSkillResponse, ApiError> {
        let request = self.build_get_categories_for_skill(input, auth_token);
        self.parse_get_categories_for_skill(self.send(request)?)
    }

    pub fn build_get_skill_ids_for_category(
        &self,
        input: &GetSkillIDsForCategoryRequest,
        auth_token: Option<&str>,
    ) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            &format!("/api/categories/{}/skills", input.category_id),
            auth_token,
            None,
        )
    }

    pub fn parse_get_skill_ids_for_category(
        &self,
        response: HttpResponse,
    ) -> Result<GetSkillIDsForCategoryResponse, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn get_skill_ids_for_category(
        &self,
        input: &GetSkillIDsForCategoryRequest,
        auth_token: Option<&str>,
    ) -> Result<GetSkillIDsForCategoryResponse, ApiError> {
        let request = self.build_get_skill_ids_for_category(input, auth_token);
        self.parse_get_skill_ids_for_category(self.send(request)?)
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    /// Header order: content-type (bodies only), authorization, x-api-key.
    fn request(
        &self,
        method: HttpMethod,
        path: &str,
        auth_token: Option<&str>,
        body: Option<String>,
    ) -> HttpRequest {
        let mut headers = Vec::with_capacity(3);
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(token) = auth_token.or(self.config.token.as_deref()) {
            headers.push(("authorization".to_string(), token.to_string()));
        }
        headers.push(("x-api-key".to_string(), self.config.api_key.clone()));

        HttpRequest {
            method,
            path: format!("{}{path}", self.config.base_url),
            headers,
            body,
        }
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = request.method;
        let url = request.path.clone();
        debug!(%method, %url, "sending request");

        let response = self.transport.execute(request).inspect_err(|err| {
            warn!(%method, %url, error = %err, "request failed");
        })?;

        debug!(%method, %url, status = response.status, "received response");
        Ok(response)
    }
}

fn encode<T: Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(ApiError::Serialization)
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| {
        warn!(status = response.status, error = %e, "response body did not decode");
        ApiError::Deserialization(e)
    })
}

/// A `null` body is an empty list.
fn decode_list<T: DeserializeOwned>(response: &HttpResponse) -> Result<Vec<T>, ApiError> {
    decode::<Option<Vec<T>>>(response).map(Option::unwrap_or_default)
}

/// Anything but the single expected code is an error, whatever its class.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    warn!(status = response.status, expected, "unexpected status code");
    Err(ApiError::UnexpectedStatus {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    const CATEGORY_ID: &str = "11111111-1111-1111-1111-111111111111";

    fn config() -> ClientConfig {
        ClientConfig::new("http://localhost:8080", "test-key")
    }

    fn client() -> CategoriesClient {
        CategoriesClient::new(config())
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn sales_json() -> String {
        format!(
            r#"{{"id":"{CATEGORY_ID}","name":"Sales","created_at":"2024-01-01T00:00:00Z","updated_at":"2024-01-01T00:00:00Z","version":1}}"#
        )
    }

    #[test]
    fn build_create_category_produces_correct_request() {
        let input = CreateCategoryRequest {
            name: "Sales".to_string(),
        };
        let req = client()
            .build_create_category(&input, Some("Bearer x"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8080/api/categories");
        assert_eq!(
            req.headers,
            vec![
                ("content-type".to_string(), "application/json".to_string()),
                ("authorization".to_string(), "Bearer x".to_string()),
                ("x-api-key".to_string(), "test-key".to_string()),
            ]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"name": "Sales"}));
    }

    #[test]
    fn build_get_category_has_no_body_or_content_type() {
        let id: Uuid = CATEGORY_ID.parse().unwrap();
        let req = client().build_get_category(id, Some("Bearer x"));
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(
            req.path,
            format!("http://localhost:8080/api/categories/{CATEGORY_ID}")
        );
        assert!(req.body.is_none());
        assert!(req.header("content-type").is_none());
        assert_eq!(req.header("X-API-Key"), Some("test-key"));
    }

    #[test]
    fn default_token_applies_when_call_passes_none() {
        let client = CategoriesClient::new(config().with_token("Bearer default"));
        let req = client.build_get_categories_for_project(Uuid::nil(), None);
        assert_eq!(req.header("authorization"), Some("Bearer default"));

        let req = client.build_get_categories_for_project(Uuid::nil(), Some("Bearer call"));
        assert_eq!(req.header("authorization"), Some("Bearer call"));
    }

    #[test]
    fn no_token_means_no_authorization_header() {
        let req = client().build_get_project_ids_for_category(Uuid::nil(), None);
        assert!(req.header("authorization").is_none());
        assert_eq!(
            req.path,
            "http://localhost:8080/api/categories/00000000-0000-0000-0000-000000000000/projects"
        );
    }

    #[test]
    fn project_association_requests_share_body_shape() {
        let category_id = Uuid::from_u128(1);
        let project_id = Uuid::from_u128(2);
        let c = client();

        let assoc = c
            .build_associate_category_with_project(category_id, project_id, None)
            .unwrap();
        let disassoc = c
            .build_disassociate_category_from_project(category_id, project_id, None)
            .unwrap();

        assert_eq!(assoc.method, HttpMethod::Post);
        assert_eq!(disassoc.method, HttpMethod::Post);
        assert!(assoc.path.ends_with("/api/projects/categories/associate"));
        assert!(disassoc.path.ends_with("/api/projects/categories/disassociate"));
        assert_eq!(assoc.body, disassoc.body);

        let body: serde_json::Value = serde_json::from_str(assoc.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["category_id"], category_id.to_string());
        assert_eq!(body["project_id"], project_id.to_string());
    }

    #[test]
    fn skill_disassociation_is_a_delete_with_body() {
        let input = DisassociateCategoryFromSkillRequest {
            category_id: Uuid::from_u128(1),
            skill_id: Uuid::from_u128(3),
        };
        let req = client()
            .build_disassociate_category_from_skill(&input, None)
            .unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.path.ends_with("/api/categories/skills/disassociation"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert!(req.body.is_some());
    }

    #[test]
    fn skill_queries_put_the_id_in_the_path() {
        let skill_id = Uuid::from_u128(3);
        let c = client();

        let req = c.build_get_categories_for_skill(&GetCategoriesForSkillRequest { skill_id }, None);
        assert_eq!(
            req.path,
            format!("http://localhost:8080/api/skills/{skill_id}/categories")
        );
        assert!(req.body.is_none());

        let category_id = Uuid::from_u128(1);
        let req = c.build_get_skill_ids_for_category(
            &GetSkillIDsForCategoryRequest { category_id },
            None,
        );
        assert_eq!(
            req.path,
            format!("http://localhost:8080/api/categories/{category_id}/skills")
        );
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = CategoriesClient::new(ClientConfig::new("http://localhost:8080/", "k"));
        assert_eq!(client.config().base_url, "http://localhost:8080");
        let req = client.build_get_categories_for_project(Uuid::nil(), None);
        assert_eq!(
            req.path,
            "http://localhost:8080/api/projects/00000000-0000-0000-0000-000000000000/categories"
        );
    }

    #[test]
    fn parse_get_category_success() {
        let category = client()
            .parse_get_category(response(200, &sales_json()))
            .unwrap();
        assert_eq!(category.id.to_string(), CATEGORY_ID);
        assert_eq!(category.name, "Sales");
        assert_eq!(category.version, 1);
    }

    #[test]
    fn parse_get_category_not_found_is_unexpected_status() {
        let err = client().parse_get_category(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus { status: 404, .. }));
    }

    #[test]
    fn parse_create_category_rejects_200() {
        let err = client()
            .parse_create_category(response(200, &sales_json()))
            .unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus { status: 200, .. }));
    }

    #[test]
    fn parse_create_category_server_error_keeps_body() {
        let err = client()
            .parse_create_category(response(500, "internal error"))
            .unwrap_err();
        match err {
            ApiError::UnexpectedStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("expected UnexpectedStatus, got {other:?}"),
        }
    }

    #[test]
    fn association_success_depends_only_on_status() {
        let c = client();
        assert!(c.parse_associate_category_with_project(response(201, "")).is_ok());
        assert!(c.parse_associate_category_with_skill(response(201, "not json")).is_ok());
        assert!(c.parse_disassociate_category_from_project(response(204, "")).is_ok());
        assert!(c.parse_disassociate_category_from_skill(response(204, "")).is_ok());

        let err = c
            .parse_associate_category_with_project(response(200, "{}"))
            .unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus { status: 200, .. }));

        let err = c
            .parse_disassociate_category_from_skill(response(200, ""))
            .unwrap_err();
        assert!(matches!(err, ApiError::UnexpectedStatus { status: 200, .. }));
    }

    #[test]
    fn parse_list_bad_json_is_deserialization_error() {
        let err = client()
            .parse_get_categories_for_project(response(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn parse_null_lists_as_empty() {
        let c = client();
        assert!(c
            .parse_get_categories_for_project(response(200, "null"))
            .unwrap()
            .is_empty());
        assert!(c
            .parse_get_project_ids_for_category(response(200, "null"))
            .unwrap()
            .is_empty());
        assert!(c
            .parse_get_skill_ids_for_category(response(200, r#"{"skill_ids":null}"#))
            .unwrap()
            .skill_ids
            .is_empty());
        assert!(c
            .parse_get_categories_for_skill(response(200, r#"{"categories":null}"#))
            .unwrap()
            .categories
            .is_empty());
    }

    #[test]
    fn parse_skill_ids_response() {
        let body = r#"{"skill_ids":["00000000-0000-0000-0000-000000000003"]}"#;
        let ids = client()
            .parse_get_skill_ids_for_category(response(200, body))
            .unwrap();
        assert_eq!(ids.skill_ids, vec![Uuid::from_u128(3)]);
    }

    #[test]
    fn get_category_round_trips_through_transport() {
        let mut transport = MockTransport::new();
        let body = sales_json();
        transport
            .expect_execute()
            .withf(|req| {
                req.method == HttpMethod::Get
                    && req.path == format!("http://localhost:8080/api/categories/{CATEGORY_ID}")
                    && req.header("authorization") == Some("Bearer x")
                    && req.header("x-api-key") == Some("test-key")
            })
            .times(1)
            .returning(move |_| Ok(response(200, &body)));

        let client = CategoriesClient::with_transport(config(), transport);
        let category = client
            .get_category(CATEGORY_ID.parse().unwrap(), Some("Bearer x"))
            .unwrap();
        assert_eq!(category.name, "Sales");
        assert_eq!(category.version, 1);
    }

    #[test]
    fn transport_errors_are_returned_unchanged() {
        let mut transport = MockTransport::new();
        transport.expect_execute().times(1).returning(|_| {
            Err(ApiError::Transport(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "refused",
            ))))
        });

        let client = CategoriesClient::with_transport(config(), transport);
        let err = client
            .associate_category_with_project(Uuid::from_u128(1), Uuid::from_u128(2), None)
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[test]
    fn non_json_success_body_surfaces_as_decode_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .times(1)
            .returning(|_| Ok(response(200, "<html>oops</html>")));

        let client = CategoriesClient::with_transport(config(), transport);
        let err = client
            .get_categories_for_skill(
                &GetCategoriesForSkillRequest {
                    skill_id: Uuid::from_u128(3),
                },
                None,
            )
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn client_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CategoriesClient>();
    }
}
