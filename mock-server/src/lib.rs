use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: i64,
}

#[derive(Deserialize)]
pub struct CreateCategory {
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
pub struct ProjectLink {
    pub category_id: Uuid,
    pub project_id: Uuid,
}

#[derive(Deserialize)]
pub struct SkillLink {
    pub category_id: Uuid,
    pub skill_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SkillCategories {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategorySkills {
    pub skill_ids: Vec<Uuid>,
}

/// Links are keyed `(category_id, other_id)`.
#[derive(Default)]
struct Store {
    categories: HashMap<Uuid, Category>,
    projects: BTreeSet<(Uuid, Uuid)>,
    skills: BTreeSet<(Uuid, Uuid)>,
}

#[derive(Clone)]
struct AppState {
    db: Arc<RwLock<Store>>,
    api_key: Arc<str>,
}

/// Router serving the categories API. Every route requires `x-api-key` to
/// equal `api_key` and a non-empty `authorization` header.
pub fn app(api_key: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        api_key: Arc::from(api_key),
    };
    Router::new()
        .route("/api/categories", post(create_category))
        .route("/api/categories/{id}", get(get_category))
        .route("/api/categories/{id}/projects", get(project_ids_for_category))
        .route("/api/categories/{id}/skills", get(skill_ids_for_category))
        .route("/api/categories/skills/association", post(associate_skill))
        .route(
            "/api/categories/skills/disassociation",
            delete(disassociate_skill),
        )
        .route("/api/projects/categories/associate", post(associate_project))
        .route(
            "/api/projects/categories/disassociate",
            post(disassociate_project),
        )
        .route("/api/projects/{id}/categories", get(categories_for_project))
        .route("/api/skills/{id}/categories", get(categories_for_skill))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_credentials,
        ))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

async fn require_credentials(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if !authorized(request.headers(), &state.api_key) {
        debug!(uri = %request.uri(), "rejecting request without credentials");
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(next.run(request).await)
}

fn authorized(headers: &HeaderMap, api_key: &str) -> bool {
    let key_matches = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == api_key);
    let has_token = headers
        .get(header::AUTHORIZATION)
        .is_some_and(|v| !v.is_empty());
    key_matches && has_token
}

// --- categories ---

async fn create_category(
    State(state): State<AppState>,
    Json(input): Json<CreateCategory>,
) -> Result<(StatusCode, Json<Category>), StatusCode> {
    if input.name.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let now = Utc::now();
    let category = Category {
        id: Uuid::new_v4(),
        name: input.name,
        created_at: now,
        updated_at: now,
        version: 1,
    };
    state
        .db
        .write()
        .await
        .categories
        .insert(category.id, category.clone());
    info!(id = %category.id, name = %category.name, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Category>, StatusCode> {
    let db = state.db.read().await;
    db.categories
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

// --- projects ---

async fn associate_project(
    State(state): State<AppState>,
    Json(link): Json<ProjectLink>,
) -> StatusCode {
    let mut db = state.db.write().await;
    if !db.categories.contains_key(&link.category_id) {
        return StatusCode::NOT_FOUND;
    }
    db.projects.insert((link.category_id, link.project_id));
    StatusCode::CREATED
}

async fn disassociate_project(
    State(state): State<AppState>,
    Json(link): Json<ProjectLink>,
) -> StatusCode {
    let mut db = state.db.write().await;
    if db.projects.remove(&(link.category_id, link.project_id)) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn categories_for_project(
    State(state): State<AppState>,
    Path(project_id): Path<Uuid>,
) -> Json<Vec<Category>> {
    let db = state.db.read().await;
    let categories = db
        .projects
        .iter()
        .filter(|(_, project)| *project == project_id)
        .filter_map(|(category, _)| db.categories.get(category).cloned())
        .collect();
    Json(categories)
}

async fn project_ids_for_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<Vec<Uuid>>, StatusCode> {
    let db = state.db.read().await;
    if !db.categories.contains_key(&category_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(linked_ids(&db.projects, category_id)))
}

// --- skills ---

async fn associate_skill(
    State(state): State<AppState>,
    Json(link): Json<SkillLink>,
) -> StatusCode {
    let mut db = state.db.write().await;
    if !db.categories.contains_key(&link.category_id) {
        return StatusCode::NOT_FOUND;
    }
    db.skills.insert((link.category_id, link.skill_id));
    StatusCode::CREATED
}

async fn disassociate_skill(
    State(state): State<AppState>,
    Json(link): Json<SkillLink>,
) -> StatusCode {
    let mut db = state.db.write().await;
    if db.skills.remove(&(link.category_id, link.skill_id)) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn categories_for_skill(
    State(state): State<AppState>,
    Path(skill_id): Path<Uuid>,
) -> Json<SkillCategories> {
    let db = state.db.read().await;
    let categories = db
        .skills
        .iter()
        .filter(|(_, skill)| *skill == skill_id)
        .filter_map(|(category, _)| db.categories.get(category).cloned())
        .collect();
    Json(SkillCategories { categories })
}

async fn skill_ids_for_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<Json<CategorySkills>, StatusCode> {
    let db = state.db.read().await;
    if !db.categories.contains_key(&category_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(CategorySkills {
        skill_ids: linked_ids(&db.skills, category_id),
    }))
}

fn linked_ids(links: &BTreeSet<(Uuid, Uuid)>, category_id: Uuid) -> Vec<Uuid> {
    links
        .range((category_id, Uuid::nil())..=(category_id, Uuid::from_u128(u128::MAX)))
        .map(|(_, other)| *other)
        .collect()
}
