use axum::{extract::rejection::JsonRejection, extract::State, routing::post, Json, Router};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::{
    error::{Error, Result},
    state::AppState,
    users::{
        dto::{
            CreateRequest, CreateResponse, DeleteRequest, Empty, GetRequest, GetResponse,
            UpdateRequest, UserInfo, UserMessage,
        },
        repo_types::{NewUser, User, UserUpdate},
        role::{role_from_db, role_to_db},
        services::build_update,
    },
};

pub const CREATE_PATH: &str = "/user_v1.UserV1/Create";
pub const GET_PATH: &str = "/user_v1.UserV1/Get";
pub const UPDATE_PATH: &str = "/user_v1.UserV1/Update";
pub const DELETE_PATH: &str = "/user_v1.UserV1/Delete";

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(CREATE_PATH, post(create))
        .route(GET_PATH, post(get))
        .route(UPDATE_PATH, post(update))
        .route(DELETE_PATH, post(delete))
}

#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateRequest>, JsonRejection>,
) -> Result<Json<CreateResponse>> {
    let Json(req) = payload.map_err(rejected)?;

    let role = role_to_db(req.info.role).map_err(|e| {
        warn!(error = %e, "failed to convert role to db");
        e
    })?;

    let new_user = NewUser {
        name: req.info.name,
        email: req.info.email,
        role,
    };
    let id = state.users.insert(&new_user).await.map_err(|e| {
        error!(error = %e, "failed to insert user");
        e
    })?;

    info!(user_id = id, "user inserted");
    Ok(Json(CreateResponse { id }))
}

#[instrument(skip(state, payload))]
pub async fn get(
    State(state): State<AppState>,
    payload: std::result::Result<Json<GetRequest>, JsonRejection>,
) -> Result<Json<GetResponse>> {
    let Json(req) = payload.map_err(rejected)?;

    let user = match state.users.find_by_id(req.id).await {
        Ok(u) => u,
        Err(e @ Error::NotFound(_)) => {
            warn!(user_id = req.id, "user not found");
            return Err(e);
        }
        Err(e) => {
            error!(error = %e, user_id = req.id, "failed to get user");
            return Err(e);
        }
    };

    info!(user_id = req.id, "get user");
    Ok(Json(GetResponse {
        user: to_message(user),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update(
    State(state): State<AppState>,
    payload: std::result::Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<Empty>> {
    let Json(req) = payload.map_err(rejected)?;

    let update = build_update(&req.info, OffsetDateTime::now_utc());
    let columns = match &update {
        UserUpdate::Noop => {
            info!(user_id = req.id, "no effective fields, update skipped");
            return Ok(Json(Empty {}));
        }
        UserUpdate::Assign(a) => a.columns(),
    };

    let matched = state.users.apply_update(req.id, &update).await.map_err(|e| {
        error!(error = %e, user_id = req.id, "failed to update user");
        e
    })?;

    if matched {
        info!(user_id = req.id, ?columns, "user updated");
    } else {
        // unknown ids still succeed
        warn!(user_id = req.id, "update matched no row");
    }
    Ok(Json(Empty {}))
}

#[instrument(skip(state, payload))]
pub async fn delete(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DeleteRequest>, JsonRejection>,
) -> Result<Json<Empty>> {
    let Json(req) = payload.map_err(rejected)?;

    let removed = state.users.delete_by_id(req.id).await.map_err(|e| {
        error!(error = %e, user_id = req.id, "failed to delete user");
        e
    })?;

    info!(user_id = req.id, removed, "user deleted");
    Ok(Json(Empty {}))
}

fn rejected(rejection: JsonRejection) -> Error {
    warn!(error = %rejection.body_text(), "malformed request");
    rejection.into()
}

fn to_message(user: User) -> UserMessage {
    UserMessage {
        id: user.id,
        info: UserInfo {
            name: user.name,
            email: user.email,
            role: role_from_db(&user.role),
        },
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}
