//! User services - Profilo e logout dell'utente autenticato

use crate::core::{AppError, AppState};
use crate::dtos::{ApiResponse, UpdateUserDTO, UserDTO};
use crate::entities::User;
use crate::repositories::Update;
use axum::{
    Extension,
    extract::{Json, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[instrument(skip(current_user), fields(user_id = %current_user.user_id))]
pub async fn get_profile(
    Extension(current_user): Extension<User>,
) -> Result<Json<ApiResponse<UserDTO>>, AppError> {
    debug!("Returning profile of authenticated user");
    // l'utente è già stato caricato dal middleware di autenticazione
    Ok(Json(ApiResponse::ok("Perfil cargado", UserDTO::from(current_user))))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn logout_user(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    // 1. Segnare l'utente come offline
    // 2. Svuotare il token: il vecchio token non autentica più
    let mut conn = state.pool.acquire().await?;
    state
        .user
        .update(
            &mut conn,
            &current_user.user_id,
            &UpdateUserDTO {
                token: Some(String::new()),
                activo: Some(false),
                ..Default::default()
            },
        )
        .await?;

    info!("User logged out");
    Ok(Json(ApiResponse::empty("Logout successful")))
}
