use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::users::{
    dto::{LoginRequest, RegisterRequest},
    password::{hash_password_blocking, verify_password_blocking},
    repo::{InsertError, UserStore},
    repo_types::{UniqueField, UserAccount},
};

pub const REGISTERED: &str = "Usuário cadastrado com sucesso!";
pub const REGISTER_FAILED: &str = "Erro ao cadastrar o usuário.";
pub const LOGGED_IN: &str = "Login bem-sucedido!";
pub const INVALID_CREDENTIALS: &str = "E-mail ou senha inválidos.";
pub const LOGIN_FAILED: &str = "Erro ao fazer login.";
pub const USER_NOT_FOUND: &str = "Usuário não encontrado.";
pub const EMERGENCY_LOOKUP_FAILED: &str = "Erro ao buscar o número de emergência.";

/// Registers a new account. Duplicate email, phone or CPF is reported by the
/// first field that collides, in that order.
pub async fn register(store: &dyn UserStore, payload: RegisterRequest) -> Result<UserAccount, ApiError> {
    for field in UniqueField::REGISTRATION_ORDER {
        let taken = store
            .exists_by(field, payload.unique_value(field))
            .await
            .map_err(|e| {
                error!(error = %e, field = field.column(), "uniqueness check failed");
                ApiError::internal(REGISTER_FAILED, e)
            })?;
        if taken {
            warn!(field = field.column(), "registration rejected: value already registered");
            return Err(ApiError::Conflict(field.conflict_message()));
        }
    }

    let hash = hash_password_blocking(payload.senha.clone())
        .await
        .map_err(|e| {
            error!(error = %e, "hash_password failed");
            ApiError::internal(REGISTER_FAILED, e)
        })?;

    let account = payload.into_new_account(hash);
    match store.insert(&account).await {
        Ok(user) => {
            info!(user_id = %user.id, tipo_usuario = %user.tipo_usuario, "user registered");
            Ok(user)
        }
        // Lost a race with a concurrent registration; the constraint caught it.
        Err(InsertError::Duplicate(field)) => {
            warn!(field = field.column(), "registration rejected by unique constraint");
            Err(ApiError::Conflict(field.conflict_message()))
        }
        Err(InsertError::Other(e)) => {
            error!(error = %e, "create user failed");
            Err(ApiError::internal(REGISTER_FAILED, e))
        }
    }
}

/// Checks credentials. Unknown email and wrong password are indistinguishable
/// to the caller.
pub async fn login(store: &dyn UserStore, payload: LoginRequest) -> Result<UserAccount, ApiError> {
    let user = match store.find_by_email(&payload.email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!("login unknown email");
            return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err(ApiError::internal(LOGIN_FAILED, e));
        }
    };

    let ok = verify_password_blocking(payload.senha, user.senha.clone())
        .await
        .map_err(|e| {
            error!(error = %e, user_id = %user.id, "verify_password failed");
            ApiError::internal(LOGIN_FAILED, e)
        })?;

    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS));
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user)
}

/// Emergency number of the account with the given id; `Ok(None)` when the
/// account exists but never set one.
pub async fn emergency_number(store: &dyn UserStore, raw_id: &str) -> Result<Option<String>, ApiError> {
    // A malformed id cannot name any row.
    let Ok(id) = Uuid::parse_str(raw_id) else {
        warn!(id = %raw_id, "emergency lookup with malformed id");
        return Err(ApiError::NotFound(USER_NOT_FOUND));
    };

    match store.find_emergency_contact(id).await {
        Ok(Some(contact)) => Ok(contact.numero_emergencia),
        Ok(None) => {
            warn!(%id, "emergency lookup for unknown user");
            Err(ApiError::NotFound(USER_NOT_FOUND))
        }
        Err(e) => {
            error!(error = %e, %id, "find_emergency_contact failed");
            Err(ApiError::internal(EMERGENCY_LOOKUP_FAILED, e))
        }
    }
}
