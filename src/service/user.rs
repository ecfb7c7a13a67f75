use chrono::Utc;
use log::{info, warn};
use validator::Validate;

use crate::{
    config::Config,
    db::{self, user::NewUser},
    dto::{AuthResponse, LoginRequest, RegisterRequest},
    errors::ApiError,
    models::{Profile, Role, User},
    service::{auth::jwt, crypto},
    PGPool,
};

/// How an admin registration was authorised.
#[derive(Debug, PartialEq, Eq)]
pub enum AdminGrant {
    NotAdmin,
    MasterCode,
    InviteCode(i32),
}

fn token_response(user: &User, config: &Config) -> Result<AuthResponse, ApiError> {
    let token = jwt::create(user.id, &user.email, user.role, &user.username, &config.jwt_secret)?;
    Ok(AuthResponse {
        token,
        user_id: user.id,
        role: user.role,
        username: user.username.clone(),
    })
}

/// Whether `code` is the configured master passphrase. No master code configured
/// means nothing matches.
pub fn is_master_code(code: &str, master: Option<&str>) -> bool {
    matches!(master, Some(master) if !master.is_empty() && master == code)
}

async fn admin_grant(dto: &RegisterRequest, role: Role, config: &Config, pool: &PGPool) -> Result<AdminGrant, ApiError> {
    if role != Role::Admin {
        return Ok(AdminGrant::NotAdmin);
    }
    let code = match dto.admin_code.as_deref().map(str::trim) {
        Some(code) if !code.is_empty() => code,
        _ => return Err(ApiError::bad_request("Admin code required")),
    };
    if is_master_code(code, config.master_admin_code.as_deref()) {
        return Ok(AdminGrant::MasterCode);
    }
    match db::invite_code::find_by_code(code, pool).await? {
        Some(row) if row.is_redeemable(Utc::now()) => Ok(AdminGrant::InviteCode(row.id)),
        _ => Err(ApiError::bad_request("Invalid or already used admin code")),
    }
}

pub async fn register(dto: RegisterRequest, config: &Config, pool: &PGPool) -> Result<AuthResponse, ApiError> {
    dto.validate()?;
    let role = dto.role.unwrap_or_default();

    if db::user::email_taken(&dto.email, pool).await? {
        return Err(ApiError::bad_request("Email already used"));
    }
    if db::user::username_taken(&dto.username, pool).await? {
        return Err(ApiError::bad_request("Username already used"));
    }

    let grant = admin_grant(&dto, role, config, pool).await?;
    let password_hash = crypto::hash_password(dto.password.clone()).await?;

    let mut tx = pool.begin().await?;
    let user = db::user::create(
        NewUser {
            email: dto.email,
            username: dto.username,
            password_hash,
            city: dto.city.filter(|c| !c.trim().is_empty()),
            role,
        },
        &mut *tx,
    )
    .await
    .map_err(|err| match ApiError::from(err) {
        // a concurrent signup won the race past the checks above
        ApiError::BadRequest(_) => ApiError::bad_request("Email or username already used"),
        other => other,
    })?;

    if let AdminGrant::InviteCode(code_id) = grant {
        if !db::invite_code::consume(code_id, user.id, &mut *tx).await? {
            tx.rollback().await?;
            warn!("invite code {} was consumed concurrently", code_id);
            return Err(ApiError::bad_request("Invalid or already used admin code"));
        }
        db::user::set_used_code(user.id, code_id, &mut *tx).await?;
    }
    tx.commit().await?;

    info!("registered user {} ({:?}, {:?})", user.username, user.role, grant);
    token_response(&user, config)
}

pub async fn login(dto: LoginRequest, config: &Config, pool: &PGPool) -> Result<AuthResponse, ApiError> {
    dto.validate()?;
    let user = match db::user::get_by_email(&dto.email, pool).await? {
        Some(user) => user,
        None => return Err(ApiError::bad_request("Invalid credentials")),
    };
    if !crypto::verify_password(dto.password, user.password.clone()).await {
        return Err(ApiError::bad_request("Invalid credentials"));
    }
    token_response(&user, config)
}

pub async fn me(user_id: i32, pool: &PGPool) -> Result<Profile, ApiError> {
    db::user::get_profile(user_id, pool)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}
