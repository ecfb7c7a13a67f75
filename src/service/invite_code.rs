use chrono::{Duration, Utc};
use log::{info, warn};
use rand::{distr::Alphanumeric, Rng};
use validator::Validate;

use crate::{
    db,
    dto::{CreatedCode, CreatedCodes, NewInviteCodesDto},
    errors::ApiError,
    models::InviteCodeView,
    PGPool,
};

pub const CODE_LEN: usize = 8;
const MAX_ATTEMPTS: usize = 5;

/// Eight random uppercase letters and digits.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(CODE_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

pub async fn list(pool: &PGPool) -> Result<Vec<InviteCodeView>, ApiError> {
    Ok(db::invite_code::list(pool).await?)
}

pub async fn create(created_by: i32, dto: NewInviteCodesDto, pool: &PGPool) -> Result<CreatedCodes, ApiError> {
    dto.validate()?;
    let count = dto.count.unwrap_or(1) as usize;
    let expires_at = dto.expires_in_days.map(|days| Utc::now() + Duration::days(days));

    let mut created: Vec<CreatedCode> = Vec::with_capacity(count);
    for _ in 0..count {
        let mut inserted = None;
        for _ in 0..MAX_ATTEMPTS {
            let code = generate_code(&mut rand::rng());
            inserted = db::invite_code::insert(&code, created_by, expires_at, pool).await?;
            if inserted.is_some() {
                break;
            }
            warn!("invite code collision, retrying");
        }
        match inserted {
            Some(row) => created.push(row),
            None => return Err(ApiError::InternalError),
        }
    }
    info!("user {} created {} admin invite code(s)", created_by, created.len());
    Ok(CreatedCodes { created })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn codes_are_eight_uppercase_alphanumerics() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..100 {
            let code = generate_code(&mut rng);
            assert_eq!(CODE_LEN, code.len());
            assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn codes_differ() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_ne!(generate_code(&mut rng), generate_code(&mut rng));
    }
}
