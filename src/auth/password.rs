#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("bcrypt hash: {0}")]
    Hash(bcrypt::BcryptError),

    #[error("bcrypt verify: {0}")]
    Verify(bcrypt::BcryptError),
}

/// bcrypt work factor; tests drop to the minimum to stay fast.
#[cfg(not(test))]
const COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const COST: u32 = 4;

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    bcrypt::hash(password, COST).map_err(PasswordError::Hash)
}

/// Returns `Ok(false)` for a wrong password, `Err` only for a malformed hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(password, hash).map_err(PasswordError::Verify)
}
