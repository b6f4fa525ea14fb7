use crate::utils::AppError;

/// Matches the hashing cost the registration flow has always used.
const BCRYPT_COST: u32 = 12;

pub fn hash_password(plain: &str) -> Result<String, AppError> {
    bcrypt::hash(plain, BCRYPT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Password hashing failed: {e}")))
}

pub fn verify_password(plain: &str, hash: &str) -> Result<bool, AppError> {
    bcrypt::verify(plain, hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn test_verify_against_low_cost_hash() {
        // Cost is baked into the hash string, so verification works for any.
        let hash = bcrypt::hash("pw", 4).unwrap();
        assert!(verify_password("pw", &hash).unwrap());
        assert!(!verify_password("not-pw", &hash).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_an_error() {
        assert!(verify_password("pw", "not-a-bcrypt-hash").is_err());
    }
}
