//! Password hashing with bcrypt.
//!
//! Hashes are stored in the modular crypt form (`$2b$<cost>$<salt+digest>`),
//! so `$2a$`/`$2y$` hashes written by other bcrypt implementations verify too.

pub use bcrypt::BcryptError;

/// Work factor used when none is configured.
pub const DEFAULT_COST: u32 = 10;
pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    hash_with_cost(password, DEFAULT_COST)
}

/// Hashes with `cost` clamped into the range bcrypt accepts.
pub fn hash_with_cost(password: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::hash(password, cost.clamp(MIN_COST, MAX_COST))
}

/// Checks `password` against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    bcrypt::verify(password, stored).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn correct_password_verifies() {
        let stored = hash_with_cost("password123", MIN_COST).unwrap();
        assert!(stored.starts_with("$2b$04$"));
        assert!(verify_password("password123", &stored));
        assert!(!verify_password("password124", &stored));
    }

    #[test]
    fn same_password_gets_different_salts() {
        let a = hash_with_cost("hunter2", MIN_COST).unwrap();
        let b = hash_with_cost("hunter2", MIN_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn cost_below_minimum_is_clamped() {
        let stored = hash_with_cost("pw", 1).unwrap();
        assert!(stored.starts_with("$2b$04$"));
    }

    #[test]
    fn verifies_hashes_from_other_implementations() {
        // OpenBSD reference vector.
        assert!(verify_password(
            "U*U",
            "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW"
        ));
        assert!(!verify_password(
            "U*V",
            "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW"
        ));
    }

    #[test]
    fn malformed_hashes_do_not_verify() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "plain-text"));
        assert!(!verify_password("x", "$2b$04$short"));
        assert!(!verify_password("x", "pbkdf2-sha256$10$00$00"));
    }
}
