use std::sync::OnceLock;

use crate::Result;

fn env_true(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|val| {
        let trimmed = val.trim();
        !trimmed.is_empty() && !matches!(trimmed, "0" | "false" | "FALSE" | "False")
    })
}

pub fn bool_from_env(key: &str) -> bool {
    env_true(key).unwrap_or(false)
}

/// Reads an unsigned integer from the environment. Unset or blank is `None`.
pub fn u32_from_env(key: &str) -> Result<Option<u32>> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<u32>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => bail!("{} must be an unsigned integer, got `{}`", key, trimmed),
    }
}

/// Whether legalized output should be re-checked after every function.
pub fn verify_mode() -> bool {
    static VERIFY: OnceLock<bool> = OnceLock::new();
    *VERIFY.get_or_init(|| bool_from_env("SLOTWISE_VERIFY"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_unsigned_values() {
        std::env::set_var("SLOTWISE_TEST_U32_OK", " 300 ");
        assert_eq!(u32_from_env("SLOTWISE_TEST_U32_OK").unwrap(), Some(300));
    }

    #[test]
    fn blank_and_missing_are_none() {
        std::env::set_var("SLOTWISE_TEST_U32_BLANK", "  ");
        assert_eq!(u32_from_env("SLOTWISE_TEST_U32_BLANK").unwrap(), None);
        assert_eq!(u32_from_env("SLOTWISE_TEST_U32_MISSING").unwrap(), None);
    }

    #[test]
    fn rejects_garbage() {
        std::env::set_var("SLOTWISE_TEST_U32_BAD", "lots");
        let err = u32_from_env("SLOTWISE_TEST_U32_BAD").expect_err("should reject");
        assert!(err.to_string().contains("SLOTWISE_TEST_U32_BAD"));
    }

    #[test]
    fn false_like_values_are_off() {
        std::env::set_var("SLOTWISE_TEST_BOOL_OFF", "false");
        std::env::set_var("SLOTWISE_TEST_BOOL_ON", "1");
        assert!(!bool_from_env("SLOTWISE_TEST_BOOL_OFF"));
        assert!(bool_from_env("SLOTWISE_TEST_BOOL_ON"));
    }
}
