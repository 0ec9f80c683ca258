// Utility helpers shared by the ledger, the clients and the API layer

use ethers::types::Address;
use std::str::FromStr;

use crate::{
    constants::{SHORT_ADDRESS_HEAD, SHORT_ADDRESS_TAIL},
    error::{AppError, Result},
};

/// Lower-cases and trims an address string without validating it.
pub fn normalize_address(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Parses a user-supplied account identifier into its canonical form
/// (`0x` + 40 lower-case hex digits). The `0x` prefix is optional on input.
pub fn canonical_address(raw: &str) -> Result<String> {
    let normalized = normalize_address(raw);
    if normalized.is_empty() {
        return Err(AppError::InvalidAddress("empty address".to_string()));
    }
    let parsed = Address::from_str(&normalized)
        .map_err(|_| AppError::InvalidAddress(raw.trim().to_string()))?;
    Ok(format!("0x{}", hex::encode(parsed.as_bytes())))
}

/// Renders `0x1234...abcd` for table display.
pub fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= SHORT_ADDRESS_HEAD + SHORT_ADDRESS_TAIL {
        return address.to_string();
    }
    let head: String = chars[..SHORT_ADDRESS_HEAD].iter().collect();
    let tail: String = chars[chars.len() - SHORT_ADDRESS_TAIL..].iter().collect();
    format!("{}...{}", head, tail)
}

// Internal helper that checks conditions for `is_env_flag_enabled`.
pub fn is_env_flag_enabled(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|value| {
            let normalized = value.trim().to_ascii_lowercase();
            normalized == "1" || normalized == "true" || normalized == "yes" || normalized == "on"
        })
        .unwrap_or(false)
}
