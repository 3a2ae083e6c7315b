//! Lenient boolean literals as the carrier spells them.

/// A string that is neither a truthy nor a falsy literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for Boolean: \"{0}\"")]
pub struct InvalidBoolean(pub String);

impl From<InvalidBoolean> for freightrate_core::PortError {
    fn from(err: InvalidBoolean) -> Self {
        freightrate_core::PortError::InvalidBoolean(err.0)
    }
}

/// Interpret a carrier boolean literal.
///
/// `true`, `t`, `yes`, `y` and `1` (any case) are true; `false`, `f`, `no`,
/// `n`, `0` and blank input are false.
///
/// # Errors
///
/// Returns [`InvalidBoolean`] for any other input.
pub fn parse_bool_literal(raw: &str) -> Result<bool, InvalidBoolean> {
    let literal = raw.trim();
    if literal.is_empty() {
        return Ok(false);
    }

    match literal.to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(true),
        "false" | "f" | "no" | "n" | "0" => Ok(false),
        _ => Err(InvalidBoolean(raw.to_owned())),
    }
}
