use regex::Regex;
use std::sync::LazyLock;

const REDACTED_CREDENTIAL: &str = "x-access-token:***@";

// Tokens longer than 200 characters are not matched in full.
static ACCESS_TOKEN_CREDENTIAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"x-access-token:[^@]{1,200}@").unwrap());

/// Replaces every `x-access-token:<secret>@` credential in `message`.
///
/// Anything that may contain an authenticated remote URL goes through here
/// before it is logged, returned in an outcome or attached to an error.
pub fn sanitize(message: &str) -> String {
    ACCESS_TOKEN_CREDENTIAL
        .replace_all(message, REDACTED_CREDENTIAL)
        .into_owned()
}

/// Redacts the full context chain of an error.
pub fn sanitize_error(err: &anyhow::Error) -> String {
    sanitize(&format!("{err:#}"))
}
