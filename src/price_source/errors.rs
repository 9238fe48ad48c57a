use thiserror::Error;

/// Tagged result variants for the price source, replacing the
/// exception-for-control-flow pattern `spec.md` §9 calls out in the
/// original: an `AuthError` is a misconfiguration and is surfaced,
/// `Unavailable` and `ParseError` are absorbed by the orchestrator into
/// the fallback series (spec.md §4.3, §7).
#[derive(Error, Debug)]
pub enum PriceSourceError {
    #[error("unknown bidding zone: {0}")]
    UnknownZone(String),
    #[error("auth error calling price feed: {0}")]
    AuthError(String),
    #[error("price feed unavailable: {0}")]
    Unavailable(String),
    #[error("failed to parse price feed response: {0}")]
    ParseError(String),
}

impl From<ureq::Error> for PriceSourceError {
    fn from(e: ureq::Error) -> Self {
        match &e {
            ureq::Error::StatusCode(401) => PriceSourceError::AuthError(e.to_string()),
            ureq::Error::StatusCode(_) => PriceSourceError::Unavailable(e.to_string()),
            _ => PriceSourceError::Unavailable(e.to_string()),
        }
    }
}

impl From<quick_xml::DeError> for PriceSourceError {
    fn from(e: quick_xml::DeError) -> Self {
        PriceSourceError::ParseError(e.to_string())
    }
}

impl From<std::io::Error> for PriceSourceError {
    fn from(e: std::io::Error) -> Self {
        PriceSourceError::Unavailable(e.to_string())
    }
}
