use crate::auth::AuthFailure;
use crate::error::Error;

/// Tagged result of an authenticated request.
///
/// Authentication failures get their own arm instead of hiding inside
/// [`Error`], so callers can route them to the setup flow without
/// inspecting error variants. A response that ended in `AuthRequired`
/// never carries usable data.
#[derive(Debug)]
#[must_use]
pub enum ApiOutcome<T> {
    Ok(T),
    AuthRequired(AuthFailure),
    Failed(Error),
}

impl<T> ApiOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiOutcome<U> {
        match self {
            Self::Ok(v) => ApiOutcome::Ok(f(v)),
            Self::AuthRequired(why) => ApiOutcome::AuthRequired(why),
            Self::Failed(e) => ApiOutcome::Failed(e),
        }
    }

    /// The payload, discarding any failure.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Ok(v) => Some(v),
            Self::AuthRequired(_) | Self::Failed(_) => None,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired(_))
    }

    /// Collapse into a plain `Result`, folding `AuthRequired` into
    /// [`Error::AuthRequired`].
    pub fn into_result(self) -> Result<T, Error> {
        match self {
            Self::Ok(v) => Ok(v),
            Self::AuthRequired(why) => Err(Error::AuthRequired(why)),
            Self::Failed(e) => Err(e),
        }
    }
}

impl<T> From<Result<T, Error>> for ApiOutcome<T> {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(v) => Self::Ok(v),
            Err(Error::AuthRequired(why)) => Self::AuthRequired(why),
            Err(e) => Self::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_preserves_failure_arms() {
        let auth: ApiOutcome<u8> = ApiOutcome::AuthRequired(AuthFailure::Rejected);
        assert!(auth.map(|v| v + 1).is_auth_required());

        let ok: ApiOutcome<u8> = ApiOutcome::Ok(1);
        assert_eq!(ok.map(|v| v + 1).ok(), Some(2));
    }

    #[test]
    fn result_round_trip_keeps_auth_distinct() {
        let outcome: ApiOutcome<()> =
            Err(Error::AuthRequired(AuthFailure::MissingCredential)).into();
        assert!(outcome.is_auth_required());
        assert!(matches!(
            outcome.into_result(),
            Err(Error::AuthRequired(AuthFailure::MissingCredential))
        ));

        let failed: ApiOutcome<()> = Err(Error::Timeout { timeout_secs: 3 }).into();
        assert!(matches!(failed, ApiOutcome::Failed(Error::Timeout { .. })));
    }
}
