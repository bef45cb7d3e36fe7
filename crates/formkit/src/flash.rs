//! Flashing old input and validation errors through the session.
//!
//! After a failed submission the handler flashes the submitted values and the
//! error bag, then redirects back. The next request takes both out of the
//! session (removing them) and hands them to a [`FormRenderer`].
//!
//! [`FormRenderer`]: crate::FormRenderer

use tower_sessions::Session;
use tracing::debug;

use crate::context::{ErrorBag, OldInput};
use crate::error::FormResult;

/// Session key for flashed input.
pub const OLD_INPUT_SESSION_KEY: &str = "_old_input";

/// Session key for flashed validation errors.
pub const ERRORS_SESSION_KEY: &str = "_errors";

/// Store the submitted input for the next request.
pub async fn flash_input(session: &Session, input: &OldInput) -> FormResult<()> {
    session.insert(OLD_INPUT_SESSION_KEY, input).await?;
    debug!(fields = input.len(), "flashed old input");
    Ok(())
}

/// Store validation errors for the next request.
pub async fn flash_errors(session: &Session, errors: &ErrorBag) -> FormResult<()> {
    session.insert(ERRORS_SESSION_KEY, errors).await?;
    debug!(fields = errors.len(), "flashed validation errors");
    Ok(())
}

/// Take flashed input out of the session; empty when none was flashed.
pub async fn take_old_input(session: &Session) -> FormResult<OldInput> {
    let input: Option<OldInput> = session.remove(OLD_INPUT_SESSION_KEY).await?;
    Ok(input.unwrap_or_default())
}

/// Take flashed errors out of the session; empty when none were flashed.
pub async fn take_errors(session: &Session) -> FormResult<ErrorBag> {
    let errors: Option<ErrorBag> = session.remove(ERRORS_SESSION_KEY).await?;
    Ok(errors.unwrap_or_default())
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;
    use crate::context::{ErrorOracle, RequestValueSource};
    use crate::value::FieldValue;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    #[tokio::test]
    async fn test_flash_round_trip_is_single_use() {
        let session = session();
        let input = OldInput::from_pairs([("name", "Ana"), ("tags[]", "a"), ("tags[]", "b")]);
        let errors = ErrorBag::new().with("email", "Required");

        flash_input(&session, &input).await.unwrap();
        flash_errors(&session, &errors).await.unwrap();

        let taken = take_old_input(&session).await.unwrap();
        assert_eq!(taken.old_value("name"), Some(FieldValue::from("Ana")));
        assert_eq!(taken.old_value("tags"), Some(FieldValue::from(vec!["a", "b"])));
        assert!(take_errors(&session).await.unwrap().has_error("email"));

        assert!(take_old_input(&session).await.unwrap().is_empty());
        assert!(take_errors(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_take_without_flash_is_empty() {
        let session = session();
        assert!(take_old_input(&session).await.unwrap().is_empty());
        assert!(take_errors(&session).await.unwrap().is_empty());
    }
}
