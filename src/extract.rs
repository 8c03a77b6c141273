use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::errors::AppError;

/// JSON body that is deserialized with field paths and then validated.
///
/// Type errors and rule violations both surface as 422 keyed by field name.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| AppError::bad_request(rejection.body_text()))?;

        let value: T = parse_body(&bytes)?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

pub(crate) fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AppError> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        let unreadable = err.inner().is_syntax() || err.inner().is_eof();
        let message = err.inner().to_string();

        // An empty path renders as "?"; unparseable input has no field to blame.
        let field = match missing_field(&message) {
            Some(name) => name.to_string(),
            None if unreadable || path == "?" => "body".to_string(),
            None => path,
        };
        let message = match missing_field(&message) {
            Some(name) => format!("The {name} field is required."),
            None => message,
        };
        AppError::invalid(field, message)
    })
}

fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}
