use crate::error::Error;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub(crate) struct APIError(anyhow::Error);

impl IntoResponse for APIError {
    fn into_response(self) -> Response {
        let any_err = self.0;
        let (status, label) = match any_err.downcast_ref::<Error>() {
            Some(Error::InvalidJSON(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Could not unmarshal json")
            }
            // Body read failures.
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Error"),
        };
        tracing::debug!("rejected request ({status}): {any_err}");
        let body = Json(json!({
            "status": label,
            "errormessage": format!("{any_err}"),
        }));
        (status, body).into_response()
    }
}

impl<E> From<E> for APIError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
