use crate::api::routes;
use crate::config::SharedConfig;
use crate::error::Error;
use crate::xfr::Client;
use std::future::Future;

#[derive(Clone)]
pub(super) struct AppState {
    pub config: SharedConfig,
    pub client: Client,
}

/// Bind the API listener to [`Config::listen`][crate::config::Config::listen] and return the
/// server future.
///
/// # Errors
///
/// Returns [`Error::HTTPError`] if the listen address can't be bound.
pub fn new(config: SharedConfig) -> Result<impl Future<Output = hyper::Result<()>>, Error> {
    let client = Client::new(config.clone());
    let builder = axum::Server::try_bind(&config.listen)?;
    Ok(builder.serve(routes::new(AppState { config, client }).into_make_service()))
}
