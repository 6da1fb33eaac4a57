use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use axum_extra::extract::cookie::CookieJar;
use sea_orm::DatabaseConnection;
use tower_http::trace::TraceLayer;

use std::sync::Arc;

use crate::{
    AuthConfig, AuthError, ServerError, accounts,
    auth::{self, ACCESS_COOKIE},
    budget, contact,
    login_attempts::{InMemoryLoginAttempts, LoginAttemptStore},
    transactions,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub db: DatabaseConnection,
    pub auth: Arc<AuthConfig>,
    pub login_attempts: Arc<dyn LoginAttemptStore>,
}

impl ServerState {
    /// State with the in-memory login attempt store.
    pub fn new(engine: Engine, db: DatabaseConnection, auth: AuthConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            db,
            auth: Arc::new(auth),
            login_attempts: Arc::new(InMemoryLoginAttempts::default()),
        }
    }

    pub fn with_login_attempts(mut self, store: Arc<dyn LoginAttemptStore>) -> Self {
        self.login_attempts = store;
        self
    }
}

/// Resolves the `token` cookie to a user and stores it as a request
/// extension.
async fn require_user(
    State(state): State<ServerState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = jar.get(ACCESS_COOKIE).ok_or(AuthError::Unauthorized)?;
    let claims = auth::decode_token(token.value(), &state.auth.access_secret)?;
    let user = auth::find_user_by_id(&state, &claims.sub)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn router(state: ServerState) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(auth::me).patch(auth::update_me))
        .route("/accounts", get(accounts::list).post(accounts::create))
        .route(
            "/accounts/{id}",
            get(accounts::get)
                .patch(accounts::update)
                .delete(accounts::delete),
        )
        .route("/accounts/{id}/recompute", post(accounts::recompute))
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/transactions/bulkDelete", post(transactions::bulk_delete))
        .route(
            "/transactions/{id}",
            get(transactions::get).patch(transactions::update),
        )
        .route("/budget", get(budget::progress).put(budget::set))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/contact", post(contact::submit))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
