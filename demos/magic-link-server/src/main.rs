use std::sync::Arc;

use async_trait::async_trait;
use axum::{Router, response::Html, routing::get};
use dashmap::DashMap;
use serde::Serialize;
use sesame_core::SigningKey;
use sesame_magic_link::{
    BoxError, MagicLinkConfig, MagicLinkError, MagicLinkStrategy, Resolution, Resolver,
    TracingDelivery, VerifiedClaims,
};

/// This example demonstrates how to serve magic link authentication with sesame.
/// It creates a simple web server with:
/// - Landing page with usage instructions (/)
/// - Magic link request route (POST /auth/magic-link)
/// - Magic link verification routes (GET /auth/magic-link/verify/{token}, POST /auth/magic-link/verify)
/// - Health check (/auth/health)
///
/// Links are written to the log by `TracingDelivery` instead of being emailed.
/// Configuration is read from `MAGIC_LINK_*` environment variables, falling back
/// to an insecure development setup.
#[derive(Debug, Clone, Serialize)]
struct User {
    id: u64,
    email: String,
    name: String,
}

/// In-memory user directory used to resolve verified claims
#[derive(Default)]
struct UserDirectory {
    users: DashMap<String, User>,
}

impl UserDirectory {
    fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let directory = Self::default();
        for user in users {
            directory.users.insert(user.email.to_lowercase(), user);
        }
        directory
    }
}

#[async_trait]
impl Resolver for UserDirectory {
    type Identity = User;

    async fn resolve(&self, claims: &VerifiedClaims) -> Result<Resolution<User>, BoxError> {
        let resolution = match self.users.get(&claims.email().to_lowercase()) {
            Some(user) => Resolution::authenticated(user.clone()),
            None => Resolution::rejected().with_info("No account for this email"),
        };
        Ok(resolution)
    }
}

fn load_config() -> Result<MagicLinkConfig, MagicLinkError> {
    match MagicLinkConfig::from_env() {
        Ok(config) => Ok(config),
        Err(err) => {
            tracing::warn!(error = %err, "Falling back to the development configuration");
            // NOTE: DO NOT DO THIS IN PRODUCTION. THIS IS ONLY FOR DEMONSTRATION PURPOSES.
            MagicLinkConfig::builder(
                SigningKey::hmac("development-secret-do-not-use-in-production"),
                "http://localhost:4000/auth/magic-link/verify",
            )
            .build()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let directory = UserDirectory::with_users([
        User {
            id: 1,
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
        },
        User {
            id: 2,
            email: "bob@example.com".to_string(),
            name: "Bob".to_string(),
        },
    ]);

    let strategy = Arc::new(MagicLinkStrategy::new(
        load_config()?,
        TracingDelivery,
        directory,
    ));

    let app = Router::new()
        .route(
            "/",
            get(|| async {
                Html(
                    r#"
                <h1>Magic Link</h1>
                <p>Request a link for a known user (alice@example.com or bob@example.com):</p>
                <pre>curl -X POST http://localhost:4000/auth/magic-link \
    -H 'content-type: application/json' \
    -d '{"email": "alice@example.com"}'</pre>
                <p>The link is written to the server log. Open it to sign in.</p>
                "#,
                )
            }),
        )
        .nest("/auth", sesame_axum::routes(strategy).build());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:4000").await?;
    tracing::info!(address = %listener.local_addr()?, "Listening");
    axum::serve(listener, app).await?;

    Ok(())
}
