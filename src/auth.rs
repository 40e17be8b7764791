//! Bearer-token authentication: sign-in and the claims extractor used by
//! every data endpoint.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRef, FromRequestParts, Json, State},
    http::request::Parts,
    http::{Response, StatusCode},
    response::IntoResponse,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use email_address::EmailAddress;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    config::AppConfig,
    password::RawPassword,
    user::{get_user_by_email, UserID},
    Error,
};

/// How long an auth token stays valid after it is issued.
const TOKEN_DURATION_MINUTES: i64 = 15;

/// The contents of an auth token.
///
/// Route handlers take `Claims` as an extractor argument to require
/// authentication; the user ID in the claims is the only source of the
/// owner for every scoped query.
#[derive(Serialize, Deserialize)]
pub struct Claims {
    /// The expiry time of the token.
    pub exp: usize,
    /// The time the token was issued.
    pub iat: usize,
    /// The ID of the authenticated user.
    pub user_id: UserID,
}

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    AppConfig: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| AuthError::InvalidToken)?;

        let app_config = parts
            .extract_with_state::<AppConfig, _>(state)
            .await
            .map_err(|_| AuthError::InvalidToken)?;

        let token_data = decode_jwt(bearer.token(), app_config.decoding_key())?;

        Ok(token_data.claims)
    }
}

/// The credentials a user signs in with.
#[derive(Deserialize)]
pub struct Credentials {
    /// Email entered during sign-in.
    pub email: EmailAddress,
    /// Password entered during sign-in.
    pub password: String,
}

/// The errors that may occur during authentication.
#[derive(Debug)]
pub enum AuthError {
    /// The email or password did not match a registered user.
    WrongCredentials,
    /// The token could not be created.
    TokenCreation,
    /// The token is missing, malformed, or expired.
    InvalidToken,
    /// An unexpected internal error.
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response<Body> {
        let (status, error_message) = match self {
            AuthError::WrongCredentials => (StatusCode::UNAUTHORIZED, "Wrong credentials"),
            AuthError::TokenCreation => (StatusCode::INTERNAL_SERVER_ERROR, "Token creation error"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Handler for sign-in requests. Responds with a fresh auth token.
///
/// # Errors
/// This function will return [AuthError::WrongCredentials] if the email does
/// not belong to a registered user or the password is not correct. Both
/// cases produce the same response so the client cannot probe for
/// registered emails.
pub async fn sign_in(
    State(state): State<AppConfig>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<String>, AuthError> {
    let user = {
        let connection = state.db_connection().map_err(|_| AuthError::InternalError)?;

        get_user_by_email(&credentials.email, &connection).map_err(|error| match error {
            Error::NotFound => AuthError::WrongCredentials,
            error => {
                tracing::error!("Error matching user: {error:?}");
                AuthError::InternalError
            }
        })?
    };

    let password = RawPassword::new_unchecked(credentials.password);
    let password_is_correct = user.password_hash().verify(&password).map_err(|error| {
        tracing::error!("Error verifying password: {}", error);
        AuthError::InternalError
    })?;

    if password_is_correct {
        let token = encode_jwt(user.id(), state.encoding_key())?;

        Ok(Json(token))
    } else {
        Err(AuthError::WrongCredentials)
    }
}

fn encode_jwt(user_id: UserID, encoding_key: &EncodingKey) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = (now + Duration::minutes(TOKEN_DURATION_MINUTES)).timestamp() as usize;
    let iat = now.timestamp() as usize;
    let claims = Claims { exp, iat, user_id };

    encode(&Header::default(), &claims, encoding_key).map_err(|_| AuthError::TokenCreation)
}

fn decode_jwt(jwt_token: &str, decoding_key: &DecodingKey) -> Result<TokenData<Claims>, AuthError> {
    decode(jwt_token, decoding_key, &Validation::default()).map_err(|_| AuthError::InvalidToken)
}


#[cfg(test)]
mod sign_in_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use serde_json::json;

    use crate::{build_router, db::initialize, AppConfig};

    fn get_test_app_config() -> AppConfig {
        let db_connection =
            Connection::open_in_memory().expect("Could not open database in memory.");
        initialize(&db_connection).expect("Could not initialize database.");

        AppConfig::new(db_connection, "foobar".to_string())
    }

    fn get_test_server() -> TestServer {
        let app = build_router().with_state(get_test_app_config());

        TestServer::new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn sign_in_succeeds_with_valid_credentials() {
        let server = get_test_server();

        server
            .post("/users")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "averysafeandsecurepassword",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = server
            .post("/sign_in")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "averysafeandsecurepassword",
            }))
            .await;

        response.assert_status_ok();
        assert!(!response.json::<String>().is_empty());
    }

    #[tokio::test]
    async fn sign_in_fails_with_unknown_email() {
        let server = get_test_server();

        server
            .post("/sign_in")
            .json(&json!({
                "email": "wrongemail@gmail.com",
                "password": "definitelyNotTheCorrectPassword",
            }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn sign_in_fails_with_wrong_password() {
        let server = get_test_server();

        server
            .post("/users")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "averysafeandsecurepassword",
            }))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/sign_in")
            .json(&json!({
                "email": "foo@bar.baz",
                "password": "notthecorrectpassword",
            }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_route_fails_with_missing_header() {
        let server = get_test_server();

        server
            .get("/categories")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_route_fails_with_garbage_token() {
        let server = get_test_server();

        server
            .get("/categories")
            .authorization_bearer("not.a.token")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
