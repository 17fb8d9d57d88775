//! Registration and login endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use ordercore::accounts::Registration;
use ordercore::domain::{Role, User};
use ordercore::store::ShopStore;
use ordercore::types::{EmailAddress, Password, PersonName, PhoneNumber, UserId};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::handlers::AddressDto;
use crate::state::AppState;

/// Body of `POST /api/auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Raw password.
    pub password: String,
    /// Contact phone.
    pub phone_number: String,
    /// Saved addresses, optional.
    #[serde(default)]
    pub address: Vec<AddressDto>,
}

/// Body of `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Raw password.
    pub password: String,
}

/// Public view of a user returned by the auth endpoints.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    /// User id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Authorization role.
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.to_string(),
            email: user.email.to_string(),
            role: user.role,
        }
    }
}

/// Response of both auth endpoints.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Outcome message.
    pub message: String,
    /// The signed-in user.
    pub user: UserSummary,
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// `POST /api/auth/register`
pub async fn register<S: ShopStore + 'static>(
    State(state): State<AppState<S>>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let name =
        PersonName::try_new(request.name).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let email =
        EmailAddress::try_new(request.email).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let password =
        Password::try_new(request.password).map_err(|e| ApiError::bad_request(e.to_string()))?;
    let phone = PhoneNumber::try_new(request.phone_number)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let addresses = request
        .address
        .into_iter()
        .map(AddressDto::into_domain)
        .collect::<Result<Vec<_>, _>>()?;

    let user = state
        .accounts
        .register(Registration {
            name,
            email,
            phone,
            password,
            addresses,
        })
        .await?;

    let token = state.sessions.issue(&user);
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: UserSummary::from(&user),
            token,
        }),
    ))
}

/// `POST /api/auth/login`
pub async fn login<S: ShopStore + 'static>(
    State(state): State<AppState<S>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    // A malformed email or password can never match a stored credential;
    // answer exactly like a wrong one.
    let email = EmailAddress::try_new(request.email)
        .map_err(|_| ApiError::bad_request("Invalid credentials"))?;
    let password = Password::try_new(request.password)
        .map_err(|_| ApiError::bad_request("Invalid credentials"))?;

    let user = state.accounts.login(&email, &password).await?;
    let token = state.sessions.issue(&user);

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user: UserSummary::from(&user),
        token,
    }))
}
