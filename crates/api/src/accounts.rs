//! Dealer registration, login and token authentication.

use dealerbook_core::{
    errors::storage,
    models::{Dealer, DealerResponse, LoginRequest, LoginResponse, NewDealer, RegisterDealerRequest},
    store::SharedStore,
    ServiceError, ServiceResult, StoreError,
};
use tracing::info;

use crate::middleware::auth::{hash_password, verify_password, TokenKeys};

const BAD_CREDENTIALS: &str = "Invalid username or password";

#[derive(Clone)]
pub struct AccountService {
    store: SharedStore,
    tokens: TokenKeys,
}

impl AccountService {
    pub fn new(store: SharedStore, tokens: TokenKeys) -> Self {
        Self { store, tokens }
    }

    pub async fn register(&self, request: RegisterDealerRequest) -> ServiceResult<DealerResponse> {
        let name = request.name.trim();
        let username = request.username.trim();
        let address = request.address.trim();

        let missing: Vec<&str> = [
            ("name", name),
            ("username", username),
            ("password", request.password.as_str()),
            ("address", address),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();
        if !missing.is_empty() {
            return Err(ServiceError::InvalidInput(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let password_hash = hash_password(&request.password)?;
        let dealer = self
            .store
            .insert_dealer(NewDealer {
                name: name.to_string(),
                username: username.to_string(),
                address: address.to_string(),
                password_hash,
            })
            .await
            .map_err(|err| match err {
                StoreError::UniqueViolation(_) => {
                    ServiceError::Conflict("Username already exists".to_string())
                }
                other => storage("register_dealer")(other),
            })?;

        info!(dealer_id = %dealer.id, username = %dealer.username, "dealer registered");
        Ok(dealer.into())
    }

    /// Unknown usernames and wrong passwords fail identically.
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<LoginResponse> {
        let dealer = self
            .store
            .find_dealer_by_username(request.username.trim())
            .await
            .map_err(storage("login"))?
            .ok_or_else(|| ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()))?;

        if !verify_password(&request.password, &dealer.password_hash)? {
            return Err(ServiceError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        let (token, expires_at) = self.tokens.issue(dealer.id, &dealer.username)?;
        info!(dealer_id = %dealer.id, "dealer logged in");

        Ok(LoginResponse { token, expires_at })
    }

    /// Resolves a bearer token to a dealer that still exists.
    pub async fn authenticate(&self, token: &str) -> ServiceResult<Dealer> {
        let dealer_id = self.tokens.verify(token)?;

        self.store
            .find_dealer_by_id(dealer_id)
            .await
            .map_err(storage("authenticate"))?
            .ok_or_else(|| ServiceError::Unauthorized("Dealer no longer exists".to_string()))
    }
}
