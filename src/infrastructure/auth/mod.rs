mod jwks_token_verifier;

pub use jwks_token_verifier::{
    DEFAULT_REFRESH_INTERVAL, JwksTokenVerifier, MIN_REFRESH_INTERVAL,
};
