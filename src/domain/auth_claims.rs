/// Identity extracted from a verified bearer token.
///
/// Lives for a single call and is never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthClaims {
    pub subject: Option<String>,
    pub authorized_party: Option<String>,
    pub client_id: Option<String>,
    pub raw_token: String,
}

impl std::fmt::Debug for AuthClaims {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthClaims")
            .field("subject", &self.subject)
            .field("authorized_party", &self.authorized_party)
            .field("client_id", &self.client_id)
            .field("raw_token", &"[REDACTED]")
            .finish()
    }
}
