use serde::Serialize;
use time::OffsetDateTime;

/// A cookie decoded from a browser store.
///
/// The same shape is produced for every browser family; store-specific
/// encodings are resolved by the record decoders before one of these is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    #[serde(with = "time::serde::timestamp")]
    pub expires: OffsetDateTime,
    #[serde(with = "time::serde::timestamp")]
    pub creation: OffsetDateTime,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    pub fn new(
        name: impl Into<String>,
        value: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
        expires: OffsetDateTime,
        creation: OffsetDateTime,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: domain.into(),
            path: path.into(),
            expires,
            creation,
            secure: false,
            http_only: false,
        }
    }

    /// Session cookies are stored with an expiry at (or before) the epoch.
    pub fn is_session(&self) -> bool {
        self.expires.unix_timestamp() <= 0
    }

    pub fn is_expired(&self, current_time: OffsetDateTime) -> bool {
        !self.is_session() && self.expires < current_time
    }

    /// Convert into a [`cookie::Cookie`] suitable for an HTTP client jar.
    pub fn to_http_cookie(&self) -> cookie::Cookie<'static> {
        let mut builder = cookie::Cookie::build((self.name.clone(), self.value.clone()))
            .domain(self.domain.clone())
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only);
        if !self.is_session() {
            builder = builder.expires(self.expires);
        }
        builder.build()
    }
}

impl From<&Cookie> for cookie::Cookie<'static> {
    fn from(c: &Cookie) -> Self {
        c.to_http_cookie()
    }
}
