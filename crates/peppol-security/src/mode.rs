#![forbid(unsafe_code)]

//! Operating modes and their trust policy.
//!
//! A [`ModeDescription`] is built once at configuration time and is
//! immutable afterwards, so it is safe for unlimited concurrent
//! readers. Callers needing both networks at once build two
//! independent descriptions.

/// The PEPPOL network a deployment operates against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Test,
    Production,
}

impl Mode {
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Test => "TEST",
            Self::Production => "PRODUCTION",
        }
    }

    fn issuers(&self, service: Service) -> Vec<String> {
        let names: &[&str] = match (self, service) {
            (Self::Test, Service::Ap) => &["PEPPOL ACCESS POINT TEST CA"],
            (Self::Test, Service::Smp) => &["PEPPOL SERVICE METADATA PUBLISHER TEST CA"],
            (Self::Production, Service::Ap) => &["PEPPOL ACCESS POINT CA"],
            (Self::Production, Service::Smp) => &["PEPPOL SERVICE METADATA PUBLISHER CA"],
        };
        names.iter().map(|n| (*n).to_owned()).collect()
    }
}

/// The role a certificate plays in the network. Closed set; adding a
/// role is a compile-checked exhaustiveness gap, not a silently empty
/// issuer list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Access point: receives business documents.
    Ap,
    /// Service metadata publisher: signs directory records.
    Smp,
}

/// The complete trust configuration for one mode: accepted issuer
/// names per role and the truststore holding the CA certificates.
#[derive(Debug, Clone)]
pub struct ModeDescription {
    identifier: String,
    issuers_ap: Vec<String>,
    issuers_smp: Vec<String>,
    truststore: Vec<u8>,
}

impl ModeDescription {
    /// The standard policy for a mode. Truststore bytes (a certificate
    /// store holding the mode's CA certificates) are supplied by the
    /// caller; loading them from disk is outside this crate.
    pub fn new(mode: Mode, truststore: Vec<u8>) -> Self {
        Self {
            identifier: mode.identifier().to_owned(),
            issuers_ap: mode.issuers(Service::Ap),
            issuers_smp: mode.issuers(Service::Smp),
            truststore,
        }
    }

    /// A custom policy for non-standard deployments.
    pub fn with_issuers(
        identifier: impl Into<String>,
        issuers_ap: Vec<String>,
        issuers_smp: Vec<String>,
        truststore: Vec<u8>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            issuers_ap,
            issuers_smp,
            truststore,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Accepted issuer names for a role, in preference order.
    pub fn issuers(&self, service: Service) -> &[String] {
        match service {
            Service::Ap => &self.issuers_ap,
            Service::Smp => &self.issuers_smp,
        }
    }

    pub fn truststore(&self) -> &[u8] {
        &self.truststore
    }
}
