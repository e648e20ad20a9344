//! PII categories and their token codes.

use serde::{Deserialize, Serialize};

/// Kind of sensitive value a detector looks for.
///
/// The set is fixed at compile time; configuration selects which subset
/// is active for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PiiCategory {
    /// Dotted-quad IPv4 address
    Ipv4,
    /// IPv6 address, including link-local forms with scope id
    Ipv6,
    /// Email address (TLD optional)
    Email,
    /// 13-16 digit card number
    CreditCard,
    /// US social security number
    Ssn,
    /// Phone number
    PhoneNumber,
    /// International bank account number
    Iban,
    /// NetBIOS-style host name
    Hostname,
    /// Fully qualified domain name
    Fqdn,
    /// DOMAIN\user
    DomainUser,
    /// DOMAIN\user with strict boundaries
    Username,
    /// SHA-1 certificate thumbprint
    CertificateThumbprint,
    /// Bearer token in an authorization header
    BearerToken,
    /// Password / user id value in a connection string
    ConnectionStringSecret,
    /// API key header or parameter value
    ApiKey,
}

/// Static code table; indexed lookups keep this free of dynamic dispatch.
const CODES: &[(PiiCategory, &str)] = &[
    (PiiCategory::Ipv4, "IP4"),
    (PiiCategory::Ipv6, "IP6"),
    (PiiCategory::Email, "EMAIL"),
    (PiiCategory::CreditCard, "CC"),
    (PiiCategory::Ssn, "SSN"),
    (PiiCategory::PhoneNumber, "PHN"),
    (PiiCategory::Iban, "IBAN"),
    (PiiCategory::Hostname, "HOST"),
    (PiiCategory::Fqdn, "FQDN"),
    (PiiCategory::DomainUser, "USR"),
    (PiiCategory::Username, "USR"),
    (PiiCategory::CertificateThumbprint, "CERT"),
    (PiiCategory::BearerToken, "BEAR"),
    (PiiCategory::ConnectionStringSecret, "SEC"),
    (PiiCategory::ApiKey, "KEY"),
];

impl PiiCategory {
    /// Every category, in declaration order.
    pub const ALL: [PiiCategory; 15] = [
        PiiCategory::Ipv4,
        PiiCategory::Ipv6,
        PiiCategory::Email,
        PiiCategory::CreditCard,
        PiiCategory::Ssn,
        PiiCategory::PhoneNumber,
        PiiCategory::Iban,
        PiiCategory::Hostname,
        PiiCategory::Fqdn,
        PiiCategory::DomainUser,
        PiiCategory::Username,
        PiiCategory::CertificateThumbprint,
        PiiCategory::BearerToken,
        PiiCategory::ConnectionStringSecret,
        PiiCategory::ApiKey,
    ];

    /// Short code used inside tokens, e.g. `IP4` in `[IP4-1A2B3C]`.
    pub fn code(&self) -> &'static str {
        CODES
            .iter()
            .find(|(category, _)| category == self)
            .map(|(_, code)| *code)
            .unwrap_or("ID")
    }

    /// Identifier-shaped categories go through the allowlist check and run last.
    pub fn is_identifier(&self) -> bool {
        matches!(
            self,
            PiiCategory::Hostname
                | PiiCategory::Fqdn
                | PiiCategory::DomainUser
                | PiiCategory::Username
        )
    }

    /// Canonical snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PiiCategory::Ipv4 => "ipv4",
            PiiCategory::Ipv6 => "ipv6",
            PiiCategory::Email => "email",
            PiiCategory::CreditCard => "credit_card",
            PiiCategory::Ssn => "ssn",
            PiiCategory::PhoneNumber => "phone_number",
            PiiCategory::Iban => "iban",
            PiiCategory::Hostname => "hostname",
            PiiCategory::Fqdn => "fqdn",
            PiiCategory::DomainUser => "domain_user",
            PiiCategory::Username => "username",
            PiiCategory::CertificateThumbprint => "certificate_thumbprint",
            PiiCategory::BearerToken => "bearer_token",
            PiiCategory::ConnectionStringSecret => "connection_string_secret",
            PiiCategory::ApiKey => "api_key",
        }
    }
}

impl std::str::FromStr for PiiCategory {
    type Err = String;

    /// Accepts snake_case names, the long-form names used by older
    /// configurations (`IPv4Address`, `SocialSecurityNumber`, ...), and
    /// token codes where they are unambiguous.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        let category = match normalized.as_str() {
            "ipv4" | "ipv4address" | "ip4" => PiiCategory::Ipv4,
            "ipv6" | "ipv6address" | "ip6" => PiiCategory::Ipv6,
            "email" | "eml" => PiiCategory::Email,
            "creditcard" | "cc" => PiiCategory::CreditCard,
            "ssn" | "socialsecuritynumber" => PiiCategory::Ssn,
            "phonenumber" | "phone" | "phn" => PiiCategory::PhoneNumber,
            "iban" => PiiCategory::Iban,
            "hostname" | "host" => PiiCategory::Hostname,
            "fqdn" => PiiCategory::Fqdn,
            "domainuser" => PiiCategory::DomainUser,
            "username" => PiiCategory::Username,
            "certificatethumbprint" | "thumbprint" | "cert" => {
                PiiCategory::CertificateThumbprint
            }
            "bearertoken" | "bearer" => PiiCategory::BearerToken,
            "connectionstringsecret" | "connectionstringpassword" | "sec" => {
                PiiCategory::ConnectionStringSecret
            }
            "apikey" | "key" => PiiCategory::ApiKey,
            _ => return Err(format!("unknown PII category: {}", s)),
        };
        Ok(category)
    }
}

impl std::fmt::Display for PiiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_short() {
        for category in PiiCategory::ALL {
            let code = category.code();
            assert!(
                (2..=5).contains(&code.len()),
                "code {} for {} out of range",
                code,
                category
            );
            assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_every_category_has_code() {
        assert_eq!(CODES.len(), PiiCategory::ALL.len());
        assert_eq!(PiiCategory::Ipv4.code(), "IP4");
        assert_eq!(PiiCategory::Ipv6.code(), "IP6");
        assert_eq!(PiiCategory::ConnectionStringSecret.code(), "SEC");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("ipv4".parse::<PiiCategory>(), Ok(PiiCategory::Ipv4));
        assert_eq!("IPv4Address".parse::<PiiCategory>(), Ok(PiiCategory::Ipv4));
        assert_eq!(
            "SocialSecurityNumber".parse::<PiiCategory>(),
            Ok(PiiCategory::Ssn)
        );
        assert_eq!(
            "connection_string_secret".parse::<PiiCategory>(),
            Ok(PiiCategory::ConnectionStringSecret)
        );
        assert_eq!(
            "ConnectionStringPassword".parse::<PiiCategory>(),
            Ok(PiiCategory::ConnectionStringSecret)
        );
        assert!("bogus".parse::<PiiCategory>().is_err());
    }

    #[test]
    fn test_display_roundtrips_through_parse() {
        for category in PiiCategory::ALL {
            assert_eq!(category.to_string().parse::<PiiCategory>(), Ok(category));
        }
    }

    #[test]
    fn test_identifier_set() {
        let identifiers: Vec<_> = PiiCategory::ALL
            .iter()
            .filter(|c| c.is_identifier())
            .collect();
        assert_eq!(identifiers.len(), 4);
        assert!(!PiiCategory::Ipv6.is_identifier());
    }
}
