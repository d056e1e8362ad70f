//! Identifier classification and phone number canonicalization.
//!
//! A login/reset key is either an email address or a local mobile number.
//! Local mobile numbers (`0` followed by 9 digits after the leading `9`) are
//! canonicalized to international form (`+98` prefix) before any network
//! call; everything else passes through verbatim.

use std::sync::LazyLock;

use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static LOCAL_MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^09\d{9}$").unwrap());

/// Country calling code prepended when canonicalizing local mobile numbers.
pub const COUNTRY_CALLING_CODE: &str = "+98";

/// What kind of login key a raw string is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Email,
    PhoneNumber,
    Invalid,
}

/// Classify a raw string as an email, a local mobile number, or invalid.
pub fn classify(input: &str) -> IdentifierKind {
    if EMAIL_RE.is_match(input) {
        IdentifierKind::Email
    } else if LOCAL_MOBILE_RE.is_match(input) {
        IdentifierKind::PhoneNumber
    } else {
        IdentifierKind::Invalid
    }
}

/// Canonicalize a local mobile number to international form.
///
/// `09123456789` becomes `+989123456789`. Anything that does not match the
/// local-mobile pattern (including emails) is returned unchanged; callers
/// classify first.
pub fn normalize_phone(input: &str) -> String {
    if LOCAL_MOBILE_RE.is_match(input) {
        format!("{}{}", COUNTRY_CALLING_CODE, &input[1..])
    } else {
        input.to_string()
    }
}

/// A classified identifier carrying both the raw user input and the
/// canonical form sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    raw: String,
    normalized: String,
    kind: IdentifierKind,
}

impl Identifier {
    /// Trim and classify a raw string. Returns `None` when the input is
    /// neither an email nor a local mobile number, so a constructed
    /// `Identifier` is always valid.
    pub fn parse(input: &str) -> Option<Self> {
        let raw = input.trim();
        match classify(raw) {
            IdentifierKind::Invalid => None,
            kind => Some(Self {
                raw: raw.to_string(),
                normalized: normalize_phone(raw),
                kind,
            }),
        }
    }

    /// The trimmed string as the user typed it.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The canonical form used in request payloads.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    pub fn is_phone(&self) -> bool {
        self.kind == IdentifierKind::PhoneNumber
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== Classification =====

    #[test]
    fn classifies_email() {
        assert_eq!(classify("a@b.com"), IdentifierKind::Email);
        assert_eq!(classify("user.name@example.co.ir"), IdentifierKind::Email);
    }

    #[test]
    fn classifies_local_mobile() {
        assert_eq!(classify("09123456789"), IdentifierKind::PhoneNumber);
    }

    #[test]
    fn rejects_everything_else() {
        assert_eq!(classify("not-an-identifier"), IdentifierKind::Invalid);
        assert_eq!(classify(""), IdentifierKind::Invalid);
        assert_eq!(classify("0912345678"), IdentifierKind::Invalid); // 10 digits
        assert_eq!(classify("091234567890"), IdentifierKind::Invalid); // 12 digits
        assert_eq!(classify("9123456789"), IdentifierKind::Invalid); // missing leading 0
        assert_eq!(classify("+989123456789"), IdentifierKind::Invalid); // already international
        assert_eq!(classify("user@nodot"), IdentifierKind::Invalid);
        assert_eq!(classify("user @b.com"), IdentifierKind::Invalid);
    }

    // ===== Normalization =====

    #[test]
    fn normalizes_local_mobile_numbers() {
        assert_eq!(normalize_phone("09123456789"), "+989123456789");
        assert_eq!(normalize_phone("09000000000"), "+989000000000");
        assert_eq!(normalize_phone("09999999999"), "+989999999999");
    }

    #[test]
    fn keeps_the_last_nine_digits_intact() {
        // +98 replaces only the leading 0; the remaining 10 digits survive.
        for suffix in ["123456789", "987654321", "000000001"] {
            let local = format!("09{suffix}");
            assert_eq!(normalize_phone(&local), format!("+989{suffix}"));
        }
    }

    #[test]
    fn passes_non_phone_input_through_unchanged() {
        for input in [
            "a@b.com",
            "not-an-identifier",
            "",
            "+989123456789",
            "0912345678",
        ] {
            assert_eq!(normalize_phone(input), input);
        }
    }

    // ===== Identifier::parse =====

    #[test]
    fn parse_trims_and_normalizes() {
        let id = Identifier::parse("  09123456789 ").unwrap();
        assert_eq!(id.raw(), "09123456789");
        assert_eq!(id.normalized(), "+989123456789");
        assert!(id.is_phone());
    }

    #[test]
    fn parse_keeps_emails_verbatim() {
        let id = Identifier::parse("a@b.com").unwrap();
        assert_eq!(id.normalized(), "a@b.com");
        assert_eq!(id.kind(), IdentifierKind::Email);
        assert!(!id.is_phone());
    }

    #[test]
    fn parse_rejects_invalid_input() {
        assert!(Identifier::parse("nope").is_none());
        assert!(Identifier::parse("   ").is_none());
    }
}
