//! One-shot confirmation codes.
//!
//! A code is `"{issued_at}-{mac}"`: `issued_at` is a base-36 UNIX timestamp
//! and `mac` is HMAC-SHA256 over the user's fingerprint and `issued_at`,
//! base64url-encoded. Nothing is stored; any change to a fingerprinted field
//! (including `last_login`, stamped on every token exchange) invalidates every
//! code issued before it.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Default code lifetime in seconds (3 days).
pub const DEFAULT_CODE_TTL_SECS: u64 = 259_200;

/// Field separator inside the MAC input. Not allowed in usernames or emails.
const SEP: &[u8] = b"\x1f";

/// The mutable user state a code is bound to.
#[derive(Debug, Clone)]
pub struct UserFingerprint<'a> {
    pub user_id: i32,
    pub username: &'a str,
    pub email: &'a str,
    pub role: u8,
    pub is_superuser: bool,
    /// `last_login` as UNIX microseconds, `None` before the first login.
    pub last_login: Option<i64>,
}

/// Generates and checks confirmation codes with a server secret.
#[derive(Clone)]
pub struct ConfirmationCodes {
    keyed: HmacSha256,
    ttl_secs: u64,
}

impl std::fmt::Debug for ConfirmationCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmationCodes")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl ConfirmationCodes {
    pub fn new(secret: &str, ttl_secs: u64) -> Result<Self, InvalidLength> {
        Ok(Self {
            keyed: HmacSha256::new_from_slice(secret.as_bytes())?,
            ttl_secs,
        })
    }

    /// Build the code for `fingerprint` as of `now` (UNIX seconds).
    pub fn make_code(&self, fingerprint: &UserFingerprint<'_>, now: u64) -> String {
        let tag = self.mac(fingerprint, now).finalize().into_bytes();
        format!("{}-{}", to_base36(now), URL_SAFE_NO_PAD.encode(tag))
    }

    /// Check `code` against `fingerprint` as of `now` (UNIX seconds).
    ///
    /// Returns `false` for malformed, future-dated, expired or mismatching
    /// codes alike.
    pub fn check_code(&self, fingerprint: &UserFingerprint<'_>, code: &str, now: u64) -> bool {
        let Some((ts, tag)) = code.split_once('-') else {
            return false;
        };
        let Ok(issued_at) = u64::from_str_radix(ts, 36) else {
            return false;
        };
        if issued_at > now || now - issued_at > self.ttl_secs {
            return false;
        }
        let Ok(tag) = URL_SAFE_NO_PAD.decode(tag) else {
            return false;
        };
        self.mac(fingerprint, issued_at).verify_slice(&tag).is_ok()
    }

    fn mac(&self, fp: &UserFingerprint<'_>, issued_at: u64) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        let last_login = fp.last_login.map(|t| t.to_string()).unwrap_or_default();
        let superuser: &[u8] = if fp.is_superuser { b"1" } else { b"0" };
        for part in [
            fp.user_id.to_string().as_bytes(),
            fp.username.as_bytes(),
            fp.email.as_bytes(),
            fp.role.to_string().as_bytes(),
            superuser,
            last_login.as_bytes(),
            issued_at.to_string().as_bytes(),
        ] {
            mac.update(part);
            mac.update(SEP);
        }
        mac
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
