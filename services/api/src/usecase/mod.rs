pub mod actor;
pub mod comment;
pub mod review;
pub mod signup;
pub mod term;
pub mod title;
pub mod token;
pub mod user;

/// Current UNIX time in seconds.
pub(crate) fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}
