use chrono::{DateTime, SubsecRound, Utc};
use uuid::Uuid;

/// Draws a time-ordered UUIDv7 string that `taken` does not already claim.
///
/// v7 ids sort by creation time and carry a random tail, so two creates in
/// the same millisecond still get distinct ids; the loop only guards against
/// reusing an id that already sits in the store.
pub fn unique_id(taken: impl Fn(&str) -> bool) -> String {
    loop {
        let id = Uuid::now_v7().to_string();
        if !taken(&id) {
            return id;
        }
    }
}

/// Current time at millisecond precision, the resolution timestamps are stored at.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Opaque token handed out on login. Nothing validates it later.
pub fn session_token() -> String {
    format!("paradox_token_{}", Utc::now().timestamp_millis())
}
