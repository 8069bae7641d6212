use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

const SESSION_ID_BYTES: usize = 16;
const PARTICIPANT_ID_BYTES: usize = 12;

/// Generate a unique session id.
///
/// Drawn from the OS random source and encoded URL-safe so the id can be
/// embedded directly in share links.
pub fn generate_session_id() -> String {
    random_token(SESSION_ID_BYTES)
}

/// Generate a unique participant id.
pub fn generate_participant_id() -> String {
    random_token(PARTICIPANT_ID_BYTES)
}

fn random_token(len: usize) -> String {
    let mut buf = vec![0u8; len];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}
