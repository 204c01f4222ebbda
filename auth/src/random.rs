use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// Number of random bytes behind every generated token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Generate an unguessable, URL-safe token.
///
/// Draws [`TOKEN_BYTES`] bytes from the operating system RNG and encodes them
/// as unpadded base64url (43 characters).
pub fn url_safe_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
