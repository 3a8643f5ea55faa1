use rand::{rngs::OsRng, RngCore};

/// Random bytes behind every access token.
pub const ACCESS_TOKEN_BYTES: usize = 128;

/// Fresh access token: [`ACCESS_TOKEN_BYTES`] bytes from the OS CSPRNG, hex-encoded.
pub fn generate_access_token() -> String {
    let mut bytes = [0u8; ACCESS_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
