use crate::error::CryptoError;

/// Fills `buf` from the operating system CSPRNG.
///
/// # Errors
/// Returns [`CryptoError::Randomness`] if the entropy source is unavailable. Callers must
/// abort the operation in progress.
pub(crate) fn fill_random(buf: &mut [u8]) -> Result<(), CryptoError> {
    getrandom::fill(buf).map_err(|e| CryptoError::Randomness {
        message: e.to_string().into(),
        context: Some(format!("requested {} bytes", buf.len()).into()),
    })
}
