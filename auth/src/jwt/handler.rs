use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::Error as JsonWebTokenError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::JwtError;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type. Signs with HS256 and accepts nothing else:
/// a token advertising any other `alg` (including `none`) is rejected before
/// its signature is looked at.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    validation: Validation,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        let algorithm = Algorithm::HS256;

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            validation,
        }
    }

    /// Only accept tokens whose `iss` claim equals `issuer`.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Encode claims into a signed JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and validate a JWT token.
    ///
    /// Checks structure, algorithm, signature and expiry (zero leeway), then
    /// the required claims.
    ///
    /// # Errors
    /// * `Malformed` - Token structure or claims are invalid
    /// * `UnexpectedAlgorithm` - Header names an algorithm other than HS256
    /// * `SignatureMismatch` - Signature was not produced with this secret
    /// * `TokenExpired` - `exp` lies in the past
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, JwtError> {
        self.check_algorithm(token)?;

        decode::<T>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(classify)
    }

    fn check_algorithm(&self, token: &str) -> Result<(), JwtError> {
        let mut segments = token.split('.');
        let header = match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(header), Some(_), Some(_), None) => header,
            _ => {
                return Err(JwtError::Malformed(
                    "expected three dot-separated segments".to_string(),
                ))
            }
        };

        let raw_header = URL_SAFE_NO_PAD
            .decode(header)
            .map_err(|e| JwtError::Malformed(format!("header is not base64url: {}", e)))?;
        let header: serde_json::Value = serde_json::from_slice(&raw_header)
            .map_err(|e| JwtError::Malformed(format!("header is not JSON: {}", e)))?;

        let alg = header
            .get("alg")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| JwtError::Malformed("header has no alg".to_string()))?;

        match alg.parse::<Algorithm>() {
            Ok(algorithm) if algorithm == self.algorithm => Ok(()),
            _ => Err(JwtError::UnexpectedAlgorithm(alg.to_string())),
        }
    }
}

fn classify(error: JsonWebTokenError) -> JwtError {
    match error.kind() {
        ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        ErrorKind::InvalidSignature => JwtError::SignatureMismatch,
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            JwtError::UnexpectedAlgorithm(error.to_string())
        }
        _ => JwtError::Malformed(error.to_string()),
    }
}
