//! Self-describing ciphertext envelopes.
//!
//! An envelope is `ALGORITHM$BASE64(data)$key=BASE64(value),...`. Base64 is the standard
//! alphabet with padding, metadata keys are emitted sorted and may arrive in any order.
//! The zero value of every ciphertext encodes to the empty string and back.

use std::collections::BTreeMap;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{CryptoError, CryptoErrorExt};

const SEPARATOR: char = '$';
const NONCE_KEY: &str = "nonce";
const KEY_KEY: &str = "key";

/// Algorithm tag carried in front of every envelope.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::IntoStaticStr,
)]
pub enum Algorithm {
    #[strum(serialize = "AES-GCM")]
    AesGcm,
    #[strum(serialize = "RSA-OAEP")]
    RsaOaep,
    #[strum(serialize = "RSA-OAEP+AES-GCM")]
    RsaOaepAesGcm,
}

impl Algorithm {
    /// Reads the algorithm tag of an encoded envelope without decoding the payload.
    ///
    /// # Errors
    /// * [`CryptoError::MalformedCiphertext`] If there is no tag or it is not a known one.
    pub fn of(encoded: &str) -> Result<Self, CryptoError> {
        let tag = encoded.split(SEPARATOR).next().unwrap_or_default();
        Self::from_str(tag).map_err(|_| CryptoError::MalformedCiphertext {
            message: format!("unknown algorithm `{tag}`").into(),
            context: None,
        })
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Data encrypted with AES-GCM.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SymmetricCiphertext {
    pub data: Vec<u8>,
    pub nonce: Vec<u8>,
}

/// Data encrypted with RSA-OAEP.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AsymmetricCiphertext {
    pub data: Vec<u8>,
}

/// Data encrypted with AES-GCM whose key is wrapped with RSA-OAEP.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HybridCiphertext {
    pub symmetric: SymmetricCiphertext,
    pub asymmetric: AsymmetricCiphertext,
}

/// Wire encoding shared by all ciphertext kinds.
///
/// Implementors only describe their payload and metadata; framing, base64 and the algorithm
/// check live in the provided methods.
pub trait Envelope: Sized + Default + PartialEq {
    /// The tag this kind is encoded with and must be decoded from.
    const ALGORITHM: Algorithm;

    /// The main payload.
    fn payload(&self) -> &[u8];

    /// Metadata entries as raw (not yet base64 encoded) values.
    fn metadata(&self) -> Vec<(&'static str, &[u8])>;

    /// Rebuilds the ciphertext from its decoded parts.
    ///
    /// # Errors
    /// * [`CryptoError::MissingMetadata`] If a required key is absent.
    /// * [`CryptoError::InvalidBase64`] If a value is not valid base64.
    fn from_parts(data: Vec<u8>, metadata: &Metadata<'_>) -> Result<Self, CryptoError>;

    /// Whether this is the zero value, which encodes to the empty string.
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Encodes into `ALGORITHM$DATA$META`.
    fn encode(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let metadata: BTreeMap<_, _> = self.metadata().into_iter().collect();
        let metadata = metadata
            .iter()
            .map(|(key, value)| format!("{key}={}", STANDARD.encode(value)))
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "{}{SEPARATOR}{}{SEPARATOR}{metadata}",
            Self::ALGORITHM,
            STANDARD.encode(self.payload())
        )
    }

    /// Decodes an envelope produced by [`Envelope::encode`].
    ///
    /// # Errors
    /// * [`CryptoError::MalformedCiphertext`] If the framing or a metadata pair is invalid.
    /// * [`CryptoError::WrongAlgorithm`] If the tag is not [`Envelope::ALGORITHM`].
    /// * [`CryptoError::InvalidBase64`] If the payload or a metadata value is not base64.
    /// * [`CryptoError::MissingMetadata`] If a required metadata key is absent.
    fn decode(encoded: &str) -> Result<Self, CryptoError> {
        if encoded.is_empty() {
            return Ok(Self::default());
        }

        let segments: Vec<&str> = encoded.split(SEPARATOR).collect();
        let [tag, data, metadata] = segments.as_slice() else {
            return Err(CryptoError::MalformedCiphertext {
                message: format!("expected 3 segments, found {}", segments.len()).into(),
                context: None,
            });
        };

        if *tag != Self::ALGORITHM.as_str() {
            return Err(CryptoError::WrongAlgorithm {
                expected: Self::ALGORITHM.as_str(),
                context: Some(format!("found `{tag}`").into()),
            });
        }

        let data = STANDARD.decode(data).context("data")?;
        let metadata = Metadata::parse(metadata)?;
        Self::from_parts(data, &metadata)
    }
}

/// Parsed `key=value` metadata of an envelope. Values stay base64 encoded until requested.
#[derive(Debug, Default)]
pub struct Metadata<'a> {
    entries: BTreeMap<&'a str, &'a str>,
}

impl<'a> Metadata<'a> {
    /// Parses `k1=v1,k2=v2`. An empty string is an empty set.
    ///
    /// # Errors
    /// * [`CryptoError::MalformedCiphertext`] For a pair without `=`, an empty key or a
    ///   duplicate key.
    pub fn parse(raw: &'a str) -> Result<Self, CryptoError> {
        let mut entries = BTreeMap::new();
        if raw.is_empty() {
            return Ok(Self { entries });
        }

        for pair in raw.split(',') {
            let (key, value) = pair.split_once('=').filter(|(key, _)| !key.is_empty()).ok_or_else(
                || CryptoError::MalformedCiphertext {
                    message: format!("invalid metadata pair `{pair}`").into(),
                    context: None,
                },
            )?;
            if entries.insert(key, value).is_some() {
                return Err(CryptoError::MalformedCiphertext {
                    message: format!("duplicate metadata key `{key}`").into(),
                    context: None,
                });
            }
        }

        Ok(Self { entries })
    }

    /// Returns the decoded value of a required key.
    ///
    /// # Errors
    /// * [`CryptoError::MissingMetadata`] If `key` is absent.
    /// * [`CryptoError::InvalidBase64`] If its value is not base64.
    pub fn require(&self, key: &'static str) -> Result<Vec<u8>, CryptoError> {
        let value =
            self.entries.get(key).ok_or(CryptoError::MissingMetadata { key, context: None })?;
        STANDARD.decode(value).context(key)
    }
}

impl Envelope for SymmetricCiphertext {
    const ALGORITHM: Algorithm = Algorithm::AesGcm;

    fn payload(&self) -> &[u8] {
        &self.data
    }

    fn metadata(&self) -> Vec<(&'static str, &[u8])> {
        vec![(NONCE_KEY, self.nonce.as_slice())]
    }

    fn from_parts(data: Vec<u8>, metadata: &Metadata<'_>) -> Result<Self, CryptoError> {
        Ok(Self { data, nonce: metadata.require(NONCE_KEY)? })
    }
}

impl Envelope for AsymmetricCiphertext {
    const ALGORITHM: Algorithm = Algorithm::RsaOaep;

    fn payload(&self) -> &[u8] {
        &self.data
    }

    fn metadata(&self) -> Vec<(&'static str, &[u8])> {
        Vec::new()
    }

    fn from_parts(data: Vec<u8>, _metadata: &Metadata<'_>) -> Result<Self, CryptoError> {
        Ok(Self { data })
    }
}

impl Envelope for HybridCiphertext {
    const ALGORITHM: Algorithm = Algorithm::RsaOaepAesGcm;

    fn payload(&self) -> &[u8] {
        &self.symmetric.data
    }

    fn metadata(&self) -> Vec<(&'static str, &[u8])> {
        vec![(KEY_KEY, self.asymmetric.data.as_slice()), (NONCE_KEY, self.symmetric.nonce.as_slice())]
    }

    fn from_parts(data: Vec<u8>, metadata: &Metadata<'_>) -> Result<Self, CryptoError> {
        Ok(Self {
            symmetric: SymmetricCiphertext { data, nonce: metadata.require(NONCE_KEY)? },
            asymmetric: AsymmetricCiphertext { data: metadata.require(KEY_KEY)? },
        })
    }
}

macro_rules! impl_envelope_serde {
    ($($ty:ty),+ $(,)?) => {$(
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.encode())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let encoded = String::deserialize(deserializer)?;
                Self::decode(&encoded).map_err(serde::de::Error::custom)
            }
        }
    )+};
}

impl_envelope_serde!(SymmetricCiphertext, AsymmetricCiphertext, HybridCiphertext);

#[cfg(test)]
mod tests {
    use super::*;

    fn symmetric() -> SymmetricCiphertext {
        SymmetricCiphertext { data: b"aes_data".to_vec(), nonce: b"nonce_data".to_vec() }
    }

    fn hybrid() -> HybridCiphertext {
        HybridCiphertext {
            symmetric: symmetric(),
            asymmetric: AsymmetricCiphertext { data: b"rsa_data".to_vec() },
        }
    }

    #[test]
    fn test_encode_symmetric() {
        assert_eq!(symmetric().encode(), "AES-GCM$YWVzX2RhdGE=$nonce=bm9uY2VfZGF0YQ==");
    }

    #[test]
    fn test_encode_hybrid_sorts_metadata() {
        assert_eq!(
            hybrid().encode(),
            "RSA-OAEP+AES-GCM$YWVzX2RhdGE=$key=cnNhX2RhdGE=,nonce=bm9uY2VfZGF0YQ=="
        );
    }

    #[test]
    fn test_encode_asymmetric_has_empty_metadata() {
        let ct = AsymmetricCiphertext { data: b"rsa_data".to_vec() };
        assert_eq!(ct.encode(), "RSA-OAEP$cnNhX2RhdGE=$");
        assert_eq!(AsymmetricCiphertext::decode(&ct.encode()).unwrap(), ct);
    }

    #[test]
    fn test_zero_value_is_empty_string() {
        assert_eq!(HybridCiphertext::default().encode(), "");
        assert_eq!(HybridCiphertext::decode("").unwrap(), HybridCiphertext::default());
        assert_eq!(SymmetricCiphertext::decode("").unwrap(), SymmetricCiphertext::default());
    }

    #[test]
    fn test_metadata_order_is_irrelevant_on_decode() {
        let swapped = "RSA-OAEP+AES-GCM$YWVzX2RhdGE=$nonce=bm9uY2VfZGF0YQ==,key=cnNhX2RhdGE=";
        assert_eq!(HybridCiphertext::decode(swapped).unwrap(), hybrid());
    }

    #[test]
    fn test_wrong_algorithm_is_rejected() {
        let err = SymmetricCiphertext::decode(&hybrid().encode()).unwrap_err();
        assert!(matches!(err, CryptoError::WrongAlgorithm { expected: "AES-GCM", .. }));

        let err = HybridCiphertext::decode("ROT13$YWVzX2RhdGE=$").unwrap_err();
        assert_eq!(err.code(), "wrong_algorithm");
    }

    #[test]
    fn test_malformed_envelopes() {
        for input in ["AES-GCM", "AES-GCM$YWVz", "AES-GCM$YQ==$nonce=YQ==$extra"] {
            assert!(
                matches!(
                    SymmetricCiphertext::decode(input),
                    Err(CryptoError::MalformedCiphertext { .. })
                ),
                "{input}"
            );
        }

        for metadata in ["nonce", "=YQ==", "nonce=YQ==,nonce=YQ=="] {
            let input = format!("AES-GCM$YQ==${metadata}");
            assert!(matches!(
                SymmetricCiphertext::decode(&input),
                Err(CryptoError::MalformedCiphertext { .. })
            ));
        }
    }

    #[test]
    fn test_missing_metadata_and_bad_base64() {
        assert!(matches!(
            HybridCiphertext::decode("RSA-OAEP+AES-GCM$YQ==$nonce=YQ=="),
            Err(CryptoError::MissingMetadata { key: "key", .. })
        ));
        assert!(matches!(
            SymmetricCiphertext::decode("AES-GCM$!!!$nonce=YQ=="),
            Err(CryptoError::InvalidBase64 { .. })
        ));
        assert!(matches!(
            SymmetricCiphertext::decode("AES-GCM$YQ==$nonce=***"),
            Err(CryptoError::InvalidBase64 { .. })
        ));
    }

    #[test]
    fn test_algorithm_detection() {
        assert_eq!(Algorithm::of(&hybrid().encode()).unwrap(), Algorithm::RsaOaepAesGcm);
        assert_eq!(Algorithm::of("RSA-OAEP$$").unwrap(), Algorithm::RsaOaep);
        assert!(Algorithm::of("").is_err());
    }

    #[test]
    fn test_serde_uses_the_encoded_string() {
        let json = serde_json::to_string(&symmetric()).unwrap();
        assert_eq!(json, "\"AES-GCM$YWVzX2RhdGE=$nonce=bm9uY2VfZGF0YQ==\"");

        let back: SymmetricCiphertext = serde_json::from_str(&json).unwrap();
        assert_eq!(back, symmetric());

        let empty: HybridCiphertext = serde_json::from_str("\"\"").unwrap();
        assert!(empty.is_empty());
    }
}
