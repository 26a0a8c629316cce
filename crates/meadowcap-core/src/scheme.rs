//! Injected signature schemes.
//!
//! Meadowcap never hardcodes a signature scheme. Namespace keys and subspace
//! keys are each described by a [`KeypairScheme`]: how to sign, how to
//! verify, and how keys and signatures are laid out on the wire. Signing and
//! verification are async so a scheme may call out to an external provider.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::crypto::{Ed25519PublicKey, Ed25519Signature, Keypair};
use crate::encoding::Reader;
use crate::error::DecodeResult;

/// Sign/verify and encode/decode for one kind of key.
#[async_trait]
pub trait KeypairScheme: Send + Sync {
    /// The public key type, used as an identifier on the wire.
    type PublicKey: Clone + Debug + Eq + Send + Sync;
    /// The secret key type, never encoded.
    type SecretKey: Send + Sync;
    /// The signature type.
    type Signature: Clone + Debug + Eq + Send + Sync;

    /// Sign `message` with `secret`.
    async fn sign(&self, secret: &Self::SecretKey, message: &[u8]) -> Self::Signature;

    /// Check that `signature` over `message` was made by the owner of `public`.
    ///
    /// A `false` result is definitive: there is no transient failure mode.
    async fn verify(
        &self,
        public: &Self::PublicKey,
        signature: &Self::Signature,
        message: &[u8],
    ) -> bool;

    /// Append the wire form of a public key.
    fn encode_public_key(&self, key: &Self::PublicKey, out: &mut Vec<u8>);

    /// Read a public key written by [`Self::encode_public_key`].
    fn decode_public_key(&self, reader: &mut Reader<'_>) -> DecodeResult<Self::PublicKey>;

    /// Append the wire form of a signature.
    fn encode_signature(&self, signature: &Self::Signature, out: &mut Vec<u8>);

    /// Read a signature written by [`Self::encode_signature`].
    fn decode_signature(&self, reader: &mut Reader<'_>) -> DecodeResult<Self::Signature>;
}

/// Ed25519 with raw 32-byte keys and 64-byte signatures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ed25519Scheme;

#[async_trait]
impl KeypairScheme for Ed25519Scheme {
    type PublicKey = Ed25519PublicKey;
    type SecretKey = Keypair;
    type Signature = Ed25519Signature;

    async fn sign(&self, secret: &Keypair, message: &[u8]) -> Ed25519Signature {
        secret.sign(message)
    }

    async fn verify(
        &self,
        public: &Ed25519PublicKey,
        signature: &Ed25519Signature,
        message: &[u8],
    ) -> bool {
        public.verify(message, signature).is_ok()
    }

    fn encode_public_key(&self, key: &Ed25519PublicKey, out: &mut Vec<u8>) {
        out.extend_from_slice(key.as_bytes());
    }

    fn decode_public_key(&self, reader: &mut Reader<'_>) -> DecodeResult<Ed25519PublicKey> {
        Ok(Ed25519PublicKey(reader.read_array::<32>()?))
    }

    fn encode_signature(&self, signature: &Ed25519Signature, out: &mut Vec<u8>) {
        out.extend_from_slice(signature.as_bytes());
    }

    fn decode_signature(&self, reader: &mut Reader<'_>) -> DecodeResult<Ed25519Signature> {
        Ok(Ed25519Signature(reader.read_array::<64>()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ed25519_scheme_sign_verify() {
        let scheme = Ed25519Scheme;
        let keypair = Keypair::from_seed(&[0x07; 32]);
        let other = Keypair::from_seed(&[0x08; 32]);

        let signature = scheme.sign(&keypair, b"entry").await;
        assert!(scheme.verify(&keypair.public_key(), &signature, b"entry").await);
        assert!(!scheme.verify(&other.public_key(), &signature, b"entry").await);
        assert!(!scheme.verify(&keypair.public_key(), &signature, b"entrY").await);
    }

    #[tokio::test]
    async fn test_ed25519_scheme_wire_format() {
        let scheme = Ed25519Scheme;
        let keypair = Keypair::from_seed(&[0x09; 32]);
        let signature = scheme.sign(&keypair, b"x").await;

        let mut out = Vec::new();
        scheme.encode_public_key(&keypair.public_key(), &mut out);
        scheme.encode_signature(&signature, &mut out);
        assert_eq!(out.len(), 96);

        let mut reader = Reader::new(&out);
        assert_eq!(
            scheme.decode_public_key(&mut reader).unwrap(),
            keypair.public_key()
        );
        assert_eq!(scheme.decode_signature(&mut reader).unwrap(), signature);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_ed25519_scheme_truncated_key() {
        let scheme = Ed25519Scheme;
        let bytes = [0u8; 31];
        let mut reader = Reader::new(&bytes);
        assert!(scheme.decode_public_key(&mut reader).is_err());
    }
}
