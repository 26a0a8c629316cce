//! Messages signed by receivers, and signing with either key kind.

use meadowcap_core::KeypairScheme;

use crate::capability::{Receiver, ReceiverSecret, ReceiverSignature};
use crate::encoding::encode_capability;
use crate::params::{CapabilityOf, MeadowcapParams, ReceiverOf, ReceiverSecretOf, ReceiverSignatureOf};

/// Append the wire form of a receiver key.
pub fn encode_receiver<P: MeadowcapParams>(params: &P, receiver: &ReceiverOf<P>, out: &mut Vec<u8>) {
    match receiver {
        Receiver::Namespace(key) => params.namespace_scheme().encode_public_key(key, out),
        Receiver::Subspace(key) => params.subspace_scheme().encode_public_key(key, out),
    }
}

/// The bytes a delegation's authorisation signs:
/// `hash(encode(parent)) || limit || encode(delegee)`.
///
/// Hashing the full parent encoding ties the delegation to exactly one
/// parent capability.
pub async fn delegation_message<P: MeadowcapParams>(
    params: &P,
    parent: &CapabilityOf<P>,
    delegation_limit: u8,
    delegee: &ReceiverOf<P>,
) -> Vec<u8> {
    let encoded_parent = encode_capability(params, parent);
    let mut message = params.hash_capability(&encoded_parent).await;
    message.push(delegation_limit);
    encode_receiver(params, delegee, &mut message);
    message
}

/// Sign `message` with whichever kind of secret is given.
pub async fn sign_as_receiver<P: MeadowcapParams>(
    params: &P,
    secret: ReceiverSecretOf<'_, P>,
    message: &[u8],
) -> ReceiverSignatureOf<P> {
    match secret {
        ReceiverSecret::Namespace(secret) => {
            ReceiverSignature::Namespace(params.namespace_scheme().sign(secret, message).await)
        }
        ReceiverSecret::Subspace(secret) => {
            ReceiverSignature::Subspace(params.subspace_scheme().sign(secret, message).await)
        }
    }
}

/// Verify a receiver signature. Mismatched key and signature kinds never
/// verify.
pub async fn verify_as_receiver<P: MeadowcapParams>(
    params: &P,
    receiver: &ReceiverOf<P>,
    signature: &ReceiverSignatureOf<P>,
    message: &[u8],
) -> bool {
    match (receiver, signature) {
        (Receiver::Namespace(key), ReceiverSignature::Namespace(sig)) => {
            params.namespace_scheme().verify(key, sig, message).await
        }
        (Receiver::Subspace(key), ReceiverSignature::Subspace(sig)) => {
            params.subspace_scheme().verify(key, sig, message).await
        }
        _ => false,
    }
}

/// Whether a signature is the kind a receiver produces.
pub fn signature_matches_receiver<P: MeadowcapParams>(receiver: &ReceiverOf<P>, signature: &ReceiverSignatureOf<P>) -> bool {
    matches!(
        (receiver, signature),
        (Receiver::Namespace(_), ReceiverSignature::Namespace(_))
            | (Receiver::Subspace(_), ReceiverSignature::Subspace(_))
    )
}
