//! Authorisation tokens: a capability plus the receiver's signature over
//! one write.

use meadowcap_caps::{
    decode_capability_from, encode_capability_into, receiver, CapabilityOf, MeadowcapParams, NamespaceId, Receiver,
    ReceiverSignature, ReceiverSignatureOf, SubspaceId,
};
use meadowcap_core::{write_u64, DecodeResult, Entry, KeypairScheme, Reader};

/// Proof that a write was made under a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorisationToken<C, S> {
    /// The capability the write claims.
    pub capability: C,
    /// The receiver's signature over the write message.
    pub signature: S,
}

/// The token type for a parameter bundle.
pub type TokenOf<P> = AuthorisationToken<CapabilityOf<P>, ReceiverSignatureOf<P>>;

/// The entry type for a parameter bundle.
pub type EntryOf<P> = Entry<NamespaceId<P>, SubspaceId<P>>;

/// The bytes a write's authorisation signs.
///
/// ```text
/// namespace id || subspace id || path length || path
///   || timestamp: u64 BE || payload length: u64 BE || payload digest
/// ```
///
/// The path must fit the maximum path length. Callers check it with
/// [`PathOrder::check_path`](meadowcap_core::PathOrder::check_path) first.
pub fn write_message<P: MeadowcapParams>(params: &P, entry: &EntryOf<P>) -> Vec<u8> {
    let mut out = Vec::new();
    params
        .namespace_scheme()
        .encode_public_key(&entry.namespace_id, &mut out);
    params
        .subspace_scheme()
        .encode_public_key(&entry.subspace_id, &mut out);
    params.dimensions().path.encode_path(&entry.path, &mut out);
    write_u64(&mut out, entry.timestamp);
    write_u64(&mut out, entry.payload_length);
    params.encode_payload_digest(&entry.payload_digest, &mut out);
    out
}

/// Encode a token: the capability, then the signature in the scheme of the
/// capability's receiver.
pub fn encode_token<P: MeadowcapParams>(params: &P, token: &TokenOf<P>) -> Vec<u8> {
    let mut out = Vec::new();
    encode_capability_into(params, &token.capability, &mut out);
    match &token.signature {
        ReceiverSignature::Namespace(sig) => params.namespace_scheme().encode_signature(sig, &mut out),
        ReceiverSignature::Subspace(sig) => params.subspace_scheme().encode_signature(sig, &mut out),
    }
    out
}

/// Decode a token occupying all of `bytes`.
pub fn decode_token<P: MeadowcapParams>(params: &P, bytes: &[u8]) -> DecodeResult<TokenOf<P>> {
    let mut reader = Reader::new(bytes);
    let capability = decode_capability_from(params, &mut reader)?;
    let signature = match receiver(params, &capability) {
        Receiver::Namespace(_) => ReceiverSignature::Namespace(params.namespace_scheme().decode_signature(&mut reader)?),
        Receiver::Subspace(_) => ReceiverSignature::Subspace(params.subspace_scheme().decode_signature(&mut reader)?),
    };
    reader.finish()?;
    Ok(AuthorisationToken {
        capability,
        signature,
    })
}
