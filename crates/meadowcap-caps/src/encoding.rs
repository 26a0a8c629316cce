//! Binary encoding of capabilities.
//!
//! Every node starts with one header byte: bit 7 is the access mode (set
//! for write), bits 0..6 the variant tag. The namespace id follows, then the
//! variant payload:
//!
//! ```text
//! source       0x7f  ns  [subspace id, communal only]
//! delegation   0x7d  ns  parent  limit:u8  kinds:u8  delegee  authorisation
//! restriction  0x7e  ns  parent  product
//! merge        n     ns  component*n          (1 <= n <= 120)
//! merge        0x79..0x7c  ns  n:BE(1|2|4|8)  component*n   (n >= 121)
//! ```
//!
//! The `kinds` byte of a delegation says which key kind the delegee (bit 0)
//! and the authorisation (bit 1) are: set for subspace, clear for namespace.
//! Wrapper and merge headers repeat the mode and namespace of their first
//! child; decoding rejects any disagreement.

use std::sync::Arc;

use meadowcap_core::{width_for, write_uint, DecodeError, DecodeResult, KeypairScheme, Reader};
use meadowcap_product::{decode_product_from, encode_product_into};

use crate::capability::{AccessMode, Capability, NonEmpty, Receiver, ReceiverSignature};
use crate::params::{CapabilityOf, MeadowcapParams};
use crate::semantics::{access_mode, namespace};

const WRITE_BIT: u8 = 0x80;
const TAG_MASK: u8 = 0x7f;

const TAG_SOURCE: u8 = 0x7f;
const TAG_RESTRICTION: u8 = 0x7e;
const TAG_DELEGATION: u8 = 0x7d;
const TAG_MERGE_U8: u8 = 0x79;
const TAG_MERGE_U16: u8 = 0x7a;
const TAG_MERGE_U32: u8 = 0x7b;
const TAG_MERGE_U64: u8 = 0x7c;

/// Largest merge component count written directly in the tag.
pub const MAX_INLINE_MERGE: usize = 0x78;

const DELEGEE_SUBSPACE: u8 = 0x01;
const AUTHORISATION_SUBSPACE: u8 = 0x02;

/// Nesting bound when decoding untrusted input.
pub const MAX_DEPTH: usize = 256;

/// Encode a capability.
///
/// Distinct capabilities encode distinctly only when they are valid. An
/// owned source is written without its subspace id, so one carrying any
/// key other than the minimal one encodes like the valid source and
/// decodes as it. Restriction products must fit `params`' dimensions.
pub fn encode_capability<P: MeadowcapParams>(params: &P, cap: &CapabilityOf<P>) -> Vec<u8> {
    let mut out = Vec::new();
    encode_capability_into(params, cap, &mut out);
    out
}

/// Append the encoding of a capability to `out`.
pub fn encode_capability_into<P: MeadowcapParams>(params: &P, cap: &CapabilityOf<P>, out: &mut Vec<u8>) {
    let mode_bit = match access_mode(cap) {
        AccessMode::Read => 0,
        AccessMode::Write => WRITE_BIT,
    };
    let ns_scheme = params.namespace_scheme();
    let ss_scheme = params.subspace_scheme();

    match cap {
        Capability::Source {
            namespace_id,
            subspace_id,
            ..
        } => {
            out.push(mode_bit | TAG_SOURCE);
            ns_scheme.encode_public_key(namespace_id, out);
            if params.is_communal(namespace_id) {
                ss_scheme.encode_public_key(subspace_id, out);
            }
        }
        Capability::Delegation {
            parent,
            delegee,
            authorisation,
            delegation_limit,
        } => {
            out.push(mode_bit | TAG_DELEGATION);
            ns_scheme.encode_public_key(namespace(cap), out);
            encode_capability_into(params, parent, out);
            out.push(*delegation_limit);

            let mut kinds = 0u8;
            if matches!(delegee, Receiver::Subspace(_)) {
                kinds |= DELEGEE_SUBSPACE;
            }
            if matches!(authorisation, ReceiverSignature::Subspace(_)) {
                kinds |= AUTHORISATION_SUBSPACE;
            }
            out.push(kinds);

            match delegee {
                Receiver::Namespace(key) => ns_scheme.encode_public_key(key, out),
                Receiver::Subspace(key) => ss_scheme.encode_public_key(key, out),
            }
            match authorisation {
                ReceiverSignature::Namespace(sig) => ns_scheme.encode_signature(sig, out),
                ReceiverSignature::Subspace(sig) => ss_scheme.encode_signature(sig, out),
            }
        }
        Capability::Restriction { parent, product } => {
            out.push(mode_bit | TAG_RESTRICTION);
            ns_scheme.encode_public_key(namespace(cap), out);
            encode_capability_into(params, parent, out);
            encode_product_into(product, params.dimensions(), |s, out| ss_scheme.encode_public_key(s, out), out);
        }
        Capability::Merge { components } => {
            let count = components.len();
            if count <= MAX_INLINE_MERGE {
                out.push(mode_bit | count as u8);
            } else {
                let width = width_for(count as u64);
                let tag = match width {
                    1 => TAG_MERGE_U8,
                    2 => TAG_MERGE_U16,
                    4 => TAG_MERGE_U32,
                    _ => TAG_MERGE_U64,
                };
                out.push(mode_bit | tag);
                write_uint(out, count as u64, width);
            }
            ns_scheme.encode_public_key(namespace(cap), out);
            for component in components {
                encode_capability_into(params, component, out);
            }
        }
    }
}

/// Decode a capability occupying all of `bytes`.
pub fn decode_capability<P: MeadowcapParams>(params: &P, bytes: &[u8]) -> DecodeResult<CapabilityOf<P>> {
    let mut reader = Reader::new(bytes);
    let cap = decode_capability_from(params, &mut reader)?;
    reader.finish()?;
    Ok(cap)
}

/// Decode a capability from the front of `reader`.
pub fn decode_capability_from<P: MeadowcapParams>(
    params: &P,
    reader: &mut Reader<'_>,
) -> DecodeResult<CapabilityOf<P>> {
    decode_node(params, reader, 0)
}

fn decode_node<P: MeadowcapParams>(params: &P, reader: &mut Reader<'_>, depth: usize) -> DecodeResult<CapabilityOf<P>> {
    if depth > MAX_DEPTH {
        return Err(DecodeError::Inconsistent(format!(
            "capability nested deeper than {MAX_DEPTH}"
        )));
    }

    let header = reader.read_u8()?;
    let mode = if header & WRITE_BIT != 0 {
        AccessMode::Write
    } else {
        AccessMode::Read
    };
    let tag = header & TAG_MASK;
    let ns_scheme = params.namespace_scheme();
    let ss_scheme = params.subspace_scheme();

    let merge_count = match tag {
        0 => return Err(DecodeError::UnknownTag(header)),
        TAG_SOURCE => {
            let namespace_id = ns_scheme.decode_public_key(reader)?;
            let subspace_id = if params.is_communal(&namespace_id) {
                ss_scheme.decode_public_key(reader)?
            } else {
                params.minimal_subspace_key()
            };
            return Ok(Capability::Source {
                access_mode: mode,
                namespace_id,
                subspace_id,
            });
        }
        TAG_DELEGATION | TAG_RESTRICTION => {
            let namespace_id = ns_scheme.decode_public_key(reader)?;
            let parent = decode_node(params, reader, depth + 1)?;
            check_child(&parent, mode, &namespace_id)?;

            if tag == TAG_RESTRICTION {
                let product = decode_product_from(reader, params.dimensions(), |r| ss_scheme.decode_public_key(r))?;
                return Ok(Capability::Restriction {
                    parent: Arc::new(parent),
                    product,
                });
            }

            let delegation_limit = reader.read_u8()?;
            let kinds = reader.read_u8()?;
            if kinds & !(DELEGEE_SUBSPACE | AUTHORISATION_SUBSPACE) != 0 {
                return Err(DecodeError::UnknownFlags(kinds));
            }
            let delegee = if kinds & DELEGEE_SUBSPACE != 0 {
                Receiver::Subspace(ss_scheme.decode_public_key(reader)?)
            } else {
                Receiver::Namespace(ns_scheme.decode_public_key(reader)?)
            };
            let authorisation = if kinds & AUTHORISATION_SUBSPACE != 0 {
                ReceiverSignature::Subspace(ss_scheme.decode_signature(reader)?)
            } else {
                ReceiverSignature::Namespace(ns_scheme.decode_signature(reader)?)
            };
            return Ok(Capability::Delegation {
                parent: Arc::new(parent),
                delegee,
                authorisation,
                delegation_limit,
            });
        }
        TAG_MERGE_U8 | TAG_MERGE_U16 | TAG_MERGE_U32 | TAG_MERGE_U64 => {
            let width = 1usize << (tag - TAG_MERGE_U8);
            let count = reader.read_uint(width)?;
            if count <= MAX_INLINE_MERGE as u64 || width != width_for(count) {
                return Err(DecodeError::NonCanonical(format!(
                    "merge count {count} in {width}-byte form"
                )));
            }
            count
        }
        n if usize::from(n) <= MAX_INLINE_MERGE => u64::from(n),
        _ => return Err(DecodeError::UnknownTag(header)),
    };

    let namespace_id = ns_scheme.decode_public_key(reader)?;
    // Each component takes at least a header byte.
    let remaining = reader.remaining();
    if merge_count > remaining as u64 {
        return Err(DecodeError::UnexpectedEnd {
            needed: usize::try_from(merge_count).unwrap_or(usize::MAX),
            remaining,
        });
    }
    let mut components = Vec::with_capacity(merge_count as usize);
    for _ in 0..merge_count {
        components.push(decode_node(params, reader, depth + 1)?);
    }
    let components = NonEmpty::new(components)
        .ok_or_else(|| DecodeError::Inconsistent("merge without components".to_string()))?;
    check_child(components.first(), mode, &namespace_id)?;
    Ok(Capability::Merge { components })
}

fn check_child<N: PartialEq, NS, S, SS>(
    child: &Capability<N, NS, S, SS>,
    mode: AccessMode,
    namespace_id: &N,
) -> DecodeResult<()> {
    if access_mode(child) != mode {
        return Err(DecodeError::Inconsistent(
            "access mode differs from the enclosed capability".to_string(),
        ));
    }
    if namespace(child) != namespace_id {
        return Err(DecodeError::Inconsistent(
            "namespace differs from the enclosed capability".to_string(),
        ));
    }
    Ok(())
}
