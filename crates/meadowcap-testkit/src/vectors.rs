//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the byte layout of products, capabilities and write
//! messages so that every implementation encodes them identically. All use
//! [`Ed25519Params`] with the default maximum path length, so path lengths
//! are two bytes wide.

use std::sync::Arc;

use serde::Serialize;

use meadowcap::{
    write_message, AccessMode, Capability, CapabilityOf, Ed25519Params, EntryOf, Meadowcap, ProductOf, Range,
    Sparse3dInterval,
};
use meadowcap_caps::NonEmpty;
use meadowcap_core::{Ed25519PublicKey, Entry, Path};

/// What a vector encodes.
#[derive(Debug, Clone)]
pub enum VectorInput {
    Product(ProductOf<Ed25519Params>),
    Capability(CapabilityOf<Ed25519Params>),
    WriteMessage(EntryOf<Ed25519Params>),
}

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub description: &'static str,
    pub input: VectorInput,
    /// Expected encoding (hex).
    pub expected_hex: String,
}

/// One vector as written to JSON.
#[derive(Debug, Serialize)]
pub struct VectorRecord {
    pub name: String,
    pub description: String,
    pub hex: String,
}

const COMMUNAL_NS: Ed25519PublicKey = Ed25519PublicKey([0x02; 32]);
const OWNED_NS: Ed25519PublicKey = Ed25519PublicKey([0x03; 32]);
const USER: Ed25519PublicKey = Ed25519PublicKey([0x07; 32]);

/// Blake3 of the empty input.
const EMPTY_DIGEST: &str = "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262";

fn rep(byte: &str, count: usize) -> String {
    byte.repeat(count)
}

fn communal_source() -> CapabilityOf<Ed25519Params> {
    Capability::Source {
        access_mode: AccessMode::Write,
        namespace_id: COMMUNAL_NS,
        subspace_id: USER,
    }
}

fn owned_source(access_mode: AccessMode) -> CapabilityOf<Ed25519Params> {
    Capability::Source {
        access_mode,
        namespace_id: OWNED_NS,
        subspace_id: Ed25519PublicKey::MIN,
    }
}

/// Timestamps `[0, 100)`, every path, every subspace.
fn first_hundred() -> ProductOf<Ed25519Params> {
    let mc = Meadowcap::new(Ed25519Params::new());
    mc.add_to_product(
        &ProductOf::<Ed25519Params>::empty(),
        Sparse3dInterval::new(
            Range::closed_exclusive(0, 100),
            Range::open(Path::empty()),
            Range::open(Ed25519PublicKey::MIN),
        ),
    )
    .expect("valid box")
}

/// Encoding of [`first_hundred`].
fn first_hundred_hex() -> String {
    [
        "37",
        "000000",
        "00",
        "0000000000000000",
        "0000000000000064",
        "00",
        "0000",
        "0000",
        "00",
        &rep("00", 32),
    ]
    .concat()
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    let params = Ed25519Params::new();
    vec![
        GoldenVector {
            name: "empty_product",
            description: "The empty product is a single 0xff byte",
            input: VectorInput::Product(ProductOf::<Ed25519Params>::empty()),
            expected_hex: "ff".to_string(),
        },
        GoldenVector {
            name: "full_product",
            description: "Everything: three open ranges starting at each minimum",
            input: VectorInput::Product(ProductOf::<Ed25519Params>::full(
                meadowcap::MeadowcapParams::dimensions(&params),
            )),
            expected_hex: ["3f", "000000", "00", &rep("00", 8), "00", "00000000", "00", &rep("00", 32)].concat(),
        },
        GoldenVector {
            name: "bounded_timestamps",
            description: "One closed timestamp range, open path and subspace",
            input: VectorInput::Product(first_hundred()),
            expected_hex: first_hundred_hex(),
        },
        GoldenVector {
            name: "communal_source",
            description: "Write source in a communal namespace carries the subspace id",
            input: VectorInput::Capability(communal_source()),
            expected_hex: ["ff", &rep("02", 32), &rep("07", 32)].concat(),
        },
        GoldenVector {
            name: "owned_source",
            description: "Read source in an owned namespace omits the minimal subspace id",
            input: VectorInput::Capability(owned_source(AccessMode::Read)),
            expected_hex: ["7f", &rep("03", 32)].concat(),
        },
        GoldenVector {
            name: "owned_restriction",
            description: "Read source restricted to the first hundred microseconds",
            input: VectorInput::Capability(Capability::Restriction {
                parent: Arc::new(owned_source(AccessMode::Read)),
                product: first_hundred(),
            }),
            expected_hex: ["7e", &rep("03", 32), "7f", &rep("03", 32), &first_hundred_hex()].concat(),
        },
        GoldenVector {
            name: "inline_merge",
            description: "Merge of two components, count in the header",
            input: VectorInput::Capability(Capability::Merge {
                components: NonEmpty::new(vec![communal_source(), communal_source()]).expect("two components"),
            }),
            expected_hex: [
                "82",
                &rep("02", 32),
                "ff",
                &rep("02", 32),
                &rep("07", 32),
                "ff",
                &rep("02", 32),
                &rep("07", 32),
            ]
            .concat(),
        },
        GoldenVector {
            name: "write_message",
            description: "Signed bytes of a write: ids, path, timestamp, length, digest",
            input: VectorInput::WriteMessage(Entry::new(COMMUNAL_NS, USER, Path::from("a"), 5, b"")),
            expected_hex: [
                &rep("02", 32),
                &rep("07", 32),
                "0001",
                "61",
                "0000000000000005",
                "0000000000000000",
                EMPTY_DIGEST,
            ]
            .concat(),
        },
    ]
}

/// Encode a vector's input.
pub fn encode_vector(mc: &Meadowcap<Ed25519Params>, vector: &GoldenVector) -> Vec<u8> {
    match &vector.input {
        VectorInput::Product(product) => mc.encode_product(product),
        VectorInput::Capability(cap) => mc.encode_capability(cap),
        VectorInput::WriteMessage(entry) => write_message(mc.params(), entry),
    }
}

/// Whether the encoding decodes back to the input. Write messages are
/// one-way and always pass.
fn decodes_back(mc: &Meadowcap<Ed25519Params>, vector: &GoldenVector, bytes: &[u8]) -> bool {
    match &vector.input {
        VectorInput::Product(product) => mc.decode_product(bytes).ok().as_ref() == Some(product),
        VectorInput::Capability(cap) => mc.decode_capability(bytes).ok().as_ref() == Some(cap),
        VectorInput::WriteMessage(_) => true,
    }
}

/// Verify all golden vectors: the encoding matches and decodes back.
///
/// Returns `(name, ok, actual hex)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let mc = Meadowcap::new(Ed25519Params::new());
    all_vectors()
        .iter()
        .map(|v| {
            let bytes = encode_vector(&mc, v);
            let hex = hex::encode(&bytes);
            let ok = hex == v.expected_hex && decodes_back(&mc, v, &bytes);
            (v.name.to_string(), ok, hex)
        })
        .collect()
}

/// All vectors as pretty-printed JSON.
pub fn vectors_json() -> serde_json::Result<String> {
    let mc = Meadowcap::new(Ed25519Params::new());
    let records: Vec<_> = all_vectors()
        .iter()
        .map(|v| VectorRecord {
            name: v.name.to_string(),
            description: v.description.to_string(),
            hex: hex::encode(encode_vector(&mc, v)),
        })
        .collect();
    serde_json::to_string_pretty(&records)
}
