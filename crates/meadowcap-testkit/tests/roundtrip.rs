//! Encoding properties over generated products and capabilities.

use std::sync::Arc;

use meadowcap::{AccessMode, Capability, Ed25519Params, Meadowcap, ProductOf};
use meadowcap_testkit::generators::{path, product, product_from_params, subspace_id, timestamp, ProductParams, MAX_GENERATED_PATH};
use meadowcap_testkit::fixtures::TestFixture;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_product_roundtrip(p in product()) {
        let mc = Meadowcap::new(Ed25519Params::new());
        let bytes = mc.encode_product(&p);
        prop_assert_eq!(mc.decode_product(&bytes).unwrap(), p);
    }

    #[test]
    fn test_product_roundtrip_at_max_path_length(params: ProductParams) {
        // Generated paths reach the bound exactly.
        let bounded = Ed25519Params::new().with_max_path_length(MAX_GENERATED_PATH);
        let p = product_from_params(&bounded, &params);
        let mc = Meadowcap::new(bounded);
        let bytes = mc.encode_product(&p);
        prop_assert_eq!(mc.decode_product(&bytes).unwrap(), p);
    }

    #[test]
    fn test_product_trailing_bytes_rejected(p in product(), extra in any::<u8>()) {
        let mc = Meadowcap::new(Ed25519Params::new());
        let mut bytes = mc.encode_product(&p);
        bytes.push(extra);
        prop_assert!(mc.decode_product(&bytes).is_err());
    }

    #[test]
    fn test_product_truncation_rejected(p in product(), cut in any::<prop::sample::Index>()) {
        let mc = Meadowcap::new(Ed25519Params::new());
        let bytes = mc.encode_product(&p);
        let len = cut.index(bytes.len());
        prop_assert!(mc.decode_product(&bytes[..len]).is_err());
    }

    #[test]
    fn test_restriction_roundtrip(p in product(), read in any::<bool>()) {
        let fixture = TestFixture::owned(0);
        let mc = &fixture.meadowcap;
        let mode = if read { AccessMode::Read } else { AccessMode::Write };
        let cap = Capability::Restriction {
            parent: Arc::new(fixture.source(mode, 0).unwrap()),
            product: p,
        };
        let bytes = mc.encode_capability(&cap);
        prop_assert_eq!(mc.decode_capability(&bytes).unwrap(), cap);
    }

    #[test]
    fn test_membership_survives_roundtrip(
        p in product(),
        s in subspace_id(),
        sample in path(MAX_GENERATED_PATH),
        t in timestamp(1_000),
    ) {
        let mc = Meadowcap::new(Ed25519Params::new());
        let decoded: ProductOf<Ed25519Params> = mc.decode_product(&mc.encode_product(&p)).unwrap();
        let dims = meadowcap::MeadowcapParams::dimensions(mc.params());
        prop_assert_eq!(p.includes(&s, &sample, t, dims), decoded.includes(&s, &sample, t, dims));
    }
}
