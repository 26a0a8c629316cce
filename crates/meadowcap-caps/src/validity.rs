//! The validity predicate.
//!
//! Validity is a pure function of a capability tree. It fails closed: the
//! first broken constraint rejects the whole capability. Signature checks
//! and the recursion into parents are awaited one after another.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use crate::capability::Capability;
use crate::error::InvalidCapability;
use crate::params::{CapabilityOf, MeadowcapParams, ProductOf};
use crate::semantics::{access_mode, delegation_limit, granted_product, namespace, receiver};
use crate::signing::{delegation_message, signature_matches_receiver, verify_as_receiver};

/// Boxed future returned by the recursive predicate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Check a capability, reporting why it is invalid.
pub fn validate_capability<'a, P: MeadowcapParams>(
    params: &'a P,
    cap: &'a CapabilityOf<P>,
) -> BoxFuture<'a, Result<(), InvalidCapability>> {
    Box::pin(async move {
        let result = check_node(params, cap).await;
        if let Err(reason) = &result {
            debug!(kind = cap.kind(), %reason, "capability rejected");
        }
        result
    })
}

/// Whether a capability is valid.
pub async fn is_capability_valid<P: MeadowcapParams>(params: &P, cap: &CapabilityOf<P>) -> bool {
    validate_capability(params, cap).await.is_ok()
}

async fn check_node<P: MeadowcapParams>(params: &P, cap: &CapabilityOf<P>) -> Result<(), InvalidCapability> {
    match cap {
        Capability::Source {
            namespace_id,
            subspace_id,
            ..
        } => {
            if params.is_communal(namespace_id) || *subspace_id == params.minimal_subspace_key() {
                Ok(())
            } else {
                Err(InvalidCapability::NotOwnedSubspace)
            }
        }

        Capability::Delegation {
            parent,
            delegee,
            authorisation,
            delegation_limit: limit,
        } => {
            let parent_limit = delegation_limit(parent.as_ref());
            if *limit >= parent_limit {
                return Err(InvalidCapability::LimitNotNarrowing {
                    limit: *limit,
                    parent: parent_limit,
                });
            }
            let parent_receiver = receiver(params, parent);
            if !parent_receiver.same_kind(delegee) {
                return Err(InvalidCapability::DelegeeKindMismatch);
            }
            if !signature_matches_receiver::<P>(&parent_receiver, authorisation) {
                return Err(InvalidCapability::SignatureKindMismatch);
            }
            // Only a valid parent is encoded into the signed message.
            validate_capability(params, parent).await?;
            let message = delegation_message(params, parent, *limit, delegee).await;
            if !verify_as_receiver(params, &parent_receiver, authorisation, &message).await {
                return Err(InvalidCapability::BadSignature);
            }
            Ok(())
        }

        Capability::Restriction { parent, product } => {
            // Range counts are `usize` and always fit the 64-bit wire counts.
            if !product.fits(params.dimensions()) {
                return Err(InvalidCapability::ProductOutOfBounds);
            }
            validate_capability(params, parent).await
        }

        Capability::Merge { components } => {
            let first = components.first();
            let mode = access_mode(first);
            let first_receiver = receiver(params, first);
            for component in components.iter().skip(1) {
                if access_mode(component) != mode {
                    return Err(InvalidCapability::MergeMismatch("access mode"));
                }
                if namespace(component) != namespace(first) {
                    return Err(InvalidCapability::MergeMismatch("namespace"));
                }
                if receiver(params, component) != first_receiver {
                    return Err(InvalidCapability::MergeMismatch("receiver"));
                }
            }

            let products: Vec<_> = components.iter().map(|c| granted_product(params, c)).collect();
            match ProductOf::<P>::merge(&products, params.dimensions()) {
                None => return Err(InvalidCapability::UnmergeableProducts),
                Some(merged) if merged.is_empty() => return Err(InvalidCapability::EmptyGrant),
                Some(_) => {}
            }

            for component in components {
                validate_capability(params, component).await?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{AccessMode, NonEmpty, Receiver, ReceiverSecret, ReceiverSignature};
    use crate::params::{Ed25519Params, ReceiverOf};
    use crate::signing::sign_as_receiver;
    use meadowcap_core::{Ed25519PublicKey, Ed25519Signature, Keypair, Path};
    use meadowcap_product::{Range, Sparse3dInterval};
    use proptest::prelude::*;
    use std::sync::Arc;

    type Cap = CapabilityOf<Ed25519Params>;

    /// A keypair whose public key has the given last bit.
    fn keypair_with_last_bit(bit: u8) -> Keypair {
        (0u8..=255)
            .map(|seed| Keypair::from_seed(&[seed; 32]))
            .find(|kp| kp.public_key().as_bytes()[31] & 1 == bit)
            .unwrap()
    }

    fn communal_source(user: Ed25519PublicKey) -> Cap {
        Capability::Source {
            access_mode: AccessMode::Write,
            namespace_id: keypair_with_last_bit(0).public_key(),
            subspace_id: user,
        }
    }

    async fn delegate(
        params: &Ed25519Params,
        parent: Cap,
        secret: &Keypair,
        delegee: Ed25519PublicKey,
        limit: u8,
    ) -> Cap {
        let delegee = Receiver::Subspace(delegee);
        let message = delegation_message(params, &parent, limit, &delegee).await;
        let authorisation = sign_as_receiver(params, ReceiverSecret::Subspace(secret), &message).await;
        Capability::Delegation {
            parent: Arc::new(parent),
            delegee,
            authorisation,
            delegation_limit: limit,
        }
    }

    fn path_restriction(parent: Cap, path: &str) -> Cap {
        let params = Ed25519Params::new();
        let product = ProductOf::<Ed25519Params>::full(params.dimensions())
            .intersect(
                &ProductOf::<Ed25519Params>::empty()
                    .with_box(
                        Sparse3dInterval::new(
                            Range::open(0),
                            Range::closed_inclusive(Path::from(path), Path::from(path)),
                            Range::open(Ed25519PublicKey::MIN),
                        ),
                        params.dimensions(),
                    )
                    .unwrap(),
                params.dimensions(),
            );
        Capability::Restriction {
            parent: Arc::new(parent),
            product,
        }
    }

    #[tokio::test]
    async fn test_sources() {
        let params = Ed25519Params::new();
        let anyone = Ed25519PublicKey([0x77; 32]);
        assert!(is_capability_valid(&params, &communal_source(anyone)).await);

        let owned_ns = keypair_with_last_bit(1).public_key();
        let good: Cap = Capability::Source {
            access_mode: AccessMode::Read,
            namespace_id: owned_ns,
            subspace_id: Ed25519PublicKey::MIN,
        };
        assert!(is_capability_valid(&params, &good).await);

        let bad: Cap = Capability::Source {
            access_mode: AccessMode::Read,
            namespace_id: owned_ns,
            subspace_id: anyone,
        };
        assert_eq!(
            validate_capability(&params, &bad).await,
            Err(InvalidCapability::NotOwnedSubspace)
        );
    }

    #[tokio::test]
    async fn test_delegation_chain() {
        let params = Ed25519Params::new();
        let alice = Keypair::from_seed(&[0xa1; 32]);
        let bob = Keypair::from_seed(&[0xb0; 32]);
        let carol = Keypair::from_seed(&[0xc0; 32]);

        let root = communal_source(alice.public_key());
        let to_bob = delegate(&params, root, &alice, bob.public_key(), 3).await;
        assert!(is_capability_valid(&params, &to_bob).await);
        assert_eq!(receiver(&params, &to_bob), Receiver::Subspace(bob.public_key()));

        let to_carol = delegate(&params, to_bob.clone(), &bob, carol.public_key(), 2).await;
        assert!(is_capability_valid(&params, &to_carol).await);

        // Limit must shrink.
        let flat = delegate(&params, to_bob.clone(), &bob, carol.public_key(), 3).await;
        assert_eq!(
            validate_capability(&params, &flat).await,
            Err(InvalidCapability::LimitNotNarrowing { limit: 3, parent: 3 })
        );

        // Signed by someone other than the parent's receiver.
        let forged = delegate(&params, to_bob, &alice, carol.public_key(), 1).await;
        assert_eq!(
            validate_capability(&params, &forged).await,
            Err(InvalidCapability::BadSignature)
        );
    }

    #[tokio::test]
    async fn test_delegation_bound_to_parent() {
        let params = Ed25519Params::new();
        let alice = Keypair::from_seed(&[0xa1; 32]);
        let bob = Keypair::from_seed(&[0xb0; 32]);

        let root = communal_source(alice.public_key());
        let delegated = delegate(&params, root.clone(), &alice, bob.public_key(), 3).await;

        // Same signature, but over a restricted parent.
        let Capability::Delegation { authorisation, .. } = &delegated else {
            panic!("expected delegation");
        };
        let rebased: Cap = Capability::Delegation {
            parent: Arc::new(path_restriction(root, "x")),
            delegee: Receiver::Subspace(bob.public_key()),
            authorisation: authorisation.clone(),
            delegation_limit: 3,
        };
        assert_eq!(
            validate_capability(&params, &rebased).await,
            Err(InvalidCapability::BadSignature)
        );
    }

    #[tokio::test]
    async fn test_delegation_kind_mismatch() {
        let params = Ed25519Params::new();
        let alice = Keypair::from_seed(&[0xa1; 32]);
        let root = communal_source(alice.public_key());

        let to_namespace: Cap = Capability::Delegation {
            parent: Arc::new(root.clone()),
            delegee: Receiver::Namespace(Ed25519PublicKey([1; 32])),
            authorisation: ReceiverSignature::Subspace(Ed25519Signature([0; 64])),
            delegation_limit: 1,
        };
        assert_eq!(
            validate_capability(&params, &to_namespace).await,
            Err(InvalidCapability::DelegeeKindMismatch)
        );

        let wrong_signature: Cap = Capability::Delegation {
            parent: Arc::new(root),
            delegee: Receiver::Subspace(Ed25519PublicKey([1; 32])),
            authorisation: ReceiverSignature::Namespace(Ed25519Signature([0; 64])),
            delegation_limit: 1,
        };
        assert_eq!(
            validate_capability(&params, &wrong_signature).await,
            Err(InvalidCapability::SignatureKindMismatch)
        );
    }

    #[tokio::test]
    async fn test_empty_restriction_is_valid() {
        let params = Ed25519Params::new();
        let cap: Cap = Capability::Restriction {
            parent: Arc::new(communal_source(Ed25519PublicKey([5; 32]))),
            product: ProductOf::<Ed25519Params>::empty(),
        };
        assert!(is_capability_valid(&params, &cap).await);
        assert!(granted_product(&params, &cap).is_empty());
    }

    #[tokio::test]
    async fn test_restriction_beyond_max_path_length() {
        let wide = Ed25519Params::new();
        let narrow = Ed25519Params::new().with_max_path_length(4);
        let source = communal_source(Ed25519PublicKey([5; 32]));

        let at_limit = path_restriction(source.clone(), "abcd");
        assert!(is_capability_valid(&narrow, &at_limit).await);

        let past_limit = path_restriction(source, "abcde");
        assert!(is_capability_valid(&wide, &past_limit).await);
        assert_eq!(
            validate_capability(&narrow, &past_limit).await,
            Err(InvalidCapability::ProductOutOfBounds)
        );
    }

    #[tokio::test]
    async fn test_delegation_over_out_of_bounds_parent() {
        let narrow = Ed25519Params::new().with_max_path_length(4);
        let alice = Keypair::from_seed(&[0xa1; 32]);
        let bob = Keypair::from_seed(&[0xb0; 32]);

        // Signed where the long path is legal, checked where it is not.
        let parent = path_restriction(communal_source(alice.public_key()), "abcdefgh");
        let delegated = delegate(&Ed25519Params::new(), parent, &alice, bob.public_key(), 3).await;
        assert!(is_capability_valid(&Ed25519Params::new(), &delegated).await);
        assert_eq!(
            validate_capability(&narrow, &delegated).await,
            Err(InvalidCapability::ProductOutOfBounds)
        );
    }

    #[tokio::test]
    async fn test_restriction_of_invalid_parent() {
        let params = Ed25519Params::new();
        let bad_source: Cap = Capability::Source {
            access_mode: AccessMode::Write,
            namespace_id: keypair_with_last_bit(1).public_key(),
            subspace_id: Ed25519PublicKey([5; 32]),
        };
        let cap = path_restriction(bad_source, "a");
        assert_eq!(
            validate_capability(&params, &cap).await,
            Err(InvalidCapability::NotOwnedSubspace)
        );
    }

    #[tokio::test]
    async fn test_merges() {
        let params = Ed25519Params::new();
        let user = Ed25519PublicKey([0x42; 32]);
        let root = communal_source(user);

        let merged: Cap = Capability::Merge {
            components: NonEmpty::new(vec![
                path_restriction(root.clone(), "a"),
                path_restriction(root.clone(), "b"),
            ])
            .unwrap(),
        };
        assert!(is_capability_valid(&params, &merged).await);

        let other_user: Cap = Capability::Merge {
            components: NonEmpty::new(vec![
                path_restriction(root.clone(), "a"),
                path_restriction(communal_source(Ed25519PublicKey([0x43; 32])), "a"),
            ])
            .unwrap(),
        };
        assert_eq!(
            validate_capability(&params, &other_user).await,
            Err(InvalidCapability::MergeMismatch("receiver"))
        );

        let read = Capability::Source {
            access_mode: AccessMode::Read,
            namespace_id: namespace(&root).clone(),
            subspace_id: user,
        };
        let mixed_modes: Cap = Capability::Merge {
            components: NonEmpty::new(vec![root.clone(), read]).unwrap(),
        };
        assert_eq!(
            validate_capability(&params, &mixed_modes).await,
            Err(InvalidCapability::MergeMismatch("access mode"))
        );

        let empty_grant: Cap = Capability::Merge {
            components: NonEmpty::new(vec![Capability::Restriction {
                parent: Arc::new(root),
                product: ProductOf::<Ed25519Params>::empty(),
            }])
            .unwrap(),
        };
        assert_eq!(
            validate_capability(&params, &empty_grant).await,
            Err(InvalidCapability::EmptyGrant)
        );
    }

    #[tokio::test]
    async fn test_unmergeable_products() {
        let params = Ed25519Params::new();
        let root = communal_source(Ed25519PublicKey([0x42; 32]));
        let a = path_restriction(root.clone(), "a");
        // Differs from `a` in both time and path.
        let b: Cap = Capability::Restriction {
            parent: Arc::new(root),
            product: ProductOf::<Ed25519Params>::empty()
                .with_box(
                    Sparse3dInterval::new(
                        Range::closed_exclusive(0, 10),
                        Range::closed_inclusive(Path::from("b"), Path::from("b")),
                        Range::open(Ed25519PublicKey::MIN),
                    ),
                    params.dimensions(),
                )
                .unwrap(),
        };
        let merged: Cap = Capability::Merge {
            components: NonEmpty::new(vec![a, b]).unwrap(),
        };
        assert_eq!(
            validate_capability(&params, &merged).await,
            Err(InvalidCapability::UnmergeableProducts)
        );
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread().build().unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_delegation_narrows_limit(limits in prop::collection::vec(any::<u8>(), 1..4)) {
            let params = Ed25519Params::new();
            let keys: Vec<Keypair> = (0..=limits.len()).map(|i| Keypair::from_seed(&[i as u8 + 1; 32])).collect();
            let rt = runtime();
            rt.block_on(async {
                let mut cap = communal_source(keys[0].public_key());
                for (i, limit) in limits.iter().enumerate() {
                    let parent_limit = delegation_limit(&cap);
                    let next = delegate(&params, cap.clone(), &keys[i], keys[i + 1].public_key(), *limit).await;
                    let valid = is_capability_valid(&params, &next).await;
                    prop_assert_eq!(valid, *limit < parent_limit && is_capability_valid(&params, &cap).await);
                    if valid {
                        prop_assert!(delegation_limit(&next) < delegation_limit(&cap));
                    }
                    cap = next;
                }
                Ok::<(), TestCaseError>(())
            })?;
        }

        #[test]
        fn test_restriction_narrows(path in "[ab]{0,3}", ts_end in 1u64..100) {
            let params = Ed25519Params::new();
            let root = communal_source(Ed25519PublicKey([0x42; 32]));
            let parent = path_restriction(root, "ab");
            let restriction = ProductOf::<Ed25519Params>::empty()
                .with_box(
                    Sparse3dInterval::new(
                        Range::closed_exclusive(0, ts_end),
                        Range::open(Path::from(path.as_str())),
                        Range::open(Ed25519PublicKey::MIN),
                    ),
                    params.dimensions(),
                )
                .unwrap();
            let cap: Cap = Capability::Restriction {
                parent: Arc::new(parent.clone()),
                product: restriction,
            };
            let granted = granted_product(&params, &cap);
            prop_assert!(granted.is_subset_of(&granted_product(&params, &parent), params.dimensions()));
            let receiver_unchanged: ReceiverOf<Ed25519Params> = receiver(&params, &cap);
            prop_assert_eq!(receiver_unchanged, receiver(&params, &parent));
        }
    }
}
