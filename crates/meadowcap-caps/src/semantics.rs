//! What a capability grants, computed by structural recursion.
//!
//! Receiver, access mode and namespace are invariant across the components
//! of a valid merge, so merges read them from their first component. None
//! of these functions check validity.

use crate::capability::{AccessMode, Capability, Receiver};
use crate::params::{CapabilityOf, MeadowcapParams, NamespaceId, ProductOf, ReceiverOf};

/// The delegation limit of a source.
pub const MAX_DELEGATION_LIMIT: u8 = u8::MAX;

/// The key holding the capability's rights.
pub fn receiver<P: MeadowcapParams>(params: &P, cap: &CapabilityOf<P>) -> ReceiverOf<P> {
    match cap {
        Capability::Source {
            namespace_id,
            subspace_id,
            ..
        } => {
            if params.is_communal(namespace_id) {
                Receiver::Subspace(subspace_id.clone())
            } else {
                Receiver::Namespace(namespace_id.clone())
            }
        }
        Capability::Delegation { delegee, .. } => delegee.clone(),
        Capability::Restriction { parent, .. } => receiver(params, parent),
        Capability::Merge { components } => receiver(params, components.first()),
    }
}

/// Whether the capability grants reading or writing.
pub fn access_mode<N, NS, S, SS>(cap: &Capability<N, NS, S, SS>) -> AccessMode {
    match cap {
        Capability::Source { access_mode, .. } => *access_mode,
        Capability::Delegation { parent, .. } | Capability::Restriction { parent, .. } => access_mode(parent),
        Capability::Merge { components } => access_mode(components.first()),
    }
}

/// The namespace the capability applies to.
pub fn namespace<N, NS, S, SS>(cap: &Capability<N, NS, S, SS>) -> &N {
    match cap {
        Capability::Source { namespace_id, .. } => namespace_id,
        Capability::Delegation { parent, .. } | Capability::Restriction { parent, .. } => namespace(parent),
        Capability::Merge { components } => namespace(components.first()),
    }
}

/// The region the capability grants access to.
///
/// An owned source grants everything; a communal source grants exactly its
/// own subspace. Merges of unmergeable products grant nothing.
pub fn granted_product<P: MeadowcapParams>(params: &P, cap: &CapabilityOf<P>) -> ProductOf<P> {
    let dims = params.dimensions();
    match cap {
        Capability::Source {
            namespace_id,
            subspace_id,
            ..
        } => {
            if params.is_communal(namespace_id) {
                ProductOf::<P>::single_subspace(subspace_id.clone(), dims)
            } else {
                ProductOf::<P>::full(dims)
            }
        }
        Capability::Delegation { parent, .. } => granted_product(params, parent),
        Capability::Restriction { parent, product } => granted_product(params, parent).intersect(product, dims),
        Capability::Merge { components } => {
            let products: Vec<_> = components.iter().map(|c| granted_product(params, c)).collect();
            ProductOf::<P>::merge(&products, dims).unwrap_or_default()
        }
    }
}

/// How many more times the capability may be delegated.
pub fn delegation_limit<N, NS, S, SS>(cap: &Capability<N, NS, S, SS>) -> u8 {
    match cap {
        Capability::Source { .. } => MAX_DELEGATION_LIMIT,
        Capability::Delegation { delegation_limit, .. } => *delegation_limit,
        Capability::Restriction { parent, .. } => delegation_limit(parent),
        Capability::Merge { components } => components
            .iter()
            .map(delegation_limit)
            .min()
            .unwrap_or(MAX_DELEGATION_LIMIT),
    }
}

/// Whether the capability was rooted in a communal namespace.
pub fn is_communal<P: MeadowcapParams>(params: &P, cap: &CapabilityOf<P>) -> bool {
    params.is_communal(namespace(cap))
}

/// The namespace id, cloned.
pub fn namespace_id<P: MeadowcapParams>(cap: &CapabilityOf<P>) -> NamespaceId<P> {
    namespace(cap).clone()
}
