//! The Meadowcap facade: one entry point for building, inspecting,
//! encoding and checking capabilities under a fixed parameter bundle.

use std::sync::Arc;

use meadowcap_caps::semantics;
use meadowcap_caps::{
    decode_capability, delegation_message, encode_capability, sign_as_receiver, validate_capability,
    verify_as_receiver, AccessMode, Capability, CapabilityOf, MeadowcapParams, NamespaceId, NonEmpty, ProductOf,
    Receiver, ReceiverOf, ReceiverSecret, ReceiverSecretOf, SubspaceId,
};
use meadowcap_core::KeypairScheme;
use meadowcap_product::{decode_product, encode_product, Sparse3dInterval};
use tracing::{debug, trace, warn};

use crate::error::{MeadowcapError, Result};
use crate::token::{write_message, AuthorisationToken, EntryOf, TokenOf};

/// Configuration for the facade.
#[derive(Debug, Clone)]
pub struct MeadowcapConfig {
    /// Check parents and merge components for validity before building on
    /// them.
    pub validate_parents: bool,
    /// Reject restrictions that reach outside the parent's granted product
    /// instead of intersecting them down.
    pub strict_restrictions: bool,
}

impl Default for MeadowcapConfig {
    fn default() -> Self {
        Self {
            validate_parents: false,
            strict_restrictions: true,
        }
    }
}

/// The main Meadowcap struct.
///
/// Provides a unified API for:
/// - Creating source, delegated, restricted and merged capabilities
/// - Computing what a capability grants
/// - Checking validity
/// - Encoding capabilities and products
/// - Authorising writes
pub struct Meadowcap<P: MeadowcapParams> {
    params: P,
    config: MeadowcapConfig,
}

impl<P: MeadowcapParams> Meadowcap<P> {
    /// Create a facade with the default configuration.
    pub fn new(params: P) -> Self {
        Self::with_config(params, MeadowcapConfig::default())
    }

    /// Create a facade with an explicit configuration.
    pub fn with_config(params: P, config: MeadowcapConfig) -> Self {
        Self { params, config }
    }

    /// The parameter bundle.
    pub fn params(&self) -> &P {
        &self.params
    }

    /// The configuration.
    pub fn config(&self) -> &MeadowcapConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    /// A source capability for `subspace` in a communal namespace.
    pub fn create_communal_capability(
        &self,
        access_mode: AccessMode,
        namespace_id: NamespaceId<P>,
        subspace_id: SubspaceId<P>,
    ) -> Result<CapabilityOf<P>> {
        if !self.params.is_communal(&namespace_id) {
            return Err(MeadowcapError::NamespaceNotCommunal);
        }
        Ok(Capability::Source {
            access_mode,
            namespace_id,
            subspace_id,
        })
    }

    /// A source capability for the whole of an owned namespace.
    pub fn create_owned_capability(
        &self,
        access_mode: AccessMode,
        namespace_id: NamespaceId<P>,
    ) -> Result<CapabilityOf<P>> {
        if self.params.is_communal(&namespace_id) {
            return Err(MeadowcapError::NamespaceNotOwned);
        }
        Ok(Capability::Source {
            access_mode,
            namespace_id,
            subspace_id: self.params.minimal_subspace_key(),
        })
    }

    /// Hand `parent`'s rights to `delegee`, signing with the secret of
    /// `parent`'s receiver.
    ///
    /// The secret is only checked for kind; a secret that does not belong to
    /// the receiver produces a capability that fails validation.
    pub async fn delegate_capability(
        &self,
        parent: impl Into<Arc<CapabilityOf<P>>>,
        delegee: ReceiverOf<P>,
        delegation_limit: u8,
        secret: ReceiverSecretOf<'_, P>,
    ) -> Result<CapabilityOf<P>> {
        let parent = parent.into();
        self.check_parent(&parent).await?;

        let parent_receiver = semantics::receiver(&self.params, &parent);
        if !parent_receiver.same_kind(&delegee) {
            return Err(MeadowcapError::DelegeeKindMismatch);
        }
        if !secret_matches::<P>(&parent_receiver, &secret) {
            return Err(MeadowcapError::SecretKindMismatch);
        }
        let parent_limit = semantics::delegation_limit(parent.as_ref());
        if delegation_limit >= parent_limit {
            return Err(MeadowcapError::LimitNotNarrowing {
                limit: delegation_limit,
                parent: parent_limit,
            });
        }

        let message = delegation_message(&self.params, &parent, delegation_limit, &delegee).await;
        let authorisation = sign_as_receiver(&self.params, secret, &message).await;
        Ok(Capability::Delegation {
            parent,
            delegee,
            authorisation,
            delegation_limit,
        })
    }

    /// Narrow `parent` to `product`.
    pub async fn restrict_capability(
        &self,
        parent: impl Into<Arc<CapabilityOf<P>>>,
        product: ProductOf<P>,
    ) -> Result<CapabilityOf<P>> {
        let parent = parent.into();
        self.check_parent(&parent).await?;

        let dims = self.params.dimensions();
        let granted = semantics::granted_product(&self.params, &parent);
        let mut product = product.canonical(dims)?;
        if !product.is_subset_of(&granted, dims) {
            if self.config.strict_restrictions {
                return Err(MeadowcapError::RestrictionOutsideGrant);
            }
            product = product.intersect(&granted, dims);
        }
        if product.is_empty() {
            warn!(parent = parent.kind(), "restriction grants nothing");
        }
        Ok(Capability::Restriction { parent, product })
    }

    /// Union compatible capabilities.
    ///
    /// Components must agree on access mode, namespace and receiver, and
    /// their granted products must merge into a non-empty product.
    pub async fn merge_capabilities(&self, capabilities: Vec<CapabilityOf<P>>) -> Result<CapabilityOf<P>> {
        let components = NonEmpty::new(capabilities).ok_or(MeadowcapError::EmptyMerge)?;

        let first = components.first();
        let mode = semantics::access_mode(first);
        let first_receiver = semantics::receiver(&self.params, first);
        for component in components.iter().skip(1) {
            if semantics::access_mode(component) != mode {
                return Err(MeadowcapError::MergeMismatch("access mode"));
            }
            if semantics::namespace(component) != semantics::namespace(first) {
                return Err(MeadowcapError::MergeMismatch("namespace"));
            }
            if semantics::receiver(&self.params, component) != first_receiver {
                return Err(MeadowcapError::MergeMismatch("receiver"));
            }
        }

        let products: Vec<_> = components
            .iter()
            .map(|c| semantics::granted_product(&self.params, c))
            .collect();
        match ProductOf::<P>::merge(&products, self.params.dimensions()) {
            None => return Err(MeadowcapError::UnmergeableProducts),
            Some(merged) if merged.is_empty() => return Err(MeadowcapError::EmptyGrant),
            Some(_) => {}
        }

        for component in &components {
            self.check_parent(component).await?;
        }
        Ok(Capability::Merge { components })
    }

    async fn check_parent(&self, parent: &CapabilityOf<P>) -> Result<()> {
        if !self.config.validate_parents {
            return Ok(());
        }
        validate_capability(&self.params, parent)
            .await
            .map_err(MeadowcapError::InvalidParent)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Semantics
    // ─────────────────────────────────────────────────────────────────────────

    /// The key that holds the capability's rights.
    pub fn receiver(&self, cap: &CapabilityOf<P>) -> ReceiverOf<P> {
        semantics::receiver(&self.params, cap)
    }

    /// Read or write.
    pub fn access_mode(&self, cap: &CapabilityOf<P>) -> AccessMode {
        semantics::access_mode(cap)
    }

    /// The namespace the capability applies to.
    pub fn namespace<'c>(&self, cap: &'c CapabilityOf<P>) -> &'c NamespaceId<P> {
        semantics::namespace(cap)
    }

    /// The region the capability grants access to.
    pub fn granted_product(&self, cap: &CapabilityOf<P>) -> ProductOf<P> {
        semantics::granted_product(&self.params, cap)
    }

    /// How many more times the capability may be delegated.
    pub fn delegation_limit(&self, cap: &CapabilityOf<P>) -> u8 {
        semantics::delegation_limit(cap)
    }

    /// Whether the capability's namespace is communal.
    pub fn is_communal(&self, cap: &CapabilityOf<P>) -> bool {
        semantics::is_communal(&self.params, cap)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validity
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether a capability is valid.
    pub async fn is_capability_valid(&self, cap: &CapabilityOf<P>) -> bool {
        validate_capability(&self.params, cap).await.is_ok()
    }

    /// Check a capability, returning the reason it is invalid.
    pub async fn validate_capability(&self, cap: &CapabilityOf<P>) -> Result<()> {
        Ok(validate_capability(&self.params, cap).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Encoding
    // ─────────────────────────────────────────────────────────────────────────

    /// Encode a capability. See [`meadowcap_caps::encode_capability`].
    pub fn encode_capability(&self, cap: &CapabilityOf<P>) -> Vec<u8> {
        encode_capability(&self.params, cap)
    }

    /// Decode a capability, rejecting trailing bytes.
    pub fn decode_capability(&self, bytes: &[u8]) -> Result<CapabilityOf<P>> {
        Ok(decode_capability(&self.params, bytes)?)
    }

    /// Encode a product. It must fit these parameters' dimensions.
    pub fn encode_product(&self, product: &ProductOf<P>) -> Vec<u8> {
        let scheme = self.params.subspace_scheme();
        encode_product(product, self.params.dimensions(), |key, out| {
            scheme.encode_public_key(key, out)
        })
    }

    /// Decode a product, rejecting trailing bytes.
    pub fn decode_product(&self, bytes: &[u8]) -> Result<ProductOf<P>> {
        let scheme = self.params.subspace_scheme();
        Ok(decode_product(bytes, self.params.dimensions(), |reader| {
            scheme.decode_public_key(reader)
        })?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────────

    /// `product` with one more box added.
    pub fn add_to_product(
        &self,
        product: &ProductOf<P>,
        sparse: Sparse3dInterval<SubspaceId<P>>,
    ) -> Result<ProductOf<P>> {
        Ok(product.with_box(sparse, self.params.dimensions())?)
    }

    /// The region covered by both products.
    pub fn intersect_products(&self, a: &ProductOf<P>, b: &ProductOf<P>) -> ProductOf<P> {
        a.intersect(b, self.params.dimensions())
    }

    /// Union of products differing in at most one dimension.
    pub fn merge_products(&self, products: &[ProductOf<P>]) -> Option<ProductOf<P>> {
        ProductOf::<P>::merge(products, self.params.dimensions())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write Authorisation
    // ─────────────────────────────────────────────────────────────────────────

    /// Sign `entry` under `capability` with the receiver's secret.
    pub async fn create_authorisation_token(
        &self,
        entry: &EntryOf<P>,
        capability: CapabilityOf<P>,
        secret: ReceiverSecretOf<'_, P>,
    ) -> Result<TokenOf<P>> {
        let receiver = semantics::receiver(&self.params, &capability);
        if !secret_matches::<P>(&receiver, &secret) {
            return Err(MeadowcapError::SecretKindMismatch);
        }
        let max = self.params.dimensions().path.max_length();
        if entry.path.len() > max {
            return Err(MeadowcapError::PathTooLong {
                length: entry.path.len(),
                max,
            });
        }
        let message = write_message(&self.params, entry);
        let signature = sign_as_receiver(&self.params, secret, &message).await;
        trace!(
            kind = capability.kind(),
            timestamp = entry.timestamp,
            payload_length = entry.payload_length,
            "created authorisation token"
        );
        Ok(AuthorisationToken {
            capability,
            signature,
        })
    }

    /// Whether `token` authorises writing `entry`.
    ///
    /// The entry's path must fit the maximum path length. The capability
    /// must grant write access to the entry's namespace and cover its
    /// subspace, path and timestamp; the signature must verify
    /// with the capability's receiver; and the capability must be valid.
    pub async fn is_authorised_write(&self, entry: &EntryOf<P>, token: &TokenOf<P>) -> bool {
        let cap = &token.capability;
        let dims = self.params.dimensions();

        if dims.path.check_path(&entry.path).is_err() {
            debug!(length = entry.path.len(), "write rejected: path too long");
            return false;
        }
        if semantics::access_mode(cap) != AccessMode::Write {
            debug!("write rejected: read capability");
            return false;
        }
        if *semantics::namespace(cap) != entry.namespace_id {
            debug!("write rejected: namespace mismatch");
            return false;
        }
        let granted = semantics::granted_product(&self.params, cap);
        if !granted.includes(&entry.subspace_id, &entry.path, entry.timestamp, dims) {
            debug!(timestamp = entry.timestamp, "write rejected: entry outside granted product");
            return false;
        }

        let receiver = semantics::receiver(&self.params, cap);
        let message = write_message(&self.params, entry);
        if !verify_as_receiver(&self.params, &receiver, &token.signature, &message).await {
            debug!("write rejected: bad signature");
            return false;
        }

        if let Err(reason) = validate_capability(&self.params, cap).await {
            warn!(%reason, "write rejected: invalid capability");
            return false;
        }
        true
    }
}

fn secret_matches<P: MeadowcapParams>(receiver: &ReceiverOf<P>, secret: &ReceiverSecretOf<'_, P>) -> bool {
    matches!(
        (receiver, secret),
        (Receiver::Namespace(_), ReceiverSecret::Namespace(_)) | (Receiver::Subspace(_), ReceiverSecret::Subspace(_))
    )
}
