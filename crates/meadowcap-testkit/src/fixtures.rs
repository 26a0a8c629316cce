//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: a namespace keypair of the
//! right kind, a handful of user keypairs and the facade to drive them.

use rand::Rng;

use meadowcap::{AccessMode, CapabilityOf, Ed25519Params, EntryOf, Meadowcap, MeadowcapError, ReceiverSecret, TokenOf};
use meadowcap_core::{Ed25519PublicKey, Entry, Keypair, Path, Timestamp};

type Cap = CapabilityOf<Ed25519Params>;

/// Which kind of namespace a fixture sets up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceKind {
    Communal,
    Owned,
}

impl NamespaceKind {
    /// The last bit a namespace key of this kind has under [`Ed25519Params`].
    pub fn last_bit(self) -> u8 {
        match self {
            NamespaceKind::Communal => 0,
            NamespaceKind::Owned => 1,
        }
    }
}

/// The first deterministic keypair at or after `counter` whose public key
/// ends in `bit`.
pub fn keypair_with_last_bit(bit: u8, counter: u64) -> Keypair {
    (counter..)
        .map(|n| {
            let mut seed = [0u8; 32];
            seed[..8].copy_from_slice(&n.to_be_bytes());
            Keypair::from_seed(&seed)
        })
        .find(|kp| kp.public_key().as_bytes()[31] & 1 == bit)
        .expect("half of all keys end in each bit")
}

/// A namespace with its keypair, some users and the facade.
pub struct TestFixture {
    pub meadowcap: Meadowcap<Ed25519Params>,
    pub kind: NamespaceKind,
    pub namespace: Keypair,
    pub users: Vec<Keypair>,
}

impl TestFixture {
    /// A deterministic communal namespace with `users` users.
    pub fn communal(users: usize) -> Self {
        Self::with_seed(NamespaceKind::Communal, 0, users)
    }

    /// A deterministic owned namespace with `users` users.
    pub fn owned(users: usize) -> Self {
        Self::with_seed(NamespaceKind::Owned, 0, users)
    }

    /// A deterministic fixture; different `seed`s give different keys.
    pub fn with_seed(kind: NamespaceKind, seed: u64, users: usize) -> Self {
        let base = seed << 16;
        Self {
            meadowcap: Meadowcap::new(Ed25519Params::new()),
            kind,
            namespace: keypair_with_last_bit(kind.last_bit(), base),
            users: (0..users)
                .map(|i| Keypair::from_seed(&user_seed(base, i)))
                .collect(),
        }
    }

    /// A fixture with random keys.
    pub fn random(kind: NamespaceKind, users: usize) -> Self {
        let mut rng = rand::thread_rng();
        let namespace = loop {
            let keypair = Keypair::from_seed(&rng.gen());
            if keypair.public_key().as_bytes()[31] & 1 == kind.last_bit() {
                break keypair;
            }
        };
        Self {
            meadowcap: Meadowcap::new(Ed25519Params::new()),
            kind,
            namespace,
            users: (0..users).map(|_| Keypair::generate()).collect(),
        }
    }

    /// The namespace public key.
    pub fn namespace_id(&self) -> Ed25519PublicKey {
        self.namespace.public_key()
    }

    /// Public key of user `i`.
    pub fn user(&self, i: usize) -> Ed25519PublicKey {
        self.users[i].public_key()
    }

    /// The source capability: user `i`'s subspace in a communal namespace,
    /// the whole namespace in an owned one (`i` is ignored).
    pub fn source(&self, mode: AccessMode, i: usize) -> Result<Cap, MeadowcapError> {
        match self.kind {
            NamespaceKind::Communal => self
                .meadowcap
                .create_communal_capability(mode, self.namespace_id(), self.user(i)),
            NamespaceKind::Owned => self.meadowcap.create_owned_capability(mode, self.namespace_id()),
        }
    }

    /// An entry in user `i`'s subspace.
    pub fn entry(&self, i: usize, path: &str, timestamp: Timestamp, payload: &[u8]) -> EntryOf<Ed25519Params> {
        Entry::new(self.namespace_id(), self.user(i), Path::from(path), timestamp, payload)
    }

    /// The secret that signs for source capabilities of this fixture.
    pub fn source_secret(&self, i: usize) -> ReceiverSecret<'_, Keypair, Keypair> {
        match self.kind {
            NamespaceKind::Communal => ReceiverSecret::Subspace(&self.users[i]),
            NamespaceKind::Owned => ReceiverSecret::Namespace(&self.namespace),
        }
    }

    /// Authorise `entry` under user `i`'s source capability.
    pub async fn authorise_source_write(
        &self,
        entry: &EntryOf<Ed25519Params>,
        i: usize,
    ) -> Result<TokenOf<Ed25519Params>, MeadowcapError> {
        let cap = self.source(AccessMode::Write, i)?;
        self.meadowcap
            .create_authorisation_token(entry, cap, self.source_secret(i))
            .await
    }
}

fn user_seed(base: u64, i: usize) -> [u8; 32] {
    let mut seed = [0xa5u8; 32];
    seed[..8].copy_from_slice(&base.to_be_bytes());
    seed[8..16].copy_from_slice(&(i as u64).to_be_bytes());
    seed
}

/// Fixtures for several independent namespaces of one kind.
pub fn multi_namespace_fixtures(kind: NamespaceKind, count: usize, users: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| TestFixture::with_seed(kind, i as u64 + 1, users))
        .collect()
}
