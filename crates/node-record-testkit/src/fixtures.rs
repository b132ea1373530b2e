//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use rand::Rng;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use node_record::{
    DefaultFieldCodec, FactoryConfig, NodeId, NodeRecord, RecordFactory, SchemeRegistry,
    Secp256k1Keypair,
};

use crate::mock::MockScheme;

/// A test fixture with a secp256k1 keypair and a default factory.
pub struct TestFixture {
    pub keypair: Secp256k1Keypair,
    pub factory: RecordFactory,
    pub address: SocketAddr,
}

impl TestFixture {
    /// Create a new test fixture with a random keypair and address.
    pub fn new() -> Self {
        Self {
            keypair: Secp256k1Keypair::generate(),
            factory: RecordFactory::with_defaults(),
            address: random_udp_address(),
        }
    }

    /// Create with a deterministic keypair from a secret.
    ///
    /// # Panics
    ///
    /// If `secret` is not a valid secp256k1 scalar.
    pub fn with_secret(secret: [u8; 32]) -> Self {
        Self {
            keypair: Secp256k1Keypair::from_bytes(&secret).expect("valid secp256k1 secret"),
            factory: RecordFactory::with_defaults(),
            address: SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 30303),
        }
    }

    /// The secret key bytes, as passed to signing operations.
    pub fn secret(&self) -> [u8; 32] {
        self.keypair.secret_bytes()
    }

    /// Node id of records signed by this fixture.
    pub fn node_id(&self) -> NodeId {
        self.make_record(1).node_id().expect("fixture record has a key")
    }

    /// Create a signed `v4` record advertising the fixture's address.
    pub fn make_record(&self, seq: u64) -> NodeRecord {
        let builder = self
            .factory
            .builder("v4", seq)
            .expect("v4 is registered");
        let builder = match self.address {
            SocketAddr::V4(addr) => builder.ip4(*addr.ip()).udp4(addr.port()),
            SocketAddr::V6(addr) => builder.ip6(*addr.ip()).udp6(addr.port()),
        };
        builder.sign(&self.secret()).expect("fixture record signs")
    }

    /// Create a signed record with one extra opaque field.
    pub fn make_record_with(&self, seq: u64, name: &str, value: &[u8]) -> NodeRecord {
        self.factory
            .builder("v4", seq)
            .expect("v4 is registered")
            .udp4(self.address.port())
            .field(name, value.to_vec())
            .sign(&self.secret())
            .expect("fixture record signs")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple test fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut secret = [0u8; 32];
            secret[31] = (i % 255) as u8 + 1;
            secret[30] = (i / 255) as u8;
            let mut fixture = TestFixture::with_secret(secret);
            fixture.address = SocketAddr::new(Ipv4Addr::new(10, 0, 0, 1).into(), 30303 + i as u16);
            fixture
        })
        .collect()
}

/// A factory that also accepts the mock scheme.
pub fn mock_factory() -> RecordFactory {
    let mut registry = SchemeRegistry::with_defaults();
    registry.register(Arc::new(MockScheme::new()));
    RecordFactory::new(
        registry,
        Arc::new(DefaultFieldCodec::new()),
        FactoryConfig::default(),
    )
}

/// A random private-range IPv4 address with an unprivileged port.
pub fn random_udp_address() -> SocketAddr {
    let mut rng = rand::thread_rng();
    let ip = Ipv4Addr::new(10, rng.gen(), rng.gen(), rng.gen());
    SocketAddr::new(ip.into(), rng.gen_range(1024..=u16::MAX))
}
