//! Golden test vectors for deterministic verification.
//!
//! These vectors ensure that canonical encoding and signing produce identical
//! results across implementations. The `v4` vector is the example record
//! published with EIP-778.

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use node_record::{NodeRecord, RecordFactory};

/// A golden test vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: String,
    /// Identity scheme id.
    pub scheme: String,
    /// Secret key (hex).
    pub secret: String,
    /// Sequence number.
    pub seq: u64,
    /// IPv4 address.
    pub ip: Ipv4Addr,
    /// UDP port.
    pub udp: u16,
    /// Expected public key field (hex), empty if not pinned.
    pub public_key: String,
    /// Expected node id (hex), empty if not pinned.
    pub node_id: String,
    /// Expected text form, empty if not pinned.
    pub text: String,
}

/// The example record from EIP-778.
pub fn eip778_vector() -> GoldenVector {
    GoldenVector {
        name: "EIP-778 example record".to_string(),
        scheme: "v4".to_string(),
        secret: "b71c71a67e1177ad4e901695e1b4b9ee17ae16c6668d313eac2f96dbcda3f291".to_string(),
        seq: 1,
        ip: Ipv4Addr::new(127, 0, 0, 1),
        udp: 30303,
        public_key: "03ca634cae0d49acb401d8a4c6b6fe8c55b70d115bf400769cc1400f3258cd3138"
            .to_string(),
        node_id: "a448f24c6d18e575453db13171562b71999873db5b286df957af199ec94617f7".to_string(),
        text: concat!(
            "enr:-IS4QHCYrYZbAKWCBRlAy5zzaDZXJBGkcnh4MHcBFZntXNFrdvJjX04jRzjzCBOonrkTfj499SZuOh8R",
            "33Ls8RRcy5wBgmlkgnY0gmlwhH8AAAGJc2VjcDI1NmsxoQPKY0yuDUmstAHYpMa2_oxVtw0RW_QAdpzBQA8y",
            "WM0xOIN1ZHCCdl8"
        )
        .to_string(),
    }
}

/// An Ed25519 record: the signature covers the content directly and the node
/// id is the BLAKE3 hash of the public key.
pub fn ed25519_vector() -> GoldenVector {
    GoldenVector {
        name: "ed25519 loopback record".to_string(),
        scheme: "ed25519".to_string(),
        secret: hex::encode([0x42u8; 32]),
        seq: 7,
        ip: Ipv4Addr::LOCALHOST,
        udp: 9000,
        public_key: "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12"
            .to_string(),
        node_id: "fef6dfa48b073924c436539010d7812fbe50096ae82569fdad35f79628bc0084".to_string(),
        text: concat!(
            "enr:-Ia4QPTMydRNM5EpXaqvRzkdoo4JeSXo-toa8GBLN4p58qFL3jqkYDbnQlDT_PPiHPVIBRl1yhnK64rW",
            "dwZ4CgMT8wMHh2VkMjU1MTmgIVL40Zt5HSRFMkLhXy6rbLfP-ntqXtMAl5YOBpiB2xKCaWSHZWQyNTUxOYJp",
            "cIR_AAABg3VkcIIjKA"
        )
        .to_string(),
    }
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![eip778_vector(), ed25519_vector()]
}

/// Build and sign the record a vector describes.
///
/// # Panics
///
/// If the vector names an unknown scheme or carries an invalid secret.
pub fn generate_record_from_vector(vector: &GoldenVector) -> NodeRecord {
    let secret = hex::decode(&vector.secret).expect("vector secret is hex");
    RecordFactory::with_defaults()
        .builder(&vector.scheme, vector.seq)
        .expect("vector scheme is registered")
        .ip4(vector.ip)
        .udp4(vector.udp)
        .sign(&secret)
        .expect("vector record signs")
}

/// Check every vector, returning `(name, matches, text)` per vector.
///
/// Fields left empty in a vector are not compared.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let record = generate_record_from_vector(v);
            let text = record.to_text().unwrap_or_default();
            let node_id = record.node_id().map(|id| id.to_hex()).unwrap_or_default();
            let public_key = record
                .get(record.identity_scheme().public_key_field())
                .and_then(|value| value.as_bytes())
                .map(hex::encode)
                .unwrap_or_default();

            let matches = (v.text.is_empty() || text == v.text)
                && (v.node_id.is_empty() || node_id == v.node_id)
                && (v.public_key.is_empty() || public_key == v.public_key);

            (v.name.clone(), matches, text)
        })
        .collect()
}

/// All vectors as pretty-printed JSON, for sharing with other implementations.
pub fn vectors_json() -> serde_json::Result<String> {
    serde_json::to_string_pretty(&all_vectors())
}
