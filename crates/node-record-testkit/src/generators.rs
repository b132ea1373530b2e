//! Proptest generators for property-based testing.

use proptest::prelude::*;
use std::net::Ipv4Addr;
use std::sync::Arc;

use node_record_core::{
    DefaultFieldCodec, Field, NodeRecord, NodeRecordBuilder, Secp256k1Keypair, V4Scheme,
};

/// Generate a valid secp256k1 secret.
pub fn secret() -> impl Strategy<Value = [u8; 32]> {
    any::<[u8; 32]>().prop_filter("valid secp256k1 scalar", |bytes| {
        Secp256k1Keypair::from_bytes(bytes).is_ok()
    })
}

/// Generate a sequence number that can still be incremented.
pub fn seq() -> impl Strategy<Value = u64> {
    0u64..u64::MAX
}

pub fn ipv4() -> impl Strategy<Value = Ipv4Addr> {
    any::<[u8; 4]>().prop_map(Ipv4Addr::from)
}

pub fn port() -> impl Strategy<Value = u16> {
    any::<u16>()
}

/// Generate a custom field name that no well-known key can collide with.
pub fn custom_key() -> impl Strategy<Value = String> {
    "x-[a-z0-9]{1,6}".prop_map(String::from)
}

/// Generate a tombstone name, disjoint from [`custom_key`].
pub fn tombstone_key() -> impl Strategy<Value = String> {
    "t-[a-z0-9]{1,6}".prop_map(String::from)
}

/// Generate an opaque value short enough to keep records under the size limit.
pub fn opaque_value() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=16)
}

/// Parameters for generating a signed `v4` record.
#[derive(Debug, Clone)]
pub struct RecordParams {
    pub secret: [u8; 32],
    pub seq: u64,
    pub ip: Ipv4Addr,
    pub udp: u16,
    pub tcp: Option<u16>,
    pub extra: Vec<(String, Vec<u8>)>,
}

impl RecordParams {
    /// The fields of the record, in generation order.
    pub fn fields(&self) -> Vec<Field> {
        let mut fields = vec![
            Field::new("ip", self.ip),
            Field::new("udp", self.udp),
        ];
        if let Some(tcp) = self.tcp {
            fields.push(Field::new("tcp", tcp));
        }
        for (name, value) in &self.extra {
            fields.push(Field::new(name.clone(), value.clone()));
        }
        fields
    }
}

impl Arbitrary for RecordParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            secret(),
            seq(),
            ipv4(),
            port(),
            any::<Option<u16>>(),
            prop::collection::btree_map(custom_key(), opaque_value(), 0..=3),
        )
            .prop_map(|(secret, seq, ip, udp, tcp, extra)| RecordParams {
                secret,
                seq,
                ip,
                udp,
                tcp,
                extra: extra.into_iter().collect(),
            })
            .boxed()
    }
}

/// Start a `v4` builder with the default codec.
pub fn v4_builder(seq: u64) -> NodeRecordBuilder {
    NodeRecordBuilder::new(
        Arc::new(V4Scheme::new()),
        Arc::new(DefaultFieldCodec::new()),
        seq,
    )
}

/// Generate a signed record from parameters.
pub fn record_from_params(params: &RecordParams) -> NodeRecord {
    params
        .fields()
        .into_iter()
        .fold(v4_builder(params.seq), |builder, field| match field.value {
            Some(value) => builder.field(field.name, value),
            None => builder.tombstone(field.name),
        })
        .sign(&params.secret)
        .expect("generated records fit the size limit")
}
