//! Protocol Buffer definitions and generated code for RPC services.
//!
//! This module contains auto-generated Rust types from Protobuf definitions,
//! created at build time by [`tonic-build`].

use std::fmt;

pub mod metadata {
    tonic::include_proto!("metadata");
}

use metadata::Ntp;
use metadata::NtpLeader;

impl Ntp {
    pub fn new(
        ns: impl Into<String>,
        topic: impl Into<String>,
        partition: i32,
    ) -> Self {
        Self {
            ns: ns.into(),
            topic: topic.into(),
            partition,
        }
    }
}

impl fmt::Display for Ntp {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{}/{}/{}", self.ns, self.topic, self.partition)
    }
}

impl NtpLeader {
    pub fn new(
        ntp: Ntp,
        term: u64,
        leader_id: Option<u32>,
    ) -> Self {
        Self {
            ntp: Some(ntp),
            term,
            leader_id,
        }
    }
}
