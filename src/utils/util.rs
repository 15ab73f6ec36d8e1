use std::collections::hash_map::DefaultHasher;
use std::fs::create_dir_all;
use std::fs::File;
use std::fs::OpenOptions;
use std::hash::Hash;
use std::hash::Hasher;
use std::path::PathBuf;

use tracing::error;

use crate::proto::metadata::Ntp;
use crate::Result;

/// accept ip either like 127.0.0.1 or docker host name: node1
pub(crate) fn address_str(
    ip: &str,
    port: u16,
) -> String {
    format!("http://{}:{}", ip, port)
}

/// Stable hash routing a partition to its owning dissemination shard.
pub(crate) fn ntp_hash(ntp: &Ntp) -> u64 {
    let mut hasher = DefaultHasher::new();
    ntp.hash(&mut hasher);
    hasher.finish()
}

pub fn create_parent_dir_if_not_exist(path: &PathBuf) -> Result<()> {
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.exists() {
            if let Err(e) = create_dir_all(parent_dir) {
                error!("Failed to create log directory: {:?}", e);
                return Err(e.into());
            }
        }
    }
    Ok(())
}

pub fn open_file_for_append(path: PathBuf) -> Result<File> {
    create_parent_dir_if_not_exist(&path)?;
    let log_file = OpenOptions::new().append(true).create(true).open(&path)?;
    Ok(log_file)
}
