//! Hashing utilities for package identity.

use sha2::{Digest, Sha256};

use crate::core::configuration::Configuration;
use crate::core::settings::Settings;

/// A hasher for building fingerprints from multiple components.
#[derive(Default)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    /// Create a new fingerprint builder.
    pub fn new() -> Self {
        Fingerprint {
            hasher: Sha256::new(),
        }
    }

    /// Add a string component to the fingerprint.
    pub fn update_str(&mut self, s: &str) -> &mut Self {
        self.hasher.update(s.as_bytes());
        self.hasher.update(b"\0");
        self
    }

    /// Add an optional string component.
    pub fn update_opt(&mut self, opt: Option<&str>) -> &mut Self {
        match opt {
            Some(s) => {
                self.hasher.update(b"\x01");
                self.update_str(s);
            }
            None => {
                self.hasher.update(b"\x00");
            }
        }
        self
    }

    /// Finalize and return the fingerprint as a hex string.
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }

    /// Finalize and return a short fingerprint (first 16 chars).
    pub fn finish_short(self) -> String {
        self.finish()[..16].to_string()
    }
}

/// Binary identity of one package configuration.
///
/// Covers the recipe reference, every surviving option in name order and
/// the settings that change the produced binary. A pruned option does not
/// contribute, so `fPIC` overrides on Windows do not split package IDs.
pub fn package_id(
    name: &str,
    version: &str,
    configuration: &Configuration,
    settings: &Settings,
) -> String {
    let mut fp = Fingerprint::new();
    fp.update_str(name).update_str(version);

    for (option, value) in configuration.iter() {
        fp.update_str(option).update_str(&value.to_string());
    }

    fp.update_str(settings.os.as_str())
        .update_opt(settings.arch.as_deref())
        .update_opt(settings.compiler.as_deref())
        .update_opt(settings.compiler_version.as_deref())
        .update_opt(settings.build_type.as_ref().map(|b| b.as_str()))
        .update_opt(settings.cppstd.as_deref());

    fp.finish_short()
}
