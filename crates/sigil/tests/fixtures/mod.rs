use std::path::Path;
use std::sync::Arc;

use sigil::prelude::*;

/// Key size used throughout the tests. Small enough to keep generation fast.
pub const TEST_KEY_BITS: usize = 1024;

/// Small keys and no console output.
#[must_use]
pub fn test_config() -> SigilConfig {
    let mut config = SigilConfig::default();
    config.keys.credential_bits = TEST_KEY_BITS;
    config.keys.account_key_bits = TEST_KEY_BITS;
    config.logging.console = false;
    config
}

/// A core backed by a fresh in-memory store.
#[must_use]
pub fn core_with(config: &SigilConfig) -> (Arc<MemoryAccountKeyStore>, TrustCore) {
    let store = Arc::new(MemoryAccountKeyStore::new());
    let core = TrustCore::from_config(config, store.clone(), store.clone()).expect("trust core");
    (store, core)
}

pub fn read_logs(dir: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    for entry in std::fs::read_dir(dir)?.flatten() {
        if entry.path().extension().and_then(|ext| ext.to_str()) == Some("log") {
            contents.push_str(&std::fs::read_to_string(entry.path())?);
        }
    }
    Ok(contents)
}
