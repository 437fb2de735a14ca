//! Local keypair generation.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use shardpay_protocol::crypto::WalletKeypair;

/// Paths and public key of a freshly written keypair.
#[derive(Debug)]
pub struct GeneratedKey {
    pub private_key_path: PathBuf,
    pub public_key_path: PathBuf,
    pub public_key_hex: String,
}

/// Writes `<name>.pem` (PKCS#8, mode 0600 on Unix) and `<name>.pub.pem`
/// (SPKI) into `dir`, creating it if needed. Refuses to overwrite an
/// existing private key.
pub fn write_keypair(dir: &Path, name: &str) -> Result<GeneratedKey> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create key directory: {}", dir.display()))?;

    let private_key_path = dir.join(format!("{}.pem", name));
    let public_key_path = dir.join(format!("{}.pub.pem", name));
    if private_key_path.exists() {
        anyhow::bail!("refusing to overwrite {}", private_key_path.display());
    }

    let keypair = WalletKeypair::generate();
    let public_key = keypair.public_key();
    let private_pem = keypair.to_pem().context("failed to encode private key")?;
    let public_pem = public_key.to_pem().context("failed to encode public key")?;

    std::fs::write(&private_key_path, private_pem.as_bytes())
        .with_context(|| format!("failed to write {}", private_key_path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&private_key_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::write(&public_key_path, public_pem.as_bytes())
        .with_context(|| format!("failed to write {}", public_key_path.display()))?;

    tracing::info!(
        public_key = %public_key,
        path = %private_key_path.display(),
        "keypair generated"
    );

    Ok(GeneratedKey {
        private_key_path,
        public_key_path,
        public_key_hex: public_key.to_hex(),
    })
}
