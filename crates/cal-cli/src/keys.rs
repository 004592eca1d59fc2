//! # Node Keys
//!
//! The node signing key is stored as the hex-encoded 32-byte Ed25519 seed
//! in `<prefix>.key`, and the public key as hex in `<prefix>.pub`.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use cal_crypto::{NodePublicKey, NodeSigningKey};

/// Default file stem for generated keys.
pub const KEY_PREFIX: &str = "calendar";

/// Generate a keypair into `output_dir`.
pub fn cmd_keygen(output_dir: &Path, out: &mut impl Write) -> Result<u8> {
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!("failed to create output directory: {}", output_dir.display())
    })?;

    let key_path = output_dir.join(format!("{KEY_PREFIX}.key"));
    let pub_path = output_dir.join(format!("{KEY_PREFIX}.pub"));
    if key_path.exists() {
        bail!("refusing to overwrite existing key: {}", key_path.display());
    }

    let key = NodeSigningKey::generate();
    let public = key.public_key();

    std::fs::write(&key_path, key.to_seed_hex())
        .with_context(|| format!("failed to write private key: {}", key_path.display()))?;
    std::fs::write(&pub_path, public.to_hex())
        .with_context(|| format!("failed to write public key: {}", pub_path.display()))?;

    writeln!(out, "OK: generated Ed25519 keypair")?;
    writeln!(out, "  Private key: {}", key_path.display())?;
    writeln!(out, "  Public key:  {}", pub_path.display())?;
    writeln!(out, "  Fingerprint: {}", public.fingerprint())?;
    Ok(0)
}

/// Read a signing key written by [`cmd_keygen`].
pub fn load_signing_key(path: &Path) -> Result<NodeSigningKey> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read private key: {}", path.display()))?;
    NodeSigningKey::from_seed_hex(text.trim())
        .map_err(|e| anyhow::anyhow!("invalid private key in {}: {e}", path.display()))
}

/// Read a public key written by [`cmd_keygen`].
pub fn load_public_key(path: &Path) -> Result<NodePublicKey> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read public key: {}", path.display()))?;
    NodePublicKey::from_hex(text.trim())
        .map_err(|e| anyhow::anyhow!("invalid public key in {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keygen_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        assert_eq!(cmd_keygen(dir.path(), &mut out).unwrap(), 0);

        let key = load_signing_key(&dir.path().join("calendar.key")).unwrap();
        let public = load_public_key(&dir.path().join("calendar.pub")).unwrap();
        assert_eq!(key.public_key(), public);

        let report = String::from_utf8(out).unwrap();
        assert!(report.contains(&public.fingerprint()));
    }

    #[test]
    fn keygen_never_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        cmd_keygen(dir.path(), &mut Vec::new()).unwrap();
        assert!(cmd_keygen(dir.path(), &mut Vec::new()).is_err());
    }

    #[test]
    fn bad_key_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.key");
        std::fs::write(&path, "not hex").unwrap();
        assert!(load_signing_key(&path).is_err());
    }
}
