// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Certificate providers.
//!
//! # Directory Layout
//!
//! ```text
//! <pki_dir>/
//! ├── own/
//! │   ├── <app>_<policy>.der     # application instance certificate
//! │   └── <app>_https.der        # HTTPS certificate
//! └── private/
//!     ├── <app>_<policy>.pem     # PKCS#8 private key
//!     └── <app>_https.pem
//! ```
//!
//! `<app>` is the application name with every character outside
//! `[A-Za-z0-9._-]` replaced by `_` and leading dots dropped, so a stem
//! never leaves its directory. Private keys are written owner-only on Unix.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::generator::{thumbprint, GeneratedCertificate, SelfSignedGenerator};
use super::{CertificateProvider, KeyPairMaterial};
use crate::error::{CertificateError, OpcUaResult};
use crate::types::SecurityPolicy;

// =============================================================================
// FileSystemCertificateProvider
// =============================================================================

/// Loads key material from a PKI directory, generating what is missing.
#[derive(Debug, Clone)]
pub struct FileSystemCertificateProvider {
    pki_dir: PathBuf,
    auto_generate: bool,
    generator: SelfSignedGenerator,
}

impl FileSystemCertificateProvider {
    /// Creates a provider rooted at `pki_dir`.
    pub fn new(pki_dir: impl Into<PathBuf>) -> Self {
        Self {
            pki_dir: pki_dir.into(),
            auto_generate: true,
            generator: SelfSignedGenerator::new(),
        }
    }

    /// Enables or disables generation of missing material.
    pub fn with_auto_generate(mut self, enabled: bool) -> Self {
        self.auto_generate = enabled;
        self
    }

    /// Returns the PKI directory.
    pub fn pki_dir(&self) -> &Path {
        &self.pki_dir
    }

    /// Certificate and key paths for a file stem.
    pub fn paths_for(&self, stem: &str) -> (PathBuf, PathBuf) {
        (
            self.pki_dir.join("own").join(format!("{}.der", stem)),
            self.pki_dir.join("private").join(format!("{}.pem", stem)),
        )
    }

    async fn load_or_generate(&self, application_name: &str, stem: &str) -> OpcUaResult<KeyPairMaterial> {
        let (cert_path, key_path) = self.paths_for(stem);

        if cert_path.exists() && key_path.exists() {
            return self.load(&cert_path, &key_path).await;
        }

        if !self.auto_generate {
            let missing = if cert_path.exists() { key_path } else { cert_path };
            return Err(CertificateError::not_found(missing).into());
        }

        let generated = self.generator.generate(application_name)?;
        self.save(&generated, &cert_path, &key_path).await?;

        tracing::info!(
            application = %application_name,
            path = %cert_path.display(),
            thumbprint = %generated.thumbprint,
            "Stored new certificate"
        );

        Ok(KeyPairMaterial {
            certificate_der: generated.certificate_der,
            private_key_pem: generated.private_key_pem,
            thumbprint: generated.thumbprint,
            certificate_path: Some(cert_path),
            private_key_path: Some(key_path),
        })
    }

    async fn load(&self, cert_path: &Path, key_path: &Path) -> OpcUaResult<KeyPairMaterial> {
        let certificate_der = tokio::fs::read(cert_path)
            .await
            .map_err(|e| CertificateError::io(cert_path, e))?;
        if certificate_der.is_empty() {
            return Err(CertificateError::invalid_material(cert_path, "empty certificate file").into());
        }

        let private_key_pem = tokio::fs::read_to_string(key_path)
            .await
            .map_err(|e| CertificateError::io(key_path, e))?;
        if !private_key_pem.contains("PRIVATE KEY-----") {
            return Err(CertificateError::invalid_material(key_path, "not a PEM private key").into());
        }

        tracing::debug!(path = %cert_path.display(), "Loaded certificate");

        Ok(KeyPairMaterial {
            thumbprint: thumbprint(&certificate_der),
            certificate_der,
            private_key_pem,
            certificate_path: Some(cert_path.to_path_buf()),
            private_key_path: Some(key_path.to_path_buf()),
        })
    }

    async fn save(
        &self,
        generated: &GeneratedCertificate,
        cert_path: &Path,
        key_path: &Path,
    ) -> OpcUaResult<()> {
        for path in [cert_path, key_path] {
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| CertificateError::io(parent, e))?;
            }
        }

        tokio::fs::write(cert_path, &generated.certificate_der)
            .await
            .map_err(|e| CertificateError::io(cert_path, e))?;
        write_private_key(key_path, &generated.private_key_pem)
            .await
            .map_err(|e| CertificateError::io(key_path, e))?;
        Ok(())
    }
}

/// Writes a private key readable by the owner only.
async fn write_private_key(path: &Path, pem: &str) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(pem.as_bytes()).await?;
    file.flush().await?;

    // `mode` only applies on creation; an existing file keeps its bits.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await?;
    }
    Ok(())
}

/// File stem for an application name and suffix.
fn file_stem(application_name: &str, suffix: &str) -> String {
    let name: String = application_name
        .trim_start_matches('.')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let name = if name.is_empty() { "_" } else { name.as_str() };
    format!("{}_{}", name, suffix)
}

#[async_trait]
impl CertificateProvider for FileSystemCertificateProvider {
    fn name(&self) -> &str {
        "filesystem"
    }

    async fn load_or_create(
        &self,
        application_name: &str,
        policy: SecurityPolicy,
    ) -> OpcUaResult<KeyPairMaterial> {
        let stem = file_stem(application_name, policy.name());
        self.load_or_generate(application_name, &stem).await
    }

    async fn load_or_create_https(&self, application_name: &str) -> OpcUaResult<KeyPairMaterial> {
        let stem = file_stem(application_name, "https");
        self.load_or_generate(application_name, &stem).await
    }
}

// =============================================================================
// MemoryCertificateProvider
// =============================================================================

/// Generates material in memory on every request. Never touches disk.
#[derive(Debug, Default)]
pub struct MemoryCertificateProvider {
    generator: SelfSignedGenerator,
    generated: AtomicU64,
}

impl MemoryCertificateProvider {
    /// Creates a provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of certificates generated so far.
    pub fn generated_count(&self) -> u64 {
        self.generated.load(Ordering::Relaxed)
    }

    fn generate(&self, application_name: &str) -> OpcUaResult<KeyPairMaterial> {
        let generated = self.generator.generate(application_name)?;
        self.generated.fetch_add(1, Ordering::Relaxed);
        Ok(KeyPairMaterial {
            certificate_der: generated.certificate_der,
            private_key_pem: generated.private_key_pem,
            thumbprint: generated.thumbprint,
            certificate_path: None,
            private_key_path: None,
        })
    }
}

#[async_trait]
impl CertificateProvider for MemoryCertificateProvider {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load_or_create(
        &self,
        application_name: &str,
        _policy: SecurityPolicy,
    ) -> OpcUaResult<KeyPairMaterial> {
        self.generate(application_name)
    }

    async fn load_or_create_https(&self, application_name: &str) -> OpcUaResult<KeyPairMaterial> {
        self.generate(application_name)
    }
}

// =============================================================================
// Tests
// =============================================================================
