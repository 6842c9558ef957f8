//! TLS support using rustls
//!
//! Certificate and key are read from PEM files once at startup.

use std::fs::File;
use std::io::BufReader;
use std::sync::Arc;

use rustls::crypto::ring;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

use crate::config::TlsConfig;
use crate::error::{Result, ServerError};

/// Build a TLS acceptor from the configured PEM files
pub fn load_acceptor(config: &TlsConfig) -> Result<TlsAcceptor> {
    let certs = load_certs(&config.cert_path)?;
    let key = load_private_key(&config.key_path)?;

    let mut server_config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| ServerError::Tls(e.to_string()))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::Tls(e.to_string()))?;

    // Connections are served with hyper's HTTP/1 driver only
    server_config.alpn_protocols = vec![b"http/1.1".to_vec()];

    Ok(TlsAcceptor::from(Arc::new(server_config)))
}

/// Load certificates from PEM file
fn load_certs(path: &str) -> Result<Vec<CertificateDer<'static>>> {
    let file = File::open(path)
        .map_err(|e| ServerError::Tls(format!("Failed to open cert file {path}: {e}")))?;
    let mut reader = BufReader::new(file);

    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| ServerError::Tls(format!("Failed to parse certs in {path}: {e}")))?;

    if certs.is_empty() {
        return Err(ServerError::Tls(format!("No certificates found in {path}")));
    }

    Ok(certs)
}

/// Load the first PKCS#1, PKCS#8 or SEC1 private key from PEM file
fn load_private_key(path: &str) -> Result<PrivateKeyDer<'static>> {
    let file = File::open(path)
        .map_err(|e| ServerError::Tls(format!("Failed to open key file {path}: {e}")))?;
    let mut reader = BufReader::new(file);

    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| ServerError::Tls(format!("Failed to parse key in {path}: {e}")))?
        .ok_or_else(|| ServerError::Tls(format!("No private key found in {path}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("hello_api_tls_{}_{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_files() {
        let config = TlsConfig {
            key_path: "does/not/exist/key.pem".to_string(),
            cert_path: "does/not/exist/cert.pem".to_string(),
        };
        let err = load_acceptor(&config).err().unwrap();
        assert!(matches!(err, ServerError::Tls(ref msg) if msg.contains("cert.pem")));
    }

    #[test]
    fn test_file_without_pem_blocks() {
        let path = temp_file("empty.pem", "this is not a certificate\n");
        let path_str = path.to_str().unwrap();

        let err = load_certs(path_str).err().unwrap();
        assert!(err.to_string().contains("No certificates found"));

        let err = load_private_key(path_str).err().unwrap();
        assert!(err.to_string().contains("No private key found"));

        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_generated_pair_loads() {
        let rcgen::CertifiedKey { cert, key_pair } =
            rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let cert_path = temp_file("good_cert.pem", &cert.pem());
        let key_path = temp_file("good_key.pem", &key_pair.serialize_pem());

        let config = TlsConfig {
            key_path: key_path.to_string_lossy().into_owned(),
            cert_path: cert_path.to_string_lossy().into_owned(),
        };
        assert!(load_acceptor(&config).is_ok());

        // Key and cert swapped
        let swapped = TlsConfig {
            key_path: config.cert_path.clone(),
            cert_path: config.key_path.clone(),
        };
        assert!(load_acceptor(&swapped).is_err());

        let _ = std::fs::remove_file(cert_path);
        let _ = std::fs::remove_file(key_path);
    }
}
