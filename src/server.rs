//! gRPC server bootstrap.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::future::Future;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tonic::transport::{Certificate, Identity, Server, ServerTlsConfig};
use tracing::{info, warn};
use xfn_encryption::{Function, FunctionConfig, FunctionService};
use xfn_proto::FunctionRunnerServiceServer;

/// Default listen address.
pub const DEFAULT_ADDRESS: &str = "0.0.0.0:9443";
/// Server certificate file inside the certs directory.
pub const TLS_CERT_FILE: &str = "tls.crt";
/// Server key file inside the certs directory.
pub const TLS_KEY_FILE: &str = "tls.key";
/// CA used to verify client certificates.
pub const CA_CERT_FILE: &str = "ca.crt";

/// How the listener is secured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Insecure,
    MutualTls { certs_dir: PathBuf },
}

impl Transport {
    /// Pick the transport from the CLI flags. `insecure` wins over a certs dir.
    pub fn select(certs_dir: Option<&Path>, insecure: bool) -> Result<Self> {
        match (certs_dir, insecure) {
            (_, true) => {
                if certs_dir.is_some() {
                    warn!("--insecure given, ignoring TLS certificates directory");
                }
                Ok(Self::Insecure)
            }
            (Some(dir), false) => Ok(Self::MutualTls {
                certs_dir: dir.to_path_buf(),
            }),
            (None, false) => {
                bail!("a TLS certificates directory is required unless --insecure is set")
            }
        }
    }

    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::MutualTls { .. })
    }
}

/// Resolved listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub address: SocketAddr,
    pub transport: Transport,
    pub timeout: Option<Duration>,
}

/// Parse a listen address.
pub fn parse_address(address: &str) -> Result<SocketAddr> {
    address
        .parse()
        .with_context(|| format!("invalid listen address '{address}'"))
}

/// Load function configuration from `path`, or from the environment when no
/// file is given.
pub fn load_config(path: Option<&Path>) -> Result<FunctionConfig> {
    match path {
        Some(path) => FunctionConfig::from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => FunctionConfig::from_env().context("invalid configuration in environment"),
    }
}

/// Build the mutual TLS configuration from a certs directory.
pub fn load_tls(certs_dir: &Path) -> Result<ServerTlsConfig> {
    let read = |file: &str| {
        let path = certs_dir.join(file);
        std::fs::read(&path).with_context(|| format!("cannot read {}", path.display()))
    };

    let cert = read(TLS_CERT_FILE)?;
    let key = read(TLS_KEY_FILE)?;
    let ca = read(CA_CERT_FILE)?;

    Ok(ServerTlsConfig::new()
        .identity(Identity::from_pem(cert, key))
        .client_ca_root(Certificate::from_pem(ca)))
}

/// Serve the function until `shutdown` resolves.
pub async fn serve<F>(settings: ServerSettings, config: FunctionConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let function = Function::new(config).context("invalid function configuration")?;
    let service = FunctionService::new(function).with_timeout(settings.timeout);

    let mut builder = Server::builder();
    if let Some(timeout) = settings.timeout {
        builder = builder.timeout(timeout);
    }
    if let Transport::MutualTls { certs_dir } = &settings.transport {
        builder = builder
            .tls_config(load_tls(certs_dir)?)
            .context("invalid TLS configuration")?;
    }

    info!(
        address = %settings.address,
        tls = settings.transport.is_tls(),
        "Function server listening"
    );

    builder
        .add_service(FunctionRunnerServiceServer::new(service))
        .serve_with_shutdown(settings.address, shutdown)
        .await
        .context("gRPC server failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_address() {
        assert!(parse_address(DEFAULT_ADDRESS).is_ok());
        assert!(parse_address("[::1]:9443").is_ok());
        assert!(parse_address("localhost").is_err());
    }

    #[test]
    fn test_transport_selection() {
        let dir = Path::new("/tls");
        assert!(matches!(
            Transport::select(Some(dir), false),
            Ok(Transport::MutualTls { .. })
        ));
        assert!(matches!(Transport::select(None, true), Ok(Transport::Insecure)));
        assert!(matches!(Transport::select(Some(dir), true), Ok(Transport::Insecure)));
        assert!(Transport::select(None, false).is_err());
    }

    #[test]
    fn test_load_tls_reads_all_files() -> std::result::Result<(), String> {
        let dir = tempfile::tempdir().map_err(|e| e.to_string())?;
        for file in [TLS_CERT_FILE, TLS_KEY_FILE, CA_CERT_FILE] {
            std::fs::write(dir.path().join(file), "pem").map_err(|e| e.to_string())?;
        }
        assert!(load_tls(dir.path()).is_ok());

        std::fs::remove_file(dir.path().join(CA_CERT_FILE)).map_err(|e| e.to_string())?;
        let err = load_tls(dir.path()).err().map(|e| e.to_string());
        assert!(err.is_some_and(|e| e.contains(CA_CERT_FILE)));
        Ok(())
    }

    #[test]
    fn test_load_config_from_file() -> std::result::Result<(), String> {
        let dir = tempfile::tempdir().map_err(|e| e.to_string())?;
        let path = dir.path().join("xfn.toml");
        std::fs::write(&path, "response_ttl = 15\n").map_err(|e| e.to_string())?;

        let config = load_config(Some(&path)).map_err(|e| e.to_string())?;
        assert_eq!(config.response_ttl, Duration::from_secs(15));
        assert!(load_config(Some(Path::new("/nonexistent/xfn.toml"))).is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_serve_stops_on_shutdown() {
        let settings = ServerSettings {
            address: SocketAddr::from(([127, 0, 0, 1], 0)),
            transport: Transport::Insecure,
            timeout: Some(Duration::from_secs(5)),
        };
        let result = serve(settings, FunctionConfig::default(), std::future::ready(())).await;
        assert!(result.is_ok());
    }
}
