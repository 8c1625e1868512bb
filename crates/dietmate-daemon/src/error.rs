//! Error types for the Diet Mate daemon.

use dietmate_rpc::protocol::{self, RpcError};

/// Errors that can occur in the daemon
#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Host not registered
    #[error("Host not registered")]
    NotRegistered,

    /// Host already registered
    #[error("Host already registered")]
    AlreadyRegistered,

    /// Core error, including failed host primitives
    #[error("Core error: {0}")]
    Core(#[from] dietmate_core::Error),

    /// Codec error
    #[error("Codec error: {0}")]
    Codec(#[from] dietmate_rpc::transport::CodecError),

    /// Invalid parameters
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Method not found
    #[error("Method not found: {0}")]
    MethodNotFound(String),
}

impl From<DaemonError> for RpcError {
    fn from(err: DaemonError) -> Self {
        match err {
            DaemonError::NotRegistered => RpcError::not_registered(),
            DaemonError::AlreadyRegistered => RpcError::already_registered(),
            DaemonError::Core(dietmate_core::Error::Host(msg)) => RpcError::host_failure(msg),
            DaemonError::InvalidParams(msg) => RpcError::invalid_params(msg),
            DaemonError::MethodNotFound(name) => {
                RpcError::new(protocol::METHOD_NOT_FOUND, format!("Method not found: {name}"))
            }
            DaemonError::Io(e) => RpcError::internal_error(e.to_string()),
            DaemonError::Json(e) => RpcError::internal_error(e.to_string()),
            DaemonError::Core(e) => RpcError::internal_error(e.to_string()),
            DaemonError::Codec(e) => RpcError::internal_error(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DaemonError>;

impl From<RpcError> for DaemonError {
    fn from(err: RpcError) -> Self {
        match err.code {
            protocol::NOT_REGISTERED => DaemonError::NotRegistered,
            protocol::ALREADY_REGISTERED => DaemonError::AlreadyRegistered,
            protocol::HOST_FAILURE => DaemonError::Core(dietmate_core::Error::Host(err.message)),
            protocol::INVALID_PARAMS => DaemonError::InvalidParams(err.message),
            protocol::METHOD_NOT_FOUND => DaemonError::MethodNotFound(err.message),
            _ => DaemonError::Io(std::io::Error::other(err.message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daemon_error_display_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "socket missing");
        let err = DaemonError::Io(io_err);
        assert!(err.to_string().contains("I/O error"));
        assert!(err.to_string().contains("socket missing"));
    }

    #[test]
    fn test_daemon_error_display_simple_variants() {
        assert_eq!(DaemonError::NotRegistered.to_string(), "Host not registered");
        assert_eq!(
            DaemonError::AlreadyRegistered.to_string(),
            "Host already registered"
        );
        assert_eq!(
            DaemonError::InvalidParams("missing event".to_string()).to_string(),
            "Invalid parameters: missing event"
        );
        assert_eq!(
            DaemonError::MethodNotFound("reboot".to_string()).to_string(),
            "Method not found: reboot"
        );
    }

    #[test]
    fn test_daemon_error_from_core_error() {
        let err: DaemonError = dietmate_core::Error::host("display rejected").into();
        assert!(matches!(err, DaemonError::Core(_)));
        assert!(err.to_string().contains("display rejected"));
    }

    #[test]
    fn test_daemon_error_from_codec_error() {
        let invalid_bytes: Vec<u8> = vec![0xff];
        let codec_err = dietmate_rpc::transport::CodecError::Utf8(
            std::str::from_utf8(&invalid_bytes).unwrap_err(),
        );
        let err: DaemonError = codec_err.into();
        assert!(matches!(err, DaemonError::Codec(_)));
    }

    #[test]
    fn test_host_failure_maps_to_dedicated_code() {
        let daemon_err = DaemonError::Core(dietmate_core::Error::host("focus failed"));
        let rpc_err: RpcError = daemon_err.into();
        assert_eq!(rpc_err.code, protocol::HOST_FAILURE);
        assert_eq!(rpc_err.message, "focus failed");
    }

    #[test]
    fn test_other_core_errors_are_internal() {
        let daemon_err = DaemonError::Core(dietmate_core::Error::Io(std::io::Error::other("bad")));
        let rpc_err: RpcError = daemon_err.into();
        assert_eq!(rpc_err.code, protocol::INTERNAL_ERROR);
        assert!(rpc_err.message.contains("bad"));
    }

    #[test]
    fn test_daemon_error_to_rpc_error_codes() {
        let rpc_err: RpcError = DaemonError::NotRegistered.into();
        assert_eq!(rpc_err.code, protocol::NOT_REGISTERED);

        let rpc_err: RpcError = DaemonError::AlreadyRegistered.into();
        assert_eq!(rpc_err.code, protocol::ALREADY_REGISTERED);

        let rpc_err: RpcError = DaemonError::InvalidParams("bad param".to_string()).into();
        assert_eq!(rpc_err.code, protocol::INVALID_PARAMS);
        assert_eq!(rpc_err.message, "bad param");

        let rpc_err: RpcError = DaemonError::MethodNotFound("foo".to_string()).into();
        assert_eq!(rpc_err.code, protocol::METHOD_NOT_FOUND);
        assert!(rpc_err.message.contains("foo"));
    }

    #[test]
    fn test_daemon_error_to_rpc_error_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let rpc_err: RpcError = DaemonError::Io(io_err).into();
        assert_eq!(rpc_err.code, protocol::INTERNAL_ERROR);
        assert!(rpc_err.message.contains("pipe broken"));
    }

    #[test]
    fn test_rpc_error_to_daemon_error() {
        assert!(matches!(
            DaemonError::from(RpcError::not_registered()),
            DaemonError::NotRegistered
        ));
        assert!(matches!(
            DaemonError::from(RpcError::already_registered()),
            DaemonError::AlreadyRegistered
        ));
        assert!(matches!(
            DaemonError::from(RpcError::invalid_params("missing key")),
            DaemonError::InvalidParams(msg) if msg == "missing key"
        ));
        assert!(matches!(
            DaemonError::from(RpcError::method_not_found()),
            DaemonError::MethodNotFound(_)
        ));
        assert!(matches!(
            DaemonError::from(RpcError::internal_error("oops")),
            DaemonError::Io(_)
        ));
    }

    #[test]
    fn test_roundtrip_host_failure() {
        let original = DaemonError::Core(dietmate_core::Error::host("client gone"));
        let rpc: RpcError = original.into();
        let back: DaemonError = rpc.into();
        assert!(matches!(
            back,
            DaemonError::Core(dietmate_core::Error::Host(msg)) if msg == "client gone"
        ));
    }
}
