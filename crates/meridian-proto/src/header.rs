//! Call header carried ahead of every request payload.

use rkyv::{Archive, Deserialize, Serialize};

/// Header describing one RPC call.
///
/// Serialised with rkyv and placed between the length prefix and the
/// argument payload. `args_size` must equal the exact byte length of the
/// argument payload that follows the header.
#[derive(Archive, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CallHeader {
    /// Name of the target service.
    pub service_name: String,

    /// Name of the target method within the service.
    pub method_name: String,

    /// Exact byte length of the argument payload.
    pub args_size: u32,
}

impl CallHeader {
    /// Creates a header for a call to `service_name.method_name`.
    #[must_use]
    pub fn new(
        service_name: impl Into<String>,
        method_name: impl Into<String>,
        args_size: u32,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            method_name: method_name.into(),
            args_size,
        }
    }
}
