//! Message capability for argument and result payloads.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ProtocolError;

/// A serialisable RPC message.
///
/// Argument and result types are plain serde structs; the payload encoding
/// is JSON. The wire protocol never inspects payload bytes - only the
/// endpoints, which know the expected type for the method being called,
/// parse them.
///
/// Blanket-implemented for every type that meets the bounds, so service
/// authors only derive `Serialize` and `Deserialize`.
pub trait Message: Serialize + DeserializeOwned + Send + 'static {
    /// Serialises this message to payload bytes.
    fn to_payload(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::Encoding(e.to_string()))
    }

    /// Parses a message of this type from payload bytes.
    fn from_payload(bytes: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(bytes).map_err(|e| ProtocolError::Decoding(e.to_string()))
    }
}

impl<T> Message for T where T: Serialize + DeserializeOwned + Send + 'static {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct Greeting {
        name: String,
        count: u32,
    }

    #[test]
    fn payload_round_trip() {
        let msg = Greeting {
            name: "world".to_owned(),
            count: 3,
        };

        let bytes = msg.to_payload().unwrap();
        let parsed = Greeting::from_payload(&bytes).unwrap();
        assert_eq!(parsed, msg);
    }

    #[test]
    fn from_payload_rejects_garbage() {
        let result = Greeting::from_payload(b"\xff\xfe not json");
        assert!(matches!(result, Err(ProtocolError::Decoding(_))));
    }

    #[test]
    fn from_payload_rejects_wrong_shape() {
        let result = Greeting::from_payload(b"{\"unrelated\": true}");
        assert!(matches!(result, Err(ProtocolError::Decoding(_))));
    }
}
