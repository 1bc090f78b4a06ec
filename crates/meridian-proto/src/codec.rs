//! Request and response framing.

use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;

use crate::error::ProtocolError;
use crate::header::CallHeader;
use crate::message::Message;

/// Size of the little-endian length prefix, in bytes.
pub const LEN_PREFIX_SIZE: usize = 4;

/// Maximum accepted serialised header length (64 KB).
pub const MAX_HEADER_SIZE: usize = 64 * 1024;

/// Maximum accepted argument payload length (10 MB).
pub const MAX_ARGS_SIZE: usize = 10 * 1024 * 1024;

/// A fully decoded request frame.
///
/// The argument bytes are not parsed into a typed message here: only the
/// dispatcher, which resolves the target method, knows the expected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    /// Name of the target service.
    pub service_name: String,

    /// Name of the target method.
    pub method_name: String,

    /// Raw argument payload.
    pub args: Vec<u8>,
}

/// Encodes a request frame: length prefix, serialised header, argument bytes.
pub fn encode_request<M: Message>(
    service_name: &str,
    method_name: &str,
    args: &M,
) -> Result<Vec<u8>, ProtocolError> {
    let args_bytes = args.to_payload()?;
    let args_size = u32::try_from(args_bytes.len())
        .ok()
        .filter(|_| args_bytes.len() <= MAX_ARGS_SIZE)
        .ok_or_else(|| {
            ProtocolError::Encoding(format!(
                "argument payload of {} bytes exceeds limit of {MAX_ARGS_SIZE}",
                args_bytes.len()
            ))
        })?;

    let header = CallHeader::new(service_name, method_name, args_size);
    let header_bytes = rkyv::to_bytes::<RkyvError>(&header)
        .map_err(|e| ProtocolError::Encoding(e.to_string()))?;
    let header_len = u32::try_from(header_bytes.len())
        .map_err(|_| ProtocolError::Encoding("header length overflows u32".to_owned()))?;

    let mut out = Vec::with_capacity(LEN_PREFIX_SIZE + header_bytes.len() + args_bytes.len());
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(&args_bytes);
    Ok(out)
}

/// Decodes a complete request frame.
///
/// Fails with [`ProtocolError::MalformedFrame`] when the length prefix is
/// missing, [`ProtocolError::MalformedHeader`] when the header bytes are
/// short or unparseable, and [`ProtocolError::TruncatedArgs`] when fewer
/// argument bytes remain than the header advertised.
pub fn decode_request(bytes: &[u8]) -> Result<CallFrame, ProtocolError> {
    if bytes.len() < LEN_PREFIX_SIZE {
        return Err(ProtocolError::MalformedFrame);
    }

    let header_len = read_header_len(bytes)?;
    let header_end = LEN_PREFIX_SIZE + header_len;
    if bytes.len() < header_end {
        return Err(ProtocolError::MalformedHeader(format!(
            "incomplete header: have {} of {header_len} bytes",
            bytes.len() - LEN_PREFIX_SIZE
        )));
    }

    let header = decode_header(&bytes[LEN_PREFIX_SIZE..header_end])?;
    let args_size = checked_args_size(&header)?;

    let have = bytes.len() - header_end;
    if have < args_size {
        return Err(ProtocolError::TruncatedArgs {
            have,
            need: args_size,
        });
    }

    Ok(CallFrame {
        service_name: header.service_name,
        method_name: header.method_name,
        args: bytes[header_end..header_end + args_size].to_vec(),
    })
}

/// Attempts to decode a request frame from a partially received buffer.
///
/// Returns `Ok(None)` while more bytes could still complete the frame, so a
/// receiver can accumulate chunks across reads. Errors are terminal: a
/// header that is fully present but unparseable, or a length field beyond
/// the protocol limits, cannot be repaired by further bytes. Bytes beyond
/// the first complete frame are ignored - each connection carries exactly
/// one call.
pub fn try_decode_request(bytes: &[u8]) -> Result<Option<CallFrame>, ProtocolError> {
    if bytes.len() < LEN_PREFIX_SIZE {
        return Ok(None);
    }

    let header_len = read_header_len(bytes)?;
    let header_end = LEN_PREFIX_SIZE + header_len;
    if bytes.len() < header_end {
        return Ok(None);
    }

    let header = decode_header(&bytes[LEN_PREFIX_SIZE..header_end])?;
    let args_size = checked_args_size(&header)?;
    if bytes.len() < header_end + args_size {
        return Ok(None);
    }

    Ok(Some(CallFrame {
        service_name: header.service_name,
        method_name: header.method_name,
        args: bytes[header_end..header_end + args_size].to_vec(),
    }))
}

/// Encodes a response: the raw serialised result message, no envelope.
pub fn encode_response<M: Message>(result: &M) -> Result<Vec<u8>, ProtocolError> {
    result.to_payload()
}

/// Decodes a response into the expected result type.
pub fn decode_response<M: Message>(bytes: &[u8]) -> Result<M, ProtocolError> {
    M::from_payload(bytes)
}

fn read_header_len(bytes: &[u8]) -> Result<usize, ProtocolError> {
    let prefix: [u8; LEN_PREFIX_SIZE] = bytes[..LEN_PREFIX_SIZE]
        .try_into()
        .map_err(|_| ProtocolError::MalformedFrame)?;
    let header_len = u32::from_le_bytes(prefix) as usize;
    if header_len > MAX_HEADER_SIZE {
        return Err(ProtocolError::MalformedHeader(format!(
            "header length {header_len} exceeds limit of {MAX_HEADER_SIZE}"
        )));
    }
    Ok(header_len)
}

fn checked_args_size(header: &CallHeader) -> Result<usize, ProtocolError> {
    let args_size = header.args_size as usize;
    if args_size > MAX_ARGS_SIZE {
        return Err(ProtocolError::MalformedHeader(format!(
            "argument length {args_size} exceeds limit of {MAX_ARGS_SIZE}"
        )));
    }
    Ok(args_size)
}

fn decode_header(bytes: &[u8]) -> Result<CallHeader, ProtocolError> {
    // rkyv validation needs an aligned buffer; the slice offset within the
    // receive buffer carries no alignment guarantee.
    let mut aligned = AlignedVec::<16>::new();
    aligned.extend_from_slice(bytes);
    rkyv::from_bytes::<CallHeader, RkyvError>(&aligned)
        .map_err(|e| ProtocolError::MalformedHeader(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    struct LoginArgs {
        name: String,
        pwd: String,
    }

    fn sample_args() -> LoginArgs {
        LoginArgs {
            name: "zhang_san".to_owned(),
            pwd: "123456".to_owned(),
        }
    }

    #[test]
    fn request_round_trip() {
        let args = sample_args();
        let bytes = encode_request("UserService", "Login", &args).unwrap();

        let frame = decode_request(&bytes).unwrap();
        assert_eq!(frame.service_name, "UserService");
        assert_eq!(frame.method_name, "Login");
        assert_eq!(frame.args, args.to_payload().unwrap());

        let parsed = LoginArgs::from_payload(&frame.args).unwrap();
        assert_eq!(parsed, args);
    }

    #[test]
    fn short_prefix_is_malformed_frame() {
        for len in 0..LEN_PREFIX_SIZE {
            let bytes = vec![0u8; len];
            assert!(
                matches!(decode_request(&bytes), Err(ProtocolError::MalformedFrame)),
                "expected MalformedFrame for {len}-byte buffer"
            );
        }
    }

    #[test]
    fn truncation_never_parses() {
        let bytes = encode_request("UserService", "Login", &sample_args()).unwrap();
        let header_len =
            u32::from_le_bytes(bytes[..LEN_PREFIX_SIZE].try_into().unwrap()) as usize;
        let header_end = LEN_PREFIX_SIZE + header_len;

        for cut in 0..bytes.len() {
            let err = decode_request(&bytes[..cut])
                .expect_err("truncated frame must never decode");
            if cut < LEN_PREFIX_SIZE {
                assert!(matches!(err, ProtocolError::MalformedFrame), "cut at {cut}");
            } else if cut < header_end {
                assert!(
                    matches!(err, ProtocolError::MalformedHeader(_)),
                    "cut at {cut}: {err}"
                );
            } else {
                assert!(
                    matches!(err, ProtocolError::TruncatedArgs { .. }),
                    "cut at {cut}: {err}"
                );
            }
        }
    }

    #[test]
    fn garbage_header_is_rejected() {
        let bytes = encode_request("UserService", "Login", &sample_args()).unwrap();
        let header_len =
            u32::from_le_bytes(bytes[..LEN_PREFIX_SIZE].try_into().unwrap()) as usize;

        let mut corrupted = bytes.clone();
        for byte in &mut corrupted[LEN_PREFIX_SIZE..LEN_PREFIX_SIZE + header_len] {
            *byte = 0xFF;
        }

        assert!(matches!(
            decode_request(&corrupted),
            Err(ProtocolError::MalformedHeader(_))
        ));
    }

    #[test]
    fn oversized_header_length_is_rejected() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(u32::try_from(MAX_HEADER_SIZE + 1).unwrap()).to_le_bytes());
        bytes.extend_from_slice(&[0u8; 16]);

        assert!(matches!(
            decode_request(&bytes),
            Err(ProtocolError::MalformedHeader(_))
        ));
        assert!(matches!(
            try_decode_request(&bytes),
            Err(ProtocolError::MalformedHeader(_))
        ));
    }

    #[test]
    fn try_decode_incomplete_returns_none() {
        let bytes = encode_request("UserService", "Login", &sample_args()).unwrap();

        for cut in 0..bytes.len() {
            assert!(
                try_decode_request(&bytes[..cut]).unwrap().is_none(),
                "prefix of {cut} bytes should be incomplete"
            );
        }

        let frame = try_decode_request(&bytes).unwrap().unwrap();
        assert_eq!(frame.service_name, "UserService");
    }

    #[test]
    fn try_decode_ignores_trailing_bytes() {
        let mut bytes = encode_request("UserService", "Login", &sample_args()).unwrap();
        let second = encode_request("UserService", "Register", &sample_args()).unwrap();
        bytes.extend_from_slice(&second);

        let frame = try_decode_request(&bytes).unwrap().unwrap();
        assert_eq!(frame.method_name, "Login");
    }

    #[test]
    fn response_round_trip() {
        let args = sample_args();
        let bytes = encode_response(&args).unwrap();
        let decoded: LoginArgs = decode_response(&bytes).unwrap();
        assert_eq!(decoded, args);
    }

    #[test]
    fn response_garbage_is_decoding_error() {
        let result = decode_response::<LoginArgs>(b"\x00\x01\x02");
        assert!(matches!(result, Err(ProtocolError::Decoding(_))));
    }

    #[test]
    fn empty_args_round_trip() {
        #[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
        struct Empty {}

        let bytes = encode_request("PingService", "Ping", &Empty {}).unwrap();
        let frame = decode_request(&bytes).unwrap();
        assert_eq!(frame.service_name, "PingService");
        assert_eq!(frame.method_name, "Ping");
        let _: Empty = Message::from_payload(&frame.args).unwrap();
    }
}
