//! Protocol Module
//!
//! Wire protocol between a [`RemoteStore`](crate::store::RemoteStore) and the
//! node [`Server`](crate::network::Server).
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────┬──────────┬─────────────────────────────┐
//! │ Kind (1) │ Len (4)  │ CRC (4)  │      Payload (bincode)      │
//! └──────────┴──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Kinds
//! - 0x01: REQUEST  - Payload: [`Request`]
//! - 0x02: RESPONSE - Payload: [`Response`]
//!
//! Length and CRC32 (of the payload) are big-endian. One request is answered
//! by exactly one response, in order.

mod request;
mod response;
mod codec;

pub use request::{Request, RequestType};
pub use response::{RemoteError, Reply, Response};
pub use codec::{
    decode_frame, decode_request, decode_response, encode_frame, encode_request,
    encode_response, read_request, read_response, write_request, write_response, FrameKind,
    HEADER_SIZE, MAX_CHUNK_SIZE, MAX_PAYLOAD_SIZE,
};
