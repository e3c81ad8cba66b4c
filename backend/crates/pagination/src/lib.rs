//! Opaque pagination cursor primitives.
//!
//! Collection reads in the back-office repositories page through remote
//! query results using a "last document seen" cursor. The cursor carries the
//! order-by key of that document plus its record identifier as a tie-break.
//! In-process callers pass [`Cursor`] values directly; the URL-safe token
//! form is for persisting a resume position outside the process.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while encoding or decoding cursor tokens.
#[derive(Debug, Error)]
pub enum CursorError {
    /// The cursor payload could not be serialised into a token.
    #[error("cursor could not be encoded: {message}")]
    Encode {
        /// Underlying serialisation failure.
        message: String,
    },
    /// The token is not valid URL-safe base64.
    #[error("cursor token is not valid base64")]
    Base64(#[from] base64::DecodeError),
    /// The decoded token does not contain a valid cursor payload.
    #[error("cursor token payload is malformed: {message}")]
    Malformed {
        /// Underlying deserialisation failure.
        message: String,
    },
}

/// Position of the last document seen in an ordered collection read.
///
/// ## Invariants
/// - `order_key` is the value of the query's order-by field for that
///   document, exactly as the store returned it.
/// - `record_id` identifies the document and breaks ties between equal
///   order keys.
///
/// # Examples
/// ```
/// use pagination::Cursor;
/// use serde_json::json;
///
/// let cursor = Cursor::new(json!({ "seconds": 1, "nanos": 0 }), "rec-1");
/// let token = cursor.encode().expect("encodable");
/// let decoded = Cursor::decode(&token).expect("decodable");
/// assert_eq!(decoded, cursor);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cursor {
    #[serde(rename = "o")]
    order_key: Value,
    #[serde(rename = "id")]
    record_id: String,
}

impl Cursor {
    /// Build a cursor from an order-by key and the record identifier.
    #[must_use]
    pub fn new(order_key: Value, record_id: impl Into<String>) -> Self {
        Self {
            order_key,
            record_id: record_id.into(),
        }
    }

    /// Order-by key of the last document seen.
    #[must_use]
    pub fn order_key(&self) -> &Value {
        &self.order_key
    }

    /// Identifier of the last document seen.
    #[must_use]
    pub fn record_id(&self) -> &str {
        self.record_id.as_str()
    }

    /// Serialise into an opaque URL-safe token.
    pub fn encode(&self) -> Result<String, CursorError> {
        let payload = serde_json::to_vec(self).map_err(|err| CursorError::Encode {
            message: err.to_string(),
        })?;
        Ok(URL_SAFE_NO_PAD.encode(payload))
    }

    /// Parse a token previously produced by [`Cursor::encode`].
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        let payload = URL_SAFE_NO_PAD.decode(token)?;
        serde_json::from_slice(&payload).map_err(|err| CursorError::Malformed {
            message: err.to_string(),
        })
    }
}
