//! Opaque proxy transaction identifiers.
//!
//! A prepared send is answered by one particular broker, and the later
//! end-transaction call must reach the same node. [`TransactionId`] binds the
//! broker address to the broker-issued reference and serializes the pair into
//! a single token that callers treat as opaque.
//!
//! The token is the uppercase hex rendering of:
//!
//! ```text
//! +---------+--------------+---------------+-------------+
//! | version | addr length  | addr (UTF-8)  | broker ref  |
//! | u8      | u16 BE       | n bytes       | u64 BE      |
//! +---------+--------------+---------------+-------------+
//! ```
//!
//! The length prefix keeps the encoding injective: no two distinct
//! `(address, reference)` pairs share a token.

use std::{fmt, str::FromStr};

use bytes::{Buf, BufMut, BytesMut};

const FORMAT_VERSION: u8 = 1;
const HEADER_LEN: usize = 1 + 2;
const REF_LEN: usize = 8;

/// Errors raised while building or decoding a [`TransactionId`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum TransactionIdError {
    /// The broker address was empty.
    #[error("broker address must not be empty")]
    EmptyAddress,
    /// The broker address does not fit the length prefix.
    #[error("broker address is {0} bytes, exceeding the {max} byte limit", max = u16::MAX)]
    AddressTooLong(usize),
    /// The token is not valid hex.
    #[error("transaction id is not valid hex")]
    InvalidHex(#[from] hex::FromHexError),
    /// The token was produced by an unknown encoder version.
    #[error("unsupported transaction id version {0}")]
    UnsupportedVersion(u8),
    /// The token ended before all fields were read.
    #[error("transaction id truncated")]
    Truncated,
    /// The embedded address is not UTF-8.
    #[error("broker address is not valid UTF-8")]
    InvalidAddress,
    /// Bytes remained after the last field.
    #[error("{0} trailing bytes after transaction id")]
    TrailingBytes(usize),
}

/// Broker address paired with the broker-issued transaction reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransactionId {
    broker_addr: String,
    broker_ref: u64,
}

impl TransactionId {
    /// Pair `broker_addr` with `broker_ref`.
    ///
    /// # Errors
    ///
    /// Returns [`TransactionIdError::EmptyAddress`] for an empty address and
    /// [`TransactionIdError::AddressTooLong`] if it exceeds `u16::MAX` bytes.
    pub fn new(broker_addr: impl Into<String>, broker_ref: u64) -> Result<Self, TransactionIdError> {
        let broker_addr = broker_addr.into();
        if broker_addr.is_empty() {
            return Err(TransactionIdError::EmptyAddress);
        }
        if u16::try_from(broker_addr.len()).is_err() {
            return Err(TransactionIdError::AddressTooLong(broker_addr.len()));
        }
        Ok(Self {
            broker_addr,
            broker_ref,
        })
    }

    /// Address of the broker holding the prepared message.
    #[must_use]
    pub fn broker_addr(&self) -> &str { &self.broker_addr }

    /// Reference issued by the broker for the prepared message.
    #[must_use]
    pub fn broker_ref(&self) -> u64 { self.broker_ref }

    /// Split into `(broker_addr, broker_ref)`.
    #[must_use]
    pub fn into_parts(self) -> (String, u64) { (self.broker_addr, self.broker_ref) }

    /// Serialize into the opaque proxy token.
    ///
    /// # Examples
    ///
    /// ```
    /// use mqforward::TransactionId;
    ///
    /// let id = TransactionId::new("10.0.0.5:10911", 77).expect("valid address");
    /// let token = id.encode();
    /// let decoded = TransactionId::decode(&token).expect("token decodes");
    /// assert_eq!(decoded.into_parts(), ("10.0.0.5:10911".to_owned(), 77));
    /// ```
    #[must_use]
    pub fn encode(&self) -> String {
        let addr = self.broker_addr.as_bytes();
        let mut buf = BytesMut::with_capacity(HEADER_LEN + addr.len() + REF_LEN);
        buf.put_u8(FORMAT_VERSION);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "address length validated against u16::MAX on construction"
        )]
        buf.put_u16(addr.len() as u16);
        buf.put_slice(addr);
        buf.put_u64(self.broker_ref);
        hex::encode_upper(buf)
    }

    /// Parse a token produced by [`Self::encode`].
    ///
    /// # Errors
    ///
    /// Returns a [`TransactionIdError`] describing why the token is malformed.
    pub fn decode(token: &str) -> Result<Self, TransactionIdError> {
        let raw = hex::decode(token)?;
        let mut buf = raw.as_slice();

        let version = take_u8(&mut buf)?;
        if version != FORMAT_VERSION {
            return Err(TransactionIdError::UnsupportedVersion(version));
        }
        let addr_len = usize::from(take_u16(&mut buf)?);
        if buf.remaining() < addr_len {
            return Err(TransactionIdError::Truncated);
        }
        let addr = std::str::from_utf8(&buf[..addr_len])
            .map_err(|_| TransactionIdError::InvalidAddress)?
            .to_owned();
        buf.advance(addr_len);
        let broker_ref = take_u64(&mut buf)?;
        if buf.has_remaining() {
            return Err(TransactionIdError::TrailingBytes(buf.remaining()));
        }
        Self::new(addr, broker_ref)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.encode()) }
}

impl FromStr for TransactionId {
    type Err = TransactionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Self::decode(s) }
}

fn take_u8(buf: &mut &[u8]) -> Result<u8, TransactionIdError> {
    buf.try_get_u8().map_err(|_| TransactionIdError::Truncated)
}

fn take_u16(buf: &mut &[u8]) -> Result<u16, TransactionIdError> {
    buf.try_get_u16().map_err(|_| TransactionIdError::Truncated)
}

fn take_u64(buf: &mut &[u8]) -> Result<u64, TransactionIdError> {
    buf.try_get_u64().map_err(|_| TransactionIdError::Truncated)
}
