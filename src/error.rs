use ark_serialize::SerializationError;

#[derive(Debug)]
pub enum SyraBridgeError {
    /// Required issuer or holder key material absent or empty
    MissingKeyMaterial,
    InvalidHexEncoding,
    /// A decoded byte string did not parse as a valid group element
    InvalidGroupElement,
    /// Key material that parsed but does not satisfy the credential relations
    InvalidKeyMaterial,
    /// An auxiliary-curve point encoding was not canonical or not on the curve
    InvalidPointEncoding,
    /// Claim string longer than the fixed buffer reserved by the circuit interface, `(length, capacity)`
    ClaimTooLong(usize, usize),
    /// The supplied bridge point does not open to the witness `(s, r)`
    BridgeMismatch,
    InvalidProof,
    Serialization(SerializationError),
}

impl From<SerializationError> for SyraBridgeError {
    fn from(e: SerializationError) -> Self {
        Self::Serialization(e)
    }
}

impl From<hex::FromHexError> for SyraBridgeError {
    fn from(_: hex::FromHexError) -> Self {
        Self::InvalidHexEncoding
    }
}
