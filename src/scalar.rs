//! Scalars that participate in equations over groups of different prime order.
//!
//! The subject scalar `s` and the bridge randomness `r` are committed on the auxiliary curve
//! and simultaneously used as pairing exponents; the two groups have different orders, so a
//! Schnorr response `blinding + c*secret` reduced into either order stops verifying in the
//! other. Responses are therefore computed and transported as plain big integers and reduced
//! only where they scalar-multiply a group element, which factors through that group's order.

use ark_ff::{BigInteger, PrimeField};
use ark_serialize::{
    CanonicalDeserialize, CanonicalSerialize, Compress, SerializationError, Valid, Validate,
};
use ark_std::{
    fmt,
    io::{Read, Write},
    rand::RngCore,
    string::String,
    vec::Vec,
};
use core::str::FromStr;
use num_bigint::BigUint;
use zeroize::Zeroize;

/// A non-negative integer scalar that is never reduced into a single field.
///
/// Serializes through serde as a decimal string so that arbitrary-precision values survive
/// JSON round-trips without loss.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct UnreducedScalar(pub BigUint);

impl UnreducedScalar {
    /// Sample uniformly below the order of `F`.
    pub fn rand<F: PrimeField, R: RngCore>(rng: &mut R) -> Self {
        Self::from_field(&F::rand(rng))
    }

    pub fn from_field<F: PrimeField>(f: &F) -> Self {
        Self(BigUint::from_bytes_be(&f.into_bigint().to_bytes_be()))
    }

    /// Reduce into `F`.
    pub fn to_field<F: PrimeField>(&self) -> F {
        F::from_be_bytes_mod_order(&self.0.to_bytes_be())
    }

    /// Little-endian 64-bit limbs, the form group scalar multiplication accepts.
    pub fn limbs(&self) -> Vec<u64> {
        self.0.to_u64_digits()
    }

    /// `blinding + challenge * secret` over the integers.
    pub fn response(blinding: &Self, challenge: &Self, secret: &Self) -> Self {
        Self(&blinding.0 + &challenge.0 * &secret.0)
    }
}

/// Substitute 1 for 0. Applied to derived subject scalars and sampled randomness, where a
/// zero would degenerate the commitment; the degenerate case maps to a fixed public value
/// instead of triggering a resample.
pub fn coerce_zero_to_one(n: BigUint) -> BigUint {
    if n.bits() == 0 {
        BigUint::from(1u8)
    } else {
        n
    }
}

impl fmt::Display for UnreducedScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UnreducedScalar {
    type Err = num_bigint::ParseBigIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(BigUint::from_str(s)?))
    }
}

impl From<u64> for UnreducedScalar {
    fn from(n: u64) -> Self {
        Self(BigUint::from(n))
    }
}

impl Zeroize for UnreducedScalar {
    fn zeroize(&mut self) {
        self.0 = BigUint::from(0u8);
    }
}

impl CanonicalSerialize for UnreducedScalar {
    fn serialize_with_mode<W: Write>(
        &self,
        writer: W,
        compress: Compress,
    ) -> Result<(), SerializationError> {
        self.0.to_bytes_be().serialize_with_mode(writer, compress)
    }

    fn serialized_size(&self, compress: Compress) -> usize {
        self.0.to_bytes_be().serialized_size(compress)
    }
}

impl Valid for UnreducedScalar {
    fn check(&self) -> Result<(), SerializationError> {
        Ok(())
    }
}

impl CanonicalDeserialize for UnreducedScalar {
    fn deserialize_with_mode<R: Read>(
        reader: R,
        compress: Compress,
        validate: Validate,
    ) -> Result<Self, SerializationError> {
        let bytes = Vec::<u8>::deserialize_with_mode(reader, compress, validate)?;
        Ok(Self(BigUint::from_bytes_be(&bytes)))
    }
}

impl serde::Serialize for UnreducedScalar {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for UnreducedScalar {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(serde::de::Error::custom)
    }
}
