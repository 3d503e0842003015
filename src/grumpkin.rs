//! The Grumpkin curve `y^2 = x^3 - 17`, defined over the scalar field of BN254 so that its
//! own scalar field is the BN254 base field. This is the curve the external bridging circuit
//! operates on natively, and the curve carrying the bridge commitment.
//!
//! Also implements the fixed-width point codec and the deterministic derivations shared with
//! the circuit side: hashing a seed to a point and turning a subject claim into a scalar.

use crate::{error::SyraBridgeError, scalar::coerce_zero_to_one};
use ark_ec::{
    models::CurveConfig,
    short_weierstrass::{self as sw, SWCurveConfig},
    AffineRepr, CurveGroup,
};
use ark_ff::{
    fields::{Fp256, MontBackend, MontConfig},
    BigInteger, Field, MontFp, PrimeField,
};
use digest::Digest;
use num_bigint::BigUint;

#[derive(MontConfig)]
#[modulus = "21888242871839275222246405745257275088548364400416034343698204186575808495617"]
#[generator = "5"]
pub struct FqConfig;
pub type Fq = Fp256<MontBackend<FqConfig, 4>>;

#[derive(MontConfig)]
#[modulus = "21888242871839275222246405745257275088696311157297823662689037894645226208583"]
#[generator = "3"]
pub struct FrConfig;
pub type Fr = Fp256<MontBackend<FrConfig, 4>>;

pub type Affine = sw::Affine<Config>;
pub type Projective = sw::Projective<Config>;

#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct Config;

impl CurveConfig for Config {
    type BaseField = Fq;
    type ScalarField = Fr;

    /// COFACTOR = 1
    const COFACTOR: &'static [u64] = &[0x1];

    /// COFACTOR_INV = COFACTOR^{-1} mod r = 1
    const COFACTOR_INV: Fr = Fr::ONE;
}

impl SWCurveConfig for Config {
    /// COEFF_A = 0
    const COEFF_A: Fq = Fq::ZERO;

    /// COEFF_B = -17
    const COEFF_B: Fq =
        MontFp!("21888242871839275222246405745257275088548364400416034343698204186575808495600");

    /// GENERATOR = (G_GENERATOR_X, G_GENERATOR_Y)
    const GENERATOR: Affine = Affine::new_unchecked(G_GENERATOR_X, G_GENERATOR_Y);
}

/// G_GENERATOR_X = 1
pub const G_GENERATOR_X: Fq = MontFp!("1");

/// G_GENERATOR_Y = sqrt(-16) mod p
pub const G_GENERATOR_Y: Fq =
    MontFp!("17631683881184975370165255887551781615748388533673675138860");

/// Big-endian `x || y`, 32 bytes each. The point at infinity is all zero bytes.
pub const POINT_SERIALIZED_SIZE: usize = 64;

/// Serialize a point in the fixed-width encoding shared with the circuit side.
pub fn point_to_bytes(p: &Affine) -> [u8; POINT_SERIALIZED_SIZE] {
    let mut out = [0u8; POINT_SERIALIZED_SIZE];
    if p.infinity {
        return out;
    }
    out[..32].copy_from_slice(&p.x.into_bigint().to_bytes_be());
    out[32..].copy_from_slice(&p.y.into_bigint().to_bytes_be());
    out
}

/// Deserialize the fixed-width encoding. Rejects wrong lengths, non-canonical (`>= p`)
/// coordinates and points not on the curve.
pub fn point_from_bytes(bytes: &[u8]) -> Result<Affine, SyraBridgeError> {
    if bytes.len() != POINT_SERIALIZED_SIZE {
        return Err(SyraBridgeError::InvalidPointEncoding);
    }
    if bytes.iter().all(|b| *b == 0) {
        return Ok(Affine::identity());
    }
    let modulus = BigUint::from_bytes_be(&Fq::MODULUS.to_bytes_be());
    let x_int = BigUint::from_bytes_be(&bytes[..32]);
    let y_int = BigUint::from_bytes_be(&bytes[32..]);
    if x_int >= modulus || y_int >= modulus {
        return Err(SyraBridgeError::InvalidPointEncoding);
    }
    let p = Affine::new_unchecked(
        Fq::from_be_bytes_mod_order(&bytes[..32]),
        Fq::from_be_bytes_mod_order(&bytes[32..]),
    );
    if !p.is_on_curve() {
        return Err(SyraBridgeError::InvalidPointEncoding);
    }
    Ok(p)
}

/// Hash a seed to a scalar and multiply the fixed generator by it. The hash output is taken
/// as a big-endian integer mod the base prime, with 0 coerced to 1.
pub fn point_from_seed<D: Digest>(seed: &[u8]) -> Affine {
    let digest = D::digest(seed);
    let modulus = BigUint::from_bytes_be(&Fq::MODULUS.to_bytes_be());
    let k = coerce_zero_to_one(BigUint::from_bytes_be(&digest) % modulus);
    Affine::generator().mul_bigint(k.to_u64_digits()).into_affine()
}

/// Derive the subject scalar from a claim string: its UTF-8 bytes read as one big-endian
/// integer, with 0 coerced to 1. The integer is not reduced; claim strings are expected to
/// stay below the buffer width enforced at the circuit interface.
pub fn subject_scalar(claim: &str) -> BigUint {
    coerce_zero_to_one(BigUint::from_bytes_be(claim.as_bytes()))
}
