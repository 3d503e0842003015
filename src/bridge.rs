//! The bridge commitment `bridge = s*g3 + r*g4` on the auxiliary curve.
//!
//! The commitment is consumed twice: the external circuit backend proves that the committed
//! `s` equals the subject claim inside the identity token, and the show protocol proves that
//! the same `s` sits inside the credential being presented. Both sides derive the generators
//! from the same fixed domain tags.
//!
//! Also shapes the witness-input maps handed to the external proving backends. Numeric values
//! crossing that boundary are decimal strings, claim strings are fixed-size zero-padded
//! buffers with an explicit length.

use crate::{
    error::SyraBridgeError,
    grumpkin::{point_from_seed, subject_scalar, Affine},
    scalar::{coerce_zero_to_one, UnreducedScalar},
};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{BigInteger, PrimeField};
use ark_std::{
    rand::RngCore,
    string::{String, ToString},
    vec::Vec,
};
use digest::Digest;
use dock_crypto_utils::commitment::PedersenCommitmentKey;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const G3_SEED: &[u8] = b"BN254-Pedersen-G3";
pub const G4_SEED: &[u8] = b"BN254-Pedersen-G4";

/// Claim buffer width fixed by the circuit interface.
pub const CLAIM_BUFFER_SIZE: usize = 100;

/// The two commitment generators, derived deterministically from the domain tags.
pub fn commitment_key<D: Digest>() -> PedersenCommitmentKey<Affine> {
    PedersenCommitmentKey {
        g: point_from_seed::<D>(G3_SEED),
        h: point_from_seed::<D>(G4_SEED),
    }
}

/// Opening `(s, r)` of a bridge commitment. `s` is derived from the subject claim, `r` is
/// fresh randomness; both are also part of the show protocol's witness.
#[derive(Clone, Debug, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BridgeOpening {
    pub s: UnreducedScalar,
    pub r: UnreducedScalar,
}

impl BridgeOpening {
    /// Derive `s` from the subject claim and sample fresh `r` below the base prime.
    pub fn new<R: RngCore>(rng: &mut R, subject_claim: &str) -> Self {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        let modulus = BigUint::from_bytes_be(&crate::grumpkin::Fq::MODULUS.to_bytes_be());
        let r = coerce_zero_to_one(BigUint::from_bytes_be(&bytes) % modulus);
        Self {
            s: UnreducedScalar(subject_scalar(subject_claim)),
            r: UnreducedScalar(r),
        }
    }

    pub fn from_parts(s: UnreducedScalar, r: UnreducedScalar) -> Self {
        Self { s, r }
    }

    /// `s * g3 + r * g4`
    pub fn commit(&self, comm_key: &PedersenCommitmentKey<Affine>) -> Affine {
        (comm_key.g.mul_bigint(self.s.limbs()) + comm_key.h.mul_bigint(self.r.limbs()))
            .into_affine()
    }
}

/// An affine point in the encoding the external proving backend expects: decimal coordinate
/// strings and an explicit infinity flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitPoint {
    pub x: String,
    pub y: String,
    pub is_infinite: bool,
}

impl From<&Affine> for CircuitPoint {
    fn from(p: &Affine) -> Self {
        if p.infinity {
            return Self {
                x: "0".to_string(),
                y: "0".to_string(),
                is_infinite: true,
            };
        }
        Self {
            x: BigUint::from_bytes_be(&p.x.into_bigint().to_bytes_be()).to_string(),
            y: BigUint::from_bytes_be(&p.y.into_bigint().to_bytes_be()).to_string(),
            is_infinite: false,
        }
    }
}

/// A claim string packed into the circuit's fixed-size zero-padded buffer, with the original
/// byte length carried alongside.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaddedClaim {
    pub storage: Vec<u8>,
    pub len: usize,
}

impl PaddedClaim {
    pub fn new(claim: &str) -> Result<Self, SyraBridgeError> {
        let bytes = claim.as_bytes();
        if bytes.len() > CLAIM_BUFFER_SIZE {
            return Err(SyraBridgeError::ClaimTooLong(bytes.len(), CLAIM_BUFFER_SIZE));
        }
        let mut storage = ark_std::vec![0u8; CLAIM_BUFFER_SIZE];
        storage[..bytes.len()].copy_from_slice(bytes);
        Ok(Self {
            storage,
            len: bytes.len(),
        })
    }
}

/// Witness-input map for the external bridging circuit. Field names match the circuit's
/// signal names. The identity-token inputs are produced by the token-proving library and
/// merged by the caller; this carries only the bridge-side signals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeCircuitInput {
    pub g3: CircuitPoint,
    pub g4: CircuitPoint,
    pub bridge: CircuitPoint,
    pub domain: PaddedClaim,
    pub issuer: PaddedClaim,
    pub current_time: String,
    pub r: String,
}

impl BridgeCircuitInput {
    pub fn new(
        comm_key: &PedersenCommitmentKey<Affine>,
        bridge: &Affine,
        opening: &BridgeOpening,
        audience: &str,
        issuer: &str,
        current_time: u64,
    ) -> Result<Self, SyraBridgeError> {
        Ok(Self {
            g3: CircuitPoint::from(&comm_key.g),
            g4: CircuitPoint::from(&comm_key.h),
            bridge: CircuitPoint::from(bridge),
            domain: PaddedClaim::new(audience)?,
            issuer: PaddedClaim::new(issuer)?,
            current_time: current_time.to_string(),
            r: opening.r.to_string(),
        })
    }
}

/// Extra named signals appended to the identity-token circuit's witness map: where the
/// subject key starts in the token payload and the expected subject value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectCircuitInput {
    pub sub_key_start_index: String,
    pub sub_statement: String,
}

impl SubjectCircuitInput {
    pub fn new(sub_key_start_index: usize, subject: &str) -> Self {
        Self {
            sub_key_start_index: sub_key_start_index.to_string(),
            sub_statement: subject.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grumpkin::Fr;
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use sha2::Sha256;

    #[test]
    fn generators_are_distinct_and_deterministic() {
        let key = commitment_key::<Sha256>();
        let again = commitment_key::<Sha256>();
        assert_eq!(key.g, again.g);
        assert_eq!(key.h, again.h);
        assert_ne!(key.g, key.h);
    }

    #[test]
    fn fixed_opening_reproduces_commitment() {
        // the commitment to (12345, 67890) must agree with an independent evaluation of
        // s*g3 + r*g4 through the field-scalar commit path
        let comm_key = commitment_key::<Sha256>();
        let opening = BridgeOpening::from_parts(
            UnreducedScalar::from(12345u64),
            UnreducedScalar::from(67890u64),
        );
        let bridge = opening.commit(&comm_key);
        let expected = comm_key.commit(&Fr::from(12345u64), &Fr::from(67890u64));
        assert_eq!(bridge, expected);
        assert!(bridge.is_on_curve());
    }

    #[test]
    fn sampled_opening_commits_to_subject() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let comm_key = commitment_key::<Sha256>();
        let opening = BridgeOpening::new(&mut rng, "110169484474386276334");
        assert_eq!(
            opening.s,
            UnreducedScalar(subject_scalar("110169484474386276334"))
        );

        // different randomness hides the same subject under different commitments
        let other = BridgeOpening::new(&mut rng, "110169484474386276334");
        assert_ne!(opening.commit(&comm_key), other.commit(&comm_key));
    }

    #[test]
    fn claim_packing() {
        let packed = PaddedClaim::new("accounts.example.com").unwrap();
        assert_eq!(packed.storage.len(), CLAIM_BUFFER_SIZE);
        assert_eq!(packed.len, 20);
        assert_eq!(&packed.storage[..20], b"accounts.example.com");
        assert!(packed.storage[20..].iter().all(|b| *b == 0));

        let long = "x".repeat(CLAIM_BUFFER_SIZE + 1);
        assert!(matches!(
            PaddedClaim::new(&long),
            Err(SyraBridgeError::ClaimTooLong(101, CLAIM_BUFFER_SIZE))
        ));
    }

    #[test]
    fn circuit_input_serializes_with_decimal_strings() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let comm_key = commitment_key::<Sha256>();
        let opening = BridgeOpening::new(&mut rng, "12345");
        let bridge = opening.commit(&comm_key);
        let input = BridgeCircuitInput::new(
            &comm_key,
            &bridge,
            &opening,
            "client-id.example",
            "https://issuer.example",
            1_700_000_000,
        )
        .unwrap();

        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["current_time"], "1700000000");
        assert_eq!(json["r"], opening.r.to_string());
        assert_eq!(json["bridge"]["is_infinite"], false);
        // coordinates are decimal, not hex
        assert!(json["bridge"]["x"]
            .as_str()
            .unwrap()
            .chars()
            .all(|c| c.is_ascii_digit()));

        let sub_input = SubjectCircuitInput::new(21, "110169484474386276334");
        let json = serde_json::to_value(&sub_input).unwrap();
        assert_eq!(json["subKeyStartIndex"], "21");
        assert_eq!(json["subStatement"], "110169484474386276334");
    }
}
