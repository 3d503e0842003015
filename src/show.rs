//! The show protocol: a non-interactive Sigma protocol over pairing-product equations
//! proving possession of an issuer credential on a hidden subject, bound to an application
//! message and to the bridge commitment on the auxiliary curve.
//!
//! For witness `(alpha, beta, s, r)` and the derived values `omega = beta*s`,
//! `r3 = r2 - alpha*s`, the prover convinces the verifier of (additive notation in the
//! target group, products from [`StatementPairings`]):
//! 1. `C1 = g1*beta` and `C1_hat = g2*alpha`, knowledge of the ciphertext randomness.
//! 2. `e(Z, C2_hat) - T = a*alpha`, the pseudonym `T` matches the encrypted `usk_hat`.
//! 3. `e(C2, g2) + e(-g1, C2_hat) = f*beta + g*alpha`, both ciphertexts hide keys with the
//!    same discrete log.
//! 4. `e(C2, ivk_hat) - e(g1, g2) = i*beta + f*omega + j*s`, the encrypted `usk` is a valid
//!    credential on `s`.
//! 5. `K1 = f*s + g*r1`, `K2 = f*omega + g*r2` and `K2 = e*s + g*r3`, enforcing the
//!    multiplicative relation `omega = beta*s` without revealing either factor.
//! 6. `s*g3 + r*g4 = bridge`, the same `s` opens the bridge commitment.
//!
//! The challenge is derived from a canonical transcript followed by the application message.
//! The transcript order is the verification contract; both sides must write the exact same
//! byte sequence.
//!
//! `s` and `r` are scalars in two groups of different order at once, so their responses are
//! integers ([`UnreducedScalar`]) and every equation reduces them through the scalar
//! multiplication of its own group.

use crate::{
    error::SyraBridgeError,
    grumpkin::{self, point_to_bytes},
    scalar::UnreducedScalar,
    statement::{Statement, Witness},
};
use ark_ec::{
    pairing::{Pairing, PairingOutput},
    AffineRepr, CurveGroup, Group,
};
use ark_ff::{BigInteger, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{io::Write, rand::RngCore, vec::Vec, UniformRand};
use digest::Digest;
use dock_crypto_utils::serde_utils::ArkObjectBytes;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Prover commitments, the first move of the protocol
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct ShowCommitments<E: Pairing> {
    /// `f*s + g*r1`
    #[serde_as(as = "ArkObjectBytes")]
    pub K1: PairingOutput<E>,
    /// `f*omega + g*r2`
    #[serde_as(as = "ArkObjectBytes")]
    pub K2: PairingOutput<E>,
    #[serde_as(as = "ArkObjectBytes")]
    pub t_C1: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub t_C1_hat: E::G2Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub t_B: PairingOutput<E>,
    #[serde_as(as = "ArkObjectBytes")]
    pub t_E: PairingOutput<E>,
    #[serde_as(as = "ArkObjectBytes")]
    pub t_H: PairingOutput<E>,
    #[serde_as(as = "ArkObjectBytes")]
    pub t_K1: PairingOutput<E>,
    #[serde_as(as = "ArkObjectBytes")]
    pub t_K2: PairingOutput<E>,
    #[serde_as(as = "ArkObjectBytes")]
    pub t_K2_product: PairingOutput<E>,
    #[serde_as(as = "ArkObjectBytes")]
    pub t_bridge: grumpkin::Affine,
}

impl<E: Pairing> ShowCommitments<E> {
    /// Write the canonical transcript: statement elements, the commitments, then the bridge,
    /// in this exact order. The application message is appended by the caller.
    pub fn challenge_contribution<W: Write>(
        &self,
        statement: &Statement<E>,
        mut writer: W,
    ) -> Result<(), SyraBridgeError> {
        statement.Z.serialize_compressed(&mut writer)?;
        statement.T.serialize_compressed(&mut writer)?;
        statement.C1.serialize_compressed(&mut writer)?;
        statement.C2.serialize_compressed(&mut writer)?;
        statement.C1_hat.serialize_compressed(&mut writer)?;
        statement.C2_hat.serialize_compressed(&mut writer)?;
        self.K1.serialize_compressed(&mut writer)?;
        self.K2.serialize_compressed(&mut writer)?;
        self.t_C1.serialize_compressed(&mut writer)?;
        self.t_C1_hat.serialize_compressed(&mut writer)?;
        self.t_B.serialize_compressed(&mut writer)?;
        self.t_E.serialize_compressed(&mut writer)?;
        self.t_H.serialize_compressed(&mut writer)?;
        self.t_K1.serialize_compressed(&mut writer)?;
        self.t_K2.serialize_compressed(&mut writer)?;
        self.t_K2_product.serialize_compressed(&mut writer)?;
        writer
            .write_all(&point_to_bytes(&self.t_bridge))
            .map_err(|e| SyraBridgeError::Serialization(e.into()))?;
        writer
            .write_all(&point_to_bytes(&statement.bridge))
            .map_err(|e| SyraBridgeError::Serialization(e.into()))?;
        Ok(())
    }
}

/// Prover session. Created by [`ShowProtocol::init`], consumed exactly once by
/// [`ShowProtocol::gen_proof`]; secrets are wiped on drop.
#[derive(Clone, Debug, Zeroize, ZeroizeOnDrop)]
pub struct ShowProtocol<E: Pairing> {
    #[zeroize(skip)]
    pub statement: Statement<E>,
    #[zeroize(skip)]
    pub comms: ShowCommitments<E>,
    alpha: E::ScalarField,
    beta: E::ScalarField,
    omega: E::ScalarField,
    r1: E::ScalarField,
    r2: E::ScalarField,
    r3: E::ScalarField,
    s: UnreducedScalar,
    r: UnreducedScalar,
    blinding_alpha: E::ScalarField,
    blinding_beta: E::ScalarField,
    blinding_omega: E::ScalarField,
    blinding_r1: E::ScalarField,
    blinding_r2: E::ScalarField,
    blinding_r3: E::ScalarField,
    blinding_s: UnreducedScalar,
    blinding_r: UnreducedScalar,
}

/// Complete non-interactive proof. Self-describing: carries its statement, and verification
/// re-derives the challenge from it.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct ShowProof<E: Pairing> {
    pub statement: Statement<E>,
    pub comms: ShowCommitments<E>,
    #[serde_as(as = "ArkObjectBytes")]
    pub resp_alpha: E::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub resp_beta: E::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub resp_beta_times_s: E::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub resp_r1: E::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub resp_r2: E::ScalarField,
    #[serde_as(as = "ArkObjectBytes")]
    pub resp_r3: E::ScalarField,
    pub resp_s: UnreducedScalar,
    pub resp_r: UnreducedScalar,
}

/// Challenge for a transcript: 64-byte digest output interpreted as a big-endian integer,
/// reduced modulo the order of `F`. Returned as an integer because it also scales
/// auxiliary-curve points.
pub fn compute_random_oracle_challenge<F: PrimeField, D: Digest>(
    challenge_bytes: &[u8],
) -> UnreducedScalar {
    let modulus = BigUint::from_bytes_be(&F::MODULUS.to_bytes_be());
    UnreducedScalar(BigUint::from_bytes_be(&D::digest(challenge_bytes)) % modulus)
}

impl<E: Pairing> ShowProtocol<E> {
    /// Commit phase: derive `omega, r1..r3`, the signature commitments `K1, K2`, sample one
    /// blinding per secret and compute every t-value.
    pub fn init<R: RngCore>(rng: &mut R, statement: Statement<E>, witness: &Witness<E>) -> Self {
        let pairings = statement.pairings();
        let s_field = witness.s.to_field::<E::ScalarField>();

        let r1 = E::ScalarField::rand(rng);
        let r2 = E::ScalarField::rand(rng);
        let r3 = r2 - witness.alpha * s_field;
        let omega = witness.beta * s_field;
        let K1 = pairings.f.mul_bigint(witness.s.limbs()) + pairings.g * r1;
        let K2 = pairings.f * omega + pairings.g * r2;

        let blinding_alpha = E::ScalarField::rand(rng);
        let blinding_beta = E::ScalarField::rand(rng);
        let blinding_omega = E::ScalarField::rand(rng);
        let blinding_r1 = E::ScalarField::rand(rng);
        let blinding_r2 = E::ScalarField::rand(rng);
        let blinding_r3 = E::ScalarField::rand(rng);
        let blinding_s = UnreducedScalar::rand::<E::ScalarField, _>(rng);
        let blinding_r = UnreducedScalar::rand::<grumpkin::Fq, _>(rng);

        let t_C1 = (statement.g1 * blinding_beta).into_affine();
        let t_C1_hat = (statement.g2 * blinding_alpha).into_affine();
        let t_B = pairings.a * blinding_alpha;
        let t_E = pairings.f * blinding_beta + pairings.g * blinding_alpha;
        let f_blinding_omega = pairings.f * blinding_omega;
        let t_H = pairings.i * blinding_beta
            + f_blinding_omega
            + pairings.j.mul_bigint(blinding_s.limbs());
        let t_K1 = pairings.f.mul_bigint(blinding_s.limbs()) + pairings.g * blinding_r1;
        let t_K2 = f_blinding_omega + pairings.g * blinding_r2;
        let t_K2_product = pairings.e.mul_bigint(blinding_s.limbs()) + pairings.g * blinding_r3;
        let t_bridge = (statement.g3.mul_bigint(blinding_s.limbs())
            + statement.g4.mul_bigint(blinding_r.limbs()))
        .into_affine();

        Self {
            statement,
            comms: ShowCommitments {
                K1,
                K2,
                t_C1,
                t_C1_hat,
                t_B,
                t_E,
                t_H,
                t_K1,
                t_K2,
                t_K2_product,
                t_bridge,
            },
            alpha: witness.alpha,
            beta: witness.beta,
            omega,
            r1,
            r2,
            r3,
            s: witness.s.clone(),
            r: witness.r.clone(),
            blinding_alpha,
            blinding_beta,
            blinding_omega,
            blinding_r1,
            blinding_r2,
            blinding_r3,
            blinding_s,
            blinding_r,
        }
    }

    pub fn challenge_contribution<W: Write>(&self, writer: W) -> Result<(), SyraBridgeError> {
        self.comms.challenge_contribution(&self.statement, writer)
    }

    /// Response phase: `blinding + c*secret` per secret, over the integers for `s` and `r`.
    pub fn gen_proof(self, challenge: &UnreducedScalar) -> ShowProof<E> {
        let c = challenge.to_field::<E::ScalarField>();
        ShowProof {
            statement: self.statement.clone(),
            comms: self.comms.clone(),
            resp_alpha: self.blinding_alpha + self.alpha * c,
            resp_beta: self.blinding_beta + self.beta * c,
            resp_beta_times_s: self.blinding_omega + self.omega * c,
            resp_r1: self.blinding_r1 + self.r1 * c,
            resp_r2: self.blinding_r2 + self.r2 * c,
            resp_r3: self.blinding_r3 + self.r3 * c,
            resp_s: UnreducedScalar::response(&self.blinding_s, challenge, &self.s),
            resp_r: UnreducedScalar::response(&self.blinding_r, challenge, &self.r),
        }
    }

    /// One-shot prover: commit, derive the challenge from the canonical transcript and the
    /// application message, respond.
    pub fn prove<R: RngCore, D: Digest>(
        rng: &mut R,
        statement: Statement<E>,
        witness: &Witness<E>,
    ) -> Result<ShowProof<E>, SyraBridgeError> {
        let protocol = Self::init(rng, statement, witness);
        let mut chal_bytes = Vec::new();
        protocol.challenge_contribution(&mut chal_bytes)?;
        chal_bytes.extend_from_slice(&protocol.statement.m);
        let challenge = compute_random_oracle_challenge::<E::ScalarField, D>(&chal_bytes);
        Ok(protocol.gen_proof(&challenge))
    }
}

impl<E: Pairing> ShowProof<E> {
    pub fn challenge_contribution<W: Write>(&self, writer: W) -> Result<(), SyraBridgeError> {
        self.comms.challenge_contribution(&self.statement, writer)
    }

    /// Verify the proof against its own statement, re-deriving the challenge.
    pub fn verify<D: Digest>(&self) -> Result<(), SyraBridgeError> {
        let mut chal_bytes = Vec::new();
        self.challenge_contribution(&mut chal_bytes)?;
        chal_bytes.extend_from_slice(&self.statement.m);
        let challenge = compute_random_oracle_challenge::<E::ScalarField, D>(&chal_bytes);
        self.verify_with_challenge(&challenge)
    }

    /// Check the two group equations, the six pairing-product equations and the
    /// auxiliary-curve equation, each of the shape `public*response - original*challenge ==
    /// t-value`. Short-circuits on the first mismatch and reports nothing about which
    /// equation failed.
    pub fn verify_with_challenge(
        &self,
        challenge: &UnreducedScalar,
    ) -> Result<(), SyraBridgeError> {
        let s = &self.statement;
        let p = s.pairings();
        // `e(Z, C2_hat) - T` and `e(C2, ivk_hat) - e(g1, g2)`, only the verifier needs these
        let b = E::pairing(s.Z, s.C2_hat) - s.T;
        let h = E::pairing(s.C2, s.ivk_hat) - E::pairing(s.g1, s.g2);
        let c = challenge.to_field::<E::ScalarField>();

        let mut expected = s.g1 * self.resp_beta;
        expected -= s.C1 * c;
        if expected.into_affine() != self.comms.t_C1 {
            return Err(SyraBridgeError::InvalidProof);
        }

        let mut expected = s.g2 * self.resp_alpha;
        expected -= s.C1_hat * c;
        if expected.into_affine() != self.comms.t_C1_hat {
            return Err(SyraBridgeError::InvalidProof);
        }

        if p.a * self.resp_alpha - b * c != self.comms.t_B {
            return Err(SyraBridgeError::InvalidProof);
        }

        if p.f * self.resp_beta + p.g * self.resp_alpha - p.e * c != self.comms.t_E {
            return Err(SyraBridgeError::InvalidProof);
        }

        let f_resp_omega = p.f * self.resp_beta_times_s;
        if p.i * self.resp_beta + f_resp_omega + p.j.mul_bigint(self.resp_s.limbs()) - h * c
            != self.comms.t_H
        {
            return Err(SyraBridgeError::InvalidProof);
        }

        if p.f.mul_bigint(self.resp_s.limbs()) + p.g * self.resp_r1 - self.comms.K1 * c
            != self.comms.t_K1
        {
            return Err(SyraBridgeError::InvalidProof);
        }

        let K2_c = self.comms.K2 * c;
        if f_resp_omega + p.g * self.resp_r2 - K2_c != self.comms.t_K2 {
            return Err(SyraBridgeError::InvalidProof);
        }

        if p.e.mul_bigint(self.resp_s.limbs()) + p.g * self.resp_r3 - K2_c
            != self.comms.t_K2_product
        {
            return Err(SyraBridgeError::InvalidProof);
        }

        let lhs = s.g3.mul_bigint(self.resp_s.limbs()) + s.g4.mul_bigint(self.resp_r.limbs());
        let rhs = s.bridge.mul_bigint(challenge.limbs()) + self.comms.t_bridge;
        if lhs != rhs {
            return Err(SyraBridgeError::InvalidProof);
        }

        Ok(())
    }
}
