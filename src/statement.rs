//! The public statement and private witness of one presentation, validated together at
//! construction: the bridge point must open to the witness `(s, r)`, so a statement can
//! never silently commit to a different subject than the one inside the credential
//! ciphertexts.

use crate::{
    bridge::BridgeOpening,
    error::SyraBridgeError,
    grumpkin,
    scalar::UnreducedScalar,
    setup::{Claims, IssuerVerificationKey, UserSecretKey},
};
use ark_ec::{
    pairing::{Pairing, PairingOutput},
    AffineRepr,
};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{ops::Neg, rand::RngCore, vec::Vec};
use digest::Digest;
use dock_crypto_utils::{
    commitment::PedersenCommitmentKey, elgamal::Ciphertext,
    hashing_utils::affine_group_elem_from_try_and_incr, serde_utils::ArkObjectBytes,
};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Public algebraic description of one show proof. Built once, immutable afterwards.
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct Statement<E: Pairing> {
    /// Context hashed to the curve
    #[serde_as(as = "ArkObjectBytes")]
    pub Z: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub g1: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub g2: E::G2Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub ivk_hat: E::G2Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub W: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub W_hat: E::G2Affine,
    /// `g1 * beta`
    #[serde_as(as = "ArkObjectBytes")]
    pub C1: E::G1Affine,
    /// `W * beta + usk`
    #[serde_as(as = "ArkObjectBytes")]
    pub C2: E::G1Affine,
    /// `g2 * alpha`
    #[serde_as(as = "ArkObjectBytes")]
    pub C1_hat: E::G2Affine,
    /// `W_hat * alpha + usk_hat`
    #[serde_as(as = "ArkObjectBytes")]
    pub C2_hat: E::G2Affine,
    /// Pseudonym `T = e(Z, usk_hat)`
    #[serde_as(as = "ArkObjectBytes")]
    pub T: PairingOutput<E>,
    #[serde_as(as = "ArkObjectBytes")]
    pub g3: grumpkin::Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub g4: grumpkin::Affine,
    /// `s * g3 + r * g4`
    #[serde_as(as = "ArkObjectBytes")]
    pub bridge: grumpkin::Affine,
    /// `aud || iss`
    pub ctx: Vec<u8>,
    /// Application message the proof is bound to
    pub m: Vec<u8>,
}

/// Prover's secrets. Lives only while a proof is being built.
#[derive(Clone, PartialEq, Eq, Debug, Zeroize, ZeroizeOnDrop)]
pub struct Witness<E: Pairing> {
    pub alpha: E::ScalarField,
    pub beta: E::ScalarField,
    /// Subject scalar, also opening the bridge
    pub s: UnreducedScalar,
    /// Bridge randomness
    pub r: UnreducedScalar,
}

/// Pairing products both sides recompute from the statement
#[derive(Clone, Debug)]
pub struct StatementPairings<E: Pairing> {
    /// `e(Z, W_hat)`
    pub a: PairingOutput<E>,
    /// `e(C2, g2) + e(-g1, C2_hat)`
    pub e: PairingOutput<E>,
    /// `e(W, g2)`
    pub f: PairingOutput<E>,
    /// `e(-g1, W_hat)`
    pub g: PairingOutput<E>,
    /// `e(W, ivk_hat)`
    pub i: PairingOutput<E>,
    /// `e(C2, -g2)`
    pub j: PairingOutput<E>,
}

impl<E: Pairing> Statement<E> {
    /// Assemble the statement and witness for one presentation.
    ///
    /// Samples fresh `alpha, beta`, derives `Z` from the claim context, encrypts the holder
    /// keys towards `W, W_hat` and checks that `bridge` opens to the supplied `(s, r)`.
    pub fn new<R: RngCore, D: Digest>(
        rng: &mut R,
        ivk: &IssuerVerificationKey<E>,
        user_sk: &UserSecretKey<E>,
        claims: &Claims,
        message: &[u8],
        comm_key: &PedersenCommitmentKey<grumpkin::Affine>,
        opening: &BridgeOpening,
        bridge: grumpkin::Affine,
    ) -> Result<(Self, Witness<E>), SyraBridgeError> {
        if opening.commit(comm_key) != bridge {
            return Err(SyraBridgeError::BridgeMismatch);
        }
        let ctx = claims.context();
        let Z = affine_group_elem_from_try_and_incr::<E::G1Affine, D>(&ctx);
        let T = E::pairing(Z, user_sk.usk_hat);
        let (ct, beta) = Ciphertext::new(rng, &user_sk.usk, &ivk.W, &ivk.g1);
        let (ct_hat, alpha) = Ciphertext::new(rng, &user_sk.usk_hat, &ivk.W_hat, &ivk.g2);
        let statement = Self {
            Z,
            g1: ivk.g1,
            g2: ivk.g2,
            ivk_hat: ivk.ivk_hat,
            W: ivk.W,
            W_hat: ivk.W_hat,
            C1: ct.eph_pk,
            C2: ct.encrypted,
            C1_hat: ct_hat.eph_pk,
            C2_hat: ct_hat.encrypted,
            T,
            g3: comm_key.g,
            g4: comm_key.h,
            bridge,
            ctx,
            m: message.to_vec(),
        };
        let witness = Witness {
            alpha,
            beta,
            s: opening.s.clone(),
            r: opening.r.clone(),
        };
        Ok((statement, witness))
    }

    pub fn pairings(&self) -> StatementPairings<E> {
        let minus_g1: E::G1Affine = self.g1.into_group().neg().into();
        let minus_g2: E::G2Affine = self.g2.into_group().neg().into();
        StatementPairings {
            a: E::pairing(self.Z, self.W_hat),
            e: E::multi_pairing([self.C2, minus_g1], [self.g2, self.C2_hat]),
            f: E::pairing(self.W, self.g2),
            g: E::pairing(minus_g1, self.W_hat),
            i: E::pairing(self.W, self.ivk_hat),
            j: E::pairing(self.C2, minus_g2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bridge::{commitment_key, BridgeOpening},
        grumpkin::subject_scalar,
        setup::IssuerSecretKey,
    };
    use ark_bls12_381::Bls12_381;
    use ark_ec::CurveGroup;
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use blake2::Blake2b512;
    use sha2::Sha256;

    fn issuer_and_holder(
        rng: &mut StdRng,
        claims: &Claims,
    ) -> (
        IssuerVerificationKey<Bls12_381>,
        crate::setup::UserSecretKey<Bls12_381>,
    ) {
        let isk = IssuerSecretKey::new(rng);
        let ivk = IssuerVerificationKey::<Bls12_381>::new::<_, Blake2b512>(rng, &isk, b"test");
        let subject = UnreducedScalar(subject_scalar(&claims.sub));
        let usk = crate::setup::UserSecretKey::new(&subject, &isk, &ivk);
        (ivk, usk)
    }

    fn claims() -> Claims {
        Claims {
            sub: "110169484474386276334".into(),
            aud: "client-id.example".into(),
            iss: "https://issuer.example".into(),
        }
    }

    #[test]
    fn statement_assembly() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let claims = claims();
        let (ivk, usk) = issuer_and_holder(&mut rng, &claims);
        let comm_key = commitment_key::<Sha256>();
        let opening = BridgeOpening::new(&mut rng, &claims.sub);
        let bridge = opening.commit(&comm_key);

        let (statement, witness) = Statement::new::<_, Blake2b512>(
            &mut rng,
            &ivk,
            &usk,
            &claims,
            b"test-message",
            &comm_key,
            &opening,
            bridge,
        )
        .unwrap();

        assert_eq!(statement.ctx, claims.context());
        assert_eq!(statement.m, b"test-message".to_vec());
        assert_eq!(statement.T, Bls12_381::pairing(statement.Z, usk.usk_hat));

        // the ciphertexts open to the holder keys under the sampled randomness
        assert_eq!(statement.C1, (statement.g1 * witness.beta).into_affine());
        assert_eq!(
            statement.C2,
            (statement.W * witness.beta + usk.usk).into_affine()
        );
        assert_eq!(statement.C1_hat, (statement.g2 * witness.alpha).into_affine());
        assert_eq!(
            statement.C2_hat,
            (statement.W_hat * witness.alpha + usk.usk_hat).into_affine()
        );
        assert_eq!(witness.s, opening.s);
        assert_eq!(witness.r, opening.r);
    }

    #[test]
    fn statement_rejects_inconsistent_bridge() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let claims = claims();
        let (ivk, usk) = issuer_and_holder(&mut rng, &claims);
        let comm_key = commitment_key::<Sha256>();
        let opening = BridgeOpening::new(&mut rng, &claims.sub);
        let other_opening = BridgeOpening::new(&mut rng, &claims.sub);
        let wrong_bridge = other_opening.commit(&comm_key);

        assert!(matches!(
            Statement::new::<_, Blake2b512>(
                &mut rng,
                &ivk,
                &usk,
                &claims,
                b"test-message",
                &comm_key,
                &opening,
                wrong_bridge,
            ),
            Err(SyraBridgeError::BridgeMismatch)
        ));
    }

    #[test]
    fn statement_serialization_round_trip() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let claims = claims();
        let (ivk, usk) = issuer_and_holder(&mut rng, &claims);
        let comm_key = commitment_key::<Sha256>();
        let opening = BridgeOpening::new(&mut rng, &claims.sub);
        let bridge = opening.commit(&comm_key);
        let (statement, _) = Statement::new::<_, Blake2b512>(
            &mut rng,
            &ivk,
            &usk,
            &claims,
            b"test-message",
            &comm_key,
            &opening,
            bridge,
        )
        .unwrap();

        let mut bytes = ark_std::vec![];
        statement.serialize_compressed(&mut bytes).unwrap();
        let back = Statement::<Bls12_381>::deserialize_compressed(&bytes[..]).unwrap();
        assert_eq!(back, statement);

        let json = serde_json::to_string(&statement).unwrap();
        let back: Statement<Bls12_381> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, statement);
    }
}
