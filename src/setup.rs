//! Credential key material.
//!
//! The issuer publishes a five-element verification bundle `(g1, g2, ivk_hat, W, W_hat)` and
//! hands each holder a credential `(usk, usk_hat)` on the holder's subject scalar `s`:
//! `usk = g1 * {1/(sk + s)}`, `usk_hat = g2 * {1/(sk + s)}` where `ivk_hat = g2 * sk`.
//! `W, W_hat` blind the credential inside the show protocol's ciphertexts.
//!
//! On the wire the bundle travels as one concatenated hex string cut at the fixed compressed
//! widths of the five elements, and the holder keys as their own hex strings; this module
//! owns both directions of that encoding plus the issuance request/response shapes.

use crate::{error::SyraBridgeError, scalar::UnreducedScalar};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup};
use ark_ff::{Field, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{rand::RngCore, string::String, vec::Vec, UniformRand};
use digest::Digest;
use dock_crypto_utils::{affine_group_element_from_byte_slices, serde_utils::ArkObjectBytes};
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
    Zeroize, ZeroizeOnDrop,
)]
#[serde(bound = "")]
pub struct IssuerSecretKey<F: PrimeField>(#[serde_as(as = "ArkObjectBytes")] pub F);

impl<F: PrimeField> IssuerSecretKey<F> {
    pub fn new<R: RngCore>(rng: &mut R) -> Self {
        Self(F::rand(rng))
    }
}

/// Issuer's verification key bundle
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
)]
#[serde(bound = "")]
pub struct IssuerVerificationKey<E: Pairing> {
    #[serde_as(as = "ArkObjectBytes")]
    pub g1: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub g2: E::G2Affine,
    /// `g2 * sk`
    #[serde_as(as = "ArkObjectBytes")]
    pub ivk_hat: E::G2Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub W: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub W_hat: E::G2Affine,
}

impl<E: Pairing> IssuerVerificationKey<E> {
    /// Create the bundle with `g1, g2` derived transparently from a public label.
    pub fn new<R: RngCore, D: Digest>(
        rng: &mut R,
        sk: &IssuerSecretKey<E::ScalarField>,
        label: &[u8],
    ) -> Self {
        let g1 = affine_group_element_from_byte_slices!(label, b" : g1");
        let g2: E::G2Affine = affine_group_element_from_byte_slices!(label, b" : g2");
        let ivk_hat = (g2 * sk.0).into_affine();
        let W = E::G1Affine::rand(rng);
        let W_hat = E::G2Affine::rand(rng);
        Self {
            g1,
            g2,
            ivk_hat,
            W,
            W_hat,
        }
    }

    /// Decode from one concatenated hex string, cutting at the compressed widths of
    /// `g1, g2, ivk_hat, W, W_hat` in that order.
    pub fn from_concatenated_hex(ivk_hex: &str) -> Result<Self, SyraBridgeError> {
        if ivk_hex.is_empty() {
            return Err(SyraBridgeError::MissingKeyMaterial);
        }
        let bytes = hex::decode(ivk_hex)?;
        let s1 = E::G1Affine::generator().compressed_size();
        let s2 = E::G2Affine::generator().compressed_size();
        if bytes.len() != 2 * s1 + 3 * s2 {
            return Err(SyraBridgeError::InvalidGroupElement);
        }
        let (g1_bytes, rest) = bytes.split_at(s1);
        let (g2_bytes, rest) = rest.split_at(s2);
        let (ivk_hat_bytes, rest) = rest.split_at(s2);
        let (W_bytes, W_hat_bytes) = rest.split_at(s1);
        let g1 = E::G1Affine::deserialize_compressed(g1_bytes)
            .map_err(|_| SyraBridgeError::InvalidGroupElement)?;
        let g2 = E::G2Affine::deserialize_compressed(g2_bytes)
            .map_err(|_| SyraBridgeError::InvalidGroupElement)?;
        let ivk_hat = E::G2Affine::deserialize_compressed(ivk_hat_bytes)
            .map_err(|_| SyraBridgeError::InvalidGroupElement)?;
        let W = E::G1Affine::deserialize_compressed(W_bytes)
            .map_err(|_| SyraBridgeError::InvalidGroupElement)?;
        let W_hat = E::G2Affine::deserialize_compressed(W_hat_bytes)
            .map_err(|_| SyraBridgeError::InvalidGroupElement)?;
        Ok(Self {
            g1,
            g2,
            ivk_hat,
            W,
            W_hat,
        })
    }

    pub fn to_concatenated_hex(&self) -> Result<String, SyraBridgeError> {
        let mut bytes = Vec::new();
        self.g1.serialize_compressed(&mut bytes)?;
        self.g2.serialize_compressed(&mut bytes)?;
        self.ivk_hat.serialize_compressed(&mut bytes)?;
        self.W.serialize_compressed(&mut bytes)?;
        self.W_hat.serialize_compressed(&mut bytes)?;
        Ok(hex::encode(bytes))
    }
}

/// Holder's credential, a signature on the subject scalar living in both source groups
#[serde_as]
#[derive(
    Clone, PartialEq, Eq, Debug, CanonicalSerialize, CanonicalDeserialize, Serialize, Deserialize,
    Zeroize, ZeroizeOnDrop,
)]
#[serde(bound = "")]
pub struct UserSecretKey<E: Pairing> {
    #[serde_as(as = "ArkObjectBytes")]
    pub usk: E::G1Affine,
    #[serde_as(as = "ArkObjectBytes")]
    pub usk_hat: E::G2Affine,
}

impl<E: Pairing> UserSecretKey<E> {
    /// Issue a credential on `subject`
    pub fn new(
        subject: &UnreducedScalar,
        issuer_sk: &IssuerSecretKey<E::ScalarField>,
        ivk: &IssuerVerificationKey<E>,
    ) -> Self {
        let s = subject.to_field::<E::ScalarField>();
        let k = (issuer_sk.0 + s).inverse().unwrap();
        Self {
            usk: (ivk.g1 * k).into_affine(),
            usk_hat: (ivk.g2 * k).into_affine(),
        }
    }

    /// Check the credential against the issuer bundle:
    /// `e(usk, ivk_hat + g2*s) == e(g1, g2)` and `e(usk, g2) == e(g1, usk_hat)`
    pub fn verify(
        &self,
        subject: &UnreducedScalar,
        ivk: &IssuerVerificationKey<E>,
    ) -> Result<(), SyraBridgeError> {
        let s = subject.to_field::<E::ScalarField>();
        let lifted = (ivk.g2 * s + ivk.ivk_hat).into_affine();
        if E::pairing(self.usk, lifted) != E::pairing(ivk.g1, ivk.g2) {
            return Err(SyraBridgeError::InvalidKeyMaterial);
        }
        if E::pairing(self.usk, ivk.g2) != E::pairing(ivk.g1, self.usk_hat) {
            return Err(SyraBridgeError::InvalidKeyMaterial);
        }
        Ok(())
    }

    pub fn from_hex(usk_hex: &str, usk_hat_hex: &str) -> Result<Self, SyraBridgeError> {
        if usk_hex.is_empty() || usk_hat_hex.is_empty() {
            return Err(SyraBridgeError::MissingKeyMaterial);
        }
        let usk = E::G1Affine::deserialize_compressed(hex::decode(usk_hex)?.as_slice())
            .map_err(|_| SyraBridgeError::InvalidGroupElement)?;
        let usk_hat = E::G2Affine::deserialize_compressed(hex::decode(usk_hat_hex)?.as_slice())
            .map_err(|_| SyraBridgeError::InvalidGroupElement)?;
        Ok(Self { usk, usk_hat })
    }

    pub fn to_hex(&self) -> Result<(String, String), SyraBridgeError> {
        let mut usk = Vec::new();
        self.usk.serialize_compressed(&mut usk)?;
        let mut usk_hat = Vec::new();
        self.usk_hat.serialize_compressed(&mut usk_hat)?;
        Ok((hex::encode(usk), hex::encode(usk_hat)))
    }
}

/// Claims extracted from the identity token that the protocol consumes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub aud: String,
    pub iss: String,
}

impl Claims {
    /// Context bytes binding the show proof to the relying party and token issuer: `aud || iss`
    pub fn context(&self) -> Vec<u8> {
        let mut ctx = Vec::with_capacity(self.aud.len() + self.iss.len());
        ctx.extend_from_slice(self.aud.as_bytes());
        ctx.extend_from_slice(self.iss.as_bytes());
        ctx
    }
}

/// Request to the issuer's administrative key-issuance endpoint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserKeyRequest {
    pub subject_id: String,
    pub key_id: String,
    /// base64 encoding of the identity-token subject proof
    pub proof: String,
}

/// Issuer's response carrying the hex-encoded key material
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserKeyResponse {
    pub ivk: String,
    pub usk: String,
    pub usk_hat: String,
}

impl UserKeyResponse {
    pub fn decode<E: Pairing>(
        &self,
    ) -> Result<(IssuerVerificationKey<E>, UserSecretKey<E>), SyraBridgeError> {
        let ivk = IssuerVerificationKey::from_concatenated_hex(&self.ivk)?;
        let usk = UserSecretKey::from_hex(&self.usk, &self.usk_hat)?;
        Ok((ivk, usk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grumpkin::subject_scalar;
    use ark_bls12_381::Bls12_381;
    use ark_std::rand::{rngs::StdRng, SeedableRng};
    use blake2::Blake2b512;

    #[test]
    fn issue_and_verify_credential() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let isk = IssuerSecretKey::new(&mut rng);
        let ivk = IssuerVerificationKey::<Bls12_381>::new::<_, Blake2b512>(&mut rng, &isk, b"test");

        let subject = UnreducedScalar(subject_scalar("110169484474386276334"));
        let usk = UserSecretKey::new(&subject, &isk, &ivk);
        usk.verify(&subject, &ivk).unwrap();

        let other = UnreducedScalar(subject_scalar("some other subject"));
        assert!(usk.verify(&other, &ivk).is_err());
    }

    #[test]
    fn issuer_bundle_hex_round_trip() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let isk = IssuerSecretKey::new(&mut rng);
        let ivk = IssuerVerificationKey::<Bls12_381>::new::<_, Blake2b512>(&mut rng, &isk, b"test");

        let blob = ivk.to_concatenated_hex().unwrap();
        // 48 + 96 + 96 + 48 + 96 compressed bytes, two hex chars each
        assert_eq!(blob.len(), 2 * (2 * 48 + 3 * 96));
        let decoded = IssuerVerificationKey::<Bls12_381>::from_concatenated_hex(&blob).unwrap();
        assert_eq!(decoded, ivk);
    }

    #[test]
    fn holder_key_hex_round_trip_through_issuance_response() {
        let mut rng = StdRng::seed_from_u64(0u64);
        let isk = IssuerSecretKey::new(&mut rng);
        let ivk = IssuerVerificationKey::<Bls12_381>::new::<_, Blake2b512>(&mut rng, &isk, b"test");
        let subject = UnreducedScalar(subject_scalar("110169484474386276334"));
        let usk = UserSecretKey::new(&subject, &isk, &ivk);

        let (usk_hex, usk_hat_hex) = usk.to_hex().unwrap();
        let response = UserKeyResponse {
            ivk: ivk.to_concatenated_hex().unwrap(),
            usk: usk_hex,
            usk_hat: usk_hat_hex,
        };
        let (decoded_ivk, decoded_usk) = response.decode::<Bls12_381>().unwrap();
        assert_eq!(decoded_ivk, ivk);
        assert_eq!(decoded_usk, usk);
    }

    #[test]
    fn malformed_key_material_is_rejected() {
        assert!(matches!(
            IssuerVerificationKey::<Bls12_381>::from_concatenated_hex(""),
            Err(SyraBridgeError::MissingKeyMaterial)
        ));
        assert!(matches!(
            IssuerVerificationKey::<Bls12_381>::from_concatenated_hex("zz"),
            Err(SyraBridgeError::InvalidHexEncoding)
        ));
        // right hex, wrong length
        assert!(matches!(
            IssuerVerificationKey::<Bls12_381>::from_concatenated_hex("abcd"),
            Err(SyraBridgeError::InvalidGroupElement)
        ));
        // right length, first element not a valid point (x out of range)
        let mut rng = StdRng::seed_from_u64(0u64);
        let isk = IssuerSecretKey::new(&mut rng);
        let ivk = IssuerVerificationKey::<Bls12_381>::new::<_, Blake2b512>(&mut rng, &isk, b"test");
        let blob = ivk.to_concatenated_hex().unwrap();
        let corrupted = "ff".repeat(48) + &blob[96..];
        assert!(matches!(
            IssuerVerificationKey::<Bls12_381>::from_concatenated_hex(&corrupted),
            Err(SyraBridgeError::InvalidGroupElement)
        ));

        assert!(matches!(
            UserSecretKey::<Bls12_381>::from_hex("", ""),
            Err(SyraBridgeError::MissingKeyMaterial)
        ));
    }

    #[test]
    fn claims_context_concatenates_audience_then_issuer() {
        let claims = Claims {
            sub: "110169484474386276334".into(),
            aud: "client-id.example".into(),
            iss: "https://issuer.example".into(),
        };
        assert_eq!(
            claims.context(),
            b"client-id.examplehttps://issuer.example".to_vec()
        );
    }
}
