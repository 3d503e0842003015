#![cfg_attr(not(feature = "std"), no_std)]
#![allow(non_snake_case)]

//! Anonymous credential "show" proofs for SyRA-style signatures, linked to a Pedersen
//! commitment on an auxiliary curve so that the credential subject can be tied to an
//! externally proven identity-token claim without being revealed.
//!
//! A holder owns a credential `(usk, usk_hat)` issued on a subject identifier `s` under the
//! issuer's key `ivk_hat`. To present it, the holder:
//! 1. commits to `s` on the auxiliary (Grumpkin) curve as `bridge = s*g3 + r*g4`, which an
//!    external circuit backend links to the identity token (module [bridge](./src/bridge.rs)),
//! 2. encrypts `usk` and `usk_hat` ElGamal-style towards the issuer bundle's `W, W_hat` and
//!    derives the pseudonym `T = e(Z, usk_hat)` for the context-bound `Z`
//!    (module [statement](./src/statement.rs)),
//! 3. runs a non-interactive Sigma protocol proving, under a single Fiat-Shamir challenge,
//!    knowledge of the encryption randomness, of `s` and of a valid credential for `s`, and
//!    that the same `s, r` open `bridge` (module [show](./src/show.rs)).
//!
//! The subject scalar and the bridge randomness appear in equations over two groups of
//! different prime order, so their Schnorr responses are carried as unreduced integers
//! (module [scalar](./src/scalar.rs)) and reduced per group only where they multiply a
//! group element.

pub mod bridge;
pub mod error;
pub mod grumpkin;
pub mod scalar;
pub mod setup;
pub mod show;
pub mod statement;
