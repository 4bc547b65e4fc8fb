// BIP-32 HD key engine and BIP-341 Taproot derivation library.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2019-2024 by
//     Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2019-2024 LNP/BP Standards Association. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Key primitives adapter (C1): thin semantic wrapper over `secp256k1`
//! operations used by the derivation engine. `bp-consensus` already owns key
//! *storage* types (`CompressedPk`, `XOnlyPk`); this module owns the tweak
//! arithmetic the engine folds over them.

use bp_consensus::secp256k1::{self, PublicKey, Scalar, SecretKey};
use bp_consensus::CompressedPk;

use crate::error::HdError;

/// `generate_pub(sec) = sec·G`.
pub fn generate_pub(secret: &SecretKey) -> CompressedPk { CompressedPk::from_secret_key(secp256k1::SECP256K1, secret) }

/// `tweak_add_sec(sec, t) = sec + t mod n`, `None` if the result is zero.
pub fn tweak_add_sec(secret: &SecretKey, tweak: &[u8; 32]) -> Result<SecretKey, HdError> {
    let scalar = Scalar::from_be_bytes(*tweak).map_err(|_| HdError::InvalidTweak)?;
    secret.add_tweak(&scalar).map_err(|_| HdError::InvalidTweak)
}

/// `tweak_add_pub(pt, t) = pt + t·G`, fails if the resulting point is the
/// identity.
pub fn tweak_add_pub(point: &CompressedPk, tweak: &[u8; 32]) -> Result<CompressedPk, HdError> {
    let scalar = Scalar::from_be_bytes(*tweak).map_err(|_| HdError::InvalidTweak)?;
    let tweaked: PublicKey = point.add_exp_tweak(secp256k1::SECP256K1, &scalar).map_err(|_| HdError::InvalidTweak)?;
    Ok(CompressedPk::from(tweaked))
}

/// BIP-340 X-only projection `x(pt)`, returning the 32-byte X coordinate and
/// the parity of `pt`'s Y coordinate.
pub fn x_only(point: &CompressedPk) -> ([u8; 32], bp_consensus::Parity) {
    let (xonly, parity) = point.x_only_public_key();
    (xonly.serialize(), parity.into())
}

#[cfg(test)]
mod tests {
    use amplify::hex::FromHex;

    use super::*;

    #[test]
    fn generate_pub_matches_secp256k1() {
        let sk_bytes = <[u8; 32]>::from_hex("e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b3").unwrap();
        let sk = SecretKey::from_slice(&sk_bytes).unwrap();
        let pk = generate_pub(&sk);
        let expected = PublicKey::from_secret_key(secp256k1::SECP256K1, &sk);
        assert_eq!(pk.to_byte_array(), expected.serialize());
    }

    #[test]
    fn tweak_add_sec_is_additive() {
        let sk_bytes = <[u8; 32]>::from_hex("e8f32e723decf4051aefac8e2c93c9c5b214313817cdb01a1494b917c8436b3").unwrap();
        let sk = SecretKey::from_slice(&sk_bytes).unwrap();
        let tweak = [0u8; 31]
            .iter()
            .copied()
            .chain(std::iter::once(7u8))
            .collect::<Vec<_>>();
        let tweak: [u8; 32] = tweak.try_into().unwrap();
        let tweaked = tweak_add_sec(&sk, &tweak).unwrap();
        assert_ne!(tweaked.secret_bytes(), sk.secret_bytes());
    }
}
