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

//! Derivation engine (C4): master-key generation, single-step child
//! derivation, and path folding.

use bp_consensus::secp256k1::SecretKey;

use crate::error::HdError;
use crate::hash::{hmac_sha512, ChainCode};
use crate::key;
use crate::path::{Any, DerivationPath, PathStep, Soft};
use crate::xkey::{XPrv, XPub};

const SEED_KEY: &[u8] = b"Bitcoin seed";

/// `make_master(seed)`: `I = HMAC-SHA512("Bitcoin seed", seed)`, `I_L` is the
/// master secret, `I_R` the master chain code. `seed` must be 16-64 bytes.
pub fn make_master(seed: &[u8]) -> Result<XPrv, HdError> {
    if seed.len() < 16 || seed.len() > 64 {
        return Err(HdError::InvalidSeed(seed.len()));
    }
    let i = hmac_sha512(SEED_KEY, seed);
    let (il, ir) = i.split_at(32);
    let secret = SecretKey::from_slice(il).map_err(|_| HdError::InvalidSeed(seed.len()))?;
    let chain_code = ChainCode::from(<[u8; 32]>::try_from(ir).expect("HMAC-SHA512 output is 64 bytes"));
    Ok(XPrv::new_master(chain_code, secret))
}

fn ser32(i: u32) -> [u8; 4] { i.to_be_bytes() }

/// `CKDpriv((k_par, c_par), i)`, for both hardened and soft `i`.
pub fn ckd_priv(parent: &XPrv, step: PathStep) -> Result<XPrv, HdError> {
    let depth = parent.depth.checked_add(1).ok_or(HdError::DepthOverflow)?;
    let raw_index = step.raw_index();

    let mut msg = Vec::with_capacity(37);
    if step.is_hardened() {
        msg.push(0x00);
        msg.extend_from_slice(&parent.secret.secret_bytes());
    } else {
        msg.extend_from_slice(&key::generate_pub(&parent.secret).to_byte_array());
    }
    msg.extend_from_slice(&ser32(raw_index));

    let i = hmac_sha512(parent.chain_code.as_slice(), &msg);
    let (il, ir) = i.split_at(32);
    let il: [u8; 32] = il.try_into().expect("HMAC-SHA512 output is 64 bytes");

    let secret = key::tweak_add_sec(&parent.secret, &il).map_err(|_| HdError::InvalidChild(raw_index))?;
    let chain_code = ChainCode::from(<[u8; 32]>::try_from(ir).expect("HMAC-SHA512 output is 64 bytes"));

    Ok(XPrv { depth, parent_fp: parent.fingerprint(), index: raw_index, chain_code, secret })
}

/// `CKDpub((K_par, c_par), i)`, only valid for soft `i`.
pub fn ckd_pub(parent: &XPub, index: u32) -> Result<XPub, HdError> {
    debug_assert!(index <= crate::path::MAX_INDEX);
    let depth = parent.depth.checked_add(1).ok_or(HdError::DepthOverflow)?;

    let mut msg = Vec::with_capacity(37);
    msg.extend_from_slice(&parent.point.to_byte_array());
    msg.extend_from_slice(&ser32(index));

    let i = hmac_sha512(parent.chain_code.as_slice(), &msg);
    let (il, ir) = i.split_at(32);
    let il: [u8; 32] = il.try_into().expect("HMAC-SHA512 output is 64 bytes");

    let point = key::tweak_add_pub(&parent.point, &il).map_err(|_| HdError::InvalidChild(index))?;
    let chain_code = ChainCode::from(<[u8; 32]>::try_from(ir).expect("HMAC-SHA512 output is 64 bytes"));

    Ok(XPub { depth, parent_fp: parent.fingerprint(), index, chain_code, point })
}

/// Single restartable soft-index sequence: `0, 1, …, 0x7fffffff, 0, 1, …`,
/// beginning at `i0`.
pub fn cycle_from(i0: u32) -> impl Iterator<Item = u32> {
    let start = i0.min(crate::path::MAX_INDEX);
    (start..=crate::path::MAX_INDEX).chain(0..start)
}

/// Folds `path` over `xprv`, deriving a hard or soft step as each step
/// dictates.
pub fn derive(path: &DerivationPath<Any>, xprv: &XPrv) -> Result<XPrv, HdError> {
    path.steps().iter().try_fold(*xprv, |acc, &step| ckd_priv(&acc, step))
}

/// Folds `path` over `xpub`; every step must be soft.
pub fn derive_pub(path: &DerivationPath<Soft>, xpub: &XPub) -> Result<XPub, HdError> {
    path.steps().iter().try_fold(*xpub, |acc, &step| ckd_pub(&acc, step.index()))
}

#[cfg(test)]
mod tests {
    use amplify::hex::FromHex;

    use super::*;
    use crate::serialize::encode_xprv;
    use crate::network::Network;

    fn seed_vector_1() -> Vec<u8> { <Vec<u8>>::from_hex("000102030405060708090a0b0c0d0e0f").unwrap() }

    #[test]
    fn master_matches_bip32_test_vector_1() {
        let master = make_master(&seed_vector_1()).unwrap();
        let encoded = bs58::encode(encode_xprv(&master, Network::Mainnet)).with_check().into_string();
        assert_eq!(
            encoded,
            "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
        );
    }

    #[test]
    fn hard_sub_0_matches_bip32_test_vector_1() {
        let master = make_master(&seed_vector_1()).unwrap();
        let child = ckd_priv(&master, PathStep::hard(0).unwrap()).unwrap();
        let encoded = bs58::encode(encode_xprv(&child, Network::Mainnet)).with_check().into_string();
        assert_eq!(
            encoded,
            "xprv9uHRZZhk6KAJC1avXpDAp4MDc3sQKNxDiPvvkX8Br5ngLNv1TxvUxt4cV1rGL5hj6KCesnDYUhd7oWgT11eZG7XnxHrnYeSvkzY7d2bhkJ7"
        );
    }

    #[test]
    fn seed_length_is_checked() {
        assert!(matches!(make_master(&[0u8; 8]), Err(HdError::InvalidSeed(8))));
        assert!(matches!(make_master(&[0u8; 65]), Err(HdError::InvalidSeed(65))));
    }

    #[test]
    fn depth_overflows_at_255() {
        let mut xprv = make_master(&seed_vector_1()).unwrap();
        xprv.depth = 255;
        assert!(matches!(ckd_priv(&xprv, PathStep::soft(0).unwrap()), Err(HdError::DepthOverflow)));
    }

    #[test]
    fn cycle_from_wraps_around() {
        let mut it = cycle_from(crate::path::MAX_INDEX - 1);
        assert_eq!(it.next(), Some(crate::path::MAX_INDEX - 1));
        assert_eq!(it.next(), Some(crate::path::MAX_INDEX));
        assert_eq!(it.next(), Some(0));
        assert_eq!(it.next(), Some(1));
    }

    #[test]
    fn derive_path_matches_stepwise_hard_sub() {
        let master = make_master(&seed_vector_1()).unwrap();
        let path = DerivationPath::<Any>::empty().push_hard(0).unwrap();
        let via_path = derive(&path, &master).unwrap();
        let via_step = ckd_priv(&master, PathStep::hard(0).unwrap()).unwrap();
        assert_eq!(via_path.secret.secret_bytes(), via_step.secret.secret_bytes());
    }
}
