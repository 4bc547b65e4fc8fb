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

//! Address and redeem-script derivation (C7): P2PKH, P2WPKH,
//! P2SH-wrapped-P2WPKH, and bare m-of-n P2SH multisig, each folding
//! [`crate::derive::cycle_from`] to find the next usable soft index.

use bp_consensus::{CompressedPk, OpCode, PubkeyHash, PushNum, RedeemScript, ScriptHash, ScriptPubkey, WPubkeyHash};

use crate::derive::{ckd_pub, cycle_from};
use crate::error::HdError;
use crate::network::Network;
use crate::xkey::XPub;

/// Base58Check-encodes a 21-byte `version ‖ hash160` payload, as used by
/// P2PKH and P2SH addresses.
fn base58_address(version: u8, hash: [u8; 20]) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(version);
    payload.extend_from_slice(&hash);
    bs58::encode(payload).with_check().into_string()
}

/// `derive_addr(xpub, net, i0)`: find the first usable soft child starting
/// at `i0` and return its P2PKH address together with the index used.
pub fn derive_addr(xpub: &XPub, network: Network, i0: u32) -> Result<(String, u32), HdError> {
    for index in cycle_from(i0) {
        match ckd_pub(xpub, index) {
            Ok(child) => {
                let hash: [u8; 20] = PubkeyHash::from(child.point).into();
                return Ok((base58_address(network.p2pkh_version(), hash), index));
            }
            Err(HdError::InvalidChild(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    unreachable!("cycle_from exhausts only after 2^31 invalid children, astronomically unlikely")
}

/// `derive_witness_addr`: as [`derive_addr`], but for a bech32-style P2WPKH
/// script (text bech32 encoding is out of scope; the script pubkey and index
/// are returned instead).
pub fn derive_witness_addr(xpub: &XPub, i0: u32) -> Result<(ScriptPubkey, u32), HdError> {
    for index in cycle_from(i0) {
        match ckd_pub(xpub, index) {
            Ok(child) => {
                let hash: [u8; 20] = WPubkeyHash::from(child.point).into();
                return Ok((ScriptPubkey::p2wpkh(hash), index));
            }
            Err(HdError::InvalidChild(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    unreachable!("cycle_from exhausts only after 2^31 invalid children, astronomically unlikely")
}

/// `derive_compat_witness_addr`: P2SH-wrapped P2WPKH, for wallets that want a
/// segwit output reachable from legacy-only senders.
pub fn derive_compat_witness_addr(xpub: &XPub, network: Network, i0: u32) -> Result<(String, u32), HdError> {
    for index in cycle_from(i0) {
        match ckd_pub(xpub, index) {
            Ok(child) => {
                let wpkh_hash: [u8; 20] = WPubkeyHash::from(child.point).into();
                let witness_script = ScriptPubkey::p2wpkh(wpkh_hash);
                let redeem = RedeemScript::from_unsafe(witness_script.as_script_bytes().clone().into_vec());
                let hash: [u8; 20] = ScriptHash::from(&redeem).into();
                return Ok((base58_address(network.p2sh_version(), hash), index));
            }
            Err(HdError::InvalidChild(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    unreachable!("cycle_from exhausts only after 2^31 invalid children, astronomically unlikely")
}

/// `derive_ms_addr(xpubs, m, net, i0)`: derive the same soft index from every
/// cosigner xpub, build the sorted `m`-of-`n` redeem script, and return its
/// P2SH address.
pub fn derive_ms_addr(xpubs: &[XPub], m: u8, network: Network, i0: u32) -> Result<(String, u32), HdError> {
    let n = xpubs.len();
    assert!(m >= 1 && m as usize <= n && n <= 16, "multisig threshold/cosigner count out of bare-script range");

    'outer: for index in cycle_from(i0) {
        let mut points = Vec::with_capacity(n);
        for xpub in xpubs {
            match ckd_pub(xpub, index) {
                Ok(child) => points.push(child.point),
                Err(HdError::InvalidChild(_)) => continue 'outer,
                Err(e) => return Err(e),
            }
        }
        points.sort_by(|a, b| a.to_byte_array().cmp(&b.to_byte_array()));

        let redeem = multisig_redeem_script(m, &points);
        let hash: [u8; 20] = ScriptHash::from(&redeem).into();
        return Ok((base58_address(network.p2sh_version(), hash), index));
    }
    unreachable!("cycle_from exhausts only after 2^31 invalid children, astronomically unlikely")
}

/// Bare `m`-of-`n` multisig redeem script: `OP_m <pk1> … <pkn> OP_n
/// OP_CHECKMULTISIG`, pubkeys already sorted by the caller.
fn multisig_redeem_script(m: u8, points: &[CompressedPk]) -> RedeemScript {
    let n = points.len() as u8;
    let mut script = RedeemScript::with_capacity(3 + points.len() * 34);
    script.push_num(PushNum::new(m).expect("m checked by derive_ms_addr"));
    for point in points {
        script.push_slice(&point.to_byte_array());
    }
    script.push_num(PushNum::new(n).expect("n checked by derive_ms_addr"));
    script.push_opcode(OpCode::CheckMultisig);
    script
}

#[cfg(test)]
mod tests {
    use bp_consensus::secp256k1::SecretKey;

    use super::*;
    use crate::hash::ChainCode;
    use crate::xkey::XPrv;

    fn sample_xpub(byte: u8) -> XPub {
        let mut secret_bytes = [0x11u8; 32];
        secret_bytes[31] = byte;
        let secret = SecretKey::from_slice(&secret_bytes).unwrap();
        let chain_code = ChainCode::from([0x22u8; 32]);
        XPrv::new_master(chain_code, secret).to_xpub()
    }

    #[test]
    fn derive_addr_returns_usable_index() {
        let xpub = sample_xpub(1);
        let (addr, index) = derive_addr(&xpub, Network::Mainnet, 0).unwrap();
        assert_eq!(index, 0);
        assert!(addr.starts_with('1'));
    }

    #[test]
    fn derive_witness_addr_produces_p2wpkh() {
        let xpub = sample_xpub(2);
        let (script, _index) = derive_witness_addr(&xpub, 0).unwrap();
        assert_eq!(script.as_script_bytes().as_slice()[0], 0x00);
        assert_eq!(script.as_script_bytes().as_slice()[1], 0x14);
    }

    #[test]
    fn derive_compat_witness_addr_is_p2sh() {
        let xpub = sample_xpub(6);
        let (addr, _index) = derive_compat_witness_addr(&xpub, Network::Mainnet, 0).unwrap();
        assert!(addr.starts_with('3'));
    }

    #[test]
    fn derive_ms_addr_builds_sorted_2_of_3() {
        let xpubs = vec![sample_xpub(3), sample_xpub(4), sample_xpub(5)];
        let (addr, _index) = derive_ms_addr(&xpubs, 2, Network::Mainnet, 0).unwrap();
        assert!(addr.starts_with('3'));
    }
}
