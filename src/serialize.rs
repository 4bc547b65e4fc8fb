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

//! Serialization (C6): the 78-byte BIP-32 binary record, its Base58Check
//! wire form, and WIF export of a bare secret.

use bp_consensus::secp256k1::SecretKey;
use bp_consensus::CompressedPk;

use crate::error::HdError;
use crate::hash::{ChainCode, Fingerprint};
use crate::network::Network;
use crate::xkey::{XPrv, XPub};

/// `version(4) ‖ depth(1) ‖ parent_fp(4) ‖ index(4) ‖ chain_code(32) ‖
/// key_material(33)`.
pub const RECORD_LEN: usize = 78;

/// `encode(xprv) = ver_prv ‖ depth ‖ parent_fp ‖ index ‖ chain_code ‖ 0x00 ‖
/// secret`.
pub fn encode_xprv(xprv: &XPrv, network: Network) -> [u8; RECORD_LEN] {
    let mut out = [0u8; RECORD_LEN];
    out[0..4].copy_from_slice(&network.xprv_version());
    out[4] = xprv.depth;
    out[5..9].copy_from_slice(xprv.parent_fp.as_slice());
    out[9..13].copy_from_slice(&xprv.index.to_be_bytes());
    out[13..45].copy_from_slice(xprv.chain_code.as_slice());
    out[45] = 0x00;
    out[46..78].copy_from_slice(&xprv.secret.secret_bytes());
    out
}

/// `encode(xpub) = ver_pub ‖ depth ‖ parent_fp ‖ index ‖ chain_code ‖
/// serP(point)`.
pub fn encode_xpub(xpub: &XPub, network: Network) -> [u8; RECORD_LEN] {
    let mut out = [0u8; RECORD_LEN];
    out[0..4].copy_from_slice(&network.xpub_version());
    out[4] = xpub.depth;
    out[5..9].copy_from_slice(xpub.parent_fp.as_slice());
    out[9..13].copy_from_slice(&xpub.index.to_be_bytes());
    out[13..45].copy_from_slice(xpub.chain_code.as_slice());
    out[45..78].copy_from_slice(&xpub.point.to_byte_array());
    out
}

fn split_record(data: &[u8]) -> Result<(&[u8; 4], u8, Fingerprint, u32, ChainCode, &[u8]), HdError> {
    if data.len() != RECORD_LEN {
        return Err(HdError::InvalidKeyMaterial);
    }
    let version: &[u8; 4] = data[0..4].try_into().expect("checked length");
    let depth = data[4];
    let parent_fp = Fingerprint::from(<[u8; 4]>::try_from(&data[5..9]).expect("checked length"));
    let index = u32::from_be_bytes(data[9..13].try_into().expect("checked length"));
    let chain_code = ChainCode::from(<[u8; 32]>::try_from(&data[13..45]).expect("checked length"));
    let key_material = &data[45..78];
    Ok((version, depth, parent_fp, index, chain_code, key_material))
}

/// `decode(data) -> xprv`; fails with [`HdError::VersionMismatch`] unless
/// `data`'s version prefix is `network`'s `xprv_version`.
pub fn decode_xprv(data: &[u8], network: Network) -> Result<XPrv, HdError> {
    let (version, depth, parent_fp, index, chain_code, key_material) = split_record(data)?;
    if *version != network.xprv_version() {
        return Err(HdError::VersionMismatch);
    }
    if key_material[0] != 0x00 {
        return Err(HdError::InvalidKeyMaterial);
    }
    let secret = SecretKey::from_slice(&key_material[1..]).map_err(|_| HdError::InvalidKeyMaterial)?;
    Ok(XPrv { depth, parent_fp, index, chain_code, secret })
}

/// `decode(data) -> xpub`; fails with [`HdError::VersionMismatch`] unless
/// `data`'s version prefix is `network`'s `xpub_version`.
pub fn decode_xpub(data: &[u8], network: Network) -> Result<XPub, HdError> {
    let (version, depth, parent_fp, index, chain_code, key_material) = split_record(data)?;
    if *version != network.xpub_version() {
        return Err(HdError::VersionMismatch);
    }
    let point = CompressedPk::from_bytes(key_material)?;
    Ok(XPub { depth, parent_fp, index, chain_code, point })
}

/// Base58Check-encodes the 78-byte record.
pub fn to_base58(record: &[u8; RECORD_LEN]) -> String { bs58::encode(record).with_check().into_string() }

/// Decodes a Base58Check string into its payload bytes, verifying the
/// embedded checksum.
pub fn from_base58(s: &str) -> Result<Vec<u8>, HdError> {
    bs58::decode(s).with_check(None).into_vec().map_err(|_| HdError::Base58Fail)
}

/// `xprv.to_string(net) = base58check(encode(xprv))`.
pub fn xprv_to_string(xprv: &XPrv, network: Network) -> String { to_base58(&encode_xprv(xprv, network)) }

/// `XPrv::from_str(s, net) = decode(base58check_decode(s), net)`.
pub fn xprv_from_str(s: &str, network: Network) -> Result<XPrv, HdError> { decode_xprv(&from_base58(s)?, network) }

/// `xpub.to_string(net) = base58check(encode(xpub))`.
pub fn xpub_to_string(xpub: &XPub, network: Network) -> String { to_base58(&encode_xpub(xpub, network)) }

/// `XPub::from_str(s, net) = decode(base58check_decode(s), net)`.
pub fn xpub_from_str(s: &str, network: Network) -> Result<XPub, HdError> { decode_xpub(&from_base58(s)?, network) }

/// `wif(net, sec, compressed) = base58check(wif_version(net) ‖ sec ‖
/// [0x01 if compressed])`.
pub fn wif_encode(secret: &SecretKey, network: Network, compressed: bool) -> String {
    let mut payload = Vec::with_capacity(34);
    payload.push(network.wif_version());
    payload.extend_from_slice(&secret.secret_bytes());
    if compressed {
        payload.push(0x01);
    }
    bs58::encode(payload).with_check().into_string()
}

/// Inverse of [`wif_encode`]; returns the secret and whether the compressed
/// flag byte was present.
pub fn wif_decode(s: &str, network: Network) -> Result<(SecretKey, bool), HdError> {
    let payload = from_base58(s)?;
    if payload.first() != Some(&network.wif_version()) {
        return Err(HdError::VersionMismatch);
    }
    let (compressed, secret_bytes) = match payload.len() {
        34 if payload[33] == 0x01 => (true, &payload[1..33]),
        33 => (false, &payload[1..33]),
        _ => return Err(HdError::InvalidKeyMaterial),
    };
    let secret = SecretKey::from_slice(secret_bytes).map_err(|_| HdError::InvalidKeyMaterial)?;
    Ok((secret, compressed))
}

#[cfg(test)]
mod tests {
    use amplify::hex::FromHex;
    use bp_consensus::secp256k1;

    use super::*;

    fn seed_vector_1() -> Vec<u8> { <Vec<u8>>::from_hex("000102030405060708090a0b0c0d0e0f").unwrap() }

    fn master() -> XPrv { crate::derive::make_master(&seed_vector_1()).unwrap() }

    #[test]
    fn xprv_round_trips_through_base58() {
        let xprv = master();
        let text = xprv_to_string(&xprv, Network::Mainnet);
        let decoded = xprv_from_str(&text, Network::Mainnet).unwrap();
        assert_eq!(decoded.secret.secret_bytes(), xprv.secret.secret_bytes());
        assert_eq!(decoded.chain_code, xprv.chain_code);
        assert_eq!(decoded.depth, xprv.depth);
    }

    #[test]
    fn xpub_round_trips_through_base58() {
        let xpub = master().to_xpub();
        let text = xpub_to_string(&xpub, Network::Mainnet);
        let decoded = xpub_from_str(&text, Network::Mainnet).unwrap();
        assert_eq!(decoded.point.to_byte_array(), xpub.point.to_byte_array());
    }

    #[test]
    fn master_serializes_to_bip32_test_vector_1() {
        let xprv = master();
        assert_eq!(
            xprv_to_string(&xprv, Network::Mainnet),
            "xprv9s21ZrQH143K3QTDL4LXw2F7HEK3wJUD2nW2nRk4stbPy6cq3jPPqjiChkVvvNKmPGJxWUtg6LnF5kejMRNNU3TGtRBeJgk33yuGBxrMPHi"
        );
    }

    #[test]
    fn version_mismatch_is_detected() {
        let xprv = master();
        let text = xprv_to_string(&xprv, Network::Mainnet);
        assert!(matches!(xprv_from_str(&text, Network::Testnet), Err(HdError::VersionMismatch)));
    }

    #[test]
    fn wif_round_trips() {
        let xprv = master();
        let wif = wif_encode(&xprv.secret, Network::Mainnet, true);
        let (secret, compressed) = wif_decode(&wif, Network::Mainnet).unwrap();
        assert!(compressed);
        assert_eq!(secret.secret_bytes(), xprv.secret.secret_bytes());
        let _ = secp256k1::SECP256K1;
    }
}
