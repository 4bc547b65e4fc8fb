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

//! Hash adapter (C2): HMAC-SHA512, SHA-256, RIPEMD-160, and BIP-340 tagged
//! hashing, used by the derivation engine and the extended-key identifier.

use amplify::{Bytes, Bytes20, Bytes32, ByteArray, Wrapper};
use commit_verify::{DigestExt, Ripemd160, Sha256};
use hmac::{Hmac, Mac};
use sha2::Sha512;

/// 32-byte chain-code mixed into every child derivation.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Index, RangeOps, AsSlice, BorrowSlice, Hex, Display, FromStr)]
pub struct ChainCode(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

/// First 4 bytes of an extended-key identifier.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, From)]
#[wrapper(Index, RangeOps, AsSlice, BorrowSlice, Hex, Display, FromStr)]
pub struct Fingerprint(
    #[from]
    #[from([u8; 4])]
    Bytes<4>,
);

/// `RIPEMD160(SHA256(serialize_compressed(pt)))` — identifier of an
/// extended public key.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Index, RangeOps, BorrowSlice, Hex, Display, FromStr)]
pub struct XpubIdentifier(
    #[from]
    #[from([u8; 20])]
    Bytes20,
);

impl XpubIdentifier {
    pub fn fingerprint(&self) -> Fingerprint {
        let mut fp = [0u8; 4];
        fp.copy_from_slice(&self.to_byte_array()[..4]);
        Fingerprint::from(fp)
    }
}

/// `id(xpub) = RIPEMD160(SHA256(ser_P(point)))`.
pub fn hash160(compressed_pubkey: &[u8; 33]) -> XpubIdentifier {
    let mut sha = Sha256::default();
    sha.input_raw(compressed_pubkey);
    let mut ripe = Ripemd160::default();
    ripe.input_raw(&sha.finish());
    XpubIdentifier::from(ripe.finish())
}

/// `I = HMAC-SHA512(key, msg)`, split by the caller into `I_L ‖ I_R`.
pub fn hmac_sha512(key: &[u8], msg: &[u8]) -> [u8; 64] {
    let mut mac = Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(msg);
    let result = mac.finalize().into_bytes();
    let mut out = [0u8; 64];
    out.copy_from_slice(&result);
    out
}

/// `H_tag(x) = SHA256(SHA256(tag) ‖ SHA256(tag) ‖ x)`.
pub fn tagged_hash(tag: &[u8], msg: &[u8]) -> [u8; 32] {
    let mut engine = Sha256::from_tag(tag);
    engine.input_raw(msg);
    engine.finish()
}

#[cfg(test)]
mod tests {
    use amplify::hex::FromHex;

    use super::*;

    #[test]
    fn hmac_sha512_is_deterministic_and_full_width() {
        let seed = <Vec<u8>>::from_hex("000102030405060708090a0b0c0d0e0f").unwrap();
        let i1 = hmac_sha512(b"Bitcoin seed", &seed);
        let i2 = hmac_sha512(b"Bitcoin seed", &seed);
        assert_eq!(i1, i2);
        assert_eq!(i1.len(), 64);
        // Changing the key changes the output.
        assert_ne!(i1, hmac_sha512(b"other key", &seed));
    }

    #[test]
    fn tagged_hash_matches_midstate_definition() {
        let direct = tagged_hash(b"TapLeaf", b"hello");
        let mut via_sha = Sha256::default();
        via_sha.input_raw(&{
            let mut e = Sha256::default();
            e.input_raw(b"TapLeaf");
            e.finish()
        });
        via_sha.input_raw(&{
            let mut e = Sha256::default();
            e.input_raw(b"TapLeaf");
            e.finish()
        });
        via_sha.input_raw(b"hello");
        assert_eq!(direct, via_sha.finish());
    }
}
