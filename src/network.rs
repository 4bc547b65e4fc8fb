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

//! Network parameters threaded explicitly into serialization and address
//! derivation — never read from global/process state.

/// The network an extended key is serialized for. Carries only the version
/// prefixes BIP-32 serialization and WIF export need; chain-magic bytes,
/// P2P port numbers and the rest of a full chain-parameter table are out of
/// scope for this engine.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Display)]
#[display(lowercase)]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    /// `ext_prv_prefix(net)`.
    pub const fn xprv_version(self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0x04, 0x88, 0xAD, 0xE4],
            Network::Testnet => [0x04, 0x35, 0x83, 0x94],
        }
    }

    /// `ext_pub_prefix(net)`.
    pub const fn xpub_version(self) -> [u8; 4] {
        match self {
            Network::Mainnet => [0x04, 0x88, 0xB2, 0x1E],
            Network::Testnet => [0x04, 0x35, 0x87, 0xCF],
        }
    }

    /// WIF version byte used by `wif(net, sec, compressed)`.
    pub const fn wif_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x80,
            Network::Testnet => 0xEF,
        }
    }

    /// P2PKH address version byte, used by `derive_addr`.
    pub const fn p2pkh_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x00,
            Network::Testnet => 0x6F,
        }
    }

    /// P2SH address version byte, used by `derive_compat_witness_addr` and
    /// `derive_ms_addr`.
    pub const fn p2sh_version(self) -> u8 {
        match self {
            Network::Mainnet => 0x05,
            Network::Testnet => 0xC4,
        }
    }

    pub fn from_xprv_version(version: [u8; 4]) -> Option<Self> {
        match version {
            v if v == Self::Mainnet.xprv_version() => Some(Self::Mainnet),
            v if v == Self::Testnet.xprv_version() => Some(Self::Testnet),
            _ => None,
        }
    }

    pub fn from_xpub_version(version: [u8; 4]) -> Option<Self> {
        match version {
            v if v == Self::Mainnet.xpub_version() => Some(Self::Mainnet),
            v if v == Self::Testnet.xpub_version() => Some(Self::Testnet),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_prefixes_round_trip() {
        assert_eq!(Network::from_xprv_version(Network::Mainnet.xprv_version()), Some(Network::Mainnet));
        assert_eq!(Network::from_xpub_version(Network::Mainnet.xpub_version()), Some(Network::Mainnet));
    }

    #[test]
    fn unknown_version_is_none() {
        assert_eq!(Network::from_xprv_version([0, 0, 0, 0]), None);
    }
}
