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

//! BIP-32 hierarchical deterministic key derivation, plus BIP-341 Taproot
//! MAST and output-key derivation sitting on top of it.
//!
//! The engine is purely functional: every operation takes the key material
//! and network parameters it needs as arguments, with no global or
//! process-wide state. `bp_consensus` (this workspace's other member) owns
//! the wire-level primitives — script bytes, hash newtypes, Taproot node
//! hashes and control blocks; this crate owns the derivation tree, path
//! algebra, and the address/MAST bookkeeping built on top of them.

#![deny(
    non_upper_case_globals,
    non_camel_case_types,
    non_snake_case,
    unused_mut,
    unused_imports,
    dead_code
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

#[macro_use]
extern crate amplify;

pub extern crate secp256k1;

mod address;
mod derive;
mod error;
mod hash;
mod key;
mod mast;
mod network;
mod path;
mod serialize;
mod xkey;

pub use address::{derive_addr, derive_compat_witness_addr, derive_ms_addr, derive_witness_addr};
pub use derive::{ckd_priv, ckd_pub, cycle_from, derive, derive_pub, make_master};
pub use error::HdError;
pub use hash::{hash160, hmac_sha512, tagged_hash, ChainCode, Fingerprint, XpubIdentifier};
pub use key::{generate_pub, tweak_add_pub, tweak_add_sec, x_only};
pub use mast::{
    encode_taproot_witness, mast_commitment, merkle_proofs, verify_script_path_data, LeafProof, Mast, ScriptPathSpend,
    TaprootOutput,
};
pub use network::Network;
pub use path::{
    apply, concat, Any, DerivationPath, DerivedKey, Hard, KeyRef, ParsedPath, PathMode, PathStep, PathTag, Soft,
    MAX_INDEX,
};
pub use serialize::{
    decode_xprv, decode_xpub, encode_xprv, encode_xpub, from_base58, to_base58, wif_decode, wif_encode,
    xprv_from_str, xprv_to_string, xpub_from_str, xpub_to_string, RECORD_LEN,
};
pub use xkey::{XPrv, XPub};
