// Bitcoin protocol consensus library.
//
// SPDX-License-Identifier: Apache-2.0
//
// Written in 2019-2023 by
//     Dr Maxim Orlovsky <orlovsky@lnp-bp.org>
//
// Copyright (C) 2019-2023 LNP/BP Standards Association. All rights reserved.
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

// Coding conventions
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

extern crate core;
/// Re-export of `secp256k1` crate.
pub extern crate secp256k1;

pub mod opcodes;
mod script;
mod segwit;
mod taproot;
mod hashtypes;
mod pubkeys;
mod coding;

pub use coding::{
    ByteStr, ConsensusDataError, ConsensusDecode, ConsensusDecodeError, ConsensusEncode, LenVarInt, VarInt,
    VarIntArray, VarIntBytes,
};
pub use hashtypes::{PubkeyHash, ScriptHash, WPubkeyHash};
pub use pubkeys::{CompressedPk, InvalidPubkey, PubkeyParseError};
pub use script::{OpCode, PushNum, RedeemScript, ScriptBytes, ScriptPubkey};
pub use segwit::{SegwitError, Witness, WitnessProgram, WitnessVer};
pub use taproot::{
    Annex, AnnexError, ControlBlock, FutureLeafVer, InternalKeypair, InternalPk, IntoTapHash, InvalidLeafVer,
    InvalidParityValue, LeafScript, LeafVer, OutputPk, Parity, TapBranchHash, TapCode, TapLeafHash, TapMerklePath,
    TapNodeHash, TapScript, XOnlyPk, TAPROOT_ANNEX_PREFIX, TAPROOT_LEAF_MASK, TAPROOT_LEAF_TAPSCRIPT,
};

pub const LIB_NAME_BITCOIN: &str = "Bitcoin";
