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

//! Taproot MAST and tweak (C8): tree-shaped bookkeeping built on top of
//! `bp_consensus::taproot`'s node-hash and control-block primitives.

use amplify::ByteArray;
use bp_consensus::{
    ConsensusEncode, ControlBlock, InternalPk, IntoTapHash, LeafScript, LeafVer, OutputPk, Parity, ScriptBytes,
    TapBranchHash, TapLeafHash, TapMerklePath, TapNodeHash,
};

/// A Merkle Abstract Syntax Tree: leaves carry a tapscript, branches carry no
/// data of their own, and `Commitment` carries a precomputed node hash for
/// when only a Merkle proof — not the sibling subtree — is known.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Mast {
    Leaf { leaf_version: LeafVer, script: ScriptBytes },
    Branch(Box<Mast>, Box<Mast>),
    Commitment(TapNodeHash),
}

impl Mast {
    pub fn leaf(leaf_version: LeafVer, script: ScriptBytes) -> Self { Mast::Leaf { leaf_version, script } }

    pub fn branch(left: Mast, right: Mast) -> Self { Mast::Branch(Box::new(left), Box::new(right)) }

    /// `mastCommitment(tree)`: the 32-byte root, recursing through branches
    /// and returning a stored hash directly for `Commitment`.
    pub fn node_hash(&self) -> TapNodeHash {
        match self {
            Mast::Leaf { leaf_version, script } => {
                let leaf_script = LeafScript::new(*leaf_version, script.clone());
                TapLeafHash::with_leaf_script(&leaf_script).into_tap_hash()
            }
            Mast::Branch(left, right) => {
                TapBranchHash::with_nodes(left.node_hash(), right.node_hash()).into_tap_hash()
            }
            Mast::Commitment(hash) => *hash,
        }
    }
}

/// `mastCommitment(tree)`.
pub fn mast_commitment(tree: &Mast) -> TapNodeHash { tree.node_hash() }

/// `TaprootOutput = (internal_key, mast)`: the data a Taproot output
/// commits to. `mast` is `None` for a key-path-only output, in which case
/// the output key is the internal key tweaked with no merkle root at all
/// (BIP-341's `taproot_tweak_pubkey(internal, b"")`).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TaprootOutput {
    pub internal_pk: InternalPk,
    pub mast: Option<Mast>,
}

impl TaprootOutput {
    pub fn new(internal_pk: InternalPk, mast: Option<Mast>) -> Self { TaprootOutput { internal_pk, mast } }

    /// `merkle_root(output)`: `None` for a key-path-only output.
    pub fn merkle_root(&self) -> Option<TapNodeHash> { self.mast.as_ref().map(Mast::node_hash) }

    /// `(output_key, parity) = taproot_tweak_pubkey(internal_key, merkle_root)`.
    pub fn output_key(&self) -> (OutputPk, Parity) { self.internal_pk.to_output_pk(self.merkle_root()) }
}

/// One leaf's script plus the Merkle inclusion proof from that leaf to the
/// tree root, in leaf-to-root order.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct LeafProof {
    pub leaf_version: LeafVer,
    pub script: ScriptBytes,
    pub merkle_branch: TapMerklePath,
}

fn sibling_as_branch_hash(node: TapNodeHash) -> TapBranchHash { TapBranchHash::from(node.to_byte_array()) }

fn collect_proofs(node: &Mast, path_to_root: &mut Vec<TapBranchHash>, out: &mut Vec<LeafProof>) {
    match node {
        Mast::Leaf { leaf_version, script } => {
            let mut branch = path_to_root.clone();
            branch.reverse();
            out.push(LeafProof {
                leaf_version: *leaf_version,
                script: script.clone(),
                merkle_branch: TapMerklePath::try_from(branch).expect("MAST depth bounded by BIP-341's 128 levels"),
            });
        }
        Mast::Branch(left, right) => {
            let left_hash = left.node_hash();
            let right_hash = right.node_hash();

            path_to_root.push(sibling_as_branch_hash(right_hash));
            collect_proofs(left, path_to_root, out);
            path_to_root.pop();

            path_to_root.push(sibling_as_branch_hash(left_hash));
            collect_proofs(right, path_to_root, out);
            path_to_root.pop();
        }
        Mast::Commitment(_) => {}
    }
}

/// `merkleProofs(tree)`: one [`LeafProof`] per leaf reachable in `tree`
/// (leaves hidden behind a `Commitment` are, by construction, not produced).
pub fn merkle_proofs(tree: &Mast) -> Vec<LeafProof> {
    let mut out = Vec::new();
    collect_proofs(tree, &mut Vec::new(), &mut out);
    out
}

/// A script-path spend: the revealed leaf script plus the control block that
/// proves its membership under a Taproot output key.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ScriptPathSpend {
    pub script: ScriptBytes,
    pub control_block: ControlBlock,
}

impl ScriptPathSpend {
    pub fn new(internal_pk: InternalPk, leaf: &LeafProof, output_key_parity: Parity) -> Self {
        ScriptPathSpend {
            script: leaf.script.clone(),
            control_block: ControlBlock::with(leaf.leaf_version, internal_pk, output_key_parity, leaf.merkle_branch.clone()),
        }
    }
}

/// `encodeTaprootWitness(sp)`: `stack ‖ script ‖ control_block ‖ optional
/// annex`, with `stack` supplied by the caller (the script's own witness
/// arguments, e.g. signatures).
pub fn encode_taproot_witness(stack: &[Vec<u8>], sp: &ScriptPathSpend, annex: Option<&[u8]>) -> Vec<Vec<u8>> {
    let mut witness: Vec<Vec<u8>> = stack.to_vec();
    witness.push(sp.script.as_slice().to_vec());

    let mut control_block_bytes = Vec::new();
    sp.control_block
        .consensus_encode(&mut control_block_bytes)
        .expect("writing to a Vec<u8> never fails");
    witness.push(control_block_bytes);

    if let Some(annex) = annex {
        witness.push(annex.to_vec());
    }
    witness
}

/// `verifyScriptPathData(output_key, sp)`: fold the leaf hash of `sp.script`
/// through `sp.control_block.merkle_branch`, sorting lexicographically at
/// every step, and accept iff the recomputed output key and parity match.
pub fn verify_script_path_data(output_key: OutputPk, sp: &ScriptPathSpend) -> bool {
    let leaf_script = LeafScript::new(sp.control_block.leaf_version, sp.script.clone());
    let leaf_hash = TapLeafHash::with_leaf_script(&leaf_script);

    let root: TapNodeHash = sp.control_block.merkle_branch.iter().fold(leaf_hash.into_tap_hash(), |acc, sibling| {
        TapBranchHash::with_nodes(acc, sibling.into_tap_hash()).into_tap_hash()
    });

    let (candidate, parity) = sp.control_block.internal_pk.to_output_pk(Some(root));
    candidate == output_key && parity == sp.control_block.output_key_parity
}

#[cfg(test)]
mod tests {
    use amplify::hex::FromHex;

    use super::*;

    fn script_a() -> ScriptBytes {
        ScriptBytes::from_unsafe(<Vec<u8>>::from_hex("20d85a961973da5e1c33710e4e8e7377d67ff4c3e8ce67b42cfcd9e22c1e67e4bac").unwrap())
    }

    fn script_b() -> ScriptBytes {
        ScriptBytes::from_unsafe(<Vec<u8>>::from_hex("20b9ec6c0f1c56e7ead89f75d28fc0b70216fa72dd703e462151bb8b59d1ab45cac").unwrap())
    }

    fn internal_key() -> InternalPk {
        InternalPk::from_byte_array(
            <[u8; 32]>::from_hex("d6889cb081036e0faefa3a35157ad71086b123b2b144b649798b494c300a961d").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn empty_mast_output_key_matches_bip341_vector() {
        let output = TaprootOutput::new(internal_key(), None);
        assert_eq!(output.merkle_root(), None);
        let (key, _parity) = output.output_key();
        assert_eq!(
            key.to_byte_array().to_vec(),
            <[u8; 32]>::from_hex("53a1f6e454df1aa2776a2814a721372d6258050de330b3c6d10ee8f4e0dda343")
                .unwrap()
                .to_vec()
        );
    }

    #[test]
    fn commitment_variant_returns_hash_directly() {
        let hash = TapNodeHash::from([0x42u8; 32]);
        let tree = Mast::Commitment(hash);
        assert_eq!(mast_commitment(&tree), hash);
    }

    #[test]
    fn two_leaf_tree_round_trips_through_script_path_verification() {
        let tree = Mast::branch(
            Mast::leaf(LeafVer::TapScript, script_a()),
            Mast::leaf(LeafVer::TapScript, script_b()),
        );
        let root = mast_commitment(&tree);
        let internal = internal_key();
        let (output_key, parity) = internal.to_output_pk(Some(root));

        let proofs = merkle_proofs(&tree);
        assert_eq!(proofs.len(), 2);
        for leaf in &proofs {
            assert_eq!(leaf.merkle_branch.len(), 1);
            let sp = ScriptPathSpend::new(internal, leaf, parity);
            assert!(verify_script_path_data(output_key, &sp));
        }
    }

    #[test]
    fn tampered_script_fails_verification() {
        let tree = Mast::branch(
            Mast::leaf(LeafVer::TapScript, script_a()),
            Mast::leaf(LeafVer::TapScript, script_b()),
        );
        let root = mast_commitment(&tree);
        let internal = internal_key();
        let (output_key, parity) = internal.to_output_pk(Some(root));

        let mut leaf = merkle_proofs(&tree).remove(0);
        leaf.script = script_b();
        let sp = ScriptPathSpend::new(internal, &leaf, parity);
        assert!(!verify_script_path_data(output_key, &sp));
    }

    #[test]
    fn encode_taproot_witness_appends_script_then_control_block() {
        let tree = Mast::leaf(LeafVer::TapScript, script_a());
        let root = mast_commitment(&tree);
        let internal = internal_key();
        let (_output_key, parity) = internal.to_output_pk(Some(root));
        let leaf = merkle_proofs(&tree).remove(0);
        let sp = ScriptPathSpend::new(internal, &leaf, parity);

        let witness = encode_taproot_witness(&[vec![0xAA; 64]], &sp, None);
        assert_eq!(witness.len(), 3);
        assert_eq!(witness[0], vec![0xAAu8; 64]);
        assert_eq!(witness[1], script_a().as_slice().to_vec());
    }
}
