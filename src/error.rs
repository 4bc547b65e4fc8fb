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

/// Errors raised throughout extended-key derivation, path handling, and
/// serialization.
#[derive(Clone, Eq, PartialEq, Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum HdError {
    /// seed must be between 16 and 64 bytes, got {0}.
    InvalidSeed(usize),

    /// derivation at index {0} produced an invalid child key; retry at
    /// `{0}+1`.
    InvalidChild(u32),

    /// extended key depth overflowed `u8` during derivation.
    DepthOverflow,

    /// invalid derivation path: {0}.
    InvalidPath(String),

    /// cannot derive `M/…` path with a hardened segment from a public key.
    PathHardnessMismatch,

    /// extended key version bytes do not match the expected network.
    VersionMismatch,

    /// Base58Check decoding failed.
    Base58Fail,

    /// invalid key material in extended key encoding (bad padding, secret
    /// out of range, or public point not on curve).
    InvalidKeyMaterial,

    /// Taproot tweak scalar is out of range (negligible probability
    /// event).
    InvalidTweak,

    #[from]
    #[display(inner)]
    Pubkey(bp_consensus::InvalidPubkey<33>),

    #[from]
    #[display(inner)]
    XonlyPubkey(bp_consensus::InvalidPubkey<32>),

    #[from]
    #[display(inner)]
    Confinement(amplify::confinement::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_is_human_readable() {
        assert_eq!(
            HdError::InvalidSeed(8).to_string(),
            "seed must be between 16 and 64 bytes, got 8."
        );
        assert_eq!(HdError::DepthOverflow.to_string(), "extended key depth overflowed `u8` during derivation.");
        assert_eq!(
            HdError::PathHardnessMismatch.to_string(),
            "cannot derive `M/…` path with a hardened segment from a public key."
        );
    }
}
