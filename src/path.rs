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

//! Path algebra (C5): type-tagged derivation paths, their textual grammar,
//! and `apply` against an extended key.

use std::fmt::{self, Display, Formatter};
use std::marker::PhantomData;
use std::str::FromStr;

use crate::derive::{derive, derive_pub};
use crate::error::HdError;
use crate::xkey::{XPrv, XPub};

/// The largest index a single path segment may carry before the hardened
/// bit is considered (BIP-32 restricts each half to 31 bits).
pub const MAX_INDEX: u32 = 0x7FFF_FFFF;

/// A single, untagged derivation step: an index below `2^31` plus whether it
/// is hardened.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct PathStep {
    index: u32,
    hardened: bool,
}

impl PathStep {
    pub fn soft(index: u32) -> Result<Self, HdError> {
        if index > MAX_INDEX {
            return Err(HdError::InvalidPath(format!("soft index {index} is out of range")));
        }
        Ok(PathStep { index, hardened: false })
    }

    pub fn hard(index: u32) -> Result<Self, HdError> {
        if index > MAX_INDEX {
            return Err(HdError::InvalidPath(format!("hard index {index} is out of range")));
        }
        Ok(PathStep { index, hardened: true })
    }

    pub fn index(self) -> u32 { self.index }
    pub fn is_hardened(self) -> bool { self.hardened }

    /// The raw 32-bit value used in the HMAC message, with the hardened bit
    /// set when applicable.
    pub fn raw_index(self) -> u32 { if self.hardened { self.index | 0x8000_0000 } else { self.index } }
}

/// Inverse of the "hard bit 31 set" numeric ordering: at equal index a hard
/// step sorts *greater* than its soft counterpart. See `SPEC_FULL.md` §9.
impl Ord for PathStep {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering { (self.index, self.hardened).cmp(&(other.index, other.hardened)) }
}

impl PartialOrd for PathStep {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> { Some(self.cmp(other)) }
}

impl Display for PathStep {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.index)?;
        if self.hardened {
            f.write_str("'")?;
        }
        Ok(())
    }
}

/// Phantom tag restricting which constructors a [`DerivationPath`] accepts.
pub trait PathTag: Copy + Clone + Eq + std::fmt::Debug {}

/// Only hardened (`:|`) segments are allowed.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Hard;
impl PathTag for Hard {}

/// Only soft (`:/`) segments are allowed.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Soft;
impl PathTag for Soft {}

/// Both hardened and soft segments are allowed.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Any;
impl PathTag for Any {}

/// A finite sequence of derivation steps, tagged by which hardness a
/// constructor may append. The empty path (`Deriv`) is `DerivationPath::<T>::empty()`
/// for every tag `T`.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug)]
pub struct DerivationPath<Tag: PathTag> {
    steps: Vec<PathStep>,
    _tag: PhantomData<Tag>,
}

impl<Tag: PathTag> DerivationPath<Tag> {
    pub fn empty() -> Self { DerivationPath { steps: Vec::new(), _tag: PhantomData } }

    pub fn steps(&self) -> &[PathStep] { &self.steps }

    pub fn len(&self) -> usize { self.steps.len() }
    pub fn is_empty(&self) -> bool { self.steps.is_empty() }

    pub fn contains_hard(&self) -> bool { self.steps.iter().any(|s| s.is_hardened()) }

    /// Widens to `Any`, which accepts either hardness.
    pub fn to_any(&self) -> DerivationPath<Any> { DerivationPath { steps: self.steps.clone(), _tag: PhantomData } }
}

impl DerivationPath<Hard> {
    pub fn push(mut self, index: u32) -> Result<Self, HdError> {
        self.steps.push(PathStep::hard(index)?);
        Ok(self)
    }
}

impl DerivationPath<Soft> {
    pub fn push(mut self, index: u32) -> Result<Self, HdError> {
        self.steps.push(PathStep::soft(index)?);
        Ok(self)
    }
}

impl DerivationPath<Any> {
    pub fn push_hard(mut self, index: u32) -> Result<Self, HdError> {
        self.steps.push(PathStep::hard(index)?);
        Ok(self)
    }

    pub fn push_soft(mut self, index: u32) -> Result<Self, HdError> {
        self.steps.push(PathStep::soft(index)?);
        Ok(self)
    }

    /// Narrows to `Hard`, failing if any step is soft.
    pub fn to_hard(&self) -> Result<DerivationPath<Hard>, HdError> {
        if self.steps.iter().any(|s| !s.is_hardened()) {
            return Err(HdError::InvalidPath("path contains a soft segment, cannot narrow to Hard".into()));
        }
        Ok(DerivationPath { steps: self.steps.clone(), _tag: PhantomData })
    }

    /// Narrows to `Soft`, failing if any step is hard.
    pub fn to_soft(&self) -> Result<DerivationPath<Soft>, HdError> {
        if self.contains_hard() {
            return Err(HdError::InvalidPath("path contains a hard segment, cannot narrow to Soft".into()));
        }
        Ok(DerivationPath { steps: self.steps.clone(), _tag: PhantomData })
    }
}

/// `concat(a,b)`, widening both operands to `Any`.
pub fn concat<T: PathTag, U: PathTag>(a: &DerivationPath<T>, b: &DerivationPath<U>) -> DerivationPath<Any> {
    let mut steps = a.steps.clone();
    steps.extend(b.steps.iter().copied());
    DerivationPath { steps, _tag: PhantomData }
}

impl DerivationPath<Hard> {
    /// `concat` specialized to preserve the `Hard` tag when both operands
    /// are hardened-only.
    pub fn concat_hard(&self, other: &DerivationPath<Hard>) -> DerivationPath<Hard> {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().copied());
        DerivationPath { steps, _tag: PhantomData }
    }
}

impl DerivationPath<Soft> {
    /// `concat` specialized to preserve the `Soft` tag when both operands
    /// are soft-only.
    pub fn concat_soft(&self, other: &DerivationPath<Soft>) -> DerivationPath<Soft> {
        let mut steps = self.steps.clone();
        steps.extend(other.steps.iter().copied());
        DerivationPath { steps, _tag: PhantomData }
    }
}

impl<Tag: PathTag> Display for DerivationPath<Tag> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        for step in &self.steps {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}

fn parse_steps(s: &str) -> Result<Vec<PathStep>, HdError> {
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split('/')
        .map(|segment| {
            if segment.is_empty() {
                return Err(HdError::InvalidPath("empty path segment".into()));
            }
            let (digits, hardened) = match segment.strip_suffix(['\'', 'h', 'H']) {
                Some(rest) => (rest, true),
                None => (segment, false),
            };
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(HdError::InvalidPath(format!("not a decimal index: {segment}")));
            }
            let index: u32 = digits.parse().map_err(|_| HdError::InvalidPath(format!("index out of u32 range: {segment}")))?;
            if index > MAX_INDEX {
                return Err(HdError::InvalidPath(format!("index {index} is not below 2^31")));
            }
            Ok(PathStep { index, hardened })
        })
        .collect()
}

/// Which of `m/`, `M/`, or a bare path prefixed the textual form.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum PathMode {
    /// `m/…`: derive privately.
    Private,
    /// `M/…`: derive privately then project to `XPub` (or derive publicly,
    /// if soft and starting from an `XPub`).
    PublicProject,
    /// No leading marker; interpretation is left to the caller.
    Bare,
}

/// A parsed textual path: its mode plus the (possibly mixed-hardness)
/// sequence of steps.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParsedPath {
    pub mode: PathMode,
    pub path: DerivationPath<Any>,
}

impl FromStr for ParsedPath {
    type Err = HdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (mode, rest) = if let Some(rest) = s.strip_prefix("m/") {
            (PathMode::Private, rest)
        } else if s == "m" {
            (PathMode::Private, "")
        } else if let Some(rest) = s.strip_prefix("M/") {
            (PathMode::PublicProject, rest)
        } else if s == "M" {
            (PathMode::PublicProject, "")
        } else {
            (PathMode::Bare, s.strip_prefix('/').unwrap_or(s))
        };
        let steps = parse_steps(rest)?;
        Ok(ParsedPath { mode, path: DerivationPath { steps, _tag: PhantomData } })
    }
}

impl Display for ParsedPath {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self.mode {
            PathMode::Private => f.write_str("m")?,
            PathMode::PublicProject => f.write_str("M")?,
            PathMode::Bare => {}
        }
        write!(f, "{}", self.path)
    }
}

/// Either half of a BIP-32 key pair, as accepted by [`apply`].
#[derive(Copy, Clone)]
pub enum KeyRef<'a> {
    Prv(&'a XPrv),
    Pub(&'a XPub),
}

/// The key [`apply`] produces: which half depends on `parsed.mode` and
/// which half of [`KeyRef`] was supplied.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DerivedKey {
    Prv(XPrv),
    Pub(XPub),
}

/// `apply(parsed, key)`: derive `parsed.path` from `key`, honoring
/// `parsed.mode`.
///
/// - `m/…` requires a private `key`; derives privately and returns `XPrv`.
/// - `M/…` against an `XPrv` derives privately, then projects to `XPub`.
/// - `M/…` against an `XPub` derives publicly; every segment must be soft,
///   else [`HdError::PathHardnessMismatch`].
/// - A bare path (no leading marker) behaves like `m/…` against an `XPrv`
///   and like `M/…` against an `XPub`, since the caller supplied no
///   explicit mode of its own.
pub fn apply(parsed: &ParsedPath, key: KeyRef) -> Result<DerivedKey, HdError> {
    match (parsed.mode, key) {
        (PathMode::Private, KeyRef::Prv(xprv)) | (PathMode::Bare, KeyRef::Prv(xprv)) => {
            Ok(DerivedKey::Prv(derive(&parsed.path, xprv)?))
        }
        (PathMode::Private, KeyRef::Pub(_)) => {
            Err(HdError::InvalidPath("m/… requires a private key".into()))
        }
        (PathMode::PublicProject, KeyRef::Prv(xprv)) => Ok(DerivedKey::Pub(derive(&parsed.path, xprv)?.to_xpub())),
        (PathMode::PublicProject, KeyRef::Pub(xpub)) | (PathMode::Bare, KeyRef::Pub(xpub)) => {
            let soft = parsed.path.to_soft().map_err(|_| HdError::PathHardnessMismatch)?;
            Ok(DerivedKey::Pub(derive_pub(&soft, xpub)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_parse_matches_spec_example() {
        let parsed: ParsedPath = "m/0'/1/2'/2".parse().unwrap();
        assert_eq!(parsed.mode, PathMode::Private);
        assert_eq!(parsed.path.steps().len(), 4);
        assert!(parsed.path.steps()[0].is_hardened());
        assert!(!parsed.path.steps()[1].is_hardened());
        assert!(parsed.path.steps()[2].is_hardened());
        assert!(!parsed.path.steps()[3].is_hardened());
        assert_eq!(parsed.to_string(), "m/0'/1/2'/2");
    }

    #[test]
    fn path_text_round_trip() {
        for text in ["m/0'/1/2'/2", "M/1/2/3", "1/2/3", "m", ""] {
            let parsed: ParsedPath = text.parse().unwrap();
            let shown = parsed.to_string();
            let reparsed: ParsedPath = shown.parse().unwrap();
            assert_eq!(parsed, reparsed);
        }
    }

    #[test]
    fn accepts_h_suffix_but_prints_apostrophe() {
        let parsed: ParsedPath = "m/0h/1H".parse().unwrap();
        assert!(parsed.path.steps()[0].is_hardened());
        assert!(parsed.path.steps()[1].is_hardened());
        assert_eq!(parsed.to_string(), "m/0'/1'");
    }

    #[test]
    fn rejects_empty_segment_and_out_of_range_index() {
        assert!("m//1".parse::<ParsedPath>().is_err());
        assert!("m/2147483648".parse::<ParsedPath>().is_err());
        assert!("m/abc".parse::<ParsedPath>().is_err());
    }

    #[test]
    fn hard_sorts_after_soft_at_equal_index() {
        let soft = PathStep::soft(5).unwrap();
        let hard = PathStep::hard(5).unwrap();
        assert!(hard > soft);
    }

    #[test]
    fn narrowing_respects_hardness() {
        let any = DerivationPath::<Any>::empty().push_soft(1).unwrap().push_soft(2).unwrap();
        assert!(any.to_soft().is_ok());
        assert!(any.to_hard().is_err());

        let mixed = DerivationPath::<Any>::empty().push_hard(0).unwrap().push_soft(1).unwrap();
        assert!(mixed.to_soft().is_err());
        assert!(mixed.to_hard().is_err());
    }

    #[test]
    fn concat_preserves_tag_when_uniform() {
        let a = DerivationPath::<Soft>::empty().push(1).unwrap();
        let b = DerivationPath::<Soft>::empty().push(2).unwrap();
        let joined = a.concat_soft(&b);
        assert_eq!(joined.len(), 2);

        let any = concat(&a, &DerivationPath::<Hard>::empty().push(3).unwrap());
        assert_eq!(any.len(), 2);
        assert!(any.contains_hard());
    }

    fn master() -> XPrv { crate::derive::make_master(&[0u8; 16]).unwrap() }

    #[test]
    fn apply_private_path_derives_privately() {
        let xprv = master();
        let parsed: ParsedPath = "m/0'/1".parse().unwrap();
        let derived = apply(&parsed, KeyRef::Prv(&xprv)).unwrap();
        let expected = derive(&parsed.path, &xprv).unwrap();
        match derived {
            DerivedKey::Prv(got) => assert_eq!(got.secret.secret_bytes(), expected.secret.secret_bytes()),
            DerivedKey::Pub(_) => panic!("m/… must return a private key"),
        }
    }

    #[test]
    fn apply_public_project_from_xprv_projects_to_xpub() {
        let xprv = master();
        let parsed: ParsedPath = "M/0/1".parse().unwrap();
        let derived = apply(&parsed, KeyRef::Prv(&xprv)).unwrap();
        let expected = derive(&parsed.path, &xprv).unwrap().to_xpub();
        match derived {
            DerivedKey::Pub(got) => assert_eq!(got.point.to_byte_array(), expected.point.to_byte_array()),
            DerivedKey::Prv(_) => panic!("M/… must project to a public key"),
        }
    }

    #[test]
    fn apply_hard_segment_against_xpub_is_path_hardness_mismatch() {
        let xpub = master().to_xpub();
        let parsed: ParsedPath = "M/0'".parse().unwrap();
        assert!(matches!(apply(&parsed, KeyRef::Pub(&xpub)), Err(HdError::PathHardnessMismatch)));
    }

    #[test]
    fn apply_soft_public_project_from_xpub_derives_publicly() {
        let xprv = master();
        let xpub = xprv.to_xpub();
        let parsed: ParsedPath = "M/0/1".parse().unwrap();
        let derived = apply(&parsed, KeyRef::Pub(&xpub)).unwrap();
        let expected = derive_pub(&parsed.path.to_soft().unwrap(), &xpub).unwrap();
        match derived {
            DerivedKey::Pub(got) => assert_eq!(got.point.to_byte_array(), expected.point.to_byte_array()),
            DerivedKey::Prv(_) => panic!("M/… against an XPub must return a public key"),
        }
    }

    #[test]
    fn apply_private_mode_against_xpub_is_rejected() {
        let xpub = master().to_xpub();
        let parsed: ParsedPath = "m/0".parse().unwrap();
        assert!(matches!(apply(&parsed, KeyRef::Pub(&xpub)), Err(HdError::InvalidPath(_))));
    }
}
