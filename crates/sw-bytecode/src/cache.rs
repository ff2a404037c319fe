use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, IntoStaticStr};

use crate::vreg::{RegisterFile, VReg};

/// VM-reserved register purposes. Declaration order is the order in which
/// materialized cache registers receive slots.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum CacheKind {
    NaN,
    Hole,
    Func,
    Infinity,
    Undefined,
    True,
    False,
    Null,
    Symbol,
    Global,
    LexEnv,
}

/// Cache registers a function actually uses. A register exists for a kind
/// only once something asked for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VRegCache {
    entries: BTreeMap<CacheKind, VReg>,
}

impl VRegCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create(&mut self, kind: CacheKind, regs: &mut RegisterFile) -> VReg {
        *self.entries.entry(kind).or_insert_with(|| regs.create())
    }

    pub fn get(&self, kind: CacheKind) -> Option<VReg> {
        self.entries.get(&kind).copied()
    }

    /// Materialized registers in slot-assignment order.
    pub fn materialized(&self) -> impl Iterator<Item = (CacheKind, VReg)> + '_ {
        CacheKind::iter().filter_map(|kind| self.get(kind).map(|reg| (kind, reg)))
    }
}
