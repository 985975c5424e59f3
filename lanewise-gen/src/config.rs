// This module holds the generator configuration. The only knob is the set of tiers for which
// accelerated variants are emitted. It comes from the LANEWISE_TIERS environment variable,
// which accepts `all` (the default), `none`, or a comma-separated list of tier names, and can
// be narrowed to the tiers that exist on a target architecture. Names are matched exactly
// after trimming; an unknown name is a configuration error rather than being ignored.

//! Generator configuration (`LANEWISE_TIERS`).

use std::env;
use std::fmt;

use crate::error::{GenError, GenResult};
use crate::types::Tier;

/// Environment variable selecting the emitted tiers.
pub const TIERS_ENV: &str = "LANEWISE_TIERS";

/// A set of tiers, one bit per [`Tier::index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TierSet(u8);

impl TierSet {
    pub const fn none() -> Self {
        TierSet(0)
    }

    pub const fn all() -> Self {
        TierSet((1 << Tier::COUNT) - 1)
    }

    pub fn with(self, tier: Tier) -> Self {
        TierSet(self.0 | (1 << tier.index()))
    }

    pub fn without(self, tier: Tier) -> Self {
        TierSet(self.0 & !(1 << tier.index()))
    }

    pub fn contains(self, tier: Tier) -> bool {
        self.0 & (1 << tier.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Tier> {
        Tier::ALL.into_iter().filter(move |&tier| self.contains(tier))
    }

    /// Parse `all`, `none`, or a comma-separated list such as `sse2,avx2`.
    pub fn parse(list: &str) -> GenResult<Self> {
        match list.trim() {
            "" | "all" => return Ok(Self::all()),
            "none" => return Ok(Self::none()),
            _ => {}
        }

        let mut set = Self::none();
        for name in list.split(',').map(str::trim).filter(|name| !name.is_empty()) {
            let tier = Tier::from_name(name).ok_or_else(|| GenError::UnknownTier(name.to_string()))?;
            set = set.with(tier);
        }
        Ok(set)
    }
}

impl FromIterator<Tier> for TierSet {
    fn from_iter<I: IntoIterator<Item = Tier>>(iter: I) -> Self {
        iter.into_iter().fold(TierSet::none(), TierSet::with)
    }
}

impl fmt::Display for TierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<_> = self.iter().map(Tier::name).collect();
        f.write_str(&names.join(","))
    }
}

/// Settings for a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Tiers that get accelerated variants (intersected with the capability matrix).
    pub tiers: TierSet,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tiers: TierSet::all(),
        }
    }
}

impl GeneratorConfig {
    pub fn new(tiers: TierSet) -> Self {
        Self { tiers }
    }

    /// Read [`TIERS_ENV`]; unset means every tier.
    pub fn from_env() -> GenResult<Self> {
        match env::var(TIERS_ENV) {
            Ok(value) => Ok(Self::new(TierSet::parse(&value)?)),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Drop tiers that do not exist on `arch` (a `target_arch` value).
    pub fn for_target_arch(mut self, arch: &str) -> Self {
        self.tiers = self.tiers.iter().filter(|tier| tier.exists_on(arch)).collect();
        self
    }
}
