// Interned particle identifiers
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::debug;

use crate::error::{DryadError, Result};

// Particles known before any lookup, in registration order
const COMMON_PARTICLES: [&str; 8] = ["n", "g", "p", "d", "t", "h", "a", "e-"];

#[derive(Default)]
struct Registry {
    names: Vec<&'static str>,
    numbers: HashMap<&'static str, u32>,
}

impl Registry {
    fn with_common_particles() -> Self {
        let mut registry = Registry::default();
        for name in COMMON_PARTICLES {
            registry.intern(name);
        }
        registry
    }

    fn intern(&mut self, name: &str) -> u32 {
        if let Some(&number) = self.numbers.get(name) {
            return number;
        }
        // registered names live for the rest of the process
        let name: &'static str = Box::leak(name.to_owned().into_boxed_str());
        let number = self.names.len() as u32;
        self.names.push(name);
        self.numbers.insert(name, number);
        number
    }
}

static REGISTRY: Lazy<Mutex<Registry>> = Lazy::new(|| Mutex::new(Registry::with_common_particles()));

fn registry() -> std::sync::MutexGuard<'static, Registry> {
    REGISTRY
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Identifier of a particle such as `n` (neutron) or `g` (photon).
///
/// Names are interned in a process-wide registry the first time they are
/// seen, so the identifier itself is a copyable number and comparing two
/// identifiers never touches the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleID {
    number: u32,
}

impl ParticleID {
    /// Identifier for `name`, registering it when it is new
    pub fn new(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DryadError::InvalidParameter(
                "a particle name cannot be empty".to_string(),
            ));
        }
        let mut registry = registry();
        let known = registry.names.len();
        let number = registry.intern(name);
        if registry.names.len() > known {
            debug!(name, number, "registered particle identifier");
        }
        Ok(ParticleID { number })
    }

    pub fn neutron() -> Self {
        ParticleID { number: 0 }
    }

    pub fn photon() -> Self {
        ParticleID { number: 1 }
    }

    pub fn proton() -> Self {
        ParticleID { number: 2 }
    }

    pub fn alpha() -> Self {
        ParticleID { number: 6 }
    }

    pub fn name(&self) -> &'static str {
        registry().names[self.number as usize]
    }

    /// Registration number of the particle
    pub fn number(&self) -> u32 {
        self.number
    }
}

impl fmt::Display for ParticleID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for ParticleID {
    type Err = DryadError;

    fn from_str(name: &str) -> Result<Self> {
        ParticleID::new(name)
    }
}

impl Serialize for ParticleID {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ParticleID {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        ParticleID::new(&name).map_err(serde::de::Error::custom)
    }
}
