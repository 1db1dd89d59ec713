/// Battle configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleConfig {
    /// Base seed for every random roll in the battle. Two battles with the
    /// same seed, inputs, and player actions play out identically.
    #[cfg_attr(feature = "serde", serde(default))]
    pub seed: u64,

    /// Whether the party may attempt to flee. Scripted and tutorial
    /// encounters disable this.
    #[cfg_attr(feature = "serde", serde(default = "default_flee_allowed"))]
    pub flee_allowed: bool,
}

#[cfg(feature = "serde")]
fn default_flee_allowed() -> bool {
    true
}

impl BattleConfig {
    // ===== compile-time constants used as type parameters =====
    /// Maximum combatants per side.
    pub const MAX_GROUP_SIZE: usize = 4;
    /// Maximum simultaneous status effects on one combatant.
    pub const MAX_STATUS_EFFECTS: usize = 8;

    pub fn new() -> Self {
        Self {
            seed: 0,
            flee_allowed: true,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            flee_allowed: true,
        }
    }

    pub fn without_flee(mut self) -> Self {
        self.flee_allowed = false;
        self
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self::new()
    }
}
