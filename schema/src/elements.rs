use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Damage-type tag used to key resistance, immunity and vulnerability lookups.
///
/// `Physical` is an ordinary tag: non-elemental actions resolve against it, so
/// a combatant only treats physical hits specially when one of its collections
/// names it explicitly.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum Element {
    Physical,
    Fire,
    Water,
    Earth,
    Air,
    Ice,
    Lightning,
    Arcane,
    Poison,
    Holy,
    Shadow,
}

impl Element {
    /// The element a lookup should key on. Untyped actions key on `Physical`.
    pub fn lookup_key(element: Option<Element>) -> Element {
        element.unwrap_or(Element::Physical)
    }
}

/// Stats that status effects may scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum StatType {
    Attack,
    Defense,
    Speed,
    Accuracy,
}
