use crate::combatant::Combatant;
use crate::config::VULNERABILITY_MULTIPLIER;
use schema::Element;

/// How a combatant's defenses treat one element, in order of precedence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Affinity {
    Immune,
    Vulnerable,
    Resistant(f64),
    Neutral,
}

impl Affinity {
    pub fn multiplier(self) -> f64 {
        match self {
            Affinity::Immune => 0.0,
            Affinity::Vulnerable => VULNERABILITY_MULTIPLIER,
            Affinity::Resistant(value) => value,
            Affinity::Neutral => 1.0,
        }
    }
}

/// Classify `element` against the combatant's immunity, vulnerability and
/// resistance collections. Immunity wins over everything; an untyped attack
/// is looked up as `Physical`.
pub fn affinity(combatant: &Combatant, element: Option<Element>) -> Affinity {
    let key = Element::lookup_key(element);

    if combatant.immunities.contains(&key) {
        Affinity::Immune
    } else if combatant.vulnerabilities.contains(&key) {
        Affinity::Vulnerable
    } else if let Some(&value) = combatant.resistances.get(&key) {
        Affinity::Resistant(value.max(0.0))
    } else {
        Affinity::Neutral
    }
}

/// Damage multiplier for `element` hitting `combatant`.
pub fn resolve(combatant: &Combatant, element: Option<Element>) -> f64 {
    affinity(combatant, element).multiplier()
}
