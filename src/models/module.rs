//! Test module identities and execution plans
//!
//! The set of module kinds is closed. Execution order and hybrid phase
//! membership are data (`ModulePlan`), not inline conditionals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// All test module kinds known to the orchestrator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModuleKind {
    Authentication,
    AccessControl,
    Chatbot,
    UiUx,
    Performance,
    Security,
    Integration,
}

impl ModuleKind {
    /// Canonical module name, as used in configuration and result records
    pub fn name(&self) -> &'static str {
        match self {
            ModuleKind::Authentication => "authentication",
            ModuleKind::AccessControl => "accessControl",
            ModuleKind::Chatbot => "chatbot",
            ModuleKind::UiUx => "uiUx",
            ModuleKind::Performance => "performance",
            ModuleKind::Security => "security",
            ModuleKind::Integration => "integration",
        }
    }

    /// Human readable title
    pub fn title(&self) -> &'static str {
        match self {
            ModuleKind::Authentication => "Authentication",
            ModuleKind::AccessControl => "Access Control",
            ModuleKind::Chatbot => "Chatbot",
            ModuleKind::UiUx => "UI/UX & Accessibility",
            ModuleKind::Performance => "Performance",
            ModuleKind::Security => "Security",
            ModuleKind::Integration => "Integration",
        }
    }

    /// Hybrid execution phase this module belongs to
    pub fn phase(&self) -> Phase {
        match self {
            ModuleKind::Authentication | ModuleKind::AccessControl => Phase::Foundation,
            ModuleKind::Chatbot | ModuleKind::UiUx => Phase::Functional,
            ModuleKind::Performance | ModuleKind::Security | ModuleKind::Integration => {
                Phase::Quality
            }
        }
    }

    /// All module kinds in dependency-aware execution order
    pub fn all() -> Vec<ModuleKind> {
        vec![
            ModuleKind::Authentication,
            ModuleKind::AccessControl,
            ModuleKind::Chatbot,
            ModuleKind::UiUx,
            ModuleKind::Performance,
            ModuleKind::Security,
            ModuleKind::Integration,
        ]
    }

    /// Exact canonical name lookup, as required for configuration keys
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|kind| kind.name() == name)
    }

    /// Parse a module name from the command line.
    ///
    /// Accepts canonical names case-insensitively, kebab/snake spellings
    /// (`access-control`, `ui_ux`) and the short aliases `auth`, `access`,
    /// `chat`, `ui`, `ux`, `perf` and `sec`.
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "authentication" | "auth" => Some(ModuleKind::Authentication),
            "accesscontrol" | "access" => Some(ModuleKind::AccessControl),
            "chatbot" | "chat" => Some(ModuleKind::Chatbot),
            "uiux" | "ui" | "ux" => Some(ModuleKind::UiUx),
            "performance" | "perf" => Some(ModuleKind::Performance),
            "security" | "sec" => Some(ModuleKind::Security),
            "integration" => Some(ModuleKind::Integration),
            _ => None,
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Hybrid execution phase
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Run sequentially first
    Foundation,
    /// Fanned out concurrently
    Functional,
    /// Run sequentially last
    Quality,
}

impl Phase {
    pub fn all() -> [Phase; 3] {
        [Phase::Foundation, Phase::Functional, Phase::Quality]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Foundation => "foundation",
            Phase::Functional => "functional",
            Phase::Quality => "quality",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A module slot in an execution plan
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModuleDescriptor {
    pub kind: ModuleKind,
    pub phase: Phase,
}

impl ModuleDescriptor {
    pub fn new(kind: ModuleKind, phase: Phase) -> Self {
        Self { kind, phase }
    }
}

/// Ordered module descriptors driving every scheduling strategy.
///
/// Descriptor order is the sequential execution order; `phase` decides
/// hybrid phase membership.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModulePlan {
    descriptors: Vec<ModuleDescriptor>,
}

impl ModulePlan {
    /// Build a plan from explicit descriptors. Later duplicates of a kind are ignored.
    pub fn new(descriptors: Vec<ModuleDescriptor>) -> Self {
        let mut seen = BTreeSet::new();
        let descriptors = descriptors
            .into_iter()
            .filter(|d| seen.insert(d.kind))
            .collect();
        Self { descriptors }
    }

    /// The standard plan: every module kind in dependency order with its default phase
    pub fn standard() -> Self {
        Self::new(
            ModuleKind::all()
                .into_iter()
                .map(|kind| ModuleDescriptor::new(kind, kind.phase()))
                .collect(),
        )
    }

    pub fn descriptors(&self) -> &[ModuleDescriptor] {
        &self.descriptors
    }

    /// Enabled modules in plan order
    pub fn sequence(&self, enabled: &BTreeSet<ModuleKind>) -> Vec<ModuleKind> {
        self.descriptors
            .iter()
            .filter(|d| enabled.contains(&d.kind))
            .map(|d| d.kind)
            .collect()
    }

    /// Enabled modules of one phase in plan order
    pub fn phase_members(&self, phase: Phase, enabled: &BTreeSet<ModuleKind>) -> Vec<ModuleKind> {
        self.descriptors
            .iter()
            .filter(|d| d.phase == phase && enabled.contains(&d.kind))
            .map(|d| d.kind)
            .collect()
    }
}

impl Default for ModulePlan {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names_round_trip() {
        for kind in ModuleKind::all() {
            assert_eq!(ModuleKind::from_str(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_from_name_is_exact() {
        for kind in ModuleKind::all() {
            assert_eq!(ModuleKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ModuleKind::from_name("auth"), None);
        assert_eq!(ModuleKind::from_name("Security"), None);
        assert_eq!(ModuleKind::from_name("ui_ux"), None);
    }

    #[test]
    fn test_aliases() {
        assert_eq!(ModuleKind::from_str("auth"), Some(ModuleKind::Authentication));
        assert_eq!(ModuleKind::from_str("ACCESS"), Some(ModuleKind::AccessControl));
        assert_eq!(
            ModuleKind::from_str("access-control"),
            Some(ModuleKind::AccessControl)
        );
        assert_eq!(ModuleKind::from_str("ux"), Some(ModuleKind::UiUx));
        assert_eq!(ModuleKind::from_str("ui_ux"), Some(ModuleKind::UiUx));
        assert_eq!(ModuleKind::from_str("perf"), Some(ModuleKind::Performance));
        assert_eq!(ModuleKind::from_str("sec"), Some(ModuleKind::Security));
        assert_eq!(ModuleKind::from_str("billing"), None);
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        let json = serde_json::to_string(&ModuleKind::UiUx).unwrap();
        assert_eq!(json, "\"uiUx\"");
        let kind: ModuleKind = serde_json::from_str("\"accessControl\"").unwrap();
        assert_eq!(kind, ModuleKind::AccessControl);
    }

    #[test]
    fn test_standard_plan_order() {
        let plan = ModulePlan::standard();
        let enabled: BTreeSet<_> = ModuleKind::all().into_iter().collect();
        let names: Vec<_> = plan.sequence(&enabled).iter().map(|k| k.name()).collect();
        assert_eq!(
            names,
            vec![
                "authentication",
                "accessControl",
                "chatbot",
                "uiUx",
                "performance",
                "security",
                "integration"
            ]
        );
    }

    #[test]
    fn test_phase_members() {
        let plan = ModulePlan::standard();
        let enabled: BTreeSet<_> = [
            ModuleKind::Authentication,
            ModuleKind::UiUx,
            ModuleKind::Security,
            ModuleKind::Integration,
        ]
        .into_iter()
        .collect();

        assert_eq!(
            plan.phase_members(Phase::Foundation, &enabled),
            vec![ModuleKind::Authentication]
        );
        assert_eq!(
            plan.phase_members(Phase::Functional, &enabled),
            vec![ModuleKind::UiUx]
        );
        assert_eq!(
            plan.phase_members(Phase::Quality, &enabled),
            vec![ModuleKind::Security, ModuleKind::Integration]
        );
    }

    #[test]
    fn test_custom_plan_deduplicates() {
        let plan = ModulePlan::new(vec![
            ModuleDescriptor::new(ModuleKind::Chatbot, Phase::Foundation),
            ModuleDescriptor::new(ModuleKind::Chatbot, Phase::Quality),
        ]);
        assert_eq!(plan.descriptors().len(), 1);
        assert_eq!(plan.descriptors()[0].phase, Phase::Foundation);
    }
}
