//! Scenario catalog
//!
//! Sixteen insight records keyed by (revenue tier, labor tier), plus the
//! revenue/labor action bundles used to build the immediate action list.
//! The default catalog is a JSON document compiled into the library; a
//! replacement (e.g. a translation) can be loaded from disk.

use crate::error::{VvaError, VvaResult};
use crate::tier::Tier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

const BUILTIN_CATALOG: &str = include_str!("../data/insights.json");

/// Minimum sustain actions needed to pad a top-3 list from nothing
const MIN_SUSTAIN_ACTIONS: usize = 3;

/// Lookup key: the ordered pair (revenue tier, labor tier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ScenarioKey {
    pub revenue: Tier,
    pub labor: Tier,
}

impl ScenarioKey {
    pub fn new(revenue: Tier, labor: Tier) -> Self {
        ScenarioKey { revenue, labor }
    }

    /// All 16 keys, revenue-major, best tiers first
    pub fn all() -> impl Iterator<Item = ScenarioKey> {
        Tier::ALL.into_iter().rev().flat_map(|revenue| {
            Tier::ALL
                .into_iter()
                .rev()
                .map(move |labor| ScenarioKey::new(revenue, labor))
        })
    }

    /// Grid name, e.g. "High Revenue / Critical Labor"
    pub fn name(&self) -> String {
        let revenue = match self.revenue {
            Tier::Excellent => "High Revenue",
            Tier::Stable => "Stable Revenue",
            Tier::AtRisk => "Low Revenue",
            Tier::Critical => "Critical Revenue",
        };
        let labor = match self.labor {
            Tier::Excellent => "Efficient Labor",
            Tier::Stable => "Stable Labor",
            Tier::AtRisk => "At-Risk Labor",
            Tier::Critical => "Critical Labor",
        };
        format!("{} / {}", revenue, labor)
    }
}

/// Time-phased action plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionPlan {
    #[serde(default)]
    pub immediate: Vec<String>,
    #[serde(default)]
    pub seven_day: Vec<String>,
    #[serde(default)]
    pub thirty_to_sixty_day: Vec<String>,
    #[serde(default)]
    pub sixty_to_ninety_day: Vec<String>,
}

impl ActionPlan {
    /// Buckets in order, with display headings
    pub fn phases(&self) -> [(&'static str, &[String]); 4] {
        [
            ("Immediate", self.immediate.as_slice()),
            ("7 days", self.seven_day.as_slice()),
            ("30-60 days", self.thirty_to_sixty_day.as_slice()),
            ("60-90 days", self.sixty_to_ninety_day.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.phases().iter().all(|(_, items)| items.is_empty())
    }
}

/// Static prescriptive content for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InsightRecord {
    pub label: String,
    pub narrative: String,
    #[serde(default)]
    pub root_causes: Vec<String>,
    #[serde(default)]
    pub action_plan: ActionPlan,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub expected_impact: Vec<String>,
}

/// Action bundle keyed by tier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TierActions {
    #[serde(default)]
    pub critical: Vec<String>,
    #[serde(default)]
    pub at_risk: Vec<String>,
    #[serde(default)]
    pub stable: Vec<String>,
    #[serde(default)]
    pub excellent: Vec<String>,
}

impl TierActions {
    pub fn for_tier(&self, tier: Tier) -> &[String] {
        match tier {
            Tier::Critical => &self.critical,
            Tier::AtRisk => &self.at_risk,
            Tier::Stable => &self.stable,
            Tier::Excellent => &self.excellent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioEntry {
    revenue: Tier,
    labor: Tier,
    insight: InsightRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogDocument {
    #[serde(default)]
    revenue_actions: TierActions,
    #[serde(default)]
    labor_actions: TierActions,
    #[serde(default)]
    sustain_actions: Vec<String>,
    scenarios: Vec<ScenarioEntry>,
}

/// Validated scenario catalog
#[derive(Debug, Clone, PartialEq)]
pub struct InsightCatalog {
    records: BTreeMap<ScenarioKey, InsightRecord>,
    revenue_actions: TierActions,
    labor_actions: TierActions,
    sustain_actions: Vec<String>,
}

impl InsightCatalog {
    /// Parse and validate a catalog from JSON
    pub fn from_json_str(json: &str) -> VvaResult<Self> {
        let document: CatalogDocument = serde_json::from_str(json)
            .map_err(|e| VvaError::configuration(format!("failed to parse scenario catalog: {}", e)))?;

        let mut records = BTreeMap::new();
        for entry in document.scenarios {
            let key = ScenarioKey::new(entry.revenue, entry.labor);
            if records.insert(key, entry.insight).is_some() {
                return Err(VvaError::configuration(format!(
                    "duplicate scenario entry for {}",
                    key.name()
                )));
            }
        }

        let catalog = InsightCatalog {
            records,
            revenue_actions: document.revenue_actions,
            labor_actions: document.labor_actions,
            sustain_actions: document.sustain_actions,
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check completeness: all 16 scenarios present and usable
    pub fn validate(&self) -> VvaResult<()> {
        let missing: Vec<String> = ScenarioKey::all()
            .filter(|key| !self.records.contains_key(key))
            .map(|key| key.name())
            .collect();
        if !missing.is_empty() {
            return Err(VvaError::configuration(format!(
                "scenario catalog is missing {} of 16 entries: {}",
                missing.len(),
                missing.join(", ")
            )));
        }

        for (key, record) in &self.records {
            if record.label.trim().is_empty() {
                return Err(VvaError::configuration(format!(
                    "scenario {} has an empty label",
                    key.name()
                )));
            }
            if record.narrative.trim().is_empty() {
                return Err(VvaError::configuration(format!(
                    "scenario {} has an empty narrative",
                    key.name()
                )));
            }
            if record.action_plan.is_empty() {
                return Err(VvaError::configuration(format!(
                    "scenario {} has no actions in its action plan",
                    key.name()
                )));
            }
        }

        if self.sustain_actions.len() < MIN_SUSTAIN_ACTIONS {
            return Err(VvaError::configuration(format!(
                "sustain_actions must list at least {} actions (got {})",
                MIN_SUSTAIN_ACTIONS,
                self.sustain_actions.len()
            )));
        }

        Ok(())
    }

    /// Look up the record for a tier pair
    ///
    /// A miss means the catalog is defective; callers must not guess a substitute.
    pub fn get(&self, key: ScenarioKey) -> VvaResult<&InsightRecord> {
        self.records.get(&key).ok_or_else(|| {
            VvaError::configuration(format!("no scenario entry for {}", key.name()))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ScenarioKey, &InsightRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn revenue_actions(&self, tier: Tier) -> &[String] {
        self.revenue_actions.for_tier(tier)
    }

    pub fn labor_actions(&self, tier: Tier) -> &[String] {
        self.labor_actions.for_tier(tier)
    }

    pub fn sustain_actions(&self) -> &[String] {
        &self.sustain_actions
    }
}

/// The catalog shipped with the library, parsed once on first use
pub fn builtin_catalog() -> VvaResult<Arc<InsightCatalog>> {
    static BUILTIN: OnceLock<Result<Arc<InsightCatalog>, VvaError>> = OnceLock::new();
    BUILTIN
        .get_or_init(|| InsightCatalog::from_json_str(BUILTIN_CATALOG).map(Arc::new))
        .clone()
}

/// Load a catalog from a JSON file
pub fn load_catalog_file(path: &Path) -> VvaResult<InsightCatalog> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        VvaError::configuration(format!(
            "failed to read scenario catalog {}: {}",
            path.display(),
            e
        ))
    })?;
    InsightCatalog::from_json_str(&content).map_err(|e| match e {
        VvaError::Configuration(reason) => {
            VvaError::Configuration(format!("{} ({})", reason, path.display()))
        }
        other => other,
    })
}
