//! Price table and cost calculation
//!
//! Maps design and feature keys to credit costs. Unknown keys cost nothing,
//! so a stale or misspelled key never blocks a publish.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::DomainError;

/// Highest cost a single design or feature may carry
pub const MAX_PRICE: i64 = 1_000_000;

/// Immutable design/feature price table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTable {
    designs: BTreeMap<String, i64>,
    features: BTreeMap<String, i64>,
}

/// Per-key cost breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub design: BTreeMap<String, i64>,
    pub features: BTreeMap<String, i64>,
}

/// Result of pricing a design and feature selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub design_cost: i64,
    pub features_cost: i64,
    pub total_cost: i64,
    pub breakdown: Breakdown,
}

impl CostBreakdown {
    /// Estimate for a wedding with no design selected yet
    pub fn zero() -> Self {
        Self::default()
    }
}

impl PriceTable {
    /// Build a price table, rejecting costs outside `0..=MAX_PRICE`.
    pub fn new(
        designs: BTreeMap<String, i64>,
        features: BTreeMap<String, i64>,
    ) -> Result<Self, DomainError> {
        if let Some((key, cost)) = designs
            .iter()
            .chain(features.iter())
            .find(|(_, cost)| !(0..=MAX_PRICE).contains(*cost))
        {
            return Err(DomainError::InvalidPrice {
                key: key.clone(),
                cost: *cost,
            });
        }
        Ok(Self { designs, features })
    }

    /// Parse a `{"designs": {..}, "features": {..}}` document.
    pub fn from_json(json: &str) -> Result<Self, PriceTableError> {
        let raw: PriceTable = serde_json::from_str(json)?;
        Ok(Self::new(raw.designs, raw.features)?)
    }

    pub fn designs(&self) -> &BTreeMap<String, i64> {
        &self.designs
    }

    pub fn features(&self) -> &BTreeMap<String, i64> {
        &self.features
    }

    /// Cost of a design, 0 if unknown
    pub fn design_cost(&self, design_key: &str) -> i64 {
        self.designs.get(design_key).copied().unwrap_or(0)
    }

    /// Cost of a feature, 0 if unknown
    pub fn feature_cost(&self, feature_key: &str) -> i64 {
        self.features.get(feature_key).copied().unwrap_or(0)
    }

    /// Price a design and feature selection.
    ///
    /// Every occurrence in `feature_keys` is charged; repeated keys are not
    /// de-duplicated. The breakdown is keyed by feature, so a repeated key
    /// appears once.
    pub fn compute_cost<S: AsRef<str>>(&self, design_key: &str, feature_keys: &[S]) -> CostBreakdown {
        let design_cost = self.design_cost(design_key);

        let mut features_cost: i64 = 0;
        let mut feature_breakdown = BTreeMap::new();
        for key in feature_keys {
            let key = key.as_ref();
            let cost = self.feature_cost(key);
            features_cost = features_cost.saturating_add(cost);
            feature_breakdown.insert(key.to_string(), cost);
        }

        let mut design = BTreeMap::new();
        design.insert(design_key.to_string(), design_cost);

        CostBreakdown {
            design_cost,
            features_cost,
            total_cost: design_cost.saturating_add(features_cost),
            breakdown: Breakdown {
                design,
                features: feature_breakdown,
            },
        }
    }
}

impl Default for PriceTable {
    fn default() -> Self {
        let designs = [("basic", 10), ("elegant", 20), ("luxury", 30), ("royal", 50)];
        let features = [
            ("rsvp", 5),
            ("gallery", 10),
            ("guestbook", 5),
            ("countdown", 3),
            ("music", 5),
            ("video", 15),
            ("live_streaming", 25),
            ("gift_registry", 10),
        ];

        Self {
            designs: designs
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
            features: features
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}

/// Errors loading a price table document
#[derive(Debug, thiserror::Error)]
pub enum PriceTableError {
    #[error("Malformed price table: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] DomainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luxury_with_rsvp_and_gallery() {
        let prices = PriceTable::default();
        let cost = prices.compute_cost("luxury", &["rsvp", "gallery"]);

        assert_eq!(cost.design_cost, 30);
        assert_eq!(cost.features_cost, 15);
        assert_eq!(cost.total_cost, 45);
        assert_eq!(cost.breakdown.design.get("luxury"), Some(&30));
        assert_eq!(cost.breakdown.features.get("rsvp"), Some(&5));
        assert_eq!(cost.breakdown.features.get("gallery"), Some(&10));
    }

    #[test]
    fn test_unknown_design_costs_nothing() {
        let prices = PriceTable::default();
        let cost = prices.compute_cost("unknown", &["rsvp"]);

        assert_eq!(cost.design_cost, 0);
        assert_eq!(cost.features_cost, 5);
        assert_eq!(cost.total_cost, 5);
    }

    #[test]
    fn test_unknown_feature_costs_nothing() {
        let prices = PriceTable::default();
        let cost = prices.compute_cost("basic", &["fireworks"]);

        assert_eq!(cost.features_cost, 0);
        assert_eq!(cost.total_cost, 10);
        assert_eq!(cost.breakdown.features.get("fireworks"), Some(&0));
    }

    #[test]
    fn test_duplicate_features_are_charged_each_time() {
        let prices = PriceTable::default();
        let cost = prices.compute_cost("basic", &["video", "video"]);

        assert_eq!(cost.features_cost, 30);
        assert_eq!(cost.total_cost, 40);
        assert_eq!(cost.breakdown.features.len(), 1);
        assert_eq!(cost.breakdown.features.get("video"), Some(&15));
    }

    #[test]
    fn test_total_is_sum_for_every_design() {
        let prices = PriceTable::default();
        let all_features: Vec<&str> = prices.features().keys().map(String::as_str).collect();

        for design in prices.designs().keys() {
            let cost = prices.compute_cost(design, &all_features);
            assert_eq!(cost.total_cost, cost.design_cost + cost.features_cost);
            assert_eq!(cost, prices.compute_cost(design, &all_features));
        }
    }

    #[test]
    fn test_zero_breakdown() {
        let zero = CostBreakdown::zero();
        assert_eq!(zero.total_cost, 0);
        assert!(zero.breakdown.design.is_empty());
        assert!(zero.breakdown.features.is_empty());
    }

    #[test]
    fn test_from_json() {
        let prices = PriceTable::from_json(
            r#"{"designs": {"minimal": 7}, "features": {"map": 2}}"#,
        )
        .unwrap();

        assert_eq!(prices.compute_cost("minimal", &["map"]).total_cost, 9);
        assert_eq!(prices.design_cost("luxury"), 0);
    }

    #[test]
    fn test_from_json_rejects_negative_cost() {
        let result = PriceTable::from_json(r#"{"designs": {"cheap": -1}, "features": {}}"#);
        assert!(matches!(
            result,
            Err(PriceTableError::Invalid(DomainError::InvalidPrice { .. }))
        ));
    }

    #[test]
    fn test_from_json_rejects_oversized_cost() {
        let result = PriceTable::from_json(
            r#"{"designs": {"royal": 9223372036854775807}, "features": {"rsvp": 5}}"#,
        );
        assert!(matches!(
            result,
            Err(PriceTableError::Invalid(DomainError::InvalidPrice { cost: i64::MAX, .. }))
        ));

        let at_limit = format!(r#"{{"designs": {{"royal": {}}}, "features": {{}}}}"#, MAX_PRICE);
        assert!(PriceTable::from_json(&at_limit).is_ok());
    }

    #[test]
    fn test_sum_saturates_instead_of_wrapping() {
        let prices = PriceTable {
            designs: [("royal".to_string(), i64::MAX)].into_iter().collect(),
            features: [("rsvp".to_string(), 5)].into_iter().collect(),
        };

        let cost = prices.compute_cost("royal", &["rsvp", "rsvp"]);
        assert_eq!(cost.features_cost, 10);
        assert_eq!(cost.total_cost, i64::MAX);
    }
}
