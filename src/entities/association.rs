//! Join records for many-to-many relations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::identity::{EntityId, EntityPrefix};

/// A many-to-many relation, named from the owner's side.
///
/// Every relation is backed by one join table; the reverse relation uses the
/// same table with the columns swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relation {
    CampaignComponentFeatures,
    ComponentFeatureCampaigns,
    CampaignActivities,
    ComponentActivityCampaigns,
    ActivityRequirements,
    RequirementActivities,
    FeatureRequirements,
    RequirementFeatures,
    ComponentStandards,
    StandardComponents,
}

/// Physical layout of a relation's join table
#[derive(Debug, Clone, Copy)]
pub(crate) struct JoinTable {
    pub table: &'static str,
    pub owner_column: &'static str,
    pub target_column: &'static str,
}

impl Relation {
    pub fn all() -> &'static [Relation] {
        &[
            Relation::CampaignComponentFeatures,
            Relation::ComponentFeatureCampaigns,
            Relation::CampaignActivities,
            Relation::ComponentActivityCampaigns,
            Relation::ActivityRequirements,
            Relation::RequirementActivities,
            Relation::FeatureRequirements,
            Relation::RequirementFeatures,
            Relation::ComponentStandards,
            Relation::StandardComponents,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::CampaignComponentFeatures => "campaign-component-features",
            Relation::ComponentFeatureCampaigns => "component-feature-campaigns",
            Relation::CampaignActivities => "campaign-activities",
            Relation::ComponentActivityCampaigns => "component-activity-campaigns",
            Relation::ActivityRequirements => "activity-requirements",
            Relation::RequirementActivities => "requirement-activities",
            Relation::FeatureRequirements => "feature-requirements",
            Relation::RequirementFeatures => "requirement-features",
            Relation::ComponentStandards => "component-standards",
            Relation::StandardComponents => "standard-components",
        }
    }

    /// Entity type on the owning side
    pub fn owner(&self) -> EntityPrefix {
        match self {
            Relation::CampaignComponentFeatures | Relation::CampaignActivities => {
                EntityPrefix::Camp
            }
            Relation::ComponentFeatureCampaigns => EntityPrefix::Cfeat,
            Relation::ComponentActivityCampaigns => EntityPrefix::Cact,
            Relation::ActivityRequirements => EntityPrefix::Act,
            Relation::RequirementActivities | Relation::RequirementFeatures => EntityPrefix::Req,
            Relation::FeatureRequirements => EntityPrefix::Feat,
            Relation::ComponentStandards => EntityPrefix::Cmp,
            Relation::StandardComponents => EntityPrefix::Std,
        }
    }

    /// Entity type on the target side
    pub fn target(&self) -> EntityPrefix {
        self.reverse().owner()
    }

    /// The same join table seen from the other side
    pub fn reverse(&self) -> Relation {
        match self {
            Relation::CampaignComponentFeatures => Relation::ComponentFeatureCampaigns,
            Relation::ComponentFeatureCampaigns => Relation::CampaignComponentFeatures,
            Relation::CampaignActivities => Relation::ComponentActivityCampaigns,
            Relation::ComponentActivityCampaigns => Relation::CampaignActivities,
            Relation::ActivityRequirements => Relation::RequirementActivities,
            Relation::RequirementActivities => Relation::ActivityRequirements,
            Relation::FeatureRequirements => Relation::RequirementFeatures,
            Relation::RequirementFeatures => Relation::FeatureRequirements,
            Relation::ComponentStandards => Relation::StandardComponents,
            Relation::StandardComponents => Relation::ComponentStandards,
        }
    }

    pub(crate) fn join_table(&self) -> JoinTable {
        let (table, left, right) = match self {
            Relation::CampaignComponentFeatures | Relation::ComponentFeatureCampaigns => (
                "campaign_component_features",
                "campaign_id",
                "component_feature_id",
            ),
            Relation::CampaignActivities | Relation::ComponentActivityCampaigns => (
                "campaign_component_activities",
                "campaign_id",
                "component_activity_id",
            ),
            Relation::ActivityRequirements | Relation::RequirementActivities => {
                ("activity_requirements", "activity_id", "requirement_id")
            }
            Relation::FeatureRequirements | Relation::RequirementFeatures => {
                ("feature_requirements", "feature_id", "requirement_id")
            }
            Relation::ComponentStandards | Relation::StandardComponents => {
                ("component_standards", "component_id", "standard_id")
            }
        };
        // The left column always belongs to the first-listed direction
        let forward = matches!(
            self,
            Relation::CampaignComponentFeatures
                | Relation::CampaignActivities
                | Relation::ActivityRequirements
                | Relation::FeatureRequirements
                | Relation::ComponentStandards
        );
        if forward {
            JoinTable {
                table,
                owner_column: left,
                target_column: right,
            }
        } else {
            JoinTable {
                table,
                owner_column: right,
                target_column: left,
            }
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Relation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        Relation::all()
            .iter()
            .find(|r| r.as_str() == normalized)
            .copied()
            .ok_or_else(|| {
                let valid: Vec<&str> = Relation::all().iter().map(|r| r.as_str()).collect();
                format!("Unknown relation: {} (valid: {})", s, valid.join(", "))
            })
    }
}

/// One row of a join table, seen from a relation's owner side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub relation: Relation,
    pub owner: EntityId,
    pub target: EntityId,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_swaps_columns() {
        for relation in Relation::all() {
            let forward = relation.join_table();
            let backward = relation.reverse().join_table();
            assert_eq!(forward.table, backward.table);
            assert_eq!(forward.owner_column, backward.target_column);
            assert_eq!(relation.reverse().reverse(), *relation);
        }
    }

    #[test]
    fn test_relation_endpoints() {
        assert_eq!(Relation::CampaignActivities.owner(), EntityPrefix::Camp);
        assert_eq!(Relation::CampaignActivities.target(), EntityPrefix::Cact);
        assert_eq!(Relation::RequirementFeatures.target(), EntityPrefix::Feat);
    }

    #[test]
    fn test_relation_parse_accepts_underscores() {
        assert_eq!(
            "campaign_component_features".parse::<Relation>().unwrap(),
            Relation::CampaignComponentFeatures
        );
        assert!("campaign-threats".parse::<Relation>().is_err());
    }
}
