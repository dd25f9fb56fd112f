use std::sync::Arc;

use sandbox_manifest::{
    DefinitionResolver,
    definitions::{ActivityDefinition, ActivityModifierDefinition, ActivityTypeDefinition},
};

use crate::domain::{
    ActivityHash, ActivityRowId, RepoCreateError, RepoError, builder::EntityBuilder,
};

pub const MODIFIER_SUMMARY_LIMIT: usize = 100;

#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub activity_hash: ActivityHash,
    pub name: String,
    pub activity_type: String,
    pub max_fireteam_size: u32,
    pub modifiers: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoredActivity {
    pub row_id: ActivityRowId,
    pub activity: Activity,
}

#[async_trait::async_trait]
pub trait ActivityRepository {
    async fn find_by_hash(
        &self,
        activity_hash: ActivityHash,
    ) -> Result<Option<StoredActivity>, RepoError>;
    async fn insert_activity(&self, activity: &Activity) -> Result<(), RepoCreateError>;
}

/// Joins modifier names with ", ", cutting the result at 100 characters and
/// marking the cut with "...".
pub fn summarize_modifiers<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = names
        .into_iter()
        .filter(|name| !name.as_ref().trim().is_empty())
        .map(|name| name.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ");

    if joined.chars().count() <= MODIFIER_SUMMARY_LIMIT {
        return joined;
    }
    let mut truncated: String = joined.chars().take(MODIFIER_SUMMARY_LIMIT).collect();
    truncated.push_str("...");
    truncated
}

pub struct ActivityBuilder {
    resolver: Arc<DefinitionResolver>,
    activity_hash: ActivityHash,
}

impl ActivityBuilder {
    pub fn new(resolver: Arc<DefinitionResolver>, activity_hash: ActivityHash) -> Self {
        Self {
            resolver,
            activity_hash,
        }
    }

    fn modifier_names(&self, definition: &ActivityDefinition) -> Vec<String> {
        definition
            .modifiers
            .iter()
            .filter_map(|modifier| {
                let resolved: Option<ActivityModifierDefinition> =
                    self.resolver.resolve(modifier.activity_modifier_hash);
                if resolved.is_none() {
                    log::debug!(
                        "Skipping unresolved modifier {} of activity {}",
                        modifier.activity_modifier_hash,
                        self.activity_hash
                    );
                }
                resolved.map(|m| m.display_properties.name)
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl EntityBuilder for ActivityBuilder {
    type Output = Activity;

    async fn build(&self) -> Option<Activity> {
        let Some(definition) = self.resolver.resolve::<ActivityDefinition>(self.activity_hash.0)
        else {
            log::warn!("Activity {} could not be resolved", self.activity_hash);
            return None;
        };
        let activity_type: ActivityTypeDefinition =
            self.resolver.resolve(definition.activity_type_hash?)?;

        Some(Activity {
            activity_hash: self.activity_hash,
            max_fireteam_size: definition.matchmaking.as_ref()?.max_players,
            modifiers: summarize_modifiers(self.modifier_names(&definition)),
            activity_type: activity_type.display_properties.name,
            name: definition.display_properties.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::testing::ResolverFixture;

    #[test]
    fn test_summary_joins_and_skips_empty_names() {
        assert_eq!(
            summarize_modifiers(["Arc Singe", "", "Champions: Mob"]),
            "Arc Singe, Champions: Mob"
        );
        assert_eq!(summarize_modifiers(Vec::<String>::new()), "");
    }

    #[test]
    fn test_summary_is_bounded() {
        let names: Vec<String> = (0..40).map(|i| format!("Modifier {}", i)).collect();
        let summary = summarize_modifiers(&names);
        assert_eq!(summary.chars().count(), MODIFIER_SUMMARY_LIMIT + 3);
        assert!(summary.ends_with("..."));
        assert!(!summary.ends_with(", "));

        let exact = "x".repeat(MODIFIER_SUMMARY_LIMIT);
        assert_eq!(summarize_modifiers([exact.as_str()]), exact);
    }

    #[tokio::test]
    async fn test_activity_builder_skips_unresolved_modifiers() {
        let resolver = ResolverFixture::new()
            .activity(
                2693136600,
                json!({
                    "displayProperties": {"name": "The Corrupted"},
                    "activityTypeHash": 575572995u32,
                    "matchmaking": {"maxPlayers": 3},
                    "modifiers": [
                        {"activityModifierHash": 1},
                        {"activityModifierHash": 2},
                        {"activityModifierHash": 3}
                    ]
                }),
            )
            .activity_type(575572995, "Nightfall")
            .modifier(1, "Solar Singe")
            .modifier(3, "Match Game")
            .build();

        let activity = ActivityBuilder::new(resolver, ActivityHash(2693136600))
            .build()
            .await
            .unwrap();
        assert_eq!(activity.name, "The Corrupted");
        assert_eq!(activity.activity_type, "Nightfall");
        assert_eq!(activity.max_fireteam_size, 3);
        assert_eq!(activity.modifiers, "Solar Singe, Match Game");
    }

    #[tokio::test]
    async fn test_activity_builder_requires_type() {
        let resolver = ResolverFixture::new()
            .activity(
                10,
                json!({
                    "displayProperties": {"name": "Orphan"},
                    "activityTypeHash": 11,
                    "matchmaking": {"maxPlayers": 6}
                }),
            )
            .build();
        assert!(ActivityBuilder::new(resolver, ActivityHash(10)).build().await.is_none());
    }
}
