use std::sync::Arc;

use sandbox_manifest::DefinitionResolver;

use crate::{
    domain::{
        CharacterId, CharacterRowId, ItemHash,
        armor::ArmorBuilder,
        builder::EntityBuilder,
        equipment::{EquipmentRepository, EquippedArmorBuilder, EquippedWeaponBuilder},
        weapon::WeaponBuilder,
    },
    services::{
        EnsureError, armor::ArmorManager, character::CharacterManager, tolerate_conflict,
        weapon::WeaponManager,
    },
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EquipmentSummary {
    pub weapons: usize,
    pub armor: usize,
    pub skipped: usize,
}

#[async_trait::async_trait]
pub trait EquipmentManager {
    /// Stores what a character built in this process had equipped. Items
    /// that cannot be resolved are skipped one by one.
    async fn add_character_equipment(
        &self,
        character_id: CharacterId,
    ) -> Result<EquipmentSummary, EnsureError>;
}

pub struct EquipmentManagerImpl<
    C: CharacterManager,
    W: WeaponManager,
    A: ArmorManager,
    R: EquipmentRepository,
> {
    resolver: Arc<DefinitionResolver>,
    character_manager: Arc<C>,
    weapon_manager: Arc<W>,
    armor_manager: Arc<A>,
    repository: Arc<R>,
}

impl<C: CharacterManager, W: WeaponManager, A: ArmorManager, R: EquipmentRepository>
    EquipmentManagerImpl<C, W, A, R>
{
    pub fn new(
        resolver: Arc<DefinitionResolver>,
        character_manager: Arc<C>,
        weapon_manager: Arc<W>,
        armor_manager: Arc<A>,
        repository: Arc<R>,
    ) -> Self {
        Self {
            resolver,
            character_manager,
            weapon_manager,
            armor_manager,
            repository,
        }
    }
}

impl<
    C: CharacterManager + Send + Sync + 'static,
    W: WeaponManager + Send + Sync + 'static,
    A: ArmorManager + Send + Sync + 'static,
    R: EquipmentRepository + Send + Sync + 'static,
> EquipmentManagerImpl<C, W, A, R>
{
    async fn store_weapon(
        &self,
        character: CharacterRowId,
        character_id: CharacterId,
        item_hash: ItemHash,
    ) -> Result<(), EnsureError> {
        let weapon_row = self.weapon_manager.ensure(item_hash).await?;
        let weapon = match self.weapon_manager.cached(item_hash) {
            Some(weapon) => weapon,
            None => WeaponBuilder::new(self.resolver.clone(), item_hash)
                .build()
                .await
                .ok_or(EnsureError::NotResolved)?,
        };
        let equipped = EquippedWeaponBuilder::new(self.resolver.clone(), weapon, character_id)
            .build()
            .await
            .ok_or(EnsureError::NotResolved)?;
        tolerate_conflict(
            self.repository
                .insert_equipped_weapon(character, weapon_row, &equipped)
                .await,
        )
    }

    async fn store_armor(
        &self,
        character: CharacterRowId,
        character_id: CharacterId,
        item_hash: ItemHash,
    ) -> Result<(), EnsureError> {
        let armor_row = self.armor_manager.ensure(item_hash).await?;
        let armor = match self.armor_manager.cached(item_hash) {
            Some(armor) => armor,
            None => ArmorBuilder::new(self.resolver.clone(), item_hash)
                .build()
                .await
                .ok_or(EnsureError::NotResolved)?,
        };
        let equipped = EquippedArmorBuilder::new(self.resolver.clone(), armor, character_id)
            .build()
            .await
            .ok_or(EnsureError::NotResolved)?;
        tolerate_conflict(
            self.repository
                .insert_equipped_armor(character, armor_row, &equipped)
                .await,
        )
    }
}

#[async_trait::async_trait]
impl<
    C: CharacterManager + Send + Sync + 'static,
    W: WeaponManager + Send + Sync + 'static,
    A: ArmorManager + Send + Sync + 'static,
    R: EquipmentRepository + Send + Sync + 'static,
> EquipmentManager for EquipmentManagerImpl<C, W, A, R>
{
    async fn add_character_equipment(
        &self,
        character_id: CharacterId,
    ) -> Result<EquipmentSummary, EnsureError> {
        let equipment = self
            .character_manager
            .equipment(character_id)
            .ok_or(EnsureError::NotResolved)?;
        let character = self
            .character_manager
            .find_stored(character_id)
            .await?
            .ok_or(EnsureError::NotResolved)?
            .row_id;

        let mut summary = EquipmentSummary::default();
        for item_hash in &equipment.weapons {
            match self.store_weapon(character, character_id, *item_hash).await {
                Ok(()) => summary.weapons += 1,
                Err(e) => {
                    log::warn!(
                        "Skipping weapon {} of character {}: {}",
                        item_hash,
                        character_id,
                        e
                    );
                    summary.skipped += 1;
                }
            }
        }
        for item_hash in &equipment.armor {
            match self.store_armor(character, character_id, *item_hash).await {
                Ok(()) => summary.armor += 1,
                Err(e) => {
                    log::warn!(
                        "Skipping armor {} of character {}: {}",
                        item_hash,
                        character_id,
                        e
                    );
                    summary.skipped += 1;
                }
            }
        }
        Ok(summary)
    }
}
