use dashmap::DashMap;

use crate::domain::{CharacterRowId, InstanceId, stats::StoredStat};

/// Stat rows written by this process, grouped by (character, match).
pub trait StatBlockCache {
    fn record(&self, stat: StoredStat);
    fn get(&self, character: CharacterRowId, instance_id: InstanceId) -> Vec<StoredStat>;
    fn remove(&self, character: CharacterRowId, instance_id: InstanceId) -> Vec<StoredStat>;
}

pub struct StatBlockCacheImpl {
    blocks: DashMap<(CharacterRowId, InstanceId), Vec<StoredStat>>,
}

impl StatBlockCacheImpl {
    pub fn new() -> Self {
        Self {
            blocks: DashMap::new(),
        }
    }
}

impl StatBlockCache for StatBlockCacheImpl {
    fn record(&self, stat: StoredStat) {
        let key = (stat.keys.character, stat.instance_id);
        let mut block = self.blocks.entry(key).or_default();
        if !block.iter().any(|s| s.row_id == stat.row_id) {
            block.push(stat);
        }
    }

    fn get(&self, character: CharacterRowId, instance_id: InstanceId) -> Vec<StoredStat> {
        self.blocks
            .get(&(character, instance_id))
            .map(|block| block.clone())
            .unwrap_or_default()
    }

    fn remove(&self, character: CharacterRowId, instance_id: InstanceId) -> Vec<StoredStat> {
        self.blocks
            .remove(&(character, instance_id))
            .map(|(_, block)| block)
            .unwrap_or_default()
    }
}
