pub mod activity;
pub mod activity_stats;
pub mod armor;
pub mod character;
pub mod equipped_armor;
pub mod equipped_weapon;
pub mod player;
pub mod weapon;
