//! Fixed code tables of the game API. Each enum maps an upstream integer code to
//! the symbolic name stored alongside resolved entities.

macro_rules! code_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $code:literal => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn from_code(code: u32) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn code(&self) -> u32 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.name())
            }
        }
    };
}

code_enum! {
    /// Membership platform.
    Platform {
        Xbox = 1 => "XBOX",
        Psn = 2 => "PSN",
        Steam = 3 => "STEAM",
        Blizzard = 4 => "BLIZZARD",
        Stadia = 5 => "STADIA",
        Epic = 6 => "EPIC",
        Demon = 10 => "DEMON",
        BungieNext = 254 => "BUNGIE_NEXT",
    }
}

code_enum! {
    ClassType {
        Titan = 0 => "TITAN",
        Hunter = 1 => "HUNTER",
        Warlock = 2 => "WARLOCK",
        Unknown = 3 => "UNKNOWN",
    }
}

code_enum! {
    /// Weapon category, keyed by item sub-type.
    WeaponType {
        AutoRifle = 6 => "AUTO_RIFLE",
        Shotgun = 7 => "SHOTGUN",
        MachineGun = 8 => "MACHINE_GUN",
        HandCannon = 9 => "HAND_CANNON",
        RocketLauncher = 10 => "ROCKET_LAUNCHER",
        FusionRifle = 11 => "FUSION_RIFLE",
        SniperRifle = 12 => "SNIPER_RIFLE",
        PulseRifle = 13 => "PULSE_RIFLE",
        ScoutRifle = 14 => "SCOUT_RIFLE",
        Sidearm = 17 => "SIDEARM",
        Sword = 18 => "SWORD",
        LinearFusionRifle = 22 => "LINEAR_FUSION_RIFLE",
        GrenadeLauncher = 23 => "GRENADE_LAUNCHER",
        SubmachineGun = 24 => "SUBMACHINE_GUN",
        TraceRifle = 25 => "TRACE_RIFLE",
        CombatBow = 31 => "COMBAT_BOW",
        Glaive = 33 => "GLAIVE",
    }
}

impl WeaponType {
    /// "Linear Fusion Rifle" -> `LINEAR_FUSION_RIFLE`.
    pub fn from_display_name(display_name: &str) -> Option<Self> {
        WeaponType::from_name(&display_name.trim().to_uppercase().replace(' ', "_"))
    }

    pub fn is_fusion_class(&self) -> bool {
        matches!(self, WeaponType::FusionRifle | WeaponType::LinearFusionRifle)
    }

    pub fn is_sword_class(&self) -> bool {
        matches!(self, WeaponType::Sword)
    }
}

code_enum! {
    AmmoType {
        None = 0 => "NONE",
        Primary = 1 => "PRIMARY",
        Special = 2 => "SPECIAL",
        Heavy = 3 => "HEAVY",
        Unknown = 4 => "UNKNOWN",
    }
}

code_enum! {
    DamageType {
        None = 0 => "NONE",
        Kinetic = 1 => "KINETIC",
        Arc = 2 => "ARC",
        Solar = 3 => "SOLAR",
        Void = 4 => "VOID",
        Raid = 5 => "RAID",
        Stasis = 6 => "STASIS",
        Strand = 7 => "STRAND",
    }
}

code_enum! {
    /// Item tier, keyed by tier type.
    Rarity {
        Common = 2 => "COMMON",
        Uncommon = 3 => "UNCOMMON",
        Rare = 4 => "RARE",
        Legendary = 5 => "LEGENDARY",
        Exotic = 6 => "EXOTIC",
    }
}

impl Rarity {
    /// Reads the tier from the first word of a "Legendary Auto Rifle" style string.
    pub fn from_tier_display_name(type_and_tier: &str) -> Option<Self> {
        let tier = type_and_tier.split_whitespace().next()?;
        Rarity::from_name(&tier.to_uppercase())
    }
}

code_enum! {
    /// Weapon equipment slot, keyed by equipment slot type hash.
    WeaponSlot {
        Kinetic = 1498876634 => "KINETIC",
        Energy = 2465295065 => "ENERGY",
        Power = 953998645 => "POWER",
    }
}

code_enum! {
    /// Armor equipment slot, keyed by equipment slot type hash.
    ArmorSlot {
        Helmet = 3448274439 => "HELMET",
        Gauntlets = 3551918588 => "GAUNTLETS",
        Chest = 14239492 => "CHEST",
        Legs = 20886954 => "LEGS",
        ClassItem = 1585787867 => "CLASS_ITEM",
    }
}

code_enum! {
    ActivityMode {
        Story = 2 => "STORY",
        Strike = 3 => "STRIKE",
        Raid = 4 => "RAID",
        AllPvP = 5 => "ALL_PVP",
        Patrol = 6 => "PATROL",
        AllPvE = 7 => "ALL_PVE",
        Control = 10 => "CONTROL",
        Clash = 12 => "CLASH",
        IronBanner = 19 => "IRON_BANNER",
        Survival = 37 => "SURVIVAL",
        Countdown = 38 => "COUNTDOWN",
        ScoredNightfall = 46 => "SCORED_NIGHTFALL",
        Rumble = 48 => "RUMBLE",
        Gambit = 63 => "GAMBIT",
        Elimination = 80 => "ELIMINATION",
        Dungeon = 82 => "DUNGEON",
        TrialsOfOsiris = 84 => "TRIALS_OF_OSIRIS",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for platform in Platform::ALL {
            assert_eq!(Platform::from_code(platform.code()), Some(*platform));
            assert_eq!(Platform::from_name(platform.name()), Some(*platform));
        }
        assert_eq!(Platform::from_code(1), Some(Platform::Xbox));
        assert_eq!(Platform::from_code(7), None);
        assert_eq!(ClassType::from_code(1).map(|c| c.name()), Some("HUNTER"));
    }

    #[test]
    fn test_weapon_type_from_display_name() {
        assert_eq!(
            WeaponType::from_display_name("Auto Rifle"),
            Some(WeaponType::AutoRifle)
        );
        assert_eq!(
            WeaponType::from_display_name("Linear Fusion Rifle"),
            Some(WeaponType::LinearFusionRifle)
        );
        assert_eq!(WeaponType::from_display_name("Helmet"), None);
        assert!(WeaponType::LinearFusionRifle.is_fusion_class());
        assert!(WeaponType::FusionRifle.is_fusion_class());
        assert!(!WeaponType::TraceRifle.is_fusion_class());
        assert!(WeaponType::Sword.is_sword_class());
    }

    #[test]
    fn test_rarity_from_first_token() {
        assert_eq!(
            Rarity::from_tier_display_name("Legendary Auto Rifle"),
            Some(Rarity::Legendary)
        );
        assert_eq!(
            Rarity::from_tier_display_name("Exotic Helmet"),
            Some(Rarity::Exotic)
        );
        assert_eq!(Rarity::from_tier_display_name(""), None);
        assert_eq!(Rarity::from_tier_display_name("Shiny Helmet"), None);
    }

    #[test]
    fn test_slot_hashes() {
        assert_eq!(WeaponSlot::from_code(1498876634), Some(WeaponSlot::Kinetic));
        assert_eq!(ArmorSlot::from_code(3448274439), Some(ArmorSlot::Helmet));
        assert_eq!(AmmoType::from_code(2), Some(AmmoType::Special));
        assert_eq!(DamageType::from_code(7), Some(DamageType::Strand));
    }
}
