use crate::colors::{FALLBACK_COLOR, parse_hex_color};

/// Sorting order for names the catalog does not list.
const UNLISTED_ORDER: u32 = 999;

/// Groups: (key, display name, sorting order).
const GROUPS: &[(&str, &str, u32)] = &[
    ("loot_spawn", "Loot Spawn", 10),
    ("ore", "Ore", 20),
    ("wood", "Wood", 30),
    ("food", "Food", 40),
    ("fishing", "Fishing", 50),
    ("digging", "Dig Spot", 60),
    ("interactible", "Interactible", 70),
    ("whisper", "Whisper", 80),
    ("bonfire", "Bonfire", 90),
    ("herb", "Herb", 100),
];

/// Types: (group, key, display name, color, sorting order within group).
/// Single-type groups list one type keyed like the group.
const TYPES: &[(&str, &str, &str, &str, u32)] = &[
    ("ore", "copper", "Copper", "#D84315", 1),
    ("ore", "iron", "Iron", "#9E9E9E", 2),
    ("ore", "silver", "Silver", "#ECEFF1", 3),
    ("wood", "birch", "Birch", "#F4E4C1", 1),
    ("wood", "spruce", "Spruce", "#2D5016", 2),
    ("wood", "pine", "Pine", "#7CB342", 3),
    ("herb", "artemisia", "Artemisia", "#CDDC39", 1),
    ("herb", "dracaena", "Dracaena", "#00C853", 2),
    ("herb", "lithops", "Lithops", "#69F0AE", 3),
    ("herb", "mushroom", "Mushroom", "#E040FB", 4),
    ("food", "blueberry", "Blueberry", "#3D5AFE", 1),
    ("food", "firebrandberry", "Firebrand Berry", "#FF1744", 2),
    ("food", "horseshoe_crab", "Horseshoe Crab", "#668300", 3),
    ("food", "potato", "Potato", "#b38759", 4),
    ("food", "tomato", "Tomato", "#FF5722", 5),
    ("fishing", "carp", "Carp", "#82B1FF", 1),
    ("fishing", "trout", "Trout", "#2962FF", 2),
    ("fishing", "bass", "Bass", "#0D47A1", 3),
    ("digging", "digging", "Dig Spot", "#8D6E63", 60),
    ("bonfire", "bonfire", "Bonfire", "#FF6F00", 70),
    ("whisper", "whisper", "Whisper", "#18FFFF", 90),
    ("loot_spawn", "shiny", "Shiny", "#FFD700", 1),
    ("loot_spawn", "special_shiny", "Special Shiny", "#FF6D00", 2),
    ("loot_spawn", "small_chest", "Small Chest", "#A1887F", 3),
    ("loot_spawn", "medium_chest", "Medium Chest", "#FFA726", 4),
    ("loot_spawn", "large_chest", "Large Chest", "#F57C00", 5),
    ("loot_spawn", "special_chest", "Special Chest", "#E65100", 6),
    ("loot_spawn", "other_loot", "Other", "#9E9E9E", 7),
    ("interactible", "readable", "Readable", "#DEB887", 1),
    ("interactible", "ladder", "Ladder", "#A0826D", 2),
    ("interactible", "door", "Door", "#8B4513", 3),
    ("interactible", "lever", "Lever", "#CD853F", 4),
    ("interactible", "other", "Other", "#D2691E", 5),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroupDef {
    pub key: String,
    pub display_name: String,
    pub sorting_order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTypeDef {
    pub key: String,
    pub group: String,
    pub display_name: String,
    pub color: (u8, u8, u8),
    pub sorting_order: u32,
}

/// Resource groups and types with their presentation data. Immutable once
/// built; hand it to whatever needs lookups.
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    groups: Vec<ResourceGroupDef>,
    types: Vec<ResourceTypeDef>,
}

impl ResourceCatalog {
    /// Groups are kept in sorting order; types by group, then sorting order.
    pub fn new(mut groups: Vec<ResourceGroupDef>, mut types: Vec<ResourceTypeDef>) -> Self {
        groups.sort_by_key(|group| group.sorting_order);
        let group_rank = |key: &str| {
            groups
                .iter()
                .position(|group| group.key == key)
                .unwrap_or(usize::MAX)
        };
        types.sort_by_key(|def| (group_rank(&def.group), def.sorting_order));
        Self { groups, types }
    }

    /// The game's resource taxonomy.
    pub fn builtin() -> Self {
        let groups = GROUPS
            .iter()
            .map(|&(key, display_name, sorting_order)| ResourceGroupDef {
                key: key.to_string(),
                display_name: display_name.to_string(),
                sorting_order,
            })
            .collect();
        let types = TYPES
            .iter()
            .map(|&(group, key, display_name, color, sorting_order)| ResourceTypeDef {
                key: key.to_string(),
                group: group.to_string(),
                display_name: display_name.to_string(),
                color: parse_hex_color(color).unwrap_or(FALLBACK_COLOR),
                sorting_order,
            })
            .collect();
        Self::new(groups, types)
    }

    pub fn groups(&self) -> &[ResourceGroupDef] {
        &self.groups
    }

    pub fn type_def(&self, key: &str) -> Option<&ResourceTypeDef> {
        self.types.iter().find(|def| def.key == key)
    }

    pub fn group_def(&self, key: &str) -> Option<&ResourceGroupDef> {
        self.groups.iter().find(|group| group.key == key)
    }

    pub fn group_of(&self, type_key: &str) -> Option<&str> {
        self.type_def(type_key).map(|def| def.group.as_str())
    }

    /// Types of `group` in display order.
    pub fn types_in_group<'a>(
        &'a self,
        group: &'a str,
    ) -> impl Iterator<Item = &'a ResourceTypeDef> + 'a {
        self.types.iter().filter(move |def| def.group == group)
    }

    /// Known as either a type or a group name.
    pub fn is_known_type(&self, key: &str) -> bool {
        self.type_def(key).is_some() || self.group_def(key).is_some()
    }

    pub fn is_valid_subtype_for_group(&self, group: &str, subtype: &str) -> bool {
        self.type_def(subtype).is_some_and(|def| def.group == group)
    }

    pub fn color(&self, type_key: &str) -> (u8, u8, u8) {
        self.type_def(type_key)
            .map(|def| def.color)
            .unwrap_or(FALLBACK_COLOR)
    }

    pub fn display_name<'a>(&'a self, type_key: &'a str) -> &'a str {
        self.type_def(type_key)
            .map(|def| def.display_name.as_str())
            .unwrap_or(type_key)
    }

    pub fn group_display_name<'a>(&'a self, group: &'a str) -> &'a str {
        self.group_def(group)
            .map(|def| def.display_name.as_str())
            .unwrap_or(group)
    }

    pub fn type_sorting_order(&self, type_key: &str) -> u32 {
        self.type_def(type_key)
            .map(|def| def.sorting_order)
            .unwrap_or(UNLISTED_ORDER)
    }

    pub fn group_sorting_order(&self, group: &str) -> u32 {
        self.group_def(group)
            .map(|def| def.sorting_order)
            .unwrap_or(UNLISTED_ORDER)
    }
}
