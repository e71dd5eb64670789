use crate::catalog::ResourceCatalog;
use crate::config::COORD_PRECISION;
use crate::coords::WorldPos;
use crate::state::OpenedPopup;

pub fn format_world_pos(pos: WorldPos) -> String {
    format!(
        "X {:.p$}  Y {:.p$}  Z {:.p$}",
        pos.x,
        pos.y,
        pos.z,
        p = COORD_PRECISION
    )
}

/// Comma-joined GUID words, as shown in the developer panel.
pub fn format_guid(popup: &OpenedPopup) -> String {
    popup
        .guid()
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Popup/tooltip heading for a marker of `subtype` in `group`.
pub fn format_resource_title(catalog: &ResourceCatalog, group: &str, subtype: &str) -> String {
    if group == "loot_spawn" {
        return catalog.group_display_name(group).to_string();
    }
    let subtype_name = catalog.display_name(subtype);
    if group == subtype {
        return subtype_name.to_string();
    }
    format!(
        "{}, {}",
        capitalize(catalog.group_display_name(group)),
        capitalize(subtype_name)
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
