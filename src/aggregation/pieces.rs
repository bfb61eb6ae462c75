use crate::entities::UnitType;

/// Pieces represented by `quantity` units of a product.
///
/// Packs only expand when the product knows its pack size; anything else
/// counts one piece per unit.
pub fn total_pieces(quantity: i32, unit_type: UnitType, pieces_per_pack: Option<i32>) -> i64 {
    match (unit_type, pieces_per_pack) {
        (UnitType::Pack, Some(per_pack)) if per_pack > 0 => {
            i64::from(quantity) * i64::from(per_pack)
        }
        _ => i64::from(quantity),
    }
}

fn plural(quantity: i64) -> &'static str {
    if quantity > 1 {
        "s"
    } else {
        ""
    }
}

fn expands_to_packs(unit_type: UnitType, pieces_per_pack: Option<i32>) -> bool {
    unit_type == UnitType::Pack && pieces_per_pack.map_or(false, |n| n > 0)
}

/// Production label, e.g. `"3 packs (18 pcs)"` or `"1 pc"`.
pub fn production_label(quantity: i32, unit_type: UnitType, pieces_per_pack: Option<i32>) -> String {
    if expands_to_packs(unit_type, pieces_per_pack) {
        format!(
            "{} pack{} ({} pcs)",
            quantity,
            plural(i64::from(quantity)),
            total_pieces(quantity, unit_type, pieces_per_pack)
        )
    } else {
        format!("{} pc{}", quantity, plural(i64::from(quantity)))
    }
}

/// Sales label, e.g. `"2 packs"` or `"5 pcs"`.
///
/// Takes an `i64` because sales quantities are sums over many lines.
pub fn sales_label(quantity: i64, unit_type: UnitType, pieces_per_pack: Option<i32>) -> String {
    if expands_to_packs(unit_type, pieces_per_pack) {
        format!("{} pack{}", quantity, plural(quantity))
    } else {
        format!("{} pc{}", quantity, plural(quantity))
    }
}
