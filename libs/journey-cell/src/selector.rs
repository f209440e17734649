use shared_models::Role;

/// Cumulative upper bounds for the role mix: 60% patient, 35% healthcare,
/// 5% admin. A draw routes to the first row whose bound it is strictly below.
pub const ROLE_TABLE: [(f64, Role); 3] = [
    (0.60, Role::Patient),
    (0.95, Role::Healthcare),
    (1.00, Role::Admin),
];

/// Picks the variant for `draw` from a `(cumulative threshold, variant)` table.
/// Draws at or beyond the last bound resolve to the last variant.
pub fn select_weighted<T: Copy>(table: &[(f64, T)], draw: f64) -> Option<T> {
    table
        .iter()
        .find(|(bound, _)| draw < *bound)
        .or_else(|| table.last())
        .map(|(_, variant)| *variant)
}

pub fn select_role(draw: f64) -> Role {
    select_weighted(&ROLE_TABLE, draw).unwrap_or(Role::Admin)
}
