mod attributed;

use proc_macro::TokenStream;

/// Derive `Attributed` and `Node` for a struct holding a `Scope` and `External` fields.
///
/// ```rust,ignore
/// #[derive(Debug, Clone, Default, Attributed)]
/// #[class("Monster")]
/// #[table("Actions")]
/// struct Monster {
///     #[scope]
///     scope: Scope,
///     #[attribute("Health")]
///     health: External<i32>,
///     #[attribute("Waypoints", count = 4)]
///     waypoints: External<Vec4>,
/// }
/// ```
#[proc_macro_derive(Attributed, attributes(attribute, table, class, scope))]
pub fn derive_attributed(item: TokenStream) -> TokenStream {
    attributed::derive_attributed(item)
}
