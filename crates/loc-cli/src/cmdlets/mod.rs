//! Cmdlet declarations.
//!
//! Each submodule declares one cmdlet as a static [`loc_core::Cmdlet`]
//! value. [`registry`] lists them all behind the type-erased
//! [`DynCmdlet`] interface so the command line can be built from their
//! descriptors.

use loc_client::LocationClient;
use loc_core::{CmdletInfo, DynCmdlet};

pub mod add_tracker_consumer;
pub mod get_geofence_list;
pub mod get_map_sprite;
pub mod get_map_style_descriptor;
pub mod remove_device_position_history;
pub mod remove_geofence;

/// A registered cmdlet.
pub type RegisteredCmdlet = &'static dyn DynCmdlet<dyn LocationClient>;

static REGISTRY: &[RegisteredCmdlet] = &[
    &get_geofence_list::CMDLET,
    &get_map_sprite::CMDLET,
    &get_map_style_descriptor::CMDLET,
    &add_tracker_consumer::CMDLET,
    &remove_device_position_history::CMDLET,
    &remove_geofence::CMDLET,
];

/// Every cmdlet, in catalog order.
#[must_use]
pub fn registry() -> &'static [RegisteredCmdlet] {
    REGISTRY
}

/// Static facts of every cmdlet.
pub fn catalog() -> impl Iterator<Item = CmdletInfo> {
    REGISTRY.iter().map(|cmdlet| cmdlet.info())
}

/// Looks up a cmdlet by its verb-noun name or kebab alias, ignoring ASCII
/// case.
///
/// # Examples
///
/// ```
/// use loc_cli::cmdlets;
///
/// let cmdlet = cmdlets::find("remove-loc-geofence").unwrap();
/// assert_eq!(cmdlet.info().operation, "BatchDeleteGeofence");
/// assert!(cmdlets::find("Get-LOCNothing").is_none());
/// ```
#[must_use]
pub fn find(name: &str) -> Option<RegisteredCmdlet> {
    REGISTRY.iter().copied().find(|cmdlet| {
        let info = cmdlet.info();
        info.name.eq_ignore_ascii_case(name)
            || crate::cli::kebab_case(info.name).eq_ignore_ascii_case(name)
    })
}
