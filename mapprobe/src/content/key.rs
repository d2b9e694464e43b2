//! Location keys used to name per-location content.

use crate::coord::LocationCodes;
use crate::layer::LocationCodeType;

/// Identifier prefix whose ids are ignored in favour of computed codes.
pub const DEFAULT_RESERVED_ID_PREFIX: &str = "odn_";

/// Where a location key came from. Decides which folder is searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyProvenance {
    /// An explicit identifier, looked up under the id folders.
    Id,
    /// A computed location code, looked up under the code folders.
    Code,
}

/// Key naming the content of one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationKey {
    pub key: String,
    pub provenance: KeyProvenance,
}

impl LocationKey {
    pub fn uses_id_folder(&self) -> bool {
        self.provenance == KeyProvenance::Id
    }
}

/// Picks the content key for a location.
///
/// An explicit id wins unless it starts with `reserved_prefix`. Otherwise
/// the code selected by `code_type` is used; `None` means nothing can be
/// looked up.
pub fn resolve_location_key(
    id: Option<&str>,
    codes: &LocationCodes,
    code_type: LocationCodeType,
    reserved_prefix: &str,
) -> Option<LocationKey> {
    if let Some(id) = id.filter(|id| !id.is_empty()) {
        if reserved_prefix.is_empty() || !id.starts_with(reserved_prefix) {
            return Some(LocationKey {
                key: id.to_string(),
                provenance: KeyProvenance::Id,
            });
        }
    }

    let key = match code_type {
        LocationCodeType::MeshCode => codes.mesh_code.as_ref().map(|code| code.to_string()),
        LocationCodeType::WorldGrid => codes.world_grid.clone(),
        LocationCodeType::None => None,
    }?;

    Some(LocationKey {
        key,
        provenance: KeyProvenance::Code,
    })
}
