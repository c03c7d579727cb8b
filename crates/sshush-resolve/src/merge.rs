//! Layer merge for option mappings
//!
//! Merge semantics are flat:
//! - Keys present in the overlay replace the base value entirely
//! - Keys absent from the overlay are inherited untouched
//! - Lists and nested mappings are never combined, the overlay wins

use crate::value::Mapping;

/// Merge `overlay` on top of `base`, returning the combined mapping.
pub fn merge(mut base: Mapping, overlay: &Mapping) -> Mapping {
    for (key, value) in overlay {
        base.insert(key.clone(), value.clone());
    }
    base
}

/// Merge layers in order (first is the base, last has highest precedence).
pub fn merge_layers<'a, I>(layers: I) -> Mapping
where
    I: IntoIterator<Item = &'a Mapping>,
{
    layers.into_iter().fold(Mapping::new(), merge)
}
