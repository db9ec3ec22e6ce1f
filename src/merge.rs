use serde_json::{Map, Value};

/// Merge `overlay` on top of `base`. Config values are flat, so every key in
/// `overlay` replaces the same key in `base`.
pub fn merge(mut base: Map<String, Value>, overlay: Map<String, Value>) -> Map<String, Value> {
    for (key, value) in overlay {
        base.insert(key, value);
    }
    base
}
