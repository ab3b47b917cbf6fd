//! Layer composition for configuration tests.

use ortho_config::MergeComposer;
use serde_json::Value;

use crate::InstallerConfig;

/// Source a test layer pretends to come from.
#[derive(Debug, Clone, Copy)]
pub enum Layer {
    Defaults,
    File,
    Environment,
    Cli,
}

/// Merges `(layer, value)` pairs, in order, into an [`InstallerConfig`].
///
/// The serialised [`InstallerConfig::default`] is pushed first, as a real
/// load does.
pub fn compose(layers: &[(Layer, Value)]) -> InstallerConfig {
    let mut composer = MergeComposer::new();
    composer.push_defaults(
        serde_json::to_value(InstallerConfig::default()).expect("defaults serialise"),
    );
    for (layer, value) in layers.iter().cloned() {
        match layer {
            Layer::Defaults => composer.push_defaults(value),
            Layer::File => composer.push_file(value, None),
            Layer::Environment => composer.push_environment(value),
            Layer::Cli => composer.push_cli(value),
        }
    }

    InstallerConfig::merge_from_layers(composer.layers()).expect("layers should merge")
}
