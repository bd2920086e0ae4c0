//! Asset Commands Module
//!
//! Implements asset import.

use serde::{Deserialize, Serialize};

use crate::core::{
    assets::Asset,
    commands::{Command, CommandResult, StateChange},
    project::ProjectState,
    CoreError, CoreResult,
};

// =============================================================================
// ImportAssetCommand
// =============================================================================

/// Command to register a probed asset with the project
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportAssetCommand {
    pub asset: Asset,
}

impl ImportAssetCommand {
    pub fn new(asset: Asset) -> Self {
        Self { asset }
    }
}

impl Command for ImportAssetCommand {
    fn execute(&mut self, state: &mut ProjectState) -> CoreResult<CommandResult> {
        if let Some(duration) = self.asset.duration_sec {
            if !duration.is_finite() || duration <= 0.0 {
                return Err(CoreError::AssetImportFailed(format!(
                    "{}: duration must be finite and > 0, got {duration}",
                    self.asset.path
                )));
            }
        }
        if state.assets.contains_key(&self.asset.id) {
            return Err(CoreError::AssetImportFailed(format!(
                "Asset id already exists: {}",
                self.asset.id
            )));
        }

        let asset_id = self.asset.id.clone();
        state.assets.insert(asset_id.clone(), self.asset.clone());

        Ok(CommandResult::new()
            .with_change(StateChange::AssetAdded {
                asset_id: asset_id.clone(),
            })
            .with_created_id(&asset_id))
    }

    fn type_name(&self) -> &'static str {
        "ImportAsset"
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}
