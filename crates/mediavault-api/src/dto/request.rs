//! Request DTOs.

use serde::Deserialize;
use uuid::Uuid;

use mediavault_remote::resolver::AssetReference;
use mediavault_remote::selection::SelectionEntry;

/// Body of the batch/folder import endpoint.
///
/// Either `gallery_id` or `gallery_name` must be present; with only a
/// name, a draft gallery is created on the fly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequestBody {
    #[serde(default)]
    pub gallery_id: Option<Uuid>,
    #[serde(default)]
    pub gallery_name: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub folder_path: Option<String>,
    #[serde(default)]
    pub trigger_zapier: bool,
    #[serde(default)]
    pub assets: Vec<AssetReference>,
    #[serde(default)]
    pub selection: Vec<SelectionEntry>,
}
