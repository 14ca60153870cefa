//! Board and column identifiers for the remote catalog, plus the
//! product-level knobs that vary per deployment.
//!
//! Identifiers are assigned by the service and configured out-of-band; the
//! defaults below are the production deployment's. Everything is loadable
//! from a TOML file so a staging deployment can swap boards without a
//! rebuild. The config is constructed explicitly and passed in — there is
//! no process-wide instance.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::api::models::{BoardId, ColumnId};
use crate::buyers::RequiredFields;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardsConfig {
    pub boards: Boards,
    pub columns: Columns,
    /// Page size for full-board listings.
    pub page_size: u32,
    /// Country code attached to buyer phone numbers on creation.
    pub phone_country: String,
    /// Which buyer-row fields are mandatory. A product decision that has
    /// changed across versions, so it is data, not code.
    pub required_fields: RequiredFields,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Boards {
    /// Projects catalog ("planning" board).
    pub planning: BoardId,
    /// Buildings/units catalog.
    pub buildings: BoardId,
    /// Buyer-communication records.
    pub buyer_comm: BoardId,
    /// Buyer identity records.
    pub buyers: BoardId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Columns {
    // Project relations to its unit boards.
    pub project_to_buildings: ColumnId,
    pub project_to_storage: ColumnId,
    pub project_to_parking: ColumnId,
    pub project_to_commercial: ColumnId,

    pub building_to_apartments: ColumnId,
    /// Display label for apartments; item name is the fallback.
    pub apartment_number_text: ColumnId,

    // Communication-record relation slots.
    pub target_project: ColumnId,
    /// Receives the *apartment* selection. The slot is named for buildings
    /// downstream; the mapping is load-bearing and must not be corrected.
    pub target_building: ColumnId,
    pub target_storage: ColumnId,
    pub target_parking: ColumnId,
    pub target_commercial: ColumnId,
    pub target_buyers_connect: ColumnId,
    /// File column for the optional attachment, when the board has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_attachment: Option<ColumnId>,

    // Buyers board.
    pub buyer_id_number: ColumnId,
    pub buyer_phone: ColumnId,
    pub buyer_email: ColumnId,
}

impl Default for BoardsConfig {
    fn default() -> Self {
        Self {
            boards: Boards::default(),
            columns: Columns::default(),
            page_size: 100,
            phone_country: "IL".to_string(),
            required_fields: RequiredFields::NameIdPhoneEmail,
        }
    }
}

impl Default for Boards {
    fn default() -> Self {
        Self {
            planning: BoardId(2102791281),
            buildings: BoardId(2102791521),
            buyer_comm: BoardId(5084313857),
            buyers: BoardId(5088248229),
        }
    }
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            project_to_buildings: ColumnId::from("board_relation_mkxw7hzd"),
            project_to_storage: ColumnId::from("board_relation_mkxn3vzy"),
            project_to_parking: ColumnId::from("board_relation_mkxn2cv3"),
            project_to_commercial: ColumnId::from("board_relation_mkxnfnv"),

            building_to_apartments: ColumnId::from("board_relation_mky2kp4"),
            apartment_number_text: ColumnId::from("text_mkx68kpr"),

            target_project: ColumnId::from("board_relation_mkxndhvh"),
            target_building: ColumnId::from("board_relation_mkxnybfq"),
            target_storage: ColumnId::from("board_relation_mkxn8bvt"),
            target_parking: ColumnId::from("board_relation_mkxnbxjg"),
            target_commercial: ColumnId::from("board_relation_mkxn88c0"),
            target_buyers_connect: ColumnId::from("board_relation_mky2jz2k"),
            target_attachment: None,

            buyer_id_number: ColumnId::from("text_mky2rjvs"),
            buyer_phone: ColumnId::from("phone_mky21r5b"),
            buyer_email: ColumnId::from("email_mky2q0k3"),
        }
    }
}

impl BoardsConfig {
    /// Load from a TOML file. Missing keys fall back to the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path:?}"))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {path:?}"))?;
        Ok(config)
    }

    /// Load from [`Self::default_path`] if the file exists, defaults otherwise.
    pub fn load_or_default() -> anyhow::Result<Self> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load(&path)
        } else {
            log::debug!("no config file at {:?}, using built-in defaults", path);
            Ok(Self::default())
        }
    }

    /// Per-user config file location.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("buyer-intake")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".buyer-intake")
        };
        Ok(config_dir.join("config.toml"))
    }
}
