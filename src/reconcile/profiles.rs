// src/reconcile/profiles.rs

use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;
use thiserror::Error;

use crate::models::sales::SalesChannel;

use super::{fields::{AliasTable, Field}, row_hash::DEFAULT_KEY_FIELDS};

/// Regras de reconciliação de um canal: apelidos de coluna e quais campos
/// entram na chave de deduplicação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelProfile {
    pub key_fields: Vec<Field>,
    pub aliases: AliasTable,
}

impl Default for ChannelProfile {
    fn default() -> Self {
        Self {
            key_fields: DEFAULT_KEY_FIELDS.to_vec(),
            aliases: AliasTable::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Falha ao ler o arquivo de perfis: {0}")]
    Io(#[from] std::io::Error),

    #[error("Arquivo de perfis inválido: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("O canal '{0}' precisa de pelo menos um campo em key_fields")]
    EmptyKeyFields(SalesChannel),
}

// Formato do TOML:
//
// [channels.offline-counter]
// key_fields = ["product_code", "date", "amount", "title", "qty"]
// [channels.offline-counter.aliases]
// amount = ["Net Amount", "Amount"]
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfilesFile {
    #[serde(default)]
    channels: HashMap<SalesChannel, ProfileEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileEntry {
    key_fields: Option<Vec<Field>>,
    #[serde(default)]
    aliases: HashMap<Field, Vec<String>>,
}

/// Perfis de todos os canais. Canal sem entrada usa o perfil padrão.
#[derive(Debug, Clone, Default)]
pub struct ChannelProfiles {
    fallback: ChannelProfile,
    channels: HashMap<SalesChannel, ChannelProfile>,
}

impl ChannelProfiles {
    pub fn get(&self, channel: SalesChannel) -> &ChannelProfile {
        self.channels.get(&channel).unwrap_or(&self.fallback)
    }

    pub fn insert(&mut self, channel: SalesChannel, profile: ChannelProfile) {
        self.channels.insert(channel, profile);
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ProfileError> {
        let file: ProfilesFile = toml::from_str(text)?;
        let mut profiles = Self::default();

        for (channel, entry) in file.channels {
            let key_fields = entry.key_fields.unwrap_or_else(|| DEFAULT_KEY_FIELDS.to_vec());
            if key_fields.is_empty() {
                return Err(ProfileError::EmptyKeyFields(channel));
            }

            let profile = ChannelProfile {
                key_fields,
                aliases: AliasTable::default().with_overrides(&entry.aliases),
            };
            profiles.insert(channel, profile);
        }

        Ok(profiles)
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
