use crate::error::{ImportError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use vendor_import_common::{mapper::DEFAULT_THRESHOLD, ImportMode, TenantId};

const TENANT_ENV: &str = "VENDOR_IMPORT_TENANT_ID";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tenant_id: Option<String>,
    pub preview_limit: usize,
    pub similarity_threshold: f64,
    pub default_mode: ImportMode,
    pub store_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default_config())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ImportError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("vendor-import"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    fn default_config() -> Self {
        Self {
            tenant_id: None,
            preview_limit: 10,
            similarity_threshold: DEFAULT_THRESHOLD,
            default_mode: ImportMode::AddOnly,
            store_path: None,
        }
    }

    /// 業者データの保存先（未設定なら設定ディレクトリ直下）
    pub fn resolved_store_path(&self) -> Result<PathBuf> {
        match &self.store_path {
            Some(path) => Ok(path.clone()),
            None => Ok(Self::config_dir()?.join("vendors.json")),
        }
    }

    pub fn get_tenant_id(&self) -> Result<TenantId> {
        // 環境変数を優先
        if let Ok(id) = std::env::var(TENANT_ENV) {
            return parse_tenant(&id);
        }

        let id = self.tenant_id.as_deref().ok_or(ImportError::MissingTenant)?;
        parse_tenant(id)
    }

    pub fn set_tenant_id(&mut self, id: &str) -> Result<()> {
        let tenant = parse_tenant(id)?;
        self.tenant_id = Some(tenant.to_string());
        self.save()
    }

    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        if !(0.0..1.0).contains(&threshold) {
            return Err(ImportError::Config(format!(
                "閾値は0.0以上1.0未満で指定してください: {}",
                threshold
            )));
        }
        self.similarity_threshold = threshold;
        self.save()
    }

    pub fn set_preview_limit(&mut self, limit: usize) -> Result<()> {
        if limit == 0 {
            return Err(ImportError::Config("プレビュー件数は1以上で指定してください".into()));
        }
        self.preview_limit = limit;
        self.save()
    }
}

fn parse_tenant(id: &str) -> Result<TenantId> {
    id.parse::<TenantId>()
        .map_err(|e| ImportError::Config(e.to_string()))
}
