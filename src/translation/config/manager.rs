//! 配置管理器
//!
//! 提供统一的配置接口，支持 TOML/JSON 配置文件和默认值

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::element::{ColumnGap, Position};
use crate::translation::error::{TranslationError, TranslationResult};
use crate::translation::pipeline::filters::compile_rule;

/// 过滤规则的解释方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMode {
    /// 忽略大小写的纯文本
    #[default]
    Normal,
    /// 区分大小写的纯文本
    Case,
    /// 正则表达式
    Regex,
}

/// 过滤规则的作用范围
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterScope {
    #[default]
    Text,
    /// 除文本外还检查原始标记
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    Percentage,
    SpaceCount,
}

/// 左右排版时的栏间距配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColumnGapConfig {
    #[serde(rename = "_type")]
    pub gap_type: Option<GapType>,
    pub percentage: u32,
    pub space_count: u32,
}

impl Default for ColumnGapConfig {
    fn default() -> Self {
        Self {
            gap_type: Some(GapType::Percentage),
            percentage: constants::DEFAULT_GAP_PERCENTAGE,
            space_count: constants::DEFAULT_GAP_SPACE_COUNT,
        }
    }
}

impl ColumnGapConfig {
    /// 未指定类型时使用默认的 45/10/45 布局
    pub fn resolve(&self) -> Option<ColumnGap> {
        match self.gap_type? {
            GapType::Percentage => Some(ColumnGap::Percentage(self.percentage)),
            GapType::SpaceCount => Some(ColumnGap::Fixed(self.space_count)),
        }
    }
}

/// 翻译配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 过滤
    pub rule_mode: RuleMode,
    pub filter_scope: FilterScope,
    pub filter_rules: Vec<String>,
    pub element_rules: Vec<String>,

    // 排版
    pub translation_position: Position,
    pub original_color: Option<String>,
    pub translation_color: Option<String>,
    pub translation_lang: Option<String>,

    // 合并
    pub merge_enabled: bool,
    pub merge_length: usize,

    // 表格放在最后，TOML 中子表必须位于普通键之后
    pub column_gap: ColumnGapConfig,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            rule_mode: RuleMode::Normal,
            filter_scope: FilterScope::Text,
            filter_rules: Vec::new(),
            element_rules: Vec::new(),

            translation_position: Position::Below,
            original_color: None,
            translation_color: None,
            translation_lang: None,

            merge_enabled: false,
            merge_length: constants::DEFAULT_MERGE_LENGTH,

            column_gap: ColumnGapConfig::default(),
        }
    }
}

impl TranslationConfig {
    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.merge_enabled && self.merge_length == 0 {
            return Err(TranslationError::ConfigError(
                "启用合并时合并长度不能为0".to_string(),
            ));
        }

        if self.column_gap.gap_type == Some(GapType::Percentage) && self.column_gap.percentage > 100
        {
            return Err(TranslationError::ConfigError(format!(
                "栏间距百分比不能超过100: {}",
                self.column_gap.percentage
            )));
        }

        for rule in &self.filter_rules {
            compile_rule(rule, self.rule_mode)
                .map_err(|e| TranslationError::ConfigError(format!("过滤规则无效: {}", e)))?;
        }

        Ok(())
    }

    /// 合并模式下的合并长度，非合并模式为 0
    pub fn effective_merge_length(&self) -> usize {
        if self.merge_enabled {
            self.merge_length
        } else {
            0
        }
    }
}

/// 配置管理器
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    config: TranslationConfig,
}

impl ConfigManager {
    /// 从默认搜索路径加载并校验配置
    pub fn new() -> TranslationResult<Self> {
        let config = Self::load_config()?;
        config.validate()?;

        Ok(Self { config })
    }

    /// 从指定文件加载并校验配置
    pub fn from_file(path: &str) -> TranslationResult<Self> {
        let expanded_path = shellexpand::tilde(path);
        let config = Self::load_from_file(&expanded_path)?;
        config.validate()?;

        Ok(Self { config })
    }

    pub fn from_config(config: TranslationConfig) -> TranslationResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    fn load_config() -> TranslationResult<TranslationConfig> {
        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(TranslationConfig::default())
    }

    fn load_from_file(path: &str) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
