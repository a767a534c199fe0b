//! 翻译配置管理模块
//!
//! 提供配置文件加载、校验和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{
    ColumnGapConfig, ConfigManager, FilterScope, GapType, RuleMode, TranslationConfig,
};

/// 配置常量
pub mod constants {
    // 合并与分隔
    pub const DEFAULT_MERGE_LENGTH: usize = 1800;
    pub const DEFAULT_SEPARATOR: &str = "\n\n";
    /// 对齐时多出的译文段落用它拼接
    pub const MERGED_JOINER: &str = "\n\n";

    // 占位符，`{}` 处填入编号
    pub const PLACEHOLDER_TEMPLATE: &str = "{{id_{}}}";
    pub const PLACEHOLDER_PATTERN: &str = r"(\{\{\s*)+id\s*_\s*{}\s*(\s*\}\})+";
    pub const PLACEHOLDER_DIGITS: usize = 5;

    // 栏间距
    pub const DEFAULT_GAP_PERCENTAGE: u32 = 10;
    pub const DEFAULT_GAP_SPACE_COUNT: u32 = 6;

    // 提取相关
    pub const PRIORITY_TAGS: &[&str] = &["p", "pre", "h1", "h2", "h3", "h4", "h5", "h6"];
    pub const DECORATION_TAGS: &[&str] = &["rt", "rp", "sup", "sub"];
    pub const RESERVED_TAGS: &[&str] = &["img", "code", "br", "hr", "sub", "sup", "kbd"];
    pub const DEFAULT_ELEMENT_RULES: &[&str] = &["pre", "code"];
    pub const MARKUP_FILE_PATTERN: &str = r"\.(xhtml|html|htm|xml|xht)$";
    pub const NOISE_PATTERN: &str =
        r#"^[-\d\s.'\\"‘’“”,=~!@#$%^&º*|<>?/`—…+:_(){}\[\]]+$"#;

    /// 连续相同单词字符的上限
    pub const REPEAT_LIMIT: usize = 4;

    // 元数据与目录
    pub const METADATA_NAMES: &[&str] = &[
        "title",
        "creator",
        "publisher",
        "rights",
        "subject",
        "contributor",
        "description",
    ];
    pub const METADATA_PAGE_ID: &str = "content.opf";
    pub const TOC_PAGE_ID: &str = "toc.ncx";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "interleaf.toml",
        ".interleaf.toml",
        "interleaf.json",
        "~/.config/interleaf/config.toml",
        "/etc/interleaf/config.toml",
    ];
}

/// 便利函数
pub fn config_file_exists() -> bool {
    constants::CONFIG_PATHS
        .iter()
        .any(|path| std::path::Path::new(shellexpand::tilde(path).as_ref()).exists())
}
