//! Generator configuration
//!
//! [`TsdConfig`] carries every option recognised by the compiler. It loads
//! from TOML or JSON; a JSON file in jsdoc `conf.json` style may nest the
//! options under a `"typescript"` key.

use crate::diagnostics::{TsdError, TsdResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Replacements every run starts from; user entries win on conflict.
pub const DEFAULT_TYPE_REPLACEMENTS: &[(&str, &str)] = &[
    ("*", "any"),
    ("?", "any"),
    ("Object", "any"),
    ("function", "Function"),
];

/// Placeholder substituted by the class name in `defaultCtorDesc`
pub const TYPENAME_PLACEHOLDER: &str = "%TYPENAME%";

/// User-injected declarations, global or per module path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserDeclarations<T> {
    /// Declarations emitted at global scope
    pub global: IndexMap<String, T>,
    /// Declarations emitted inside the named module path
    pub module: IndexMap<String, IndexMap<String, T>>,
}

impl<T> Default for UserDeclarations<T> {
    fn default() -> Self {
        Self {
            global: IndexMap::new(),
            module: IndexMap::new(),
        }
    }
}

impl<T> UserDeclarations<T> {
    /// Iterate `(parent module, name, value)` triples, global entries first
    pub fn iter(&self) -> impl Iterator<Item = (Option<&str>, &str, &T)> {
        let global = self
            .global
            .iter()
            .map(|(name, value)| (None, name.as_str(), value));
        let module = self.module.iter().flat_map(|(module, entries)| {
            entries
                .iter()
                .map(move |(name, value)| (Some(module.as_str()), name.as_str(), value))
        });
        global.chain(module)
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.module.values().all(|m| m.is_empty())
    }
}

/// Verbatim replacement of one generated member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberReplacement {
    /// Doc comment text to emit above the declaration
    #[serde(default)]
    pub description: Option<String>,
    /// Declaration text emitted instead of the generated one
    pub declaration: String,
}

/// Configuration for the declaration generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TsdConfig {
    /// Output root identifier; names the `<rootModuleName>.d.ts` file
    pub root_module_name: String,
    /// Output directory
    pub out_dir: PathBuf,
    /// Raw type name -> target type name, merged over the defaults
    pub type_replacements: IndexMap<String, String>,
    /// Constructor description template (`%TYPENAME%` is the class name)
    pub default_ctor_desc: String,
    /// Write TODO doc comments for undocumented nodes
    pub fill_undocumented_doclets: bool,
    /// Write the raw doclet JSON as comments above each node
    pub output_doclet_defs: bool,
    /// Tag that, when set, is the sole public marker
    pub public_annotation: Option<String>,
    /// Fallback for untyped returns
    pub default_return_type: String,
    /// User type aliases
    pub aliases: UserDeclarations<String>,
    /// User interfaces (raw member declarations)
    pub interfaces: UserDeclarations<Vec<String>>,
    /// Longnames dropped from generation
    pub ignore: Vec<String>,
    /// Longnames forced public before the visibility closure runs
    pub make_public: Vec<String>,
    /// Text file prepended to the output
    pub header_file: Option<PathBuf>,
    /// Text file appended to the output
    pub footer_file: Option<PathBuf>,
    /// Member longname -> verbatim replacement
    pub member_replacements: IndexMap<String, MemberReplacement>,
    /// Omit `declare` on top-level module blocks and global elements
    pub do_not_declare_top_level_elements: bool,
}

impl Default for TsdConfig {
    fn default() -> Self {
        Self {
            root_module_name: "generated".to_string(),
            out_dir: PathBuf::from("."),
            type_replacements: IndexMap::new(),
            default_ctor_desc: format!("Constructor for {}", TYPENAME_PLACEHOLDER),
            fill_undocumented_doclets: false,
            output_doclet_defs: false,
            public_annotation: None,
            default_return_type: "any".to_string(),
            aliases: UserDeclarations::default(),
            interfaces: UserDeclarations::default(),
            ignore: Vec::new(),
            make_public: Vec::new(),
            header_file: None,
            footer_file: None,
            member_replacements: IndexMap::new(),
            do_not_declare_top_level_elements: false,
        }
    }
}

impl TsdConfig {
    /// Create a config with every option at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a config file (`.toml`, otherwise JSON)
    pub fn from_file(path: impl AsRef<Path>) -> TsdResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TsdError::FileNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        let config = if path.extension().is_some_and(|ext| ext == "toml") {
            Self::from_toml_str(&text)?
        } else {
            Self::from_json_str(&text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML config text
    pub fn from_toml_str(text: &str) -> TsdResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Parse JSON config text, unwrapping a `"typescript"` section if present
    pub fn from_json_str(text: &str) -> TsdResult<Self> {
        let mut value: serde_json::Value = serde_json::from_str(text)?;
        if let Some(section) = value.get_mut("typescript") {
            value = section.take();
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Reject settings the generator cannot work with
    pub fn validate(&self) -> TsdResult<()> {
        if self.root_module_name.trim().is_empty() {
            return Err(TsdError::config("rootModuleName must not be empty"));
        }
        if self.default_return_type.trim().is_empty() {
            return Err(TsdError::config("defaultReturnType must not be empty"));
        }
        for (longname, replacement) in &self.member_replacements {
            if replacement.declaration.trim().is_empty() {
                return Err(TsdError::config(format!(
                    "memberReplacements entry '{}' has an empty declaration",
                    longname
                )));
            }
        }
        Ok(())
    }

    /// Look up a type replacement, user table first, then the defaults
    pub fn type_replacement(&self, raw: &str) -> Option<&str> {
        if let Some(replacement) = self.type_replacements.get(raw) {
            return Some(replacement.as_str());
        }
        DEFAULT_TYPE_REPLACEMENTS
            .iter()
            .find(|(from, _)| *from == raw)
            .map(|(_, to)| *to)
    }

    /// Constructor doc text for a class without description
    pub fn ctor_description(&self, type_name: &str) -> String {
        self.default_ctor_desc.replace(TYPENAME_PLACEHOLDER, type_name)
    }

    pub fn is_ignored(&self, longname: &str) -> bool {
        self.ignore.iter().any(|i| i == longname)
    }

    /// Whether root-level blocks and global elements get `declare`
    pub fn declare_top_level(&self) -> bool {
        !self.do_not_declare_top_level_elements
    }

    /// Output file path: `<outDir>/<rootModuleName>.d.ts`
    pub fn output_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.d.ts", self.root_module_name))
    }

    /// Read the configured header text, empty when unset
    pub fn load_header(&self) -> TsdResult<String> {
        read_optional(self.header_file.as_deref())
    }

    /// Read the configured footer text, empty when unset
    pub fn load_footer(&self) -> TsdResult<String> {
        read_optional(self.footer_file.as_deref())
    }

    pub fn with_root_module_name(mut self, name: impl Into<String>) -> Self {
        self.root_module_name = name.into();
        self
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    pub fn with_public_annotation(mut self, tag: impl Into<String>) -> Self {
        self.public_annotation = Some(tag.into());
        self
    }

    pub fn with_type_replacement(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.type_replacements.insert(from.into(), to.into());
        self
    }

    pub fn with_make_public(mut self, longname: impl Into<String>) -> Self {
        self.make_public.push(longname.into());
        self
    }

    pub fn with_ignore(mut self, longname: impl Into<String>) -> Self {
        self.ignore.push(longname.into());
        self
    }

    /// Add a user alias; `module` of `None` targets global scope
    pub fn with_alias(
        mut self,
        module: Option<&str>,
        name: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        match module {
            Some(module) => {
                self.aliases
                    .module
                    .entry(module.to_string())
                    .or_default()
                    .insert(name.into(), target.into());
            }
            None => {
                self.aliases.global.insert(name.into(), target.into());
            }
        }
        self
    }

    /// Add a user interface; `module` of `None` targets global scope
    pub fn with_interface(
        mut self,
        module: Option<&str>,
        name: impl Into<String>,
        members: Vec<String>,
    ) -> Self {
        match module {
            Some(module) => {
                self.interfaces
                    .module
                    .entry(module.to_string())
                    .or_default()
                    .insert(name.into(), members);
            }
            None => {
                self.interfaces.global.insert(name.into(), members);
            }
        }
        self
    }

    pub fn with_member_replacement(
        mut self,
        longname: impl Into<String>,
        replacement: MemberReplacement,
    ) -> Self {
        self.member_replacements.insert(longname.into(), replacement);
        self
    }
}

fn read_optional(path: Option<&Path>) -> TsdResult<String> {
    match path {
        Some(path) if !path.exists() => Err(TsdError::FileNotFound(path.to_path_buf())),
        Some(path) => Ok(fs::read_to_string(path)?),
        None => Ok(String::new()),
    }
}
