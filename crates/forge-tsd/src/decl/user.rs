//! Interfaces and aliases injected from configuration

use crate::config::TsdConfig;
use crate::types::translate;
use crate::visibility::VisibilityContext;
use crate::writer::DtsWriter;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `[readonly ]name[?]: Type[;]`
    static ref PROPERTY_MEMBER: Regex =
        Regex::new(r"^\s*(?:readonly\s+)?[\w$]+\??\s*:\s*(.+?)\s*;?\s*$").unwrap();
}

fn qualify(parent_module: Option<&str>, name: &str) -> String {
    match parent_module {
        Some(module) => format!("{}.{}", module, name),
        None => name.to_string(),
    }
}

/// A user interface; members are raw declaration text
#[derive(Debug, Clone)]
pub struct UserInterfaceDecl {
    pub name: String,
    pub parent_module: Option<String>,
    pub qualified: String,
    pub members: Vec<String>,
}

impl UserInterfaceDecl {
    pub fn new(parent_module: Option<&str>, name: &str, members: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            parent_module: parent_module.map(str::to_string),
            qualified: qualify(parent_module, name),
            members,
        }
    }

    /// Property members reference their types; method members are opaque
    pub fn visit(&self, ctx: &mut VisibilityContext, config: &TsdConfig) {
        for member in &self.members {
            if let Some(caps) = PROPERTY_MEMBER.captures(member) {
                translate(&caps[1], config, &mut *ctx);
            }
        }
    }

    pub fn output(&self, out: &mut DtsWriter) {
        out.writeln(format!("interface {} {{", self.name));
        out.indent();
        for member in &self.members {
            let member = member.trim();
            if member.ends_with(';') || member.ends_with('}') {
                out.writeln(member);
            } else {
                out.writeln(format!("{};", member));
            }
        }
        out.unindent();
        out.writeln("}");
    }
}

/// A user type alias; the target is raw type text
#[derive(Debug, Clone)]
pub struct UserTypeAliasDecl {
    pub name: String,
    pub parent_module: Option<String>,
    pub qualified: String,
    pub target: String,
}

impl UserTypeAliasDecl {
    pub fn new(parent_module: Option<&str>, name: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            parent_module: parent_module.map(str::to_string),
            qualified: qualify(parent_module, name),
            target: target.to_string(),
        }
    }

    pub fn visit(&self, ctx: &mut VisibilityContext, config: &TsdConfig) {
        translate(&self.target, config, ctx);
    }

    pub fn output(&self, out: &mut DtsWriter) {
        let target = self.target.trim().trim_end_matches(';');
        out.writeln(format!("type {} = {};", self.name, target));
    }
}
