use std::fmt::{self, Display};

/// The two stages a combined shader source is compiled as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn define(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "#define VERTEX_SHADER 1\n\n",
            ShaderStage::Fragment => "#define FRAGMENT_SHADER 1\n\n",
        }
    }
}

impl Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Returns `source` with the stage's `#define` prepended, so one file can
/// hold both stages behind `#ifdef VERTEX_SHADER` / `#ifdef FRAGMENT_SHADER`.
///
/// A leading `#version` directive has to stay the first line, so the define
/// goes right after it in that case.
pub fn stage_source(source: &str, stage: ShaderStage) -> String {
    let trimmed = source.trim_start();
    if trimmed.starts_with("#version") {
        let (version, rest) = match trimmed.find('\n') {
            Some(newline) => trimmed.split_at(newline + 1),
            None => (trimmed, ""),
        };
        let mut staged = String::with_capacity(source.len() + 32);
        staged.push_str(version);
        if !version.ends_with('\n') {
            staged.push('\n');
        }
        staged.push_str(stage.define());
        staged.push_str(rest);
        staged
    } else {
        format!("{}{source}", stage.define())
    }
}
