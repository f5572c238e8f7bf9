//! Compiled pattern representation for DSN templates.
//!
//! A template like `ftp://$Username:$Password@$Host:$Port/$BasePath` compiles
//! into an ordered list of [`Segment`]s. Compilation is deterministic and the
//! resulting [`Pattern`] is immutable, so it can be cached and shared across
//! threads.

mod compiler;
mod matcher;

pub use matcher::CaptureSet;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::DsnResult;

/// One element of a compiled pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    /// Literal text that must match the input verbatim.
    Literal(SmolStr),
    /// A named capture, bounded by the next literal delimiter.
    Variable(SmolStr),
    /// Exactly one of the listed literal options must match.
    Alternation(Vec<SmolStr>),
    /// A segment sequence that may be entirely absent from the input.
    Optional(Vec<Segment>),
}

impl Segment {
    /// The variable name, if this segment is a variable.
    pub fn variable_name(&self) -> Option<&str> {
        match self {
            Self::Variable(name) => Some(name),
            _ => None,
        }
    }
}

/// A compiled, immutable DSN pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pattern {
    template: String,
    segments: Vec<Segment>,
    scheme_hint: Option<SmolStr>,
}

impl Pattern {
    /// Compile a template string into a pattern.
    pub fn compile(template: &str) -> DsnResult<Pattern> {
        compiler::compile(template)
    }

    /// The template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// The ordered segments of this pattern.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The scheme text implied by a leading literal (the prefix before
    /// `://`), when the template does not start with an alternation.
    pub fn scheme_hint(&self) -> Option<&str> {
        self.scheme_hint.as_deref()
    }

    /// Match an input string against this pattern, producing captures.
    ///
    /// The input is expected to already have its query string stripped; see
    /// [`crate::query::split_query`].
    pub fn match_input(&self, input: &str) -> DsnResult<CaptureSet> {
        matcher::match_input(self, input)
    }

    /// The names of all variables in the pattern, in order of appearance.
    pub fn variables(&self) -> Vec<&str> {
        fn collect<'p>(segments: &'p [Segment], out: &mut Vec<&'p str>) {
            for segment in segments {
                match segment {
                    Segment::Variable(name) => out.push(name),
                    Segment::Optional(inner) => collect(inner, out),
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.segments, &mut out);
        out
    }
}
