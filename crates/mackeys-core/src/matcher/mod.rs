// Mackeys Matcher - Window/Device Predicate Engine
// Declarative MatchSpec compiled once into a MatchNode tree,
// evaluated against an EventContext on every key event

mod guard;

pub use guard::ValidationGuard;

use regex::Regex;
use serde::Deserialize;
use smallvec::SmallVec;

use crate::context::EventContext;

/// Author-time rule specification errors.
///
/// These surface while a config is being written or loaded; specs are
/// static afterwards, so none of them can occur on the keystroke path.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("match spec has no fields")]
    EmptySpec,

    #[error("both `{0}` and `not_{0}` are set")]
    ConflictingField(&'static str),

    #[error("`sublist` and `not_sublist` are mutually exclusive")]
    ConflictingLists,

    #[error("a sublist cannot be combined with leaf fields")]
    MixedListAndLeaf,

    #[error("sublist is empty")]
    EmptySublist,

    #[error("invalid pattern {pattern:?}: {source}")]
    BadPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Declarative predicate over the event context.
///
/// Up to three regex fields (class, title, device), each in a positive
/// or a negative flavor, plus exact-match LED fields; or a sublist of
/// specs combined with OR semantics (negated as a whole by
/// `not_sublist`). Deserializable from TOML rule files; unknown keys
/// are rejected at the serde layer.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct MatchSpec {
    pub class: Option<String>,
    pub not_class: Option<String>,
    pub title: Option<String>,
    pub not_title: Option<String>,
    pub device: Option<String>,
    pub not_device: Option<String>,
    pub numlock: Option<bool>,
    pub capslock: Option<bool>,
    pub case_sensitive: bool,
    pub sublist: Option<Vec<MatchSpec>>,
    pub not_sublist: Option<Vec<MatchSpec>>,
    /// Free-form label echoed in compile logging
    pub tag: Option<String>,
}

impl MatchSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_class(mut self, pattern: impl Into<String>) -> Self {
        self.class = Some(pattern.into());
        self
    }

    pub fn with_not_class(mut self, pattern: impl Into<String>) -> Self {
        self.not_class = Some(pattern.into());
        self
    }

    pub fn with_title(mut self, pattern: impl Into<String>) -> Self {
        self.title = Some(pattern.into());
        self
    }

    pub fn with_not_title(mut self, pattern: impl Into<String>) -> Self {
        self.not_title = Some(pattern.into());
        self
    }

    pub fn with_device(mut self, pattern: impl Into<String>) -> Self {
        self.device = Some(pattern.into());
        self
    }

    pub fn with_not_device(mut self, pattern: impl Into<String>) -> Self {
        self.not_device = Some(pattern.into());
        self
    }

    pub fn with_numlock(mut self, on: bool) -> Self {
        self.numlock = Some(on);
        self
    }

    pub fn with_capslock(mut self, on: bool) -> Self {
        self.capslock = Some(on);
        self
    }

    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    pub fn with_sublist(mut self, specs: Vec<MatchSpec>) -> Self {
        self.sublist = Some(specs);
        self
    }

    pub fn with_not_sublist(mut self, specs: Vec<MatchSpec>) -> Self {
        self.not_sublist = Some(specs);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    fn has_leaf_fields(&self) -> bool {
        self.class.is_some()
            || self.not_class.is_some()
            || self.title.is_some()
            || self.not_title.is_some()
            || self.device.is_some()
            || self.not_device.is_some()
            || self.numlock.is_some()
            || self.capslock.is_some()
    }

    fn has_list(&self) -> bool {
        self.sublist.is_some() || self.not_sublist.is_some()
    }
}

/// Which context field a leaf condition reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Class,
    Title,
    Device,
}

/// One compiled regex condition over a single context field
#[derive(Debug)]
pub struct FieldCond {
    field: Field,
    regex: Regex,
    negate: bool,
}

/// Compiled predicate tree.
///
/// Compiled once at rule registration; evaluation never allocates and
/// never revalidates, so the per-keystroke cost is bounded by the
/// regex searches alone.
#[derive(Debug)]
pub enum MatchNode {
    Leaf {
        conds: SmallVec<[FieldCond; 3]>,
        numlock: Option<bool>,
        capslock: Option<bool>,
    },
    Any {
        children: Vec<MatchNode>,
        negate: bool,
    },
}

impl MatchNode {
    /// Compile a spec, running full validation
    pub fn compile(spec: &MatchSpec) -> Result<Self, ConfigError> {
        Self::compile_inner(spec, true)
    }

    /// Compile a spec without validation.
    ///
    /// Used once the process-wide validation budget is exhausted.
    /// Malformed regexes still fail (they cannot compile), but
    /// structural problems degrade silently: with both polarities of a
    /// field set the positive one wins, and a sublist shadows any
    /// stray leaf fields.
    pub fn compile_unchecked(spec: &MatchSpec) -> Result<Self, ConfigError> {
        Self::compile_inner(spec, false)
    }

    fn compile_inner(spec: &MatchSpec, validate: bool) -> Result<Self, ConfigError> {
        if validate {
            validate_spec(spec)?;
        }
        if let Some(tag) = &spec.tag {
            log::trace!("compiling match spec [{}]", tag);
        }

        let list = match (&spec.not_sublist, &spec.sublist) {
            (Some(specs), _) => Some((specs, true)),
            (None, Some(specs)) => Some((specs, false)),
            (None, None) => None,
        };
        if let Some((specs, negate)) = list {
            let children = specs
                .iter()
                .map(|child| Self::compile_inner(child, validate))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(MatchNode::Any { children, negate });
        }

        let mut conds: SmallVec<[FieldCond; 3]> = SmallVec::new();
        let fields = [
            (Field::Class, &spec.class, &spec.not_class),
            (Field::Title, &spec.title, &spec.not_title),
            (Field::Device, &spec.device, &spec.not_device),
        ];
        for (field, positive, negative) in fields {
            let (pattern, negate) = match (positive, negative) {
                (Some(p), _) => (p, false),
                (None, Some(p)) => (p, true),
                (None, None) => continue,
            };
            conds.push(FieldCond {
                field,
                regex: build_regex(pattern, spec.case_sensitive)?,
                negate,
            });
        }

        Ok(MatchNode::Leaf {
            conds,
            numlock: spec.numlock,
            capslock: spec.capslock,
        })
    }

    /// Evaluate the predicate against one event context.
    ///
    /// Total and infallible: every context yields a plain boolean.
    pub fn evaluate(&self, ctx: &EventContext) -> bool {
        // With the screen focused elsewhere (KVM-switch software),
        // acting on the event would remap keys on the wrong machine.
        if !ctx.screen_has_focus {
            return false;
        }
        match self {
            MatchNode::Leaf {
                conds,
                numlock,
                capslock,
            } => {
                for cond in conds {
                    let text = match cond.field {
                        Field::Class => ctx.wm_class.as_deref(),
                        Field::Title => ctx.wm_name.as_deref(),
                        Field::Device => Some(ctx.device_name.as_str()),
                    };
                    let hit = text.is_some_and(|t| cond.regex.is_match(t));
                    if hit == cond.negate {
                        return false;
                    }
                }
                // Exact equality against a known LED state; an unset
                // context LED satisfies neither polarity.
                if let Some(want) = numlock {
                    if ctx.numlock_on != Some(*want) {
                        return false;
                    }
                }
                if let Some(want) = capslock {
                    if ctx.capslock_on != Some(*want) {
                        return false;
                    }
                }
                true
            }
            MatchNode::Any { children, negate } => {
                let any = children.iter().any(|child| child.evaluate(ctx));
                any != *negate
            }
        }
    }
}

fn validate_spec(spec: &MatchSpec) -> Result<(), ConfigError> {
    if spec.class.is_some() && spec.not_class.is_some() {
        return Err(ConfigError::ConflictingField("class"));
    }
    if spec.title.is_some() && spec.not_title.is_some() {
        return Err(ConfigError::ConflictingField("title"));
    }
    if spec.device.is_some() && spec.not_device.is_some() {
        return Err(ConfigError::ConflictingField("device"));
    }
    if spec.sublist.is_some() && spec.not_sublist.is_some() {
        return Err(ConfigError::ConflictingLists);
    }
    if spec.has_list() {
        if spec.has_leaf_fields() || spec.case_sensitive {
            return Err(ConfigError::MixedListAndLeaf);
        }
        let empty = spec
            .sublist
            .as_ref()
            .or(spec.not_sublist.as_ref())
            .is_some_and(|specs| specs.is_empty());
        if empty {
            return Err(ConfigError::EmptySublist);
        }
    } else if !spec.has_leaf_fields() {
        return Err(ConfigError::EmptySpec);
    }
    Ok(())
}

fn build_regex(pattern: &str, case_sensitive: bool) -> Result<Regex, ConfigError> {
    let source = if case_sensitive {
        pattern.to_string()
    } else {
        format!("(?i){}", pattern)
    };
    Regex::new(&source).map_err(|source| ConfigError::BadPattern {
        pattern: pattern.to_string(),
        source,
    })
}
