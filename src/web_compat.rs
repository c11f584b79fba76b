//! Legacy web-compatibility productions (ECMAScript Annex B)
//!
//! Each legacy relaxation is a [`WebCompatRule`]; the parser asks
//! [`WebCompat::allows`] before applying one. A rule is available only when
//! web compatibility is enabled, and most of them additionally require sloppy
//! mode. HTML-like comments are a lexical rule and only exist in scripts.

use crate::context::Context;
use crate::options::{ParseOptions, SourceType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WebCompatRule {
    /// `<!--` and line-leading `-->` start single-line comments
    HtmlComment,
    /// `017` and `089` numeric literals
    LegacyOctalLiteral,
    /// `\1` and `\8` escapes in string literals
    LegacyOctalEscape,
    /// `label: function f() {}`
    LabelledFunction,
    /// `if (x) function f() {}`
    IfFunctionDeclaration,
    /// Plain function declarations in blocks bind like `var`, so they may be
    /// redeclared in the same block
    BlockFunctionRedeclaration,
    /// `catch (e) { var e; }`
    CatchParameterRedeclaration,
    /// `for (var x = 0 in obj)`
    ForInVarInitializer,
}

impl WebCompatRule {
    pub const ALL: [WebCompatRule; 8] = [
        WebCompatRule::HtmlComment,
        WebCompatRule::LegacyOctalLiteral,
        WebCompatRule::LegacyOctalEscape,
        WebCompatRule::LabelledFunction,
        WebCompatRule::IfFunctionDeclaration,
        WebCompatRule::BlockFunctionRedeclaration,
        WebCompatRule::CatchParameterRedeclaration,
        WebCompatRule::ForInVarInitializer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WebCompatRule::HtmlComment => "html-comment",
            WebCompatRule::LegacyOctalLiteral => "legacy-octal-literal",
            WebCompatRule::LegacyOctalEscape => "legacy-octal-escape",
            WebCompatRule::LabelledFunction => "labelled-function",
            WebCompatRule::IfFunctionDeclaration => "if-function-declaration",
            WebCompatRule::BlockFunctionRedeclaration => "block-function-redeclaration",
            WebCompatRule::CatchParameterRedeclaration => "catch-parameter-redeclaration",
            WebCompatRule::ForInVarInitializer => "for-in-var-initializer",
        }
    }

    /// Rule is withdrawn in strict mode code
    pub fn sloppy_only(self) -> bool {
        !matches!(
            self,
            WebCompatRule::HtmlComment | WebCompatRule::CatchParameterRedeclaration
        )
    }

    /// Rule never applies to modules
    pub fn script_only(self) -> bool {
        self == WebCompatRule::HtmlComment
    }
}

/// The rule table for one parse
#[derive(Debug, Clone, Copy)]
pub struct WebCompat {
    enabled: bool,
    module: bool,
}

impl WebCompat {
    pub fn new(options: &ParseOptions, source_type: SourceType) -> Self {
        Self {
            enabled: !options.disable_web_compat,
            module: source_type == SourceType::Module,
        }
    }

    pub fn allows(&self, rule: WebCompatRule, ctx: Context) -> bool {
        let allowed = self.enabled
            && !(rule.script_only() && self.module)
            && !(rule.sloppy_only() && ctx.is_strict());
        if allowed {
            tracing::trace!(rule = rule.name(), "web compatibility rule in effect");
        }
        allowed
    }

    /// Whether the scanner should recognize HTML-like comments. Decided once
    /// per parse: the rule does not depend on strictness.
    pub fn html_comments(&self) -> bool {
        self.allows(WebCompatRule::HtmlComment, Context::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(options: &ParseOptions, source_type: SourceType) -> WebCompat {
        WebCompat::new(options, source_type)
    }

    #[test]
    fn test_sloppy_scripts_allow_every_rule() {
        let compat = table(&ParseOptions::default(), SourceType::Script);
        for rule in WebCompatRule::ALL {
            assert!(compat.allows(rule, Context::default()), "{}", rule.name());
        }
    }

    #[test]
    fn test_strict_code_keeps_only_strictness_independent_rules() {
        let compat = table(&ParseOptions::default(), SourceType::Script);
        let strict = Context::default() | Context::STRICT;
        assert!(compat.allows(WebCompatRule::HtmlComment, strict));
        assert!(compat.allows(WebCompatRule::CatchParameterRedeclaration, strict));
        assert!(!compat.allows(WebCompatRule::LabelledFunction, strict));
        assert!(!compat.allows(WebCompatRule::LegacyOctalLiteral, strict));
    }

    #[test]
    fn test_modules_have_no_html_comments() {
        let compat = table(&ParseOptions::default(), SourceType::Module);
        assert!(!compat.html_comments());
    }

    #[test]
    fn test_disabled_table_allows_nothing() {
        let options = ParseOptions::default().with_web_compat(false);
        let compat = table(&options, SourceType::Script);
        assert!(!compat.html_comments());
        for rule in WebCompatRule::ALL {
            assert!(!compat.allows(rule, Context::default()), "{}", rule.name());
        }
    }
}
