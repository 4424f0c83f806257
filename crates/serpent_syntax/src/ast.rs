//! Expression-level AST for Python source fragments.
//!
//! Only expressions are modelled: statements are never built, because the consumers of this crate
//! (the f-string parser and the formatters) only need expressions embedded in replacement fields.
//!
//! ## Notes
//! - Every node carries an absolute [`Span`] (byte offsets into the original file), even when it was
//!   parsed from a substring such as an f-string replacement field.
//! - [`Expr::Error`] marks the position of a recovered syntax error so the surrounding tree stays usable.

use std::fmt;

/// Byte range in the original source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-length span at `offset`.
    pub fn point(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }
}

/// A point in the source: byte offset, one-indexed line, zero-indexed column (in characters).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Start of a file.
    pub const START: Location = Location {
        offset: 0,
        line: 1,
        column: 0,
    };

    pub fn new(offset: usize, line: usize, column: usize) -> Self {
        Self { offset, line, column }
    }
}

impl Default for Location {
    fn default() -> Self {
        Location::START
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column + 1)
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

pub type ExprBox = Box<Spanned<Expr>>;

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Name(String),
    Constant(Constant),
    /// Implicitly concatenated f-strings are merged into a single [`FString`].
    FString(FString),

    Unary(UnaryOp, ExprBox),
    Binary(ExprBox, BinaryOp, ExprBox),
    /// `a and b and c` keeps every operand in one node.
    BoolOp(BoolOp, Vec<Spanned<Expr>>),
    /// Chained comparison `a < b <= c`.
    Compare(ExprBox, Vec<(CompareOp, Spanned<Expr>)>),
    /// `target := value`
    Named(ExprBox, ExprBox),
    Lambda(Vec<Param>, ExprBox),
    IfExp {
        body: ExprBox,
        test: ExprBox,
        orelse: ExprBox,
    },
    Await(ExprBox),
    Yield(Option<ExprBox>),
    YieldFrom(ExprBox),
    Starred(ExprBox),

    Call(ExprBox, Vec<Arg>),
    Attribute(ExprBox, String),
    Subscript(ExprBox, ExprBox),
    Slice {
        lower: Option<ExprBox>,
        upper: Option<ExprBox>,
        step: Option<ExprBox>,
    },

    Tuple(Vec<Spanned<Expr>>),
    List(Vec<Spanned<Expr>>),
    Set(Vec<Spanned<Expr>>),
    Dict(Vec<DictItem>),
    ListComp(ExprBox, Vec<Comprehension>),
    SetComp(ExprBox, Vec<Comprehension>),
    DictComp(ExprBox, ExprBox, Vec<Comprehension>),
    Generator(ExprBox, Vec<Comprehension>),

    /// Python 2 backquote repr: `` `x` ``.
    Repr(ExprBox),

    /// Placeholder for a sub-expression that failed to parse; the error went to the sink.
    Error,
}

impl Expr {
    pub fn is_error(&self) -> bool {
        matches!(self, Expr::Error)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Str(String),
    Bytes(Vec<u8>),
    Int(i64),
    /// Integer literal too large for `i64`, kept as normalized digits (with radix prefix).
    LargeInt(String),
    Float(f64),
    Imaginary(f64),
    True,
    False,
    None,
    Ellipsis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Invert,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Plus => write!(f, "+"),
            UnaryOp::Minus => write!(f, "-"),
            UnaryOp::Invert => write!(f, "~"),
            UnaryOp::Not => write!(f, "not"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    MatMul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    LShift,
    RShift,
    BitOr,
    BitXor,
    BitAnd,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::MatMul => "@",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::BitAnd => "&",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    In,
    NotIn,
    Is,
    IsNot,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
            CompareOp::In => "in",
            CompareOp::NotIn => "not in",
            CompareOp::Is => "is",
            CompareOp::IsNot => "is not",
        };
        f.write_str(s)
    }
}

/// Call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Positional(Spanned<Expr>),
    Keyword(Spanned<String>, Spanned<Expr>),
    /// `*args`
    Star(Spanned<Expr>),
    /// `**kwargs`
    DoubleStar(Spanned<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DictItem {
    Pair(Spanned<Expr>, Spanned<Expr>),
    /// `**mapping`
    Unpack(Spanned<Expr>),
}

/// One `for ... in ... if ...` clause of a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub struct Comprehension {
    pub target: Spanned<Expr>,
    pub iter: Spanned<Expr>,
    pub ifs: Vec<Spanned<Expr>>,
    pub is_async: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Normal,
    /// `*args`
    VarArgs,
    /// `**kwargs`
    KwArgs,
    /// Bare `*` separator.
    KeywordOnlyMarker,
    /// `/` separator.
    PositionalOnlyMarker,
}

/// Lambda parameter (lambdas cannot carry annotations).
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<String>,
    pub kind: ParamKind,
    pub default: Option<Spanned<Expr>>,
    pub span: Span,
}

// ============================================================================
// F-strings
// ============================================================================

/// A parsed f-string body (or format specifier, which has the same shape).
#[derive(Debug, Clone, PartialEq)]
pub struct FString {
    pub parts: Vec<FStringPart>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FStringPart {
    /// Decoded literal text (`{{` already collapsed to `{`).
    Literal(Spanned<String>),
    FormattedValue(FormattedValue),
}

/// `{expression!conversion:format_spec}`
#[derive(Debug, Clone, PartialEq)]
pub struct FormattedValue {
    pub expression: ExprBox,
    pub conversion: Option<Conversion>,
    pub format_spec: Option<FString>,
    /// For self-documenting `{expr=}`, the source text up to and including `=` (whitespace kept).
    pub debug_text: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conversion {
    Str,
    Repr,
    Ascii,
}

impl Conversion {
    pub fn from_char(c: char) -> Option<Conversion> {
        match c {
            's' => Some(Conversion::Str),
            'r' => Some(Conversion::Repr),
            'a' => Some(Conversion::Ascii),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Conversion::Str => 's',
            Conversion::Repr => 'r',
            Conversion::Ascii => 'a',
        }
    }
}

impl FString {
    pub fn new(parts: Vec<FStringPart>, span: Span) -> Self {
        Self { parts, span }
    }

    /// Decoded literal segments, in order.
    pub fn literals(&self) -> impl Iterator<Item = &Spanned<String>> {
        self.parts.iter().filter_map(|p| match p {
            FStringPart::Literal(s) => Some(s),
            FStringPart::FormattedValue(_) => None,
        })
    }

    /// Replacement fields at this level (format specs are not descended into).
    pub fn formatted_values(&self) -> impl Iterator<Item = &FormattedValue> {
        self.parts.iter().filter_map(|p| match p {
            FStringPart::Literal(_) => None,
            FStringPart::FormattedValue(v) => Some(v),
        })
    }

    /// Visit every embedded expression, including those inside format specifiers, in source order.
    pub fn walk_expressions<'a>(&'a self, visit: &mut dyn FnMut(&'a Spanned<Expr>)) {
        for value in self.formatted_values() {
            visit(&value.expression);
            if let Some(spec) = &value.format_spec {
                spec.walk_expressions(visit);
            }
        }
    }

    /// `true` if any replacement field (at any depth) is an error marker.
    pub fn has_errors(&self) -> bool {
        let mut found = false;
        self.walk_expressions(&mut |e| found |= e.node.is_error());
        found
    }
}
