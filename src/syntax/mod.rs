//! Owned syntax tree for one Java compilation unit.
//!
//! The tree is an arena of [`Node`]s addressed by [`NodeId`]. Nodes keep a
//! back-reference to their parent and an ordered list of children, including
//! anonymous tokens, so that an unmodified tree prints back to exactly the
//! text it was parsed from.
//!
//! Trees visited by checks are never mutated. Fixes work on a private tree
//! obtained by re-parsing and describe their changes as a list of
//! [`Edit`]s, which [`SyntaxTree::apply`] records before [`print`] renders
//! the result.

mod edit;
mod print;
mod visit;

pub use edit::{Edit, Insertion};
pub use print::print;
pub use visit::{walk, Visitor};

use std::fmt;

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Byte range `[start, end)` in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `other` lies entirely inside this span.
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

macro_rules! node_kinds {
    ($($variant:ident => $name:literal,)*) => {
        /// Kind tag of a node.
        ///
        /// Named grammar nodes the analysis inspects have their own variant;
        /// other named nodes are [`NodeKind::Other`] and anonymous tokens
        /// (keywords, punctuation) are [`NodeKind::Token`].
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NodeKind {
            $($variant,)*
            Other(&'static str),
            Token(&'static str),
        }

        impl NodeKind {
            /// Map a tree-sitter node kind onto a tag.
            pub fn from_grammar(kind: &'static str, named: bool) -> Self {
                if !named {
                    return NodeKind::Token(kind);
                }
                match kind {
                    $($name => NodeKind::$variant,)*
                    other => NodeKind::Other(other),
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(NodeKind::$variant => $name,)*
                    NodeKind::Other(name) | NodeKind::Token(name) => name,
                }
            }
        }
    };
}

node_kinds! {
    Program => "program",
    PackageDeclaration => "package_declaration",
    ImportDeclaration => "import_declaration",
    ClassDeclaration => "class_declaration",
    InterfaceDeclaration => "interface_declaration",
    EnumDeclaration => "enum_declaration",
    RecordDeclaration => "record_declaration",
    AnnotationTypeDeclaration => "annotation_type_declaration",
    AnnotationTypeElementDeclaration => "annotation_type_element_declaration",
    ClassBody => "class_body",
    InterfaceBody => "interface_body",
    EnumBody => "enum_body",
    EnumBodyDeclarations => "enum_body_declarations",
    AnnotationTypeBody => "annotation_type_body",
    EnumConstant => "enum_constant",
    Superclass => "superclass",
    SuperInterfaces => "super_interfaces",
    ExtendsInterfaces => "extends_interfaces",
    TypeList => "type_list",
    Modifiers => "modifiers",
    MarkerAnnotation => "marker_annotation",
    Annotation => "annotation",
    AnnotationArgumentList => "annotation_argument_list",
    ElementValuePair => "element_value_pair",
    ElementValueArrayInitializer => "element_value_array_initializer",
    FieldDeclaration => "field_declaration",
    ConstantDeclaration => "constant_declaration",
    VariableDeclarator => "variable_declarator",
    MethodDeclaration => "method_declaration",
    ConstructorDeclaration => "constructor_declaration",
    CompactConstructorDeclaration => "compact_constructor_declaration",
    ConstructorBody => "constructor_body",
    ExplicitConstructorInvocation => "explicit_constructor_invocation",
    FormalParameters => "formal_parameters",
    FormalParameter => "formal_parameter",
    SpreadParameter => "spread_parameter",
    ReceiverParameter => "receiver_parameter",
    TypeParameters => "type_parameters",
    TypeParameter => "type_parameter",
    Block => "block",
    StaticInitializer => "static_initializer",
    ExpressionStatement => "expression_statement",
    LocalVariableDeclaration => "local_variable_declaration",
    ForStatement => "for_statement",
    EnhancedForStatement => "enhanced_for_statement",
    TryStatement => "try_statement",
    TryWithResourcesStatement => "try_with_resources_statement",
    ResourceSpecification => "resource_specification",
    Resource => "resource",
    CatchClause => "catch_clause",
    CatchFormalParameter => "catch_formal_parameter",
    CatchType => "catch_type",
    FinallyClause => "finally_clause",
    ThrowStatement => "throw_statement",
    SwitchExpression => "switch_expression",
    SwitchBlock => "switch_block",
    SwitchBlockStatementGroup => "switch_block_statement_group",
    SwitchRule => "switch_rule",
    LabeledStatement => "labeled_statement",
    BreakStatement => "break_statement",
    ContinueStatement => "continue_statement",
    LambdaExpression => "lambda_expression",
    InferredParameters => "inferred_parameters",
    MethodInvocation => "method_invocation",
    ArgumentList => "argument_list",
    FieldAccess => "field_access",
    ObjectCreationExpression => "object_creation_expression",
    InstanceofExpression => "instanceof_expression",
    MethodReference => "method_reference",
    CastExpression => "cast_expression",
    ParenthesizedExpression => "parenthesized_expression",
    StringLiteral => "string_literal",
    ClassLiteral => "class_literal",
    Identifier => "identifier",
    TypeIdentifier => "type_identifier",
    ScopedIdentifier => "scoped_identifier",
    ScopedTypeIdentifier => "scoped_type_identifier",
    GenericType => "generic_type",
    TypeArguments => "type_arguments",
    ArrayType => "array_type",
    Dimensions => "dimensions",
    VoidType => "void_type",
    IntegralType => "integral_type",
    FloatingPointType => "floating_point_type",
    BooleanType => "boolean_type",
    This => "this",
    Super => "super",
    LineComment => "line_comment",
    BlockComment => "block_comment",
    Javadoc => "javadoc",
    JavadocLink => "javadoc_link",
    JavadocReference => "javadoc_reference",
    JavadocText => "javadoc_text",
    Error => "ERROR",
}

impl NodeKind {
    pub fn is_token(&self) -> bool {
        matches!(self, NodeKind::Token(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(
            self,
            NodeKind::LineComment | NodeKind::BlockComment | NodeKind::Javadoc
        )
    }

    /// Declarations that introduce a named type.
    pub fn is_type_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::ClassDeclaration
                | NodeKind::InterfaceDeclaration
                | NodeKind::EnumDeclaration
                | NodeKind::RecordDeclaration
                | NodeKind::AnnotationTypeDeclaration
        )
    }

    pub fn is_annotation(&self) -> bool {
        matches!(self, NodeKind::MarkerAnnotation | NodeKind::Annotation)
    }

    /// Method-like declarations with a parameter list and an optional body.
    pub fn is_method_like(&self) -> bool {
        matches!(
            self,
            NodeKind::MethodDeclaration | NodeKind::ConstructorDeclaration
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a node came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Origin {
    Parsed,
    Inserted(Insertion),
}

/// One node of the tree.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    /// Grammar field under which this node hangs off its parent.
    pub field: Option<&'static str>,
    pub parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) origin: Origin,
    pub(crate) removed: bool,
    pub(crate) dirty: bool,
    pub(crate) parenthesized: bool,
}

impl Node {
    pub(crate) fn parsed(
        kind: NodeKind,
        span: Span,
        field: Option<&'static str>,
        parent: Option<NodeId>,
    ) -> Self {
        Self {
            kind,
            span,
            field,
            parent,
            children: Vec::new(),
            origin: Origin::Parsed,
            removed: false,
            dirty: false,
            parenthesized: false,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self.origin, Origin::Inserted(_))
    }
}

/// Offsets of line starts, for turning byte offsets into line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// 1-based line containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }

    /// Byte offset of the start of the line containing `offset`.
    pub fn line_start(&self, offset: usize) -> usize {
        self.starts[self.line_of(offset) - 1]
    }
}

/// Arena-backed syntax tree together with the text it was parsed from.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<Node>,
    root: NodeId,
    lines: LineIndex,
}

impl SyntaxTree {
    pub(crate) fn from_parts(source: String, nodes: Vec<Node>, root: NodeId) -> Self {
        let lines = LineIndex::new(&source);
        Self {
            source,
            nodes,
            root,
            lines,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Source text of a parsed node. Inserted nodes have no source text.
    pub fn text(&self, id: NodeId) -> &str {
        let node = self.node(id);
        if node.is_inserted() {
            return "";
        }
        &self.source[node.span.start..node.span.end]
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.lines
    }

    /// 1-based line number of a byte offset.
    pub fn line_number(&self, offset: usize) -> usize {
        self.lines.line_of(offset)
    }

    /// All live children, tokens included.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(move |&child| !self.node(child).removed)
    }

    /// Live children that are not anonymous tokens.
    pub fn named_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .filter(move |&child| !self.kind(child).is_token())
    }

    pub fn child_by_field(&self, id: NodeId, field: &str) -> Option<NodeId> {
        self.children_by_field(id, field).next()
    }

    pub fn children_by_field<'a>(
        &'a self,
        id: NodeId,
        field: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.children(id)
            .filter(move |&child| self.node(child).field == Some(field))
    }

    pub fn child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id).find(|&child| self.kind(child) == kind)
    }

    pub fn children_of_kind(
        &self,
        id: NodeId,
        kind: NodeKind,
    ) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(move |&child| self.kind(child) == kind)
    }

    /// Whether a token with the given text is a direct child of `id`.
    pub fn has_token(&self, id: NodeId, token: &str) -> bool {
        self.children(id)
            .any(|child| matches!(self.kind(child), NodeKind::Token(t) if t == token))
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Nearest strict ancestor whose kind matches `predicate`.
    pub fn find_ancestor(
        &self,
        id: NodeId,
        predicate: impl Fn(NodeKind) -> bool,
    ) -> Option<NodeId> {
        self.ancestors(id).find(|&ancestor| predicate(self.kind(ancestor)))
    }

    /// Pre-order listing of `id` and all live descendants.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            let children: Vec<NodeId> = self.children(next).collect();
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Deepest named node whose span covers `[start, end)`.
    pub fn covering_node(&self, start: usize, end: usize) -> Option<NodeId> {
        let target = Span::new(start, end);
        if !self.span(self.root).contains(target) {
            return None;
        }
        let mut current = self.root;
        'descend: loop {
            for child in self.named_children(current) {
                if self.span(child).contains(target) {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }
}

/// Iterator over strict ancestors of a node.
pub struct Ancestors<'a> {
    tree: &'a SyntaxTree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}
