use serde::{Deserialize, Serialize};

/// Kind tag of a syntax node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Root node spanning the whole buffer.
    SourceFile,

    // Declarations
    /// `import Foundation`
    ImportDecl,
    /// `struct`, `class`, `enum`, `protocol`, `extension` or `actor`.
    TypeDecl,
    /// `func`, `init`, `deinit` or `subscript`.
    FunctionDecl,
    /// `get`, `set`, `willSet`, `didSet` inside a property.
    AccessorDecl,
    /// `let` / `var` declaration.
    VariableDecl,
    /// One `name: Type = value` entry of a variable declaration.
    PatternBinding,
    /// `case a, b(Int)` inside an enum body.
    EnumCaseDecl,
    /// One element of an enum case declaration.
    EnumCaseElement,
    /// `typealias` or `associatedtype`.
    TypeAliasDecl,
    /// `operator` or `precedencegroup` declaration.
    OperatorDecl,

    // Declaration parts
    /// `@name` with optional arguments.
    Attribute,
    /// Run of declaration modifiers (`private static`).
    ModifierList,
    /// `<T: Equatable, U>`
    GenericParameterList,
    /// One generic parameter.
    GenericParameter,
    /// Parenthesised parameter list of a function, subscript or closure.
    ParameterClause,
    /// One parameter.
    Parameter,
    /// A type annotation.
    Type,

    // Statements
    /// `{ ... }` statement or member block.
    CodeBlock,
    /// Expression used as a statement.
    ExpressionStmt,
    /// `if` statement or expression.
    IfStmt,
    /// `guard ... else { }`
    GuardStmt,
    /// `while` loop.
    WhileStmt,
    /// `repeat { } while cond`
    RepeatWhileStmt,
    /// `for ... in` loop.
    ForInStmt,
    /// `switch` statement or expression.
    SwitchStmt,
    /// `case ...:` or `default:` arm, including its body statements.
    SwitchCase,
    /// `do { } catch { }`
    DoStmt,
    /// One `catch` clause.
    CatchClause,
    /// `defer { }`
    DeferStmt,
    /// `return`
    ReturnStmt,
    /// `throw`
    ThrowStmt,
    /// `break`, `continue` or `fallthrough`.
    ControlTransferStmt,
    /// `#if`, `#else`, `#endif` and similar directive lines.
    CompilerDirective,

    // Conditions
    /// Comma separated conditions of `if`, `guard` and `while`.
    ConditionList,
    /// `let x = value` condition.
    OptionalBinding,
    /// `case pattern = value`, as a condition or a statement.
    CaseCondition,

    // Patterns
    /// One pattern of a `case` label, with its `where` guard.
    CasePattern,
    /// `let` / `var` applied to a sub-pattern.
    BindingPattern,
    /// `is Type`
    CastPattern,

    // Expressions
    /// Operands joined by binary operators, casts or the ternary operator.
    SequenceExpr,
    /// Prefix operator applied to an operand.
    PrefixExpr,
    /// Postfix operator other than `!` and `?`.
    PostfixExpr,
    /// `try`, `try?`, `try!` or `await` applied to an expression.
    TryExpr,
    /// Identifier reference, with explicit generic arguments if any.
    IdentifierExpr,
    /// Number, boolean or `nil` literal.
    LiteralExpr,
    /// String literal, interpolated segments included.
    StringLiteralExpr,
    /// `.member` with the base type inferred.
    ImplicitMemberExpr,
    /// `base.member`
    MemberAccessExpr,
    /// Call with parenthesised and/or trailing closure arguments.
    CallExpr,
    /// `base[index]`
    SubscriptExpr,
    /// Parenthesised or bracketed argument list of a call or subscript.
    ArgumentList,
    /// One argument, optionally labeled.
    Argument,
    /// Parenthesised expression or tuple.
    TupleExpr,
    /// Array or dictionary literal.
    CollectionExpr,
    /// `{ params in statements }`
    ClosureExpr,
    /// Capture list, parameters and effects of a closure up to `in`.
    ClosureSignature,
    /// `value!`
    ForceUnwrapExpr,
    /// `value?`
    OptionalChainExpr,
    /// `\Type.path`
    KeyPathExpr,
    /// `#selector(...)`, `#available(...)`, `#file` and similar.
    PoundExpr,

    /// Unparsed token range.
    Error,
}

impl NodeKind {
    /// Returns true for declaration nodes.
    #[must_use]
    pub const fn is_declaration(self) -> bool {
        matches!(
            self,
            Self::ImportDecl
                | Self::TypeDecl
                | Self::FunctionDecl
                | Self::AccessorDecl
                | Self::VariableDecl
                | Self::EnumCaseDecl
                | Self::TypeAliasDecl
                | Self::OperatorDecl
        )
    }

    /// Returns true for nodes that can carry a suppression marker: statements,
    /// declarations, switch arms, pattern statements and error nodes.
    #[must_use]
    pub const fn is_statement_like(self) -> bool {
        self.is_declaration()
            || matches!(
                self,
                Self::ExpressionStmt
                    | Self::IfStmt
                    | Self::GuardStmt
                    | Self::WhileStmt
                    | Self::RepeatWhileStmt
                    | Self::ForInStmt
                    | Self::SwitchStmt
                    | Self::SwitchCase
                    | Self::DoStmt
                    | Self::DeferStmt
                    | Self::ReturnStmt
                    | Self::ThrowStmt
                    | Self::ControlTransferStmt
                    | Self::CompilerDirective
                    | Self::CaseCondition
                    | Self::Error
            )
    }

    /// Returns true for expression nodes.
    #[must_use]
    pub const fn is_expression(self) -> bool {
        matches!(
            self,
            Self::SequenceExpr
                | Self::PrefixExpr
                | Self::PostfixExpr
                | Self::TryExpr
                | Self::IdentifierExpr
                | Self::LiteralExpr
                | Self::StringLiteralExpr
                | Self::ImplicitMemberExpr
                | Self::MemberAccessExpr
                | Self::CallExpr
                | Self::SubscriptExpr
                | Self::TupleExpr
                | Self::CollectionExpr
                | Self::ClosureExpr
                | Self::ForceUnwrapExpr
                | Self::OptionalChainExpr
                | Self::KeyPathExpr
                | Self::PoundExpr
        )
    }
}
