use std::fmt;

use crate::interpreter::value::core::Value;

/// Binding strength of a function in operator position.
///
/// Ordered from loosest to tightest: `assign < boolean < compare < addsub <
/// muldiv < incdec < func`. The expression builder keeps nodes with higher
/// precedence deeper in the tree. Ordinary calls, literals and parenthesised
/// groups are `Func`, so they are never split by a later operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precedence {
    /// `=`, `+=`, `-=`, `*=`, `/=`
    Assign,
    /// `&&`, `||`
    Boolean,
    /// `==`, `!=`, `<`, `>`, `<=`, `>=`
    Compare,
    /// `+`, `-`
    AddSub,
    /// `*`, `/`, `%`
    MulDiv,
    /// `++`, `--`, `!`
    IncDec,
    /// Everything else.
    Func,
}

impl Precedence {
    /// Derives the precedence class from the shape of a function name.
    ///
    /// # Example
    /// ```
    /// use sable::ast::Precedence;
    ///
    /// assert_eq!(Precedence::of("+="), Precedence::Assign);
    /// assert_eq!(Precedence::of("*"), Precedence::MulDiv);
    /// assert_eq!(Precedence::of("print"), Precedence::Func);
    /// ```
    #[must_use]
    pub fn of(name: &str) -> Self {
        match name {
            "=" | "+=" | "-=" | "*=" | "/=" => Self::Assign,
            "&&" | "||" => Self::Boolean,
            "==" | "!=" | "<" | ">" | "<=" | ">=" => Self::Compare,
            "+" | "-" => Self::AddSub,
            "*" | "/" | "%" => Self::MulDiv,
            "++" | "--" | "!" => Self::IncDec,
            _ => Self::Func,
        }
    }
}

/// Represents a binary operator.
///
/// Binary operators include arithmetic, comparisons and boolean logic.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    /// Addition, concatenation and merging (`+`)
    Add,
    /// Subtraction (`-`)
    Sub,
    /// Multiplication (`*`)
    Mul,
    /// Division (`/`)
    Div,
    /// Modulo (`%`)
    Mod,
    /// Equal to (`==`)
    Equal,
    /// Not equal to (`!=`)
    NotEqual,
    /// Less than (`<`)
    Less,
    /// Greater than (`>`)
    Greater,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Logical and (`&&`)
    And,
    /// Logical or (`||`)
    Or,
}

/// Represents a unary operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnaryOperator {
    /// Arithmetic negation (e.g. `-x`).
    Negate,
    /// Logical NOT (e.g. `!x`).
    Not,
}

/// The assignment family. Its first operand is evaluated as a place rather
/// than a value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AssignOperator {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
    /// `++`
    Increment,
    /// `--`
    Decrement,
}

impl AssignOperator {
    /// Recognizes an assignment operator name.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "=" => Self::Assign,
            "+=" => Self::AddAssign,
            "-=" => Self::SubAssign,
            "*=" => Self::MulAssign,
            "/=" => Self::DivAssign,
            "++" => Self::Increment,
            "--" => Self::Decrement,
            _ => return None,
        })
    }

    /// The arithmetic applied before storing, if any.
    #[must_use]
    pub const fn arithmetic(self) -> Option<BinaryOperator> {
        match self {
            Self::Assign => None,
            Self::AddAssign | Self::Increment => Some(BinaryOperator::Add),
            Self::SubAssign | Self::Decrement => Some(BinaryOperator::Sub),
            Self::MulAssign => Some(BinaryOperator::Mul),
            Self::DivAssign => Some(BinaryOperator::Div),
        }
    }
}

/// An expression tree node.
///
/// Statements are expressions too: a script is a sequence of trees, each
/// consolidated to a value. Operators are not separate node kinds; `a + b` is
/// a `FunctionCall` whose callee resolves the function named `+`.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A constant.
    Value {
        /// The constant value.
        value: Value,
        /// Line number in the source code.
        line:  usize,
    },
    /// Reads a variable by name.
    ResolveVar {
        /// Name of the variable.
        name: String,
        /// Line number in the source code.
        line: usize,
    },
    /// Resolves a name in call position.
    ResolveFuncVar {
        /// Name of the function.
        name: String,
        /// Line number in the source code.
        line: usize,
    },
    /// `var name` or `var name = initializer`.
    DefineVar {
        /// Name of the variable.
        name:        String,
        /// The initial value, if any.
        initializer: Option<Box<Self>>,
        /// Line number in the source code.
        line:        usize,
    },
    /// A call: operators, named calls, `applyfunction` and `listindex`.
    FunctionCall {
        /// What is being called.
        callee:     Box<Self>,
        /// Arguments, in order.
        arguments:  Vec<Self>,
        /// Binding strength used while the tree is built.
        precedence: Precedence,
        /// Line number in the source code.
        line:       usize,
    },
    /// `func name(params) { body }`
    FunctionDef(FunctionDef),
    /// `class Name, Base { body }`
    ClassDef(ClassDef),
    /// `{ statements }`
    Block {
        /// Statements of the block.
        statements: Vec<Self>,
        /// Line number in the source code.
        line:       usize,
    },
    /// `return value;`
    Return {
        /// The returned expression.
        value: Option<Box<Self>>,
        /// Line number in the source code.
        line:  usize,
    },
    /// `for (init; test; iterate) { body }` and `while (test) { body }`.
    Loop {
        /// Runs once before the first test.
        init:    Option<Box<Self>>,
        /// Checked before each iteration; absent means always true.
        test:    Option<Box<Self>>,
        /// Runs after each iteration.
        iterate: Option<Box<Self>>,
        /// Loop body.
        body:    Vec<Self>,
        /// Line number in the source code.
        line:    usize,
    },
    /// `foreach (name; source) { body }`
    ForEach {
        /// The iteration variable.
        variable: String,
        /// The collection iterated over.
        source:   Box<Self>,
        /// Loop body.
        body:     Vec<Self>,
        /// Line number in the source code.
        line:     usize,
    },
    /// An `if` / `else if` / `else` chain.
    IfElse {
        /// The branches in source order.
        branches: Vec<IfBranch>,
        /// Line number in the source code.
        line:     usize,
    },
    /// `import "path";`
    Import {
        /// Path as written in the script.
        path: String,
        /// Line number in the source code.
        line: usize,
    },
    /// A list literal whose elements are not all constants of one type.
    List {
        /// Element expressions.
        elements: Vec<Self>,
        /// Line number in the source code.
        line:     usize,
    },
}

impl Expression {
    /// Returns the source line of the node.
    #[must_use]
    pub const fn line(&self) -> usize {
        match self {
            Self::Value { line, .. }
            | Self::ResolveVar { line, .. }
            | Self::ResolveFuncVar { line, .. }
            | Self::DefineVar { line, .. }
            | Self::FunctionCall { line, .. }
            | Self::Block { line, .. }
            | Self::Return { line, .. }
            | Self::Loop { line, .. }
            | Self::ForEach { line, .. }
            | Self::IfElse { line, .. }
            | Self::Import { line, .. }
            | Self::List { line, .. } => *line,
            Self::FunctionDef(def) => def.line,
            Self::ClassDef(def) => def.line,
        }
    }

    /// Builds a call to the function `name`.
    #[must_use]
    pub fn call(name: &str, arguments: Vec<Self>, precedence: Precedence, line: usize) -> Self {
        Self::FunctionCall { callee: Box::new(Self::ResolveFuncVar { name: name.to_string(),
                                                                     line }),
                             arguments,
                             precedence,
                             line }
    }

    /// The name of the callee when it is resolved by name.
    #[must_use]
    pub fn callee_name(&self) -> Option<&str> {
        match self {
            Self::FunctionCall { callee, .. } => match callee.as_ref() {
                Self::ResolveFuncVar { name, .. } => Some(name),
                _ => None,
            },
            _ => None,
        }
    }
}

/// A function definition.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    /// The name of the function.
    pub name:   String,
    /// The parameter names.
    pub params: Vec<String>,
    /// The statements run when the function is called.
    pub body:   Vec<Expression>,
    /// Line number in the source code.
    pub line:   usize,
}

/// A class definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    /// The name of the class.
    pub name:  String,
    /// Classes whose members are copied in before the body runs.
    pub bases: Vec<String>,
    /// Member definitions.
    pub body:  Vec<Expression>,
    /// Line number in the source code.
    pub line:  usize,
}

/// One branch of an `if` chain.
#[derive(Debug, Clone, PartialEq)]
pub struct IfBranch {
    /// The condition; `None` for a final `else`.
    pub test: Option<Expression>,
    /// Statements run when the branch is taken.
    pub body: Vec<Expression>,
    /// Line number in the source code.
    pub line: usize,
}

impl BinaryOperator {
    /// Recognizes a binary operator name.
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "%" => Self::Mod,
            "==" => Self::Equal,
            "!=" => Self::NotEqual,
            "<" => Self::Less,
            ">" => Self::Greater,
            "<=" => Self::LessEqual,
            ">=" => Self::GreaterEqual,
            "&&" => Self::And,
            "||" => Self::Or,
            _ => return None,
        })
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryOperator::{
            Add, And, Div, Equal, Greater, GreaterEqual, Less, LessEqual, Mod, Mul, NotEqual, Or,
            Sub,
        };
        let operator = match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            And => "&&",
            Or => "||",
        };
        write!(f, "{operator}")
    }
}
