use std::mem;

use tracing::trace;

use crate::{
    ast::{ClassDef, Expression, FunctionDef, IfBranch},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{builder::build_expression, core::ParseResult},
    },
};

/// What the statement parser expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Between statements.
    BeginExpression,
    /// Collecting the tokens of an expression statement.
    ReadLine,
    /// After `func`, waiting for the name and `(`.
    DefineFunc,
    /// Inside the parameter list of a function, then waiting for `{`.
    FuncArgs,
    /// After `var`.
    DefineVar,
    /// After `class`, waiting for the name.
    DefineClass,
    /// After the class name: base classes, then `{`.
    ClassArgs,
    /// Collecting the expression of a `return`.
    ReturnLine,
    /// Inside the header of an `if`.
    IfCall,
    /// After `else`: `if` or `{` must follow.
    ExpectIfEnd,
    /// Inside the header of a `for` or `while`.
    LoopCall,
    /// Inside the header of a `foreach`.
    ForEach,
    /// After `import`, waiting for the path.
    ImportModule,
}

#[derive(Debug)]
enum FrameKind {
    Root,
    Block,
    Function {
        name:   String,
        params: Vec<String>,
    },
    Class {
        name:  String,
        bases: Vec<String>,
    },
    IfBranch {
        test:         Option<Expression>,
        continuation: bool,
    },
    Loop {
        init:    Option<Box<Expression>>,
        test:    Option<Box<Expression>>,
        iterate: Option<Box<Expression>>,
    },
    ForEach {
        variable: String,
        source:   Box<Expression>,
    },
}

#[derive(Debug)]
struct PendingIf {
    branches: Vec<IfBranch>,
    line:     usize,
}

/// An open `{ ... }` region. Each frame collects its own statements and keeps
/// the `if` chain that may still be continued by an `else`.
#[derive(Debug)]
struct Frame {
    kind:       FrameKind,
    statements: Vec<Expression>,
    pending_if: Option<PendingIf>,
    line:       usize,
}

impl Frame {
    const fn new(kind: FrameKind, line: usize) -> Self {
        Self { kind,
               statements: Vec::new(),
               pending_if: None,
               line }
    }
}

/// Turns a token stream into statements, one token at a time.
///
/// Top-level statements become available through
/// [`StatementParser::take_ready`] as soon as their terminator has been fed,
/// so a host can execute a script while it is still being read. An `if`
/// chain is held back until the next statement shows it has no further
/// `else`.
///
/// # Example
/// ```
/// use sable::interpreter::{lexer::tokenize, parser::statement::StatementParser};
///
/// let mut parser = StatementParser::new();
/// for (token, line) in tokenize("var x = 1; func f(a) { return a; }", 1).unwrap() {
///     parser.feed(token, line).unwrap();
/// }
///
/// assert_eq!(parser.take_ready().len(), 2);
/// assert!(parser.is_idle());
/// ```
#[derive(Debug)]
pub struct StatementParser {
    state:        ParseState,
    buffer:       Vec<(Token, usize)>,
    clauses:      Vec<Vec<(Token, usize)>>,
    depth:        usize,
    name:         Option<String>,
    params:       Vec<String>,
    bases:        Vec<String>,
    expect_comma: bool,
    header_open:  bool,
    header:       Option<FrameKind>,
    continuation: bool,
    construct:    &'static str,
    defining:     Option<String>,
    start_line:   usize,
    line:         usize,
    frames:       Vec<Frame>,
    ready:        Vec<Expression>,
}

impl Default for StatementParser {
    fn default() -> Self {
        Self::new()
    }
}

enum Collected {
    More,
    Semicolon,
    CloseBrace,
}

impl StatementParser {
    /// Creates a parser positioned between statements at the top level.
    #[must_use]
    pub fn new() -> Self {
        Self { state:        ParseState::BeginExpression,
               buffer:       Vec::new(),
               clauses:      Vec::new(),
               depth:        0,
               name:         None,
               params:       Vec::new(),
               bases:        Vec::new(),
               expect_comma: false,
               header_open:  false,
               header:       None,
               continuation: false,
               construct:    "",
               defining:     None,
               start_line:   0,
               line:         0,
               frames:       vec![Frame::new(FrameKind::Root, 0)],
               ready:        Vec::new(), }
    }

    /// The current state of the machine.
    #[must_use]
    pub const fn state(&self) -> ParseState {
        self.state
    }

    /// `true` when no statement is partially read and no `if` chain is being
    /// held back.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::BeginExpression
        && self.frames.len() == 1
        && self.frames[0].pending_if.is_none()
    }

    /// Discards all partial input.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Hands out the completed top-level statements in source order.
    pub fn take_ready(&mut self) -> Vec<Expression> {
        mem::take(&mut self.ready)
    }

    /// Feeds one token.
    ///
    /// # Parameters
    /// - `token`: The next token of the stream.
    /// - `line`: The line the token was read on.
    ///
    /// # Errors
    /// Returns a `ParseError` when the token cannot appear in the current
    /// state. The parser should be [`reset`](Self::reset) afterwards.
    pub fn feed(&mut self, token: Token, line: usize) -> ParseResult<()> {
        trace!(%token, line, state = ?self.state, depth = self.frames.len(), "feed");
        self.line = line;

        match self.state {
            ParseState::BeginExpression => self.begin(token, line),
            ParseState::ReadLine => self.read_line(token, line),
            ParseState::ReturnLine => self.return_line(token, line),
            ParseState::DefineFunc => self.define_func(token, line),
            ParseState::FuncArgs => self.func_args(token, line),
            ParseState::DefineVar => self.define_var(token, line),
            ParseState::DefineClass => self.define_class(token, line),
            ParseState::ClassArgs => self.class_args(token, line),
            ParseState::IfCall | ParseState::LoopCall | ParseState::ForEach => {
                self.header_token(token, line)
            },
            ParseState::ExpectIfEnd => self.expect_if_end(token, line),
            ParseState::ImportModule => self.import_module(token, line),
        }
    }

    /// Signals the end of input.
    ///
    /// A trailing expression without `;` is completed and a held-back `if`
    /// chain is released.
    ///
    /// # Errors
    /// `UnexpectedEndOfInput` if a brace, a header or a definition is still
    /// open.
    pub fn flush(&mut self) -> ParseResult<()> {
        if self.frames.len() > 1 {
            return Err(ParseError::UnexpectedEndOfInput { line: self.line });
        }

        match self.state {
            ParseState::BeginExpression => {},
            ParseState::ReadLine | ParseState::ReturnLine if self.depth == 0 => {
                self.complete_line(self.line)?;
            },
            ParseState::DefineVar if self.name.is_some() => {
                let name = self.name.take().unwrap_or_default();
                self.emit(Expression::DefineVar { name,
                                                  initializer: None,
                                                  line: self.start_line });
                self.state = ParseState::BeginExpression;
            },
            _ => return Err(ParseError::UnexpectedEndOfInput { line: self.line }),
        }

        self.close_pending_if();
        Ok(())
    }

    fn unexpected(token: &Token, line: usize) -> ParseError {
        ParseError::UnexpectedToken { token: token.to_string(),
                                      line }
    }

    fn top(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn emit(&mut self, statement: Expression) {
        if self.frames.len() == 1 {
            trace!(line = statement.line(), "statement ready");
            self.ready.push(statement);
        } else {
            self.top().statements.push(statement);
        }
    }

    fn close_pending_if(&mut self) {
        if let Some(pending) = self.top().pending_if.take() {
            self.emit(Expression::IfElse { branches: pending.branches,
                                           line:     pending.line, });
        }
    }

    fn start(&mut self, state: ParseState, line: usize) {
        self.state = state;
        self.start_line = line;
        self.buffer.clear();
        self.clauses.clear();
        self.depth = 0;
        self.name = None;
        self.params.clear();
        self.bases.clear();
        self.expect_comma = false;
        self.header_open = false;
        self.header = None;
        self.defining = None;
    }

    fn open_frame(&mut self, kind: FrameKind) {
        self.frames.push(Frame::new(kind, self.start_line));
        self.state = ParseState::BeginExpression;
    }

    fn begin(&mut self, token: Token, line: usize) -> ParseResult<()> {
        if token == Token::Else {
            if self.top().pending_if.is_none() {
                return Err(ParseError::DanglingElse { line });
            }
            self.state = ParseState::ExpectIfEnd;
            self.start_line = line;
            return Ok(());
        }

        self.close_pending_if();

        match token {
            Token::Semicolon => {},
            Token::Func => self.start(ParseState::DefineFunc, line),
            Token::Var => self.start(ParseState::DefineVar, line),
            Token::Class => self.start(ParseState::DefineClass, line),
            Token::Return => self.start(ParseState::ReturnLine, line),
            Token::Import => self.start(ParseState::ImportModule, line),
            Token::If => {
                self.start(ParseState::IfCall, line);
                self.continuation = false;
                self.construct = "if";
            },
            Token::For | Token::While => {
                self.construct = if token == Token::For { "for" } else { "while" };
                self.start(ParseState::LoopCall, line);
            },
            Token::ForEach => {
                self.start(ParseState::ForEach, line);
                self.construct = "foreach";
            },
            Token::LBrace => {
                self.start_line = line;
                self.open_frame(FrameKind::Block);
            },
            Token::RBrace => self.close_frame(line)?,
            token => {
                self.start(ParseState::ReadLine, line);
                return self.read_line(token, line);
            },
        }

        Ok(())
    }

    /// Adds an expression token to the buffer and reports whether it ended
    /// the statement.
    fn collect(&mut self, token: Token, line: usize) -> ParseResult<Collected> {
        match token {
            Token::LParen | Token::LBracket => self.depth += 1,
            Token::RParen | Token::RBracket => {
                self.depth = self.depth
                                 .checked_sub(1)
                                 .ok_or_else(|| Self::unexpected(&token, line))?;
            },
            Token::Semicolon if self.depth == 0 => return Ok(Collected::Semicolon),
            Token::RBrace if self.depth == 0 => return Ok(Collected::CloseBrace),
            Token::Semicolon | Token::LBrace | Token::RBrace => {
                return Err(Self::unexpected(&token, line));
            },
            _ => {},
        }

        self.buffer.push((token, line));
        Ok(Collected::More)
    }

    fn read_line(&mut self, token: Token, line: usize) -> ParseResult<()> {
        match self.collect(token, line)? {
            Collected::More => Ok(()),
            Collected::Semicolon => self.complete_line(line),
            Collected::CloseBrace => {
                self.complete_line(line)?;
                self.close_frame(line)
            },
        }
    }

    fn return_line(&mut self, token: Token, line: usize) -> ParseResult<()> {
        self.read_line(token, line)
    }

    /// Builds the buffered expression and emits it as a statement.
    fn complete_line(&mut self, line: usize) -> ParseResult<()> {
        let tokens = mem::take(&mut self.buffer);
        self.depth = 0;
        let expression = if tokens.is_empty() {
            None
        } else {
            Some(build_expression(&tokens)?)
        };

        let statement = if self.state == ParseState::ReturnLine {
            Some(Expression::Return { value: expression.map(Box::new),
                                      line:  self.start_line, })
        } else {
            match (self.defining.take(), expression) {
                (Some(name), Some(initializer)) => {
                    Some(Expression::DefineVar { name,
                                                 initializer: Some(Box::new(initializer)),
                                                 line: self.start_line })
                },
                (Some(_), None) => {
                    return Err(ParseError::UnexpectedToken { token: ";".to_string(),
                                                             line });
                },
                (None, expression) => expression,
            }
        };

        self.state = ParseState::BeginExpression;
        if let Some(statement) = statement {
            self.emit(statement);
        }
        Ok(())
    }

    fn define_func(&mut self, token: Token, line: usize) -> ParseResult<()> {
        match token {
            Token::Identifier(name) if self.name.is_none() => self.name = Some(name),
            Token::LParen if self.name.is_some() => self.state = ParseState::FuncArgs,
            token => return Err(Self::unexpected(&token, line)),
        }
        Ok(())
    }

    fn func_args(&mut self, token: Token, line: usize) -> ParseResult<()> {
        if self.header_open {
            if token != Token::LBrace {
                return Err(Self::unexpected(&token, line));
            }
            let name = self.name.take().unwrap_or_default();
            let params = mem::take(&mut self.params);
            self.open_frame(FrameKind::Function { name, params });
            return Ok(());
        }

        match token {
            Token::Identifier(param) if !self.expect_comma => {
                self.params.push(param);
                self.expect_comma = true;
            },
            Token::Comma if self.expect_comma => self.expect_comma = false,
            Token::RParen if self.expect_comma || self.params.is_empty() => {
                self.header_open = true;
            },
            token => return Err(Self::unexpected(&token, line)),
        }
        Ok(())
    }

    fn define_var(&mut self, token: Token, line: usize) -> ParseResult<()> {
        let Some(name) = self.name.take() else {
            return match token {
                Token::Identifier(name) => {
                    self.name = Some(name);
                    Ok(())
                },
                token => Err(Self::unexpected(&token, line)),
            };
        };

        match token {
            Token::Semicolon => {
                self.emit(Expression::DefineVar { name,
                                                  initializer: None,
                                                  line: self.start_line });
                self.state = ParseState::BeginExpression;
                Ok(())
            },
            Token::Operator(op) if op == "=" => {
                self.defining = Some(name);
                self.state = ParseState::ReadLine;
                Ok(())
            },
            token => {
                // `var x += 1` and friends: the definition becomes an operand.
                let start = self.start_line;
                self.state = ParseState::ReadLine;
                self.buffer.push((Token::Var, start));
                self.buffer.push((Token::Identifier(name), start));
                self.read_line(token, line)
            },
        }
    }

    fn define_class(&mut self, token: Token, line: usize) -> ParseResult<()> {
        match token {
            Token::Identifier(name) => {
                self.name = Some(name);
                self.expect_comma = true;
                self.state = ParseState::ClassArgs;
                Ok(())
            },
            token => Err(Self::unexpected(&token, line)),
        }
    }

    fn class_args(&mut self, token: Token, line: usize) -> ParseResult<()> {
        match token {
            Token::Comma if self.expect_comma => self.expect_comma = false,
            Token::Identifier(base) if !self.expect_comma => {
                self.bases.push(base);
                self.expect_comma = true;
            },
            Token::LBrace if self.expect_comma => {
                let name = self.name.take().unwrap_or_default();
                let bases = mem::take(&mut self.bases);
                self.open_frame(FrameKind::Class { name, bases });
            },
            token => return Err(Self::unexpected(&token, line)),
        }
        Ok(())
    }

    /// Reads `( clause ; clause ... ) {` for `if`, `for`, `while` and
    /// `foreach`.
    fn header_token(&mut self, token: Token, line: usize) -> ParseResult<()> {
        if let Some(kind) = self.header.take() {
            if token != Token::LBrace {
                return Err(Self::unexpected(&token, line));
            }
            self.open_frame(kind);
            return Ok(());
        }

        if !self.header_open {
            if token != Token::LParen {
                return Err(Self::unexpected(&token, line));
            }
            self.header_open = true;
            self.depth = 1;
            return Ok(());
        }

        match token {
            Token::LParen | Token::LBracket => self.depth += 1,
            Token::RParen | Token::RBracket => {
                self.depth -= 1;
                if self.depth == 0 {
                    if token != Token::RParen {
                        return Err(Self::unexpected(&token, line));
                    }
                    let clause = mem::take(&mut self.buffer);
                    self.clauses.push(clause);
                    self.header = Some(self.finish_header(line)?);
                    return Ok(());
                }
            },
            Token::Semicolon if self.depth == 1 => {
                let clause = mem::take(&mut self.buffer);
                self.clauses.push(clause);
                return Ok(());
            },
            Token::Semicolon | Token::LBrace | Token::RBrace => {
                return Err(Self::unexpected(&token, line));
            },
            _ => {},
        }

        self.buffer.push((token, line));
        Ok(())
    }

    fn clause_count_error(&self, expected: &'static str, line: usize) -> ParseError {
        ParseError::ClauseCount { construct: self.construct,
                                  expected,
                                  found: self.clauses.len(),
                                  line }
    }

    fn finish_header(&mut self, line: usize) -> ParseResult<FrameKind> {
        fn optional(tokens: &[(Token, usize)]) -> ParseResult<Option<Box<Expression>>> {
            if tokens.is_empty() {
                return Ok(None);
            }
            build_expression(tokens).map(|e| Some(Box::new(e)))
        }

        match self.state {
            ParseState::IfCall => {
                if self.clauses.len() != 1 {
                    return Err(self.clause_count_error("1", line));
                }
                let test = build_expression(&self.clauses[0])?;
                Ok(FrameKind::IfBranch { test:         Some(test),
                                         continuation: self.continuation, })
            },
            ParseState::LoopCall => {
                let (init, test, iterate) = match self.clauses.as_slice() {
                    [test] => (None, optional(test)?, None),
                    [test, iterate] => (None, optional(test)?, optional(iterate)?),
                    [init, test, iterate] => (optional(init)?, optional(test)?, optional(iterate)?),
                    _ => return Err(self.clause_count_error("1 to 3", line)),
                };
                Ok(FrameKind::Loop { init, test, iterate })
            },
            _ => {
                let [variable, source] = self.clauses.as_slice() else {
                    return Err(self.clause_count_error("2", line));
                };
                let variable = match variable.as_slice() {
                    [(Token::Identifier(name), _)] | [(Token::Var, _), (Token::Identifier(name), _)] => {
                        name.clone()
                    },
                    [(token, line), ..] => return Err(Self::unexpected(token, *line)),
                    [] => return Err(Self::unexpected(&Token::Semicolon, line)),
                };
                let source = Box::new(build_expression(source)?);
                Ok(FrameKind::ForEach { variable, source })
            },
        }
    }

    fn expect_if_end(&mut self, token: Token, line: usize) -> ParseResult<()> {
        match token {
            Token::If => {
                self.start(ParseState::IfCall, line);
                self.continuation = true;
                self.construct = "if";
                Ok(())
            },
            Token::LBrace => {
                self.open_frame(FrameKind::IfBranch { test:         None,
                                                      continuation: true, });
                Ok(())
            },
            token => Err(ParseError::ExpectedAfterElse { token: token.to_string(),
                                                         line }),
        }
    }

    fn import_module(&mut self, token: Token, line: usize) -> ParseResult<()> {
        match token {
            Token::Str(path) => {
                self.state = ParseState::BeginExpression;
                self.emit(Expression::Import { path,
                                               line: self.start_line });
                Ok(())
            },
            token => Err(Self::unexpected(&token, line)),
        }
    }

    /// Closes the innermost frame on `}` and emits what it built.
    fn close_frame(&mut self, line: usize) -> ParseResult<()> {
        if self.frames.len() == 1 {
            return Err(ParseError::UnbalancedBrace { line });
        }

        self.close_pending_if();
        let Some(Frame { kind,
                         statements,
                         line: start,
                         .. }) = self.frames.pop()
        else {
            return Err(ParseError::UnbalancedBrace { line });
        };
        self.state = ParseState::BeginExpression;

        match kind {
            FrameKind::Root => return Err(ParseError::UnbalancedBrace { line }),
            FrameKind::Block => self.emit(Expression::Block { statements,
                                                              line: start }),
            FrameKind::Function { name, params } => {
                self.emit(Expression::FunctionDef(FunctionDef { name,
                                                                params,
                                                                body: statements,
                                                                line: start }));
            },
            FrameKind::Class { name, bases } => {
                self.emit(Expression::ClassDef(ClassDef { name,
                                                          bases,
                                                          body: statements,
                                                          line: start }));
            },
            FrameKind::Loop { init, test, iterate } => {
                self.emit(Expression::Loop { init,
                                             test,
                                             iterate,
                                             body: statements,
                                             line: start });
            },
            FrameKind::ForEach { variable, source } => {
                self.emit(Expression::ForEach { variable,
                                                source,
                                                body: statements,
                                                line: start });
            },
            FrameKind::IfBranch { test, continuation } => {
                let is_else = test.is_none();
                let branch = IfBranch { test,
                                        body: statements,
                                        line: start };
                let parent = self.top();
                if continuation {
                    let Some(pending) = parent.pending_if.as_mut() else {
                        return Err(ParseError::DanglingElse { line: start });
                    };
                    pending.branches.push(branch);
                } else {
                    parent.pending_if = Some(PendingIf { branches: vec![branch],
                                                         line:     start, });
                }
                if is_else {
                    self.close_pending_if();
                }
            },
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interpreter::lexer::tokenize;

    fn parse(source: &str) -> ParseResult<Vec<Expression>> {
        let mut parser = StatementParser::new();
        let mut statements = Vec::new();
        for (token, line) in tokenize(source, 1)? {
            parser.feed(token, line)?;
            statements.extend(parser.take_ready());
        }
        parser.flush()?;
        statements.extend(parser.take_ready());
        Ok(statements)
    }

    #[test]
    fn statements_are_ready_at_their_terminator() {
        let mut parser = StatementParser::new();
        let tokens = tokenize("x = 1; y", 1).unwrap();
        let mut iter = tokens.into_iter();

        for (token, line) in iter.by_ref().take(4) {
            parser.feed(token, line).unwrap();
        }
        assert_eq!(parser.take_ready().len(), 1);

        for (token, line) in iter {
            parser.feed(token, line).unwrap();
        }
        assert!(parser.take_ready().is_empty());
        parser.flush().unwrap();
        assert_eq!(parser.take_ready().len(), 1);
    }

    #[test]
    fn function_definition_shape() {
        let statements = parse("func i(a) { return a * 2; }").unwrap();
        let [Expression::FunctionDef(def)] = statements.as_slice() else {
            panic!("expected one function definition, got {statements:?}");
        };
        assert_eq!(def.name, "i");
        assert_eq!(def.params, vec!["a".to_string()]);
        assert_eq!(def.body.len(), 1);
        assert!(matches!(def.body[0], Expression::Return { value: Some(_), .. }));
    }

    #[test]
    fn if_chain_is_held_until_the_next_statement() {
        let mut parser = StatementParser::new();
        for (token, line) in tokenize("if (a) { b; }", 1).unwrap() {
            parser.feed(token, line).unwrap();
        }
        assert!(parser.take_ready().is_empty());
        assert!(!parser.is_idle());

        for (token, line) in tokenize("c;", 2).unwrap() {
            parser.feed(token, line).unwrap();
        }
        let ready = parser.take_ready();
        assert_eq!(ready.len(), 2);
        assert!(matches!(ready[0], Expression::IfElse { .. }));
    }

    #[test]
    fn else_if_chains_collect_every_branch() {
        let statements =
            parse("if (a) { 1; } else if (b) { 2; } else if (c) { 3; } else { 4; }").unwrap();
        let [Expression::IfElse { branches, .. }] = statements.as_slice() else {
            panic!("expected one if chain, got {statements:?}");
        };
        assert_eq!(branches.len(), 4);
        assert!(branches[3].test.is_none());
    }

    #[test]
    fn nested_if_does_not_steal_the_outer_else() {
        let statements = parse("if (a) { if (b) { 1; } } else { 2; }").unwrap();
        let [Expression::IfElse { branches, .. }] = statements.as_slice() else {
            panic!("expected one if chain, got {statements:?}");
        };
        assert_eq!(branches.len(), 2);
        assert!(matches!(branches[0].body.as_slice(), [Expression::IfElse { .. }]));
    }

    #[test]
    fn dangling_else_is_rejected() {
        assert!(matches!(parse("x = 1; else { 2; }"), Err(ParseError::DanglingElse { .. })));
        assert!(matches!(parse("if (a) { 1; } else x;"),
                         Err(ParseError::ExpectedAfterElse { .. })));
    }

    #[test]
    fn loop_headers_accept_one_to_three_clauses() {
        let statements = parse("for (var i = 0; i < 3; i++) { x; }").unwrap();
        assert!(matches!(statements.as_slice(),
                         [Expression::Loop { init: Some(_),
                                             test: Some(_),
                                             iterate: Some(_),
                                             .. }]));

        let statements = parse("while (i < 3) { i++; }").unwrap();
        assert!(matches!(statements.as_slice(),
                         [Expression::Loop { init: None,
                                             test: Some(_),
                                             iterate: None,
                                             .. }]));

        assert!(matches!(parse("for (a; b; c; d) { }"),
                         Err(ParseError::ClauseCount { found: 4, .. })));
    }

    #[test]
    fn foreach_header_names_the_variable() {
        let statements = parse("foreach (var x; list) { print(x); }").unwrap();
        let [Expression::ForEach { variable, body, .. }] = statements.as_slice() else {
            panic!("expected foreach, got {statements:?}");
        };
        assert_eq!(variable, "x");
        assert_eq!(body.len(), 1);

        assert!(matches!(parse("foreach (x) { }"), Err(ParseError::ClauseCount { .. })));
    }

    #[test]
    fn classes_record_their_bases() {
        let statements = parse("class B, A { var y = 2; }").unwrap();
        let [Expression::ClassDef(def)] = statements.as_slice() else {
            panic!("expected a class, got {statements:?}");
        };
        assert_eq!(def.name, "B");
        assert_eq!(def.bases, vec!["A".to_string()]);
        assert_eq!(def.body.len(), 1);
    }

    #[test]
    fn closing_brace_ends_the_last_statement() {
        let statements = parse("{ a = 1 }").unwrap();
        let [Expression::Block { statements: inner, .. }] = statements.as_slice() else {
            panic!("expected a block, got {statements:?}");
        };
        assert_eq!(inner.len(), 1);
    }

    #[test]
    fn unbalanced_and_unterminated_input() {
        assert!(matches!(parse("}"), Err(ParseError::UnbalancedBrace { .. })));
        assert!(matches!(parse("func f() { x;"), Err(ParseError::UnexpectedEndOfInput { .. })));
    }

    #[test]
    fn var_forms() {
        let statements = parse("var a; var b = 2; var c += 1;").unwrap();
        assert!(matches!(statements[0], Expression::DefineVar { initializer: None, .. }));
        assert!(matches!(statements[1], Expression::DefineVar { initializer: Some(_), .. }));
        assert_eq!(statements[2].callee_name(), Some("+="));
    }

    #[test]
    fn import_takes_a_string() {
        let statements = parse("import \"lib.sbl\";").unwrap();
        assert_eq!(statements,
                   vec![Expression::Import { path: "lib.sbl".to_string(),
                                             line: 1, }]);
    }
}
