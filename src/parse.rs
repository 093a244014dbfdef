//! Análisis sintáctico.
//!
//! # Gramática
//! ```text
//! unit       := stmt (';' stmt)* ';'?
//! stmt       := 'const' id '=' expr
//!             | 'let' id '=' expr
//!             | 'fn' id '(' (id (',' id)*)? ')' '=' expr
//!             | id '=' expr
//!             | expr
//! expr       := additive (relational additive)?
//! additive   := term (('+' | '-') term)*
//! term       := power (('*' | '/' | '%') power)*
//! power      := unary ('^' power)?
//! unary      := '-' unary | primary
//! primary    := number | id | id '(' (expr (',' expr)*)? ')' | '(' expr ')'
//! ```
//!
//! Una unidad con una sola sentencia tiene a esa sentencia como raíz.
//! De lo contrario, la raíz es una operación [`Operator::Sequence`].
//!
//! La recursión y la altura del árbol están acotadas. Una entrada que
//! las excede se rechaza con [`ParserError::NestingTooDeep`].
//!
//! # Clasificación de identificadores
//! Toda referencia nace como [`IdentifierKind::Variable`], o como
//! [`IdentifierKind::Constant`] si el nombre fue declarado con `const`
//! antes en la misma unidad. Si a la referencia le sigue `(`, se
//! reclasifica como [`IdentifierKind::Function`].

use std::{
    collections::HashSet,
    fmt::{self, Display},
    iter::Peekable,
    marker::PhantomData,
};

use log::trace;
use thiserror::Error;

use crate::{
    ast::{Build, IdentifierKind, Node, OperatorToken, TreeError},
    error::Diagnostics,
    lex::{Identifier, Keyword, LexerError, Token, Tokenizer},
    source::{Located, Location},
};

/// Máxima profundidad de recursión entre paréntesis, llamadas,
/// negaciones y potencias.
const MAX_NESTING: usize = 128;

/// Máxima altura de un árbol producido por este motor.
const MAX_HEIGHT: usize = 512;

/// Operadores y producciones que originan nodos de operación.
///
/// El discriminante es el código de [`OperatorToken`] que se
/// almacena en el árbol.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum Operator {
    Sequence = 256,
    Const,
    Let,
    Assign,
    Function,
    Parameters,
    Call,
    Negate,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
}

impl Operator {
    const ALL: &'static [Operator] = &[
        Operator::Sequence,
        Operator::Const,
        Operator::Let,
        Operator::Assign,
        Operator::Function,
        Operator::Parameters,
        Operator::Call,
        Operator::Negate,
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
        Operator::Modulo,
        Operator::Power,
        Operator::Equal,
        Operator::NotEqual,
        Operator::Less,
        Operator::LessOrEqual,
        Operator::Greater,
        Operator::GreaterOrEqual,
    ];

    /// Mnemónico de la operación.
    pub fn mnemonic(self) -> &'static str {
        use Operator::*;

        match self {
            Sequence       => "seq",
            Const          => "const",
            Let            => "let",
            Assign         => "store",
            Function       => "func",
            Parameters     => "params",
            Call           => "call",
            Negate         => "neg",
            Add            => "add",
            Subtract       => "sub",
            Multiply       => "mul",
            Divide         => "div",
            Modulo         => "mod",
            Power          => "pow",
            Equal          => "eq",
            NotEqual       => "ne",
            Less           => "lt",
            LessOrEqual    => "le",
            Greater        => "gt",
            GreaterOrEqual => "ge",
        }
    }
}

impl Display for Operator {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Operator::*;

        let string = match self {
            Add            => "+",
            Subtract       => "-",
            Multiply       => "*",
            Divide         => "/",
            Modulo         => "%",
            Power          => "^",
            Equal          => "==",
            NotEqual       => "!=",
            Less           => "<",
            LessOrEqual    => "<=",
            Greater        => ">",
            GreaterOrEqual => ">=",
            Assign         => "=",
            other          => other.mnemonic(),
        };

        fmt.write_str(string)
    }
}

impl From<Operator> for OperatorToken {
    fn from(operator: Operator) -> Self {
        OperatorToken(operator as i32)
    }
}

impl TryFrom<OperatorToken> for Operator {
    type Error = ();

    fn try_from(OperatorToken(code): OperatorToken) -> Result<Self, Self::Error> {
        Operator::ALL
            .iter()
            .copied()
            .find(|&operator| operator as i32 == code)
            .ok_or(())
    }
}

#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ParserError {
    #[error("Expected token {0}, found {1} instead")]
    UnexpectedToken(Token, Token),

    #[error("Expected token {0}, none was found instead")]
    MissingToken(Token),

    #[error("Expected identifier")]
    ExpectedId,

    #[error("Expected an expression")]
    ExpectedExpr,

    #[error("Expected `;` or end of input")]
    ExpectedSeparator,

    #[error("Abrupt end of program")]
    UnexpectedEof,

    #[error("Expression nesting exceeds {0} levels")]
    NestingTooDeep(usize),

    #[error("Malformed syntax tree: {0}")]
    Tree(#[from] TreeError),
}

/// Razón por la cual un motor no produjo un árbol.
#[derive(Debug)]
pub enum Rejection {
    /// La entrada no es un programa válido. Los diagnósticos
    /// describen cada error encontrado.
    Syntax(Diagnostics),

    /// El motor violó un contrato del árbol. Es un defecto interno.
    Tree(Located<TreeError>),

    /// La entrada dejó de poder leerse a medio análisis.
    Input(Located<std::io::Error>),
}

/// Motor de análisis sintáctico.
///
/// Consume tokens y construye el árbol de una unidad completa, o
/// bien la rechaza por completo. Nunca se expone un árbol parcial.
pub trait Engine {
    fn parse(&mut self, start: Location, tokens: &mut dyn Tokenizer) -> Result<Node, Rejection>;
}

/// [`Engine`] de descenso recursivo para la gramática de este módulo.
#[derive(Default)]
pub struct DescentEngine {
    trace: bool,
}

impl DescentEngine {
    /// Crea un motor, opcionalmente registrando cada reducción con `log`.
    pub fn new(trace: bool) -> Self {
        DescentEngine { trace }
    }
}

impl Engine for DescentEngine {
    fn parse(&mut self, start: Location, tokens: &mut dyn Tokenizer) -> Result<Node, Rejection> {
        let tokens = tokens.try_exhaustive().map_err(lexical)?;

        let mut parser = Parser {
            tokens: tokens.iter().peekable(),
            last_known: start,
            constants: HashSet::new(),
            depth: 0,
            trace: self.trace,
            lifetime_hack: PhantomData,
        };

        parser.unit().map_err(|failure| {
            let (location, error) = failure.coerce().split();
            match error {
                ParserError::Tree(error) => Rejection::Tree(Located::at(error, location)),
                error => Rejection::Syntax(
                    Diagnostics::from(Located::at(error, location)).kind("Syntax error"),
                ),
            }
        })
    }
}

/// Un error de lectura no es un error léxico: se reporta aparte.
fn lexical(errors: Vec<Located<LexerError>>) -> Rejection {
    let (input, errors): (Vec<_>, Vec<_>) = errors
        .into_iter()
        .partition(|error| matches!(error.val(), LexerError::Input(_)));

    match input.into_iter().next().map(Located::split) {
        Some((location, LexerError::Input(error))) => Rejection::Input(Located::at(error, location)),
        _ => Rejection::Syntax(Diagnostics::from(errors).kind("Lexical error")),
    }
}

#[derive(Clone)]
struct Parser<'a, I: Iterator<Item = &'a Located<Token>> + Clone> {
    tokens: Peekable<I>,
    last_known: Location,
    constants: HashSet<Identifier>,
    depth: usize,
    trace: bool,
    lifetime_hack: PhantomData<&'a ()>,
}

/// Una falla débil permite probar otra alternativa; una estricta no.
enum Failure {
    Weak(Located<ParserError>),
    Strict(Located<ParserError>),
}

impl Failure {
    fn weak(self) -> Self {
        Failure::Weak(self.coerce())
    }

    fn strict(self) -> Self {
        Failure::Strict(self.coerce())
    }

    fn coerce(self) -> Located<ParserError> {
        match self {
            Failure::Weak(error) => error,
            Failure::Strict(error) => error,
        }
    }
}

type Parse<T> = Result<T, Failure>;

impl<'a, I: Iterator<Item = &'a Located<Token>> + Clone> Parser<'a, I> {
    fn unit(&mut self) -> Parse<Node> {
        let mut statements = vec![self.statement()?];

        loop {
            match self.tokens.peek().map(|token| token.val()) {
                None => break,
                Some(Token::Semicolon) => {
                    self.next()?;
                    if self.tokens.peek().is_none() {
                        break;
                    }

                    statements.push(self.statement()?);
                }

                Some(_) => {
                    self.next()?;
                    return self.fail(ParserError::ExpectedSeparator);
                }
            }
        }

        if statements.len() == 1 {
            Ok(statements.remove(0))
        } else {
            self.reduce(Operator::Sequence, statements)
        }
    }

    fn statement(&mut self) -> Parse<Node> {
        match self.peek() {
            Some(Token::Keyword(Keyword::Const)) => {
                self.next()?;

                let (name, value) = self.binding(IdentifierKind::Constant)?;
                if let Node::Identifier(identifier) = &name {
                    self.constants.insert(identifier.name().clone());
                }

                self.reduce(Operator::Const, vec![name, value])
            }

            Some(Token::Keyword(Keyword::Let)) => {
                self.next()?;

                let (name, value) = self.binding(IdentifierKind::Variable)?;
                self.reduce(Operator::Let, vec![name, value])
            }

            Some(Token::Keyword(Keyword::Function)) => self.function(),

            Some(Token::Id(_)) => {
                let assignment = self.attempt(|s| {
                    let name = s.identifier().map_err(Failure::weak)?;
                    let target = s.reference(name)?;
                    s.expect(Token::Assign).map_err(Failure::weak)?;

                    Ok(target)
                });

                match assignment {
                    Err(Failure::Weak(_)) => self.expr(),
                    Err(failure) => Err(failure),
                    Ok(target) => {
                        let value = self.expr().map_err(Failure::strict)?;
                        self.reduce(Operator::Assign, vec![target, value])
                    }
                }
            }

            _ => self.expr(),
        }
    }

    fn binding(&mut self, kind: IdentifierKind) -> Parse<(Node, Node)> {
        let name = self.id(kind)?;
        self.expect(Token::Assign)?;
        let value = self.expr().map_err(Failure::strict)?;

        Ok((name, value))
    }

    fn function(&mut self) -> Parse<Node> {
        self.keyword(Keyword::Function)?;
        let name = self.id(IdentifierKind::Function)?;

        self.expect(Token::OpenParen)?;
        let parameters =
            self.comma_separated(|s| s.id(IdentifierKind::Variable).map_err(Failure::weak))?;
        self.expect(Token::CloseParen)?;

        self.expect(Token::Assign)?;
        let body = self.expr().map_err(Failure::strict)?;

        let parameters = self.reduce(Operator::Parameters, parameters)?;
        self.reduce(Operator::Function, vec![name, parameters, body])
    }

    fn expr(&mut self) -> Parse<Node> {
        let lhs = self.additive()?;

        let operator = match self.peek() {
            Some(Token::Equal) => Operator::Equal,
            Some(Token::NotEqual) => Operator::NotEqual,
            Some(Token::Less) => Operator::Less,
            Some(Token::LessOrEqual) => Operator::LessOrEqual,
            Some(Token::Greater) => Operator::Greater,
            Some(Token::GreaterOrEqual) => Operator::GreaterOrEqual,
            _ => return Ok(lhs),
        };

        self.next()?;
        let rhs = self.additive().map_err(Failure::strict)?;

        self.reduce(operator, vec![lhs, rhs])
    }

    fn additive(&mut self) -> Parse<Node> {
        let mut lhs = self.term()?;

        loop {
            let operator = match self.peek() {
                Some(Token::Plus) => Operator::Add,
                Some(Token::Minus) => Operator::Subtract,
                _ => break Ok(lhs),
            };

            self.next()?;
            let rhs = self.term().map_err(Failure::strict)?;
            lhs = self.reduce(operator, vec![lhs, rhs])?;
        }
    }

    fn term(&mut self) -> Parse<Node> {
        let mut lhs = self.power()?;

        loop {
            let operator = match self.peek() {
                Some(Token::Times) => Operator::Multiply,
                Some(Token::Slash) => Operator::Divide,
                Some(Token::Percent) => Operator::Modulo,
                _ => break Ok(lhs),
            };

            self.next()?;
            let rhs = self.power().map_err(Failure::strict)?;
            lhs = self.reduce(operator, vec![lhs, rhs])?;
        }
    }

    fn power(&mut self) -> Parse<Node> {
        let base = self.unary()?;
        if self.peek() != Some(&Token::Caret) {
            return Ok(base);
        }

        // Asociativo por la derecha
        self.next()?;
        self.deepen()?;
        let exponent = self.power().map_err(Failure::strict)?;
        self.depth -= 1;

        self.reduce(Operator::Power, vec![base, exponent])
    }

    fn unary(&mut self) -> Parse<Node> {
        if self.peek() != Some(&Token::Minus) {
            return self.primary();
        }

        self.next()?;
        self.deepen()?;
        let operand = self.unary().map_err(Failure::strict)?;
        self.depth -= 1;

        self.reduce(Operator::Negate, vec![operand])
    }

    fn primary(&mut self) -> Parse<Node> {
        let token = self.next()?.into_inner();
        match token {
            Token::Number(value) => Ok(Node::number(value)),

            Token::Id(id) => {
                let mut reference = self.reference(id)?;
                if self.peek() != Some(&Token::OpenParen) {
                    return Ok(reference);
                }

                self.build(reference.reclassify_identifier(IdentifierKind::Function))?;

                self.expect(Token::OpenParen)?;
                self.deepen()?;

                let mut operands = vec![reference];
                operands.extend(self.comma_separated(Parser::expr)?);

                self.depth -= 1;
                self.expect(Token::CloseParen)?;

                self.reduce(Operator::Call, operands)
            }

            Token::OpenParen => {
                self.deepen()?;
                let inner = self.expr().map_err(Failure::strict)?;
                self.depth -= 1;

                self.expect(Token::CloseParen)?;
                Ok(inner)
            }

            _ => self.fail(ParserError::ExpectedExpr).map_err(Failure::weak),
        }
    }

    /// Construye una operación con sus operandos en orden.
    fn reduce(&mut self, operator: Operator, operands: Vec<Node>) -> Parse<Node> {
        let mut node = Node::operation(operator);
        for operand in operands {
            self.build(node.append_operand(operand))?;
        }

        if node.height() > MAX_HEIGHT {
            return self.fail(ParserError::NestingTooDeep(MAX_HEIGHT));
        }

        if self.trace {
            trace!("reduced {} at {}", node, self.last_known);
        }

        Ok(node)
    }

    fn comma_separated<T, F>(&mut self, mut rule: F) -> Parse<Vec<T>>
    where
        F: FnMut(&mut Self) -> Parse<T>,
    {
        let mut items = match self.attempt(|s| rule(s)) {
            Err(Failure::Weak(_)) => return Ok(Vec::new()),
            item => vec![item?],
        };

        while self.peek() == Some(&Token::Comma) {
            self.next()?;
            items.push(rule(self).map_err(Failure::strict)?);
        }

        Ok(items)
    }

    fn attempt<T, F>(&mut self, rule: F) -> Parse<T>
    where
        F: FnOnce(&mut Self) -> Parse<T>,
    {
        let mut fork = self.clone();

        let result = rule(&mut fork);
        if result.is_ok() {
            *self = fork;
        }

        result
    }

    fn identifier(&mut self) -> Parse<Identifier> {
        match self.next()?.into_inner() {
            Token::Id(id) => Ok(id),
            _ => self.fail(ParserError::ExpectedId),
        }
    }

    fn id(&mut self, kind: IdentifierKind) -> Parse<Node> {
        let name = self.identifier()?;
        self.build(Node::identifier(kind, name))
    }

    /// Uso de un nombre: constante si fue declarado con `const`.
    fn reference(&mut self, name: Identifier) -> Parse<Node> {
        let kind = if self.constants.contains(&name) {
            IdentifierKind::Constant
        } else {
            IdentifierKind::Variable
        };

        self.build(Node::identifier(kind, name))
    }

    /// Desciende un nivel de anidamiento; el llamador asciende al terminar.
    /// Las fallas no ascienden: abandonan al parser o a su fork.
    fn deepen(&mut self) -> Parse<()> {
        if self.depth >= MAX_NESTING {
            return self.fail(ParserError::NestingTooDeep(MAX_NESTING));
        }

        self.depth += 1;
        Ok(())
    }

    fn keyword(&mut self, keyword: Keyword) -> Parse<()> {
        self.expect(Token::Keyword(keyword))
    }

    fn expect(&mut self, token: Token) -> Parse<()> {
        match self.next().map(Located::into_inner) {
            Ok(found) if found == token => Ok(()),
            Ok(found) => self.fail(ParserError::UnexpectedToken(token, found)),
            Err(_) => self.fail(ParserError::MissingToken(token)),
        }
    }

    fn peek(&mut self) -> Option<&Token> {
        self.tokens.peek().map(|token| token.val())
    }

    fn next(&mut self) -> Parse<Located<Token>> {
        match self.tokens.next() {
            Some(token) => {
                self.last_known = token.location().clone();
                Ok(token.clone())
            }

            None => self.fail(ParserError::UnexpectedEof),
        }
    }

    /// Las violaciones de contrato del árbol nunca son recuperables.
    fn build<T>(&self, result: Build<T>) -> Parse<T> {
        result.map_err(|error| Failure::Strict(Located::at(error.into(), self.last_known.clone())))
    }

    fn fail<T>(&self, error: ParserError) -> Parse<T> {
        Err(Failure::Strict(Located::at(error, self.last_known.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{NumberKind, NodeType},
        lex::Lexer,
        source,
    };

    fn parse_str(text: &str) -> Result<Node, Rejection> {
        let (start, stream) = source::consume(text.as_bytes(), "test");
        let mut lexer = Lexer::new(start.clone(), stream);

        DescentEngine::new(true).parse(start, &mut lexer)
    }

    fn tree(text: &str) -> String {
        match parse_str(text) {
            Ok(node) => node.to_string(),
            Err(rejection) => panic!("{:?}", rejection),
        }
    }

    fn syntax_errors(text: &str) -> Vec<String> {
        match parse_str(text) {
            Err(Rejection::Syntax(diagnostics)) => diagnostics.messages().collect(),
            other => panic!("expected syntax failure, got {:?}", other),
        }
    }

    fn kind_of(node: &Node) -> IdentifierKind {
        match node {
            Node::Identifier(identifier) => identifier.kind(),
            other => panic!("not an identifier: {}", other),
        }
    }

    #[test]
    fn single_literals() {
        match parse_str("7").unwrap() {
            Node::Number(number) => {
                assert_eq!(number.value(), 7.0);
                assert_eq!(number.kind(), NumberKind::Integer);
            }

            other => panic!("unexpected {}", other),
        }

        match parse_str("3.14").unwrap() {
            Node::Number(number) => {
                assert_eq!(number.value(), 3.14);
                assert_eq!(number.kind(), NumberKind::Double);
            }

            other => panic!("unexpected {}", other),
        }
    }

    #[test]
    fn precedence_and_associativity() {
        assert_eq!(tree("1 + 2 * 3"), "(+ 1 (* 2 3))");
        assert_eq!(tree("1 - 2 - 3"), "(- (- 1 2) 3)");
        assert_eq!(tree("2 ^ 3 ^ 2"), "(^ 2 (^ 3 2))");
        assert_eq!(tree("-(a + 1) % 4"), "(% (neg (+ a 1)) 4)");
        assert_eq!(tree("a + 1 <= b"), "(<= (+ a 1) b)");
    }

    #[test]
    fn statements_and_sequences() {
        assert_eq!(tree("x = 1; y = x * 2;"), "(seq (= x 1) (= y (* x 2)))");
        assert_eq!(tree("let z = 0"), "(let z 0)");
        assert_eq!(tree("fn sq(v) = v * v"), "(func sq (params v) (* v v))");
        assert_eq!(tree("fn zero() = 0"), "(func zero (params) 0)");
    }

    #[test]
    fn calls_reclassify_identifiers() {
        let node = parse_str("f(1, x)").unwrap();
        assert_eq!(node.to_string(), "(call f 1 x)");
        assert_eq!(node.operand_count(), Ok(3));

        assert_eq!(kind_of(node.operand_at(0).unwrap()), IdentifierKind::Function);
        assert_eq!(kind_of(node.operand_at(2).unwrap()), IdentifierKind::Variable);
        assert_eq!(node.operand_at(1).unwrap().node_type(), NodeType::Number);
    }

    #[test]
    fn declared_constants_are_tagged() {
        let node = parse_str("const pi = 3.14; pi * r").unwrap();
        let product = node.operand_at(1).unwrap();

        assert_eq!(kind_of(node.operand_at(0).unwrap().operand_at(0).unwrap()), IdentifierKind::Constant);
        assert_eq!(kind_of(product.operand_at(0).unwrap()), IdentifierKind::Constant);
        assert_eq!(kind_of(product.operand_at(1).unwrap()), IdentifierKind::Variable);
    }

    #[test]
    fn operator_codes_round_trip() {
        for &operator in Operator::ALL {
            let token = OperatorToken::from(operator);
            assert_eq!(Operator::try_from(token), Ok(operator));
        }

        assert_eq!(Operator::try_from(OperatorToken(0)), Err(()));
    }

    #[test]
    fn unterminated_expressions_fail() {
        assert_eq!(syntax_errors("1 +"), vec!["Abrupt end of program"]);
        assert_eq!(
            syntax_errors("(1 + 2"),
            vec!["Expected token `)`, none was found instead"]
        );
        assert_eq!(syntax_errors(""), vec!["Abrupt end of program"]);
    }

    #[test]
    fn misplaced_tokens_fail() {
        assert_eq!(syntax_errors("1 2"), vec!["Expected `;` or end of input"]);
        assert_eq!(syntax_errors("const = 1"), vec!["Expected identifier"]);
        assert_eq!(syntax_errors("x = ;"), vec!["Expected an expression"]);
    }

    #[test]
    fn lexical_errors_prevent_parsing() {
        match parse_str("1 + $") {
            Err(Rejection::Syntax(diagnostics)) => {
                assert_eq!(diagnostics.len(), 1);
                assert!(diagnostics.to_string().starts_with("Lexical error"));
            }

            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn assignments_to_constants_keep_their_kind() {
        let node = parse_str("const k = 1; k = 2").unwrap();
        assert_eq!(node.to_string(), "(seq (const k 1) (= k 2))");

        let assignment = node.operand_at(1).unwrap();
        assert_eq!(kind_of(assignment.operand_at(0).unwrap()), IdentifierKind::Constant);

        let node = parse_str("k = 2").unwrap();
        assert_eq!(kind_of(node.operand_at(0).unwrap()), IdentifierKind::Variable);
    }

    #[test]
    fn deep_nesting_is_a_syntax_error() {
        let too_deep = vec![
            format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000)),
            format!("{}1", "-".repeat(200_000)),
            format!("f({}1{})", "f(".repeat(100_000), ")".repeat(100_000)),
            format!("2{}", "^2".repeat(100_000)),
            format!("1{}", " + 1".repeat(100_000)),
        ];

        for text in &too_deep {
            let messages = syntax_errors(text);
            assert_eq!(messages.len(), 1);
            assert!(messages[0].starts_with("Expression nesting exceeds"), "{}", messages[0]);
        }
    }

    #[test]
    fn moderate_nesting_is_accepted() {
        let text = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        assert_eq!(tree(&text), "x");

        let text = format!("1{}", " + 1".repeat(400));
        assert_eq!(parse_str(&text).unwrap().height(), 401);
    }

    #[test]
    fn read_failures_are_not_lexical_errors() {
        let (start, stream) = source::consume(&[b'1', 0xff, b'\n'][..], "test");
        let mut lexer = Lexer::new(start.clone(), stream);

        match DescentEngine::default().parse(start, &mut lexer) {
            Err(Rejection::Input(error)) => {
                assert_eq!(error.val().kind(), std::io::ErrorKind::InvalidData);
            }

            other => panic!("unexpected {:?}", other),
        }
    }
}
