//! Análisis léxico.
//!
//! # Tokenization
//! Esta es la primera fase del compilador. Descompone un [`InputStream`]
//! (flujo de caracteres) en unidades léxicas denominadas tokens. Los espacios
//! en blanco y los comentarios se descartan durante esta operación. Cada
//! token emitido está asociado a una ubicación en el código fuente original.
//!
//! # Contenido de un token
//! Operadores, puntuación y palabras clave se identifican por lo que son
//! y no incluyen lexemas. Los identificadores sí incluyen su lexema
//! original. Las constantes numéricas se resuelven a sus valores.
//!
//! # Reglas importantes del lenguaje
//! - Los identificadores empiezan con una letra y pueden incluir dígitos y `'_'`.
//! - El lenguaje es case-insensitive, por lo cual tanto `const` como `CONST`
//!   resultan en la palabra clave [`Keyword::Const`].
//! - Una constante numérica con punto decimal debe tener al menos un dígito
//!   después del punto.
//!
//! # Colaboración con el driver
//! El driver no depende de esta implementación en particular. Solamente
//! conoce a los traits [`Scanner`] y [`Tokenizer`], de modo que la
//! tecnología de escaneo puede reemplazarse sin tocar al resto del núcleo.
//!
//! # Errores
//! El lexer se recupera de errores descartando el resto de la línea.
//! Esto permite reportar más de un error por ejecución, pero no avanzar
//! a las demás fases de la compilación.

use crate::source::{InputStream, Located, Location};
use std::{
    fmt::{self, Display},
    iter::Peekable,
    rc::Rc,
    str::FromStr,
};

use log::trace;
use thiserror::Error;

// Case-insensitive
pub use unicase::Ascii as NoCase;

/// Error de escaneo.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LexerError {
    /// Error de E/S originado por el [`InputStream`].
    #[error("I/O error: {0}")]
    Input(#[from] std::io::Error),

    /// Carácter desconocido o inesperado en el flujo de entrada.
    #[error("Bad character {0:?} in input stream")]
    BadChar(char),

    /// Se esperaba un carácter específico en esta posición.
    #[error("Expected {0:?}")]
    Expected(char),

    /// Un punto decimal no fue seguido por dígitos.
    #[error("Expected at least one digit after the decimal point")]
    MissingFraction,

    /// La constante no es representable.
    #[error("Numeric literal overflow")]
    NumberOverflow,
}

/// Resultado de pedir el siguiente token.
pub type Lexed = Result<Located<Token>, Located<LexerError>>;

/// Fuente de tokens.
///
/// Es la única interfaz que las fases posteriores conocen del
/// análisis léxico: "dame el siguiente token".
pub trait Tokenizer {
    /// Obtiene el siguiente token o error, `None` al final de la entrada.
    fn next_token(&mut self) -> Option<Lexed>;

    /// Reduce la entrada a sea una secuencia conocida de tokens
    /// infalibles o una secuencia de errores.
    ///
    /// En caso de que ocurra al menos un error, se deja de acumular
    /// tokens y se recolectan solamente los errores restantes.
    fn try_exhaustive(&mut self) -> Result<Vec<Located<Token>>, Vec<Located<LexerError>>> {
        let mut tokens = Vec::new();

        while let Some(result) = self.next_token() {
            match result {
                Ok(token) => tokens.push(token),
                Err(error) => {
                    drop(tokens);

                    let mut errors = vec![error];
                    while let Some(result) = self.next_token() {
                        if let Err(error) = result {
                            errors.push(error);
                        }
                    }

                    return Err(errors);
                }
            }
        }

        Ok(tokens)
    }
}

/// Construye [`Tokenizer`]s sobre flujos de entrada.
pub trait Scanner {
    /// Comienza a escanear un flujo cuyo primer carácter se ubica en `start`.
    fn scan<'a>(&mut self, start: Location, input: Box<dyn InputStream + 'a>) -> Box<dyn Tokenizer + 'a>;
}

/// [`Scanner`] que produce instancias de [`Lexer`].
#[derive(Default)]
pub struct LexerScanner {
    trace: bool,
}

impl LexerScanner {
    /// Crea un scanner, opcionalmente registrando cada token con `log`.
    pub fn new(trace: bool) -> Self {
        LexerScanner { trace }
    }
}

impl Scanner for LexerScanner {
    fn scan<'a>(&mut self, start: Location, input: Box<dyn InputStream + 'a>) -> Box<dyn Tokenizer + 'a> {
        Box::new(Lexer::new(start, input).traced(self.trace))
    }
}

/// Un identificador.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(Rc<NoCase<String>>);

impl Identifier {
    /// Construye un identificador a partir de su lexema.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Identifier(Rc::new(NoCase::new(name.into())))
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Identifier::new(name)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for Identifier {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_ref().fmt(fmt)
    }
}

/// Objeto resultante del análisis léxico.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identificador.
    Id(Identifier),

    /// Palabra clave.
    Keyword(Keyword),

    /// Literal numérico.
    Number(f64),

    /// `=`
    Assign,

    /// `==`
    Equal,

    /// `!=`
    NotEqual,

    /// `<`
    Less,

    /// `<=`
    LessOrEqual,

    /// `>`
    Greater,

    /// `>=`
    GreaterOrEqual,

    /// `+`
    Plus,

    /// `-`
    Minus,

    /// `*`
    Times,

    /// `/`
    Slash,

    /// `%`
    Percent,

    /// `^`
    Caret,

    /// `,`
    Comma,

    /// `;`
    Semicolon,

    /// `(`
    OpenParen,

    /// `)`
    CloseParen,
}

impl Display for Token {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Token::*;

        let symbol = match self {
            Id(id) => return write!(fmt, "identifier `{}`", id),
            Keyword(keyword) => return write!(fmt, "keyword `{}`", keyword),
            Number(number) => return write!(fmt, "literal `{}`", number),
            Assign => "=",
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessOrEqual => "<=",
            Greater => ">",
            GreaterOrEqual => ">=",
            Plus => "+",
            Minus => "-",
            Times => "*",
            Slash => "/",
            Percent => "%",
            Caret => "^",
            Comma => ",",
            Semicolon => ";",
            OpenParen => "(",
            CloseParen => ")",
        };

        write!(fmt, "`{}`", symbol)
    }
}

/// Una palabra clave.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Const,
    Let,
    Function,
}

impl Display for Keyword {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            Keyword::Const    => "const",
            Keyword::Let      => "let",
            Keyword::Function => "fn",
        };

        fmt.write_str(string)
    }
}

impl FromStr for Keyword {
    type Err = ();

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        const KEYWORDS: &[(NoCase<&str>, Keyword)] = &[
            (NoCase::new("const"), Keyword::Const),
            (NoCase::new("let"),   Keyword::Let),
            (NoCase::new("fn"),    Keyword::Function),
        ];

        KEYWORDS
            .iter()
            .find(|&&(name, _)| name == NoCase::new(string))
            .map(|&(_, keyword)| keyword)
            .ok_or(())
    }
}

/// Máquina de estados para análisis léxico.
///
/// La salida del lexer, así como su siguiente estado, se define
/// a partir de tanto su estado actual como el siguiente carácter
/// encontrado en el flujo de entrada.
pub struct Lexer<S: Iterator> {
    source: Peekable<S>,
    state: State,
    start: Location,
    next: Location,
    trace: bool,
}

/// Posibles estados del lexer.
enum State {
    /// Estado que ocurre antes de encontrar el inicio de un token.
    Start,

    /// Estado de error, se descarta el resto de la línea.
    Error,

    /// Estado de completitud; siempre emite el token incluido
    /// sin consumir la entrada actual.
    Complete(Token),

    /// Se encontró `/`, puede iniciar un comentario.
    Slash,

    /// Comentario de línea.
    Comment,

    /// Se encontró `=`, `<` o `>`; puede seguir `=`.
    Relational(Token),

    /// Se encontró `!`, debe seguir `=`.
    Bang,

    /// Parte entera de una constante numérica.
    Integer(String),

    /// Parte fraccionaria de una constante numérica, incluyendo el punto.
    Fraction(String),

    /// Término que puede ser un identificador o una palabra clave.
    Word(String),
}

impl<S: InputStream> Lexer<S> {
    /// Crea un lexer en estado inicial a partir de un flujo.
    pub fn new(start: Location, source: S) -> Self {
        let next = start.clone();
        Lexer {
            source: source.peekable(),
            state: State::Start,
            start,
            next,
            trace: false,
        }
    }

    /// Habilita o deshabilita el registro de cada token emitido.
    pub fn traced(self, trace: bool) -> Self {
        Lexer { trace, ..self }
    }

    /// Intenta construir un siguiente token.
    fn lex(&mut self) -> Result<Option<(Token, Location)>, LexerError> {
        use {State::*, Token::*};

        let mut last_accepted = self.start.clone();
        let token = loop {
            let next_char = match self.source.peek() {
                None => None,
                Some(Ok((c, _))) => Some(*c),
                Some(Err(_)) => match self.source.next() {
                    Some(Err(error)) => break Err(error.into()),
                    _ => unreachable!("peeked I/O error vanished"),
                },
            };

            // La posición de origen avanza mientras no se haya
            // encontrado una frontera de token
            if let Start = self.state {
                self.start = self.next.clone();
            }

            match (&mut self.state, next_char) {
                // Condiciones de error: se descarta la línea donde
                // ocurrió el error
                (Error, None) => return Ok(None),
                (Error, Some('\n')) => self.state = Start,
                (Error, Some(_)) => (),

                (Start, None) => return Ok(None),
                (Start, Some(',')) => self.state = Complete(Comma),
                (Start, Some(';')) => self.state = Complete(Semicolon),
                (Start, Some('(')) => self.state = Complete(OpenParen),
                (Start, Some(')')) => self.state = Complete(CloseParen),
                (Start, Some('+')) => self.state = Complete(Plus),
                (Start, Some('-')) => self.state = Complete(Minus),
                (Start, Some('*')) => self.state = Complete(Times),
                (Start, Some('%')) => self.state = Complete(Percent),
                (Start, Some('^')) => self.state = Complete(Caret),
                (Start, Some('/')) => self.state = State::Slash,
                (Start, Some('!')) => self.state = Bang,
                (Start, Some('=')) => self.state = Relational(Assign),
                (Start, Some('<')) => self.state = Relational(Token::Less),
                (Start, Some('>')) => self.state = Relational(Token::Greater),

                (Start, Some(c)) if c.is_ascii_alphabetic() => self.state = Word(c.to_string()),
                (Start, Some(c)) if c.is_ascii_digit() => self.state = Integer(c.to_string()),

                (Start, Some(c)) if c.is_ascii_whitespace() => (),
                (Start, Some(c)) => break Err(LexerError::BadChar(c)),

                (Complete(value), _) => break Ok(std::mem::replace(value, Plus)),

                (State::Slash, Some('/')) => self.state = Comment,
                (State::Slash, _) => break Ok(Token::Slash),

                (Comment, Some('\n')) | (Comment, None) => self.state = Start,
                (Comment, Some(_)) => (),

                (Relational(first), Some('=')) => {
                    let combined = match first {
                        Assign => Equal,
                        Token::Less => LessOrEqual,
                        _ => GreaterOrEqual,
                    };

                    self.state = Complete(combined);
                }

                (Relational(first), _) => break Ok(std::mem::replace(first, Plus)),

                (Bang, Some('=')) => self.state = Complete(NotEqual),
                (Bang, _) => break Err(LexerError::Expected('=')),

                (Integer(digits), Some(c)) if c.is_ascii_digit() => digits.push(c),
                (Integer(digits), Some('.')) => {
                    let mut digits = std::mem::take(digits);
                    digits.push('.');

                    self.state = Fraction(digits);
                }

                (Integer(digits), _) => break number(digits),

                (Fraction(digits), Some(c)) if c.is_ascii_digit() => digits.push(c),
                (Fraction(digits), _) if digits.ends_with('.') => {
                    break Err(LexerError::MissingFraction)
                }

                (Fraction(digits), _) => break number(digits),

                (Word(word), Some(c)) if is_word_char(c) => word.push(c),
                (Word(word), _) => {
                    if let Ok(keyword) = self::Keyword::from_str(word) {
                        break Ok(Token::Keyword(keyword));
                    } else {
                        break Ok(Id(Identifier::new(std::mem::take(word))));
                    }
                }
            }

            // Si no hubo `break`, aquí se consume el carácter que
            // se observó con lookahead anteriormente
            if let Some(Ok((_, next_position))) = self.source.next() {
                last_accepted = std::mem::replace(&mut self.next, next_position);
            }
        };

        token.map(|token| Some((token, last_accepted)))
    }
}

impl<S: InputStream> Iterator for Lexer<S> {
    type Item = Lexed;

    fn next(&mut self) -> Option<Self::Item> {
        match self.lex() {
            Ok(None) => None,
            Ok(Some((token, last_accepted))) => {
                self.state = State::Start;

                let location = Location::span(self.start.clone(), &last_accepted);
                if self.trace {
                    trace!("scanned {} at {}", token, location);
                }

                Some(Ok(Located::at(token, location)))
            }

            Err(error) => {
                self.state = State::Error;
                Some(Err(Located::at(error, self.next.clone())))
            }
        }
    }
}

impl<S: InputStream> Tokenizer for Lexer<S> {
    fn next_token(&mut self) -> Option<Lexed> {
        self.next()
    }
}

/// Resuelve el valor de una constante numérica ya validada.
fn number(digits: &str) -> Result<Token, LexerError> {
    match digits.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Token::Number(value)),
        _ => Err(LexerError::NumberOverflow),
    }
}

/// Determina si un carácter puede pertenecer a un término.
fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
