//! Rastreo de ubicaciones en el código fuente.
//!
//! Tanto los tokens como los errores de las fases delanteras
//! cargan una [`Location`], la cual identifica un origen (archivo
//! o flujo) y un rango de posiciones línea-columna. Esto permite
//! que [`crate::error::Diagnostics`] señale el punto exacto donde
//! ocurrió un problema.

use std::{
    cell::RefCell,
    fmt::{self, Debug, Display, Formatter},
    io::{self, BufRead},
    ops::Range,
    rc::Rc,
    vec,
};

/// Ancho de los divisores de tabulador.
const TAB_STOP: u32 = 4;

/// Un flujo de entrada, carácter por carácter.
///
/// Cada carácter viene acompañado de la ubicación que le corresponde
/// al carácter que le sigue.
pub trait InputStream: Iterator<Item = Result<(char, Location), io::Error>> {}

impl<I> InputStream for I where I: Iterator<Item = Result<(char, Location), io::Error>> {}

/// Un objeto cualquiera con una posición original asociada.
#[derive(Debug, Clone)]
pub struct Located<T> {
    location: Location,
    value: T,
}

impl<T> Located<T> {
    /// Construye a partir de un valor y una ubicación.
    pub fn at(value: T, location: Location) -> Self {
        Located { value, location }
    }

    /// Obtiene el valor.
    pub fn val(&self) -> &T {
        &self.value
    }

    /// Obtiene la ubicación.
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Descarta la ubicación y toma ownership del valor.
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Descompone y toma ownership de las dos partes.
    pub fn split(self) -> (Location, T) {
        (self.location, self.value)
    }
}

/// Una ubicación está conformada por un origen y un rango de posiciones.
#[derive(Clone)]
pub struct Location {
    from: Rc<Source>,
    position: Range<Position>,
}

impl Location {
    /// Ubicación del primer carácter de un origen.
    fn start_of(from: Rc<Source>) -> Self {
        let start = Position::default();
        Location {
            from,
            position: start..start.advance(),
        }
    }

    /// Unifica un rango de ubicaciones. Se asume el mismo origen.
    pub fn span(from: Location, to: &Location) -> Self {
        Location {
            from: from.from,
            position: from.position.start..to.position.end,
        }
    }

    /// Obtiene la posición de inicio.
    pub fn start(&self) -> Position {
        self.position.start
    }

    /// Obtiene la posición de fin.
    pub fn end(&self) -> Position {
        self.position.end
    }

    /// Nombre del origen.
    pub fn name(&self) -> &str {
        &self.from.name
    }

    /// Presta una línea ya leída del origen, si existe.
    pub fn with_line<T, F>(&self, line: u32, with: F) -> Option<T>
    where
        F: FnOnce(&str) -> T,
    {
        let lines = self.from.lines.borrow();
        let index = (line as usize).checked_sub(1)?;

        lines.get(index).map(|line| with(line.as_str()))
    }
}

impl Display for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:", self.from.name)?;

        let Range { start, end } = self.position;
        if end == start.advance() {
            write!(formatter, "{}", start)
        } else {
            write!(formatter, "[{}-{}]", start, end.back())
        }
    }
}

impl Debug for Location {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        <Self as Display>::fmt(self, formatter)
    }
}

/// Una posición línea-columna en un archivo.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Position {
    line: u32,
    column: u32,
}

impl Position {
    /// Obtiene el número de línea.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Obtiene el número de columna.
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Incrementa el número de columna.
    pub fn advance(self) -> Position {
        Position {
            column: self.column + 1,
            ..self
        }
    }

    /// Decrementa el número de columna.
    pub fn back(self) -> Position {
        Position {
            column: self.column.saturating_sub(1).max(1),
            ..self
        }
    }

    /// Incrementa el número de línea y retorna a la columna 1.
    pub fn newline(self) -> Position {
        Position {
            line: self.line + 1,
            column: 1,
        }
    }

    /// Ajusta la posición a la siguiente columna de tabulador.
    pub fn tab(self) -> Position {
        Position {
            column: 1 + ((self.column - 1) / TAB_STOP + 1) * TAB_STOP,
            ..self
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 1 }
    }
}

impl Display for Position {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.line, self.column)
    }
}

/// Transforma un lector en un flujo que itera por carácter.
///
/// La ubicación retornada corresponde al primer carácter del flujo.
/// Las líneas leídas quedan registradas en el origen, de modo que
/// los diagnósticos posteriores puedan citarlas.
pub fn consume<R, S>(reader: R, name: S) -> (Location, Chars<R>)
where
    R: BufRead,
    S: Into<String>,
{
    let source = Rc::new(Source {
        name: name.into(),
        lines: Default::default(),
    });

    let start = Location::start_of(Rc::clone(&source));
    let chars = Chars {
        reader,
        source,
        line: Vec::new().into_iter(),
        here: Position::default(),
        done: false,
    };

    (start, chars)
}

/// Flujo de caracteres producido por [`consume()`].
pub struct Chars<R> {
    reader: R,
    source: Rc<Source>,
    line: vec::IntoIter<char>,
    here: Position,
    done: bool,
}

impl<R: BufRead> Chars<R> {
    /// Lee la siguiente línea. Retorna `false` al llegar a EOF.
    fn refill(&mut self) -> io::Result<bool> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(false);
        }

        // Toda línea termina en '\n', incluso la última
        let trimmed = line.trim_end_matches(&['\n', '\r'][..]);
        let mut chars: Vec<_> = trimmed.chars().collect();
        chars.push('\n');

        self.source.lines.borrow_mut().push(trimmed.to_owned());
        self.line = chars.into_iter();

        Ok(true)
    }
}

impl<R: BufRead> Iterator for Chars<R> {
    type Item = Result<(char, Location), io::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(c) = self.line.next() {
                let next = match c {
                    '\n' => self.here.newline(),
                    '\t' => self.here.tab(),
                    _ => self.here.advance(),
                };

                self.here = next;
                let location = Location {
                    from: Rc::clone(&self.source),
                    position: next..next.advance(),
                };

                return Some(Ok((c, location)));
            }

            if self.done {
                return None;
            }

            match self.refill() {
                Ok(true) => (),
                Ok(false) => self.done = true,
                Err(error) => {
                    self.done = true;
                    return Some(Err(error));
                }
            }
        }
    }
}

/// Nombre de origen e histórico interior de líneas.
struct Source {
    name: String,
    lines: RefCell<Vec<String>>,
}
