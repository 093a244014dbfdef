//! Reporte de errores con ubicación.
//!
//! Los errores léxicos y sintácticos se acumulan en [`Diagnostics`],
//! cuya representación textual cita las líneas del código fuente
//! involucradas y subraya el rango exacto del error.

use crate::source::{Located, Location};
use std::{
    error::Error,
    fmt::{self, Debug, Display},
};

mod sealed {
    pub trait Sealed {}
}

/// Un error que conoce su ubicación en el código fuente.
pub trait LocatedError: sealed::Sealed {
    fn source(&self) -> &dyn Error;
    fn location(&self) -> &Location;
}

/// Colección de errores de una misma clase.
pub struct Diagnostics {
    kind: &'static str,
    errors: Vec<Box<dyn 'static + LocatedError>>,
}

impl Diagnostics {
    /// Reemplaza la clase de error que se imprime antes de cada mensaje.
    pub fn kind(self, kind: &'static str) -> Self {
        Diagnostics { kind, ..self }
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Itera sobre los mensajes de error, sin ubicación.
    pub fn messages(&self) -> impl Iterator<Item = String> + '_ {
        self.errors.iter().map(|error| error.source().to_string())
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Diagnostics {
            kind: "error",
            errors: Default::default(),
        }
    }
}

impl<E: 'static + LocatedError> From<E> for Diagnostics {
    fn from(error: E) -> Self {
        Diagnostics {
            errors: vec![Box::new(error)],
            ..Default::default()
        }
    }
}

impl<E: 'static + LocatedError> From<Vec<E>> for Diagnostics {
    fn from(errors: Vec<E>) -> Self {
        let errors = errors
            .into_iter()
            .map(|error| Box::new(error) as Box<dyn LocatedError>)
            .collect();

        Diagnostics {
            errors,
            ..Default::default()
        }
    }
}

impl Debug for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt.debug_struct("Diagnostics")
            .field("kind", &self.kind)
            .field("errors", &self.messages().collect::<Vec<_>>())
            .finish()
    }
}

impl Display for Diagnostics {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Diagnostics { kind, errors } = self;

        if errors.is_empty() {
            return writeln!(fmt, "No errors were reported");
        }

        for error in errors {
            writeln!(fmt, "{}: {}", kind, error.source())?;

            let location = error.location();
            writeln!(fmt, " --> {}", location)?;

            if location.with_line(location.start().line(), |_| ()).is_some() {
                quote(fmt, location)?;
            }

            writeln!(fmt)?;
        }

        let error_or_errors = if errors.len() == 1 { "error" } else { "errors" };
        writeln!(
            fmt,
            "Build failed with {} {}",
            errors.len(),
            error_or_errors
        )
    }
}

/// Cita las líneas de una ubicación y subraya su rango.
fn quote(fmt: &mut fmt::Formatter<'_>, location: &Location) -> fmt::Result {
    let (start, end) = (location.start(), location.end());
    let digits = end.line().to_string().chars().count();
    writeln!(fmt, "{:digits$} |", "", digits = digits)?;

    for line_number in start.line()..=end.line() {
        let quoted = location.with_line(line_number, |line| {
            writeln!(fmt, "{:>digits$} | {}", line_number, line, digits = digits)
        });

        if let Some(result) = quoted {
            result?;
        }
    }

    let (from, to) = (start.column(), end.column().saturating_sub(1).max(1));
    let skip = (from.min(to) - 1) as usize;
    let highlight = (from.max(to) - from.min(to) + 1) as usize;

    writeln!(
        fmt,
        "{:digits$} | {:skip$}{:^<highlight$}",
        "",
        "",
        "",
        digits = digits,
        skip = skip,
        highlight = highlight
    )
}

impl<E: Error> sealed::Sealed for Located<E> {}

impl<E: Error> LocatedError for Located<E> {
    fn source(&self) -> &dyn Error {
        self.val()
    }

    fn location(&self) -> &Location {
        Located::location(self)
    }
}
