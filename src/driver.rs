//! Ciclo de vida de una unidad de compilación.
//!
//! Un [`Driver`] es dueño de exactamente una unidad: abre la entrada,
//! delega el escaneo y el análisis sintáctico a sus colaboradores,
//! conserva el árbol resultante y finalmente escribe el artefacto de
//! salida en `<directorio>/<unidad>.asm`.
//!
//! ```text
//! Idle -> Parsing -> Succeeded | Failed -> Idle (reset)
//! ```
//!
//! Cada llamada de análisis comienza con un [`Driver::reset()`]
//! implícito, por lo que una falla previa nunca impide un reintento.
//! El driver no es reentrante ni compartible entre hilos.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::{
    ast::{Ast, TreeError},
    config::{Config, Trace},
    lex::{LexerScanner, Scanner},
    parse::{DescentEngine, Engine, Rejection},
    source::{self, Location},
};

/// Extensión del artefacto de salida.
const OUTPUT_EXTENSION: &str = "asm";

/// Falla de una unidad de compilación.
///
/// Ninguna de estas fallas corrompe al driver; basta con reintentar.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DriverError {
    /// La entrada no pudo abrirse o dejó de poder leerse. Nunca se
    /// reporta como error de sintaxis.
    #[error("Failed to read input {}", path.display())]
    InputUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// La entrada no forma un programa válido. Los diagnósticos ya
    /// fueron escritos al flujo de errores.
    #[error("Unit `{unit}` failed to parse with {errors} error(s)")]
    SyntaxFailure { unit: String, errors: usize },

    /// El motor de análisis violó un contrato del árbol.
    #[error("Internal error while building the syntax tree of `{unit}`")]
    Tree {
        unit: String,
        #[source]
        source: TreeError,
    },

    /// El artefacto no pudo escribirse.
    #[error("Failed to write output artifact {}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Fase observable del driver.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Parsing,
    Succeeded,
    Failed,
}

enum State {
    Idle,
    Parsing,
    Succeeded(Ast),
    Failed,
}

/// Orquestador de una unidad de compilación.
pub struct Driver<E = io::Stderr> {
    output_directory: PathBuf,
    unit_name: String,
    scanner: Box<dyn Scanner>,
    engine: Box<dyn Engine>,
    errors: E,
    location: Option<Location>,
    state: State,
}

impl Driver {
    /// Crea un driver con los colaboradores por omisión, reportando
    /// diagnósticos a `stderr`.
    pub fn new<P, S>(output_directory: P, unit_name: S) -> Self
    where
        P: Into<PathBuf>,
        S: Into<String>,
    {
        Driver {
            output_directory: output_directory.into(),
            unit_name: unit_name.into(),
            scanner: Box::new(LexerScanner::default()),
            engine: Box::new(DescentEngine::default()),
            errors: io::stderr(),
            location: None,
            state: State::Idle,
        }
    }

    /// Crea un driver a partir de la configuración de la CLI.
    pub fn from_config(config: &Config) -> Self {
        Driver::new(&config.output_directory, config.unit_name()).with_trace(config.trace)
    }
}

impl<E: Write> Driver<E> {
    /// Redirige los diagnósticos a otro flujo.
    pub fn with_error_stream<F: Write>(self, errors: F) -> Driver<F> {
        Driver {
            output_directory: self.output_directory,
            unit_name: self.unit_name,
            scanner: self.scanner,
            engine: self.engine,
            errors,
            location: self.location,
            state: self.state,
        }
    }

    /// Reemplaza la tecnología de escaneo.
    pub fn with_scanner<S: Scanner + 'static>(self, scanner: S) -> Self {
        Driver {
            scanner: Box::new(scanner),
            ..self
        }
    }

    /// Reemplaza el motor de análisis sintáctico.
    pub fn with_engine<P: Engine + 'static>(self, engine: P) -> Self {
        Driver {
            engine: Box::new(engine),
            ..self
        }
    }

    /// Instala los colaboradores por omisión con el rastreo indicado.
    pub fn with_trace(self, trace: Trace) -> Self {
        self.with_scanner(LexerScanner::new(trace.contains(Trace::SCANNING)))
            .with_engine(DescentEngine::new(trace.contains(Trace::PARSING)))
    }

    /// Descarta el árbol previo y el rastreo de posiciones.
    pub fn reset(&mut self) {
        if !matches!(self.state, State::Idle) {
            debug!("Resetting unit `{}`", self.unit_name);
        }

        self.location = None;
        self.state = State::Idle;
    }

    /// Analiza la unidad desde la entrada estándar.
    pub fn parse_stdin(&mut self) -> Result<(), DriverError> {
        let stdin = io::stdin();
        let stdin = stdin.lock();

        self.parse_reader(stdin, "<stdin>")
    }

    /// Analiza la unidad desde un archivo.
    ///
    /// Un archivo que no puede abrirse, o un directorio, se reporta
    /// como [`DriverError::InputUnavailable`], nunca como error de sintaxis.
    pub fn parse_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), DriverError> {
        let path = path.as_ref();
        self.reset();

        let file = match open_regular(path) {
            Ok(file) => file,
            Err(source) => {
                self.state = State::Failed;
                return Err(DriverError::InputUnavailable {
                    path: path.to_owned(),
                    source,
                });
            }
        };

        // El archivo se cierra al salir de esta función, sin importar el resultado
        self.parse_reader(BufReader::new(file), path.display().to_string())
    }

    /// Analiza la unidad desde cualquier lector.
    pub fn parse_reader<R, S>(&mut self, reader: R, name: S) -> Result<(), DriverError>
    where
        R: BufRead,
        S: Into<String>,
    {
        self.reset();
        self.state = State::Parsing;

        let (start, stream) = source::consume(reader, name);
        debug!("Parsing unit `{}` from {}", self.unit_name, start.name());
        self.location = Some(start.clone());

        let mut tokens = self.scanner.scan(start.clone(), Box::new(stream));

        match self.engine.parse(start, tokens.as_mut()) {
            Ok(root) => {
                debug!("Unit `{}` parsed successfully", self.unit_name);
                self.state = State::Succeeded(Ast::finalize(root));
                Ok(())
            }

            Err(Rejection::Syntax(diagnostics)) => {
                self.state = State::Failed;
                if let Err(io_error) = write!(self.errors, "{}", diagnostics) {
                    warn!("Failed to report diagnostics: {}", io_error);
                }

                Err(DriverError::SyntaxFailure {
                    unit: self.unit_name.clone(),
                    errors: diagnostics.len(),
                })
            }

            Err(Rejection::Input(located)) => {
                self.state = State::Failed;

                let (location, source) = located.split();
                warn!("Input of unit `{}` became unreadable: {}", self.unit_name, source);

                Err(DriverError::InputUnavailable {
                    path: PathBuf::from(location.name()),
                    source,
                })
            }

            Err(Rejection::Tree(located)) => {
                self.state = State::Failed;

                let (location, source) = located.split();
                error!("Syntax tree contract violated at {}: {}", location, source);

                Err(DriverError::Tree {
                    unit: self.unit_name.clone(),
                    source,
                })
            }
        }
    }

    /// Fase actual.
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Idle => Phase::Idle,
            State::Parsing => Phase::Parsing,
            State::Succeeded(_) => Phase::Succeeded,
            State::Failed => Phase::Failed,
        }
    }

    /// Árbol de la unidad, disponible solamente tras un análisis exitoso.
    pub fn ast(&self) -> Option<&Ast> {
        match &self.state {
            State::Succeeded(ast) => Some(ast),
            _ => None,
        }
    }

    /// Entrega el árbol a una etapa posterior y vuelve a `Idle`.
    pub fn take_ast(&mut self) -> Option<Ast> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Succeeded(ast) => {
                self.location = None;
                Some(ast)
            }

            other => {
                self.state = other;
                None
            }
        }
    }

    /// Ubicación inicial de la unidad en curso, si hay alguna.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// Ruta del artefacto: `<directorio>/<unidad>.asm`.
    pub fn output_path(&self) -> PathBuf {
        let file_name = format!("{}.{}", self.unit_name, OUTPUT_EXTENSION);
        self.output_directory.join(file_name)
    }

    /// Flujo al cual se reportan los diagnósticos.
    pub fn error_stream(&self) -> &E {
        &self.errors
    }

    /// Escribe el artefacto de salida, sobrescribiéndolo si existe.
    ///
    /// No hay rollback: ante una falla, puede quedar un archivo parcial.
    pub fn write_output<C: AsRef<[u8]>>(&self, content: C) -> Result<PathBuf, DriverError> {
        let path = self.output_path();
        let failed = |source| DriverError::Output {
            path: path.clone(),
            source,
        };

        let file = File::create(&path).map_err(failed)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(content.as_ref()).map_err(failed)?;
        writer.flush().map_err(failed)?;

        info!("Wrote {}", path.display());
        Ok(path)
    }
}

/// Abre un archivo, rechazando directorios.
fn open_regular(path: &Path) -> io::Result<File> {
    let file = File::open(path)?;
    if file.metadata()?.is_dir() {
        return Err(io::Error::new(io::ErrorKind::Other, "Is a directory"));
    }

    Ok(file)
}
