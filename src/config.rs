//! Configuración desde línea de comandos.
//!
//! La CLI recibe exactamente dos argumentos posicionales: el archivo
//! de entrada y el directorio de salida. Cualquier otra cantidad es
//! un error de configuración y no se realiza trabajo alguno.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use bitflags::bitflags;
use clap::{crate_version, Arg, Command};

bitflags! {
    /// Rastreo de las fases delanteras mediante `log::trace!()`.
    pub struct Trace: u32 {
        /// Registrar cada token escaneado.
        const SCANNING = 0x01;

        /// Registrar cada reducción de la gramática.
        const PARSING = 0x02;
    }
}

/// Origen de una unidad de compilación.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Input {
    /// Entrada estándar, indicada como `-`.
    Stdin,

    /// Un archivo de texto.
    File(PathBuf),
}

/// Configuración de una ejecución del compilador.
#[derive(Clone, Debug)]
pub struct Config {
    pub input: Input,
    pub output_directory: PathBuf,
    pub trace: Trace,
}

impl Config {
    /// Construye la configuración a partir de `argv`.
    ///
    /// Los errores de clap incluyen `--help` y `--version`; el
    /// llamador decide cómo reportarlos.
    pub fn from_args<I, T>(args: I) -> Result<Config, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = command().try_get_matches_from(args)?;

        let input = match args.value_of("input") {
            Some("-") => Input::Stdin,
            Some(path) => Input::File(PathBuf::from(path)),
            None => unreachable!("clap allowed a missing input"),
        };

        let output_directory = args
            .value_of("output")
            .map(PathBuf::from)
            .unwrap_or_default();

        let mut trace = Trace::empty();
        if args.is_present("trace-scanning") {
            trace |= Trace::SCANNING;
        }

        if args.is_present("trace-parsing") {
            trace |= Trace::PARSING;
        }

        Ok(Config {
            input,
            output_directory,
            trace,
        })
    }

    /// Nombre de la unidad, del cual se deriva el nombre del artefacto.
    pub fn unit_name(&self) -> String {
        match &self.input {
            Input::Stdin => String::from("stdin"),
            Input::File(path) => unit_name(path),
        }
    }
}

/// Nombre de archivo hasta su primer `.`, p. ej. `dir/prog.kb` -> `prog`.
pub fn unit_name(path: &Path) -> String {
    let file_name = match path.file_name() {
        Some(name) => name.to_string_lossy(),
        None => return path.to_string_lossy().into_owned(),
    };

    match file_name.split('.').next() {
        Some(stem) if !stem.is_empty() => stem.to_owned(),
        _ => file_name.into_owned(),
    }
}

fn command() -> Command<'static> {
    Command::new("kabsa compiler")
        .version(crate_version!())
        .arg(
            Arg::new("input")
                .value_name("INPUT")
                .required(true)
                .help("Source file ('-' for stdin)"),
        )
        .arg(
            Arg::new("output")
                .value_name("OUTPUT_DIR")
                .required(true)
                .help("Directory where the .asm artifact is written"),
        )
        .arg(
            Arg::new("trace-scanning")
                .long("trace-scanning")
                .help("Log every scanned token"),
        )
        .arg(
            Arg::new("trace-parsing")
                .long("trace-parsing")
                .help("Log every grammar reduction"),
        )
}
