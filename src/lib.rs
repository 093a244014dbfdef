//! Núcleo delantero del compilador de kabsa.
//!
//! # Front end
//! Cada unidad de compilación deriva de un único archivo de código
//! fuente o de la entrada estándar. El texto se somete primero a
//! análisis léxico en [`lex`], de lo cual se obtiene un flujo de tokens.
//! El flujo de tokens se reduce a un árbol de sintaxis abstracta
//! ([`ast`]) por medio de análisis sintáctico en [`parse`].
//!
//! # Driver
//! El [`driver`] orquesta una unidad completa: abre la entrada, invoca
//! a los colaboradores de escaneo y de análisis, conserva el árbol
//! resultante y escribe el artefacto `.asm`. Los colaboradores se
//! inyectan a través de los traits [`lex::Scanner`] y [`parse::Engine`],
//! por lo que el driver no depende de una tecnología de escaneo en
//! particular.
//!
//! # Salida
//! Este compilador aún no genera código. El artefacto de salida es un
//! listado de pila producido por [`listing`], suficiente para inspeccionar
//! el árbol y sobre el cual podrá construirse un generador de código.

#[macro_use]
mod macros;

pub mod ast;
pub mod config;
pub mod driver;
pub mod error;
pub mod lex;
pub mod listing;
pub mod parse;
pub mod source;
