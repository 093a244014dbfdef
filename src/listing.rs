//! Listado textual del árbol.
//!
//! Esta es la etapa posterior mínima que alimenta al artefacto `.asm`.
//! No es generación de código: recorre el árbol en post-orden y emite
//! una instrucción de pila por nodo, de modo que el orden de operandos
//! y la clasificación de cada hoja quedan visibles en la salida.

use std::io::{self, Write};

use crate::{
    ast::{Ast, IdentifierKind, Node, NumberKind},
    parse::Operator,
};

/// Escribe el listado completo de una unidad.
pub fn emit<W: Write>(ast: &Ast, unit: &str, output: &mut W) -> io::Result<()> {
    writeln!(output, "; kabsa listing for unit `{}`", unit)?;
    writeln!(output, ".text")?;
    writeln!(output, ".global {0}\n{0}:", unit)?;

    put_node(ast.root(), output)?;
    emit!(output, "ret")
}

fn put_node<W: Write>(node: &Node, output: &mut W) -> io::Result<()> {
    match node {
        Node::Number(number) => {
            let opcode = match number.kind() {
                NumberKind::Integer => "pushi",
                NumberKind::Double => "pushd",
            };

            emit!(output, opcode, "{}", number.value())
        }

        Node::Identifier(identifier) => {
            let opcode = match identifier.kind() {
                IdentifierKind::Constant => "loadc",
                IdentifierKind::Variable => "load",
                IdentifierKind::Function => "ref",
            };

            emit!(output, opcode, "{}", identifier.name())
        }

        Node::Operation(operation) => {
            for operand in operation.operands() {
                put_node(operand, output)?;
            }

            let arity = operation.operand_count();
            match Operator::try_from(operation.operator()) {
                Ok(operator) => emit!(output, operator.mnemonic(), "{}", arity),
                Err(()) => emit!(output, "op", "{}, {}", operation.operator().0, arity),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::OperatorToken;

    fn listing(ast: &Ast) -> String {
        let mut output = Vec::new();
        emit(ast, "prog", &mut output).unwrap();

        String::from_utf8(output).unwrap()
    }

    #[test]
    fn post_order_listing() {
        let mut call = Node::operation(Operator::Call);
        call.append_operand(Node::identifier(IdentifierKind::Function, "f".into()).unwrap())
            .unwrap();
        call.append_operand(Node::number(2.0)).unwrap();
        call.append_operand(Node::number(0.5)).unwrap();

        let mut negate = Node::operation(Operator::Negate);
        negate.append_operand(call).unwrap();

        let expected = "\
; kabsa listing for unit `prog`
.text
.global prog
prog:
\tref     f
\tpushi   2
\tpushd   0.5
\tcall    3
\tneg     1
\tret
";

        assert_eq!(listing(&Ast::finalize(negate)), expected);
    }

    #[test]
    fn unknown_operator_codes() {
        let mut node = Node::operation(OperatorToken(9));
        node.append_operand(Node::identifier(IdentifierKind::Constant, "k".into()).unwrap())
            .unwrap();

        let text = listing(&Ast::finalize(node));
        assert!(text.contains("\tloadc   k\n\top      9, 1\n"));
    }
}
