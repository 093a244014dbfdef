//! Árbol de sintaxis abstracta.
//!
//! # Forma de los nodos
//! Todo nodo es exactamente una de tres variantes: constante numérica
//! ([`NumberNode`]), identificador ([`IdentifierNode`]) u operación
//! ([`OperationNode`]). La variante se fija al construir el nodo y es
//! lo único que se usa para despachar.
//!
//! # Ciclo de vida
//! La construcción ocurre en dos fases. Mientras el motor de análisis
//! sintáctico reduce producciones, los nodos son mutables a través de
//! un conjunto acotado de operaciones:
//!
//! - [`Node::append_operand()`]
//! - [`Node::reclassify_identifier()`]
//! - [`Node::replace_number_value()`]
//!
//! Una vez que el análisis termina, la raíz se sella en un [`Ast`], el
//! cual solamente expone referencias compartidas. Cada padre es dueño
//! exclusivo de sus hijos, por lo que destruir un nodo destruye su subárbol.

use std::fmt::{self, Display};
use thiserror::Error;

use crate::{lex::Identifier, parse::Operator};

/// Violación de contrato al construir o recorrer el árbol.
///
/// Estos errores indican un defecto en el motor que construye
/// el árbol, nunca un problema en el programa de entrada.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// Se intentó agregar un operando ausente.
    #[error("Attempted to append an absent operand")]
    InvalidOperand,

    /// Índice de operando fuera de rango.
    #[error("Operand index {index} out of range for operation with {count} operands")]
    IndexOutOfRange { index: usize, count: usize },

    /// La operación no aplica a esta variante de nodo.
    #[error("Expected {expected} node, found {found} node")]
    WrongVariant { expected: NodeType, found: NodeType },

    /// Los identificadores no pueden tener nombre vacío.
    #[error("Identifiers must not be empty")]
    EmptyIdentifier,
}

/// Resultado de una operación de construcción.
pub type Build<T> = Result<T, TreeError>;

/// Etiqueta de variante de un nodo.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NodeType {
    Number,
    Identifier,
    Operation,
}

impl Display for NodeType {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let string = match self {
            NodeType::Number => "number",
            NodeType::Identifier => "identifier",
            NodeType::Operation => "operation",
        };

        fmt.write_str(string)
    }
}

/// Clase de una constante numérica.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Double,
}

impl NumberKind {
    /// Clasifica un valor.
    ///
    /// Un valor es entero si convertirlo a `i32` y de vuelta no lo
    /// altera. Valores no finitos o fuera del rango de `i32` son
    /// siempre [`NumberKind::Double`].
    pub fn of(value: f64) -> Self {
        if value.is_finite() && f64::from(value as i32) == value {
            NumberKind::Integer
        } else {
            NumberKind::Double
        }
    }
}

/// Clase de un identificador.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IdentifierKind {
    Constant,
    Variable,
    Function,
}

/// Código del operador o producción que originó una operación.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OperatorToken(pub i32);

impl Display for OperatorToken {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Operator::try_from(*self) {
            Ok(operator) => operator.fmt(fmt),
            Err(()) => write!(fmt, "#{}", self.0),
        }
    }
}

/// Nodo del árbol.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Number(NumberNode),
    Identifier(IdentifierNode),
    Operation(OperationNode),
}

impl Node {
    /// Construye una constante numérica.
    pub fn number(value: f64) -> Self {
        Node::Number(NumberNode::new(value))
    }

    /// Construye un identificador.
    pub fn identifier(kind: IdentifierKind, name: Identifier) -> Build<Self> {
        IdentifierNode::new(kind, name).map(Node::Identifier)
    }

    /// Construye una operación sin operandos.
    pub fn operation<O: Into<OperatorToken>>(operator: O) -> Self {
        Node::Operation(OperationNode::new(operator))
    }

    /// Obtiene la etiqueta de variante.
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Number(_) => NodeType::Number,
            Node::Identifier(_) => NodeType::Identifier,
            Node::Operation(_) => NodeType::Operation,
        }
    }

    /// Agrega un operando al final de una operación.
    ///
    /// La operación toma ownership del operando.
    pub fn append_operand<C: Into<Option<Node>>>(&mut self, child: C) -> Build<()> {
        let operation = self.as_operation_mut()?;
        let child = child.into().ok_or(TreeError::InvalidOperand)?;

        operation.height = operation.height.max(child.height() + 1);
        operation.operands.push(child);
        Ok(())
    }

    /// Obtiene el operando en una posición de una operación.
    pub fn operand_at(&self, index: usize) -> Build<&Node> {
        self.as_operation()?.operand(index)
    }

    /// Cantidad de niveles del subárbol, contando a este nodo.
    ///
    /// Las hojas y las operaciones sin operandos miden 1.
    pub fn height(&self) -> usize {
        match self {
            Node::Operation(operation) => operation.height,
            _ => 1,
        }
    }

    /// Cantidad de operandos de una operación.
    pub fn operand_count(&self) -> Build<usize> {
        Ok(self.as_operation()?.operand_count())
    }

    /// Reemplaza la clase de un identificador, nada más.
    pub fn reclassify_identifier(&mut self, kind: IdentifierKind) -> Build<()> {
        match self {
            Node::Identifier(identifier) => {
                identifier.kind = kind;
                Ok(())
            }

            other => Err(other.wrong_variant(NodeType::Identifier)),
        }
    }

    /// Reemplaza el valor de una constante, reclasificándola.
    pub fn replace_number_value(&mut self, value: f64) -> Build<()> {
        match self {
            Node::Number(number) => {
                *number = NumberNode::new(value);
                Ok(())
            }

            other => Err(other.wrong_variant(NodeType::Number)),
        }
    }

    /// Accede a la variante de operación.
    pub fn as_operation(&self) -> Build<&OperationNode> {
        match self {
            Node::Operation(operation) => Ok(operation),
            other => Err(other.wrong_variant(NodeType::Operation)),
        }
    }

    fn as_operation_mut(&mut self) -> Build<&mut OperationNode> {
        match self {
            Node::Operation(operation) => Ok(operation),
            other => Err(other.wrong_variant(NodeType::Operation)),
        }
    }

    fn wrong_variant(&self, expected: NodeType) -> TreeError {
        TreeError::WrongVariant {
            expected,
            found: self.node_type(),
        }
    }
}

/// Notación de expresión-S, p. ej. `(+ 1 (* 2 x))`.
impl Display for Node {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Number(number) => write!(fmt, "{}", number.value()),
            Node::Identifier(identifier) => write!(fmt, "{}", identifier.name()),
            Node::Operation(operation) => {
                write!(fmt, "({}", operation.operator())?;
                for operand in operation.operands() {
                    write!(fmt, " {}", operand)?;
                }

                fmt.write_str(")")
            }
        }
    }
}

/// Constante numérica.
///
/// La clase se deriva del valor y no puede asignarse por separado.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NumberNode {
    value: f64,
    kind: NumberKind,
}

impl NumberNode {
    pub fn new(value: f64) -> Self {
        NumberNode {
            value,
            kind: NumberKind::of(value),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }
}

/// Referencia a un nombre.
#[derive(Clone, Debug, PartialEq)]
pub struct IdentifierNode {
    kind: IdentifierKind,
    name: Identifier,
}

impl IdentifierNode {
    pub fn new(kind: IdentifierKind, name: Identifier) -> Build<Self> {
        if name.as_ref().is_empty() {
            return Err(TreeError::EmptyIdentifier);
        }

        Ok(IdentifierNode { kind, name })
    }

    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    pub fn name(&self) -> &Identifier {
        &self.name
    }
}

/// Operación de aridad arbitraria.
///
/// Los operandos preservan el orden sintáctico de izquierda a derecha.
#[derive(Clone, Debug, PartialEq)]
pub struct OperationNode {
    operator: OperatorToken,
    operands: Vec<Node>,
    height: usize,
}

impl OperationNode {
    pub fn new<O: Into<OperatorToken>>(operator: O) -> Self {
        OperationNode {
            operator: operator.into(),
            operands: Vec::new(),
            height: 1,
        }
    }

    pub fn operator(&self) -> OperatorToken {
        self.operator
    }

    /// Obtiene un operando, fallando si `index` no existe.
    pub fn operand(&self, index: usize) -> Build<&Node> {
        self.operands.get(index).ok_or(TreeError::IndexOutOfRange {
            index,
            count: self.operands.len(),
        })
    }

    pub fn operand_count(&self) -> usize {
        self.operands.len()
    }

    pub fn operands(&self) -> &[Node] {
        &self.operands
    }
}

/// Árbol finalizado de una unidad de compilación.
///
/// Sella la raíz: a partir de aquí el árbol es inmutable.
#[derive(Clone, Debug, PartialEq)]
pub struct Ast(Node);

impl Ast {
    pub fn finalize(root: Node) -> Self {
        Ast(root)
    }

    pub fn root(&self) -> &Node {
        &self.0
    }
}

impl Display for Ast {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(fmt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variable(name: &str) -> Node {
        Node::identifier(IdentifierKind::Variable, name.into()).unwrap()
    }

    #[test]
    fn number_kind() {
        assert_eq!(NumberNode::new(4.0).kind(), NumberKind::Integer);
        assert_eq!(NumberNode::new(4.5).kind(), NumberKind::Double);
        assert_eq!(NumberNode::new(-3.0).kind(), NumberKind::Integer);
        assert_eq!(NumberNode::new(0.0).kind(), NumberKind::Integer);
        assert_eq!(NumberNode::new(-0.25).kind(), NumberKind::Double);
    }

    #[test]
    fn number_kind_at_the_edges() {
        assert_eq!(NumberKind::of(i32::MAX as f64), NumberKind::Integer);
        assert_eq!(NumberKind::of(i32::MIN as f64), NumberKind::Integer);
        assert_eq!(NumberKind::of(i32::MAX as f64 + 1.0), NumberKind::Double);
        assert_eq!(NumberKind::of(1e20), NumberKind::Double);
        assert_eq!(NumberKind::of(f64::INFINITY), NumberKind::Double);
        assert_eq!(NumberKind::of(f64::NAN), NumberKind::Double);
    }

    #[test]
    fn value_replacement_recomputes_kind() {
        let mut node = Node::number(2.0);
        node.replace_number_value(2.5).unwrap();

        match &node {
            Node::Number(number) => {
                assert_eq!(number.value(), 2.5);
                assert_eq!(number.kind(), NumberKind::Double);
            }

            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(
            variable("x").replace_number_value(1.0),
            Err(TreeError::WrongVariant {
                expected: NodeType::Number,
                found: NodeType::Identifier
            })
        );
    }

    #[test]
    fn append_preserves_order() {
        let (a, b, c) = (Node::number(1.0), variable("b"), Node::number(3.5));

        let mut node = Node::operation(Operator::Call);
        node.append_operand(a.clone()).unwrap();
        node.append_operand(b.clone()).unwrap();
        node.append_operand(c.clone()).unwrap();

        assert_eq!(node.operand_count(), Ok(3));
        assert_eq!(node.operand_at(0), Ok(&a));
        assert_eq!(node.operand_at(1), Ok(&b));
        assert_eq!(node.operand_at(2), Ok(&c));
    }

    #[test]
    fn absent_operand_is_rejected() {
        let mut node = Node::operation(Operator::Add);
        assert_eq!(node.append_operand(None::<Node>), Err(TreeError::InvalidOperand));
        assert_eq!(node.operand_count(), Ok(0));

        let mut number = Node::number(1.0);
        assert!(matches!(
            number.append_operand(Node::number(2.0)),
            Err(TreeError::WrongVariant { .. })
        ));
    }

    #[test]
    fn height_follows_the_deepest_operand() {
        let mut inner = Node::operation(Operator::Negate);
        assert_eq!(inner.height(), 1);

        inner.append_operand(Node::number(1.0)).unwrap();
        assert_eq!(inner.height(), 2);

        let mut outer = Node::operation(Operator::Add);
        outer.append_operand(inner).unwrap();
        outer.append_operand(variable("y")).unwrap();

        assert_eq!(outer.height(), 3);
        assert_eq!(variable("y").height(), 1);
    }

    #[test]
    fn index_past_count_fails() {
        let mut node = Node::operation(Operator::Negate);
        assert_eq!(
            node.operand_at(0),
            Err(TreeError::IndexOutOfRange { index: 0, count: 0 })
        );

        node.append_operand(Node::number(1.0)).unwrap();
        assert_eq!(
            node.operand_at(1),
            Err(TreeError::IndexOutOfRange { index: 1, count: 1 })
        );
    }

    #[test]
    fn reclassification_only_touches_kind() {
        let mut node = variable("f");
        node.reclassify_identifier(IdentifierKind::Function).unwrap();

        assert_eq!(node.node_type(), NodeType::Identifier);
        match &node {
            Node::Identifier(identifier) => {
                assert_eq!(identifier.kind(), IdentifierKind::Function);
                assert_eq!(identifier.name().to_string(), "f");
            }

            other => panic!("unexpected {:?}", other),
        }

        assert!(Node::number(1.0)
            .reclassify_identifier(IdentifierKind::Constant)
            .is_err());
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        assert_eq!(
            Node::identifier(IdentifierKind::Variable, "".into()),
            Err(TreeError::EmptyIdentifier)
        );
    }

    #[test]
    fn s_expressions() {
        let mut product = Node::operation(Operator::Multiply);
        product.append_operand(Node::number(2.0)).unwrap();
        product.append_operand(variable("x")).unwrap();

        let mut sum = Node::operation(Operator::Add);
        sum.append_operand(Node::number(1.0)).unwrap();
        sum.append_operand(product).unwrap();

        let ast = Ast::finalize(sum);
        assert_eq!(ast.to_string(), "(+ 1 (* 2 x))");
        assert_eq!(ast.root().node_type(), NodeType::Operation);
        assert_eq!(OperatorToken(-7).to_string(), "#-7");
    }
}
