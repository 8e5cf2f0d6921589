#![doc = "Symbolic scalar expressions for STICK compilation\n\nA [`Scalar`] is a node in an immutable expression DAG built with the\nstandard arithmetic operators. Operand handles are shared, so a common\nsubexpression referenced by several parents stays one node and is\ninstantiated once downstream. [`flatten`] turns the DAG into a\ntopologically ordered operation list (leaves first, every distinct node\nexactly once) using an explicit worklist rather than recursion, so deep\nexpressions cannot exhaust the stack.\n"]
#![warn(missing_docs)]

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::ops;
use std::rc::Rc;

/// IR-wide result type
pub type Result<T> = std::result::Result<T, IrError>;

/// IR errors
#[derive(thiserror::Error, Debug)]
pub enum IrError {
    /// A literal load is NaN or infinite
    #[error("non-finite literal {0} in expression")]
    NonFiniteLiteral(f64),
}

/// Operation kind of an expression node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Literal value injection
    Load,
    /// Binary signed addition
    Add,
    /// Binary signed multiplication
    Mul,
    /// Unary negation
    Neg,
}

impl OpKind {
    /// Number of operand ports
    pub fn arity(self) -> usize {
        match self {
            OpKind::Load => 0,
            OpKind::Neg => 1,
            OpKind::Add | OpKind::Mul => 2,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpKind::Load => write!(f, "load"),
            OpKind::Add => write!(f, "add"),
            OpKind::Mul => write!(f, "mul"),
            OpKind::Neg => write!(f, "neg"),
        }
    }
}

#[derive(Debug)]
enum Node {
    Load(f64),
    Add(Scalar, Scalar),
    Mul(Scalar, Scalar),
    Neg(Scalar),
}

/// A node in a scalar expression DAG.
///
/// Cloning a `Scalar` clones the handle, not the node: clones and the
/// original refer to the same subexpression.
#[derive(Debug, Clone)]
pub struct Scalar {
    node: Rc<Node>,
}

impl Scalar {
    /// Create a literal load node
    pub fn new(value: f64) -> Self {
        Self::wrap(Node::Load(value))
    }

    fn wrap(node: Node) -> Self {
        Self {
            node: Rc::new(node),
        }
    }

    /// Operation kind of this node
    pub fn kind(&self) -> OpKind {
        match &*self.node {
            Node::Load(_) => OpKind::Load,
            Node::Add(_, _) => OpKind::Add,
            Node::Mul(_, _) => OpKind::Mul,
            Node::Neg(_) => OpKind::Neg,
        }
    }

    /// Literal value, for load nodes
    pub fn value(&self) -> Option<f64> {
        match &*self.node {
            Node::Load(v) => Some(*v),
            _ => None,
        }
    }

    fn children(&self) -> Vec<&Scalar> {
        match &*self.node {
            Node::Load(_) => Vec::new(),
            Node::Neg(a) => vec![a],
            Node::Add(a, b) | Node::Mul(a, b) => vec![a, b],
        }
    }

    /// Identity key for deduplication during flattening
    fn key(&self) -> usize {
        Rc::as_ptr(&self.node) as *const () as usize
    }
}

impl ops::Add for &Scalar {
    type Output = Scalar;
    fn add(self, rhs: &Scalar) -> Scalar {
        Scalar::wrap(Node::Add(self.clone(), rhs.clone()))
    }
}

impl ops::Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Scalar) -> Scalar {
        &self + &rhs
    }
}

impl ops::Mul for &Scalar {
    type Output = Scalar;
    fn mul(self, rhs: &Scalar) -> Scalar {
        Scalar::wrap(Node::Mul(self.clone(), rhs.clone()))
    }
}

impl ops::Mul for Scalar {
    type Output = Scalar;
    fn mul(self, rhs: Scalar) -> Scalar {
        &self * &rhs
    }
}

impl ops::Neg for &Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        Scalar::wrap(Node::Neg(self.clone()))
    }
}

impl ops::Neg for Scalar {
    type Output = Scalar;
    fn neg(self) -> Scalar {
        -&self
    }
}

// Subtraction lowers to addition of the negated operand.
impl ops::Sub for &Scalar {
    type Output = Scalar;
    fn sub(self, rhs: &Scalar) -> Scalar {
        self + &(-rhs)
    }
}

impl ops::Sub for Scalar {
    type Output = Scalar;
    fn sub(self, rhs: Scalar) -> Scalar {
        &self - &rhs
    }
}

/// One operation of a flattened expression
#[derive(Debug, Clone, PartialEq)]
pub struct FlatNode {
    /// Operation kind
    pub kind: OpKind,
    /// Literal value, for load nodes
    pub value: Option<f64>,
    /// Indices of operand nodes, always earlier in the list
    pub operands: Vec<usize>,
}

/// Topologically ordered operation list, leaves first
#[derive(Debug, Clone, PartialEq)]
pub struct FlatGraph {
    /// Operations; the last entry is the root
    pub nodes: Vec<FlatNode>,
}

impl FlatGraph {
    /// Number of distinct operations
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty (it never is for a valid expression)
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of the root operation
    pub fn root(&self) -> usize {
        self.nodes.len() - 1
    }
}

/// Flatten an expression DAG into dependency order.
///
/// Shared subexpressions are emitted once; operands are visited
/// left-to-right, so the order is reproducible for a given DAG shape.
/// Literal loads are validated to be finite.
pub fn flatten(root: &Scalar) -> Result<FlatGraph> {
    enum Visit<'a> {
        Enter(&'a Scalar),
        Exit(&'a Scalar),
    }

    let mut nodes: Vec<FlatNode> = Vec::new();
    let mut ids: HashMap<usize, usize> = HashMap::new();
    let mut entered: HashSet<usize> = HashSet::new();
    let mut stack = vec![Visit::Enter(root)];

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(scalar) => {
                if !entered.insert(scalar.key()) {
                    continue;
                }
                stack.push(Visit::Exit(scalar));
                // Reverse push so the left operand is flattened first.
                for child in scalar.children().into_iter().rev() {
                    stack.push(Visit::Enter(child));
                }
            }
            Visit::Exit(scalar) => {
                let value = scalar.value();
                if let Some(v) = value {
                    if !v.is_finite() {
                        return Err(IrError::NonFiniteLiteral(v));
                    }
                }
                let operands = scalar
                    .children()
                    .iter()
                    .map(|c| ids[&c.key()])
                    .collect();
                let id = nodes.len();
                nodes.push(FlatNode {
                    kind: scalar.kind(),
                    value,
                    operands,
                });
                ids.insert(scalar.key(), id);
            }
        }
    }

    Ok(FlatGraph { nodes })
}
