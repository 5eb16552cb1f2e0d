//! Shapes of node outputs.
//!
//! A shape is either a dense array (element type plus dimensions), a tuple of
//! shapes, or a token. Tokens carry no data and only order side effects.
//!
//! Rendering follows the usual compact spelling:
//! - `f32[4,8]` for arrays, `u32[]` for scalars
//! - `(f32[4], u32[])` for tuples
//! - `token[]` for tokens

use smallvec::SmallVec;
use tessera_dtype::{ElementType, HasElementType};

/// Dimension list. Inline capacity covers ranks up to 4 without allocating.
pub type Dims = SmallVec<[i64; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Shape {
    Array { element: ElementType, dims: Dims },
    Tuple(Vec<Shape>),
    Token,
}

impl Shape {
    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn array(element: ElementType, dims: impl IntoIterator<Item = i64>) -> Self {
        Self::Array { element, dims: dims.into_iter().collect() }
    }

    /// Rank-0 array.
    pub fn scalar(element: ElementType) -> Self {
        Self::Array { element, dims: Dims::new() }
    }

    /// Rank-0 array of the element type matching `T`.
    pub fn scalar_of<T: HasElementType>() -> Self {
        Self::scalar(T::ELEMENT_TYPE)
    }

    pub fn tuple(elements: impl IntoIterator<Item = Shape>) -> Self {
        Self::Tuple(elements.into_iter().collect())
    }

    pub fn token() -> Self {
        Self::Token
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array { .. })
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Self::Array { dims, .. } if dims.is_empty())
    }

    pub fn is_tuple(&self) -> bool {
        matches!(self, Self::Tuple(_))
    }

    pub fn is_token(&self) -> bool {
        matches!(self, Self::Token)
    }

    /// True for arrays and for tuples whose elements are all arrays.
    pub fn is_array_or_flat_tuple(&self) -> bool {
        match self {
            Self::Array { .. } => true,
            Self::Tuple(elements) => elements.iter().all(Shape::is_array),
            Self::Token => false,
        }
    }

    pub fn element_type(&self) -> Option<ElementType> {
        match self {
            Self::Array { element, .. } => Some(*element),
            _ => None,
        }
    }

    /// Dimensions of an array; empty for tuples and tokens.
    pub fn dims(&self) -> &[i64] {
        match self {
            Self::Array { dims, .. } => dims,
            _ => &[],
        }
    }

    pub fn rank(&self) -> usize {
        self.dims().len()
    }

    /// Element shapes of a tuple; empty for arrays and tokens.
    pub fn tuple_shapes(&self) -> &[Shape] {
        match self {
            Self::Tuple(elements) => elements,
            _ => &[],
        }
    }

    pub fn tuple_element(&self, index: usize) -> Option<&Shape> {
        self.tuple_shapes().get(index)
    }

    /// Number of elements of an array shape.
    pub fn element_count(&self) -> Option<i64> {
        match self {
            Self::Array { dims, .. } => Some(dims.iter().product()),
            _ => None,
        }
    }

    /// Dense byte size, summed over tuple leaves. Tokens occupy no storage.
    pub fn byte_size(&self) -> i64 {
        match self {
            Self::Array { element, dims } => dims.iter().product::<i64>() * element.bytes() as i64,
            Self::Tuple(elements) => elements.iter().map(Shape::byte_size).sum(),
            Self::Token => 0,
        }
    }

    /// Visits every array leaf, depth first.
    pub fn for_each_array(&self, f: &mut impl FnMut(ElementType, &[i64])) {
        match self {
            Self::Array { element, dims } => f(*element, dims),
            Self::Tuple(elements) => elements.iter().for_each(|element| element.for_each_array(f)),
            Self::Token => {}
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Array { element, dims } => {
                write!(f, "{element}[")?;
                for (i, dim) in dims.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{dim}")?;
                }
                write!(f, "]")
            }
            Self::Tuple(elements) => {
                write!(f, "(")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, ")")
            }
            Self::Token => write!(f, "token[]"),
        }
    }
}
