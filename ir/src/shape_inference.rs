//! Shape rules for asynchronous start operations.
//!
//! Start nodes produce a tuple that keeps the in-flight buffers alive until
//! the matching done node consumes it. The rules here fix the layout of that
//! tuple so producers and backends agree on it.

use snafu::ensure;

use crate::Shape;
use crate::error::*;

/// Bookkeeping slot appended to start tuples (`u32[]`).
pub fn context_shape() -> Shape {
    Shape::scalar_of::<u32>()
}

/// Shape of `collective-permute-start`.
///
/// - One operand `x`: `(x, x, u32[], u32[])`.
/// - Four operands `(input, output, input_offsets, output_offsets)`:
///   `(input, output, u32[], u32[])`. Input and output must be arrays or
///   tuples of arrays with matching element types; offsets must be integer
///   arrays or tuples of integer arrays.
///
/// # Errors
/// Returns error on any other operand count or on malformed operand shapes.
pub fn infer_collective_permute_start_shape(operand_shapes: &[&Shape]) -> Result<Shape> {
    match operand_shapes {
        [operand] => {
            ensure!(
                operand.is_array(),
                ExpectedArraySnafu { context: "operand of collective-permute-start", shape: (*operand).clone() }
            );
            Ok(Shape::tuple([(*operand).clone(), (*operand).clone(), context_shape(), context_shape()]))
        }
        [input, output, input_offsets, output_offsets] => {
            ensure!(
                input.is_array_or_flat_tuple(),
                ExpectedArrayOrTupleSnafu { context: "input of collective-permute-start", shape: (*input).clone() }
            );
            ensure!(
                output.is_array_or_flat_tuple(),
                ExpectedArrayOrTupleSnafu { context: "output of collective-permute-start", shape: (*output).clone() }
            );
            ensure!(
                buffers_compatible(input, output),
                ElementTypeMismatchSnafu {
                    context: "collective-permute-start",
                    lhs: (*input).clone(),
                    rhs: (*output).clone(),
                }
            );
            for (index, offsets) in [(2usize, input_offsets), (3, output_offsets)] {
                ensure!(is_offset_shape(offsets), InvalidOffsetShapeSnafu { index, shape: (*offsets).clone() });
            }
            Ok(Shape::tuple([(*input).clone(), (*output).clone(), context_shape(), context_shape()]))
        }
        _ => InvalidOperandCountSnafu { op: "collective-permute-start", expected: "1 or 4", actual: operand_shapes.len() }
            .fail(),
    }
}

/// Shape of `all-gather-start`: `(operands, output)`, where `operands` is the
/// lone operand shape or a tuple of all operand shapes.
pub fn infer_all_gather_start_shape(operand_shapes: &[&Shape], output: &Shape) -> Shape {
    let operands = match operand_shapes {
        [single] => (*single).clone(),
        _ => Shape::tuple(operand_shapes.iter().map(|shape| (*shape).clone())),
    };
    Shape::tuple([operands, output.clone()])
}

/// Shape of a generic `async-start`: `((operands...), output, context...)`.
pub fn infer_async_start_shape(operand_shapes: &[&Shape], output: &Shape, context_shapes: &[Shape]) -> Shape {
    let mut elements = Vec::with_capacity(2 + context_shapes.len());
    elements.push(Shape::tuple(operand_shapes.iter().map(|shape| (*shape).clone())));
    elements.push(output.clone());
    elements.extend(context_shapes.iter().cloned());
    Shape::Tuple(elements)
}

fn buffers_compatible(lhs: &Shape, rhs: &Shape) -> bool {
    match (lhs, rhs) {
        (Shape::Array { element: l, .. }, Shape::Array { element: r, .. }) => l == r,
        (Shape::Tuple(l), Shape::Tuple(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(l, r)| buffers_compatible(l, r))
        }
        _ => false,
    }
}

fn is_offset_shape(shape: &Shape) -> bool {
    if shape.is_token() {
        return false;
    }
    let mut all_int = true;
    let mut leaves = 0usize;
    shape.for_each_array(&mut |element, _| {
        leaves += 1;
        all_int &= element.is_int();
    });
    all_int && leaves > 0
}
