//! Single-line node rendering.
//!
//! `%name = shape opcode(operands), attributes`. Operands render as handles
//! (`#3`); [`Computation::render_node`](crate::Computation::render_node)
//! resolves them to names.

use std::fmt::{self, Write};

use crate::node::Node;
use crate::op::Op;
use crate::types::CollectiveOpts;

impl Node {
    /// `%name = shape opcode`, without operands or attributes.
    pub fn to_short_string(&self) -> String {
        format!("%{} = {} {}", self.name, self.shape, self.op.name())
    }

    pub(crate) fn write_line(&self, f: &mut impl Write, operand_names: &[String]) -> fmt::Result {
        write!(f, "%{} = {} {}(", self.name, self.shape, self.op.name())?;
        for (i, operand) in operand_names.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{operand}")?;
        }
        write!(f, ")")?;
        write_attributes(f, &self.op)?;
        if self.has_side_effect {
            write!(f, ", side_effect=true")?;
        }
        if !self.metadata.op_name.is_empty() {
            write!(f, ", metadata={{op_name=\"{}\"}}", self.metadata.op_name)?;
        }
        Ok(())
    }
}

/// A node line with operands already resolved by the caller.
pub(crate) struct NodeLine<'a> {
    pub node: &'a Node,
    pub operands: &'a [String],
}

impl fmt::Display for NodeLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.node.write_line(f, self.operands)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let operands: Vec<String> = self.operands.iter().map(ToString::to_string).collect();
        self.write_line(f, &operands)
    }
}

fn write_attributes(f: &mut impl Write, op: &Op) -> fmt::Result {
    match op {
        Op::Parameter { number } => write!(f, ", parameter={number}"),
        Op::Constant(value) => write!(f, ", value={value}"),
        Op::GetTupleElement { index } => write!(f, ", index={index}"),
        Op::AllReduce(attrs) | Op::AllReduceStart(attrs) => {
            write_collective(f, &attrs.collective)?;
            write!(f, ", to_apply={}", attrs.to_apply)
        }
        Op::AllGather(attrs) | Op::AllGatherStart(attrs) => {
            write!(f, ", dimensions={{{}}}", attrs.dimension)?;
            write_collective(f, &attrs.collective)
        }
        Op::CollectivePermute(attrs) | Op::CollectivePermuteStart(attrs) => {
            write!(f, ", source_target_pairs={{")?;
            for (i, (source, target)) in attrs.source_target_pairs.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{{{source},{target}}}")?;
            }
            write!(f, "}}")?;
            if !attrs.slice_sizes.is_empty() {
                write!(f, ", slice_sizes={:?}", attrs.slice_sizes)?;
            }
            if let Some(channel_id) = attrs.channel_id {
                write!(f, ", channel_id={channel_id}")?;
            }
            Ok(())
        }
        Op::AllToAll(attrs) => {
            if let Some(dimension) = attrs.split_dimension {
                write!(f, ", dimensions={{{dimension}}}")?;
            }
            write_collective(f, &attrs.collective)
        }
        Op::AsyncStart { wrapped } | Op::AsyncDone { wrapped } => write_attributes(f, wrapped),
        Op::CustomCall { target } => write!(f, ", custom_call_target=\"{target}\""),
        Op::Add
        | Op::Multiply
        | Op::Maximum
        | Op::Tuple
        | Op::AllReduceDone
        | Op::AllGatherDone
        | Op::CollectivePermuteDone => Ok(()),
    }
}

fn write_collective(f: &mut impl Write, opts: &CollectiveOpts) -> fmt::Result {
    if !opts.replica_groups.is_empty() {
        write!(f, ", replica_groups={{")?;
        for (i, group) in opts.replica_groups.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{group}")?;
        }
        write!(f, "}}")?;
    }
    if opts.constrain_layout {
        write!(f, ", constrain_layout=true")?;
    }
    if let Some(channel_id) = opts.channel_id {
        write!(f, ", channel_id={channel_id}")?;
    }
    if opts.use_global_device_ids {
        write!(f, ", use_global_device_ids=true")?;
    }
    Ok(())
}
