use snafu::Snafu;
use tessera_ir::Opcode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Graph or schedule operation failed; `context` names what the pass was doing.
    #[snafu(display("{context}: {source}"))]
    Ir { context: String, source: tessera_ir::Error },

    /// Start shape of an asynchronous operation could not be inferred.
    #[snafu(display("shape inference failed for {node}: {source}"))]
    ShapeInference { node: String, source: tessera_ir::Error },

    /// Rewriter received a node of another collective family.
    #[snafu(display("{node} is {actual}, expected {expected}"))]
    UnexpectedOpcode { node: String, expected: Opcode, actual: Opcode },

    /// Generic async expansion produced a done node without its start.
    #[snafu(display("async-done replacing {node} does not consume an async-start"))]
    MissingAsyncStart { node: String },
}
