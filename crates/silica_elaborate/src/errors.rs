//! Elaboration errors.
//!
//! Elaboration is all-or-nothing: the first unsupported construct aborts the
//! run. There is no partial netlist recovery and no silent skipping — a
//! construct the elaborator does not recognize is an error, never a no-op.

use silica_netlist::ValidationError;

/// An error raised while elaborating a syntax tree into a netlist.
#[derive(Debug, thiserror::Error)]
pub enum ElabError {
    /// A syntax-tree shape the elaborator does not support.
    #[error("unsupported construct: {kind}")]
    UnsupportedConstruct {
        /// What was encountered.
        kind: String,
    },

    /// No module definition matched the requested top.
    #[error("{}", missing_top_message(.name))]
    MissingTopModule {
        /// The requested top-module name, if one was given.
        name: Option<String>,
    },

    /// A port direction outside input/output.
    #[error("port `{port}` has unsupported direction `{direction}`")]
    InvalidPortDirection {
        /// The port name.
        port: String,
        /// The offending direction.
        direction: String,
    },

    /// An identifier used in a constant expression is not a parameter.
    #[error("`{name}` is not a parameter and cannot appear in a constant expression")]
    UndefinedParameter {
        /// The identifier.
        name: String,
    },

    /// The elaborated netlist violated a structural invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ElabError {
    /// Shorthand for an [`ElabError::UnsupportedConstruct`].
    pub fn unsupported(kind: impl Into<String>) -> Self {
        ElabError::UnsupportedConstruct { kind: kind.into() }
    }
}

fn missing_top_message(name: &Option<String>) -> String {
    match name {
        Some(n) => format!("top module `{n}` not found"),
        None => "no module definition found".to_string(),
    }
}
